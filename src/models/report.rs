//! Report rows emitted for articles with industry-affiliated authors.

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

/// One row of the industry-affiliation report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub pmid: String,
    pub title: String,
    pub publication_date: String,

    /// Flagged author names in byline order
    pub non_academic_authors: Vec<String>,

    /// Distinct affiliation strings of flagged authors
    pub company_affiliations: BTreeSet<String>,

    /// First non-empty email among flagged authors, or empty
    pub corresponding_email: String,
}

impl ReportRow {
    /// Flagged author names joined for tabular output
    pub fn authors_joined(&self) -> String {
        self.non_academic_authors.join(", ")
    }

    /// Company affiliations joined for tabular output
    pub fn affiliations_joined(&self) -> String {
        self.company_affiliations
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Flat record layout with the report's column headers
#[derive(Serialize)]
struct FlatRow<'a> {
    #[serde(rename = "PubmedID")]
    pmid: &'a str,
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Publication Date")]
    publication_date: &'a str,
    #[serde(rename = "Non-academic Author(s)")]
    authors: String,
    #[serde(rename = "Company Affiliation(s)")]
    affiliations: String,
    #[serde(rename = "Corresponding Author Email")]
    email: &'a str,
}

impl Serialize for ReportRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FlatRow {
            pmid: &self.pmid,
            title: &self.title,
            publication_date: &self.publication_date,
            authors: self.authors_joined(),
            affiliations: self.affiliations_joined(),
            email: &self.corresponding_email,
        }
        .serialize(serializer)
    }
}

/// Column headers in serialization order
pub const REPORT_HEADERS: [&str; 6] = [
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Author(s)",
    "Company Affiliation(s)",
    "Corresponding Author Email",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> ReportRow {
        ReportRow {
            pmid: "42".to_string(),
            title: "Kinase inhibitors".to_string(),
            publication_date: "2023".to_string(),
            non_academic_authors: vec!["B Lee".to_string(), "C Wu".to_string()],
            company_affiliations: ["Zeta Pharma", "Acme Biotech Inc"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            corresponding_email: "b@acme.com".to_string(),
        }
    }

    #[test]
    fn test_joined_fields() {
        let row = sample_row();
        assert_eq!(row.authors_joined(), "B Lee, C Wu");
        assert_eq!(row.affiliations_joined(), "Acme Biotech Inc; Zeta Pharma");
    }

    #[test]
    fn test_serializes_with_report_headers() {
        let value = serde_json::to_value(sample_row()).unwrap();
        assert_eq!(value["PubmedID"], "42");
        assert_eq!(value["Non-academic Author(s)"], "B Lee, C Wu");
        assert_eq!(value["Corresponding Author Email"], "b@acme.com");

        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        for header in REPORT_HEADERS {
            assert!(keys.iter().any(|k| k == header), "missing {}", header);
        }
    }
}
