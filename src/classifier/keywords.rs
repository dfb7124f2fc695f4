//! Keyword tables for the rule tiers of the affiliation cascade.
//!
//! Matching is a case-insensitive substring test against the lower-cased
//! affiliation, so short entries such as `inc` or `labs` also match inside
//! longer words. Company keywords are always checked before academic ones.

/// Substrings that mark an affiliation as a company
pub const COMPANY_KEYWORDS: &[&str] = &[
    "pharma",
    "biotech",
    "therapeutics",
    "inc",
    "ltd",
    "llc",
    "company",
    "gmbh",
    "corporation",
    "technologies",
    "labs",
    "pvt",
    "diagnostics",
    "industries",
    "solutions",
    "genomics",
];

/// Substrings that mark an affiliation as academic
pub const ACADEMIC_KEYWORDS: &[&str] = &[
    "university",
    "institute",
    "college",
    "hospital",
    "school",
    "faculty",
    "dept",
    "department of",
];

/// First keyword in `keywords` contained in the already lower-cased `text`
pub fn first_match(text: &str, keywords: &[&'static str]) -> Option<&'static str> {
    keywords.iter().copied().find(|kw| text.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_lowercase() {
        for kw in COMPANY_KEYWORDS.iter().chain(ACADEMIC_KEYWORDS) {
            assert_eq!(*kw, kw.to_lowercase());
        }
    }

    #[test]
    fn test_first_match_follows_table_order() {
        assert_eq!(first_match("acme pharma inc", COMPANY_KEYWORDS), Some("pharma"));
        assert_eq!(first_match("nothing here", COMPANY_KEYWORDS), None);
    }
}
