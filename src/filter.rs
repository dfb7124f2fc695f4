//! Article filter: keeps articles with at least one industry-affiliated author.

use futures_util::stream::{self, StreamExt};
use std::collections::BTreeSet;

use crate::classifier::AffiliationClassifier;
use crate::models::{Article, ReportRow};

/// Applies the affiliation classifier across articles and builds report rows
///
/// Classification calls may run concurrently (see [`ArticleFilter::concurrency`]),
/// but verdicts are collected in author order and rows are assembled
/// sequentially, so the output never depends on call completion order.
#[derive(Debug, Clone)]
pub struct ArticleFilter {
    classifier: AffiliationClassifier,
    concurrency: usize,
}

impl ArticleFilter {
    pub fn new(classifier: AffiliationClassifier) -> Self {
        Self {
            classifier,
            concurrency: 1,
        }
    }

    /// Maximum number of in-flight classification calls (at least 1)
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Produce one row per article with a flagged author, in input order
    pub async fn filter(&self, articles: &[Article]) -> Vec<ReportRow> {
        let verdicts = self.classify_authors(articles).await;

        let rows: Vec<ReportRow> = articles
            .iter()
            .zip(verdicts)
            .filter_map(|(article, flags)| {
                let row = build_row(article, &flags)?;
                tracing::debug!(
                    pmid = %row.pmid,
                    flagged = row.non_academic_authors.len(),
                    "Included article: {}",
                    row.title.chars().take(50).collect::<String>()
                );
                Some(row)
            })
            .collect();

        tracing::info!(
            articles = articles.len(),
            included = rows.len(),
            "Filtered articles for industry authors"
        );
        rows
    }

    /// Industry verdict for every author, grouped per article
    async fn classify_authors(&self, articles: &[Article]) -> Vec<Vec<bool>> {
        let classifier = &self.classifier;
        let pending = articles
            .iter()
            .flat_map(|article| article.authors.iter())
            .map(|author| async move {
                if author.has_affiliation() {
                    classifier.classify(&author.affiliation).await
                } else {
                    false
                }
            });

        let flat: Vec<bool> = stream::iter(pending)
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut flat = flat.into_iter();
        articles
            .iter()
            .map(|article| flat.by_ref().take(article.authors.len()).collect())
            .collect()
    }
}

/// Assemble the report row for `article` given per-author industry flags
///
/// Returns `None` when no author is flagged.
pub fn build_row(article: &Article, flags: &[bool]) -> Option<ReportRow> {
    let mut non_academic_authors = Vec::new();
    let mut company_affiliations = BTreeSet::new();
    let mut corresponding_email = String::new();

    for (author, _) in article
        .authors
        .iter()
        .zip(flags)
        .filter(|(_, flagged)| **flagged)
    {
        non_academic_authors.push(author.name.clone());
        company_affiliations.insert(author.affiliation.clone());
        if corresponding_email.is_empty() && !author.email.is_empty() {
            corresponding_email = author.email.clone();
        }
    }

    if non_academic_authors.is_empty() {
        return None;
    }

    Some(ReportRow {
        pmid: article.pmid.clone(),
        title: article.title.clone(),
        publication_date: article.publication_date.clone(),
        non_academic_authors,
        company_affiliations,
        corresponding_email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{BackendError, MockBackend};
    use crate::models::Author;
    use std::sync::Arc;
    use std::time::Duration;

    fn filter_with(backend: MockBackend) -> (ArticleFilter, Arc<MockBackend>) {
        let backend = Arc::new(backend);
        let classifier = AffiliationClassifier::new(backend.clone());
        (ArticleFilter::new(classifier), backend)
    }

    #[tokio::test]
    async fn test_mixed_article_reports_only_industry_author() {
        let (filter, _) = filter_with(MockBackend::returning(false));
        let article = Article::new("100", "Enzyme kinetics", "2022")
            .with_author(Author::new("A Smith", "Dept of Biology, State University", ""))
            .with_author(Author::new("B Lee", "Acme Biotech Inc", "b@acme.com"));

        let rows = filter.filter(&[article]).await;

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.pmid, "100");
        assert_eq!(row.non_academic_authors, vec!["B Lee".to_string()]);
        assert_eq!(
            row.company_affiliations.iter().collect::<Vec<_>>(),
            vec!["Acme Biotech Inc"]
        );
        assert_eq!(row.corresponding_email, "b@acme.com");
    }

    #[tokio::test]
    async fn test_all_academic_article_is_excluded() {
        let (filter, _) = filter_with(MockBackend::returning(true));
        let article = Article::new("101", "Cell biology", "2021")
            .with_author(Author::new("A Smith", "Harvard University", "a@harvard.edu"))
            .with_author(Author::new("C Wu", "Karolinska Institute", ""));

        assert!(filter.filter(&[article]).await.is_empty());
    }

    #[tokio::test]
    async fn test_article_without_authors_is_excluded() {
        let (filter, _) = filter_with(MockBackend::returning(true));
        let article = Article::new("102", "Editorial", "Unknown");

        assert!(filter.filter(&[article]).await.is_empty());
    }

    #[tokio::test]
    async fn test_flagged_names_keep_author_order() {
        let (filter, _) = filter_with(MockBackend::returning(false));
        let article = Article::new("103", "Antibody design", "2023").authors(vec![
            Author::new("Z Last", "Zeta Pharma", ""),
            Author::new("M Mid", "State University", ""),
            Author::new("A First", "Alpha Diagnostics", ""),
        ]);

        let rows = filter.filter(&[article]).await;
        assert_eq!(
            rows[0].non_academic_authors,
            vec!["Z Last".to_string(), "A First".to_string()]
        );
    }

    #[tokio::test]
    async fn test_shared_affiliation_is_deduplicated() {
        let (filter, _) = filter_with(MockBackend::returning(false));
        let article = Article::new("104", "Vaccines", "2020").authors(vec![
            Author::new("B Lee", "Acme Biotech Inc", ""),
            Author::new("D Kim", "Acme Biotech Inc", ""),
        ]);

        let rows = filter.filter(&[article]).await;
        assert_eq!(rows[0].non_academic_authors.len(), 2);
        assert_eq!(rows[0].company_affiliations.len(), 1);
    }

    #[tokio::test]
    async fn test_email_comes_from_first_flagged_author_with_email() {
        let (filter, _) = filter_with(MockBackend::returning(false));
        let article = Article::new("105", "Biomarkers", "2019").authors(vec![
            Author::new("A Smith", "State University", "a@state.edu"),
            Author::new("B Lee", "Acme Biotech Inc", ""),
            Author::new("D Kim", "Beta Labs", "d@beta.com"),
            Author::new("E Ray", "Gamma Pharma", "e@gamma.com"),
        ]);

        let rows = filter.filter(&[article]).await;
        assert_eq!(rows[0].corresponding_email, "d@beta.com");
    }

    #[tokio::test]
    async fn test_email_empty_when_no_flagged_author_has_one() {
        let (filter, _) = filter_with(MockBackend::returning(false));
        let article = Article::new("106", "Assays", "2018").authors(vec![
            Author::new("A Smith", "State University", "a@state.edu"),
            Author::new("B Lee", "Acme Biotech Inc", ""),
        ]);

        let rows = filter.filter(&[article]).await;
        assert_eq!(rows[0].corresponding_email, "");
    }

    #[tokio::test]
    async fn test_rows_follow_input_order() {
        let (filter, _) = filter_with(MockBackend::returning(false));
        let articles = vec![
            Article::new("1", "First", "2020").with_author(Author::new("X", "Omega Inc", "")),
            Article::new("2", "Second", "2020").with_author(Author::new("Y", "State University", "")),
            Article::new("3", "Third", "2020").with_author(Author::new("Z", "Sigma Ltd", "")),
        ];

        let rows = filter.filter(&articles).await;
        let ids: Vec<_> = rows.iter().map(|r| r.pmid.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_empty_affiliation_skips_backend() {
        let (filter, backend) = filter_with(MockBackend::returning(true));
        let article = Article::new("107", "Notes", "2020")
            .with_author(Author::new("No Affil", "", "x@y.com"));

        assert!(filter.filter(&[article]).await.is_empty());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_does_not_flag_author() {
        let (filter, _) = filter_with(
            MockBackend::returning(true)
                .with_verdict("Novo Nordisk A/S", Err(BackendError::Network("refused".into()))),
        );
        let articles = vec![
            Article::new("108", "Insulin", "2020")
                .with_author(Author::new("N One", "Novo Nordisk A/S", "n@novo.dk")),
            Article::new("109", "Obesity", "2020")
                .with_author(Author::new("L Two", "Lundbeck A/S", "l@lundbeck.com")),
        ];

        let rows = filter.filter(&articles).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].pmid, "109");
    }

    #[tokio::test]
    async fn test_concurrent_filter_matches_sequential_order() {
        let backend = || {
            MockBackend::returning(true)
                .with_delay("Slow Corp A/S", Duration::from_millis(80))
                .with_delay("Medium AB", Duration::from_millis(40))
        };
        let articles = vec![Article::new("110", "Parallel", "2024").authors(vec![
            Author::new("First", "Slow Corp A/S", "first@slow.com"),
            Author::new("Second", "Medium AB", "second@medium.com"),
            Author::new("Third", "Quick SA", "third@quick.com"),
        ])];

        let (sequential, _) = filter_with(backend());
        let (concurrent, calls) = filter_with(backend());
        let concurrent = concurrent.concurrency(3);

        let expected = sequential.filter(&articles).await;
        let actual = concurrent.filter(&articles).await;

        assert_eq!(actual, expected);
        assert_eq!(
            actual[0].non_academic_authors,
            vec!["First".to_string(), "Second".to_string(), "Third".to_string()]
        );
        assert_eq!(actual[0].corresponding_email, "first@slow.com");
        assert_eq!(calls.call_count(), 3);
    }

    #[test]
    fn test_build_row_requires_a_flag() {
        let article = Article::new("111", "T", "2020")
            .with_author(Author::new("A", "Acme Inc", "a@acme.com"));
        assert!(build_row(&article, &[false]).is_none());
        assert!(build_row(&article, &[true]).is_some());
    }
}
