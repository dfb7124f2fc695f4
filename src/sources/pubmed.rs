//! PubMed article source implementation using E-utilities API.

use async_trait::async_trait;
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::config::PubMedConfig;
use crate::models::{Article, Author};
use crate::sources::{ArticleQuery, ArticleSource, SourceError};
use crate::utils::HttpClient;

/// Placeholder when an article carries no publication year
const UNKNOWN_DATE: &str = "Unknown";

/// PubMed article source
///
/// Uses NCBI E-utilities: `esearch` resolves the query to PMIDs and a single
/// batched `efetch` returns the full records.
#[derive(Debug, Clone)]
pub struct PubMedSource {
    client: HttpClient,
    base_url: String,
    email: Option<String>,
    api_key: Option<String>,
}

impl PubMedSource {
    /// Create a new PubMed source
    pub fn new(config: &PubMedConfig) -> Result<Self, SourceError> {
        Ok(Self::with_client(
            HttpClient::with_timeout(config.timeout())?,
            config,
        ))
    }

    /// Create with an existing HTTP client
    pub fn with_client(client: HttpClient, config: &PubMedConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            email: config.email.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Parameters sent with every E-utilities request
    fn common_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("db", "pubmed".to_string())];
        if let Some(email) = &self.email {
            params.push(("email", email.clone()));
        }
        if let Some(api_key) = &self.api_key {
            params.push(("api_key", api_key.clone()));
        }
        params
    }

    fn encode(params: &[(&str, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Build E-utilities search URL
    fn build_search_url(&self, query: &ArticleQuery) -> String {
        let mut params = self.common_params();
        params.push(("term", query.term.clone()));
        params.push(("retmax", query.max_results.to_string()));
        params.push(("retmode", "xml".to_string()));

        format!("{}/esearch.fcgi?{}", self.base_url, Self::encode(&params))
    }

    /// Build E-utilities fetch URL for specific PubMed IDs
    fn build_fetch_url(&self, ids: &[String]) -> String {
        let mut params = self.common_params();
        params.push(("id", ids.join(",")));
        params.push(("retmode", "xml".to_string()));

        format!("{}/efetch.fcgi?{}", self.base_url, Self::encode(&params))
    }

    async fn get_text(&self, url: &str, what: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .client()
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to {} PubMed: {}", what, e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "PubMed {} returned status: {}",
                what,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))
    }

    /// Parse E-utilities search response XML
    fn parse_search_response(xml: &str) -> Result<Vec<String>, SourceError> {
        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct ESearchResult {
            IdList: Option<IdList>,
        }

        #[derive(Debug, Deserialize)]
        struct IdList {
            #[serde(rename = "Id", default)]
            ids: Vec<String>,
        }

        let result: ESearchResult = from_str(xml)
            .map_err(|e| SourceError::Parse(format!("Failed to parse PubMed search XML: {}", e)))?;

        Ok(result.IdList.map(|list| list.ids).unwrap_or_default())
    }

    /// Parse E-utilities fetch response XML
    ///
    /// Each `PubmedArticle` is decoded on its own; a record that fails to
    /// decode is logged and skipped. Only a malformed document is an error.
    fn parse_fetch_response(xml: &str) -> Result<Vec<Article>, SourceError> {
        let fragments = article_fragments(xml)?;

        let articles = fragments
            .iter()
            .enumerate()
            .filter_map(|(index, fragment)| match parse_article(fragment) {
                Ok(article) => article,
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping unparseable PubMed article");
                    None
                }
            })
            .collect();

        Ok(articles)
    }
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct PubmedArticle {
    MedlineCitation: Option<MedlineCitation>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct MedlineCitation {
    PMID: Option<Text>,
    Article: Option<ArticleXml>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct ArticleXml {
    Journal: Option<Journal>,
    ArticleTitle: Option<Text>,
    AuthorList: Option<AuthorList>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct Journal {
    JournalIssue: Option<JournalIssue>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JournalIssue {
    PubDate: Option<PubDate>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct PubDate {
    Year: Option<String>,
    MedlineDate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthorList {
    #[serde(rename = "Author", default)]
    authors: Vec<AuthorXml>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct AuthorXml {
    LastName: Option<Text>,
    ForeName: Option<Text>,
    CollectiveName: Option<Text>,
    #[serde(rename = "AffiliationInfo", default)]
    affiliation_info: Vec<AffiliationInfo>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct AffiliationInfo {
    Affiliation: Option<Text>,
}

#[derive(Debug, Deserialize)]
struct Text {
    #[serde(rename = "$text", default)]
    value: String,
}

/// Raw `<PubmedArticle>` elements of an efetch document, inline markup removed
fn article_fragments(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut fragments = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) if start.name().as_ref() == b"PubmedArticle" => {
                let end = start.to_end().into_owned();
                let inner = reader.read_text(end.name())?;
                fragments.push(format!(
                    "<PubmedArticle>{}</PubmedArticle>",
                    strip_inline_markup(&inner)
                ));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(fragments)
}

/// Drop formatting tags (`<i>`, `<sup>`, MathML, ...) so titles and
/// affiliations decode as a single text node
fn strip_inline_markup(xml: &str) -> String {
    static INLINE: OnceLock<Regex> = OnceLock::new();
    let re = INLINE.get_or_init(|| {
        Regex::new(r"</?(?:i|b|u|sup|sub|em|strong|math|mml:[A-Za-z]+)(?:\s[^>]*)?/?>")
            .expect("valid inline markup regex")
    });

    re.replace_all(xml, "").into_owned()
}

/// Decode one `<PubmedArticle>` fragment; `None` when it has no citation
fn parse_article(fragment: &str) -> Result<Option<Article>, quick_xml::DeError> {
    let record: PubmedArticle = from_str(fragment)?;
    let Some(citation) = record.MedlineCitation else {
        return Ok(None);
    };

    let pmid = citation.PMID.map(|p| p.value).unwrap_or_default();
    let article = citation.Article;

    let title = article
        .as_ref()
        .and_then(|a| a.ArticleTitle.as_ref())
        .map(|t| t.value.trim().to_string())
        .unwrap_or_default();

    let publication_date = article
        .as_ref()
        .and_then(|a| a.Journal.as_ref())
        .and_then(|j| j.JournalIssue.as_ref())
        .and_then(|ji| ji.PubDate.as_ref())
        .and_then(|pd| pd.Year.as_ref().or(pd.MedlineDate.as_ref()))
        .cloned()
        .unwrap_or_else(|| UNKNOWN_DATE.to_string());

    let authors = article
        .and_then(|a| a.AuthorList)
        .map(|list| list.authors.into_iter().map(parse_author).collect())
        .unwrap_or_default();

    Ok(Some(Article::new(pmid, title, publication_date).authors(authors)))
}

fn parse_author(author: AuthorXml) -> Author {
    let name = match author.CollectiveName {
        Some(collective) => collective.value.trim().to_string(),
        None => {
            let first = author.ForeName.map(|f| f.value).unwrap_or_default();
            let last = author.LastName.map(|l| l.value).unwrap_or_default();
            format!("{} {}", first, last).trim().to_string()
        }
    };

    let affiliation = author
        .affiliation_info
        .into_iter()
        .find_map(|info| info.Affiliation)
        .map(|a| a.value.trim().to_string())
        .unwrap_or_default();
    let email = extract_email(&affiliation);

    Author::new(name, affiliation, email)
}

/// First email-like token in `text`, or an empty string
pub fn extract_email(text: &str) -> String {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL.get_or_init(|| Regex::new(r"[\w.-]+@[\w.-]+").expect("valid email regex"));

    re.find(text)
        .map(|m| m.as_str().trim_end_matches('.').to_string())
        .unwrap_or_default()
}

#[async_trait]
impl ArticleSource for PubMedSource {
    fn id(&self) -> &str {
        "pubmed"
    }

    async fn fetch(&self, query: &ArticleQuery) -> Result<Vec<Article>, SourceError> {
        if query.term.trim().is_empty() {
            return Err(SourceError::InvalidRequest(
                "search term must not be empty".to_string(),
            ));
        }

        tracing::debug!(term = %query.term, max_results = query.max_results, "Searching PubMed");
        let search_xml = self.get_text(&self.build_search_url(query), "search").await?;
        let ids = Self::parse_search_response(&search_xml)?;
        tracing::debug!("Found {} PubMed IDs", ids.len());

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let fetch_xml = self.get_text(&self.build_fetch_url(&ids), "fetch").await?;
        let articles = Self::parse_fetch_response(&fetch_xml)?;
        tracing::info!("Fetched {} articles from PubMed", articles.len());

        Ok(articles)
    }
}
