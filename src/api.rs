use crate::config::Config;
use crate::error::{CatalogError, ConfigError};
use crate::printing::{CardIdentifier, CollectionRequest, CollectionResponse, Printing, SearchPage};
use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Read-only view of the card catalog.
///
/// The resolver only talks to the catalog through this trait, so tests can
/// hand it a fixture instead of a live HTTP client.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// All printings matching `query`. A query with no match is `Ok(vec![])`.
    async fn search(&self, query: &str) -> Result<Vec<Printing>, CatalogError>;

    async fn collection(
        &self,
        identifiers: &[CardIdentifier],
    ) -> Result<CollectionResponse, CatalogError>;
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum StatusOutcome {
    Body,
    NoMatch,
    Failed,
}

pub(crate) fn classify_status(status: StatusCode) -> StatusOutcome {
    if status.is_success() {
        StatusOutcome::Body
    } else if status == StatusCode::NOT_FOUND {
        StatusOutcome::NoMatch
    } else {
        StatusOutcome::Failed
    }
}

#[derive(Clone, Debug)]
pub struct HttpCatalogClient {
    client: Client,
    headers: HeaderMap,
    base_url: String,
    max_pages: usize,
    page_delay: Duration,
}

impl HttpCatalogClient {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(HttpCatalogClient {
            client,
            headers: config.default_headers()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_pages: config.max_pages.max(1),
            page_delay: config.batch_delay,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/cards/search?q={}",
            self.base_url,
            urlencoding::encode(query)
        )
    }
}

/// Where search pages come from; lets the page walk run without HTTP.
#[async_trait]
pub(crate) trait PageSource: Send + Sync {
    async fn page(&self, url: &str) -> Result<SearchPage, CatalogError>;
}

#[async_trait]
impl PageSource for HttpCatalogClient {
    async fn page(&self, url: &str) -> Result<SearchPage, CatalogError> {
        let request = self
            .client
            .request(reqwest::Method::GET, url)
            .headers(self.headers.clone());

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        match classify_status(status) {
            StatusOutcome::Body => Ok(serde_json::from_str(&body)?),
            StatusOutcome::NoMatch => Ok(SearchPage::default()),
            StatusOutcome::Failed => Err(CatalogError::Status {
                code: status.as_u16(),
                body,
            }),
        }
    }
}

/// Follows `next_page` links from `first_url`, at most `max_pages` pages,
/// waiting `delay` between requests.
pub(crate) async fn collect_pages<S: PageSource + ?Sized>(
    source: &S,
    first_url: String,
    max_pages: usize,
    delay: Duration,
) -> Result<Vec<Printing>, CatalogError> {
    let mut printings = Vec::new();
    let mut url = first_url;

    for page_number in 1..=max_pages {
        debug!(page = page_number, url = %url, "catalog search page");
        let page = source.page(&url).await?;
        printings.extend(page.data);
        match page.next_page {
            Some(next) if page.has_more => {
                if page_number == max_pages {
                    warn!(pages = max_pages, "search truncated at page limit");
                    break;
                }
                url = next;
                sleep(delay).await;
            }
            _ => break,
        }
    }

    Ok(printings)
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn search(&self, query: &str) -> Result<Vec<Printing>, CatalogError> {
        debug!(query, "catalog search");
        collect_pages(self, self.search_url(query), self.max_pages, self.page_delay).await
    }

    async fn collection(
        &self,
        identifiers: &[CardIdentifier],
    ) -> Result<CollectionResponse, CatalogError> {
        let request = self
            .client
            .request(
                reqwest::Method::POST,
                format!("{}/cards/collection", self.base_url),
            )
            .headers(self.headers.clone())
            .json(&CollectionRequest { identifiers });

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        match classify_status(status) {
            StatusOutcome::Body => Ok(serde_json::from_str(&body)?),
            StatusOutcome::NoMatch => Ok(CollectionResponse {
                data: Vec::new(),
                not_found: identifiers.to_vec(),
            }),
            StatusOutcome::Failed => Err(CatalogError::Status {
                code: status.as_u16(),
                body,
            }),
        }
    }
}
