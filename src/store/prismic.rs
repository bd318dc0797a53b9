//! Reqwest-backed client for a Prismic-compatible REST API.
//!
//! The client owns transport details only: URL building, ref resolution,
//! HTTP error mapping and JSON decoding into [`ApiPage`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use super::{ContentStore, Query, StoreError};
use crate::config::ApiConfig;
use crate::content::ApiPage;

const USER_AGENT: &str = concat!("headless-blog/", env!("CARGO_PKG_VERSION"));

/// Response of the API root; only the refs are used
#[derive(Debug, Deserialize)]
struct ApiRoot {
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// Content store backed by a remote repository
#[derive(Debug, Clone)]
pub struct PrismicClient {
    client: Client,
    endpoint: Url,
    access_token: Option<String>,
}

impl PrismicClient {
    /// Build a client with the configured endpoint and request timeout
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .with_context(|| format!("invalid API endpoint {:?}", config.endpoint))?;
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            access_token: config.access_token.clone(),
        })
    }

    /// Resolve the ref of the published content
    pub async fn master_ref(&self) -> Result<String, StoreError> {
        let mut url = self.endpoint.clone();
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }

        let body = self.get(url).await?;
        let root: ApiRoot = serde_json::from_slice(&body)
            .map_err(|e| StoreError::DataShape(format!("invalid API root: {}", e)))?;

        root.refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or_else(|| StoreError::DataShape("API root lists no master ref".to_string()))
    }

    /// Build the search URL for `query` against `reference`
    pub fn search_url(&self, query: &Query, reference: &str) -> Result<Url, StoreError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidCursor(self.endpoint.to_string()))?
            .pop_if_empty()
            .extend(["documents", "search"]);

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", reference);

            if !query.predicates.is_empty() {
                let q: String = query
                    .predicates
                    .iter()
                    .map(|p| p.to_query_string())
                    .collect();
                pairs.append_pair("q", &format!("[{}]", q));
            }

            pairs.append_pair("pageSize", &query.page_size.to_string());
            pairs.append_pair("page", &query.page.to_string());

            if let Some(ordering) = &query.ordering {
                pairs.append_pair("orderings", &ordering.to_query_string());
            }
            if let Some(after) = &query.after {
                pairs.append_pair("after", after);
            }
            if let Some(token) = &self.access_token {
                pairs.append_pair("access_token", token);
            }
        }

        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>, StoreError> {
        tracing::debug!("GET {}", redact(&url));

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }

        Ok(body.to_vec())
    }
}

#[async_trait]
impl ContentStore for PrismicClient {
    async fn resolve_ref(&self, reference: Option<&str>) -> Result<Option<String>, StoreError> {
        match reference {
            Some(reference) => Ok(Some(reference.to_string())),
            None => self.master_ref().await.map(Some),
        }
    }

    async fn query(&self, query: &Query) -> Result<ApiPage, StoreError> {
        let reference = match &query.reference {
            Some(reference) => reference.clone(),
            None => self.master_ref().await?,
        };

        let url = self.search_url(query, &reference)?;
        ApiPage::from_slice(&self.get(url).await?)
    }

    async fn fetch_page(&self, cursor: &str) -> Result<ApiPage, StoreError> {
        if !self.owns_cursor(cursor) {
            return Err(StoreError::InvalidCursor(cursor.to_string()));
        }
        let url = Url::parse(cursor).map_err(|_| StoreError::InvalidCursor(cursor.to_string()))?;
        ApiPage::from_slice(&self.get(url).await?)
    }

    fn owns_cursor(&self, cursor: &str) -> bool {
        match Url::parse(cursor) {
            Ok(url) => {
                url.scheme() == self.endpoint.scheme()
                    && url.host_str() == self.endpoint.host_str()
                    && url.port_or_known_default() == self.endpoint.port_or_known_default()
            }
            Err(_) => false,
        }
    }
}

/// The request URL carries the access token; only its redacted form is kept
fn map_transport_error(error: reqwest::Error) -> StoreError {
    let url = error.url().map(redact);
    let timed_out = error.is_timeout();
    let error = error.without_url();

    let message = match url {
        Some(url) => format!("{} ({})", error, url),
        None => error.to_string(),
    };
    if timed_out {
        StoreError::Transport(format!("timed out: {}", message))
    } else {
        StoreError::Transport(message)
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> StoreError {
    let message = String::from_utf8_lossy(body);
    let message: String = message.chars().take(200).collect();
    if status == StatusCode::NOT_FOUND {
        StoreError::NotFound(message)
    } else {
        StoreError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

/// Strip the access token before logging a URL
fn redact(url: &Url) -> String {
    let mut url = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if k == "access_token" {
                (k.into_owned(), "***".to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();
    if !pairs.is_empty() {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url.to_string()
}
