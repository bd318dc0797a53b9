//! In-memory content store loaded from a JSON fixture.
//!
//! Fixture layout:
//!
//! ```json
//! {
//!   "documents": [ { "id": "...", "uid": "...", "type": "posts", ... } ],
//!   "refs": { "preview-ref": [ { "id": "...", ... } ] }
//! }
//! ```
//!
//! A bare array of documents is accepted as well. Documents listed under a
//! ref replace the published document with the same id when that ref is
//! queried; new ids are added.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use url::Url;

use super::{ContentStore, Direction, Predicate, Query, StoreError};
use crate::content::{ApiPage, Document};
use crate::helpers::parse_timestamp;

const CURSOR_SCHEME: &str = "memory";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Fixture {
    Full {
        documents: Vec<Document>,
        #[serde(default)]
        refs: HashMap<String, Vec<Document>>,
    },
    Bare(Vec<Document>),
}

/// Content store answering queries from memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Vec<Document>,
    refs: HashMap<String, Vec<Document>>,
}

impl MemoryStore {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            refs: HashMap::new(),
        }
    }

    /// Register draft documents visible under `reference`
    pub fn with_ref(mut self, reference: &str, documents: Vec<Document>) -> Self {
        self.refs.insert(reference.to_string(), documents);
        self
    }

    /// Load a fixture file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read fixtures {}", path.display()))?;
        let fixture: Fixture = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse fixtures {}", path.display()))?;

        let store = match fixture {
            Fixture::Full { documents, refs } => Self { documents, refs },
            Fixture::Bare(documents) => Self::new(documents),
        };
        tracing::info!(
            "Loaded {} documents ({} refs) from {}",
            store.documents.len(),
            store.refs.len(),
            path.display()
        );
        Ok(store)
    }

    /// Documents visible under `reference`
    fn snapshot(&self, reference: Option<&str>) -> Result<Vec<Document>, StoreError> {
        let Some(reference) = reference else {
            return Ok(self.documents.clone());
        };
        let drafts = self
            .refs
            .get(reference)
            .ok_or_else(|| StoreError::NotFound(format!("ref {}", reference)))?;

        let mut documents = self.documents.clone();
        for draft in drafts {
            match documents.iter_mut().find(|d| d.id == draft.id) {
                Some(existing) => *existing = draft.clone(),
                None => documents.push(draft.clone()),
            }
        }
        Ok(documents)
    }

    fn cursor_for(query: &Query) -> Result<String, StoreError> {
        let encoded = serde_json::to_string(query)
            .map_err(|e| StoreError::InvalidCursor(e.to_string()))?;
        let mut url = Url::parse(&format!("{}://search", CURSOR_SCHEME))
            .map_err(|e| StoreError::InvalidCursor(e.to_string()))?;
        url.query_pairs_mut().append_pair("query", &encoded);
        Ok(url.to_string())
    }

    fn query_from_cursor(cursor: &str) -> Result<Query, StoreError> {
        let invalid = || StoreError::InvalidCursor(cursor.to_string());
        let url = Url::parse(cursor).map_err(|_| invalid())?;
        if url.scheme() != CURSOR_SCHEME {
            return Err(invalid());
        }
        let encoded = url
            .query_pairs()
            .find(|(k, _)| k == "query")
            .map(|(_, v)| v.into_owned())
            .ok_or_else(invalid)?;
        serde_json::from_str(&encoded).map_err(|_| invalid())
    }
}

fn field<'a>(doc: &'a Document, path: &str) -> Option<&'a str> {
    match path {
        "document.type" => Some(doc.doc_type.as_str()),
        "document.id" => Some(doc.id.as_str()),
        _ => {
            let rest = path.strip_prefix("my.")?;
            let (doc_type, name) = rest.split_once('.')?;
            if doc_type != doc.doc_type {
                return None;
            }
            if name == "uid" {
                doc.uid.as_deref()
            } else {
                doc.data.get(name)?.as_str()
            }
        }
    }
}

fn matches(doc: &Document, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::At { path, value } => field(doc, path) == Some(value.as_str()),
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn query(&self, query: &Query) -> Result<ApiPage, StoreError> {
        let mut documents: Vec<Document> = self
            .snapshot(query.reference.as_deref())?
            .into_iter()
            .filter(|d| query.predicates.iter().all(|p| matches(d, p)))
            .collect();

        if let Some(ordering) = &query.ordering {
            // Unparseable dates sort as missing
            documents.sort_by_cached_key(|d| {
                d.first_publication_date
                    .as_deref()
                    .and_then(|s| parse_timestamp(s).ok())
            });
            if ordering.direction == Direction::Desc {
                documents.reverse();
            }
        }

        if let Some(after) = &query.after {
            documents = match documents.iter().position(|d| &d.id == after) {
                Some(pos) => documents.split_off(pos + 1),
                None => Vec::new(),
            };
        }

        let total = documents.len();
        let page_size = query.page_size.max(1);
        let page = query.page.max(1);
        let total_pages = total.div_ceil(page_size);

        // Page numbers arrive in client-held cursors
        let offset = (page - 1)
            .checked_mul(page_size)
            .ok_or_else(|| StoreError::InvalidCursor(format!("page {} out of range", page)))?;
        let results: Vec<Document> = documents
            .into_iter()
            .skip(offset)
            .take(page_size)
            .collect();

        let next_page = if page < total_pages {
            Some(Self::cursor_for(&query.clone().page(page + 1))?)
        } else {
            None
        };
        let prev_page = if page > 1 && page <= total_pages {
            Some(Self::cursor_for(&query.clone().page(page - 1))?)
        } else {
            None
        };

        Ok(ApiPage {
            page,
            results_per_page: page_size,
            results_size: results.len(),
            total_results_size: total,
            total_pages,
            next_page,
            prev_page,
            results,
        })
    }

    async fn fetch_page(&self, cursor: &str) -> Result<ApiPage, StoreError> {
        let query = Self::query_from_cursor(cursor)?;
        self.query(&query).await
    }

    fn owns_cursor(&self, cursor: &str) -> bool {
        Self::query_from_cursor(cursor).is_ok()
    }
}
