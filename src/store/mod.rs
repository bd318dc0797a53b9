//! Content store access
//!
//! [`ContentStore`] is the seam between page assembly and the headless API.
//! [`PrismicClient`] talks to a live repository over HTTP; [`MemoryStore`]
//! answers the same queries from a local fixture file.

mod memory;
mod prismic;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::{ApiPage, Document};

pub use memory::MemoryStore;
pub use prismic::PrismicClient;

/// Errors raised while talking to the content store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Content API answered {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed content API response: {0}")]
    DataShape(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Invalid page cursor: {0}")]
    InvalidCursor(String),
}

impl StoreError {
    /// Whether retrying the same request can succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Transport(_) => true,
            StoreError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// A query predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// `path` equals `value`, e.g. `document.type` = `posts`
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: &str, value: &str) -> Self {
        Predicate::At {
            path: path.to_string(),
            value: value.to_string(),
        }
    }

    /// Match documents of one custom type
    pub fn document_type(doc_type: &str) -> Self {
        Self::at("document.type", doc_type)
    }

    /// Render in the API's query language
    pub fn to_query_string(&self) -> String {
        match self {
            Predicate::At { path, value } => format!(
                "[at({},\"{}\")]",
                path,
                value.replace('\\', "\\\\").replace('"', "\\\"")
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Asc,
    Desc,
}

/// Sort order of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    pub direction: Direction,
}

impl Ordering {
    /// Oldest first
    pub fn published_asc() -> Self {
        Self {
            direction: Direction::Asc,
        }
    }

    /// Newest first
    pub fn published_desc() -> Self {
        Self {
            direction: Direction::Desc,
        }
    }

    pub fn to_query_string(&self) -> String {
        match self.direction {
            Direction::Asc => "[document.first_publication_date]".to_string(),
            Direction::Desc => "[document.first_publication_date desc]".to_string(),
        }
    }
}

/// A search over the document collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub predicates: Vec<Predicate>,
    pub page_size: usize,
    pub page: usize,
    pub ordering: Option<Ordering>,
    /// Only return documents after this document id in the ordering
    pub after: Option<String>,
    /// Content reference override, e.g. a preview ref
    pub reference: Option<String>,
}

impl Query {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self {
            predicates,
            page_size: 20,
            page: 1,
            ordering: None,
            after: None,
            reference: None,
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn ordering(mut self, ordering: Ordering) -> Self {
        self.ordering = Some(ordering);
        self
    }

    pub fn after(mut self, id: &str) -> Self {
        self.after = Some(id.to_string());
        self
    }

    pub fn reference(mut self, reference: Option<&str>) -> Self {
        self.reference = reference.map(str::to_string);
        self
    }
}

/// Read access to a headless content repository
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Run a search
    async fn query(&self, query: &Query) -> Result<ApiPage, StoreError>;

    /// Follow a `next_page` cursor returned by an earlier search
    async fn fetch_page(&self, cursor: &str) -> Result<ApiPage, StoreError>;

    /// Whether `cursor` was issued by this store
    fn owns_cursor(&self, cursor: &str) -> bool;

    /// Pin `reference` for a series of related queries.
    ///
    /// Stores that look up the published ref per query return it here so
    /// callers can reuse it; others pass the override through.
    async fn resolve_ref(&self, reference: Option<&str>) -> Result<Option<String>, StoreError> {
        Ok(reference.map(str::to_string))
    }

    /// Fetch one document of `doc_type` by uid
    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        reference: Option<&str>,
    ) -> Result<Document, StoreError> {
        let query = Query::new(vec![
            Predicate::document_type(doc_type),
            Predicate::at(&format!("my.{}.uid", doc_type), uid),
        ])
        .page_size(1)
        .reference(reference);

        first_result(self.query(&query).await?, uid)
    }

    /// Fetch one document by id
    async fn get_by_id(&self, id: &str, reference: Option<&str>) -> Result<Document, StoreError> {
        let query = Query::new(vec![Predicate::at("document.id", id)])
            .page_size(1)
            .reference(reference);

        first_result(self.query(&query).await?, id)
    }
}

fn first_result(page: ApiPage, key: &str) -> Result<Document, StoreError> {
    page.results
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::NotFound(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_query_string() {
        assert_eq!(
            Predicate::document_type("posts").to_query_string(),
            r#"[at(document.type,"posts")]"#
        );
        assert_eq!(
            Predicate::at("my.posts.uid", r#"a"b"#).to_query_string(),
            r#"[at(my.posts.uid,"a\"b")]"#
        );
    }

    #[test]
    fn test_ordering_query_string() {
        assert_eq!(
            Ordering::published_desc().to_query_string(),
            "[document.first_publication_date desc]"
        );
        assert_eq!(
            Ordering::published_asc().to_query_string(),
            "[document.first_publication_date]"
        );
    }

    #[test]
    fn test_query_builder_clamps() {
        let query = Query::new(vec![]).page_size(0).page(0);
        assert_eq!(query.page_size, 1);
        assert_eq!(query.page, 1);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(StoreError::Transport("reset".into()).is_retryable());
        assert!(StoreError::Status {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(!StoreError::Status {
            status: 404,
            message: String::new()
        }
        .is_retryable());
        assert!(!StoreError::DataShape("x".into()).is_retryable());
    }
}
