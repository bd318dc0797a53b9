//! Post models built from content API documents

use serde::{Deserialize, Serialize};

use super::document::{null_as_default, ApiPage, Document};
use super::rich_text::RichText;
use crate::store::StoreError;

/// Fields a listing needs from a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtitle: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
}

/// A post as shown on the listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub uid: String,
    pub first_publication_date: Option<String>,
    pub data: SummaryData,
}

impl PostSummary {
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        Ok(Self {
            uid: doc.require_uid()?.to_string(),
            first_publication_date: doc.first_publication_date.clone(),
            data: doc.decode_data()?,
        })
    }
}

/// The page shape the listing consumes: `{ next_page, results }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPage {
    pub next_page: Option<String>,
    pub results: Vec<PostSummary>,
}

impl PostPage {
    /// Project a search response onto the listing shape
    pub fn from_api(page: &ApiPage) -> Result<Self, StoreError> {
        let results = page
            .results
            .iter()
            .map(PostSummary::from_document)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            next_page: page.next_page.clone(),
            results,
        })
    }
}

/// Banner image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Banner {
    pub url: Option<String>,
    pub alt: Option<String>,
}

/// A titled section of a post body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: RichText,
}

/// Fields of a full post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtitle: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub banner: Banner,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentSection>,
}

/// A post as shown on its own page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    /// Document id, the cursor for sibling queries
    pub id: String,
    pub uid: String,
    pub first_publication_date: Option<String>,
    pub last_publication_date: Option<String>,
    pub data: PostData,
}

impl PostDetail {
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        Ok(Self {
            id: doc.id.clone(),
            uid: doc.require_uid()?.to_string(),
            first_publication_date: doc.first_publication_date.clone(),
            last_publication_date: doc.last_publication_date.clone(),
            data: doc.decode_data()?,
        })
    }
}

/// A link to a neighbouring post; both fields are null at the edges
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiblingRef {
    pub uid: Option<String>,
    pub title: Option<String>,
}

impl SiblingRef {
    pub fn none() -> Self {
        Self::default()
    }

    /// Build from the first result of a sibling query, if any
    pub fn from_results(page: &ApiPage) -> Self {
        let Some(doc) = page.results.first() else {
            return Self::none();
        };

        let title = doc
            .data
            .get("title")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Self {
            uid: doc.uid.clone(),
            title,
        }
    }

    pub fn exists(&self) -> bool {
        self.uid.is_some() && self.title.is_some()
    }
}

/// Previous and next posts by publication order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostNavigation {
    pub prev_post: SiblingRef,
    pub next_post: SiblingRef,
}
