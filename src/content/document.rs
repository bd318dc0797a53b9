//! Wire shapes of the content API

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::store::StoreError;

/// A document as returned by the content API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    /// Type-specific fields, decoded on demand with [`Document::decode_data`]
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Document {
    /// Decode the `data` object into a typed shape
    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.data.clone()).map_err(|e| {
            StoreError::DataShape(format!(
                "document {} of type {:?} has unexpected data: {}",
                self.id, self.doc_type, e
            ))
        })
    }

    /// The document uid, which routes require
    pub fn require_uid(&self) -> Result<&str, StoreError> {
        self.uid.as_deref().ok_or_else(|| {
            StoreError::DataShape(format!("document {} has no uid", self.id))
        })
    }
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiPage {
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub results_per_page: usize,
    #[serde(default)]
    pub results_size: usize,
    #[serde(default)]
    pub total_results_size: usize,
    #[serde(default)]
    pub total_pages: usize,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub prev_page: Option<String>,
    pub results: Vec<Document>,
}

impl ApiPage {
    /// Decode a raw response body
    pub fn from_slice(body: &[u8]) -> Result<Self, StoreError> {
        serde_json::from_slice(body)
            .map_err(|e| StoreError::DataShape(format!("invalid search response: {}", e)))
    }
}

/// Deserialize `null` as the type's default value
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
