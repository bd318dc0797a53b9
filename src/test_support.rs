//! Shared fixtures for unit tests

use serde_json::json;

use crate::content::Document;
use crate::store::MemoryStore;

/// A `posts` document with one short content section
pub(crate) fn post(id: &str, uid: &str, date: Option<&str>, title: &str) -> Document {
    Document {
        id: id.to_string(),
        uid: Some(uid.to_string()),
        doc_type: "posts".to_string(),
        first_publication_date: date.map(str::to_string),
        last_publication_date: None,
        data: json!({
            "title": title,
            "subtitle": format!("{} subtitle", title),
            "author": "Joseph Oliveira",
            "banner": {"url": "https://images.example/banner.png"},
            "content": [
                {"heading": "Intro", "body": [
                    {"type": "paragraph", "text": "Lorem ipsum dolor sit amet", "spans": []}
                ]}
            ]
        }),
    }
}

/// Three posts, listed out of date order
pub(crate) fn sample_store() -> MemoryStore {
    MemoryStore::new(vec![
        post("id-b", "second", Some("2021-02-01T10:00:00+0000"), "Second"),
        post("id-a", "first", Some("2021-01-01T10:00:00+0000"), "First"),
        post("id-c", "third", Some("2021-03-01T10:00:00+0000"), "Third"),
    ])
}
