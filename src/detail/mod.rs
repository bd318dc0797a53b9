//! Post page assembly
//!
//! Resolves a post by slug, estimates its reading time and looks up the
//! neighbouring posts for the previous/next links.

use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::{reading_time, PostDetail, PostNavigation, ReadingTime, SiblingRef};
use crate::store::{ContentStore, Ordering, Predicate, Query, StoreError};

/// Everything the post template needs
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post: PostDetail,
    pub reading_time: ReadingTime,
    pub navigation: PostNavigation,
    /// Rendered from a preview ref
    pub preview: bool,
}

/// Render state of a post route
#[derive(Debug, Clone)]
pub enum DetailState {
    /// The route has not been resolved yet
    Loading,
    Ready(Box<PostView>),
    NotFound,
}

impl DetailState {
    pub fn is_ready(&self) -> bool {
        matches!(self, DetailState::Ready(_))
    }
}

/// Resolve the post at `slug`. `reference` selects draft content in preview mode.
pub async fn assemble(
    store: &dyn ContentStore,
    config: &SiteConfig,
    slug: &str,
    reference: Option<&str>,
) -> Result<DetailState, StoreError> {
    let doc_type = &config.api.document_type;
    let pinned = store.resolve_ref(reference).await?;
    let pinned = pinned.as_deref();

    let doc = match store.get_by_uid(doc_type, slug, pinned).await {
        Ok(doc) => doc,
        Err(StoreError::NotFound(what)) => {
            tracing::debug!("Post {:?} not found ({})", slug, what);
            return Ok(DetailState::NotFound);
        }
        Err(e) => return Err(e),
    };

    let post = PostDetail::from_document(&doc)?;
    let reading_time = reading_time(&post.data.content, config.post.words_per_minute);
    let navigation = resolve_siblings(store, doc_type, &post.id, pinned).await?;

    tracing::debug!(
        "Assembled {:?}: {} words, {} min",
        post.uid,
        reading_time.words,
        reading_time.minutes
    );

    Ok(DetailState::Ready(Box::new(PostView {
        post,
        reading_time,
        navigation,
        preview: reference.is_some(),
    })))
}

/// Find the posts published right before and right after document `id`.
///
/// Both queries run concurrently.
pub async fn resolve_siblings(
    store: &dyn ContentStore,
    doc_type: &str,
    id: &str,
    reference: Option<&str>,
) -> Result<PostNavigation, StoreError> {
    let base = Query::new(vec![Predicate::document_type(doc_type)])
        .page_size(1)
        .after(id)
        .reference(reference);
    let prev_query = base.clone().ordering(Ordering::published_desc());
    let next_query = base.ordering(Ordering::published_asc());

    let (prev, next) = tokio::try_join!(store.query(&prev_query), store.query(&next_query))?;

    Ok(PostNavigation {
        prev_post: SiblingRef::from_results(&prev),
        next_post: SiblingRef::from_results(&next),
    })
}

/// Slugs of the newest posts, rendered ahead of time by the generator
pub async fn static_paths(
    store: &dyn ContentStore,
    config: &SiteConfig,
) -> Result<Vec<String>, StoreError> {
    if config.post.static_paths == 0 {
        return Ok(Vec::new());
    }

    let query = Query::new(vec![Predicate::document_type(&config.api.document_type)])
        .page_size(config.post.static_paths)
        .ordering(Ordering::published_desc());

    store
        .query(&query)
        .await?
        .results
        .iter()
        .map(|doc| doc.require_uid().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ApiPage;
    use crate::store::MemoryStore;
    use crate::test_support::{post, sample_store};
    use async_trait::async_trait;
    use std::sync::Mutex;

    async fn ready(store: &MemoryStore, slug: &str, reference: Option<&str>) -> PostView {
        match assemble(store, &SiteConfig::default(), slug, reference)
            .await
            .unwrap()
        {
            DetailState::Ready(view) => *view,
            other => panic!("expected a ready post, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_earliest_post_has_only_next() {
        let view = ready(&sample_store(), "first", None).await;
        assert_eq!(view.navigation.prev_post, SiblingRef::none());
        assert_eq!(view.navigation.next_post.uid.as_deref(), Some("second"));
        assert_eq!(view.navigation.next_post.title.as_deref(), Some("Second"));
    }

    #[tokio::test]
    async fn test_latest_post_has_only_previous() {
        let view = ready(&sample_store(), "third", None).await;
        assert_eq!(view.navigation.prev_post.uid.as_deref(), Some("second"));
        assert_eq!(view.navigation.next_post, SiblingRef::none());
    }

    #[tokio::test]
    async fn test_middle_post_has_both() {
        let view = ready(&sample_store(), "second", None).await;
        assert_eq!(view.navigation.prev_post.uid.as_deref(), Some("first"));
        assert_eq!(view.navigation.next_post.uid.as_deref(), Some("third"));
    }

    #[tokio::test]
    async fn test_single_post_has_no_siblings() {
        let store = MemoryStore::new(vec![post("id-a", "only", None, "Only")]);
        let view = ready(&store, "only", None).await;
        assert!(!view.navigation.prev_post.exists());
        assert!(!view.navigation.next_post.exists());
    }

    #[tokio::test]
    async fn test_reading_time_is_computed() {
        // "Intro" + "Lorem ipsum dolor sit amet"
        let view = ready(&sample_store(), "first", None).await;
        assert_eq!(view.reading_time.words, 6);
        assert_eq!(view.reading_time.minutes, 1);
        assert!(!view.preview);
    }

    #[tokio::test]
    async fn test_unknown_slug_is_not_found() {
        let state = assemble(&sample_store(), &SiteConfig::default(), "nope", None)
            .await
            .unwrap();
        assert!(matches!(state, DetailState::NotFound));
        assert!(!state.is_ready());
    }

    #[tokio::test]
    async fn test_preview_reference_is_passed_through() {
        let draft = post("id-a", "first", Some("2021-01-01T10:00:00+0000"), "Draft title");
        let store = sample_store().with_ref("preview-ref", vec![draft]);

        let view = ready(&store, "first", Some("preview-ref")).await;
        assert!(view.preview);
        assert_eq!(view.post.data.title, "Draft title");
    }

    #[tokio::test]
    async fn test_malformed_post_is_an_error() {
        let mut broken = post("id-x", "broken", None, "Broken");
        broken.data["content"] = serde_json::json!("not sections");
        let store = MemoryStore::new(vec![broken]);

        let err = assemble(&store, &SiteConfig::default(), "broken", None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DataShape(_)));
    }

    /// Records the ref of every query and pins a fixed published ref
    struct RefLog {
        inner: MemoryStore,
        resolved: Mutex<usize>,
        seen: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl ContentStore for RefLog {
        async fn resolve_ref(
            &self,
            reference: Option<&str>,
        ) -> Result<Option<String>, StoreError> {
            *self.resolved.lock().unwrap() += 1;
            Ok(Some(reference.unwrap_or("master-1").to_string()))
        }

        async fn query(&self, query: &Query) -> Result<ApiPage, StoreError> {
            self.seen.lock().unwrap().push(query.reference.clone());
            // The memory store only knows the published snapshot
            self.inner.query(&query.clone().reference(None)).await
        }

        async fn fetch_page(&self, cursor: &str) -> Result<ApiPage, StoreError> {
            self.inner.fetch_page(cursor).await
        }

        fn owns_cursor(&self, cursor: &str) -> bool {
            self.inner.owns_cursor(cursor)
        }
    }

    #[tokio::test]
    async fn test_ref_is_resolved_once_per_post() {
        let store = RefLog {
            inner: sample_store(),
            resolved: Mutex::new(0),
            seen: Mutex::new(Vec::new()),
        };

        let state = assemble(&store, &SiteConfig::default(), "second", None)
            .await
            .unwrap();
        match state {
            DetailState::Ready(view) => assert!(!view.preview),
            other => panic!("expected a ready post, got {:?}", other),
        }

        assert_eq!(*store.resolved.lock().unwrap(), 1);
        let seen = store.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|r| r.as_deref() == Some("master-1")));
    }

    #[tokio::test]
    async fn test_static_paths() {
        let mut config = SiteConfig::default();
        let slugs = static_paths(&sample_store(), &config).await.unwrap();
        assert_eq!(slugs, ["third", "second"]);

        config.post.static_paths = 0;
        assert!(static_paths(&sample_store(), &config).await.unwrap().is_empty());
    }
}
