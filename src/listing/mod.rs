//! Listing session
//!
//! Holds the posts shown on the listing page and the cursor to the next page.
//! "Load more" appends the next page after the posts already shown; the list
//! is never reordered and the action is a no-op once the cursor is null.

use thiserror::Error;

use crate::config::SiteConfig;
use crate::content::{PostPage, PostSummary};
use crate::store::{ContentStore, Ordering, Predicate, Query, StoreError};

#[derive(Error, Debug)]
pub enum ListingError {
    #[error("Failed to load page {cursor}: {source}")]
    Fetch {
        cursor: String,
        #[source]
        source: StoreError,
    },
}

/// Result of a "load more" request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page arrived; holds how many posts were appended
    Appended(usize),
    /// No next page exists
    Exhausted,
    /// Another load is still in flight
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    /// The last load failed; the cursor was kept so it can be retried
    Failed { message: String, retryable: bool },
}

/// A load in flight, returned by [`ListingSession::begin_load`]
#[derive(Debug)]
#[must_use]
pub struct LoadTicket {
    cursor: String,
}

impl LoadTicket {
    pub fn cursor(&self) -> &str {
        &self.cursor
    }
}

#[derive(Debug, Clone)]
pub struct ListingSession {
    next_page: Option<String>,
    posts: Vec<PostSummary>,
    pages_loaded: usize,
    state: LoadState,
}

impl ListingSession {
    /// Start a session from the first page
    pub fn new(page: PostPage) -> Self {
        Self {
            next_page: page.next_page,
            posts: page.results,
            pages_loaded: 1,
            state: LoadState::Idle,
        }
    }

    /// Query the first page of posts, newest first
    pub async fn first_page(
        store: &dyn ContentStore,
        config: &SiteConfig,
    ) -> Result<Self, StoreError> {
        let query = Query::new(vec![Predicate::document_type(&config.api.document_type)])
            .page_size(config.listing.page_size)
            .ordering(Ordering::published_desc());

        let page = PostPage::from_api(&store.query(&query).await?)?;
        tracing::debug!(
            "First listing page: {} posts, more: {}",
            page.results.len(),
            page.next_page.is_some()
        );
        Ok(Self::new(page))
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Message of the last failed load, if it has not been retried yet
    pub fn last_error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Whether the "load more" action is enabled
    pub fn can_load_more(&self) -> bool {
        self.next_page.is_some() && self.state != LoadState::Loading
    }

    /// Mark a load as started and hand out the cursor to fetch.
    ///
    /// Returns `None` when there is no next page or a load is in flight.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if !self.can_load_more() {
            return None;
        }
        let cursor = self.next_page.clone()?;
        self.state = LoadState::Loading;
        Some(LoadTicket { cursor })
    }

    /// Apply the result of the fetch started with `ticket`
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<PostPage, StoreError>,
    ) -> Result<LoadOutcome, ListingError> {
        match result {
            Ok(page) => {
                let count = page.results.len();
                for post in &page.results {
                    if self.posts.iter().any(|p| p.uid == post.uid) {
                        tracing::warn!("Page {} repeats post {:?}", ticket.cursor, post.uid);
                    }
                }
                self.posts.extend(page.results);
                self.next_page = page.next_page;
                self.pages_loaded += 1;
                self.state = LoadState::Idle;
                Ok(LoadOutcome::Appended(count))
            }
            Err(source) => {
                tracing::warn!("Loading {} failed: {}", ticket.cursor, source);
                self.state = LoadState::Failed {
                    message: source.to_string(),
                    retryable: source.is_retryable(),
                };
                Err(ListingError::Fetch {
                    cursor: ticket.cursor,
                    source,
                })
            }
        }
    }

    /// Fetch the next page and append it
    pub async fn load_more(
        &mut self,
        store: &dyn ContentStore,
    ) -> Result<LoadOutcome, ListingError> {
        let Some(ticket) = self.begin_load() else {
            return Ok(if self.next_page.is_none() {
                LoadOutcome::Exhausted
            } else {
                LoadOutcome::Pending
            });
        };

        let result = match store.fetch_page(ticket.cursor()).await {
            Ok(page) => PostPage::from_api(&page),
            Err(e) => Err(e),
        };
        self.complete_load(ticket, result)
    }

    /// Load pages until `pages` pages are shown or the cursor runs out
    pub async fn load_pages(
        &mut self,
        store: &dyn ContentStore,
        pages: usize,
    ) -> Result<(), ListingError> {
        while self.pages_loaded < pages {
            match self.load_more(store).await? {
                LoadOutcome::Appended(_) => {}
                LoadOutcome::Exhausted | LoadOutcome::Pending => break,
            }
        }
        Ok(())
    }

    /// The accumulated list in the `{ next_page, results }` shape
    pub fn to_page(&self) -> PostPage {
        PostPage {
            next_page: self.next_page.clone(),
            results: self.posts.clone(),
        }
    }
}
