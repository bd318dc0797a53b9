//! HTTP server rendering pages per request

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::content::PostPage;
use crate::detail::{self, DetailState};
use crate::helpers::post_path;
use crate::listing::ListingSession;
use crate::store::StoreError;
use crate::templates::{TemplateRenderer, STYLESHEET};
use crate::Blog;

/// Server state, shared read-only by all requests
pub struct AppState {
    blog: Blog,
    renderer: TemplateRenderer,
}

impl AppState {
    pub fn new(blog: Blog) -> Result<Self> {
        let renderer = blog.renderer()?;
        Ok(Self { blog, renderer })
    }

    /// Ref of the draft content to show, from the preview cookie
    fn preview_ref(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.blog.config.preview.cookie)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    pages: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CursorParams {
    cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewParams {
    token: Option<String>,
    #[serde(rename = "documentId")]
    document_id: Option<String>,
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(listing_handler))
        .route("/post/:slug", get(post_handler))
        .route("/api/posts", get(posts_api_handler))
        .route("/api/preview", get(preview_handler))
        .route("/api/exit-preview", get(exit_preview_handler))
        .route("/assets/style.css", get(stylesheet_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState::new(blog.clone())?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Listing page; `?pages=N` replays N-1 "load more" steps
async fn listing_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListingParams>,
    jar: CookieJar,
) -> Response {
    let blog = &state.blog;
    let pages = params
        .pages
        .unwrap_or(1)
        .clamp(1, blog.config.listing.max_pages.max(1));

    let mut session = match ListingSession::first_page(blog.store.as_ref(), &blog.config).await {
        Ok(session) => session,
        Err(e) => return store_failure(&state, e),
    };

    // A failed step is recorded in the session and shown on the page
    if let Err(e) = session.load_pages(blog.store.as_ref(), pages).await {
        tracing::warn!("Listing stopped after {} pages: {}", session.pages_loaded(), e);
    }

    let preview = state.preview_ref(&jar).is_some();
    html_response(StatusCode::OK, state.renderer.render_listing(&session, preview))
}

async fn post_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    jar: CookieJar,
) -> Response {
    let blog = &state.blog;
    let reference = state.preview_ref(&jar);

    match detail::assemble(
        blog.store.as_ref(),
        &blog.config,
        &slug,
        reference.as_deref(),
    )
    .await
    {
        Ok(page) => {
            let status = match page {
                DetailState::NotFound => StatusCode::NOT_FOUND,
                _ => StatusCode::OK,
            };
            html_response(status, state.renderer.render_detail(&page))
        }
        Err(e) => store_failure(&state, e),
    }
}

/// One page of summaries as JSON, the "load more" contract
async fn posts_api_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CursorParams>,
) -> Response {
    let store = state.blog.store.as_ref();

    let result = match params.cursor.as_deref() {
        None => ListingSession::first_page(store, &state.blog.config)
            .await
            .map(|session| session.to_page()),
        Some(cursor) if !store.owns_cursor(cursor) => {
            tracing::warn!("Rejected foreign cursor {:?}", cursor);
            return json_error(StatusCode::BAD_REQUEST, "cursor does not belong to this site");
        }
        Some(cursor) => match store.fetch_page(cursor).await {
            Ok(page) => PostPage::from_api(&page),
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(page) => Json(page).into_response(),
        Err(e) => {
            tracing::error!("Failed to load posts: {}", e);
            json_error(StatusCode::BAD_GATEWAY, "failed to load posts")
        }
    }
}

/// Enter preview mode and redirect to the previewed document
async fn preview_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PreviewParams>,
    jar: CookieJar,
) -> Response {
    let Some(token) = params.token.filter(|t| !t.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "missing preview token").into_response();
    };

    let mut location = "/".to_string();
    if let Some(id) = params.document_id.as_deref() {
        match state.blog.store.get_by_id(id, Some(&token)).await {
            Ok(doc) => match doc.uid.as_deref() {
                Some(uid) => location = post_path(uid),
                None => tracing::debug!("Previewed document {} has no uid", id),
            },
            Err(e) => tracing::warn!("Preview of {} could not be resolved: {}", id, e),
        }
    }

    let cookie = Cookie::build((state.blog.config.preview.cookie.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    tracing::info!("Preview mode on, redirecting to {}", location);
    (jar.add(cookie), Redirect::temporary(&location)).into_response()
}

async fn exit_preview_handler(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let cookie = Cookie::build(state.blog.config.preview.cookie.clone()).path("/");
    (jar.remove(cookie), Redirect::temporary("/")).into_response()
}

async fn stylesheet_handler() -> Response {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET).into_response()
}

async fn fallback_handler(State(state): State<Arc<AppState>>) -> Response {
    html_response(StatusCode::NOT_FOUND, state.renderer.render_not_found())
}

fn html_response(status: StatusCode, rendered: Result<String>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Template rendering failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

fn store_failure(state: &AppState, error: StoreError) -> Response {
    tracing::error!("Content store request failed: {}", error);
    let status = if error.is_retryable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::BAD_GATEWAY
    };
    html_response(status, state.renderer.render_not_found())
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
