//! List published posts

use anyhow::Result;
use std::io::Write;

use crate::content::PostSummary;
use crate::helpers::DateFormatter;
use crate::listing::{ListingSession, LoadOutcome};
use crate::Blog;

/// Walk every listing page and print one line per post
pub async fn run(blog: &Blog) -> Result<()> {
    let posts = collect(blog).await?;
    let dates = DateFormatter::from_config(&blog.config);

    let mut out = std::io::stdout().lock();
    writeln!(out, "Posts ({}):", posts.len())?;
    for post in &posts {
        writeln!(out, "{}", line(&dates, &blog.config.date_placeholder, post))?;
    }

    Ok(())
}

/// All posts, newest first, following the pagination cursor to the end
pub async fn collect(blog: &Blog) -> Result<Vec<PostSummary>> {
    let store = blog.store.as_ref();
    let mut session = ListingSession::first_page(store, &blog.config).await?;

    while let LoadOutcome::Appended(count) = session.load_more(store).await? {
        tracing::debug!("Page {}: {} posts", session.pages_loaded(), count);
    }

    Ok(session.posts().to_vec())
}

fn line(dates: &DateFormatter, placeholder: &str, post: &PostSummary) -> String {
    format!(
        "  {} - {} [{}]",
        dates.format_or_placeholder(post.first_publication_date.as_deref(), placeholder),
        post.data.title,
        post.uid
    )
}
