//! Generator module - writes a static snapshot of the site using built-in Tera templates

use anyhow::{Context, Result};
use std::fs;

use crate::detail::{self, DetailState};
use crate::helpers::encode_segment;
use crate::listing::ListingSession;
use crate::templates::{TemplateRenderer, STYLESHEET};
use crate::Blog;

/// Static site generator using Tera templates
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            renderer: blog.renderer()?,
        })
    }

    /// Generate the entire site, returning the number of files written
    pub async fn generate(&self) -> Result<usize> {
        fs::create_dir_all(&self.blog.public_dir)?;

        let mut written = 0;

        self.write_file("assets/style.css", STYLESHEET)?;
        written += 1;

        self.generate_index().await?;
        written += 1;

        written += self.generate_post_pages().await?;

        // Shell served for posts that were not rendered ahead of time
        let fallback = self.renderer.render_detail(&DetailState::Loading)?;
        self.write_file("post/fallback.html", &fallback)?;
        written += 1;

        self.write_file("404.html", &self.renderer.render_not_found()?)?;
        written += 1;

        Ok(written)
    }

    /// First listing page
    async fn generate_index(&self) -> Result<()> {
        let session = ListingSession::first_page(self.blog.store.as_ref(), &self.blog.config)
            .await
            .context("failed to load the first listing page")?;

        let html = self.renderer.render_listing(&session, false)?;
        self.write_file("index.html", &html)
    }

    /// Pages for the newest posts
    async fn generate_post_pages(&self) -> Result<usize> {
        let store = self.blog.store.as_ref();
        let slugs = detail::static_paths(store, &self.blog.config)
            .await
            .context("failed to list static post paths")?;

        let mut count = 0;
        for slug in slugs {
            let dir = encode_segment(&slug);
            if dir == "." || dir == ".." {
                tracing::warn!("Skipping post with unusable slug {:?}", slug);
                continue;
            }

            let state = detail::assemble(store, &self.blog.config, &slug, None)
                .await
                .with_context(|| format!("failed to assemble post {:?}", slug))?;
            if !state.is_ready() {
                tracing::warn!("Post {:?} disappeared during generation", slug);
                continue;
            }

            let html = self.renderer.render_detail(&state)?;
            self.write_file(&format!("post/{}/index.html", dir), &html)?;
            tracing::debug!("Generated: post/{}/index.html", dir);
            count += 1;
        }

        Ok(count)
    }

    fn write_file(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.blog.public_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))
    }
}
