//! headless-blog: a server-rendered blog front-end over a headless content API
//!
//! Posts live in a Prismic-compatible content store. The listing page
//! paginates them with "load more"; post pages add a reading-time estimate
//! and links to the previous and next posts.

pub mod commands;
pub mod config;
pub mod content;
pub mod detail;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod listing;
pub mod server;
pub mod store;
pub mod templates;

#[cfg(test)]
pub(crate) mod test_support;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::store::{ContentStore, MemoryStore, PrismicClient};

/// The main blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Where posts are read from
    pub store: Arc<dyn ContentStore>,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            let mut config = config::SiteConfig::default();
            config.apply_env();
            config
        };

        let store: Arc<dyn ContentStore> = match &config.fixtures {
            Some(fixtures) => Arc::new(MemoryStore::from_file(base_dir.join(fixtures))?),
            None => Arc::new(PrismicClient::new(&config.api)?),
        };

        Ok(Self::with_store(base_dir, config, store))
    }

    /// Create a Blog over an existing store
    pub fn with_store(
        base_dir: PathBuf,
        config: config::SiteConfig,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        let public_dir = base_dir.join(&config.public_dir);
        Self {
            config,
            base_dir,
            public_dir,
            store,
        }
    }

    /// Interface strings, with overrides from `languages/`
    pub fn i18n(&self) -> Result<i18n::I18n> {
        let mut i18n = i18n::I18n::new(&self.config.language);
        i18n.load_languages(self.base_dir.join("languages"))?;
        Ok(i18n)
    }

    /// Template renderer for this site
    pub fn renderer(&self) -> Result<templates::TemplateRenderer> {
        templates::TemplateRenderer::new(&self.config, &self.i18n()?)
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
