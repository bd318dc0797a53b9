//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `api.access_token`
pub const ACCESS_TOKEN_ENV: &str = "BLOG_API_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // Date / Time format
    pub locale: String,
    pub timezone: String,
    pub date_format: String,
    pub time_format: String,
    pub date_placeholder: String,

    // Directory
    pub public_dir: String,

    // Content API
    #[serde(default)]
    pub api: ApiConfig,
    /// Serve documents from a local JSON fixture instead of the API
    pub fixtures: Option<PathBuf>,

    // Pages
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub post: PostConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub comments: CommentsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            author: String::new(),
            language: "pt-BR".to_string(),

            locale: "pt_BR".to_string(),
            timezone: "UTC".to_string(),
            date_format: "DD MMM YYYY".to_string(),
            time_format: "HH:mm".to_string(),
            date_placeholder: "—".to_string(),

            public_dir: "public".to_string(),

            api: ApiConfig::default(),
            fixtures: None,

            listing: ListingConfig::default(),
            post: PostConfig::default(),
            preview: PreviewConfig::default(),
            comments: CommentsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.apply_env();
        Ok(config)
    }

    /// Apply overrides taken from the process environment
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
            if !token.is_empty() {
                tracing::debug!("Using access token from {}", ACCESS_TOKEN_ENV);
                self.api.access_token = Some(token);
            }
        }
    }
}

/// Headless content API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Custom type holding blog posts
    pub document_type: String,
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://example.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            document_type: "posts".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Listing page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub page_size: usize,
    /// Upper bound for `?pages=N` on the listing route
    pub max_pages: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: 1,
            max_pages: 50,
        }
    }
}

/// Post page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    pub words_per_minute: usize,
    /// How many posts `generate` renders ahead of time
    pub static_paths: usize,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
            static_paths: 2,
        }
    }
}

/// Preview mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub cookie: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            cookie: "io.prismic.preview".to_string(),
        }
    }
}

/// Utterances comment widget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    /// `owner/repo`; the widget is omitted when unset
    pub repo: Option<String>,
    pub issue_term: String,
    pub theme: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            repo: None,
            issue_term: "pathname".to_string(),
            theme: "github-dark".to_string(),
        }
    }
}
