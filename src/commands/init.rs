//! Initialize a new blog

use anyhow::Result;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# Blog configuration

# Site
title: spacetraveling
description: ''
author: ''
language: pt-BR

# Date / Time format (Moment.js tokens)
locale: pt_BR
timezone: UTC
date_format: DD MMM YYYY
time_format: HH:mm
date_placeholder: "—"

# Directory
public_dir: public

# Content API
api:
  endpoint: https://your-repository.cdn.prismic.io/api/v2
  # access_token may also be set through BLOG_API_TOKEN
  access_token:
  document_type: posts
  timeout_secs: 10

# Serve posts from a local JSON file instead of the API
# fixtures: fixtures/posts.json

# Listing
listing:
  page_size: 1
  max_pages: 50

# Post pages
post:
  words_per_minute: 200
  static_paths: 2

# Preview mode
preview:
  cookie: io.prismic.preview

# Comments (utterances), shown when repo is set
comments:
  repo:
  issue_term: pathname
  theme: github-dark
"#;

/// Initialize a new blog in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("languages"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        tracing::warn!("{:?} already exists, leaving it untouched", config_path);
        return Ok(());
    }

    fs::write(&config_path, DEFAULT_CONFIG)?;
    tracing::info!("Created: {:?}", config_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("blog");
        init_site(&target).unwrap();

        let config = SiteConfig::load(target.join("_config.yml")).unwrap();
        assert_eq!(config.title, "spacetraveling");
        assert_eq!(config.listing.page_size, 1);
        assert_eq!(config.post.static_paths, 2);
        assert!(config.comments.repo.is_none());
        assert!(config.fixtures.is_none());
        assert!(target.join("languages").is_dir());
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_config.yml"), "title: Mine\n").unwrap();
        init_site(dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join("_config.yml")).unwrap();
        assert_eq!(content, "title: Mine\n");
    }
}
