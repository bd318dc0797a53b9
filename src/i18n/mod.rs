//! Internationalization (i18n) of interface strings
//!
//! Built-in languages are `pt-BR` and `en`. A `languages/` directory next to
//! `_config.yml` may add languages or override single keys.

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const FALLBACK: &str = "en";

const BUILTIN: [(&str, &str); 2] = [
    ("pt-BR", include_str!("pt-BR.yml")),
    ("en", include_str!("en.yml")),
];

/// Internationalization handler
#[derive(Debug, Clone)]
pub struct I18n {
    /// Current language
    language: String,
    /// Language data: lang -> key -> translation
    translations: HashMap<String, HashMap<String, String>>,
}

impl I18n {
    /// Create a handler with the built-in languages loaded
    pub fn new(language: &str) -> Self {
        let mut i18n = Self {
            language: language.to_string(),
            translations: HashMap::new(),
        };

        for (lang, source) in BUILTIN {
            match serde_yaml::from_str::<HashMap<String, String>>(source) {
                Ok(data) => i18n.merge(lang, data),
                Err(e) => tracing::warn!("Failed to parse built-in language {}: {}", lang, e),
            }
        }

        i18n
    }

    fn merge(&mut self, lang: &str, data: HashMap<String, String>) {
        self.translations
            .entry(lang.to_string())
            .or_default()
            .extend(data);
    }

    /// Load language files (`<lang>.yml`) from a directory
    pub fn load_languages<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if !path.is_file() || !matches!(ext, Some("yml") | Some("yaml")) {
                continue;
            }

            let Some(lang) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let lang = lang.to_string();

            let content = fs::read_to_string(&path)?;
            match serde_yaml::from_str::<HashMap<String, String>>(&content) {
                Ok(data) => {
                    self.merge(&lang, data);
                    tracing::debug!("Loaded language file: {:?}", path);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse language file {:?}: {}", path, e);
                }
            }
        }

        Ok(())
    }

    /// Get the current language
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Get a translation by key
    pub fn get(&self, key: &str) -> String {
        self.get_for_lang(&self.language, key)
    }

    /// Get a translation for a specific language
    pub fn get_for_lang(&self, lang: &str, key: &str) -> String {
        [lang, FALLBACK]
            .iter()
            .find_map(|l| self.translations.get(*l)?.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Check if a translation exists in the current language
    pub fn has(&self, key: &str) -> bool {
        self.translations
            .get(&self.language)
            .is_some_and(|data| data.contains_key(key))
    }

    /// All translations for the current language, English filling the gaps
    pub fn get_all_translations(&self) -> HashMap<String, String> {
        let mut result = self
            .translations
            .get(FALLBACK)
            .cloned()
            .unwrap_or_default();
        if let Some(data) = self.translations.get(&self.language) {
            result.extend(data.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        result
    }
}
