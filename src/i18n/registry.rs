//! Language registry: Single source of truth for all supported languages.
//!
//! This module provides a centralized registry of every language the gateway
//! accepts. It uses a singleton pattern with `OnceLock` to ensure thread-safe
//! initialization and is immutable after first access.

use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "es", "fr")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Spanish", "French")
    pub name: &'static str,

    /// Native name of the language (e.g., "English", "Español", "Français")
    pub native_name: &'static str,

    /// Language code understood by the multilingual fallback model (e.g., "es_XX")
    pub model_code: &'static str,

    /// Whether this language is enabled for use
    pub enabled: bool,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all enabled languages, in registry order.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Check if a language code is known and enabled.
    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }

    /// Human-readable name for a code.
    ///
    /// Unknown codes are returned unchanged so callers never have to handle
    /// a missing name.
    pub fn display_name(&self, code: &str) -> String {
        self.get_by_code(code)
            .map(|lang| lang.name.to_string())
            .unwrap_or_else(|| code.to_string())
    }
}

/// Default language configurations.
///
/// Model codes follow the mBART-50 language tag convention.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            model_code: "en_XX",
            enabled: true,
        },
        LanguageConfig {
            code: "es",
            name: "Spanish",
            native_name: "Español",
            model_code: "es_XX",
            enabled: true,
        },
        LanguageConfig {
            code: "fr",
            name: "French",
            native_name: "Français",
            model_code: "fr_XX",
            enabled: true,
        },
        LanguageConfig {
            code: "de",
            name: "German",
            native_name: "Deutsch",
            model_code: "de_DE",
            enabled: true,
        },
        LanguageConfig {
            code: "it",
            name: "Italian",
            native_name: "Italiano",
            model_code: "it_IT",
            enabled: true,
        },
        LanguageConfig {
            code: "pt",
            name: "Portuguese",
            native_name: "Português",
            model_code: "pt_XX",
            enabled: true,
        },
        LanguageConfig {
            code: "nl",
            name: "Dutch",
            native_name: "Nederlands",
            model_code: "nl_XX",
            enabled: true,
        },
        LanguageConfig {
            code: "ru",
            name: "Russian",
            native_name: "Русский",
            model_code: "ru_RU",
            enabled: true,
        },
        LanguageConfig {
            code: "ja",
            name: "Japanese",
            native_name: "日本語",
            model_code: "ja_XX",
            enabled: true,
        },
        LanguageConfig {
            code: "zh",
            name: "Chinese",
            native_name: "中文",
            model_code: "zh_CN",
            enabled: true,
        },
        LanguageConfig {
            code: "ko",
            name: "Korean",
            native_name: "한국어",
            model_code: "ko_KR",
            enabled: true,
        },
        LanguageConfig {
            code: "ar",
            name: "Arabic",
            native_name: "العربية",
            model_code: "ar_AR",
            enabled: true,
        },
        LanguageConfig {
            code: "hi",
            name: "Hindi",
            native_name: "हिन्दी",
            model_code: "hi_IN",
            enabled: true,
        },
        LanguageConfig {
            code: "tr",
            name: "Turkish",
            native_name: "Türkçe",
            model_code: "tr_TR",
            enabled: true,
        },
    ]
}
