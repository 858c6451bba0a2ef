//! Language type: validated language representation.
//!
//! A `Language` can only be built from a code the registry supports, so code
//! holding one never has to re-check support.

use crate::error::{TranslationError, ValidationError};
use crate::i18n::{LanguageConfig, LanguageRegistry};
use serde::Serialize;

/// A validated language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "es")
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };

    pub const SPANISH: Language = Language { code: "es" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is known and enabled
    /// * `Err(TranslationError::Validation(UnsupportedLanguage))` otherwise
    pub fn from_code(code: &str) -> Result<Language, TranslationError> {
        match LanguageRegistry::get().get_by_code(code) {
            Some(config) if config.enabled => Ok(Language {
                code: config.code, // Use the static str from the registry
            }),
            _ => Err(ValidationError::UnsupportedLanguage(code.to_string()).into()),
        }
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is missing from the registry, which cannot happen
    /// for a Language built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// Get the English name of the language.
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Code understood by the multilingual model (e.g., "es_XX").
    pub fn model_code(&self) -> &'static str {
        self.config().model_code
    }
}

/// Public description of a supported language, as served to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
}

impl From<&LanguageConfig> for LanguageInfo {
    fn from(config: &LanguageConfig) -> Self {
        Self {
            code: config.code,
            name: config.name,
            native_name: config.native_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Constant Tests ====================

    #[test]
    fn test_english_constant() {
        let english = Language::ENGLISH;
        assert_eq!(english.code(), "en");
        assert_eq!(english.name(), "English");
        assert_eq!(english.model_code(), "en_XX");
    }

    #[test]
    fn test_spanish_constant() {
        let spanish = Language::SPANISH;
        assert_eq!(spanish.code(), "es");
        assert_eq!(spanish.name(), "Spanish");
        assert_eq!(spanish.config().native_name, "Español");
    }

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_french() {
        let language = Language::from_code("fr").expect("Should succeed");
        assert_eq!(language.code(), "fr");
        assert_eq!(language.name(), "French");
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("xx");
        assert_eq!(
            result.unwrap_err(),
            TranslationError::Validation(ValidationError::UnsupportedLanguage("xx".to_string()))
        );
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_language_equality() {
        let lang = Language::from_code("en").unwrap();
        assert_eq!(lang, Language::ENGLISH);
        assert_ne!(lang, Language::SPANISH);
    }

    // ==================== LanguageInfo Tests ====================

    #[test]
    fn test_language_info_serializes_camel_case() {
        let info = LanguageInfo::from(Language::SPANISH.config());
        let json = serde_json::to_value(&info).expect("Should serialize");

        assert_eq!(json["code"], "es");
        assert_eq!(json["name"], "Spanish");
        assert_eq!(json["nativeName"], "Español");
    }
}
