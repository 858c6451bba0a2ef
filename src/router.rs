//! Model routing: which upstream model translates into which language.
//!
//! English-source requests whose target has a dedicated model get it;
//! everything else goes to the multilingual default model, which needs
//! explicit language hints.

use std::collections::HashMap;

pub const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_MODEL: &str = "facebook/mbart-large-50-many-to-many-mmt";

/// Source language of every dedicated model.
const DEDICATED_SOURCE: &str = "en";

/// Dedicated translation models, keyed by target language.
const DEDICATED_MODELS: &[(&str, &str)] = &[
    ("es", "Helsinki-NLP/opus-mt-en-es"),
    ("fr", "Helsinki-NLP/opus-mt-en-fr"),
    ("de", "Helsinki-NLP/opus-mt-en-de"),
    ("it", "Helsinki-NLP/opus-mt-en-it"),
    ("nl", "Helsinki-NLP/opus-mt-en-nl"),
    ("ru", "Helsinki-NLP/opus-mt-en-ru"),
    ("zh", "Helsinki-NLP/opus-mt-en-zh"),
    ("ar", "Helsinki-NLP/opus-mt-en-ar"),
    ("hi", "Helsinki-NLP/opus-mt-en-hi"),
];

/// Resolved destination for one translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRoute {
    pub model: String,
    pub endpoint: String,
    /// False when the request fell through to the multilingual default.
    pub dedicated: bool,
}

#[derive(Debug, Clone)]
pub struct ModelRouter {
    api_base: String,
    default_model: String,
    routes: HashMap<&'static str, &'static str>,
}

impl ModelRouter {
    pub fn new(api_base: impl Into<String>, default_model: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            default_model: default_model.into(),
            routes: DEDICATED_MODELS.iter().copied().collect(),
        }
    }

    /// Pick the model for a language pair. Never fails.
    pub fn route_for(&self, source_lang: &str, target_lang: &str) -> ModelRoute {
        let dedicated = if source_lang == DEDICATED_SOURCE {
            self.routes.get(target_lang)
        } else {
            None
        };
        let (model, dedicated) = match dedicated {
            Some(model) => (model.to_string(), true),
            None => (self.default_model.clone(), false),
        };
        ModelRoute {
            endpoint: format!("{}/{}", self.api_base, model),
            model,
            dedicated,
        }
    }
}

impl Default for ModelRouter {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE, DEFAULT_MODEL)
    }
}
