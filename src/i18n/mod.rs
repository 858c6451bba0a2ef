//! Language support and translation observability.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages and their metadata
//! - `language`: Validated `Language` type built from registry codes
//! - `metrics`: Counters for cache, upstream and fallback behaviour
//!
//! # Example
//!
//! ```rust,ignore
//! use travel_translate_gateway::i18n::{Language, LanguageRegistry};
//!
//! let spanish = Language::from_code("es")?;
//! assert!(LanguageRegistry::get().is_supported("fr"));
//! ```

mod language;
mod metrics;
mod registry;

pub use language::{Language, LanguageInfo};
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
