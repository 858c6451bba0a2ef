//! The single-item path shared by single and batch translation:
//! cache lookup, upstream call on a miss, write-through on success.

use crate::cache::{CacheKey, CacheStore};
use crate::error::TranslationError;
use crate::executor::TranslationExecutor;
use crate::i18n::{Language, TranslationMetrics};
use std::sync::Arc;
use tracing::debug;

/// A translation together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub text: String,
    pub cached: bool,
}

pub struct TranslationPipeline {
    cache: Arc<CacheStore>,
    executor: TranslationExecutor,
    metrics: Arc<TranslationMetrics>,
    max_retries: u32,
}

impl TranslationPipeline {
    pub fn new(
        cache: Arc<CacheStore>,
        executor: TranslationExecutor,
        metrics: Arc<TranslationMetrics>,
        max_retries: u32,
    ) -> Self {
        Self {
            cache,
            executor,
            metrics,
            max_retries,
        }
    }

    /// Translate already-validated, trimmed, non-empty text.
    pub async fn run(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<Resolved, TranslationError> {
        let key = CacheKey::fingerprint(source.code(), target.code(), text);

        if let Some(hit) = self.cache.get(&key) {
            self.metrics.record_cache_hit();
            debug!(?key, "Translation cache hit");
            return Ok(Resolved {
                text: hit,
                cached: true,
            });
        }
        self.metrics.record_cache_miss();

        let translated = self
            .executor
            .execute(text, source, target, self.max_retries)
            .await?;
        self.cache.put(key, translated.clone());

        Ok(Resolved {
            text: translated,
            cached: false,
        })
    }
}
