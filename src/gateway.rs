//! Translation gateway: the public entry point used by the HTTP layer.
//!
//! Validates requests, short-circuits trivial cases and applies the
//! fallback policy. Local errors (validation, missing credentials) reach the
//! caller; upstream failures degrade to the original text.

use crate::batch::BatchCoordinator;
use crate::cache::{CacheStats, CacheStore};
use crate::config::Config;
use crate::error::{TranslationError, ValidationError};
use crate::executor::{build_http_client, TranslationExecutor};
use crate::i18n::{Language, LanguageInfo, LanguageRegistry, MetricsReport, TranslationMetrics};
use crate::pipeline::TranslationPipeline;
use crate::router::ModelRouter;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub text: String,
    pub target_lang: String,
    #[serde(default)]
    pub source_lang: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTranslateRequest {
    pub texts: Vec<String>,
    pub target_lang: String,
    #[serde(default)]
    pub source_lang: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateOutcome {
    pub translated_text: String,
    pub cached: bool,
    /// True when the upstream failed and the original text was returned.
    pub fallback: bool,
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTranslateOutcome {
    pub translations: Vec<String>,
    pub cached_count: usize,
    pub failed_count: usize,
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayStats {
    #[serde(flatten)]
    pub cache: CacheStats,
    pub metrics: MetricsReport,
}

pub struct TranslationGateway {
    pipeline: Arc<TranslationPipeline>,
    batch: BatchCoordinator,
    cache: Arc<CacheStore>,
    metrics: Arc<TranslationMetrics>,
    max_text_chars: usize,
    max_batch_items: usize,
    default_source_lang: String,
}

impl TranslationGateway {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_http_client(config.request_timeout)
            .context("Failed to build HTTP client for the inference API")?;
        let metrics = Arc::new(TranslationMetrics::new());
        let cache = Arc::new(CacheStore::new(config.cache_max_entries, config.cache_ttl));
        let executor = TranslationExecutor::new(
            client,
            config.hf_api_key.clone(),
            ModelRouter::new(config.hf_api_base.as_str(), config.hf_default_model.as_str()),
            config.cold_start_wait,
            Arc::clone(&metrics),
        )
        .with_max_wait(config.max_cold_start_wait);

        if !executor.is_configured() {
            warn!("HF_API_KEY is not set - translations will fail until it is configured");
        }

        let pipeline = Arc::new(TranslationPipeline::new(
            Arc::clone(&cache),
            executor,
            Arc::clone(&metrics),
            config.max_retries,
        ));
        let batch = BatchCoordinator::new(
            Arc::clone(&pipeline),
            config.batch_concurrency.get(),
            config.batch_deadline,
        );

        Ok(Self {
            pipeline,
            batch,
            cache,
            metrics,
            max_text_chars: config.max_text_chars,
            max_batch_items: config.max_batch_items,
            default_source_lang: config.default_source_lang.clone(),
        })
    }

    pub async fn translate(
        &self,
        request: TranslateRequest,
    ) -> Result<TranslateOutcome, TranslationError> {
        let source_code = request
            .source_lang
            .unwrap_or_else(|| self.default_source_lang.clone());
        let target_code = request.target_lang;
        let text = request.text.trim();

        let outcome = |translated_text: String, cached: bool, fallback: bool| TranslateOutcome {
            translated_text,
            cached,
            fallback,
            source_lang: source_code.clone(),
            target_lang: target_code.clone(),
        };

        if text.is_empty() {
            return Ok(outcome(String::new(), false, false));
        }
        if source_code == target_code {
            return Ok(outcome(text.to_string(), false, false));
        }

        let source = Language::from_code(&source_code)?;
        let target = Language::from_code(&target_code)?;
        self.check_length(text)?;

        match self.pipeline.run(text, source, target).await {
            Ok(resolved) => Ok(outcome(resolved.text, resolved.cached, false)),
            Err(e) if e.is_local() => Err(e),
            Err(e) => {
                self.metrics.record_fallback();
                let registry = LanguageRegistry::get();
                warn!(
                    transient = e.is_transient(),
                    error = %e,
                    "Translation {} -> {} failed, returning original text",
                    registry.display_name(source.code()),
                    registry.display_name(target.code())
                );
                Ok(outcome(text.to_string(), false, true))
            }
        }
    }

    pub async fn translate_batch(
        &self,
        request: BatchTranslateRequest,
    ) -> Result<BatchTranslateOutcome, TranslationError> {
        let source_code = request
            .source_lang
            .unwrap_or_else(|| self.default_source_lang.clone());
        let target_code = request.target_lang;
        let texts = request.texts;

        if texts.is_empty() {
            return Err(ValidationError::EmptyBatch.into());
        }
        if texts.len() > self.max_batch_items {
            return Err(ValidationError::BatchTooLarge {
                len: texts.len(),
                max: self.max_batch_items,
            }
            .into());
        }

        if source_code == target_code {
            return Ok(BatchTranslateOutcome {
                translations: texts.iter().map(|t| t.trim().to_string()).collect(),
                cached_count: 0,
                failed_count: 0,
                source_lang: source_code,
                target_lang: target_code,
            });
        }

        let source = Language::from_code(&source_code)?;
        let target = Language::from_code(&target_code)?;
        for text in &texts {
            self.check_length(text.trim())?;
        }

        info!(
            items = texts.len(),
            "Translating batch from {} to {}",
            source.name(),
            target.name()
        );
        let outcome = self.batch.execute_batch(&texts, source, target).await?;
        for _ in 0..outcome.failed_count {
            self.metrics.record_fallback();
        }

        Ok(BatchTranslateOutcome {
            translations: outcome.translations,
            cached_count: outcome.cached_count,
            failed_count: outcome.failed_count,
            source_lang: source_code,
            target_lang: target_code,
        })
    }

    pub fn supported_languages(&self) -> Vec<LanguageInfo> {
        LanguageRegistry::get()
            .list_enabled()
            .into_iter()
            .map(LanguageInfo::from)
            .collect()
    }

    pub fn cache_stats(&self) -> GatewayStats {
        GatewayStats {
            cache: self.cache.stats(),
            metrics: self.metrics.report(),
        }
    }

    /// Drop every cached translation, returning how many were removed.
    pub fn clear_cache(&self) -> usize {
        let removed = self.cache.clear();
        info!(removed, "Translation cache cleared");
        removed
    }

    fn check_length(&self, text: &str) -> Result<(), TranslationError> {
        let len = text.chars().count();
        if len > self.max_text_chars {
            return Err(ValidationError::InputTooLarge {
                len,
                max: self.max_text_chars,
            }
            .into());
        }
        Ok(())
    }
}
