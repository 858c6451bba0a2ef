//! Batch translation with per-item failure isolation.
//!
//! Items run through the shared pipeline with bounded concurrency and are
//! reassembled in input order. A failed, abandoned or timed-out item yields
//! its original text; the batch as a whole only fails when the service is
//! misconfigured.

use crate::error::TranslationError;
use crate::i18n::Language;
use crate::pipeline::TranslationPipeline;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub translations: Vec<String>,
    pub cached_count: usize,
    pub failed_count: usize,
}

pub struct BatchCoordinator {
    pipeline: Arc<TranslationPipeline>,
    concurrency: usize,
    deadline: Duration,
}

impl BatchCoordinator {
    pub fn new(pipeline: Arc<TranslationPipeline>, concurrency: usize, deadline: Duration) -> Self {
        Self {
            pipeline,
            concurrency: concurrency.max(1),
            deadline,
        }
    }

    /// Translate every text, preserving order and length.
    pub async fn execute_batch(
        &self,
        texts: &[String],
        source: Language,
        target: Language,
    ) -> Result<BatchOutcome, TranslationError> {
        let deadline = Instant::now() + self.deadline;
        let mut slots: Vec<Option<(String, bool)>> = vec![None; texts.len()];

        let mut completed = stream::iter(texts.iter().cloned().enumerate())
            .map(|(index, text)| async move {
                (index, self.translate_item(&text, source, target).await)
            })
            .buffer_unordered(self.concurrency);

        loop {
            match timeout_at(deadline, completed.next()).await {
                Ok(Some((index, Ok(resolved)))) => slots[index] = Some(resolved),
                Ok(Some((_, Err(e @ TranslationError::Misconfigured(_))))) => return Err(e),
                Ok(Some((index, Err(e)))) => {
                    warn!(index, error = %e, "Batch item failed, keeping original text");
                }
                Ok(None) => break,
                Err(_) => {
                    let pending = slots.iter().filter(|slot| slot.is_none()).count();
                    warn!(
                        pending,
                        deadline = ?self.deadline,
                        "Batch deadline reached, keeping original text for unfinished items"
                    );
                    break;
                }
            }
        }

        let mut cached_count = 0;
        let mut failed_count = 0;
        let translations = slots
            .into_iter()
            .zip(texts)
            .map(|(slot, original)| match slot {
                Some((text, cached)) => {
                    if cached {
                        cached_count += 1;
                    }
                    text
                }
                None => {
                    failed_count += 1;
                    original.clone()
                }
            })
            .collect();

        info!(
            items = texts.len(),
            cached_count, failed_count, "Batch translation finished"
        );

        Ok(BatchOutcome {
            translations,
            cached_count,
            failed_count,
        })
    }

    async fn translate_item(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<(String, bool), TranslationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok((String::new(), false));
        }
        let resolved = self.pipeline.run(trimmed, source, target).await?;
        Ok((resolved.text, resolved.cached))
    }
}
