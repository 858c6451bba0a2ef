use crate::i18n::LanguageRegistry;
use crate::retry::DEFAULT_MAX_WAIT;
use crate::router::{DEFAULT_API_BASE, DEFAULT_MODEL};
use anyhow::{bail, Context, Result};
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Upstream model-serving API
    pub hf_api_key: Option<String>,
    pub hf_api_base: String,
    pub hf_default_model: String,

    // Cache
    pub cache_max_entries: NonZeroUsize,
    pub cache_ttl: Duration,

    // Request limits
    pub max_text_chars: usize,
    pub max_batch_items: usize,
    pub default_source_lang: String,

    // Resilience
    pub max_retries: u32,
    pub cold_start_wait: Duration,
    pub max_cold_start_wait: Duration,
    pub request_timeout: Duration,
    pub batch_concurrency: NonZeroUsize,
    pub batch_deadline: Duration,

    // Server
    pub admin_api_key: Option<String>,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hf_api_key: None,
            hf_api_base: DEFAULT_API_BASE.to_string(),
            hf_default_model: DEFAULT_MODEL.to_string(),
            cache_max_entries: NonZeroUsize::new(1000).expect("non-zero literal"),
            cache_ttl: Duration::from_secs(24 * 60 * 60),
            max_text_chars: 5000,
            max_batch_items: 20,
            default_source_lang: "en".to_string(),
            max_retries: 3,
            cold_start_wait: Duration::from_secs(20),
            max_cold_start_wait: DEFAULT_MAX_WAIT,
            request_timeout: Duration::from_secs(30),
            batch_concurrency: NonZeroUsize::new(4).expect("non-zero literal"),
            batch_deadline: Duration::from_secs(60),
            admin_api_key: None,
            port: 8080,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let config = Self {
            // Upstream - the key is optional at startup; translating without it
            // fails per request as misconfigured
            hf_api_key: optional_secret("HF_API_KEY")?,
            hf_api_base: std::env::var("HF_API_BASE").unwrap_or(defaults.hf_api_base),
            hf_default_model: std::env::var("HF_DEFAULT_MODEL")
                .unwrap_or(defaults.hf_default_model),

            // Cache
            cache_max_entries: parse_env("TRANSLATION_CACHE_MAX_ENTRIES", defaults.cache_max_entries)?,
            cache_ttl: parse_secs("TRANSLATION_CACHE_TTL_SECS", defaults.cache_ttl)?,

            // Request limits
            max_text_chars: parse_env("TRANSLATION_MAX_TEXT_CHARS", defaults.max_text_chars)?,
            max_batch_items: parse_env("TRANSLATION_MAX_BATCH_ITEMS", defaults.max_batch_items)?,
            default_source_lang: std::env::var("DEFAULT_SOURCE_LANG")
                .unwrap_or(defaults.default_source_lang),

            // Resilience
            max_retries: parse_env("TRANSLATION_MAX_RETRIES", defaults.max_retries)?,
            cold_start_wait: parse_secs("TRANSLATION_COLD_START_WAIT_SECS", defaults.cold_start_wait)?,
            max_cold_start_wait: parse_secs(
                "TRANSLATION_MAX_COLD_START_WAIT_SECS",
                defaults.max_cold_start_wait,
            )?,
            request_timeout: parse_secs("TRANSLATION_REQUEST_TIMEOUT_SECS", defaults.request_timeout)?,
            batch_concurrency: parse_env("TRANSLATION_BATCH_CONCURRENCY", defaults.batch_concurrency)?,
            batch_deadline: parse_secs("TRANSLATION_BATCH_DEADLINE_SECS", defaults.batch_deadline)?,

            // Server
            admin_api_key: optional_secret("ADMIN_API_KEY")?,
            port: parse_env("PORT", defaults.port)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the gateway misbehave silently.
    pub fn validate(&self) -> Result<()> {
        if self.hf_api_base.trim().is_empty() {
            bail!("HF_API_BASE must not be empty");
        }
        if self.hf_default_model.trim().is_empty() {
            bail!("HF_DEFAULT_MODEL must not be empty");
        }
        if self.max_text_chars == 0 {
            bail!("TRANSLATION_MAX_TEXT_CHARS must be greater than 0");
        }
        if self.max_batch_items == 0 {
            bail!("TRANSLATION_MAX_BATCH_ITEMS must be greater than 0");
        }
        if self.request_timeout.is_zero() {
            bail!("TRANSLATION_REQUEST_TIMEOUT_SECS must be greater than 0");
        }
        if self.batch_deadline.is_zero() {
            bail!("TRANSLATION_BATCH_DEADLINE_SECS must be greater than 0");
        }
        if self.cache_ttl.is_zero() {
            bail!("TRANSLATION_CACHE_TTL_SECS must be greater than 0");
        }
        if !LanguageRegistry::get().is_supported(&self.default_source_lang) {
            bail!(
                "DEFAULT_SOURCE_LANG '{}' is not a supported language",
                self.default_source_lang
            );
        }
        Ok(())
    }
}

/// Parse an optional variable, falling back to `default` only when unset.
fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: '{}'", name, value)),
        Err(_) => Ok(default),
    }
}

fn parse_secs(name: &str, default: Duration) -> Result<Duration> {
    parse_env(name, default.as_secs()).map(Duration::from_secs)
}

/// A secret that may be absent, but never blank when present.
fn optional_secret(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => bail!("{} is set but empty", name),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(_) => Ok(None),
    }
}
