//! Upstream translation calls against the hosted inference API.
//!
//! One `execute` is one logical translation: route, POST, wait out model
//! cold starts, then normalize whichever response shape came back.

use crate::error::TranslationError;
use crate::i18n::{Language, TranslationMetrics};
use crate::retry::{with_server_wait, Attempt, RetryError, RetryPolicy, DEFAULT_MAX_WAIT};
use crate::router::{ModelRoute, ModelRouter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Longest slice of an upstream body quoted in error messages
const BODY_SNIPPET_CHARS: usize = 200;

/// Inference API request
#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<LanguageHints>,
    options: InferenceOptions,
}

/// Language tags required by the multilingual model
#[derive(Debug, Serialize)]
struct LanguageHints {
    src_lang: &'static str,
    tgt_lang: &'static str,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    /// Ask the upstream to hold the request while the model loads
    wait_for_model: bool,
}

/// Successful response shapes, tried in declaration order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Text(String),
    GeneratedList(Vec<GeneratedText>),
    TranslationList(Vec<TranslationText>),
    Generated(GeneratedText),
    Translation(TranslationText),
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct TranslationText {
    translation_text: String,
}

impl InferenceResponse {
    fn into_text(self) -> Option<String> {
        match self {
            InferenceResponse::Text(text) => Some(text),
            InferenceResponse::GeneratedList(items) => {
                items.into_iter().next().map(|item| item.generated_text)
            }
            InferenceResponse::TranslationList(items) => {
                items.into_iter().next().map(|item| item.translation_text)
            }
            InferenceResponse::Generated(item) => Some(item.generated_text),
            InferenceResponse::Translation(item) => Some(item.translation_text),
        }
    }
}

/// Body sent with a 503 while the model is loading
#[derive(Debug, Deserialize)]
struct LoadingBody {
    estimated_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Build the HTTP client used for upstream calls.
///
/// The timeout bounds each individual request; cold-start waits happen
/// between requests and are not covered by it.
pub fn build_http_client(request_timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(request_timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
}

/// Calls the model-serving API and turns its answer into translated text.
pub struct TranslationExecutor {
    client: reqwest::Client,
    api_key: Option<String>,
    router: ModelRouter,
    fallback_wait: Duration,
    max_wait: Duration,
    metrics: Arc<TranslationMetrics>,
}

impl TranslationExecutor {
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        router: ModelRouter,
        fallback_wait: Duration,
        metrics: Arc<TranslationMetrics>,
    ) -> Self {
        Self {
            client,
            api_key,
            router,
            fallback_wait,
            max_wait: DEFAULT_MAX_WAIT,
            metrics,
        }
    }

    /// Cap any single cold-start wait, whatever the server estimates.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Whether an API key is available for upstream calls.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Translate `text`, waiting out model cold starts up to `max_retries` times.
    ///
    /// Returns the trimmed translation. Fails with `Misconfigured` before any
    /// network call when no API key is set.
    pub async fn execute(
        &self,
        text: &str,
        source: Language,
        target: Language,
        max_retries: u32,
    ) -> Result<String, TranslationError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            TranslationError::Misconfigured("HF_API_KEY is not set".to_string())
        })?;

        let route = self.router.route_for(source.code(), target.code());
        let request = InferenceRequest {
            inputs: text,
            parameters: (!route.dedicated).then(|| LanguageHints {
                src_lang: source.model_code(),
                tgt_lang: target.model_code(),
            }),
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        debug!(
            model = %route.model,
            source = source.code(),
            target = target.code(),
            chars = text.chars().count(),
            "Sending translation request"
        );
        self.metrics.record_api_call();

        let policy = RetryPolicy::new(max_retries, self.fallback_wait).with_max_wait(self.max_wait);
        let operation_name = format!(
            "Translation {}->{} via {}",
            source.code(),
            target.code(),
            route.model
        );
        let (route_ref, request_ref) = (&route, &request);
        let result = with_server_wait(&policy, &operation_name, move || {
            self.attempt(api_key, route_ref, request_ref)
        })
        .await;

        match result {
            Ok(translated) => Ok(translated),
            Err(RetryError::Exhausted { attempts, .. }) => {
                self.metrics.record_api_failure();
                Err(TranslationError::ModelUnavailable {
                    model: route.model.clone(),
                    attempts,
                })
            }
            Err(RetryError::Aborted(e)) => {
                self.metrics.record_api_failure();
                Err(e)
            }
        }
    }

    /// One POST to the model endpoint.
    async fn attempt(
        &self,
        api_key: &str,
        route: &ModelRoute,
        request: &InferenceRequest<'_>,
    ) -> Result<String, Attempt<TranslationError>> {
        let response = self
            .client
            .post(&route.endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                Attempt::Abort(TranslationError::UpstreamError {
                    status: None,
                    message: format!("request to {} failed: {}", route.model, e),
                })
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Attempt::Abort(TranslationError::UpstreamError {
                status: Some(status.as_u16()),
                message: format!("failed to read response body: {}", e),
            })
        })?;

        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            self.metrics.record_cold_start();
            let estimate = estimated_wait(&body);
            warn!(model = %route.model, ?estimate, "Model is loading");
            return Err(Attempt::Wait {
                estimate,
                error: TranslationError::UpstreamError {
                    status: Some(status.as_u16()),
                    message: upstream_message(&body),
                },
            });
        }

        if !status.is_success() {
            return Err(Attempt::Abort(TranslationError::UpstreamError {
                status: Some(status.as_u16()),
                message: upstream_message(&body),
            }));
        }

        extract_translation(&body).map_err(Attempt::Abort)
    }
}

/// Server-estimated warm-up time from a loading response, if it carries one.
fn estimated_wait(body: &str) -> Option<Duration> {
    serde_json::from_str::<LoadingBody>(body)
        .ok()
        .and_then(|b| b.estimated_time)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

/// Error message from an upstream body: its `error` field, else the raw text.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| snippet(body))
}

fn extract_translation(body: &str) -> Result<String, TranslationError> {
    serde_json::from_str::<InferenceResponse>(body)
        .ok()
        .and_then(InferenceResponse::into_text)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| TranslationError::UnexpectedResponseShape(snippet(body)))
}

fn snippet(body: &str) -> String {
    if body.chars().count() > BODY_SNIPPET_CHARS {
        let cut: String = body.chars().take(BODY_SNIPPET_CHARS).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}
