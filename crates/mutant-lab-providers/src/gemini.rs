// crates/mutant-lab-providers/src/gemini.rs
// ============================================================================
// Module: Gemini Synthesizer
// Description: Creature synthesis backed by Gemini text and Imagen models.
// Purpose: Issue bounded, validated requests to the Generative Language API.
// Dependencies: mutant-lab-core, reqwest, serde_json, tracing, url
// ============================================================================

//! ## Overview
//! [`GeminiSynthesizer`] performs one synthesis in two blocking calls: a
//! `generateContent` request that returns creature details as JSON under a
//! response schema, then a `predict` request that renders the creature's
//! image prompt. Both responses are read under a byte limit, redirects are
//! never followed, and every field is validated before a record is produced.
//! Security posture: backend responses are untrusted input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::Read;
use std::time::Duration;

use mutant_lab_core::CreatureDetails;
use mutant_lab_core::CreatureImage;
use mutant_lab_core::SynthesisError;
use mutant_lab_core::SynthesisRecord;
use mutant_lab_core::SynthesisRequest;
use mutant_lab_core::Synthesizer;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde_json::Value;
use serde_json::json;
use url::Url;

use crate::prompt::creature_prompt;
use crate::prompt::response_schema;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default Generative Language API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
/// Default model for creature details.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
/// Default model for creature artwork.
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";
/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;
/// Default response size limit in bytes.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";
/// Upper bound on upstream error text kept in errors.
const MAX_UPSTREAM_MESSAGE_CHARS: usize = 256;
/// Image MIME type requested from the image model.
const IMAGE_MIME_TYPE: &str = "image/jpeg";
/// Maximum sampling temperature accepted by the text model.
const MAX_TEMPERATURE: f32 = 2.0;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the Gemini synthesizer.
///
/// # Invariants
/// - `api_key` is non-empty.
/// - `endpoint` is `https`, or `http` when `allow_http` is set, with no credentials.
/// - `max_response_bytes` bounds each response body.
/// - `temperature` lies in `0.0 ..= 2.0`.
#[derive(Clone, PartialEq)]
pub struct GeminiConfig {
    /// API base URL.
    pub endpoint: String,
    /// API key sent with every request.
    pub api_key: String,
    /// Model used for creature details.
    pub text_model: String,
    /// Model used for creature artwork.
    pub image_model: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// Allow cleartext HTTP endpoints (disabled by default).
    pub allow_http: bool,
    /// Sampling temperature for the text model.
    pub temperature: f32,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl GeminiConfig {
    /// Creates a configuration with default endpoint, models, and limits.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            allow_http: false,
            temperature: 1.0,
            user_agent: "mutant-lab/0.1".to_string(),
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_response_bytes", &self.max_response_bytes)
            .field("allow_http", &self.allow_http)
            .field("temperature", &self.temperature)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

// ============================================================================
// SECTION: Synthesizer
// ============================================================================

/// Synthesizer backed by the Generative Language API.
///
/// # Invariants
/// - Redirects are not followed.
/// - Responses exceeding `max_response_bytes` fail closed.
pub struct GeminiSynthesizer {
    /// Validated configuration.
    config: GeminiConfig,
    /// `generateContent` URL for the text model.
    text_url: Url,
    /// `predict` URL for the image model.
    image_url: Url,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl GeminiSynthesizer {
    /// Creates a synthesizer after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::Config`] when the configuration is invalid or
    /// the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, SynthesisError> {
        if config.api_key.trim().is_empty() {
            return Err(SynthesisError::Config("api key is required".to_string()));
        }
        if config.max_response_bytes == 0 {
            return Err(SynthesisError::Config(
                "max_response_bytes must be greater than zero".to_string(),
            ));
        }
        if !(0.0 ..= MAX_TEMPERATURE).contains(&config.temperature) {
            return Err(SynthesisError::Config(format!(
                "temperature must be between 0 and {MAX_TEMPERATURE}"
            )));
        }
        validate_model_name(&config.text_model)?;
        validate_model_name(&config.image_model)?;
        let text_url = model_url(&config, &config.text_model, "generateContent")?;
        let image_url = model_url(&config, &config.image_model, "predict")?;
        let client = build_http_client(&config)?;
        Ok(Self {
            config,
            text_url,
            image_url,
            client,
        })
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Requests creature details from the text model.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError`] on transport, status, or validation failure.
    pub fn generate_details(
        &self,
        request: &SynthesisRequest,
    ) -> Result<CreatureDetails, SynthesisError> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": creature_prompt(request)}]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(request.language, request.gender),
                "temperature": self.config.temperature
            }
        });
        let response = self.post_json(&self.text_url, &body)?;
        let text = extract_candidate_text(&response)?;
        CreatureDetails::from_json_text(&text)
    }

    /// Requests artwork for `image_prompt` from the image model.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError`] on transport, status, or validation failure.
    pub fn generate_image(&self, image_prompt: &str) -> Result<CreatureImage, SynthesisError> {
        let body = json!({
            "instances": [{"prompt": image_prompt}],
            "parameters": {
                "sampleCount": 1,
                "outputOptions": {"mimeType": IMAGE_MIME_TYPE},
                "aspectRatio": "1:1"
            }
        });
        let response = self.post_json(&self.image_url, &body)?;
        let prediction = response
            .get("predictions")
            .and_then(Value::as_array)
            .and_then(|predictions| predictions.first())
            .ok_or_else(|| SynthesisError::Malformed("image response has no predictions".to_string()))?;
        let encoded = prediction
            .get("bytesBase64Encoded")
            .and_then(Value::as_str)
            .ok_or_else(|| SynthesisError::Malformed("image prediction has no bytes".to_string()))?;
        let mime_type =
            prediction.get("mimeType").and_then(Value::as_str).unwrap_or(IMAGE_MIME_TYPE);
        CreatureImage::from_base64(mime_type, encoded)
    }

    /// Posts a JSON body and returns the parsed JSON response.
    fn post_json(&self, url: &Url, body: &Value) -> Result<Value, SynthesisError> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| SynthesisError::Config(format!("request encoding failed: {err}")))?;
        tracing::debug!(url = %url, bytes = payload.len(), "sending synthesis request");
        let mut response = self
            .client
            .post(url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, self.config.api_key.as_str())
            .body(payload)
            .send()
            .map_err(|err| SynthesisError::Transport(redact_transport_error(&err)))?;
        let status = response.status();
        let bytes = read_response_limited(&mut response, self.config.max_response_bytes)?;
        tracing::debug!(url = %url, status = status.as_u16(), bytes = bytes.len(), "synthesis response received");
        if !status.is_success() {
            return Err(status_error(status, &bytes));
        }
        serde_json::from_slice(&bytes)
            .map_err(|err| SynthesisError::Malformed(format!("response is not json: {err}")))
    }
}

impl Synthesizer for GeminiSynthesizer {
    fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisRecord, SynthesisError> {
        if request.element_names.is_empty() {
            return Err(SynthesisError::Config("no elements to combine".to_string()));
        }
        let details = self.generate_details(request)?;
        tracing::debug!(creature = %details.name, "creature details generated");
        let image = self.generate_image(&details.image_prompt)?;
        Ok(SynthesisRecord {
            details,
            image,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the model endpoint URL and validates its scheme.
fn model_url(config: &GeminiConfig, model: &str, method: &str) -> Result<Url, SynthesisError> {
    let raw =
        format!("{}/v1beta/models/{model}:{method}", config.endpoint.trim().trim_end_matches('/'));
    let url = Url::parse(&raw)
        .map_err(|_| SynthesisError::Config(format!("invalid endpoint: {}", config.endpoint)))?;
    validate_url(&url, config.allow_http)?;
    Ok(url)
}

/// Validates URL scheme and rejects embedded credentials.
fn validate_url(url: &Url, allow_http: bool) -> Result<(), SynthesisError> {
    match url.scheme() {
        "https" => {}
        "http" if allow_http => {}
        _ => return Err(SynthesisError::Config("unsupported endpoint scheme".to_string())),
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(SynthesisError::Config("endpoint credentials are not allowed".to_string()));
    }
    if url.host_str().is_none() {
        return Err(SynthesisError::Config("endpoint host required".to_string()));
    }
    Ok(())
}

/// Model names are path segments; restrict them to a safe alphabet.
fn validate_model_name(model: &str) -> Result<(), SynthesisError> {
    let valid = !model.is_empty()
        && model.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '.' | '_'));
    if valid {
        Ok(())
    } else {
        Err(SynthesisError::Config(format!("invalid model name: {model:?}")))
    }
}

/// Builds an HTTP client with redirects disabled.
fn build_http_client(config: &GeminiConfig) -> Result<Client, SynthesisError> {
    Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .user_agent(config.user_agent.clone())
        .redirect(Policy::none())
        .build()
        .map_err(|_| SynthesisError::Config("http client build failed".to_string()))
}

/// Describes a transport failure without echoing request URLs.
fn redact_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        "request failed".to_string()
    }
}

/// Maps a non-success status into a synthesis error.
fn status_error(status: StatusCode, body: &[u8]) -> SynthesisError {
    let message = upstream_message(body);
    if status == StatusCode::TOO_MANY_REQUESTS {
        return SynthesisError::Quota(message);
    }
    SynthesisError::Upstream {
        status: status.as_u16(),
        message,
    }
}

/// Extracts `error.message` from an upstream error body, truncated.
pub(crate) fn upstream_message(body: &[u8]) -> String {
    let parsed = serde_json::from_slice::<Value>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|value| value.pointer("/error/message"))
        .and_then(Value::as_str)
        .map_or_else(|| String::from_utf8_lossy(body).into_owned(), str::to_string);
    message.trim().chars().take(MAX_UPSTREAM_MESSAGE_CHARS).collect()
}

/// Concatenates the text parts of the first candidate.
pub(crate) fn extract_candidate_text(response: &Value) -> Result<String, SynthesisError> {
    let Some(candidate) =
        response.get("candidates").and_then(Value::as_array).and_then(|list| list.first())
    else {
        let reason = response
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
            .map_or_else(String::new, |reason| format!(" (blocked: {reason})"));
        return Err(SynthesisError::Malformed(format!("text response has no candidates{reason}")));
    };
    let parts = candidate
        .pointer("/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| SynthesisError::Malformed("candidate has no content parts".to_string()))?;
    let text: String = parts.iter().filter_map(|part| part.get("text")).filter_map(Value::as_str).collect();
    if text.trim().is_empty() {
        return Err(SynthesisError::Malformed("candidate text is empty".to_string()));
    }
    Ok(text)
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut Response,
    max_bytes: usize,
) -> Result<Vec<u8>, SynthesisError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| SynthesisError::Config("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(SynthesisError::Malformed("response exceeds size limit".to_string()));
    }
    let mut buf = Vec::new();
    let limit = max_bytes_u64.saturating_add(1);
    let mut handle = response.take(limit);
    handle
        .read_to_end(&mut buf)
        .map_err(|_| SynthesisError::Transport("failed to read response".to_string()))?;
    if buf.len() > max_bytes {
        return Err(SynthesisError::Malformed("response exceeds size limit".to_string()));
    }
    if let Some(expected) = expected_len {
        let expected = usize::try_from(expected)
            .map_err(|_| SynthesisError::Malformed("invalid response length".to_string()))?;
        if buf.len() < expected {
            return Err(SynthesisError::Transport("response truncated".to_string()));
        }
    }
    Ok(buf)
}
