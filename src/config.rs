#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    sync::{Arc, Mutex, OnceLock},
    time::Duration,
};

use anyhow::{Context, Result};
use async_openai::types::chat::ReasoningEffort;
use reqwest::Client;

use crate::{prompts::GradingPrompts, report::DecodeOptions};

/// OpenAI-compatible endpoint Gemini exposes.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Model used when `TALLY_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Seconds to wait for the engine before giving up.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Milliseconds between status messages.
pub const DEFAULT_STATUS_INTERVAL_MS: u64 = 3_000;

/// Parses the optional reasoning-effort environment value into the OpenAI enum,
/// defaulting to `ReasoningEffort::High` when unset or unrecognised.
fn parse_reasoning_effort(val: Option<String>) -> ReasoningEffort {
    match val
        .map(|s| s.to_ascii_lowercase())
        .as_deref()
        .unwrap_or("high")
    {
        "low" => ReasoningEffort::Low,
        "medium" => ReasoningEffort::Medium,
        _ => ReasoningEffort::High,
    }
}

/// Credentials and tuning for the grading engine, sourced from the
/// environment.
pub struct EngineEnv {
    /// Base URL for the OpenAI-compatible API endpoint.
    api_base:         String,
    /// API key used to authenticate requests.
    api_key:          String,
    /// Model identifier for chat completions.
    model:            String,
    /// Optional temperature override, if provided.
    temperature:      Option<f32>,
    /// Reasoning effort hint to send with requests.
    reasoning_effort: ReasoningEffort,
}

impl EngineEnv {
    /// Creates an engine configuration from explicit values.
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_base:         api_base.into(),
            api_key:          api_key.into(),
            model:            model.into(),
            temperature:      None,
            reasoning_effort: ReasoningEffort::High,
        }
    }

    /// Construct an `EngineEnv` from environment variables; returns `None` if
    /// no API key is available.
    fn from_env() -> Option<Self> {
        let api_key = std::env::var("TALLY_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .ok()?
            .trim()
            .to_owned();
        if api_key.is_empty() {
            return None;
        }

        let api_base = non_empty_var("TALLY_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into());
        let model = non_empty_var("TALLY_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());
        let temperature = std::env::var("TALLY_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse::<f32>().ok());
        let reasoning_effort = parse_reasoning_effort(std::env::var("TALLY_REASONING_EFFORT").ok());

        Some(Self {
            api_base,
            api_key,
            model,
            temperature,
            reasoning_effort,
        })
    }

    /// Returns the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the configured temperature, if any.
    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// Returns the reasoning effort level.
    pub fn reasoning_effort(&self) -> ReasoningEffort {
        self.reasoning_effort.clone()
    }
}

/// Runtime and prompt configuration shared across the crate.
pub struct ConfigState {
    /// Engine credentials, if configured.
    engine:                Option<EngineEnv>,
    /// Shared reqwest HTTP client reused for sheet downloads.
    http_client:           Client,
    /// Embedded prompt bundle.
    prompts:               GradingPrompts,
    /// Caller-imposed deadline for one grading request.
    request_timeout:       Duration,
    /// Period of the status ticker.
    status_interval:       Duration,
    /// Whether fractional scores should be flagged.
    strict_integer_scores: bool,
}

impl ConfigState {
    /// Construct a new configuration instance by reading the environment.
    fn new() -> Result<Self> {
        let http_client = Client::builder()
            // Avoid macOS dynamic store lookups that fail in sandboxed environments.
            .no_proxy()
            .build()
            .context("Failed to construct shared HTTP client")?;

        let engine = EngineEnv::from_env();
        if engine.is_none() {
            tracing::debug!("No TALLY_API_KEY or GEMINI_API_KEY set; grading is unavailable");
        }

        Ok(Self {
            engine,
            http_client,
            prompts: GradingPrompts::default(),
            request_timeout: read_duration("TALLY_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS, Duration::from_secs),
            status_interval: read_duration(
                "TALLY_STATUS_INTERVAL_MS",
                DEFAULT_STATUS_INTERVAL_MS,
                Duration::from_millis,
            ),
            strict_integer_scores: read_flag("TALLY_STRICT_INTEGER_SCORES"),
        })
    }

    /// Returns the engine configuration, if an API key was provided.
    pub fn engine(&self) -> Option<&EngineEnv> {
        self.engine.as_ref()
    }

    /// Returns a clone of the shared reqwest HTTP client.
    pub fn http_client(&self) -> Client {
        self.http_client.clone()
    }

    /// Returns the prompt bundle.
    pub fn prompts(&self) -> &GradingPrompts {
        &self.prompts
    }

    /// Returns the grading request deadline.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the status ticker period.
    pub fn status_interval(&self) -> Duration {
        self.status_interval
    }

    /// Returns the decoder options derived from the environment.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            strict_integer_scores: self.strict_integer_scores,
        }
    }
}

/// Shared configuration handle used throughout the crate.
#[derive(Clone)]
pub struct ConfigHandle(Arc<ConfigState>);

impl std::ops::Deref for ConfigHandle {
    type Target = ConfigState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Global storage for the lazily constructed configuration state.
static CONFIG_SLOT: OnceLock<Mutex<Option<Arc<ConfigState>>>> = OnceLock::new();

/// Returns the mutex guarding the global configuration slot.
fn slot() -> &'static Mutex<Option<Arc<ConfigState>>> {
    CONFIG_SLOT.get_or_init(|| Mutex::new(None))
}

/// Ensure the global configuration has been initialized and return a handle.
pub fn ensure_initialized() -> Result<ConfigHandle> {
    let mut guard = slot()
        .lock()
        .map_err(|_| anyhow::anyhow!("config slot poisoned"))?;
    if let Some(cfg) = guard.as_ref() {
        return Ok(ConfigHandle(Arc::clone(cfg)));
    }

    let cfg = Arc::new(ConfigState::new()?);
    *guard = Some(Arc::clone(&cfg));
    Ok(ConfigHandle(cfg))
}

/// Reads a trimmed, non-empty environment variable.
fn non_empty_var(env: &str) -> Option<String> {
    std::env::var(env)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Parses an environment variable into a `Duration`, falling back to
/// `default` when parsing fails or the variable is missing.
fn read_duration(env: &str, default: u64, unit: fn(u64) -> Duration) -> Duration {
    std::env::var(env)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(unit)
        .unwrap_or_else(|| unit(default))
}

/// Reads a boolean flag; `1`, `true`, `yes` and `on` count as set.
fn read_flag(env: &str) -> bool {
    std::env::var(env)
        .map(|value| {
            matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
        })
        .unwrap_or(false)
}
