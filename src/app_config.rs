use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Application configuration module
/// This module handles the engine configuration including loading,
/// validating and defaulting all tunables of the batch planner,
/// the concurrent executor and the provider clients.
/// Represents the engine configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    /// Completion provider to use
    #[serde(default)]
    pub provider: CompletionProvider,

    /// Size of the executor pool (parallel batch workers)
    #[serde(default = "default_max_concurrent_batches")]
    pub max_concurrent_batches: usize,

    /// Per-attempt LLM call timeout in seconds
    #[serde(default = "default_per_attempt_timeout_s")]
    pub per_attempt_timeout_s: u64,

    /// Retry budget per batch
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed backoff between retries in seconds
    #[serde(default = "default_retry_backoff_s")]
    pub retry_backoff_s: u64,

    /// Planner look-ahead window for section analysis
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Token target for SIMPLE sections
    #[serde(default = "default_token_target_simple")]
    pub token_target_simple: usize,

    /// Token target for MODERATE sections
    #[serde(default = "default_token_target_moderate")]
    pub token_target_moderate: usize,

    /// Token target for COMPLEX sections
    #[serde(default = "default_token_target_complex")]
    pub token_target_complex: usize,

    /// Threshold in seconds for caller-side stuck detection
    ///
    /// The engine never self-cancels; a status reader compares the time
    /// since the last completed batch against this value.
    #[serde(default = "default_stuck_threshold_s")]
    pub stuck_threshold_s: u64,

    /// Service endpoint override (empty = provider default)
    #[serde(default)]
    pub endpoint: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            provider: CompletionProvider::default(),
            max_concurrent_batches: default_max_concurrent_batches(),
            per_attempt_timeout_s: default_per_attempt_timeout_s(),
            max_retries: default_max_retries(),
            retry_backoff_s: default_retry_backoff_s(),
            window_size: default_window_size(),
            token_target_simple: default_token_target_simple(),
            token_target_moderate: default_token_target_moderate(),
            token_target_complex: default_token_target_complex(),
            stuck_threshold_s: default_stuck_threshold_s(),
            endpoint: String::new(),
        }
    }
}

impl EngineConfig {
    /// Validate the configuration values
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_batches == 0 {
            return Err(anyhow!("max_concurrent_batches must be at least 1"));
        }
        if self.window_size == 0 {
            return Err(anyhow!("window_size must be at least 1"));
        }
        if self.token_target_simple == 0
            || self.token_target_moderate == 0
            || self.token_target_complex == 0
        {
            return Err(anyhow!("token targets must be non-zero"));
        }
        Ok(())
    }
}

/// Completion provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompletionProvider {
    /// Google-family completion service
    #[default]
    Gemini,
    /// Aggregator service routing to many upstream models
    OpenRouter,
}

impl CompletionProvider {
    /// Capitalized provider name for display
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenRouter => "OpenRouter",
        }
    }

    /// Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::OpenRouter => "openrouter".to_string(),
        }
    }
}

impl std::fmt::Display for CompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for CompletionProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openrouter" => Ok(Self::OpenRouter),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Per-model USD price per million tokens, used for the response's
/// estimated_cost stat. Unknown models fall back to a conservative
/// blended rate.
pub fn model_rates_per_million(model: &str) -> (f64, f64) {
    let lower = model.to_lowercase();
    if lower.contains("flash") {
        (0.10, 0.40)
    } else if lower.contains("gemini") && lower.contains("pro") {
        (1.25, 5.00)
    } else if lower.contains("haiku") {
        (0.80, 4.00)
    } else if lower.contains("sonnet") {
        (3.00, 15.00)
    } else if lower.contains("gpt-4o-mini") {
        (0.15, 0.60)
    } else {
        (0.50, 1.50)
    }
}

/// Estimate the request cost in USD from token totals
pub fn estimate_cost(model: &str, input_tokens: u64, output_tokens: u64) -> f64 {
    let (in_rate, out_rate) = model_rates_per_million(model);
    (input_tokens as f64 * in_rate + output_tokens as f64 * out_rate) / 1_000_000.0
}

fn default_max_concurrent_batches() -> usize {
    4
}

fn default_per_attempt_timeout_s() -> u64 {
    600
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_s() -> u64 {
    2
}

fn default_window_size() -> usize {
    100
}

fn default_token_target_simple() -> usize {
    5000
}

fn default_token_target_moderate() -> usize {
    3000
}

fn default_token_target_complex() -> usize {
    2000
}

fn default_stuck_threshold_s() -> u64 {
    600
}
