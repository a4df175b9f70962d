use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Default model used when nothing else is configured
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default OpenAI-compatible API root
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Environment variable holding the API credential
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Errors that can occur while calling the oracle
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Oracle API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Oracle call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Oracle returned no completion text")]
    EmptyResponse,

    #[error("Invalid oracle response: {0}")]
    InvalidResponse(String),

    #[error("Oracle configuration error: {0}")]
    ConfigError(String),
}

impl OracleError {
    pub fn is_timeout(&self) -> bool {
        match self {
            OracleError::Timeout(_) => true,
            OracleError::Network(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Configuration for oracle calls
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Model identifier sent with every request
    pub model: String,
    /// API root, without the `/v1/...` suffix
    pub base_url: String,
    /// Bearer credential (None = unauthenticated, e.g. a local server)
    pub api_key: Option<String>,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Optional transport timeout (None = no limit)
    pub timeout: Option<Duration>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: std::env::var(DEFAULT_API_KEY_ENV).ok(),
            max_tokens: 4096,
            timeout: None,
        }
    }
}

impl OracleConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Supported oracle backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OracleType {
    /// Any server speaking the OpenAI chat-completions API
    #[default]
    OpenAi,
}

impl std::fmt::Display for OracleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OracleType::OpenAi => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for OracleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "open-ai" | "openai-compatible" => Ok(OracleType::OpenAi),
            _ => Err(format!("Unknown oracle provider: {}", s)),
        }
    }
}

/// A single stateless completion call: system instructions plus one prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    pub system: String,
    pub prompt: String,
}

impl OracleRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
        }
    }
}

/// The text-completion capability every proxy talks to.
///
/// Implementations must not keep conversation history between calls and must
/// return the model's text untouched.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Human-readable name (e.g., "OpenAI")
    fn name(&self) -> &str;

    /// The oracle type
    fn oracle_type(&self) -> OracleType;

    /// Model the oracle sends requests to
    fn model(&self) -> &str;

    /// Run one completion and return the raw text
    async fn complete(&self, request: &OracleRequest) -> Result<String, OracleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_type_round_trip() {
        assert_eq!("openai".parse::<OracleType>().unwrap(), OracleType::OpenAi);
        assert_eq!("OpenAI".parse::<OracleType>().unwrap(), OracleType::OpenAi);
        assert_eq!(OracleType::OpenAi.to_string(), "openai");
        assert!("gemini".parse::<OracleType>().is_err());
    }

    #[test]
    fn test_config_builder_trims_base_url() {
        let config = OracleConfig::new("gpt-4o")
            .with_base_url("http://localhost:11434/".to_string())
            .with_api_key(None)
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, "http://localhost:11434");
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_timeout_detection() {
        assert!(OracleError::Timeout(Duration::from_secs(30)).is_timeout());
        assert!(!OracleError::EmptyResponse.is_timeout());
        assert!(!OracleError::Api {
            status: 500,
            message: "boom".to_string()
        }
        .is_timeout());
    }
}
