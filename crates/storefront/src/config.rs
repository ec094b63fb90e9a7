//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `OPENAI_API_KEY` - when `CHAT_PROVIDER=openai` (the default)
//! - `GEMINI_API_KEY` - when `CHAT_PROVIDER=gemini`
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: <http://localhost:3000>)
//! - `CHAT_PROVIDER` - `openai` or `gemini` (default: openai)
//! - `OPENAI_MODEL` / `OPENAI_BASE_URL` - (default: gpt-4, <https://api.openai.com/v1>)
//! - `GEMINI_MODEL` / `GEMINI_BASE_URL` - (default: gemini-1.5-flash, Google's v1beta endpoint)
//! - `CHAT_TEMPERATURE` - Sampling temperature (default: 0.7)
//! - `CHAT_MAX_TOKENS` - Completion length cap (default: 500)
//! - `CHAT_TIMEOUT_SECS` - Completion timeout (default: 60)
//! - `CHAT_TYPING_BASE_MS` - Typing effect delay per character (default: 30)
//! - `CHAT_TYPING_START_MS` - Pause before the first character (default: 500)
//! - `CHECKOUT_PROCESSING_MS` - Simulated payment processing time (default: 2000)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Chat assistant configuration
    pub chat: ChatConfig,
    /// Simulated payment processing delay
    pub checkout_processing: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Which remote completion API answers chat turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatProvider {
    #[default]
    OpenAi,
    Gemini,
}

impl FromStr for ChatProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            other => Err(format!("expected 'openai' or 'gemini', got '{other}'")),
        }
    }
}

/// Chat assistant configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ChatConfig {
    pub provider: ChatProvider,
    /// API key for the selected provider (server-side only)
    pub api_key: SecretString,
    pub model: String,
    /// Provider API root, without a trailing slash
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound on a single completion call
    pub timeout: Duration,
    /// Typing effect delay for an ordinary character
    pub typing_base: Duration,
    /// Pause before the first revealed character
    pub typing_start: Duration,
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("typing_base", &self.typing_base)
            .field("typing_start", &self.typing_start)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        let chat = ChatConfig::from_env()?;
        let checkout_processing =
            Duration::from_millis(parse_env("CHECKOUT_PROCESSING_MS", "2000")?);

        Ok(Self {
            host,
            port,
            base_url,
            chat,
            checkout_processing,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "1.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ChatConfig {
    /// Load only the chat settings. Used by the CLI, which has no HTTP server.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the selected provider's key is missing or
    /// insecure, or a numeric setting does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let provider: ChatProvider = parse_env("CHAT_PROVIDER", "openai")?;
        let (api_key, model, base_url) = match provider {
            ChatProvider::OpenAi => (
                get_validated_secret("OPENAI_API_KEY")?,
                get_env_or_default("OPENAI_MODEL", "gpt-4"),
                get_env_or_default("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            ),
            ChatProvider::Gemini => (
                get_validated_secret("GEMINI_API_KEY")?,
                get_env_or_default("GEMINI_MODEL", "gemini-1.5-flash"),
                get_env_or_default("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            ),
        };

        Ok(Self {
            provider,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            temperature: parse_env("CHAT_TEMPERATURE", "0.7")?,
            max_tokens: parse_env("CHAT_MAX_TOKENS", "500")?,
            timeout: Duration::from_secs(parse_env("CHAT_TIMEOUT_SECS", "60")?),
            typing_base: Duration::from_millis(parse_env("CHAT_TYPING_BASE_MS", "30")?),
            typing_start: Duration::from_millis(parse_env("CHAT_TYPING_START_MS", "500")?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real API keys are random strings
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the provider."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn chat_config() -> ChatConfig {
        ChatConfig {
            provider: ChatProvider::OpenAi,
            api_key: SecretString::from("sk-live-9fQ2mZr7TxKp4LwB"),
            model: "gpt-4".to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            temperature: 0.7,
            max_tokens: 500,
            timeout: Duration::from_secs(60),
            typing_base: Duration::from_millis(30),
            typing_start: Duration::from_millis(500),
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-openai-key", "OPENAI_API_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("sk-aaaaaaaaaaaaaaaaaaaaaa", "OPENAI_API_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("sk-live-9fQ2mZr7TxKp4LwB", "OPENAI_API_KEY");
        assert!(result.is_ok());
    }

    #[test]
    fn test_chat_provider_from_str() {
        assert_eq!("openai".parse(), Ok(ChatProvider::OpenAi));
        assert_eq!(" Gemini ".parse(), Ok(ChatProvider::Gemini));
        assert!("mistral".parse::<ChatProvider>().is_err());
    }

    #[test]
    fn test_parse_value_reports_key() {
        let err = parse_value::<u32>("CHAT_MAX_TOKENS", "lots").unwrap_err();
        assert!(err.to_string().contains("CHAT_MAX_TOKENS"));
        let tokens: u32 = parse_value("CHAT_MAX_TOKENS", " 500 ").unwrap();
        assert_eq!(tokens, 500);
    }

    #[test]
    fn test_socket_addr_and_https() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "https://freshking.com".to_string(),
            chat: chat_config(),
            checkout_processing: Duration::from_millis(2000),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(config.is_https());
    }

    #[test]
    fn test_chat_config_debug_redacts_key() {
        let debug_output = format!("{:?}", chat_config());
        assert!(debug_output.contains("gpt-4"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("9fQ2mZr7TxKp4LwB"));
    }
}
