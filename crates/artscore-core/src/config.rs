use crate::errors::CoreError;
use crate::models::ScoreLabel;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the upstream API credential.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable overriding the listening port.
pub const PORT_VAR: &str = "PORT";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_server")]
    pub server: ServerConfig,
    #[serde(default = "default_upstream")]
    pub upstream: UpstreamConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: default_server(),
            upstream: default_upstream(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_variant")]
    pub variant: ScoreLabel,
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

#[derive(Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-call timeout. Unset means the client waits indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Normally supplied through `OPENAI_API_KEY` rather than the file.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

fn default_server() -> ServerConfig {
    ServerConfig {
        port: default_port(),
        host: default_host(),
        variant: default_variant(),
        public_dir: default_public_dir(),
        body_limit_bytes: default_body_limit(),
    }
}

fn default_upstream() -> UpstreamConfig {
    UpstreamConfig {
        endpoint: default_endpoint(),
        model: default_model(),
        max_tokens: default_max_tokens(),
        timeout_secs: None,
        api_key: None,
    }
}

fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_variant() -> ScoreLabel {
    ScoreLabel::Smi
}
fn default_public_dir() -> String {
    "public".to_string()
}
fn default_body_limit() -> usize {
    50 * 1024 * 1024
}
fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
fn default_model() -> String {
    "gpt-4-turbo-preview".to_string()
}
fn default_max_tokens() -> u32 {
    1000
}

impl Config {
    /// Load config from the given path, or return defaults if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| CoreError::Io(format!("reading config: {e}")))?;
            let config: Config =
                toml::from_str(&contents).map_err(|e| CoreError::Config(e.to_string()))?;

            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Overlay values from the process environment.
    ///
    /// `lookup` is the only way environment values enter the config, so the
    /// caller decides whether that is `std::env::var` or a fixed map in tests.
    /// Empty values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(API_KEY_VAR) {
            self.upstream.api_key = Some(key);
        }
        if let Some(port) = get(PORT_VAR) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| CoreError::Config(format!("invalid {PORT_VAR} '{port}': {e}")))?;
        }
        Ok(())
    }

    /// Resolve the public directory, relative paths against `base`.
    pub fn public_dir(&self, base: &Path) -> PathBuf {
        let dir = PathBuf::from(&self.server.public_dir);
        if dir.is_absolute() { dir } else { base.join(dir) }
    }
}
