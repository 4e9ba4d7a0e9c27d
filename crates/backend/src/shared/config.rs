use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Output of `trunk build` for the widget
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub api_endpoint: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    /// Used once when the primary model reports a rate limit / quota error
    #[serde(default)]
    pub fallback_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Empty means the built-in prompt
    #[serde(default)]
    pub system_prompt_path: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "dist".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000
static_dir = "dist"

[llm]
api_endpoint = "https://generativelanguage.googleapis.com/v1beta/openai"
api_key = ""
model = "gemini-flash-latest"
fallback_model = "gemini-flash-latest"
temperature = 0.7
max_tokens = 2048
system_prompt_path = ""
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// `LLM_API_KEY` and `LLM_MODEL` environment variables override the file.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = read_config_file()?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn read_config_file() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(key) = lookup("LLM_API_KEY").filter(|v| !v.trim().is_empty()) {
        config.llm.api_key = key;
    }
    if let Some(model) = lookup("LLM_MODEL").filter(|v| !v.trim().is_empty()) {
        config.llm.model = model;
    }
}

/// API key for the model provider, or a clear startup error when missing
pub fn get_api_key(config: &LlmConfig) -> anyhow::Result<String> {
    let key = config.api_key.trim();
    if key.is_empty() {
        anyhow::bail!(
            "No LLM API key configured. Set LLM_API_KEY or `llm.api_key` in config.toml."
        );
    }
    Ok(key.to_string())
}

/// Resolve a configured path: absolute as is, relative to the executable
/// directory when the file exists there, otherwise relative to the current
/// directory.
pub fn resolve_path(path_str: &str) -> PathBuf {
    let path = Path::new(path_str);
    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let candidate = exe_dir.join(path);
            if candidate.exists() {
                return candidate;
            }
        }
    }

    PathBuf::from(path_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.static_dir, "dist");
        assert_eq!(config.llm.model, "gemini-flash-latest");
        assert!(config.llm.api_key.is_empty());
        assert!(config.llm.system_prompt_path.is_empty());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [llm]
            api_endpoint = "http://localhost:11434/v1"
            model = "llama3"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.llm.max_tokens, 2048);
        assert!(config.llm.fallback_model.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let mut config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        apply_env_overrides(&mut config, |key| match key {
            "LLM_API_KEY" => Some("secret".to_string()),
            "LLM_MODEL" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.llm.api_key, "secret");
        assert_eq!(config.llm.model, "gemini-flash-latest");
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert!(get_api_key(&config.llm).is_err());
    }
}
