//! Configuration loading.
//!
//! Reads the optional `config.toml`, then lets environment variables
//! override the provider section. Nothing here is fatal: a missing or broken
//! file and malformed model lists all degrade to defaults with a warning.

use std::path::Path;

use scribe_types::config::{ConfigError, ProviderSettings, ScribeConfig};
use scribe_types::llm::DynamicModelSpec;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const OLLAMA_URL: &str = "OLLAMA_URL";
pub const OLLAMA_LMS: &str = "OLLAMA_LMS";
pub const OPENAI_COMPATIBLE_URL: &str = "OPENAI_COMPATIBLE_URL";
pub const OPENAI_COMPATIBLE_KEY: &str = "OPENAI_COMPATIBLE_KEY";
pub const OPENAI_COMPATIBLE_LMS: &str = "OPENAI_COMPATIBLE_LMS";

/// Load `config.toml` from `path`.
///
/// Returns defaults if the file is missing or cannot be parsed.
pub async fn load_config(path: &Path) -> ScribeConfig {
    match read_config(path).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            ScribeConfig::default()
        }
        Err(err) => {
            tracing::warn!("{err}, using defaults");
            ScribeConfig::default()
        }
    }
}

/// Strict variant of [`load_config`]: `Ok(None)` when the file does not exist.
pub async fn read_config(path: &Path) -> Result<Option<ScribeConfig>, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    toml::from_str::<ScribeConfig>(&content)
        .map(Some)
        .map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        })
}

/// Parse a `*_LMS` variable: a JSON array of `{code, context_length, vision}`.
///
/// Blank input is an empty list.
pub fn parse_model_list(var: &str, raw: &str) -> Result<Vec<DynamicModelSpec>, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(|err| ConfigError::ModelList {
        var: var.to_string(),
        message: err.to_string(),
    })
}

fn model_list_or_empty(var: &str, raw: &str) -> Vec<DynamicModelSpec> {
    parse_model_list(var, raw).unwrap_or_else(|err| {
        tracing::warn!("{err}, ignoring");
        Vec::new()
    })
}

/// Overlay environment variables on `providers`.
///
/// `lookup` is `std::env::var(..).ok()` in production. Set variables win
/// over the file, including empty strings (which disable the setting).
pub fn apply_env_overrides(providers: &mut ProviderSettings, lookup: impl Fn(&str) -> Option<String>) {
    let string = |var: &str| lookup(var).map(|v| v.trim().to_string());

    if let Some(key) = string(OPENAI_API_KEY) {
        providers.openai_api_key = Some(key).filter(|k| !k.is_empty());
    }
    if let Some(url) = string(OPENAI_BASE_URL) {
        providers.openai_base_url = Some(url).filter(|u| !u.is_empty());
    }
    if let Some(key) = string(ANTHROPIC_API_KEY) {
        providers.anthropic_api_key = Some(key).filter(|k| !k.is_empty());
    }
    if let Some(url) = string(OLLAMA_URL) {
        providers.ollama_url = Some(url).filter(|u| !u.is_empty());
    }
    if let Some(raw) = lookup(OLLAMA_LMS) {
        providers.ollama_models = model_list_or_empty(OLLAMA_LMS, &raw);
    }
    if let Some(url) = string(OPENAI_COMPATIBLE_URL) {
        providers.openai_compatible_url = Some(url).filter(|u| !u.is_empty());
    }
    if let Some(key) = string(OPENAI_COMPATIBLE_KEY) {
        providers.openai_compatible_key = Some(key).filter(|k| !k.is_empty());
    }
    if let Some(raw) = lookup(OPENAI_COMPATIBLE_LMS) {
        providers.openai_compatible_models = model_list_or_empty(OPENAI_COMPATIBLE_LMS, &raw);
    }
}

/// [`load_config`] followed by [`apply_env_overrides`] from the process environment.
pub async fn load_config_with_env(path: &Path) -> ScribeConfig {
    let mut config = load_config(path).await;
    apply_env_overrides(&mut config.providers, |var| std::env::var(var).ok());
    tracing::debug!(providers = ?config.providers, "configuration loaded");
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("config.toml")).await;
        assert!(config.providers.openai_api_key.is_none());
        assert_eq!(config.retrieval.max_results, 5);
        assert!(read_config(&tmp.path().join("config.toml")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        tokio::fs::write(
            &path,
            r#"
[providers]
anthropic_api_key = "sk-ant-file"
openai_compatible_url = "http://localhost:8000"

[[providers.openai_compatible_models]]
code = "qwen2.5"
context_length = 32768

[retrieval]
max_results = 3
fetch_timeout_secs = 10
"#,
        )
        .await
        .unwrap();

        let config = load_config(&path).await;
        assert_eq!(config.providers.anthropic_api_key.as_deref(), Some("sk-ant-file"));
        assert_eq!(config.providers.openai_compatible_models.len(), 1);
        assert!(!config.providers.openai_compatible_models[0].vision);
        assert_eq!(config.retrieval.max_results, 3);
        assert_eq!(config.retrieval.fetch_timeout_secs, 10);
        assert_eq!(config.retrieval.fetch_concurrency, 10);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        tokio::fs::write(&path, "[providers\nnot toml").await.unwrap();

        let config = load_config(&path).await;
        assert!(config.providers.anthropic_api_key.is_none());
        assert!(matches!(read_config(&path).await, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_parse_model_list() {
        let models = parse_model_list(
            OLLAMA_LMS,
            r#"[{"code": "llama3", "context_length": 8192, "vision": false},
                {"code": "llava", "context_length": 4096, "vision": true}]"#,
        )
        .unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[1].code, "llava");
        assert!(models[1].vision);

        assert!(parse_model_list(OLLAMA_LMS, "  ").unwrap().is_empty());
        assert!(parse_model_list(OLLAMA_LMS, "[]").unwrap().is_empty());
        let err = parse_model_list(OLLAMA_LMS, "{not json").unwrap_err();
        assert!(err.to_string().contains("OLLAMA_LMS"));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut providers = ProviderSettings {
            anthropic_api_key: Some("from-file".to_string()),
            openai_api_key: Some("file-openai".to_string()),
            ..Default::default()
        };
        apply_env_overrides(
            &mut providers,
            env(&[
                (ANTHROPIC_API_KEY, " from-env "),
                (OPENAI_API_KEY, ""),
                (OLLAMA_URL, "http://localhost:11434"),
                (OLLAMA_LMS, r#"[{"code": "llama3", "context_length": 8192, "vision": false}]"#),
            ]),
        );
        assert_eq!(providers.anthropic_api_key.as_deref(), Some("from-env"));
        assert!(providers.openai_api_key.is_none());
        assert_eq!(providers.ollama_url.as_deref(), Some("http://localhost:11434"));
        assert_eq!(providers.ollama_models.len(), 1);
        assert!(providers.openai_compatible_url.is_none());
    }

    #[test]
    fn test_malformed_model_list_is_empty() {
        let mut providers = ProviderSettings::default();
        apply_env_overrides(
            &mut providers,
            env(&[
                (OPENAI_COMPATIBLE_URL, "http://localhost:8000"),
                (OPENAI_COMPATIBLE_LMS, "[{\"code\": \"missing context\"}]"),
            ]),
        );
        assert_eq!(providers.openai_compatible_url.as_deref(), Some("http://localhost:8000"));
        assert!(providers.openai_compatible_models.is_empty());
    }

    #[test]
    fn test_openai_base_url_override() {
        let mut providers = ProviderSettings {
            openai_base_url: Some("https://file.example/v1".to_string()),
            ..Default::default()
        };
        apply_env_overrides(&mut providers, env(&[(OPENAI_BASE_URL, " https://proxy.internal/v1 ")]));
        assert_eq!(providers.openai_base_url.as_deref(), Some("https://proxy.internal/v1"));

        apply_env_overrides(&mut providers, env(&[(OPENAI_BASE_URL, "")]));
        assert!(providers.openai_base_url.is_none());
    }

    #[test]
    fn test_unset_variables_leave_file_values() {
        let mut providers = ProviderSettings {
            ollama_url: Some("http://gpu-box:11434".to_string()),
            ..Default::default()
        };
        apply_env_overrides(&mut providers, env(&[]));
        assert_eq!(providers.ollama_url.as_deref(), Some("http://gpu-box:11434"));
    }
}
