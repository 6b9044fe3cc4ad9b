//! Generative backend implementations for the Vitrine assistant gateway.
//!
//! Two real backends (OpenAI-compatible and Anthropic native) plus a
//! scripted backend for tests and offline development. `build_from_config`
//! selects one at startup.

pub mod anthropic;
pub mod openai_compat;
pub mod scripted;

use std::sync::Arc;

pub use anthropic::AnthropicBackend;
pub use openai_compat::OpenAiCompatBackend;
pub use scripted::ScriptedBackend;

use vitrine_config::AppConfig;
use vitrine_core::error::BackendError;
use vitrine_core::ChatBackend;

/// Build the configured backend.
///
/// Fails with `NotConfigured` when the backend name is unknown or the
/// required API key is missing — both are startup errors, not per-request
/// errors.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn ChatBackend>, BackendError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        BackendError::NotConfigured(
            "no API key set — configure api_key or export VITRINE_API_KEY".into(),
        )
    })?;

    match config.backend.as_str() {
        "anthropic" => {
            let mut backend = AnthropicBackend::new(&api_key, &config.model)
                .with_temperature(config.temperature)
                .with_max_tokens(config.max_tokens)
                .with_timeout_secs(config.request_timeout_secs);
            if let Some(url) = &config.api_url {
                backend = backend.with_base_url(url);
            }
            Ok(Arc::new(backend))
        }
        "openai_compat" | "openai" => {
            let base_url = config
                .api_url
                .clone()
                .unwrap_or_else(|| "https://api.openai.com/v1".into());
            Ok(Arc::new(
                OpenAiCompatBackend::new(&config.backend, &base_url, &api_key, &config.model)
                    .with_temperature(config.temperature)
                    .with_max_tokens(config.max_tokens)
                    .with_timeout_secs(config.request_timeout_secs),
            ))
        }
        other => Err(BackendError::NotConfigured(format!(
            "unknown backend '{other}' — expected 'openai_compat' or 'anthropic'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_not_configured() {
        let config = AppConfig::default();
        let err = build_from_config(&config).err().unwrap();
        assert!(matches!(err, BackendError::NotConfigured(_)));
    }

    #[test]
    fn unknown_backend_name_rejected() {
        let config = AppConfig {
            api_key: Some("sk-test".into()),
            backend: "mystery".into(),
            ..AppConfig::default()
        };
        let err = build_from_config(&config).err().unwrap();
        assert!(err.to_string().contains("mystery"));
    }

    #[test]
    fn builds_both_known_backends() {
        let mut config = AppConfig {
            api_key: Some("sk-test".into()),
            ..AppConfig::default()
        };

        config.backend = "openai_compat".into();
        assert_eq!(build_from_config(&config).unwrap().name(), "openai_compat");

        config.backend = "anthropic".into();
        assert_eq!(build_from_config(&config).unwrap().name(), "anthropic");
    }
}
