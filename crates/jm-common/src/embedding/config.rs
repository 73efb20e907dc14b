use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbeddingConfigError {
    #[error("unknown embedding backend: {0}")]
    UnknownBackend(String),
    #[error("embedding dimension must be greater than 0")]
    ZeroDimension,
    #[error("invalid value for {key}: {value}")]
    InvalidSetting { key: &'static str, value: String },
}

/// Which concrete provider backs `embed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderBackend {
    /// Deterministic feature hashing, no model files.
    Hash,
    /// Every call is `Unavailable`; ranking runs on the keyword fallback.
    Disabled,
}

impl FromStr for EmbedderBackend {
    type Err = EmbeddingConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "hash" => Ok(EmbedderBackend::Hash),
            "none" | "disabled" | "off" => Ok(EmbedderBackend::Disabled),
            other => Err(EmbeddingConfigError::UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingConfig {
    pub backend: EmbedderBackend,
    /// Vector length (powers of two recommended: 256, 512, 1024)
    pub dimension: usize,
    /// Wrap the provider in the normalized-text cache
    pub cache_enabled: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbedderBackend::Hash,
            dimension: 256,
            cache_enabled: true,
        }
    }
}

impl EmbeddingConfig {
    /// Read `JM_EMBEDDER`, `JM_EMBEDDING_DIMENSION` and `JM_EMBEDDING_CACHE`.
    ///
    /// Unset or blank variables keep the defaults. Anything set but unparsable is an
    /// error, as is a zero dimension.
    pub fn from_env() -> Result<Self, EmbeddingConfigError> {
        let defaults = Self::default();

        let backend = match env_value("JM_EMBEDDER") {
            Some(raw) => raw.parse()?,
            None => defaults.backend,
        };
        let dimension = match env_value("JM_EMBEDDING_DIMENSION") {
            Some(raw) => raw
                .parse()
                .map_err(|_| EmbeddingConfigError::InvalidSetting {
                    key: "JM_EMBEDDING_DIMENSION",
                    value: raw,
                })?,
            None => defaults.dimension,
        };
        let cache_enabled = match env_value("JM_EMBEDDING_CACHE") {
            Some(raw) => parse_flag(&raw).ok_or(EmbeddingConfigError::InvalidSetting {
                key: "JM_EMBEDDING_CACHE",
                value: raw,
            })?,
            None => defaults.cache_enabled,
        };

        let config = Self {
            backend,
            dimension,
            cache_enabled,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EmbeddingConfigError> {
        if self.dimension == 0 {
            return Err(EmbeddingConfigError::ZeroDimension);
        }
        Ok(())
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn with_env<T>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> T) -> T {
        static ENV_GUARD: Mutex<()> = Mutex::new(());
        let _guard = ENV_GUARD.lock().unwrap_or_else(|e| e.into_inner());

        let prev: Vec<(String, Option<String>)> = vars
            .iter()
            .map(|(key, value)| {
                let previous = std::env::var(key).ok();
                match value {
                    Some(v) => unsafe { std::env::set_var(key, v) },
                    None => unsafe { std::env::remove_var(key) },
                }
                (key.to_string(), previous)
            })
            .collect();

        let out = f();

        for (key, previous) in prev {
            match previous {
                Some(v) => unsafe { std::env::set_var(&key, v) },
                None => unsafe { std::env::remove_var(&key) },
            }
        }
        out
    }

    #[test]
    fn from_env_reads_all_settings() {
        let config = with_env(
            &[
                ("JM_EMBEDDER", Some("none")),
                ("JM_EMBEDDING_DIMENSION", Some(" 128 ")),
                ("JM_EMBEDDING_CACHE", Some("off")),
            ],
            EmbeddingConfig::from_env,
        )
        .unwrap();

        assert_eq!(
            config,
            EmbeddingConfig {
                backend: EmbedderBackend::Disabled,
                dimension: 128,
                cache_enabled: false,
            }
        );
    }

    #[test]
    fn from_env_keeps_defaults_when_unset() {
        let config = with_env(
            &[
                ("JM_EMBEDDER", None),
                ("JM_EMBEDDING_DIMENSION", Some("")),
                ("JM_EMBEDDING_CACHE", None),
            ],
            EmbeddingConfig::from_env,
        )
        .unwrap();

        assert_eq!(config, EmbeddingConfig::default());
    }

    #[test]
    fn from_env_rejects_unparsable_values() {
        let dimension = with_env(
            &[
                ("JM_EMBEDDER", None),
                ("JM_EMBEDDING_DIMENSION", Some("abc")),
                ("JM_EMBEDDING_CACHE", None),
            ],
            EmbeddingConfig::from_env,
        );
        assert_eq!(
            dimension,
            Err(EmbeddingConfigError::InvalidSetting {
                key: "JM_EMBEDDING_DIMENSION",
                value: "abc".into(),
            })
        );

        let cache = with_env(
            &[
                ("JM_EMBEDDER", None),
                ("JM_EMBEDDING_DIMENSION", None),
                ("JM_EMBEDDING_CACHE", Some("maybe")),
            ],
            EmbeddingConfig::from_env,
        );
        assert!(matches!(
            cache,
            Err(EmbeddingConfigError::InvalidSetting {
                key: "JM_EMBEDDING_CACHE",
                ..
            })
        ));

        let zero = with_env(
            &[
                ("JM_EMBEDDER", None),
                ("JM_EMBEDDING_DIMENSION", Some("0")),
                ("JM_EMBEDDING_CACHE", None),
            ],
            EmbeddingConfig::from_env,
        );
        assert_eq!(zero, Err(EmbeddingConfigError::ZeroDimension));
    }

    #[test]
    fn parses_backend_names() {
        assert_eq!("hash".parse(), Ok(EmbedderBackend::Hash));
        assert_eq!(" NONE ".parse(), Ok(EmbedderBackend::Disabled));
        assert_eq!(
            "onnx".parse::<EmbedderBackend>(),
            Err(EmbeddingConfigError::UnknownBackend("onnx".into()))
        );
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let config = EmbeddingConfig {
            dimension: 0,
            ..EmbeddingConfig::default()
        };
        assert_eq!(config.validate(), Err(EmbeddingConfigError::ZeroDimension));
    }
}
