//! Configuration types

use crate::*;
use serde::{Deserialize, Serialize};

/// Smallest well-formed document: length prefix plus terminator.
pub const MIN_DOCUMENT_LEN: usize = 5;

/// Decoder safety limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Largest top-level document accepted, in bytes
    pub max_message_bytes: usize,
    /// Deepest document nesting accepted (the top-level document is depth 1)
    pub max_nesting_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_message_bytes: 16 * 1024 * 1024,
            max_nesting_depth: 32,
        }
    }
}

impl CodecConfig {
    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `ROWCODEC_MAX_MESSAGE_BYTES`: Largest accepted message (default: 16 MiB)
    /// - `ROWCODEC_MAX_NESTING_DEPTH`: Deepest accepted nesting (default: 32)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_message_bytes: std::env::var("ROWCODEC_MAX_MESSAGE_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_message_bytes),
            max_nesting_depth: std::env::var("ROWCODEC_MAX_NESTING_DEPTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_nesting_depth),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> CodecResult<()> {
        if self.max_message_bytes < MIN_DOCUMENT_LEN {
            return Err(CodecError::Config(ConfigError::InvalidValue {
                field: "max_message_bytes".to_string(),
                value: self.max_message_bytes.to_string(),
                reason: format!("max_message_bytes must be at least {}", MIN_DOCUMENT_LEN),
            }));
        }

        if self.max_message_bytes > i32::MAX as usize {
            return Err(CodecError::Config(ConfigError::InvalidValue {
                field: "max_message_bytes".to_string(),
                value: self.max_message_bytes.to_string(),
                reason: "max_message_bytes must fit a 32-bit length prefix".to_string(),
            }));
        }

        if self.max_nesting_depth == 0 {
            return Err(CodecError::Config(ConfigError::InvalidValue {
                field: "max_nesting_depth".to_string(),
                value: self.max_nesting_depth.to_string(),
                reason: "max_nesting_depth must be greater than 0".to_string(),
            }));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EnvVarGuard {
        key: &'static str,
        original: Option<String>,
    }

    impl EnvVarGuard {
        fn set(key: &'static str, value: Option<&str>) -> Self {
            let original = std::env::var(key).ok();
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
            Self { key, original }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            match self.original.as_deref() {
                Some(v) => std::env::set_var(self.key, v),
                None => std::env::remove_var(self.key),
            }
        }
    }

    // Single test so the two variables are never mutated concurrently.
    #[test]
    fn test_from_env_overrides_and_fallbacks() {
        {
            let _bytes = EnvVarGuard::set("ROWCODEC_MAX_MESSAGE_BYTES", Some("4096"));
            let _depth = EnvVarGuard::set("ROWCODEC_MAX_NESTING_DEPTH", Some("8"));
            let config = CodecConfig::from_env();
            assert_eq!(config.max_message_bytes, 4096);
            assert_eq!(config.max_nesting_depth, 8);
            assert!(config.validate().is_ok());
        }

        let _bytes = EnvVarGuard::set("ROWCODEC_MAX_MESSAGE_BYTES", Some("lots"));
        let _depth = EnvVarGuard::set("ROWCODEC_MAX_NESTING_DEPTH", None);
        assert_eq!(CodecConfig::from_env(), CodecConfig::default());
    }

    #[test]
    fn test_default_is_valid() {
        assert!(CodecConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_tiny_message_limit() {
        let config = CodecConfig {
            max_message_bytes: 4,
            ..CodecConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(format!("{}", err).contains("max_message_bytes"));
    }

    #[test]
    fn test_validate_rejects_zero_depth() {
        let config = CodecConfig {
            max_nesting_depth: 0,
            ..CodecConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CodecError::Config(ConfigError::InvalidValue { .. }))
        ));
    }
}
