//! Configuration for the extraction pipeline

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the extraction pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum input text length (characters)
    pub max_text_length: usize,

    /// Maximum chunk size (characters)
    pub max_chunk_size: usize,

    /// Maximum time for a single completion call (seconds)
    pub extraction_timeout_secs: u64,

    /// Upper bound on generated tokens per completion call
    pub max_tokens: u32,

    /// Model identifier passed to the provider and recorded in metadata
    pub model: String,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.max_text_length == 0 {
            return Err(ExtractorError::Config(
                "max_text_length must be greater than 0".to_string(),
            ));
        }
        if self.max_chunk_size == 0 {
            return Err(ExtractorError::Config(
                "max_chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.max_chunk_size > self.max_text_length {
            return Err(ExtractorError::Config(
                "max_chunk_size cannot exceed max_text_length".to_string(),
            ));
        }
        if self.extraction_timeout_secs == 0 {
            return Err(ExtractorError::Config(
                "extraction_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(ExtractorError::Config(
                "max_tokens must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_text_length: 200_000,
            max_chunk_size: 12_000,
            extraction_timeout_secs: 120,
            max_tokens: 4_000,
            model: "claude-3-7-sonnet-20250219".to_string(),
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: shorter timeout, smaller chunks for faster runs
    pub fn aggressive() -> Self {
        Self {
            max_text_length: 80_000,
            max_chunk_size: 6_000,
            extraction_timeout_secs: 60,
            max_tokens: 2_000,
            ..Self::default()
        }
    }

    /// Lenient preset: longer timeout, larger chunks for better recall
    pub fn lenient() -> Self {
        Self {
            max_text_length: 400_000,
            max_chunk_size: 20_000,
            extraction_timeout_secs: 300,
            max_tokens: 8_000,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("failed to serialize to TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ExtractorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::aggressive().validate().is_ok());
        assert!(ExtractorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_max_text_length() {
        let mut config = ExtractorConfig::default();
        config.max_text_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_chunk_size_too_large() {
        let mut config = ExtractorConfig::default();
        config.max_chunk_size = config.max_text_length + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_zero_timeout() {
        let mut config = ExtractorConfig::default();
        config.extraction_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();

        assert_eq!(config.max_text_length, parsed.max_text_length);
        assert_eq!(config.max_chunk_size, parsed.max_chunk_size);
        assert_eq!(config.extraction_timeout_secs, parsed.extraction_timeout_secs);
        assert_eq!(config.model, parsed.model);
    }
}
