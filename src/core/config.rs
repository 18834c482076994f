//=========================================================================
// Configuration Loading
//=========================================================================
//
// JSON loading for the serde-backed configuration structs (pool configs,
// brain configs, engine config).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

//=== ConfigError =========================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

//=== Loading =============================================================

/// Parses a configuration value from JSON text.
pub fn from_json<T: DeserializeOwned>(text: &str) -> Result<T, ConfigError> {
    Ok(serde_json::from_str(text)?)
}

/// Reads and parses a JSON configuration file.
pub fn from_json_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path)?;
    from_json(&text)
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        size: u32,
    }

    #[test]
    fn parses_valid_json() {
        let sample: Sample = from_json(r#"{ "size": 4 }"#).unwrap();
        assert_eq!(sample, Sample { size: 4 });
    }

    #[test]
    fn malformed_json_is_reported() {
        let result: Result<Sample, _> = from_json("{ size: ");
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result: Result<Sample, _> = from_json_file("/definitely/not/here.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
