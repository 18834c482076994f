//=========================================================================
// Pool Configuration
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::core::config::{self, ConfigError};

//=== SimplePoolConfig ====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplePoolConfig {
    /// Instances created by `fill_pool`.
    pub pool_size: usize,
    /// Whether an exhausted pool may create one more instance per request.
    pub can_expand: bool,
    /// Join an identically named waiting pool instead of creating one.
    pub mutualize_waiting_pools: bool,
}

impl Default for SimplePoolConfig {
    fn default() -> Self {
        Self {
            pool_size: 20,
            can_expand: true,
            mutualize_waiting_pools: false,
        }
    }
}

impl SimplePoolConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        config::from_json(text)
    }
}

//=== MultiplePoolConfig ==================================================

/// Quota and flags for one prototype of a multiple pooler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolEntryConfig {
    pub prototype: String,
    pub pool_size: usize,
    pub can_expand: bool,
    pub enabled: bool,
}

impl Default for PoolEntryConfig {
    fn default() -> Self {
        Self {
            prototype: String::new(),
            pool_size: 0,
            can_expand: true,
            enabled: true,
        }
    }
}

impl PoolEntryConfig {
    pub fn new(prototype: impl Into<String>, pool_size: usize) -> Self {
        Self {
            prototype: prototype.into(),
            pool_size,
            ..Self::default()
        }
    }

    pub fn with_expand(mut self, can_expand: bool) -> Self {
        self.can_expand = can_expand;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiplePoolConfig {
    pub entries: Vec<PoolEntryConfig>,
    pub mutualize_waiting_pools: bool,
    /// Seed for the fill-order shuffle; drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl MultiplePoolConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let parsed: Self = config::from_json(text)?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Rejects empty and repeated prototype names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if entry.prototype.is_empty() {
                return Err(ConfigError::Invalid("pool entry without prototype name".into()));
            }
            if !seen.insert(entry.prototype.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "prototype '{}' is listed more than once",
                    entry.prototype
                )));
            }
        }
        Ok(())
    }
}

//=========================================================================
// Tests
//=========================================================================
