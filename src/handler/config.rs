//! Handler configuration.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Policy knobs shared by every load a handler performs.
///
/// ```yaml
/// enabled: true
/// ttl_ms: 30000
/// key_prefix: svc
/// max_entry_size: 1048576
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Off means every load goes straight to the store.
    pub enabled: bool,
    /// Expiry handed to the cache backend with every batched write.
    #[serde(rename = "ttl_ms", with = "duration_ms")]
    pub ttl: Duration,
    /// Namespace prepended as `<prefix>:` to every mapped cache key.
    pub key_prefix: Option<String>,
    /// Encoded payloads above this many bytes are not cached.
    pub max_entry_size: usize,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_millis(3000),
            key_prefix: None,
            max_entry_size: 10 * 1024 * 1024,
        }
    }
}

impl HandlerConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
    pub fn with_max_entry_size(mut self, bytes: usize) -> Self {
        self.max_entry_size = bytes;
        self
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| {
            Error::configuration_with_context(
                e.to_string(),
                ErrorContext::new().with_source("handler_config_yaml"),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content).map_err(|e| {
            Error::configuration_with_context(
                e.to_string(),
                ErrorContext::new().with_source("handler_config_json"),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(Error::configuration_with_context(
                "ttl must be greater than zero",
                ErrorContext::new()
                    .with_field_path("ttl_ms")
                    .with_source("handler_config"),
            ));
        }
        if self.max_entry_size == 0 {
            return Err(Error::configuration_with_context(
                "max_entry_size must be greater than zero",
                ErrorContext::new()
                    .with_field_path("max_entry_size")
                    .with_source("handler_config"),
            ));
        }
        if matches!(self.key_prefix.as_deref(), Some(p) if p.trim().is_empty()) {
            return Err(Error::configuration_with_context(
                "key_prefix must not be blank",
                ErrorContext::new()
                    .with_field_path("key_prefix")
                    .with_source("handler_config"),
            ));
        }
        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
