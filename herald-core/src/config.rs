//! Subject Configuration
//!
//! A [`SubjectConfig`] controls how a [`Subject`](crate::Subject) reacts to
//! handler failures, how it labels its log events, and how much registry
//! space it reserves up front.
//!
//! Configs can be built in code or loaded from JSON:
//!
//! ```rust
//! use herald_core::{FailurePolicy, SubjectConfig};
//!
//! let config = SubjectConfig::from_json(r#"{ "name": "members", "policy": "isolate" }"#)
//!     .unwrap();
//! assert_eq!(config.policy, FailurePolicy::Isolate);
//! ```

use serde::Deserialize;

use crate::error::ConfigError;

/// Largest registry reservation a config may ask for.
pub const MAX_CAPACITY: usize = 1 << 16;

/// What a broadcast does when an observer's handler fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failure. Observers after the failing one are not
    /// notified by that broadcast.
    #[default]
    FailFast,

    /// Keep going and report every failure once the fan-out completes.
    Isolate,
}

/// Configuration for a [`Subject`](crate::Subject).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubjectConfig {
    /// Label attached to every tracing event the subject emits.
    pub name: String,

    /// Handler failure handling.
    pub policy: FailurePolicy,

    /// Registry entries to reserve on construction, at most [`MAX_CAPACITY`].
    pub capacity: usize,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            name: "subject".to_string(),
            policy: FailurePolicy::FailFast,
            capacity: 0,
        }
    }
}

impl SubjectConfig {
    /// Create a config with the given name and default settings.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the failure policy.
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the initial registry capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config for values a subject cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".to_string()));
        }
        if self.capacity > MAX_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "capacity must be at most {MAX_CAPACITY}, got {}",
                self.capacity
            )));
        }
        Ok(())
    }
}
