//! Error Types
//!
//! The registry never fails. Errors only come from three places:
//!
//! - [`ObserverError`]: raised by an observer's handler.
//! - [`DispatchError`]: how a broadcast reports handler failures back to the
//!   caller, shaped by the subject's [`FailurePolicy`](crate::FailurePolicy).
//! - [`ConfigError`]: rejected [`SubjectConfig`](crate::SubjectConfig) input.
//!
//! A destroyed observer is not an error. Its entry is skipped and later purged.

use std::error::Error as StdError;

use thiserror::Error;

use crate::observer::TopicId;

/// Result type returned by observer handlers.
pub type HandlerResult = Result<(), ObserverError>;

/// A failure raised by an observer while handling a notification.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ObserverError {
    /// The observer refused the notification.
    #[error("observer rejected notification on topic {topic}: {reason}")]
    Rejected {
        /// Topic of the rejected notification.
        topic: TopicId,
        /// Human-readable reason given by the observer.
        reason: String,
    },

    /// Any other failure from the observer's own code.
    #[error("{0}")]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl ObserverError {
    /// Shorthand for [`ObserverError::Rejected`].
    pub fn rejected(topic: &TopicId, reason: impl Into<String>) -> Self {
        Self::Rejected {
            topic: topic.clone(),
            reason: reason.into(),
        }
    }

    /// Stable snake_case label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ObserverError::Rejected { .. } => "observer_rejected",
            ObserverError::Other(_) => "observer_failed",
        }
    }
}

/// Handler failures surfaced by a broadcast.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Fail-fast: a handler failed and the rest of the fan-out was abandoned.
    #[error("broadcast aborted after {delivered} deliveries: {source}")]
    Aborted {
        /// Observers that completed successfully before the failure.
        delivered: usize,
        /// The failure that stopped the fan-out.
        #[source]
        source: ObserverError,
    },

    /// Isolated failures: every live observer was visited, some failed.
    #[error("{} of {} observers failed", .failures.len(), .delivered + .failures.len())]
    Partial {
        /// Observers that completed successfully.
        delivered: usize,
        /// Failures in visiting order.
        failures: Vec<ObserverError>,
    },
}

impl DispatchError {
    /// Stable snake_case label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Aborted { .. } => "dispatch_aborted",
            DispatchError::Partial { .. } => "dispatch_partial",
        }
    }

    /// Number of observers that were notified successfully.
    pub fn delivered(&self) -> usize {
        match self {
            DispatchError::Aborted { delivered, .. } | DispatchError::Partial { delivered, .. } => {
                *delivered
            }
        }
    }

    /// Number of handler failures carried by this error.
    pub fn failure_count(&self) -> usize {
        match self {
            DispatchError::Aborted { .. } => 1,
            DispatchError::Partial { failures, .. } => failures.len(),
        }
    }
}

/// Invalid subject configuration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The input was not valid JSON for a [`SubjectConfig`](crate::SubjectConfig).
    #[error("failed to parse subject config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The input parsed but holds an unusable value.
    #[error("invalid subject config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Stable snake_case label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Parse(_) => "config_parse",
            ConfigError::Invalid(_) => "config_invalid",
        }
    }
}
