//! Observer contract.
//!
//! Observers are owned by the caller. A subject only ever holds a `Weak`
//! reference to them, so dropping the last `Arc` unsubscribes implicitly.
//!
//! Handlers run synchronously while the subject's lock is held. A handler
//! must not call `register`, `unregister` or a broadcast on the subject that
//! is notifying it, and neither may the observer's `Drop` impl: the lock is
//! not re-entrant and the call would deadlock.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HandlerResult;

/// Topic or correlation id attached to every notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicId {
    /// Numeric id.
    Id(i64),
    /// Named topic.
    Name(String),
}

impl From<i64> for TopicId {
    fn from(id: i64) -> Self {
        TopicId::Id(id)
    }
}

impl From<&str> for TopicId {
    fn from(name: &str) -> Self {
        TopicId::Name(name.to_string())
    }
}

impl From<String> for TopicId {
    fn from(name: String) -> Self {
        TopicId::Name(name)
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicId::Id(id) => write!(f, "{id}"),
            TopicId::Name(name) => f.write_str(name),
        }
    }
}

/// A handler for one payload kind.
///
/// Use `Subject<dyn Observer<P>>` for subjects that broadcast a single payload
/// type. Observers that handle several payload kinds define their own trait
/// (see [`DataObserver`](crate::DataObserver)) and broadcast through
/// [`Subject::broadcast_with`](crate::Subject::broadcast_with).
pub trait Observer<P: ?Sized>: Send + Sync {
    /// Handle one notification.
    fn on_notify(&self, topic: &TopicId, payload: &P) -> HandlerResult;
}
