//! Data Service
//!
//! [`DataService`] broadcasts two payload kinds to a shared set of observers:
//!
//! - a collection of [`Member`] records plus an info string
//! - a single [`Institution`] record
//!
//! The service has-a [`Subject`] and implements the [`DataSink`] capability.
//! Callers that only produce data can hold it as `&dyn DataSink`.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use herald_core::{DataObserver, DataService, DataSink, HandlerResult, Institution, Member, TopicId};
//!
//! struct Printer;
//!
//! impl DataObserver for Printer {
//!     fn on_collection_notify(&self, topic: &TopicId, records: &[Member], info: &str) -> HandlerResult {
//!         println!("{topic} {info}: {} members", records.len());
//!         Ok(())
//!     }
//!
//!     fn on_record_notify(&self, topic: &TopicId, record: &Institution) -> HandlerResult {
//!         println!("{topic}: {}", record.name);
//!         Ok(())
//!     }
//! }
//!
//! let service = DataService::new();
//! let printer: Arc<dyn DataObserver> = Arc::new(Printer);
//! service.register(&printer);
//!
//! let sink: &dyn DataSink = &service;
//! sink.output_members(&TopicId::from(1), &[Member::new(1, "john")], "member").unwrap();
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::SubjectConfig;
use crate::error::{DispatchError, HandlerResult};
use crate::observer::TopicId;
use crate::subject::{BroadcastReport, Subject};

/// A member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Member id.
    pub id: i64,
    /// Display name.
    pub name: String,
}

impl Member {
    /// Create a member record.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// An institution record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    /// Institution id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Postal address.
    pub address: String,
}

impl Institution {
    /// Create an institution record.
    pub fn new(id: i64, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Receives data notifications from a [`DataService`].
///
/// Both handlers run synchronously under the service's lock and must not
/// call back into the same service.
pub trait DataObserver: Send + Sync {
    /// A batch of member records with an info string.
    fn on_collection_notify(&self, topic: &TopicId, records: &[Member], info: &str) -> HandlerResult;

    /// A single institution record.
    fn on_record_notify(&self, topic: &TopicId, record: &Institution) -> HandlerResult;
}

/// Output side of the data interface.
pub trait DataSink {
    /// Send member records to every live observer.
    fn output_members(
        &self,
        topic: &TopicId,
        records: &[Member],
        info: &str,
    ) -> Result<BroadcastReport, DispatchError>;

    /// Send an institution record to every live observer.
    fn output_institution(
        &self,
        topic: &TopicId,
        record: &Institution,
    ) -> Result<BroadcastReport, DispatchError>;
}

/// Fans member and institution data out to registered [`DataObserver`]s.
#[derive(Debug, Default)]
pub struct DataService {
    subject: Subject<dyn DataObserver>,
}

impl DataService {
    /// Create a service with the default subject configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service whose subject uses `config`, taken as is (see
    /// [`Subject::with_config`]).
    pub fn with_config(config: SubjectConfig) -> Self {
        Self {
            subject: Subject::with_config(config),
        }
    }

    /// Subscribe an observer. The service holds it weakly.
    pub fn register(&self, observer: &Arc<dyn DataObserver>) {
        self.subject.register(observer);
    }

    /// Unsubscribe an observer. Returns the number of removed registrations.
    pub fn unregister(&self, observer: &Arc<dyn DataObserver>) -> usize {
        self.subject.unregister(observer)
    }

    /// Registry entries, including not-yet-compacted dead ones.
    pub fn len(&self) -> usize {
        self.subject.len()
    }

    /// True if no registrations remain.
    pub fn is_empty(&self) -> bool {
        self.subject.is_empty()
    }

    /// The underlying subject.
    pub fn subject(&self) -> &Subject<dyn DataObserver> {
        &self.subject
    }
}

impl DataSink for DataService {
    fn output_members(
        &self,
        topic: &TopicId,
        records: &[Member],
        info: &str,
    ) -> Result<BroadcastReport, DispatchError> {
        self.subject
            .broadcast_with(|observer| observer.on_collection_notify(topic, records, info))
    }

    fn output_institution(
        &self,
        topic: &TopicId,
        record: &Institution,
    ) -> Result<BroadcastReport, DispatchError> {
        self.subject
            .broadcast_with(|observer| observer.on_record_notify(topic, record))
    }
}
