//! Herald Core
//!
//! This crate provides a thread-safe publish/notify mechanism. A subject holds
//! a changing set of observers and broadcasts typed updates to every observer
//! that is still alive. It implements:
//!
//! - A weak-reference observer registry with compaction of dead entries
//! - Synchronous, lock-serialized fan-out with configurable failure handling
//! - A two-payload data service (member batches and institution records)
//!
//! # Architecture
//!
//! - `registry`: weak observer references, add/remove, compaction
//! - `subject`: the lock around the registry and the broadcast loop
//! - `observer`: the handler contract and topic ids
//! - `data`: member/institution payloads and the data service
//! - `config` / `error`: subject settings and the error taxonomy
//!
//! Observers are owned by the caller. Dropping the last `Arc` to an observer
//! unsubscribes it; the next broadcast skips it and purges its entry.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use herald_core::{HandlerResult, Observer, Subject, TopicId};
//!
//! struct Printer;
//!
//! impl Observer<str> for Printer {
//!     fn on_notify(&self, topic: &TopicId, payload: &str) -> HandlerResult {
//!         println!("{topic}: {payload}");
//!         Ok(())
//!     }
//! }
//!
//! let subject: Subject<dyn Observer<str>> = Subject::new();
//! let printer: Arc<dyn Observer<str>> = Arc::new(Printer);
//! subject.register(&printer);
//!
//! let report = subject.notify(&TopicId::from("greeting"), "hello").unwrap();
//! assert_eq!(report.delivered, 1);
//!
//! drop(printer);
//! let report = subject.notify(&TopicId::from("greeting"), "anyone?").unwrap();
//! assert_eq!(report.delivered, 0);
//! assert!(subject.is_empty());
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod observer;
pub mod registry;
pub mod subject;

pub use config::{FailurePolicy, SubjectConfig, MAX_CAPACITY};
pub use data::{DataObserver, DataService, DataSink, Institution, Member};
pub use error::{ConfigError, DispatchError, HandlerResult, ObserverError};
pub use observer::{Observer, TopicId};
pub use registry::Registry;
pub use subject::{BroadcastReport, Subject};
