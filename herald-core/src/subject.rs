//! Subject and Notification Dispatch
//!
//! A [`Subject`] owns a [`Registry`] behind a single mutex and fans each
//! notification out to every observer that is still alive.
//!
//! # How a Broadcast Works
//!
//! 1. Acquire the registry lock. Broadcasts, registrations and removals are
//!    fully serialized; two broadcasts never interleave.
//!
//! 2. Visit entries in registration order. Each entry is upgraded; a live
//!    observer is handed to the delivery closure, a dead one is skipped.
//!
//! 3. Compact the registry, still under the lock, then release it.
//!
//! An observer dropped on another thread during a broadcast is either
//! delivered to (if its entry was upgraded first) or skipped. Both outcomes
//! are correct.
//!
//! # Failures
//!
//! With [`FailurePolicy::FailFast`] the first handler error ends the fan-out
//! and observers after it are not notified. With [`FailurePolicy::Isolate`]
//! every live observer is visited and failures are reported together.
//! Compaction runs in both cases.
//!
//! Panics are not caught. They unwind out of the broadcast like a fail-fast
//! error. The mutex does not poison, so the subject stays usable.
//!
//! # Re-entrancy
//!
//! Handlers run while the lock is held. A handler that calls back into the
//! same subject deadlocks.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::config::{FailurePolicy, SubjectConfig, MAX_CAPACITY};
use crate::error::{ConfigError, DispatchError, HandlerResult, ObserverError};
use crate::observer::{Observer, TopicId};
use crate::registry::Registry;

/// Counts from a broadcast that reached every live observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BroadcastReport {
    /// Observers that handled the notification.
    pub delivered: usize,
    /// Entries whose observer was already gone.
    pub skipped: usize,
}

/// A thread-safe set of weakly held observers.
///
/// `O` is usually a trait object such as `dyn Observer<P>` or
/// `dyn DataObserver`.
pub struct Subject<O: ?Sized> {
    config: SubjectConfig,
    registry: Mutex<Registry<O>>,
}

impl<O: ?Sized> Subject<O> {
    /// Create a subject with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SubjectConfig::default())
    }

    /// Create a subject with the given configuration.
    ///
    /// The config is taken as is: it is not validated and its capacity is
    /// clamped to [`MAX_CAPACITY`]. Use [`Subject::try_with_config`] to reject
    /// invalid configs instead.
    pub fn with_config(config: SubjectConfig) -> Self {
        let registry = Registry::with_capacity(config.capacity.min(MAX_CAPACITY));
        Self {
            config,
            registry: Mutex::new(registry),
        }
    }

    /// Validate `config`, then create a subject with it.
    pub fn try_with_config(config: SubjectConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    /// The subject's configuration.
    pub fn config(&self) -> &SubjectConfig {
        &self.config
    }

    /// Subscribe `observer`.
    ///
    /// The subject keeps only a weak reference; the caller stays the owner.
    /// Registering the same observer twice results in two deliveries per
    /// broadcast.
    pub fn register(&self, observer: &Arc<O>) {
        let mut registry = self.registry.lock();
        registry.register(observer);
        debug!(subject = %self.config.name, entries = registry.len(), "observer registered");
    }

    /// Unsubscribe every live registration of `observer`.
    ///
    /// Unknown observers are ignored. Returns the number of removed entries.
    pub fn unregister(&self, observer: &Arc<O>) -> usize {
        let mut registry = self.registry.lock();
        let removed = registry.unregister(observer);
        debug!(
            subject = %self.config.name,
            removed,
            entries = registry.len(),
            "observer unregistered"
        );
        removed
    }

    /// Number of registry entries, including ones whose observer has been
    /// dropped but not yet compacted away.
    pub fn len(&self) -> usize {
        self.registry.lock().len()
    }

    /// True if the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.registry.lock().is_empty()
    }

    /// Number of entries whose observer is alive right now.
    pub fn live_count(&self) -> usize {
        self.registry.lock().live_count()
    }

    /// Deliver a notification to every live observer.
    ///
    /// `deliver` is called once per live entry, in registration order, while
    /// the registry lock is held. Expired entries are skipped and purged once
    /// the fan-out ends.
    pub fn broadcast_with<F>(&self, mut deliver: F) -> Result<BroadcastReport, DispatchError>
    where
        F: FnMut(&O) -> HandlerResult,
    {
        let mut registry = self.registry.lock();
        let mut report = BroadcastReport::default();
        let mut failures: Vec<ObserverError> = Vec::new();
        let mut aborted = None;

        for entry in registry.iter() {
            let Some(observer) = entry.upgrade() else {
                report.skipped += 1;
                trace!(subject = %self.config.name, "skipped expired observer");
                continue;
            };

            match deliver(&*observer) {
                Ok(()) => {
                    report.delivered += 1;
                    trace!(subject = %self.config.name, "delivered to observer");
                }
                Err(err) => match self.config.policy {
                    FailurePolicy::FailFast => {
                        aborted = Some(err);
                        break;
                    }
                    FailurePolicy::Isolate => {
                        warn!(
                            subject = %self.config.name,
                            error = %err,
                            label = err.as_label(),
                            "observer failed, continuing"
                        );
                        failures.push(err);
                    }
                },
            }
        }

        let purged = registry.compact();
        if purged > 0 {
            debug!(subject = %self.config.name, purged, entries = registry.len(), "compacted registry");
        }
        drop(registry);

        if let Some(source) = aborted {
            debug!(
                subject = %self.config.name,
                delivered = report.delivered,
                error = %source,
                "broadcast aborted"
            );
            return Err(DispatchError::Aborted {
                delivered: report.delivered,
                source,
            });
        }

        if !failures.is_empty() {
            return Err(DispatchError::Partial {
                delivered: report.delivered,
                failures,
            });
        }

        trace!(
            subject = %self.config.name,
            delivered = report.delivered,
            skipped = report.skipped,
            "broadcast complete"
        );
        Ok(report)
    }
}

impl<P: ?Sized + 'static> Subject<dyn Observer<P>> {
    /// Broadcast `payload` under `topic` to every live observer.
    pub fn notify(&self, topic: &TopicId, payload: &P) -> Result<BroadcastReport, DispatchError> {
        self.broadcast_with(|observer| observer.on_notify(topic, payload))
    }
}

impl<O: ?Sized> Default for Subject<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: ?Sized> std::fmt::Debug for Subject<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("config", &self.config)
            .field("registry", &*self.registry.lock())
            .finish()
    }
}
