//! Observer Registry
//!
//! The registry is the set of observers a subject will notify. It stores
//! `Weak` references only, so it never keeps an observer alive and never
//! hands out a reference that outlives the observer.
//!
//! # Entry Lifecycle
//!
//! 1. `register` appends a weak reference. Registering the same observer
//!    twice creates two entries and therefore two deliveries per broadcast.
//!
//! 2. `unregister` removes every live entry pointing at the given observer.
//!    Expired entries are left for compaction.
//!
//! 3. `compact` drops every entry whose observer has been destroyed.
//!
//! # Locking
//!
//! Every mutating method takes `&mut self`. A [`Subject`](crate::Subject) keeps
//! its registry behind a mutex, so the only way to reach these methods on a
//! shared registry is through the lock guard. Any entry may still expire at
//! any instant because observers can be dropped on any thread; callers must
//! upgrade on every visit and never keep the upgraded `Arc` past the lock.

use std::sync::{Arc, Weak};

use smallvec::SmallVec;

/// Entries kept inline before the registry spills to the heap.
const INLINE_ENTRIES: usize = 4;

/// Insertion-ordered collection of weak observer references.
pub struct Registry<O: ?Sized> {
    entries: SmallVec<[Weak<O>; INLINE_ENTRIES]>,
}

impl<O: ?Sized> Registry<O> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }

    /// Create an empty registry with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: SmallVec::with_capacity(capacity),
        }
    }

    /// Append a weak reference to `observer`.
    pub fn register(&mut self, observer: &Arc<O>) {
        self.entries.push(Arc::downgrade(observer));
    }

    /// Remove every live entry that refers to `observer`.
    ///
    /// Returns the number of removed entries; zero means the observer was not
    /// registered. This never upgrades an entry, so it cannot end up running
    /// an observer's destructor.
    pub fn unregister(&mut self, observer: &Arc<O>) -> usize {
        let target = Arc::as_ptr(observer);
        let before = self.entries.len();
        self.entries
            .retain(|entry| !(entry.strong_count() > 0 && same_allocation(entry.as_ptr(), target)));
        before - self.entries.len()
    }

    /// Drop every entry whose observer no longer exists.
    ///
    /// Returns the number of purged entries.
    pub fn compact(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.strong_count() > 0);
        before - self.entries.len()
    }

    /// Total number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries whose observer is still alive.
    ///
    /// This is a snapshot; entries may expire right after it is taken.
    pub fn live_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    /// Iterate over the entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Weak<O>> {
        self.entries.iter()
    }
}

impl<O: ?Sized> Default for Registry<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: ?Sized> std::fmt::Debug for Registry<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("len", &self.len())
            .field("live", &self.live_count())
            .finish()
    }
}

/// Compare allocations by address, ignoring any trait-object metadata.
fn same_allocation<O: ?Sized>(a: *const O, b: *const O) -> bool {
    a as *const () == b as *const ()
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named: Send + Sync {
        fn name(&self) -> &str;
    }

    struct Probe(&'static str);

    impl Named for Probe {
        fn name(&self) -> &str {
            self.0
        }
    }

    fn probe(name: &'static str) -> Arc<dyn Named> {
        Arc::new(Probe(name))
    }

    #[test]
    fn register_appends_in_order() {
        let a = probe("a");
        let b = probe("b");
        let mut registry = Registry::new();

        registry.register(&a);
        registry.register(&b);

        let names: Vec<String> = registry
            .iter()
            .filter_map(Weak::upgrade)
            .map(|o| o.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn registry_does_not_keep_observers_alive() {
        let a = probe("a");
        let mut registry = Registry::new();
        registry.register(&a);

        assert_eq!(Arc::strong_count(&a), 1);
        drop(a);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn unregister_removes_duplicates() {
        let a = probe("a");
        let b = probe("b");
        let mut registry = Registry::new();

        registry.register(&a);
        registry.register(&b);
        registry.register(&a);

        assert_eq!(registry.unregister(&a), 2);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn unregister_unknown_is_noop() {
        let a = probe("a");
        let stranger = probe("stranger");
        let mut registry = Registry::new();
        registry.register(&a);

        assert_eq!(registry.unregister(&stranger), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_leaves_expired_entries() {
        let a = probe("a");
        let b = probe("b");
        let mut registry = Registry::new();
        registry.register(&a);
        registry.register(&b);
        drop(a);

        assert_eq!(registry.unregister(&b), 1);
        // The expired entry is compaction's job.
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.compact(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn identity_is_by_allocation_not_value() {
        let first = probe("same");
        let second = probe("same");
        let mut registry = Registry::new();
        registry.register(&first);
        registry.register(&second);

        assert_eq!(registry.unregister(&first), 1);
        let remaining = registry.iter().next().and_then(Weak::upgrade).unwrap();
        assert!(Arc::ptr_eq(&remaining, &second));
    }

    #[test]
    fn compact_purges_only_expired() {
        let a = probe("a");
        let b = probe("b");
        let c = probe("c");
        let mut registry = Registry::with_capacity(8);
        registry.register(&a);
        registry.register(&b);
        registry.register(&c);

        drop(b);
        assert_eq!(registry.compact(), 1);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.compact(), 0);
    }

    #[test]
    fn spills_past_inline_capacity() {
        let observers: Vec<_> = (0..INLINE_ENTRIES * 3).map(|_| probe("x")).collect();
        let mut registry = Registry::new();
        for observer in &observers {
            registry.register(observer);
        }
        assert_eq!(registry.live_count(), observers.len());
    }
}
