//! Resize observation multiplexer.
//!
//! One underlying observer (a [`ResizeBackend`]) is shared by every rendered
//! item wrapper. Wrappers register `(element, key)` when they mount and
//! unregister when they unmount; the host forwards each observer callback as
//! one slice of [`ResizeEntry`] values, which [`ResizeMultiplexer::collect`]
//! turns into a single [`ResizeBatch`] keyed by item key.
//!
//! # Filtering
//!
//! | Entry | Outcome |
//! |-------|---------|
//! | height `<= 0` or non-finite | dropped (hidden-ancestor glitch) |
//! | element not registered | dropped (already unmounted) |
//! | same key twice in one callback | last height wins |
//!
//! # Missing backend
//!
//! Without a backend (no observation API in the host environment) the
//! multiplexer still tracks registrations but observes nothing, so every item
//! keeps its estimated height.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

/// Opaque handle of a host element (e.g. a DOM node id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// One size report delivered by the host's observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEntry {
    /// Element whose size changed.
    pub element: ElementId,
    /// New border-box height in pixels.
    pub height: f64,
}

impl ResizeEntry {
    /// Convenience constructor.
    #[must_use]
    pub const fn new(element: ElementId, height: f64) -> Self {
        Self { element, height }
    }
}

/// The host's native size-observation mechanism.
///
/// Implementations only start/stop observation; size reports flow back
/// through the host calling `VirtualScroller::on_resize_batch`.
pub trait ResizeBackend {
    /// Start observing `element`. Observing an element must eventually
    /// produce an initial report for it.
    fn observe(&mut self, element: ElementId);

    /// Stop observing `element`.
    fn unobserve(&mut self, element: ElementId);
}

/// Heights gathered from one observer callback, ready to apply atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeBatch<K> {
    /// `(key, height)` pairs in first-seen order, one per key.
    pub updates: Vec<(K, f64)>,
    /// Entries dropped for reporting a zero (or invalid) height.
    pub zero_filtered: usize,
    /// Entries dropped because their element is not registered.
    pub unknown: usize,
}

impl<K> ResizeBatch<K> {
    /// Whether nothing survived filtering.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// Maps observed elements to item keys over a single backend.
pub struct ResizeMultiplexer<K> {
    backend: Option<Box<dyn ResizeBackend>>,
    elements: HashMap<ElementId, K>,
    /// Set once the missing-backend warning has been emitted.
    warned: bool,
}

impl<K: fmt::Debug> fmt::Debug for ResizeMultiplexer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeMultiplexer")
            .field("has_backend", &self.backend.is_some())
            .field("elements", &self.elements)
            .field("warned", &self.warned)
            .finish()
    }
}

impl<K> Default for ResizeMultiplexer<K> {
    fn default() -> Self {
        Self {
            backend: None,
            elements: HashMap::new(),
            warned: false,
        }
    }
}

impl<K: Clone + Eq + Hash> ResizeMultiplexer<K> {
    /// Create a multiplexer with no backend installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or remove) the backend. Elements already registered start
    /// being observed by the new backend.
    ///
    /// A missing backend is reported once per multiplexer, however many
    /// times the scroller is re-attached.
    pub fn install(&mut self, backend: Option<Box<dyn ResizeBackend>>) {
        self.disconnect_backend();
        self.backend = backend;
        match self.backend.as_mut() {
            Some(backend) => {
                for element in self.elements.keys() {
                    backend.observe(*element);
                }
            }
            None if !self.warned => {
                self.warned = true;
                tracing::warn!(
                    "resize observation unavailable; item heights fall back to the estimate"
                );
            }
            None => {}
        }
    }

    /// Stop observing everything and drop the backend. Registrations are kept.
    pub fn disconnect_backend(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            for element in self.elements.keys() {
                backend.unobserve(*element);
            }
        }
    }

    /// Whether a backend is installed.
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.backend.is_some()
    }

    /// Track `element` as the wrapper of `key`.
    pub fn register(&mut self, element: ElementId, key: K) {
        let fresh = self.elements.insert(element, key).is_none();
        if fresh && let Some(backend) = self.backend.as_mut() {
            backend.observe(element);
        }
    }

    /// Stop tracking `element`. Unknown elements are ignored.
    pub fn unregister(&mut self, element: ElementId) {
        if self.elements.remove(&element).is_some()
            && let Some(backend) = self.backend.as_mut()
        {
            backend.unobserve(element);
        }
    }

    /// Key currently associated with `element`.
    #[must_use]
    pub fn key_of(&self, element: ElementId) -> Option<&K> {
        self.elements.get(&element)
    }

    /// Number of registered elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Re-observe every registered element so the backend reports fresh sizes.
    ///
    /// Returns the number of elements re-observed.
    pub fn remeasure(&mut self) -> usize {
        let Some(backend) = self.backend.as_mut() else {
            return 0;
        };
        for element in self.elements.keys() {
            backend.unobserve(*element);
            backend.observe(*element);
        }
        self.elements.len()
    }

    /// Turn one observer callback into a keyed batch.
    pub fn collect(&self, entries: &[ResizeEntry]) -> ResizeBatch<K> {
        let mut batch = ResizeBatch {
            updates: Vec::with_capacity(entries.len()),
            zero_filtered: 0,
            unknown: 0,
        };
        let mut slot: HashMap<&K, usize> = HashMap::with_capacity(entries.len());

        for entry in entries {
            if !entry.height.is_finite() || entry.height <= 0.0 {
                batch.zero_filtered += 1;
                continue;
            }
            let Some(key) = self.elements.get(&entry.element) else {
                batch.unknown += 1;
                continue;
            };
            match slot.get(key) {
                Some(&i) => batch.updates[i].1 = entry.height,
                None => {
                    slot.insert(key, batch.updates.len());
                    batch.updates.push((key.clone(), entry.height));
                }
            }
        }
        batch
    }
}

/// Registration interface handed to item wrappers.
///
/// Cloning is cheap; every clone talks to the same multiplexer.
pub struct ResizeRegistrar<K> {
    inner: Rc<RefCell<ResizeMultiplexer<K>>>,
}

impl<K> Clone for ResizeRegistrar<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for ResizeRegistrar<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResizeRegistrar").field(&self.inner).finish()
    }
}

impl<K: Clone + Eq + Hash> ResizeRegistrar<K> {
    pub(crate) fn new(inner: Rc<RefCell<ResizeMultiplexer<K>>>) -> Self {
        Self { inner }
    }

    /// Called by a wrapper on mount.
    pub fn register(&self, element: ElementId, key: K) {
        self.inner.borrow_mut().register(element, key);
    }

    /// Called by a wrapper on unmount.
    pub fn unregister(&self, element: ElementId) {
        self.inner.borrow_mut().unregister(element);
    }

    /// Number of registered wrappers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Whether no wrapper is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log(Rc<RefCell<Vec<String>>>);

    impl ResizeBackend for Log {
        fn observe(&mut self, element: ElementId) {
            self.0.borrow_mut().push(format!("observe {}", element.0));
        }
        fn unobserve(&mut self, element: ElementId) {
            self.0.borrow_mut().push(format!("unobserve {}", element.0));
        }
    }

    fn with_log() -> (ResizeMultiplexer<&'static str>, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut mux = ResizeMultiplexer::new();
        mux.install(Some(Box::new(Log(Rc::clone(&log)))));
        (mux, log)
    }

    #[test]
    fn register_observes_once() {
        let (mut mux, log) = with_log();
        mux.register(ElementId(1), "a");
        mux.register(ElementId(1), "a2");
        assert_eq!(*log.borrow(), vec!["observe 1"]);
        assert_eq!(mux.key_of(ElementId(1)), Some(&"a2"));
    }

    #[test]
    fn unregister_unobserves_known_only() {
        let (mut mux, log) = with_log();
        mux.register(ElementId(1), "a");
        mux.unregister(ElementId(1));
        mux.unregister(ElementId(9));
        assert_eq!(*log.borrow(), vec!["observe 1", "unobserve 1"]);
        assert!(mux.is_empty());
    }

    #[test]
    fn collect_filters_zero_and_unknown() {
        let (mut mux, _) = with_log();
        mux.register(ElementId(1), "a");
        mux.register(ElementId(2), "b");
        let batch = mux.collect(&[
            ResizeEntry::new(ElementId(1), 30.0),
            ResizeEntry::new(ElementId(2), 0.0),
            ResizeEntry::new(ElementId(3), 50.0),
            ResizeEntry::new(ElementId(2), f64::NAN),
        ]);
        assert_eq!(batch.updates, vec![("a", 30.0)]);
        assert_eq!(batch.zero_filtered, 2);
        assert_eq!(batch.unknown, 1);
    }

    #[test]
    fn collect_last_report_per_key_wins() {
        let (mut mux, _) = with_log();
        mux.register(ElementId(1), "a");
        mux.register(ElementId(2), "b");
        let batch = mux.collect(&[
            ResizeEntry::new(ElementId(1), 30.0),
            ResizeEntry::new(ElementId(2), 10.0),
            ResizeEntry::new(ElementId(1), 45.0),
        ]);
        assert_eq!(batch.updates, vec![("a", 45.0), ("b", 10.0)]);
    }

    #[test]
    fn no_backend_tracks_but_never_observes() {
        let mut mux: ResizeMultiplexer<u32> = ResizeMultiplexer::new();
        mux.install(None);
        mux.register(ElementId(4), 4);
        assert!(!mux.is_observing());
        assert_eq!(mux.len(), 1);
        assert_eq!(mux.remeasure(), 0);
    }

    #[test]
    fn missing_backend_warning_latches() {
        let mut mux: ResizeMultiplexer<u32> = ResizeMultiplexer::new();
        assert!(!mux.warned);
        mux.install(None);
        assert!(mux.warned);
        mux.install(None);
        assert!(mux.warned);
        mux.install(Some(Box::new(Log::default())));
        mux.install(None);
        assert!(mux.warned, "a backend in between does not re-arm the warning");
    }

    #[test]
    fn install_observes_existing_registrations() {
        let mut mux = ResizeMultiplexer::new();
        mux.register(ElementId(7), "x");
        let log = Rc::new(RefCell::new(Vec::new()));
        mux.install(Some(Box::new(Log(Rc::clone(&log)))));
        assert_eq!(*log.borrow(), vec!["observe 7"]);
    }

    #[test]
    fn remeasure_cycles_observation() {
        let (mut mux, log) = with_log();
        mux.register(ElementId(1), "a");
        log.borrow_mut().clear();
        assert_eq!(mux.remeasure(), 1);
        assert_eq!(*log.borrow(), vec!["unobserve 1", "observe 1"]);
    }

    #[test]
    fn registrar_clones_share_state() {
        let mux = Rc::new(RefCell::new(ResizeMultiplexer::new()));
        let a = ResizeRegistrar::new(Rc::clone(&mux));
        let b = a.clone();
        a.register(ElementId(1), 10u64);
        assert_eq!(b.len(), 1);
        b.unregister(ElementId(1));
        assert!(a.is_empty());
    }
}
