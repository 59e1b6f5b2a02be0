#![forbid(unsafe_code)]

//! Simulated host surfaces: a scroll container and a resize observer.
//!
//! Both are cheap-to-clone handles over shared state so a test can hand one
//! copy to the scroller and keep another to poke at.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use vscroll::{ElementId, ResizeBackend, ScrollBehavior, ScrollContainer};

#[derive(Debug, Default)]
struct ViewportState {
    scroll_top: f64,
    client_height: f64,
    supports_observer: bool,
    smooth_requests: Vec<f64>,
    scroll_writes: usize,
}

/// Simulated scrolling element.
///
/// Mirrors the browser behaviours the engine cares about: negative offsets
/// clamp to 0, and leaving the document resets the offset and height to 0.
#[derive(Debug, Clone, Default)]
pub struct SimViewport {
    state: Rc<RefCell<ViewportState>>,
    observer: SimObserver,
}

impl SimViewport {
    /// A visible viewport of `client_height` pixels with an observer available.
    #[must_use]
    pub fn new(client_height: f64) -> Self {
        let viewport = Self::default();
        {
            let mut state = viewport.state.borrow_mut();
            state.client_height = client_height;
            state.supports_observer = true;
        }
        viewport
    }

    /// Pretend the host has no resize observation API.
    #[must_use]
    pub fn without_observer(self) -> Self {
        self.state.borrow_mut().supports_observer = false;
        self
    }

    /// The observer handed out by [`ScrollContainer::resize_backend`].
    #[must_use]
    pub fn observer(&self) -> &SimObserver {
        &self.observer
    }

    /// Current offset.
    #[must_use]
    pub fn top(&self) -> f64 {
        self.state.borrow().scroll_top
    }

    /// User-driven scroll (the host then forwards `on_scroll`).
    pub fn user_scroll_to(&self, top: f64) {
        self.state.borrow_mut().scroll_top = top.max(0.0);
    }

    /// Current client height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.state.borrow().client_height
    }

    /// Change the client height (the host then forwards `on_viewport_resize`).
    pub fn resize(&self, client_height: f64) {
        self.state.borrow_mut().client_height = client_height.max(0.0);
    }

    /// Leave the document: offset and height collapse to 0.
    pub fn remove_from_document(&self) {
        let mut state = self.state.borrow_mut();
        state.scroll_top = 0.0;
        state.client_height = 0.0;
    }

    /// Targets of every smooth scroll requested so far.
    #[must_use]
    pub fn smooth_requests(&self) -> Vec<f64> {
        self.state.borrow().smooth_requests.clone()
    }

    /// Number of programmatic scroll writes.
    #[must_use]
    pub fn scroll_writes(&self) -> usize {
        self.state.borrow().scroll_writes
    }
}

impl ScrollContainer for SimViewport {
    fn scroll_top(&self) -> f64 {
        self.state.borrow().scroll_top
    }

    fn set_scroll_top(&mut self, top: f64, behavior: ScrollBehavior) {
        let mut state = self.state.borrow_mut();
        if behavior == ScrollBehavior::Smooth {
            state.smooth_requests.push(top);
        }
        // Animation is collapsed to its end state.
        state.scroll_top = top.max(0.0);
        state.scroll_writes += 1;
    }

    fn client_height(&self) -> f64 {
        self.state.borrow().client_height
    }

    fn resize_backend(&mut self) -> Option<Box<dyn ResizeBackend>> {
        if self.state.borrow().supports_observer {
            Some(Box::new(self.observer.clone()))
        } else {
            None
        }
    }
}

#[derive(Debug, Default)]
struct ObserverState {
    observed: BTreeSet<ElementId>,
    /// Elements owed an initial report.
    pending: BTreeSet<ElementId>,
}

/// Simulated resize observer: remembers which elements are observed and
/// which still owe their initial size report.
#[derive(Debug, Clone, Default)]
pub struct SimObserver {
    state: Rc<RefCell<ObserverState>>,
}

impl SimObserver {
    /// Whether `element` is observed.
    #[must_use]
    pub fn is_observed(&self, element: ElementId) -> bool {
        self.state.borrow().observed.contains(&element)
    }

    /// Number of observed elements.
    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.state.borrow().observed.len()
    }

    /// Take the elements owed an initial report.
    pub fn take_pending(&self) -> Vec<ElementId> {
        let mut state = self.state.borrow_mut();
        let pending = std::mem::take(&mut state.pending);
        pending
            .into_iter()
            .filter(|e| state.observed.contains(e))
            .collect()
    }

    /// Mark an observed element as changed so it is reported next flush.
    pub fn touch(&self, element: ElementId) {
        let mut state = self.state.borrow_mut();
        if state.observed.contains(&element) {
            state.pending.insert(element);
        }
    }
}

impl ResizeBackend for SimObserver {
    fn observe(&mut self, element: ElementId) {
        let mut state = self.state.borrow_mut();
        state.observed.insert(element);
        state.pending.insert(element);
    }

    fn unobserve(&mut self, element: ElementId) {
        let mut state = self.state.borrow_mut();
        state.observed.remove(&element);
        state.pending.remove(&element);
    }
}
