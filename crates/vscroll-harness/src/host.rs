#![forbid(unsafe_code)]

//! A simulated host application driving a [`VirtualScroller`].
//!
//! [`SimHost`] plays the part of a UI framework: it forwards scroll and
//! resize notifications, mounts a wrapper element for every row in the
//! render range (registering it with the scroller's [`ResizeRegistrar`]),
//! unmounts rows that leave it, and delivers resize reports computed from a
//! "true layout" of row heights.
//!
//! Every mutating method ends with [`SimHost::settle`], which runs the
//! mount → observe → report → relayout loop until nothing changes.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use vscroll::{
    ConfigError, ElementId, ResizeEntry, ResizeRegistrar, ScrollerConfig, ScrollerEvent,
    VirtualScroller,
};

use crate::sim::{SimObserver, SimViewport};

/// Upper bound on settle rounds; a healthy layout converges in a handful.
const MAX_SETTLE_ROUNDS: usize = 64;

/// One list item with its true rendered height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row {
    pub id: u64,
    pub height: f64,
}

impl Row {
    #[must_use]
    pub const fn new(id: u64, height: f64) -> Self {
        Self { id, height }
    }
}

/// `count` rows of `height` pixels, ids `0..count`.
#[must_use]
pub fn uniform_rows(count: usize, height: f64) -> Vec<Row> {
    (0..count as u64).map(|id| Row::new(id, height)).collect()
}

/// Simulated host application.
#[derive(Debug)]
pub struct SimHost {
    scroller: VirtualScroller<Row, u64>,
    viewport: SimViewport,
    registrar: ResizeRegistrar<u64>,
    rows: Vec<Row>,
    true_heights: HashMap<u64, f64>,
    mounted: BTreeMap<u64, ElementId>,
    next_element: u64,
    mounts: HashMap<u64, usize>,
    unmounts: HashMap<u64, usize>,
    events: Vec<ScrollerEvent<u64>>,
    unsettled: usize,
}

impl SimHost {
    /// Mount a scroller over `rows` inside `viewport` and settle the first
    /// layout.
    pub fn new(
        config: ScrollerConfig,
        rows: Vec<Row>,
        viewport: SimViewport,
    ) -> Result<Self, ConfigError> {
        let mut scroller = VirtualScroller::with_items(config, |row: &Row| row.id, &rows)?;
        let registrar = scroller.observer();
        scroller.attach(Box::new(viewport.clone()));
        let true_heights = rows.iter().map(|r| (r.id, r.height)).collect();
        let mut host = Self {
            scroller,
            viewport,
            registrar,
            rows,
            true_heights,
            mounted: BTreeMap::new(),
            next_element: 1,
            mounts: HashMap::new(),
            unmounts: HashMap::new(),
            events: Vec::new(),
            unsettled: 0,
        };
        host.settle();
        Ok(host)
    }

    /// Default config, `rows`, and a visible viewport of `viewport_height`.
    pub fn with_rows(rows: Vec<Row>, viewport_height: f64) -> Self {
        match Self::new(ScrollerConfig::default(), rows, SimViewport::new(viewport_height)) {
            Ok(host) => host,
            Err(err) => unreachable!("default config is valid: {err}"),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────

    pub fn scroller(&self) -> &VirtualScroller<Row, u64> {
        &self.scroller
    }

    /// Direct access for calls the host does not wrap. Call
    /// [`settle`](Self::settle) afterwards.
    pub fn scroller_mut(&mut self) -> &mut VirtualScroller<Row, u64> {
        &mut self.scroller
    }

    pub fn viewport(&self) -> &SimViewport {
        &self.viewport
    }

    pub fn observer(&self) -> &SimObserver {
        self.viewport.observer()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Every event drained from the scroller so far.
    pub fn events(&self) -> &[ScrollerEvent<u64>] {
        &self.events
    }

    /// Take the recorded events.
    pub fn take_events(&mut self) -> Vec<ScrollerEvent<u64>> {
        std::mem::take(&mut self.events)
    }

    /// Keys that currently have a wrapper element.
    pub fn mounted_keys(&self) -> Vec<u64> {
        self.mounted.keys().copied().collect()
    }

    /// Element of a mounted row.
    pub fn element_of(&self, key: u64) -> Option<ElementId> {
        self.mounted.get(&key).copied()
    }

    /// How many times `key` has been mounted.
    pub fn mount_count(&self, key: u64) -> usize {
        self.mounts.get(&key).copied().unwrap_or(0)
    }

    /// How many times `key` has been unmounted.
    pub fn unmount_count(&self, key: u64) -> usize {
        self.unmounts.get(&key).copied().unwrap_or(0)
    }

    /// Number of settle loops that hit the round limit.
    pub fn unsettled_loops(&self) -> usize {
        self.unsettled
    }

    /// Where `key`'s top edge sits relative to the viewport top.
    pub fn screen_y(&self, key: u64) -> Option<f64> {
        let index = self.scroller.index_of_key(&key)?;
        let offset = self.scroller.item_offset(index)?;
        Some(offset - self.viewport.top())
    }

    // ─── Host actions ────────────────────────────────────────────────

    /// The user drags the scrollbar to `top` (clamped like a browser).
    pub fn user_scroll_to(&mut self, top: f64) {
        let max = (self.scroller.total_height() - self.viewport.height()).max(0.0);
        self.viewport.user_scroll_to(top.clamp(0.0, max));
        self.scroller.on_scroll();
        self.settle();
    }

    /// The user scrolls by `delta` pixels.
    pub fn user_scroll_by(&mut self, delta: f64) {
        self.user_scroll_to(self.viewport.top() + delta);
    }

    /// Change a row's true height; the observer reports it if mounted.
    pub fn set_true_height(&mut self, key: u64, height: f64) {
        self.true_heights.insert(key, height);
        if let Some(row) = self.rows.iter_mut().find(|r| r.id == key) {
            row.height = height;
        }
        if let Some(&element) = self.mounted.get(&key) {
            self.observer().touch(element);
        }
        self.settle();
    }

    /// Replace the item list.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        for row in &rows {
            self.true_heights.insert(row.id, row.height);
        }
        self.rows = rows;
        self.scroller.set_items(&self.rows);
        self.settle();
    }

    /// Append rows at the end.
    pub fn append(&mut self, rows: impl IntoIterator<Item = Row>) {
        let mut all = self.rows.clone();
        all.extend(rows);
        self.set_rows(all);
    }

    /// Insert rows at the front.
    pub fn prepend(&mut self, rows: impl IntoIterator<Item = Row>) {
        let mut all: Vec<Row> = rows.into_iter().collect();
        all.extend(self.rows.iter().copied());
        self.set_rows(all);
    }

    /// Remove the row with `key`.
    pub fn remove(&mut self, key: u64) {
        let rows = self.rows.iter().copied().filter(|r| r.id != key).collect();
        self.set_rows(rows);
    }

    /// Resize the container.
    pub fn resize_viewport(&mut self, height: f64) {
        self.viewport.resize(height);
        self.scroller.on_viewport_resize();
        self.settle();
    }

    /// An ancestor becomes `display: none` (e.g. an inactive tab panel).
    pub fn hide(&mut self) {
        self.viewport.resize(0.0);
        self.scroller.on_viewport_resize();
        self.settle();
    }

    /// The ancestor becomes visible again at `height`.
    pub fn show(&mut self, height: f64) {
        self.resize_viewport(height);
    }

    /// The host caches the component and takes it out of the document.
    pub fn deactivate(&mut self) {
        self.scroller.suspend();
        self.viewport.remove_from_document();
        self.scroller.on_viewport_resize();
        self.settle();
    }

    /// The cached component is reinserted and laid out at `height`.
    pub fn activate(&mut self, height: f64) {
        self.viewport.resize(height);
        self.scroller.resume();
        self.settle();
    }

    /// The component is reinserted but layout has not happened yet.
    pub fn activate_before_layout(&mut self) {
        self.scroller.resume();
        self.settle();
    }

    /// Run the mount → observe → report loop until it converges.
    pub fn settle(&mut self) {
        for _ in 0..MAX_SETTLE_ROUNDS {
            self.sync_mounts();
            let pending = self.observer().take_pending();
            if pending.is_empty() {
                return;
            }
            let entries = self.reports_for(&pending);
            self.scroller.on_resize_batch(&entries);
        }
        self.sync_mounts();
        self.unsettled += 1;
        tracing::warn!(rounds = MAX_SETTLE_ROUNDS, "layout did not settle");
    }

    /// Deliver one observer callback built from explicit entries.
    pub fn deliver(&mut self, entries: &[ResizeEntry]) {
        self.scroller.on_resize_batch(entries);
        self.settle();
    }

    /// Check the range and spacer invariants of the current layout.
    pub fn check_invariants(&self) -> Result<(), String> {
        let s = &self.scroller;
        let render = s.get_render_range();
        let visible = s.get_visible_range();
        if render.end > s.len() {
            return Err(format!("render {render:?} exceeds {} items", s.len()));
        }
        if !visible.is_empty() && !render.contains_range(&visible) {
            return Err(format!("visible {visible:?} not inside render {render:?}"));
        }
        let rendered: f64 = s.virtual_items().map(|item| item.height).sum();
        let total = s.spacer_before() + rendered + s.spacer_after();
        if (total - s.total_height()).abs() > 1e-6 {
            return Err(format!(
                "spacers + rows = {total}, total height = {}",
                s.total_height()
            ));
        }
        let mounted: BTreeSet<u64> = self.mounted.keys().copied().collect();
        let expected: BTreeSet<u64> = s.virtual_items().map(|item| *item.key).collect();
        if mounted != expected {
            return Err(format!("mounted {mounted:?} != render keys {expected:?}"));
        }
        Ok(())
    }

    // ─── Internals ───────────────────────────────────────────────────

    /// Heights the observer reports: 0 while the viewport is collapsed.
    fn reports_for(&self, elements: &[ElementId]) -> Vec<ResizeEntry> {
        let collapsed = self.viewport.height() <= 0.0;
        let by_element: HashMap<ElementId, u64> =
            self.mounted.iter().map(|(&key, &el)| (el, key)).collect();
        elements
            .iter()
            .filter_map(|element| {
                let key = by_element.get(element)?;
                let height = if collapsed {
                    0.0
                } else {
                    self.true_heights.get(key).copied().unwrap_or(0.0)
                };
                Some(ResizeEntry::new(*element, height))
            })
            .collect()
    }

    /// Reconcile wrapper elements with the render range.
    fn sync_mounts(&mut self) {
        self.events.extend(self.scroller.drain_events());
        let wanted: BTreeSet<u64> = self.scroller.virtual_items().map(|item| *item.key).collect();

        let gone: Vec<u64> = self
            .mounted
            .keys()
            .filter(|key| !wanted.contains(key))
            .copied()
            .collect();
        for key in gone {
            if let Some(element) = self.mounted.remove(&key) {
                self.registrar.unregister(element);
                *self.unmounts.entry(key).or_default() += 1;
            }
        }

        for key in wanted {
            if self.mounted.contains_key(&key) {
                continue;
            }
            let element = ElementId(self.next_element);
            self.next_element += 1;
            self.registrar.register(element, key);
            self.mounted.insert(key, element);
            *self.mounts.entry(key).or_default() += 1;
        }
    }
}
