//! The viewport controller: the public surface of the engine.
//!
//! [`VirtualScroller`] owns the offset index, the height cache, and the
//! resize multiplexer for one scrolling list. The host drives it with
//! explicit calls instead of reactive bindings:
//!
//! ```text
//!   host event               scroller call              effect
//!   ─────────────────────    ───────────────────────    ─────────────────────────────
//!   mounted                  attach(container)          install observer, first layout
//!   items changed            set_items(&items)          re-key, anchor-preserving relayout
//!   native scroll            on_scroll()                recompute ranges, Scroll event
//!   container resized        on_viewport_resize()       hidden→visible remeasure
//!   observer callback        on_resize_batch(&entries)  atomic height update + correction
//!   deactivated/activated    suspend() / resume()       anchor capture / deferred restore
//!   unmounted                detach()                   drop observer and container
//! ```
//!
//! After each call the host reads [`VirtualScroller::virtual_items`] and the
//! spacer heights to render, and drains [`ScrollerEvent`]s.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Empty item list | Navigation is a no-op |
//! | Index out of bounds | Clamped to the last item |
//! | Anchor key removed | Clamped to the captured index, warning logged |
//! | No container attached | Navigation is a no-op |
//! | Viewport height 0 | Ranges frozen until it becomes visible again |
//! | No resize backend | Items keep their estimated height, warning logged |

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use crate::anchor::{self, AnchorResolution, ScrollAnchor};
use crate::config::ScrollerConfig;
use crate::container::{ScrollAlign, ScrollBehavior, ScrollContainer, ScrollState, ScrollToOptions};
use crate::error::ConfigResult;
use crate::event::ScrollerEvent;
use crate::fenwick::HeightTree;
use crate::height_cache::HeightCache;
use crate::observer::{ResizeEntry, ResizeMultiplexer, ResizeRegistrar};
use crate::range::{ItemRange, RangeCalculator, RangeOutput};

/// Relative slack below which an anchor correction is rounding noise.
const ANCHOR_SLACK: f64 = 1e-9;

/// One rendered row, as handed to the host's item template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualItem<'a, K> {
    /// Index in the item list.
    pub index: usize,
    /// Item key.
    pub key: &'a K,
    /// Y-offset of the item's top edge.
    pub start: f64,
    /// Height used for layout (measured or estimated).
    pub height: f64,
}

/// Attachment state of the scroll container.
#[derive(Debug, Clone, PartialEq)]
enum Lifecycle<K> {
    /// No container.
    Detached,
    /// Container attached and trusted.
    Active,
    /// Container about to leave (or out of) the document; scroll offset is
    /// not trustworthy.
    Suspended {
        anchor: Option<ScrollAnchor<K>>,
        at_bottom: bool,
    },
    /// Container is back but has not been laid out yet.
    Resuming {
        anchor: Option<ScrollAnchor<K>>,
        at_bottom: bool,
    },
}

/// Windowed rendering controller for a variable-height list.
pub struct VirtualScroller<T, K> {
    config: ScrollerConfig,
    calc: RangeCalculator,
    key_of: Box<dyn Fn(&T) -> K>,
    keys: Vec<K>,
    index_of: HashMap<K, usize>,
    heights: HeightTree,
    cache: HeightCache<K>,
    observer: Rc<RefCell<ResizeMultiplexer<K>>>,
    container: Option<Box<dyn ScrollContainer>>,
    lifecycle: Lifecycle<K>,
    output: RangeOutput,
    laid_out: bool,
    scroll_top: f64,
    viewport_height: f64,
    stick_to_bottom: bool,
    events: Vec<ScrollerEvent<K>>,
}

impl<T, K: fmt::Debug> fmt::Debug for VirtualScroller<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualScroller")
            .field("config", &self.config)
            .field("items", &self.keys.len())
            .field("lifecycle", &self.lifecycle)
            .field("output", &self.output)
            .field("scroll_top", &self.scroll_top)
            .field("viewport_height", &self.viewport_height)
            .field("stick_to_bottom", &self.stick_to_bottom)
            .finish_non_exhaustive()
    }
}

impl<T, K> VirtualScroller<T, K>
where
    K: Clone + Eq + Hash,
{
    /// Create a scroller. `key_of` must return a unique key per item.
    pub fn new(config: ScrollerConfig, key_of: impl Fn(&T) -> K + 'static) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            calc: RangeCalculator::new(config.buffer, config.unload_buffer),
            key_of: Box::new(key_of),
            keys: Vec::new(),
            index_of: HashMap::new(),
            heights: HeightTree::new(0),
            cache: HeightCache::new(config.min_item_height),
            observer: Rc::new(RefCell::new(ResizeMultiplexer::new())),
            container: None,
            lifecycle: Lifecycle::Detached,
            output: RangeOutput::default(),
            laid_out: false,
            scroll_top: 0.0,
            viewport_height: 0.0,
            stick_to_bottom: false,
            events: Vec::new(),
        })
    }

    /// Create a scroller and load its initial items.
    pub fn with_items(
        config: ScrollerConfig,
        key_of: impl Fn(&T) -> K + 'static,
        items: &[T],
    ) -> ConfigResult<Self> {
        let mut scroller = Self::new(config, key_of)?;
        scroller.set_items(items);
        Ok(scroller)
    }

    // ─── Lifecycle ───────────────────────────────────────────────────

    /// Attach the scroll container and perform the first layout.
    pub fn attach(&mut self, mut container: Box<dyn ScrollContainer>) {
        let backend = container.resize_backend();
        self.observer.borrow_mut().install(backend);
        self.scroll_top = container.scroll_top();
        self.viewport_height = container.client_height();
        self.container = Some(container);
        self.lifecycle = Lifecycle::Active;
        tracing::debug!(
            scroll_top = self.scroll_top,
            viewport = self.viewport_height,
            "scroller attached"
        );
        self.recompute();
    }

    /// Drop the container and stop observing. Heights and items are kept.
    pub fn detach(&mut self) {
        self.observer.borrow_mut().disconnect_backend();
        self.container = None;
        self.viewport_height = 0.0;
        self.lifecycle = Lifecycle::Detached;
        tracing::debug!("scroller detached");
    }

    /// Capture the scroll position before the container leaves the document.
    pub fn suspend(&mut self) {
        if self.lifecycle != Lifecycle::Active {
            return;
        }
        self.sync_scroll_top();
        let anchor = self.capture_anchor();
        let at_bottom = self.is_at_bottom();
        tracing::debug!(
            anchor_index = ?anchor.as_ref().map(|a| a.index),
            at_bottom,
            "scroller suspended"
        );
        self.lifecycle = Lifecycle::Suspended { anchor, at_bottom };
    }

    /// Restore the position captured by [`suspend`](Self::suspend).
    ///
    /// The restore happens immediately if the container has a non-zero
    /// height, otherwise on the next [`on_viewport_resize`](Self::on_viewport_resize)
    /// that reports one.
    pub fn resume(&mut self) {
        let Lifecycle::Suspended { anchor, at_bottom } = &self.lifecycle else {
            return;
        };
        self.lifecycle = Lifecycle::Resuming {
            anchor: anchor.clone(),
            at_bottom: *at_bottom,
        };
        self.viewport_height = self.read_client_height();
        self.try_finish_resume();
    }

    /// Whether a container is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.container.is_some()
    }

    /// Whether the scroller is suspended or waiting to finish a resume.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        matches!(
            self.lifecycle,
            Lifecycle::Suspended { .. } | Lifecycle::Resuming { .. }
        )
    }

    // ─── Host notifications ──────────────────────────────────────────

    /// The live item sequence changed.
    ///
    /// Keys are re-derived, and the scroll anchor captured beforehand is
    /// restored so that inserts/removals above the viewport do not move the
    /// content. With stick-to-bottom enabled and the viewport at the bottom,
    /// the view follows the new bottom instead.
    pub fn set_items(&mut self, items: &[T]) {
        let active = self.is_live();
        let anchor = if active { self.capture_anchor() } else { None };
        let was_at_bottom = active && self.is_at_bottom();
        let old_total = self.heights.total();

        self.keys.clear();
        self.keys.extend(items.iter().map(|item| (self.key_of)(item)));
        self.index_of.clear();
        self.index_of.extend(self.keys.iter().cloned().enumerate().map(|(i, k)| (k, i)));
        let values: Vec<f64> = self.keys.iter().map(|k| self.cache.height_of(k)).collect();
        self.heights.rebuild(&values);

        if active {
            if self.stick_to_bottom && was_at_bottom && self.heights.total() != old_total {
                self.apply_scroll(self.max_scroll_top(), ScrollBehavior::Auto);
            } else if let Some(anchor) = anchor {
                self.restore_anchor(&anchor);
            }
        }
        self.recompute();
    }

    /// Forward a native scroll event.
    pub fn on_scroll(&mut self) {
        if !self.is_live() {
            tracing::trace!("scroll ignored while inactive");
            return;
        }
        self.sync_scroll_top();
        self.events.push(ScrollerEvent::Scroll {
            scroll_top: self.scroll_top,
        });
        self.recompute();
    }

    /// Forward a size change of the container itself.
    pub fn on_viewport_resize(&mut self) {
        if self.container.is_none() {
            return;
        }
        let old = self.viewport_height;
        let was_at_bottom = self.is_live() && self.is_at_bottom();
        let new = self.read_client_height();
        self.viewport_height = new;

        if old <= 0.0 && new > 0.0 {
            if matches!(self.lifecycle, Lifecycle::Resuming { .. }) {
                self.try_finish_resume();
                return;
            }
            self.remeasure_after_hidden();
        }
        if self.is_live() {
            self.sync_scroll_top();
            if self.stick_to_bottom && was_at_bottom {
                self.apply_scroll(self.max_scroll_top(), ScrollBehavior::Auto);
            }
        }
        self.recompute();
    }

    /// Apply one resize-observer callback as a single atomic update.
    pub fn on_resize_batch(&mut self, entries: &[ResizeEntry]) {
        let batch = self.observer.borrow().collect(entries);
        tracing::trace!(
            received = entries.len(),
            zero_filtered = batch.zero_filtered,
            unknown = batch.unknown,
            applied = batch.updates.len(),
            "resize batch"
        );
        if batch.is_empty() {
            return;
        }
        let _span = tracing::debug_span!("vscroll_resize_batch", entries = batch.updates.len()).entered();

        let live = self.is_live();
        if live {
            self.sync_scroll_top();
        }
        let anchor = if live { self.capture_anchor() } else { None };
        let was_at_bottom = live && self.is_at_bottom();
        let old_total = self.heights.total();

        for (key, height) in batch.updates {
            if !self.cache.would_change(&key, height) {
                continue;
            }
            let old_height = self.cache.record(&key, height);
            if let Some(&index) = self.index_of.get(&key) {
                self.heights.set(index, height);
            }
            self.events.push(ScrollerEvent::ItemResized {
                key,
                height,
                old_height,
            });
        }

        if live {
            let new_total = self.heights.total();
            if self.stick_to_bottom && was_at_bottom && new_total != old_total {
                self.apply_scroll(self.max_scroll_top(), ScrollBehavior::Auto);
            } else if let Some(anchor) = anchor {
                self.restore_anchor(&anchor);
            }
        }
        self.recompute();
    }

    /// Registration interface for item wrappers.
    #[must_use]
    pub fn observer(&self) -> ResizeRegistrar<K> {
        ResizeRegistrar::new(Rc::clone(&self.observer))
    }

    /// Take all queued events.
    pub fn drain_events(&mut self) -> Vec<ScrollerEvent<K>> {
        std::mem::take(&mut self.events)
    }

    // ─── Navigation ──────────────────────────────────────────────────

    /// Scroll so that item `index` is aligned per `options`.
    ///
    /// Out-of-range indices clamp to the last item; an empty list is a no-op.
    pub fn scroll_to_index(&mut self, index: usize, options: ScrollToOptions) {
        if self.keys.is_empty() || !self.is_live() {
            return;
        }
        let index = index.min(self.keys.len() - 1);
        let top = self.heights.offset_of(index);
        let height = self.heights.get(index);
        let vh = self.viewport_height;
        let target = match options.align {
            ScrollAlign::Start => top,
            ScrollAlign::Center => top + height / 2.0 - vh / 2.0,
            ScrollAlign::End => top + height - vh,
        };
        self.apply_scroll(target, options.behavior);
        self.recompute();
    }

    /// Scroll to the item with `key`. Unknown keys are ignored.
    pub fn scroll_to_key(&mut self, key: &K, options: ScrollToOptions) {
        if let Some(&index) = self.index_of.get(key) {
            self.scroll_to_index(index, options);
        }
    }

    /// Scroll to the first item.
    pub fn scroll_to_top(&mut self) {
        self.scroll_to_index(0, ScrollToOptions::align(ScrollAlign::Start));
    }

    /// Scroll to the last item's bottom edge.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_to_index(usize::MAX, ScrollToOptions::align(ScrollAlign::End));
    }

    /// Scroll by `delta` pixels (positive = down).
    pub fn scroll_by(&mut self, delta: f64) {
        if !self.is_live() {
            return;
        }
        self.sync_scroll_top();
        self.apply_scroll(self.scroll_top + delta, ScrollBehavior::Auto);
        self.recompute();
    }

    /// Scroll up by one viewport height.
    pub fn page_up(&mut self) {
        self.scroll_by(-self.viewport_height);
    }

    /// Scroll down by one viewport height.
    pub fn page_down(&mut self) {
        self.scroll_by(self.viewport_height);
    }

    /// Follow the bottom as content grows, starting at the bottom now.
    pub fn enable_stick_to_bottom(&mut self) {
        self.stick_to_bottom = true;
        tracing::debug!("stick-to-bottom enabled");
        self.scroll_to_bottom();
    }

    /// Stop following the bottom.
    pub fn disable_stick_to_bottom(&mut self) {
        self.stick_to_bottom = false;
        tracing::debug!("stick-to-bottom disabled");
    }

    /// Whether stick-to-bottom mode is on.
    #[must_use]
    pub fn is_stick_to_bottom(&self) -> bool {
        self.stick_to_bottom
    }

    /// Current position as an anchor, for persisting across teardown.
    ///
    /// While suspended this is the anchor captured at suspension.
    #[must_use]
    pub fn get_scroll_anchor(&self) -> Option<ScrollAnchor<K>> {
        match &self.lifecycle {
            Lifecycle::Suspended { anchor, .. } | Lifecycle::Resuming { anchor, .. } => {
                anchor.clone()
            }
            _ => self.capture_anchor(),
        }
    }

    /// Scroll back to a previously captured anchor.
    ///
    /// While suspended the anchor replaces the pending one and is applied on
    /// resume.
    pub fn scroll_to_anchor(&mut self, anchor: &ScrollAnchor<K>) {
        if let Lifecycle::Suspended {
            anchor: pending,
            at_bottom,
        }
        | Lifecycle::Resuming {
            anchor: pending,
            at_bottom,
        } = &mut self.lifecycle
        {
            *pending = Some(anchor.clone());
            *at_bottom = false;
            return;
        }
        if self.is_live() {
            self.sync_scroll_top();
            self.restore_anchor(anchor);
            self.recompute();
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────

    /// Scroll metrics snapshot.
    #[must_use]
    pub fn get_scroll_state(&self) -> ScrollState {
        ScrollState {
            scroll_top: self.scroll_top,
            scroll_height: self.heights.total().max(self.viewport_height),
            client_height: self.viewport_height,
        }
    }

    /// Indices intersecting the viewport.
    #[must_use]
    pub fn get_visible_range(&self) -> ItemRange {
        self.output.visible
    }

    /// Indices that get wrapper elements.
    #[must_use]
    pub fn get_render_range(&self) -> ItemRange {
        self.output.render
    }

    /// Last computed layout.
    #[must_use]
    pub fn range_output(&self) -> &RangeOutput {
        &self.output
    }

    /// Whether the viewport is at the top (within `edge_epsilon`).
    #[must_use]
    pub fn is_at_top(&self) -> bool {
        self.scroll_top <= self.config.edge_epsilon
    }

    /// Whether the viewport is at the bottom (within `edge_epsilon`).
    #[must_use]
    pub fn is_at_bottom(&self) -> bool {
        self.max_scroll_top() - self.scroll_top <= self.config.edge_epsilon
    }

    /// Rendered rows with their layout positions.
    pub fn virtual_items(&self) -> impl Iterator<Item = VirtualItem<'_, K>> + '_ {
        let render = self.output.render;
        let mut start = self.heights.offset_of(render.start);
        render.iter().filter(move |&i| i < self.keys.len()).map(move |index| {
            let height = self.heights.get(index);
            let item = VirtualItem {
                index,
                key: &self.keys[index],
                start,
                height,
            };
            start += height;
            item
        })
    }

    /// Height of the spacer before the rendered rows.
    #[must_use]
    pub fn spacer_before(&self) -> f64 {
        self.output.spacer_before
    }

    /// Height of the spacer after the rendered rows.
    #[must_use]
    pub fn spacer_after(&self) -> f64 {
        self.output.spacer_after
    }

    /// Sum of all item heights.
    #[must_use]
    pub fn total_height(&self) -> f64 {
        self.heights.total()
    }

    /// Top edge of item `index`.
    #[must_use]
    pub fn item_offset(&self, index: usize) -> Option<f64> {
        (index < self.keys.len()).then(|| self.heights.offset_of(index))
    }

    /// Layout height of item `index`.
    #[must_use]
    pub fn item_height(&self, index: usize) -> Option<f64> {
        (index < self.keys.len()).then(|| self.heights.get(index))
    }

    /// Current index of `key`.
    #[must_use]
    pub fn index_of_key(&self, key: &K) -> Option<usize> {
        self.index_of.get(key).copied()
    }

    /// Key at `index`.
    #[must_use]
    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.keys.get(index)
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Measured heights.
    #[must_use]
    pub fn height_cache(&self) -> &HeightCache<K> {
        &self.cache
    }

    /// Configuration this scroller was built with.
    #[must_use]
    pub fn config(&self) -> &ScrollerConfig {
        &self.config
    }

    // ─── Internals ───────────────────────────────────────────────────

    /// Attached, not suspended, and visible.
    fn is_live(&self) -> bool {
        self.lifecycle == Lifecycle::Active && self.container.is_some() && self.viewport_height > 0.0
    }

    fn read_client_height(&self) -> f64 {
        self.container.as_ref().map_or(0.0, |c| c.client_height())
    }

    fn sync_scroll_top(&mut self) {
        if let Some(container) = self.container.as_ref() {
            self.scroll_top = container.scroll_top();
        }
    }

    fn max_scroll_top(&self) -> f64 {
        (self.heights.total() - self.viewport_height).max(0.0)
    }

    fn capture_anchor(&self) -> Option<ScrollAnchor<K>> {
        anchor::capture(&self.heights, &self.keys, self.scroll_top)
    }

    fn restore_anchor(&mut self, anchor: &ScrollAnchor<K>) {
        let resolution = anchor::resolve(anchor, &self.heights, &self.index_of);
        if let AnchorResolution::Clamped { index, .. } = resolution {
            tracing::warn!(
                captured_index = anchor.index,
                index,
                "scroll anchor item is gone; clamping"
            );
        }
        if let Some(target) = resolution.scroll_top() {
            let delta = target - self.scroll_top;
            // offset_of(i) + (top - offset_of(i)) can miss top by an ulp.
            if delta.abs() > ANCHOR_SLACK * self.scroll_top.abs().max(1.0) {
                tracing::debug!(delta, "scroll position corrected from anchor");
                self.apply_scroll(target, ScrollBehavior::Auto);
            }
        }
    }

    /// Clamp and push a scroll offset to the container.
    fn apply_scroll(&mut self, target: f64, behavior: ScrollBehavior) {
        let target = target.clamp(0.0, self.max_scroll_top());
        if let Some(container) = self.container.as_mut() {
            container.set_scroll_top(target, behavior);
            self.scroll_top = container.scroll_top();
        }
    }

    fn remeasure_after_hidden(&mut self) {
        let reset = self.cache.invalidate_zero_heights();
        if reset > 0 {
            let values: Vec<f64> = self.keys.iter().map(|k| self.cache.height_of(k)).collect();
            self.heights.rebuild(&values);
        }
        let remeasured = self.observer.borrow_mut().remeasure();
        tracing::debug!(reset, remeasured, "viewport visible again; remeasuring");
    }

    fn try_finish_resume(&mut self) {
        let Lifecycle::Resuming { anchor, at_bottom } = &self.lifecycle else {
            return;
        };
        if self.viewport_height <= 0.0 {
            tracing::debug!("resume deferred until the viewport has a height");
            return;
        }
        let anchor = anchor.clone();
        let at_bottom = *at_bottom;
        self.lifecycle = Lifecycle::Active;
        // Anything measured while detached may have seen a zero-height parent.
        self.remeasure_after_hidden();
        self.sync_scroll_top();
        if self.stick_to_bottom && at_bottom {
            self.apply_scroll(self.max_scroll_top(), ScrollBehavior::Auto);
        } else if let Some(anchor) = anchor {
            self.restore_anchor(&anchor);
        }
        tracing::debug!(scroll_top = self.scroll_top, "scroller resumed");
        self.recompute();
    }

    /// Recompute ranges from the current scroll offset and heights.
    fn recompute(&mut self) {
        let len = self.keys.len();
        let hidden = self.viewport_height <= 0.0 && self.laid_out;
        let _span = tracing::debug_span!(
            "vscroll_recompute",
            items = len,
            scroll_top = self.scroll_top,
            viewport = self.viewport_height
        )
        .entered();

        let out = if hidden || self.is_suspended() {
            // Layout reads are unreliable; keep the window, refresh geometry.
            let render = ItemRange::new(self.output.render.start.min(len), self.output.render.end.min(len));
            let visible = self.output.visible.intersect(&render);
            RangeOutput {
                render,
                visible,
                spacer_before: self.heights.offset_of(render.start),
                spacer_after: (self.heights.total() - self.heights.offset_of(render.end)).max(0.0),
                total_height: self.heights.total(),
            }
        } else {
            let previous = self.laid_out.then_some(self.output.render);
            self.calc
                .compute(&self.heights, self.scroll_top, self.viewport_height, previous)
        };

        // Only rows a container will actually mount count as recently used.
        if self.container.is_some() {
            for index in out.render.iter() {
                self.cache.touch(&self.keys[index]);
            }
        }

        if out.render != self.output.render || out.visible != self.output.visible {
            tracing::trace!(
                render_start = out.render.start,
                render_end = out.render.end,
                visible_start = out.visible.start,
                visible_end = out.visible.end,
                "range update"
            );
            self.events.push(ScrollerEvent::Update {
                render: out.render,
                visible: out.visible,
            });
        }
        self.output = out;
        self.laid_out = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal container: jumps instantly, no observer.
    struct Fixed {
        top: Rc<RefCell<f64>>,
        height: f64,
    }

    impl ScrollContainer for Fixed {
        fn scroll_top(&self) -> f64 {
            *self.top.borrow()
        }
        fn set_scroll_top(&mut self, top: f64, _behavior: ScrollBehavior) {
            *self.top.borrow_mut() = top;
        }
        fn client_height(&self) -> f64 {
            self.height
        }
        fn resize_backend(&mut self) -> Option<Box<dyn crate::observer::ResizeBackend>> {
            None
        }
    }

    fn scroller(n: usize) -> (VirtualScroller<u32, u32>, Rc<RefCell<f64>>) {
        let items: Vec<u32> = (0..n as u32).collect();
        let mut s = VirtualScroller::with_items(ScrollerConfig::default(), |i: &u32| *i, &items)
            .expect("valid config");
        let top = Rc::new(RefCell::new(0.0));
        s.attach(Box::new(Fixed {
            top: Rc::clone(&top),
            height: 600.0,
        }));
        (s, top)
    }

    #[test]
    fn new_rejects_invalid_config() {
        let cfg = ScrollerConfig::default().with_min_item_height(-3.0);
        assert!(VirtualScroller::<u32, u32>::new(cfg, |i| *i).is_err());
    }

    #[test]
    fn initial_layout_at_top() {
        let (s, _) = scroller(1000);
        assert_eq!(s.get_visible_range(), ItemRange::new(0, 25));
        assert_eq!(s.get_render_range(), ItemRange::new(0, 46));
        assert_eq!(s.spacer_before(), 0.0);
        assert_eq!(s.spacer_after(), (1000 - 46) as f64 * 24.0);
        assert!(s.is_at_top());
        assert!(!s.is_at_bottom());
    }

    #[test]
    fn scroll_to_bottom_reaches_max() {
        let (mut s, top) = scroller(1000);
        s.scroll_to_bottom();
        assert_eq!(*top.borrow(), 24_000.0 - 600.0);
        assert_eq!(s.get_scroll_state().scroll_top, 24_000.0 - 600.0);
        assert!(s.is_at_bottom());
        assert_eq!(s.get_visible_range().end, 1000);
    }

    #[test]
    fn scroll_to_index_alignments() {
        let (mut s, top) = scroller(1000);
        s.scroll_to_index(100, ScrollToOptions::align(ScrollAlign::Start));
        assert_eq!(*top.borrow(), 2400.0);
        s.scroll_to_index(100, ScrollToOptions::align(ScrollAlign::Center));
        assert_eq!(*top.borrow(), 2400.0 + 12.0 - 300.0);
        s.scroll_to_index(100, ScrollToOptions::align(ScrollAlign::End));
        assert_eq!(*top.borrow(), 2424.0 - 600.0);
        // Near the top, End clamps to 0.
        s.scroll_to_index(3, ScrollToOptions::align(ScrollAlign::End));
        assert_eq!(*top.borrow(), 0.0);
    }

    #[test]
    fn out_of_range_index_clamps() {
        let (mut s, top) = scroller(10);
        s.scroll_to_index(5_000, ScrollToOptions::default());
        // 10 * 24 = 240 < 600: nothing to scroll.
        assert_eq!(*top.borrow(), 0.0);
        assert!(s.is_at_bottom());
    }

    #[test]
    fn navigation_on_empty_list_is_noop() {
        let (mut s, top) = scroller(0);
        s.scroll_to_index(3, ScrollToOptions::default());
        s.scroll_to_bottom();
        s.page_down();
        assert_eq!(*top.borrow(), 0.0);
        assert!(s.get_scroll_anchor().is_none());
        assert_eq!(s.get_render_range(), ItemRange::EMPTY);
    }

    #[test]
    fn page_down_and_up() {
        let (mut s, top) = scroller(1000);
        s.page_down();
        assert_eq!(*top.borrow(), 600.0);
        s.page_up();
        assert_eq!(*top.borrow(), 0.0);
        s.scroll_by(-50.0);
        assert_eq!(*top.borrow(), 0.0);
    }

    #[test]
    fn scroll_to_key_and_unknown_key() {
        let (mut s, top) = scroller(100);
        s.scroll_to_key(&10, ScrollToOptions::default());
        assert_eq!(*top.borrow(), 240.0);
        s.scroll_to_key(&9_999, ScrollToOptions::default());
        assert_eq!(*top.borrow(), 240.0);
    }

    #[test]
    fn anchor_round_trip_is_idempotent() {
        let (mut s, top) = scroller(1000);
        s.scroll_to_index(321, ScrollToOptions::align(ScrollAlign::Center));
        let before = *top.borrow();
        let anchor = s.get_scroll_anchor().unwrap();
        s.scroll_to_anchor(&anchor);
        assert_eq!(*top.borrow(), before);
    }

    #[test]
    fn insert_above_keeps_content_in_place() {
        let (mut s, top) = scroller(100);
        s.scroll_to_index(50, ScrollToOptions::default());
        assert_eq!(*top.borrow(), 1200.0);
        let mut items: Vec<u32> = (1000..1005).collect();
        items.extend(0..100);
        s.set_items(&items);
        assert_eq!(*top.borrow(), 1200.0 + 5.0 * 24.0);
        assert_eq!(s.index_of_key(&50), Some(55));
    }

    #[test]
    fn stick_to_bottom_follows_appends() {
        let (mut s, top) = scroller(100);
        s.enable_stick_to_bottom();
        assert!(s.is_at_bottom());
        let items: Vec<u32> = (0..110).collect();
        s.set_items(&items);
        assert!(s.is_at_bottom());
        assert_eq!(*top.borrow(), 110.0 * 24.0 - 600.0);
    }

    #[test]
    fn update_events_on_range_change_only() {
        let (mut s, _) = scroller(1000);
        let first = s.drain_events();
        assert!(first.iter().any(|e| e.name() == "update"));
        s.on_scroll();
        let events = s.drain_events();
        assert_eq!(events, vec![ScrollerEvent::Scroll { scroll_top: 0.0 }]);
    }

    #[test]
    fn virtual_items_cover_render_range() {
        let (s, _) = scroller(1000);
        let items: Vec<_> = s.virtual_items().collect();
        assert_eq!(items.len(), 46);
        assert_eq!(items[0].start, 0.0);
        assert_eq!(items[10].start, 240.0);
        assert_eq!(*items[45].key, 45);
        assert_eq!(s.height_cache().len(), 46);
    }

    #[test]
    fn detached_layout_leaves_cache_untouched() {
        let items: Vec<u32> = (0..1000).collect();
        let mut s =
            VirtualScroller::with_items(ScrollerConfig::default(), |i: &u32| *i, &items).unwrap();
        assert!(!s.get_render_range().is_empty());
        assert!(s.height_cache().is_empty());

        s.attach(Box::new(Fixed {
            top: Rc::new(RefCell::new(0.0)),
            height: 600.0,
        }));
        assert_eq!(s.height_cache().len(), s.get_render_range().len());
    }

    #[test]
    fn detached_navigation_is_noop() {
        let items: Vec<u32> = (0..100).collect();
        let mut s =
            VirtualScroller::with_items(ScrollerConfig::default(), |i: &u32| *i, &items).unwrap();
        s.scroll_to_index(50, ScrollToOptions::default());
        assert_eq!(s.get_scroll_state().scroll_top, 0.0);
        assert!(!s.is_attached());
    }
}
