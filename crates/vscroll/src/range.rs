//! Render/visible range calculation with load/unload hysteresis.
//!
//! # Windows
//!
//! For a scroll offset `top` and viewport height `vh`:
//!
//! - **visible**: items intersecting `[top, top + vh)`.
//! - **load**: items intersecting `[top - buffer, top + vh + buffer)`.
//! - **keep**: items intersecting `[top - unload, top + vh + unload)`.
//!
//! The render range is the load range, widened to retain previously rendered
//! items that are still inside the keep window. An item parked between the
//! two thresholds therefore stays in whatever state it was in, which is what
//! stops slow scrolling from mounting and unmounting the same row every frame.
//!
//! # Invariants
//!
//! 1. `0 <= render.start <= render.end <= len`.
//! 2. `visible ⊆ render`.
//! 3. Nothing outside the load window is rendered unless it was rendered
//!    before and is still inside the keep window.

use std::ops::Range;

use crate::fenwick::HeightTree;

/// Half-open index window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemRange {
    /// First index in the window.
    pub start: usize,
    /// One past the last index in the window.
    pub end: usize,
}

impl ItemRange {
    /// The empty range at index 0.
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    /// Create a range, normalising `end < start` to an empty range at `start`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        if end < start {
            Self { start, end: start }
        } else {
            Self { start, end }
        }
    }

    /// Number of indices covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the window covers nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `index` is inside the window.
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    /// Whether `other` lies entirely inside `self`. Empty ranges are contained
    /// everywhere.
    #[must_use]
    pub const fn contains_range(&self, other: &ItemRange) -> bool {
        other.is_empty() || (other.start >= self.start && other.end <= self.end)
    }

    /// Overlap of two windows (empty when disjoint).
    #[must_use]
    pub fn intersect(&self, other: &ItemRange) -> ItemRange {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start >= end {
            ItemRange::EMPTY
        } else {
            ItemRange { start, end }
        }
    }

    /// Whether the union of the two windows is itself contiguous.
    #[must_use]
    pub const fn touches(&self, other: &ItemRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Iterate the covered indices.
    pub fn iter(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for ItemRange {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

impl From<ItemRange> for Range<usize> {
    fn from(r: ItemRange) -> Self {
        r.start..r.end
    }
}

/// Everything the host needs to lay out one frame of the list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RangeOutput {
    /// Indices that get wrapper elements.
    pub render: ItemRange,
    /// Indices geometrically intersecting the viewport.
    pub visible: ItemRange,
    /// Height of the spacer placed before the rendered items.
    pub spacer_before: f64,
    /// Height of the spacer placed after the rendered items.
    pub spacer_after: f64,
    /// Sum of all item heights (measured or estimated).
    pub total_height: f64,
}

/// Stateless range math over a [`HeightTree`]; the previous render range is
/// passed in so the hysteresis policy can be applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeCalculator {
    /// Pixels loaded beyond each viewport edge.
    pub buffer: f64,
    /// Pixels beyond each viewport edge after which rendered items unload.
    pub unload_buffer: f64,
}

impl RangeCalculator {
    /// Create a calculator. `unload_buffer` is raised to `buffer` if smaller.
    #[must_use]
    pub fn new(buffer: f64, unload_buffer: f64) -> Self {
        Self {
            buffer,
            unload_buffer: unload_buffer.max(buffer),
        }
    }

    /// Items intersecting the pixel span `[from, to)`.
    ///
    /// An empty span yields an empty range positioned at the item containing
    /// `from`.
    #[must_use]
    pub fn window(heights: &HeightTree, from: f64, to: f64) -> ItemRange {
        let len = heights.len();
        if len == 0 {
            return ItemRange::EMPTY;
        }
        let from = from.max(0.0);
        let start = heights.index_at(from).min(len);
        if to <= from {
            return ItemRange::new(start, start);
        }
        // Items whose top edge lies strictly above `to`.
        let end = match heights.find_prefix_below(to) {
            Some(i) => (i + 2).min(len),
            None => 1.min(len),
        };
        ItemRange::new(start, end)
    }

    /// Compute ranges and spacer heights for the given scroll position.
    ///
    /// `previous` is the render range from the last computation (or `None`
    /// on first layout / after the item list was replaced).
    #[must_use]
    pub fn compute(
        &self,
        heights: &HeightTree,
        scroll_top: f64,
        viewport_height: f64,
        previous: Option<ItemRange>,
    ) -> RangeOutput {
        let total_height = heights.total();
        let len = heights.len();
        if len == 0 {
            return RangeOutput {
                total_height,
                ..RangeOutput::default()
            };
        }

        let top = scroll_top.max(0.0);
        let bottom = top + viewport_height.max(0.0);

        let visible = Self::window(heights, top, bottom);
        let load = Self::window(heights, top - self.buffer, bottom + self.buffer);

        let render = match previous {
            Some(prev) if !prev.is_empty() && prev.end <= len => {
                let keep = Self::window(
                    heights,
                    top - self.unload_buffer,
                    bottom + self.unload_buffer,
                );
                let retained = prev.intersect(&keep);
                if !retained.is_empty() && retained.touches(&load) {
                    ItemRange::new(
                        load.start.min(retained.start),
                        load.end.max(retained.end),
                    )
                } else {
                    load
                }
            }
            _ => load,
        };

        let spacer_before = heights.offset_of(render.start);
        let spacer_after = (total_height - heights.offset_of(render.end)).max(0.0);

        RangeOutput {
            render,
            visible,
            spacer_before,
            spacer_after,
            total_height,
        }
    }
}
