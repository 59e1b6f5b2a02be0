//! Scroll anchors: "this item, this many pixels down" positions that survive
//! reflow.
//!
//! Capturing records the item whose top edge is the last one at or above the
//! scroll offset. Restoring looks that item up again by key, so heights that
//! changed above it (or items inserted/removed before it) move the scroll
//! offset with the content instead of letting the content jump.

use std::collections::HashMap;
use std::hash::Hash;

use crate::fenwick::HeightTree;

/// A captured scroll position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollAnchor<K> {
    /// Index of the anchor item at capture time.
    pub index: usize,
    /// Key of the anchor item.
    pub key: K,
    /// `scroll_top - top_edge(index)` at capture time.
    pub offset: f64,
}

/// How an anchor was resolved against the current layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnchorResolution {
    /// The anchor key still exists at `index`.
    Found {
        /// Current index of the anchor key.
        index: usize,
        /// Scroll offset that puts the anchor back where it was.
        scroll_top: f64,
    },
    /// The key is gone; the captured index was clamped to a valid one.
    Clamped {
        /// Nearest valid index.
        index: usize,
        /// Top edge of that index.
        scroll_top: f64,
    },
    /// There are no items to anchor to.
    Empty,
}

impl AnchorResolution {
    /// Target scroll offset, if any.
    #[must_use]
    pub fn scroll_top(&self) -> Option<f64> {
        match *self {
            Self::Found { scroll_top, .. } | Self::Clamped { scroll_top, .. } => Some(scroll_top),
            Self::Empty => None,
        }
    }
}

/// Capture the anchor for `scroll_top`.
///
/// Returns `None` when there are no items.
pub fn capture<K: Clone>(heights: &HeightTree, keys: &[K], scroll_top: f64) -> Option<ScrollAnchor<K>> {
    let len = keys.len().min(heights.len());
    if len == 0 {
        return None;
    }
    let top = scroll_top.max(0.0);
    // Last item whose top edge is <= top: items [0..=j] end at or above `top`,
    // so item j + 1 starts at or above it.
    let index = match heights.find_prefix(top) {
        Some(j) => (j + 1).min(len - 1),
        None => 0,
    };
    Some(ScrollAnchor {
        index,
        key: keys[index].clone(),
        offset: top - heights.offset_of(index),
    })
}

/// Resolve `anchor` against the current layout.
pub fn resolve<K: Eq + Hash>(
    anchor: &ScrollAnchor<K>,
    heights: &HeightTree,
    index_of: &HashMap<K, usize>,
) -> AnchorResolution {
    let len = heights.len();
    if len == 0 {
        return AnchorResolution::Empty;
    }
    match index_of.get(&anchor.key) {
        Some(&index) if index < len => AnchorResolution::Found {
            index,
            scroll_top: heights.offset_of(index) + anchor.offset,
        },
        _ => {
            let index = anchor.index.min(len - 1);
            AnchorResolution::Clamped {
                index,
                scroll_top: heights.offset_of(index),
            }
        }
    }
}
