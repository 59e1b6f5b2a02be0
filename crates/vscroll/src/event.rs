//! Change notifications emitted by the scroller.
//!
//! The scroller queues events as state changes; the host drains them with
//! `VirtualScroller::drain_events` after each call it forwards.

use crate::range::ItemRange;

/// Something the host may need to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollerEvent<K> {
    /// The render or visible range changed.
    Update {
        /// Render range (gets wrapper elements).
        render: ItemRange,
        /// Visible range (intersects the viewport).
        visible: ItemRange,
    },
    /// An item's measured height changed.
    ItemResized {
        /// Item key.
        key: K,
        /// New height.
        height: f64,
        /// Previous measured height; `None` on first measurement.
        old_height: Option<f64>,
    },
    /// The container scrolled (native scroll event passthrough).
    Scroll {
        /// Scroll offset after the event.
        scroll_top: f64,
    },
}

impl<K> ScrollerEvent<K> {
    /// Stable name for logs and assertions.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Update { .. } => "update",
            Self::ItemResized { .. } => "item-resized",
            Self::Scroll { .. } => "scroll",
        }
    }
}
