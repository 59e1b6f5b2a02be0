//! Host scroll container abstraction.
//!
//! The engine never reads layout itself. A host (browser adapter, terminal
//! UI, test simulator) implements [`ScrollContainer`] for the element that
//! scrolls, and hands it to `VirtualScroller::attach`.

use crate::observer::ResizeBackend;

/// How a programmatic scroll should be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ScrollBehavior {
    /// Jump immediately.
    #[default]
    Auto,
    /// Animate (host-defined).
    Smooth,
}

/// Where a target item lands in the viewport after `scroll_to_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ScrollAlign {
    /// Item top at viewport top.
    #[default]
    Start,
    /// Item centre at viewport centre.
    Center,
    /// Item bottom at viewport bottom.
    End,
}

/// Options for index navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ScrollToOptions {
    /// Alignment of the target item.
    pub align: ScrollAlign,
    /// Scroll behaviour.
    pub behavior: ScrollBehavior,
}

impl ScrollToOptions {
    /// Options with the given alignment and `Auto` behaviour.
    #[must_use]
    pub const fn align(align: ScrollAlign) -> Self {
        Self {
            align,
            behavior: ScrollBehavior::Auto,
        }
    }

    /// Set the behaviour.
    #[must_use]
    pub const fn with_behavior(mut self, behavior: ScrollBehavior) -> Self {
        self.behavior = behavior;
        self
    }
}

/// Snapshot of the container's scroll metrics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    /// Current scroll offset.
    pub scroll_top: f64,
    /// Full scrollable content height.
    pub scroll_height: f64,
    /// Viewport height.
    pub client_height: f64,
}

/// The element that scrolls.
pub trait ScrollContainer {
    /// Current scroll offset in pixels.
    fn scroll_top(&self) -> f64;

    /// Request a new scroll offset. Hosts may animate when `behavior` is
    /// `Smooth`; `scroll_top()` must reflect wherever the container actually is.
    fn set_scroll_top(&mut self, top: f64, behavior: ScrollBehavior);

    /// Visible height of the container (0 while hidden or detached).
    fn client_height(&self) -> f64;

    /// Create the shared size observer for item wrappers, or `None` when the
    /// host has no observation API.
    fn resize_backend(&mut self) -> Option<Box<dyn ResizeBackend>>;
}
