#![forbid(unsafe_code)]

//! Headless virtual-list engine.
//!
//! Renders only a window of a large, variable-height list while keeping the
//! scroll position visually stable as item heights become known.
//!
//! - [`fenwick`] / [`height_cache`]: per-key heights and their prefix sums.
//! - [`range`]: render/visible windows with load/unload hysteresis.
//! - [`anchor`]: scroll anchors that survive reflow and remounts.
//! - [`observer`]: one shared resize observer multiplexed across item wrappers.
//! - [`controller`]: [`VirtualScroller`], the imperative surface for hosts.
//!
//! # Example
//!
//! ```ignore
//! use vscroll::{ScrollerConfig, VirtualScroller};
//!
//! let mut scroller = VirtualScroller::with_items(
//!     ScrollerConfig::default(),
//!     |msg: &Message| msg.id,
//!     &messages,
//! )?;
//! scroller.attach(Box::new(container));
//! for row in scroller.virtual_items() {
//!     // render row.index at row.start
//! }
//! ```

pub mod anchor;
pub mod config;
pub mod container;
pub mod controller;
pub mod error;
pub mod event;
pub mod fenwick;
pub mod height_cache;
pub mod observer;
pub mod range;

pub use anchor::ScrollAnchor;
pub use config::ScrollerConfig;
pub use container::{ScrollAlign, ScrollBehavior, ScrollContainer, ScrollState, ScrollToOptions};
pub use controller::{VirtualItem, VirtualScroller};
pub use error::ConfigError;
pub use event::ScrollerEvent;
pub use observer::{ElementId, ResizeBackend, ResizeEntry, ResizeRegistrar};
pub use range::{ItemRange, RangeOutput};
