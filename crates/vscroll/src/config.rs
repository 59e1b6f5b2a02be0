//! Scroller configuration.
//!
//! Fixed at construction: the scroller derives its offset index and
//! hysteresis windows from these values once and never re-reads them.

use crate::error::{ConfigError, ConfigResult};

/// Configuration for a [`VirtualScroller`](crate::controller::VirtualScroller).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScrollerConfig {
    /// Estimated height of items that have not been measured yet.
    pub min_item_height: f64,
    /// Pixels rendered beyond each viewport edge.
    pub buffer: f64,
    /// Pixels beyond each viewport edge after which rendered items unload.
    pub unload_buffer: f64,
    /// Tolerance for `is_at_top` / `is_at_bottom` (sub-pixel rounding).
    pub edge_epsilon: f64,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self {
            min_item_height: 24.0,
            buffer: 500.0,
            unload_buffer: 1000.0,
            edge_epsilon: 1.0,
        }
    }
}

impl ScrollerConfig {
    /// Set the estimated item height.
    #[must_use]
    pub fn with_min_item_height(mut self, height: f64) -> Self {
        self.min_item_height = height;
        self
    }

    /// Set the load buffer.
    #[must_use]
    pub fn with_buffer(mut self, buffer: f64) -> Self {
        self.buffer = buffer;
        self
    }

    /// Set the unload buffer.
    #[must_use]
    pub fn with_unload_buffer(mut self, unload_buffer: f64) -> Self {
        self.unload_buffer = unload_buffer;
        self
    }

    /// Set the top/bottom detection tolerance.
    #[must_use]
    pub fn with_edge_epsilon(mut self, epsilon: f64) -> Self {
        self.edge_epsilon = epsilon;
        self
    }

    /// Check every field.
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("min_item_height", self.min_item_height),
            ("buffer", self.buffer),
            ("unload_buffer", self.unload_buffer),
            ("edge_epsilon", self.edge_epsilon),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
        }
        if self.min_item_height <= 0.0 {
            return Err(ConfigError::NonPositiveItemHeight {
                value: self.min_item_height,
            });
        }
        for (field, value) in [
            ("buffer", self.buffer),
            ("unload_buffer", self.unload_buffer),
            ("edge_epsilon", self.edge_epsilon),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        if self.unload_buffer < self.buffer {
            return Err(ConfigError::InvertedHysteresis {
                buffer: self.buffer,
                unload_buffer: self.unload_buffer,
            });
        }
        Ok(())
    }
}
