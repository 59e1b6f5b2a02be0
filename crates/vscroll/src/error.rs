//! Error types.
//!
//! Runtime operations on a scroller never fail; only construction validates
//! its configuration.

use std::fmt;

/// Invalid [`ScrollerConfig`](crate::config::ScrollerConfig).
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A field is NaN or infinite.
    NonFinite {
        /// Field name.
        field: &'static str,
    },
    /// A field that must be `>= 0` is negative.
    Negative {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
    /// `min_item_height` must be strictly positive.
    NonPositiveItemHeight {
        /// Offending value.
        value: f64,
    },
    /// `unload_buffer` is smaller than `buffer`, which would unload items
    /// that are still inside the load window.
    InvertedHysteresis {
        /// Configured load buffer.
        buffer: f64,
        /// Configured unload buffer.
        unload_buffer: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonFinite { field } => write!(f, "{field} must be finite"),
            ConfigError::Negative { field, value } => {
                write!(f, "{field} must not be negative (got {value})")
            }
            ConfigError::NonPositiveItemHeight { value } => {
                write!(f, "min_item_height must be positive (got {value})")
            }
            ConfigError::InvertedHysteresis {
                buffer,
                unload_buffer,
            } => write!(
                f,
                "unload_buffer ({unload_buffer}) must be >= buffer ({buffer})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Result type for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;
