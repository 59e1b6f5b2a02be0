#![forbid(unsafe_code)]

//! Deterministic host simulation for the `vscroll` engine.
//!
//! - [`sim`]: a scroll container and resize observer with browser-like
//!   quirks (collapse to 0 when hidden, clamped offsets).
//! - [`host`]: [`SimHost`], which mounts wrapper elements for the render
//!   range and feeds resize reports from a "true layout" back to the engine.
//! - [`capture`]: a `tracing` layer for asserting on spans and warnings.
//! - [`rng`]: seeded workload generation.
//!
//! # Environment
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `VSCROLL_LOG` | `EnvFilter` directives for [`init_test_logging`] (e.g. `vscroll=debug`) |
//! | `VSCROLL_SEED` | Seed override for randomized scenarios ([`rng::seed_from_env`]) |
//!
//! # Quick Start
//!
//! ```ignore
//! use vscroll_harness::{SimHost, uniform_rows};
//!
//! let mut host = SimHost::with_rows(uniform_rows(1_000, 24.0), 600.0);
//! host.user_scroll_to(4_000.0);
//! host.check_invariants().unwrap();
//! ```

pub mod capture;
pub mod host;
pub mod rng;
pub mod sim;

use std::sync::Once;

use tracing_subscriber::EnvFilter;

pub use capture::{CaptureHandle, with_captured_tracing};
pub use host::{Row, SimHost, uniform_rows};
pub use sim::{SimObserver, SimViewport};

/// Log filter environment variable.
pub const LOG_ENV: &str = "VSCROLL_LOG";

/// Install a global fmt subscriber filtered by `VSCROLL_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
/// Logging is off when the variable is unset.
pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
