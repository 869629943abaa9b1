//! Terminal status output.
//!
//! Status lines go to stderr so that `mdqr render` output on stdout stays
//! pipeable.

mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use messages::{error, info, success, url, warning};

static COLORS_ENABLED: AtomicBool = AtomicBool::new(true);

/// Decide once whether status lines are colored.
///
/// `--no-color` wins; otherwise `NO_COLOR`, `FORCE_COLOR` and the terminal
/// decide (see [`crate::logger::should_use_colors`]).
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && crate::logger::should_use_colors();
    COLORS_ENABLED.store(enabled, Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS_ENABLED.load(Ordering::Relaxed)
}
