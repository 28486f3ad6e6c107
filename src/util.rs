use std::sync::Arc;

use log::{error, warn};
use tokio::runtime::{Builder, Runtime};

/// Build the Tokio runtime shared by the window and the headless mode.
///
/// Falls back to a single-threaded runtime and terminates when neither can start.
pub fn build_runtime() -> Arc<Runtime> {
    match Runtime::new() {
        Ok(rt) => Arc::new(rt),
        Err(err) => {
            warn!("runtime: failed to create multithreaded runtime ({err}); trying single-threaded runtime");
            match Builder::new_current_thread().enable_all().build() {
                Ok(rt) => Arc::new(rt),
                Err(fallback_err) => {
                    error!("runtime: failed to create any Tokio runtime ({fallback_err}); terminating launcher");
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Render a human-friendly transfer speed string.
#[must_use]
pub fn format_speed(bytes_per_sec: f64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;

    if bytes_per_sec < KIB {
        format!("{bytes_per_sec:.0} B/s")
    } else if bytes_per_sec < MIB {
        format!("{:.1} KB/s", bytes_per_sec / KIB)
    } else {
        format!("{:.1} MB/s", bytes_per_sec / MIB)
    }
}

/// Compute progress as a whole percentage, clamped to 0..=100.
#[must_use]
pub fn progress_percent(current: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (current as f64 / total as f64) * 100.0;
    pct.round().clamp(0.0, 100.0) as u8
}

/// Format a remaining-time estimate as `Hh Mm Ss`.
#[must_use]
pub fn format_estimated(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours}h {minutes}m {secs}s")
}
