use log::debug;

use crate::engine::launch::WindowSignal;

/// Process-level messaging towards the window hosting the launcher.
pub trait HostBridge: Send + Sync + 'static {
    fn send(&self, signal: WindowSignal);
}

/// Host used when no window exists (headless runs).
#[derive(Clone, Copy, Default)]
pub struct NoopHost;

impl HostBridge for NoopHost {
    fn send(&self, signal: WindowSignal) {
        debug!("host: ignoring {signal:?}");
    }
}
