//! Cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Progress monitor polled by long-running scans.
pub trait ProgressMonitor: Send + Sync {
    fn is_canceled(&self) -> bool;
}

/// Monitor that is never canceled.
#[derive(Debug, Default, Clone, Copy)]
pub struct VoidProgressMonitor;

impl ProgressMonitor for VoidProgressMonitor {
    fn is_canceled(&self) -> bool {
        false
    }
}

/// Shareable cancellation flag.
///
/// Clones observe the same flag, so a UI thread can cancel a scan running on
/// a background worker.
#[derive(Debug, Default, Clone)]
pub struct CancelFlag {
    canceled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }
}

impl ProgressMonitor for CancelFlag {
    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}
