//! Page-scoped re-entrancy guard for the extractor.
//!
//! Every injection into the same page shares one [`ExtractionMarker`]. An
//! invocation claims it and holds the returned [`ExtractionToken`] until its
//! message has been delivered (or failed); a second injection arriving in the
//! meantime finds the marker taken and does nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ExtractionMarker {
    running: Arc<AtomicBool>,
}

impl ExtractionMarker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the marker for one extraction. `None` if another one holds it.
    pub fn try_claim(&self) -> Option<ExtractionToken> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ExtractionToken {
                running: Arc::clone(&self.running),
            })
    }

    pub fn is_held(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Held by the single running extraction; releases the marker when dropped.
#[derive(Debug)]
pub struct ExtractionToken {
    running: Arc<AtomicBool>,
}

impl Drop for ExtractionToken {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_refused_until_release() {
        let marker = ExtractionMarker::new();
        let token = marker.try_claim().expect("first claim");
        assert!(marker.is_held());
        assert!(marker.clone().try_claim().is_none());
        drop(token);
        assert!(!marker.is_held());
        assert!(marker.try_claim().is_some());
    }

    #[test]
    fn separate_pages_do_not_interfere() {
        let a = ExtractionMarker::new();
        let b = ExtractionMarker::new();
        let _ta = a.try_claim().unwrap();
        assert!(b.try_claim().is_some());
    }
}
