//! Classify injection failures into quiet (user already left) and visible.

use crate::host::HostError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectErrorKind {
    /// The page or extension went away under us; log only.
    Quiet,
    /// Show to the user.
    Visible,
}

const QUIET_MARKERS: &[&str] = &["cannot access contents", "context invalidated"];

pub fn classify_inject_error(err: &HostError) -> InjectErrorKind {
    let message = err.message.to_lowercase();
    if QUIET_MARKERS.iter().any(|m| message.contains(m)) {
        InjectErrorKind::Quiet
    } else {
        InjectErrorKind::Visible
    }
}
