use crate::error::Result;

/// Opaque handle to a live capture stream (local or remote).
///
/// The actual media pipeline lives outside this crate; the coordination
/// logic only passes handles around and releases them on stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaStream {
    id: String,
}

impl MediaStream {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Local media capture (camera/microphone acquisition, allows mocking
/// in tests).
pub trait MediaSource {
    /// Acquire the local capture stream. Denied or unavailable capture
    /// surfaces as [`crate::SignalError::MediaAcquisition`].
    fn acquire(&mut self) -> Result<MediaStream>;

    /// Stop all tracks. Must be synchronous and idempotent: the stop
    /// path always releases, even when a later start fails.
    fn release(&mut self);
}
