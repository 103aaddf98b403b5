use crate::error::Result;
use crate::infrastructure::media::MediaStream;

/// Opaque peer-connection primitive (allows mocking in tests).
///
/// A link accepts inbound negotiation data, produces outbound
/// negotiation data through a pollable queue instead of per-event
/// callbacks, and eventually yields the remote media stream. NAT
/// traversal and codec concerns live entirely behind this trait.
pub trait PeerLink {
    /// Deliver inbound negotiation data (offer/answer/candidate)
    fn signal(&mut self, payload: serde_json::Value) -> Result<()>;

    /// Whether this side originates the negotiation offer
    fn set_initiator(&mut self, initiator: bool);

    /// Attach the local capture stream; an initiator link reacts by
    /// producing an offer
    fn add_stream(&mut self, stream: MediaStream) -> Result<()>;

    /// Drain negotiation payloads produced since the last poll
    fn poll_signals(&mut self) -> Vec<serde_json::Value>;

    /// Remote media stream, once negotiation completes
    fn poll_remote_stream(&mut self) -> Option<MediaStream>;

    /// Release the underlying connection
    fn close(&mut self);
}

/// Factory for peer links, one per registry slot
pub trait PeerConnector {
    type Link: PeerLink;

    fn connect(&mut self) -> Self::Link;
}
