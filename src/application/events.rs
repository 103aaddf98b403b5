use crate::infrastructure::envelope::Envelope;

/// Events surfaced by a signaling connection
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// Connection established; the client announces its identity
    Opened,

    /// A decoded envelope from the relay
    Message(Envelope),

    /// Connection torn down; the session degrades to idle
    Closed,

    /// Transport-level failure (the connection is unusable)
    Error(String),
}
