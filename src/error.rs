use crate::domain::Role;
use crate::infrastructure::envelope::EnvelopeKind;

/// Signaling coordination errors.
///
/// None of these are fatal: routing errors are logged and the offending
/// envelope dropped, never re-thrown to the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("no peer slot at index {0}")]
    UnknownSlot(i64),

    #[error("{kind} envelope not valid for role {role}")]
    RoleMismatch { kind: EnvelopeKind, role: Role },

    #[error("local media capture unavailable: {0}")]
    MediaAcquisition(String),

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("transport channel closed")]
    ChannelClosed,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SignalError>;
