//! Signaling coordination for one-to-many classroom live broadcast.
//!
//! One presenter (teacher) streams local media to many viewers (students)
//! over peer-to-peer connections; a relay forwards JSON envelopes for
//! connection setup. This crate is the client-side state machine: it
//! tracks the local role, keeps the peer-slot roster in step with the
//! relay's roster counts, and routes offer/answer/candidate payloads to
//! the right peer handle.
//!
//! The transport, the peer-connection primitive and the media-capture
//! pipeline are external collaborators behind traits
//! ([`SignalingTransport`], [`PeerLink`]/[`PeerConnector`],
//! [`MediaSource`]), so the coordination logic runs the same against a
//! browser stack, a native stack or the in-memory test doubles.

// Domain layer (core)
pub mod domain;

// Application layer (use cases)
pub mod application;

// Infrastructure layer (adapters)
pub mod infrastructure;

pub mod config;
pub mod error;

// Re-exports for convenience
pub use application::{
    BroadcastController, ChatChannel, SignalingSession, TransportEvent, FIRST_VIEWER_SLOT,
};
pub use config::SessionConfig;
pub use domain::{PeerRegistry, PeerSlot, Role, RoleState};
pub use error::{Result, SignalError};
pub use infrastructure::{
    ChannelRemote, ChannelTransport, ChatMessage, Envelope, EnvelopeKind, Identity, MediaSource,
    MediaStream, PeerConnector, PeerLink, SignalingTransport, UNADDRESSED,
};
