pub mod envelope;
pub mod media;
pub mod peer;
pub mod transport;

pub use envelope::{ChatMessage, Envelope, EnvelopeKind, Identity, UNADDRESSED};
pub use media::{MediaSource, MediaStream};
pub use peer::{PeerConnector, PeerLink};
pub use transport::{ChannelRemote, ChannelTransport, SignalingTransport};
