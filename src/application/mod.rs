mod broadcast;
mod chat;
mod events;
mod session;

pub use broadcast::{BroadcastController, FIRST_VIEWER_SLOT};
pub use chat::ChatChannel;
pub use events::TransportEvent;
pub use session::SignalingSession;
