mod registry;
mod role;

pub use registry::{PeerRegistry, PeerSlot};
pub use role::{Role, RoleState};
