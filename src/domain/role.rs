use serde::{Deserialize, Serialize};
use std::fmt;

use crate::infrastructure::envelope::UNADDRESSED;

/// Role of the local participant within the broadcast session
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Broadcasts local media to all viewers
    Presenter,
    /// Receives media from the presenter only
    #[default]
    Viewer,
}

impl Role {
    /// Role selected by the `who` launch parameter (`student` means
    /// viewer, anything else is presenter-eligible)
    pub fn from_launch_param(who: Option<&str>) -> Self {
        match who {
            Some("student") => Role::Viewer,
            _ => Role::Presenter,
        }
    }

    /// Name used in identity announcements on the wire
    pub fn wire_name(&self) -> &'static str {
        match self {
            Role::Presenter => "teacher",
            Role::Viewer => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Presenter => write!(f, "presenter"),
            Role::Viewer => write!(f, "viewer"),
        }
    }
}

/// Mutable role state for the local participant.
///
/// The relay is the source of truth: a local promotion is optimistic and
/// a later `beStudent` envelope can revert it (last writer wins).
#[derive(Debug, Clone)]
pub struct RoleState {
    role: Role,
    /// True while the local media stream is being offered
    broadcasting: bool,
    /// Which envelope `Id` to stamp on outgoing answers; only meaningful
    /// for viewers, set by the first inbound negotiation envelope
    presenter_slot: Option<i64>,
}

impl RoleState {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            broadcasting: false,
            presenter_slot: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_broadcasting(&self) -> bool {
        self.broadcasting
    }

    pub fn presenter_slot(&self) -> Option<i64> {
        self.presenter_slot
    }

    /// Wire id for outbound answers (−1 until the presenter addressed us)
    pub fn presenter_slot_wire(&self) -> i64 {
        self.presenter_slot.unwrap_or(UNADDRESSED)
    }

    /// Optimistically flip viewer to presenter. Returns true when the
    /// transition happened, so the caller emits the relay-bound
    /// `beTeacher` request exactly once.
    pub fn request_become_presenter(&mut self) -> bool {
        if self.role == Role::Viewer {
            self.role = Role::Presenter;
            true
        } else {
            false
        }
    }

    /// Forced demotion by the relay. Idempotent: applying it while
    /// already a viewer changes nothing further.
    pub fn apply_demotion(&mut self) {
        self.role = Role::Viewer;
        self.broadcasting = false;
        self.presenter_slot = None;
    }

    /// Record which `Id` addresses the presenter; viewers only, and
    /// repeated updates are harmless.
    pub fn set_presenter_slot(&mut self, id: i64) {
        if self.role == Role::Viewer {
            self.presenter_slot = Some(id);
        }
    }

    pub fn set_broadcasting(&mut self, broadcasting: bool) {
        self.broadcasting = broadcasting;
    }

    /// Undo an optimistic promotion after a failed broadcast start
    pub fn revert(&mut self, role: Role) {
        self.role = role;
        self.broadcasting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_param_mapping() {
        assert_eq!(Role::from_launch_param(Some("student")), Role::Viewer);
        assert_eq!(Role::from_launch_param(Some("teacher")), Role::Presenter);
        assert_eq!(Role::from_launch_param(None), Role::Presenter);
    }

    #[test]
    fn promotion_happens_once() {
        let mut state = RoleState::new(Role::Viewer);
        assert!(state.request_become_presenter());
        assert!(!state.request_become_presenter());
        assert_eq!(state.role(), Role::Presenter);
    }

    #[test]
    fn demotion_is_idempotent() {
        let mut state = RoleState::new(Role::Presenter);
        state.set_broadcasting(true);

        state.apply_demotion();
        let first = state.clone();
        state.apply_demotion();

        assert_eq!(state.role(), first.role());
        assert_eq!(state.is_broadcasting(), first.is_broadcasting());
        assert_eq!(state.presenter_slot(), first.presenter_slot());
        assert_eq!(state.role(), Role::Viewer);
        assert!(!state.is_broadcasting());
    }

    #[test]
    fn presenter_slot_only_for_viewers() {
        let mut state = RoleState::new(Role::Presenter);
        state.set_presenter_slot(3);
        assert_eq!(state.presenter_slot(), None);
        assert_eq!(state.presenter_slot_wire(), UNADDRESSED);

        let mut state = RoleState::new(Role::Viewer);
        state.set_presenter_slot(5);
        assert_eq!(state.presenter_slot(), Some(5));
        assert_eq!(state.presenter_slot_wire(), 5);
    }
}
