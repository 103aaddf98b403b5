use crate::domain::Role;

/// Launch configuration for a broadcast session.
///
/// Mirrors the page launch parameters of the original client: the
/// `who` query parameter selects the initial role, `username` is the
/// chat attribution.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Relay URL for the media-signaling connection
    pub signaling_url: String,

    /// Relay URL for the chat connection
    pub chat_url: String,

    /// Initial role (`who=student` selects viewer)
    pub role: Role,

    /// Display name for chat attribution
    pub username: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            signaling_url: "ws://127.0.0.1:2346/chatroomServer".to_string(),
            chat_url: "ws://127.0.0.1:2346/chatroomServer".to_string(),
            role: Role::Presenter,
            username: "anonymous".to_string(),
        }
    }
}

impl SessionConfig {
    /// Parse a launch query string (`who=student&username=lion`).
    /// Unknown parameters are ignored; missing ones keep defaults.
    pub fn from_query(query: &str) -> Self {
        let mut config = Self::default();

        for pair in query.trim_start_matches('?').split('&') {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some("who"), Some(value)) => {
                    config.role = Role::from_launch_param(Some(value));
                }
                (Some("username"), Some(value)) if !value.is_empty() => {
                    config.username = value.to_string();
                }
                _ => {}
            }
        }

        config
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }
}
