use crate::application::events::TransportEvent;
use crate::domain::Role;
use crate::error::Result;
use crate::infrastructure::envelope::{ChatMessage, Envelope, EnvelopeKind};
use crate::infrastructure::transport::SignalingTransport;

/// Chat side-channel.
///
/// Runs over its own signaling connection with the same envelope shape
/// as media signaling but disjoint kinds. Pure text relay: no peer
/// slots, no role transitions, just attribution.
pub struct ChatChannel<T: SignalingTransport> {
    transport: T,
    /// Identity announced when the connection opens
    role: Role,
}

impl<T: SignalingTransport> ChatChannel<T> {
    pub fn new(transport: T, role: Role) -> Self {
        Self { transport, role }
    }

    /// Send a chat line. Empty text is a silent no-op.
    pub fn send(&mut self, username: &str, message: &str) -> Result<()> {
        if message.is_empty() {
            return Ok(());
        }
        self.transport
            .send(&Envelope::chat_message(username, message))
    }

    /// Drain inbound chat messages, dropping anything malformed
    pub fn poll(&mut self) -> Vec<ChatMessage> {
        let mut messages = Vec::new();

        for event in self.transport.poll_events() {
            match event {
                TransportEvent::Opened => {
                    let announce =
                        Envelope::identity(EnvelopeKind::ChatSignal, self.role.wire_name());
                    if let Err(error) = self.transport.send(&announce) {
                        tracing::warn!(%error, "failed to announce chat identity");
                    }
                }
                TransportEvent::Message(envelope) if envelope.kind == EnvelopeKind::ChatMessage => {
                    match envelope.data.map(serde_json::from_value::<ChatMessage>) {
                        Some(Ok(message)) => messages.push(message),
                        _ => tracing::warn!("dropping malformed chat payload"),
                    }
                }
                TransportEvent::Message(envelope) => {
                    tracing::debug!(kind = %envelope.kind, "ignoring envelope on chat channel");
                }
                TransportEvent::Closed => tracing::info!("chat connection closed"),
                TransportEvent::Error(reason) => {
                    tracing::warn!(%reason, "chat transport error");
                }
            }
        }

        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::transport::ChannelTransport;

    #[test]
    fn announces_identity_on_open() {
        let (transport, mut remote) = ChannelTransport::pair();
        let mut chat = ChatChannel::new(transport, Role::Viewer);

        chat.poll();
        let sent = remote.drain();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, EnvelopeKind::ChatSignal);
        assert_eq!(sent[0].data.as_ref().unwrap()["who"], "student");
    }

    #[test]
    fn sends_and_receives_messages() {
        let (transport, mut remote) = ChannelTransport::pair();
        let mut chat = ChatChannel::new(transport, Role::Presenter);
        chat.poll();

        chat.send("lion", "hello class").unwrap();
        let sent = remote.drain();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, EnvelopeKind::ChatMessage);

        remote
            .send(&Envelope::chat_message("student-1", "hi"))
            .unwrap();
        let received = chat.poll();
        assert_eq!(
            received,
            vec![ChatMessage {
                username: "student-1".into(),
                message: "hi".into(),
            }]
        );
    }

    #[test]
    fn empty_message_is_a_no_op() {
        let (transport, mut remote) = ChannelTransport::pair();
        let mut chat = ChatChannel::new(transport, Role::Viewer);
        chat.poll();
        remote.drain();

        chat.send("lion", "").unwrap();
        assert!(remote.drain().is_empty());
    }

    #[test]
    fn malformed_and_foreign_envelopes_are_dropped() {
        let (transport, mut remote) = ChannelTransport::pair();
        let mut chat = ChatChannel::new(transport, Role::Viewer);
        chat.poll();

        // Missing Data and a media-signaling kind on the chat connection
        remote
            .send(&Envelope {
                kind: EnvelopeKind::ChatMessage,
                id: 0,
                data: None,
            })
            .unwrap();
        remote.send(&Envelope::be_teacher()).unwrap();

        assert!(chat.poll().is_empty());
    }
}
