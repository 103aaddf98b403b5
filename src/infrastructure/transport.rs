use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};

use crate::application::TransportEvent;
use crate::error::{Result, SignalError};
use crate::infrastructure::envelope::Envelope;

/// Trait for a signaling connection (allows mocking in tests).
///
/// Delivery is in-order and at-most-once per connection; nothing is
/// persisted across reconnects. The session layer never initiates a
/// reconnect itself.
pub trait SignalingTransport {
    fn send(&mut self, envelope: &Envelope) -> Result<()>;

    /// Drain pending connection events in arrival order
    fn poll_events(&mut self) -> Vec<TransportEvent>;
}

/// In-memory signaling transport over futures channels.
///
/// Carries the same JSON frames a websocket would, so envelope encoding
/// is exercised end to end. Used by the test suite and by embedders
/// that bridge their own socket.
pub struct ChannelTransport {
    outgoing: UnboundedSender<String>,
    incoming: UnboundedReceiver<String>,
    opened: bool,
    closed: bool,
}

/// Far end of a [`ChannelTransport`] pair, standing in for the relay
pub struct ChannelRemote {
    sender: Option<UnboundedSender<String>>,
    receiver: UnboundedReceiver<String>,
}

impl ChannelTransport {
    /// Create a connected transport/remote pair
    pub fn pair() -> (ChannelTransport, ChannelRemote) {
        let (to_remote, from_client) = unbounded();
        let (to_client, from_remote) = unbounded();

        (
            ChannelTransport {
                outgoing: to_remote,
                incoming: from_remote,
                opened: false,
                closed: false,
            },
            ChannelRemote {
                sender: Some(to_client),
                receiver: from_client,
            },
        )
    }
}

impl SignalingTransport for ChannelTransport {
    fn send(&mut self, envelope: &Envelope) -> Result<()> {
        let frame = serde_json::to_string(envelope)?;
        self.outgoing
            .unbounded_send(frame)
            .map_err(|_| SignalError::ChannelClosed)
    }

    fn poll_events(&mut self) -> Vec<TransportEvent> {
        let mut events = Vec::new();

        // An in-memory pair is connected as soon as it exists
        if !self.opened {
            self.opened = true;
            events.push(TransportEvent::Opened);
        }
        if self.closed {
            return events;
        }

        loop {
            match self.incoming.try_next() {
                Ok(Some(frame)) => match serde_json::from_str::<Envelope>(&frame) {
                    Ok(envelope) => events.push(TransportEvent::Message(envelope)),
                    Err(error) => {
                        // Malformed frames are discarded, never redelivered
                        tracing::warn!(%error, "dropping malformed envelope");
                    }
                },
                Ok(None) => {
                    self.closed = true;
                    events.push(TransportEvent::Closed);
                    break;
                }
                Err(_) => break, // nothing pending
            }
        }

        events
    }
}

impl ChannelRemote {
    pub fn send(&mut self, envelope: &Envelope) -> Result<()> {
        let frame = serde_json::to_string(envelope)?;
        self.send_raw(frame)
    }

    /// Inject a raw frame, bypassing envelope encoding
    pub fn send_raw(&mut self, frame: impl Into<String>) -> Result<()> {
        match &self.sender {
            Some(sender) => sender
                .unbounded_send(frame.into())
                .map_err(|_| SignalError::ChannelClosed),
            None => Err(SignalError::ChannelClosed),
        }
    }

    /// Tear the connection down from the relay side
    pub fn close(&mut self) {
        self.sender = None;
    }

    /// Decode everything the client has sent since the last drain
    pub fn drain(&mut self) -> Vec<Envelope> {
        let mut envelopes = Vec::new();
        while let Ok(Some(frame)) = self.receiver.try_next() {
            match serde_json::from_str(&frame) {
                Ok(envelope) => envelopes.push(envelope),
                Err(error) => tracing::warn!(%error, "client sent malformed frame"),
            }
        }
        envelopes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::envelope::EnvelopeKind;

    #[test]
    fn first_poll_reports_opened() {
        let (mut transport, _remote) = ChannelTransport::pair();

        let events = transport.poll_events();
        assert!(matches!(events.as_slice(), [TransportEvent::Opened]));

        // Only once
        assert!(transport.poll_events().is_empty());
    }

    #[test]
    fn frames_round_trip_as_envelopes() {
        let (mut transport, mut remote) = ChannelTransport::pair();
        transport.poll_events();

        remote
            .send(&Envelope::webrtc(2, serde_json::json!({"type": "offer"})))
            .unwrap();

        let events = transport.poll_events();
        match events.as_slice() {
            [TransportEvent::Message(envelope)] => {
                assert_eq!(envelope.kind, EnvelopeKind::Webrtc);
                assert_eq!(envelope.id, 2);
            }
            other => panic!("unexpected events: {other:?}"),
        }

        transport.send(&Envelope::be_teacher()).unwrap();
        let sent = remote.drain();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, EnvelopeKind::BeTeacher);
    }

    #[test]
    fn malformed_frames_are_dropped() {
        let (mut transport, mut remote) = ChannelTransport::pair();
        transport.poll_events();

        remote.send_raw("not json").unwrap();
        remote.send(&Envelope::be_teacher()).unwrap();

        let events = transport.poll_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], TransportEvent::Message(_)));
    }

    #[test]
    fn remote_close_surfaces_once() {
        let (mut transport, mut remote) = ChannelTransport::pair();
        transport.poll_events();

        remote.close();
        let events = transport.poll_events();
        assert!(matches!(events.as_slice(), [TransportEvent::Closed]));
        assert!(transport.poll_events().is_empty());

        drop(remote);
        assert!(matches!(
            transport.send(&Envelope::be_teacher()),
            Err(SignalError::ChannelClosed)
        ));
    }
}
