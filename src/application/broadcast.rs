use crate::domain::PeerRegistry;
use crate::infrastructure::media::MediaStream;
use crate::infrastructure::peer::PeerLink;

/// First registry index that addresses a remote viewer. Slot 0 is the
/// client's own presenter link, seeded at connection open, and never
/// receives the local stream.
pub const FIRST_VIEWER_SLOT: usize = 1;

/// Coordinates attaching the live local stream to viewer slots.
///
/// Thin by design: the only state is the stream handle itself; whether
/// a broadcast is active lives in [`crate::RoleState`].
#[derive(Debug, Default)]
pub struct BroadcastController {
    stream: Option<MediaStream>,
}

impl BroadcastController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stream(&self) -> Option<&MediaStream> {
        self.stream.as_ref()
    }

    /// Local capture is live: every existing viewer slot becomes an
    /// offer originator and receives the stream.
    pub fn on_local_stream_ready<L: PeerLink>(
        &mut self,
        stream: MediaStream,
        registry: &mut PeerRegistry<L>,
    ) {
        for slot in registry.iter_from_mut(FIRST_VIEWER_SLOT) {
            slot.mark_initiator();
            if let Err(error) = slot.attach_stream(stream.clone()) {
                tracing::warn!(%error, "failed to attach stream to existing slot");
            }
        }
        self.stream = Some(stream);
    }

    /// Slots appended while live: each one receives the current stream
    /// and originates its own offer.
    pub fn on_new_slots_added<L: PeerLink>(
        &mut self,
        indices: &[usize],
        registry: &mut PeerRegistry<L>,
    ) {
        let Some(stream) = self.stream.clone() else {
            return;
        };

        for &index in indices {
            match registry.get_mut(index as i64) {
                Ok(slot) => {
                    slot.mark_initiator();
                    if let Err(error) = slot.attach_stream(stream.clone()) {
                        tracing::warn!(index, %error, "failed to attach stream to new slot");
                    }
                }
                Err(error) => tracing::warn!(index, %error, "new slot vanished before attach"),
            }
        }
    }

    /// Drop the stream handle (broadcast stop or demotion)
    pub fn release(&mut self) {
        self.stream = None;
    }
}
