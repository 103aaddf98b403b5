use crate::error::{Result, SignalError};
use crate::infrastructure::media::MediaStream;
use crate::infrastructure::peer::PeerLink;

/// One remote peer connection known to this client.
///
/// The slot owns its link exclusively: created on registration, closed
/// on removal.
#[derive(Debug)]
pub struct PeerSlot<L> {
    link: L,
    /// Whether this slot is expected to originate the negotiation offer
    initiator: bool,
}

impl<L: PeerLink> PeerSlot<L> {
    fn new(link: L) -> Self {
        Self {
            link,
            initiator: false,
        }
    }

    pub fn is_initiator(&self) -> bool {
        self.initiator
    }

    /// Mark this slot as the offer originator and tell the handle
    pub fn mark_initiator(&mut self) {
        self.initiator = true;
        self.link.set_initiator(true);
    }

    /// Deliver inbound negotiation data to the handle
    pub fn deliver_signal(&mut self, payload: serde_json::Value) -> Result<()> {
        self.link.signal(payload)
    }

    /// Attach the local capture stream to the handle
    pub fn attach_stream(&mut self, stream: MediaStream) -> Result<()> {
        self.link.add_stream(stream)
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }
}

/// Ordered collection of peer slots, indexed by stable position.
///
/// Length mirrors the relay's authoritative count of remote
/// participants. Growth is append-only and removal is always from the
/// tail, matching the relay's FIFO join/leave accounting.
#[derive(Debug)]
pub struct PeerRegistry<L> {
    slots: Vec<PeerSlot<L>>,
}

impl<L> Default for PeerRegistry<L> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<L: PeerLink> PeerRegistry<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new slot, returning its index
    pub fn append(&mut self, link: L) -> usize {
        self.slots.push(PeerSlot::new(link));
        self.slots.len() - 1
    }

    /// Remove the `count` most-recently-appended slots, closing their
    /// links. Floors at zero; the relay never asks for more removals
    /// than outstanding slots, so this is not re-validated beyond that.
    pub fn truncate(&mut self, count: usize) {
        let remove = count.min(self.slots.len());
        for _ in 0..remove {
            if let Some(mut slot) = self.slots.pop() {
                slot.link.close();
            }
        }
    }

    /// Remove every slot, closing all links
    pub fn clear(&mut self) {
        self.truncate(self.slots.len());
    }

    /// Look up a slot by wire id; negative or out-of-range ids mean the
    /// roster has desynced from the relay
    pub fn get_mut(&mut self, index: i64) -> Result<&mut PeerSlot<L>> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.slots.get_mut(i))
            .ok_or(SignalError::UnknownSlot(index))
    }

    /// Iterate slots from `start` to the end
    pub fn iter_from_mut(&mut self, start: usize) -> std::slice::IterMut<'_, PeerSlot<L>> {
        let start = start.min(self.slots.len());
        self.slots[start..].iter_mut()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Minimal link that only records close()
    struct TestLink {
        closed: Rc<Cell<bool>>,
    }

    impl PeerLink for TestLink {
        fn signal(&mut self, _payload: serde_json::Value) -> Result<()> {
            Ok(())
        }
        fn set_initiator(&mut self, _initiator: bool) {}
        fn add_stream(&mut self, _stream: MediaStream) -> Result<()> {
            Ok(())
        }
        fn poll_signals(&mut self) -> Vec<serde_json::Value> {
            Vec::new()
        }
        fn poll_remote_stream(&mut self) -> Option<MediaStream> {
            None
        }
        fn close(&mut self) {
            self.closed.set(true);
        }
    }

    fn link() -> (TestLink, Rc<Cell<bool>>) {
        let closed = Rc::new(Cell::new(false));
        (
            TestLink {
                closed: closed.clone(),
            },
            closed,
        )
    }

    #[test]
    fn length_tracks_roster_counts() {
        let mut registry = PeerRegistry::new();
        // Running sum over arbitrary join/leave counts, floored at zero
        for _ in 0..3 {
            registry.append(link().0);
        }
        assert_eq!(registry.len(), 3);

        registry.truncate(2);
        assert_eq!(registry.len(), 1);

        // Over-delete floors at zero instead of underflowing
        registry.truncate(5);
        assert_eq!(registry.len(), 0);

        registry.append(link().0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn truncate_closes_removed_links() {
        let mut registry = PeerRegistry::new();
        let (kept_link, kept) = link();
        let (dropped_link, dropped) = link();
        registry.append(kept_link);
        registry.append(dropped_link);

        registry.truncate(1);
        assert!(dropped.get());
        assert!(!kept.get());
    }

    #[test]
    fn clear_closes_everything() {
        let mut registry = PeerRegistry::new();
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let (l, c) = link();
                registry.append(l);
                c
            })
            .collect();

        registry.clear();
        assert!(registry.is_empty());
        assert!(handles.iter().all(|c| c.get()));
    }

    #[test]
    fn unknown_slot_on_out_of_range() {
        let mut registry = PeerRegistry::new();
        registry.append(link().0);

        assert!(registry.get_mut(0).is_ok());
        assert!(matches!(
            registry.get_mut(1),
            Err(SignalError::UnknownSlot(1))
        ));
        assert!(matches!(
            registry.get_mut(-1),
            Err(SignalError::UnknownSlot(-1))
        ));
    }

    #[test]
    fn initiator_flag_starts_false() {
        let mut registry = PeerRegistry::new();
        let index = registry.append(link().0);
        let slot = registry.get_mut(index as i64).unwrap();
        assert!(!slot.is_initiator());

        slot.mark_initiator();
        assert!(slot.is_initiator());
    }
}
