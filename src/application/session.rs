use crate::application::broadcast::BroadcastController;
use crate::application::events::TransportEvent;
use crate::config::SessionConfig;
use crate::domain::{PeerRegistry, Role, RoleState};
use crate::error::{Result, SignalError};
use crate::infrastructure::envelope::{Envelope, EnvelopeKind};
use crate::infrastructure::media::{MediaSource, MediaStream};
use crate::infrastructure::peer::{PeerConnector, PeerLink};
use crate::infrastructure::transport::SignalingTransport;

/// Client-side signaling state machine for one broadcast session.
///
/// Owns the role state, the peer-slot roster and the broadcast
/// coordinator, and routes relay envelopes between them. Generic over
/// the transport, the peer-connection factory and the media source so
/// the whole machine runs against test doubles.
///
/// All mutation happens on the caller's poll loop, in envelope arrival
/// order: no locking, no reordering, no buffering. Routing errors are
/// terminal at this layer — logged, envelope dropped — and the machine
/// degrades to a consistent idle state (viewer role, zero slots) on
/// transport failure rather than reconnecting itself.
pub struct SignalingSession<T, C, M>
where
    T: SignalingTransport,
    C: PeerConnector,
    M: MediaSource,
{
    transport: T,
    connector: C,
    media: M,
    role: RoleState,
    registry: PeerRegistry<C::Link>,
    broadcast: BroadcastController,
}

impl<T, C, M> SignalingSession<T, C, M>
where
    T: SignalingTransport,
    C: PeerConnector,
    M: MediaSource,
{
    pub fn new(transport: T, connector: C, media: M, initial_role: Role) -> Self {
        Self {
            transport,
            connector,
            media,
            role: RoleState::new(initial_role),
            registry: PeerRegistry::new(),
            broadcast: BroadcastController::new(),
        }
    }

    pub fn from_config(transport: T, connector: C, media: M, config: &SessionConfig) -> Self {
        Self::new(transport, connector, media, config.role)
    }

    pub fn role(&self) -> Role {
        self.role.role()
    }

    pub fn is_broadcasting(&self) -> bool {
        self.role.is_broadcasting()
    }

    pub fn presenter_slot(&self) -> Option<i64> {
        self.role.presenter_slot()
    }

    /// Registry length, mirroring the relay's roster count
    pub fn slot_count(&self) -> usize {
        self.registry.len()
    }

    /// Drain transport events, route envelopes in arrival order, then
    /// forward any negotiation payloads the peer handles produced.
    /// Returns the number of envelopes processed.
    pub fn poll(&mut self) -> usize {
        let mut processed = 0;

        for event in self.transport.poll_events() {
            match event {
                TransportEvent::Opened => self.on_open(),
                TransportEvent::Message(envelope) => {
                    processed += 1;
                    if let Err(error) = self.route(envelope) {
                        tracing::warn!(%error, "dropping envelope");
                    }
                }
                TransportEvent::Closed => {
                    tracing::info!("signaling connection closed");
                    self.degrade_to_idle();
                }
                TransportEvent::Error(reason) => {
                    tracing::warn!(%reason, "signaling transport error");
                    self.degrade_to_idle();
                }
            }
        }

        self.pump_outbound();
        processed
    }

    /// Local intent: begin offering the local stream to every viewer.
    ///
    /// A viewer first requests the presenter role (optimistically — the
    /// relay can demote us later) and emits `beTeacher` exactly once.
    /// Broadcasting only turns on after media acquisition succeeds; on
    /// failure every state change is reverted and the error returned.
    pub fn start_broadcast(&mut self) -> Result<()> {
        let prior_role = self.role.role();

        if self.role.request_become_presenter() {
            if let Err(error) = self.transport.send(&Envelope::be_teacher()) {
                self.role.revert(prior_role);
                return Err(error);
            }
        }

        match self.media.acquire() {
            Ok(stream) => {
                self.broadcast
                    .on_local_stream_ready(stream, &mut self.registry);
                self.role.set_broadcasting(true);
                tracing::info!(viewers = self.registry.len().saturating_sub(1), "broadcast started");
                // Offers from newly marked initiator slots go out now
                self.pump_outbound();
                Ok(())
            }
            Err(error) => {
                self.role.revert(prior_role);
                self.media.release();
                tracing::warn!(%error, "broadcast start aborted");
                Err(error)
            }
        }
    }

    /// Local intent: stop offering. Media tracks are released
    /// synchronously; viewers stay connected, one-way media just ends.
    pub fn stop_broadcast(&mut self) {
        self.media.release();
        self.broadcast.release();
        self.role.set_broadcasting(false);
        tracing::info!("broadcast stopped");
    }

    /// Remote streams produced by peer handles, for the display
    /// pipeline to consume.
    pub fn poll_remote_streams(&mut self) -> Vec<MediaStream> {
        self.registry
            .iter_from_mut(0)
            .filter_map(|slot| slot.link_mut().poll_remote_stream())
            .collect()
    }

    fn on_open(&mut self) {
        // Seed slot 0: the client's own presenter link
        let link = self.connector.connect();
        self.registry.append(link);

        let announce = Envelope::identity(EnvelopeKind::WebrtcSignal, self.role.role().wire_name());
        if let Err(error) = self.transport.send(&announce) {
            tracing::warn!(%error, "failed to announce identity");
        }
        tracing::info!(role = %self.role.role(), "signaling connection open");
    }

    fn route(&mut self, envelope: Envelope) -> Result<()> {
        match envelope.kind {
            EnvelopeKind::Webrtc => self.on_webrtc(envelope),
            EnvelopeKind::NewPeer => self.on_new_peer(envelope),
            EnvelopeKind::DeletePeer => self.on_delete_peer(envelope),
            EnvelopeKind::BeStudent => {
                self.apply_demotion();
                Ok(())
            }
            kind => Err(SignalError::RoleMismatch {
                kind,
                role: self.role.role(),
            }),
        }
    }

    fn on_webrtc(&mut self, envelope: Envelope) -> Result<()> {
        let payload = envelope.data.unwrap_or(serde_json::Value::Null);

        match self.role.role() {
            Role::Viewer => {
                // The presenter always initiates for viewers: this is an
                // offer, and its Id tells us how to address the answer.
                self.role.set_presenter_slot(envelope.id);

                if self.registry.is_empty() {
                    // Demoted mid-call: re-acquire the single presenter link
                    let link = self.connector.connect();
                    self.registry.append(link);
                }
                self.registry.get_mut(0)?.deliver_signal(payload)
            }
            Role::Presenter => {
                // An answer from the viewer at this slot index. Out of
                // range means our roster desynced from the relay; drop.
                self.registry.get_mut(envelope.id)?.deliver_signal(payload)
            }
        }
    }

    fn on_new_peer(&mut self, envelope: Envelope) -> Result<()> {
        if self.role.role() != Role::Presenter {
            return Err(SignalError::RoleMismatch {
                kind: EnvelopeKind::NewPeer,
                role: self.role.role(),
            });
        }

        // Id is a join count here; zero is a valid no-op
        let count = envelope.id.max(0) as usize;
        let mut added = Vec::with_capacity(count);
        for _ in 0..count {
            let link = self.connector.connect();
            added.push(self.registry.append(link));
        }

        if self.role.is_broadcasting() {
            // New slots originate offers before any further envelope
            self.broadcast.on_new_slots_added(&added, &mut self.registry);
        }

        if count > 0 {
            tracing::info!(count, total = self.registry.len(), "viewers joined");
        }
        Ok(())
    }

    fn on_delete_peer(&mut self, envelope: Envelope) -> Result<()> {
        if self.role.role() != Role::Presenter {
            return Err(SignalError::RoleMismatch {
                kind: EnvelopeKind::DeletePeer,
                role: self.role.role(),
            });
        }

        // Tail truncation relies on the relay's FIFO join/leave matching
        let count = envelope.id.max(0) as usize;
        self.registry.truncate(count);
        if count > 0 {
            tracing::info!(count, total = self.registry.len(), "viewers left");
        }
        Ok(())
    }

    fn apply_demotion(&mut self) {
        if self.role.role() == Role::Presenter {
            tracing::info!("demoted to viewer by relay");
        }
        self.role.apply_demotion();
        self.registry.clear();
        self.broadcast.release();
        self.media.release();
    }

    fn degrade_to_idle(&mut self) {
        self.apply_demotion();
    }

    /// Wrap and forward negotiation payloads the peer handles produced.
    /// Viewers always answer (Id = presenter slot); presenters always
    /// offer (Id = producing slot index).
    fn pump_outbound(&mut self) {
        let role = self.role.role();
        let reply_id = self.role.presenter_slot_wire();

        for (index, slot) in self.registry.iter_from_mut(0).enumerate() {
            for payload in slot.link_mut().poll_signals() {
                let id = match role {
                    Role::Viewer => reply_id,
                    Role::Presenter => index as i64,
                };
                if let Err(error) = self.transport.send(&Envelope::webrtc(id, payload)) {
                    tracing::warn!(%error, "failed to forward negotiation payload");
                }
            }
        }
    }
}
