//! In-memory transport.
//!
//! Behaves like a connected XMPP client whose server is driven by the test:
//!
//! - roster changes and presence updates are injected with
//!   [`add_friend`](SimTransport::add_friend),
//!   [`set_presence`](SimTransport::set_presence) and friends
//! - inbound messages are injected with
//!   [`receive_message`](SimTransport::receive_message)
//! - accepted outbound chats are recorded and echoed to message listeners as
//!   outbound events, like a client that surfaces its own sent stanzas
//!
//! Listeners are invoked on the calling thread after the internal lock is
//! released, so they may call back into the transport.
//!
//! # Best Presence
//!
//! Presences are kept per bare address and resource. The best presence is the
//! available one with the highest priority; among equal priorities a present
//! resource beats an away one, then the lexicographically smallest resource
//! wins. With no available resource the contact is unavailable.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use parking_lot::Mutex;
use partyline_core::{
    Direction, ListenerId, MessageEvent, MessageListener, RosterEvent, RosterListener, Transport,
    TransportError,
};
use partyline_proto::{Address, Message, OutboundPresence, PresenceRecord};
use tracing::trace;

struct SimState {
    next_listener: u64,
    roster_listeners: Vec<(ListenerId, Arc<dyn RosterListener>)>,
    message_listeners: Vec<(ListenerId, Arc<dyn MessageListener>)>,
    roster: Vec<Address>,
    presences: HashMap<Address, BTreeMap<String, PresenceRecord>>,
    sent_chats: Vec<(Address, Message)>,
    sent_presences: Vec<OutboundPresence>,
    connected: bool,
    interrupt_next: bool,
    disconnects: usize,
}

/// In-memory [`Transport`] for tests.
pub struct SimTransport {
    domain: String,
    state: Mutex<SimState>,
}

impl SimTransport {
    /// Connected transport for `domain` with an empty roster.
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            state: Mutex::new(SimState {
                next_listener: 0,
                roster_listeners: Vec::new(),
                message_listeners: Vec::new(),
                roster: Vec::new(),
                presences: HashMap::new(),
                sent_chats: Vec::new(),
                sent_presences: Vec::new(),
                connected: true,
                interrupt_next: false,
                disconnects: 0,
            }),
        }
    }

    /// Bare address of `account_id` on this transport's domain.
    ///
    /// # Panics
    ///
    /// Panics if `account_id` is empty. Test helper only.
    #[allow(clippy::expect_used)]
    pub fn address_of(&self, account_id: &str) -> Address {
        Address::for_account(account_id, &self.domain).expect("non-empty account id")
    }

    /// Add `account_id` to the roster and notify.
    pub fn add_friend(&self, account_id: &str) {
        let address = self.address_of(account_id);
        {
            let mut state = self.state.lock();
            if !state.roster.contains(&address) {
                state.roster.push(address.clone());
            }
        }
        self.emit_roster(&RosterEvent::EntriesAdded(vec![address]));
    }

    /// Notify that the roster entry of `account_id` changed.
    pub fn update_friend(&self, account_id: &str) {
        let address = self.address_of(account_id);
        self.emit_roster(&RosterEvent::EntriesUpdated(vec![address]));
    }

    /// Remove `account_id` from the roster, forget its presences and notify.
    pub fn remove_friend(&self, account_id: &str) {
        let address = self.address_of(account_id);
        {
            let mut state = self.state.lock();
            state.roster.retain(|entry| *entry != address);
            state.presences.remove(&address);
        }
        self.emit_roster(&RosterEvent::EntriesDeleted(vec![address]));
    }

    /// Store `record` for its sender's resource and notify.
    pub fn set_presence(&self, record: PresenceRecord) {
        {
            let resource = record.from.resource().unwrap_or_default().to_string();
            let mut state = self.state.lock();
            state.presences.entry(record.from.to_bare()).or_default().insert(resource, record.clone());
        }
        self.emit_roster(&RosterEvent::PresenceChanged(record));
    }

    /// Deliver an inbound message from `from`.
    pub fn receive_message(&self, from: Address, message: Message) {
        self.emit_message(&MessageEvent { direction: Direction::Inbound, peer: from, message });
    }

    /// Deliver an inbound chat message from `account_id`.
    pub fn receive_chat(&self, account_id: &str, body: &str) {
        self.receive_message(self.address_of(account_id), Message::chat(body));
    }

    /// Make subsequent sends fail with [`TransportError::NotConnected`], or
    /// succeed again.
    pub fn set_connected(&self, connected: bool) {
        self.state.lock().connected = connected;
    }

    /// Make the next send fail with [`TransportError::Interrupted`].
    pub fn interrupt_next_send(&self) {
        self.state.lock().interrupt_next = true;
    }

    /// Chats accepted so far, in order.
    pub fn sent_chats(&self) -> Vec<(Address, Message)> {
        self.state.lock().sent_chats.clone()
    }

    /// Presences accepted so far, in order.
    pub fn sent_presences(&self) -> Vec<OutboundPresence> {
        self.state.lock().sent_presences.clone()
    }

    /// Registered roster and message listeners.
    pub fn listener_counts(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.roster_listeners.len(), state.message_listeners.len())
    }

    /// Number of [`Transport::disconnect`] calls.
    pub fn disconnects(&self) -> usize {
        self.state.lock().disconnects
    }

    fn emit_roster(&self, event: &RosterEvent) {
        let listeners: Vec<_> =
            self.state.lock().roster_listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
        trace!(listeners = listeners.len(), ?event, "roster event");
        for listener in listeners {
            listener.on_roster_event(event);
        }
    }

    fn emit_message(&self, event: &MessageEvent) {
        let listeners: Vec<_> =
            self.state.lock().message_listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
        trace!(listeners = listeners.len(), ?event, "message event");
        for listener in listeners {
            listener.on_message_event(event);
        }
    }

    fn check_send(state: &mut SimState) -> Result<(), TransportError> {
        if !state.connected {
            return Err(TransportError::NotConnected);
        }
        if std::mem::take(&mut state.interrupt_next) {
            return Err(TransportError::Interrupted);
        }
        Ok(())
    }
}

impl Transport for SimTransport {
    fn service_domain(&self) -> &str {
        &self.domain
    }

    fn roster_entries(&self) -> Vec<Address> {
        self.state.lock().roster.clone()
    }

    fn best_presence(&self, bare: &Address) -> PresenceRecord {
        let state = self.state.lock();
        let mut best: Option<&PresenceRecord> = None;

        for record in state.presences.get(bare).into_iter().flat_map(BTreeMap::values) {
            if !record.available {
                continue;
            }
            let better = best.is_none_or(|current| {
                (record.priority, !record.away) > (current.priority, !current.away)
            });
            if better {
                best = Some(record);
            }
        }

        best.cloned().unwrap_or_else(|| PresenceRecord::unavailable(bare.clone()))
    }

    fn send_chat(&self, to: &Address, message: &Message) -> Result<(), TransportError> {
        {
            let mut state = self.state.lock();
            Self::check_send(&mut state)?;
            state.sent_chats.push((to.clone(), message.clone()));
        }

        self.emit_message(&MessageEvent {
            direction: Direction::Outbound,
            peer: to.clone(),
            message: message.clone(),
        });
        Ok(())
    }

    fn send_presence(&self, presence: &OutboundPresence) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        Self::check_send(&mut state)?;
        state.sent_presences.push(*presence);
        Ok(())
    }

    fn add_roster_listener(&self, listener: Arc<dyn RosterListener>) -> ListenerId {
        let mut state = self.state.lock();
        state.next_listener += 1;
        let id = ListenerId(state.next_listener);
        state.roster_listeners.push((id, listener));
        id
    }

    fn remove_roster_listener(&self, id: ListenerId) -> bool {
        let mut state = self.state.lock();
        let before = state.roster_listeners.len();
        state.roster_listeners.retain(|(registered, _)| *registered != id);
        state.roster_listeners.len() < before
    }

    fn add_message_listener(&self, listener: Arc<dyn MessageListener>) -> ListenerId {
        let mut state = self.state.lock();
        state.next_listener += 1;
        let id = ListenerId(state.next_listener);
        state.message_listeners.push((id, listener));
        id
    }

    fn remove_message_listener(&self, id: ListenerId) -> bool {
        let mut state = self.state.lock();
        let before = state.message_listeners.len();
        state.message_listeners.retain(|(registered, _)| *registered != id);
        state.message_listeners.len() < before
    }

    fn disconnect(&self) {
        let mut state = self.state.lock();
        state.connected = false;
        state.disconnects += 1;
    }
}
