//! Minimal recording transport for unit tests.
//!
//! Accepted chats are echoed to the message listeners as outbound events.
//! Everything else is delivered explicitly by the test. Listener removals and
//! disconnects are appended to a teardown log.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use partyline_proto::{Address, Message, OutboundPresence, PresenceRecord};

use crate::{
    error::TransportError,
    transport::{
        Direction, ListenerId, MessageEvent, MessageListener, RosterEvent, RosterListener,
        Transport,
    },
};

#[derive(Default)]
struct Inner {
    next_id: u64,
    roster_listeners: Vec<(ListenerId, Arc<dyn RosterListener>)>,
    message_listeners: Vec<(ListenerId, Arc<dyn MessageListener>)>,
    roster: Vec<Address>,
    presences: HashMap<Address, PresenceRecord>,
    sent_chats: Vec<(Address, Message)>,
    sent_presences: Vec<OutboundPresence>,
    failure: Option<TransportError>,
    disconnects: usize,
    teardown: Vec<&'static str>,
}

pub(crate) struct FakeTransport {
    domain: String,
    inner: Mutex<Inner>,
}

impl FakeTransport {
    pub(crate) fn new(domain: &str) -> Self {
        Self { domain: domain.to_string(), inner: Mutex::default() }
    }

    pub(crate) fn set_roster(&self, roster: Vec<Address>) {
        self.inner.lock().roster = roster;
    }

    pub(crate) fn set_best_presence(&self, bare: Address, record: PresenceRecord) {
        self.inner.lock().presences.insert(bare, record);
    }

    pub(crate) fn fail_sends(&self, error: TransportError) {
        self.inner.lock().failure = Some(error);
    }

    pub(crate) fn deliver_roster(&self, event: &RosterEvent) {
        let listeners: Vec<_> =
            self.inner.lock().roster_listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
        for listener in listeners {
            listener.on_roster_event(event);
        }
    }

    pub(crate) fn deliver_message(&self, event: &MessageEvent) {
        let listeners: Vec<_> =
            self.inner.lock().message_listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
        for listener in listeners {
            listener.on_message_event(event);
        }
    }

    pub(crate) fn sent_chats(&self) -> Vec<(Address, Message)> {
        self.inner.lock().sent_chats.clone()
    }

    pub(crate) fn sent_presences(&self) -> Vec<OutboundPresence> {
        self.inner.lock().sent_presences.clone()
    }

    pub(crate) fn roster_listener_count(&self) -> usize {
        self.inner.lock().roster_listeners.len()
    }

    pub(crate) fn message_listener_count(&self) -> usize {
        self.inner.lock().message_listeners.len()
    }

    pub(crate) fn disconnects(&self) -> usize {
        self.inner.lock().disconnects
    }

    /// `"chat"`, `"roster"` and `"disconnect"` in the order they happened.
    pub(crate) fn teardown_log(&self) -> Vec<&'static str> {
        self.inner.lock().teardown.clone()
    }
}

impl Transport for FakeTransport {
    fn service_domain(&self) -> &str {
        &self.domain
    }

    fn roster_entries(&self) -> Vec<Address> {
        self.inner.lock().roster.clone()
    }

    fn best_presence(&self, bare: &Address) -> PresenceRecord {
        self.inner
            .lock()
            .presences
            .get(bare)
            .cloned()
            .unwrap_or_else(|| PresenceRecord::unavailable(bare.clone()))
    }

    fn send_chat(&self, to: &Address, message: &Message) -> Result<(), TransportError> {
        {
            let mut inner = self.inner.lock();
            if let Some(error) = inner.failure.clone() {
                return Err(error);
            }
            inner.sent_chats.push((to.clone(), message.clone()));
        }

        self.deliver_message(&MessageEvent {
            direction: Direction::Outbound,
            peer: to.clone(),
            message: message.clone(),
        });
        Ok(())
    }

    fn send_presence(&self, presence: &OutboundPresence) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        if let Some(error) = inner.failure.clone() {
            return Err(error);
        }
        inner.sent_presences.push(*presence);
        Ok(())
    }

    fn add_roster_listener(&self, listener: Arc<dyn RosterListener>) -> ListenerId {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = ListenerId(inner.next_id);
        inner.roster_listeners.push((id, listener));
        id
    }

    fn remove_roster_listener(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.roster_listeners.len();
        inner.roster_listeners.retain(|(l, _)| *l != id);
        let removed = inner.roster_listeners.len() != before;
        if removed {
            inner.teardown.push("roster");
        }
        removed
    }

    fn add_message_listener(&self, listener: Arc<dyn MessageListener>) -> ListenerId {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = ListenerId(inner.next_id);
        inner.message_listeners.push((id, listener));
        id
    }

    fn remove_message_listener(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.message_listeners.len();
        inner.message_listeners.retain(|(l, _)| *l != id);
        let removed = inner.message_listeners.len() != before;
        if removed {
            inner.teardown.push("chat");
        }
        removed
    }

    fn disconnect(&self) {
        let mut inner = self.inner.lock();
        inner.disconnects += 1;
        inner.teardown.push("disconnect");
    }
}
