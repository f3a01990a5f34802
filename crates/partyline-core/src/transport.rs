//! Transport abstraction.
//!
//! The `Transport` trait decouples event translation from the XMPP client that
//! owns the connection. Production code adapts a real client to it; tests use
//! an in-memory implementation that delivers events synchronously.
//!
//! # Invariants
//!
//! - Listener isolation: a listener registered on one transport never sees
//!   events from another
//! - Echo: every chat accepted by [`Transport::send_chat`] is surfaced to the
//!   message listeners as an [`Direction::Outbound`] event
//! - Removal is final: once `remove_*_listener` returns, the listener is not
//!   invoked for events raised afterwards

use std::sync::Arc;

use partyline_proto::{Address, Message, OutboundPresence, PresenceRecord};

use crate::error::TransportError;

/// Handle returned when registering a listener, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Roster change reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterEvent {
    /// Contacts were added to the roster.
    EntriesAdded(Vec<Address>),
    /// Existing roster entries changed.
    EntriesUpdated(Vec<Address>),
    /// Contacts were removed from the roster.
    EntriesDeleted(Vec<Address>),
    /// A contact's presence changed.
    PresenceChanged(PresenceRecord),
}

/// Whether a message was received or sent by the local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Received from a correspondent.
    Inbound,
    /// Sent to a correspondent.
    Outbound,
}

/// A message as surfaced by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    /// Received or sent.
    pub direction: Direction,
    /// Sender for inbound messages, recipient for outbound ones.
    pub peer: Address,
    /// The message itself.
    pub message: Message,
}

/// Receives roster and presence changes.
pub trait RosterListener: Send + Sync {
    /// Called on the transport's thread for every roster event.
    fn on_roster_event(&self, event: &RosterEvent);
}

/// Receives inbound and outbound messages.
pub trait MessageListener: Send + Sync {
    /// Called on the transport's thread for every message event.
    fn on_message_event(&self, event: &MessageEvent);
}

/// Connected XMPP client as seen by the session.
///
/// Events are delivered on threads owned by the transport. Implementations
/// must not hold internal locks while invoking listeners, since listeners may
/// call back into the transport (`roster_entries`, `best_presence`).
pub trait Transport: Send + Sync + 'static {
    /// Domain of the chat service, used to build contact addresses.
    fn service_domain(&self) -> &str;

    /// Current roster members.
    fn roster_entries(&self) -> Vec<Address>;

    /// Best presence across all resources of `bare`.
    ///
    /// Unknown contacts yield an unavailable record.
    fn best_presence(&self, bare: &Address) -> PresenceRecord;

    /// Send a message to `to`.
    fn send_chat(&self, to: &Address, message: &Message) -> Result<(), TransportError>;

    /// Broadcast the local user's presence.
    fn send_presence(&self, presence: &OutboundPresence) -> Result<(), TransportError>;

    /// Register a roster listener.
    fn add_roster_listener(&self, listener: Arc<dyn RosterListener>) -> ListenerId;

    /// Remove a roster listener. Returns false if it was not registered.
    fn remove_roster_listener(&self, id: ListenerId) -> bool;

    /// Register a message listener.
    fn add_message_listener(&self, listener: Arc<dyn MessageListener>) -> ListenerId;

    /// Remove a message listener. Returns false if it was not registered.
    fn remove_message_listener(&self, id: ListenerId) -> bool;

    /// Close the connection.
    fn disconnect(&self);
}
