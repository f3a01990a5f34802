//! Partyline core.
//!
//! Translates raw transport events into the friend, presence and chat events
//! a game client shows to its user.
//!
//! ## Architecture
//!
//! ```text
//! Transport (XMPP client, or SimTransport in tests)
//!   │ RosterEvent             │ MessageEvent
//!   ▼                         ▼
//! RosterTracker            ChatRelay ── MessageCache (sent / received)
//!   │ classify + decode       │
//!   ▼                         ▼
//! FriendHandler            ChatHandler        (application callbacks)
//!
//! Session: owns both, registers them on build, tears them down on close
//! ```
//!
//! The core never performs I/O on its own. Transport events arrive on the
//! transport's threads and are handled synchronously. Only
//! [`ChatRelay::send_message_to`] and [`ChatRelay::update_status`] call into
//! the transport to send.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cache;
mod chat;
mod error;
mod handler;
mod roster;
mod session;
#[cfg(test)]
mod test_transport;
mod transport;

pub use cache::MessageCache;
pub use chat::ChatRelay;
pub use error::{SessionError, TransportError};
pub use handler::{
    ChatCallback, ChatHandler, ChatResource, FriendCallbacks, FriendHandler, FriendResource,
    NoopHandler, PresenceEvent,
};
pub use partyline_proto::{
    Address, Application, FriendSession, Message, MessageKind, OutboundPresence, Platform,
    PresenceRecord, PresenceStatus,
};
pub use roster::RosterTracker;
pub use session::{Credentials, Session, SessionBuilder};
pub use transport::{
    Direction, ListenerId, MessageEvent, MessageListener, RosterEvent, RosterListener, Transport,
};
