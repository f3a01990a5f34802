//! Partyline wire types.
//!
//! Everything the presence layer reads from or writes to the messaging
//! transport, expressed as plain values with no I/O:
//!
//! - [`Address`]: `local@domain/resource` transport addresses
//! - [`Platform`] / [`Application`]: short wire code tables
//! - [`FriendSession`]: the JSON status payload friends publish
//! - [`PresenceStatus`], [`PresenceRecord`], [`OutboundPresence`]: availability
//! - [`Message`]: one-to-one message stanzas
//!
//! Decoding is lenient about optional data and strict about structure: a
//! missing optional key never fails, a malformed document always does.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod address;
pub mod codes;
pub mod message;
pub mod presence;
pub mod session;

pub use address::{Address, AddressError};
pub use codes::{Application, Platform};
pub use message::{Message, MessageKind};
pub use presence::{OutboundPresence, PresenceMode, PresenceRecord, PresenceStatus, PresenceType};
pub use session::{FriendSession, PARTY_JOIN_INFO_KEY, PayloadError, decode_session};
