//! Session error types.

use partyline_proto::AddressError;
use thiserror::Error;

/// Failure reported by a [`Transport`](crate::Transport) when sending.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection is down or was never established.
    #[error("not connected")]
    NotConnected,

    /// The sending thread was interrupted before the stanza was accepted.
    #[error("interrupted while sending")]
    Interrupted,
}

impl TransportError {
    /// Returns true if sending again on the same connection may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Interrupted => true,
            // Needs a new connection, which this crate does not manage
            Self::NotConnected => false,
        }
    }
}

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The transport failed to send a stanza.
    #[error("failed to {action}: {source}")]
    Io {
        /// What was being sent.
        action: &'static str,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },

    /// The account id cannot be turned into a transport address.
    #[error("invalid account id {account_id:?}: {source}")]
    InvalidAccountId {
        /// The rejected account id.
        account_id: String,
        /// Why the address could not be built.
        #[source]
        source: AddressError,
    },
}

impl SessionError {
    /// Returns true if retrying the operation may succeed.
    ///
    /// The session never retries by itself.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Io { source, .. } => source.is_transient(),
            Self::InvalidAccountId { .. } => false,
        }
    }
}
