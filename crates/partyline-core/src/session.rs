//! Session facade.
//!
//! A [`Session`] owns one [`ChatRelay`] and one [`RosterTracker`] over a
//! shared transport. It is built with [`SessionBuilder`], which collects the
//! application's handlers, and is torn down by [`Session::close`] or by drop:
//! chat relay first, roster tracker second, transport disconnect last.

use std::{collections::HashSet, fmt, sync::Arc};

use partyline_proto::PresenceStatus;
use tracing::{debug, info};

use crate::{
    chat::ChatRelay,
    error::SessionError,
    handler::{
        ChatCallback, ChatHandler, ChatResource, FriendHandler, FriendResource, NoopHandler,
        PresenceEvent,
    },
    roster::RosterTracker,
    transport::Transport,
};

/// Account credentials obtained from the authentication service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account id of the local user.
    pub account_id: String,
    /// Access token for the chat service.
    pub access_token: String,
}

impl Credentials {
    /// Create credentials.
    pub fn new(account_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self { account_id: account_id.into(), access_token: access_token.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_id", &self.account_id)
            .field("access_token", &format!("<redacted {} bytes>", self.access_token.len()))
            .finish()
    }
}

/// Collects handlers and builds a [`Session`].
///
/// Handlers that are not set default to [`NoopHandler`].
pub struct SessionBuilder<T: Transport> {
    transport: Arc<T>,
    credentials: Credentials,
    chat_handler: Arc<dyn ChatHandler>,
    friend_handler: Arc<dyn FriendHandler>,
}

impl<T: Transport> SessionBuilder<T> {
    /// Start building a session over `transport`.
    pub fn new(transport: Arc<T>, credentials: Credentials) -> Self {
        Self {
            transport,
            credentials,
            chat_handler: Arc::new(NoopHandler),
            friend_handler: Arc::new(NoopHandler),
        }
    }

    /// Handle inbound chat messages with `handler`.
    #[must_use]
    pub fn chat_handler(mut self, handler: impl ChatHandler + 'static) -> Self {
        self.chat_handler = Arc::new(handler);
        self
    }

    /// Handle inbound chat messages with a closure.
    #[must_use]
    pub fn on_chat_message<F>(self, f: F) -> Self
    where
        F: Fn(&str, &str, &dyn ChatResource) + Send + Sync + 'static,
    {
        self.chat_handler(ChatCallback::new(f))
    }

    /// Handle roster snapshots and presence changes with `handler`.
    #[must_use]
    pub fn friend_handler(mut self, handler: impl FriendHandler + 'static) -> Self {
        self.friend_handler = Arc::new(handler);
        self
    }

    /// Register both components on the transport.
    pub fn build(self) -> Session<T> {
        let chat = ChatRelay::new(Arc::clone(&self.transport), self.chat_handler);
        let friends = RosterTracker::new(Arc::clone(&self.transport), self.friend_handler);
        info!(account_id = %self.credentials.account_id, "session started");

        Session {
            credentials: self.credentials,
            transport: self.transport,
            chat,
            friends,
            closed: false,
        }
    }
}

impl<T: Transport> fmt::Debug for SessionBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Presence, roster and chat for one signed-in user.
pub struct Session<T: Transport> {
    credentials: Credentials,
    transport: Arc<T>,
    chat: ChatRelay<T>,
    friends: RosterTracker<T>,
    closed: bool,
}

impl<T: Transport> Session<T> {
    /// Start building a session.
    pub fn builder(transport: Arc<T>, credentials: Credentials) -> SessionBuilder<T> {
        SessionBuilder::new(transport, credentials)
    }

    /// Account id of the local user.
    pub fn account_id(&self) -> &str {
        &self.credentials.account_id
    }

    /// Send a chat message to `account_id`.
    pub fn send_message_to(&self, account_id: &str, body: &str) -> Result<(), SessionError> {
        self.chat.send_message_to(account_id, body)
    }

    /// Announce the local user's presence.
    pub fn update_status(&self, status: PresenceStatus) -> Result<(), SessionError> {
        self.chat.update_status(status)
    }

    /// Bodies sent to `account_id`, oldest first.
    pub fn find_messages_sent_to(&self, account_id: &str) -> Vec<String> {
        self.chat.find_messages_sent_to(account_id)
    }

    /// Bodies received from `account_id`, oldest first.
    pub fn find_messages_received_from(&self, account_id: &str) -> Vec<String> {
        self.chat.find_messages_received_from(account_id)
    }

    /// Account ids currently on the roster.
    pub fn friend_ids(&self) -> HashSet<String> {
        self.friends.friend_ids()
    }

    /// Current presence of `account_id`.
    pub fn presence_of(&self, account_id: &str) -> Option<PresenceEvent> {
        self.friends.presence_of(account_id)
    }

    /// Tear down and disconnect.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        self.chat.close();
        self.friends.close();
        self.transport.disconnect();
        debug!(account_id = %self.credentials.account_id, "session closed");
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<T: Transport> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("credentials", &self.credentials)
            .field("chat", &self.chat)
            .field("friends", &self.friends)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
