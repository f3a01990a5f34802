//! Chat relay.
//!
//! Sends one-to-one chat messages and keeps the history of every chat message
//! the transport surfaces, in both directions. Only messages of type `chat`
//! are cached; inbound ones are then handed to the [`ChatHandler`].

use std::sync::Arc;

use partyline_proto::{Address, Message, OutboundPresence, PresenceStatus};
use tracing::{debug, trace};

use crate::{
    cache::MessageCache,
    error::SessionError,
    handler::{ChatHandler, ChatResource},
    transport::{Direction, ListenerId, MessageEvent, MessageListener, Transport},
};

/// State shared with the transport through the message listener.
struct RelayState<T: Transport> {
    transport: Arc<T>,
    handler: Arc<dyn ChatHandler>,
    cache: MessageCache,
}

impl<T: Transport> MessageListener for RelayState<T> {
    fn on_message_event(&self, event: &MessageEvent) {
        if !event.message.is_chat() {
            trace!(
                kind = event.message.kind.as_str(),
                peer = %event.peer,
                "ignoring non-chat message"
            );
            return;
        }

        let Some(account_id) = event.peer.account_id() else {
            trace!(peer = %event.peer, "ignoring chat from address without local part");
            return;
        };

        self.cache.append(event.direction, &account_id, &event.message.body);

        if event.direction == Direction::Inbound {
            self.handler.on_chat_message_received(&account_id, &event.message.body, self);
        }
    }
}

impl<T: Transport> ChatResource for RelayState<T> {
    fn send_message_to(&self, account_id: &str, body: &str) -> Result<(), SessionError> {
        let to = Address::for_account(account_id, self.transport.service_domain()).map_err(
            |source| SessionError::InvalidAccountId { account_id: account_id.to_string(), source },
        )?;

        self.transport
            .send_chat(&to, &Message::chat(body))
            .map_err(|source| SessionError::Io { action: "send message", source })?;

        debug!(to = %to, "sent chat message");
        Ok(())
    }

    fn update_status(&self, status: PresenceStatus) -> Result<(), SessionError> {
        self.transport
            .send_presence(&OutboundPresence::for_status(status))
            .map_err(|source| SessionError::Io { action: "update status", source })?;

        debug!(%status, "updated own presence");
        Ok(())
    }

    fn find_messages_sent_to(&self, account_id: &str) -> Vec<String> {
        self.cache.bodies(Direction::Outbound, account_id)
    }

    fn find_messages_received_from(&self, account_id: &str) -> Vec<String> {
        self.cache.bodies(Direction::Inbound, account_id)
    }
}

/// Sends chat messages and caches the conversation history.
///
/// Registers itself as a message listener on construction and deregisters on
/// [`close`](Self::close) or drop.
pub struct ChatRelay<T: Transport> {
    state: Arc<RelayState<T>>,
    listener: Option<ListenerId>,
}

impl<T: Transport> ChatRelay<T> {
    /// Create a relay and register it on `transport`.
    pub fn new(transport: Arc<T>, handler: Arc<dyn ChatHandler>) -> Self {
        let state = Arc::new(RelayState { transport, handler, cache: MessageCache::new() });
        let as_listener: Arc<dyn MessageListener> = state.clone();
        let listener = state.transport.add_message_listener(as_listener);
        debug!(?listener, "chat relay registered");

        Self { state, listener: Some(listener) }
    }

    /// Stop receiving message events. Idempotent.
    pub fn close(&mut self) {
        if let Some(listener) = self.listener.take() {
            self.state.transport.remove_message_listener(listener);
            debug!(?listener, "chat relay closed");
        }
    }

    /// True until [`close`](Self::close) has run.
    pub fn is_open(&self) -> bool {
        self.listener.is_some()
    }
}

impl<T: Transport> ChatResource for ChatRelay<T> {
    fn send_message_to(&self, account_id: &str, body: &str) -> Result<(), SessionError> {
        self.state.send_message_to(account_id, body)
    }

    fn update_status(&self, status: PresenceStatus) -> Result<(), SessionError> {
        self.state.update_status(status)
    }

    fn find_messages_sent_to(&self, account_id: &str) -> Vec<String> {
        self.state.find_messages_sent_to(account_id)
    }

    fn find_messages_received_from(&self, account_id: &str) -> Vec<String> {
        self.state.find_messages_received_from(account_id)
    }
}

impl<T: Transport> Drop for ChatRelay<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T: Transport> std::fmt::Debug for ChatRelay<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRelay").field("listener", &self.listener).finish_non_exhaustive()
    }
}
