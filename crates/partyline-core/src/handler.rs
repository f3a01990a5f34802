//! Application-facing callbacks and the handles passed to them.
//!
//! Handlers run on the transport's threads. They receive a handle
//! ([`ChatResource`] or [`FriendResource`]) so that they can reply or look up
//! presence without capturing the session.

use std::{collections::HashSet, fmt, sync::Arc};

use partyline_proto::{FriendSession, PresenceStatus};

use crate::error::SessionError;

/// A friend's presence after classification and payload decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEvent {
    /// Friend's account id.
    pub account_id: String,
    /// Classified availability.
    pub status: PresenceStatus,
    /// Decoded session; always `None` when `status` is offline.
    pub session: Option<FriendSession>,
}

/// Chat operations available to the application and to chat handlers.
pub trait ChatResource {
    /// Send a chat message to `account_id`.
    fn send_message_to(&self, account_id: &str, body: &str) -> Result<(), SessionError>;

    /// Announce the local user's presence.
    fn update_status(&self, status: PresenceStatus) -> Result<(), SessionError>;

    /// Bodies sent to `account_id`, oldest first.
    fn find_messages_sent_to(&self, account_id: &str) -> Vec<String>;

    /// Bodies received from `account_id`, oldest first.
    fn find_messages_received_from(&self, account_id: &str) -> Vec<String>;
}

/// Friend lookups available to the application and to friend handlers.
pub trait FriendResource {
    /// Account ids currently on the roster.
    fn friend_ids(&self) -> HashSet<String>;

    /// Current best presence of `account_id`.
    ///
    /// `None` when the account id cannot form an address.
    fn presence_of(&self, account_id: &str) -> Option<PresenceEvent>;
}

/// Receives inbound chat messages.
pub trait ChatHandler: Send + Sync {
    /// A chat message from `account_id` arrived and has been cached.
    fn on_chat_message_received(&self, account_id: &str, body: &str, chat: &dyn ChatResource);
}

/// Receives roster snapshots and friend presence changes.
///
/// Both methods default to doing nothing.
pub trait FriendHandler: Send + Sync {
    /// The roster changed; `account_ids` is the full membership.
    fn on_friends_list_received(&self, account_ids: &HashSet<String>, friends: &dyn FriendResource) {
        let _ = (account_ids, friends);
    }

    /// A friend's presence changed.
    fn on_friend_presence_received(&self, event: &PresenceEvent, friends: &dyn FriendResource) {
        let _ = (event, friends);
    }
}

impl<H: ChatHandler + ?Sized> ChatHandler for Arc<H> {
    fn on_chat_message_received(&self, account_id: &str, body: &str, chat: &dyn ChatResource) {
        (**self).on_chat_message_received(account_id, body, chat);
    }
}

impl<H: FriendHandler + ?Sized> FriendHandler for Arc<H> {
    fn on_friends_list_received(&self, account_ids: &HashSet<String>, friends: &dyn FriendResource) {
        (**self).on_friends_list_received(account_ids, friends);
    }

    fn on_friend_presence_received(&self, event: &PresenceEvent, friends: &dyn FriendResource) {
        (**self).on_friend_presence_received(event, friends);
    }
}

/// Handler that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl ChatHandler for NoopHandler {
    fn on_chat_message_received(&self, _: &str, _: &str, _: &dyn ChatResource) {}
}

impl FriendHandler for NoopHandler {}

/// [`ChatHandler`] backed by a closure.
pub struct ChatCallback<F>(F);

impl<F> ChatCallback<F>
where
    F: Fn(&str, &str, &dyn ChatResource) + Send + Sync,
{
    /// Wrap `f`, called as `f(account_id, body, chat)`.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> ChatHandler for ChatCallback<F>
where
    F: Fn(&str, &str, &dyn ChatResource) + Send + Sync,
{
    fn on_chat_message_received(&self, account_id: &str, body: &str, chat: &dyn ChatResource) {
        (self.0)(account_id, body, chat);
    }
}

impl<F> fmt::Debug for ChatCallback<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCallback").finish_non_exhaustive()
    }
}

type FriendsListFn = dyn Fn(&HashSet<String>, &dyn FriendResource) + Send + Sync;
type FriendPresenceFn = dyn Fn(&PresenceEvent, &dyn FriendResource) + Send + Sync;

/// [`FriendHandler`] assembled from optional closures.
#[derive(Default)]
pub struct FriendCallbacks {
    friends_list: Option<Box<FriendsListFn>>,
    friend_presence: Option<Box<FriendPresenceFn>>,
}

impl FriendCallbacks {
    /// No callbacks set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `f` with every roster snapshot.
    #[must_use]
    pub fn on_friends_list<F>(mut self, f: F) -> Self
    where
        F: Fn(&HashSet<String>, &dyn FriendResource) + Send + Sync + 'static,
    {
        self.friends_list = Some(Box::new(f));
        self
    }

    /// Call `f` with every presence change.
    #[must_use]
    pub fn on_friend_presence<F>(mut self, f: F) -> Self
    where
        F: Fn(&PresenceEvent, &dyn FriendResource) + Send + Sync + 'static,
    {
        self.friend_presence = Some(Box::new(f));
        self
    }
}

impl FriendHandler for FriendCallbacks {
    fn on_friends_list_received(&self, account_ids: &HashSet<String>, friends: &dyn FriendResource) {
        if let Some(f) = &self.friends_list {
            f(account_ids, friends);
        }
    }

    fn on_friend_presence_received(&self, event: &PresenceEvent, friends: &dyn FriendResource) {
        if let Some(f) = &self.friend_presence {
            f(event, friends);
        }
    }
}

impl fmt::Debug for FriendCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FriendCallbacks")
            .field("friends_list", &self.friends_list.is_some())
            .field("friend_presence", &self.friend_presence.is_some())
            .finish()
    }
}
