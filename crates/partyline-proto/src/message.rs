//! Message stanzas.

/// Message stanza type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// `normal`: standalone message outside a conversation.
    Normal,
    /// `chat`: one-to-one conversation.
    Chat,
    /// `groupchat`: multi-user room.
    GroupChat,
    /// `headline`: broadcast with no reply expected.
    Headline,
    /// `error`: bounce for a previously sent message.
    Error,
}

impl MessageKind {
    /// Wire name of the type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Chat => "chat",
            Self::GroupChat => "groupchat",
            Self::Headline => "headline",
            Self::Error => "error",
        }
    }
}

/// A message stanza body with its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Stanza type.
    pub kind: MessageKind,
    /// Text body.
    pub body: String,
}

impl Message {
    /// One-to-one chat message.
    pub fn chat(body: impl Into<String>) -> Self {
        Self { kind: MessageKind::Chat, body: body.into() }
    }

    /// Message of an arbitrary type.
    pub fn new(kind: MessageKind, body: impl Into<String>) -> Self {
        Self { kind, body: body.into() }
    }

    /// True for one-to-one chat messages.
    pub fn is_chat(&self) -> bool {
        self.kind == MessageKind::Chat
    }
}
