//! Friend session payload.
//!
//! Friends publish a JSON document as the free-text status of their presence.
//! It describes what they are doing in the game: the match they are in, the
//! party they belong to, and where they play from.
//!
//! # Wire Shape
//!
//! ```text
//! {
//!   "SessionId": "",                  required, empty outside a match
//!   "Status": "Battle Royale Lobby",  required
//!   "bIsPlaying": false,              required
//!   "bIsJoinable": false,             required
//!   "bHasVoiceSupport": false,        required
//!   "Properties": {                   optional
//!     "Event_PartySize_s": "2",       optional, numeric string
//!     "Event_PartyMaxSize_s": "4",    optional, numeric string
//!     "Event_PlayersAlive_s": "57",   optional, numeric string
//!     "party.joininfodata.286331153_j": {   optional
//!       "partyId": "…", "key": "…", "sourcePlatform": "WIN", "appId": "Fortnite"
//!     }
//!   }
//! }
//! ```
//!
//! Every optional field is independent. Unknown keys are ignored. Platform and
//! application codes outside the known tables decode to `None`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codes::{Application, Platform};

/// Key of the party join info object inside `Properties`.
pub const PARTY_JOIN_INFO_KEY: &str = "party.joininfodata.286331153_j";

/// Errors from decoding or encoding a session payload.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The payload is not a JSON document of the expected shape.
    #[error("malformed session payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A numeric-string field did not hold a non-negative integer.
    #[error("invalid number in {field}: {value:?}")]
    InvalidNumber {
        /// Wire key of the field.
        field: &'static str,
        /// Raw value found.
        value: String,
    },

    /// Serializing the payload failed.
    #[error("failed to encode session payload: {source}")]
    Encode {
        /// Underlying serializer error.
        source: serde_json::Error,
    },
}

/// What a friend is currently doing.
///
/// # Security
///
/// - **Debug Redaction**: `party_key` lets anyone join the friend's party, so
///   the `Debug` impl only shows its length.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct FriendSession {
    /// Match session id, empty when not in a match.
    pub id: String,
    /// Population of the friend's party, or of the match when playing.
    pub status_text: String,
    /// In a match.
    pub is_playing: bool,
    /// The party or match can be joined.
    pub is_joinable: bool,
    /// The party or match has voice chat.
    pub has_voice_support: bool,
    /// Members in the party.
    pub party_member_count: Option<u32>,
    /// Maximum members of the party.
    pub party_max_member_count: Option<u32>,
    /// Party id.
    pub party_id: Option<String>,
    /// Key required to join the party.
    pub party_key: Option<String>,
    /// Platform the party was created from.
    pub platform: Option<Platform>,
    /// Application the friend is running.
    pub application: Option<Application>,
    /// Players still alive in the friend's match.
    pub remaining_player_count: Option<u32>,
}

impl std::fmt::Debug for FriendSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FriendSession")
            .field("id", &self.id)
            .field("status_text", &self.status_text)
            .field("is_playing", &self.is_playing)
            .field("is_joinable", &self.is_joinable)
            .field("has_voice_support", &self.has_voice_support)
            .field("party_member_count", &self.party_member_count)
            .field("party_max_member_count", &self.party_max_member_count)
            .field("party_id", &self.party_id)
            .field(
                "party_key",
                &self.party_key.as_ref().map(|key| format!("<redacted {} bytes>", key.len())),
            )
            .field("platform", &self.platform)
            .field("application", &self.application)
            .field("remaining_player_count", &self.remaining_player_count)
            .finish()
    }
}

impl FriendSession {
    /// Session outside any party or match, as sent from the menus.
    pub fn idle(status_text: impl Into<String>) -> Self {
        Self { status_text: status_text.into(), ..Self::default() }
    }

    /// Encode into the wire JSON shape.
    ///
    /// Absent optional fields are omitted, and `Properties` is omitted when
    /// none of its fields are present, so the result decodes back to `self`.
    pub fn to_payload(&self) -> Result<String, PayloadError> {
        serde_json::to_string(&SessionPayload::from(self))
            .map_err(|source| PayloadError::Encode { source })
    }
}

/// Decode a status payload.
///
/// Absent or blank input is the normal case for friends without a session and
/// yields `Ok(None)`. Anything else must be a well-formed payload.
pub fn decode_session(payload: Option<&str>) -> Result<Option<FriendSession>, PayloadError> {
    let Some(json) = payload.map(str::trim).filter(|json| !json.is_empty()) else {
        return Ok(None);
    };

    let wire: SessionPayload = serde_json::from_str(json)?;
    FriendSession::try_from(wire).map(Some)
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionPayload {
    #[serde(rename = "SessionId")]
    session_id: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "bIsPlaying")]
    is_playing: bool,
    #[serde(rename = "bIsJoinable")]
    is_joinable: bool,
    #[serde(rename = "bHasVoiceSupport")]
    has_voice_support: bool,
    #[serde(rename = "Properties", default, skip_serializing_if = "Option::is_none")]
    properties: Option<PropertiesPayload>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PropertiesPayload {
    #[serde(rename = "Event_PartySize_s", default, skip_serializing_if = "Option::is_none")]
    party_size: Option<String>,
    #[serde(rename = "Event_PartyMaxSize_s", default, skip_serializing_if = "Option::is_none")]
    party_max_size: Option<String>,
    #[serde(rename = "Event_PlayersAlive_s", default, skip_serializing_if = "Option::is_none")]
    players_alive: Option<String>,
    #[serde(
        rename = "party.joininfodata.286331153_j",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    join_info: Option<JoinInfoPayload>,
}

impl PropertiesPayload {
    fn is_empty(&self) -> bool {
        self.party_size.is_none()
            && self.party_max_size.is_none()
            && self.players_alive.is_none()
            && self.join_info.is_none()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinInfoPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    party_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    app_id: Option<String>,
}

impl TryFrom<SessionPayload> for FriendSession {
    type Error = PayloadError;

    fn try_from(wire: SessionPayload) -> Result<Self, Self::Error> {
        let properties = wire.properties.unwrap_or_default();
        let JoinInfoPayload { party_id, key, source_platform, app_id } =
            properties.join_info.unwrap_or_default();

        Ok(Self {
            id: wire.session_id,
            status_text: wire.status,
            is_playing: wire.is_playing,
            is_joinable: wire.is_joinable,
            has_voice_support: wire.has_voice_support,
            party_member_count: parse_count("Event_PartySize_s", properties.party_size)?,
            party_max_member_count: parse_count("Event_PartyMaxSize_s", properties.party_max_size)?,
            party_id,
            party_key: key,
            platform: source_platform.as_deref().and_then(Platform::from_code),
            application: app_id.as_deref().and_then(Application::from_code),
            remaining_player_count: parse_count("Event_PlayersAlive_s", properties.players_alive)?,
        })
    }
}

impl From<&FriendSession> for SessionPayload {
    fn from(session: &FriendSession) -> Self {
        let join_info = JoinInfoPayload {
            party_id: session.party_id.clone(),
            key: session.party_key.clone(),
            source_platform: session.platform.map(|platform| platform.code().to_string()),
            app_id: session.application.map(|application| application.code().to_string()),
        };
        let has_join_info = join_info.party_id.is_some()
            || join_info.key.is_some()
            || join_info.source_platform.is_some()
            || join_info.app_id.is_some();

        let properties = PropertiesPayload {
            party_size: session.party_member_count.map(|n| n.to_string()),
            party_max_size: session.party_max_member_count.map(|n| n.to_string()),
            players_alive: session.remaining_player_count.map(|n| n.to_string()),
            join_info: has_join_info.then_some(join_info),
        };

        Self {
            session_id: session.id.clone(),
            status: session.status_text.clone(),
            is_playing: session.is_playing,
            is_joinable: session.is_joinable,
            has_voice_support: session.has_voice_support,
            properties: (!properties.is_empty()).then_some(properties),
        }
    }
}

fn parse_count(field: &'static str, raw: Option<String>) -> Result<Option<u32>, PayloadError> {
    raw.map(|value| {
        value.parse::<u32>().map_err(|_| PayloadError::InvalidNumber { field, value })
    })
    .transpose()
}
