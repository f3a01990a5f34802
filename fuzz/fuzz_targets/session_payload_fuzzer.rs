//! Fuzz target for the friend session payload decoder
//!
//! Friends control their own status text, so every byte of it is untrusted
//! input reaching every client that has them on its roster.
//!
//! # Strategy
//!
//! - Raw text: arbitrary strings straight into the decoder
//! - Structured: well-formed sessions with arbitrary field values, encoded
//!   and decoded back
//! - Mutated: well-formed payloads with one numeric field replaced by
//!   arbitrary text
//!
//! # Invariants
//!
//! - NEVER panic, whatever the input
//! - Any successfully decoded session re-encodes to a payload that decodes to
//!   the same session
//! - Encoding a session and decoding it back yields an equal session
//! - A count string that is not a plain decimal is rejected, never silently
//!   dropped

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use partyline_proto::{decode_session, Application, FriendSession, PayloadError, Platform};
use serde_json::json;

#[derive(Debug, Arbitrary)]
enum FuzzInput {
    Raw(String),
    Structured(FuzzSession),
    BadCount { field: u8, value: String },
}

#[derive(Debug, Arbitrary)]
struct FuzzSession {
    id: String,
    status_text: String,
    is_playing: bool,
    is_joinable: bool,
    has_voice_support: bool,
    party_member_count: Option<u32>,
    party_max_member_count: Option<u32>,
    party_id: Option<String>,
    party_key: Option<String>,
    platform: Option<u8>,
    application: Option<u8>,
    remaining_player_count: Option<u32>,
}

impl FuzzSession {
    fn into_session(self) -> FriendSession {
        FriendSession {
            id: self.id,
            status_text: self.status_text,
            is_playing: self.is_playing,
            is_joinable: self.is_joinable,
            has_voice_support: self.has_voice_support,
            party_member_count: self.party_member_count,
            party_max_member_count: self.party_max_member_count,
            party_id: self.party_id,
            party_key: self.party_key,
            platform: self.platform.map(|i| Platform::ALL[usize::from(i) % Platform::ALL.len()]),
            application: self
                .application
                .map(|i| Application::ALL[usize::from(i) % Application::ALL.len()]),
            remaining_player_count: self.remaining_player_count,
        }
    }
}

const COUNT_FIELDS: [&str; 3] = ["Event_PartySize_s", "Event_PartyMaxSize_s", "Event_PlayersAlive_s"];

fuzz_target!(|input: FuzzInput| {
    match input {
        FuzzInput::Raw(text) => {
            if let Ok(Some(session)) = decode_session(Some(&text)) {
                let payload = session.to_payload().expect("decoded session must encode");
                let again = decode_session(Some(&payload)).expect("re-encoded payload must decode");
                assert_eq!(again, Some(session), "re-encode changed the session");
            }
        },
        FuzzInput::Structured(fuzz) => {
            let session = fuzz.into_session();
            let payload = session.to_payload().expect("session must encode");
            let decoded = decode_session(Some(&payload)).expect("encoded session must decode");
            assert_eq!(decoded, Some(session), "round trip changed the session");
        },
        FuzzInput::BadCount { field, value } => {
            if value.parse::<u32>().is_ok() {
                return;
            }
            let field = COUNT_FIELDS[usize::from(field) % COUNT_FIELDS.len()];
            let payload = json!({
                "SessionId": "",
                "Status": "",
                "bIsPlaying": false,
                "bIsJoinable": false,
                "bHasVoiceSupport": false,
                "Properties": { field: value },
            })
            .to_string();

            match decode_session(Some(&payload)) {
                Err(PayloadError::InvalidNumber { .. }) => {},
                other => panic!("non-numeric {field} accepted: {other:?}"),
            }
        },
    }
});
