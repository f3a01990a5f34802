//! Partyline inspector.
//!
//! Decodes a friend's status payload the way a live session would and prints
//! what the application would see.
//!
//! # Usage
//!
//! ```bash
//! # Payload from a file, friend available and away
//! partyline-inspect --file status.json --away
//!
//! # Payload from stdin, friend offline
//! echo '{"SessionId":"",...}' | partyline-inspect --unavailable
//!
//! # Re-encode the decoded session in canonical form
//! partyline-inspect --file status.json --encode
//! ```

use std::{
    io::{self, Read, Write},
    path::PathBuf,
};

use clap::Parser;
use partyline_proto::{FriendSession, PresenceStatus, decode_session};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Partyline status payload inspector
#[derive(Parser, Debug)]
#[command(name = "partyline-inspect")]
#[command(about = "Decode a friend status payload and classify presence")]
#[command(version)]
struct Args {
    /// Read the payload from this file instead of stdin
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Friend is unavailable
    #[arg(long)]
    unavailable: bool,

    /// Friend is available but away
    #[arg(long, conflicts_with = "unavailable")]
    away: bool,

    /// Print the decoded session re-encoded as a payload
    #[arg(long)]
    encode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let payload = match &args.file {
        Some(path) => {
            tracing::debug!("Reading payload from {}", path.display());
            std::fs::read_to_string(path)?
        },
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        },
    };

    let status = PresenceStatus::from_availability(!args.unavailable, args.away);
    let session = decode_session(Some(&payload))?;
    tracing::debug!(%status, has_session = session.is_some(), "decoded payload");

    let mut out = io::stdout().lock();
    if args.encode {
        match &session {
            Some(session) => writeln!(out, "{}", session.to_payload()?)?,
            None => tracing::warn!("Nothing to encode: payload is blank"),
        }
        return Ok(());
    }

    render(&mut out, status, session.as_ref())?;
    Ok(())
}

/// Write what the application would see for a friend with `status`.
///
/// Offline friends never show a session, whatever their payload says.
fn render(
    out: &mut impl Write,
    status: PresenceStatus,
    session: Option<&FriendSession>,
) -> io::Result<()> {
    writeln!(out, "status: {status}")?;

    let Some(session) = session.filter(|_| status.is_available()) else {
        return writeln!(out, "session: none");
    };

    let match_id = if session.id.is_empty() { "<not in a match>" } else { session.id.as_str() };
    writeln!(out, "session: {match_id}")?;
    writeln!(out, "  status text: {}", session.status_text)?;
    writeln!(
        out,
        "  playing: {}, joinable: {}, voice: {}",
        session.is_playing, session.is_joinable, session.has_voice_support
    )?;

    if let (Some(size), Some(max)) = (session.party_member_count, session.party_max_member_count) {
        writeln!(out, "  party: {size}/{max}")?;
    }
    if let Some(party_id) = &session.party_id {
        writeln!(out, "  party id: {party_id}")?;
    }
    if let Some(platform) = session.platform {
        writeln!(out, "  platform: {platform:?} ({platform})")?;
    }
    if let Some(application) = session.application {
        writeln!(out, "  application: {application:?} ({application})")?;
    }
    if let Some(remaining) = session.remaining_player_count {
        writeln!(out, "  players alive: {remaining}")?;
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rendered(status: PresenceStatus, payload: &str) -> String {
        let session = decode_session(Some(payload)).unwrap();
        let mut out = Vec::new();
        render(&mut out, status, session.as_ref()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn renders_lobby_session() {
        let payload = r#"{"SessionId":"","Status":"Battle Royale Lobby - 2 / 4","bIsPlaying":false,
            "bIsJoinable":true,"bHasVoiceSupport":false,"Properties":{"Event_PartySize_s":"2",
            "Event_PartyMaxSize_s":"4","party.joininfodata.286331153_j":{"partyId":"p-1",
            "key":"secret","sourcePlatform":"SWT","appId":"launcher"}}}"#;

        insta::assert_snapshot!(rendered(PresenceStatus::Away, payload), @r"
        status: away
        session: <not in a match>
          status text: Battle Royale Lobby - 2 / 4
          playing: false, joinable: true, voice: false
          party: 2/4
          party id: p-1
          platform: Switch (SWT)
          application: Launcher (launcher)
        ");
    }

    #[test]
    fn offline_hides_session() {
        let payload = r#"{"SessionId":"m","Status":"x","bIsPlaying":true,"bIsJoinable":false,"bHasVoiceSupport":false}"#;

        insta::assert_snapshot!(rendered(PresenceStatus::Offline, payload), @r"
        status: offline
        session: none
        ");
    }

    #[test]
    fn away_flag_conflicts_with_unavailable() {
        let result = Args::try_parse_from(["partyline-inspect", "--away", "--unavailable"]);
        assert!(result.is_err());
    }

    #[test]
    fn flags_map_to_status() {
        let args = Args::try_parse_from(["partyline-inspect", "--away"]).unwrap();
        assert_eq!(
            PresenceStatus::from_availability(!args.unavailable, args.away),
            PresenceStatus::Away
        );
    }
}
