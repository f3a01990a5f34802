//! Fuzz target for transport addresses and local-part escaping
//!
//! # Invariants
//!
//! - NEVER panic on any input string
//! - `unescape_local(escape_local(id)) == id` for every account id
//! - Every non-empty escaped account id forms a valid bare address whose
//!   `account_id()` is the original id
//! - A parsed address displays back to a string that parses to the same
//!   address

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use partyline_proto::{
    address::{escape_local, unescape_local},
    Address,
};

#[derive(Debug, Arbitrary)]
enum FuzzInput {
    Parse(String),
    Account { account_id: String, domain: String },
    Unescape(String),
}

fuzz_target!(|input: FuzzInput| {
    match input {
        FuzzInput::Parse(text) => {
            if let Ok(address) = Address::parse(&text) {
                let shown = address.to_string();
                assert_eq!(Address::parse(&shown).ok(), Some(address), "display round trip");
            }
        },
        FuzzInput::Account { account_id, domain } => {
            assert_eq!(unescape_local(&escape_local(&account_id)), account_id);

            let unrepresentable = account_id.chars().any(|c| c.is_whitespace() && c != ' ');
            if unrepresentable || account_id.is_empty() || domain.is_empty() {
                return;
            }
            let address = Address::for_account(&account_id, &domain).expect("escaped id is valid");
            assert_eq!(address.account_id(), Some(account_id));
        },
        FuzzInput::Unescape(local) => {
            let _ = unescape_local(&local);
        },
    }
});
