//! Transport addresses.
//!
//! An address has the shape `local@domain/resource`. Only the domain is
//! mandatory. Friends are identified by the local part of their bare address
//! (`local@domain`); the resource names one of their connected devices and is
//! ignored for identity.
//!
//! Local parts travel in escaped form (XEP-0106) so that account ids
//! containing characters such as `@` or space remain representable.
//! [`Address::account_id`] undoes the escaping and [`Address::for_account`]
//! applies it.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Characters that are never valid in an escaped local part.
const FORBIDDEN_LOCAL_CHARS: &[char] = &['"', '&', '\'', '/', ':', '<', '>', '@'];

/// Errors from parsing or building an [`Address`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The input was empty.
    #[error("address is empty")]
    Empty,

    /// An `@` was present but nothing preceded it.
    #[error("local part is empty")]
    EmptyLocalPart,

    /// The domain part was empty.
    #[error("domain is empty")]
    EmptyDomain,

    /// A `/` was present but nothing followed it.
    #[error("resource is empty")]
    EmptyResource,

    /// The local part contained a character that must be escaped.
    #[error("invalid local part: {local:?}")]
    InvalidLocalPart {
        /// The offending local part.
        local: String,
    },
}

/// A transport address, `local@domain/resource`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    local: Option<String>,
    domain: String,
    resource: Option<String>,
}

impl Address {
    /// Parse `local@domain/resource`, where `local@` and `/resource` are
    /// optional. The local part must already be escaped.
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        if input.is_empty() {
            return Err(AddressError::Empty);
        }

        let (head, resource) = match input.split_once('/') {
            Some((_, "")) => return Err(AddressError::EmptyResource),
            Some((head, resource)) => (head, Some(resource.to_string())),
            None => (input, None),
        };

        let (local, domain) = match head.split_once('@') {
            Some(("", _)) => return Err(AddressError::EmptyLocalPart),
            Some((local, domain)) => (Some(validate_local(local)?), domain),
            None => (None, head),
        };

        if domain.is_empty() {
            return Err(AddressError::EmptyDomain);
        }

        Ok(Self { local, domain: domain.to_string(), resource })
    }

    /// Bare address from an already escaped local part and a domain.
    pub fn bare(local: &str, domain: &str) -> Result<Self, AddressError> {
        if local.is_empty() {
            return Err(AddressError::EmptyLocalPart);
        }
        if domain.is_empty() {
            return Err(AddressError::EmptyDomain);
        }

        Ok(Self { local: Some(validate_local(local)?), domain: domain.to_string(), resource: None })
    }

    /// Bare address for an account id, escaping it into a local part.
    pub fn for_account(account_id: &str, domain: &str) -> Result<Self, AddressError> {
        Self::bare(&escape_local(account_id), domain)
    }

    /// Same address with the given resource.
    #[must_use]
    pub fn with_resource(mut self, resource: &str) -> Self {
        self.resource = (!resource.is_empty()).then(|| resource.to_string());
        self
    }

    /// Escaped local part, if any.
    pub fn local_part(&self) -> Option<&str> {
        self.local.as_deref()
    }

    /// Account id carried by this address: the unescaped local part.
    pub fn account_id(&self) -> Option<String> {
        self.local.as_deref().map(unescape_local)
    }

    /// Domain part.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Resource part, if any.
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// This address without its resource.
    #[must_use]
    pub fn to_bare(&self) -> Self {
        Self { local: self.local.clone(), domain: self.domain.clone(), resource: None }
    }

    /// True when the address carries no resource.
    pub fn is_bare(&self) -> bool {
        self.resource.is_none()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(local) = &self.local {
            write!(f, "{local}@")?;
        }
        f.write_str(&self.domain)?;
        if let Some(resource) = &self.resource {
            write!(f, "/{resource}")?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn validate_local(local: &str) -> Result<String, AddressError> {
    if local.contains(FORBIDDEN_LOCAL_CHARS) || local.contains(char::is_whitespace) {
        return Err(AddressError::InvalidLocalPart { local: local.to_string() });
    }
    Ok(local.to_string())
}

/// Escape an account id into a local part (XEP-0106).
///
/// Every backslash is escaped, so escaping is always reversible by
/// [`unescape_local`]. Whitespace other than space stays as-is and is later
/// rejected as a local part.
pub fn escape_local(account_id: &str) -> String {
    let mut escaped = String::with_capacity(account_id.len());
    for c in account_id.chars() {
        match c {
            '"' => escaped.push_str("\\22"),
            '&' => escaped.push_str("\\26"),
            '\'' => escaped.push_str("\\27"),
            '/' => escaped.push_str("\\2f"),
            ':' => escaped.push_str("\\3a"),
            '<' => escaped.push_str("\\3c"),
            '>' => escaped.push_str("\\3e"),
            '@' => escaped.push_str("\\40"),
            '\\' => escaped.push_str("\\5c"),
            ' ' => escaped.push_str("\\20"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Undo [`escape_local`]. Backslashes not followed by a known escape sequence
/// are kept as-is.
pub fn unescape_local(local: &str) -> String {
    let mut unescaped = String::with_capacity(local.len());
    let mut rest = local;

    while let Some(pos) = rest.find('\\') {
        unescaped.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        match tail.get(1..3).and_then(unescaped_char) {
            Some(c) => {
                unescaped.push(c);
                rest = &tail[3..];
            },
            None => {
                unescaped.push('\\');
                rest = &tail[1..];
            },
        }
    }

    unescaped.push_str(rest);
    unescaped
}

fn unescaped_char(code: &str) -> Option<char> {
    match code {
        "20" => Some(' '),
        "22" => Some('"'),
        "26" => Some('&'),
        "27" => Some('\''),
        "2f" => Some('/'),
        "3a" => Some(':'),
        "3c" => Some('<'),
        "3e" => Some('>'),
        "40" => Some('@'),
        "5c" => Some('\\'),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_address() {
        let address = Address::parse("abc123@prod.example.net/V2:launcher:WIN::1F2E").unwrap();

        assert_eq!(address.local_part(), Some("abc123"));
        assert_eq!(address.domain(), "prod.example.net");
        assert_eq!(address.resource(), Some("V2:launcher:WIN::1F2E"));
        assert!(!address.is_bare());
    }

    #[test]
    fn parse_domain_only() {
        let address = Address::parse("prod.example.net").unwrap();

        assert_eq!(address.local_part(), None);
        assert_eq!(address.account_id(), None);
        assert!(address.is_bare());
    }

    #[test]
    fn resource_may_contain_at_and_slash() {
        let address = Address::parse("a@d/res@x/y").unwrap();

        assert_eq!(address.local_part(), Some("a"));
        assert_eq!(address.resource(), Some("res@x/y"));
    }

    #[test]
    fn parse_rejects_empty_parts() {
        assert_eq!(Address::parse(""), Err(AddressError::Empty));
        assert_eq!(Address::parse("@d"), Err(AddressError::EmptyLocalPart));
        assert_eq!(Address::parse("a@"), Err(AddressError::EmptyDomain));
        assert_eq!(Address::parse("a@d/"), Err(AddressError::EmptyResource));
    }

    #[test]
    fn parse_rejects_unescaped_local() {
        assert!(matches!(Address::parse("a b@d"), Err(AddressError::InvalidLocalPart { .. })));
        assert!(matches!(Address::parse("a:b@d"), Err(AddressError::InvalidLocalPart { .. })));
    }

    #[test]
    fn display_round_trips() {
        for input in ["d", "a@d", "a@d/r", "d/r"] {
            assert_eq!(Address::parse(input).unwrap().to_string(), input);
        }
    }

    #[test]
    fn to_bare_drops_resource() {
        let address = Address::parse("a@d/r").unwrap();
        assert_eq!(address.to_bare(), Address::bare("a", "d").unwrap());
    }

    #[test]
    fn for_account_escapes_and_account_id_unescapes() {
        let address = Address::for_account("d'artagnan@home", "d").unwrap();

        assert_eq!(address.local_part(), Some("d\\27artagnan\\40home"));
        assert_eq!(address.account_id().as_deref(), Some("d'artagnan@home"));
    }

    #[test]
    fn for_account_rejects_empty_account() {
        assert_eq!(Address::for_account("", "d"), Err(AddressError::EmptyLocalPart));
    }

    #[test]
    fn unescape_keeps_unknown_sequences() {
        assert_eq!(unescape_local("a\\zzb"), "a\\zzb");
        assert_eq!(unescape_local("trailing\\"), "trailing\\");
        assert_eq!(unescape_local("\\2"), "\\2");
    }

    #[test]
    fn unescape_handles_multibyte_after_backslash() {
        assert_eq!(unescape_local("x\\é1"), "x\\é1");
    }

    #[test]
    fn escape_is_reversible_for_backslashes() {
        let raw = "c:\\5c";
        assert_eq!(unescape_local(&escape_local(raw)), raw);
    }

    #[test]
    fn with_empty_resource_stays_bare() {
        let address = Address::bare("a", "d").unwrap().with_resource("");
        assert!(address.is_bare());
    }
}
