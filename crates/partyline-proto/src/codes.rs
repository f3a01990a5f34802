//! Wire code tables for platforms and client applications.
//!
//! Friends advertise where they are signed in through short codes inside the
//! party join info of their status payload. Lookups are exact and
//! case-sensitive. An unknown code resolves to `None`: new platforms ship with
//! game updates long before this table learns about them.

use std::fmt;

/// Platform a friend is signed in from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    /// Xbox Live.
    Xbox,
    /// PlayStation Network.
    PlayStation,
    /// Windows PC.
    Windows,
    /// macOS.
    MacOs,
    /// Android devices.
    Android,
    /// iOS devices.
    Ios,
    /// Nintendo Switch.
    Switch,
}

impl Platform {
    /// Every platform, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Xbox,
        Self::PlayStation,
        Self::Windows,
        Self::MacOs,
        Self::Android,
        Self::Ios,
        Self::Switch,
    ];

    /// Short wire code for this platform.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Xbox => "XBL",
            Self::PlayStation => "PSN",
            Self::Windows => "WIN",
            Self::MacOs => "MAC",
            Self::Android => "AND",
            Self::Ios => "IOS",
            Self::Switch => "SWT",
        }
    }

    /// Resolve a wire code. `None` when the code is not in the table.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|platform| platform.code() == code)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Client application a friend is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Application {
    /// The desktop launcher.
    Launcher,
    /// The game client itself.
    GameClient,
}

impl Application {
    /// Every application, in declaration order.
    pub const ALL: [Self; 2] = [Self::Launcher, Self::GameClient];

    /// Wire code for this application.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Launcher => "launcher",
            Self::GameClient => "Fortnite",
        }
    }

    /// Resolve a wire code. `None` when the code is not in the table.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|application| application.code() == code)
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
