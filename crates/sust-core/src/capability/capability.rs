//! Capability identifiers
//!
//! Host-level permissions a program needs before the engine touches
//! anything outside its own memory.

use std::fmt;
use std::str::FromStr;

/// Capability identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `OPEN_FILE_IN`
    FileRead,
    /// `OPEN_FILE_OUT`
    FileWrite,
    /// `OPEN_TCP_CONNECTION`, `OPEN_TCP_LISTENER`
    Network,
    /// `NEW_THREAD`
    Threads,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::FileRead,
        Capability::FileWrite,
        Capability::Network,
        Capability::Threads,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::FileRead => "file-read",
            Capability::FileWrite => "file-write",
            Capability::Network => "network",
            Capability::Threads => "threads",
        })
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|cap| cap.to_string() == name)
            .ok_or_else(|| format!("unknown capability `{}`", name))
    }
}
