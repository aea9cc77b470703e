//! Shared domain types for the Wabex exporter crates.

use crate::constants::{CRYPT12_MIN_LEN, CRYPT14_MIN_LEN, CRYPT15_MIN_LEN};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Android backup container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackupFormat {
    /// Legacy crypt12 container with a structurally fixed layout.
    Crypt12,

    /// crypt14 container whose internal offsets drifted across versions.
    Crypt14,

    /// crypt15 container encrypted with a derived 64-digit key.
    Crypt15,
}

impl BackupFormat {
    /// Minimum container length for this format, in bytes.
    pub fn min_len(&self) -> usize {
        match self {
            Self::Crypt12 => CRYPT12_MIN_LEN,
            Self::Crypt14 => CRYPT14_MIN_LEN,
            Self::Crypt15 => CRYPT15_MIN_LEN,
        }
    }

    /// Guess the container format from a backup file name.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.contains("crypt12") {
            Some(Self::Crypt12)
        } else if name.contains("crypt14") {
            Some(Self::Crypt14)
        } else if name.contains("crypt15") {
            Some(Self::Crypt15)
        } else {
            None
        }
    }
}

impl fmt::Display for BackupFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crypt12 => write!(f, "crypt12"),
            Self::Crypt14 => write!(f, "crypt14"),
            Self::Crypt15 => write!(f, "crypt15"),
        }
    }
}

/// Which database a backup holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DbKind {
    /// The message database (msgstore).
    Message,

    /// The contact database (wa).
    Contact,
}
