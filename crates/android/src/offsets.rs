//! Known-good crypt14 container offsets.

/// One (IV start, ciphertext start) pair within a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetPair {
    /// Byte offset of the 16-byte GCM IV.
    pub iv: usize,
    /// Byte offset of the ciphertext region.
    pub db: usize,
}

/// Offset pairs observed across historical crypt14 versions.
///
/// Tried strictly in order; the earliest entries are the most common, so a
/// hit here avoids the brute-force fallback entirely.
pub const CRYPT14_OFFSETS: [OffsetPair; 6] = [
    OffsetPair { iv: 67, db: 191 },
    OffsetPair { iv: 67, db: 190 },
    OffsetPair { iv: 66, db: 99 },
    OffsetPair { iv: 67, db: 193 },
    OffsetPair { iv: 67, db: 194 },
    OffsetPair { iv: 67, db: 158 },
];
