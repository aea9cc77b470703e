//! Application constants and Android backup container layout.

/// Minimum length of a crypt12 container in bytes.
pub const CRYPT12_MIN_LEN: usize = 67;

/// Minimum length of a crypt14 container in bytes.
pub const CRYPT14_MIN_LEN: usize = 191;

/// Minimum length of a crypt15 container in bytes.
pub const CRYPT15_MIN_LEN: usize = 131;

/// Exact length of a crypt12/14 Android key file.
pub const KEY_FILE_LEN: usize = 158;

/// Offset of the AES key within a key file (runs to the end of the file).
pub const KEY_FILE_AES_OFFSET: usize = 126;

/// Offset of the signature region within a key file.
pub const KEY_FILE_SIG_OFFSET: usize = 30;

/// Length of the key/backup signature region.
pub const SIGNATURE_LEN: usize = 32;

/// Offset of the signature region within a crypt14 container.
pub const CRYPT14_SIG_OFFSET: usize = 15;

/// Offset of the signature region within a crypt12 container.
pub const CRYPT12_SIG_OFFSET: usize = 3;

/// IV offset within a crypt12 container.
pub const CRYPT12_IV_OFFSET: usize = 51;

/// Ciphertext offset within a crypt12 container.
pub const CRYPT12_CT_OFFSET: usize = 67;

/// Fixed trailer length excluded from the crypt12 ciphertext view.
pub const CRYPT12_TRAILER_LEN: usize = 20;

/// IV offset within a crypt15 message database.
pub const CRYPT15_MESSAGE_IV_OFFSET: usize = 8;

/// IV offset within a crypt15 contact database.
pub const CRYPT15_CONTACT_IV_OFFSET: usize = 7;

/// Ciphertext offset increment past the header-length prefix (message database).
pub const CRYPT15_MESSAGE_CT_INCREMENT: usize = 2;

/// Ciphertext offset increment past the header-length prefix (contact database).
pub const CRYPT15_CONTACT_CT_INCREMENT: usize = 1;

/// AES-256 key length.
pub const AES_KEY_LEN: usize = 32;

/// GCM IV length used by all backup containers.
pub const GCM_IV_LEN: usize = 16;

/// Domain-separation context for crypt15 key derivation.
pub const BACKUP_KDF_CONTEXT: &[u8] = b"backup encryption\x01";

/// Magic prefix of a SQLite database, compared case-insensitively.
pub const SQLITE_MAGIC: &[u8] = b"SQLITE";

/// Default IV offset bound for brute-force offset search.
pub const DEFAULT_MAX_IV: usize = 200;

/// Default database offset bound for brute-force offset search.
pub const DEFAULT_MAX_DB: usize = 200;

/// Default worker count for brute-force offset search.
pub const DEFAULT_BRUTE_WORKERS: usize = 10;
