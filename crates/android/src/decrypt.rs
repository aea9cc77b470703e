//! Backup decryption orchestration across crypt12/14/15.

use crate::brute::{BruteForceSearch, CancelToken, ProgressFn};
use crate::error::{AndroidError, AndroidResult};
use crate::key::{self, DerivedKey, KeyMaterial};
use crate::offsets::CRYPT14_OFFSETS;
use crate::trial;
use std::fs;
use std::path::PathBuf;
use wabex_core::constants::{
    AES_KEY_LEN, CRYPT12_CT_OFFSET, CRYPT12_IV_OFFSET, CRYPT12_SIG_OFFSET, CRYPT12_TRAILER_LEN,
    CRYPT14_SIG_OFFSET, CRYPT15_CONTACT_CT_INCREMENT, CRYPT15_CONTACT_IV_OFFSET,
    CRYPT15_MESSAGE_CT_INCREMENT, CRYPT15_MESSAGE_IV_OFFSET, GCM_IV_LEN, SIGNATURE_LEN,
};
use wabex_core::types::{BackupFormat, DbKind};
use wabex_core::ExportConfig;

/// Runtime capabilities queried before any decryption attempt.
///
/// These replace ambient "is the dependency importable" process state with
/// explicit, testable values.
#[derive(Debug, Clone)]
pub struct Capabilities {
    /// Backup cipher and inflate support.
    pub backup_crypto: bool,
    /// Crypt15 serialized key-file deserialization support.
    pub serialized_key_files: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            backup_crypto: true,
            serialized_key_files: true,
        }
    }
}

/// Options controlling one decryption run.
#[derive(Debug, Clone)]
pub struct DecryptOptions {
    /// Which database the container holds (crypt15 only).
    pub db_kind: DbKind,
    /// Return the plaintext in memory without touching the filesystem.
    pub dry_run: bool,
    /// Where to write the decrypted database; required unless `dry_run`.
    pub output_path: Option<PathBuf>,
    /// Log the crypt15 key stream in hex after derivation.
    pub show_key: bool,
}

impl Default for DecryptOptions {
    fn default() -> Self {
        Self {
            db_kind: DbKind::Message,
            dry_run: false,
            output_path: None,
            show_key: false,
        }
    }
}

impl DecryptOptions {
    /// Build per-run options from the exporter configuration.
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            show_key: config.show_crypt15_key,
            ..Self::default()
        }
    }
}

/// Decrypts Android backup containers into plaintext SQLite databases.
///
/// The fixed-offset paths run synchronously; only the crypt14 brute-force
/// fallback fans out to a worker pool.
pub struct BackupDecryptor {
    capabilities: Capabilities,
    search: BruteForceSearch,
    cancel: CancelToken,
    progress: Option<Box<ProgressFn>>,
}

impl Default for BackupDecryptor {
    fn default() -> Self {
        Self::new()
    }
}

impl BackupDecryptor {
    /// Create a decryptor with default capabilities and search bounds.
    pub fn new() -> Self {
        Self {
            capabilities: Capabilities::default(),
            search: BruteForceSearch::default(),
            cancel: CancelToken::new(),
            progress: None,
        }
    }

    /// Create a decryptor from the exporter configuration.
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            capabilities: Capabilities::default(),
            search: BruteForceSearch::new(
                config.max_iv_offset,
                config.max_db_offset,
                config.brute_force_workers,
            ),
            cancel: CancelToken::new(),
            progress: None,
        }
    }

    /// Override the runtime capabilities.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Override the brute-force search configuration.
    pub fn with_search(mut self, search: BruteForceSearch) -> Self {
        self.search = search;
        self
    }

    /// Attach a progress observer for the brute-force fallback.
    pub fn with_progress(
        mut self,
        observer: impl Fn(usize, usize) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Box::new(observer));
        self
    }

    /// Cancellation handle for an in-flight brute-force search.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Decrypt a backup container into plaintext SQLite bytes.
    ///
    /// The plaintext is returned in memory and, unless `options.dry_run` is
    /// set, written to `options.output_path` after it has been fully
    /// validated. No file is ever written for a failed or cancelled run.
    pub fn decrypt(
        &self,
        database: &[u8],
        key_material: &KeyMaterial,
        format: BackupFormat,
        options: &DecryptOptions,
    ) -> AndroidResult<Vec<u8>> {
        if !self.capabilities.backup_crypto {
            return Err(AndroidError::Unsupported(
                "backup decryption support is disabled".to_string(),
            ));
        }
        if !options.dry_run && options.output_path.is_none() {
            return Err(AndroidError::MissingOutputPath);
        }

        // Container shape is checked before any key material is touched.
        if database.len() < format.min_len() {
            return Err(AndroidError::InvalidFileFormat(format!(
                "the {} file must be at least {} bytes",
                format,
                format.min_len()
            )));
        }

        let db = match format {
            BackupFormat::Crypt15 => {
                let derived = self.derive_crypt15_key(key_material)?;
                if options.show_key {
                    tracing::info!(
                        "The HEX key of the crypt15 backup is: {}",
                        derived.hex_groups()
                    );
                }
                self.decrypt_crypt15(database, &derived.aes_key, options.db_kind)?
            }
            BackupFormat::Crypt12 => {
                let (aes_key, signature) = self.split_non_stream_key(key_material)?;
                check_signature(database, &signature, CRYPT12_SIG_OFFSET)?;
                self.decrypt_crypt12(database, &aes_key)?
            }
            BackupFormat::Crypt14 => {
                let (aes_key, signature) = self.split_non_stream_key(key_material)?;
                check_signature(database, &signature, CRYPT14_SIG_OFFSET)?;
                self.decrypt_crypt14(database, &aes_key)?
            }
        };

        if !options.dry_run {
            // Checked above; written only once the plaintext is validated.
            let path = options
                .output_path
                .as_ref()
                .ok_or(AndroidError::MissingOutputPath)?;
            fs::write(path, &db)?;
            tracing::debug!(path = %path.display(), "wrote decrypted database");
        }

        Ok(db)
    }

    fn derive_crypt15_key(&self, key_material: &KeyMaterial) -> AndroidResult<DerivedKey> {
        match key_material {
            KeyMaterial::KeyStream(stream) => key::derive_main_key(stream),
            KeyMaterial::SerializedKeyFile(blob) => {
                if !self.capabilities.serialized_key_files {
                    return Err(AndroidError::Unsupported(
                        "serialized key-file support is disabled".to_string(),
                    ));
                }
                key::extract_serialized_key(blob)
            }
            KeyMaterial::KeyFile(_) => Err(AndroidError::InvalidKey(
                "crypt15 requires a key stream or serialized key file".to_string(),
            )),
        }
    }

    fn split_non_stream_key(
        &self,
        key_material: &KeyMaterial,
    ) -> AndroidResult<([u8; AES_KEY_LEN], [u8; SIGNATURE_LEN])> {
        match key_material {
            KeyMaterial::KeyFile(bytes) => key::split_key_file(bytes),
            _ => Err(AndroidError::InvalidKey(
                "crypt12/14 requires a 158-byte key file".to_string(),
            )),
        }
    }

    fn decrypt_crypt12(
        &self,
        database: &[u8],
        aes_key: &[u8; AES_KEY_LEN],
    ) -> AndroidResult<Vec<u8>> {
        let iv: &[u8; GCM_IV_LEN] = database[CRYPT12_IV_OFFSET..CRYPT12_IV_OFFSET + GCM_IV_LEN]
            .try_into()
            .map_err(|_| {
                AndroidError::InvalidFileFormat("crypt12 IV region out of range".to_string())
            })?;
        let ciphertext = database
            .len()
            .checked_sub(CRYPT12_TRAILER_LEN)
            .and_then(|end| database.get(CRYPT12_CT_OFFSET..end))
            .ok_or_else(|| {
                AndroidError::InvalidFileFormat("crypt12 ciphertext region out of range".to_string())
            })?;

        trial::try_decrypt(ciphertext, aes_key, iv).ok_or_else(wrong_key)
    }

    fn decrypt_crypt15(
        &self,
        database: &[u8],
        aes_key: &[u8; AES_KEY_LEN],
        db_kind: DbKind,
    ) -> AndroidResult<Vec<u8>> {
        let (iv_offset, ct_increment) = match db_kind {
            DbKind::Message => (CRYPT15_MESSAGE_IV_OFFSET, CRYPT15_MESSAGE_CT_INCREMENT),
            DbKind::Contact => (CRYPT15_CONTACT_IV_OFFSET, CRYPT15_CONTACT_CT_INCREMENT),
        };

        let iv: &[u8; GCM_IV_LEN] = database[iv_offset..iv_offset + GCM_IV_LEN]
            .try_into()
            .map_err(|_| {
                AndroidError::InvalidFileFormat("crypt15 IV region out of range".to_string())
            })?;

        // database[0] records the length of a leading protobuf header.
        let ct_offset = database[0] as usize + ct_increment;
        let ciphertext = database.get(ct_offset..).ok_or_else(|| {
            AndroidError::InvalidFileFormat("crypt15 ciphertext offset outside container".to_string())
        })?;

        trial::try_decrypt(ciphertext, aes_key, iv).ok_or_else(wrong_key)
    }

    fn decrypt_crypt14(
        &self,
        database: &[u8],
        aes_key: &[u8; AES_KEY_LEN],
    ) -> AndroidResult<Vec<u8>> {
        for pair in CRYPT14_OFFSETS {
            let iv_end = pair.iv + GCM_IV_LEN;
            if iv_end > database.len() || pair.db >= database.len() {
                continue;
            }
            let iv: &[u8; GCM_IV_LEN] = match database[pair.iv..iv_end].try_into() {
                Ok(iv) => iv,
                Err(_) => continue,
            };
            if let Some(db) = trial::try_decrypt(&database[pair.db..], aes_key, iv) {
                tracing::debug!(
                    iv = pair.iv,
                    db = pair.db,
                    "decryption successful with known offsets"
                );
                return Ok(db);
            }
        }

        tracing::info!("Common offsets failed. Initiating brute-force offset search");
        let (db, _pair) =
            self.search
                .search(database, aes_key, &self.cancel, self.progress.as_deref())?;
        Ok(db)
    }
}

fn check_signature(
    database: &[u8],
    signature: &[u8; SIGNATURE_LEN],
    offset: usize,
) -> AndroidResult<()> {
    if &database[offset..offset + SIGNATURE_LEN] != signature {
        return Err(AndroidError::SignatureMismatch);
    }
    Ok(())
}

fn wrong_key() -> AndroidError {
    AndroidError::Decryption(
        "the plaintext is not a SQLite database; ensure you are using the correct key".to_string(),
    )
}
