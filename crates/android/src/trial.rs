//! Single-candidate trial decryption.
//!
//! A trial is one AES-256-GCM decrypt, one zlib inflate, and one SQLite
//! magic check. A wrong (IV, ciphertext) candidate can fail at any of the
//! three stages depending on the container version, so the stages are
//! deliberately not distinguished: every failure is "wrong candidate".

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::Aead;
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, KeyInit, Nonce};
use flate2::read::ZlibDecoder;
use std::io::Read;
use wabex_core::constants::{AES_KEY_LEN, GCM_IV_LEN, SQLITE_MAGIC};

/// AES-256-GCM with the 16-byte IV the backup containers use.
///
/// The GCM tag is the tail of the ciphertext region, so the combined
/// decrypt-and-authenticate call consumes the region as-is.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Attempt one decrypt + inflate + magic check.
///
/// Returns the recovered SQLite database on success and `None` for a wrong
/// candidate. Input sizes are enforced by the signature; nothing else can
/// escape the trial boundary.
pub fn try_decrypt(
    ciphertext: &[u8],
    key: &[u8; AES_KEY_LEN],
    iv: &[u8; GCM_IV_LEN],
) -> Option<Vec<u8>> {
    let cipher = Aes256Gcm16::new(key.into());
    let nonce = Nonce::from_slice(iv);
    let compressed = cipher.decrypt(nonce, ciphertext).ok()?;

    let mut db = Vec::new();
    let mut decoder = ZlibDecoder::new(compressed.as_slice());
    decoder.read_to_end(&mut db).ok()?;

    if db.len() >= SQLITE_MAGIC.len() && db[..SQLITE_MAGIC.len()].eq_ignore_ascii_case(SQLITE_MAGIC)
    {
        Some(db)
    } else {
        None
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    /// A plausible SQLite header followed by incompressible filler, so the
    /// ciphertext stays longer than every container minimum length.
    pub fn fake_sqlite_db() -> Vec<u8> {
        let mut db = b"SQLite format 3\0".to_vec();
        let mut state = 0x02F6_E2B1u32;
        db.extend((0..512).map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        }));
        db
    }

    /// Compress and encrypt a payload the way a backup container stores it.
    pub fn encrypt_payload(payload: &[u8], key: &[u8; 32], iv: &[u8; 16]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload).expect("compress");
        let compressed = encoder.finish().expect("compress");

        let cipher = Aes256Gcm16::new(key.into());
        let nonce = Nonce::from_slice(iv);
        cipher
            .encrypt(nonce, compressed.as_slice())
            .expect("encrypt")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{encrypt_payload, fake_sqlite_db};
    use super::*;

    #[test]
    fn test_try_decrypt_recovers_sqlite_payload() {
        let key = [7u8; 32];
        let iv = [3u8; 16];
        let db = fake_sqlite_db();
        let ciphertext = encrypt_payload(&db, &key, &iv);

        let recovered = try_decrypt(&ciphertext, &key, &iv).expect("valid candidate");
        assert_eq!(recovered, db);
    }

    #[test]
    fn test_try_decrypt_rejects_wrong_key() {
        let key = [7u8; 32];
        let iv = [3u8; 16];
        let ciphertext = encrypt_payload(&fake_sqlite_db(), &key, &iv);

        assert!(try_decrypt(&ciphertext, &[8u8; 32], &iv).is_none());
    }

    #[test]
    fn test_try_decrypt_rejects_wrong_iv() {
        let key = [7u8; 32];
        let iv = [3u8; 16];
        let ciphertext = encrypt_payload(&fake_sqlite_db(), &key, &iv);

        assert!(try_decrypt(&ciphertext, &key, &[4u8; 16]).is_none());
    }

    #[test]
    fn test_try_decrypt_rejects_non_sqlite_plaintext() {
        let key = [7u8; 32];
        let iv = [3u8; 16];
        let ciphertext = encrypt_payload(b"PGDUMP but not sqlite", &key, &iv);

        assert!(try_decrypt(&ciphertext, &key, &iv).is_none());
    }

    #[test]
    fn test_try_decrypt_accepts_lowercase_magic() {
        let key = [7u8; 32];
        let iv = [3u8; 16];
        let ciphertext = encrypt_payload(b"sqlite format 3\0", &key, &iv);

        assert!(try_decrypt(&ciphertext, &key, &iv).is_some());
    }

    #[test]
    fn test_try_decrypt_rejects_truncated_ciphertext() {
        let key = [7u8; 32];
        let iv = [3u8; 16];

        assert!(try_decrypt(&[], &key, &iv).is_none());
        assert!(try_decrypt(&[0x41; 7], &key, &iv).is_none());
    }
}
