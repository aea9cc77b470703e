//! Key material handling and backup AES key derivation.

use crate::error::{AndroidError, AndroidResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use wabex_core::constants::{
    AES_KEY_LEN, BACKUP_KDF_CONTEXT, KEY_FILE_AES_OFFSET, KEY_FILE_LEN, KEY_FILE_SIG_OFFSET,
    SIGNATURE_LEN,
};

type HmacSha256 = Hmac<Sha256>;

/// Raw key input for one decryption run.
///
/// Key material is read once at decryption start and never persisted; the
/// derived AES key lives only for the duration of the call.
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    /// 158-byte Android key file (crypt12/14).
    KeyFile(Vec<u8>),

    /// 32-byte raw key stream (crypt15).
    KeyStream(Vec<u8>),

    /// Java-serialized key object holding the key stream (crypt15).
    SerializedKeyFile(Vec<u8>),
}

/// AES key derived from key material, plus the stream it came from.
///
/// The key stream is retained only so crypt15 runs can display it to the
/// user in hex form.
#[derive(Debug, Clone)]
pub struct DerivedKey {
    /// The 32-byte AES key used to decrypt the container.
    pub aes_key: [u8; AES_KEY_LEN],
    /// The key stream the AES key was derived from.
    pub key_stream: Vec<u8>,
}

impl DerivedKey {
    /// Render the key stream as space-separated groups of four hex digits.
    pub fn hex_groups(&self) -> String {
        let encoded = hex::encode(&self.key_stream);
        encoded
            .as_bytes()
            .chunks(4)
            .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Derive the main encryption key from a crypt15 key stream.
///
/// Two nested HMAC-SHA256 rounds: the inner round keys an all-zero 32-byte
/// key over the stream, the outer round keys the intermediate digest over the
/// fixed `"backup encryption\x01"` context string.
pub fn derive_main_key(key_stream: &[u8]) -> AndroidResult<DerivedKey> {
    let mut inner = HmacSha256::new_from_slice(&[0u8; AES_KEY_LEN])
        .map_err(|e| AndroidError::InvalidKey(e.to_string()))?;
    inner.update(key_stream);
    let intermediate = inner.finalize().into_bytes();

    let mut outer = HmacSha256::new_from_slice(&intermediate)
        .map_err(|e| AndroidError::InvalidKey(e.to_string()))?;
    outer.update(BACKUP_KDF_CONTEXT);

    Ok(DerivedKey {
        aes_key: outer.finalize().into_bytes().into(),
        key_stream: key_stream.to_vec(),
    })
}

/// Derive the main encryption key from a Java-serialized crypt15 key file.
///
/// The key file is one serialized `byte[]`; its payload is the key stream.
pub fn extract_serialized_key(key_file: &[u8]) -> AndroidResult<DerivedKey> {
    let key_stream = java_byte_array(key_file)?;
    derive_main_key(&key_stream)
}

/// Split a crypt12/14 key file into its AES key and signature region.
pub fn split_key_file(
    key_file: &[u8],
) -> AndroidResult<([u8; AES_KEY_LEN], [u8; SIGNATURE_LEN])> {
    if key_file.len() != KEY_FILE_LEN {
        return Err(AndroidError::InvalidKey(format!(
            "the key file must be {} bytes, got {}",
            KEY_FILE_LEN,
            key_file.len()
        )));
    }

    let aes_key: [u8; AES_KEY_LEN] = key_file[KEY_FILE_AES_OFFSET..]
        .try_into()
        .map_err(|_| AndroidError::InvalidKey("truncated AES key region".to_string()))?;
    let signature: [u8; SIGNATURE_LEN] = key_file
        [KEY_FILE_SIG_OFFSET..KEY_FILE_SIG_OFFSET + SIGNATURE_LEN]
        .try_into()
        .map_err(|_| AndroidError::InvalidKey("truncated signature region".to_string()))?;

    Ok((aes_key, signature))
}

// Java Object Serialization Stream constants for a serialized byte[].
const STREAM_MAGIC: [u8; 2] = [0xAC, 0xED];
const STREAM_VERSION: [u8; 2] = [0x00, 0x05];
const TC_ARRAY: u8 = 0x75;
const TC_CLASSDESC: u8 = 0x72;
const TC_ENDBLOCKDATA: u8 = 0x78;
const TC_NULL: u8 = 0x70;

/// Extract the payload of a serialized Java `byte[]`.
fn java_byte_array(blob: &[u8]) -> AndroidResult<Vec<u8>> {
    fn take<'a>(cursor: &mut &'a [u8], n: usize) -> Option<&'a [u8]> {
        if cursor.len() < n {
            return None;
        }
        let (head, rest) = cursor.split_at(n);
        *cursor = rest;
        Some(head)
    }

    let malformed = || AndroidError::InvalidKey("not a serialized Java byte array".to_string());

    let mut cursor = blob;
    if take(&mut cursor, 2).ok_or_else(malformed)? != STREAM_MAGIC {
        return Err(malformed());
    }
    if take(&mut cursor, 2).ok_or_else(malformed)? != STREAM_VERSION {
        return Err(malformed());
    }
    if take(&mut cursor, 1).ok_or_else(malformed)?[0] != TC_ARRAY {
        return Err(malformed());
    }
    if take(&mut cursor, 1).ok_or_else(malformed)?[0] != TC_CLASSDESC {
        return Err(malformed());
    }

    let name_len = take(&mut cursor, 2)
        .and_then(|b| b.try_into().ok())
        .map(u16::from_be_bytes)
        .ok_or_else(malformed)? as usize;
    if take(&mut cursor, name_len).ok_or_else(malformed)? != b"[B" {
        return Err(malformed());
    }

    // serialVersionUID, class flags, field count (zero for a primitive array)
    take(&mut cursor, 8).ok_or_else(malformed)?;
    take(&mut cursor, 1).ok_or_else(malformed)?;
    let field_count = take(&mut cursor, 2)
        .and_then(|b| b.try_into().ok())
        .map(u16::from_be_bytes)
        .ok_or_else(malformed)?;
    if field_count != 0 {
        return Err(malformed());
    }
    if take(&mut cursor, 1).ok_or_else(malformed)?[0] != TC_ENDBLOCKDATA {
        return Err(malformed());
    }
    if take(&mut cursor, 1).ok_or_else(malformed)?[0] != TC_NULL {
        return Err(malformed());
    }

    let payload_len = take(&mut cursor, 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_be_bytes)
        .ok_or_else(malformed)? as usize;
    let payload = take(&mut cursor, payload_len).ok_or_else(malformed)?;

    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serialize a byte slice the way `ObjectOutputStream.writeObject(byte[])` does.
    fn serialize_java_bytes(payload: &[u8]) -> Vec<u8> {
        let mut blob = Vec::new();
        blob.extend_from_slice(&STREAM_MAGIC);
        blob.extend_from_slice(&STREAM_VERSION);
        blob.push(TC_ARRAY);
        blob.push(TC_CLASSDESC);
        blob.extend_from_slice(&2u16.to_be_bytes());
        blob.extend_from_slice(b"[B");
        blob.extend_from_slice(&[0xAC, 0xF3, 0x17, 0xF8, 0x06, 0x08, 0x54, 0xE0]); // serialVersionUID
        blob.push(0x02); // SC_SERIALIZABLE
        blob.extend_from_slice(&0u16.to_be_bytes());
        blob.push(TC_ENDBLOCKDATA);
        blob.push(TC_NULL);
        blob.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        blob.extend_from_slice(payload);
        blob
    }

    #[test]
    fn test_derive_main_key_known_answer() {
        let key_stream: Vec<u8> = (0u8..32).collect();
        let derived = derive_main_key(&key_stream).expect("derivation");
        assert_eq!(
            hex::encode(derived.aes_key),
            "4e54c0777a7214dfdf0af5b6e153acfa2fbdac603fea6fd1630b824e5c29eef5"
        );
        assert_eq!(derived.key_stream, key_stream);
    }

    #[test]
    fn test_derive_main_key_zero_stream_known_answer() {
        let derived = derive_main_key(&[0u8; 32]).expect("derivation");
        assert_eq!(
            hex::encode(derived.aes_key),
            "000cd53075979ccd61531727d933d4c1aa747ff468f65b8bdf89ffa174e7e757"
        );
    }

    #[test]
    fn test_derive_main_key_is_deterministic() {
        let stream = [0x5Au8; 32];
        let first = derive_main_key(&stream).expect("derivation");
        let second = derive_main_key(&stream).expect("derivation");
        assert_eq!(first.aes_key, second.aes_key);
    }

    #[test]
    fn test_extract_serialized_key_matches_stream_derivation() {
        let key_stream: Vec<u8> = (100u8..132).collect();
        let blob = serialize_java_bytes(&key_stream);

        let from_object = extract_serialized_key(&blob).expect("object derivation");
        let from_stream = derive_main_key(&key_stream).expect("stream derivation");
        assert_eq!(from_object.aes_key, from_stream.aes_key);
        assert_eq!(from_object.key_stream, key_stream);
    }

    #[test]
    fn test_extract_serialized_key_rejects_garbage() {
        let err = extract_serialized_key(b"definitely not java").unwrap_err();
        assert!(matches!(err, AndroidError::InvalidKey(_)));
    }

    #[test]
    fn test_split_key_file_rejects_wrong_length() {
        let err = split_key_file(&[0u8; 64]).unwrap_err();
        assert!(matches!(err, AndroidError::InvalidKey(_)));
    }

    #[test]
    fn test_split_key_file_slices() {
        let mut key_file = vec![0u8; KEY_FILE_LEN];
        for (i, byte) in key_file.iter_mut().enumerate() {
            *byte = i as u8;
        }

        let (aes_key, signature) = split_key_file(&key_file).expect("split");
        assert_eq!(aes_key[0], KEY_FILE_AES_OFFSET as u8);
        assert_eq!(signature[0], KEY_FILE_SIG_OFFSET as u8);
        assert_eq!(signature.len(), SIGNATURE_LEN);
    }

    #[test]
    fn test_hex_groups_formatting() {
        let derived = DerivedKey {
            aes_key: [0u8; 32],
            key_stream: vec![0xAB, 0xCD, 0xEF, 0x01],
        };
        assert_eq!(derived.hex_groups(), "abcd ef01");
    }
}
