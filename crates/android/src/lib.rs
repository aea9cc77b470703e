//! Android WhatsApp backup decryption for Wabex.
//!
//! This crate provides functionality for:
//! - Deriving the backup AES key from key files and crypt15 key streams
//! - Decrypting crypt12, crypt14 and crypt15 backup containers
//! - Recovering drifted crypt14 container offsets by parallel brute force
//! - Validating recovered plaintext as a SQLite database before it is returned
//!
//! The decrypted database is an ordinary SQLite file; message extraction and
//! rendering live in the sibling exporter crates.

#![deny(missing_docs)]
#![warn(unsafe_code)]

pub mod brute;
pub mod decrypt;
pub mod error;
pub mod key;
pub mod offsets;
pub mod trial;

pub use brute::{BruteForceSearch, CancelToken};
pub use decrypt::{BackupDecryptor, Capabilities, DecryptOptions};
pub use error::{AndroidError, AndroidResult};
pub use key::{DerivedKey, KeyMaterial};
