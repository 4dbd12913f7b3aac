//! Key storage for the reference crypto provider.
//!
//! ## Methods
//! - **inline**: the key is derived from the configured passphrase with
//!   PBKDF2-HMAC-SHA256 and a fixed salt.
//! - **local**: the raw key is kept base64-encoded in a local file. A missing
//!   file is created with a fresh random key on first use.

use crate::base::cookieerror::CryptoError;
use crate::cookies::config::EncryptionConfig;
use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use sha2::Sha256;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;
use zeroize::Zeroizing;

const KDF_SALT: &[u8] = b"cookiestash";
const KDF_ITERATIONS: u32 = 10_000;

/// Where the encryption key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStorageMethod {
    #[default]
    #[serde(alias = "passphrase")]
    Inline,
    #[serde(alias = "file")]
    Local,
}

/// Resolve the key for `config`, `key_len` bytes long.
pub fn load_key(config: &EncryptionConfig, key_len: usize) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    match config.store_method {
        KeyStorageMethod::Inline => {
            let passphrase = config
                .key
                .as_deref()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| CryptoError::InvalidKey("no passphrase configured".into()))?;
            derive_key(passphrase.as_bytes(), key_len)
        }
        KeyStorageMethod::Local => {
            let path = config
                .key_file
                .as_deref()
                .ok_or_else(|| CryptoError::InvalidKey("no key file configured".into()))?;
            load_or_create_key_file(path, key_len)
        }
    }
}

/// Derive a key of `key_len` bytes from a passphrase using PBKDF2-HMAC-SHA256.
pub fn derive_key(passphrase: &[u8], key_len: usize) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if key_len == 0 {
        return Err(CryptoError::InvalidKey("cannot derive an empty key".into()));
    }
    let mut key = Zeroizing::new(vec![0u8; key_len]);
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase, KDF_SALT, KDF_ITERATIONS, &mut key);
    Ok(key)
}

fn load_or_create_key_file(path: &Path, key_len: usize) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    match read_key_file(path, key_len) {
        Err(CryptoError::KeyStorage(_)) if !path.exists() => {}
        other => return other,
    }

    let mut key = Zeroizing::new(vec![0u8; key_len]);
    OsRng.fill_bytes(&mut key);
    let encoded = Zeroizing::new(STANDARD.encode(key.as_slice()));

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    match options.open(path) {
        Ok(mut file) => {
            file.write_all(encoded.as_bytes())
                .map_err(|e| CryptoError::KeyStorage(format!("{}: {}", path.display(), e)))?;
            tracing::info!(path = %path.display(), "generated new cookie encryption key");
            Ok(key)
        }
        // Another process created it first.
        Err(e) if e.kind() == ErrorKind::AlreadyExists => read_key_file(path, key_len),
        Err(e) => Err(CryptoError::KeyStorage(format!("{}: {}", path.display(), e))),
    }
}

fn read_key_file(path: &Path, key_len: usize) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let content = Zeroizing::new(
        std::fs::read_to_string(path)
            .map_err(|e| CryptoError::KeyStorage(format!("{}: {}", path.display(), e)))?,
    );

    let key = Zeroizing::new(STANDARD.decode(content.trim()).map_err(|_| {
        CryptoError::KeyStorage(format!("{}: invalid base64", path.display()))
    })?);

    if key.len() != key_len {
        return Err(CryptoError::KeyStorage(format!(
            "{}: expected a {}-byte key, found {}",
            path.display(),
            key_len,
            key.len()
        )));
    }

    Ok(key)
}
