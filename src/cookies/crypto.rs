//! Cookie payload encryption.
//!
//! [`CryptoProvider`] is the seam the store encrypts through. [`AesGcmCrypto`]
//! is the reference provider, built from an
//! [`EncryptionConfig`](crate::cookies::config::EncryptionConfig).
//!
//! ## Sealed value layout (v1)
//! - Prefix: `v1.` (3 bytes)
//! - Body: base64url (unpadded) of nonce (12 bytes) ‖ ciphertext ‖ tag (16 bytes)
//! - Algorithm: AES-128-GCM or AES-256-GCM
//!
//! The plaintext is the mapping encoded with the format hint.

use crate::base::cookieerror::CryptoError;
use crate::cookies::config::EncryptionConfig;
use crate::cookies::format::{CookieMapping, Format};
use crate::cookies::keystore;
use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use std::fmt;
use zeroize::Zeroizing;

/// Version prefix of sealed values.
pub const V1_PREFIX: &str = "v1.";

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Encrypts and decrypts cookie mappings.
///
/// `decrypt` must fail on tampered, truncated or wrong-key input; it must
/// never return a partial mapping.
pub trait CryptoProvider: Send + Sync {
    fn encrypt(&self, mapping: &CookieMapping, format: Format) -> Result<String, CryptoError>;
    fn decrypt(&self, sealed: &str, format: Format) -> Result<CookieMapping, CryptoError>;
}

/// Supported AEAD ciphers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cipher {
    Aes128Gcm,
    Aes256Gcm,
}

impl Cipher {
    /// Parse a cipher name such as `AES-256-GCM`.
    pub fn parse(name: &str) -> Result<Self, CryptoError> {
        let normalized: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "aes128gcm" => Ok(Cipher::Aes128Gcm),
            "aes256gcm" => Ok(Cipher::Aes256Gcm),
            _ => Err(CryptoError::UnsupportedCipher(name.to_string())),
        }
    }

    pub fn key_len(&self) -> usize {
        match self {
            Cipher::Aes128Gcm => 16,
            Cipher::Aes256Gcm => 32,
        }
    }
}

/// AES-GCM provider with a fixed key.
pub struct AesGcmCrypto {
    cipher: Cipher,
    key: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for AesGcmCrypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesGcmCrypto")
            .field("cipher", &self.cipher)
            .finish_non_exhaustive()
    }
}

impl AesGcmCrypto {
    /// Build a provider from encryption parameters, loading or creating the key.
    pub fn from_config(config: &EncryptionConfig) -> Result<Self, CryptoError> {
        let cipher = Cipher::parse(&config.cipher)?;
        let key = keystore::load_key(config, cipher.key_len())?;
        Ok(Self { cipher, key })
    }

    /// Build a provider from raw key bytes.
    pub fn with_key(cipher: Cipher, key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != cipher.key_len() {
            return Err(CryptoError::InvalidKey(format!(
                "expected {} bytes, got {}",
                cipher.key_len(),
                key.len()
            )));
        }
        Ok(Self {
            cipher,
            key: Zeroizing::new(key.to_vec()),
        })
    }

    pub fn cipher(&self) -> Cipher {
        self.cipher
    }

    /// Seal raw bytes into a `v1.` value.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = match self.cipher {
            Cipher::Aes128Gcm => Aes128Gcm::new_from_slice(&self.key)
                .map_err(|_| CryptoError::InvalidKey("wrong key length".into()))?
                .encrypt(nonce, plaintext),
            Cipher::Aes256Gcm => Aes256Gcm::new_from_slice(&self.key)
                .map_err(|_| CryptoError::InvalidKey("wrong key length".into()))?
                .encrypt(nonce, plaintext),
        }
        .map_err(|_| CryptoError::Encryption)?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(format!("{}{}", V1_PREFIX, URL_SAFE_NO_PAD.encode(&combined)))
    }

    /// Open a `v1.` value back into raw bytes.
    pub fn open(&self, sealed: &str) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let body = sealed
            .strip_prefix(V1_PREFIX)
            .ok_or(CryptoError::UnsupportedVersion)?;

        let combined = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| CryptoError::Malformed("invalid base64".into()))?;

        if combined.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::Malformed("data too short".into()));
        }

        let nonce = Nonce::from_slice(&combined[..NONCE_LEN]);
        let ciphertext = &combined[NONCE_LEN..];

        let plaintext = match self.cipher {
            Cipher::Aes128Gcm => Aes128Gcm::new_from_slice(&self.key)
                .map_err(|_| CryptoError::InvalidKey("wrong key length".into()))?
                .decrypt(nonce, ciphertext),
            Cipher::Aes256Gcm => Aes256Gcm::new_from_slice(&self.key)
                .map_err(|_| CryptoError::InvalidKey("wrong key length".into()))?
                .decrypt(nonce, ciphertext),
        }
        .map_err(|_| CryptoError::Tampered)?;

        Ok(Zeroizing::new(plaintext))
    }
}

impl CryptoProvider for AesGcmCrypto {
    fn encrypt(&self, mapping: &CookieMapping, format: Format) -> Result<String, CryptoError> {
        let plaintext = Zeroizing::new(
            format
                .encode_bytes(mapping)
                .map_err(|e| CryptoError::InvalidPayload(e.to_string()))?,
        );
        self.seal(&plaintext)
    }

    fn decrypt(&self, sealed: &str, format: Format) -> Result<CookieMapping, CryptoError> {
        let plaintext = self.open(sealed)?;
        format
            .decode_bytes(&plaintext)
            .map_err(|e| CryptoError::InvalidPayload(e.to_string()))
    }
}
