use thiserror::Error;

/// Top-level error returned by every [`CookieStore`](crate::cookies::store::CookieStore) operation.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CookieError {
    /// Required configuration missing or inconsistent. Raised at construction.
    #[error("Cookie configuration invalid: {0}")]
    Config(String),
    /// Stored cookie bytes are not a mapping and not a canonical-empty value.
    #[error("Cookie payload could not be decoded: {0}")]
    Transcode(String),
    /// Failure reported by the crypto provider, propagated unchanged.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    /// The new cookie value could not be produced or the host refused it.
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Failures from a [`CryptoProvider`](crate::cookies::crypto::CryptoProvider).
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CryptoError {
    #[error("Unsupported cipher: {0}")]
    UnsupportedCipher(String),
    #[error("Invalid encryption key: {0}")]
    InvalidKey(String),
    #[error("Key storage failed: {0}")]
    KeyStorage(String),
    #[error("Unsupported sealed value version")]
    UnsupportedVersion,
    #[error("Malformed sealed value: {0}")]
    Malformed(String),
    #[error("Sealed value failed authentication")]
    Tampered,
    #[error("Encryption failed")]
    Encryption,
    #[error("Decrypted payload is not a mapping: {0}")]
    InvalidPayload(String),
}

/// Reasons a cookie write is refused.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum WriteError {
    #[error("Cannot set cookie; headers already sent")]
    HeadersSent,
    #[error("Cookie too large: {size} bytes exceeds {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("Cookie value could not be serialized: {0}")]
    Encode(String),
    #[error("Cookie value could not be encrypted: {0}")]
    Crypto(CryptoError),
    /// Returned by [`CookieHost`](crate::cookies::jar::CookieHost)
    /// implementations that refuse an outgoing cookie.
    #[error("Cookie write rejected by host: {0}")]
    Rejected(String),
}

impl CookieError {
    /// Create a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        CookieError::Config(reason.into())
    }

    /// Create a transcode error.
    pub fn transcode(reason: impl Into<String>) -> Self {
        CookieError::Transcode(reason.into())
    }

    /// Stable numeric code, in the `-9xx` range.
    pub fn as_i32(&self) -> i32 {
        match self {
            CookieError::Config(_) => -900,
            CookieError::Transcode(_) => -910,
            CookieError::Crypto(e) => e.as_i32(),
            CookieError::Write(e) => e.as_i32(),
        }
    }
}

impl CryptoError {
    pub fn as_i32(&self) -> i32 {
        match self {
            CryptoError::UnsupportedCipher(_) => -920,
            CryptoError::InvalidKey(_) => -921,
            CryptoError::KeyStorage(_) => -922,
            CryptoError::UnsupportedVersion => -923,
            CryptoError::Malformed(_) => -924,
            CryptoError::Tampered => -925,
            CryptoError::Encryption => -926,
            CryptoError::InvalidPayload(_) => -927,
        }
    }
}

impl WriteError {
    pub fn as_i32(&self) -> i32 {
        match self {
            WriteError::HeadersSent => -930,
            WriteError::TooLarge { .. } => -931,
            WriteError::Encode(_) => -932,
            WriteError::Crypto(_) => -933,
            WriteError::Rejected(_) => -934,
        }
    }
}

impl From<serde_json::Error> for WriteError {
    fn from(err: serde_json::Error) -> Self {
        WriteError::Encode(err.to_string())
    }
}

/// Result alias used across the crate.
pub type CookieResult<T> = Result<T, CookieError>;
