//! A key/value mapping stored in a single, optionally encrypted cookie.
//!
//! # Architecture
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`store`] | [`CookieStore`]: read/modify/write of the mapping |
//! | [`config`] | [`CookieConfig`] and [`EncryptionConfig`] |
//! | [`format`] | Payload encodings and canonical-empty detection |
//! | [`crypto`] | [`CryptoProvider`] seam and the AES-GCM provider |
//! | [`keystore`] | Inline passphrase and local key-file storage |
//! | [`jar`] | [`CookieHost`] seam and [`RequestCookies`] |
//! | [`psl`] | Public suffix checks for the cookie domain |
//!
//! # Plain cookie
//!
//! ```rust
//! use cookiestash::cookies::{CookieConfig, CookieStore, RequestCookies};
//!
//! let store = CookieStore::new(CookieConfig::new("prefs").with_expire_hours(48))?;
//!
//! // First request: no cookie yet.
//! let mut request = RequestCookies::new();
//! store.set_many(&mut request, [("theme", "dark"), ("lang", "en")])?;
//! let set_cookie = request.set_cookie_headers();
//! assert_eq!(set_cookie.len(), 1);
//! # Ok::<(), cookiestash::base::cookieerror::CookieError>(())
//! ```
//!
//! # Encrypted cookie
//!
//! ```rust
//! use cookiestash::cookies::{CookieConfig, CookieStore, EncryptionConfig, RequestCookies};
//!
//! let config = CookieConfig::new("vault")
//!     .with_secure(true)
//!     .with_encryption(EncryptionConfig::with_passphrase("your-secret-key"));
//! let store = CookieStore::new(config)?;
//!
//! let mut request = RequestCookies::from_header("vault=v1.tampered");
//! assert!(store.all(&request).is_err());
//!
//! store.destroy(&mut request)?;
//! assert!(store.all(&request)?.is_empty());
//! # Ok::<(), cookiestash::base::cookieerror::CookieError>(())
//! ```

pub mod config;
pub mod crypto;
pub mod format;
pub mod jar;
pub mod keystore;
pub mod psl;
pub mod store;

pub use config::{CookieConfig, EncryptionConfig};
pub use crypto::{AesGcmCrypto, CryptoProvider};
pub use format::{CookieMapping, Format};
pub use jar::{CookieHost, RequestCookies};
pub use store::CookieStore;
