//! # cookiestash
//!
//! Keep a whole key/value mapping in one HTTP cookie instead of many discrete
//! cookies.
//!
//! The mapping is serialized into the cookie value and can optionally be
//! encrypted through a pluggable crypto provider. Each store operation reads
//! the whole mapping from the request, changes it, and writes it back as a
//! `Set-Cookie`.
//!
//! ## Quick Start
//!
//! ```rust
//! use cookiestash::cookies::{CookieConfig, CookieStore, RequestCookies};
//!
//! let store = CookieStore::new(CookieConfig::new("prefs"))?;
//!
//! let mut request = RequestCookies::from_header("prefs=%7B%22theme%22%3A%22dark%22%7D");
//! assert_eq!(store.get(&request, "theme")?, Some("dark".into()));
//!
//! store.set(&mut request, "lang", "en")?;
//! let mut response = http::HeaderMap::new();
//! request.apply_to(&mut response);
//! # Ok::<(), cookiestash::base::cookieerror::CookieError>(())
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error types
//! - [`cookies`] - The store, its configuration, formats, crypto and host I/O

pub mod base;
pub mod cookies;
