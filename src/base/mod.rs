//! Base types and error handling.
//!
//! - [`CookieError`](cookieerror::CookieError): errors surfaced by the store
//! - [`CryptoError`](cookieerror::CryptoError): failures from a crypto provider
//! - [`WriteError`](cookieerror::WriteError): refused cookie writes

pub mod cookieerror;
