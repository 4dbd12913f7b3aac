//! Public Suffix List (PSL) checks for the configured cookie domain.
//!
//! A cookie scoped to a public suffix such as `.com` or `.co.uk` would be a
//! supercookie; browsers drop it silently. Rejecting it at configuration time
//! turns that silent loss into a [`CookieError::Config`](crate::base::cookieerror::CookieError::Config).
//!
//! Uses Mozilla's Public Suffix List via the `psl` crate.

use psl::{List, Psl};

/// Check if a domain is a listed public suffix (e.g., "com", "co.uk").
///
/// Unlisted single labels such as `localhost` are not treated as suffixes.
pub fn is_public_suffix(domain: &str) -> bool {
    let domain_lower = domain.trim_start_matches('.').to_lowercase();
    let domain_bytes = domain_lower.as_bytes();

    match List.suffix(domain_bytes) {
        Some(suffix) => suffix.typ().is_some() && suffix.as_bytes() == domain_bytes,
        None => false,
    }
}
