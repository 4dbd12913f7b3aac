//! Host cookie I/O.
//!
//! [`CookieHost`] is the seam between the store and the HTTP layer: it reads
//! the raw value of a request cookie and accepts outgoing cookies.
//! [`RequestCookies`] is the default host, backed by [`cookie::CookieJar`].
//! It parses the request's `Cookie` headers and records outgoing cookies as
//! the jar's delta, which is rendered as `Set-Cookie` headers.
//!
//! Reads see the latest write made during the same request, so consecutive
//! store mutations build on each other. Once the `Set-Cookie` headers have
//! been produced, further writes are refused with [`WriteError::HeadersSent`].

use crate::base::cookieerror::WriteError;
use cookie::{Cookie, CookieJar};
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};

/// Read/write access to the cookies of one request/response exchange.
pub trait CookieHost {
    /// Raw (already percent-decoded) value of the named cookie, if present.
    fn raw_cookie(&self, name: &str) -> Option<&str>;

    /// Queue a cookie for the response.
    fn write_cookie(&mut self, cookie: Cookie<'static>) -> Result<(), WriteError>;
}

/// Cookies of one request, plus the cookies queued for its response.
#[derive(Debug, Default, Clone)]
pub struct RequestCookies {
    jar: CookieJar,
    headers_sent: bool,
}

impl RequestCookies {
    /// Empty jar: a request that carried no cookies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `Cookie` header value such as `"a=1; prefs=%7B%7D"`.
    pub fn from_header(header: &str) -> Self {
        let mut cookies = Self::new();
        cookies.add_header(header);
        cookies
    }

    /// Parse every `Cookie` header of a request.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = Self::new();
        for value in headers.get_all(COOKIE) {
            match value.to_str() {
                Ok(header) => cookies.add_header(header),
                Err(_) => tracing::debug!("skipping non-ASCII Cookie header"),
            }
        }
        cookies
    }

    fn add_header(&mut self, header: &str) {
        for parsed in Cookie::split_parse_encoded(header.to_owned()) {
            match parsed {
                Ok(c) => self.jar.add_original(c),
                Err(e) => tracing::debug!(error = %e, "skipping unparsable cookie pair"),
            }
        }
    }

    /// Whether the `Set-Cookie` headers have already been produced.
    pub fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    /// Cookies queued for the response.
    pub fn delta(&self) -> impl Iterator<Item = &Cookie<'static>> {
        self.jar.delta()
    }

    /// Render queued cookies as `Set-Cookie` values and mark headers as sent.
    pub fn set_cookie_headers(&mut self) -> Vec<HeaderValue> {
        self.headers_sent = true;
        self.jar
            .delta()
            .filter_map(|c| {
                let line = c.encoded().to_string();
                HeaderValue::from_str(&line)
                    .map_err(|e| tracing::warn!(cookie = c.name(), error = %e, "dropping invalid Set-Cookie"))
                    .ok()
            })
            .collect()
    }

    /// Append queued cookies to a response header map and mark headers as sent.
    pub fn apply_to(&mut self, headers: &mut HeaderMap) {
        for value in self.set_cookie_headers() {
            headers.append(SET_COOKIE, value);
        }
    }
}

impl CookieHost for RequestCookies {
    fn raw_cookie(&self, name: &str) -> Option<&str> {
        self.jar.get(name).map(|c| c.value())
    }

    fn write_cookie(&mut self, cookie: Cookie<'static>) -> Result<(), WriteError> {
        if self.headers_sent {
            return Err(WriteError::HeadersSent);
        }
        self.jar.add(cookie);
        Ok(())
    }
}
