//! A key/value mapping persisted inside one named cookie.
//!
//! Every operation is a full cycle over the cookie value: read the whole
//! mapping from the request, change it in memory, write the whole mapping
//! back. Nothing is cached between calls; the browser-held cookie is the only
//! persistent copy.
//!
//! Two requests from the same client that both mutate the mapping race at the
//! HTTP layer and the last response to arrive wins. Cookie storage offers no
//! way to serialize them.

use crate::base::cookieerror::{CookieError, CookieResult, WriteError};
use crate::cookies::config::CookieConfig;
use crate::cookies::crypto::{AesGcmCrypto, CryptoProvider};
use crate::cookies::format::CookieMapping;
use crate::cookies::jar::CookieHost;
use cookie::Cookie;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};

/// Largest `name=value` pair (after percent-encoding) browsers reliably keep.
pub const MAX_COOKIE_SIZE: usize = 4096;

/// Reads and writes a [`CookieMapping`] stored in a single cookie.
///
/// The store holds only configuration and an optional crypto provider, so one
/// instance can be shared by every request. The cookies of the current
/// request are passed to each call as a [`CookieHost`].
///
/// ```
/// use cookiestash::cookies::config::CookieConfig;
/// use cookiestash::cookies::jar::RequestCookies;
/// use cookiestash::cookies::store::CookieStore;
///
/// let store = CookieStore::new(CookieConfig::new("prefs"))?;
/// let mut request = RequestCookies::new();
///
/// store.set(&mut request, "theme", "dark")?;
/// assert_eq!(store.get(&request, "theme")?, Some("dark".into()));
///
/// let set_cookie = request.set_cookie_headers();
/// assert_eq!(set_cookie.len(), 1);
/// # Ok::<(), cookiestash::base::cookieerror::CookieError>(())
/// ```
#[derive(Clone)]
pub struct CookieStore {
    config: Arc<CookieConfig>,
    crypto: Option<Arc<dyn CryptoProvider>>,
}

impl fmt::Debug for CookieStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieStore")
            .field("config", &self.config)
            .field("encrypted", &self.crypto.is_some())
            .finish()
    }
}

impl CookieStore {
    /// Build a store. Encryption is enabled iff `config.encryption` is set,
    /// using the AES-GCM reference provider.
    pub fn new(config: CookieConfig) -> CookieResult<Self> {
        config.validate()?;

        let crypto = match &config.encryption {
            Some(encryption) => {
                let provider = AesGcmCrypto::from_config(encryption)?;
                Some(Arc::new(provider) as Arc<dyn CryptoProvider>)
            }
            None => None,
        };

        Ok(Self {
            config: Arc::new(config),
            crypto,
        })
    }

    /// Build an encrypting store around a custom provider. The config's own
    /// `encryption` block is not used.
    pub fn with_provider<P>(config: CookieConfig, provider: P) -> CookieResult<Self>
    where
        P: CryptoProvider + 'static,
    {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            crypto: Some(Arc::new(provider)),
        })
    }

    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    pub fn is_encrypted(&self) -> bool {
        self.crypto.is_some()
    }

    /// The whole mapping. A missing cookie yields an empty mapping.
    pub fn all<H: CookieHost + ?Sized>(&self, host: &H) -> CookieResult<CookieMapping> {
        let name = self.config.name.as_str();
        let Some(raw) = host.raw_cookie(name) else {
            tracing::debug!(cookie = name, "cookie not present");
            return Ok(CookieMapping::new());
        };

        // Left behind by destroy() earlier in this request, or cleared by hand.
        if raw.is_empty() {
            return Ok(CookieMapping::new());
        }

        let format = self.config.format;
        let result = match &self.crypto {
            Some(crypto) => crypto.decrypt(raw, format).map_err(CookieError::from),
            None => format.decode(raw),
        };

        match &result {
            Ok(mapping) => tracing::debug!(cookie = name, keys = mapping.len(), "cookie read"),
            Err(e) => tracing::warn!(cookie = name, error = %e, "cookie could not be read"),
        }
        result
    }

    /// Value stored under `key`. Absent keys and a missing cookie both give `None`.
    pub fn get<H: CookieHost + ?Sized>(&self, host: &H, key: &str) -> CookieResult<Option<Value>> {
        Ok(self.all(host)?.remove(key))
    }

    /// Value stored under `key`, deserialized into `T`.
    pub fn get_as<T, H>(&self, host: &H, key: &str) -> CookieResult<Option<T>>
    where
        T: DeserializeOwned,
        H: CookieHost + ?Sized,
    {
        match self.get(host, key)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| CookieError::transcode(format!("{}: {}", key, e))),
            None => Ok(None),
        }
    }

    /// Whether `key` holds a non-null value. A stored `null` reads as absent.
    pub fn has<H: CookieHost + ?Sized>(&self, host: &H, key: &str) -> CookieResult<bool> {
        Ok(matches!(self.get(host, key)?, Some(v) if !v.is_null()))
    }

    /// Store one value under `key`.
    pub fn set<H, K, V>(&self, host: &mut H, key: K, value: V) -> CookieResult<()>
    where
        H: CookieHost + ?Sized,
        K: Into<String>,
        V: Serialize,
    {
        let value = serde_json::to_value(value).map_err(WriteError::from)?;
        let mut mapping = self.all(&*host)?;
        mapping.insert(key.into(), value);
        self.persist(host, &mapping)
    }

    /// Merge several entries into the mapping. Later entries win on collision.
    pub fn set_many<H, I, K, V>(&self, host: &mut H, entries: I) -> CookieResult<()>
    where
        H: CookieHost + ?Sized,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Serialize,
    {
        let mut mapping = self.all(&*host)?;
        for (key, value) in entries {
            let value = serde_json::to_value(value).map_err(WriteError::from)?;
            mapping.insert(key.into(), value);
        }
        self.persist(host, &mapping)
    }

    /// Remove `key`. Removing an absent key is not an error.
    pub fn unset<H: CookieHost + ?Sized>(&self, host: &mut H, key: &str) -> CookieResult<()> {
        let mut mapping = self.all(&*host)?;
        mapping.remove(key);
        self.persist(host, &mapping)
    }

    /// Remove several keys.
    pub fn unset_many<H, I, S>(&self, host: &mut H, keys: I) -> CookieResult<()>
    where
        H: CookieHost + ?Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mapping = self.all(&*host)?;
        for key in keys {
            mapping.remove(key.as_ref());
        }
        self.persist(host, &mapping)
    }

    /// Persist an empty mapping, keeping the cookie itself.
    pub fn clear<H: CookieHost + ?Sized>(&self, host: &mut H) -> CookieResult<()> {
        self.persist(host, &CookieMapping::new())
    }

    /// Tell the browser to discard the cookie.
    ///
    /// Mappings already returned by [`CookieStore::all`] are left untouched.
    pub fn destroy<H: CookieHost + ?Sized>(&self, host: &mut H) -> CookieResult<()> {
        let expired = OffsetDateTime::now_utc() - Duration::hours(1);
        let cookie = self
            .builder(String::new())
            .expires(expired)
            .max_age(Duration::ZERO)
            .build();

        host.write_cookie(cookie)?;
        tracing::debug!(cookie = %self.config.name, "cookie destroyed");
        Ok(())
    }

    fn persist<H: CookieHost + ?Sized>(&self, host: &mut H, mapping: &CookieMapping) -> CookieResult<()> {
        let format = self.config.format;
        let value = match &self.crypto {
            Some(crypto) => crypto.encrypt(mapping, format).map_err(WriteError::Crypto)?,
            None => format.encode(mapping)?,
        };

        let mut builder = self.builder(value);
        if self.config.expire_hours > 0 {
            let lifetime = Duration::hours(i64::from(self.config.expire_hours));
            builder = builder
                .expires(OffsetDateTime::now_utc() + lifetime)
                .max_age(lifetime);
        }
        let cookie = builder.build();

        let size = cookie.encoded().stripped().to_string().len();
        if size > MAX_COOKIE_SIZE {
            tracing::warn!(cookie = %self.config.name, size, "cookie exceeds size limit");
            return Err(WriteError::TooLarge {
                size,
                limit: MAX_COOKIE_SIZE,
            }
            .into());
        }

        host.write_cookie(cookie)?;
        tracing::debug!(cookie = %self.config.name, keys = mapping.len(), size, "cookie written");
        Ok(())
    }

    fn builder(&self, value: String) -> cookie::CookieBuilder<'static> {
        let config = &self.config;
        let mut builder = Cookie::build((config.name.clone(), value))
            .path(config.path.clone())
            .secure(config.secure)
            .http_only(config.http_only);
        if let Some(domain) = &config.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(same_site) = config.same_site {
            builder = builder.same_site(same_site);
        }
        builder
    }
}
