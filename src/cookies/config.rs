//! Cookie store configuration.
//!
//! A [`CookieConfig`] is fixed when the store is built. It can be assembled
//! three ways:
//!
//! - the builder: `CookieConfig::new("prefs").with_secure(true)`
//! - a mapping: [`CookieConfig::from_value`], which also accepts the legacy
//!   camelCase keys (`cookieName`, `cookieExpires`, `cookieEncrypt`, ...)
//! - environment pairs passed in explicitly: [`CookieConfig::from_env`]
//!
//! Every path ends in [`CookieConfig::validate`].
//!
//! The domain defaults to none, which yields a host-only cookie. The server
//! name is never used as an implicit domain.

use crate::base::cookieerror::CookieError;
use crate::cookies::format::Format;
use crate::cookies::keystore::KeyStorageMethod;
use crate::cookies::psl;
use cookie::SameSite;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Default lifetime of the cookie, in hours.
pub const DEFAULT_EXPIRE_HOURS: u32 = 24;
/// Longest lifetime browsers honor (RFC 6265bis caps it at 400 days).
pub const MAX_EXPIRE_HOURS: u32 = 400 * 24;
/// Default cipher for [`EncryptionConfig`].
pub const DEFAULT_CIPHER: &str = "AES-256-GCM";

/// Configuration of one named cookie.
#[derive(Debug, Clone, PartialEq)]
pub struct CookieConfig {
    pub name: String,
    pub expire_hours: u32,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
    pub format: Format,
    pub encryption: Option<EncryptionConfig>,
}

/// Parameters handed verbatim to the crypto provider constructor.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EncryptionConfig {
    #[serde(alias = "encryptKey")]
    pub key: Option<String>,
    #[serde(alias = "encryptCipher")]
    pub cipher: String,
    #[serde(alias = "encryptStoreMethod")]
    pub store_method: KeyStorageMethod,
    #[serde(alias = "encryptFile")]
    pub key_file: Option<PathBuf>,
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        Self {
            key: None,
            cipher: DEFAULT_CIPHER.to_string(),
            store_method: KeyStorageMethod::Inline,
            key_file: None,
        }
    }
}

impl fmt::Debug for EncryptionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionConfig")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("cipher", &self.cipher)
            .field("store_method", &self.store_method)
            .field("key_file", &self.key_file)
            .finish()
    }
}

impl EncryptionConfig {
    /// Key derived from an inline passphrase.
    pub fn with_passphrase(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    /// Key kept in a local file, generated on first use.
    pub fn with_key_file(path: impl Into<PathBuf>) -> Self {
        Self {
            store_method: KeyStorageMethod::Local,
            key_file: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn cipher(mut self, cipher: impl Into<String>) -> Self {
        self.cipher = cipher.into();
        self
    }
}

/// Mapping form of the configuration. `name` stays optional here so that
/// its absence becomes a [`CookieError::Config`] rather than a serde message.
#[derive(Deserialize)]
struct RawCookieConfig {
    #[serde(default, alias = "cookieName")]
    name: Option<String>,
    #[serde(default, alias = "cookieExpires", alias = "cookieExpire")]
    expire_hours: Option<u32>,
    #[serde(default, alias = "cookiePath")]
    path: Option<String>,
    #[serde(default, alias = "cookieDomain")]
    domain: Option<String>,
    #[serde(default, alias = "cookieSecure")]
    secure: Option<RawBool>,
    #[serde(default, alias = "cookieHttpOnly")]
    http_only: Option<RawBool>,
    #[serde(default, alias = "cookieSameSite")]
    same_site: Option<String>,
    #[serde(default)]
    format: Option<Format>,
    #[serde(default, alias = "cookieEncrypt")]
    encryption: Option<EncryptionConfig>,
}

/// A flag as written in a config mapping: a JSON boolean, a number or a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBool {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl RawBool {
    fn coerce(self, field: &str) -> Result<bool, CookieError> {
        match self {
            RawBool::Bool(b) => Ok(b),
            RawBool::Number(n) => parse_bool(field, &n.to_string()),
            RawBool::Text(text) => parse_bool(field, &text),
        }
    }
}

impl CookieConfig {
    /// Configuration with defaults for everything but the name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expire_hours: DEFAULT_EXPIRE_HOURS,
            path: "/".to_string(),
            domain: None,
            secure: false,
            http_only: true,
            same_site: None,
            format: Format::default(),
            encryption: None,
        }
    }

    pub fn with_expire_hours(mut self, hours: u32) -> Self {
        self.expire_hours = hours;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_encryption(mut self, encryption: EncryptionConfig) -> Self {
        self.encryption = Some(encryption);
        self
    }

    /// Build from a configuration mapping.
    ///
    /// ```
    /// use cookiestash::cookies::config::CookieConfig;
    ///
    /// let config = CookieConfig::from_value(serde_json::json!({
    ///     "cookieName": "myCookie",
    ///     "cookieExpires": 24,
    ///     "cookieSecure": true,
    /// }))?;
    /// assert_eq!(config.name, "myCookie");
    /// # Ok::<(), cookiestash::base::cookieerror::CookieError>(())
    /// ```
    pub fn from_value(value: serde_json::Value) -> Result<Self, CookieError> {
        let raw: RawCookieConfig = serde_json::from_value(value)
            .map_err(|e| CookieError::config(e.to_string()))?;

        let name = raw
            .name
            .ok_or_else(|| CookieError::config("missing cookie name"))?;

        let mut config = CookieConfig::new(name);
        if let Some(hours) = raw.expire_hours {
            config.expire_hours = hours;
        }
        if let Some(path) = raw.path {
            config.path = path;
        }
        config.domain = raw.domain.filter(|d| !d.is_empty());
        if let Some(secure) = raw.secure {
            config.secure = secure.coerce("secure")?;
        }
        if let Some(http_only) = raw.http_only {
            config.http_only = http_only.coerce("http_only")?;
        }
        if let Some(same_site) = raw.same_site {
            config.same_site = Some(parse_same_site(&same_site)?);
        }
        if let Some(format) = raw.format {
            config.format = format;
        }
        config.encryption = raw.encryption;

        config.validate()?;
        Ok(config)
    }

    /// Build from environment-style pairs, e.g. `std::env::vars()`.
    ///
    /// Reads `COOKIE_NAME` (required), `COOKIE_EXPIRES`, `COOKIE_PATH`,
    /// `COOKIE_DOMAIN`, `COOKIE_SECURE`, `COOKIE_HTTP_ONLY`,
    /// `COOKIE_SAME_SITE` and `COOKIE_FORMAT`.
    pub fn from_env<I, K, V>(vars: I) -> Result<Self, CookieError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let name = vars
            .get("COOKIE_NAME")
            .filter(|n| !n.is_empty())
            .ok_or_else(|| CookieError::config("COOKIE_NAME is not set"))?;

        let mut config = CookieConfig::new(name.clone());
        if let Some(hours) = vars.get("COOKIE_EXPIRES") {
            config.expire_hours = hours.trim().parse().map_err(|_| {
                CookieError::config(format!("COOKIE_EXPIRES is not a number of hours: {}", hours))
            })?;
        }
        if let Some(path) = vars.get("COOKIE_PATH") {
            config.path = path.clone();
        }
        config.domain = vars.get("COOKIE_DOMAIN").filter(|d| !d.is_empty()).cloned();
        if let Some(secure) = vars.get("COOKIE_SECURE") {
            config.secure = parse_bool("COOKIE_SECURE", secure)?;
        }
        if let Some(http_only) = vars.get("COOKIE_HTTP_ONLY") {
            config.http_only = parse_bool("COOKIE_HTTP_ONLY", http_only)?;
        }
        if let Some(same_site) = vars.get("COOKIE_SAME_SITE") {
            config.same_site = Some(parse_same_site(same_site)?);
        }
        if let Some(format) = vars.get("COOKIE_FORMAT") {
            config.format = Format::from_tag(format)
                .ok_or_else(|| CookieError::config(format!("unknown COOKIE_FORMAT: {}", format)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for combinations browsers would reject.
    pub fn validate(&self) -> Result<(), CookieError> {
        if self.name.is_empty() {
            return Err(CookieError::config("missing cookie name"));
        }
        if !self.name.chars().all(is_token_char) {
            return Err(CookieError::config(format!(
                "cookie name contains invalid characters: {:?}",
                self.name
            )));
        }

        if self.expire_hours > MAX_EXPIRE_HOURS {
            return Err(CookieError::config(format!(
                "cookie lifetime of {} hours exceeds {}",
                self.expire_hours, MAX_EXPIRE_HOURS
            )));
        }

        if !self.path.starts_with('/') || self.path.chars().any(|c| c == ';' || c.is_control()) {
            return Err(CookieError::config(format!("invalid cookie path: {:?}", self.path)));
        }

        if let Some(domain) = &self.domain {
            let bare = domain.trim_start_matches('.');
            if bare.is_empty() || !bare.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.') {
                return Err(CookieError::config(format!("invalid cookie domain: {:?}", domain)));
            }
            if psl::is_public_suffix(bare) {
                return Err(CookieError::config(format!(
                    "cookie domain is a public suffix: {}",
                    domain
                )));
            }
        }

        // RFC 6265bis cookie prefixes
        if self.name.starts_with("__Secure-") && !self.secure {
            return Err(CookieError::config("__Secure- cookies require the secure flag"));
        }
        if self.name.starts_with("__Host-") && (!self.secure || self.path != "/" || self.domain.is_some()) {
            return Err(CookieError::config(
                "__Host- cookies require secure, path \"/\" and no domain",
            ));
        }

        if self.same_site == Some(SameSite::None) && !self.secure {
            return Err(CookieError::config("SameSite=None requires the secure flag"));
        }

        Ok(())
    }
}

/// RFC 6265 token characters.
fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?={}".contains(c)
}

/// Boolean coercion shared by every configuration surface.
pub fn parse_bool(field: &str, value: &str) -> Result<bool, CookieError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" | "" => Ok(false),
        _ => Err(CookieError::config(format!("{} is not a boolean: {}", field, value))),
    }
}

fn parse_same_site(value: &str) -> Result<SameSite, CookieError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" => Ok(SameSite::None),
        _ => Err(CookieError::config(format!("unknown SameSite value: {}", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = CookieConfig::new("prefs");
        assert_eq!(config.expire_hours, 24);
        assert_eq!(config.path, "/");
        assert_eq!(config.domain, None);
        assert!(!config.secure);
        assert!(config.http_only);
        assert_eq!(config.format, Format::Json);
        assert!(config.encryption.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_value_snake_case() {
        let config = CookieConfig::from_value(json!({
            "name": "prefs",
            "expire_hours": 2,
            "path": "/app",
            "domain": "example.com",
            "secure": true,
            "http_only": false,
            "same_site": "strict",
            "format": "base64_json",
        }))
        .unwrap();

        assert_eq!(config.name, "prefs");
        assert_eq!(config.expire_hours, 2);
        assert_eq!(config.path, "/app");
        assert_eq!(config.domain.as_deref(), Some("example.com"));
        assert!(config.secure);
        assert!(!config.http_only);
        assert_eq!(config.same_site, Some(SameSite::Strict));
        assert_eq!(config.format, Format::Base64Json);
    }

    #[test]
    fn test_from_value_legacy_keys() {
        let config = CookieConfig::from_value(json!({
            "cookieName": "myCookie",
            "cookieExpires": 24,
            "cookiePath": "/",
            "cookieSecure": false,
            "cookieHttpOnly": true,
            "cookieEncrypt": {
                "encryptKey": "your-secret-key",
                "encryptCipher": "AES-256-GCM",
                "encryptStoreMethod": "local",
                "encryptFile": "/path/to/encrypt.txt"
            }
        }))
        .unwrap();

        let enc = config.encryption.unwrap();
        assert_eq!(enc.key.as_deref(), Some("your-secret-key"));
        assert_eq!(enc.cipher, "AES-256-GCM");
        assert_eq!(enc.store_method, KeyStorageMethod::Local);
        assert_eq!(enc.key_file, Some(PathBuf::from("/path/to/encrypt.txt")));
    }

    #[test]
    fn test_missing_name_is_config_error() {
        let err = CookieConfig::from_value(json!({"cookieExpires": 1})).unwrap_err();
        assert!(matches!(err, CookieError::Config(_)));
    }

    #[test]
    fn test_negative_expiry_rejected() {
        let err = CookieConfig::from_value(json!({"name": "a", "expire_hours": -1})).unwrap_err();
        assert!(matches!(err, CookieError::Config(_)));
    }

    #[test]
    fn test_expiry_upper_bound() {
        assert!(CookieConfig::new("a").with_expire_hours(MAX_EXPIRE_HOURS).validate().is_ok());
        let err = CookieConfig::new("a")
            .with_expire_hours(100_000_000)
            .validate()
            .unwrap_err();
        assert!(matches!(err, CookieError::Config(_)));
        assert!(CookieConfig::from_value(json!({"name": "a", "expire_hours": 9601})).is_err());
        assert!(CookieConfig::from_env([("COOKIE_NAME", "a"), ("COOKIE_EXPIRES", "9601")]).is_err());
    }

    #[test]
    fn test_from_value_coerces_flags() {
        let config = CookieConfig::from_value(json!({
            "name": "a",
            "secure": "on",
            "http_only": "0",
        }))
        .unwrap();
        assert!(config.secure);
        assert!(!config.http_only);

        let config = CookieConfig::from_value(json!({
            "cookieName": "a",
            "cookieSecure": "true",
            "cookieHttpOnly": 1,
        }))
        .unwrap();
        assert!(config.secure);
        assert!(config.http_only);

        let from_env = CookieConfig::from_env([("COOKIE_NAME", "a"), ("COOKIE_SECURE", "on")]).unwrap();
        let from_value = CookieConfig::from_value(json!({"name": "a", "secure": "on"})).unwrap();
        assert_eq!(from_env.secure, from_value.secure);

        let err = CookieConfig::from_value(json!({"name": "a", "secure": "maybe"})).unwrap_err();
        assert!(matches!(err, CookieError::Config(_)));
    }

    #[test]
    fn test_from_env() {
        let config = CookieConfig::from_env([
            ("COOKIE_NAME", "web_cookie"),
            ("COOKIE_EXPIRES", "48"),
            ("COOKIE_SECURE", "On"),
            ("SERVER_NAME", "example.com"),
        ])
        .unwrap();

        assert_eq!(config.name, "web_cookie");
        assert_eq!(config.expire_hours, 48);
        assert!(config.secure);
        // SERVER_NAME never becomes the cookie domain.
        assert_eq!(config.domain, None);
    }

    #[test]
    fn test_from_env_requires_name() {
        let err = CookieConfig::from_env(Vec::<(String, String)>::new()).unwrap_err();
        assert!(matches!(err, CookieError::Config(_)));
    }

    #[test]
    fn test_from_env_rejects_bad_values() {
        assert!(CookieConfig::from_env([("COOKIE_NAME", "a"), ("COOKIE_EXPIRES", "soon")]).is_err());
        assert!(CookieConfig::from_env([("COOKIE_NAME", "a"), ("COOKIE_SECURE", "maybe")]).is_err());
        assert!(CookieConfig::from_env([("COOKIE_NAME", "a"), ("COOKIE_FORMAT", "php")]).is_err());
    }

    #[test]
    fn test_parse_bool() {
        for v in ["1", "true", "TRUE", "on", "yes"] {
            assert!(parse_bool("f", v).unwrap());
        }
        for v in ["0", "false", "off", "no", ""] {
            assert!(!parse_bool("f", v).unwrap());
        }
        assert!(parse_bool("f", "2").is_err());
    }

    #[test]
    fn test_invalid_names_and_paths() {
        assert!(CookieConfig::new("").validate().is_err());
        assert!(CookieConfig::new("bad name").validate().is_err());
        assert!(CookieConfig::new("semi;colon").validate().is_err());
        assert!(CookieConfig::new("ok").with_path("relative").validate().is_err());
    }

    #[test]
    fn test_public_suffix_domain_rejected() {
        assert!(CookieConfig::new("a").with_domain("com").validate().is_err());
        assert!(CookieConfig::new("a").with_domain(".co.uk").validate().is_err());
        assert!(CookieConfig::new("a").with_domain("example.com").validate().is_ok());
    }

    #[test]
    fn test_prefix_rules() {
        assert!(CookieConfig::new("__Secure-id").validate().is_err());
        assert!(CookieConfig::new("__Secure-id").with_secure(true).validate().is_ok());

        let host = CookieConfig::new("__Host-id").with_secure(true);
        assert!(host.validate().is_ok());
        assert!(host.clone().with_path("/app").validate().is_err());
        assert!(host.with_domain("example.com").validate().is_err());
    }

    #[test]
    fn test_same_site_none_requires_secure() {
        let config = CookieConfig::new("a").with_same_site(SameSite::None);
        assert!(config.clone().validate().is_err());
        assert!(config.with_secure(true).validate().is_ok());
    }

    #[test]
    fn test_encryption_debug_redacts_key() {
        let enc = EncryptionConfig::with_passphrase("hunter2");
        let debug = format!("{:?}", enc);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("redacted"));
    }
}
