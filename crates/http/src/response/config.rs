use serde::Deserialize;

/// Settings a [`ResponseBuilder`](super::ResponseBuilder) is created with.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use tern_http::response::ResponseConfig;
///
/// let config: ResponseConfig = serde_json::from_str(r#"{"buffer": 8192, "samesite": "Lax"}"#).unwrap();
/// assert_eq!(config.buffer, 8192);
/// assert_eq!(config.path, "/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Body chunk size used by `emit`, `0` writes the body in one piece.
    pub buffer: usize,
    pub prefix: String,
    pub domain: String,
    pub path: String,
    /// `None` follows the request: secure cookies over https only.
    pub secure: Option<bool>,
    pub httponly: bool,
    pub samesite: String,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            buffer: 0,
            prefix: String::new(),
            domain: String::new(),
            path: "/".to_string(),
            secure: None,
            httponly: true,
            samesite: String::new(),
        }
    }
}

impl ResponseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    pub fn httponly(mut self, httponly: bool) -> Self {
        self.httponly = httponly;
        self
    }

    pub fn samesite(mut self, samesite: impl Into<String>) -> Self {
        self.samesite = samesite.into();
        self
    }
}

/// Per cookie overrides of the builder's cookie defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CookieOptions {
    pub domain: Option<String>,
    pub path: Option<String>,
    pub secure: Option<bool>,
    pub httponly: Option<bool>,
    pub samesite: Option<String>,
}

impl CookieOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    pub fn httponly(mut self, httponly: bool) -> Self {
        self.httponly = Some(httponly);
        self
    }

    pub fn samesite(mut self, samesite: impl Into<String>) -> Self {
        self.samesite = Some(samesite.into());
        self
    }
}

/// Cookie attributes after overrides have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CookieAttributes<'a> {
    pub domain: &'a str,
    pub path: &'a str,
    pub secure: bool,
    pub httponly: bool,
    pub samesite: &'a str,
}

impl<'a> CookieAttributes<'a> {
    pub(crate) fn merge(config: &'a ResponseConfig, secure_default: bool, overrides: &'a CookieOptions) -> Self {
        Self {
            domain: overrides.domain.as_deref().unwrap_or(&config.domain),
            path: overrides.path.as_deref().unwrap_or(&config.path),
            secure: overrides.secure.or(config.secure).unwrap_or(secure_default),
            httponly: overrides.httponly.unwrap_or(config.httponly),
            samesite: overrides.samesite.as_deref().unwrap_or(&config.samesite),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ResponseConfig::default();
        assert_eq!(config.buffer, 0);
        assert_eq!(config.path, "/");
        assert!(config.httponly);
        assert_eq!(config.secure, None);
        assert!(config.samesite.is_empty());
    }

    #[test]
    fn from_json() {
        let config: ResponseConfig = serde_json::from_str(r#"{"domain": "example.com", "secure": true}"#).unwrap();
        assert_eq!(config, ResponseConfig::new().domain("example.com").secure(true));
    }

    #[test]
    fn overrides_win() {
        let config = ResponseConfig::new().domain("example.com").samesite("Lax");
        let overrides = CookieOptions::new().path("/admin").httponly(false);

        let merged = CookieAttributes::merge(&config, true, &overrides);
        assert_eq!(merged.domain, "example.com");
        assert_eq!(merged.path, "/admin");
        assert!(merged.secure);
        assert!(!merged.httponly);
        assert_eq!(merged.samesite, "Lax");

        let config = config.secure(false);
        assert!(!CookieAttributes::merge(&config, true, &CookieOptions::new()).secure);
    }
}
