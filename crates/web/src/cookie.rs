//! Prefixed application cookies.
//!
//! A [`CookieJar`] reads cookies from the request and writes them through a
//! [`ResponseBuilder`], adding a common name prefix and default attributes.

use serde::Deserialize;
use tern_http::protocol::date::unix_now;
use tern_http::request::RequestContext;
use tern_http::response::{CookieOptions, ResponseBuilder};

/// `expire` values below one delete the cookie by dating it this far back.
const DELETE_OFFSET: i64 = 86500;
const ONE_YEAR: i64 = 365 * 24 * 3600;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    pub prefix: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub httponly: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self { prefix: String::new(), domain: String::new(), path: "/".to_string(), secure: false, httponly: true }
    }
}

#[derive(Debug)]
pub struct CookieJar<'req> {
    request: &'req RequestContext,
    config: CookieConfig,
    options: CookieOptions,
}

impl<'req> CookieJar<'req> {
    pub fn new(request: &'req RequestContext, config: CookieConfig) -> Self {
        let options = CookieOptions::new()
            .domain(config.domain.clone())
            .path(config.path.clone())
            .secure(config.secure)
            .httponly(config.httponly);
        Self { request, config, options }
    }

    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    /// The inbound value of the prefixed cookie `name`.
    pub fn get(&self, name: &str) -> Option<&'req str> {
        self.request.cookie(&self.full_name(name))
    }

    /// Sets the prefixed cookie `name`.
    ///
    /// `expire` below one deletes the cookie, a value below the current
    /// timestamp is a lifetime in seconds, anything else an absolute timestamp.
    pub fn set(&self, response: &mut ResponseBuilder<'_>, name: &str, value: &str, expire: i64) {
        let expire = resolve_expiry(expire, unix_now());
        response.add_cookie(&self.full_name(name), value, expire, &self.options);
    }

    /// Sets a cookie for one year.
    pub fn forever(&self, response: &mut ResponseBuilder<'_>, name: &str, value: &str) {
        self.set(response, name, value, unix_now() + ONE_YEAR);
    }

    pub fn delete(&self, response: &mut ResponseBuilder<'_>, name: &str) {
        self.set(response, name, "", -1);
    }

    fn full_name(&self, name: &str) -> String {
        format!("{}{name}", self.config.prefix)
    }
}

fn resolve_expiry(expire: i64, now: i64) -> i64 {
    if expire < 1 {
        now - DELETE_OFFSET
    } else if expire >= now {
        expire
    } else {
        now + expire
    }
}

#[cfg(test)]
mod tests {
    use tern_http::request::Environment;

    use super::*;

    fn jar_config() -> CookieConfig {
        CookieConfig { prefix: "app_".into(), domain: "example.com".into(), ..CookieConfig::default() }
    }

    #[test]
    fn expiry_rules() {
        let now = 1_700_000_000;
        assert_eq!(resolve_expiry(0, now), now - 86500);
        assert_eq!(resolve_expiry(-5, now), now - 86500);
        assert_eq!(resolve_expiry(3600, now), now + 3600);
        assert_eq!(resolve_expiry(now + 10, now), now + 10);
        assert_eq!(resolve_expiry(now, now), now);
    }

    #[test]
    fn get_reads_prefixed_cookie() {
        let request = RequestContext::new(Environment::new().with_server("HTTP_COOKIE", "app_theme=dark; theme=light"));
        let jar = CookieJar::new(&request, jar_config());
        assert_eq!(jar.get("theme"), Some("dark"));
        assert_eq!(jar.get("missing"), None);
    }

    #[test]
    fn set_writes_prefixed_cookie() {
        let request = RequestContext::new(Environment::new());
        let jar = CookieJar::new(&request, jar_config());
        let mut response = ResponseBuilder::new(&request);

        jar.set(&mut response, "theme", "dark", 3600);
        jar.delete(&mut response, "old");

        let cookies = response.header("set-cookie").unwrap();
        assert!(cookies[0].starts_with("app_theme=dark; domain=example.com; path=/; expires="));
        assert!(cookies[0].ends_with("; HttpOnly"));
        assert!(cookies[1].starts_with("app_old=; domain=example.com"));
    }

    #[test]
    fn forever_is_a_year_ahead() {
        let request = RequestContext::new(Environment::new());
        let jar = CookieJar::new(&request, CookieConfig { secure: true, httponly: false, ..CookieConfig::default() });
        let mut response = ResponseBuilder::new(&request);

        jar.forever(&mut response, "remember", "1");
        let cookie = &response.header("set-cookie").unwrap()[0];
        assert!(cookie.starts_with("remember=1; path=/; expires="));
        assert!(cookie.ends_with("; secure"));
    }
}
