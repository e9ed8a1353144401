//! `Set-Cookie` value serialization.

use tracing::warn;
use url::form_urlencoded::byte_serialize;

use crate::protocol::date::http_date;
use crate::response::config::CookieAttributes;

/// Builds `name=value[; domain=D][; path=P][; expires=E][; secure][; HttpOnly][; SameSite=S]`.
///
/// `expire` is an absolute unix timestamp, `0` makes a session cookie.
pub(crate) fn set_cookie_value(name: &str, value: &str, expire: i64, attributes: &CookieAttributes<'_>) -> String {
    let mut header = format!("{name}={}", byte_serialize(value.as_bytes()).collect::<String>());

    if !attributes.domain.is_empty() {
        header.push_str("; domain=");
        header.push_str(attributes.domain);
    }
    if !attributes.path.is_empty() {
        header.push_str("; path=");
        header.push_str(attributes.path);
    }
    if expire != 0 {
        header.push_str("; expires=");
        header.push_str(&http_date(expire));
    }
    if attributes.secure {
        header.push_str("; secure");
    }
    if attributes.httponly {
        header.push_str("; HttpOnly");
    }

    let samesite = attributes.samesite;
    if samesite.eq_ignore_ascii_case("lax") || samesite.eq_ignore_ascii_case("strict") {
        header.push_str("; SameSite=");
        header.push_str(samesite);
    } else if !samesite.is_empty() {
        warn!(samesite, cookie = name, "drop unsupported SameSite value");
    }

    header
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes() -> CookieAttributes<'static> {
        CookieAttributes { domain: "", path: "/", secure: false, httponly: true, samesite: "" }
    }

    #[test]
    fn session_cookie() {
        assert_eq!(set_cookie_value("a", "b", 0, &attributes()), "a=b; path=/; HttpOnly");
    }

    #[test]
    fn value_is_urlencoded() {
        let value = set_cookie_value("msg", "hello world&more=1/é", 0, &attributes());
        assert!(value.starts_with("msg=hello+world%26more%3D1%2F%C3%A9;"));
    }

    #[test]
    fn all_attributes() {
        let attributes = CookieAttributes { domain: "example.com", path: "/app", secure: true, httponly: true, samesite: "Strict" };
        assert_eq!(
            set_cookie_value("sid", "42", 784_111_777, &attributes),
            "sid=42; domain=example.com; path=/app; expires=Sun, 06 Nov 1994 08:49:37 GMT; secure; HttpOnly; SameSite=Strict"
        );
    }

    #[test]
    fn samesite_filter() {
        let mut attrs = attributes();
        attrs.samesite = "Foo";
        assert!(!set_cookie_value("a", "b", 0, &attrs).contains("SameSite"));

        attrs.samesite = "none";
        assert!(!set_cookie_value("a", "b", 0, &attrs).contains("SameSite"));

        attrs.samesite = "strict";
        assert!(set_cookie_value("a", "b", 0, &attrs).ends_with("; SameSite=strict"));

        attrs.samesite = "LAX";
        assert!(set_cookie_value("a", "b", 0, &attrs).ends_with("; SameSite=LAX"));
    }

    #[test]
    fn empty_path_and_no_flags() {
        let attrs = CookieAttributes { domain: "", path: "", secure: false, httponly: false, samesite: "" };
        assert_eq!(set_cookie_value("a", "", 0, &attrs), "a=");
    }
}
