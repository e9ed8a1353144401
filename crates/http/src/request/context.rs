use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::time::{SystemTime, UNIX_EPOCH};

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use once_cell::unsync::OnceCell;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{trace, warn};

use crate::protocol::ParseError;
use crate::request::environment::Environment;
use crate::request::params::{FileField, Params};

/// Method reported when the process runs outside of a web server.
pub const CLI_METHOD: &str = "CLI";

/// Read-only view of the current request.
///
/// Built once from an [`Environment`] and passed by reference to whoever needs
/// it. Every category of request data is parsed on first access and cached
/// for the lifetime of the context.
#[derive(Debug)]
pub struct RequestContext {
    env: Environment,
    method: Method,
    path: String,
    query_string: Option<String>,
    started: f64,

    headers: OnceCell<HeaderMap>,
    query: OnceCell<Params>,
    form: OnceCell<Params>,
    json: OnceCell<Map<String, Value>>,
    files: OnceCell<HashMap<String, FileField>>,
    cookies: OnceCell<Params>,
}

impl RequestContext {
    pub fn new(env: Environment) -> Self {
        let started = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs_f64()).unwrap_or_default();
        let method = parse_method(env.server.get("REQUEST_METHOD").map(String::as_str));

        let raw_uri = match env.server.get("REQUEST_URI") {
            Some(uri) => uri.clone(),
            None => uri_from_args(&env.args),
        };
        let (path, query_string) = split_uri(&raw_uri);

        trace!(%method, path, "request context created");
        Self {
            env,
            method,
            path,
            query_string,
            started,
            headers: OnceCell::new(),
            query: OnceCell::new(),
            form: OnceCell::new(),
            json: OnceCell::new(),
            files: OnceCell::new(),
            cookies: OnceCell::new(),
        }
    }

    /// Captures the running process, see [`Environment::from_process`].
    pub fn from_process() -> Result<Self, ParseError> {
        Environment::from_process().map(Self::new)
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn server(&self, key: &str) -> Option<&str> {
        self.env.server.get(key).map(String::as_str)
    }

    pub fn server_params(&self) -> &HashMap<String, String> {
        &self.env.server
    }

    /// Request start in whole seconds since the epoch.
    pub fn time(&self) -> i64 {
        self.server("REQUEST_TIME").and_then(|value| value.parse().ok()).unwrap_or(self.started as i64)
    }

    /// Request start with sub-second precision.
    pub fn mtime(&self) -> f64 {
        self.server("REQUEST_TIME_FLOAT").and_then(|value| value.parse().ok()).unwrap_or(self.started)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    pub fn is_put(&self) -> bool {
        self.method == Method::PUT
    }

    pub fn is_patch(&self) -> bool {
        self.method == Method::PATCH
    }

    pub fn is_delete(&self) -> bool {
        self.method == Method::DELETE
    }

    pub fn is_cli(&self) -> bool {
        self.method.as_str() == CLI_METHOD
    }

    pub fn is_ajax(&self) -> bool {
        self.server("HTTP_X_REQUESTED_WITH") == Some("XMLHttpRequest")
    }

    pub fn is_secure(&self) -> bool {
        self.server("HTTPS").is_some_and(|https| !https.is_empty() && https != "off")
    }

    /// Normalized request path: one leading slash, no trailing or repeated ones.
    pub fn uri(&self) -> &str {
        &self.path
    }

    pub fn query_string(&self) -> Option<&str> {
        self.query_string.as_deref()
    }

    /// Request headers rebuilt from the `HTTP_*` server variables.
    pub fn headers(&self) -> &HeaderMap {
        self.headers.get_or_init(|| build_headers(&self.env.server))
    }

    pub fn content_type(&self) -> Option<mime::Mime> {
        self.server("CONTENT_TYPE").and_then(|value| value.parse().ok())
    }

    pub fn query_params(&self) -> &Params {
        self.query.get_or_init(|| match &self.env.query {
            Some(query) if !query.is_empty() => query.clone(),
            _ => self.query_string().map(|query| Params::parse(query.as_bytes())).unwrap_or_default(),
        })
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query_params().get(key)
    }

    pub fn form_params(&self) -> &Params {
        self.form.get_or_init(|| match &self.env.form {
            Some(form) if !form.is_empty() => form.clone(),
            _ if self.has_form_body() => Params::parse(&self.env.body),
            _ => Params::default(),
        })
    }

    pub fn form_param(&self, key: &str) -> Option<&str> {
        self.form_params().get(key)
    }

    /// The body decoded as a JSON object, empty when it is anything else.
    pub fn json_params(&self) -> &Map<String, Value> {
        self.json.get_or_init(|| {
            if !self.carries_body() || self.env.body.is_empty() {
                return Map::new();
            }
            match serde_json::from_slice::<Value>(&self.env.body) {
                Ok(Value::Object(map)) => map,
                Ok(_) => Map::new(),
                Err(e) => {
                    warn!(cause = %e, "request body is not valid json");
                    Map::new()
                }
            }
        })
    }

    pub fn json_param(&self, key: &str) -> Option<&Value> {
        self.json_params().get(key)
    }

    pub fn uploaded_files(&self) -> &HashMap<String, FileField> {
        self.files.get_or_init(|| {
            self.env.files.iter().map(|(field, raw)| (field.clone(), FileField::from(raw.clone()))).collect()
        })
    }

    pub fn uploaded_file(&self, key: &str) -> Option<&FileField> {
        self.uploaded_files().get(key)
    }

    pub fn cookies(&self) -> &Params {
        self.cookies.get_or_init(|| match &self.env.cookies {
            Some(cookies) => cookies.clone(),
            None => self.server("HTTP_COOKIE").map(parse_cookie_header).unwrap_or_default(),
        })
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies().get(name)
    }

    /// Deserializes the query string with nested `a[b]=c` keys.
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, ParseError> {
        serde_qs::from_str::<T>(self.query_string().unwrap_or_default()).map_err(ParseError::invalid_query)
    }

    pub fn form_as<T: DeserializeOwned>(&self) -> Result<T, ParseError> {
        serde_urlencoded::from_bytes::<T>(&self.env.body).map_err(ParseError::invalid_form)
    }

    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T, ParseError> {
        serde_json::from_slice::<T>(&self.env.body).map_err(ParseError::invalid_json)
    }

    pub fn body(&self) -> &[u8] {
        &self.env.body
    }

    pub fn user_agent(&self) -> &str {
        self.server("HTTP_USER_AGENT").unwrap_or_default()
    }

    /// Client address, `0.0.0.0` when `REMOTE_ADDR` is missing or not an address.
    pub fn ip(&self) -> IpAddr {
        self.server("REMOTE_ADDR")
            .and_then(|addr| addr.parse().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }

    fn carries_body(&self) -> bool {
        self.is_post() || self.is_put() || self.is_patch()
    }

    fn has_form_body(&self) -> bool {
        if self.is_put() || self.is_patch() {
            return true;
        }
        self.is_post()
            && self.content_type().is_some_and(|mime| mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str())
    }
}

fn parse_method(method: Option<&str>) -> Method {
    let method = method.unwrap_or(CLI_METHOD);
    Method::from_bytes(method.as_bytes()).unwrap_or_else(|e| {
        warn!(method, cause = %e, "invalid request method");
        Method::from_bytes(CLI_METHOD.as_bytes()).unwrap_or_default()
    })
}

fn uri_from_args(args: &[String]) -> String {
    if args.len() < 2 {
        return "/".to_string();
    }
    args[1..].join("/")
}

fn split_uri(raw: &str) -> (String, Option<String>) {
    let mut collapsed = String::with_capacity(raw.len() + 1);
    for c in raw.chars() {
        if c == '/' && collapsed.ends_with('/') {
            continue;
        }
        collapsed.push(c);
    }

    let trimmed = format!("/{}", collapsed.trim_matches('/'));
    let without_fragment = trimmed.split_once('#').map_or(trimmed.as_str(), |(before, _)| before);

    match without_fragment.split_once('?') {
        Some((path, query)) => {
            let query = (!query.is_empty()).then(|| query.to_string());
            (path.to_string(), query)
        }
        None => (without_fragment.to_string(), None),
    }
}

fn build_headers(server: &HashMap<String, String>) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(server.len());
    for (key, value) in server {
        let name = match key.as_str() {
            "CONTENT_TYPE" | "CONTENT_LENGTH" => key.as_str(),
            _ => match key.strip_prefix("HTTP_") {
                Some(name) => name,
                None => continue,
            },
        };

        let name = name.replace('_', "-").to_ascii_lowercase();
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => trace!(key, "skip invalid header variable"),
        }
    }
    headers
}

fn parse_cookie_header(header: &str) -> Params {
    header
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            // a raw `&` is part of the value, not a separator
            let escaped = pair.replace('&', "%26");
            url::form_urlencoded::parse(escaped.as_bytes()).next().map(|(k, v)| (k.into_owned(), v.into_owned()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::params::{RawUpload, UploadedFile};
    use http::header;
    use serde::Deserialize;

    fn context(vars: &[(&str, &str)]) -> RequestContext {
        let env = vars.iter().fold(Environment::new(), |env, (k, v)| env.with_server(*k, *v));
        RequestContext::new(env)
    }

    #[test]
    fn method_defaults_to_cli() {
        let request = context(&[]);
        assert!(request.is_cli());
        assert_eq!(request.method().as_str(), "CLI");
        assert!(!request.is_get());

        let request = context(&[("REQUEST_METHOD", "PATCH")]);
        assert!(request.is_patch());
        assert_eq!(request.method(), Method::PATCH);
    }

    #[test]
    fn uri_is_normalized() {
        let request = context(&[("REQUEST_URI", "//users///42/?page=2&sort=name#top")]);
        assert_eq!(request.uri(), "/users/42/");
        assert_eq!(request.query_string(), Some("page=2&sort=name"));

        assert_eq!(context(&[("REQUEST_URI", "/blog/")]).uri(), "/blog");
        assert_eq!(context(&[("REQUEST_URI", "")]).uri(), "/");
        assert_eq!(context(&[]).uri(), "/");
        assert_eq!(context(&[]).query_string(), None);
    }

    #[test]
    fn uri_from_cli_arguments() {
        let request = RequestContext::new(Environment::new().with_args(["bin", "jobs", "run"]));
        assert_eq!(request.uri(), "/jobs/run");

        let request = RequestContext::new(Environment::new().with_args(["bin"]));
        assert_eq!(request.uri(), "/");
    }

    #[test]
    fn flags() {
        let request = context(&[("HTTPS", "on"), ("HTTP_X_REQUESTED_WITH", "XMLHttpRequest")]);
        assert!(request.is_secure());
        assert!(request.is_ajax());

        assert!(!context(&[("HTTPS", "off")]).is_secure());
        assert!(!context(&[("HTTPS", "")]).is_secure());
        assert!(!context(&[]).is_ajax());
    }

    #[test]
    fn time_from_server_or_construction() {
        let request = context(&[("REQUEST_TIME", "1700000000"), ("REQUEST_TIME_FLOAT", "1700000000.25")]);
        assert_eq!(request.time(), 1_700_000_000);
        assert_eq!(request.mtime(), 1_700_000_000.25);

        let request = context(&[]);
        assert!(request.time() > 0);
        assert_eq!(request.time(), request.time());
        assert_eq!(request.mtime(), request.mtime());
    }

    #[test]
    fn headers_from_server_variables() {
        let request = context(&[
            ("HTTP_ACCEPT", "*/*"),
            ("HTTP_X_FORWARDED_FOR", "10.0.0.1"),
            ("CONTENT_TYPE", "application/json"),
            ("SERVER_NAME", "localhost"),
        ]);

        let headers = request.headers();
        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get(header::ACCEPT).unwrap(), "*/*");
        assert_eq!(headers.get("x-forwarded-for").unwrap(), "10.0.0.1");
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn query_params_from_host_or_uri() {
        let request = context(&[("REQUEST_URI", "/search?q=rust+lang&page=2")]);
        assert_eq!(request.query_param("q"), Some("rust lang"));
        assert_eq!(request.query_param("page"), Some("2"));
        assert_eq!(request.query_param("missing"), None);

        let mut host = Params::new();
        host.insert("q", "host");
        let request = RequestContext::new(
            Environment::new().with_server("REQUEST_URI", "/search?q=uri").with_query(host),
        );
        assert_eq!(request.query_param("q"), Some("host"));
    }

    #[test]
    fn form_params_by_method() {
        let post = Environment::new()
            .with_server("REQUEST_METHOD", "POST")
            .with_server("CONTENT_TYPE", "application/x-www-form-urlencoded; charset=UTF-8")
            .with_body("name=ann&age=7");
        assert_eq!(RequestContext::new(post).form_param("name"), Some("ann"));

        let put = Environment::new().with_server("REQUEST_METHOD", "PUT").with_body("name=bob");
        assert_eq!(RequestContext::new(put).form_param("name"), Some("bob"));

        let json_post = Environment::new()
            .with_server("REQUEST_METHOD", "POST")
            .with_server("CONTENT_TYPE", "application/json")
            .with_body("name=bob");
        assert!(RequestContext::new(json_post).form_params().is_empty());

        let get = Environment::new().with_server("REQUEST_METHOD", "GET").with_body("name=bob");
        assert!(RequestContext::new(get).form_params().is_empty());
    }

    #[test]
    fn json_params_only_for_objects() {
        let request = RequestContext::new(
            Environment::new().with_server("REQUEST_METHOD", "POST").with_body(r#"{"id": 7, "tags": ["a"]}"#),
        );
        assert_eq!(request.json_param("id"), Some(&Value::from(7)));
        assert_eq!(request.json_params().len(), 2);

        let array = RequestContext::new(Environment::new().with_server("REQUEST_METHOD", "PUT").with_body("[1, 2]"));
        assert!(array.json_params().is_empty());

        let broken = RequestContext::new(Environment::new().with_server("REQUEST_METHOD", "POST").with_body("{"));
        assert!(broken.json_params().is_empty());

        let get = RequestContext::new(Environment::new().with_server("REQUEST_METHOD", "GET").with_body("{}"));
        assert!(get.json_params().is_empty());
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Filter {
        page: u32,
        tags: Vec<String>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Login {
        user: String,
        remember: bool,
    }

    #[test]
    fn typed_extraction() {
        let request = context(&[("REQUEST_URI", "/list?page=3&tags[0]=a&tags[1]=b")]);
        let filter: Filter = request.query_as().unwrap();
        assert_eq!(filter, Filter { page: 3, tags: vec!["a".into(), "b".into()] });

        let request = RequestContext::new(Environment::new().with_body("user=ann&remember=true"));
        let login: Login = request.form_as().unwrap();
        assert_eq!(login, Login { user: "ann".into(), remember: true });

        let request = RequestContext::new(Environment::new().with_body(r#"{"user":"bob","remember":false}"#));
        let login: Login = request.json_as().unwrap();
        assert_eq!(login.user, "bob");

        let request = RequestContext::new(Environment::new().with_body("not json"));
        assert!(matches!(request.json_as::<Login>(), Err(ParseError::InvalidJson { .. })));
        assert!(matches!(context(&[("REQUEST_URI", "/?page=x")]).query_as::<Filter>(), Err(ParseError::InvalidQuery { .. })));
    }

    #[test]
    fn uploaded_files_are_flattened() {
        let single = UploadedFile { name: "cv.pdf".into(), size: 10, ..UploadedFile::default() };
        let multi = RawUpload::Columns {
            name: vec!["a".into(), "b".into()],
            mime_type: vec![],
            tmp_name: vec!["/tmp/a".into(), "/tmp/b".into()],
            error: vec![0, 0],
            size: vec![1, 2],
        };
        let request = RequestContext::new(
            Environment::new().with_file("cv", RawUpload::Single(single.clone())).with_file("photos", multi),
        );

        assert_eq!(request.uploaded_file("cv"), Some(&FileField::Single(single)));
        assert_eq!(request.uploaded_file("photos").unwrap().files()[1].size, 2);
        assert!(request.uploaded_file("other").is_none());
    }

    #[test]
    fn cookies_from_header() {
        let request = context(&[("HTTP_COOKIE", "sid=abc%3D; theme=dark; empty=; q=a&b")]);
        assert_eq!(request.cookie("sid"), Some("abc="));
        assert_eq!(request.cookie("theme"), Some("dark"));
        assert_eq!(request.cookie("empty"), Some(""));
        assert_eq!(request.cookie("q"), Some("a&b"));
        assert_eq!(request.cookie("missing"), None);
    }

    #[test]
    fn client_info() {
        let request = context(&[("REMOTE_ADDR", "192.168.1.20"), ("HTTP_USER_AGENT", "curl/8.0")]);
        assert_eq!(request.ip().to_string(), "192.168.1.20");
        assert_eq!(request.user_agent(), "curl/8.0");

        assert_eq!(context(&[("REMOTE_ADDR", "nope")]).ip().to_string(), "0.0.0.0");
        assert_eq!(context(&[]).user_agent(), "");
    }
}
