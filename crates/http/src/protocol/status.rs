//! Status code to reason phrase lookup.
//!
//! The table covers the IANA registered codes from 100 to 511. It is built once
//! per process and shared by every [`ResponseBuilder`](crate::response::ResponseBuilder).

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Reason phrase used for codes that are not in the table.
pub const UNKNOWN_STATUS: &str = "Unknown Status";

const REASONS: &[(u16, &str)] = &[
    (100, "Continue"),
    (101, "Switching Protocols"),
    (102, "Processing"),
    (103, "Early Hints"),
    (200, "OK"),
    (201, "Created"),
    (202, "Accepted"),
    (203, "Non-Authoritative Information"),
    (204, "No Content"),
    (205, "Reset Content"),
    (206, "Partial Content"),
    (207, "Multi-Status"),
    (208, "Already Reported"),
    (226, "IM Used"),
    (300, "Multiple Choices"),
    (301, "Moved Permanently"),
    (302, "Found"),
    (303, "See Other"),
    (304, "Not Modified"),
    (305, "Use Proxy"),
    (306, "Reserved"),
    (307, "Temporary Redirect"),
    (308, "Permanent Redirect"),
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (402, "Payment Required"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (405, "Method Not Allowed"),
    (406, "Not Acceptable"),
    (407, "Proxy Authentication Required"),
    (408, "Request Timeout"),
    (409, "Conflict"),
    (410, "Gone"),
    (411, "Length Required"),
    (412, "Precondition Failed"),
    (413, "Content Too Large"),
    (414, "URI Too Long"),
    (415, "Unsupported Media Type"),
    (416, "Range Not Satisfiable"),
    (417, "Expectation Failed"),
    (418, "I'm a teapot"),
    (421, "Misdirected Request"),
    (422, "Unprocessable Content"),
    (423, "Locked"),
    (424, "Failed Dependency"),
    (425, "Too Early"),
    (426, "Upgrade Required"),
    (428, "Precondition Required"),
    (429, "Too Many Requests"),
    (431, "Request Header Fields Too Large"),
    (451, "Unavailable For Legal Reasons"),
    (500, "Internal Server Error"),
    (501, "Not Implemented"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
    (504, "Gateway Timeout"),
    (505, "HTTP Version Not Supported"),
    (506, "Variant Also Negotiates"),
    (507, "Insufficient Storage"),
    (508, "Loop Detected"),
    (510, "Not Extended"),
    (511, "Network Authentication Required"),
];

static STATUS_REASONS: Lazy<StatusReasons> = Lazy::new(|| StatusReasons { table: REASONS.iter().copied().collect() });

/// Immutable lookup service from status code to its canonical reason phrase.
#[derive(Debug)]
pub struct StatusReasons {
    table: HashMap<u16, &'static str>,
}

impl StatusReasons {
    /// Returns the process wide table.
    pub fn global() -> &'static StatusReasons {
        &STATUS_REASONS
    }

    /// Returns the registered reason phrase for `code`, if any.
    pub fn get(&self, code: u16) -> Option<&'static str> {
        self.table.get(&code).copied()
    }

    /// Returns the registered reason phrase, falling back to [`UNKNOWN_STATUS`].
    pub fn reason(&self, code: u16) -> &'static str {
        self.get(code).unwrap_or(UNKNOWN_STATUS)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
