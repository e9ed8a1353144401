//! Short alias to mime type lookup.
//!
//! Each alias (usually a file extension) maps to one or more mime types. The
//! first entry is the canonical one written into `Content-Type`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

const MIME_TYPES: &[(&str, &[&str])] = &[
    ("txt", &["text/plain"]),
    ("text", &["text/plain"]),
    ("html", &["text/html"]),
    ("htm", &["text/html"]),
    ("shtml", &["text/html"]),
    ("css", &["text/css", "text/plain"]),
    ("csv", &["text/csv", "text/x-comma-separated-values", "application/vnd.ms-excel"]),
    ("tsv", &["text/tab-separated-values"]),
    ("ics", &["text/calendar"]),
    ("vcf", &["text/x-vcard"]),
    ("md", &["text/markdown"]),
    ("xml", &["application/xml", "text/xml"]),
    ("xsl", &["application/xml", "text/xsl", "text/xml"]),
    ("xhtml", &["application/xhtml+xml"]),
    ("rss", &["application/rss+xml"]),
    ("atom", &["application/atom+xml"]),
    ("js", &["application/javascript", "application/x-javascript", "text/javascript"]),
    ("mjs", &["text/javascript"]),
    ("json", &["application/json", "text/json"]),
    ("jsonld", &["application/ld+json"]),
    ("map", &["application/json"]),
    ("form", &["application/x-www-form-urlencoded"]),
    ("multipart", &["multipart/form-data"]),
    ("bin", &["application/octet-stream"]),
    ("exe", &["application/octet-stream", "application/x-msdownload"]),
    ("pdf", &["application/pdf", "application/force-download", "application/x-download"]),
    ("ai", &["application/pdf", "application/postscript"]),
    ("eps", &["application/postscript"]),
    ("ps", &["application/postscript"]),
    ("rtf", &["text/rtf"]),
    ("doc", &["application/msword", "application/vnd.ms-office"]),
    ("docx", &["application/vnd.openxmlformats-officedocument.wordprocessingml.document"]),
    ("xls", &["application/vnd.ms-excel", "application/msexcel", "application/x-msexcel"]),
    ("xlsx", &["application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"]),
    ("ppt", &["application/vnd.ms-powerpoint", "application/powerpoint"]),
    ("pptx", &["application/vnd.openxmlformats-officedocument.presentationml.presentation"]),
    ("odt", &["application/vnd.oasis.opendocument.text"]),
    ("ods", &["application/vnd.oasis.opendocument.spreadsheet"]),
    ("odp", &["application/vnd.oasis.opendocument.presentation"]),
    ("epub", &["application/epub+zip"]),
    ("zip", &["application/zip", "application/x-zip", "application/x-zip-compressed", "multipart/x-zip"]),
    ("gz", &["application/gzip", "application/x-gzip"]),
    ("tgz", &["application/x-tar", "application/x-gzip-compressed"]),
    ("tar", &["application/x-tar"]),
    ("rar", &["application/vnd.rar", "application/x-rar", "application/x-rar-compressed"]),
    ("7z", &["application/x-7z-compressed"]),
    ("bz2", &["application/x-bzip2"]),
    ("wasm", &["application/wasm"]),
    ("swf", &["application/x-shockwave-flash"]),
    ("jar", &["application/java-archive", "application/x-java-application"]),
    ("sql", &["application/sql"]),
    ("gif", &["image/gif"]),
    ("jpg", &["image/jpeg", "image/pjpeg"]),
    ("jpeg", &["image/jpeg", "image/pjpeg"]),
    ("jpe", &["image/jpeg", "image/pjpeg"]),
    ("png", &["image/png", "image/x-png"]),
    ("apng", &["image/apng"]),
    ("webp", &["image/webp"]),
    ("avif", &["image/avif"]),
    ("bmp", &["image/bmp", "image/x-bmp", "image/x-ms-bmp"]),
    ("ico", &["image/x-icon", "image/vnd.microsoft.icon"]),
    ("svg", &["image/svg+xml", "application/xml", "text/xml"]),
    ("tif", &["image/tiff"]),
    ("tiff", &["image/tiff"]),
    ("heic", &["image/heic"]),
    ("psd", &["image/vnd.adobe.photoshop", "application/x-photoshop"]),
    ("mp3", &["audio/mpeg", "audio/mpg", "audio/mpeg3", "audio/mp3"]),
    ("wav", &["audio/x-wav", "audio/wave", "audio/wav"]),
    ("ogg", &["audio/ogg", "video/ogg", "application/ogg"]),
    ("oga", &["audio/ogg"]),
    ("flac", &["audio/x-flac", "audio/flac"]),
    ("aac", &["audio/x-acc", "audio/aac"]),
    ("m4a", &["audio/x-m4a", "audio/mp4"]),
    ("mid", &["audio/midi"]),
    ("midi", &["audio/midi"]),
    ("weba", &["audio/webm"]),
    ("mp4", &["video/mp4"]),
    ("m4v", &["video/x-m4v"]),
    ("mpeg", &["video/mpeg"]),
    ("mpg", &["video/mpeg"]),
    ("mov", &["video/quicktime"]),
    ("avi", &["video/x-msvideo", "video/msvideo", "video/avi"]),
    ("webm", &["video/webm"]),
    ("ogv", &["video/ogg"]),
    ("3gp", &["video/3gp", "video/3gpp"]),
    ("mkv", &["video/x-matroska"]),
    ("woff", &["font/woff", "application/font-woff"]),
    ("woff2", &["font/woff2"]),
    ("ttf", &["font/ttf", "application/font-sfnt"]),
    ("otf", &["font/otf"]),
    ("eot", &["application/vnd.ms-fontobject"]),
];

static MIME_TABLE: Lazy<MimeTypes> = Lazy::new(|| MimeTypes { table: MIME_TYPES.iter().copied().collect() });

/// Immutable lookup service from a short alias (`json`, `html`, ...) to mime types.
#[derive(Debug)]
pub struct MimeTypes {
    table: HashMap<&'static str, &'static [&'static str]>,
}

impl MimeTypes {
    /// Returns the process wide table.
    pub fn global() -> &'static MimeTypes {
        &MIME_TABLE
    }

    /// Returns the canonical mime type registered for `alias`.
    pub fn canonical(&self, alias: &str) -> Option<&'static str> {
        self.all(alias).first().copied()
    }

    /// Returns every mime type registered for `alias`, canonical first.
    pub fn all(&self, alias: &str) -> &'static [&'static str] {
        self.table.get(alias).copied().unwrap_or(&[])
    }

    /// Resolves `value` as an alias, returning it unchanged when it is not one.
    pub fn resolve<'a>(&self, value: &'a str) -> &'a str {
        match self.canonical(value) {
            Some(mime) => mime,
            None => value,
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
