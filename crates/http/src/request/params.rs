//! Parsed request data: key/value parameters and uploaded files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::trace;

/// An ordered list of decoded `key=value` pairs.
///
/// Keys may repeat; single value lookups see the last occurrence, like a form
/// field submitted twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an `application/x-www-form-urlencoded` payload.
    pub fn parse(input: &[u8]) -> Self {
        let pairs: Vec<(String, String)> =
            url::form_urlencoded::parse(input).map(|(key, value)| (key.into_owned(), value.into_owned())).collect();
        trace!(count = pairs.len(), "parsed urlencoded params");
        Self { pairs }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Every value of `key`, in order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self { pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// One file received through a multipart upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Original file name on the client.
    pub name: String,
    /// Mime type reported by the client.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Where the host stored the upload.
    pub tmp_name: PathBuf,
    /// Upload status code, `0` means success.
    pub error: i32,
    pub size: u64,
}

impl UploadedFile {
    pub fn is_ok(&self) -> bool {
        self.error == 0
    }
}

/// Upload table entry as a host delivers it.
///
/// A field that accepts several files arrives column-major: one list per
/// property, indexed by file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawUpload {
    Single(UploadedFile),
    Columns {
        #[serde(default)]
        name: Vec<String>,
        #[serde(default, rename = "type")]
        mime_type: Vec<String>,
        tmp_name: Vec<PathBuf>,
        #[serde(default)]
        error: Vec<i32>,
        #[serde(default)]
        size: Vec<u64>,
    },
}

/// An upload field with one or several files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileField {
    Single(UploadedFile),
    Multiple(Vec<UploadedFile>),
}

impl FileField {
    /// The field's files, one for a single upload.
    pub fn files(&self) -> &[UploadedFile] {
        match self {
            FileField::Single(file) => std::slice::from_ref(file),
            FileField::Multiple(files) => files,
        }
    }
}

impl From<RawUpload> for FileField {
    /// Turns column-major uploads into one record per file.
    fn from(raw: RawUpload) -> Self {
        match raw {
            RawUpload::Single(file) => FileField::Single(file),
            RawUpload::Columns { name, mime_type, tmp_name, error, size } => {
                let files = tmp_name
                    .into_iter()
                    .enumerate()
                    .map(|(i, tmp_name)| UploadedFile {
                        name: name.get(i).cloned().unwrap_or_default(),
                        mime_type: mime_type.get(i).cloned().unwrap_or_default(),
                        tmp_name,
                        error: error.get(i).copied().unwrap_or_default(),
                        size: size.get(i).copied().unwrap_or_default(),
                    })
                    .collect();
                FileField::Multiple(files)
            }
        }
    }
}
