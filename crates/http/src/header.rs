//! Multi-value response header storage.
//!
//! Header names are canonicalized (`content-type` becomes `Content-Type`) and
//! the canonical form is the lookup key, so lookups are insensitive to case
//! and format. Each name holds an ordered list of values, which is how several
//! `Set-Cookie` headers coexist.

pub const SET_COOKIE: &str = "Set-Cookie";

/// Canonical, hyphen-capitalized form of a header name.
///
/// Every word is lowercased and its first letter uppercased. Hyphens and
/// spaces both separate words and come out as hyphens: `x-REQUESTED with`
/// becomes `X-Requested-With`.
pub fn canonical_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut word_start = true;
    for c in name.chars() {
        if c == '-' || c == ' ' {
            canonical.push('-');
            word_start = true;
            continue;
        }
        if word_start {
            canonical.push(c.to_ascii_uppercase());
        } else {
            canonical.push(c.to_ascii_lowercase());
        }
        word_start = false;
    }
    canonical
}

/// Ordered mapping from canonical header name to its values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderTable {
    entries: Vec<(String, Vec<String>)>,
}

impl HeaderTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, canonical: &str) -> Option<usize> {
        self.entries.iter().position(|(name, _)| name == canonical)
    }

    /// Replaces every value of `name` with `value`.
    ///
    /// A name that already exists keeps its position.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let canonical = canonical_name(name);
        match self.position(&canonical) {
            Some(index) => self.entries[index].1 = vec![value.into()],
            None => self.entries.push((canonical, vec![value.into()])),
        }
    }

    /// Appends `value` to the values of `name`.
    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        let canonical = canonical_name(name);
        match self.position(&canonical) {
            Some(index) => self.entries[index].1.push(value.into()),
            None => self.entries.push((canonical, vec![value.into()])),
        }
    }

    /// Deletes `name` and all its values. Unknown names are ignored.
    pub fn remove(&mut self, name: &str) {
        if let Some(index) = self.position(&canonical_name(name)) {
            self.entries.remove(index);
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.position(&canonical_name(name)).map(|index| self.entries[index].1.as_slice())
    }

    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|values| values.first()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(&canonical_name(name)).is_some()
    }

    /// Iterates names in insertion order together with their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize() {
        assert_eq!(canonical_name("content-type"), "Content-Type");
        assert_eq!(canonical_name("CONTENT-TYPE"), "Content-Type");
        assert_eq!(canonical_name("x-requested-WITH"), "X-Requested-With");
        assert_eq!(canonical_name("set-cookie"), SET_COOKIE);
        assert_eq!(canonical_name("etag"), "Etag");
        assert_eq!(canonical_name("www-authenticate"), "Www-Authenticate");
        assert_eq!(canonical_name(""), "");
    }

    #[test]
    fn spaces_separate_words() {
        assert_eq!(canonical_name("content type"), "Content-Type");
        assert_eq!(canonical_name("X requested-WITH"), "X-Requested-With");

        let mut headers = HeaderTable::new();
        headers.set("cache control", "no-store");
        headers.add("Cache-Control", "private");
        assert_eq!(headers.get("cache-control").map(<[String]>::len), Some(2));
    }

    #[test]
    fn set_replaces() {
        let mut headers = HeaderTable::new();
        headers.set("Content-Type", "text/plain");
        headers.set("content-type", "text/html");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CONTENT-TYPE"), Some(&["text/html".to_string()][..]));
    }

    #[test]
    fn add_appends_and_set_does_not_merge() {
        let mut headers = HeaderTable::new();
        headers.set("Content-Type", "text/plain");
        headers.add("content-type", "x");
        assert_eq!(headers.get("Content-Type").unwrap(), &["text/plain".to_string(), "x".to_string()]);

        headers.set("Content-Type", "text/plain");
        assert_eq!(headers.get("Content-Type").unwrap(), &["text/plain".to_string()]);
        assert_eq!(headers.get_first("content-type"), Some("text/plain"));
    }

    #[test]
    fn remove_and_missing() {
        let mut headers = HeaderTable::new();
        headers.add("set-cookie", "a=1");
        headers.add("Set-Cookie", "b=2");
        assert_eq!(headers.get(SET_COOKIE).map(<[String]>::len), Some(2));

        headers.remove("SET-COOKIE");
        assert!(!headers.contains(SET_COOKIE));
        headers.remove("x-missing");
        assert!(headers.is_empty());
        assert_eq!(headers.get_first("x-missing"), None);
    }

    #[test]
    fn keeps_insertion_order() {
        let mut headers = HeaderTable::new();
        headers.set("b", "1");
        headers.set("a", "2");
        headers.set("c", "3");
        headers.set("B", "4");

        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
        assert_eq!(headers.get_first("b"), Some("4"));

        headers.clear();
        assert_eq!(headers.len(), 0);
    }
}
