//! HTTP Header types
//!
//! Header names are stored in canonical form (`content-type` becomes
//! `Content-Type`), so every lookup is case-insensitive and differently-cased
//! spellings of one header collapse into a single entry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Returns the canonical form of a header name.
///
/// The first letter and every letter following a hyphen are upper-cased, all
/// other letters are lower-cased. Names containing characters that are not
/// valid in a header token are returned unchanged.
#[must_use]
pub fn canonical_header_name(name: &str) -> String {
    if name.is_empty() || !name.bytes().all(is_token_byte) {
        return name.to_string();
    }

    let mut canonical = String::with_capacity(name.len());
    let mut upper = true;
    for ch in name.chars() {
        if upper {
            canonical.push(ch.to_ascii_uppercase());
        } else {
            canonical.push(ch.to_ascii_lowercase());
        }
        upper = ch == '-';
    }
    canonical
}

/// Returns true if the byte is allowed in an HTTP token.
#[must_use]
pub const fn is_token_byte(b: u8) -> bool {
    matches!(b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.'
        | b'^' | b'_' | b'`' | b'|' | b'~'
        | b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z')
}

/// A multi-valued collection of HTTP headers keyed by canonical name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct HeaderSet {
    entries: BTreeMap<String, Vec<String>>,
}

impl HeaderSet {
    /// Creates an empty header set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Replaces all values of `name` with a single value.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.entries
            .insert(canonical_header_name(name), vec![value.into()]);
    }

    /// Adds a value to `name`, keeping existing values.
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.entries
            .entry(canonical_header_name(name))
            .or_default()
            .push(value.into());
    }

    /// Replaces all values of `name`.
    pub fn set_all<I, V>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.entries.insert(
            canonical_header_name(name),
            values.into_iter().map(Into::into).collect(),
        );
    }

    /// Builder form of [`HeaderSet::set_all`].
    #[must_use]
    pub fn with<I, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.set_all(name, values);
        self
    }

    /// Returns the first value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Returns every value of `name`, or an empty slice.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries
            .get(&canonical_header_name(name))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Returns true if `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&canonical_header_name(name))
    }

    /// Removes `name`, returning its values.
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.entries.remove(&canonical_header_name(name))
    }

    /// Copies every header of `other` into this set, replacing same-named
    /// entries.
    pub fn merge(&mut self, other: &Self) {
        for (name, values) in &other.entries {
            self.entries.insert(name.clone(), values.clone());
        }
    }

    /// Iterates over `(name, values)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Returns the number of distinct header names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<BTreeMap<String, Vec<String>>> for HeaderSet {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        let mut headers = Self::new();
        for (name, values) in map {
            for value in values {
                headers.append(&name, value);
            }
        }
        headers
    }
}

impl From<HeaderSet> for BTreeMap<String, Vec<String>> {
    fn from(headers: HeaderSet) -> Self {
        headers.entries
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.append(name.as_ref(), value);
        }
        headers
    }
}
