//! Label-set canonicalization.
//!
//! Attributes are kept in a `BTreeMap`, so iteration is always in
//! lexicographic key order no matter how the client ordered them. Both the
//! lookup key and the exposition label block derive from that order.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{MetricsError, Result};

/// Lookup key used for the empty label set.
pub const DEFAULT_LABEL_KEY: &str = "__default__";

/// Separator between `key=value` pairs in a lookup key.
const KEY_SEPARATOR: char = '|';

/// Escape a label value per the Prometheus text format.
pub fn escape_label_value(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Replace characters outside `[a-zA-Z0-9_]` with `_`.
pub fn sanitize_label_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// An attribute map in canonical (sorted) order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeMap<String, String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    /// Deterministic lookup key: `"__default__"` or `k1=v1|k2=v2`.
    ///
    /// Separator and `=` inside keys or values are backslash-escaped so two
    /// different sets never produce the same key.
    pub fn key(&self) -> String {
        join_key(self.0.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Lookup key over the sanitized label names, i.e. the series identity a
    /// scraper sees. Sets that differ only in characters lost to
    /// sanitization share it.
    pub fn exposed_key(&self) -> String {
        let exposed: BTreeMap<String, &str> = self
            .0
            .iter()
            .map(|(k, v)| (sanitize_label_name(k), v.as_str()))
            .collect();
        join_key(exposed.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    /// Fails if two names sanitize to the same label name, or if a name
    /// sanitizes to one of `reserved`.
    pub fn check_names(&self, reserved: &[&str]) -> Result<()> {
        let mut seen: BTreeMap<String, &str> = BTreeMap::new();
        for k in self.0.keys() {
            let name = sanitize_label_name(k);
            if reserved.contains(&name.as_str()) {
                return Err(MetricsError::Validation(format!(
                    "attribute {k} uses the reserved label name {name}"
                )));
            }
            match seen.entry(name) {
                Entry::Occupied(e) => {
                    return Err(MetricsError::Validation(format!(
                        "attributes {} and {k} both export as label {}",
                        e.get(),
                        e.key()
                    )));
                }
                Entry::Vacant(e) => {
                    e.insert(k.as_str());
                }
            }
        }
        Ok(())
    }

    /// Comma-separated `k="v"` pairs without braces.
    pub fn write_pairs(&self, out: &mut String) {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&sanitize_label_name(k));
            out.push_str("=\"");
            out.push_str(&escape_label_value(v));
            out.push('"');
        }
    }

    /// Exposition label block: `{k1="v1",k2="v2"}`, or empty for no labels.
    pub fn render(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        let mut out = String::from("{");
        self.write_pairs(&mut out);
        out.push('}');
        out
    }
}

fn join_key<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let mut out = String::new();
    for (i, (k, v)) in pairs.enumerate() {
        if i > 0 {
            out.push(KEY_SEPARATOR);
        }
        push_key_part(&mut out, k);
        out.push('=');
        push_key_part(&mut out, v);
    }
    if out.is_empty() {
        return DEFAULT_LABEL_KEY.to_string();
    }
    out
}

fn push_key_part(out: &mut String, s: &str) {
    for c in s.chars() {
        if matches!(c, '\\' | '=' | KEY_SEPARATOR) {
            out.push('\\');
        }
        out.push(c);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<BTreeMap<String, String>> for LabelSet {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}
