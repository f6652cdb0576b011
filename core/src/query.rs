//! Query-string builder for `/api` calls.
//!
//! Every call is `method=<operation>` followed by `&key=value` pairs in the
//! order they were added. Absent and empty values are dropped, optional
//! booleans are sent as `1` or not at all, and list values are joined with
//! commas.
//!
//! Values are percent-encoded. Path separators, colons, commas and dots are
//! left alone, so `dir=/tmp/x` and `hosts=10.0.0.1:4567,example.com:8975`
//! appear on the wire exactly as written, while `&`, `=`, `#`, `+` and `%` can
//! no longer corrupt the query.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::{Map, Value};

const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// An operation name plus its ordered parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    method: String,
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new(method: &str) -> Self {
        Self {
            method: method.to_string(),
            params: Vec::new(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Append a parameter. Empty values and keys already present are skipped.
    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            return self;
        }
        if key == "method" {
            tracing::warn!(method = %self.method, "refusing to override `method` parameter");
            return self;
        }
        if self.get(key).is_some() {
            tracing::warn!(method = %self.method, key, "refusing duplicate parameter");
            return self;
        }
        self.params.push((key.to_string(), value));
        self
    }

    /// Append a parameter only when it is present.
    pub fn opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Append `key=1` when set; omit the key otherwise.
    pub fn flag(self, key: &str, on: bool) -> Self {
        if on {
            self.param(key, "1")
        } else {
            self
        }
    }

    /// Append a comma-joined list. An empty list is omitted.
    pub fn list<S: AsRef<str>>(self, key: &str, values: &[S]) -> Self {
        let joined = values
            .iter()
            .map(AsRef::as_ref)
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        self.param(key, joined)
    }

    /// Append every preference in insertion order.
    pub fn prefs(self, prefs: &Preferences) -> Self {
        prefs
            .iter()
            .fold(self, |query, (key, value)| query.param(key, value))
    }

    /// Render `method=<op>&k=v...`.
    pub fn encode(&self) -> String {
        let mut out = format!("method={}", encode_value(&self.method));
        for (key, value) in &self.params {
            out.push('&');
            out.push_str(&encode_value(key));
            out.push('=');
            out.push_str(&encode_value(value));
        }
        out
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn encode_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Ordered preference settings for `set_prefs` and `set_folder_prefs`.
///
/// Unlike optional call flags, preference flags are sent as `1` or `0` so a
/// setting can be switched off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    entries: Vec<(String, String)>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a preference, replacing an earlier value for the same key in place.
    pub fn set(mut self, key: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
        self
    }

    pub fn flag(self, key: &str, on: bool) -> Self {
        self.set(key, if on { "1" } else { "0" })
    }

    /// Convert a `get_prefs`-style object into settable preferences.
    ///
    /// Booleans become `1`/`0`; numbers and strings are kept verbatim; nulls,
    /// arrays and nested objects are skipped.
    pub fn from_json(object: &Map<String, Value>) -> Self {
        object
            .iter()
            .fold(Self::new(), |prefs, (key, value)| match value {
                Value::Bool(on) => prefs.flag(key, *on),
                Value::Number(n) => prefs.set(key, n),
                Value::String(s) => prefs.set(key, s),
                _ => prefs,
            })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: ToString> FromIterator<(K, V)> for Preferences {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |prefs, (k, v)| prefs.set(k.as_ref(), v))
    }
}
