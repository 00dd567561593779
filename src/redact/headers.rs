//! Header redaction.

use std::collections::{BTreeMap, HashSet};

use super::REDACTED_MARKER;

/// Flat header mapping as it appears in the wire payload.
pub type HeaderFields = BTreeMap<String, String>;

/// Case-insensitive set of header names whose values must be hidden.
#[derive(Debug, Clone, Default)]
pub struct HeaderRules {
    names: HashSet<String>,
}

impl HeaderRules {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_ascii_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.names.contains(&name.to_ascii_lowercase())
    }

    /// Copy `headers`, replacing the value of every matching name.
    pub fn apply(&self, headers: &HeaderFields) -> HeaderFields {
        headers
            .iter()
            .map(|(name, value)| {
                let value = if self.matches(name) {
                    REDACTED_MARKER.to_string()
                } else {
                    value.clone()
                };
                (name.clone(), value)
            })
            .collect()
    }
}

/// Redact `headers` against an ad-hoc list of sensitive names.
pub fn redact_headers<S: AsRef<str>>(headers: &HeaderFields, sensitive: &[S]) -> HeaderFields {
    HeaderRules::new(sensitive).apply(headers)
}
