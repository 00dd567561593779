//! Body redaction paths.
//!
//! # Syntax
//! - `password`, `user.password`: object keys separated by dots
//! - `$.user.password`: optional JSONPath-style root prefix
//! - `items[0].token`: array index
//! - `items[*].token`, `user.*`: every element / every member
//! - `headers['x-api-key']`, `headers["x-api-key"]`: quoted keys (may contain dots)
//!
//! Keys are case-sensitive. A path that addresses nothing is not an error.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

/// Errors raised while parsing a redaction path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedactPathError {
    #[error("redaction path is empty")]
    Empty,

    #[error("invalid redaction path '{path}': {reason} at offset {offset}")]
    Syntax {
        path: String,
        offset: usize,
        reason: &'static str,
    },
}

/// One step into a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
    Wildcard,
}

/// A compiled body redaction path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    raw: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Parse a dot/bracket path.
    pub fn parse(path: &str) -> Result<Self, RedactPathError> {
        let trimmed = path.trim();
        let mut rest = trimmed;
        let mut offset = 0;

        if let Some(stripped) = rest.strip_prefix('$') {
            rest = stripped;
            offset += 1;
            if let Some(stripped) = rest.strip_prefix('.') {
                rest = stripped;
                offset += 1;
            }
        }

        let syntax = |offset: usize, reason: &'static str| RedactPathError::Syntax {
            path: trimmed.to_string(),
            offset,
            reason,
        };

        let bytes = rest.as_bytes();
        let mut segments = Vec::new();
        let mut i = 0;
        let mut expect_key = true;

        while i < bytes.len() {
            match bytes[i] {
                b'.' => {
                    if expect_key {
                        return Err(syntax(offset + i, "empty key"));
                    }
                    expect_key = true;
                    i += 1;
                }
                b'[' => {
                    let close = rest[i..]
                        .find(']')
                        .map(|pos| i + pos)
                        .ok_or_else(|| syntax(offset + i, "unclosed bracket"))?;
                    let inner = rest[i + 1..close].trim();
                    let segment = parse_bracket(inner).ok_or_else(|| syntax(offset + i, "bad bracket"))?;
                    segments.push(segment);
                    expect_key = false;
                    i = close + 1;
                }
                b']' => return Err(syntax(offset + i, "unexpected ']'")),
                _ => {
                    if !expect_key {
                        return Err(syntax(offset + i, "missing '.' between keys"));
                    }
                    let end = rest[i..]
                        .find(['.', '['])
                        .map(|pos| i + pos)
                        .unwrap_or(bytes.len());
                    let key = &rest[i..end];
                    if key.contains(']') {
                        return Err(syntax(offset + i, "unexpected ']'"));
                    }
                    segments.push(if key == "*" {
                        Segment::Wildcard
                    } else {
                        Segment::Key(key.to_string())
                    });
                    expect_key = false;
                    i = end;
                }
            }
        }

        if expect_key && !segments.is_empty() {
            return Err(syntax(offset + bytes.len(), "trailing '.'"));
        }
        if segments.is_empty() {
            return Err(RedactPathError::Empty);
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    /// The path as written in configuration.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Replace every node addressed by this path with `replacement`.
    ///
    /// Returns the number of nodes replaced.
    pub fn replace_in(&self, document: &mut Value, replacement: &Value) -> usize {
        replace_at(document, &self.segments, replacement)
    }
}

fn parse_bracket(inner: &str) -> Option<Segment> {
    if inner == "*" {
        return Some(Segment::Wildcard);
    }
    for quote in ['\'', '"'] {
        if let Some(key) = inner
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return Some(Segment::Key(key.to_string()));
        }
    }
    inner.parse::<usize>().ok().map(Segment::Index)
}

fn replace_at(node: &mut Value, segments: &[Segment], replacement: &Value) -> usize {
    let Some((first, rest)) = segments.split_first() else {
        *node = replacement.clone();
        return 1;
    };

    match (first, node) {
        (Segment::Key(key), Value::Object(map)) => map
            .get_mut(key)
            .map(|child| replace_at(child, rest, replacement))
            .unwrap_or(0),
        (Segment::Index(idx), Value::Array(items)) => items
            .get_mut(*idx)
            .map(|child| replace_at(child, rest, replacement))
            .unwrap_or(0),
        (Segment::Wildcard, Value::Object(map)) => map
            .values_mut()
            .map(|child| replace_at(child, rest, replacement))
            .sum(),
        (Segment::Wildcard, Value::Array(items)) => items
            .iter_mut()
            .map(|child| replace_at(child, rest, replacement))
            .sum(),
        _ => 0,
    }
}

impl FromStr for JsonPath {
    type Err = RedactPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn marker() -> Value {
        Value::String("X".into())
    }

    #[test]
    fn test_parse_plain_and_rooted() {
        let plain = JsonPath::parse("user.password").unwrap();
        let rooted = JsonPath::parse("$.user.password").unwrap();
        assert_eq!(plain.segments(), rooted.segments());
        assert_eq!(
            plain.segments(),
            &[Segment::Key("user".into()), Segment::Key("password".into())]
        );
    }

    #[test]
    fn test_parse_brackets() {
        let path = JsonPath::parse("$.items[2]['a.b'][*].c").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("items".into()),
                Segment::Index(2),
                Segment::Key("a.b".into()),
                Segment::Wildcard,
                Segment::Key("c".into()),
            ]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(JsonPath::parse(""), Err(RedactPathError::Empty));
        assert_eq!(JsonPath::parse("$"), Err(RedactPathError::Empty));
        assert!(JsonPath::parse("a..b").is_err());
        assert!(JsonPath::parse("a.").is_err());
        assert!(JsonPath::parse("a[0").is_err());
        assert!(JsonPath::parse("a[x]").is_err());
        assert!(JsonPath::parse("a]").is_err());
    }

    #[test]
    fn test_replace_nested_key() {
        let mut doc = json!({"user": {"password": "abc", "name": "x"}});
        let n = JsonPath::parse("user.password").unwrap().replace_in(&mut doc, &marker());
        assert_eq!(n, 1);
        assert_eq!(doc, json!({"user": {"password": "X", "name": "x"}}));
    }

    #[test]
    fn test_replace_wildcard_over_array() {
        let mut doc = json!({"cards": [{"pan": "1"}, {"pan": "2"}, {"other": 3}]});
        let n = JsonPath::parse("cards[*].pan").unwrap().replace_in(&mut doc, &marker());
        assert_eq!(n, 2);
        assert_eq!(doc, json!({"cards": [{"pan": "X"}, {"pan": "X"}, {"other": 3}]}));
    }

    #[test]
    fn test_replace_whole_subtree() {
        let mut doc = json!({"secret": {"a": 1, "b": [1, 2]}});
        JsonPath::parse("secret").unwrap().replace_in(&mut doc, &marker());
        assert_eq!(doc, json!({"secret": "X"}));
    }

    #[test]
    fn test_missing_path_is_ignored() {
        let mut doc = json!({"a": [1, 2]});
        let before = doc.clone();
        let path = JsonPath::parse("a[5].b").unwrap();
        assert_eq!(path.replace_in(&mut doc, &marker()), 0);
        assert_eq!(JsonPath::parse("z.y").unwrap().replace_in(&mut doc, &marker()), 0);
        assert_eq!(doc, before);
    }
}
