//! Request metadata extraction.
//!
//! # Responsibilities
//! - Normalize header maps into the flat, canonical-name wire mapping
//! - Split the URI into raw URL and query parameters
//! - Resolve host, protocol version and route pattern
//!
//! # Design Decisions
//! - Header names are reported canonically (`content-type` → `Content-Type`)
//! - Repeated headers are joined with `", "`; non-UTF-8 bytes are replaced
//! - First occurrence of a query parameter wins

use std::collections::BTreeMap;

use axum::http::{header, uri::Authority, HeaderMap, Uri, Version};

use crate::redact::HeaderFields;

/// Canonical MIME-style header name.
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}

/// Flatten a header map into name → value pairs.
pub fn collect_headers(headers: &HeaderMap) -> HeaderFields {
    let mut fields = HeaderFields::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        fields
            .entry(canonical_header_name(name.as_str()))
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    fields
}

/// Path plus `?query` when the URI has one.
pub fn raw_url(uri: &Uri) -> String {
    match uri.query() {
        Some(query) => format!("{}?{}", uri.path(), query),
        None => uri.path().to_string(),
    }
}

/// Percent-decoded query parameters.
pub fn query_params(uri: &Uri) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    if let Some(query) = uri.query() {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
        }
    }
    params
}

/// Host without port, from the URI authority or the `Host` header.
pub fn host(uri: &Uri, headers: &HeaderMap) -> String {
    if let Some(host) = uri.host() {
        return host.to_string();
    }
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<Authority>().ok())
        .map(|authority| authority.host().to_string())
        .unwrap_or_default()
}

/// `(major, minor)` protocol version.
pub fn proto_version(version: Version) -> (u8, u8) {
    match version {
        Version::HTTP_09 => (0, 9),
        Version::HTTP_10 => (1, 0),
        Version::HTTP_2 => (2, 0),
        Version::HTTP_3 => (3, 0),
        _ => (1, 1),
    }
}

/// Rewrite an axum route pattern into colon form.
///
/// `/users/{id}` becomes `/users/:id`, `/files/{*rest}` becomes `/files/*rest`.
pub fn route_pattern(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|segment| {
            match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) if name.starts_with('*') => name.to_string(),
                Some(name) => format!(":{}", name),
                None => segment.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Header value as a string, empty when absent or not UTF-8.
pub fn header_str(headers: &HeaderMap, name: header::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_canonical_names() {
        assert_eq!(canonical_header_name("content-type"), "Content-Type");
        assert_eq!(canonical_header_name("x-request-id"), "X-Request-Id");
        assert_eq!(canonical_header_name("authorization"), "Authorization");
        assert_eq!(canonical_header_name("www-authenticate"), "Www-Authenticate");
    }

    #[test]
    fn test_collect_joins_repeated_headers() {
        let mut headers = HeaderMap::new();
        headers.append("accept", HeaderValue::from_static("text/html"));
        headers.append("accept", HeaderValue::from_static("application/json"));
        headers.insert("x-trace", HeaderValue::from_static("abc"));

        let fields = collect_headers(&headers);
        assert_eq!(fields["Accept"], "text/html, application/json");
        assert_eq!(fields["X-Trace"], "abc");
    }

    #[test]
    fn test_raw_url_and_query() {
        let uri: Uri = "/users/42?active=true&tag=a%20b&tag=c".parse().unwrap();
        assert_eq!(raw_url(&uri), "/users/42?active=true&tag=a%20b&tag=c");

        let params = query_params(&uri);
        assert_eq!(params["active"], "true");
        assert_eq!(params["tag"], "a b");

        let bare: Uri = "/health".parse().unwrap();
        assert_eq!(raw_url(&bare), "/health");
        assert!(query_params(&bare).is_empty());
    }

    #[test]
    fn test_host_sources() {
        let absolute: Uri = "http://api.example.com:8080/x".parse().unwrap();
        assert_eq!(host(&absolute, &HeaderMap::new()), "api.example.com");

        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:3000"));
        let relative: Uri = "/x".parse().unwrap();
        assert_eq!(host(&relative, &headers), "localhost");

        assert_eq!(host(&relative, &HeaderMap::new()), "");
    }

    #[test]
    fn test_proto_version() {
        assert_eq!(proto_version(Version::HTTP_11), (1, 1));
        assert_eq!(proto_version(Version::HTTP_10), (1, 0));
        assert_eq!(proto_version(Version::HTTP_2), (2, 0));
    }

    #[test]
    fn test_route_pattern() {
        assert_eq!(route_pattern("/users/{id}"), "/users/:id");
        assert_eq!(route_pattern("/orgs/{org}/repos/{repo}"), "/orgs/:org/repos/:repo");
        assert_eq!(route_pattern("/files/{*rest}"), "/files/*rest");
        assert_eq!(route_pattern("/"), "/");
        assert_eq!(route_pattern("/static/index.html"), "/static/index.html");
    }
}
