//! Request target parsing.

use std::borrow::Cow;

/// Decoded path and raw query of a request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub path: String,
    pub query: Option<String>,
}

impl Target {
    /// Whether `key` appears as a query parameter name, with or without a value.
    pub fn has_query_key(&self, key: &str) -> bool {
        self.query.as_deref().is_some_and(|query| has_query_key(query, key))
    }
}

/// Parse an origin-form (`/path?query`) or absolute-form
/// (`http://host/path?query`) request target.
///
/// Returns `None` when the target is empty, does not resolve to an absolute
/// path, or the path does not percent-decode to UTF-8.
pub fn parse_target(raw: &str) -> Option<Target> {
    let raw = strip_authority(raw)?;
    let raw = raw.split_once('#').map_or(raw, |(before, _)| before);
    let (path, query) = match raw.split_once('?') {
        Some((path, query)) => (path, Some(query.to_owned())),
        None => (raw, None),
    };

    if !path.starts_with('/') {
        return None;
    }
    let path = urlencoding::decode(path).ok().map(Cow::into_owned)?;

    Some(Target { path, query })
}

/// Drop `scheme://authority` from an absolute-form target.
fn strip_authority(raw: &str) -> Option<&str> {
    let rest = match raw.split_once("://") {
        Some((scheme, rest)) if is_scheme(scheme) => rest,
        _ => return (!raw.is_empty()).then_some(raw),
    };
    if rest.is_empty() || rest.starts_with('/') {
        return None;
    }
    match rest.find(['/', '?']) {
        Some(idx) if rest[idx..].starts_with('/') => Some(&rest[idx..]),
        Some(_) => None,
        None => Some("/"),
    }
}

fn is_scheme(s: &str) -> bool {
    s.eq_ignore_ascii_case("http") || s.eq_ignore_ascii_case("https")
}

fn has_query_key(query: &str, key: &str) -> bool {
    query
        .split('&')
        .map(|pair| pair.split_once('=').map_or(pair, |(name, _)| name))
        .any(|name| urlencoding::decode(name).is_ok_and(|name| name == key))
}
