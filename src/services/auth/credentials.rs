//! Credential extraction from transport headers.
//!
//! Two shapes are recognised in header values:
//! - `Basic <base64(userid:password)>` for a fresh login
//! - `Bearer <token>` for a previously issued token
//!
//! Malformed values are treated as "nothing found", never as a hard error.
use axum::http::HeaderMap;
use base64::{Engine, engine::general_purpose::STANDARD};

const BASIC_PREFIX: &str = "Basic ";
const BEARER_PREFIX: &str = "Bearer ";

/// Case-insensitive header lookup.
///
/// A name may carry several values; they come back in the order received so
/// that the last usable one can win. `axum::http::HeaderMap` already
/// normalises names; [`HeaderPairs`] covers callers that hold raw pairs.
pub trait HeaderLookup {
    fn values<'a>(&'a self, name: &str) -> Vec<&'a str>;
}

impl HeaderLookup for HeaderMap {
    fn values<'a>(&'a self, name: &str) -> Vec<&'a str> {
        self.get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }
}

/// Ordered name/value pairs, e.g. from a non-HTTP pipeline.
#[derive(Clone, Debug, Default)]
pub struct HeaderPairs(Vec<(String, String)>);

impl HeaderPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((name.into(), value.into()));
        self
    }
}

impl HeaderLookup for HeaderPairs {
    fn values<'a>(&'a self, name: &str) -> Vec<&'a str> {
        self.0
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// Decoded login credentials. Transient; never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub userid: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("userid", &self.userid)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Scan `names` in order, and each name's values in order, for a Basic
/// credential header. Last match wins.
pub fn extract_credentials<H, S>(headers: &H, names: &[S]) -> Option<Credentials>
where
    H: HeaderLookup + ?Sized,
    S: AsRef<str>,
{
    names
        .iter()
        .flat_map(|name| headers.values(name.as_ref()))
        .filter_map(parse_basic)
        .last()
}

/// Same scan as [`extract_credentials`], for a Bearer token.
pub fn extract_bearer<H, S>(headers: &H, names: &[S]) -> Option<String>
where
    H: HeaderLookup + ?Sized,
    S: AsRef<str>,
{
    names
        .iter()
        .flat_map(|name| headers.values(name.as_ref()))
        .filter_map(parse_bearer)
        .last()
}

/// Parse a single `Basic <base64>` header value.
///
/// The decoded text is split on the first colon; the userid must be non-empty.
pub fn parse_basic(value: &str) -> Option<Credentials> {
    let encoded = value.trim().strip_prefix(BASIC_PREFIX)?.trim();
    if encoded.is_empty() {
        return None;
    }

    let decoded = STANDARD.decode(encoded).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (userid, password) = text.split_once(':')?;
    if userid.is_empty() {
        return None;
    }

    Some(Credentials {
        userid: userid.to_string(),
        password: password.to_string(),
    })
}

/// Parse a single `Bearer <token>` header value.
pub fn parse_bearer(value: &str) -> Option<String> {
    let token = value.trim().strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then(|| token.to_string())
}
