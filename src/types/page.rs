use std::fmt;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use percent_encoding::percent_decode_str;

use crate::errors::WikiError;

/// Length of every title-bearing route prefix (`/view/`, `/edit/`, `/save/`)
pub const ROUTE_PREFIX_LEN: usize = "/view/".len();

/// Check whether a candidate is a legal page title.
///
/// Titles are non-empty and made only of ASCII letters and digits, so they can
/// never carry path separators, dots or whitespace into a storage key.
pub fn is_valid_title(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// A validated page title
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title(String);

impl Title {
    pub fn parse(candidate: &str) -> Result<Self, WikiError> {
        if is_valid_title(candidate) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(WikiError::InvalidTitle)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Title gate for `/view/`, `/edit/` and `/save/`.
///
/// Strips the fixed-length route prefix from the request path, percent-decodes
/// what remains and validates it. A rejection answers 404 before the handler
/// body runs.
#[async_trait]
impl<S> FromRequestParts<S> for Title
where
    S: Send + Sync,
{
    type Rejection = WikiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path();
        let raw = path.get(ROUTE_PREFIX_LEN..).unwrap_or("");
        let candidate = percent_decode_str(raw).decode_utf8().map_err(|_| WikiError::InvalidTitle)?;
        Title::parse(&candidate).inspect_err(|_| {
            log::debug!("Rejected page title in path '{}'", path);
        })
    }
}

/// One wiki document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: Title,
    pub body: Vec<u8>,
}

impl Page {
    pub fn new(title: Title, body: impl Into<Vec<u8>>) -> Self {
        Self { title, body: body.into() }
    }

    /// Empty page offered by the edit form when nothing is stored yet
    pub fn blank(title: Title) -> Self {
        Self { title, body: Vec::new() }
    }
}
