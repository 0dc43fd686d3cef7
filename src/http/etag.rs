//! Entity tag module
//!
//! `ETag` value type with strong/weak comparison (RFC 7232 §2.3) and parsing of
//! `If-Match` / `If-None-Match` header values.

use hyper::header::HeaderValue;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when building or parsing an entity tag
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityTagError {
    #[error("the tag can't be empty for an ETag which is not a wildcard")]
    Empty,
    #[error("invalid character {0:?} in ETag")]
    InvalidChar(char),
    #[error("malformed ETag header value: {0:?}")]
    Malformed(String),
}

/// An HTTP entity tag
///
/// A wildcard (`*`) matches any concrete tag. Concrete tags are immutable once
/// built and always carry a non-empty opaque value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityTag {
    opaque: String,
    weak: bool,
    wildcard: bool,
}

impl EntityTag {
    /// Build a strong tag
    ///
    /// # Examples
    /// ```
    /// use revalidate::http::etag::EntityTag;
    /// let tag = EntityTag::strong("abc").unwrap();
    /// assert_eq!(tag.to_string(), "\"abc\"");
    /// ```
    pub fn strong(tag: impl Into<String>) -> Result<Self, EntityTagError> {
        Self::new(tag, false)
    }

    /// Build a weak tag (`W/"..."`)
    pub fn weak(tag: impl Into<String>) -> Result<Self, EntityTagError> {
        Self::new(tag, true)
    }

    /// Build a concrete tag; `*` given here is a regular opaque value
    pub fn new(tag: impl Into<String>, weak: bool) -> Result<Self, EntityTagError> {
        let opaque = tag.into();
        if opaque.trim().is_empty() {
            return Err(EntityTagError::Empty);
        }
        // etagc = %x21 / %x23-7E
        if let Some(c) = opaque
            .chars()
            .find(|&c| c == '"' || !c.is_ascii_graphic())
        {
            return Err(EntityTagError::InvalidChar(c));
        }
        Ok(Self {
            opaque,
            weak,
            wildcard: false,
        })
    }

    /// The `*` tag
    pub fn wildcard() -> Self {
        Self {
            opaque: "*".to_string(),
            weak: false,
            wildcard: true,
        }
    }

    pub fn opaque_value(&self) -> &str {
        &self.opaque
    }

    pub const fn is_weak(&self) -> bool {
        self.weak
    }

    pub const fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Compare two tags
    ///
    /// A wildcard on either side always matches. Under strong comparison both
    /// tags must be strong; under weak comparison only the opaque values count.
    pub fn matches(&self, other: &Self, weak_comparison: bool) -> bool {
        if self.wildcard || other.wildcard {
            return true;
        }
        if self.opaque != other.opaque {
            return false;
        }
        weak_comparison || (!self.weak && !other.weak)
    }

    /// Value for an `ETag` response header
    pub fn header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.wildcard {
            f.write_str("*")
        } else if self.weak {
            write!(f, "W/\"{}\"", self.opaque)
        } else {
            write!(f, "\"{}\"", self.opaque)
        }
    }
}

impl FromStr for EntityTag {
    type Err = EntityTagError;

    /// Parse a single entity tag: `*`, `"value"` or `W/"value"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "*" {
            return Ok(Self::wildcard());
        }

        let (weak, rest) = match s.strip_prefix("W/") {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let inner = rest
            .strip_prefix('"')
            .and_then(|r| r.strip_suffix('"'))
            .ok_or_else(|| EntityTagError::Malformed(s.to_string()))?;

        Self::new(inner, weak)
    }
}

/// Split a header value on commas that are not inside a quoted string
fn split_unquoted_commas(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

/// Parse every `If-Match` / `If-None-Match` line into an ordered tag list
///
/// Invalid entries are skipped and logged; empty entries are ignored.
pub fn parse_entity_tag_list<'a, I>(header_name: &str, values: I) -> Vec<EntityTag>
where
    I: IntoIterator<Item = &'a HeaderValue>,
{
    let mut tags = Vec::new();

    for value in values {
        let Ok(value) = value.to_str() else {
            tracing::info!(header = header_name, "Non-ASCII ETag header value received");
            continue;
        };

        for token in split_unquoted_commas(value) {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            match token.parse::<EntityTag>() {
                Ok(tag) => tags.push(tag),
                Err(e) => {
                    tracing::info!(
                        header = header_name,
                        value = token,
                        "Invalid ETag header value received: {e}"
                    );
                }
            }
        }
    }

    tags
}
