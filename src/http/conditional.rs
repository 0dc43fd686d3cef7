//! Conditional request evaluation (RFC 7232)
//!
//! Decides whether a request should short-circuit with `304 Not Modified` or
//! `412 Precondition Failed`, given the request's precondition headers and the
//! validators of the current representation.

use super::date::{parse_http_date, truncate_to_seconds};
use super::etag::{parse_entity_tag_list, EntityTag};
use chrono::{DateTime, Utc};
use hyper::header::{
    HeaderMap, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE,
};
use hyper::{Method, StatusCode};

/// Precondition headers sent by the client, already parsed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalHeaders {
    pub if_match: Vec<EntityTag>,
    pub if_none_match: Vec<EntityTag>,
    pub if_modified_since: Option<DateTime<Utc>>,
    pub if_unmodified_since: Option<DateTime<Utc>>,
}

impl ConditionalHeaders {
    /// Extract the four precondition headers from a request
    ///
    /// Invalid tags are skipped and unparsable dates are treated as absent.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            if_match: parse_entity_tag_list("If-Match", headers.get_all(IF_MATCH)),
            if_none_match: parse_entity_tag_list("If-None-Match", headers.get_all(IF_NONE_MATCH)),
            if_modified_since: date_header(headers, "If-Modified-Since", &IF_MODIFIED_SINCE),
            if_unmodified_since: date_header(
                headers,
                "If-Unmodified-Since",
                &IF_UNMODIFIED_SINCE,
            ),
        }
    }

    fn if_match_has_wildcard(&self) -> bool {
        self.if_match.iter().any(EntityTag::is_wildcard)
    }

    fn if_none_match_has_wildcard(&self) -> bool {
        self.if_none_match.iter().any(EntityTag::is_wildcard)
    }
}

/// First value of a date header, `None` if missing or unparsable
fn date_header(
    headers: &HeaderMap,
    name: &str,
    key: &hyper::header::HeaderName,
) -> Option<DateTime<Utc>> {
    let raw = headers.get(key)?;
    let parsed = raw.to_str().ok().and_then(parse_http_date);
    if parsed.is_none() {
        tracing::info!(header = name, value = ?raw, "Invalid date header received");
    }
    parsed
}

/// Emitted when weak comparison was requested for a method that forbids it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeakComparisonDowngrade {
    pub method: Method,
}

impl std::fmt::Display for WeakComparisonDowngrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ETag weak comparison is only allowed for GET and HEAD methods, \
             current method is {}; using strong comparison",
            self.method
        )
    }
}

/// Validators of the current representation, set by the handler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationState {
    etag: Option<EntityTag>,
    weak_comparison: bool,
    last_modified: Option<DateTime<Utc>>,
}

impl ValidationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn etag(&self) -> Option<&EntityTag> {
        self.etag.as_ref()
    }

    pub const fn weak_comparison(&self) -> bool {
        self.weak_comparison
    }

    pub const fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    /// Set or clear the current `ETag`
    ///
    /// Weak comparison is only honoured for GET and HEAD; otherwise it is
    /// forced off and the downgrade is returned to the caller.
    pub fn set_etag(
        &mut self,
        etag: Option<EntityTag>,
        weak_comparison: bool,
        method: &Method,
    ) -> Option<WeakComparisonDowngrade> {
        self.etag = etag;

        if weak_comparison && *method != Method::GET && *method != Method::HEAD {
            self.weak_comparison = false;
            return Some(WeakComparisonDowngrade {
                method: method.clone(),
            });
        }

        self.weak_comparison = weak_comparison;
        None
    }

    /// Set or clear the last modification instant (kept at second precision)
    pub fn set_last_modified(&mut self, last_modified: Option<DateTime<Utc>>) {
        self.last_modified = last_modified.map(truncate_to_seconds);
    }

    fn if_match_matches(&self, conditions: &ConditionalHeaders) -> bool {
        // If-Match always uses the strong comparison function
        conditions
            .if_match
            .iter()
            .any(|tag| self.tag_matches(tag, false))
    }

    fn if_none_match_matches(&self, conditions: &ConditionalHeaders) -> bool {
        conditions
            .if_none_match
            .iter()
            .any(|tag| self.tag_matches(tag, self.weak_comparison))
    }

    fn tag_matches(&self, request_tag: &EntityTag, weak_comparison: bool) -> bool {
        if request_tag.is_wildcard() {
            return true;
        }
        self.etag
            .as_ref()
            .is_some_and(|current| current.matches(request_tag, weak_comparison))
    }
}

/// Outcome of evaluating the preconditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No short-circuit, serve the full response
    Proceed,
    /// 304, the client's copy is current
    NotModified,
    /// 412, a client assumption about the resource is false
    PreconditionFailed,
}

impl Decision {
    /// Status to send, `None` when normal processing continues
    pub const fn status(self) -> Option<StatusCode> {
        match self {
            Self::Proceed => None,
            Self::NotModified => Some(StatusCode::NOT_MODIFIED),
            Self::PreconditionFailed => Some(StatusCode::PRECONDITION_FAILED),
        }
    }

    pub const fn is_final(self) -> bool {
        !matches!(self, Self::Proceed)
    }
}

/// Evaluate the request preconditions against the current validators
///
/// A header family that is absent never vetoes a 304 requested by the other
/// family, and never requests one itself. A 304 is only sent when it is
/// consistent with every precondition present (RFC 7232 §6).
pub fn evaluate(
    state: &ValidationState,
    conditions: &ConditionalHeaders,
    resource_exists: bool,
) -> Decision {
    if !resource_exists {
        let expects_existence = conditions.if_match_has_wildcard()
            || !conditions.if_match.is_empty()
            || conditions.if_unmodified_since.is_some();
        return if expects_existence {
            Decision::PreconditionFailed
        } else {
            Decision::Proceed
        };
    }

    let mut etag_allows_not_modified = true;
    let mut etag_wants_not_modified = false;

    if state.etag.is_some() {
        if !conditions.if_match.is_empty() {
            if !state.if_match_matches(conditions) {
                return Decision::PreconditionFailed;
            }
            // A matching If-Match asks for the representation itself
            etag_allows_not_modified = false;
        }

        if !conditions.if_none_match.is_empty() {
            if conditions.if_none_match_has_wildcard() {
                return Decision::PreconditionFailed;
            } else if state.if_none_match_matches(conditions) {
                etag_wants_not_modified = true;
            } else {
                etag_allows_not_modified = false;
            }
        }
    }

    let mut date_allows_not_modified = true;
    let mut date_wants_not_modified = false;

    if let Some(last_modified) = state.last_modified {
        if let Some(since) = conditions.if_unmodified_since {
            if last_modified > since {
                return Decision::PreconditionFailed;
            }
            date_allows_not_modified = false;
        }

        if let Some(since) = conditions.if_modified_since {
            if last_modified > since {
                date_allows_not_modified = false;
            } else {
                date_wants_not_modified = true;
            }
        }
    }

    if (etag_allows_not_modified && date_wants_not_modified)
        || (date_allows_not_modified && etag_wants_not_modified)
    {
        return Decision::NotModified;
    }

    Decision::Proceed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn strong(tag: &str) -> EntityTag {
        EntityTag::strong(tag).unwrap()
    }

    fn weak(tag: &str) -> EntityTag {
        EntityTag::weak(tag).unwrap()
    }

    fn state_with_etag(tag: EntityTag, weak_comparison: bool) -> ValidationState {
        let mut state = ValidationState::new();
        state.set_etag(Some(tag), weak_comparison, &Method::GET);
        state
    }

    #[test]
    fn test_no_validators_no_conditions() {
        let decision = evaluate(&ValidationState::new(), &ConditionalHeaders::default(), true);
        assert_eq!(decision, Decision::Proceed);
        assert_eq!(decision.status(), None);
    }

    #[test]
    fn test_missing_resource_with_if_match_wildcard() {
        let conditions = ConditionalHeaders {
            if_match: vec![EntityTag::wildcard()],
            ..Default::default()
        };
        let decision = evaluate(&ValidationState::new(), &conditions, false);
        assert_eq!(decision, Decision::PreconditionFailed);
        assert_eq!(decision.status(), Some(StatusCode::PRECONDITION_FAILED));
    }

    #[test]
    fn test_missing_resource_with_concrete_if_match() {
        let conditions = ConditionalHeaders {
            if_match: vec![strong("abc")],
            ..Default::default()
        };
        assert_eq!(
            evaluate(&ValidationState::new(), &conditions, false),
            Decision::PreconditionFailed
        );
    }

    #[test]
    fn test_missing_resource_with_if_unmodified_since() {
        let conditions = ConditionalHeaders {
            if_unmodified_since: Some(t0()),
            ..Default::default()
        };
        assert_eq!(
            evaluate(&ValidationState::new(), &conditions, false),
            Decision::PreconditionFailed
        );
    }

    #[test]
    fn test_missing_resource_ignores_if_none_match() {
        let conditions = ConditionalHeaders {
            if_none_match: vec![EntityTag::wildcard()],
            if_modified_since: Some(t0()),
            ..Default::default()
        };
        assert_eq!(
            evaluate(&ValidationState::new(), &conditions, false),
            Decision::Proceed
        );
    }

    #[test]
    fn test_if_none_match_matching() {
        let state = state_with_etag(strong("abc"), true);
        let conditions = ConditionalHeaders {
            if_none_match: vec![strong("abc")],
            ..Default::default()
        };
        assert_eq!(evaluate(&state, &conditions, true), Decision::NotModified);
    }

    #[test]
    fn test_if_none_match_different() {
        let state = state_with_etag(strong("abc"), false);
        let conditions = ConditionalHeaders {
            if_none_match: vec![strong("xyz")],
            ..Default::default()
        };
        assert_eq!(evaluate(&state, &conditions, true), Decision::Proceed);
    }

    #[test]
    fn test_if_none_match_weak_request_tag() {
        let conditions = ConditionalHeaders {
            if_none_match: vec![weak("abc")],
            ..Default::default()
        };
        let strict = state_with_etag(strong("abc"), false);
        assert_eq!(evaluate(&strict, &conditions, true), Decision::Proceed);

        let lenient = state_with_etag(strong("abc"), true);
        assert_eq!(evaluate(&lenient, &conditions, true), Decision::NotModified);
    }

    #[test]
    fn test_if_none_match_wildcard_on_existing_resource() {
        let state = state_with_etag(strong("abc"), false);
        let conditions = ConditionalHeaders {
            if_none_match: vec![EntityTag::wildcard()],
            ..Default::default()
        };
        assert_eq!(
            evaluate(&state, &conditions, true),
            Decision::PreconditionFailed
        );
    }

    #[test]
    fn test_if_match_uses_strong_comparison() {
        let state = state_with_etag(weak("abc"), true);
        let conditions = ConditionalHeaders {
            if_match: vec![weak("abc")],
            ..Default::default()
        };
        assert_eq!(
            evaluate(&state, &conditions, true),
            Decision::PreconditionFailed
        );
    }

    #[test]
    fn test_if_match_matching_vetoes_not_modified() {
        let mut state = state_with_etag(strong("abc"), false);
        state.set_last_modified(Some(t0()));
        let conditions = ConditionalHeaders {
            if_match: vec![strong("nope"), strong("abc")],
            if_modified_since: Some(t0()),
            ..Default::default()
        };
        assert_eq!(evaluate(&state, &conditions, true), Decision::Proceed);
    }

    #[test]
    fn test_if_match_without_current_etag_is_ignored() {
        let conditions = ConditionalHeaders {
            if_match: vec![strong("abc")],
            ..Default::default()
        };
        assert_eq!(
            evaluate(&ValidationState::new(), &conditions, true),
            Decision::Proceed
        );
    }

    #[test]
    fn test_if_unmodified_since_older_than_resource() {
        let mut state = ValidationState::new();
        state.set_last_modified(Some(t0()));
        let conditions = ConditionalHeaders {
            if_unmodified_since: Some(t0() - Duration::seconds(1)),
            ..Default::default()
        };
        assert_eq!(
            evaluate(&state, &conditions, true),
            Decision::PreconditionFailed
        );
    }

    #[test]
    fn test_if_modified_since_boundaries() {
        let mut state = ValidationState::new();
        state.set_last_modified(Some(t0()));

        let same = ConditionalHeaders {
            if_modified_since: Some(t0()),
            ..Default::default()
        };
        assert_eq!(evaluate(&state, &same, true), Decision::NotModified);

        let older = ConditionalHeaders {
            if_modified_since: Some(t0() - Duration::seconds(2)),
            ..Default::default()
        };
        assert_eq!(evaluate(&state, &older, true), Decision::Proceed);
    }

    #[test]
    fn test_sub_second_last_modified_is_not_newer() {
        let mut state = ValidationState::new();
        state.set_last_modified(Some(t0() + Duration::milliseconds(400)));
        let conditions = ConditionalHeaders {
            if_modified_since: Some(t0()),
            ..Default::default()
        };
        assert_eq!(evaluate(&state, &conditions, true), Decision::NotModified);
    }

    #[test]
    fn test_date_family_vetoes_etag_not_modified() {
        let mut state = state_with_etag(strong("abc"), false);
        state.set_last_modified(Some(t0()));
        let conditions = ConditionalHeaders {
            if_none_match: vec![strong("abc")],
            if_modified_since: Some(t0() - Duration::seconds(5)),
            ..Default::default()
        };
        assert_eq!(evaluate(&state, &conditions, true), Decision::Proceed);
    }

    #[test]
    fn test_both_families_agree_on_not_modified() {
        let mut state = state_with_etag(strong("abc"), false);
        state.set_last_modified(Some(t0()));
        let conditions = ConditionalHeaders {
            if_none_match: vec![strong("abc")],
            if_modified_since: Some(t0()),
            ..Default::default()
        };
        assert_eq!(evaluate(&state, &conditions, true), Decision::NotModified);
    }

    #[test]
    fn test_if_none_match_with_satisfied_if_unmodified_since() {
        let mut state = state_with_etag(strong("abc"), false);
        state.set_last_modified(Some(t0()));
        let conditions = ConditionalHeaders {
            if_none_match: vec![strong("abc")],
            if_unmodified_since: Some(t0()),
            ..Default::default()
        };
        assert_eq!(evaluate(&state, &conditions, true), Decision::Proceed);
    }

    #[test]
    fn test_weak_comparison_downgraded_for_unsafe_method() {
        let mut state = ValidationState::new();
        let downgrade = state.set_etag(Some(strong("abc")), true, &Method::POST);
        assert_eq!(
            downgrade,
            Some(WeakComparisonDowngrade {
                method: Method::POST
            })
        );
        assert!(!state.weak_comparison());

        let downgrade = state.set_etag(Some(strong("abc")), true, &Method::HEAD);
        assert_eq!(downgrade, None);
        assert!(state.weak_comparison());
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.append(IF_MATCH, "\"a\", W/\"b\"".parse().unwrap());
        headers.append(IF_NONE_MATCH, "*".parse().unwrap());
        headers.append(
            IF_MODIFIED_SINCE,
            "Fri, 01 Mar 2024 12:00:00 GMT".parse().unwrap(),
        );
        headers.append(IF_UNMODIFIED_SINCE, "garbage".parse().unwrap());

        let conditions = ConditionalHeaders::from_headers(&headers);
        assert_eq!(conditions.if_match, vec![strong("a"), weak("b")]);
        assert_eq!(conditions.if_none_match, vec![EntityTag::wildcard()]);
        assert_eq!(conditions.if_modified_since, Some(t0()));
        assert_eq!(conditions.if_unmodified_since, None);
    }
}
