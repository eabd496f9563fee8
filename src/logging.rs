//! Structured log view of a built response.
//!
//! # Properties
//!
//! - Borrows from the [`Response`] with an explicit lifetime
//! - Cannot outlive the response that created it
//! - No heap allocations in accessors
//! - Oversized fields are truncated on UTF-8 boundaries when written
//!
//! Error responses always carry their developer details for logging, even
//! when diagnostics are hidden from clients.

use crate::errs::Data;
use crate::response::Response;
use std::borrow::Cow;
use std::fmt;

/// Maximum length for any individual field in formatted output
const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Truncation indicator appended to truncated strings
const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Borrowed log entry for one response.
///
/// # Example
///
/// ```rust
/// use loanhub_errors::{ResponseBuilder, catalog};
///
/// let (_, body) = ResponseBuilder::new(false).build("req-7", "", &catalog::new_not_found(), None);
/// let mut line = String::new();
/// body.log_view().write_to(&mut line).unwrap();
/// assert!(line.starts_with("reqID: req-7, code: NOT_FOUND, err: not found"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ResponseLog<'a> {
    request_id: &'a str,
    code: &'a str,
    error_msg: Option<&'a str>,
    stack_trace: &'a [String],
    data: Option<&'a Data>,
}

impl<'a> ResponseLog<'a> {
    fn of(response: &'a Response) -> Self {
        let (error_msg, stack_trace) = match response.error_details_for_log() {
            Some(details) => (Some(details.error_msg.as_str()), details.stack_trace.as_slice()),
            None => (None, &[][..]),
        };
        Self {
            request_id: &response.request_id,
            code: &response.code,
            error_msg,
            stack_trace,
            data: response.data.as_ref(),
        }
    }

    /// Write the entry without materializing it first.
    ///
    /// Error entries render as `reqID: .., code: .., err: .., trace:` followed
    /// by one frame per line; data entries as `reqID: .., code: .., data: ..`.
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "reqID: {}, code: {}",
            truncate_with_indicator(self.request_id),
            self.code
        )?;

        match self.error_msg {
            Some(msg) => {
                write!(f, ", err: {}, trace:", truncate_with_indicator(msg))?;
                for frame in self.stack_trace {
                    write!(f, "\n{}", truncate_with_indicator(frame))?;
                }
            }
            None => match self.data {
                Some(data) => {
                    write!(f, ", data: {}", truncate_with_indicator(&data.to_string()))?;
                }
                None => f.write_str(", data: null")?,
            },
        }

        Ok(())
    }

    /// Request correlation id.
    #[inline]
    pub const fn request_id(&self) -> &str {
        self.request_id
    }

    /// Classification code.
    #[inline]
    pub const fn code(&self) -> &str {
        self.code
    }

    /// Developer message, for error entries.
    #[inline]
    pub const fn error_msg(&self) -> Option<&str> {
        self.error_msg
    }

    /// Rendered frames, for error entries.
    #[inline]
    pub const fn stack_trace(&self) -> &[String] {
        self.stack_trace
    }

    /// Payload, if any.
    #[inline]
    pub const fn data(&self) -> Option<&Data> {
        self.data
    }

    /// Whether the entry describes an error.
    #[inline]
    pub const fn is_error(&self) -> bool {
        self.error_msg.is_some()
    }
}

impl fmt::Display for ResponseLog<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

impl Response {
    /// Borrowed structured view for logging.
    #[inline]
    pub fn log_view(&self) -> ResponseLog<'_> {
        ResponseLog::of(self)
    }

    /// Emit the response through `tracing`: `error` for error responses,
    /// `info` otherwise.
    pub fn log(&self) {
        let view = self.log_view();
        if view.is_error() {
            tracing::error!(
                request_id = %view.request_id(),
                code = %view.code(),
                "{}",
                view
            );
        } else {
            tracing::info!(
                request_id = %view.request_id(),
                code = %view.code(),
                "{}",
                view
            );
        }
    }
}

/// Truncate a string for display to keep single log lines bounded.
///
/// Returns a Cow<str> to avoid allocation when no truncation is needed.
fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let max_content_len = MAX_FIELD_OUTPUT_LEN.saturating_sub(TRUNCATION_INDICATOR.len());

    // Last char boundary at or before the limit
    let mut idx = max_content_len;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(TRUNCATION_INDICATOR);
    }

    let mut result = String::with_capacity(idx + TRUNCATION_INDICATOR.len());
    result.push_str(&s[..idx]);
    result.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ResponseBuilder;
    use crate::{Error, catalog};
    use serde_json::json;

    #[test]
    fn error_entry_lists_frames() {
        let err = Error::wrap(catalog::new_bad_request(), "parse amount");
        let (_, body) = ResponseBuilder::new(false).build("req-1", "", &err, None);
        let view = body.log_view();
        assert!(view.is_error());

        let mut line = String::new();
        assert!(view.write_to(&mut line).is_ok());
        assert!(line.starts_with("reqID: req-1, code: BAD_REQUEST, err: parse amount: bad request, trace:"));
        assert_eq!(line.lines().count(), 1 + view.stack_trace().len());
    }

    #[test]
    fn data_entry() {
        let body = Response::data("req-2", "", json!({"ok": true}));
        let view = body.log_view();
        assert!(!view.is_error());
        assert_eq!(view.to_string(), r#"reqID: req-2, code: SUCCESS, data: {"ok":true}"#);
    }

    #[test]
    fn log_does_not_panic_without_subscriber() {
        let (_, body) = ResponseBuilder::new(true).build("req-3", "", &Error::new("x"), None);
        body.log();
        Response::data("req-4", "", json!(null)).log();
    }

    #[test]
    fn truncate_ascii() {
        let s = "a".repeat(MAX_FIELD_OUTPUT_LEN + 10);
        let truncated = truncate_with_indicator(&s);
        assert!(truncated.len() <= MAX_FIELD_OUTPUT_LEN);
        assert!(truncated.ends_with(TRUNCATION_INDICATOR));
    }

    #[test]
    fn no_truncate_when_under_limit() {
        let s = "short string";
        let truncated = truncate_with_indicator(s);
        assert!(matches!(truncated, Cow::Borrowed(_)));
        assert_eq!(truncated, s);
    }

    #[test]
    fn truncate_utf8_boundary() {
        let s = "й".repeat(MAX_FIELD_OUTPUT_LEN);
        let truncated = truncate_with_indicator(&s);
        assert!(truncated.len() <= MAX_FIELD_OUTPUT_LEN);
        assert!(truncated.ends_with(TRUNCATION_INDICATOR));
    }

    #[test]
    fn exactly_at_limit() {
        let s = "a".repeat(MAX_FIELD_OUTPUT_LEN);
        let truncated = truncate_with_indicator(&s);
        assert!(matches!(truncated, Cow::Borrowed(_)));
        assert!(!truncated.ends_with(TRUNCATION_INDICATOR));
    }

    #[test]
    fn long_developer_message_is_truncated_in_entry() {
        let err = Error::new("x".repeat(4 * MAX_FIELD_OUTPUT_LEN));
        let (_, body) = ResponseBuilder::new(false).build("req-5", "", &err, None);
        let line = body.log_view().to_string();
        assert!(line.contains(TRUNCATION_INDICATOR));
        assert!(line.len() < 2 * MAX_FIELD_OUTPUT_LEN);
    }
}
