//! Legacy response errors.
//!
//! A [`ResponseError`] pairs a legacy [`Code`] with a developer message, a
//! cause and a stack trace. Handlers written before status prototypes still
//! return these; the response builder maps them onto the wire through their
//! code.
//!
//! Wrapping an existing `ResponseError` never changes its code: only the
//! developer message grows a `"msg: "` prefix.
//!
//! ```rust
//! use loanhub_errors::{ResponseError, codes};
//!
//! let err = ResponseError::new("loan 42 missing", codes::NOT_FOUND);
//! let err = ResponseError::wrap_err(err, Some("approve"));
//!
//! assert_eq!(err.code().code(), "NOT_FOUND");
//! assert_eq!(err.to_string(), "approve: loan 42 missing");
//! ```

use crate::codes::{self, Code};
use crate::errs::{Cause, Data};
use crate::stack::StackTrace;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroize;

/// Boxed error accepted by the legacy constructors.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Message used when an invalid payload is reported without details.
pub const INVALID_PAYLOAD_MSG: &str = "invalid payload format";

/// Plain message cause.
#[derive(Debug)]
struct Message(Cow<'static, str>);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for Message {}

/// Legacy error carried to the response layer.
pub struct ResponseError {
    code: Code,
    user_msg: Cow<'static, str>,
    data: Option<Data>,
    cause: Option<Cause>,
    err_msg: Cow<'static, str>,
    stack_trace: StackTrace,
}

impl ResponseError {
    /// Error with a plain message cause under `code`.
    #[track_caller]
    pub fn new(cause: impl Into<Cow<'static, str>>, code: Code) -> Self {
        Self::wrap_err_code(Message(cause.into()), code, None)
    }

    /// Error with a plain message cause under `INTERNAL_SERVER_ERROR`.
    #[track_caller]
    pub fn internal(cause: impl Into<Cow<'static, str>>) -> Self {
        Self::new(cause, codes::INTERNAL_SERVER_ERROR)
    }

    /// Wrap `err` under `INTERNAL_SERVER_ERROR`, or keep its code when it is
    /// already a `ResponseError`.
    #[track_caller]
    pub fn wrap_err(err: impl Into<BoxError>, msg: Option<&str>) -> Self {
        Self::wrap_err_code(err, codes::INTERNAL_SERVER_ERROR, msg)
    }

    /// Wrap `err` under `code`. An existing `ResponseError` keeps its own code
    /// and stack trace; `msg` is prefixed to its developer message.
    #[track_caller]
    pub fn wrap_err_code(err: impl Into<BoxError>, code: Code, msg: Option<&str>) -> Self {
        let err: BoxError = err.into();
        let mut wrapped = match err.downcast::<ResponseError>() {
            Ok(existing) => *existing,
            Err(other) => Self {
                user_msg: Cow::Owned(code.effective_user_msg().to_owned()),
                code,
                data: None,
                cause: Some(Arc::from(other)),
                err_msg: Cow::Borrowed(""),
                stack_trace: StackTrace::capture(),
            },
        };

        if let Some(msg) = msg {
            wrapped.err_msg = if wrapped.err_msg.is_empty() {
                Cow::Owned(msg.to_owned())
            } else {
                Cow::Owned(format!("{}: {}", msg, wrapped.err_msg))
            };
        }
        wrapped
    }

    /// Constructor bound to `code`: without a cause it reports the code's
    /// developer label, with one it wraps the cause under that label.
    pub fn error_builder(code: Code) -> impl Fn(Option<BoxError>) -> ResponseError {
        move |err| match err {
            None => ResponseError::new(code.dev_msg().to_owned(), code.clone()),
            Some(err) => ResponseError::wrap_err_code(err, code.clone(), Some(code.dev_msg())),
        }
    }

    /// `BAD_REQUEST` for a payload that failed to parse or validate. The first
    /// value becomes the message, all values become the payload.
    #[track_caller]
    pub fn invalid_request_payload(values: &[&str]) -> Self {
        let values: Vec<String> = if values.is_empty() {
            vec![INVALID_PAYLOAD_MSG.to_owned()]
        } else {
            values.iter().map(|v| (*v).to_owned()).collect()
        };
        let first = values[0].clone();
        Self::new(first, codes::BAD_REQUEST).with_data(Data::from(values))
    }

    /// Replace the user message.
    pub fn with_user_msg(mut self, msg: impl Into<Cow<'static, str>>) -> Self {
        self.user_msg = msg.into();
        self
    }

    /// Prefix the user message with `msg: `.
    pub fn wrap_user_msg(mut self, msg: &str) -> Self {
        self.user_msg = Cow::Owned(format!("{}: {}", msg, self.user_msg));
        self
    }

    /// Attach a payload.
    pub fn with_data(mut self, data: Data) -> Self {
        self.data = Some(data);
        self
    }

    /// Legacy code.
    #[inline]
    pub fn code(&self) -> &Code {
        &self.code
    }

    /// User-facing message.
    #[inline]
    pub fn readable(&self) -> &str {
        &self.user_msg
    }

    /// Developer message prefix chain.
    #[inline]
    pub fn err_msg(&self) -> &str {
        &self.err_msg
    }

    /// Attached payload.
    #[inline]
    pub fn data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    /// Where the error was first wrapped.
    #[inline]
    pub fn stack_trace(&self) -> &StackTrace {
        &self.stack_trace
    }

    /// Wrapped cause.
    #[inline]
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.cause, self.err_msg.is_empty()) {
            (Some(cause), true) => fmt::Display::fmt(cause, f),
            (Some(cause), false) => write!(f, "{}: {}", self.err_msg, cause),
            (None, _) => f.write_str(&self.err_msg),
        }
    }
}

impl fmt::Debug for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseError")
            .field("code", &self.code.code())
            .field("message", &self.to_string())
            .field("frames", &self.stack_trace.len())
            .finish()
    }
}

impl StdError for ResponseError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn StdError + 'static))
    }
}

impl Drop for ResponseError {
    fn drop(&mut self) {
        if let Cow::Owned(ref mut s) = self.err_msg {
            s.zeroize();
        }
    }
}

/// Whether `err` is a `ResponseError` carrying `code`.
pub fn err_is(err: &(dyn StdError + 'static), code: &Code) -> bool {
    err.downcast_ref::<ResponseError>()
        .is_some_and(|e| e.code.code() == code.code())
}

/// The cause of a `ResponseError`, or `err` itself for anything else.
pub fn unwrap_err<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a (dyn StdError + 'static)> {
    match err.downcast_ref::<ResponseError>() {
        Some(e) => e.cause.as_deref().map(|c| c as &(dyn StdError + 'static)),
        None => Some(err),
    }
}

/// Wrap the error held by `result` in place, keeping existing legacy codes.
#[track_caller]
pub fn defer_wrap<T>(result: &mut Result<T, BoxError>, msg: &str) {
    if let Err(err) = result {
        let taken = std::mem::replace(err, Box::from(""));
        *err = Box::new(ResponseError::wrap_err(taken, Some(msg)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn new_uses_code_user_message() {
        let err = ResponseError::new("loan missing", codes::NOT_FOUND);
        assert_eq!(err.code(), &codes::NOT_FOUND);
        assert_eq!(err.readable(), codes::NOT_FOUND.user_msg());
        assert_eq!(
            ResponseError::internal("x").readable(),
            crate::config::settings().generic_user_msg()
        );
        assert_eq!(err.to_string(), "loan missing");
        assert!(!err.stack_trace().is_empty());
    }

    #[test]
    fn wrapping_keeps_code_and_prefixes() {
        let err = ResponseError::new("row locked", codes::FORBIDDEN);
        let err = ResponseError::wrap_err_code(err, codes::BAD_REQUEST, Some("update"));
        let err = ResponseError::wrap_err(err, Some("handler"));
        assert_eq!(err.code().code(), "FORBIDDEN");
        assert_eq!(err.err_msg(), "handler: update");
        assert_eq!(err.to_string(), "handler: update: row locked");
    }

    #[test]
    fn foreign_errors_default_to_internal() {
        let err = ResponseError::wrap_err(io::Error::other("disk full"), None);
        assert_eq!(err.code().code(), "INTERNAL_SERVER_ERROR");
        assert_eq!(err.to_string(), "disk full");
        assert!(err.source().is_some());
    }

    #[test]
    fn err_is_and_unwrap() {
        let err = ResponseError::new("nope", codes::UNAUTHORIZED);
        assert!(err_is(&err, &codes::UNAUTHORIZED));
        assert!(!err_is(&err, &codes::FORBIDDEN));
        assert!(!err_is(&io::Error::other("x"), &codes::UNAUTHORIZED));

        assert_eq!(unwrap_err(&err).map(|c| c.to_string()), Some("nope".to_owned()));
        let plain = io::Error::other("plain");
        assert_eq!(unwrap_err(&plain).map(|c| c.to_string()), Some("plain".to_owned()));
    }

    #[test]
    fn user_message_edits() {
        let err = ResponseError::new("x", codes::BAD_REQUEST)
            .with_user_msg("amount must be positive")
            .wrap_user_msg("loan");
        assert_eq!(err.readable(), "loan: amount must be positive");
    }

    #[test]
    fn builder_without_and_with_cause() {
        let build = ResponseError::error_builder(codes::TOO_MANY_REQUESTS);

        let bare = build(None);
        assert_eq!(bare.to_string(), "Too Many Requests");
        assert_eq!(bare.code().code(), "TOO_MANY_REQUESTS");

        let wrapped = build(Some(Box::new(io::Error::other("bucket empty"))));
        assert_eq!(wrapped.to_string(), "Too Many Requests: bucket empty");
    }

    #[test]
    fn invalid_payload_defaults() {
        let err = ResponseError::invalid_request_payload(&[]);
        assert_eq!(err.to_string(), INVALID_PAYLOAD_MSG);
        assert_eq!(err.code().code(), "BAD_REQUEST");
        assert_eq!(err.data(), Some(&serde_json::json!([INVALID_PAYLOAD_MSG])));

        let err = ResponseError::invalid_request_payload(&["amount missing", "tenor missing"]);
        assert_eq!(err.to_string(), "amount missing");
        assert_eq!(
            err.data(),
            Some(&serde_json::json!(["amount missing", "tenor missing"]))
        );
    }

    #[test]
    fn defer_wrap_in_place() {
        let mut ok: Result<(), BoxError> = Ok(());
        defer_wrap(&mut ok, "ctx");
        assert!(ok.is_ok());

        let mut failed: Result<(), BoxError> = Err(Box::new(io::Error::other("timeout")));
        defer_wrap(&mut failed, "disburse");
        let err = failed.err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("disburse: timeout"));
    }
}
