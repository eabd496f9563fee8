//! Wire responses.
//!
//! [`ResponseBuilder`] is the single place where an error becomes an HTTP
//! status and a JSON body. It accepts any `std::error::Error`:
//!
//! 1. Errors built from this crate's [`Error`](crate::Error) or
//!    [`Status`](crate::Status) resolve to the nearest valid HTTP projection
//!    in their causal and base chains, falling back to
//!    `INTERNAL_SERVER_ERROR`.
//! 2. Legacy [`ResponseError`]s map through their [`Code`].
//! 3. Anything else is reported as `INTERNAL_SERVER_ERROR`.
//!
//! Diagnostic details (developer message and stack trace) are emitted only
//! when the builder was created with diagnostics enabled. They are always
//! kept on the response for logging.
//!
//! # Example
//!
//! ```rust
//! use loanhub_errors::{ResponseBuilder, catalog};
//!
//! let builder = ResponseBuilder::new(false);
//! let (status, body) = builder.build("req-1", "0.42ms", &catalog::new_not_found(), None);
//!
//! assert_eq!(status, 404);
//! assert_eq!(body.code, "NOT_FOUND");
//! assert_eq!(body.error, "Not Found");
//! assert!(body.error_details.is_none());
//! ```

use crate::catalog;
use crate::codes::{self, Code};
use crate::config;
use crate::errs::{self, Data};
use crate::response_error::ResponseError;
use crate::stack::StackTrace;
use crate::status::HttpStatus;
use serde::Serialize;
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Developer-facing details attached to error responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorDetails {
    /// Full developer message.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_msg: String,
    /// Rendered stack frames.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stack_trace: Vec<String>,
}

/// JSON response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Request correlation id.
    pub request_id: String,
    /// Classification code.
    pub code: String,
    /// Elapsed handling time, e.g. `"12.34ms"`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub processing_time: String,
    /// Success payload, or error payload when diagnostics allow it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,
    /// User guidance text.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reason: String,
    /// Short public label.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
    /// Present only with diagnostics enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<ErrorDetails>,
    #[serde(skip)]
    log_details: Option<ErrorDetails>,
}

impl Response {
    /// `SUCCESS` response carrying `data`.
    pub fn data(
        request_id: impl Into<String>,
        processing_time: impl Into<String>,
        data: Data,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            code: codes::SUCCESS.code().to_owned(),
            processing_time: processing_time.into(),
            data: Some(data),
            reason: String::new(),
            error: String::new(),
            error_details: None,
            log_details: None,
        }
    }

    /// Whether this is an error response.
    #[inline]
    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }

    /// Developer message and stack trace, regardless of diagnostics.
    #[inline]
    pub fn error_details_for_log(&self) -> Option<&ErrorDetails> {
        self.log_details.as_ref()
    }
}

/// Turns errors into `(http status, Response)` pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseBuilder {
    diagnostics: bool,
}

impl ResponseBuilder {
    /// Builder with diagnostics explicitly on or off.
    pub const fn new(diagnostics: bool) -> Self {
        Self { diagnostics }
    }

    /// Builder following the process settings.
    pub fn from_settings() -> Self {
        Self::new(config::diagnostics_enabled())
    }

    /// Whether diagnostic details are emitted.
    #[inline]
    pub const fn diagnostics(&self) -> bool {
        self.diagnostics
    }

    /// Resolve `err` into an HTTP status and response body. `data`, when
    /// given, replaces any payload taken from the error.
    ///
    /// Never fails: unclassified errors become `INTERNAL_SERVER_ERROR`.
    #[track_caller]
    pub fn build(
        &self,
        request_id: impl Into<String>,
        processing_time: impl Into<String>,
        err: &(dyn StdError + 'static),
        data: Option<Data>,
    ) -> (u16, Response) {
        let resolved = match errs::find_core(err) {
            Some(core) => {
                let http = errs::find_http(err).unwrap_or_else(fallback_http);
                Resolved {
                    http: http.http_status_code(),
                    code: http.code().to_owned(),
                    reason: core.user_msg().to_owned(),
                    error: core.public_msg().to_owned(),
                    details: ErrorDetails {
                        error_msg: core.to_string(),
                        stack_trace: core.stack_trace().lines(),
                    },
                    data: core.data().cloned(),
                }
            }
            None => match err.downcast_ref::<ResponseError>() {
                Some(legacy) => Resolved::from_code(
                    legacy.code(),
                    legacy.readable(),
                    ErrorDetails {
                        error_msg: legacy.to_string(),
                        stack_trace: legacy.stack_trace().lines(),
                    },
                    legacy.data().cloned(),
                ),
                None => Resolved::from_code(
                    &codes::INTERNAL_SERVER_ERROR,
                    codes::INTERNAL_SERVER_ERROR.effective_user_msg(),
                    ErrorDetails {
                        error_msg: err.to_string(),
                        stack_trace: StackTrace::capture().lines(),
                    },
                    None,
                ),
            },
        };

        let response = self.finish(
            request_id.into(),
            processing_time.into(),
            resolved.code,
            resolved.reason,
            resolved.error,
            resolved.details,
            data.or(if self.diagnostics { resolved.data } else { None }),
        );
        (resolved.http, response)
    }

    /// Error response straight from a legacy code.
    #[track_caller]
    pub fn build_code(
        &self,
        request_id: impl Into<String>,
        processing_time: impl Into<String>,
        code: Code,
        data: Option<Data>,
    ) -> (u16, Response) {
        let err = ResponseError::new(code.dev_msg().to_owned(), code);
        self.build(request_id, processing_time, &err, data)
    }

    /// [`ResponseBuilder::build`] using the id and elapsed time of `trace`.
    #[track_caller]
    pub fn build_for(
        &self,
        trace: &RequestTrace,
        err: &(dyn StdError + 'static),
        data: Option<Data>,
    ) -> (u16, Response) {
        self.build(trace.request_id(), trace.processing_time(), err, data)
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        request_id: String,
        processing_time: String,
        code: String,
        reason: String,
        error: String,
        details: ErrorDetails,
        data: Option<Data>,
    ) -> Response {
        Response {
            request_id,
            code,
            processing_time,
            data,
            reason,
            error,
            error_details: self.diagnostics.then(|| details.clone()),
            log_details: Some(details),
        }
    }
}

/// Classification chosen for an error before the body is assembled.
struct Resolved {
    http: u16,
    code: String,
    reason: String,
    error: String,
    details: ErrorDetails,
    data: Option<Data>,
}

impl Resolved {
    fn from_code(code: &Code, reason: &str, details: ErrorDetails, data: Option<Data>) -> Self {
        Self {
            http: code.http_status_code(),
            code: code.code().to_owned(),
            reason: reason.to_owned(),
            error: code.dev_msg().to_owned(),
            details,
            data,
        }
    }
}

fn fallback_http() -> HttpStatus {
    catalog::catalog()
        .internal_server_error()
        .as_http()
        .unwrap_or_else(HttpStatus::internal_server_error)
}

/// Build an error response with the process settings.
#[track_caller]
pub fn build_err_response(
    request_id: impl Into<String>,
    processing_time: impl Into<String>,
    err: &(dyn StdError + 'static),
    data: Option<Data>,
) -> (u16, Response) {
    ResponseBuilder::from_settings().build(request_id, processing_time, err, data)
}

/// Request id and start time of one request.
#[derive(Debug, Clone)]
pub struct RequestTrace {
    request_id: String,
    started: Instant,
}

impl RequestTrace {
    /// Start timing a request under a fresh v4 UUID.
    pub fn start() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Start timing a request under a caller-provided id.
    pub fn with_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            started: Instant::now(),
        }
    }

    /// Request correlation id.
    #[inline]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Time since the request started.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Elapsed time formatted for the wire.
    pub fn processing_time(&self) -> String {
        format_processing_time(self.elapsed())
    }
}

/// Milliseconds with two decimals, e.g. `"12.34ms"`.
pub fn format_processing_time(elapsed: Duration) -> String {
    format!("{:.2}ms", elapsed.as_secs_f64() * 1000.0)
}
