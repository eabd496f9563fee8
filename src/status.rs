//! Status nodes: errors carrying a classification code and optional
//! protocol codes.
//!
//! A [`Status`] is the mutable builder form. Freezing it yields a
//! [`StatusType`] prototype which manufactures per-request instances.
//! Every construction, protocol-code change and freeze snapshots the node
//! into the [global registry](crate::registry::global).
//!
//! # Lifecycle
//!
//! ```text
//! Status::new ──> with_http ──> with_grpc* ──> freeze ──> StatusType::new ──> Status
//!   (declared)                               (prototype)              (instance)
//! ```
//!
//! # Projection
//!
//! [`HttpStatus`] and [`GrpcStatus`] are narrow views used when writing a
//! response. Projection succeeds only when the node is valid and the
//! protocol code was set.
//!
//! ```rust
//! use loanhub_errors::{Error, Status};
//!
//! let conflict = Status::new("LOAN_ALREADY_FUNDED", Error::new("loan already funded"))
//!     .with_http(409)
//!     .freeze();
//!
//! let occurrence = conflict.new();
//! assert_eq!(occurrence.as_http().map(|h| h.http_status_code()), Some(409));
//! assert!(occurrence.as_grpc().is_none());
//! ```

use crate::errs::{Base, Cause, Data, Error, ErrorType, Node, Target, View, ViewKind};
use crate::registry;
use crate::severity::Severity;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::ops::Deref;

/// Classification data carried by every status node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusData {
    code: Cow<'static, str>,
    is_valid: bool,
    http: Option<u16>,
    grpc: Option<i32>,
}

impl StatusData {
    fn new(code: Cow<'static, str>) -> Self {
        Self {
            code,
            is_valid: true,
            http: None,
            grpc: None,
        }
    }

    /// Classification code, unique per process.
    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Whether the node may be projected onto a protocol.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// HTTP status code, if the status applies to HTTP.
    #[inline]
    pub const fn http_code(&self) -> Option<u16> {
        self.http
    }

    /// gRPC status code, if the status applies to gRPC.
    #[inline]
    pub const fn grpc_code(&self) -> Option<i32> {
        self.grpc
    }
}

// ============================================================================
// Builder / instance
// ============================================================================

/// Mutable status node: an [`Error`] plus classification data.
#[must_use = "statuses should be returned or frozen"]
#[derive(Clone)]
pub struct Status {
    err: Error,
    data: StatusData,
}

impl Status {
    /// Declare a status under `code` on top of `err`. Registers immediately.
    pub fn new(code: impl Into<Cow<'static, str>>, err: Error) -> Self {
        let status = Self {
            err,
            data: StatusData::new(code.into()),
        };
        status.save();
        status
    }

    fn save(&self) {
        registry::publish(StatusType {
            err: self.err.clone().freeze(),
            data: self.data.clone(),
        });
    }

    /// Set the HTTP status code and re-register.
    pub fn with_http(mut self, code: u16) -> Self {
        self.data.http = Some(code);
        self.save();
        self
    }

    /// Set the gRPC status code and re-register.
    pub fn with_grpc(mut self, code: i32) -> Self {
        self.data.grpc = Some(code);
        self.save();
        self
    }

    /// Freeze into a prototype and register it.
    pub fn freeze(self) -> StatusType {
        let prototype = StatusType {
            err: self.err.freeze(),
            data: self.data,
        };
        registry::publish(prototype.clone());
        prototype
    }

    /// Wrap this instance with a developer message, keeping its classification.
    ///
    /// The wrapper matches the same code but is not projection-valid until
    /// [`Status::rederive`] is called. Response building still resolves the
    /// wrapped original through the causal chain.
    #[track_caller]
    pub fn wrap(self, internal_msg: impl Into<Cow<'static, str>>) -> Self {
        let mut data = self.data.clone();
        data.is_valid = false;
        Self {
            err: Error::wrap(self, internal_msg),
            data,
        }
    }

    /// Mark a wrapper as projection-valid again.
    pub fn rederive(mut self) -> Self {
        self.data.is_valid = true;
        self
    }

    /// Attach a cause. An instance cause also donates its stack trace.
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.err = self.err.with_cause(cause);
        self
    }

    /// [`Status::with_cause`] for an already type-erased cause.
    pub fn with_cause_dyn(mut self, cause: Cause) -> Self {
        self.err = self.err.with_cause_dyn(cause);
        self
    }

    /// Set severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.err = self.err.with_severity(severity);
        self
    }

    /// Replace the developer message.
    pub fn with_internal_msg(mut self, msg: impl Into<Cow<'static, str>>) -> Self {
        self.err = self.err.with_internal_msg(msg);
        self
    }

    /// Replace the developer message with formatted text.
    pub fn with_internal_msgf(mut self, args: fmt::Arguments<'_>) -> Self {
        self.err = self.err.with_internal_msgf(args);
        self
    }

    /// Replace the public label.
    pub fn with_public_msg(mut self, msg: impl Into<Cow<'static, str>>) -> Self {
        self.err = self.err.with_public_msg(msg);
        self
    }

    /// Replace the user guidance text.
    pub fn with_user_msg(mut self, msg: impl Into<Cow<'static, str>>) -> Self {
        self.err = self.err.with_user_msg(msg);
        self
    }

    /// Attach a payload.
    pub fn with_data(mut self, data: Data) -> Self {
        self.err = self.err.with_data(data);
        self
    }

    /// Append a classification tag.
    pub fn add_base(mut self, base: impl Into<Base>) -> Self {
        self.err = self.err.add_base(base);
        self
    }

    /// Recapture the stack trace at the caller.
    #[track_caller]
    pub fn with_stack_trace(mut self) -> Self {
        self.err = self.err.with_stack_trace();
        self
    }

    /// Classification code.
    #[inline]
    pub fn code(&self) -> &str {
        self.data.code()
    }

    /// Classification data.
    #[inline]
    pub fn status_data(&self) -> &StatusData {
        &self.data
    }

    /// The underlying error.
    #[inline]
    pub fn as_error(&self) -> &Error {
        &self.err
    }

    /// Drop the classification layer.
    pub fn into_error(self) -> Error {
        self.err
    }

    /// HTTP projection, when valid and an HTTP code is set.
    pub fn as_http(&self) -> Option<HttpStatus> {
        HttpStatus::project(&self.data)
    }

    /// gRPC projection, when valid and a gRPC code is set.
    pub fn as_grpc(&self) -> Option<GrpcStatus> {
        GrpcStatus::project(&self.data)
    }

    /// Equal codes match; otherwise causal and base chains are searched.
    pub fn is<'a>(&self, target: impl Into<Target<'a>>) -> bool {
        Node::Status(self).is(target.into())
    }

    /// Narrow to one of the closed set of views.
    #[track_caller]
    pub fn narrow(&self, kind: ViewKind) -> Option<View<'_>> {
        Node::Status(self).narrow(kind)
    }
}

impl Deref for Status {
    type Target = Error;

    fn deref(&self) -> &Error {
        &self.err
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.err, f)
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Status")
            .field("data", &self.data)
            .field("err", &self.err)
            .finish()
    }
}

impl StdError for Status {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.err.source()
    }
}

// ============================================================================
// Frozen prototype
// ============================================================================

/// Immutable status prototype.
#[derive(Clone)]
pub struct StatusType {
    err: ErrorType,
    data: StatusData,
}

impl StatusType {
    /// Per-request instance: this prototype as sole base, messages, payload
    /// and classification data copied, fresh stack trace.
    #[allow(clippy::new_ret_no_self, clippy::wrong_self_convention)]
    #[track_caller]
    pub fn new(&self) -> Status {
        Status {
            err: Error::with_base(self, self.err.internal_msg().to_owned()),
            data: self.data.clone(),
        }
    }

    /// Independent mutable copy with the same options and a fresh stack trace.
    #[track_caller]
    pub fn copy(&self) -> Status {
        Status {
            err: self.err.copy(),
            data: self.data.clone(),
        }
    }

    /// Classification code.
    #[inline]
    pub fn code(&self) -> &str {
        self.data.code()
    }

    /// HTTP status code, if set.
    #[inline]
    pub fn http_code(&self) -> Option<u16> {
        self.data.http_code()
    }

    /// gRPC status code, if set.
    #[inline]
    pub fn grpc_code(&self) -> Option<i32> {
        self.data.grpc_code()
    }

    /// Classification data.
    #[inline]
    pub fn status_data(&self) -> &StatusData {
        &self.data
    }

    /// The underlying error prototype.
    #[inline]
    pub fn error_type(&self) -> &ErrorType {
        &self.err
    }

    /// HTTP projection, when valid and an HTTP code is set.
    pub fn as_http(&self) -> Option<HttpStatus> {
        HttpStatus::project(&self.data)
    }

    /// gRPC projection, when valid and a gRPC code is set.
    pub fn as_grpc(&self) -> Option<GrpcStatus> {
        GrpcStatus::project(&self.data)
    }

    /// Equal codes match; otherwise causal and base chains are searched.
    pub fn is<'a>(&self, target: impl Into<Target<'a>>) -> bool {
        Node::StatusType(self).is(target.into())
    }

    /// Narrow to one of the closed set of views.
    #[track_caller]
    pub fn narrow(&self, kind: ViewKind) -> Option<View<'_>> {
        Node::StatusType(self).narrow(kind)
    }
}

impl Deref for StatusType {
    type Target = ErrorType;

    fn deref(&self) -> &ErrorType {
        &self.err
    }
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.err, f)
    }
}

impl fmt::Debug for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusType")
            .field("data", &self.data)
            .field("err", &self.err)
            .finish()
    }
}

impl StdError for StatusType {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.err.source()
    }
}

// ============================================================================
// Protocol projections
// ============================================================================

/// A status narrowed onto HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStatus {
    code: Cow<'static, str>,
    http: u16,
}

impl HttpStatus {
    pub(crate) fn project(data: &StatusData) -> Option<Self> {
        match data.http {
            Some(http) if data.is_valid => Some(Self {
                code: data.code.clone(),
                http,
            }),
            _ => None,
        }
    }

    pub(crate) const fn internal_server_error() -> Self {
        Self {
            code: Cow::Borrowed("INTERNAL_SERVER_ERROR"),
            http: 500,
        }
    }

    /// Classification code.
    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// HTTP status code.
    #[inline]
    pub const fn http_status_code(&self) -> u16 {
        self.http
    }
}

/// A status narrowed onto gRPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrpcStatus {
    code: Cow<'static, str>,
    grpc: i32,
}

impl GrpcStatus {
    pub(crate) fn project(data: &StatusData) -> Option<Self> {
        match data.grpc {
            Some(grpc) if data.is_valid => Some(Self {
                code: data.code.clone(),
                grpc,
            }),
            _ => None,
        }
    }

    /// Classification code.
    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// gRPC status code.
    #[inline]
    pub const fn grpc_status_code(&self) -> i32 {
        self.grpc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errs;

    #[test]
    fn declared_status_is_valid_without_protocols() {
        let status = Status::new("STATUS_BARE", Error::new("bare"));
        assert!(status.status_data().is_valid());
        assert!(status.as_http().is_none());
        assert!(status.as_grpc().is_none());
    }

    #[test]
    fn projections_follow_codes() {
        let proto = Status::new("STATUS_BOTH", Error::new("both"))
            .with_http(404)
            .with_grpc(5)
            .freeze();
        let http = proto.as_http();
        assert_eq!(http.as_ref().map(HttpStatus::code), Some("STATUS_BOTH"));
        assert_eq!(http.map(|h| h.http_status_code()), Some(404));
        assert_eq!(proto.as_grpc().map(|g| g.grpc_status_code()), Some(5));
    }

    #[test]
    fn instance_copies_classification() {
        let proto = Status::new("STATUS_INSTANCE", Error::new("missing loan"))
            .with_http(404)
            .with_user_msg("look elsewhere")
            .freeze();
        let inst = proto.new();
        assert_eq!(inst.code(), "STATUS_INSTANCE");
        assert_eq!(inst.internal_msg(), "missing loan");
        assert_eq!(inst.user_msg(), "look elsewhere");
        assert_eq!(inst.as_http().map(|h| h.http_status_code()), Some(404));
        assert!(inst.is(&proto));
        assert!(inst.is(proto.error_type()));
    }

    #[test]
    fn code_match_beats_identity() {
        let first = Status::new("STATUS_SHARED_CODE", Error::new("a")).freeze();
        let second = Status::new("STATUS_SHARED_CODE", Error::new("b")).freeze();
        assert!(first.new().is(&second));
        assert!(!first.new().is(second.error_type()));
    }

    #[test]
    fn plain_error_matches_status_through_wrap() {
        let proto = Status::new("STATUS_WRAPPED", Error::new("gone"))
            .with_http(410)
            .freeze();
        let wrapped = Error::wrap(proto.new(), "load");
        assert!(wrapped.is(&proto));
        assert!(errs::is(&wrapped, Target::code("STATUS_WRAPPED")));
        assert_eq!(
            errs::find_http(&wrapped).map(|h| h.http_status_code()),
            Some(410)
        );
    }

    #[test]
    fn wrapped_status_is_invalid_until_rederived() {
        let proto = Status::new("STATUS_REDERIVE", Error::new("late"))
            .with_http(409)
            .freeze();
        let wrapper = proto.new().wrap("retry");
        assert!(wrapper.as_http().is_none());
        assert!(wrapper.is(&proto));
        assert_eq!(wrapper.to_string(), "retry: late");
        assert_eq!(
            errs::find_http(&wrapper).map(|h| h.http_status_code()),
            Some(409)
        );

        let rederived = wrapper.rederive();
        assert_eq!(rederived.as_http().map(|h| h.http_status_code()), Some(409));
    }

    #[test]
    fn copy_is_not_based_on_prototype() {
        let proto = Status::new("STATUS_COPY", Error::new("copy")).freeze();
        let copy = proto.copy();
        assert_eq!(copy.code(), "STATUS_COPY");
        assert!(!copy.is(proto.error_type()));
    }

    #[test]
    fn narrowing_views() {
        let proto = Status::new("STATUS_NARROW", Error::new("n")).with_http(400).freeze();
        let inst = proto.new();
        assert!(matches!(inst.narrow(ViewKind::Status), Some(View::Status(d)) if d.code() == "STATUS_NARROW"));
        assert!(matches!(inst.narrow(ViewKind::Http), Some(View::Http(h)) if h.http_status_code() == 400));
        assert!(inst.narrow(ViewKind::Grpc).is_none());
        assert!(matches!(inst.narrow(ViewKind::Core), Some(View::Core(_))));
    }

    #[test]
    fn frozen_prototype_is_registered() {
        let proto = Status::new("STATUS_FROZEN_REG", Error::new("f"))
            .with_grpc(14)
            .freeze();
        let found = registry::global().lookup("STATUS_FROZEN_REG");
        assert_eq!(found.and_then(|s| s.grpc_code()), proto.grpc_code());
    }
}
