//! Error values with causal wrapping, multi-base classification and three
//! message tiers.
//!
//! # Lifecycle
//!
//! An [`Error`] is a mutable, owned builder. Calling [`Error::freeze`] consumes
//! it and produces an [`ErrorType`]: an immutable prototype shared behind an
//! `Arc` and identified by pointer identity. Prototypes are declared once at
//! startup and manufacture per-occurrence instances with [`ErrorType::new`].
//! Instances carry the prototype as their sole base, so classification
//! survives any amount of wrapping:
//!
//! ```rust
//! use loanhub_errors::{Error, Severity};
//!
//! let rate_limited = Error::new("rate limited")
//!     .with_severity(Severity::Warning)
//!     .freeze();
//!
//! let occurrence = rate_limited.new();
//! let wrapped = Error::wrap(occurrence, "approve loan");
//!
//! assert!(wrapped.is(&rate_limited));
//! assert_eq!(wrapped.to_string(), "approve loan: rate limited");
//! ```
//!
//! # Message tiers
//!
//! - `internal_msg`: developer text, composes into `Display`. Zeroized on drop.
//! - `public_msg`: short label safe to expose (`"Not Found"`).
//! - `user_msg`: long guidance text safe to expose.
//!
//! # Threading
//!
//! Instances are created per request and handed off once; they are `Send +
//! Sync` but carry no internal locking. Prototypes are immutable and freely
//! shared.

use crate::config;
use crate::severity::Severity;
use crate::stack::StackTrace;
use crate::status::{GrpcStatus, HttpStatus, Status, StatusData, StatusType};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use zeroize::Zeroize;

/// Payload attached to an error. Not part of its identity.
pub type Data = serde_json::Value;

/// Shared handle to a causal error.
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

/// Public label used when none was set.
pub const DEFAULT_PUBLIC_MSG: &str = "an error occurred";

// ============================================================================
// Base classification tags
// ============================================================================

/// A classification tag attached to an error.
///
/// Tags are frozen prototypes, either plain ([`ErrorType`]) or status
/// ([`StatusType`]). An error may carry any number of them.
#[derive(Clone)]
pub enum Base {
    /// Plain prototype, matched by identity.
    Error(ErrorType),
    /// Status prototype, matched by identity or code.
    Status(StatusType),
}

impl Base {
    #[inline]
    pub(crate) fn node(&self) -> Node<'_> {
        match self {
            Self::Error(t) => Node::Type(t),
            Self::Status(t) => Node::StatusType(t),
        }
    }

    /// The tag's own core.
    #[inline]
    pub fn core(&self) -> &Core {
        match self {
            Self::Error(t) => &**t,
            Self::Status(t) => &**t.error_type(),
        }
    }
}

impl fmt::Debug for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(t) => write!(f, "Base::Error({:?})", t.to_string()),
            Self::Status(t) => write!(f, "Base::Status({})", t.code()),
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.core(), f)
    }
}

impl From<ErrorType> for Base {
    fn from(t: ErrorType) -> Self {
        Self::Error(t)
    }
}

impl From<&ErrorType> for Base {
    fn from(t: &ErrorType) -> Self {
        Self::Error(t.clone())
    }
}

impl From<StatusType> for Base {
    fn from(t: StatusType) -> Self {
        Self::Status(t)
    }
}

impl From<&StatusType> for Base {
    fn from(t: &StatusType) -> Self {
        Self::Status(t.clone())
    }
}

// ============================================================================
// Core option set
// ============================================================================

/// The option set shared by every error shape.
///
/// Reached through `Deref` from [`Error`], [`ErrorType`], [`Status`] and
/// [`StatusType`], or through [`find_core`] on an arbitrary error.
#[derive(Clone)]
pub struct Core {
    bases: SmallVec<[Base; 2]>,
    cause: Option<Cause>,
    severity: Severity,
    internal_msg: Cow<'static, str>,
    public_msg: Cow<'static, str>,
    user_msg: Cow<'static, str>,
    stack_trace: StackTrace,
    data: Option<Data>,
}

impl Core {
    fn root(internal_msg: Cow<'static, str>, stack_trace: StackTrace) -> Self {
        Self {
            bases: SmallVec::new(),
            cause: None,
            severity: Severity::Unknown,
            internal_msg,
            public_msg: Cow::Borrowed(DEFAULT_PUBLIC_MSG),
            user_msg: Cow::Borrowed(config::settings().generic_user_msg()),
            stack_trace,
            data: None,
        }
    }

    /// Same options, different stack trace.
    fn restamped(&self, stack_trace: StackTrace) -> Self {
        Self {
            bases: self.bases.clone(),
            cause: self.cause.clone(),
            severity: self.severity,
            internal_msg: self.internal_msg.clone(),
            public_msg: self.public_msg.clone(),
            user_msg: self.user_msg.clone(),
            stack_trace,
            data: self.data.clone(),
        }
    }

    /// Options a wrapper takes over from an instance cause. The cause itself,
    /// the internal message and the payload are not inherited.
    fn inherited(&self, internal_msg: Cow<'static, str>, cause: Cause) -> Self {
        Self {
            bases: self.bases.clone(),
            cause: Some(cause),
            severity: self.severity,
            internal_msg,
            public_msg: self.public_msg.clone(),
            user_msg: self.user_msg.clone(),
            stack_trace: self.stack_trace.clone(),
            data: None,
        }
    }

    /// Causal error, if any.
    #[inline]
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Classification tags, in attachment order.
    #[inline]
    pub fn bases(&self) -> &[Base] {
        &self.bases
    }

    /// Severity.
    #[inline]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Developer message.
    #[inline]
    pub fn internal_msg(&self) -> &str {
        &self.internal_msg
    }

    /// Short label safe to expose.
    #[inline]
    pub fn public_msg(&self) -> &str {
        &self.public_msg
    }

    /// Guidance text safe to expose.
    #[inline]
    pub fn user_msg(&self) -> &str {
        &self.user_msg
    }

    /// Where the error was created.
    #[inline]
    pub fn stack_trace(&self) -> &StackTrace {
        &self.stack_trace
    }

    /// Attached payload.
    #[inline]
    pub fn data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    fn cause_node(&self) -> Option<Node<'_>> {
        self.cause
            .as_deref()
            .map(|c| Node::of(c as &(dyn StdError + 'static)))
    }

    fn chain_matches(&self, target: Target<'_>) -> bool {
        if self.cause_node().is_some_and(|n| n.is(target)) {
            return true;
        }
        self.bases.iter().any(|b| b.node().is(target))
    }
}

impl fmt::Display for Core {
    /// `internal_msg` and the cause message joined by `": "`, skipping an empty
    /// internal message. Without a cause or internal message, the base
    /// messages sorted and joined by `","`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let has_internal = !self.internal_msg.is_empty();
        if has_internal {
            f.write_str(&self.internal_msg)?;
        }
        if let Some(cause) = &self.cause {
            if has_internal {
                f.write_str(": ")?;
            }
            return fmt::Display::fmt(cause, f);
        }
        if has_internal {
            return Ok(());
        }

        match self.bases.as_slice() {
            [] => Ok(()),
            [only] => fmt::Display::fmt(only, f),
            many => {
                let mut messages: Vec<String> = many.iter().map(Base::to_string).collect();
                messages.sort();
                f.write_str(&messages.join(","))
            }
        }
    }
}

impl fmt::Debug for Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Core")
            .field("message", &self.to_string())
            .field("severity", &self.severity)
            .field("public_msg", &self.public_msg)
            .field("bases", &self.bases)
            .field("frames", &self.stack_trace.len())
            .field("data", &self.data.as_ref().map(|_| "<PRESENT>"))
            .finish()
    }
}

impl Drop for Core {
    fn drop(&mut self) {
        if let Cow::Owned(ref mut s) = self.internal_msg {
            s.zeroize();
        }
    }
}

// ============================================================================
// Mutable instance
// ============================================================================

/// A mutable error instance.
///
/// Setters consume and return the instance for chaining. Freezing turns it
/// into an [`ErrorType`] prototype; there is no way back.
#[must_use = "errors should be returned or reported"]
#[derive(Clone)]
pub struct Error {
    core: Core,
}

impl Error {
    /// Root error with default severity and messages and a fresh stack trace.
    #[track_caller]
    pub fn new(internal_msg: impl Into<Cow<'static, str>>) -> Self {
        Self {
            core: Core::root(internal_msg.into(), StackTrace::capture()),
        }
    }

    pub(crate) fn from_core(core: Core) -> Self {
        Self { core }
    }

    /// Wrap `cause` with an additional developer message.
    ///
    /// When `cause` is an [`Error`] or [`Status`] instance the result inherits
    /// its severity, bases and public/user messages and keeps its stack trace.
    /// Anything else becomes the cause of a new root error.
    #[track_caller]
    pub fn wrap<E>(cause: E, internal_msg: impl Into<Cow<'static, str>>) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::wrap_dyn(Arc::new(cause), internal_msg)
    }

    /// [`Error::wrap`] for an already type-erased cause.
    #[track_caller]
    pub fn wrap_dyn(cause: Cause, internal_msg: impl Into<Cow<'static, str>>) -> Self {
        let internal_msg = internal_msg.into();
        let inherited = instance_core(&*cause).map(|c| c.inherited(internal_msg.clone(), cause.clone()));
        match inherited {
            Some(core) => Self { core },
            None => Self::new(internal_msg).with_cause_dyn(cause),
        }
    }

    /// New instance classified under `base`, copying its options.
    #[track_caller]
    pub fn with_base(base: impl Into<Base>, internal_msg: impl Into<Cow<'static, str>>) -> Self {
        let base = base.into();
        let mut core = base.core().restamped(StackTrace::capture());
        core.bases.clear();
        core.bases.push(base);
        core.internal_msg = internal_msg.into();
        Self { core }
    }

    /// Attach a cause. An instance cause also donates its stack trace.
    pub fn with_cause<E>(self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.with_cause_dyn(Arc::new(cause))
    }

    /// [`Error::with_cause`] for an already type-erased cause.
    pub fn with_cause_dyn(mut self, cause: Cause) -> Self {
        if let Some(origin) = instance_core(&*cause) {
            self.core.stack_trace = origin.stack_trace.clone();
        }
        self.core.cause = Some(cause);
        self
    }

    /// Set severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.core.severity = severity;
        self
    }

    /// Replace the developer message.
    pub fn with_internal_msg(mut self, msg: impl Into<Cow<'static, str>>) -> Self {
        self.core.internal_msg = msg.into();
        self
    }

    /// Replace the developer message with formatted text.
    pub fn with_internal_msgf(self, args: fmt::Arguments<'_>) -> Self {
        self.with_internal_msg(args.to_string())
    }

    /// Replace the public label.
    pub fn with_public_msg(mut self, msg: impl Into<Cow<'static, str>>) -> Self {
        self.core.public_msg = msg.into();
        self
    }

    /// Replace the user guidance text.
    pub fn with_user_msg(mut self, msg: impl Into<Cow<'static, str>>) -> Self {
        self.core.user_msg = msg.into();
        self
    }

    /// Attach a payload.
    pub fn with_data(mut self, data: Data) -> Self {
        self.core.data = Some(data);
        self
    }

    /// Append classification tags.
    pub fn add_base(mut self, base: impl Into<Base>) -> Self {
        self.core.bases.push(base.into());
        self
    }

    /// Replace all classification tags.
    pub fn with_bases<I>(mut self, bases: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Base>,
    {
        self.core.bases = bases.into_iter().map(Into::into).collect();
        self
    }

    /// Recapture the stack trace at the caller.
    #[track_caller]
    pub fn with_stack_trace(mut self) -> Self {
        self.core.stack_trace = StackTrace::capture();
        self
    }

    /// Freeze into an immutable prototype.
    pub fn freeze(self) -> ErrorType {
        ErrorType(Arc::new(self.core))
    }

    /// Promote this error into a tag: the result's sole base is the frozen
    /// original, its developer message is empty and its payload is kept.
    #[track_caller]
    pub fn copy_as_base(self) -> Self {
        self.freeze().copy_as_base()
    }

    /// The option set.
    #[inline]
    pub fn core(&self) -> &Core {
        &self.core
    }

    /// Classification test. See [`Target`].
    pub fn is<'a>(&self, target: impl Into<Target<'a>>) -> bool {
        Node::Error(self).is(target.into())
    }

    /// Narrow to one of the closed set of views.
    #[track_caller]
    pub fn narrow(&self, kind: ViewKind) -> Option<View<'_>> {
        Node::Error(self).narrow(kind)
    }

    /// Search the chain for a payload of type `E`.
    pub fn find_cause<E: StdError + 'static>(&self) -> Option<&E> {
        find_cause(self)
    }
}

impl Deref for Error {
    type Target = Core;

    fn deref(&self) -> &Core {
        &self.core
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.core, f)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Error").field(&self.core).finish()
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.core.cause.as_deref().map(|c| c as &(dyn StdError + 'static))
    }
}

// ============================================================================
// Frozen prototype
// ============================================================================

/// An immutable error prototype.
///
/// Clones share the same allocation; two handles are the same prototype iff
/// they point at the same allocation.
#[derive(Clone)]
pub struct ErrorType(Arc<Core>);

impl ErrorType {
    /// Manufacture an instance: sole base is this prototype, messages, severity
    /// and payload are copied, the stack trace is fresh.
    #[allow(clippy::new_ret_no_self, clippy::wrong_self_convention)]
    #[track_caller]
    pub fn new(&self) -> Error {
        Error::with_base(self, self.0.internal_msg.clone())
    }

    /// Independent mutable copy with the same options and a fresh stack trace.
    #[track_caller]
    pub fn copy(&self) -> Error {
        Error::from_core(self.0.restamped(StackTrace::capture()))
    }

    /// Instance whose sole base is this prototype, with no developer message.
    #[track_caller]
    pub fn copy_as_base(&self) -> Error {
        Error::with_base(self, "")
    }

    /// Prototype identity.
    #[inline]
    pub fn ptr_eq(&self, other: &ErrorType) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Classification test. See [`Target`].
    pub fn is<'a>(&self, target: impl Into<Target<'a>>) -> bool {
        Node::Type(self).is(target.into())
    }

    /// Narrow to one of the closed set of views.
    #[track_caller]
    pub fn narrow(&self, kind: ViewKind) -> Option<View<'_>> {
        Node::Type(self).narrow(kind)
    }
}

impl Deref for ErrorType {
    type Target = Core;

    fn deref(&self) -> &Core {
        &self.0
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl fmt::Debug for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorType").field(&*self.0).finish()
    }
}

impl StdError for ErrorType {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.cause.as_deref().map(|c| c as &(dyn StdError + 'static))
    }
}

// ============================================================================
// Classification targets and views
// ============================================================================

/// What an `is` test compares against.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// A specific prototype, by identity.
    Prototype(&'a ErrorType),
    /// Any status node carrying this classification code.
    Code(&'a str),
}

impl<'a> Target<'a> {
    /// Match status nodes by code.
    pub const fn code(code: &'a str) -> Self {
        Self::Code(code)
    }
}

impl<'a> From<&'a ErrorType> for Target<'a> {
    fn from(t: &'a ErrorType) -> Self {
        Self::Prototype(t)
    }
}

impl<'a> From<&'a StatusType> for Target<'a> {
    fn from(t: &'a StatusType) -> Self {
        Self::Code(t.code())
    }
}

impl<'a> From<&'a Status> for Target<'a> {
    fn from(s: &'a Status) -> Self {
        Self::Code(s.code())
    }
}

/// Which view [`View`] narrowing should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Borrow the option set.
    Core,
    /// A fresh mutable copy.
    Copy,
    /// The status classification data.
    Status,
    /// HTTP projection.
    Http,
    /// gRPC projection.
    Grpc,
}

/// Result of narrowing an error.
#[derive(Debug)]
pub enum View<'a> {
    /// Generic error view.
    Core(&'a Core),
    /// Independent copy.
    Copy(Error),
    /// Classification node.
    Status(&'a StatusData),
    /// HTTP projection.
    Http(HttpStatus),
    /// gRPC projection.
    Grpc(GrpcStatus),
}

// ============================================================================
// Chain traversal
// ============================================================================

/// One link of an error chain, resolved to the shapes this crate knows.
#[derive(Clone, Copy)]
pub(crate) enum Node<'a> {
    Error(&'a Error),
    Type(&'a ErrorType),
    Status(&'a Status),
    StatusType(&'a StatusType),
    Foreign(&'a (dyn StdError + 'static)),
}

impl<'a> Node<'a> {
    pub(crate) fn of(err: &'a (dyn StdError + 'static)) -> Self {
        if let Some(e) = err.downcast_ref::<Error>() {
            Self::Error(e)
        } else if let Some(s) = err.downcast_ref::<Status>() {
            Self::Status(s)
        } else if let Some(t) = err.downcast_ref::<ErrorType>() {
            Self::Type(t)
        } else if let Some(t) = err.downcast_ref::<StatusType>() {
            Self::StatusType(t)
        } else {
            Self::Foreign(err)
        }
    }

    pub(crate) fn core(self) -> Option<&'a Core> {
        match self {
            Self::Error(e) => Some(e.core()),
            Self::Type(t) => Some(&**t),
            Self::Status(s) => Some(s.as_error().core()),
            Self::StatusType(t) => Some(&**t.error_type()),
            Self::Foreign(_) => None,
        }
    }

    pub(crate) fn status(self) -> Option<&'a StatusData> {
        match self {
            Self::Status(s) => Some(s.status_data()),
            Self::StatusType(t) => Some(t.status_data()),
            _ => None,
        }
    }

    fn identity(self) -> Option<&'a ErrorType> {
        match self {
            Self::Type(t) => Some(t),
            Self::StatusType(t) => Some(t.error_type()),
            _ => None,
        }
    }

    fn cause(self) -> Option<Node<'a>> {
        match self {
            Self::Foreign(e) => e.source().map(Node::of),
            other => other.core().and_then(Core::cause_node),
        }
    }

    fn bases(self) -> &'a [Base] {
        match self.core() {
            Some(core) => core.bases(),
            None => &[],
        }
    }

    pub(crate) fn is(self, target: Target<'_>) -> bool {
        match target {
            Target::Code(code) => {
                if self.status().is_some_and(|s| s.code() == code) {
                    return true;
                }
            }
            Target::Prototype(p) => {
                if self.identity().is_some_and(|id| id.ptr_eq(p)) {
                    return true;
                }
            }
        }

        match self.core() {
            Some(core) => core.chain_matches(target),
            None => self.cause().is_some_and(|n| n.is(target)),
        }
    }

    #[track_caller]
    pub(crate) fn narrow(self, kind: ViewKind) -> Option<View<'a>> {
        match kind {
            ViewKind::Core => self.core().map(View::Core),
            ViewKind::Copy => match self.core() {
                Some(core) => Some(View::Copy(Error::from_core(
                    core.restamped(StackTrace::capture()),
                ))),
                None => None,
            },
            ViewKind::Status => self.status().map(View::Status),
            ViewKind::Http => self.status().and_then(HttpStatus::project).map(View::Http),
            ViewKind::Grpc => self.status().and_then(GrpcStatus::project).map(View::Grpc),
        }
    }

    /// Nearest status accepted by `accept`: this node, then the causal chain,
    /// then the bases, depth first.
    pub(crate) fn find_status(
        self,
        accept: &dyn Fn(&StatusData) -> bool,
    ) -> Option<&'a StatusData> {
        if let Some(status) = self.status().filter(|s| accept(s)) {
            return Some(status);
        }
        if let Some(found) = self.cause().and_then(|n| n.find_status(accept)) {
            return Some(found);
        }
        self.bases().iter().find_map(|b| b.node().find_status(accept))
    }
}

/// The core of an instance cause ([`Error`] or [`Status`]). Prototypes and
/// foreign errors yield `None`.
fn instance_core<'a>(err: &'a (dyn StdError + Send + Sync + 'static)) -> Option<&'a Core> {
    match Node::of(err as &(dyn StdError + 'static)) {
        node @ (Node::Error(_) | Node::Status(_)) => node.core(),
        _ => None,
    }
}

/// Classification test on an arbitrary error.
pub fn is<'a>(err: &(dyn StdError + 'static), target: impl Into<Target<'a>>) -> bool {
    Node::of(err).is(target.into())
}

/// First option set found walking `source()` from `err`.
pub fn find_core<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Core> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(core) = Node::of(e).core() {
            return Some(core);
        }
        current = e.source();
    }
    None
}

/// First error of type `E` found walking `source()` from `err`.
pub fn find_cause<'a, E: StdError + 'static>(err: &'a (dyn StdError + 'static)) -> Option<&'a E> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(found) = e.downcast_ref::<E>() {
            return Some(found);
        }
        current = e.source();
    }
    None
}

/// Nearest valid HTTP projection in the causal and base chains.
pub fn find_http(err: &(dyn StdError + 'static)) -> Option<HttpStatus> {
    Node::of(err)
        .find_status(&|s: &StatusData| HttpStatus::project(s).is_some())
        .and_then(HttpStatus::project)
}

/// Nearest valid gRPC projection in the causal and base chains.
pub fn find_grpc(err: &(dyn StdError + 'static)) -> Option<GrpcStatus> {
    Node::of(err)
        .find_status(&|s: &StatusData| GrpcStatus::project(s).is_some())
        .and_then(GrpcStatus::project)
}

/// Wrap the error held by `result` in place, leaving `Ok` untouched.
///
/// Meant for functions with several exit points that all need the same
/// context added before returning.
#[track_caller]
pub fn defer_wrap<T>(result: &mut Result<T, Error>, internal_msg: &'static str) {
    if let Err(err) = result {
        let placeholder = Error {
            core: Core::root(Cow::Borrowed(""), StackTrace::empty()),
        };
        let taken = std::mem::replace(err, placeholder);
        *err = Error::wrap(taken, internal_msg);
    }
}

/// Wrap the error of a `Result` with a developer message.
pub trait ResultExt<T> {
    /// Wrap an `Err` with a developer message, leaving `Ok` untouched.
    fn wrap_err(self, internal_msg: &'static str) -> Result<T, Error>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    #[track_caller]
    fn wrap_err(self, internal_msg: &'static str) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Error::wrap(e, internal_msg)),
        }
    }
}
