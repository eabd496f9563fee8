//! # Loanhub Errors
//!
//! Error classification and response building for the loan marketplace API.
//!
//! ## Design Philosophy
//!
//! 1. **Errors are classified once, at declaration**: prototypes carry
//!    severity, messages and protocol codes; occurrences inherit them
//! 2. **Classification survives wrapping**: adding context never loses the
//!    status an error was raised with
//! 3. **Three audiences, three messages**: developers, API clients and end
//!    users each get their own text
//! 4. **One place decides the wire shape**: [`ResponseBuilder`] turns any
//!    error into an HTTP status and JSON body, degrading to
//!    `INTERNAL_SERVER_ERROR` for anything unclassified
//!
//! ## Building Blocks
//!
//! - [`Error`] / [`ErrorType`]: mutable instance and frozen prototype with
//!   causal wrapping, base tags, severity and stack traces
//! - [`Status`] / [`StatusType`]: errors with a classification code and
//!   optional HTTP and gRPC codes, registered in the
//!   [process-wide registry](registry::global)
//! - [`catalog`]: the nine standard HTTP statuses plus the `expected` and
//!   `http` tags
//! - [`ResponseBuilder`]: projection onto the wire, with diagnostics gated
//!   by configuration
//! - [`ResponseError`] and [`Code`]: the legacy response error shape, still
//!   accepted everywhere
//!
//! ## Quick Start
//!
//! ```rust
//! use loanhub_errors::{Error, ResponseBuilder, Severity, Status, catalog};
//!
//! // Declared once at startup.
//! let loan_closed = Status::new("LOAN_CLOSED", Error::new("loan closed"))
//!     .with_severity(Severity::Warning)
//!     .with_public_msg("Loan Closed")
//!     .with_user_msg("This loan no longer accepts investments.")
//!     .with_http(409)
//!     .freeze();
//!
//! // Raised per request, wrapped on the way up.
//! fn invest(closed: bool, proto: &loanhub_errors::StatusType) -> Result<(), Error> {
//!     if closed {
//!         return Err(Error::wrap(proto.new(), "invest in loan 17"));
//!     }
//!     Ok(())
//! }
//!
//! let err = invest(true, &loan_closed).unwrap_err();
//! assert!(err.is(&loan_closed));
//!
//! let (status, body) = ResponseBuilder::new(false).build("req-1", "3.10ms", &err, None);
//! assert_eq!(status, 409);
//! assert_eq!(body.code, "LOAN_CLOSED");
//! assert_eq!(body.error, "Loan Closed");
//! assert_eq!(body.reason, "This loan no longer accepts investments.");
//!
//! // Catalog statuses are ready to use.
//! let (status, _) = ResponseBuilder::new(false).build("req-2", "", &catalog::new_forbidden(), None);
//! assert_eq!(status, 403);
//! ```
//!
//! ## Configuration
//!
//! ```rust,no_run
//! use loanhub_errors::config::{self, Options};
//!
//! // APP_ENV=development exposes developer messages and full backtraces.
//! config::init(Options::from_env()).expect("configured once");
//! ```
//!
//! ## Features
//!
//! - `full_backtrace`: capture full backtraces by default instead of the
//!   construction site only

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod codes;
pub mod config;
pub mod errs;
pub mod logging;
pub mod registry;
pub mod response;
pub mod response_error;
pub mod severity;
pub mod stack;
pub mod status;

pub use catalog::Catalog;
pub use codes::{Code, CodeError};
pub use config::{InitError, Options, Settings};
pub use errs::{Base, Cause, Core, Data, Error, ErrorType, ResultExt, Target, View, ViewKind};
pub use logging::ResponseLog;
pub use registry::StatusRegistry;
pub use response::{ErrorDetails, RequestTrace, Response, ResponseBuilder, build_err_response};
pub use response_error::{BoxError, ResponseError};
pub use severity::Severity;
pub use stack::{CaptureMode, Frame, StackCapture, StackTrace};
pub use status::{GrpcStatus, HttpStatus, Status, StatusData, StatusType};

/// Type alias for Results using our error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn types_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
        assert_send_sync::<ErrorType>();
        assert_send_sync::<Status>();
        assert_send_sync::<StatusType>();
        assert_send_sync::<ResponseError>();
        assert_send_sync::<StatusRegistry>();
    }

    #[test]
    fn result_alias_propagates() {
        fn inner() -> Result<()> {
            Err(Error::new("inner"))
        }
        fn outer() -> Result<()> {
            inner().wrap_err("outer")
        }
        assert_eq!(outer().map_err(|e| e.to_string()), Err("outer: inner".to_owned()));
    }
}
