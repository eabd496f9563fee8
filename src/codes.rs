//! Legacy response codes.
//!
//! Before status prototypes existed, handlers returned a [`Code`]: a
//! classification string, an HTTP status, a developer label and a user
//! message. Codes are still accepted by the response builder and by
//! [`ResponseError`](crate::ResponseError).
//!
//! # Validation
//!
//! Codes declared as constants are validated at compile time by
//! [`Code::const_new`]; codes built from runtime input go through
//! [`Code::checked_new`], which returns an error instead of panicking.
//!
//! # Example
//!
//! ```rust
//! use loanhub_errors::{Code, define_response_codes};
//!
//! define_response_codes! {
//!     LOAN_LOCKED = ("LOAN_LOCKED", 423, "Locked", "This loan is being processed. Please try again shortly."),
//! }
//!
//! assert_eq!(LOAN_LOCKED.http_status_code(), 423);
//! assert_eq!(LOAN_LOCKED.to_string(), "LOAN_LOCKED");
//! ```

use crate::config::{self, GENERIC_USER_MSG};
use std::borrow::Cow;
use std::fmt;

/// A legacy response code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Code {
    code: &'static str,
    http: u16,
    dev_msg: Cow<'static, str>,
    user_msg: Cow<'static, str>,
}

impl Code {
    /// Create a code with compile-time validation.
    ///
    /// # Panics
    ///
    /// Panics at compile time (in const contexts) if `code` is empty or
    /// `http` is outside `100..=599`.
    #[inline]
    pub const fn const_new(
        code: &'static str,
        http: u16,
        dev_msg: &'static str,
        user_msg: &'static str,
    ) -> Self {
        assert!(!code.is_empty(), "Response code must not be empty");
        assert!(http >= 100 && http <= 599, "HTTP status must be 100-599");
        Self {
            code,
            http,
            dev_msg: Cow::Borrowed(dev_msg),
            user_msg: Cow::Borrowed(user_msg),
        }
    }

    /// Create a code with runtime validation.
    ///
    /// # Errors
    ///
    /// [`CodeError::EmptyCode`] or [`CodeError::InvalidHttpStatus`].
    pub fn checked_new(
        code: &'static str,
        http: u16,
        dev_msg: impl Into<Cow<'static, str>>,
        user_msg: impl Into<Cow<'static, str>>,
    ) -> Result<Self, CodeError> {
        if code.is_empty() {
            return Err(CodeError::EmptyCode);
        }
        if !(100..=599).contains(&http) {
            return Err(CodeError::InvalidHttpStatus { value: http });
        }
        Ok(Self {
            code,
            http,
            dev_msg: dev_msg.into(),
            user_msg: user_msg.into(),
        })
    }

    /// Replace the user message.
    pub fn with_user_msg(mut self, msg: impl Into<Cow<'static, str>>) -> Self {
        self.user_msg = msg.into();
        self
    }

    /// Replace the developer label.
    pub fn with_dev_msg(mut self, msg: impl Into<Cow<'static, str>>) -> Self {
        self.dev_msg = msg.into();
        self
    }

    /// Classification string.
    #[inline]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// HTTP status code.
    #[inline]
    pub const fn http_status_code(&self) -> u16 {
        self.http
    }

    /// Short developer label, exposed as `error` in responses.
    #[inline]
    pub fn dev_msg(&self) -> &str {
        &self.dev_msg
    }

    /// Guidance text, exposed as `reason` in responses.
    #[inline]
    pub fn user_msg(&self) -> &str {
        &self.user_msg
    }

    /// [`Code::user_msg`], with the configured generic message standing in
    /// for the built-in one.
    pub fn effective_user_msg(&self) -> &str {
        if self.user_msg == GENERIC_USER_MSG {
            config::settings().generic_user_msg()
        } else {
            &self.user_msg
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

/// Validation failure for [`Code::checked_new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    /// The classification string was empty.
    EmptyCode,
    /// HTTP status outside `100..=599`.
    InvalidHttpStatus {
        /// Rejected status.
        value: u16,
    },
}

impl fmt::Display for CodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCode => f.write_str("Response code must not be empty"),
            Self::InvalidHttpStatus { value } => {
                write!(f, "HTTP status {} outside 100-599", value)
            }
        }
    }
}

impl std::error::Error for CodeError {}

/// Declare legacy response codes as constants.
///
/// # Example
///
/// ```rust
/// # use loanhub_errors::define_response_codes;
/// define_response_codes! {
///     GONE = ("GONE", 410, "Gone", "This listing was removed."),
///     CONFLICT = ("CONFLICT", 409, "Conflict", "Someone else changed this loan."),
/// }
/// assert_eq!(GONE.dev_msg(), "Gone");
/// ```
#[macro_export]
macro_rules! define_response_codes {
    ($( $(#[$meta:meta])* $name:ident = ($code:expr, $http:expr, $dev:expr, $user:expr) ),+ $(,)?) => {
        $(
            $(#[$meta])*
            pub const $name: $crate::Code = $crate::Code::const_new($code, $http, $dev, $user);
        )+
    };
}

define_response_codes! {
    /// Successful request.
    SUCCESS = ("SUCCESS", 200, "Success", "Success"),
    /// Malformed or invalid request.
    BAD_REQUEST = ("BAD_REQUEST", 400, "Bad Request", GENERIC_USER_MSG),
    /// Missing or invalid credentials.
    UNAUTHORIZED = (
        "UNAUTHORIZED",
        401,
        "Unauthorized",
        "Sorry, you need to be logged in to access this page. Please log in and try again."
    ),
    /// Plan does not include the feature.
    PAYMENT_REQUIRED = (
        "PAYMENT_REQUIRED",
        402,
        "Payment Required",
        "You need to upgrade your plan to access this feature."
    ),
    /// Authenticated but not allowed.
    FORBIDDEN = (
        "FORBIDDEN",
        403,
        "Forbidden",
        "You do not have the necessary permissions to view this item."
    ),
    /// Resource does not exist.
    NOT_FOUND = (
        "NOT_FOUND",
        404,
        "Not Found",
        "Oops! We couldn't find what you were looking for. Please send a report to support@your-app.com if you believe this was an error."
    ),
    /// Well-formed but semantically invalid request.
    UNPROCESSABLE = (
        "UNPROCESSABLE",
        422,
        "Unprocessable Entity",
        "The request could not be processed correctly due to a mistake in the information provided. Please review and try again."
    ),
    /// Rate limited.
    TOO_MANY_REQUESTS = (
        "TOO_MANY_REQUESTS",
        429,
        "Too Many Requests",
        "You've made too many requests. Please take a break and try again later."
    ),
    /// Unclassified failure.
    INTERNAL_SERVER_ERROR = ("INTERNAL_SERVER_ERROR", 500, "Internal Server Error", GENERIC_USER_MSG),
    /// Route exists but is not built yet.
    NOT_IMPLEMENTED = ("NOT_IMPLEMENTED", 501, "Not Implemented", "Not Implemented"),
}
