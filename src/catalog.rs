//! The standard status catalog.
//!
//! Two classification tags and nine HTTP statuses every service in the
//! marketplace shares:
//!
//! | Code                    | HTTP | Severity | Tags           |
//! |-------------------------|------|----------|----------------|
//! | `BAD_REQUEST`           | 400  | error    | http           |
//! | `UNAUTHORIZED`          | 401  | error    | http           |
//! | `PAYMENT_REQUIRED`      | 402  | warning  | http, expected |
//! | `FORBIDDEN`             | 403  | error    | http           |
//! | `NOT_FOUND`             | 404  | error    | http           |
//! | `UNPROCESSABLE`         | 422  | error    | http           |
//! | `TOO_MANY_REQUESTS`     | 429  | warning  | http, expected |
//! | `INTERNAL_SERVER_ERROR` | 500  | error    | http           |
//! | `NOT_IMPLEMENTED`       | 501  | warning  | http, expected |
//!
//! The catalog is declared on first use of any constructor, of [`catalog`] or
//! of the [global registry](crate::registry::global), whichever comes first.
//! [`config::init`](crate::config::init) declares it again with the
//! configured generic user message.
//!
//! # Example
//!
//! ```rust
//! use loanhub_errors::{catalog, errs};
//!
//! let err = catalog::new_too_many_requests();
//! assert!(err.is(catalog::catalog().expected()));
//! assert_eq!(
//!     errs::find_http(&err).map(|h| h.http_status_code()),
//!     Some(429)
//! );
//! ```

use crate::config;
use crate::errs::{Error, ErrorType};
use crate::severity::Severity;
use crate::status::{Status, StatusType};
use std::sync::{Arc, RwLock};

/// Guidance shown for anticipated conditions.
pub const EXPECTED_USER_MSG: &str =
    "We're experiencing a hiccup in our system. Please try again in a minute.";

macro_rules! declare_catalog {
    (
        $generic:ident, $expected:ident => {
            $(
                $(#[$meta:meta])*
                $field:ident, $ctor:ident = $code:literal ($http:literal, $severity:ident $(, $tag:ident)?) {
                    internal: $internal:literal,
                    public: $public:literal,
                    user: $user:expr $(,)?
                }
            ),+ $(,)?
        }
    ) => {
        /// Frozen prototypes of the standard catalog.
        #[derive(Debug)]
        pub struct Catalog {
            expected: ErrorType,
            http: ErrorType,
            $( $field: StatusType, )+
        }

        impl Catalog {
            /// Declare every prototype, registering each status.
            pub fn declare(generic_user_msg: &str) -> Self {
                let $generic = generic_user_msg.to_owned();
                let $expected = Error::new("expected error")
                    .with_severity(Severity::Warning)
                    .with_user_msg(EXPECTED_USER_MSG)
                    .freeze();
                let http = Error::new("http error").freeze();

                $(
                    let $field = {
                        let err = Error::new($internal)
                            .with_severity(Severity::$severity)
                            .with_public_msg($public)
                            .with_user_msg($user)
                            .add_base(&http);
                        $( let err = err.add_base(&$tag); )?
                        Status::new($code, err).with_http($http).freeze()
                    };
                )+

                Self { expected: $expected, http, $( $field, )+ }
            }

            /// Tag for anticipated conditions.
            #[inline]
            pub fn expected(&self) -> &ErrorType {
                &self.expected
            }

            /// Tag shared by every HTTP status.
            #[inline]
            pub fn http(&self) -> &ErrorType {
                &self.http
            }

            $(
                $(#[$meta])*
                #[inline]
                pub fn $field(&self) -> &StatusType {
                    &self.$field
                }
            )+
        }

        $(
            $(#[$meta])*
            #[track_caller]
            pub fn $ctor() -> Status {
                catalog().$field.new()
            }
        )+
    };
}

declare_catalog! {
    generic, expected => {
        /// `BAD_REQUEST` (400).
        bad_request, new_bad_request = "BAD_REQUEST" (400, Error) {
            internal: "bad request",
            public: "Bad Request",
            user: generic.clone(),
        },
        /// `UNAUTHORIZED` (401).
        unauthorized, new_unauthorized = "UNAUTHORIZED" (401, Error) {
            internal: "unauthorized",
            public: "Unauthorized",
            user: "Sorry, you need to be logged in to access this page. Please log in and try again.",
        },
        /// `PAYMENT_REQUIRED` (402), an expected condition.
        payment_required, new_payment_required = "PAYMENT_REQUIRED" (402, Warning, expected) {
            internal: "payment required",
            public: "Payment Required",
            user: "You need to upgrade your plan to access this feature.",
        },
        /// `FORBIDDEN` (403).
        forbidden, new_forbidden = "FORBIDDEN" (403, Error) {
            internal: "forbidden",
            public: "Forbidden",
            user: "You do not have the necessary permissions to view this item.",
        },
        /// `NOT_FOUND` (404).
        not_found, new_not_found = "NOT_FOUND" (404, Error) {
            internal: "not found",
            public: "Not Found",
            user: "Oops! We couldn't find what you were looking for. Please send a report to support@your-app.com if you believe this was an error.",
        },
        /// `UNPROCESSABLE` (422).
        unprocessable, new_unprocessable = "UNPROCESSABLE" (422, Error) {
            internal: "unprocessable entity",
            public: "Unprocessable Entity",
            user: "The request could not be processed correctly due to a mistake in the information provided. Please review and try again.",
        },
        /// `TOO_MANY_REQUESTS` (429), an expected condition.
        too_many_requests, new_too_many_requests = "TOO_MANY_REQUESTS" (429, Warning, expected) {
            internal: "too many requests",
            public: "Too Many Requests",
            user: "You've made too many requests. Please take a break and try again later.",
        },
        /// `INTERNAL_SERVER_ERROR` (500). Fallback for anything unclassified.
        internal_server_error, new_internal_server_error = "INTERNAL_SERVER_ERROR" (500, Error) {
            internal: "internal server error",
            public: "Internal Server Error",
            user: generic.clone(),
        },
        /// `NOT_IMPLEMENTED` (501), an expected condition.
        not_implemented, new_not_implemented = "NOT_IMPLEMENTED" (501, Warning, expected) {
            internal: "not implemented",
            public: "Not Implemented",
            user: generic.clone(),
        },
    }
}

static CATALOG: RwLock<Option<Arc<Catalog>>> = RwLock::new(None);

/// The active catalog, declared with default settings on first use.
pub fn catalog() -> Arc<Catalog> {
    let current = match CATALOG.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    if let Some(catalog) = current {
        return catalog;
    }

    let mut slot = match CATALOG.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    match slot.as_ref() {
        Some(catalog) => Arc::clone(catalog),
        None => {
            let declared = Arc::new(Catalog::declare(config::settings().generic_user_msg()));
            *slot = Some(Arc::clone(&declared));
            declared
        }
    }
}

/// Replace the active catalog. Used by [`config::init`](crate::config::init).
pub(crate) fn install(catalog: Catalog) {
    let mut slot = match CATALOG.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *slot = Some(Arc::new(catalog));
}
