//! Severity levels attached to every error value.
//!
//! Severity is orthogonal to the HTTP code: `Warning` marks anticipated
//! operational conditions (rate limiting, unpaid plans, unimplemented routes),
//! `Error` marks genuine faults.

use std::fmt;

/// How bad an error is, independent of how it is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    /// Not classified. Default for freshly created errors.
    #[default]
    Unknown,
    /// Anticipated condition, not a bug.
    Warning,
    /// Genuine fault.
    Error,
    /// Unrecoverable fault.
    Fatal,
}

impl Severity {
    /// Lowercase label used in logs.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }

    /// Whether this severity marks an anticipated condition.
    #[inline]
    pub const fn is_expected(self) -> bool {
        matches!(self, Self::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
