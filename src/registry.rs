//! Process-wide status registry.
//!
//! Maps a classification code to the latest snapshot of its status
//! prototype. Status nodes register themselves on construction, on every
//! protocol-code change and on freeze, so the registry always reflects the
//! most recent declaration of a code.
//!
//! # Concurrency
//!
//! - **RwLock-based**: lookups take a shared lock, registrations an exclusive one
//! - **Poison-tolerant**: a panic while holding the lock does not disable the
//!   registry; the map is always left in a consistent state by `insert`
//! - **No deletion**: entries live for the lifetime of the process
//!
//! # Example
//!
//! ```rust
//! use loanhub_errors::{Error, Status, registry};
//!
//! let declared = Status::new("LOAN_NOT_FUNDED", Error::new("loan not funded"))
//!     .with_http(409)
//!     .freeze();
//!
//! let found = registry::global().lookup("LOAN_NOT_FUNDED").map(|s| s.http_code());
//! assert_eq!(found, Some(declared.http_code()));
//! ```

use crate::catalog;
use crate::status::StatusType;
use std::collections::HashMap;
use std::sync::{LazyLock, Once, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Concurrent mapping from classification code to status prototype.
#[derive(Default)]
pub struct StatusRegistry {
    entries: RwLock<HashMap<String, StatusType>>,
}

impl StatusRegistry {
    /// Empty registry. Most callers want [`global`].
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<String, StatusType>> {
        match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[inline]
    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<String, StatusType>> {
        match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Upsert `status` under its own code. Last write wins.
    pub fn register(&self, status: StatusType) {
        let code = status.code().to_owned();
        tracing::trace!(code = %code, http = ?status.http_code(), "status registered");
        self.write_entries().insert(code, status);
    }

    /// Latest prototype registered under `code`.
    pub fn lookup(&self, code: &str) -> Option<StatusType> {
        self.read_entries().get(code).cloned()
    }

    /// Number of distinct codes.
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    /// Whether nothing was registered yet.
    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    /// Registered codes, sorted.
    pub fn codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.read_entries().keys().cloned().collect();
        codes.sort_unstable();
        codes
    }
}

impl std::fmt::Debug for StatusRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusRegistry")
            .field("codes", &self.codes())
            .finish()
    }
}

static GLOBAL: LazyLock<StatusRegistry> = LazyLock::new(StatusRegistry::new);
static STANDARD: Once = Once::new();

/// The process-wide registry every [`Status`](crate::Status) registers into.
///
/// The first call declares the [standard catalog](crate::catalog), so its
/// codes resolve before any of its constructors were used.
#[inline]
pub fn global() -> &'static StatusRegistry {
    STANDARD.call_once(|| {
        let _ = catalog::catalog();
        tracing::debug!(codes = GLOBAL.len(), "standard catalog declared");
    });
    &GLOBAL
}

/// Register into the process-wide registry without declaring the catalog.
/// Status construction goes through here, including the catalog's own.
pub(crate) fn publish(status: StatusType) {
    GLOBAL.register(status);
}
