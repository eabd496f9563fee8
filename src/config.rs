//! Process-wide configuration.
//!
//! Settings are chosen once at startup with [`init`]. Until then
//! [`settings`] returns the defaults: diagnostics off, the built-in generic
//! user message and [`CaptureMode::default_mode`].
//!
//! ```rust,no_run
//! use loanhub_errors::config::{self, Options};
//!
//! config::init(Options::from_env().with_generic_user_msg(
//!     "Something went wrong. Please contact support@loanhub.dev.",
//! ))
//! .expect("configured twice");
//! ```

use crate::catalog::{self, Catalog};
use crate::stack::{self, CaptureMode};
use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

/// Environment variable holding the deployment environment.
pub const APP_ENV_VAR: &str = "APP_ENV";

/// `APP_ENV` value that turns diagnostics on.
pub const DEVELOPMENT_ENV: &str = "development";

/// User message returned for errors nobody classified.
pub const GENERIC_USER_MSG: &str =
    "Uh oh! Something unexpected occurred. Please send a report to support@your-app.com so we can fix it.";

/// Startup options. Consumed by [`init`].
#[derive(Debug, Clone, Default)]
pub struct Options {
    with_stack_trace: bool,
    generic_user_msg: Option<Cow<'static, str>>,
    capture: Option<CaptureMode>,
}

impl Options {
    /// Defaults: diagnostics off, built-in messages, default capture mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options derived from `APP_ENV`.
    pub fn from_env() -> Self {
        Self::from_app_env(std::env::var(APP_ENV_VAR).ok().as_deref())
    }

    /// Options for the given `APP_ENV` value. `development` enables
    /// diagnostics and full backtraces.
    pub fn from_app_env(app_env: Option<&str>) -> Self {
        let development = app_env == Some(DEVELOPMENT_ENV);
        let capture = if development {
            CaptureMode::Full
        } else {
            CaptureMode::default_mode()
        };
        Self::new()
            .with_stack_trace(development)
            .with_capture(capture)
    }

    /// Expose developer messages and stack traces in responses. Unless a
    /// capture mode is selected, enabling this captures full backtraces.
    pub fn with_stack_trace(mut self, enabled: bool) -> Self {
        self.with_stack_trace = enabled;
        self
    }

    /// Override the generic user message. Empty messages are ignored.
    pub fn with_generic_user_msg(mut self, msg: impl Into<Cow<'static, str>>) -> Self {
        let msg = msg.into();
        if !msg.is_empty() {
            self.generic_user_msg = Some(msg);
        }
        self
    }

    /// Select the stack capture strategy.
    pub fn with_capture(mut self, mode: CaptureMode) -> Self {
        self.capture = Some(mode);
        self
    }
}

/// Effective process-wide settings.
#[derive(Debug)]
pub struct Settings {
    with_stack_trace: bool,
    generic_user_msg: Cow<'static, str>,
    capture: CaptureMode,
}

impl Settings {
    const DEFAULT: Settings = Settings {
        with_stack_trace: false,
        generic_user_msg: Cow::Borrowed(GENERIC_USER_MSG),
        capture: CaptureMode::default_mode(),
    };

    fn from_options(options: Options) -> Self {
        Self {
            with_stack_trace: options.with_stack_trace,
            generic_user_msg: options
                .generic_user_msg
                .unwrap_or(Cow::Borrowed(GENERIC_USER_MSG)),
            capture: options.capture.unwrap_or(if options.with_stack_trace {
                CaptureMode::Full
            } else {
                CaptureMode::default_mode()
            }),
        }
    }

    /// Whether responses carry diagnostic details.
    #[inline]
    pub const fn with_stack_trace(&self) -> bool {
        self.with_stack_trace
    }

    /// User message for unclassified errors.
    #[inline]
    pub fn generic_user_msg(&self) -> &str {
        &self.generic_user_msg
    }

    /// Active stack capture strategy.
    #[inline]
    pub const fn capture(&self) -> CaptureMode {
        self.capture
    }
}

/// Failure to apply startup configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// [`init`] already ran in this process.
    AlreadyInitialized,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInitialized => f.write_str("error settings already initialized"),
        }
    }
}

impl std::error::Error for InitError {}

static DEFAULT_SETTINGS: Settings = Settings::DEFAULT;
static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Apply `options` for the rest of the process: install settings, select the
/// capture strategy and declare the standard catalog.
///
/// # Errors
///
/// [`InitError::AlreadyInitialized`] when called more than once.
pub fn init(options: Options) -> Result<&'static Settings, InitError> {
    SETTINGS
        .set(Settings::from_options(options))
        .map_err(|_| InitError::AlreadyInitialized)?;
    let settings = settings();

    stack::set_capture_mode(settings.capture());
    catalog::install(Catalog::declare(settings.generic_user_msg()));

    tracing::debug!(
        with_stack_trace = settings.with_stack_trace(),
        capture = ?settings.capture(),
        "error settings initialized"
    );
    Ok(settings)
}

/// Current settings, or the defaults when [`init`] never ran.
#[inline]
pub fn settings() -> &'static Settings {
    SETTINGS.get().unwrap_or(&DEFAULT_SETTINGS)
}

/// Whether responses carry diagnostic details.
#[inline]
pub fn diagnostics_enabled() -> bool {
    settings().with_stack_trace()
}
