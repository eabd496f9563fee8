//! Call-stack capture for error instances.
//!
//! Every error instance records where it was created. How much is recorded is
//! a process-wide strategy chosen at startup:
//!
//! - [`CaptureMode::Caller`]: only the construction site, via `#[track_caller]`.
//!   Cheap enough for every request. The default.
//! - [`CaptureMode::Full`]: a full `std::backtrace::Backtrace`, parsed into
//!   frames and capped at [`MAX_FRAMES`]. Intended for development deployments
//!   where diagnostics are exposed.
//! - [`CaptureMode::Disabled`]: nothing is recorded.
//!
//! Custom strategies implement [`StackCapture`] and are installed with
//! [`install_capture`].
//!
//! Frames are shared behind an `Arc`, so wrapping an error and keeping the
//! original capture point costs a refcount increment.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::sync::{Arc, LazyLock, RwLock};

/// Maximum number of frames kept from a full backtrace.
pub const MAX_FRAMES: usize = 15;

/// Column multiple the function name is padded to when rendering a frame.
const FUNCTION_PAD: usize = 12;

const CRATE_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");
const CRATE_IMPL_PREFIX: &str = concat!("<", env!("CARGO_CRATE_NAME"), "::");

/// A single captured call-stack frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    function: Cow<'static, str>,
    file: Cow<'static, str>,
    line: u32,
}

impl Frame {
    /// Build a frame from its parts.
    pub fn new(
        function: impl Into<Cow<'static, str>>,
        file: impl Into<Cow<'static, str>>,
        line: u32,
    ) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
        }
    }

    /// Frame for a `#[track_caller]` location. The function name is unknown.
    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            function: Cow::Borrowed(""),
            file: Cow::Borrowed(location.file()),
            line: location.line(),
        }
    }

    /// Fully qualified function name, empty when unknown.
    #[inline]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Source file path.
    #[inline]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Source line.
    #[inline]
    pub const fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for Frame {
    /// `function file:line`, the function padded to a multiple of 12 columns.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.function.is_empty() {
            return write!(f, "{}:{}", self.file, self.line);
        }
        let width = self.function.len().div_ceil(FUNCTION_PAD) * FUNCTION_PAD;
        write!(
            f,
            "{:<width$} {}:{}",
            self.function,
            self.file,
            self.line,
            width = width
        )
    }
}

/// Immutable, cheaply clonable sequence of frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackTrace(Arc<[Frame]>);

impl StackTrace {
    /// A trace with no frames.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture a trace for the caller using the installed strategy.
    #[track_caller]
    pub fn capture() -> Self {
        let location = Location::caller();
        current_capture().capture(location)
    }

    /// Frames, innermost first.
    #[inline]
    pub fn frames(&self) -> &[Frame] {
        &self.0
    }

    /// Number of frames.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was captured.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render every frame as a line, for wire output.
    pub fn lines(&self) -> Vec<String> {
        self.0.iter().map(Frame::to_string).collect()
    }
}

impl From<Vec<Frame>> for StackTrace {
    fn from(frames: Vec<Frame>) -> Self {
        Self(frames.into())
    }
}

impl FromIterator<Frame> for StackTrace {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Strategy for recording where an error was created.
///
/// Implementations must be cheap to call concurrently; they run on every
/// error construction.
pub trait StackCapture: Send + Sync {
    /// Capture frames for an error created at `caller`.
    fn capture(&self, caller: &'static Location<'static>) -> StackTrace;
}

/// Records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl StackCapture for NoCapture {
    fn capture(&self, _caller: &'static Location<'static>) -> StackTrace {
        StackTrace::empty()
    }
}

/// Records the construction site only.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallerCapture;

impl StackCapture for CallerCapture {
    fn capture(&self, caller: &'static Location<'static>) -> StackTrace {
        StackTrace::from(vec![Frame::from_location(caller)])
    }
}

/// Records a full backtrace, skipping capture machinery and this crate's
/// constructors.
#[derive(Debug, Clone, Copy)]
pub struct BacktraceCapture {
    max_frames: usize,
}

impl BacktraceCapture {
    /// Keep at most `max_frames` frames (at least one).
    pub const fn new(max_frames: usize) -> Self {
        Self {
            max_frames: if max_frames == 0 { 1 } else { max_frames },
        }
    }
}

impl Default for BacktraceCapture {
    fn default() -> Self {
        Self::new(MAX_FRAMES)
    }
}

impl StackCapture for BacktraceCapture {
    fn capture(&self, caller: &'static Location<'static>) -> StackTrace {
        let rendered = Backtrace::force_capture().to_string();
        let frames: Vec<Frame> = parse_backtrace(&rendered)
            .into_iter()
            .skip_while(is_capture_frame)
            .take(self.max_frames)
            .collect();

        if frames.is_empty() {
            // Stripped binaries resolve no symbols.
            return CallerCapture.capture(caller);
        }
        StackTrace::from(frames)
    }
}

/// Built-in capture strategies selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureMode {
    /// [`NoCapture`].
    Disabled,
    /// [`CallerCapture`].
    Caller,
    /// [`BacktraceCapture`].
    Full,
}

impl CaptureMode {
    /// Mode used when nothing was configured.
    pub const fn default_mode() -> Self {
        if cfg!(feature = "full_backtrace") {
            Self::Full
        } else {
            Self::Caller
        }
    }

    fn strategy(self) -> Arc<dyn StackCapture> {
        match self {
            Self::Disabled => Arc::new(NoCapture),
            Self::Caller => Arc::new(CallerCapture),
            Self::Full => Arc::new(BacktraceCapture::default()),
        }
    }
}

impl Default for CaptureMode {
    fn default() -> Self {
        Self::default_mode()
    }
}

static CAPTURE: LazyLock<RwLock<Arc<dyn StackCapture>>> =
    LazyLock::new(|| RwLock::new(CaptureMode::default_mode().strategy()));

fn current_capture() -> Arc<dyn StackCapture> {
    match CAPTURE.read() {
        Ok(guard) => Arc::clone(&guard),
        Err(poisoned) => Arc::clone(&poisoned.into_inner()),
    }
}

/// Install a custom capture strategy for all subsequently created errors.
pub fn install_capture(strategy: Arc<dyn StackCapture>) {
    let mut guard = match CAPTURE.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = strategy;
}

/// Select one of the built-in capture strategies.
pub fn set_capture_mode(mode: CaptureMode) {
    install_capture(mode.strategy());
}

/// Parse the `Display` rendering of a `std::backtrace::Backtrace`.
///
/// The format is one `N: symbol` line per frame, optionally followed by an
/// `at file:line:col` line.
fn parse_backtrace(rendered: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();

    for raw in rendered.lines() {
        let line = raw.trim();

        if let Some(location) = line.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                let mut parts = location.rsplitn(3, ':');
                let _column = parts.next();
                let line_no = parts.next().and_then(|l| l.parse::<u32>().ok());
                let file = parts.next();
                if let (Some(file), Some(line_no)) = (file, line_no) {
                    frame.file = Cow::Owned(file.to_owned());
                    frame.line = line_no;
                }
            }
            continue;
        }

        if let Some((index, symbol)) = line.split_once(": ") {
            if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) {
                frames.push(Frame::new(symbol.to_owned(), "", 0));
            }
        }
    }

    frames
}

fn is_capture_frame(frame: &Frame) -> bool {
    let function = frame.function();
    if function.starts_with("std::backtrace")
        || function.starts_with("<std::backtrace")
        || function.contains("backtrace_rs")
    {
        return true;
    }
    let own = function.starts_with(CRATE_PREFIX) || function.starts_with(CRATE_IMPL_PREFIX);
    own && !function.contains("::tests::")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
   0: std::backtrace_rs::backtrace::libunwind::trace
             at /rustc/abc/library/std/src/../../backtrace/src/backtrace/libunwind.rs:116:5
   1: std::backtrace::Backtrace::create
             at /rustc/abc/library/std/src/backtrace.rs:331:13
   2: loanhub_errors::stack::BacktraceCapture::capture
             at ./src/stack.rs:190:24
   3: loanhub_errors::errs::Error::new
             at ./src/errs.rs:300:9
   4: loan_service::usecase::approve
             at ./src/usecase.rs:42:17
   5: __rust_begin_short_backtrace
";

    #[test]
    fn parses_symbols_and_locations() {
        let frames = parse_backtrace(SAMPLE);
        assert_eq!(frames.len(), 6);
        assert_eq!(frames[4].function(), "loan_service::usecase::approve");
        assert_eq!(frames[4].file(), "./src/usecase.rs");
        assert_eq!(frames[4].line(), 42);
        assert_eq!(frames[5].file(), "");
    }

    #[test]
    fn skips_machinery_and_own_constructors() {
        let frames: Vec<Frame> = parse_backtrace(SAMPLE)
            .into_iter()
            .skip_while(is_capture_frame)
            .collect();
        assert_eq!(frames[0].function(), "loan_service::usecase::approve");
    }

    #[test]
    fn frame_display_pads_function() {
        let frame = Frame::new("pkg::run", "src/main.rs", 7);
        assert_eq!(frame.to_string(), "pkg::run     src/main.rs:7");

        let exact = Frame::new("abcdefghijkl", "a.rs", 1);
        assert_eq!(exact.to_string(), "abcdefghijkl a.rs:1");
    }

    #[test]
    fn caller_frame_has_no_function() {
        let trace = CallerCapture.capture(Location::caller());
        assert_eq!(trace.len(), 1);
        assert!(trace.frames()[0].file().ends_with("stack.rs"));
        assert!(!trace.lines()[0].starts_with(' '));
    }

    #[test]
    fn disabled_records_nothing() {
        assert!(NoCapture.capture(Location::caller()).is_empty());
    }

    #[test]
    fn backtrace_capture_never_empty() {
        let trace = BacktraceCapture::new(3).capture(Location::caller());
        assert!(!trace.is_empty());
        assert!(trace.len() <= 3);
    }
}
