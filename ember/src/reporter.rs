//! The reporter facade used by build steps.

use console::style;
use ember_activity::ActivityRegistry;
use miette::{GraphicalReportHandler, GraphicalTheme, Report};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::debug;

use crate::config::ReporterConfig;
use crate::policy::CommandContext;
use crate::timer::{ActivityArgs, ActivityTimer};

const REPORTER_TARGET: &str = "ember::reporter";

type ExitHook = Box<dyn Fn(i32) + Send + Sync>;

/// Public API for build steps: activity timers, success announcements and
/// error reporting.
///
/// A reporter is constructed with the registry it reports into, so every
/// timer it hands out is connected before it can be used:
///
/// ```rust,ignore
/// let registry = ActivityRegistry::new();                   // 1. state owner
/// let reporter = Reporter::new(registry.clone(), config);   // 2. facade
/// let display = Display::new(registry.subscribe());          // 3. rendering
/// ```
pub struct Reporter {
    registry: Arc<ActivityRegistry>,
    command: CommandContext,
    verbose: AtomicBool,
    no_color: AtomicBool,
    created: Instant,
    out: Mutex<Box<dyn Write + Send>>,
    exit: ExitHook,
}

impl Reporter {
    pub fn new(registry: Arc<ActivityRegistry>, config: ReporterConfig) -> Self {
        Self {
            registry,
            command: config.command,
            verbose: AtomicBool::new(config.verbose),
            no_color: AtomicBool::new(config.no_color),
            created: Instant::now(),
            out: Mutex::new(Box::new(io::stderr())),
            exit: Box::new(|_code: i32| {}),
        }
    }

    /// Write error and verbose output to `out` instead of stderr.
    pub fn with_writer(mut self, out: impl Write + Send + 'static) -> Self {
        self.out = Mutex::new(Box::new(out));
        self
    }

    /// Call `hook` with the exit code before the process terminates.
    ///
    /// If the hook returns, the process exits with that code.
    pub fn with_exit_hook(mut self, hook: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.exit = Box::new(hook);
        self
    }

    pub fn registry(&self) -> &Arc<ActivityRegistry> {
        &self.registry
    }

    pub fn command(&self) -> &CommandContext {
        &self.command
    }

    /// Create a timer for `name`. Its clock starts now.
    pub fn activity_timer(&self, name: impl Into<String>, args: ActivityArgs) -> ActivityTimer {
        ActivityTimer::new(name.into(), args, self.registry.clone())
    }

    /// Announce a success, independent of any activity.
    pub fn success(&self, message: impl Into<String>) {
        self.registry.log_success(message);
    }

    pub fn info(&self, message: impl AsRef<str>) {
        let label = style("info").blue().force_styling(self.colors());
        self.write_line(&format!("{label} {}", message.as_ref()));
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        let label = style("warning").yellow().force_styling(self.colors());
        self.write_line(&format!("{label} {}", message.as_ref()));
    }

    /// Print `message` only in verbose mode.
    pub fn verbose(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        debug!(target: REPORTER_TARGET, "{message}");
        if self.is_verbose() {
            let label = style("verbose").dim().force_styling(self.colors());
            self.write_line(&format!("{label} {message}"));
        }
    }

    /// Print how long the reporter has been running, prefixed with `prefix` (verbose only).
    pub fn uptime(&self, prefix: impl AsRef<str>) {
        let millis = self.created.elapsed().as_secs_f64() * 1000.0;
        self.verbose(format!("{}: {millis:.3}ms", prefix.as_ref()));
    }

    pub fn set_verbose(&self, verbose: bool) {
        self.verbose.store(verbose, Ordering::Relaxed);
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    /// Turn off colours in error output.
    pub fn set_no_color(&self, no_color: bool) {
        self.no_color.store(no_color, Ordering::Relaxed);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.report_error(message.as_ref(), None);
    }

    /// Report `message` followed by the rendered `error`.
    pub fn error_with(&self, message: impl AsRef<str>, error: &Report) {
        self.report_error(message.as_ref(), Some(error));
    }

    /// Report `error`, using its own message as the headline.
    pub fn error_report(&self, error: &Report) {
        self.report_error(&error.to_string(), Some(error));
    }

    /// Report the error and exit the process with status 1.
    pub fn panic(&self, message: impl AsRef<str>, error: Option<&Report>) -> ! {
        self.report_error(message.as_ref(), error);
        self.terminate(1)
    }

    /// Report the error; exit with status 1 only when running the build command.
    ///
    /// Under any other command this returns normally and the caller carries on.
    pub fn panic_on_build(&self, message: impl AsRef<str>, error: Option<&Report>) {
        self.report_error(message.as_ref(), error);
        if self.command.terminates_on_build_error() {
            self.terminate(1);
        }
        debug!(target: REPORTER_TARGET, command = %self.command, "continuing after build error");
    }

    fn terminate(&self, code: i32) -> ! {
        debug!(target: REPORTER_TARGET, code, "terminating");
        (self.exit)(code);
        std::process::exit(code)
    }

    fn colors(&self) -> bool {
        !self.no_color.load(Ordering::Relaxed) && console::colors_enabled_stderr()
    }

    fn report_error(&self, message: &str, error: Option<&Report>) {
        debug!(target: REPORTER_TARGET, error = message, "reporting error");

        let label = style("error").red().bold().force_styling(self.colors());
        let mut text = format!("{label} {message}");

        if let Some(error) = error {
            let theme = if self.no_color.load(Ordering::Relaxed) {
                GraphicalTheme::unicode_nocolor()
            } else {
                GraphicalTheme::unicode()
            };
            let mut rendered = String::new();
            if GraphicalReportHandler::new_themed(theme)
                .render_report(&mut rendered, &**error)
                .is_ok()
            {
                text.push('\n');
                text.push_str(rendered.trim_end());
            }
        }

        self.write_line(&text);
    }

    fn write_line(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("command", &self.command)
            .field("verbose", &self.is_verbose())
            .field("no_color", &self.no_color.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
