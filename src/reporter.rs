use core::convert::Infallible;
use std::{
    io::{self, IsTerminal, Write},
    path::PathBuf,
};

use triomphe::Arc;

use crate::{
    builder::ReporterBuilder,
    error::Result,
    fault::Fault,
    format::{CrashReport, Timestamp},
    options::Options,
    sink,
};

/// Exit code used by [`Reporter::report_and_exit`] callers that have no
/// better one.
pub const DEFAULT_EXIT_CODE: i32 = 1;

/// Formats crash reports and writes them to the configured sinks.
///
/// A reporter is immutable. Cloning it is cheap and shares the underlying
/// [`Options`].
///
/// A reporter can be used directly as a handle, or installed in the
/// process-wide slot (see [`install`](Self::install)) that the free functions
/// [`crashreport::report`](crate::report) and the panic hook read from.
///
/// # Examples
///
/// ```rust
/// use crashreport::{Fault, ReporterBuilder};
///
/// let reporter = ReporterBuilder::new().application_name("inventory").build();
///
/// // No sink is enabled, so this only formats the report.
/// reporter
///     .report(Some(&Fault::new("index out of range")))
///     .expect("nothing to write");
/// ```
#[derive(Clone, Debug)]
pub struct Reporter {
    options: Arc<Options>,
}

impl Reporter {
    /// Creates a reporter from finished options.
    pub fn new(options: Options) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    /// Shorthand for [`ReporterBuilder::new`].
    pub fn builder() -> ReporterBuilder {
        ReporterBuilder::new()
    }

    /// The options this reporter was built with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Renders the report for `fault` as of now, without writing it anywhere.
    pub fn format(&self, fault: Option<&Fault>) -> String {
        CrashReport::new(&self.options, fault, Timestamp::now()).to_string()
    }

    /// Formats a report for `fault` and writes it to every enabled sink.
    ///
    /// Pass `None` when there is no fault at hand; the report then shows
    /// placeholder text for the fault's fields.
    ///
    /// Console output goes to stderr and is colored when stderr is a terminal
    /// and `NO_COLOR` is unset.
    ///
    /// Returns the path of the report file, if the file sink is enabled.
    ///
    /// # Errors
    ///
    /// Failing to create the output directory or to write the report file is
    /// returned as an error, as is a failed console write. The remaining
    /// sinks are still attempted first.
    pub fn report(&self, fault: Option<&Fault>) -> Result<Option<PathBuf>> {
        let stderr = io::stderr();
        let styled = stderr.is_terminal() && sink::console_style_enabled();
        let mut console = stderr.lock();
        self.dispatch(fault, &mut console, styled)
    }

    /// Like [`report`](Self::report), but console output goes to `console`
    /// and is written without styling.
    pub fn report_to<W: Write>(
        &self,
        fault: Option<&Fault>,
        console: &mut W,
    ) -> Result<Option<PathBuf>> {
        self.dispatch(fault, console, false)
    }

    /// Reports `fault` and then exits the process with `exit_code`.
    ///
    /// Nothing is cleaned up beyond what the sinks already did. If dispatch
    /// fails the error is returned and the process keeps running.
    pub fn report_and_exit(&self, fault: Option<&Fault>, exit_code: i32) -> Result<Infallible> {
        self.report(fault)?;
        std::process::exit(exit_code)
    }

    fn dispatch<W: Write>(
        &self,
        fault: Option<&Fault>,
        console: &mut W,
        styled: bool,
    ) -> Result<Option<PathBuf>> {
        let options = &*self.options;
        let report = CrashReport::new(options, fault, Timestamp::now());
        let text = report.to_string();

        if !options.has_active_sink() {
            return Ok(None);
        }

        tracing::debug!(
            console = options.write_to_console,
            file = options.write_to_file,
            debug_log = options.debug_log_active(),
            "dispatching crash report"
        );

        let mut first_error = None;

        if options.write_to_console
            && let Err(error) = sink::write_console(console, &text, styled)
        {
            first_error.get_or_insert(error);
        }

        let mut file = None;
        if options.write_to_file {
            match sink::write_file(&options.output_directory, &report.timestamp(), &text) {
                Ok(path) => file = Some(path),
                Err(error) => {
                    if options.console_fallback && !options.write_to_console {
                        // The error is still returned below.
                        let _ = sink::write_console(console, &text, styled);
                    }
                    first_error.get_or_insert(error);
                }
            }
        }

        if options.debug_log_active() {
            sink::write_debug_log(&text);
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(file),
        }
    }
}

impl From<Options> for Reporter {
    fn from(options: Options) -> Self {
        Self::new(options)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::error::Error;

    #[test]
    fn test_no_sinks_no_output() {
        let reporter = Reporter::new(Options {
            debug_build: true,
            ..Options::default()
        });
        let mut console = Vec::new();
        let file = reporter
            .report_to(Some(&Fault::new("M")), &mut console)
            .expect("nothing to write");
        assert_eq!(file, None);
        assert!(console.is_empty());
    }

    #[test]
    fn test_console_sink() {
        let reporter = ReporterBuilder::new()
            .application_name("inventory")
            .enable_console_output()
            .build();
        let mut console = Vec::new();
        reporter
            .report_to(Some(&Fault::new("M").with_source("S")), &mut console)
            .expect("console write");

        let text = String::from_utf8(console).expect("utf-8 report");
        assert!(text.starts_with("Crash Report - "));
        assert!(text.contains("\n    Message: M\n"));
        assert!(text.contains("\n    Source: S\n"));
    }

    #[test]
    fn test_file_and_console_receive_the_same_text() {
        let root = tempfile::tempdir().expect("temporary directory");
        let directory = root.path().join("some").join("dir");
        let reporter = ReporterBuilder::new()
            .enable_console_output()
            .enable_file_output(&directory)
            .build();

        let mut console = Vec::new();
        let path = reporter
            .report_to(None, &mut console)
            .expect("report written")
            .expect("file sink enabled");

        let entries: Vec<_> = fs::read_dir(&directory)
            .expect("directory created")
            .collect::<std::result::Result<_, _>>()
            .expect("directory listing");
        assert_eq!(entries.len(), 1);
        let name = entries[0].file_name().to_string_lossy().into_owned();
        assert!(name.starts_with("crash-report-") && name.ends_with(".txt"));
        assert_eq!(entries[0].path(), path);

        let written = fs::read(&path).expect("report readable");
        assert_eq!(written, console);
    }

    #[test]
    fn test_file_error_propagates() {
        let root = tempfile::tempdir().expect("temporary directory");
        let blocker = root.path().join("blocker");
        fs::write(&blocker, "").expect("blocker file");

        let reporter = ReporterBuilder::new()
            .enable_file_output(blocker.join("reports"))
            .build();
        let mut console = Vec::new();
        let result = reporter.report_to(None, &mut console);
        assert!(matches!(result, Err(Error::CreateDirectory { .. })));
        assert!(console.is_empty());
    }

    #[test]
    fn test_console_fallback_on_file_error() {
        let root = tempfile::tempdir().expect("temporary directory");
        let blocker = root.path().join("blocker");
        fs::write(&blocker, "").expect("blocker file");

        let reporter = ReporterBuilder::new()
            .enable_file_output(blocker.join("reports"))
            .enable_console_fallback()
            .build();
        let mut console = Vec::new();
        let result = reporter.report_to(Some(&Fault::new("M")), &mut console);
        assert!(matches!(result, Err(Error::CreateDirectory { .. })));

        let text = String::from_utf8(console).expect("utf-8 report");
        assert!(text.contains("\n    Message: M\n"));
    }

    #[test]
    fn test_clones_share_options() {
        let reporter = ReporterBuilder::new().application_name("a").build();
        let clone = reporter.clone();
        assert!(core::ptr::eq(reporter.options(), clone.options()));
    }

    #[test]
    fn test_format_matches_options() {
        let reporter = ReporterBuilder::new()
            .application_name("inventory")
            .application_version("2.0.0")
            .enable_stack_trace()
            .build();
        let text = reporter.format(None);
        assert!(text.contains("\ninventory Crash Report - "));
        assert!(text.contains("\n    Application Version: 2.0.0\n"));
        assert!(text.contains("\nStack Trace:\n    N/A\n"));
    }

    #[test]
    fn test_reporter_send_sync() {
        static_assertions::assert_impl_all!(Reporter: Send, Sync, Clone);
    }
}
