//! The configuration record read by a [`Reporter`](crate::Reporter).
//!
//! Options are normally populated through a
//! [`ReporterBuilder`](crate::ReporterBuilder) and are immutable once built
//! into a reporter.
//!
//! | field                 | default                      |
//! |-----------------------|------------------------------|
//! | `application_name`    | `""`                         |
//! | `application_version` | `""`                         |
//! | `issue_tracker_url`   | `None`                       |
//! | `include_stack_trace` | `false`                      |
//! | `write_to_console`    | `false`                      |
//! | `write_to_file`       | `false`                      |
//! | `write_to_debug_log`  | `false`                      |
//! | `output_directory`    | `""` (the current directory) |
//! | `debug_build`         | `cfg!(debug_assertions)`     |
//! | `console_fallback`    | `false`                      |

use std::path::PathBuf;

/// Every user-settable behavior of a crash reporter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Name shown in the second header line and in the issue title.
    pub application_name: String,
    /// Free-form version string, typically a semantic version.
    pub application_version: String,
    /// Base URL of the issue tracker, e.g. `https://github.com/owner/repo`.
    pub issue_tracker_url: Option<String>,
    /// Append the fault's stack trace to the report.
    pub include_stack_trace: bool,
    /// Print reports to stderr.
    pub write_to_console: bool,
    /// Write each report to its own file in [`output_directory`](Self::output_directory).
    pub write_to_file: bool,
    /// Emit reports as `tracing` events, see [`debug_build`](Self::debug_build).
    pub write_to_debug_log: bool,
    /// Directory receiving report files. Empty means the current directory.
    pub output_directory: PathBuf,
    /// Whether the host considers itself a development build. The debug-log
    /// sink is inactive unless this is set.
    pub debug_build: bool,
    /// Print the report to the console when the file sink fails and the
    /// console sink is not already enabled. The error is still returned.
    pub console_fallback: bool,
}

impl Options {
    /// Returns `true` when at least one sink would receive a report.
    pub fn has_active_sink(&self) -> bool {
        self.write_to_console || self.write_to_file || self.debug_log_active()
    }

    /// The debug-log sink only runs in development builds of the host.
    pub fn debug_log_active(&self) -> bool {
        self.write_to_debug_log && self.debug_build
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            application_name: String::new(),
            application_version: String::new(),
            issue_tracker_url: None,
            include_stack_trace: false,
            write_to_console: false,
            write_to_file: false,
            write_to_debug_log: false,
            output_directory: PathBuf::new(),
            debug_build: cfg!(debug_assertions),
            console_fallback: false,
        }
    }
}
