use std::path::{Path, PathBuf};

use crate::{options::Options, panic_hook, reporter::Reporter};

/// Host of the issue tracker used by
/// [`issue_tracker_repository`](ReporterBuilder::issue_tracker_repository).
pub const DEFAULT_FORGE_HOST: &str = "github.com";

/// Builder for configuring a [`Reporter`].
///
/// Every method takes the builder by value and returns it, so calls can be
/// chained in any order. A later call overrides an earlier one setting the
/// same field.
///
/// # Examples
///
/// ```rust
/// use crashreport::ReporterBuilder;
///
/// let reporter = ReporterBuilder::new()
///     .application_name("inventory")
///     .application_version("1.4.2")
///     .issue_tracker_repository("acme", "inventory")
///     .enable_stack_trace()
///     .enable_console_output()
///     .build();
///
/// assert!(reporter.options().write_to_console);
/// ```
///
/// See also the [`builder!`](crate::builder!) macro, which fills in the
/// calling crate's name and version.
#[derive(Clone, Debug, Default)]
pub struct ReporterBuilder {
    options: Options,
}

impl ReporterBuilder {
    /// Creates a builder starting from [`Options::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder starting from `options`.
    pub fn from_options(options: Options) -> Self {
        Self { options }
    }

    /// Includes the fault's stack trace in reports.
    pub fn enable_stack_trace(mut self) -> Self {
        self.options.include_stack_trace = true;
        self
    }

    /// Sets the application name. An empty name is allowed.
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.options.application_name = name.into();
        self
    }

    /// Sets the application version.
    pub fn application_version(mut self, version: impl Into<String>) -> Self {
        self.options.application_version = version.into();
        self
    }

    /// Prints reports to stderr.
    pub fn enable_console_output(mut self) -> Self {
        self.options.write_to_console = true;
        self
    }

    /// Emits reports on the debug log. Only takes effect in development
    /// builds, see [`debug_build`](Self::debug_build).
    pub fn enable_debug_log_output(mut self) -> Self {
        self.options.write_to_debug_log = true;
        self
    }

    /// Tells the reporter whether the host is a development build.
    ///
    /// Defaults to whether this crate was compiled with debug assertions;
    /// [`builder!`](crate::builder!) uses the calling crate's setting.
    pub fn debug_build(mut self, debug_build: bool) -> Self {
        self.options.debug_build = debug_build;
        self
    }

    /// Links reports to the issue tracker of `https://github.com/<owner>/<repo>`.
    pub fn issue_tracker_repository(self, owner: &str, repo: &str) -> Self {
        self.issue_tracker_repository_on(DEFAULT_FORGE_HOST, owner, repo)
    }

    /// Links reports to the issue tracker of `https://<host>/<owner>/<repo>`.
    pub fn issue_tracker_repository_on(self, host: &str, owner: &str, repo: &str) -> Self {
        self.issue_tracker_url(format!("https://{host}/{owner}/{repo}"))
    }

    /// Links reports to the issue tracker at `url`. `/issues/new` is appended
    /// to build the link. A URL that is not absolute is ignored when
    /// formatting.
    pub fn issue_tracker_url(mut self, url: impl Into<String>) -> Self {
        self.options.issue_tracker_url = Some(url.into());
        self
    }

    /// Writes each report to its own file in `directory`, which is created if
    /// missing. An empty path means the current directory.
    pub fn enable_file_output(mut self, directory: impl AsRef<Path>) -> Self {
        self.options.write_to_file = true;
        self.options.output_directory = directory.as_ref().to_path_buf();
        self
    }

    /// Writes each report to its own file in the current directory.
    pub fn enable_file_output_in_current_dir(self) -> Self {
        self.enable_file_output(PathBuf::new())
    }

    /// Prints the report to stderr if writing the report file fails and the
    /// console sink is not enabled. The file error is still returned.
    pub fn enable_console_fallback(mut self) -> Self {
        self.options.console_fallback = true;
        self
    }

    /// Registers the process-wide panic hook, which reports every panic
    /// through the installed reporter. See [`panic_hook::install`].
    pub fn register_panic_hook(self) -> Self {
        panic_hook::install();
        self
    }

    /// The options accumulated so far.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Finishes configuration.
    pub fn build(self) -> Reporter {
        Reporter::new(self.options)
    }
}

impl From<ReporterBuilder> for Reporter {
    fn from(builder: ReporterBuilder) -> Self {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_method_sets_its_field() {
        let options = ReporterBuilder::new()
            .enable_stack_trace()
            .application_name("inventory")
            .application_version("1.4.2")
            .enable_console_output()
            .enable_debug_log_output()
            .debug_build(false)
            .enable_file_output("reports/crashes")
            .enable_console_fallback()
            .build()
            .options()
            .clone();

        assert_eq!(
            options,
            Options {
                application_name: "inventory".to_string(),
                application_version: "1.4.2".to_string(),
                issue_tracker_url: None,
                include_stack_trace: true,
                write_to_console: true,
                write_to_file: true,
                write_to_debug_log: true,
                output_directory: PathBuf::from("reports/crashes"),
                debug_build: false,
                console_fallback: true,
            }
        );
    }

    #[test]
    fn test_later_calls_override_earlier_ones() {
        let builder = ReporterBuilder::new()
            .application_name("first")
            .enable_file_output("a")
            .application_name("")
            .enable_file_output("b");
        assert_eq!(builder.options().application_name, "");
        assert_eq!(builder.options().output_directory, PathBuf::from("b"));
    }

    #[test]
    fn test_issue_tracker_repository() {
        let builder = ReporterBuilder::new().issue_tracker_repository("Owner", "Repo");
        assert_eq!(
            builder.options().issue_tracker_url.as_deref(),
            Some("https://github.com/Owner/Repo")
        );

        let builder = builder.issue_tracker_repository_on("codeberg.org", "Owner", "Repo");
        assert_eq!(
            builder.options().issue_tracker_url.as_deref(),
            Some("https://codeberg.org/Owner/Repo")
        );
    }

    #[test]
    fn test_file_output_in_current_dir() {
        let builder = ReporterBuilder::new().enable_file_output_in_current_dir();
        assert!(builder.options().write_to_file);
        assert_eq!(builder.options().output_directory, PathBuf::new());
    }

    #[test]
    fn test_from_options() {
        let options = Options {
            application_name: "preset".to_string(),
            write_to_console: true,
            ..Options::default()
        };
        let reporter: Reporter = ReporterBuilder::from_options(options.clone())
            .enable_stack_trace()
            .into();
        assert_eq!(
            reporter.options(),
            &Options {
                include_stack_trace: true,
                ..options
            }
        );
    }
}
