//! Rendering of crash reports.
//!
//! A report looks like this:
//!
//! ```text
//! Crash Report - Monday January 02, 2006 - 03-04-05.123 PM
//! inventory Crash Report - Monday January 02, 2006 - 03-04-05.123 PM
//! If you believe this is a bug please report it to our issues page: https://github.com/acme/inventory/issues/new?title=...&body=...
//!
//! Application Data:
//!     OS Version: Linux (Debian GNU/Linux 12)
//!     Application Version: 1.4.2
//!
//! Crash Data:
//!     Message: index out of range
//!     Source: src/lookup.rs:41:9
//!     Data: {"thread":"main"}
//! Stack Trace:
//!     ...
//! ```

use core::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Local};
use url::Url;

use crate::{fault::Fault, options::Options};

/// Text used in place of fields of an absent fault.
pub const ABSENT_FAULT_TEXT: &str = "N/A";

/// Body text of the pre-filled issue.
pub const ISSUE_BODY: &str = "Please describe what you were doing when the crash occurred.";

const TIMESTAMP_PATTERN: &str = "%A %B %d, %Y - %I-%M-%S%.3f %p";
const INDENT: &str = "    ";

/// The moment a report was produced.
///
/// One timestamp is taken per report so that the header and the report file
/// name always agree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timestamp(DateTime<Local>);

impl Timestamp {
    /// The current local time.
    pub fn now() -> Self {
        Self(Local::now())
    }

    /// Wraps an existing point in time.
    pub fn from_datetime(datetime: DateTime<Local>) -> Self {
        Self(datetime)
    }

    /// A variant of the timestamp that is safe to embed in a file name:
    /// spaces become `_` and commas are dropped.
    pub fn file_name_safe(&self) -> String {
        self.to_string()
            .chars()
            .filter(|&c| c != ',')
            .map(|c| if c == ' ' { '_' } else { c })
            .collect()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_PATTERN))
    }
}

/// A crash report ready to be displayed.
///
/// ```rust
/// use crashreport::{
///     Fault, Options,
///     format::{CrashReport, Timestamp},
/// };
///
/// let options = Options {
///     application_name: "inventory".to_string(),
///     ..Options::default()
/// };
/// let fault = Fault::new("index out of range");
/// let text = CrashReport::new(&options, Some(&fault), Timestamp::now()).to_string();
/// assert!(text.contains("    Message: index out of range\n"));
/// ```
#[derive(Copy, Clone, Debug)]
pub struct CrashReport<'a> {
    options: &'a Options,
    fault: Option<&'a Fault>,
    timestamp: Timestamp,
}

impl<'a> CrashReport<'a> {
    /// Creates a report for `fault`, or for an absent fault when `None`.
    pub fn new(options: &'a Options, fault: Option<&'a Fault>, timestamp: Timestamp) -> Self {
        Self {
            options,
            fault,
            timestamp,
        }
    }

    /// The timestamp shown in the header.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The second header line, which also serves as the issue title.
    pub fn title(&self) -> String {
        format!(
            "{} Crash Report - {}",
            self.options.application_name, self.timestamp
        )
        .trim()
        .to_string()
    }

    /// The issue creation link, if an absolute issue tracker URL is
    /// configured.
    pub fn issue_link(&self) -> Option<String> {
        let base = self.options.issue_tracker_url.as_deref()?;
        issue_link(base, &self.title())
    }

    fn data_json(&self) -> String {
        let Some(fault) = self.fault else {
            return "null".to_string();
        };
        serde_json::to_string(fault.data()).unwrap_or_else(|error| {
            tracing::debug!(%error, "failed to serialize fault data");
            "{}".to_string()
        })
    }
}

impl fmt::Display for CrashReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Crash Report - {}", self.timestamp)?;
        writeln!(f, "{}", self.title())?;
        if let Some(link) = self.issue_link() {
            writeln!(
                f,
                "If you believe this is a bug please report it to our issues page: {link}"
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Application Data:")?;
        writeln!(f, "{INDENT}OS Version: {}", os_version())?;
        writeln!(
            f,
            "{INDENT}Application Version: {}",
            self.options.application_version
        )?;

        let message = self.fault.map_or(ABSENT_FAULT_TEXT, Fault::message);
        let source = self
            .fault
            .and_then(Fault::source)
            .unwrap_or(ABSENT_FAULT_TEXT);
        writeln!(f)?;
        writeln!(f, "Crash Data:")?;
        writeln!(f, "{INDENT}Message: {message}")?;
        writeln!(f, "{INDENT}Source: {source}")?;
        writeln!(f, "{INDENT}Data: {}", self.data_json())?;

        if self.options.include_stack_trace {
            writeln!(f, "Stack Trace:")?;
            match self.fault.and_then(Fault::stack_trace) {
                Some(trace) if trace.ends_with('\n') => f.write_str(trace)?,
                Some(trace) => writeln!(f, "{trace}")?,
                None => writeln!(f, "{INDENT}{ABSENT_FAULT_TEXT}")?,
            }
        }

        Ok(())
    }
}

/// Builds the link that opens a new, pre-filled issue.
///
/// Returns `None` when `base` is not an absolute URL.
///
/// ```rust
/// use crashreport::format::issue_link;
///
/// let link = issue_link("https://github.com/acme/inventory/", "inventory crashed").unwrap();
/// assert!(link.starts_with("https://github.com/acme/inventory/issues/new?title=inventory"));
/// assert!(!link.contains(' '));
/// assert_eq!(issue_link("not a url", "title"), None);
/// ```
pub fn issue_link(base: &str, title: &str) -> Option<String> {
    let mut url = match Url::parse(base) {
        Ok(url) if !url.cannot_be_a_base() => url,
        Ok(_) => {
            tracing::debug!(base, "issue tracker URL cannot be a base, skipping issue link");
            return None;
        }
        Err(error) => {
            tracing::debug!(base, %error, "invalid issue tracker URL, skipping issue link");
            return None;
        }
    };

    let path = format!("{}/issues/new", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair("title", title)
        .append_pair("body", ISSUE_BODY);

    Some(url.to_string().replace(' ', "%20"))
}

/// A description of the host operating system, e.g. `Linux (Ubuntu 24.04)`.
pub fn os_version() -> &'static str {
    static OS_VERSION: OnceLock<String> = OnceLock::new();
    OS_VERSION.get_or_init(|| {
        sysinfo::System::long_os_version().unwrap_or_else(|| {
            format!("{} {}", std::env::consts::OS, std::env::consts::ARCH)
        })
    })
}
