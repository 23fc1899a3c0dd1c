//! The process-wide reporter slot.
//!
//! The slot is meant to be filled once at startup, before any fault can
//! occur. While it is empty, [`report`] and [`report_and_exit`] do nothing
//! besides exiting, so wiring up crash reporting stays optional.
//!
//! ```rust
//! use crashreport::{Fault, ReporterBuilder};
//!
//! ReporterBuilder::new()
//!     .application_name("inventory")
//!     .build()
//!     .install()
//!     .expect("reporter installed once");
//!
//! crashreport::report(Some(&Fault::new("index out of range"))).expect("nothing to write");
//! ```

use core::{convert::Infallible, fmt};

use spin::RwLock;

use crate::{error::Result, fault::Fault, reporter::Reporter};

static SLOT: RwLock<Option<Reporter>> = RwLock::new(None);

/// Error returned when installing a reporter while another one is already
/// installed.
///
/// Contains the reporter that was rejected.
pub struct ReporterAlreadyInstalledError(pub Reporter);

impl fmt::Debug for ReporterAlreadyInstalledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReporterAlreadyInstalledError").finish()
    }
}

impl fmt::Display for ReporterAlreadyInstalledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a crash reporter is already installed globally")
    }
}

impl core::error::Error for ReporterAlreadyInstalledError {}

impl Reporter {
    /// Installs this reporter in the process-wide slot.
    ///
    /// Fails, handing the reporter back, if a reporter is already installed.
    /// See [`replace`](Self::replace) to overwrite the slot instead.
    pub fn install(self) -> Result<(), ReporterAlreadyInstalledError> {
        let mut slot = SLOT.write();
        if slot.is_some() {
            return Err(ReporterAlreadyInstalledError(self));
        }
        *slot = Some(self);
        Ok(())
    }

    /// Installs this reporter, returning the previously installed one.
    pub fn replace(self) -> Option<Reporter> {
        SLOT.write().replace(self)
    }

    /// Returns the installed reporter, if any.
    pub fn current() -> Option<Reporter> {
        SLOT.read().clone()
    }

    /// Empties the slot, returning the reporter it held.
    pub fn take() -> Option<Reporter> {
        SLOT.write().take()
    }
}

/// Reports `fault` through the installed reporter.
///
/// Does nothing when no reporter is installed.
///
/// # Errors
///
/// See [`Reporter::report`].
pub fn report(fault: Option<&Fault>) -> Result<()> {
    let Some(reporter) = Reporter::current() else {
        return Ok(());
    };
    reporter.report(fault)?;
    Ok(())
}

/// Reports `fault` through the installed reporter, then exits with
/// `exit_code`.
///
/// Exits even when no reporter is installed. If dispatch fails the error is
/// returned and the process keeps running.
pub fn report_and_exit(fault: Option<&Fault>, exit_code: i32) -> Result<Infallible> {
    report(fault)?;
    std::process::exit(exit_code)
}
