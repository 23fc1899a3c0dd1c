#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Human-readable crash reports for Rust applications.
//!
//! When an application faults, `crashreport` formats a plain-text report
//! (timestamp, application metadata, the fault's message, source and data,
//! optionally a stack trace) and writes it to the configured sinks: the
//! console, a report file, and the debug log.
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use crashreport::{Fault, ReporterBuilder};
//!
//! fn main() {
//!     ReporterBuilder::new()
//!         .application_name("inventory")
//!         .application_version(env!("CARGO_PKG_VERSION"))
//!         .issue_tracker_repository("acme", "inventory")
//!         .enable_stack_trace()
//!         .enable_console_output()
//!         .enable_file_output("crash-reports")
//!         .register_panic_hook()
//!         .build()
//!         .install()
//!         .expect("crash reporter installed once");
//!
//!     if let Err(error) = run() {
//!         let fault = Fault::from_error(&*error).capture_stack_trace();
//!         crashreport::report_and_exit(Some(&fault), 2).expect("crash report written");
//!     }
//! }
//!
//! fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     Ok(())
//! }
//! ```
//!
//! ## Reporters and the global slot
//!
//! A [`Reporter`] is an immutable handle built by a [`ReporterBuilder`]. It
//! can be passed around explicitly, or installed once in the process-wide
//! slot with [`Reporter::install`]. The free functions [`report`] and
//! [`report_and_exit`] and the panic hook registered by
//! [`ReporterBuilder::register_panic_hook`] read the slot, and do nothing
//! while it is empty.
//!
//! ## Sinks
//!
//! - **Console**: the report is printed to stderr, in red when stderr is a
//!   terminal and `NO_COLOR` is unset.
//! - **File**: the report is written to
//!   `<output directory>/crash-report-<timestamp>.txt`. Two reports within
//!   the same millisecond share a file name, and the later one wins.
//! - **Debug log**: the report is emitted as a `DEBUG` [`tracing`] event with
//!   target `crashreport`, but only when the host is a development build.
//!
//! ## Errors
//!
//! Failing to write a report file is returned to the caller rather than
//! swallowed, so a missing report never goes unnoticed. Enable
//! [`ReporterBuilder::enable_console_fallback`] to also print the report to
//! stderr when that happens.
//!
//! ## Features
//!
//! - `backtrace` (default): stack trace capture through
//!   [`Fault::capture_stack_trace`].

mod builder;
mod error;
mod fault;
pub mod format;
mod options;
pub mod panic_hook;
mod reporter;
pub mod sink;
mod slot;

#[cfg(feature = "backtrace")]
#[cfg_attr(docsrs, doc(cfg(feature = "backtrace")))]
pub mod backtrace;

#[macro_use]
mod macros;

pub use self::{
    builder::{DEFAULT_FORGE_HOST, ReporterBuilder},
    error::{Error, Result},
    fault::Fault,
    options::Options,
    reporter::{DEFAULT_EXIT_CODE, Reporter},
    slot::{ReporterAlreadyInstalledError, report, report_and_exit},
};
