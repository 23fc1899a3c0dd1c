use std::{io, path::PathBuf};

/// Errors raised while dispatching a crash report.
///
/// Filesystem failures are never swallowed: a report that could not be
/// written is reported back to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The output directory could not be created.
    #[error("failed to create crash report directory {}", path.display())]
    CreateDirectory {
        /// The directory that was being created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The report file could not be written.
    #[error("failed to write crash report to {}", path.display())]
    WriteFile {
        /// The file that was being written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Writing to the console stream failed.
    #[error("failed to write crash report to the console")]
    Console(#[source] io::Error),
}

/// Shorthand for results returned by this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
