//! Destinations a formatted report is written to.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::OnceLock,
};

use crate::{
    error::{Error, Result},
    format::Timestamp,
};

/// Color used for reports printed to the console.
const CONSOLE_STYLE: &str = "\x1b[31m";
const RESET_STYLE: &str = "\x1b[0m";

/// Applies a terminal style on creation and resets it when dropped, even if
/// the write in between fails.
struct StyleGuard<'w, W: Write> {
    writer: &'w mut W,
    enabled: bool,
}

impl<'w, W: Write> StyleGuard<'w, W> {
    fn new(writer: &'w mut W, style: &str, enabled: bool) -> io::Result<Self> {
        if enabled {
            writer.write_all(style.as_bytes())?;
        }
        Ok(Self { writer, enabled })
    }
}

impl<W: Write> Write for StyleGuard<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<W: Write> Drop for StyleGuard<'_, W> {
    fn drop(&mut self) {
        if self.enabled {
            let _ = self.writer.write_all(RESET_STYLE.as_bytes());
        }
        let _ = self.writer.flush();
    }
}

/// Whether console output may be styled. Honors `NO_COLOR`.
pub(crate) fn console_style_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var_os("NO_COLOR").is_none_or(|value| value.is_empty()))
}

/// Writes `text` to `console`, highlighted when `styled` is set.
pub(crate) fn write_console<W: Write>(console: &mut W, text: &str, styled: bool) -> Result<()> {
    let mut guard = StyleGuard::new(console, CONSOLE_STYLE, styled).map_err(Error::Console)?;
    guard.write_all(text.as_bytes()).map_err(Error::Console)?;
    guard.flush().map_err(Error::Console)
}

/// The file name a report taken at `timestamp` is written to.
pub fn report_file_name(timestamp: &Timestamp) -> String {
    format!("crash-report-{}.txt", timestamp.file_name_safe())
}

/// Writes `text` to a new report file in `directory`, creating the directory
/// if needed. An existing file with the same name is overwritten.
pub(crate) fn write_file(directory: &Path, timestamp: &Timestamp, text: &str) -> Result<PathBuf> {
    if !directory.as_os_str().is_empty() {
        fs::create_dir_all(directory).map_err(|source| Error::CreateDirectory {
            path: directory.to_path_buf(),
            source,
        })?;
    }

    let path = directory.join(report_file_name(timestamp));
    fs::write(&path, text).map_err(|source| Error::WriteFile {
        path: path.clone(),
        source,
    })?;

    tracing::debug!(path = %path.display(), "crash report written");
    Ok(path)
}

/// Emits `text` on the development-time diagnostic channel.
pub(crate) fn write_debug_log(text: &str) {
    tracing::debug!(target: "crashreport", "{text}");
}
