//! Stack trace capture for crash reports.
//!
//! Frames belonging to the capture machinery, the standard library and this
//! crate are trimmed from the start of the trace so that the first frame is
//! usually the code that faulted.
//!
//! # Environment Variables
//!
//! - `RUST_BACKTRACE=full` - Disables filtering and shows full paths
//! - `CRASHREPORT_BACKTRACE` - Comma-separated options:
//!   - `full_paths` - Show full file paths in stack traces
//!
//! # Debugging symbols in release builds
//!
//! Stack traces only contain useful symbols and source locations when debug
//! information is available:
//!
//! ```toml
//! [profile.release]
//! strip = false
//! debug = "line-tables-only"
//! ```

use std::{borrow::Cow, fmt, sync::OnceLock};

use ::backtrace::BytesOrWideString;

const OWN_CRATE: &str = "crashreport";

/// A captured stack trace, ordered from most recent to oldest frame.
///
/// # Examples
///
/// ```rust
/// use crashreport::backtrace::{Backtrace, BacktraceFilter};
///
/// if let Some(trace) = Backtrace::capture(&BacktraceFilter::DEFAULT) {
///     println!("{trace}");
/// }
/// ```
#[derive(Debug)]
pub struct Backtrace {
    /// The entries in the trace.
    pub entries: Vec<BacktraceEntry>,
    /// Total number of frames that were omitted due to filtering.
    pub total_omitted_frames: usize,
    /// Render full file paths instead of shortened ones.
    pub show_full_path: bool,
}

/// A single entry in a stack trace.
#[derive(Debug)]
pub enum BacktraceEntry {
    /// A normal stack frame.
    Frame(Frame),
    /// A run of omitted frames from one crate.
    OmittedFrames {
        /// Number of omitted frames.
        count: usize,
        /// The crate the frames belonged to.
        skipped_crate: &'static str,
    },
}

/// One function call in the stack.
#[derive(Debug)]
pub struct Frame {
    /// The demangled symbol name.
    pub sym_demangled: String,
    /// File path information, if available.
    pub frame_path: Option<FramePath>,
    /// Line number in the source file, if available.
    pub lineno: Option<u32>,
}

/// File path information for a stack frame.
#[derive(Debug)]
pub struct FramePath {
    /// The raw file path from the debug information.
    pub raw_path: String,
    /// The crate name, if it could be derived from the path.
    pub crate_name: Option<Cow<'static, str>>,
    /// A known prefix split off the path, used for shortening.
    pub split_path: Option<FramePrefix>,
}

/// A file path decomposed into a known prefix and the remainder.
#[derive(Debug)]
pub struct FramePrefix {
    /// `"RUST_SRC"` for standard library paths, `"CARGO"` for registry paths.
    pub prefix_kind: &'static str,
    /// The prefix that was removed from the original path.
    pub prefix: String,
    /// The remaining path, e.g. `"indexmap-2.12.1/src/map/core/entry.rs"`.
    pub suffix: String,
}

/// Which frames to hide from a captured stack trace.
///
/// ```rust
/// use crashreport::backtrace::BacktraceFilter;
///
/// let filter = BacktraceFilter {
///     skipped_middle_crates: &["std", "tokio", "hyper"],
///     max_entry_count: 10,
///     ..BacktraceFilter::DEFAULT
/// };
/// ```
#[derive(Copy, Clone, Debug)]
pub struct BacktraceFilter {
    /// Crates whose frames are hidden at the beginning of the trace.
    pub skipped_initial_crates: &'static [&'static str],
    /// Crates whose runs of frames are collapsed in the middle of the trace.
    pub skipped_middle_crates: &'static [&'static str],
    /// Crates whose frames are hidden at the end of the trace.
    pub skipped_final_crates: &'static [&'static str],
    /// Maximum number of entries kept.
    pub max_entry_count: usize,
    /// Render full file paths.
    pub show_full_path: bool,
}

impl BacktraceFilter {
    /// Default filter settings.
    pub const DEFAULT: Self = Self {
        skipped_initial_crates: &["backtrace", OWN_CRATE, "core", "std", "alloc"],
        skipped_middle_crates: &["std", "core", "alloc", "tokio"],
        skipped_final_crates: &["std", "core", "alloc", "tokio"],
        max_entry_count: 20,
        show_full_path: false,
    };

    /// Returns the default filter adjusted by `RUST_BACKTRACE` and
    /// `CRASHREPORT_BACKTRACE`.
    pub fn from_env() -> Self {
        let env_options = EnvOptions::get();
        if env_options.rust_backtrace_full {
            BacktraceFilter {
                skipped_initial_crates: &[],
                skipped_middle_crates: &[],
                skipped_final_crates: &[],
                max_entry_count: usize::MAX,
                show_full_path: env_options.show_full_path,
            }
        } else {
            BacktraceFilter {
                show_full_path: env_options.show_full_path,
                ..BacktraceFilter::DEFAULT
            }
        }
    }
}

impl Default for BacktraceFilter {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug)]
struct EnvOptions {
    rust_backtrace_full: bool,
    show_full_path: bool,
}

impl EnvOptions {
    fn get() -> &'static Self {
        static FLAGS: OnceLock<EnvOptions> = OnceLock::new();

        FLAGS.get_or_init(|| {
            let rust_backtrace_full =
                std::env::var_os("RUST_BACKTRACE").is_some_and(|var| var == "full");
            let mut show_full_path = rust_backtrace_full;
            if let Some(var) = std::env::var_os("CRASHREPORT_BACKTRACE") {
                for v in var.to_string_lossy().split(',') {
                    if v.trim().eq_ignore_ascii_case("full_paths") {
                        show_full_path = true;
                    }
                }
            }
            EnvOptions {
                rust_backtrace_full,
                show_full_path,
            }
        })
    }
}

impl Backtrace {
    /// Captures the current stack, applying `filter`.
    ///
    /// Returns `None` when no frame with symbol information was found.
    pub fn capture(filter: &BacktraceFilter) -> Option<Self> {
        let mut initial_filtering = !filter.skipped_initial_crates.is_empty();
        let mut entries: Vec<BacktraceEntry> = Vec::new();
        let mut total_omitted_frames = 0;

        let mut delayed_omitted_frame: Option<Frame> = None;
        let mut currently_omitted_crate_name: Option<&'static str> = None;
        let mut currently_omitted_frames = 0;

        ::backtrace::trace(|frame| {
            ::backtrace::resolve_frame(frame, |symbol| {
                let (Some(sym), Some(filename_raw)) = (symbol.name(), symbol.filename_raw()) else {
                    return;
                };

                if entries.len() >= filter.max_entry_count {
                    total_omitted_frames += 1;
                    return;
                }

                let sym_demangled = format!("{sym:#}");
                let frame_path = FramePath::new(filename_raw, &sym_demangled);

                if initial_filtering {
                    if let Some(cur_crate_name) = &frame_path.crate_name
                        && filter.skipped_initial_crates.contains(&&**cur_crate_name)
                    {
                        total_omitted_frames += 1;
                        return;
                    } else {
                        initial_filtering = false;
                    }
                }

                if let Some(cur_crate_name) = &frame_path.crate_name
                    && let Some(omitted) = &currently_omitted_crate_name
                    && cur_crate_name == omitted
                {
                    delayed_omitted_frame = None;
                    currently_omitted_frames += 1;
                    total_omitted_frames += 1;
                    return;
                }

                if let Some(omitted) = currently_omitted_crate_name.take() {
                    if let Some(delayed_frame) = delayed_omitted_frame.take() {
                        entries.push(BacktraceEntry::Frame(delayed_frame));
                    } else {
                        entries.push(BacktraceEntry::OmittedFrames {
                            count: currently_omitted_frames,
                            skipped_crate: omitted,
                        });
                    }
                    currently_omitted_frames = 0;
                }

                if let Some(cur_crate_name) = &frame_path.crate_name
                    && let Some(skipped_crate) = filter
                        .skipped_middle_crates
                        .iter()
                        .find(|&crate_name| crate_name == cur_crate_name)
                {
                    currently_omitted_crate_name = Some(skipped_crate);
                    currently_omitted_frames = 1;
                    total_omitted_frames += 1;
                    delayed_omitted_frame = Some(Frame {
                        sym_demangled,
                        frame_path: Some(frame_path),
                        lineno: symbol.lineno(),
                    });
                    return;
                }

                entries.push(BacktraceEntry::Frame(Frame {
                    sym_demangled,
                    frame_path: Some(frame_path),
                    lineno: symbol.lineno(),
                }));
            });

            true
        });

        if let Some(omitted) = currently_omitted_crate_name.take() {
            if let Some(delayed_frame) = delayed_omitted_frame.take() {
                entries.push(BacktraceEntry::Frame(delayed_frame));
            } else {
                entries.push(BacktraceEntry::OmittedFrames {
                    count: currently_omitted_frames,
                    skipped_crate: omitted,
                });
            }
        }

        while let Some(last) = entries.last() {
            let skip = match last {
                BacktraceEntry::Frame(frame) => {
                    frame
                        .frame_path
                        .as_ref()
                        .and_then(|path| path.crate_name.as_deref())
                        .is_some_and(|name| filter.skipped_final_crates.contains(&name))
                        || frame.sym_demangled == "__libc_start_call_main"
                        || frame.sym_demangled == "__libc_start_main_impl"
                }
                BacktraceEntry::OmittedFrames { skipped_crate, .. } => {
                    filter.skipped_final_crates.contains(skipped_crate)
                }
            };
            if !skip {
                break;
            }
            if let Some(BacktraceEntry::OmittedFrames { count, .. }) = entries.pop() {
                total_omitted_frames += count;
            } else {
                total_omitted_frames += 1;
            }
        }

        if entries.is_empty() && total_omitted_frames == 0 {
            None
        } else {
            Some(Self {
                entries,
                total_omitted_frames,
                show_full_path: filter.show_full_path,
            })
        }
    }
}

fn get_function_name(s: &str) -> &str {
    let mut word_start = 0usize;
    let mut word_end = 0usize;
    let mut angle_nesting_level = 0u64;
    let mut curly_nesting_level = 0u64;
    let mut potential_function_arrow = false;
    let mut inside_word = false;

    for (i, c) in s.char_indices() {
        if curly_nesting_level == 0 && angle_nesting_level == 0 {
            if !inside_word && unicode_ident::is_xid_start(c) {
                word_start = i;
                inside_word = true;
            } else if inside_word && !unicode_ident::is_xid_continue(c) {
                word_end = i;
                inside_word = false;
            }
        }

        let was_potential_function_arrow = potential_function_arrow;
        potential_function_arrow = c == '-';

        if c == '<' {
            angle_nesting_level = angle_nesting_level.saturating_add(1);
        } else if c == '>' && !was_potential_function_arrow {
            angle_nesting_level = angle_nesting_level.saturating_sub(1);
        } else if c == '{' {
            curly_nesting_level = curly_nesting_level.saturating_add(1);
            if !inside_word && curly_nesting_level == 1 && angle_nesting_level == 0 {
                word_start = i;
                inside_word = true;
            }
        } else if c == '}' {
            curly_nesting_level = curly_nesting_level.saturating_sub(1);
            if inside_word && curly_nesting_level == 0 {
                word_end = i + 1;
                inside_word = false;
            }
        }
    }

    if word_start < word_end {
        &s[word_start..word_end]
    } else {
        &s[word_start..]
    }
}

impl fmt::Display for Backtrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_UNWRAPPED_SYM_LENGTH: usize = 25;
        let max_seen_length = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                BacktraceEntry::Frame(frame) => Some(get_function_name(&frame.sym_demangled).len()),
                BacktraceEntry::OmittedFrames { .. } => None,
            })
            .filter(|&len| len <= MAX_UNWRAPPED_SYM_LENGTH)
            .max()
            .unwrap_or(0);

        for entry in &self.entries {
            match entry {
                BacktraceEntry::OmittedFrames {
                    count,
                    skipped_crate,
                } => {
                    writeln!(
                        f,
                        "    ... omitted {count} frame(s) from crate '{skipped_crate}' ..."
                    )?;
                }
                BacktraceEntry::Frame(frame) => {
                    let sym = get_function_name(&frame.sym_demangled);

                    if sym.len() <= MAX_UNWRAPPED_SYM_LENGTH {
                        write!(f, "    {sym:<max_seen_length$} - ")?;
                    } else {
                        write!(f, "    {sym}\n       - ")?;
                    }

                    if let Some(path) = &frame.frame_path {
                        match &path.split_path {
                            Some(split_path) if !self.show_full_path => {
                                write!(f, "[..]/{}", split_path.suffix)?;
                            }
                            _ => write!(f, "{}", path.raw_path)?,
                        }

                        if let Some(lineno) = frame.lineno {
                            write!(f, ":{lineno}")?;
                        }
                    }
                    writeln!(f)?;
                }
            }
        }

        if self.total_omitted_frames > 0 {
            writeln!(
                f,
                "    note: {} frame(s) omitted. For a complete stack trace, set RUST_BACKTRACE=full.",
                self.total_omitted_frames
            )?;
        }

        Ok(())
    }
}

struct PathRegexes {
    std: regex::Regex,
    registry: regex::Regex,
}

impl PathRegexes {
    fn get() -> Option<&'static Self> {
        static REGEXES: OnceLock<Option<PathRegexes>> = OnceLock::new();
        REGEXES
            .get_or_init(|| {
                // /lib/rustlib/src/rust/library/{std|core|alloc}/src/...
                // /rustc/{40-char-hash}/library/{std|core|alloc}/src/...
                let std = regex::Regex::new(
                    r"(?:/lib/rustlib/src/rust|^/rustc/[0-9a-f]{40})/library/(std|core|alloc)/src/.*$",
                )
                .ok()?;
                // /.cargo/registry/src/{index}-{16-char-hash}/{crate}-{version}/src/...
                let registry = regex::Regex::new(
                    r"/\.cargo/registry/src/[^/]+-[0-9a-f]{16}/([^./]+)-[0-9]+\.[^/]*/src/.*$",
                )
                .ok()?;
                Some(PathRegexes { std, registry })
            })
            .as_ref()
    }
}

impl FramePath {
    fn new(path: BytesOrWideString<'_>, sym_demangled: &str) -> Self {
        let path_str = path.to_string();
        let raw_path = path.to_str_lossy().into_owned();

        let known_prefix = PathRegexes::get().and_then(|regexes| {
            [(&regexes.std, "RUST_SRC"), (&regexes.registry, "CARGO")]
                .into_iter()
                .find_map(|(regex, prefix_kind)| {
                    let crate_capture = regex.captures(&path_str)?.get(1)?;
                    let split = crate_capture.start();
                    Some((prefix_kind, split, crate_capture.as_str().to_string()))
                })
        });

        if let Some((prefix_kind, split, crate_name)) = known_prefix {
            Self {
                raw_path,
                crate_name: Some(Cow::Owned(crate_name)),
                split_path: Some(FramePrefix {
                    prefix_kind,
                    prefix: path_str[..split.saturating_sub(1)].to_string(),
                    suffix: path_str[split..].to_string(),
                }),
            }
        } else {
            // Local builds of this crate are not under a registry path, so
            // recognise them by symbol instead.
            let own = sym_demangled
                .strip_prefix(OWN_CRATE)
                .is_some_and(|rest| rest.starts_with("::"));
            Self {
                raw_path,
                crate_name: own.then_some(Cow::Borrowed(OWN_CRATE)),
                split_path: None,
            }
        }
    }
}
