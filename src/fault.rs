//! The fault a crash report describes.
//!
//! A [`Fault`] is built from a panic, from a [`std::error::Error`], or by
//! hand. Code that reports without any fault at hand passes `None` instead;
//! the report then shows placeholders for the missing fields.

use core::{any::Any, error::Error as StdError, fmt};
use std::panic::PanicHookInfo;

use indexmap::IndexMap;

/// A fault to be reported: its message, where it came from, auxiliary
/// key/value data and, optionally, a stack trace.
///
/// # Examples
///
/// ```rust
/// use crashreport::Fault;
///
/// let fault = Fault::new("index out of range")
///     .with_source("inventory::lookup")
///     .with_data("index", 12)
///     .with_data("len", 4);
///
/// assert_eq!(fault.message(), "index out of range");
/// assert_eq!(fault.source(), Some("inventory::lookup"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fault {
    message: String,
    source: Option<String>,
    data: IndexMap<String, String>,
    stack_trace: Option<String>,
}

impl Fault {
    /// Creates a fault with the given message and nothing else.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Creates a fault from an error value.
    ///
    /// The message is the error's `Display` output and the source is the
    /// error's type name. Each error in the `source()` chain is recorded as a
    /// `cause.N` data entry.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: StdError + ?Sized,
    {
        let mut fault = Self::new(error.to_string()).with_source(core::any::type_name::<E>());
        let mut cause = error.source();
        let mut depth = 0usize;
        while let Some(current) = cause {
            fault = fault.with_data(format!("cause.{depth}"), current);
            cause = current.source();
            depth += 1;
        }
        fault
    }

    /// Creates a fault from a panic.
    ///
    /// Returns `None` when the panic payload is neither a `&str` nor a
    /// `String`: such a panic carries no message and is reported as an absent
    /// fault. The source is the panic location, the name of the panicking
    /// thread is recorded as data.
    pub fn from_panic(info: &PanicHookInfo<'_>) -> Option<Self> {
        let message = payload_message(info.payload())?;
        let mut fault = Self::new(message);
        if let Some(location) = info.location() {
            fault = fault.with_source(location.to_string());
        }
        if let Some(name) = std::thread::current().name() {
            fault = fault.with_data("thread", name);
        }
        Some(fault)
    }

    /// Sets where the fault originated.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a key/value pair to the fault's data. Keys keep their insertion
    /// order; setting a key twice replaces the value in place.
    pub fn with_data(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.data.insert(key.into(), value.to_string());
        self
    }

    /// Attaches an already rendered stack trace.
    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    /// Captures the current stack trace, filtered according to
    /// [`BacktraceFilter::from_env`](crate::backtrace::BacktraceFilter::from_env).
    ///
    /// Leaves the fault unchanged when no frames could be resolved.
    #[cfg(feature = "backtrace")]
    pub fn capture_stack_trace(self) -> Self {
        let filter = crate::backtrace::BacktraceFilter::from_env();
        match crate::backtrace::Backtrace::capture(&filter) {
            Some(trace) => self.with_stack_trace(trace.to_string()),
            None => self,
        }
    }

    /// Without the `backtrace` feature no stack trace can be captured.
    #[cfg(not(feature = "backtrace"))]
    pub fn capture_stack_trace(self) -> Self {
        self
    }

    /// The fault's message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the fault originated, if known.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// The auxiliary data in insertion order.
    pub fn data(&self) -> &IndexMap<String, String> {
        &self.data
    }

    /// The rendered stack trace, if one was captured.
    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{} ({source})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

fn payload_message(payload: &(dyn Any + Send)) -> Option<String> {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        Some((*message).to_string())
    } else {
        payload.downcast_ref::<String>().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("could not load settings")]
    struct LoadError {
        #[source]
        source: std::io::Error,
    }

    #[test]
    fn test_from_error_records_type_and_causes() {
        let error = LoadError {
            source: std::io::Error::other("permission denied"),
        };
        let fault = Fault::from_error(&error);

        assert_eq!(fault.message(), "could not load settings");
        assert!(fault.source().is_some_and(|source| source.ends_with("LoadError")));
        assert_eq!(
            fault.data().get("cause.0").map(String::as_str),
            Some("permission denied")
        );
        assert_eq!(fault.stack_trace(), None);
    }

    #[test]
    fn test_from_dyn_error() {
        let error: Box<dyn StdError + Send + Sync> = "boxed failure".into();
        let fault = Fault::from_error(&*error);
        assert_eq!(fault.message(), "boxed failure");
        assert!(fault.data().is_empty());
    }

    #[test]
    fn test_data_keeps_insertion_order() {
        let fault = Fault::new("m")
            .with_data("zeta", 1)
            .with_data("alpha", 2)
            .with_data("zeta", 3);
        let keys: Vec<_> = fault.data().keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha"]);
        assert_eq!(fault.data()["zeta"], "3");
    }

    #[test]
    fn test_payload_message() {
        let static_payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(
            payload_message(&*static_payload).as_deref(),
            Some("static message")
        );

        let owned_payload: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(
            payload_message(&*owned_payload).as_deref(),
            Some("owned message")
        );

        let other_payload: Box<dyn Any + Send> = Box::new(17_u32);
        assert_eq!(payload_message(&*other_payload), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Fault::new("boom").to_string(), "boom");
        assert_eq!(
            Fault::new("boom").with_source("main.rs:3:5").to_string(),
            "boom (main.rs:3:5)"
        );
    }

    #[test]
    fn test_fault_send_sync() {
        static_assertions::assert_impl_all!(Fault: Send, Sync, Clone);
    }
}
