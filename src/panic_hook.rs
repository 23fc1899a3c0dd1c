//! Reporting panics.
//!
//! The hook installed here turns each panic into a [`Fault`] and reports it.
//! A panic whose payload is not a string is reported as an absent fault.
//! After reporting, the previously registered panic hook runs as usual.
//!
//! Errors from the sinks cannot propagate out of a panic hook, so they are
//! logged with `tracing::error!`.

use std::{
    panic::{self, PanicHookInfo},
    sync::Once,
};

use crate::{fault::Fault, reporter::Reporter};

/// Registers a panic hook that reports through the installed reporter
/// (see [`Reporter::install`]).
///
/// The hook reads the slot at the time of each panic, so it may be registered
/// before the reporter is installed. Registering more than once has no
/// further effect.
pub fn install() {
    static REGISTERED: Once = Once::new();
    REGISTERED.call_once(|| {
        chain_hook(|info| {
            if let Some(reporter) = Reporter::current() {
                report_panic(&reporter, info);
            }
        });
    });
}

/// Registers a panic hook that reports through `reporter`, independently of
/// the process-wide slot.
///
/// Each call registers another hook in front of the existing ones.
pub fn install_with(reporter: Reporter) {
    chain_hook(move |info| report_panic(&reporter, info));
}

fn chain_hook<F>(hook: F)
where
    F: Fn(&PanicHookInfo<'_>) + Send + Sync + 'static,
{
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        hook(info);
        previous(info);
    }));
}

/// Reports the panic described by `info` through `reporter`.
///
/// The stack trace is only captured when the reporter includes stack traces.
pub fn report_panic(reporter: &Reporter, info: &PanicHookInfo<'_>) {
    let fault = Fault::from_panic(info).map(|fault| {
        if reporter.options().include_stack_trace {
            fault.capture_stack_trace()
        } else {
            fault
        }
    });

    if let Err(error) = reporter.report(fault.as_ref()) {
        tracing::error!(%error, "failed to write crash report for panic");
    }
}
