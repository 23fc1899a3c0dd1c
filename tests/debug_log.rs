//! The debug-log sink emits reports as `tracing` events, only in
//! development builds.

use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

use crashreport::{Fault, ReporterBuilder};

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn contents(&self) -> String {
        let buffer = self.0.lock().expect("log buffer");
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn with_captured_log(f: impl FnOnce()) -> String {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    log.contents()
}

#[test]
fn test_debug_log_in_development_build() {
    let reporter = ReporterBuilder::new()
        .application_name("logged")
        .enable_debug_log_output()
        .debug_build(true)
        .build();

    let mut console = Vec::new();
    let log = with_captured_log(|| {
        reporter
            .report_to(Some(&Fault::new("written to the log")), &mut console)
            .expect("debug log never fails");
    });

    assert!(log.contains("crashreport"));
    assert!(log.contains("logged Crash Report - "));
    assert!(log.contains("Message: written to the log"));
    assert!(console.is_empty());
}

#[test]
fn test_debug_log_inactive_in_release_build() {
    let reporter = ReporterBuilder::new()
        .enable_debug_log_output()
        .debug_build(false)
        .build();

    let mut console = Vec::new();
    let log = with_captured_log(|| {
        reporter
            .report_to(Some(&Fault::new("not logged")), &mut console)
            .expect("nothing to write");
    });

    assert!(!log.contains("not logged"));
    assert!(console.is_empty());
}
