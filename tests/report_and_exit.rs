//! `report_and_exit` must dispatch exactly once and then exit with the
//! requested code. The test re-runs its own binary as the crashing child.

use std::{fs, process::Command};

use crashreport::ReporterBuilder;

const CHILD_DIRECTORY_VAR: &str = "CRASHREPORT_TEST_EXIT_DIRECTORY";

#[test]
fn test_report_and_exit_uses_exit_code() {
    if let Some(directory) = std::env::var_os(CHILD_DIRECTORY_VAR) {
        let reporter = ReporterBuilder::new()
            .application_name("exiting")
            .enable_file_output(directory)
            .build();
        if let Err(error) = reporter.report_and_exit(None, 89) {
            eprintln!("{error}");
        }
        std::process::exit(3);
    }

    let root = tempfile::tempdir().expect("temporary directory");
    let directory = root.path().join("reports");
    let status = Command::new(std::env::current_exe().expect("test binary path"))
        .args(["--exact", "test_report_and_exit_uses_exit_code", "--nocapture"])
        .env(CHILD_DIRECTORY_VAR, &directory)
        .status()
        .expect("child process ran");
    assert_eq!(status.code(), Some(89));

    let entries: Vec<_> = fs::read_dir(&directory)
        .expect("report directory created")
        .collect::<Result<_, _>>()
        .expect("directory listing");
    assert_eq!(entries.len(), 1);
    let text = fs::read_to_string(entries[0].path()).expect("report readable");
    assert!(text.contains("\nexiting Crash Report - "));
    assert!(text.contains("\n    Data: null\n"));
}

#[test]
fn test_global_report_and_exit_without_reporter_exits() {
    if std::env::var_os("CRASHREPORT_TEST_EXIT_WITHOUT_REPORTER").is_some() {
        let _ = crashreport::report_and_exit(None, crashreport::DEFAULT_EXIT_CODE);
        std::process::exit(3);
    }

    let status = Command::new(std::env::current_exe().expect("test binary path"))
        .args([
            "--exact",
            "test_global_report_and_exit_without_reporter_exits",
            "--nocapture",
        ])
        .env("CRASHREPORT_TEST_EXIT_WITHOUT_REPORTER", "1")
        .status()
        .expect("child process ran");
    assert_eq!(status.code(), Some(1));
}
