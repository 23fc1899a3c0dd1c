/// Creates a [`ReporterBuilder`](crate::ReporterBuilder) pre-filled with the
/// calling crate's metadata.
///
/// The application name and version come from the `CARGO_PKG_NAME` and
/// `CARGO_PKG_VERSION` of the crate invoking the macro, and
/// [`debug_build`](crate::ReporterBuilder::debug_build) is set from that
/// crate's `debug_assertions`.
///
/// # Examples
///
/// ```rust
/// let reporter = crashreport::builder!().enable_console_output().build();
/// assert_eq!(reporter.options().application_name, env!("CARGO_PKG_NAME"));
/// ```
#[macro_export]
macro_rules! builder {
    () => {
        $crate::ReporterBuilder::new()
            .application_name(::core::env!("CARGO_PKG_NAME"))
            .application_version(::core::env!("CARGO_PKG_VERSION"))
            .debug_build(::core::cfg!(debug_assertions))
    };
}
