//! ---
//! kcs_section: "03-logging"
//! kcs_subsection: "module"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Structured logging adapters and sinks."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
/// Shared body of the level-specific macros. Not part of the public API.
#[doc(hidden)]
#[macro_export]
macro_rules! __kcs_event {
    ($level:expr, $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        $crate::tracing::event!(
            $level,
            principal = ctx.principal.unwrap_or(""),
            namespace = ctx.namespace.unwrap_or(""),
            workspace = ctx.workspace.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit an informational event tagged with principal, namespace and workspace.
///
/// ```ignore
/// kcs_info!(context = ctx, "resolved {} categories", n);
/// kcs_info!("catalog ready");
/// ```
#[macro_export]
macro_rules! kcs_info {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__kcs_event!($crate::tracing::Level::INFO, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__kcs_event!($crate::tracing::Level::INFO, $crate::LogContext::default(), $($arg)+)
    };
}

/// Debug-level counterpart of [`kcs_info!`].
#[macro_export]
macro_rules! kcs_debug {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__kcs_event!($crate::tracing::Level::DEBUG, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__kcs_event!($crate::tracing::Level::DEBUG, $crate::LogContext::default(), $($arg)+)
    };
}

/// Warning-level counterpart of [`kcs_info!`]; used for tolerated faults such
/// as bindings that reference deleted roles.
#[macro_export]
macro_rules! kcs_warn {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__kcs_event!($crate::tracing::Level::WARN, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__kcs_event!($crate::tracing::Level::WARN, $crate::LogContext::default(), $($arg)+)
    };
}
