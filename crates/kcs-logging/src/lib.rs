//! ---
//! kcs_section: "03-logging"
//! kcs_subsection: "module"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Structured logging adapters and sinks."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
#![warn(missing_docs)]

//! Tracing helpers that attach tenant context (principal, namespace,
//! workspace) to every event emitted by the access-control core.

use tracing::Level;

pub mod macros;

/// Re-exported so the logging macros resolve `tracing` in any calling crate.
#[doc(hidden)]
pub use tracing;

/// Structured logging context propagated by the convenience macros.
#[derive(Debug, Default, Clone)]
pub struct LogContext<'a> {
    /// Principal whose grants are being evaluated.
    pub principal: Option<&'a str>,
    /// Namespace the evaluation is scoped to.
    pub namespace: Option<&'a str>,
    /// Workspace the evaluation is scoped to.
    pub workspace: Option<&'a str>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a principal name.
    pub fn with_principal(mut self, principal: &'a str) -> Self {
        self.principal = Some(principal);
        self
    }

    /// Attach a namespace.
    pub fn with_namespace(mut self, namespace: &'a str) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Attach a workspace.
    pub fn with_workspace(mut self, workspace: &'a str) -> Self {
        self.workspace = Some(workspace);
        self
    }
}

/// High-level outcome used when emitting lifecycle log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEventOutcome {
    /// The operation completed successfully.
    Success,
    /// The operation completed but fell back to a degraded path.
    Degraded,
    /// The operation failed or was aborted.
    Fault,
}

impl SystemEventOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            SystemEventOutcome::Success => "success",
            SystemEventOutcome::Degraded => "degraded",
            SystemEventOutcome::Fault => "fault",
        }
    }
}

/// Emit a standardized system event with an outcome.
pub fn log_system_event(
    context: Option<&LogContext>,
    event: &str,
    message: &str,
    outcome: SystemEventOutcome,
) {
    let ctx = context.cloned().unwrap_or_default();
    // `tracing::event!` needs a constant level per call site.
    match outcome {
        SystemEventOutcome::Success => tracing::event!(
            Level::INFO,
            event,
            outcome = outcome.as_str(),
            principal = ctx.principal.unwrap_or(""),
            namespace = ctx.namespace.unwrap_or(""),
            workspace = ctx.workspace.unwrap_or(""),
            message = %message
        ),
        SystemEventOutcome::Degraded => tracing::event!(
            Level::WARN,
            event,
            outcome = outcome.as_str(),
            principal = ctx.principal.unwrap_or(""),
            namespace = ctx.namespace.unwrap_or(""),
            workspace = ctx.workspace.unwrap_or(""),
            message = %message
        ),
        SystemEventOutcome::Fault => tracing::event!(
            Level::ERROR,
            event,
            outcome = outcome.as_str(),
            principal = ctx.principal.unwrap_or(""),
            namespace = ctx.namespace.unwrap_or(""),
            workspace = ctx.workspace.unwrap_or(""),
            message = %message
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macros_emit_without_panic() {
        let ctx = LogContext::new()
            .with_principal("alice")
            .with_namespace("demo");
        kcs_info!(context = ctx.clone(), "resolution complete");
        kcs_debug!("debug message");
        kcs_warn!(context = ctx, "role {} not found", "viewer");
    }

    #[test]
    fn system_event_helper_emits() {
        let ctx = LogContext::new().with_workspace("ws-a");
        log_system_event(
            Some(&ctx),
            "catalog.load",
            "catalog loaded",
            SystemEventOutcome::Success,
        );
        log_system_event(
            None,
            "catalog.load",
            "override ignored",
            SystemEventOutcome::Degraded,
        );
        log_system_event(
            None,
            "catalog.load",
            "catalog load failed",
            SystemEventOutcome::Fault,
        );
    }
}
