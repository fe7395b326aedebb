//! ---
//! kcs_section: "06-security-access-control"
//! kcs_subsection: "module"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Policy rules, roles, bindings, and capability projections."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
use prometheus::{IntCounter, Registry};
use std::sync::Arc;

/// Capability resolution metrics exported via Prometheus.
#[derive(Clone)]
pub struct IamMetrics {
    registry: Arc<Registry>,
    resolutions_total: IntCounter,
    stale_bindings_skipped_total: IntCounter,
    catalog_overrides_applied_total: IntCounter,
}

impl IamMetrics {
    /// Register metrics with the provided registry.
    pub fn new(registry: Arc<Registry>) -> anyhow::Result<Self> {
        let resolutions_total = IntCounter::new(
            "capability_resolutions_total",
            "Grant aggregations performed for a principal and scope",
        )?;
        let stale_bindings_skipped_total = IntCounter::new(
            "stale_bindings_skipped_total",
            "Bindings skipped because the referenced role no longer exists",
        )?;
        let catalog_overrides_applied_total = IntCounter::new(
            "catalog_overrides_applied_total",
            "Catalog lists replaced by override documents",
        )?;

        registry.register(Box::new(resolutions_total.clone()))?;
        registry.register(Box::new(stale_bindings_skipped_total.clone()))?;
        registry.register(Box::new(catalog_overrides_applied_total.clone()))?;

        Ok(Self {
            registry,
            resolutions_total,
            stale_bindings_skipped_total,
            catalog_overrides_applied_total,
        })
    }

    /// Access the underlying registry.
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Increment completed aggregations.
    pub fn inc_resolution(&self) {
        self.resolutions_total.inc();
    }

    /// Increment skipped stale bindings.
    pub fn inc_stale_binding(&self) {
        self.stale_bindings_skipped_total.inc();
    }

    /// Record catalog lists replaced at startup.
    pub fn record_catalog_overrides(&self, applied: usize) {
        self.catalog_overrides_applied_total.inc_by(applied as u64);
    }

    /// Current number of completed aggregations.
    pub fn resolutions(&self) -> u64 {
        self.resolutions_total.get()
    }

    /// Current number of skipped stale bindings.
    pub fn stale_bindings(&self) -> u64 {
        self.stale_bindings_skipped_total.get()
    }
}

impl std::fmt::Debug for IamMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IamMetrics")
            .field("resolutions", &self.resolutions_total.get())
            .field("stale_bindings", &self.stale_bindings_skipped_total.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_increment() {
        let registry = Arc::new(Registry::new());
        let metrics = IamMetrics::new(registry.clone()).unwrap();
        metrics.inc_resolution();
        metrics.inc_stale_binding();
        metrics.inc_stale_binding();
        metrics.record_catalog_overrides(2);
        assert_eq!(metrics.resolutions(), 1);
        assert_eq!(metrics.stale_bindings(), 2);
        assert_eq!(registry.gather().len(), 3);
    }
}
