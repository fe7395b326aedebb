//! ---
//! kcs_section: "01-core-functionality"
//! kcs_subsection: "module"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Shared primitives and utilities for the console backend."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
//! Core shared primitives for the KCS workspace.
//! This crate exposes configuration loading and tracing bootstrap utilities
//! consumed by the access-control core and the administrative CLI.

pub mod config;
pub mod logging;

pub use config::{AppConfig, CatalogConfig, ConfigSource, LoadedAppConfig, LoggingConfig, MetricsConfig};
pub use logging::{init_tracing, LogFormat};
