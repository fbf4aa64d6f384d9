//! Structured logging infrastructure for Triage
//!
//! This crate wires `tracing-subscriber` up from [`LoggingConfig`] and renders
//! run milestones through [`TracingObserver`].

pub mod init;
pub mod observer;

// Re-export main types for convenience
pub use init::{init_logging, init_simple_tracing, LogGuard};
pub use observer::TracingObserver;
pub use triage_config::LoggingConfig;
