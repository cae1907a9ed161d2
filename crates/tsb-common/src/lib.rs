//! Common types and utilities for the tsb declaration-surface engine.
//!
//! This crate provides foundational types used across all tsb crates:
//! - Structured diagnostics (`Diagnostic`, `DiagnosticSeverity`, `DiagnosticCollector`)
//! - Diagnostic code and message tables
//! - Engine limits and thresholds

// Structured diagnostics emitted by every pass
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCollector, DiagnosticSeverity, diagnostic_codes, diagnostic_messages,
    format_message,
};

// Centralized limits and thresholds
pub mod limits;
