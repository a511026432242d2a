//! modelc core
//!
//! Diagnostics, report and configuration shared by every stage of the compiler.
//! Never rename diagnostic codes - they are part of the public API.

pub mod config;
pub mod diagnostic;
pub mod report;

pub use config::{
    AllowlistRules, Config, ConfigError, DialectConfig, ModelFileConfig, ModelFormat, NamingConfig,
    OutputConfig, SeverityThreshold, StorageConfig,
};
pub use diagnostic::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Location};
pub use report::{Report, ReportSummary, ReportVersion};
