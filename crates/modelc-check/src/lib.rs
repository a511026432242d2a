//! modelc check - Validator chain
//!
//! This crate validates a semantic graph against the modeling conventions:
//! - Root, domain, namespace, class and property checkers, run depth-first
//! - Static and reference list initializer checks
//!
//! Every violation is a diagnostic; checkers never fail.

pub mod checker;
pub mod class;
pub mod context;
pub mod domain;
pub mod init;
pub mod namespace;
pub mod options;
pub mod property;
pub mod registry;
pub mod rules;

pub use checker::{CheckStats, ModelChecker};
pub use init::InitListChecker;
pub use options::CheckOptions;
pub use registry::{Registration, Registry};
pub use rules::NamingRules;
