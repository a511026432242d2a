//! Checker settings derived from the project configuration

use modelc_core::{AllowlistRules, Config, DialectConfig, NamingConfig};

/// Settings shared by every checker of one run
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Namespace suffix conventions
    pub naming: NamingConfig,

    /// Target dialect, drives table and column casing rules
    pub dialect: DialectConfig,

    /// Classes the class and property checkers skip
    pub allowlist: AllowlistRules,
}

impl CheckOptions {
    /// Build options from a configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            naming: config.naming.clone(),
            dialect: config.dialect,
            allowlist: config.allowlist.clone(),
        }
    }

    /// Set the target dialect
    pub fn with_dialect(mut self, dialect: DialectConfig) -> Self {
        self.dialect = dialect;
        self
    }
}
