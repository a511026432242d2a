//! Naming rules
//!
//! Patterns are compiled once per run and shared by every checker.

use modelc_core::DialectConfig;
use regex::Regex;

/// Compiled naming patterns
#[derive(Debug, Clone)]
pub struct NamingRules {
    pascal: Regex,
    dotted_pascal: Regex,
    domain_code: Regex,
    trigram: Regex,
    identifier: Regex,
}

impl NamingRules {
    /// Compile the patterns for a dialect
    pub fn new(dialect: DialectConfig) -> Self {
        // Oracle folds unquoted identifiers to upper case
        let identifier = match dialect {
            DialectConfig::Oracle => r"^[A-Z][A-Z0-9_]*$",
            DialectConfig::SqlServer => r"^[A-Za-z][A-Za-z0-9_]*$",
        };

        Self {
            pascal: Regex::new(r"^[A-Z][a-zA-Z0-9]*$").expect("valid Pascal case pattern"),
            dotted_pascal: Regex::new(r"^[A-Z][a-zA-Z0-9]*(\.[A-Z][a-zA-Z0-9]*)*$")
                .expect("valid namespace pattern"),
            domain_code: Regex::new(r"^DO_[A-Z0-9_]+$").expect("valid domain pattern"),
            trigram: Regex::new(r"^[A-Z]{3}$").expect("valid trigram pattern"),
            identifier: Regex::new(identifier).expect("valid identifier pattern"),
        }
    }

    /// `ProductLine`
    pub fn is_pascal(&self, name: &str) -> bool {
        self.pascal.is_match(name)
    }

    /// `Shop.Sales.SalesDataContract`
    pub fn is_dotted_pascal(&self, name: &str) -> bool {
        self.dotted_pascal.is_match(name)
    }

    /// `DO_CODE`
    pub fn is_domain_code(&self, code: &str) -> bool {
        self.domain_code.is_match(code)
    }

    /// `PRD`
    pub fn is_trigram(&self, trigram: &str) -> bool {
        self.trigram.is_match(trigram)
    }

    /// Table or column name in the casing the dialect expects
    pub fn is_sql_identifier(&self, name: &str) -> bool {
        self.identifier.is_match(name)
    }
}
