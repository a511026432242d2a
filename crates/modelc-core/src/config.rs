//! Configuration schema (modelc.toml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::diagnostic::{Category, DiagnosticCode};

/// Target SQL dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectConfig {
    /// SQL Server-like dialect (identity columns, `go` batches)
    SqlServer,

    /// Oracle-like dialect (sequences, `/` batches, 30 character identifiers)
    Oracle,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self::SqlServer
    }
}

/// Interchange format of a model file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// Object model export (`.oom`)
    Oom,

    /// XMI 1.1 export (`.xmi`, `.xml`)
    Xmi,
}

impl ModelFormat {
    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "oom" => Some(Self::Oom),
            "xmi" | "xml" => Some(Self::Xmi),
            _ => None,
        }
    }
}

/// Category overrides for specific diagnostic codes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityThreshold {
    /// Map of diagnostic code to category override
    pub overrides: HashMap<String, Category>,
}

impl SeverityThreshold {
    /// Get category for a diagnostic code, or default
    pub fn get_category(&self, code: DiagnosticCode, default: Category) -> Category {
        self.overrides
            .get(code.as_str())
            .copied()
            .unwrap_or(default)
    }

    /// Set category override for a code
    pub fn set_override(&mut self, code: DiagnosticCode, category: Category) {
        self.overrides.insert(code.as_str().to_string(), category);
    }
}

/// Allowlist rules for specific classes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllowlistRules {
    /// Skip class and property checks for these classes (glob patterns)
    #[serde(default)]
    pub skip_classes: Vec<String>,
}

impl AllowlistRules {
    /// Check if a class should be skipped
    pub fn is_class_skipped(&self, class: &str) -> bool {
        self.skip_classes.iter().any(|pattern| glob_match(pattern, class))
    }
}

/// Naming conventions of namespaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Suffix of namespaces holding persistent classes
    #[serde(default = "default_persistent_suffix")]
    pub persistent_suffix: String,

    /// Suffix of namespaces holding functional (non-persistent) classes
    #[serde(default = "default_functional_suffix")]
    pub functional_suffix: String,
}

fn default_persistent_suffix() -> String {
    "DataContract".to_string()
}

fn default_functional_suffix() -> String {
    "Contract".to_string()
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            persistent_suffix: default_persistent_suffix(),
            functional_suffix: default_functional_suffix(),
        }
    }
}

impl NamingConfig {
    /// Whether a namespace code designates persistent classes
    pub fn is_persistent_namespace(&self, code: &str) -> bool {
        code.ends_with(&self.persistent_suffix)
    }

    /// Whether a namespace code ends with one of the known suffixes
    pub fn has_known_suffix(&self, code: &str) -> bool {
        code.ends_with(&self.persistent_suffix) || code.ends_with(&self.functional_suffix)
    }
}

/// A model file to read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFileConfig {
    /// Path, relative to the project root
    pub path: PathBuf,

    /// Interchange format (inferred from the extension when absent)
    #[serde(default)]
    pub format: Option<ModelFormat>,
}

impl ModelFileConfig {
    /// Resolved format of this file
    pub fn resolved_format(&self) -> Option<ModelFormat> {
        self.format.or_else(|| ModelFormat::from_path(&self.path))
    }
}

/// Script output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory, relative to the project root
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,

    /// Table creation script
    #[serde(default = "default_create_script")]
    pub create_script: String,

    /// Unique key script
    #[serde(default = "default_unique_key_script")]
    pub unique_key_script: String,

    /// Index and foreign key script
    #[serde(default = "default_index_script")]
    pub index_script: String,

    /// Type declaration script
    #[serde(default = "default_type_script")]
    pub type_script: String,

    /// Static / reference data script
    #[serde(default = "default_init_script")]
    pub init_script: String,

    /// Reference translation script
    #[serde(default = "default_translation_script")]
    pub translation_script: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("sql")
}

fn default_create_script() -> String {
    "01_tables.sql".to_string()
}

fn default_unique_key_script() -> String {
    "02_unique_keys.sql".to_string()
}

fn default_index_script() -> String {
    "03_fk_indexes.sql".to_string()
}

fn default_type_script() -> String {
    "04_types.sql".to_string()
}

fn default_init_script() -> String {
    "05_init_data.sql".to_string()
}

fn default_translation_script() -> String {
    "06_init_translations.sql".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            create_script: default_create_script(),
            unique_key_script: default_unique_key_script(),
            index_script: default_index_script(),
            type_script: default_type_script(),
            init_script: default_init_script(),
            translation_script: default_translation_script(),
        }
    }
}

/// Default storage hints (filegroup or tablespace)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage of tables whose class declares none
    #[serde(default)]
    pub data: Option<String>,

    /// Storage of indexes
    #[serde(default)]
    pub index: Option<String>,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Application name written in script banners
    #[serde(default = "default_application")]
    pub application: String,

    /// SQL dialect
    #[serde(default)]
    pub dialect: DialectConfig,

    /// Model files, in reading order
    #[serde(default)]
    pub models: Vec<ModelFileConfig>,

    /// Directory scanned for model files when `models` is empty
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Model files whose domains form the shared domain set
    #[serde(default)]
    pub domains: Vec<ModelFileConfig>,

    /// Initializer data (JSON)
    #[serde(default)]
    pub init: Option<PathBuf>,

    /// Namespace naming conventions
    #[serde(default)]
    pub naming: NamingConfig,

    /// Script output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Default storage hints
    #[serde(default)]
    pub storage: StorageConfig,

    /// Table receiving reference list translations
    #[serde(default = "default_translation_table")]
    pub translation_table: String,

    /// Category overrides
    #[serde(default)]
    pub severity: SeverityThreshold,

    /// Allowlist rules
    #[serde(default)]
    pub allowlist: AllowlistRules,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

fn default_application() -> String {
    "Application".to_string()
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("model")
}

fn default_translation_table() -> String {
    "TRANSLATION_REFERENCE".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            application: default_application(),
            dialect: DialectConfig::default(),
            models: Vec::new(),
            model_dir: default_model_dir(),
            domains: Vec::new(),
            init: None,
            naming: NamingConfig::default(),
            output: OutputConfig::default(),
            storage: StorageConfig::default(),
            translation_table: default_translation_table(),
            severity: SeverityThreshold::default(),
            allowlist: AllowlistRules::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Resolve a path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

/// Simple glob matching (supports a single * wildcard)
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern == "*" || pattern == "**" {
        return true;
    }

    if let Some(star_pos) = pattern.find('*') {
        let prefix = &pattern[..star_pos];
        let suffix = &pattern[star_pos + 1..];

        text.len() >= prefix.len() + suffix.len()
            && text.starts_with(prefix)
            && text.ends_with(suffix)
    } else {
        pattern == text
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
