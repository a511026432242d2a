//! Diagnostic codes, categories and the diagnostics sink
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

use crate::config::SeverityThreshold;

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Front end
    /// Association multiplicity outside {0..1, 1..1, 0..N, 1..N}
    ReadInvalidMultiplicity,

    /// Many-to-many association with no implementable foreign key
    ReadUnimplementableAssociation,

    /// A persistent class would reference a non-persistent class
    ReadPersistentToTransient,

    /// Association code does not match the code generated from its name
    ReadAssociationCodeMismatch,

    /// Domain code declared more than once in the model set
    ReadDuplicateDomain,

    /// Foreign key target class has no primary key
    ReadTargetWithoutPrimaryKey,

    /// Class stereotype is not one of Reference / Static
    ReadUnknownStereotype,

    // Model structure
    /// Name does not follow the Pascal case convention
    NameCasing,

    /// Comment is missing
    MissingComment,

    /// Label is missing
    MissingLabel,

    /// Namespace code does not end with a persistent or functional suffix
    NamespaceSuffix,

    /// Namespace declared twice in the model set
    NamespaceDuplicate,

    /// Class persistence does not agree with the namespace suffix
    NamespacePersistenceMismatch,

    /// Class name declared twice in the model set
    ClassDuplicate,

    /// Persistent class without trigram
    ClassMissingTrigram,

    /// Trigram is not three upper-case letters
    ClassInvalidTrigram,

    /// Two persistent classes share a trigram
    ClassDuplicateTrigram,

    /// Persistent class without primary key
    ClassMissingPrimaryKey,

    /// Persistent class with a parent class
    ClassPersistentWithParent,

    /// Parent class chain loops back on itself
    ClassInheritanceCycle,

    /// Reference / Static class that is not persistent
    ClassStereotypeNotPersistent,

    /// Historized / audited / export flag on a non-persistent class
    ClassFlagWithoutPersistence,

    /// Table name does not follow the dialect casing convention
    ClassTableCasing,

    /// Two properties of one class share a name
    ClassDuplicateProperty,

    /// A single property flagged as part of a composite unique key
    ClassCompositeUniqueTooSmall,

    /// More than one property flagged as default ordering
    ClassMultipleOrderProperties,

    /// Property redeclares a name defined by an ancestor
    PropertyRedeclared,

    /// Primitive property without domain, or with an unknown domain
    PropertyMissingDomain,

    /// Property type differs from its domain type
    PropertyDomainMismatch,

    /// Persistent property on a non-persistent class
    PropertyPersistenceMismatch,

    /// Primary key property that is not persistent or not required
    PropertyInvalidPrimaryKey,

    /// Column name does not follow the dialect casing convention
    PropertyColumnCasing,

    /// Column name does not start with the class trigram
    PropertyColumnPrefix,

    /// Reference to the owning class without a role
    PropertySelfReferenceRole,

    /// Self composition without collection semantics
    PropertySelfComposition,

    /// Reference already held by an ancestor
    PropertyInheritedReference,

    // Domains
    /// Domain code does not follow the DO_ convention
    DomainCodeCasing,

    /// Domain without data type
    DomainMissingDataType,

    /// Domain without persistent type
    DomainMissingPersistentType,

    /// Precision declared without length
    DomainPrecisionWithoutLength,

    // Initializers
    /// Initializer targets an unknown class
    InitUnknownClass,

    /// Initializer kind does not match the class stereotype
    InitStereotypeMismatch,

    /// Initializer item misses a persistent property value
    InitMissingValue,

    /// Initializer item defines a property the class does not have
    InitUnknownProperty,

    /// Static list references itself directly or transitively
    InitStaticCycle,

    // Generation
    /// Generated identifier exceeds the dialect limit
    IdentifierTooLong,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadInvalidMultiplicity => "READ_INVALID_MULTIPLICITY",
            Self::ReadUnimplementableAssociation => "READ_UNIMPLEMENTABLE_ASSOCIATION",
            Self::ReadPersistentToTransient => "READ_PERSISTENT_TO_TRANSIENT",
            Self::ReadAssociationCodeMismatch => "READ_ASSOCIATION_CODE_MISMATCH",
            Self::ReadDuplicateDomain => "READ_DUPLICATE_DOMAIN",
            Self::ReadTargetWithoutPrimaryKey => "READ_TARGET_WITHOUT_PRIMARY_KEY",
            Self::ReadUnknownStereotype => "READ_UNKNOWN_STEREOTYPE",
            Self::NameCasing => "NAME_CASING",
            Self::MissingComment => "MISSING_COMMENT",
            Self::MissingLabel => "MISSING_LABEL",
            Self::NamespaceSuffix => "NAMESPACE_SUFFIX",
            Self::NamespaceDuplicate => "NAMESPACE_DUPLICATE",
            Self::NamespacePersistenceMismatch => "NAMESPACE_PERSISTENCE_MISMATCH",
            Self::ClassDuplicate => "CLASS_DUPLICATE",
            Self::ClassMissingTrigram => "CLASS_MISSING_TRIGRAM",
            Self::ClassInvalidTrigram => "CLASS_INVALID_TRIGRAM",
            Self::ClassDuplicateTrigram => "CLASS_DUPLICATE_TRIGRAM",
            Self::ClassMissingPrimaryKey => "CLASS_MISSING_PRIMARY_KEY",
            Self::ClassPersistentWithParent => "CLASS_PERSISTENT_WITH_PARENT",
            Self::ClassInheritanceCycle => "CLASS_INHERITANCE_CYCLE",
            Self::ClassStereotypeNotPersistent => "CLASS_STEREOTYPE_NOT_PERSISTENT",
            Self::ClassFlagWithoutPersistence => "CLASS_FLAG_WITHOUT_PERSISTENCE",
            Self::ClassTableCasing => "CLASS_TABLE_CASING",
            Self::ClassDuplicateProperty => "CLASS_DUPLICATE_PROPERTY",
            Self::ClassCompositeUniqueTooSmall => "CLASS_COMPOSITE_UNIQUE_TOO_SMALL",
            Self::ClassMultipleOrderProperties => "CLASS_MULTIPLE_ORDER_PROPERTIES",
            Self::PropertyRedeclared => "PROPERTY_REDECLARED",
            Self::PropertyMissingDomain => "PROPERTY_MISSING_DOMAIN",
            Self::PropertyDomainMismatch => "PROPERTY_DOMAIN_MISMATCH",
            Self::PropertyPersistenceMismatch => "PROPERTY_PERSISTENCE_MISMATCH",
            Self::PropertyInvalidPrimaryKey => "PROPERTY_INVALID_PRIMARY_KEY",
            Self::PropertyColumnCasing => "PROPERTY_COLUMN_CASING",
            Self::PropertyColumnPrefix => "PROPERTY_COLUMN_PREFIX",
            Self::PropertySelfReferenceRole => "PROPERTY_SELF_REFERENCE_ROLE",
            Self::PropertySelfComposition => "PROPERTY_SELF_COMPOSITION",
            Self::PropertyInheritedReference => "PROPERTY_INHERITED_REFERENCE",
            Self::DomainCodeCasing => "DOMAIN_CODE_CASING",
            Self::DomainMissingDataType => "DOMAIN_MISSING_DATA_TYPE",
            Self::DomainMissingPersistentType => "DOMAIN_MISSING_PERSISTENT_TYPE",
            Self::DomainPrecisionWithoutLength => "DOMAIN_PRECISION_WITHOUT_LENGTH",
            Self::InitUnknownClass => "INIT_UNKNOWN_CLASS",
            Self::InitStereotypeMismatch => "INIT_STEREOTYPE_MISMATCH",
            Self::InitMissingValue => "INIT_MISSING_VALUE",
            Self::InitUnknownProperty => "INIT_UNKNOWN_PROPERTY",
            Self::InitStaticCycle => "INIT_STATIC_CYCLE",
            Self::IdentifierTooLong => "IDENTIFIER_TOO_LONG",
        }
    }

    /// Category a diagnostic with this code carries unless overridden
    pub fn default_category(&self) -> Category {
        match self {
            Self::MissingComment | Self::MissingLabel => Category::Doc,

            Self::ReadAssociationCodeMismatch
            | Self::NameCasing
            | Self::NamespaceSuffix
            | Self::ClassInvalidTrigram
            | Self::ClassTableCasing
            | Self::ClassMultipleOrderProperties
            | Self::PropertyColumnCasing
            | Self::PropertyColumnPrefix
            | Self::DomainCodeCasing => Category::CodeStyle,

            Self::ClassInheritanceCycle | Self::PropertySelfComposition => Category::Fatal,

            _ => Category::Bug,
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic category, in ascending severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Missing or malformed documentation
    Doc,

    /// Naming or casing convention violation
    CodeStyle,

    /// Data-integrity or structural inconsistency
    Bug,

    /// The emitted artifact would be meaningless
    Fatal,
}

impl Category {
    /// Whether generated artifacts should not be used when this category is present
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Bug | Self::Fatal)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Doc => write!(f, "doc"),
            Self::CodeStyle => write!(f, "code_style"),
            Self::Bug => write!(f, "bug"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// Source location of a diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Originating model file
    pub file: String,
}

impl Location {
    /// Create a new location with just a file path
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity category
    pub category: Category,

    /// Human-readable message
    pub message: String,

    /// Originating file (best-effort)
    pub location: Option<Location>,

    /// Expected value (for comparison diagnostics)
    pub expected: Option<String>,

    /// Actual value (for comparison diagnostics)
    pub actual: Option<String>,

    /// Other model elements involved (classes sharing a trigram, cycle members...)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
}

impl Diagnostic {
    /// Create a new diagnostic carrying the code's default category
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            category: code.default_category(),
            message: message.into(),
            location: None,
            expected: None,
            actual: None,
            related: Vec::new(),
        }
    }

    /// Override the category
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the originating file
    pub fn in_file(self, file: impl Into<String>) -> Self {
        self.with_location(Location::new(file))
    }

    /// Set expected/actual values
    pub fn with_comparison(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    /// Set related model elements
    pub fn with_related(mut self, related: Vec<String>) -> Self {
        self.related = related;
        self
    }

    /// Whether this diagnostic is fatal
    pub fn is_fatal(&self) -> bool {
        self.category == Category::Fatal
    }

    /// Originating file, if known
    pub fn file(&self) -> Option<&str> {
        self.location.as_ref().map(|l| l.file.as_str())
    }
}

/// Append-only collection of diagnostics for one compiler invocation
///
/// The sink is threaded by `&mut` through readers, checkers and generators.
/// It is not meant to be shared between threads.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    threshold: SeverityThreshold,
}

impl DiagnosticSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink applying category overrides at insertion
    pub fn with_threshold(threshold: SeverityThreshold) -> Self {
        Self {
            diagnostics: Vec::new(),
            threshold,
        }
    }

    /// Append a diagnostic
    pub fn push(&mut self, mut diagnostic: Diagnostic) {
        diagnostic.category = self.threshold.get_category(diagnostic.code, diagnostic.category);
        self.diagnostics.push(diagnostic);
    }

    /// Append a diagnostic built from a code, a file and a message
    pub fn report(&mut self, code: DiagnosticCode, file: &str, message: impl Into<String>) {
        self.push(Diagnostic::new(code, message).in_file(file));
    }

    /// All diagnostics in insertion order
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Iterate over the diagnostics
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    /// Number of diagnostics
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether the sink is empty
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Count diagnostics of a category
    pub fn count(&self, category: Category) -> usize {
        self.diagnostics.iter().filter(|d| d.category == category).count()
    }

    /// Count diagnostics with a code
    pub fn count_code(&self, code: DiagnosticCode) -> usize {
        self.diagnostics.iter().filter(|d| d.code == code).count()
    }

    /// Whether any Bug or Fatal diagnostic was recorded
    pub fn has_blocking(&self) -> bool {
        self.diagnostics.iter().any(|d| d.category.is_blocking())
    }

    /// Consume the sink
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
