//! Model reader
//!
//! Parses a set of model files into one [`Graph`]. Each file is first
//! extracted into a [`RawModel`] by its dialect adapter, then symbols are
//! resolved across the whole set in a fixed order:
//!
//! 1. shared domains, then the domains of every file
//! 2. namespaces, classes and properties of every file
//! 3. generalizations
//! 4. associations, turned into properties
//!
//! Modeling mistakes are pushed to the [`DiagnosticSink`]. Only conditions
//! that leave the graph unusable (unreadable XML, missing model element,
//! dangling connector endpoints) are returned as [`ReadError`].

use crate::association::{self, EndInfo, Multiplicity, Rejection, Resolution, Side};
use crate::dialect::{dialect_for, extract};
use crate::graph::{
    ClassId, DataContract, DataMember, Domain, Graph, ModelClass, ModelProperty, ModelRoot,
    Namespace, NamespaceId, PropertyKind, Stereotype,
};
use crate::naming;
use crate::raw::{DomainRef, RawAssociation, RawClass, RawModel, RawProperty};
use modelc_core::{Config, Diagnostic, DiagnosticCode, DiagnosticSink, ModelFileConfig, ModelFormat, NamingConfig};
use roxmltree::Document;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info};

/// Model reading errors
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("Failed to read model file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid XML in {path}: {message}")]
    Xml { path: String, message: String },

    #[error("No model element found in {0}")]
    MissingModel(String),

    #[error("Missing {field} on {element} in {path}")]
    MissingAttribute {
        path: String,
        element: String,
        field: String,
    },

    #[error("Unsupported model format: {0} (expected .oom or .xmi)")]
    UnsupportedFormat(String),

    #[error("Generalization {generalization} in {file} links unknown classes (parent {parent}, child {child})")]
    DanglingGeneralization {
        file: String,
        generalization: String,
        parent: String,
        child: String,
    },

    #[error("Association {association} in {file} links unknown classes ({class_a}, {class_b})")]
    DanglingAssociation {
        file: String,
        association: String,
        class_a: String,
        class_b: String,
    },
}

/// One model document to read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSource {
    /// Path, used in diagnostics
    pub path: String,

    /// Interchange dialect
    pub format: ModelFormat,

    /// XML text
    pub content: String,
}

impl ModelSource {
    /// Create a source from text already in memory
    pub fn new(path: impl Into<String>, format: ModelFormat, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            format,
            content: content.into(),
        }
    }

    /// Load a source from disk, inferring the format from the extension when not given
    pub fn from_file(path: &Path, format: Option<ModelFormat>) -> Result<Self, ReadError> {
        let display = path.display().to_string();
        let format = format
            .or_else(|| ModelFormat::from_path(path))
            .ok_or_else(|| ReadError::UnsupportedFormat(display.clone()))?;

        let content = std::fs::read_to_string(path).map_err(|e| ReadError::Io {
            path: display.clone(),
            message: e.to_string(),
        })?;

        Ok(Self::new(display, format, content))
    }
}

/// Reader settings
#[derive(Debug, Clone, Default)]
pub struct ReaderOptions {
    pub naming: NamingConfig,
}

impl ReaderOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            naming: config.naming.clone(),
        }
    }
}

/// Builds a [`Graph`] from model sources
#[derive(Debug, Clone, Default)]
pub struct ModelReader {
    options: ReaderOptions,
}

impl ModelReader {
    /// Create a reader
    pub fn new(options: ReaderOptions) -> Self {
        Self { options }
    }

    /// Read the domains declared by a model file
    ///
    /// Used to load the shared domain set passed to [`ModelReader::parse`].
    pub fn read_domains(&self, source: &ModelSource) -> Result<Vec<Domain>, ReadError> {
        let raw = Self::extract_source(source)?;
        Ok(raw
            .domains
            .into_iter()
            .map(|d| Domain {
                code: d.code,
                label: d.label,
                data_type: d.data_type,
                persistent_type: d.persistent_type,
                length: d.length,
                precision: d.precision,
                file: source.path.clone(),
            })
            .collect())
    }

    /// Read a model set into a graph
    ///
    /// `domains` are loaded before the domains of the files themselves and
    /// take precedence over them.
    pub fn parse(
        &self,
        sources: &[ModelSource],
        domains: &[Domain],
        sink: &mut DiagnosticSink,
    ) -> Result<Graph, ReadError> {
        info!("Reading {} model file(s)", sources.len());

        let mut files = Vec::with_capacity(sources.len());
        for source in sources {
            files.push((source.path.clone(), Self::extract_source(source)?));
        }

        let mut builder = GraphBuilder::new(&self.options.naming, sink, files.len());

        builder.add_shared_domains(domains);
        for (index, (path, raw)) in files.iter().enumerate() {
            builder.add_file_domains(index, path, raw);
        }

        for (index, (path, raw)) in files.iter().enumerate() {
            builder.add_file_classes(index, path, raw);
        }

        for (index, (path, raw)) in files.iter().enumerate() {
            builder.link_generalizations(index, path, raw)?;
        }

        for (index, (path, raw)) in files.iter().enumerate() {
            for association in &raw.associations {
                builder.resolve_association(index, path, association)?;
            }
        }

        let graph = builder.finish();
        info!(
            models = graph.models.len(),
            namespaces = graph.namespaces.len(),
            classes = graph.classes.len(),
            domains = graph.domains.len(),
            "Model set read"
        );

        Ok(graph)
    }

    /// Read the shared domains and model files listed by a configuration
    ///
    /// Paths are resolved against the project root.
    pub fn read_config(&self, config: &Config, sink: &mut DiagnosticSink) -> Result<Graph, ReadError> {
        let load = |file: &ModelFileConfig| {
            ModelSource::from_file(&config.resolve(&file.path), file.resolved_format())
        };

        let mut domains = Vec::new();
        for file in &config.domains {
            domains.extend(self.read_domains(&load(file)?)?);
        }

        let sources = config.models.iter().map(load).collect::<Result<Vec<_>, _>>()?;
        self.parse(&sources, &domains, sink)
    }

    fn extract_source(source: &ModelSource) -> Result<RawModel, ReadError> {
        let doc = Document::parse(&source.content).map_err(|e| ReadError::Xml {
            path: source.path.clone(),
            message: e.to_string(),
        })?;

        let dialect = dialect_for(source.format);
        debug!("Extracting {} with the {} dialect", source.path, dialect.name());
        extract(dialect.as_ref(), &doc, &source.path)
    }
}

/// Mutable state of one parse
struct GraphBuilder<'a> {
    graph: Graph,
    naming: &'a NamingConfig,
    sink: &'a mut DiagnosticSink,
    /// Per file: declared domain and domain shortcut ids → domain code
    file_domains: Vec<HashMap<String, String>>,
    /// Per file: declared class ids → class
    file_classes: Vec<HashMap<String, ClassId>>,
    /// Per file: class shortcut ids → class name
    file_shortcuts: Vec<HashMap<String, String>>,
    /// First class declared with each name
    by_name: HashMap<String, ClassId>,
}

impl<'a> GraphBuilder<'a> {
    fn new(naming: &'a NamingConfig, sink: &'a mut DiagnosticSink, files: usize) -> Self {
        Self {
            graph: Graph::new(),
            naming,
            sink,
            file_domains: vec![HashMap::new(); files],
            file_classes: vec![HashMap::new(); files],
            file_shortcuts: vec![HashMap::new(); files],
            by_name: HashMap::new(),
        }
    }

    fn finish(self) -> Graph {
        self.graph
    }

    fn insert_domain(&mut self, domain: Domain) -> bool {
        if let Some(existing) = self.graph.domains.get(&domain.code) {
            self.sink.push(
                Diagnostic::new(
                    DiagnosticCode::ReadDuplicateDomain,
                    format!(
                        "Domain {} is declared more than once (first in {})",
                        domain.code, existing.file
                    ),
                )
                .in_file(domain.file.clone())
                .with_related(vec![existing.file.clone()]),
            );
            return false;
        }

        self.graph.domains.insert(domain.code.clone(), domain);
        true
    }

    fn add_shared_domains(&mut self, domains: &[Domain]) {
        for domain in domains {
            self.insert_domain(domain.clone());
        }
        debug!("Registered {} shared domain(s)", domains.len());
    }

    fn add_file_domains(&mut self, index: usize, path: &str, raw: &RawModel) {
        let mut declared = Vec::new();

        for d in &raw.domains {
            self.file_domains[index].insert(d.id.clone(), d.code.clone());

            let domain = Domain {
                code: d.code.clone(),
                label: d.label.clone(),
                data_type: d.data_type.clone(),
                persistent_type: d.persistent_type.clone(),
                length: d.length,
                precision: d.precision,
                file: path.to_string(),
            };
            if self.insert_domain(domain) {
                declared.push(d.code.clone());
            }
        }

        for shortcut in &raw.domain_shortcuts {
            self.file_domains[index].insert(shortcut.id.clone(), shortcut.code.clone());
        }

        self.graph.models.push(ModelRoot {
            name: raw.name.clone(),
            label: raw.label.clone(),
            file: path.to_string(),
            domains: declared,
            namespaces: Vec::new(),
        });
    }

    fn add_file_classes(&mut self, index: usize, path: &str, raw: &RawModel) {
        for shortcut in &raw.class_shortcuts {
            self.file_shortcuts[index].insert(shortcut.id.clone(), shortcut.code.clone());
        }

        for ns in &raw.namespaces {
            let ns_id = NamespaceId(self.graph.namespaces.len());
            self.graph.namespaces.push(Namespace {
                name: ns.code.clone(),
                label: ns.label.clone(),
                comment: ns.comment.clone(),
                creator: ns.creator.clone(),
                is_persistent: self.naming.is_persistent_namespace(&ns.code),
                file: path.to_string(),
                classes: Vec::new(),
                uses: BTreeSet::new(),
            });
            self.graph.models[index].namespaces.push(ns_id);

            for raw_class in &ns.classes {
                let class = self.build_class(index, path, ns_id, raw_class);
                let id = ClassId(self.graph.classes.len());
                self.graph.classes.push(class);
                self.graph.namespaces[ns_id.0].classes.push(id);

                self.file_classes[index].insert(raw_class.id.clone(), id);
                self.by_name.entry(raw_class.code.clone()).or_insert(id);
            }

            debug!(
                "Namespace {} registered with {} class(es)",
                ns.code,
                ns.classes.len()
            );
        }
    }

    fn build_class(&mut self, index: usize, path: &str, namespace: NamespaceId, raw: &RawClass) -> ModelClass {
        let stereotype = match Stereotype::parse(raw.stereotype.as_deref()) {
            Ok(stereotype) => stereotype,
            Err(unknown) => {
                self.sink.report(
                    DiagnosticCode::ReadUnknownStereotype,
                    path,
                    format!("Class {} has unknown stereotype '{}'", raw.code, unknown),
                );
                Stereotype::None
            }
        };

        let table = raw
            .persistent_code
            .clone()
            .unwrap_or_else(|| naming::to_upper_snake(&raw.code));

        let properties = raw
            .properties
            .iter()
            .map(|p| self.build_property(index, raw.trigram.as_deref(), p))
            .collect();

        ModelClass {
            name: raw.code.clone(),
            label: raw.label.clone(),
            comment: raw.comment.clone(),
            stereotype,
            data_contract: DataContract {
                name: table,
                is_persistent: raw.persistent,
            },
            properties,
            parent: None,
            trigram: raw.trigram.clone(),
            storage: raw.storage.clone(),
            is_historized: raw.historized,
            is_audited: raw.audited,
            is_export_delta_tracked: raw.export_delta,
            namespace,
            file: path.to_string(),
            constant_values: Vec::new(),
        }
    }

    fn build_property(&self, index: usize, trigram: Option<&str>, raw: &RawProperty) -> ModelProperty {
        let domain = match &raw.domain {
            Some(DomainRef::Id(id)) => self.file_domains[index].get(id).cloned(),
            Some(DomainRef::Code(code)) => Some(code.clone()),
            None => None,
        };

        let data_type = raw.data_type.clone().or_else(|| {
            domain
                .as_deref()
                .and_then(|code| self.graph.domain(code))
                .and_then(|d| d.data_type.clone())
        });

        let column = raw.persistent.then(|| {
            raw.persistent_code
                .clone()
                .unwrap_or_else(|| naming::column_name(trigram, &raw.code))
        });

        let mut property = ModelProperty::primitive(raw.code.clone(), domain);
        property.comment = raw.comment.clone();
        property.data_type = data_type;
        property.data_member = DataMember {
            name: column,
            is_required: raw.multiplicity.as_deref() == Some(Multiplicity::ExactlyOne.as_str()),
        };
        property.is_primary_key = raw.primary_key;
        property.is_unique = raw.unique;
        property.is_unique_many = raw.unique_many;
        property.is_persistent = raw.persistent;
        property.is_ordered = raw.ordered;
        property.persistent_type = raw.persistent_type.clone();
        property
    }

    /// Resolve a class reference: declared id, then shortcut, then name
    fn lookup(&self, index: usize, reference: &str) -> Option<ClassId> {
        if let Some(id) = self.file_classes[index].get(reference) {
            return Some(*id);
        }

        let name = self.file_shortcuts[index]
            .get(reference)
            .map(String::as_str)
            .unwrap_or(reference);
        self.by_name.get(name).copied()
    }

    fn link_generalizations(&mut self, index: usize, path: &str, raw: &RawModel) -> Result<(), ReadError> {
        for generalization in &raw.generalizations {
            let parent = self.lookup(index, &generalization.parent);
            let child = self.lookup(index, &generalization.child);

            let (parent, child) = match (parent, child) {
                (Some(parent), Some(child)) => (parent, child),
                _ => {
                    return Err(ReadError::DanglingGeneralization {
                        file: path.to_string(),
                        generalization: generalization.id.clone(),
                        parent: generalization.parent.clone(),
                        child: generalization.child.clone(),
                    })
                }
            };

            self.graph.class_mut(child).parent = Some(parent);
            self.graph.add_namespace_use(child, parent);
        }

        Ok(())
    }

    fn resolve_association(
        &mut self,
        index: usize,
        path: &str,
        association: &RawAssociation,
    ) -> Result<(), ReadError> {
        let label = association
            .name
            .clone()
            .or_else(|| association.code.clone())
            .unwrap_or_else(|| association.id.clone());

        let (class_a, class_b) = match (
            self.lookup(index, &association.class_a),
            self.lookup(index, &association.class_b),
        ) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(ReadError::DanglingAssociation {
                    file: path.to_string(),
                    association: label,
                    class_a: association.class_a.clone(),
                    class_b: association.class_b.clone(),
                })
            }
        };

        if let (Some(code), Some(name)) = (&association.code, &association.name) {
            let expected = naming::generated_code(name);
            if *code != expected {
                self.sink.push(
                    Diagnostic::new(
                        DiagnosticCode::ReadAssociationCodeMismatch,
                        format!("Association '{}' code does not match its name", name),
                    )
                    .in_file(path)
                    .with_comparison(expected, code.clone()),
                );
            }
        }

        let shown = |m: &str| if m.is_empty() { "missing".to_string() } else { m.to_string() };
        let (multiplicity_a, multiplicity_b) = match (
            Multiplicity::parse(&association.multiplicity_a),
            Multiplicity::parse(&association.multiplicity_b),
        ) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                self.sink.report(
                    DiagnosticCode::ReadInvalidMultiplicity,
                    path,
                    format!(
                        "Association '{}' between {} and {} has an unsupported multiplicity ({} / {})",
                        label,
                        self.graph.class(class_a).name,
                        self.graph.class(class_b).name,
                        shown(&association.multiplicity_a),
                        shown(&association.multiplicity_b)
                    ),
                );
                return Ok(());
            }
        };

        let end = |id: ClassId, multiplicity: Multiplicity| {
            let class = self.graph.class(id);
            EndInfo {
                stereotype: class.stereotype,
                is_persistent: class.is_persistent(),
                multiplicity,
            }
        };
        let end_a = end(class_a, multiplicity_a);
        let end_b = end(class_b, multiplicity_b);

        let ends = Ends {
            path,
            label: &label,
            class_a,
            class_b,
            role_a: association.role_a.as_deref(),
            role_b: association.role_b.as_deref(),
        };

        for resolution in association::resolve(&end_a, &end_b, association.composition) {
            match resolution {
                Resolution::ForeignKey { holder, is_required } => {
                    self.add_foreign_key(&ends, holder, is_required);
                }
                Resolution::ForeignKeyList { holder, is_persistent } => {
                    self.add_foreign_key_list(&ends, holder, is_persistent);
                }
                Resolution::ComposedChild { owner, is_collection } => {
                    self.add_composed_child(&ends, owner, is_collection);
                }
                Resolution::Rejected { holder, reason } => {
                    self.reject(&ends, holder, reason);
                }
            }
        }

        Ok(())
    }

    fn add_foreign_key(&mut self, ends: &Ends, holder: Side, is_required: bool) {
        let holder_id = ends.class(holder);
        let target_id = ends.class(holder.other());
        let role = ends.role(holder.other());

        let target = self.graph.class(target_id);
        let pk = match target.primary_key() {
            Some(pk) => pk.clone(),
            None => {
                let message = format!(
                    "Association '{}': {} cannot reference {} which has no primary key",
                    ends.label,
                    self.graph.class(holder_id).name,
                    target.name
                );
                self.sink.report(DiagnosticCode::ReadTargetWithoutPrimaryKey, ends.path, message);
                return;
            }
        };

        let base = if pk.name.starts_with(&target.name) {
            pk.name.clone()
        } else {
            format!("{}{}", target.name, pk.name)
        };
        let name = format!("{}{}", role.unwrap_or_default(), base);

        let holder_class = self.graph.class(holder_id);
        let is_persistent = holder_class.is_persistent();
        let column = is_persistent.then(|| {
            let column = pk
                .column_name()
                .map(str::to_string)
                .unwrap_or_else(|| naming::column_name(holder_class.trigram.as_deref(), &base));
            match role {
                Some(role) => format!("{}_{}", column, naming::to_upper_snake(role)),
                None => column,
            }
        });

        let mut property = ModelProperty::primitive(name, pk.domain.clone());
        property.data_type = pk.data_type.clone();
        property.persistent_type = pk.persistent_type.clone();
        property.is_persistent = is_persistent;
        property.data_member = DataMember {
            name: column,
            is_required,
        };
        property.role = role.map(str::to_string);
        property.kind = PropertyKind::Reference { target: target_id };

        self.graph.class_mut(holder_id).properties.push(property);
        self.graph.add_namespace_use(holder_id, target_id);
    }

    fn add_foreign_key_list(&mut self, ends: &Ends, holder: Side, is_persistent: bool) {
        let holder_id = ends.class(holder);
        let target_id = ends.class(holder.other());
        let role = ends.role(holder.other());

        let target = self.graph.class(target_id);
        let pk = target.primary_key();
        let name = format!(
            "{}{}{}List",
            role.unwrap_or_default(),
            target.name,
            pk.map(|p| p.name.as_str()).unwrap_or_default()
        );

        let mut property = ModelProperty::primitive(name, pk.and_then(|p| p.domain.clone()));
        property.data_type = pk.and_then(|p| p.data_type.clone());
        property.is_persistent = is_persistent;
        property.role = role.map(str::to_string);
        property.kind = PropertyKind::ReferenceList { target: target_id };

        self.graph.class_mut(holder_id).properties.push(property);
        self.graph.add_namespace_use(holder_id, target_id);
    }

    fn add_composed_child(&mut self, ends: &Ends, owner: Side, is_collection: bool) {
        let owner_id = ends.class(owner);
        let child_id = ends.class(owner.other());
        let role = ends.role(owner.other());

        let child = self.graph.class(child_id);
        let name = role.map(str::to_string).unwrap_or_else(|| child.name.clone());

        let mut property = ModelProperty::primitive(name, None);
        property.data_type = Some(child.name.clone());
        property.role = role.map(str::to_string);
        property.kind = PropertyKind::Composition {
            target: child_id,
            is_collection,
        };

        self.graph.class_mut(owner_id).properties.push(property);
        self.graph.add_namespace_use(owner_id, child_id);
    }

    fn reject(&mut self, ends: &Ends, holder: Side, reason: Rejection) {
        let holder_name = &self.graph.class(ends.class(holder)).name;
        let target_name = &self.graph.class(ends.class(holder.other())).name;

        let (code, message) = match reason {
            Rejection::ManyToManyBetweenTables => (
                DiagnosticCode::ReadUnimplementableAssociation,
                format!(
                    "Association '{}': many-to-many between persistent classes {} and {} cannot be implemented",
                    ends.label, holder_name, target_name
                ),
            ),
            Rejection::PersistentToTransient => (
                DiagnosticCode::ReadPersistentToTransient,
                format!(
                    "Association '{}': persistent class {} cannot reference non-persistent class {}",
                    ends.label, holder_name, target_name
                ),
            ),
        };

        self.sink.report(code, ends.path, message);
    }
}

/// Endpoints of the association being resolved
struct Ends<'e> {
    path: &'e str,
    label: &'e str,
    class_a: ClassId,
    class_b: ClassId,
    role_a: Option<&'e str>,
    role_b: Option<&'e str>,
}

impl Ends<'_> {
    fn class(&self, side: Side) -> ClassId {
        match side {
            Side::A => self.class_a,
            Side::B => self.class_b,
        }
    }

    fn role(&self, side: Side) -> Option<&str> {
        match side {
            Side::A => self.role_a,
            Side::B => self.role_b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelc_core::Category;

    const HEADER: &str = r#"<Model xmlns:a="attribute" xmlns:c="collection" xmlns:o="object"><o:Model Id="m"><a:Code>Shop</a:Code>"#;

    fn domains() -> &'static str {
        r#"<c:Domains><o:Domain Id="d1"><a:Code>DO_ID</a:Code><a:DataType>int</a:DataType><a:PersistentDataType>int</a:PersistentDataType></o:Domain></c:Domains>"#
    }

    fn class(id: &str, code: &str, trigram: &str, persistent: bool, stereotype: &str) -> String {
        format!(
            r#"<o:Class Id="{id}"><a:Code>{code}</a:Code><a:Stereotype>{stereotype}</a:Stereotype><a:Persistent>{p}</a:Persistent><a:Trigram>{trigram}</a:Trigram>
            <c:Attributes><o:Attribute Id="{id}_id"><a:Code>Id</a:Code><a:Persistent>{p}</a:Persistent><a:PrimaryIdentifier>1</a:PrimaryIdentifier><a:Multiplicity>1..1</a:Multiplicity><c:Domain><o:Domain Ref="d1"/></c:Domain></o:Attribute></c:Attributes></o:Class>"#,
            id = id,
            code = code,
            stereotype = stereotype,
            trigram = trigram,
            p = if persistent { 1 } else { 0 }
        )
    }

    fn association(a: &str, b: &str, ma: &str, mb: &str, extra: &str) -> String {
        format!(
            r#"<o:Association Id="as_{a}_{b}"><a:RoleAMultiplicity>{ma}</a:RoleAMultiplicity><a:RoleBMultiplicity>{mb}</a:RoleBMultiplicity>{extra}
            <c:Object1><o:Class Ref="{a}"/></c:Object1><c:Object2><o:Class Ref="{b}"/></c:Object2></o:Association>"#,
            a = a,
            b = b,
            ma = ma,
            mb = mb,
            extra = extra
        )
    }

    fn model(classes: &[String], associations: &[String]) -> String {
        format!(
            r#"{}{}<c:Packages><o:Package Id="p1"><a:Code>Shop.ShopDataContract</a:Code><c:Classes>{}</c:Classes></o:Package></c:Packages><c:Associations>{}</c:Associations></o:Model></Model>"#,
            HEADER,
            domains(),
            classes.join(""),
            associations.join("")
        )
    }

    fn read(content: String) -> (Result<Graph, ReadError>, DiagnosticSink) {
        let mut sink = DiagnosticSink::new();
        let source = ModelSource::new("Shop.oom", ModelFormat::Oom, content);
        let graph = ModelReader::default().parse(&[source], &[], &mut sink);
        (graph, sink)
    }

    #[test]
    fn foreign_key_from_many_to_one() {
        let (graph, sink) = read(model(
            &[
                class("c1", "OrderLine", "OLI", true, ""),
                class("c2", "Order", "ORD", true, ""),
            ],
            &[association("c1", "c2", "0..*", "1..1", "<a:RoleBName>Parent</a:RoleBName>")],
        ));
        let graph = graph.unwrap();
        assert!(sink.is_empty(), "{:?}", sink.diagnostics());

        let line = graph.class(ClassId(0));
        let fk = line.property("ParentOrderId").unwrap();
        assert_eq!(fk.reference_target(), Some(ClassId(1)));
        assert_eq!(fk.column_name(), Some("ORD_ID_PARENT"));
        assert!(fk.data_member.is_required);
        assert_eq!(fk.domain.as_deref(), Some("DO_ID"));
        assert_eq!(fk.data_type.as_deref(), Some("int"));
    }

    #[test]
    fn primitive_defaults() {
        let (graph, _) = read(model(&[class("c1", "ProductLine", "PLI", true, "")], &[]));
        let graph = graph.unwrap();

        let class = graph.class(ClassId(0));
        assert_eq!(class.table_name(), "PRODUCT_LINE");
        let id = class.property("Id").unwrap();
        assert_eq!(id.column_name(), Some("PLI_ID"));
        assert!(id.data_member.is_required);
        assert!(graph.namespaces[0].is_persistent);
    }

    #[test]
    fn unknown_stereotype_is_a_bug() {
        let (graph, sink) = read(model(&[class("c1", "Country", "COU", true, "Enum")], &[]));
        assert_eq!(graph.unwrap().class(ClassId(0)).stereotype, Stereotype::None);
        assert_eq!(sink.count_code(DiagnosticCode::ReadUnknownStereotype), 1);
        assert_eq!(sink.diagnostics()[0].category, Category::Bug);
    }

    #[test]
    fn invalid_multiplicity_skips_association() {
        let (graph, sink) = read(model(
            &[class("c1", "A", "AAA", true, ""), class("c2", "B", "BBB", true, "")],
            &[association("c1", "c2", "2..5", "1..1", "")],
        ));
        let graph = graph.unwrap();
        assert_eq!(sink.count_code(DiagnosticCode::ReadInvalidMultiplicity), 1);
        assert_eq!(graph.class(ClassId(0)).properties.len(), 1);
    }

    #[test]
    fn missing_multiplicity_is_reported_not_fatal() {
        let association = r#"<o:Association Id="as_c1_c2"><a:Name>Loose</a:Name>
            <c:Object1><o:Class Ref="c1"/></c:Object1><c:Object2><o:Class Ref="c2"/></c:Object2></o:Association>"#;
        let (graph, sink) = read(model(
            &[class("c1", "A", "AAA", true, ""), class("c2", "B", "BBB", true, "")],
            &[association.to_string()],
        ));

        let graph = graph.unwrap();
        assert_eq!(sink.count_code(DiagnosticCode::ReadInvalidMultiplicity), 1);
        assert_eq!(graph.class(ClassId(0)).name, "A");
        assert_eq!(graph.class(ClassId(1)).name, "B");
        assert_eq!(graph.class(ClassId(0)).properties.len(), 1);
        assert_eq!(graph.class(ClassId(1)).properties.len(), 1);

        let diagnostic = sink
            .iter()
            .find(|d| d.code == DiagnosticCode::ReadInvalidMultiplicity)
            .unwrap();
        assert!(diagnostic.message.contains("(missing / missing)"));
    }

    #[test]
    fn dangling_association_is_an_error() {
        let (graph, _) = read(model(
            &[class("c1", "A", "AAA", true, "")],
            &[association("c1", "nowhere", "0..*", "1..1", "<a:Name>Lost link</a:Name>")],
        ));

        match graph {
            Err(ReadError::DanglingAssociation { association, class_a, class_b, .. }) => {
                assert_eq!(association, "Lost link");
                assert_eq!(class_a, "c1");
                assert_eq!(class_b, "nowhere");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn association_code_must_match_name() {
        let (_, sink) = read(model(
            &[class("c1", "A", "AAA", true, ""), class("c2", "B", "BBB", true, "")],
            &[association("c1", "c2", "0..*", "0..1", "<a:Name>A to B</a:Name><a:Code>A_B</a:Code>")],
        ));

        let diagnostic = sink
            .iter()
            .find(|d| d.code == DiagnosticCode::ReadAssociationCodeMismatch)
            .unwrap();
        assert_eq!(diagnostic.category, Category::CodeStyle);
        assert_eq!(diagnostic.expected.as_deref(), Some("A_TO_B"));
    }

    #[test]
    fn target_without_primary_key() {
        let classes = vec![
            class("c1", "A", "AAA", true, ""),
            r#"<o:Class Id="c2"><a:Code>B</a:Code><a:Persistent>1</a:Persistent></o:Class>"#.to_string(),
        ];
        let (graph, sink) = read(model(&classes, &[association("c1", "c2", "0..*", "1..1", "")]));
        assert!(graph.is_ok());
        assert_eq!(sink.count_code(DiagnosticCode::ReadTargetWithoutPrimaryKey), 1);
    }

    #[test]
    fn composition_adds_child_on_owner() {
        let (graph, _) = read(model(
            &[
                class("c1", "Order", "ORD", false, ""),
                class("c2", "OrderLine", "OLI", false, ""),
            ],
            &[association("c1", "c2", "1..1", "0..*", "<a:RoleAIndicator>C</a:RoleAIndicator><a:RoleBName>Lines</a:RoleBName>")],
        ));
        let graph = graph.unwrap();

        let lines = graph.class(ClassId(0)).property("Lines").unwrap();
        assert_eq!(
            lines.kind,
            PropertyKind::Composition {
                target: ClassId(1),
                is_collection: true
            }
        );
        assert!(graph.class(ClassId(1)).property("Lines").is_none());
    }

    #[test]
    fn many_to_many_between_tables_is_rejected() {
        let (_, sink) = read(model(
            &[class("c1", "A", "AAA", true, ""), class("c2", "B", "BBB", true, "")],
            &[association("c1", "c2", "0..*", "1..*", "")],
        ));
        assert_eq!(sink.count_code(DiagnosticCode::ReadUnimplementableAssociation), 1);
    }

    #[test]
    fn duplicate_shared_domain_keeps_first() {
        let mut sink = DiagnosticSink::new();
        let shared = vec![Domain::new("DO_ID", "long", "bigint").in_file("Domains.oom")];
        let source = ModelSource::new(
            "Shop.oom",
            ModelFormat::Oom,
            model(&[class("c1", "A", "AAA", true, "")], &[]),
        );

        let graph = ModelReader::default().parse(&[source], &shared, &mut sink).unwrap();
        assert_eq!(graph.domain("DO_ID").unwrap().data_type.as_deref(), Some("long"));
        assert_eq!(sink.count_code(DiagnosticCode::ReadDuplicateDomain), 1);
        assert!(graph.models[0].domains.is_empty());
    }
}
