//! Class checks

use crate::context::CheckContext;
use crate::property::PropertyChecker;
use crate::registry::Registration;
use modelc_core::{Diagnostic, DiagnosticCode};
use modelc_model::{ClassId, ModelClass};
use std::collections::HashSet;
use tracing::debug;

/// Validates a class, then its properties
pub struct ClassChecker;

impl ClassChecker {
    pub fn check(ctx: &mut CheckContext<'_>, id: ClassId) {
        let graph = ctx.graph;
        let class = graph.class(id);

        if ctx.options.allowlist.is_class_skipped(&class.name) {
            debug!("Skipping allowlisted class {}", class.name);
            return;
        }

        Self::check_documentation(ctx, class);
        Self::check_identity(ctx, class);
        Self::check_persistence(ctx, class);
        Self::check_properties(ctx, class);
        let cyclic = Self::check_ancestry(ctx, id);

        for index in 0..class.properties.len() {
            PropertyChecker::check(ctx, id, index, cyclic);
        }
    }

    fn check_documentation(ctx: &mut CheckContext<'_>, class: &ModelClass) {
        if class.comment.is_none() {
            ctx.report(
                DiagnosticCode::MissingComment,
                &class.file,
                format!("Class {} has no comment", class.name),
            );
        }

        if class.label.is_none() {
            ctx.report(
                DiagnosticCode::MissingLabel,
                &class.file,
                format!("Class {} has no label", class.name),
            );
        }
    }

    fn check_identity(ctx: &mut CheckContext<'_>, class: &ModelClass) {
        if !ctx.rules.is_pascal(&class.name) {
            ctx.report(
                DiagnosticCode::NameCasing,
                &class.file,
                format!("Class {} must be Pascal case", class.name),
            );
        }

        if let Registration::Taken(first) = ctx.registry.register_class(&class.name, &class.file) {
            ctx.push(
                Diagnostic::new(
                    DiagnosticCode::ClassDuplicate,
                    format!("Class {} is declared more than once (first in {})", class.name, first),
                )
                .in_file(class.file.clone())
                .with_related(vec![first]),
            );
        }

        let graph = ctx.graph;
        let namespace = graph.namespace(class.namespace);
        if namespace.is_persistent != class.is_persistent() {
            let expected = if namespace.is_persistent { "persistent" } else { "not persistent" };
            let actual = if class.is_persistent() { "persistent" } else { "not persistent" };
            ctx.push(
                Diagnostic::new(
                    DiagnosticCode::NamespacePersistenceMismatch,
                    format!(
                        "Class {} persistence does not match namespace {}",
                        class.name, namespace.name
                    ),
                )
                .in_file(class.file.clone())
                .with_comparison(expected, actual),
            );
        }
    }

    fn check_persistence(ctx: &mut CheckContext<'_>, class: &ModelClass) {
        let file = class.file.as_str();

        if !class.is_persistent() {
            if class.stereotype.is_list() {
                ctx.report(
                    DiagnosticCode::ClassStereotypeNotPersistent,
                    file,
                    format!("{} list {} must be persistent", class.stereotype, class.name),
                );
            }

            if class.is_historized || class.is_audited || class.is_export_delta_tracked {
                ctx.report(
                    DiagnosticCode::ClassFlagWithoutPersistence,
                    file,
                    format!(
                        "Class {} is historized, audited or export tracked but not persistent",
                        class.name
                    ),
                );
            }
            return;
        }

        match class.trigram.as_deref() {
            None => ctx.report(
                DiagnosticCode::ClassMissingTrigram,
                file,
                format!("Persistent class {} has no trigram", class.name),
            ),
            Some(trigram) => {
                if !ctx.rules.is_trigram(trigram) {
                    ctx.report(
                        DiagnosticCode::ClassInvalidTrigram,
                        file,
                        format!(
                            "Trigram {} of class {} must be three upper-case letters",
                            trigram, class.name
                        ),
                    );
                }

                if let Registration::Taken(owner) = ctx.registry.register_trigram(trigram, &class.name) {
                    ctx.push(
                        Diagnostic::new(
                            DiagnosticCode::ClassDuplicateTrigram,
                            format!(
                                "Trigram {} is used by both {} and {}",
                                trigram, owner, class.name
                            ),
                        )
                        .in_file(file)
                        .with_related(vec![owner]),
                    );
                }
            }
        }

        if class.primary_key().is_none() {
            ctx.report(
                DiagnosticCode::ClassMissingPrimaryKey,
                file,
                format!("Persistent class {} has no primary key", class.name),
            );
        }

        if let Some(parent) = class.parent {
            ctx.report(
                DiagnosticCode::ClassPersistentWithParent,
                file,
                format!(
                    "Persistent class {} cannot inherit from {}",
                    class.name,
                    ctx.graph.class(parent).name
                ),
            );
        }

        if !ctx.rules.is_sql_identifier(class.table_name()) {
            ctx.report(
                DiagnosticCode::ClassTableCasing,
                file,
                format!(
                    "Table name {} of class {} does not follow the {:?} casing",
                    class.table_name(),
                    class.name,
                    ctx.options.dialect
                ),
            );
        }
    }

    fn check_properties(ctx: &mut CheckContext<'_>, class: &ModelClass) {
        let file = class.file.as_str();

        let mut seen = HashSet::new();
        for property in &class.properties {
            if !seen.insert(property.name.as_str()) {
                ctx.report(
                    DiagnosticCode::ClassDuplicateProperty,
                    file,
                    format!("Class {} declares property {} twice", class.name, property.name),
                );
            }
        }

        let unique_many = class.properties.iter().filter(|p| p.is_unique_many).count();
        if unique_many == 1 {
            ctx.report(
                DiagnosticCode::ClassCompositeUniqueTooSmall,
                file,
                format!(
                    "Class {} has a composite unique key with a single property",
                    class.name
                ),
            );
        }

        let ordered = class.properties.iter().filter(|p| p.is_ordered).count();
        if ordered > 1 {
            ctx.report(
                DiagnosticCode::ClassMultipleOrderProperties,
                file,
                format!("Class {} has {} ordering properties", class.name, ordered),
            );
        }
    }

    /// Returns whether the parent chain is cyclic
    fn check_ancestry(ctx: &mut CheckContext<'_>, id: ClassId) -> bool {
        let graph = ctx.graph;
        let class = graph.class(id);
        let ancestry = graph.ancestors(id);

        if ancestry.cycle {
            let chain: Vec<String> = ancestry
                .chain
                .iter()
                .map(|c| graph.class(*c).name.clone())
                .collect();
            ctx.push(
                Diagnostic::new(
                    DiagnosticCode::ClassInheritanceCycle,
                    format!("Class {} has a cyclic parent chain", class.name),
                )
                .in_file(class.file.clone())
                .with_related(chain),
            );
            return true;
        }

        for ancestor in &ancestry.chain {
            let ancestor = graph.class(*ancestor);
            for property in &class.properties {
                if ancestor.property(&property.name).is_some() {
                    ctx.report(
                        DiagnosticCode::PropertyRedeclared,
                        &class.file,
                        format!(
                            "Property {}.{} redeclares a property of ancestor {}",
                            class.name, property.name, ancestor.name
                        ),
                    );
                }
            }
        }

        false
    }
}
