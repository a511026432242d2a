//! Property checks

use crate::context::CheckContext;
use modelc_core::{Diagnostic, DiagnosticCode};
use modelc_model::{ClassId, ModelClass, ModelProperty, PropertyKind};

/// Validates one property of a class
pub struct PropertyChecker;

impl PropertyChecker {
    /// Check `class.properties[index]`
    ///
    /// `cyclic_ancestry` disables the checks that need the parent chain.
    pub fn check(ctx: &mut CheckContext<'_>, class_id: ClassId, index: usize, cyclic_ancestry: bool) {
        let graph = ctx.graph;
        let class = graph.class(class_id);
        let property = &class.properties[index];

        if !ctx.rules.is_pascal(&property.name) {
            ctx.report(
                DiagnosticCode::NameCasing,
                &class.file,
                format!("Property {}.{} must be Pascal case", class.name, property.name),
            );
        }

        if property.is_primitive() {
            if property.comment.is_none() {
                ctx.report(
                    DiagnosticCode::MissingComment,
                    &class.file,
                    format!("Property {}.{} has no comment", class.name, property.name),
                );
            }
            Self::check_domain(ctx, class, property);
        }

        Self::check_persistence(ctx, class, property);
        Self::check_column(ctx, class, property);
        Self::check_association(ctx, class_id, property, cyclic_ancestry);
    }

    fn check_domain(ctx: &mut CheckContext<'_>, class: &ModelClass, property: &ModelProperty) {
        let graph = ctx.graph;

        let code = match property.domain.as_deref() {
            Some(code) => code,
            None => {
                ctx.report(
                    DiagnosticCode::PropertyMissingDomain,
                    &class.file,
                    format!("Property {}.{} has no domain", class.name, property.name),
                );
                return;
            }
        };

        let domain = match graph.domain(code) {
            Some(domain) => domain,
            None => {
                ctx.report(
                    DiagnosticCode::PropertyMissingDomain,
                    &class.file,
                    format!(
                        "Property {}.{} uses unknown domain {}",
                        class.name, property.name, code
                    ),
                );
                return;
            }
        };

        if let (Some(declared), Some(expected)) = (&property.data_type, &domain.data_type) {
            if !declared.eq_ignore_ascii_case(expected) {
                ctx.push(
                    Diagnostic::new(
                        DiagnosticCode::PropertyDomainMismatch,
                        format!(
                            "Property {}.{} type differs from domain {}",
                            class.name, property.name, domain.code
                        ),
                    )
                    .in_file(class.file.clone())
                    .with_comparison(expected.clone(), declared.clone()),
                );
            }
        }
    }

    fn check_persistence(ctx: &mut CheckContext<'_>, class: &ModelClass, property: &ModelProperty) {
        if property.is_persistent && !class.is_persistent() {
            ctx.report(
                DiagnosticCode::PropertyPersistenceMismatch,
                &class.file,
                format!(
                    "Property {}.{} is persistent but its class is not",
                    class.name, property.name
                ),
            );
        }

        if property.is_primary_key
            && class.is_persistent()
            && !(property.is_persistent && property.data_member.is_required)
        {
            ctx.report(
                DiagnosticCode::PropertyInvalidPrimaryKey,
                &class.file,
                format!(
                    "Primary key {}.{} must be persistent and required",
                    class.name, property.name
                ),
            );
        }
    }

    fn check_column(ctx: &mut CheckContext<'_>, class: &ModelClass, property: &ModelProperty) {
        if !property.is_column() || !class.is_persistent() {
            return;
        }

        let column = match property.column_name() {
            Some(column) => column,
            None => return,
        };

        if !ctx.rules.is_sql_identifier(column) {
            ctx.report(
                DiagnosticCode::PropertyColumnCasing,
                &class.file,
                format!(
                    "Column {} of {}.{} does not follow the {:?} casing",
                    column, class.name, property.name, ctx.options.dialect
                ),
            );
        }

        if let (true, Some(trigram)) = (property.is_primitive(), class.trigram.as_deref()) {
            let prefix = format!("{}_", trigram);
            if !column.starts_with(&prefix) {
                ctx.push(
                    Diagnostic::new(
                        DiagnosticCode::PropertyColumnPrefix,
                        format!(
                            "Column {} of {}.{} must start with {}",
                            column, class.name, property.name, prefix
                        ),
                    )
                    .in_file(class.file.clone())
                    .with_comparison(prefix.clone(), column),
                );
            }
        }
    }

    fn check_association(
        ctx: &mut CheckContext<'_>,
        class_id: ClassId,
        property: &ModelProperty,
        cyclic_ancestry: bool,
    ) {
        let graph = ctx.graph;
        let class = graph.class(class_id);

        match property.kind {
            PropertyKind::Primitive => {}
            PropertyKind::Reference { target } | PropertyKind::ReferenceList { target } => {
                if target == class_id && property.role.is_none() {
                    ctx.report(
                        DiagnosticCode::PropertySelfReferenceRole,
                        &class.file,
                        format!(
                            "Property {}.{} references its own class without a role",
                            class.name, property.name
                        ),
                    );
                }
            }
            PropertyKind::Composition { target, is_collection } => {
                if target == class_id && !is_collection {
                    ctx.report(
                        DiagnosticCode::PropertySelfComposition,
                        &class.file,
                        format!(
                            "Property {}.{} composes its own class without a collection (infinite recursion)",
                            class.name, property.name
                        ),
                    );
                }
            }
        }

        let target = match property.reference_target() {
            Some(target) if !cyclic_ancestry => target,
            _ => return,
        };

        for ancestor_id in graph.ancestors(class_id).chain {
            let ancestor = graph.class(ancestor_id);
            let inherited = ancestor
                .properties
                .iter()
                .any(|p| p.reference_target() == Some(target) && p.role == property.role);

            if inherited {
                ctx.push(
                    Diagnostic::new(
                        DiagnosticCode::PropertyInheritedReference,
                        format!(
                            "Property {}.{} duplicates a reference to {} already held by {}",
                            class.name,
                            property.name,
                            graph.class(target).name,
                            ancestor.name
                        ),
                    )
                    .in_file(class.file.clone())
                    .with_related(vec![ancestor.name.clone()]),
                );
                break;
            }
        }
    }
}
