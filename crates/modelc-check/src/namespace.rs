//! Namespace checks

use crate::class::ClassChecker;
use crate::context::CheckContext;
use crate::registry::Registration;
use modelc_core::{Diagnostic, DiagnosticCode};
use modelc_model::NamespaceId;

/// Validates a namespace, then its classes
pub struct NamespaceChecker;

impl NamespaceChecker {
    pub fn check(ctx: &mut CheckContext<'_>, id: NamespaceId) {
        let graph = ctx.graph;
        let namespace = graph.namespace(id);
        let file = namespace.file.as_str();

        if !ctx.rules.is_dotted_pascal(&namespace.name) {
            ctx.report(
                DiagnosticCode::NameCasing,
                file,
                format!("Namespace {} must be dotted Pascal case", namespace.name),
            );
        }

        if namespace.comment.is_none() {
            ctx.report(
                DiagnosticCode::MissingComment,
                file,
                format!("Namespace {} has no comment", namespace.name),
            );
        }

        if !ctx.options.naming.has_known_suffix(&namespace.name) {
            ctx.push(
                Diagnostic::new(
                    DiagnosticCode::NamespaceSuffix,
                    format!(
                        "Namespace {} must end with {} or {}",
                        namespace.name,
                        ctx.options.naming.persistent_suffix,
                        ctx.options.naming.functional_suffix
                    ),
                )
                .in_file(file),
            );
        }

        if let Registration::Taken(first) = ctx.registry.register_namespace(&namespace.name, file) {
            ctx.push(
                Diagnostic::new(
                    DiagnosticCode::NamespaceDuplicate,
                    format!("Namespace {} is declared more than once", namespace.name),
                )
                .in_file(file)
                .with_related(vec![first]),
            );
        }

        for class in &namespace.classes {
            ClassChecker::check(ctx, *class);
        }
    }
}
