//! Validator chain entry point
//!
//! The chain runs depth-first: shared domains first, then for every model
//! file its root, its domains and its namespaces, each namespace descending
//! into its classes and each class into its properties. Every violation is
//! recorded in the sink and the walk always continues.

use crate::context::CheckContext;
use crate::domain::DomainChecker;
use crate::namespace::NamespaceChecker;
use crate::options::CheckOptions;
use crate::rules::NamingRules;
use modelc_core::{DiagnosticCode, DiagnosticSink};
use modelc_model::{Graph, ModelRoot};
use std::collections::HashSet;
use tracing::info;

/// Counts of what one run visited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckStats {
    pub models: usize,
    pub domains: usize,
    pub namespaces: usize,
    pub classes: usize,
}

/// Runs the validator chain over a graph
pub struct ModelChecker<'a> {
    graph: &'a Graph,
    options: &'a CheckOptions,
    rules: NamingRules,
}

impl<'a> ModelChecker<'a> {
    /// Create a checker
    pub fn new(graph: &'a Graph, options: &'a CheckOptions) -> Self {
        Self {
            graph,
            options,
            rules: NamingRules::new(options.dialect),
        }
    }

    /// Check the whole graph
    pub fn run(&self, sink: &mut DiagnosticSink) -> CheckStats {
        let before = sink.len();
        let mut ctx = CheckContext::new(self.graph, self.options, &self.rules, sink);
        let mut stats = CheckStats::default();

        let declared: HashSet<&str> = self
            .graph
            .models
            .iter()
            .flat_map(|m| m.domains.iter().map(String::as_str))
            .collect();

        for domain in self.graph.domains.values() {
            if !declared.contains(domain.code.as_str()) {
                DomainChecker::check(&mut ctx, domain);
                stats.domains += 1;
            }
        }

        for root in &self.graph.models {
            Self::check_root(&mut ctx, root);
            stats.models += 1;

            for code in &root.domains {
                if let Some(domain) = self.graph.domain(code) {
                    DomainChecker::check(&mut ctx, domain);
                    stats.domains += 1;
                }
            }

            for namespace in &root.namespaces {
                NamespaceChecker::check(&mut ctx, *namespace);
                stats.namespaces += 1;
            }
        }

        stats.classes = ctx.registry.class_count();
        drop(ctx);

        info!(
            models = stats.models,
            classes = stats.classes,
            diagnostics = sink.len() - before,
            "Model checked"
        );

        stats
    }

    fn check_root(ctx: &mut CheckContext<'_>, root: &ModelRoot) {
        if !ctx.rules.is_pascal(&root.name) {
            ctx.report(
                DiagnosticCode::NameCasing,
                &root.file,
                format!("Model name {} must be Pascal case", root.name),
            );
        }

        if root.label.is_none() {
            ctx.report(
                DiagnosticCode::MissingLabel,
                &root.file,
                format!("Model {} has no label", root.name),
            );
        }
    }
}
