//! Static and reference list initializer checks
//!
//! Every batch must target a known list class of the matching stereotype,
//! and every item must supply a value for each persistent non-key column.
//! Static lists are also walked along their scalar foreign keys: a static
//! list that reaches itself again cannot be inserted in any order.

use modelc_core::{Diagnostic, DiagnosticCode, DiagnosticSink};
use modelc_model::{ClassId, Graph, InitMap, ListKind, ModelClass, Stereotype, TableInit};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Validates initializer batches against the graph
pub struct InitListChecker;

impl InitListChecker {
    /// Check all batches; violations go to the sink, nothing is raised
    pub fn check(graph: &Graph, init: &InitMap, sink: &mut DiagnosticSink) {
        let mut reported_cycles: HashSet<BTreeSet<ClassId>> = HashSet::new();

        for (class_name, table) in init.iter() {
            let id = match graph.class_by_name(class_name) {
                Some(id) => id,
                None => {
                    let diagnostic = Diagnostic::new(
                        DiagnosticCode::InitUnknownClass,
                        format!(
                            "Initializer factory {} targets unknown class {}",
                            table.factory, class_name
                        ),
                    );
                    sink.push(match init.source() {
                        Some(file) => diagnostic.in_file(file),
                        None => diagnostic,
                    });
                    continue;
                }
            };
            let class = graph.class(id);

            Self::check_kind(class, table, sink);
            Self::check_items(class, table, sink);

            if table.kind == ListKind::Static && class.stereotype == Stereotype::Static {
                if let Some(cycle) = find_cycle(graph, id) {
                    let members: BTreeSet<ClassId> = cycle.iter().copied().collect();
                    if reported_cycles.insert(members) {
                        let path: Vec<String> = cycle
                            .iter()
                            .chain(std::iter::once(&id))
                            .map(|c| graph.class(*c).name.clone())
                            .collect();
                        sink.push(
                            Diagnostic::new(
                                DiagnosticCode::InitStaticCycle,
                                format!(
                                    "Static list {} references itself: {}",
                                    class.name,
                                    path.join(" -> ")
                                ),
                            )
                            .in_file(class.file.clone())
                            .with_related(path),
                        );
                    }
                }
            }
        }

        debug!("Checked {} initializer batch(es)", init.len());
    }

    fn check_kind(class: &ModelClass, table: &TableInit, sink: &mut DiagnosticSink) {
        let matches = matches!(
            (table.kind, class.stereotype),
            (ListKind::Static, Stereotype::Static) | (ListKind::Reference, Stereotype::Reference)
        );

        if !matches {
            sink.push(
                Diagnostic::new(
                    DiagnosticCode::InitStereotypeMismatch,
                    format!(
                        "Initializer factory {} fills a {} list but class {} is {}",
                        table.factory, table.kind, class.name, class.stereotype
                    ),
                )
                .in_file(class.file.clone())
                .with_comparison(table.kind.to_string(), class.stereotype.to_string()),
            );
        }
    }

    fn check_items(class: &ModelClass, table: &TableInit, sink: &mut DiagnosticSink) {
        for item in &table.items {
            for property in class.properties.iter().filter(|p| p.is_column() && !p.is_primary_key) {
                if !item.values.contains_key(&property.name) {
                    sink.push(
                        Diagnostic::new(
                            DiagnosticCode::InitMissingValue,
                            format!(
                                "Item {} of {} has no value for {}",
                                item.name, class.name, property.name
                            ),
                        )
                        .in_file(class.file.clone()),
                    );
                }
            }

            for name in item.values.keys() {
                if class.property(name).is_none() {
                    sink.push(
                        Diagnostic::new(
                            DiagnosticCode::InitUnknownProperty,
                            format!(
                                "Item {} of {} sets unknown property {}",
                                item.name, class.name, name
                            ),
                        )
                        .in_file(class.file.clone()),
                    );
                }
            }
        }
    }
}

/// Find a path of scalar foreign keys leading from `start` back to itself
///
/// Returns the classes on the cycle, starting with `start`. Iterative depth
/// first search; each class is expanded at most once.
fn find_cycle(graph: &Graph, start: ClassId) -> Option<Vec<ClassId>> {
    let targets = |id: ClassId| -> Vec<ClassId> {
        graph
            .class(id)
            .properties
            .iter()
            .filter_map(|p| p.reference_target())
            .collect()
    };

    let mut visited = HashSet::new();
    visited.insert(start);

    // (class, its targets, next target index)
    let mut stack = vec![(start, targets(start), 0usize)];

    while let Some((_, edges, next)) = stack.last_mut() {
        if *next >= edges.len() {
            stack.pop();
            continue;
        }

        let target = edges[*next];
        *next += 1;

        if target == start {
            return Some(stack.iter().map(|(id, _, _)| *id).collect());
        }

        if visited.insert(target) {
            let edges = targets(target);
            stack.push((target, edges, 0));
        }
    }

    None
}
