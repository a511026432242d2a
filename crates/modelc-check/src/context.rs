//! State threaded through the checker chain

use crate::options::CheckOptions;
use crate::registry::Registry;
use crate::rules::NamingRules;
use modelc_core::{Diagnostic, DiagnosticCode, DiagnosticSink};
use modelc_model::Graph;

/// Everything a checker needs: the graph, settings, the run registry and the sink
pub struct CheckContext<'a> {
    pub graph: &'a Graph,
    pub options: &'a CheckOptions,
    pub rules: &'a NamingRules,
    pub registry: Registry,
    sink: &'a mut DiagnosticSink,
}

impl<'a> CheckContext<'a> {
    /// Create a context with an empty registry
    pub fn new(
        graph: &'a Graph,
        options: &'a CheckOptions,
        rules: &'a NamingRules,
        sink: &'a mut DiagnosticSink,
    ) -> Self {
        Self {
            graph,
            options,
            rules,
            registry: Registry::new(),
            sink,
        }
    }

    /// Record a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.sink.push(diagnostic);
    }

    /// Record a diagnostic from a code, a file and a message
    pub fn report(&mut self, code: DiagnosticCode, file: &str, message: impl Into<String>) {
        self.sink.report(code, file, message);
    }
}
