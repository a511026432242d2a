//! Integration tests running the validator chain over the shop fixture

use modelc_check::{CheckOptions, InitListChecker, ModelChecker};
use modelc_core::{Category, Config, DiagnosticCode, DiagnosticSink, DialectConfig};
use modelc_model::{Graph, InitMap, ModelReader, ReaderOptions, Stereotype};
use std::path::Path;

fn project() -> (Config, Graph, InitMap) {
    let config = Config::from_file(Path::new("../../fixtures/shop/modelc.toml")).unwrap();
    let mut sink = DiagnosticSink::new();
    let graph = ModelReader::new(ReaderOptions::from_config(&config))
        .read_config(&config, &mut sink)
        .unwrap();
    let init_path = config.resolve(config.init.as_deref().unwrap());
    let init = InitMap::from_file(&init_path).unwrap();
    (config, graph, init)
}

#[test]
fn fixture_is_clean_for_both_dialects() {
    let (config, graph, init) = project();

    for dialect in [DialectConfig::SqlServer, DialectConfig::Oracle] {
        let options = CheckOptions::from_config(&config).with_dialect(dialect);
        let mut sink = DiagnosticSink::new();
        let stats = ModelChecker::new(&graph, &options).run(&mut sink);
        InitListChecker::check(&graph, &init, &mut sink);

        assert!(sink.is_empty(), "{:?}: {:?}", dialect, sink.diagnostics());
        assert_eq!(stats.models, 2);
        assert_eq!(stats.namespaces, 3);
        assert_eq!(stats.classes, 7);
        assert_eq!(stats.domains, 6);
    }
}

#[test]
fn broken_fixture_reports_and_continues() {
    let (config, mut graph, mut init) = project();

    let product = graph.class_by_name("Product").unwrap();
    graph.class_mut(product).trigram = Some("OST".to_string());
    let category = graph.class_by_name("Category").unwrap();
    graph.class_mut(category).stereotype = Stereotype::Static;
    if let Some(table) = init.get("Category").cloned() {
        init.insert("Genre", table);
    }

    let options = CheckOptions::from_config(&config);
    let mut sink = DiagnosticSink::new();
    ModelChecker::new(&graph, &options).run(&mut sink);
    InitListChecker::check(&graph, &init, &mut sink);

    assert_eq!(sink.count_code(DiagnosticCode::ClassDuplicateTrigram), 1);
    assert_eq!(sink.count_code(DiagnosticCode::InitStereotypeMismatch), 1);
    assert_eq!(sink.count_code(DiagnosticCode::InitUnknownClass), 1);

    let unknown = sink
        .iter()
        .find(|d| d.code == DiagnosticCode::InitUnknownClass)
        .unwrap();
    let file = &unknown.location.as_ref().unwrap().file;
    assert!(file.ends_with("init.json"), "{}", file);
    assert_eq!(sink.count(Category::Fatal), 0);
    assert!(sink.has_blocking());
}
