//! End-to-end generation over the shop fixture

use modelc_core::{Config, DiagnosticSink, DialectConfig};
use modelc_ddl::{dialect_for, GeneratorOptions, SchemaGenerator, ScriptSet};
use modelc_model::{Graph, InitMap, ModelReader, ReaderOptions};
use std::path::Path;

fn project() -> (Config, Graph) {
    let config = Config::from_file(Path::new("../../fixtures/shop/modelc.toml")).unwrap();
    let mut sink = DiagnosticSink::new();
    let mut graph = ModelReader::new(ReaderOptions::from_config(&config))
        .read_config(&config, &mut sink)
        .unwrap();
    let init = InitMap::from_file(&config.resolve(config.init.as_deref().unwrap())).unwrap();
    assert_eq!(graph.fold_init(&init), 2);
    (config, graph)
}

fn generator(config: &Config, dialect: DialectConfig) -> SchemaGenerator {
    SchemaGenerator::new(dialect_for(dialect), GeneratorOptions::from_config(config))
}

fn read(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).unwrap()
}

#[test]
fn sqlserver_scripts_are_written_to_disk() {
    let (config, graph) = project();
    let generator = generator(&config, DialectConfig::SqlServer);

    let mut sink = DiagnosticSink::new();
    assert_eq!(generator.check_identifiers(&graph, &mut sink), 0);
    assert!(sink.is_empty());

    let dir = tempfile::tempdir().unwrap();
    {
        let mut scripts =
            ScriptSet::create_in(dir.path(), &config.output, &config.application, generator.dialect().batch_separator())
                .unwrap();
        generator.generate(&graph, &mut scripts).unwrap();
    }

    let tables = read(dir.path(), &config.output.create_script);
    assert!(tables.contains("--   Application Name : Shop"));
    assert!(tables.contains("create table [CUSTOMER_ORDER] ("));
    assert!(tables.contains("[ORD_ID] int identity(1, 1) not null"));
    assert!(tables.contains("[ORD_CREATED_AT] datetime2 default getdate() not null"));
    assert!(tables.contains("create table [CUSTOMER_ORDER_HISTO] ("));
    assert!(tables.contains("create trigger [TRG_CUSTOMER_ORDER_INS] on [CUSTOMER_ORDER] after insert as"));
    assert!(tables.contains("create trigger [TRG_CUSTOMER_ORDER_UPD] on [CUSTOMER_ORDER] after update as"));
    assert!(tables.contains("[CUS_LAST_EXPORT]"));
    assert!(tables.contains(") on [DATA]\ngo\n"));
    assert!(!tables.contains("foreign key"));

    let unique_keys = read(dir.path(), &config.output.unique_key_script);
    assert!(unique_keys.contains("alter table [CUSTOMER] add constraint [UK_CUSTOMER_CUS_EMAIL] unique ([CUS_EMAIL])"));

    let indexes = read(dir.path(), &config.output.index_script);
    assert!(indexes.contains("create index [IDX_ORDER_LINE_PRD_ID] on [ORDER_LINE] ([PRD_ID]) on [INDEX]"));
    assert!(indexes.contains("create index [IDX_ORDER_LINE_OLI_LINE_NUMBER] on [ORDER_LINE] ([OLI_LINE_NUMBER])"));
    assert!(indexes.contains(
        "alter table [ORDER_LINE] add constraint [FK_ORDER_LINE_PRD_ID] foreign key ([PRD_ID]) references [PRODUCT] ([PRD_ID])"
    ));

    let types = read(dir.path(), &config.output.type_script);
    assert!(types.contains("create type [CATEGORY_TABLE_TYPE] as table ("));

    let data = read(dir.path(), &config.output.init_script);
    let status = data.find("insert into [ORDER_STATUS]").unwrap();
    let category = data.find("insert into [CATEGORY]").unwrap();
    assert!(status < category);
    assert!(data.contains("'PENDING'"));
    assert!(!data.contains("identity_insert"));

    let translations = read(dir.path(), &config.output.translation_script);
    assert!(translations.contains(
        "insert into [TRANSLATION_REFERENCE] ([RESOURCE_KEY], [LANG_CODE], [LABEL]) \
         select 'Category' + '.' + cast([CAT_ID] as varchar(50)), 'fr', 'Livres' from [CATEGORY] where [CAT_CODE] = 'BOOK'"
    ));
    assert_eq!(translations.matches("insert into").count(), 4);
}

#[test]
fn oracle_scripts_use_sequences_and_fit_identifier_limit() {
    let (config, graph) = project();
    let generator = generator(&config, DialectConfig::Oracle);

    let mut sink = DiagnosticSink::new();
    assert_eq!(generator.check_identifiers(&graph, &mut sink), 0, "{:?}", sink.diagnostics());

    let mut scripts = ScriptSet::in_memory(&config.application, "/").unwrap();
    generator.generate(&graph, &mut scripts).unwrap();

    let tables = scripts.schema.create.contents();
    assert!(tables.contains("create sequence SEQ_CATEGORY start with 1000 cache 20\n/\n"));
    assert!(tables.contains("create or replace trigger TRG_CUSTOMER_ORDER_INS after insert on CUSTOMER_ORDER for each row"));
    assert!(tables.contains(") tablespace DATA"));
    assert!(!tables.contains("identity"));
    assert!(!tables.contains("SEQ_ORDER_STATUS"));

    let types = scripts.schema.types.contents();
    assert!(types.contains("create or replace type CUSTOMER_ORDER_TAB as table of CUSTOMER_ORDER_OBJ"));

    let data = scripts.init.data.contents();
    assert!(data.contains("SEQ_CATEGORY.nextval"));

    let translations = scripts.init.translations.contents();
    assert!(translations.contains("'Category' || '.' || to_char(CAT_ID), 'en', 'Music' from CATEGORY where CAT_CODE = 'MUSIC'"));
}
