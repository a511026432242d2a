use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkdir::WalkDir;

use modelc_check::{CheckOptions, InitListChecker, ModelChecker};
use modelc_core::{Category, Config, DiagnosticSink, ModelFileConfig, ModelFormat, Report};
use modelc_ddl::{dialect_for, GeneratorOptions, SchemaGenerator, ScriptSet};
use modelc_model::{Graph, InitMap, ModelReader, ReaderOptions};

/// modelc - compile object models into SQL schema scripts
#[derive(Parser)]
#[command(name = "modelc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: modelc.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the models and initializers
    Check {
        /// Output file for report.json
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Also output markdown report
        #[arg(short, long)]
        markdown: Option<PathBuf>,
    },

    /// Validate, then write the SQL scripts
    Generate {
        /// Script directory (default: output.directory of the config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Print the fingerprint of the model graph
    Fingerprint,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("modelc.toml").exists() {
        Config::from_file(Path::new("modelc.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    if cli.verbose {
        eprintln!("{} dialect: {:?}", "Using".cyan(), config.dialect);
    }

    match cli.command {
        Commands::Check { output, markdown } => {
            check_command(&config, &output, markdown.as_deref(), cli.verbose)
        }
        Commands::Generate { output_dir } => {
            generate_command(&config, output_dir.as_deref(), cli.verbose)
        }
        Commands::Fingerprint => fingerprint_command(&config, cli.verbose),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

/// Models and initializers of a project, read but not yet checked
struct Project {
    graph: Graph,
    init: InitMap,
    sink: DiagnosticSink,
    models_read: usize,
}

/// A checked project
struct Analysis {
    project: Project,
    generator: SchemaGenerator,
    classes_checked: usize,
}

impl Analysis {
    fn report(&self, config: &Config) -> Report {
        Report::from_diagnostics(self.project.sink.diagnostics().to_vec())
            .with_counts(self.project.models_read, self.classes_checked)
            .with_metadata(serde_json::json!({
                "application": config.application,
                "dialect": self.generator.dialect().name(),
                "fingerprint": self.project.graph.fingerprint(),
            }))
    }
}

/// List the model files under `model_dir` when the config names none
///
/// Files listed as shared domains are left out. Paths stay relative to the
/// project root so `Config::resolve` finds them again.
fn with_discovered_models(config: &Config) -> Result<Config> {
    let mut config = config.clone();
    if !config.models.is_empty() {
        return Ok(config);
    }

    let root = config.resolve(&config.model_dir);
    let domain_files: HashSet<PathBuf> = config.domains.iter().map(|d| config.resolve(&d.path)).collect();

    let mut models = Vec::new();
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to scan {}", root.display()))?;
        let path = entry.path();

        if !entry.file_type().is_file() || ModelFormat::from_path(path).is_none() || domain_files.contains(path) {
            continue;
        }

        let relative = path.strip_prefix(&config.project_root).unwrap_or(path);
        models.push(ModelFileConfig {
            path: relative.to_path_buf(),
            format: None,
        });
    }

    config.models = models;
    Ok(config)
}

fn read_project(config: &Config, verbose: bool) -> Result<Project> {
    let config = with_discovered_models(config)?;
    if config.models.is_empty() {
        anyhow::bail!(
            "No model files found under {}",
            config.resolve(&config.model_dir).display()
        );
    }

    if verbose {
        eprintln!("{} {} model file(s)...", "Reading".cyan(), config.models.len());
    }

    let mut sink = DiagnosticSink::with_threshold(config.severity.clone());
    let mut graph = ModelReader::new(ReaderOptions::from_config(&config))
        .read_config(&config, &mut sink)
        .context("Failed to read the models")?;

    let init = match &config.init {
        Some(path) => {
            let path = config.resolve(path);
            InitMap::from_file(&path)
                .with_context(|| format!("Failed to load initializers from {}", path.display()))?
        }
        None => InitMap::new(),
    };

    let folded = graph.fold_init(&init);
    if verbose {
        eprintln!("{} {} initializer batch(es)", "Folded".cyan(), folded);
    }

    Ok(Project {
        graph,
        init,
        sink,
        models_read: config.models.len(),
    })
}

fn analyze(config: &Config, verbose: bool) -> Result<Analysis> {
    let mut project = read_project(config, verbose)?;

    if verbose {
        eprintln!("{}", "Checking models and initializers...".cyan());
    }

    let options = CheckOptions::from_config(config);
    let stats = ModelChecker::new(&project.graph, &options).run(&mut project.sink);
    InitListChecker::check(&project.graph, &project.init, &mut project.sink);

    let generator = SchemaGenerator::new(dialect_for(config.dialect), GeneratorOptions::from_config(config));
    let overflows = generator.check_identifiers(&project.graph, &mut project.sink);
    if verbose && overflows > 0 {
        eprintln!(
            "{} {} identifier(s) exceed the {} limit",
            "Found".yellow(),
            overflows,
            generator.dialect().name()
        );
    }

    Ok(Analysis {
        project,
        generator,
        classes_checked: stats.classes,
    })
}

/// Check command - validate models, write the report
fn check_command(config: &Config, output: &Path, markdown: Option<&Path>, verbose: bool) -> Result<()> {
    let analysis = analyze(config, verbose)?;
    let report = analysis.report(config);

    report
        .save_to_file(output)
        .with_context(|| format!("Failed to write report to {}", output.display()))?;
    eprintln!("{} {}", "Report written to".green(), output.display());

    if let Some(md_path) = markdown {
        std::fs::write(md_path, generate_markdown_report(&report))
            .with_context(|| format!("Failed to write markdown report to {}", md_path.display()))?;
        eprintln!("{} {}", "Markdown report written to".green(), md_path.display());
    }

    print_report_summary(&report);

    if report.has_blocking() {
        std::process::exit(1);
    }

    Ok(())
}

/// Generate command - validate models, then write the six scripts
fn generate_command(config: &Config, output_dir: Option<&Path>, verbose: bool) -> Result<()> {
    let analysis = analyze(config, verbose)?;
    let report = analysis.report(config);
    print_report_summary(&report);

    if report.has_blocking() {
        eprintln!(
            "{}",
            "Warning: blocking diagnostics found, the generated scripts should not be deployed"
                .yellow()
                .bold()
        );
    }

    let directory = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.resolve(&config.output.directory));

    if verbose {
        eprintln!("{} {}", "Writing scripts to".cyan(), directory.display());
    }

    let generator = &analysis.generator;
    let mut scripts = ScriptSet::create_in(
        &directory,
        &config.output,
        &config.application,
        generator.dialect().batch_separator(),
    )
    .with_context(|| format!("Failed to create scripts in {}", directory.display()))?;

    generator
        .generate(&analysis.project.graph, &mut scripts)
        .context("Script generation failed")?;

    eprintln!("{} {}", "Scripts written to".green(), directory.display());
    Ok(())
}

/// Fingerprint command - print the SHA-256 of the folded graph
fn fingerprint_command(config: &Config, verbose: bool) -> Result<()> {
    let project = read_project(config, verbose)?;

    if verbose && !project.sink.is_empty() {
        eprintln!(
            "{} {} diagnostic(s) while reading",
            "Found".yellow(),
            project.sink.len()
        );
    }

    println!("{}", project.graph.fingerprint());
    Ok(())
}

fn category_label(category: Category) -> colored::ColoredString {
    match category {
        Category::Fatal => "FATAL".red().bold(),
        Category::Bug => "BUG".red(),
        Category::CodeStyle => "STYLE".yellow(),
        Category::Doc => "DOC".cyan(),
    }
}

fn count(value: usize, blocking: bool) -> colored::ColoredString {
    let text = value.to_string();
    match (value, blocking) {
        (0, _) => text.green(),
        (_, true) => text.red().bold(),
        (_, false) => text.yellow(),
    }
}

fn print_report_summary(report: &Report) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Model Check Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Version: {}", report.version);
    println!("Timestamp: {}", report.timestamp);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Models read:       {}", report.summary.models_read);
    println!("  Classes checked:   {}", report.summary.classes_checked);
    println!("  Total diagnostics: {}", report.summary.total);
    println!("  Fatal:      {}", count(report.summary.fatal, true));
    println!("  Bugs:       {}", count(report.summary.bugs, true));
    println!("  Code style: {}", count(report.summary.code_style, false));
    println!("  Doc:        {}", count(report.summary.doc, false));
    println!();

    if report.diagnostics.is_empty() {
        println!("{}", "✓ No issues found!".green().bold());
    } else {
        println!("{}", "Diagnostics:".bold());
        for diag in &report.diagnostics {
            println!("  [{}] {}: {}", category_label(diag.category), diag.code, diag.message);

            if let Some(loc) = &diag.location {
                println!("    at {}", loc.file);
            }

            if let Some(exp) = &diag.expected {
                println!("    Expected: {}", exp);
            }
            if let Some(act) = &diag.actual {
                println!("    Actual:   {}", act);
            }

            if !diag.related.is_empty() {
                println!("    Related: {}", diag.related.join(", "));
            }
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

fn generate_markdown_report(report: &Report) -> String {
    let mut md = String::new();

    md.push_str("# Model Check Report\n\n");
    md.push_str(&format!("**Version:** {}\n\n", report.version));
    md.push_str(&format!("**Timestamp:** {}\n\n", report.timestamp));

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- Models read: {}\n", report.summary.models_read));
    md.push_str(&format!("- Classes checked: {}\n", report.summary.classes_checked));
    md.push_str(&format!("- Total diagnostics: {}\n", report.summary.total));
    md.push_str(&format!("- Fatal: {}\n", report.summary.fatal));
    md.push_str(&format!("- Bugs: {}\n", report.summary.bugs));
    md.push_str(&format!("- Code style: {}\n", report.summary.code_style));
    md.push_str(&format!("- Doc: {}\n", report.summary.doc));
    md.push('\n');

    if report.diagnostics.is_empty() {
        md.push_str("✅ **No issues found!**\n");
    } else {
        md.push_str("## Diagnostics\n\n");

        for diag in &report.diagnostics {
            let emoji = match diag.category {
                Category::Fatal => "🛑",
                Category::Bug => "❌",
                Category::CodeStyle => "⚠️",
                Category::Doc => "ℹ️",
            };

            md.push_str(&format!("### {} {} - {}\n\n", emoji, diag.category, diag.code));
            md.push_str(&format!("{}\n\n", diag.message));

            if let Some(loc) = &diag.location {
                md.push_str(&format!("**Location:** {}\n\n", loc.file));
            }

            if let Some(exp) = &diag.expected {
                md.push_str(&format!("**Expected:** `{}`\n\n", exp));
            }
            if let Some(act) = &diag.actual {
                md.push_str(&format!("**Actual:** `{}`\n\n", act));
            }

            if !diag.related.is_empty() {
                md.push_str("**Related:**\n\n");
                for element in &diag.related {
                    md.push_str(&format!("- {}\n", element));
                }
                md.push('\n');
            }
        }
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelc_core::{Diagnostic, DiagnosticCode};
    use pretty_assertions::assert_eq;

    fn fixture_config() -> Config {
        Config::from_file(Path::new("../../fixtures/shop/modelc.toml")).unwrap()
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn discovery_skips_domain_files() {
        let mut config = fixture_config();
        config.models.clear();

        let discovered = with_discovered_models(&config).unwrap();
        let paths: Vec<PathBuf> = discovered.models.iter().map(|m| m.path.clone()).collect();

        assert_eq!(
            paths,
            vec![PathBuf::from("model/Catalog.xmi"), PathBuf::from("model/Shop.oom")]
        );
    }

    #[test]
    fn fixture_analysis_is_clean() {
        let config = fixture_config();
        let analysis = analyze(&config, false).unwrap();
        let report = analysis.report(&config);

        assert!(!report.has_blocking());
        assert_eq!(report.summary.total, 0);
        assert_eq!(report.summary.models_read, 2);
        assert_eq!(report.summary.classes_checked, 7);

        let metadata = report.metadata.unwrap();
        assert_eq!(metadata["dialect"], "sqlserver");
        assert_eq!(metadata["fingerprint"], analysis.project.graph.fingerprint());
    }

    #[test]
    fn markdown_lists_diagnostics() {
        let report = Report::from_diagnostics(vec![Diagnostic::new(
            DiagnosticCode::ClassDuplicateTrigram,
            "Trigram PRD is used by both Product and Production",
        )
        .in_file("model/Catalog.xmi")
        .with_related(vec!["Product".to_string(), "Production".to_string()])]);

        let md = generate_markdown_report(&report);
        assert!(md.contains("## Diagnostics"));
        assert!(md.contains("CLASS_DUPLICATE_TRIGRAM"));
        assert!(md.contains("**Location:** model/Catalog.xmi"));
        assert!(md.contains("- Production\n"));
        assert!(md.contains("- Bugs: 1\n"));
    }
}
