use std::path::Path;
use std::rc::Rc;

use pypi_recom::config::{self, RecomConfig};
use pypi_recom::graph::{GraphLoader, GraphStore, LoadOutcome, MemoryGraph, TigerGraphClient};
use pypi_recom::pipeline::{GraphStatus, RunReport};
use pypi_recom::ui::{self, Icons, ProgressManager, TableBuilder};
use pypi_recom::{LocalStore, PackageSource, Pipeline, PypiClient, SearchContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Human }
    }

    pub fn is_human(&self) -> bool {
        *self == OutputMode::Human
    }
}

fn emit_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn context_from(phrase: &[String]) -> anyhow::Result<SearchContext> {
    let context = SearchContext::from_phrase(&phrase.join(" "));
    if context.is_empty() {
        anyhow::bail!("search phrase '{}' contains only stopwords", phrase.join(" "));
    }
    Ok(context)
}

fn client(config: &RecomConfig) -> anyhow::Result<PypiClient> {
    Ok(PypiClient::new(config.index_host.as_str(), config.http_timeout_secs)?)
}

fn dry_run_graph(config: &RecomConfig) -> MemoryGraph {
    let mut graph = MemoryGraph::new();
    graph.install_summary_query(&config.graph.query);
    graph
}

pub fn run_init(path: Option<&Path>, force: bool, mode: OutputMode) -> anyhow::Result<()> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config::default_config_path);
    config::write_config(&path, &RecomConfig::default(), force)?;
    if mode.is_human() {
        ui::done(&format!("Wrote {}", path.display()));
        ui::field(
            Icons::INFO,
            "Next",
            &format!("set graph.host and export {}", config::SECRET_ENV),
        );
    } else {
        emit_json(&serde_json::json!({ "config": path.display().to_string() }))?;
    }
    Ok(())
}

pub fn run_context(phrase: &[String], mode: OutputMode) -> anyhow::Result<()> {
    let context = SearchContext::from_phrase(&phrase.join(" "));
    if mode.is_human() {
        ui::field(Icons::SEARCH, "Context", context.as_str());
        ui::field(Icons::FOLDER, "Directory", &context.dir_name());
    } else {
        emit_json(&serde_json::json!({
            "context": context.as_str(),
            "directory": context.dir_name(),
        }))?;
    }
    Ok(())
}

pub fn run_scrape(
    config: &RecomConfig,
    phrase: &[String],
    pages: Option<u32>,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let context = context_from(phrase)?;
    let pages = pages.unwrap_or(config.pages);
    let names = client(config)?.search(&context, pages)?;

    if mode.is_human() {
        ui::banner(&format!("{} packages for '{}' ({} pages)", names.len(), context, pages));
        for name in &names {
            ui::package(name);
        }
    } else {
        emit_json(&names)?;
    }
    Ok(())
}

pub fn run_fetch(config: &RecomConfig, package: &str, mode: OutputMode) -> anyhow::Result<()> {
    let record = client(config)?.package_metadata(package)?;
    if mode.is_human() {
        let mut table = TableBuilder::new();
        table.add_row("Name", &record.name);
        table.add_row("Author", &record.author);
        table.add_row("Email", &record.author_email);
        table.add_row("License", &record.license);
        table.add_row("Status", &record.dev_status);
        table.add_row("Languages", join(&record.languages));
        table.add_row("Dependencies", join(&record.dependencies));
        println!("{}", table.build());
    } else {
        emit_json(&record)?;
    }
    Ok(())
}

fn join(values: &std::collections::BTreeSet<String>) -> String {
    values.iter().cloned().collect::<Vec<_>>().join(", ")
}

pub fn run_pipeline(
    config: &RecomConfig,
    phrase: &[String],
    pages: Option<u32>,
    dry_run: bool,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let context = context_from(phrase)?;
    let store = LocalStore::new(&config.library_root);
    let progress = Rc::new(ProgressManager::new());

    let mut pipeline = Pipeline::new(client(config)?, store)
        .with_pages(pages.unwrap_or(config.pages))
        .with_load_options(config.graph.load_options());
    if mode.is_human() {
        ui::banner(&format!("Building package graph for '{}'", context));
        ui::field(Icons::FOLDER, "Library", &config.library_root.display().to_string());
        let sink = Rc::clone(&progress);
        pipeline = pipeline.with_observer(move |msg| sink.handle(msg));
    }

    let report = if dry_run {
        pipeline.run(&context, || Ok(dry_run_graph(config)))?
    } else {
        pipeline.run(&context, || {
            TigerGraphClient::connect(&config.graph, config.http_timeout_secs)
        })?
    };

    if mode.is_human() {
        let edges = match &report.graph {
            GraphStatus::Loaded(outcome) => outcome.upserted_edges,
            _ => 0,
        };
        progress.finish_with_summary(report.succeeded.len(), edges);
        print_report(&report);
    } else {
        emit_json(&report)?;
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    ui::section("Run Summary");
    let mut table = TableBuilder::new();
    table.add_row("Context", &report.context);
    table.add_row("Directory", &report.directory);
    table.add_row("Requested", report.requested.len());
    table.add_row("Staged", report.succeeded.len());
    table.add_row("Skipped", report.failed.len());
    println!("{}", table.build());

    if !report.failed.is_empty() {
        ui::section("Skipped Packages");
        println!("{}", ui::failures_table(&report.failed));
    }
    if let Some(err) = &report.directory_error {
        ui::caution(&format!("Run directory: {}", err));
    }
    match &report.graph {
        GraphStatus::Loaded(outcome) => print_outcome(outcome),
        GraphStatus::Failed { reason } => ui::failed(&format!("Graph generation failed: {}", reason)),
        GraphStatus::Skipped => ui::caution("Graph generation skipped"),
    }
}

fn print_outcome(outcome: &LoadOutcome) {
    ui::done(&format!(
        "Graph generated: {}",
        ui::graph_counts(outcome.upserted_vertices, outcome.upserted_edges, outcome.deleted_vertices)
    ));
}

pub fn run_load(
    config: &RecomConfig,
    phrase: &[String],
    dry_run: bool,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let context = context_from(phrase)?;
    let store = LocalStore::new(&config.library_root);

    let outcome = if dry_run {
        load_tables(&mut dry_run_graph(config), &store, config, &context)?
    } else {
        let mut graph = TigerGraphClient::connect(&config.graph, config.http_timeout_secs)?;
        load_tables(&mut graph, &store, config, &context)?
    };

    if mode.is_human() {
        print_outcome(&outcome);
        let snapshot = store.run_dir(&context).join(pypi_recom::store::tables::SNAPSHOT_FILE);
        ui::field(Icons::GRAPH, "Snapshot", &snapshot.display().to_string());
    } else {
        emit_json(&outcome)?;
    }
    Ok(())
}

fn load_tables<G: GraphStore>(
    graph: &mut G,
    store: &LocalStore,
    config: &RecomConfig,
    context: &SearchContext,
) -> anyhow::Result<LoadOutcome> {
    let mut loader = GraphLoader::new(graph, store, config.graph.load_options());
    Ok(loader.load_tables(context)?)
}

pub fn run_graph(config: &RecomConfig, phrase: &[String]) -> anyhow::Result<()> {
    let context = context_from(phrase)?;
    let snapshot = LocalStore::new(&config.library_root).read_snapshot(&context)?;
    emit_json(&snapshot)
}

pub fn run_index(config: &RecomConfig, mode: OutputMode) -> anyhow::Result<()> {
    let entries = LocalStore::new(&config.library_root).list_index()?;
    if mode.is_human() {
        if entries.is_empty() {
            println!("{}", ui::muted("No search contexts processed yet."));
        }
        for entry in &entries {
            println!("  {} {}", Icons::DATABASE, entry);
        }
    } else {
        emit_json(&entries)?;
    }
    Ok(())
}
