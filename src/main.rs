// distress-triage - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Import, mapping gate, scoring
// 4. Query (filter + sort) and report/export

use clap::{Parser, ValueEnum};
use distress_triage::app::import::{self, ImportOptions, ImportOutcome};
use distress_triage::app::state::TriageState;
use distress_triage::core::export;
use distress_triage::core::model::{FilterFacets, Field, Priority, ScoredProperty};
use distress_triage::core::query::{SortDirection, SortKey};
use distress_triage::platform::config::{self, AppConfig, PlatformPaths};
use distress_triage::util::error::{ExportError, TriageError};
use distress_triage::util::{constants, logging};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Output format for --output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

/// distress-triage - score commercial property listings for distress signals.
///
/// Reads a CSV/TSV listing export, auto-maps its columns, parses prices,
/// scores every listing 0-100 and prints or exports the filtered result.
#[derive(Parser, Debug)]
#[command(name = "distress-triage", version, about)]
struct Cli {
    /// Listing export to score (.csv, .tsv or .txt).
    input: PathBuf,

    /// Manual column mapping, e.g. --map description="Ad Copy". Repeatable.
    #[arg(short = 'm', long = "map", value_name = "FIELD=HEADER")]
    map: Vec<String>,

    /// Process even when too few columns are recognised.
    #[arg(long)]
    force: bool,

    /// Print the column mapping before the results.
    #[arg(long)]
    show_mapping: bool,

    /// Case-insensitive text search (address, suburb, type, description).
    #[arg(short = 's', long)]
    search: Option<String>,

    /// Only these priorities (low, monitor, high). Repeatable.
    #[arg(short = 'p', long = "priority")]
    priorities: Vec<Priority>,

    /// Only these property types. Repeatable.
    #[arg(short = 't', long = "type")]
    property_types: Vec<String>,

    /// Only these suburbs. Repeatable.
    #[arg(long = "suburb")]
    suburbs: Vec<String>,

    #[arg(long)]
    min_price: Option<i64>,

    #[arg(long)]
    max_price: Option<i64>,

    /// Minimum total score.
    #[arg(long, default_value_t = 0)]
    min_score: u32,

    #[arg(long)]
    min_dom: Option<i64>,

    #[arg(long)]
    max_dom: Option<i64>,

    /// Sort key: score, distress, dom-score, vacancy, price, dom, priority,
    /// address, suburb, type, agency.
    #[arg(long, default_value = "score")]
    sort: SortKey,

    /// Sort ascending (default is descending).
    #[arg(long)]
    asc: bool,

    /// Sort descending.
    #[arg(long, conflicts_with = "asc")]
    desc: bool,

    /// Show at most this many rows in the printed table.
    #[arg(short = 'n', long, default_value_t = 25)]
    limit: usize,

    /// Write the filtered results to this file. A directory gets the default
    /// dated file name.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Export format (defaults to the output file's extension, else csv).
    #[arg(short = 'f', long, value_enum)]
    format: Option<OutputFormat>,

    /// Config file (defaults to the platform config directory).
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Config comes first so its [logging] section can shape the subscriber.
    let (app_config, config_warnings) = match load_app_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );
    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "distress-triage starting"
    );
    for w in &config_warnings {
        tracing::warn!("{}", w);
        eprintln!("Warning: {w}");
    }

    if let Err(e) = run(&cli, &app_config) {
        tracing::error!(error = %e, "Run failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_app_config(cli: &Cli) -> Result<(AppConfig, Vec<String>), TriageError> {
    match cli.config {
        Some(ref path) => Ok(config::load_explicit_config(path)?),
        None => Ok(config::load_config(&PlatformPaths::resolve().config_file())),
    }
}

fn run(cli: &Cli, app_config: &AppConfig) -> Result<(), TriageError> {
    let options = ImportOptions {
        overrides: cli.map.clone(),
        force: cli.force,
        min_mapped_fields: app_config.min_mapped_fields,
        pipeline: app_config.pipeline.clone(),
    };
    let outcome = import::import_file(&cli.input, &options)?;

    for w in &outcome.warnings {
        eprintln!("Warning: {w}");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if cli.show_mapping {
        print_mapping(&mut out, &outcome).map_err(stdout_error)?;
    }

    let mut state = TriageState::new(outcome.properties);
    let facets = state.facets();

    state.filter.search = cli.search.clone().unwrap_or_default();
    state.filter.priorities = cli.priorities.iter().copied().collect();
    state.filter.property_types = resolve_choices(&cli.property_types, &facets.property_types, "type");
    state.filter.suburbs = resolve_choices(&cli.suburbs, &facets.suburbs, "suburb");
    state.filter.set_price_range(cli.min_price, cli.max_price)?;
    state.filter.set_dom_range(cli.min_dom, cli.max_dom)?;
    state.filter.min_score = cli.min_score;
    state.sort_key = cli.sort;
    state.sort_direction = if cli.asc && !cli.desc {
        SortDirection::Ascending
    } else {
        SortDirection::Descending
    };
    state.apply_query();

    print_report(&mut out, &state, &facets, cli.limit).map_err(stdout_error)?;

    if let Some(ref output) = cli.output {
        let path = resolve_output_path(output, cli.format);
        let format = cli.format.unwrap_or_else(|| format_from_path(&path));
        let rows = state.visible_cloned();
        if rows.len() > app_config.large_export_threshold {
            tracing::warn!(rows = rows.len(), "Large export");
        }
        let written = write_export(&rows, &path, format)?;
        tracing::info!(path = %path.display(), rows = written, "Export written");
        writeln!(out, "\nExported {written} listing(s) to {}", path.display())
            .map_err(stdout_error)?;
    }

    Ok(())
}

/// Match user-typed multi-select values against the values present in the
/// data, case-insensitively. Unknown values are kept verbatim (they simply
/// match nothing) and logged.
fn resolve_choices(wanted: &[String], available: &[String], what: &str) -> HashSet<String> {
    wanted
        .iter()
        .map(|w| {
            available
                .iter()
                .find(|a| a.eq_ignore_ascii_case(w.trim()))
                .cloned()
                .unwrap_or_else(|| {
                    tracing::warn!(value = %w, kind = what, "Filter value not present in data");
                    w.clone()
                })
        })
        .collect()
}

fn resolve_output_path(output: &Path, format: Option<OutputFormat>) -> PathBuf {
    if output.is_dir() {
        let ext = match format {
            Some(OutputFormat::Json) => "json",
            _ => "csv",
        };
        let today = chrono::Local::now().date_naive();
        output.join(export::default_file_name(today, ext))
    } else {
        output.to_path_buf()
    }
}

fn format_from_path(path: &Path) -> OutputFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
        _ => OutputFormat::Csv,
    }
}

fn write_export(rows: &[ScoredProperty], path: &Path, format: OutputFormat) -> Result<usize, ExportError> {
    let file = File::create(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let writer = BufWriter::new(file);
    match format {
        OutputFormat::Csv => export::export_csv(rows, writer, path),
        OutputFormat::Json => export::export_json(rows, writer, path),
    }
}

fn stdout_error(e: std::io::Error) -> ExportError {
    ExportError::Io {
        path: PathBuf::from("<stdout>"),
        source: e,
    }
}

fn print_mapping(out: &mut impl Write, outcome: &ImportOutcome) -> std::io::Result<()> {
    writeln!(
        out,
        "Column mapping for {} ({} of {} fields auto-mapped):",
        outcome.path.display(),
        outcome.auto_mapped,
        Field::all().len()
    )?;
    for field in Field::all() {
        let header = outcome.columns.get(*field).unwrap_or("-");
        writeln!(out, "  {:<14} {:<16} {header}", field.key(), field.label())?;
    }
    let used: HashSet<&str> = outcome.columns.iter().map(|(_, h)| h).collect();
    let unused: Vec<&str> = outcome
        .headers
        .iter()
        .map(String::as_str)
        .filter(|h| !used.contains(h))
        .collect();
    if !unused.is_empty() {
        writeln!(out, "  Unused columns: {}", unused.join(", "))?;
    }
    writeln!(out)
}

fn print_report(
    out: &mut impl Write,
    state: &TriageState,
    facets: &FilterFacets,
    limit: usize,
) -> std::io::Result<()> {
    let summary = state.summary();
    writeln!(
        out,
        "{} of {} listing(s) | High Priority: {} | Monitor: {} | Low: {} | avg score {:.1}",
        summary.total,
        state.properties().len(),
        summary.high_priority,
        summary.monitor,
        summary.low,
        summary.average_score
    )?;
    if let Some(avg) = summary.average_price {
        writeln!(out, "Average asking price: {} ({} priced)", format_price(Some(avg)), summary.priced)?;
    }
    writeln!(
        out,
        "{} property type(s), {} suburb(s) in file\n",
        facets.property_types.len(),
        facets.suburbs.len()
    )?;

    writeln!(
        out,
        "{:>5}  {:<13}  {:>12}  {:>5}  {:<18}  {:<32}  Signals",
        "Score", "Priority", "Price", "DOM", "Suburb", "Address"
    )?;
    for p in state.visible().take(limit) {
        writeln!(
            out,
            "{:>5}  {:<13}  {:>12}  {:>5}  {:<18}  {:<32}  {}",
            p.score,
            p.priority.label(),
            format_price(p.asking_price),
            p.days_on_market.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
            truncate(&p.suburb, 18),
            truncate(&p.address, 32),
            p.matched_keywords.join(constants::KEYWORD_SEPARATOR)
        )?;
    }
    if state.visible_count() > limit {
        writeln!(out, "... {} more (raise --limit or use --output)", state.visible_count() - limit)?;
    }
    Ok(())
}

fn format_price(price: Option<i64>) -> String {
    let Some(value) = price else {
        return "-".to_string();
    };
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
