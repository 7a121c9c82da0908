//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::chart_svg::SvgChartAdapter;
use crate::adapters::csv_adapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::app_config::{AppConfig, logging_config};
use crate::domain::chart::PriceChart;
use crate::domain::date_range::{self, ALL_DATES, RangeLabel};
use crate::domain::error::ScrapError;
use crate::domain::filter_chain::{ALL_MATERIALS, ALL_YARDS, PriceFilterChain};
use crate::domain::format::format_date;
use crate::domain::ingest::{UpdateOutcome, run_update};
use crate::domain::price_record::PriceRecord;
use crate::domain::table::{SortKey, SortOrder, render_table, sort_for_display};
use crate::ports::chart_port::ChartPort;
use crate::ports::price_source_port::PriceSource;
use crate::ports::price_store_port::PriceStore;

#[derive(Parser, Debug)]
#[command(name = "scraptrack", version, about = "Scrap metal price tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch the configured yard's page and store any new prices
    Update {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print stored prices through the yard, material and date-range filters
    Show {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long, default_value = ALL_YARDS)]
        yard: String,
        #[arg(long, default_value = ALL_MATERIALS)]
        material: String,
        #[arg(long, default_value = ALL_DATES)]
        range: String,
        #[arg(long, value_enum)]
        sort: Option<SortField>,
        #[arg(long)]
        ascending: bool,
        /// Also write the shown rows to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// List yards with stored prices
    Yards {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List materials with stored prices
    Materials {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show record count and stored date span
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Write a price history chart for one material
    Plot {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        material: String,
        /// Defaults to the configured source yard
        #[arg(long)]
        yard: Option<String>,
        #[arg(long, default_value = ALL_DATES)]
        range: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the date-range labels accepted by --range
    Ranges,
    /// Load records from a CSV export
    Import {
        #[arg(short, long)]
        config: PathBuf,
        path: PathBuf,
    },
    /// Delete every stored record
    Reset {
        #[arg(short, long)]
        config: PathBuf,
        /// Required; reset cannot be undone
        #[arg(long)]
        yes: bool,
    },
    /// Validate the configuration and print the resolved settings
    Check {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Yard,
    Material,
    Date,
}

impl From<SortField> for SortKey {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Yard => SortKey::Yard,
            SortField::Material => SortKey::Material,
            SortField::Date => SortKey::Date,
        }
    }
}

/// Filter and sort choices for `show`.
#[derive(Debug, Clone)]
pub struct ShowRequest {
    pub yard: String,
    pub material: String,
    pub range: String,
    pub sort: Option<(SortKey, SortOrder)>,
}

impl Default for ShowRequest {
    fn default() -> Self {
        Self {
            yard: ALL_YARDS.into(),
            material: ALL_MATERIALS.into(),
            range: ALL_DATES.into(),
            sort: None,
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Update { config } => run_update_command(&config),
        Command::Show {
            config,
            yard,
            material,
            range,
            sort,
            ascending,
            csv,
        } => {
            let order = if ascending {
                SortOrder::Ascending
            } else {
                SortOrder::Descending
            };
            let request = ShowRequest {
                yard,
                material,
                range,
                sort: sort.map(|field| (field.into(), order)),
            };
            run_show(&config, &request, csv.as_deref())
        }
        Command::Yards { config } => run_list(&config, ALL_YARDS, |s| s.list_yards()),
        Command::Materials { config } => run_list(&config, ALL_MATERIALS, |s| s.list_materials()),
        Command::Info { config } => run_info(&config),
        Command::Plot {
            config,
            material,
            yard,
            range,
            output,
        } => run_plot(&config, &material, yard.as_deref(), &range, output.as_deref()),
        Command::Ranges => {
            for label in range_labels() {
                println!("{label}");
            }
            Ok(())
        }
        Command::Import { config, path } => run_import(&config, &path),
        Command::Reset { config, yes } => run_reset(&config, yes),
        Command::Check { config } => run_check(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ScrapError> {
    FileConfigAdapter::from_file(path)
}

/// Read, start logging, then validate and build the typed config.
pub fn load_app_config(path: &Path) -> Result<AppConfig, ScrapError> {
    let adapter = load_config(path)?;
    logging_config(&adapter).init();
    tracing::debug!(origin = adapter.origin(), "loaded config");
    AppConfig::from_port(&adapter)
}

#[cfg(feature = "sqlite")]
pub fn open_store(config: &AppConfig) -> Result<Box<dyn PriceStore>, ScrapError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;

    let store = SqliteAdapter::from_config(&config.store)?;
    store.initialize_schema()?;
    Ok(Box::new(store))
}

#[cfg(not(feature = "sqlite"))]
pub fn open_store(_config: &AppConfig) -> Result<Box<dyn PriceStore>, ScrapError> {
    Err(ScrapError::Database {
        reason: "built without the sqlite feature".into(),
    })
}

#[cfg(feature = "fetch")]
fn open_source(config: &AppConfig) -> Result<Box<dyn PriceSource>, ScrapError> {
    use crate::adapters::zubicks_adapter::ZubicksAdapter;

    Ok(Box::new(ZubicksAdapter::from_config(&config.source)?))
}

#[cfg(not(feature = "fetch"))]
fn open_source(_config: &AppConfig) -> Result<Box<dyn PriceSource>, ScrapError> {
    Err(ScrapError::SourceUnavailable {
        reason: "built without the fetch feature".into(),
    })
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn run_update_command(config_path: &Path) -> Result<(), ScrapError> {
    let config = load_app_config(config_path)?;
    let store = open_store(&config)?;
    let source = open_source(&config)?;

    eprintln!("Fetching prices for {}...", config.source.yard);
    let outcome = run_update(source.as_ref(), store.as_ref(), &config.ingest)?;
    print!("{}", update_report(&outcome));
    Ok(())
}

/// User-facing summary of an update, with the stored rows when new.
pub fn update_report(outcome: &UpdateOutcome) -> String {
    match outcome {
        UpdateOutcome::NoNewData { .. } => "No price updates available.\n".to_string(),
        UpdateOutcome::Updated {
            yard,
            date,
            records,
        } => {
            let rows: Vec<&PriceRecord> = records.iter().collect();
            format!(
                "Prices updated for {yard} on {}.\n\n{}",
                format_date(*date),
                render_table(&rows)
            )
        }
    }
}

fn run_show(
    config_path: &Path,
    request: &ShowRequest,
    csv: Option<&Path>,
) -> Result<(), ScrapError> {
    let config = load_app_config(config_path)?;
    let store = open_store(&config)?;

    let chain = build_chain(store.as_ref(), request, today())?;
    let rows = show_rows(&chain, request);

    if let Some(path) = csv {
        csv_adapter::export_csv(path, &rows)?;
        eprintln!("Wrote {} rows to {}", rows.len(), path.display());
    }

    if rows.is_empty() {
        eprintln!("No prices match the current filters.");
    } else {
        print!("{}", render_table(&rows));
        eprintln!("{} of {} records shown", rows.len(), chain.records().len());
    }
    Ok(())
}

/// Load every stored record and apply the requested filters.
pub fn build_chain(
    store: &dyn PriceStore,
    request: &ShowRequest,
    today: NaiveDate,
) -> Result<PriceFilterChain, ScrapError> {
    let mut chain = PriceFilterChain::new(store.all_records()?);
    chain.set_yard_filter(&request.yard);
    chain.set_material_filter(&request.material);
    if RangeLabel::from_label(&request.range).is_none() {
        tracing::warn!(label = %request.range, "unknown date range, showing all dates");
    }
    chain.set_daterange_filter(&request.range, today)?;
    Ok(chain)
}

pub fn show_rows<'a>(chain: &'a PriceFilterChain, request: &ShowRequest) -> Vec<&'a PriceRecord> {
    let rows = chain.evaluate();
    match request.sort {
        Some((key, order)) => sort_for_display(&rows, key, order),
        None => rows,
    }
}

/// Selector values with the "All ..." sentinel first.
pub fn selection_values(sentinel: &str, values: Vec<String>) -> Vec<String> {
    std::iter::once(sentinel.to_string()).chain(values).collect()
}

fn run_list(
    config_path: &Path,
    sentinel: &str,
    list: impl Fn(&dyn PriceStore) -> Result<Vec<String>, ScrapError>,
) -> Result<(), ScrapError> {
    let config = load_app_config(config_path)?;
    let store = open_store(&config)?;

    for value in selection_values(sentinel, list(store.as_ref())?) {
        println!("{value}");
    }
    Ok(())
}

fn run_info(config_path: &Path) -> Result<(), ScrapError> {
    let config = load_app_config(config_path)?;
    let store = open_store(&config)?;
    print!("{}", info_report(store.as_ref())?);
    Ok(())
}

pub fn info_report(store: &dyn PriceStore) -> Result<String, ScrapError> {
    let count = store.count()?;
    match store.date_bounds()? {
        Some((first, last)) => Ok(format!(
            "Records:    {count}\nFirst date: {}\nLast date:  {}\n",
            format_date(first),
            format_date(last)
        )),
        None => Ok("Records:    0\nNo price data.\n".to_string()),
    }
}

fn run_plot(
    config_path: &Path,
    material: &str,
    yard: Option<&str>,
    range: &str,
    output: Option<&Path>,
) -> Result<(), ScrapError> {
    let config = load_app_config(config_path)?;
    let store = open_store(&config)?;
    let yard = yard.unwrap_or(config.source.yard.as_str());
    let output = output.unwrap_or(config.chart.output.as_path());
    let chart_port = SvgChartAdapter::from_config(&config.chart);

    let chart = run_plot_pipeline(
        store.as_ref(),
        &chart_port,
        yard,
        material,
        range,
        today(),
        output,
    )?;
    eprintln!(
        "Wrote {} price points ({}) to {}",
        chart.points.len(),
        chart.range,
        output.display()
    );
    Ok(())
}

/// Resolve the range, load one material's history and write the chart.
pub fn run_plot_pipeline(
    store: &dyn PriceStore,
    chart_port: &dyn ChartPort,
    yard: &str,
    material: &str,
    range_label: &str,
    today: NaiveDate,
    output: &Path,
) -> Result<PriceChart, ScrapError> {
    if material == ALL_MATERIALS || material.trim().is_empty() {
        return Err(ScrapError::InvalidSelection {
            reason: "select a material to plot".into(),
        });
    }

    let earliest = store.date_bounds()?.map(|(first, _)| first);
    let range = date_range::resolve(range_label, today, earliest)?;

    let mut history = store.material_history(material, range.start(), range.end())?;
    history.retain(|r| r.yard == yard);

    let chart = PriceChart::build(yard, material, range, &history)?;
    chart_port.write(&chart, output)?;
    Ok(chart)
}

pub fn range_labels() -> Vec<&'static str> {
    RangeLabel::ALL.iter().map(RangeLabel::as_str).collect()
}

fn run_import(config_path: &Path, csv_path: &Path) -> Result<(), ScrapError> {
    let config = load_app_config(config_path)?;
    let store = open_store(&config)?;
    let imported = run_import_pipeline(store.as_ref(), csv_path)?;
    println!("Imported {imported} records from {}", csv_path.display());
    Ok(())
}

pub fn run_import_pipeline(store: &dyn PriceStore, csv_path: &Path) -> Result<usize, ScrapError> {
    let records = csv_adapter::import_csv(csv_path)?;
    store.insert_records(&records)?;
    tracing::info!(path = %csv_path.display(), records = records.len(), "imported prices");
    Ok(records.len())
}

fn run_reset(config_path: &Path, confirmed: bool) -> Result<(), ScrapError> {
    if !confirmed {
        return Err(ScrapError::InvalidSelection {
            reason: "reset deletes every record; pass --yes to confirm".into(),
        });
    }
    let config = load_app_config(config_path)?;
    let store = open_store(&config)?;

    let deleted = store.count()?;
    store.reset()?;
    println!("Deleted {deleted} records.");
    Ok(())
}

fn run_check(config_path: &Path) -> Result<(), ScrapError> {
    eprintln!("Checking config {}", config_path.display());
    let config = load_app_config(config_path)?;
    print!("{}", check_report(&config));
    eprintln!("\nConfiguration is valid");
    Ok(())
}

pub fn check_report(config: &AppConfig) -> String {
    format!(
        "Store:   {} (pool {})\n\
         Source:  {} at {} (timeout {}s)\n\
         Ingest:  {} lb per net ton\n\
         Chart:   {}x{} -> {}\n\
         Logging: {} ({:?})\n",
        config.store.path.display(),
        config.store.pool_size,
        config.source.yard,
        config.source.url,
        config.source.timeout_secs,
        config.ingest.pounds_per_net_ton,
        config.chart.width,
        config.chart.height,
        config.chart.output.display(),
        config.logging.level,
        config.logging.format,
    )
}
