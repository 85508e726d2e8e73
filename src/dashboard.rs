use log::{debug, error, info, warn};

use feedback_tally::mapper::DropReason;
use feedback_tally::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::{Args, Command};
use crate::dashboard::charts::build_summary_js;
use crate::dashboard::config_reader::*;
use crate::dashboard::ingest::*;
use crate::dashboard::kv_store::*;
use crate::dashboard::state::*;
use crate::dashboard::table::*;

pub mod charts;
pub mod config_reader;
pub mod ingest;
mod io_common;
mod io_csv;
mod io_xlsx;
pub mod kv_store;
pub mod state;
pub mod table;

#[derive(Debug, Snafu)]
pub enum DashboardError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading CSV data from {path}"))]
    CsvParse { source: csv::Error, path: String },
    #[snafu(display("Error writing CSV data"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Error opening spreadsheet {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Spreadsheet {path} has no usable worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Error reading key {key} from the store"))]
    StoreRead {
        source: std::io::Error,
        key: String,
    },
    #[snafu(display("Error writing key {key} to the store"))]
    StoreWrite {
        source: std::io::Error,
        key: String,
    },
    #[snafu(display("Error removing key {key} from the store"))]
    StoreRemove {
        source: std::io::Error,
        key: String,
    },
    #[snafu(display("Error serializing collection {key}"))]
    SerializingCollection {
        source: serde_json::Error,
        key: String,
    },
    #[snafu(display("Error opening JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Unknown collection {name:?} (expected technical, clinic or growth)"))]
    UnknownCollection { name: String },
    #[snafu(display("Unknown column {id:?}"))]
    UnknownColumn { id: String },
    #[snafu(display("Chart {id} has an invalid list of categories"))]
    InvalidChart { source: TallyErrors, id: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashboardResult<T> = Result<T, DashboardError>;

/// The three collections, held together.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Collections {
    pub technical: Vec<TechnicalFeedback>,
    pub clinic: Vec<ClinicWorkEnvironment>,
    pub growth: Vec<GrowthFeedback>,
}

impl Collections {
    pub fn push(&mut self, triple: FeedbackTriple) {
        self.technical.push(triple.technical);
        self.clinic.push(triple.clinic);
        self.growth.push(triple.growth);
    }

    /// Appends the records of `other` after the current ones.
    pub fn append(&mut self, other: &mut Collections) {
        self.technical.append(&mut other.technical);
        self.clinic.append(&mut other.clinic);
        self.growth.append(&mut other.growth);
    }

    pub fn is_empty(&self) -> bool {
        self.technical.is_empty() && self.clinic.is_empty() && self.growth.is_empty()
    }
}

/// The application root: owns the durable store, the reactive state and the configuration.
pub struct Dashboard<S: KeyValueStore> {
    pub store: S,
    pub state: FeedbackStore,
    pub config: DashboardConfig,
}

impl<S: KeyValueStore> Dashboard<S> {
    pub fn new(store: S, config: DashboardConfig) -> Dashboard<S> {
        Dashboard {
            store,
            state: FeedbackStore::new(),
            config,
        }
    }

    fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            excel_worksheet_name: self.config.excel_worksheet_name.clone(),
        }
    }

    /// Loads the persisted collections, seeding the default dataset on first use.
    ///
    /// A store that was cleared stays empty.
    pub fn open(&mut self) -> DashboardResult<()> {
        fetch_all(&self.store, &mut self.state)?;
        let snap = self.state.snapshot();
        let empty = snap.technical.is_empty() && snap.clinic.is_empty() && snap.growth.is_empty();
        if empty && !is_initialized(&self.store)? {
            info!("No data in store, initializing from the default dataset");
            let default_source = self.default_source();
            let options = self.ingest_options();
            load_defaults(&mut self.store, &mut self.state, &default_source, &options)?;
        }
        Ok(())
    }

    fn default_source(&self) -> FeedbackSource {
        match &self.config.default_dataset {
            Some(p) => FeedbackSource::File(PathBuf::from(p)),
            None => FeedbackSource::embedded_default(),
        }
    }

    pub fn upload(&mut self, files: &[String], replace: bool) -> DashboardResult<IngestReport> {
        let paths: Vec<PathBuf> = files.iter().map(PathBuf::from).collect();
        self.state.dispatch(Action::AddSelectedFiles(paths));
        let sources: Vec<FeedbackSource> = self
            .state
            .snapshot()
            .selected_files
            .iter()
            .cloned()
            .map(FeedbackSource::File)
            .collect();
        let options = self.ingest_options();
        if replace || self.config.replace_on_upload.unwrap_or(false) {
            ingest_replacing(&mut self.store, &mut self.state, &sources, &options)
        } else {
            Ok(ingest(&mut self.store, &mut self.state, &sources, &options))
        }
    }
}

fn open_dashboard(args: &Args) -> DashboardResult<Dashboard<FileStore>> {
    let config = match &args.config {
        Some(p) => read_config(p)?,
        None => DashboardConfig::default(),
    };
    let store_dir = args
        .store
        .clone()
        .unwrap_or_else(|| config.store_directory());
    info!("Using store directory {:?}", store_dir);
    let store = FileStore::open(store_dir)?;
    Ok(Dashboard::new(store, config))
}

pub fn run(args: &Args) -> DashboardResult<()> {
    let mut dashboard = open_dashboard(args)?;
    match &args.command {
        Command::Upload { files, replace } => run_upload(&mut dashboard, files, *replace),
        Command::LoadDefaults => {
            let default_source = dashboard.default_source();
            let options = dashboard.ingest_options();
            let c = load_defaults(
                &mut dashboard.store,
                &mut dashboard.state,
                &default_source,
                &options,
            )?;
            println!("Loaded {} default feedback records.", c.technical.len());
            Ok(())
        }
        Command::Clear => {
            clear(&mut dashboard.store, &mut dashboard.state)?;
            println!("Cleared all feedback collections.");
            Ok(())
        }
        Command::Stats => {
            dashboard.open()?;
            let data = dashboard.state.dashboard_data();
            println!("{}: {}", CollectionKind::Technical.title(), data.total_technical_records);
            println!("{}: {}", CollectionKind::Clinic.title(), data.total_clinic_records);
            println!("{}: {}", CollectionKind::Growth.title(), data.total_growth_records);
            println!("Total: {}", data.total_records);
            Ok(())
        }
        Command::Summary { out, reference } => {
            dashboard.open()?;
            run_summary(&dashboard, out.clone(), reference.clone())
        }
        Command::Table {
            collection,
            search,
            sort,
            desc,
            page,
            page_size,
            export,
        } => {
            dashboard.open()?;
            let kind = CollectionKind::from_name(collection).context(UnknownCollectionSnafu {
                name: collection.clone(),
            })?;
            let opts = TableOptions {
                search: search.clone(),
                sort: sort.clone(),
                desc: *desc,
                page: page.unwrap_or(1),
                page_size: page_size.unwrap_or_else(|| dashboard.config.page_size()),
                export: export.clone(),
            };
            run_table(&dashboard, kind, &opts)
        }
    }
}

fn run_upload<S: KeyValueStore>(
    dashboard: &mut Dashboard<S>,
    files: &[String],
    replace: bool,
) -> DashboardResult<()> {
    let progress = dashboard.state.subscribe();
    let report = dashboard.upload(files, replace)?;
    for snap in progress.try_iter() {
        if snap.is_loading {
            debug!("run_upload: progress {:.0}%", snap.upload_progress);
        }
    }
    for f in report.files.iter() {
        match &f.error {
            None => println!("{}: Loaded {} feedback records.", f.name, f.records),
            Some(e) => println!("{}: failed: {}", f.name, e),
        }
    }
    for (reason, count) in report.drop_reasons.iter() {
        warn!("Skipped {} rows: {}", count, reason);
    }
    info!(
        "Added {} records, the collections now hold {} records",
        report.records(),
        dashboard.state.dashboard_data().total_technical_records
    );
    if let Some(failed) = report.failed_file() {
        whatever!("Processing stopped at {}", failed.name)
    }
    Ok(())
}

fn run_summary<S: KeyValueStore>(
    dashboard: &Dashboard<S>,
    out: Option<String>,
    reference: Option<String>,
) -> DashboardResult<()> {
    let snap = dashboard.state.snapshot();
    let result_js = build_summary_js(&dashboard.config, &snap)?;
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    let out_path = out.or_else(|| {
        dashboard
            .config
            .output_settings
            .as_ref()
            .and_then(|os| os.output_path.clone())
    });
    match out_path.as_deref() {
        None | Some("stdout") => println!("{}", pretty_js_stats),
        Some(p) => {
            info!("Writing summary to {:?}", p);
            fs::write(p, &pretty_js_stats).context(OpeningFileSnafu { path: p })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = reference {
        let summary_ref = read_summary(&summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }
    Ok(())
}

/// Display options of the `table` command.
#[derive(Debug, Clone)]
pub struct TableOptions {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub desc: bool,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
    pub export: Option<String>,
}

fn show_table<T>(view: &mut TableView<T>, opts: &TableOptions) -> DashboardResult<()> {
    if let Some(s) = &opts.search {
        view.set_global_filter(s);
    }
    if let Some(col) = &opts.sort {
        view.set_sorting(col, opts.desc)?;
    } else if opts.desc {
        view.toggle_descending();
    }
    view.set_page_size(opts.page_size);
    view.set_page_index(opts.page.saturating_sub(1));
    println!("{}", view.render_page());
    if let Some(p) = &opts.export {
        let csv_content = view.export_csv()?;
        fs::write(p, csv_content).context(OpeningFileSnafu { path: p.clone() })?;
        info!("Exported {} rows to {:?}", view.filtered_rows().len(), p);
    }
    Ok(())
}

fn run_table<S: KeyValueStore>(
    dashboard: &Dashboard<S>,
    kind: CollectionKind,
    opts: &TableOptions,
) -> DashboardResult<()> {
    let snap = dashboard.state.snapshot();
    match kind {
        CollectionKind::Technical => {
            show_table(&mut TableView::new(kind, technical_columns(), &snap.technical), opts)
        }
        CollectionKind::Clinic => {
            show_table(&mut TableView::new(kind, clinic_columns(), &snap.clinic), opts)
        }
        CollectionKind::Growth => {
            show_table(&mut TableView::new(kind, growth_columns(), &snap.growth), opts)
        }
    }
}
