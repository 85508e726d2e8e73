// Reading survey exports into the collections.

use feedback_tally::mapper::map_raw_row;

use crate::dashboard::{
    io_common::simplify_file_name, io_csv::read_csv_file, io_csv::read_csv_text,
    io_xlsx::read_xlsx_file, *,
};

const DEFAULT_DATASET_LABEL: &str = "default_feedback.csv";
const DEFAULT_DATASET: &str = include_str!("../../data/default_feedback.csv");

/// Where a survey export comes from.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FeedbackSource {
    /// CSV content already in memory.
    Text { label: String, text: String },
    File(PathBuf),
}

impl FeedbackSource {
    /// The built-in dataset used to seed an empty store.
    pub fn embedded_default() -> FeedbackSource {
        FeedbackSource::Text {
            label: DEFAULT_DATASET_LABEL.to_string(),
            text: DEFAULT_DATASET.to_string(),
        }
    }

    /// The name used in the reports and to derive the identities of the records.
    pub fn label(&self) -> String {
        match self {
            FeedbackSource::Text { label, .. } => label.clone(),
            FeedbackSource::File(p) => simplify_file_name(p),
        }
    }

    fn is_xlsx(&self) -> bool {
        match self {
            FeedbackSource::Text { .. } => false,
            FeedbackSource::File(p) => p
                .extension()
                .map(|e| e.to_string_lossy().eq_ignore_ascii_case("xlsx"))
                .unwrap_or(false),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct IngestOptions {
    pub excel_worksheet_name: Option<String>,
}

/// The records of one source, and what was left out.
#[derive(Debug, Clone, Default)]
struct ParsedSource {
    records: Collections,
    dropped: Vec<(DropReason, usize)>,
}

impl ParsedSource {
    fn dropped_count(&self) -> usize {
        self.dropped.iter().map(|(_, c)| c).sum()
    }
}

fn add_drop(dropped: &mut Vec<(DropReason, usize)>, reason: DropReason, count: usize) {
    match dropped.iter_mut().find(|(r, _)| *r == reason) {
        Some((_, c)) => *c += count,
        None => dropped.push((reason, count)),
    }
}

fn parse_source(source: &FeedbackSource, options: &IngestOptions) -> DashboardResult<ParsedSource> {
    let label = source.label();
    let rows = match source {
        FeedbackSource::Text { text, .. } => read_csv_text(text, &label)?,
        FeedbackSource::File(p) if source.is_xlsx() => {
            read_xlsx_file(p, &options.excel_worksheet_name)?
        }
        FeedbackSource::File(p) => read_csv_file(p)?,
    };
    let mut parsed = ParsedSource::default();
    for (lineno, row) in rows.iter() {
        match map_raw_row(row, &label, *lineno) {
            Ok(triple) => parsed.records.push(triple),
            Err(reason) => {
                debug!("parse_source: {}: line {} dropped: {}", label, lineno, reason);
                add_drop(&mut parsed.dropped, reason, 1);
            }
        }
    }
    info!(
        "{}: {} records, {} rows dropped",
        label,
        parsed.records.technical.len(),
        parsed.dropped_count()
    );
    Ok(parsed)
}

/// What happened during one call to [`ingest`].
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct IngestReport {
    pub files: Vec<ProcessedFile>,
    /// Rows dropped across all the files, by reason.
    pub drop_reasons: Vec<(DropReason, usize)>,
}

impl IngestReport {
    /// The file that stopped the batch, if any.
    pub fn failed_file(&self) -> Option<&ProcessedFile> {
        self.files.iter().find(|f| f.error.is_some())
    }

    pub fn records(&self) -> usize {
        self.files.iter().map(|f| f.records).sum()
    }
}

fn error_message(e: &DashboardError) -> String {
    let mut msg = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(s) = source {
        msg = format!("{}: {}", msg, s);
        source = std::error::Error::source(s);
    }
    msg
}

/// Merges the records of one source onto the persisted collections and stores the result.
///
/// Returns the merged collections, the number of new records and the dropped rows.
fn merge_source<S: KeyValueStore>(
    store: &mut S,
    source: &FeedbackSource,
    options: &IngestOptions,
) -> DashboardResult<(Collections, usize, Vec<(DropReason, usize)>)> {
    let mut parsed = parse_source(source, options)?;
    let added = parsed.records.technical.len();
    let mut merged = load_collections(&*store)?;
    merged.append(&mut parsed.records);
    save_collections(store, &merged)?;
    debug!(
        "merge_source: {}: stored {} records",
        source.label(),
        merged.technical.len()
    );
    Ok((merged, added, parsed.dropped))
}

/// Appends the records of the sources to the persisted collections.
///
/// The sources are processed in order. Each one is merged and stored as soon as it is
/// read. The first failure stops the batch: the files stored before it stay stored, and
/// the collections of the state are left untouched. Otherwise the merged collections are
/// published to the state.
pub fn ingest<S: KeyValueStore>(
    store: &mut S,
    state: &mut FeedbackStore,
    sources: &[FeedbackSource],
    options: &IngestOptions,
) -> IngestReport {
    let total = sources.len();
    state.dispatch(Action::BeginProcessing);
    let mut report = IngestReport::default();
    let mut merged_o: Option<Collections> = None;
    for (idx, source) in sources.iter().enumerate() {
        let name = source.label();
        info!("Processing {} ({}/{})", name, idx + 1, total);
        match merge_source(store, source, options) {
            Ok((merged, added, dropped)) => {
                report.files.push(ProcessedFile {
                    name,
                    records: added,
                    dropped: dropped.iter().map(|(_, c)| c).sum(),
                    error: None,
                });
                for (reason, count) in dropped {
                    add_drop(&mut report.drop_reasons, reason, count);
                }
                merged_o = Some(merged);
                state.dispatch(Action::Progress {
                    completed: idx + 1,
                    total,
                });
            }
            Err(e) => {
                let msg = error_message(&e);
                error!("Error processing {}: {}", name, msg);
                report.files.push(ProcessedFile {
                    name,
                    records: 0,
                    dropped: 0,
                    error: Some(msg),
                });
                break;
            }
        }
    }
    if report.failed_file().is_none() {
        if let Some(merged) = merged_o {
            state.dispatch(Action::LoadCollections(merged));
        }
    }
    state.dispatch(Action::SetProcessedFiles(report.files.clone()));
    state.dispatch(Action::ClearSelectedFiles);
    state.dispatch(Action::FinishProcessing);
    report
}

/// Clears the collections, then ingests the sources.
pub fn ingest_replacing<S: KeyValueStore>(
    store: &mut S,
    state: &mut FeedbackStore,
    sources: &[FeedbackSource],
    options: &IngestOptions,
) -> DashboardResult<IngestReport> {
    clear(store, state)?;
    Ok(ingest(store, state, sources, options))
}

/// Replaces the persisted collections with the records of the default dataset.
pub fn load_defaults<S: KeyValueStore>(
    store: &mut S,
    state: &mut FeedbackStore,
    source: &FeedbackSource,
    options: &IngestOptions,
) -> DashboardResult<Collections> {
    info!("Loading the default dataset from {}", source.label());
    let parsed = parse_source(source, options)?;
    save_collections(store, &parsed.records)?;
    state.dispatch(Action::LoadCollections(parsed.records.clone()));
    Ok(parsed.records)
}

/// Reloads the state from the persisted collections.
pub fn fetch_all<S: KeyValueStore>(store: &S, state: &mut FeedbackStore) -> DashboardResult<()> {
    let c = load_collections(store)?;
    info!(
        "Loaded data - Technical: {} Clinic: {} Growth: {}",
        c.technical.len(),
        c.clinic.len(),
        c.growth.len()
    );
    state.dispatch(Action::LoadCollections(c));
    Ok(())
}

/// Removes every record, from the store and from the state.
pub fn clear<S: KeyValueStore>(store: &mut S, state: &mut FeedbackStore) -> DashboardResult<()> {
    clear_collections(store)?;
    state.dispatch(Action::ClearCollections);
    info!("Cleared the feedback collections");
    Ok(())
}
