// The in-memory state of the dashboard, observed by subscribers.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use crate::dashboard::{io_common::progress_percent, *};

/// The outcome of one processed file.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct ProcessedFile {
    pub name: String,
    pub records: usize,
    pub dropped: usize,
    /// Set when the file could not be read or stored.
    pub error: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct FeedbackSnapshot {
    pub technical: Vec<TechnicalFeedback>,
    pub clinic: Vec<ClinicWorkEnvironment>,
    pub growth: Vec<GrowthFeedback>,
    pub selected_files: Vec<PathBuf>,
    pub processed_files: Vec<ProcessedFile>,
    pub is_loading: bool,
    /// Between 0 and 100.
    pub upload_progress: f64,
}

#[derive(Debug, Clone)]
pub enum Action {
    SetSelectedFiles(Vec<PathBuf>),
    AddSelectedFiles(Vec<PathBuf>),
    /// Out of range indexes are ignored.
    RemoveSelectedFile(usize),
    ClearSelectedFiles,
    SetProcessedFiles(Vec<ProcessedFile>),
    BeginProcessing,
    Progress { completed: usize, total: usize },
    FinishProcessing,
    LoadCollections(Collections),
    ClearCollections,
}

/// The counts shown at the top of the dashboard.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub total_technical_records: usize,
    pub total_clinic_records: usize,
    pub total_growth_records: usize,
    pub total_records: usize,
}

impl DashboardData {
    pub fn from_snapshot(s: &FeedbackSnapshot) -> DashboardData {
        DashboardData {
            total_technical_records: s.technical.len(),
            total_clinic_records: s.clinic.len(),
            total_growth_records: s.growth.len(),
            total_records: s.technical.len() + s.clinic.len() + s.growth.len(),
        }
    }
}

/// Holds the current snapshot and pushes every new one to the subscribers.
pub struct FeedbackStore {
    state: Arc<FeedbackSnapshot>,
    subscribers: Vec<Sender<Arc<FeedbackSnapshot>>>,
}

impl Default for FeedbackStore {
    fn default() -> Self {
        FeedbackStore::new()
    }
}

impl FeedbackStore {
    pub fn new() -> FeedbackStore {
        FeedbackStore {
            state: Arc::new(FeedbackSnapshot::default()),
            subscribers: Vec::new(),
        }
    }

    /// Receives a snapshot after every dispatched action.
    pub fn subscribe(&mut self) -> Receiver<Arc<FeedbackSnapshot>> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn snapshot(&self) -> Arc<FeedbackSnapshot> {
        self.state.clone()
    }

    pub fn dispatch(&mut self, action: Action) {
        debug!("dispatch: {}", action_name(&action));
        let s = Arc::make_mut(&mut self.state);
        match action {
            Action::SetSelectedFiles(files) => s.selected_files = files,
            Action::AddSelectedFiles(mut files) => s.selected_files.append(&mut files),
            Action::RemoveSelectedFile(idx) => {
                if idx < s.selected_files.len() {
                    s.selected_files.remove(idx);
                }
            }
            Action::ClearSelectedFiles => s.selected_files.clear(),
            Action::SetProcessedFiles(files) => s.processed_files = files,
            Action::BeginProcessing => {
                s.is_loading = true;
                s.upload_progress = 0.0;
            }
            Action::Progress { completed, total } => {
                s.upload_progress = progress_percent(completed, total)
            }
            Action::FinishProcessing => s.is_loading = false,
            Action::LoadCollections(c) => {
                s.technical = c.technical;
                s.clinic = c.clinic;
                s.growth = c.growth;
            }
            Action::ClearCollections => {
                s.technical.clear();
                s.clinic.clear();
                s.growth.clear();
            }
        }
        let snap = self.state.clone();
        // Subscribers that went away are dropped.
        self.subscribers.retain(|tx| tx.send(snap.clone()).is_ok());
    }

    pub fn dashboard_data(&self) -> DashboardData {
        DashboardData::from_snapshot(&self.state)
    }
}

fn action_name(action: &Action) -> &'static str {
    match action {
        Action::SetSelectedFiles(_) => "SetSelectedFiles",
        Action::AddSelectedFiles(_) => "AddSelectedFiles",
        Action::RemoveSelectedFile(_) => "RemoveSelectedFile",
        Action::ClearSelectedFiles => "ClearSelectedFiles",
        Action::SetProcessedFiles(_) => "SetProcessedFiles",
        Action::BeginProcessing => "BeginProcessing",
        Action::Progress { .. } => "Progress",
        Action::FinishProcessing => "FinishProcessing",
        Action::LoadCollections(_) => "LoadCollections",
        Action::ClearCollections => "ClearCollections",
    }
}
