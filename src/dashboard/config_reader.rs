use crate::dashboard::*;

pub const DEFAULT_STORE_DIRECTORY: &str = "feedback-store";
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const PAGE_SIZE_OPTIONS: [usize; 5] = [10, 20, 30, 40, 50];

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "dashboardName")]
    pub dashboard_name: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(rename = "storeDirectory")]
    pub store_directory: Option<String>,
    /// A survey export used instead of the built-in dataset when the store is empty.
    #[serde(rename = "defaultDataset")]
    pub default_dataset: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "replaceOnUpload")]
    pub replace_on_upload: Option<bool>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<usize>,
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
}

impl DashboardConfig {
    pub fn store_directory(&self) -> String {
        self.store_directory
            .clone()
            .unwrap_or_else(|| DEFAULT_STORE_DIRECTORY.to_string())
    }

    pub fn page_size(&self) -> usize {
        match self.page_size {
            Some(x) if x > 0 => x,
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    pub fn dashboard_name(&self) -> String {
        self.output_settings
            .as_ref()
            .and_then(|os| os.dashboard_name.clone())
            .unwrap_or_else(|| "Nurse Feedback Dashboard".to_string())
    }

    /// Makes the relative paths of the configuration relative to `root`.
    fn resolve_paths(mut self, root: &Path) -> DashboardConfig {
        let resolve = |p: Option<String>| -> Option<String> {
            p.map(|s| {
                if Path::new(&s).is_relative() {
                    root.join(&s).display().to_string()
                } else {
                    s
                }
            })
        };
        self.store_directory = resolve(self.store_directory);
        self.default_dataset = resolve(self.default_dataset);
        if let Some(os) = self.output_settings.as_mut() {
            os.output_path = resolve(os.output_path.take());
        }
        self
    }
}

pub fn read_config(path: &str) -> DashboardResult<DashboardConfig> {
    info!("Reading configuration {:?}", path);
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashboardConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    let root = Path::new(path).parent().unwrap_or_else(|| Path::new(""));
    Ok(config.resolve_paths(root))
}

/// Reads a reference summary, to compare against a freshly computed one.
pub fn read_summary(path: &str) -> DashboardResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_summary: {:?}", js);
    Ok(js)
}
