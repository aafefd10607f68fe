//! Workflow domain types: analysis modes, the upload summary, and the step
//! state machine.

mod state;

pub use state::{WorkflowEvent, WorkflowState, WorkflowStep};

use serde::Deserialize;

use crate::preview::PreviewTable;

/// The analysis pipelines the backend offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalysisMode {
    /// Auto charts plus human-friendly summaries.
    BusinessInsights,
    /// Benchmark common algorithms against the chosen target.
    ModelTrainer,
}

impl AnalysisMode {
    /// Every mode, in the order the UI offers them.
    pub const ALL: [AnalysisMode; 2] = [AnalysisMode::BusinessInsights, AnalysisMode::ModelTrainer];

    /// Identifier sent to the backend.
    pub fn wire_name(self) -> &'static str {
        match self {
            AnalysisMode::BusinessInsights => "business_insights",
            AnalysisMode::ModelTrainer => "model_trainer",
        }
    }

    /// Button label shown in the mode picker.
    pub fn label(self) -> &'static str {
        match self {
            AnalysisMode::BusinessInsights => "Generate Insights",
            AnalysisMode::ModelTrainer => "Train ML Models",
        }
    }

    /// One-line description under the button label.
    pub fn description(self) -> &'static str {
        match self {
            AnalysisMode::BusinessInsights => "Auto charts + human-friendly summaries.",
            AnalysisMode::ModelTrainer => "Benchmark common algorithms out of the box.",
        }
    }
}

/// Metadata and preview returned by a successful upload.
///
/// Immutable once built; the target selector consumes it as-is.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetSummary {
    /// Server-side name of the stored file, echoed back on `/process`.
    pub filename: String,
    /// Column names in the order the backend reports them.
    pub columns: Vec<String>,
    pub row_count: Option<u64>,
    column_count: Option<u64>,
    /// Structured head-of-table preview parsed from the backend blob.
    pub preview: PreviewTable,
}

#[derive(Deserialize)]
struct UploadResponse {
    filename: String,
    columns: Vec<String>,
    #[serde(default)]
    shape: Option<Vec<u64>>,
    #[serde(default)]
    rows: Option<u64>,
    #[serde(default)]
    cols: Option<u64>,
    #[serde(default)]
    preview: String,
}

impl DatasetSummary {
    /// Parse the `/upload` response body.
    ///
    /// The backend reports dimensions either as a `shape` pair or as separate
    /// `rows`/`cols` fields depending on version; both are accepted.
    pub fn from_upload_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: UploadResponse = serde_json::from_slice(body)?;
        let shape = raw.shape.unwrap_or_default();
        let row_count = raw.rows.or_else(|| shape.first().copied());
        let column_count = raw.cols.or_else(|| shape.get(1).copied());
        Ok(Self {
            filename: raw.filename,
            columns: raw.columns,
            row_count,
            column_count,
            preview: PreviewTable::parse(&raw.preview),
        })
    }

    /// Column count for display, falling back to the column list length.
    pub fn column_count(&self) -> u64 {
        self.column_count.unwrap_or(self.columns.len() as u64)
    }
}
