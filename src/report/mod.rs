//! Typed view-models for the analysis report.
//!
//! The backend's `/process` payload is only loosely schematized, so the report
//! is modeled as an ordered list of optional sections. Each section either
//! extracted cleanly or is absent; rendering never deals with raw JSON.

mod interpret;

pub use interpret::interpret;

/// Renderable sections extracted from one analysis result, in display order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    pub sections: Vec<Section>,
}

impl Report {
    /// Raw (unresolved) plot URLs across all sections, in render order.
    pub fn plot_urls(&self) -> Vec<&str> {
        let mut urls = Vec::new();
        for section in &self.sections {
            if let Section::Plots(plots) = section {
                if let Some(heatmap) = &plots.heatmap {
                    urls.push(heatmap.as_str());
                }
                urls.extend(plots.numeric.iter().map(|p| p.url.as_str()));
                urls.extend(plots.categorical.iter().map(|p| p.url.as_str()));
            }
        }
        urls
    }
}

/// One self-contained block of the final report.
#[derive(Clone, Debug, PartialEq)]
pub enum Section {
    MissingValues(MissingValuesSection),
    AiInsights(AiInsightsSection),
    FeatureTypes(FeatureTypesSection),
    Plots(PlotsSection),
    TopFeatures(TopFeaturesSection),
}

/// Missing-value summary from the pipeline's `missing_detected` step.
#[derive(Clone, Debug, PartialEq)]
pub struct MissingValuesSection {
    pub body: MissingValuesBody,
    /// Free-text note the pipeline attaches to the step, when present.
    pub message: Option<String>,
}

/// Either a per-column table or a raw dump of an unrecognized step shape.
#[derive(Clone, Debug, PartialEq)]
pub enum MissingValuesBody {
    /// Key/value pairs in the order the backend emitted them.
    Table(Vec<(String, String)>),
    /// Pretty-printed JSON of the whole step entry.
    Raw(String),
}

/// Narrative bullets produced by the backend's language model.
#[derive(Clone, Debug, PartialEq)]
pub struct AiInsightsSection {
    pub bullets: Vec<String>,
    /// Model label for the attribution tag.
    pub model: Option<String>,
}

/// Numeric vs categorical column split from the `separate_types` step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureTypesSection {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

/// Correlation heatmap and per-feature plot images.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlotsSection {
    pub heatmap: Option<String>,
    pub numeric: Vec<CaptionedPlot>,
    pub categorical: Vec<CaptionedPlot>,
}

/// A plot URL with its generated caption.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionedPlot {
    pub url: String,
    pub caption: String,
}

/// Ranked relationship strengths between features and the target.
#[derive(Clone, Debug, PartialEq)]
pub struct TopFeaturesSection {
    pub bars: Vec<FeatureBar>,
}

/// One proportional bar in the top-features list.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureBar {
    pub name: String,
    /// Score formatted for display (3 decimals when numeric, raw otherwise).
    pub display_value: String,
    /// Bar width, 0-100.
    pub percent: u8,
}
