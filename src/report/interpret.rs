//! Shape-sniffing extraction of report sections from a loose JSON payload.
//!
//! Every sub-tree of the result is optional and the backend enforces very
//! little structure, so each section is extracted independently and a failed
//! or absent extraction simply omits that section. A payload where nothing
//! matches produces an empty report, never an error.

use serde_json::Value;

use super::{
    AiInsightsSection, CaptionedPlot, FeatureBar, FeatureTypesSection, MissingValuesBody,
    MissingValuesSection, PlotsSection, Report, Section, TopFeaturesSection,
};

/// How many top-feature bars are shown at most.
const TOP_FEATURE_LIMIT: usize = 3;

/// Map an analysis result into renderable sections, best effort.
pub fn interpret(result: &Value) -> Report {
    let mut sections = Vec::new();
    if let Some(section) = missing_values(result) {
        sections.push(Section::MissingValues(section));
    }
    if let Some(section) = ai_insights(result) {
        sections.push(Section::AiInsights(section));
    }
    if let Some(section) = feature_types(result) {
        sections.push(Section::FeatureTypes(section));
    }
    if let Some(section) = plots(result) {
        sections.push(Section::Plots(section));
    }
    if let Some(section) = top_features(result) {
        sections.push(Section::TopFeatures(section));
    }
    Report { sections }
}

/// First pipeline step entry carrying the given tag.
fn find_step<'a>(result: &'a Value, tag: &str) -> Option<&'a Value> {
    result
        .get("steps")?
        .as_array()?
        .iter()
        .find(|entry| entry.get("step").and_then(Value::as_str) == Some(tag))
}

fn missing_values(result: &Value) -> Option<MissingValuesSection> {
    let entry = find_step(result, "missing_detected")?;
    let message = entry
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);
    let body = match entry.get("details") {
        Some(Value::Object(details)) => MissingValuesBody::Table(
            details
                .iter()
                .map(|(key, value)| (key.clone(), display_value(value)))
                .collect(),
        ),
        // Unrecognized step shape: show the whole entry instead of guessing.
        _ => MissingValuesBody::Raw(
            serde_json::to_string_pretty(entry).unwrap_or_else(|_| entry.to_string()),
        ),
    };
    Some(MissingValuesSection { body, message })
}

fn ai_insights(result: &Value) -> Option<AiInsightsSection> {
    let bullets = result.get("ai_insights")?.as_array()?;
    if bullets.is_empty() {
        return None;
    }
    let model = result
        .get("ai_model")
        .and_then(Value::as_str)
        .map(str::to_string);
    Some(AiInsightsSection {
        bullets: bullets.iter().map(display_value).collect(),
        model,
    })
}

fn feature_types(result: &Value) -> Option<FeatureTypesSection> {
    let entry = find_step(result, "separate_types")?;
    Some(FeatureTypesSection {
        numeric: string_list(entry.get("numeric_cols")),
        categorical: string_list(entry.get("categorical_cols")),
    })
}

fn plots(result: &Value) -> Option<PlotsSection> {
    let numeric_analysis = result.get("numeric_analysis");
    let heatmap = numeric_analysis
        .and_then(|v| v.get("corr_heatmap"))
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string);
    let numeric = plot_list(
        numeric_analysis.and_then(|v| v.get("top_feature_plots")),
        "Numeric Feature Plot",
    );
    let categorical = plot_list(
        result
            .get("categorical_analysis")
            .and_then(|v| v.get("plots")),
        "Categorical Feature Plot",
    );
    if heatmap.is_none() && numeric.is_empty() && categorical.is_empty() {
        return None;
    }
    Some(PlotsSection {
        heatmap,
        numeric,
        categorical,
    })
}

fn plot_list(value: Option<&Value>, caption_prefix: &str) -> Vec<CaptionedPlot> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let url = item.as_str().filter(|url| !url.is_empty())?;
            Some(CaptionedPlot {
                url: url.to_string(),
                // Captions number by payload position, holes included.
                caption: format!("{caption_prefix} {}", index + 1),
            })
        })
        .collect()
}

fn top_features(result: &Value) -> Option<TopFeaturesSection> {
    let entries = result
        .get("insights")?
        .get(0)?
        .get("top_features")?
        .as_array()?;
    let bars: Vec<FeatureBar> = entries
        .iter()
        .take(TOP_FEATURE_LIMIT)
        .filter_map(feature_bar)
        .collect();
    if bars.is_empty() {
        return None;
    }
    Some(TopFeaturesSection { bars })
}

fn feature_bar(entry: &Value) -> Option<FeatureBar> {
    let (name, value) = entry.as_object()?.iter().next()?;
    let (display_value, percent) = match value.as_f64() {
        Some(score) => (format!("{score:.3}"), bar_percent(score)),
        None => (display_value(value), 0),
    };
    Some(FeatureBar {
        name: name.clone(),
        display_value,
        percent,
    })
}

fn bar_percent(score: f64) -> u8 {
    (score.abs() * 100.0).round().min(100.0) as u8
}

/// Scalar-friendly display text: bare strings, compact JSON for the rest.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}
