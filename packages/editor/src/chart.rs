//! # Chart Data Normalizer
//!
//! Canonical chart schema plus the adapters that produce it.
//!
//! ## Sources
//!
//! - **Defaults**: deterministic sample data per chart type, used when a
//!   chart is created without data
//! - **Canonical**: `{ type, title, labels, datasets }`, colors filled in
//!   by palette index where missing
//! - **Legacy**: point-oriented `series[]` + `data[]` input, folded into
//!   one dataset per series
//!
//! Whatever the source, a chart never normalizes to an empty payload: if
//! no labels or no datasets resolve, the type's default data is used.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::ChartType;

/// Fixed palette, indexed by dataset (or pie segment) order
pub const CHART_PALETTE: [&str; 8] = [
    "#4f46e5", "#f59e0b", "#10b981", "#ef4444", "#8b5cf6", "#06b6d4", "#ec4899", "#84cc16",
];

pub fn palette_color(index: usize) -> &'static str {
    CHART_PALETTE[index % CHART_PALETTE.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesVariant {
    #[default]
    Column,
    Line,
    Area,
    Segment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub data: Vec<f64>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub variant: SeriesVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_colors: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.datasets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacySeries {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyPoint {
    pub label: String,
    #[serde(default)]
    pub values: BTreeMap<String, f64>,
}

/// Point-oriented chart input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyChartInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub series: Vec<LegacySeries>,
    #[serde(default)]
    pub data: Vec<LegacyPoint>,
}

/// Any chart payload the normalizer accepts
#[derive(Debug, Clone, PartialEq)]
pub enum ChartInput {
    Canonical(ChartData),
    Legacy(LegacyChartInput),
}

fn dataset(
    id: &str,
    label: &str,
    data: &[f64],
    index: usize,
    variant: SeriesVariant,
) -> Dataset {
    Dataset {
        id: id.to_string(),
        label: label.to_string(),
        data: data.to_vec(),
        color: palette_color(index).to_string(),
        variant,
        segment_colors: None,
    }
}

fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Deterministic sample data for a new chart
pub fn default_chart_data(chart_type: ChartType) -> ChartData {
    match chart_type {
        ChartType::Bar => ChartData {
            chart_type,
            title: "Quarterly Results".to_string(),
            labels: labels(&["Q1", "Q2", "Q3", "Q4"]),
            datasets: vec![
                dataset("series-1", "Series 1", &[12.0, 19.0, 15.0, 22.0], 0, SeriesVariant::Column),
                dataset("series-2", "Series 2", &[8.0, 14.0, 18.0, 16.0], 1, SeriesVariant::Column),
                dataset("series-3", "Series 3", &[5.0, 9.0, 11.0, 14.0], 2, SeriesVariant::Column),
            ],
        },
        ChartType::Area => ChartData {
            chart_type,
            title: "Monthly Trend".to_string(),
            labels: labels(&["Jan", "Feb", "Mar", "Apr", "May", "Jun"]),
            datasets: vec![
                dataset("series-1", "Visitors", &[30.0, 42.0, 38.0, 55.0, 61.0, 70.0], 0, SeriesVariant::Area),
                dataset("series-2", "Signups", &[10.0, 14.0, 13.0, 21.0, 25.0, 31.0], 1, SeriesVariant::Area),
            ],
        },
        ChartType::Pie => {
            let segments = ["Product A", "Product B", "Product C", "Product D"];
            let mut ds = dataset("series-1", "Share", &[35.0, 25.0, 22.0, 18.0], 0, SeriesVariant::Segment);
            ds.segment_colors = Some(
                (0..segments.len()).map(|i| palette_color(i).to_string()).collect(),
            );
            ChartData {
                chart_type,
                title: "Market Share".to_string(),
                labels: labels(&segments),
                datasets: vec![ds],
            }
        }
        ChartType::Combo => ChartData {
            chart_type,
            title: "Revenue vs Growth".to_string(),
            labels: labels(&["Q1", "Q2", "Q3", "Q4"]),
            datasets: vec![
                dataset("series-1", "Revenue", &[120.0, 150.0, 170.0, 210.0], 0, SeriesVariant::Column),
                dataset("series-2", "Growth", &[5.0, 25.0, 13.0, 24.0], 1, SeriesVariant::Line),
            ],
        },
        ChartType::Line => ChartData {
            chart_type,
            title: "Weekly Activity".to_string(),
            labels: labels(&["Mon", "Tue", "Wed", "Thu", "Fri"]),
            datasets: vec![
                dataset("series-1", "This week", &[4.0, 7.0, 6.0, 9.0, 8.0], 0, SeriesVariant::Line),
                dataset("series-2", "Last week", &[3.0, 5.0, 6.0, 6.0, 7.0], 1, SeriesVariant::Line),
            ],
        },
    }
}

fn default_variant(chart_type: ChartType, index: usize) -> SeriesVariant {
    match chart_type {
        ChartType::Bar => SeriesVariant::Column,
        ChartType::Area => SeriesVariant::Area,
        ChartType::Pie => SeriesVariant::Segment,
        ChartType::Line => SeriesVariant::Line,
        ChartType::Combo if index == 0 => SeriesVariant::Column,
        ChartType::Combo => SeriesVariant::Line,
    }
}

/// Fold legacy point data into canonical datasets
pub fn adapt_legacy(chart_type: ChartType, input: &LegacyChartInput) -> ChartData {
    let labels: Vec<String> = input.data.iter().map(|point| point.label.clone()).collect();

    let datasets = input
        .series
        .iter()
        .enumerate()
        .map(|(i, series)| Dataset {
            id: series.id.clone(),
            label: series
                .label
                .clone()
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| format!("Series {}", i + 1)),
            data: input
                .data
                .iter()
                .map(|point| point.values.get(&series.id).copied().unwrap_or(0.0))
                .collect(),
            color: series
                .color
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| palette_color(i).to_string()),
            variant: default_variant(chart_type, i),
            segment_colors: None,
        })
        .collect();

    ChartData {
        chart_type,
        title: input.title.clone().unwrap_or_default(),
        labels,
        datasets,
    }
}

fn fill_colors(mut data: ChartData) -> ChartData {
    let label_count = data.labels.len();
    let is_pie = data.chart_type == ChartType::Pie;

    for (i, ds) in data.datasets.iter_mut().enumerate() {
        if ds.color.trim().is_empty() {
            ds.color = palette_color(i).to_string();
        }
        if ds.label.trim().is_empty() {
            ds.label = format!("Series {}", i + 1);
        }
        if ds.id.trim().is_empty() {
            ds.id = format!("series-{}", i + 1);
        }
        // Ragged rows are padded so every dataset has one value per label
        ds.data.resize(label_count, 0.0);

        if is_pie {
            let colors = ds.segment_colors.get_or_insert_with(Vec::new);
            for seg in 0..label_count {
                match colors.get_mut(seg) {
                    Some(color) if color.trim().is_empty() => *color = palette_color(seg).to_string(),
                    Some(_) => {}
                    None => colors.push(palette_color(seg).to_string()),
                }
            }
            colors.truncate(label_count);
        }
    }
    data
}

/// Produce a canonical, non-empty chart payload
pub fn normalize(chart_type: ChartType, input: Option<ChartInput>) -> ChartData {
    let candidate = match input {
        Some(ChartInput::Canonical(mut data)) => {
            data.chart_type = chart_type;
            data
        }
        Some(ChartInput::Legacy(legacy)) => adapt_legacy(chart_type, &legacy),
        None => return default_chart_data(chart_type),
    };

    if candidate.is_empty() {
        tracing::debug!(chart_type = chart_type.as_str(), "chart input resolved empty, using defaults");
        return default_chart_data(chart_type);
    }

    fill_colors(candidate)
}

/// Normalize arbitrary JSON (canonical or legacy shape)
///
/// An object with `series` or `data` is read as legacy input; anything else
/// is read as canonical. The caller's `chart_type` always wins over a
/// `type` key in the payload.
pub fn normalize_value(chart_type: ChartType, value: &serde_json::Value) -> ChartData {
    let Some(object) = value.as_object() else {
        tracing::warn!(chart_type = chart_type.as_str(), "chart payload is not an object, using defaults");
        return default_chart_data(chart_type);
    };

    let input = if object.contains_key("series") || object.contains_key("data") {
        serde_json::from_value::<LegacyChartInput>(value.clone()).map(ChartInput::Legacy)
    } else {
        let mut object = object.clone();
        object.insert(
            "type".to_string(),
            serde_json::Value::String(chart_type.as_str().to_string()),
        );
        serde_json::from_value::<ChartData>(serde_json::Value::Object(object)).map(ChartInput::Canonical)
    };

    match input {
        Ok(input) => normalize(chart_type, Some(input)),
        Err(e) => {
            tracing::warn!(error = %e, "unrecognized chart payload, using defaults");
            default_chart_data(chart_type)
        }
    }
}
