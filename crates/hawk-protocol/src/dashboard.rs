//! `hawk.dashboard` widgets and their typed payloads.
//!
//! The shape of a widget's `data` depends on its `type`, so widgets arrive as
//! loosely typed [`DashboardParams`] and are converted into a
//! [`DashboardWidget`] carrying a [`WidgetData`] variant that matches the
//! declared [`WidgetType`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use time::OffsetDateTime;

use crate::validation::{ValidationError, require_finite, require_text};

/// Kind of dashboard widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WidgetType {
    /// Named services with a status each.
    StatusGrid,
    /// One or more plotted series.
    MetricChart,
    /// Headers and rows.
    Table,
    /// A block of text.
    Text,
    /// A single value within a range.
    Gauge,
    /// Bucketed counts.
    Histogram,
}

/// Grid placement of a widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetLayout {
    /// Grid row.
    #[serde(default)]
    pub row: u16,
    /// Grid column.
    #[serde(default)]
    pub col: u16,
    /// Width in grid cells.
    #[serde(default)]
    pub width: u16,
    /// Height in grid cells.
    #[serde(default)]
    pub height: u16,
}

/// One cell of a status grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusGridItem {
    /// Status label, for example `healthy`.
    pub status: String,
    /// Last observed response time, preformatted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<String>,
    /// Free-form detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// When the status was last checked.
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_checked: Option<OffsetDateTime>,
    /// Arbitrary producer metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// One plotted point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Timestamp or category.
    pub x: Value,
    /// Value.
    pub y: f64,
}

/// A named series of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Series name.
    pub name: String,
    /// Points in plotting order.
    #[serde(default)]
    pub data: Vec<ChartPoint>,
    /// Display colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Rendering style, for example `line` or `bar`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// Payload of a `metric_chart` widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// Plotted series.
    pub series: Vec<ChartSeries>,
    /// Renderer options.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
}

/// Payload of a `table` widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    /// Column headers.
    pub headers: Vec<String>,
    /// Rows of cells.
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
    /// Renderer options.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
}

/// Payload of a `text` widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextData {
    /// Text body.
    pub content: String,
    /// Markup format, for example `plain` or `markdown`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// A coloured range on a gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeZone {
    /// Zone start.
    pub min: f64,
    /// Zone end.
    pub max: f64,
    /// Display colour.
    pub color: String,
    /// Optional zone label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

const fn default_gauge_max() -> f64 {
    100.0
}

/// Payload of a `gauge` widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeData {
    /// Current reading.
    pub value: f64,
    /// Scale start; defaults to `0`.
    #[serde(default)]
    pub min: f64,
    /// Scale end; defaults to `100`.
    #[serde(default = "default_gauge_max")]
    pub max: f64,
    /// Display unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Coloured ranges.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<GaugeZone>,
}

/// One histogram bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Bucket start.
    pub min: f64,
    /// Bucket end.
    pub max: f64,
    /// Observations in the bucket.
    pub count: u64,
}

/// Payload of a `histogram` widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramData {
    /// Buckets in ascending order.
    pub buckets: Vec<HistogramBucket>,
    /// Renderer options.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
}

/// Typed widget payload; the variant always matches the widget type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WidgetData {
    /// Status grid cells keyed by service name.
    StatusGrid(BTreeMap<String, StatusGridItem>),
    /// Chart series.
    Chart(ChartData),
    /// Table contents.
    Table(TableData),
    /// Text block.
    Text(TextData),
    /// Gauge reading.
    Gauge(GaugeData),
    /// Histogram buckets.
    Histogram(HistogramData),
}

impl WidgetData {
    /// Decodes a raw payload according to the widget type.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Invalid`] on field `data` when the payload
    /// does not have the shape the widget type requires.
    pub fn decode(kind: WidgetType, data: Value) -> Result<Self, ValidationError> {
        let decoded = match kind {
            WidgetType::StatusGrid => serde_json::from_value(data).map(Self::StatusGrid),
            WidgetType::MetricChart => serde_json::from_value(data).map(Self::Chart),
            WidgetType::Table => serde_json::from_value(data).map(Self::Table),
            WidgetType::Text => serde_json::from_value(data).map(Self::Text),
            WidgetType::Gauge => serde_json::from_value(data).map(Self::Gauge),
            WidgetType::Histogram => serde_json::from_value(data).map(Self::Histogram),
        }
        .map_err(|error| ValidationError::invalid("data", format!("{kind} payload: {error}")))?;
        decoded.validate()?;
        Ok(decoded)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::StatusGrid(_) | Self::Text(_) => Ok(()),
            Self::Chart(chart) => chart
                .series
                .iter()
                .flat_map(|series| &series.data)
                .try_for_each(|point| require_finite("data", point.y)),
            Self::Table(table) => {
                let width = table.headers.len();
                if table.rows.iter().any(|row| row.len() != width) {
                    return Err(ValidationError::invalid(
                        "data",
                        "every table row must have one cell per header",
                    ));
                }
                Ok(())
            }
            Self::Gauge(gauge) => {
                for value in [gauge.value, gauge.min, gauge.max] {
                    require_finite("data", value)?;
                }
                ordered_range(gauge.min, gauge.max)
            }
            Self::Histogram(histogram) => histogram
                .buckets
                .iter()
                .try_for_each(|bucket| ordered_range(bucket.min, bucket.max)),
        }
    }
}

fn ordered_range(min: f64, max: f64) -> Result<(), ValidationError> {
    if min > max {
        return Err(ValidationError::invalid("data", "range minimum exceeds maximum"));
    }
    Ok(())
}

/// Raw `hawk.dashboard` params as they appear on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardParams {
    /// Unique widget key.
    #[serde(default)]
    pub widget_id: Option<String>,
    /// Widget type name.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Display title.
    #[serde(default)]
    pub title: Option<String>,
    /// Payload, shaped by `type`.
    #[serde(default)]
    pub data: Option<Value>,
    /// Grid placement.
    #[serde(default)]
    pub layout: Option<WidgetLayout>,
    /// Renderer options.
    #[serde(default)]
    pub config: Option<Map<String, Value>>,
}

/// A validated dashboard widget, keyed by `widget_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DashboardParams")]
pub struct DashboardWidget {
    /// Unique widget key.
    pub widget_id: String,
    /// Widget type.
    #[serde(rename = "type")]
    pub kind: WidgetType,
    /// Display title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Typed payload; `None` renders an empty widget.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<WidgetData>,
    /// Grid placement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<WidgetLayout>,
    /// Renderer options.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
}

impl DashboardWidget {
    /// Creates a widget with a payload and no layout.
    #[must_use]
    pub fn new(widget_id: impl Into<String>, kind: WidgetType, data: Option<WidgetData>) -> Self {
        Self {
            widget_id: widget_id.into(),
            kind,
            title: None,
            data,
            layout: None,
            config: Map::new(),
        }
    }
}

impl TryFrom<DashboardParams> for DashboardWidget {
    type Error = ValidationError;

    fn try_from(params: DashboardParams) -> Result<Self, Self::Error> {
        let widget_id = require_text("widget_id", params.widget_id)?;
        let kind_name = require_text("type", params.kind)?;
        let kind: WidgetType = kind_name.parse().map_err(|_| {
            ValidationError::invalid("type", format!("unknown widget type `{kind_name}`"))
        })?;
        let data = params
            .data
            .filter(|data| !data.is_null())
            .map(|data| WidgetData::decode(kind, data))
            .transpose()?;

        Ok(Self {
            widget_id,
            kind,
            title: params.title,
            data,
            layout: params.layout,
            config: params.config.unwrap_or_default(),
        })
    }
}
