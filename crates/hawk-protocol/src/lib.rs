//! Wire types for the Hawk telemetry protocol.
//!
//! Producers feed Hawk with JSON-RPC 2.0 style envelopes on standard input:
//!
//! ```json
//! {"jsonrpc":"2.0","method":"hawk.metric","params":{"name":"cpu","value":42.5}}
//! ```
//!
//! An envelope carrying an `id` is a request and receives exactly one
//! response or error response. An envelope without an `id` is a notification
//! and is never answered. A JSON array of envelopes forms a batch.
//!
//! This crate owns the envelope shapes, the six telemetry entities a producer
//! can send ([`LogEntry`], [`Metric`], [`ConfigItem`], [`ProgressTracker`],
//! [`DashboardWidget`], [`Event`]), the closed [`Command`] union over them,
//! and the notifications Hawk pushes back to the producer. Decoding untrusted
//! input into these types lives in the `hawkd` engine.

mod command;
mod config;
mod dashboard;
mod envelope;
mod event;
mod kind;
mod log;
mod metric;
mod progress;
mod server;
mod validation;

pub use command::Command;
pub use config::{ConfigItem, ConfigParams, ConfigType, ConfigValue};
pub use dashboard::{
    ChartData, ChartPoint, ChartSeries, DashboardParams, DashboardWidget, GaugeData, GaugeZone,
    HistogramBucket, HistogramData, StatusGridItem, TableData, TextData, WidgetData, WidgetLayout,
    WidgetType,
};
pub use envelope::{
    Acknowledgement, Envelope, ErrorResponse, InvalidRequestId, JSONRPC_VERSION, Notification,
    RequestId, Response, RpcError, codes,
};
pub use event::{Event, EventSeverity};
pub use kind::{CommandKind, METHOD_PREFIX};
pub use log::{LogEntry, LogLevel};
pub use metric::{Metric, MetricType};
pub use progress::{ProgressStatus, ProgressTracker};
pub use server::{
    CONFIG_UPDATE_METHOD, ConfigUpdateParams, DATA_REQUEST_METHOD, DataRequestParams,
    EXECUTE_METHOD, ExecuteParams, RequestType,
};
pub use validation::ValidationError;
