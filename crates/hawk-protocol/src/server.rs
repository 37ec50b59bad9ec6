//! Notifications Hawk pushes back to the producer.
//!
//! These travel on the outbound channel as JSON-RPC notifications (no `id`);
//! the producer is never expected to answer them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::ConfigValue;

/// Method announcing that a config value was changed from the dashboard.
pub const CONFIG_UPDATE_METHOD: &str = "hawk.config_update";
/// Method asking the producer to run a command.
pub const EXECUTE_METHOD: &str = "hawk.execute";
/// Method asking the producer to send data.
pub const DATA_REQUEST_METHOD: &str = "hawk.request";

/// Params of `hawk.config_update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigUpdateParams {
    /// Key of the changed item.
    pub key: String,
    /// New value.
    pub value: ConfigValue,
}

/// Params of `hawk.execute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteParams {
    /// Producer-defined command name.
    pub command: String,
    /// Command arguments.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub args: Map<String, Value>,
}

/// What a `hawk.request` asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestType {
    /// Current metric values.
    Metrics,
    /// Recent logs.
    Logs,
    /// Configuration items.
    Config,
    /// Overall status.
    Status,
}

/// Params of `hawk.request`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRequestParams {
    /// Requested data set.
    #[serde(rename = "type")]
    pub kind: RequestType,
    /// Producer-defined filter.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub filter: Map<String, Value>,
    /// Time window, for example `5m`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timerange: Option<String>,
    /// Maximum number of items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl DataRequestParams {
    /// Requests a data set with no filter, window or limit.
    #[must_use]
    pub fn new(kind: RequestType) -> Self {
        Self {
            kind,
            filter: Map::new(),
            timerange: None,
            limit: None,
        }
    }
}
