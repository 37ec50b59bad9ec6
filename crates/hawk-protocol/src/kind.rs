//! Recognised inbound methods.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Namespace shared by every Hawk method name.
pub const METHOD_PREFIX: &str = "hawk.";

/// The closed set of telemetry kinds a producer may send.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CommandKind {
    /// `hawk.log`
    Log,
    /// `hawk.metric`
    Metric,
    /// `hawk.config`
    Config,
    /// `hawk.progress`
    Progress,
    /// `hawk.dashboard`
    Dashboard,
    /// `hawk.event`
    Event,
}

impl CommandKind {
    /// Every kind, in wire-documentation order.
    pub const ALL: [Self; 6] = [
        Self::Log,
        Self::Metric,
        Self::Config,
        Self::Progress,
        Self::Dashboard,
        Self::Event,
    ];

    /// Resolves a wire method name such as `hawk.log`.
    ///
    /// Matching is exact: `hawk.Log` and `log` are not recognised.
    #[must_use]
    pub fn from_method(method: &str) -> Option<Self> {
        method.strip_prefix(METHOD_PREFIX)?.parse().ok()
    }

    /// Returns the wire method name.
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::Log => "hawk.log",
            Self::Metric => "hawk.metric",
            Self::Config => "hawk.config",
            Self::Progress => "hawk.progress",
            Self::Dashboard => "hawk.dashboard",
            Self::Event => "hawk.event",
        }
    }

    /// Returns the short kind name used in metrics and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Metric => "metric",
            Self::Config => "config",
            Self::Progress => "progress",
            Self::Dashboard => "dashboard",
            Self::Event => "event",
        }
    }

    /// Params fields that must be present and non-null for this kind.
    #[must_use]
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Log => &["message"],
            Self::Metric => &["name", "value"],
            Self::Config => &["key"],
            Self::Progress => &["id", "label"],
            Self::Dashboard => &["widget_id", "type"],
            Self::Event => &["type", "title"],
        }
    }
}
