//! Ingestion engine for the Hawk terminal telemetry dashboard.
//!
//! A producer process writes JSON-RPC 2.0 envelopes to Hawk's standard
//! input. The engine frames that byte stream into JSON values, decodes and
//! validates each envelope into a typed [`hawk_protocol::Command`], applies
//! token bucket admission control, runs the registered [`MessageHandler`]
//! and folds the command into a bounded [`LiveState`] that a render loop can
//! read concurrently. Requests are answered on standard output through a
//! [`ResponseSender`]; notifications never are.
//!
//! No input may crash the engine. Unreadable units, protocol violations,
//! validation failures, rate limiting and handler failures are all
//! recovered per message and counted in [`Metrics`]. Only a failure of the
//! input stream itself ends ingestion.
//!
//! The [`Engine`] ties the pieces together and owns the start, stop and
//! drain lifecycle. The `hawk` binary wraps it with layered configuration,
//! structured telemetry and signal handling; see [`run`].

mod bootstrap;
pub mod decode;
mod dispatch;
mod engine;
mod health;
pub mod outbound;
mod process;
mod rate_limit;
mod state;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, Bootstrapped, ConfigLoader, StaticConfigLoader, SystemConfigLoader,
    bootstrap_with,
};
pub use dispatch::{
    DispatchError, Dispatcher, HandlerError, MessageHandler, Metrics, MetricsSnapshot,
    NoopMessageHandler,
};
pub use engine::{Engine, EngineConfig, EngineConfigError, LifecycleError, Phase, StopReason};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use outbound::{JsonlSender, OutboundError, ResponseSender};
pub use process::{
    RunContext, RunError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run, run_with,
};
pub use rate_limit::{Clock, RateLimited, RateLimiter, RealClock};
pub use state::{LiveState, LogFilter, MetricSample, MetricSeries, StateCapacities, StateSummary};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{FramingError, Inbound, TransportError};

#[cfg(test)]
mod tests;
