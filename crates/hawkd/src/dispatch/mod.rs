//! Dispatch of decoded commands.
//!
//! The [`Dispatcher`] sits between the decoder and the live state. It
//! enforces rate limiting, invokes the registered [`MessageHandler`] for each
//! command kind, records [`Metrics`] and answers requests through the
//! outbound channel.

mod errors;
mod handler;
mod metrics;
mod router;

pub use self::errors::DispatchError;
pub use self::handler::{HandlerError, MessageHandler, NoopMessageHandler};
pub use self::metrics::{Metrics, MetricsSnapshot};
pub use self::router::Dispatcher;

#[cfg(test)]
pub(crate) use self::handler::MockMessageHandler;
