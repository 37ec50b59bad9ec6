//! Routes decoded messages through admission, handlers and the live state.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, error, warn};

use hawk_protocol::{Acknowledgement, Command, RequestId};

use super::errors::DispatchError;
use super::handler::{HandlerError, MessageHandler};
use super::metrics::Metrics;
use crate::decode::{DecodeLimits, DecodedMessage, DecodedUnit, decode_unit};
use crate::outbound::{OutboundError, ResponseSender};
use crate::rate_limit::{Clock, RateLimiter, RealClock};
use crate::state::LiveState;
use crate::transport::FramingError;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Applies inbound units in arrival order.
///
/// For each admitted command the dispatcher fills a missing timestamp, runs
/// the handler for its kind, applies it to the live state and, for requests,
/// sends an acknowledgement. Every failure is recovered per message: requests
/// receive an error response, notifications are only counted.
pub struct Dispatcher<C: Clock = RealClock> {
    handler: Arc<dyn MessageHandler>,
    sender: Arc<dyn ResponseSender>,
    state: Arc<LiveState>,
    metrics: Arc<Metrics>,
    limiter: RateLimiter<C>,
    limits: DecodeLimits,
}

impl<C: Clock> Dispatcher<C> {
    /// Wires a dispatcher from its collaborators.
    pub fn new(
        handler: Arc<dyn MessageHandler>,
        sender: Arc<dyn ResponseSender>,
        state: Arc<LiveState>,
        metrics: Arc<Metrics>,
        limiter: RateLimiter<C>,
        limits: DecodeLimits,
    ) -> Self {
        Self {
            handler,
            sender,
            state,
            metrics,
            limiter,
            limits,
        }
    }

    /// Decodes and processes one framed unit.
    pub fn dispatch_unit(&self, unit: Value) {
        let messages = match decode_unit(unit, self.limits) {
            DecodedUnit::Batch(messages) => {
                self.metrics.record_batch();
                messages
            }
            single @ DecodedUnit::Single(_) => single.into_messages(),
        };
        self.metrics
            .record_received(u64::try_from(messages.len()).unwrap_or(u64::MAX));
        for message in messages {
            self.dispatch_message(message);
        }
    }

    /// Accounts for a unit the transport had to skip.
    ///
    /// Such a unit carries no usable id, so it is never answered.
    pub fn record_framing(&self, error: &FramingError) {
        self.metrics.record_received(1);
        self.metrics.record_failed("framing");
        warn!(target: DISPATCH_TARGET, error = %error, "skipped unreadable input");
    }

    fn dispatch_message(&self, message: DecodedMessage) {
        let started = Instant::now();
        let DecodedMessage { id, outcome } = message;

        let mut command = match outcome {
            Ok(command) => command,
            Err(error) => return self.fail(id, &DispatchError::from(error)),
        };

        if let Err(limited) = self.limiter.try_acquire() {
            if id.is_none() {
                self.metrics.record_dropped();
                debug!(
                    target: DISPATCH_TARGET,
                    method = command.method(),
                    "rate limited notification dropped"
                );
                return;
            }
            return self.fail(id, &DispatchError::from(limited));
        }

        command.stamp(OffsetDateTime::now_utc());
        let kind = command.kind();
        if let Err(source) = self.invoke(&command) {
            return self.fail(id, &DispatchError::handler(kind, source));
        }
        self.state.apply(command);
        self.metrics.record_processed(kind, started.elapsed());

        if let Some(id) = id {
            match serde_json::to_value(Acknowledgement::processed(kind)) {
                Ok(result) => self.reply(|sender| sender.send_response(id, result)),
                Err(error) => {
                    warn!(target: DISPATCH_TARGET, %error, "failed to encode acknowledgement");
                }
            }
        }
    }

    /// Runs the handler for `command`. A panicking handler costs only the
    /// command it was given.
    fn invoke(&self, command: &Command) -> Result<(), HandlerError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.invoke_handler(command))).unwrap_or_else(
            |payload| {
                let detail = payload
                    .downcast_ref::<&str>()
                    .map(|message| (*message).to_owned())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_owned());
                error!(
                    target: DISPATCH_TARGET,
                    method = command.method(),
                    panic = %detail,
                    "handler panicked"
                );
                Err(HandlerError::new(format!("handler panicked: {detail}")))
            },
        )
    }

    fn invoke_handler(&self, command: &Command) -> Result<(), HandlerError> {
        match command {
            Command::Log(entry) => self.handler.handle_log(entry),
            Command::Metric(metric) => self.handler.handle_metric(metric),
            Command::Config(item) => self.handler.handle_config(item),
            Command::Progress(tracker) => self.handler.handle_progress(tracker),
            Command::Dashboard(widget) => self.handler.handle_dashboard(widget),
            Command::Event(event) => self.handler.handle_event(event),
        }
    }

    fn fail(&self, id: Option<RequestId>, error: &DispatchError) {
        self.metrics.record_failed(error.label());
        debug!(
            target: DISPATCH_TARGET,
            error = %error,
            kind = error.label(),
            request = id.is_some(),
            "message rejected"
        );
        if let Some(id) = id {
            self.reply(|sender| sender.send_error(id, error.to_rpc()));
        }
    }

    fn reply<F>(&self, send: F)
    where
        F: FnOnce(&dyn ResponseSender) -> Result<(), OutboundError>,
    {
        if let Err(error) = send(self.sender.as_ref()) {
            warn!(target: DISPATCH_TARGET, %error, "failed to write reply");
        }
    }
}

#[cfg(test)]
mod tests;
