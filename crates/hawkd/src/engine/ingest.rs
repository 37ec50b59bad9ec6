//! The ingestion loop: drains framed units and dispatches them in order.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use tracing::error;

use super::ENGINE_TARGET;
use crate::dispatch::Dispatcher;
use crate::rate_limit::Clock;
use crate::transport::Inbound;

/// Upper bound on how long the loop goes without checking for cancellation.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Why the ingestion loop exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The producer closed its end of the stream.
    EndOfInput,
    /// `stop` was requested.
    Cancelled,
    /// Reading the stream failed.
    InputFailed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EndOfInput => "end_of_input",
            Self::Cancelled => "cancelled",
            Self::InputFailed => "input_failed",
        })
    }
}

pub(crate) fn run<C: Clock>(
    dispatcher: &Dispatcher<C>,
    inbound: &Receiver<Inbound>,
    cancel: &AtomicBool,
) -> StopReason {
    loop {
        if cancel.load(Ordering::SeqCst) {
            return StopReason::Cancelled;
        }
        match inbound.recv_timeout(POLL_INTERVAL) {
            Ok(Inbound::Unit(unit)) => dispatcher.dispatch_unit(unit),
            Ok(Inbound::Framing(framing)) => dispatcher.record_framing(&framing),
            Ok(Inbound::End) => return StopReason::EndOfInput,
            Ok(Inbound::Failed(failure)) => {
                error!(target: ENGINE_TARGET, error = %failure, "input stream failed");
                return StopReason::InputFailed;
            }
            Err(RecvTimeoutError::Timeout) => {}
            // The reader only hangs up without a final event once cancelled.
            Err(RecvTimeoutError::Disconnected) => return StopReason::Cancelled,
        }
    }
}
