//! Blocking reader thread feeding framed values to the ingestion loop.

use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;
use std::thread;

use serde_json::Value;
use tracing::{debug, warn};

use super::framer::{Frame, Framer};
use super::{FramingError, TRANSPORT_TARGET, TransportError};

const READ_CHUNK: usize = 8 * 1024;

/// Event handed from the reader thread to the ingestion loop.
#[derive(Debug)]
pub enum Inbound {
    /// One parsed top-level value.
    Unit(Value),
    /// A unit that was skipped.
    Framing(FramingError),
    /// The stream ended cleanly.
    End,
    /// The stream failed and no further input will arrive.
    Failed(TransportError),
}

/// Starts the reader thread.
///
/// The thread checks `cancel` before every read and exits once it is set or
/// the receiving side hangs up. A read already in progress is allowed to
/// complete.
pub(crate) fn spawn_reader<R>(
    input: R,
    max_message_size: usize,
    cancel: Arc<AtomicBool>,
    sender: SyncSender<Inbound>,
) -> Result<thread::JoinHandle<()>, TransportError>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name("hawk-reader".to_owned())
        .spawn(move || read_loop(input, max_message_size, &cancel, &sender))
        .map_err(|source| TransportError::Spawn { source })
}

fn read_loop<R: Read>(
    mut input: R,
    max_message_size: usize,
    cancel: &AtomicBool,
    sender: &SyncSender<Inbound>,
) {
    let mut framer = Framer::new(max_message_size);
    let mut frames = Vec::new();
    let mut chunk = vec![0_u8; READ_CHUNK];

    while !cancel.load(Ordering::SeqCst) {
        let read = match input.read(&mut chunk) {
            Ok(read) => read,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                warn!(target: TRANSPORT_TARGET, error = %source, "input stream failed");
                let _ = sender.send(Inbound::Failed(TransportError::Read { source }));
                return;
            }
        };

        if read == 0 {
            if let Some(error) = framer.finish() {
                let _ = sender.send(Inbound::Framing(error));
            }
            debug!(target: TRANSPORT_TARGET, "input stream ended");
            let _ = sender.send(Inbound::End);
            return;
        }

        framer.push(chunk.get(..read).unwrap_or_default(), &mut frames);
        for frame in frames.drain(..) {
            if sender.send(into_inbound(frame)).is_err() {
                debug!(target: TRANSPORT_TARGET, "ingestion loop gone; reader exiting");
                return;
            }
        }
    }
    debug!(target: TRANSPORT_TARGET, "reader cancelled");
}

fn into_inbound(frame: Frame) -> Inbound {
    match frame {
        Frame::Unit(bytes) => match serde_json::from_slice(&bytes) {
            Ok(value) => Inbound::Unit(value),
            Err(error) => Inbound::Framing(FramingError::malformed(&error)),
        },
        Frame::Error(error) => Inbound::Framing(error),
    }
}
