//! In-memory stand-in for the producer's end of standard input.

use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, Sender};

/// Writing half; dropping it ends the stream.
#[derive(Debug, Clone)]
pub struct PipeWriter {
    chunks: Sender<Vec<u8>>,
}

impl PipeWriter {
    /// Queues bytes for the reader.
    pub fn write(&self, bytes: impl AsRef<[u8]>) {
        self.chunks
            .send(bytes.as_ref().to_vec())
            .expect("pipe reader dropped");
    }

    /// Queues bytes unless the reader is gone; returns whether they were queued.
    pub fn write_if_open(&self, bytes: impl AsRef<[u8]>) -> bool {
        self.chunks.send(bytes.as_ref().to_vec()).is_ok()
    }
}

/// Reading half; blocks until bytes arrive or every writer is dropped.
#[derive(Debug)]
pub struct PipeReader {
    chunks: Receiver<Vec<u8>>,
    pending: Vec<u8>,
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            match self.chunks.recv() {
                Ok(chunk) => self.pending = chunk,
                Err(_) => return Ok(0),
            }
        }
        let count = buf.len().min(self.pending.len());
        buf[..count].copy_from_slice(&self.pending[..count]);
        self.pending.drain(..count);
        Ok(count)
    }
}

/// Creates a connected writer and reader.
pub fn pipe() -> (PipeWriter, PipeReader) {
    let (chunks, receiver) = mpsc::channel();
    (
        PipeWriter { chunks },
        PipeReader {
            chunks: receiver,
            pending: Vec::new(),
        },
    )
}
