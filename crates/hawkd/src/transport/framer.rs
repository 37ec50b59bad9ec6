//! Incremental splitter for concatenated JSON values.
//!
//! Line breaks do not delimit messages: a value may span several lines and a
//! line may hold several values. The framer tracks bracket depth together
//! with string and escape state to find where each top-level object or array
//! ends, without parsing it.

use super::FramingError;

/// Output of the framer for one unit of input.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Frame {
    /// Raw bytes of one complete top-level value.
    Unit(Vec<u8>),
    /// Input that was skipped.
    Error(FramingError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Between values; whitespace is skipped.
    Idle,
    /// Inside a value.
    Value,
    /// Inside an oversized value; bytes are scanned but not kept.
    Skip,
    /// Dropping input up to the next line break.
    Discard,
}

/// Effect of one byte on the bracket and string state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    /// The value is still open.
    Open,
    /// The byte closed the top-level value.
    Closed,
    /// A raw line break appeared inside a string.
    BrokenString,
}

#[derive(Debug)]
pub(crate) struct Framer {
    max_size: usize,
    mode: Mode,
    buffer: Vec<u8>,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl Framer {
    pub(crate) fn new(max_size: usize) -> Self {
        Self {
            max_size,
            mode: Mode::Idle,
            buffer: Vec::new(),
            depth: 0,
            in_string: false,
            escaped: false,
        }
    }

    /// Feeds a chunk of input, appending every completed frame to `out`.
    pub(crate) fn push(&mut self, input: &[u8], out: &mut Vec<Frame>) {
        for &byte in input {
            match self.mode {
                Mode::Idle => self.start(byte, out),
                Mode::Value => self.advance(byte, out),
                Mode::Skip => self.skip(byte),
                Mode::Discard => {
                    if byte == b'\n' {
                        self.mode = Mode::Idle;
                    }
                }
            }
        }
    }

    /// Flushes state at end of input.
    ///
    /// Returns an error when a value was still open. An oversized value cut
    /// short has already been reported.
    pub(crate) fn finish(&mut self) -> Option<FramingError> {
        let pending = self.buffer.len();
        let was_open = self.mode == Mode::Value;
        self.reset(Mode::Idle);
        was_open.then_some(FramingError::Truncated { pending })
    }

    fn start(&mut self, byte: u8, out: &mut Vec<Frame>) {
        match byte {
            b' ' | b'\t' | b'\r' | b'\n' => {}
            b'{' | b'[' => {
                self.mode = Mode::Value;
                self.depth = 1;
                self.buffer.push(byte);
            }
            _ => {
                out.push(Frame::Error(FramingError::Garbage { byte }));
                self.mode = Mode::Discard;
            }
        }
    }

    fn advance(&mut self, byte: u8, out: &mut Vec<Frame>) {
        match self.scan(byte) {
            Scan::Open => {
                self.buffer.push(byte);
                if self.buffer.len() > self.max_size {
                    out.push(Frame::Error(FramingError::Oversized {
                        limit: self.max_size,
                    }));
                    self.buffer = Vec::new();
                    self.mode = Mode::Skip;
                }
            }
            Scan::Closed => {
                self.buffer.push(byte);
                out.push(Frame::Unit(std::mem::take(&mut self.buffer)));
                self.reset(Mode::Idle);
            }
            Scan::BrokenString => {
                out.push(Frame::Error(FramingError::Malformed {
                    message: "unterminated string at line break".to_owned(),
                }));
                self.reset(Mode::Idle);
            }
        }
    }

    fn skip(&mut self, byte: u8) {
        match self.scan(byte) {
            Scan::Open => {}
            Scan::Closed | Scan::BrokenString => self.reset(Mode::Idle),
        }
    }

    fn scan(&mut self, byte: u8) -> Scan {
        if self.in_string {
            // Raw line breaks are illegal inside JSON strings; resynchronise
            // at the break instead of swallowing the following lines.
            if byte == b'\n' {
                return Scan::BrokenString;
            }
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.in_string = false;
            }
            return Scan::Open;
        }

        match byte {
            b'"' => self.in_string = true,
            b'{' | b'[' => self.depth += 1,
            b'}' | b']' => {
                self.depth = self.depth.saturating_sub(1);
                if self.depth == 0 {
                    return Scan::Closed;
                }
            }
            _ => {}
        }
        Scan::Open
    }

    fn reset(&mut self, mode: Mode) {
        self.mode = mode;
        self.buffer.clear();
        self.depth = 0;
        self.in_string = false;
        self.escaped = false;
    }
}
