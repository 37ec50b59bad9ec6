//! Input transport: frames the producer's byte stream into JSON values.
//!
//! A dedicated thread performs blocking reads and framing and hands each
//! parsed unit to the ingestion loop over a bounded channel. Only a failure
//! of the stream itself is terminal; everything else is reported as a
//! [`FramingError`] for the offending unit.

mod errors;
mod framer;
mod reader;

pub use self::errors::{FramingError, TransportError};
pub use self::reader::Inbound;
pub(crate) use self::reader::spawn_reader;

pub(crate) const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
