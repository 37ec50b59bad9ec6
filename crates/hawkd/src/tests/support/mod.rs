//! Test doubles shared by unit and behavioural suites.

mod pipe;
mod reporter;
mod sender;

pub use pipe::{PipeWriter, pipe};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use sender::RecordingSender;

/// Strips surrounding double quotes from a step argument.
pub fn strip_quotes(value: &str) -> &str {
    value.trim_matches('"')
}
