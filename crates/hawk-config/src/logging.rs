use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    Json,
    /// Human-readable single line output.
    #[default]
    Compact,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("COMPACT", LogFormat::Compact)]
    fn parses_case_insensitively(#[case] input: &str, #[case] expected: LogFormat) {
        assert_eq!(input.parse::<LogFormat>().ok(), Some(expected));
    }

    #[rstest]
    fn rejects_unknown_format() {
        assert!("pretty".parse::<LogFormat>().is_err());
    }
}
