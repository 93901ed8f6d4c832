//! Stable machine-readable codes for rank spec diagnostics.

use serde::Serialize;

/// Category of a [`RankSpecError`](super::errors::RankSpecError).
///
/// Serialized in `snake_case`; the strings are part of the JSON output and
/// must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A value has the right type but is not acceptable (e.g. NaN).
    InvalidValue,
    /// A numeric value is outside its accepted range.
    OutOfRange,
    /// A field is not part of the schema.
    UnknownField,
    /// Two settings cannot be used together.
    InvalidCombo,
    /// Catch-all for custom rules.
    ValidationFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidValue => "invalid_value",
            Self::OutOfRange => "out_of_range",
            Self::UnknownField => "unknown_field",
            Self::InvalidCombo => "invalid_combo",
            Self::ValidationFailed => "validation_failed",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
