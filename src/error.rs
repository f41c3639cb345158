//! Caller-visible errors at the JSON and configuration boundary.
//!
//! Everything past the boundary degrades instead of failing; see
//! [`LayoutDiagnostic`](crate::LayoutDiagnostic) for those cases.

use core::fmt;

/// Error raised when input or configuration cannot be used at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// Input had the wrong top-level shape (e.g. the document is not an array).
    InvalidInput {
        /// Which input was rejected (`"document"`, `"images"`).
        input: &'static str,
        /// Human-readable reason.
        reason: Box<str>,
    },
    /// Layout or normalization options are unusable.
    InvalidConfig {
        /// Option name.
        option: &'static str,
        /// Human-readable reason.
        reason: Box<str>,
    },
}

impl LayoutError {
    /// Build an input-shape error for `input`.
    pub fn invalid_input(input: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            input,
            reason: reason.into().into_boxed_str(),
        }
    }

    /// Build a configuration error for `option`.
    pub fn invalid_config(option: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            option,
            reason: reason.into().into_boxed_str(),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { input, reason } => {
                write!(f, "invalid {} input: {}", input, reason)
            }
            Self::InvalidConfig { option, reason } => {
                write!(f, "invalid layout option {}: {}", option, reason)
            }
        }
    }
}

impl std::error::Error for LayoutError {}

impl From<url::ParseError> for LayoutError {
    fn from(value: url::ParseError) -> Self {
        Self::invalid_config("base_url", value.to_string())
    }
}
