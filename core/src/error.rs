//! Error types for transforms and flag mapping.

use clap::parser::MatchesError;
use thiserror::Error;

use crate::types::{TransformId, ValueKind};

/// A transform could not convert its input.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Input is not one of `private`, `internal`, `public`.
    #[error("unknown visibility: {0} (expected private, internal or public)")]
    UnknownVisibility(String),

    /// Input is not one of the numeric access levels.
    #[error("unknown access level: {0} (expected 10, 20, 30, 40 or 50)")]
    UnknownAccessLevel(String),

    /// Input is not a `YYYY-MM-DD` date.
    #[error("invalid date '{input}': {source}")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Input is not a JSON array of commit actions.
    #[error("invalid commit actions: {0}")]
    InvalidCommitActions(#[from] serde_json::Error),
}

/// Errors raised while copying flag values into an options value.
///
/// [`MissingRequired`](MapError::MissingRequired),
/// [`Transform`](MapError::Transform) and
/// [`InvalidInteger`](MapError::InvalidInteger) are caused by user input.
/// The remaining variants indicate a broken command definition; see
/// [`is_configuration_defect`](MapError::is_configuration_defect).
#[derive(Debug, Error)]
pub enum MapError {
    /// A required flag was not given on the command line.
    #[error("required flag --{flag} was not provided")]
    MissingRequired { flag: String },

    /// A transform rejected the flag's value.
    #[error("invalid value for --{flag}: {source}")]
    Transform {
        flag: String,
        #[source]
        source: TransformError,
    },

    /// An element of an integer list is not a number.
    #[error("invalid value for --{flag}: '{element}' is not an integer")]
    InvalidInteger { flag: String, element: String },

    /// The field names a transform the registry does not hold.
    #[error("flag --{flag} uses transform {transform}, which is not registered")]
    TransformNotRegistered { flag: String, transform: TransformId },

    /// A value of the wrong kind reached a binding.
    #[error("flag --{flag} produced a {found} value where {expected} was expected")]
    TypeMismatch {
        flag: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// The parsed matches could not produce the declared type.
    #[error("cannot read flag --{flag}: {source}")]
    FlagRead {
        flag: String,
        #[source]
        source: MatchesError,
    },
}

impl MapError {
    /// Returns `true` for errors that a user cannot fix by changing the
    /// command line.
    pub fn is_configuration_defect(&self) -> bool {
        matches!(
            self,
            Self::TransformNotRegistered { .. } | Self::TypeMismatch { .. } | Self::FlagRead { .. }
        )
    }

    /// Name of the flag the error refers to.
    pub fn flag(&self) -> &str {
        match self {
            Self::MissingRequired { flag }
            | Self::Transform { flag, .. }
            | Self::InvalidInteger { flag, .. }
            | Self::TransformNotRegistered { flag, .. }
            | Self::TypeMismatch { flag, .. }
            | Self::FlagRead { flag, .. } => flag,
        }
    }
}
