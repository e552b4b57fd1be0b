//! CLI error type and exit codes.

use labctl_api::ApiError;
use labctl_core::{DescriptorError, MapError};
use thiserror::Error;

/// Exit code for user input and external failures.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for defects in a command definition (`EX_SOFTWARE`).
pub const EXIT_SOFTWARE: i32 = 70;

#[derive(Debug, Error)]
pub enum CliError {
    /// Flag values could not be mapped into request options.
    #[error(transparent)]
    Map(#[from] MapError),

    /// Configuration or request preparation failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A command's flags descriptor is invalid.
    #[error("invalid flags for `{command}`: {}", join(.errors))]
    Descriptor {
        command: String,
        errors: Vec<DescriptorError>,
    },

    /// Flags were individually valid but inconsistent with each other.
    #[error("{0}")]
    Usage(String),

    /// Parsed arguments could not be read back.
    #[error(transparent)]
    Args(#[from] clap::Error),

    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Map(err) if err.is_configuration_defect() => EXIT_SOFTWARE,
            Self::Descriptor { .. } | Self::Args(_) => EXIT_SOFTWARE,
            _ => EXIT_FAILURE,
        }
    }
}

fn join(errors: &[DescriptorError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
