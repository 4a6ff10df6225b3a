//! CLI-level errors (wraps infrastructure errors)

use std::path::PathBuf;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{} already exists (use --force to overwrite)", .0.display())]
    Exists(PathBuf),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        Self::Infra(e.into())
    }
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        Self::Infra(e.into())
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => exitcode::USAGE,
            CliError::Exists(_) => exitcode::CANTCREAT,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::Json { .. } => exitcode::DATAERR,
                InfraError::Application(ApplicationError::Config { .. }) => exitcode::CONFIG,
                InfraError::Application(ApplicationError::Domain(d)) => match d {
                    DomainError::NotFound(_) => exitcode::NOINPUT,
                    DomainError::InvalidOperation(_) | DomainError::InvalidArgument(_) => {
                        exitcode::DATAERR
                    }
                },
            },
        }
    }
}
