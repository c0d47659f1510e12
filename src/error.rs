//! Top-level error type.

use thiserror::Error;

use latebind_core::{CompilationError, RegistrationError};
use latebind_runtime::LinkError;

/// Any failure surfaced through the facade.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("{}", join(.0))]
    Compilation(Vec<CompilationError>),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Link(#[from] LinkError),
}

impl Error {
    /// Compilation diagnostics, if this is a compilation failure.
    pub fn diagnostics(&self) -> &[CompilationError] {
        match self {
            Error::Compilation(errors) => errors,
            _ => &[],
        }
    }
}

impl From<Vec<CompilationError>> for Error {
    fn from(errors: Vec<CompilationError>) -> Self {
        Error::Compilation(errors)
    }
}

impl From<CompilationError> for Error {
    fn from(error: CompilationError) -> Self {
        Error::Compilation(vec![error])
    }
}

fn join(errors: &[CompilationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, Error>;
