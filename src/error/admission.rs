use thiserror::Error;

use crate::models::MediaType;

/// A policy decision against an upload. Expected and user-facing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("File Type Not Matched..")]
    TypeNotMatched { detected: MediaType },

    #[error("Filetype not acceptable.")]
    FiletypeNotAcceptable { extension: Option<String> },

    #[error("File size exceeds max file size.")]
    FileTooLarge { size: i64, limit: i64 },
}

impl Rejection {
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::TypeNotMatched { .. } => "FILE_TYPE_NOT_MATCHED",
            Rejection::FiletypeNotAcceptable { .. } => "FILETYPE_NOT_ACCEPTABLE",
            Rejection::FileTooLarge { .. } => "FILE_TOO_LARGE",
        }
    }
}

/// Outcome of an admission check that did not accept the upload.
#[derive(Error, Debug)]
pub enum AdmissionError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("failed to read upload stream: {0}")]
    Io(#[from] std::io::Error),
}

impl AdmissionError {
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            AdmissionError::Rejected(rejection) => Some(rejection),
            AdmissionError::Io(_) => None,
        }
    }
}
