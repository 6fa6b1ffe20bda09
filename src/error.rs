use thiserror::Error;

use crate::{failure::RawFailure, OsError};

#[derive(Debug, Error, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ErrorKind {

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Already exists")]
    AlreadyExists,

    #[error("Does not exist")]
    DoesNotExist,

    #[error("Is a directory")]
    IsADirectory,

    #[error("Not a directory")]
    NotADirectory,

    #[error("Directory not empty")]
    DirectoryNotEmpty,

    #[error("Stat failed")]
    StatFailed,

    #[error("Not a stream")]
    NotAStream,

    #[error("Unknown error")]
    UnknownError,

    // Raised for a failure signal that was never a soft failure; a defect, not an I/O condition.
    #[error("Not a warning")]
    NotAWarning,
}

impl ErrorKind {
    pub fn is_defect(self) -> bool { self == ErrorKind::NotAWarning }
}

/// A classified host failure.
///
/// Carries the kind picked by the classifier alongside the host's original
/// message and severity code, so nothing is lost for diagnostics.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("{kind}: {message}")]
pub struct FsError {
    kind: ErrorKind,
    message: String,
    code: i32,
    os_error: Option<i32>,
}

impl FsError {

    pub fn new(kind: ErrorKind, message: impl Into<String>, code: i32) -> Self {
        Self {
            kind,
            message: message.into(),
            code,
            os_error: None,
        }
    }

    pub(crate) fn from_failure(kind: ErrorKind, failure: RawFailure) -> Self {
        let code = failure.severity().code();
        let os_error = failure.os_error();
        Self {
            kind,
            message: failure.message().to_owned(),
            code,
            os_error,
        }
    }

    pub fn kind(&self) -> ErrorKind { self.kind }
    pub fn message(&self) -> &str { &self.message }
    pub fn code(&self) -> i32 { self.code }

    pub fn os_error(&self) -> Option<OsError> {
        self.os_error.map(OsError::from)
    }

    pub fn is(&self, kind: ErrorKind) -> bool { self.kind == kind }
}
