use std::borrow::Cow;

use once_cell::sync::Lazy;

use crate::{failure::{RawFailure, Severity}, ErrorKind, OsError};

/// Maps a raw failure to exactly one [`ErrorKind`].
///
/// Implementations must be pure: the same failure always yields the same kind.
pub trait Classifier: Send + Sync {
    fn classify(&self, failure: &RawFailure) -> ErrorKind;
}

/// Ordered `(pattern, kind)` pairs. The first pattern found in a message wins.
#[derive(Debug, Clone)]
pub struct ClassificationTable {
    entries: Vec<(Cow<'static, str>, ErrorKind)>,
}

const DEFAULT_ENTRIES: [(&str, ErrorKind); 10] = [
    ("Permission denied", ErrorKind::PermissionDenied),
    ("File exists", ErrorKind::AlreadyExists),
    ("Operation not permitted", ErrorKind::PermissionDenied),
    ("No such file or directory", ErrorKind::DoesNotExist),
    ("Is a directory", ErrorKind::IsADirectory),
    ("cannot be a directory", ErrorKind::IsADirectory),
    ("Not a directory", ErrorKind::NotADirectory),
    ("Directory not empty", ErrorKind::DirectoryNotEmpty),
    ("stat failed for", ErrorKind::StatFailed),
    ("is not a valid stream resource", ErrorKind::NotAStream),
];

static DEFAULT_TABLE: Lazy<ClassificationTable> = Lazy::new(|| {
    ClassificationTable::new(
        DEFAULT_ENTRIES
            .iter()
            .map(|(pattern, kind)| (Cow::Borrowed(*pattern), *kind))
            .collect()
    )
});

impl ClassificationTable {

    pub fn new(entries: Vec<(Cow<'static, str>, ErrorKind)>) -> Self {
        Self { entries }
    }

    /// The process-wide table used unless a [`crate::Filesystem`] is built with another classifier.
    pub fn standard() -> &'static ClassificationTable { &DEFAULT_TABLE }

    // Appended entries rank below every existing one.
    pub fn with_entry(
        mut self,
        pattern: impl Into<Cow<'static, str>>,
        kind: ErrorKind
    ) -> Self {
        self.entries.push((pattern.into(), kind));
        self
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, ErrorKind)> {
        self.entries.iter().map(|(pattern, kind)| (pattern.as_ref(), *kind))
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn classify_message(&self, message: &str, severity: Severity) -> ErrorKind {
        if !severity.is_warning() {
            return ErrorKind::NotAWarning;
        }

        self.entries
            .iter()
            .find(|(pattern, _)| message.contains(pattern.as_ref()))
            .map(|(_, kind)| *kind)
            .unwrap_or(ErrorKind::UnknownError)
    }
}

impl Default for ClassificationTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}

impl Classifier for ClassificationTable {
    fn classify(&self, failure: &RawFailure) -> ErrorKind {
        self.classify_message(failure.message(), failure.severity())
    }
}

/// Classifies by the failure's OS error number instead of its wording.
///
/// Useful on hosts whose messages are localized.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsErrorClassifier;

impl Classifier for OsErrorClassifier {
    fn classify(&self, failure: &RawFailure) -> ErrorKind {
        if !failure.severity().is_warning() {
            return ErrorKind::NotAWarning;
        }

        match failure.os_error().map(OsError::from) {
            Some(OsError::OperationForbidden | OsError::PermissionDenied) => ErrorKind::PermissionDenied,
            Some(OsError::AlreadyExists) => ErrorKind::AlreadyExists,
            Some(OsError::NotFound) => ErrorKind::DoesNotExist,
            Some(OsError::IsADirectory) => ErrorKind::IsADirectory,
            Some(OsError::NotADirectory) => ErrorKind::NotADirectory,
            Some(OsError::DirectoryNotEmpty) => ErrorKind::DirectoryNotEmpty,
            Some(OsError::InvalidFd) => ErrorKind::NotAStream,
            _ => ErrorKind::UnknownError,
        }
    }
}

/// Classifies with the standard table.
pub fn classify(message: &str, severity: Severity) -> ErrorKind {
    ClassificationTable::standard().classify_message(message, severity)
}
