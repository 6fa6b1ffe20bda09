use std::{fmt, path::Path};

use crate::OsError;

/// How loudly the host layer reported a failure.
///
/// The numeric values follow the conventional error-level bitmask and are
/// carried into [`crate::FsError::code`] for diagnostics.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[repr(i32)]
pub enum Severity {
    Error = 1,
    Warning = 2,
    Notice = 8,
    Deprecated = 8192,
}

impl Severity {
    pub fn code(self) -> i32 { self as i32 }

    pub fn is_warning(self) -> bool { self == Severity::Warning }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Notice => "notice",
            Severity::Deprecated => "deprecated",
        };
        write!(f, "{}", name)
    }
}

/// The unclassified failure signal raised by a primitive operation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RawFailure {
    message: String,
    severity: Severity,
    os_error: Option<i32>,
}

impl RawFailure {

    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            os_error: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warning)
    }

    pub fn with_os_error(mut self, code: i32) -> Self {
        self.os_error = Some(code);
        self
    }

    pub fn message(&self) -> &str { &self.message }
    pub fn severity(&self) -> Severity { self.severity }
    pub fn os_error(&self) -> Option<i32> { self.os_error }

    // "{op}({subject}): {host description}"
    pub fn from_os(operation: &str, subject: impl fmt::Display, error: std::io::Error) -> Self {
        match error.raw_os_error() {
            Some(code) => Self::warning(format!(
                "{}({}): {}",
                operation,
                subject,
                OsError::description(code)
            )).with_os_error(code),
            None => Self::warning(format!(
                "{}({}): {}",
                operation,
                subject,
                error
            )),
        }
    }

    pub fn stat_failed(operation: &str, path: &Path, error: std::io::Error) -> Self {
        Self::status_failed(operation, "stat", path, error)
    }

    pub fn lstat_failed(operation: &str, path: &Path, error: std::io::Error) -> Self {
        Self::status_failed(operation, "Lstat", path, error)
    }

    fn status_failed(
        operation: &str,
        call: &str,
        path: &Path,
        error: std::io::Error
    ) -> Self {
        let failure = Self::warning(format!(
            "{}(): {} failed for {}",
            operation,
            call,
            path.display()
        ));

        match error.raw_os_error() {
            Some(code) => failure.with_os_error(code),
            None => failure,
        }
    }

    pub fn not_a_stream(operation: &str) -> Self {
        Self::warning(format!(
            "{}(): supplied resource is not a valid stream resource",
            operation
        )).with_os_error(libc::EBADF)
    }

    // Arguments that can never reach the host are a caller defect, not an I/O condition.
    pub fn invalid_argument(operation: &str) -> Self {
        Self::new(
            format!("{}(): Argument must not contain any null bytes", operation),
            Severity::Error
        )
    }
}

impl fmt::Display for RawFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_os_embeds_host_description() {
        let failure = RawFailure::from_os(
            "unlink",
            Path::new("/tmp/some/dir").display(),
            std::io::Error::from_raw_os_error(libc::EISDIR)
        );

        assert_eq!(failure.message(), "unlink(/tmp/some/dir): Is a directory");
        assert_eq!(failure.severity(), Severity::Warning);
        assert_eq!(failure.os_error(), Some(libc::EISDIR));
    }

    #[test]
    fn test_stat_messages() {
        let err = || std::io::Error::from_raw_os_error(libc::ENOENT);

        let failure = RawFailure::stat_failed("stat", Path::new("/nope"), err());
        assert_eq!(failure.message(), "stat(): stat failed for /nope");

        let failure = RawFailure::lstat_failed("filetype", Path::new("/nope"), err());
        assert_eq!(failure.message(), "filetype(): Lstat failed for /nope");
        assert_eq!(failure.os_error(), Some(libc::ENOENT));
    }

    #[test]
    fn test_invalid_argument_is_not_a_warning() {
        let failure = RawFailure::invalid_argument("mkdir");
        assert!(!failure.severity().is_warning());
        assert_eq!(failure.severity().code(), 1);
    }
}
