#[macro_use]
pub (crate) mod sys;

#[macro_use]
pub (crate) mod logging;

mod os_error;
mod failure;
mod error;
mod classify;
mod intercept;
mod atomic_owned_fd;
mod fs;

pub mod host;

pub use os_error::OsError;
pub use atomic_owned_fd::AtomicOwnedFd;
pub use failure::{RawFailure, Severity};
pub use error::{ErrorKind, FsError};
pub use classify::{classify, ClassificationTable, Classifier, OsErrorClassifier};
pub use intercept::{intercept, raise, HandlerScope};
pub use fs::{Builder, Filesystem};
pub use host::{
    File,
    FileMode,
    FileType,
    GlobFlags,
    LineFlags,
    LockOperation,
    OpenSettings,
    SortOrder,
    Stats,
    StreamContext,
    Whence,
    WriteFlags,
    DEFAULT_DIRECTORY_MODE
};

pub type Result<T> = std::result::Result<T, FsError>;
