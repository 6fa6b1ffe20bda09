use std::ffi::CStr;

use thiserror::Error;



#[derive(Debug, Error, Clone, Copy, Eq, PartialEq, Hash)]
pub enum OsError {

    #[error("Maximum number of file descriptors reached")]
    MaxFdReached,

    #[error("Not enough memory")]
    NotEnoughMemory,

    #[error("This operation is forbidden on this object")]
    OperationForbidden,

    #[error("The operation is not supported")]
    OperationNotSupported,

    #[error("The resource is temporarily unavailable")]
    ResourceUnavailable,

    #[error("The resource is busy")]
    ResourceBusy,

    #[error("Invalid file descriptor")]
    InvalidFd,

    #[error("The resource would have deadlocked")]
    Deadlock,

    #[error("The resource is too large")]
    ResourceTooLarge,

    #[error("The resource is a directory")]
    IsADirectory,

    #[error("Attempted to create a resource which already exists")]
    AlreadyExists,

    #[error("The resource was not found")]
    NotFound,

    #[error("The resource is not a directory")]
    NotADirectory,

    #[error("The directory is not empty")]
    DirectoryNotEmpty,

    #[error("Invalid pointer")]
    InvalidPointer,

    #[error("Insufficient permissions")]
    PermissionDenied,

    #[error("The operartion was interrupted")]
    OperationInterrupted,

    #[error("Invalid operation")]
    InvalidOperation,

    #[error("The file system is read-only")]
    ReadOnlyFileSystem,

    #[error("No space left on device")]
    NoSpace,

    #[error("The file name is too long")]
    NameTooLong,

    #[error("Too many levels of symbolic links")]
    TooManyLinks,

    #[error("Cross-device link")]
    CrossDevice,

    #[error("Unknown OS error")]
    UnknownError,

    #[error("OS Error: {0}")]
    Generic(i32),
}

impl OsError {

    pub fn last() -> Self {
        let os_error = std::io::Error::last_os_error();
        match os_error.raw_os_error() {
            Some(code) => OsError::from(code),
            None => OsError::UnknownError,
        }
    }

    pub fn code(self) -> i32 { self.into() }

    // The host's own wording for an errno value, e.g. "No such file or directory".
    pub fn description(code: i32) -> String {
        let mut buf = [0 as libc::c_char; 256];
        let res = unsafe { libc::strerror_r(code, buf.as_mut_ptr(), buf.len()) };
        if res != 0 {
            return format!("Unknown error {}", code);
        }

        let text = unsafe { CStr::from_ptr(buf.as_ptr()) };
        text.to_string_lossy().into_owned()
    }
}

impl From<std::io::Error> for OsError {
    fn from(error: std::io::Error) -> Self {
       let os_error = match error.raw_os_error() {
           Some(code) => code,
           None => return OsError::UnknownError,
       };

       Self::from(os_error)
    }
}

impl From<i32> for OsError {
    fn from(os_error: i32) -> Self {
        match os_error {
            libc::EINVAL => OsError::InvalidOperation,
            libc::EMFILE | libc::ENFILE => OsError::MaxFdReached,
            libc::ENOMEM => OsError::NotEnoughMemory,
            libc::EACCES => OsError::OperationForbidden,
            libc::EBADF => OsError::InvalidFd,
            libc::EEXIST => OsError::AlreadyExists,
            libc::EFAULT => OsError::InvalidPointer,
            libc::ENOENT => OsError::NotFound,
            libc::EPERM => OsError::PermissionDenied,
            libc::EINTR => OsError::OperationInterrupted,
            libc::ENOTDIR => OsError::NotADirectory,
            libc::EISDIR => OsError::IsADirectory,
            libc::ENOTEMPTY => OsError::DirectoryNotEmpty,
            libc::EAGAIN => OsError::ResourceUnavailable,
            libc::EBUSY => OsError::ResourceBusy,
            libc::ENOTSUP => OsError::OperationNotSupported,
            libc::EDEADLK => OsError::Deadlock,
            libc::EFBIG => OsError::ResourceTooLarge,
            libc::EROFS => OsError::ReadOnlyFileSystem,
            libc::ENOSPC => OsError::NoSpace,
            libc::ENAMETOOLONG => OsError::NameTooLong,
            libc::ELOOP => OsError::TooManyLinks,
            libc::EXDEV => OsError::CrossDevice,
            _ => OsError::Generic(os_error),
       }
    }
}

impl From<OsError> for i32 {
    fn from(error: OsError) -> i32 {
        match error {
            OsError::Generic(code) => code,
            OsError::InvalidOperation => libc::EINVAL,
            OsError::MaxFdReached => libc::EMFILE,
            OsError::NotEnoughMemory => libc::ENOMEM,
            OsError::OperationForbidden => libc::EACCES,
            OsError::InvalidFd => libc::EBADF,
            OsError::AlreadyExists => libc::EEXIST,
            OsError::InvalidPointer => libc::EFAULT,
            OsError::NotFound => libc::ENOENT,
            OsError::PermissionDenied => libc::EPERM,
            OsError::OperationInterrupted => libc::EINTR,
            OsError::NotADirectory => libc::ENOTDIR,
            OsError::IsADirectory => libc::EISDIR,
            OsError::DirectoryNotEmpty => libc::ENOTEMPTY,
            OsError::ResourceUnavailable => libc::EAGAIN,
            OsError::ResourceBusy => libc::EBUSY,
            OsError::OperationNotSupported => libc::ENOTSUP,
            OsError::Deadlock => libc::EDEADLK,
            OsError::ResourceTooLarge => libc::EFBIG,
            OsError::ReadOnlyFileSystem => libc::EROFS,
            OsError::NoSpace => libc::ENOSPC,
            OsError::NameTooLong => libc::ENAMETOOLONG,
            OsError::TooManyLinks => libc::ELOOP,
            OsError::CrossDevice => libc::EXDEV,
            OsError::UnknownError => -1
        }
    }
}
