//! The primitive operation layer.
//!
//! Every primitive performs one host call through `libc` and reports any
//! failure as a [`RawFailure`]. Nothing in here classifies; that happens in
//! [`crate::intercept`] once the failure leaves the call.

use std::{ffi::{CString, OsString}, os::unix::ffi::OsStrExt, path::Path};

use crate::failure::RawFailure;

mod mode;
mod stats;
mod file;
mod directory;
mod path;

pub use mode::Permissions;
pub use mode::FileMode;
pub use mode::FileType;
pub use mode::CreateMode;
pub use mode::WriteMode;
pub use mode::OpenSettings;
pub use mode::WriteFlags;
pub use mode::LineFlags;
pub use mode::GlobFlags;
pub use mode::SortOrder;
pub use mode::Whence;
pub use mode::LockOperation;
pub use mode::StreamContext;
pub use mode::DEFAULT_DIRECTORY_MODE;
pub use mode::DEFAULT_FILE_MODE;

pub use stats::Stats;

pub use file::File;

pub use directory::DirectoryEntry;
pub use directory::DirectoryStream;

pub type RawResult<T> = std::result::Result<T, RawFailure>;

/// The primitives the compound operations are built from.
///
/// Implementations perform exactly one host operation per call, return its
/// native result on success and a [`RawFailure`] otherwise.
pub trait PrimitiveLayer {
    fn unlink(&self, path: &Path) -> RawResult<()>;

    fn rmdir(&self, path: &Path) -> RawResult<()>;

    /// Lists `path` without the `.` and `..` pseudo-entries.
    fn scandir(&self, path: &Path, order: SortOrder) -> RawResult<Vec<OsString>>;

    fn mkdir(&self, path: &Path, mode: FileMode, recursive: bool) -> RawResult<()>;

    fn put_contents(
        &self,
        path: &Path,
        data: &[u8],
        flags: WriteFlags,
        context: &StreamContext
    ) -> RawResult<usize>;
}

/// Short-lived handles used to read a path's status through its descriptor.
pub trait HandleLayer {
    type Handle;

    fn open_handle(&self, path: &Path, settings: OpenSettings) -> RawResult<Self::Handle>;

    fn stat_handle(&self, handle: &Self::Handle) -> RawResult<Stats>;

    fn close_handle(&self, handle: &Self::Handle) -> RawResult<()>;
}

/// The real host, reached through `libc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Host;

impl PrimitiveLayer for Host {
    fn unlink(&self, path: &Path) -> RawResult<()> {
        path::unlink(path)
    }

    fn rmdir(&self, path: &Path) -> RawResult<()> {
        directory::rmdir(path)
    }

    fn scandir(&self, path: &Path, order: SortOrder) -> RawResult<Vec<OsString>> {
        directory::scandir(path, order)
    }

    fn mkdir(&self, path: &Path, mode: FileMode, recursive: bool) -> RawResult<()> {
        directory::mkdir(path, mode, recursive)
    }

    fn put_contents(
        &self,
        path: &Path,
        data: &[u8],
        flags: WriteFlags,
        context: &StreamContext
    ) -> RawResult<usize> {
        path::put_contents(path, data, flags, context)
    }
}

impl HandleLayer for Host {
    type Handle = File;

    fn open_handle(&self, path: &Path, settings: OpenSettings) -> RawResult<File> {
        self.open(path, settings)
    }

    fn stat_handle(&self, handle: &File) -> RawResult<Stats> {
        handle.stat()
    }

    fn close_handle(&self, handle: &File) -> RawResult<()> {
        handle.close()
    }
}

pub(crate) fn c_path(operation: &str, path: &Path) -> RawResult<CString> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| RawFailure::invalid_argument(operation))
}

// Retries on EINTR; any other error is returned.
pub(crate) fn write_all(fd: libc::c_int, mut data: &[u8]) -> std::io::Result<usize> {
    let total = data.len();
    while !data.is_empty() {
        match syscall!(write(fd, data.as_ptr() as *const libc::c_void, data.len())) {
            Ok(0) => return Err(std::io::Error::from_raw_os_error(libc::EIO)),
            Ok(n) => data = &data[n as usize..],
            Err(e) if e.raw_os_error() == Some(libc::EINTR) => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}
