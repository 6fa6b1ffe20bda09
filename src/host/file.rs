use std::{
    mem::MaybeUninit,
    os::fd::{AsRawFd, RawFd},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc
    }
};

use bytes::{Bytes, BytesMut};

use crate::{failure::RawFailure, AtomicOwnedFd};

use super::{c_path, Host, LockOperation, OpenSettings, RawResult, Stats, Whence};

/// An open file handle.
///
/// Clones share the descriptor. Closing any clone closes it for all of them;
/// later operations on any clone fail as "not a valid stream resource".
#[derive(Clone, Debug)]
pub struct File {
    fd: Arc<AtomicOwnedFd>,
    path: PathBuf,
    at_eof: Arc<AtomicBool>,
}

impl Host {
    pub fn open(&self, path: &Path, settings: OpenSettings) -> RawResult<File> {
        let c_path = c_path("fopen", path)?;
        let mode = settings
            .mode()
            .file_mode()
            .map(libc::mode_t::from)
            .unwrap_or(0);

        let fd = syscall!(open(c_path.as_ptr(), settings.flags(), mode as libc::c_uint))
            .map_err(|e| RawFailure::from_os("fopen", path.display(), e))?;

        Ok(File {
            fd: Arc::new(unsafe { AtomicOwnedFd::new(fd) }),
            path: path.to_path_buf(),
            at_eof: Arc::new(AtomicBool::new(false)),
        })
    }
}

impl File {

    pub fn path(&self) -> &Path { &self.path }

    pub fn is_open(&self) -> bool { self.fd.is_valid() }

    fn fd(&self, operation: &str) -> RawResult<RawFd> {
        let fd = self.fd.load();
        if fd < 0 {
            return Err(RawFailure::not_a_stream(operation));
        }
        Ok(fd)
    }

    fn fail(&self, operation: &str, error: std::io::Error) -> RawFailure {
        RawFailure::from_os(operation, self.path.display(), error)
    }

    pub(crate) fn close(&self) -> RawResult<()> {
        match self.fd.close() {
            None => Err(RawFailure::not_a_stream("fclose")),
            Some(result) => result.map_err(|e| self.fail("fclose", e)),
        }
    }

    // Short reads mark the end of the file.
    pub(crate) fn read(&self, len: usize) -> RawResult<Bytes> {
        let fd = self.fd("fread")?;
        let mut buffer = BytesMut::zeroed(len);

        let n = syscall!(read(fd, buffer.as_mut_ptr() as *mut libc::c_void, len))
            .map_err(|e| self.fail("fread", e))? as usize;

        buffer.truncate(n);
        if n < len {
            self.at_eof.store(true, Ordering::Release);
        }

        Ok(buffer.freeze())
    }

    pub(crate) fn write(&self, data: &[u8]) -> RawResult<usize> {
        let fd = self.fd("fwrite")?;
        syscall!(write(fd, data.as_ptr() as *const libc::c_void, data.len()))
            .map(|n| n as usize)
            .map_err(|e| self.fail("fwrite", e))
    }

    pub(crate) fn seek(&self, offset: i64, whence: Whence) -> RawResult<u64> {
        let fd = self.fd("fseek")?;
        let position = syscall!(lseek(fd, offset as libc::off_t, libc::c_int::from(whence)))
            .map_err(|e| self.fail("fseek", e))?;

        self.at_eof.store(false, Ordering::Release);
        Ok(position as u64)
    }

    pub(crate) fn tell(&self) -> RawResult<u64> {
        let fd = self.fd("ftell")?;
        syscall!(lseek(fd, 0, libc::SEEK_CUR))
            .map(|position| position as u64)
            .map_err(|e| self.fail("ftell", e))
    }

    pub(crate) fn truncate(&self, size: u64) -> RawResult<()> {
        let fd = self.fd("ftruncate")?;
        syscall!(ftruncate(fd, size as libc::off_t))
            .map(|_| ())
            .map_err(|e| self.fail("ftruncate", e))
    }

    pub(crate) fn flush(&self) -> RawResult<()> {
        let fd = self.fd("fflush")?;
        syscall!(fsync(fd))
            .map(|_| ())
            .map_err(|e| self.fail("fflush", e))
    }

    /// Returns `false` when `non_blocking` is set and the lock is held elsewhere.
    pub(crate) fn lock(&self, operation: LockOperation, non_blocking: bool) -> RawResult<bool> {
        let fd = self.fd("flock")?;
        match syscall!(flock(fd, operation.as_flag(non_blocking))) {
            Ok(_) => Ok(true),
            Err(e) if non_blocking && e.raw_os_error() == Some(libc::EWOULDBLOCK) => Ok(false),
            Err(e) => Err(self.fail("flock", e)),
        }
    }

    pub(crate) fn eof(&self) -> RawResult<bool> {
        self.fd("feof")?;
        Ok(self.at_eof.load(Ordering::Acquire))
    }

    pub(crate) fn stat(&self) -> RawResult<Stats> {
        let fd = self.fd("fstat")?;
        let mut stats = MaybeUninit::<libc::stat>::uninit();
        syscall!(fstat(fd, stats.as_mut_ptr()))
            .map_err(|e| self.fail("fstat", e))?;

        Ok(Stats::from(unsafe { stats.assume_init() }))
    }
}

impl AsRawFd for File {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}
