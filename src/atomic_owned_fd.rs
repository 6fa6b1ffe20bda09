use std::{os::fd::{AsRawFd, FromRawFd, RawFd}, sync::atomic::{AtomicI32, Ordering}};

const INVALID_FD: RawFd = -1;

/// An owned descriptor that can be invalidated through a shared reference.
///
/// Every clone of a [`crate::host::File`] shares one of these, so closing
/// through any clone is observed by all of them.
#[derive(Debug)]
pub struct AtomicOwnedFd {
    inner: AtomicI32
}

impl AtomicOwnedFd {

    /*
        SAFETY:

            This function is unsafe because it creates an AtomicOwnedFd
            from a raw file descriptor. The caller must ensure that the
            file descriptor is valid and not owned elsewhere
    */
    pub unsafe fn new(fd: RawFd) -> Self {
        assert_ne!(fd, INVALID_FD);
        Self {
            inner: AtomicI32::new(fd)
        }
    }

    pub fn load(&self) -> RawFd {
        self.inner.load(Ordering::Acquire)
    }

    /*
        SAFETY:

            This function is unsafe because it returns an open FD.
            The caller must ensure that the returned FD is cleaned up.

    */
    pub unsafe fn release(&self) -> RawFd {
        self.inner.swap(INVALID_FD, Ordering::AcqRel)
    }

    pub fn is_valid(&self) -> bool { self.load() != INVALID_FD }

    // Returns None when the descriptor had already been closed.
    pub fn close(&self) -> Option<std::io::Result<()>> {
        let fd = unsafe { self.release() };
        if fd == INVALID_FD {
            return None;
        }

        Some(syscall!(close(fd)).map(|_| ()))
    }
}

impl AsRawFd for AtomicOwnedFd {
    fn as_raw_fd(&self) -> RawFd {
        self.load()
    }
}

impl FromRawFd for AtomicOwnedFd {
    unsafe fn from_raw_fd(fd: RawFd) -> Self {
        unsafe { Self::new(fd) }
    }
}

impl Drop for AtomicOwnedFd {
    fn drop(&mut self) {
        let fd = unsafe { self.release() };
        if fd != INVALID_FD {
            if let Err(e) = syscall!(close(fd)) {
                error!("cl-fs: Failed to close fd {}: {}", fd, e);
            }
        }
    }
}
