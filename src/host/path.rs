use std::{
    mem::MaybeUninit,
    path::Path,
    time::{SystemTime, UNIX_EPOCH}
};

use bytes::{Bytes, BytesMut};

use crate::{failure::RawFailure, AtomicOwnedFd};

use super::{
    c_path,
    directory,
    write_all,
    FileMode,
    FileType,
    GlobFlags,
    Host,
    LineFlags,
    RawResult,
    Stats,
    StreamContext,
    WriteFlags,
    DEFAULT_FILE_MODE
};

const READ_CHUNK: usize = 8192;

pub fn unlink(path: &Path) -> RawResult<()> {
    let c_path = c_path("unlink", path)?;
    syscall!(unlink(c_path.as_ptr()))
        .map(|_| ())
        .map_err(|e| RawFailure::from_os("unlink", path.display(), e))
}

pub fn put_contents(
    path: &Path,
    data: &[u8],
    flags: WriteFlags,
    context: &StreamContext
) -> RawResult<usize> {
    const OPERATION: &str = "file_put_contents";

    let c_path = c_path(OPERATION, path)?;
    let fail = |e: std::io::Error| RawFailure::from_os(OPERATION, path.display(), e);

    let append = flags.contains(WriteFlags::APPEND);
    let lock = flags.contains(WriteFlags::LOCK);

    let mut open_flags = libc::O_WRONLY | libc::O_CREAT | libc::O_CLOEXEC;
    if append {
        open_flags |= libc::O_APPEND;
    } else if !lock {
        // Locked writes truncate only once the lock is held.
        open_flags |= libc::O_TRUNC;
    }

    let fd = syscall!(open(
        c_path.as_ptr(),
        open_flags,
        libc::mode_t::from(context.create_mode) as libc::c_uint
    )).map_err(fail)?;
    let fd = unsafe { AtomicOwnedFd::new(fd) };

    if lock {
        syscall!(flock(fd.load(), libc::LOCK_EX)).map_err(fail)?;
        if !append {
            syscall!(ftruncate(fd.load(), 0)).map_err(fail)?;
        }
    }

    let written = write_all(fd.load(), data).map_err(fail)?;

    match fd.close() {
        Some(Err(e)) => Err(fail(e)),
        _ => Ok(written),
    }
}

fn system_time_to_timespec(time: Option<SystemTime>) -> libc::timespec {
    let mut spec: libc::timespec = unsafe { std::mem::zeroed() };
    match time {
        None => {
            spec.tv_nsec = libc::UTIME_NOW;
        },
        Some(time) => match time.duration_since(UNIX_EPOCH) {
            Ok(since) => {
                spec.tv_sec = since.as_secs() as libc::time_t;
                spec.tv_nsec = since.subsec_nanos() as _;
            },
            Err(before) => {
                let before = before.duration();
                let mut seconds = -(before.as_secs() as i64);
                let mut nanoseconds = before.subsec_nanos() as i64;
                if nanoseconds > 0 {
                    seconds -= 1;
                    nanoseconds = 1_000_000_000 - nanoseconds;
                }
                spec.tv_sec = seconds as libc::time_t;
                spec.tv_nsec = nanoseconds as _;
            },
        },
    }
    spec
}

impl Host {

    pub fn rename(&self, from: &Path, to: &Path) -> RawResult<()> {
        let c_from = c_path("rename", from)?;
        let c_to = c_path("rename", to)?;
        syscall!(rename(c_from.as_ptr(), c_to.as_ptr()))
            .map(|_| ())
            .map_err(|e| RawFailure::from_os(
                "rename",
                format_args!("{},{}", from.display(), to.display()),
                e
            ))
    }

    pub fn copy(&self, from: &Path, to: &Path) -> RawResult<u64> {
        c_path("copy", from)?;
        c_path("copy", to)?;

        if to.is_dir() {
            return Err(RawFailure::warning(
                "copy(): The second argument to copy() function cannot be a directory"
            ).with_os_error(libc::EISDIR));
        }

        std::fs::copy(from, to).map_err(|e| RawFailure::from_os("copy", from.display(), e))
    }

    /// Sets access and modification times, creating an empty file when `path` is missing.
    ///
    /// `None` for `modified` means now; `None` for `accessed` follows `modified`.
    pub fn touch(
        &self,
        path: &Path,
        modified: Option<SystemTime>,
        accessed: Option<SystemTime>
    ) -> RawResult<()> {
        let c_path = c_path("touch", path)?;
        let modified = system_time_to_timespec(modified);
        let accessed = match accessed {
            Some(time) => system_time_to_timespec(Some(time)),
            None => modified,
        };
        let times = [accessed, modified];

        let fail = |e: std::io::Error| RawFailure::from_os("touch", path.display(), e);

        match syscall!(utimensat(libc::AT_FDCWD, c_path.as_ptr(), times.as_ptr(), 0)) {
            Ok(_) => Ok(()),
            Err(e) if e.raw_os_error() == Some(libc::ENOENT) => {
                let fd = syscall!(open(
                    c_path.as_ptr(),
                    libc::O_WRONLY | libc::O_CREAT | libc::O_CLOEXEC,
                    libc::mode_t::from(DEFAULT_FILE_MODE) as libc::c_uint
                )).map_err(fail)?;
                let fd = unsafe { AtomicOwnedFd::new(fd) };

                syscall!(futimens(fd.load(), times.as_ptr())).map_err(fail)?;

                match fd.close() {
                    Some(Err(e)) => Err(fail(e)),
                    _ => Ok(()),
                }
            },
            Err(e) => Err(fail(e)),
        }
    }

    pub fn chmod(&self, path: &Path, mode: FileMode) -> RawResult<()> {
        let c_path = c_path("chmod", path)?;
        syscall!(chmod(c_path.as_ptr(), libc::mode_t::from(mode)))
            .map(|_| ())
            .map_err(|e| RawFailure::from_os("chmod", path.display(), e))
    }

    pub fn chown(&self, path: &Path, user_id: u32) -> RawResult<()> {
        let c_path = c_path("chown", path)?;
        syscall!(chown(c_path.as_ptr(), user_id as libc::uid_t, libc::gid_t::MAX))
            .map(|_| ())
            .map_err(|e| RawFailure::from_os("chown", path.display(), e))
    }

    pub fn chgrp(&self, path: &Path, group_id: u32) -> RawResult<()> {
        let c_path = c_path("chgrp", path)?;
        syscall!(chown(c_path.as_ptr(), libc::uid_t::MAX, group_id as libc::gid_t))
            .map(|_| ())
            .map_err(|e| RawFailure::from_os("chgrp", path.display(), e))
    }

    pub fn stat(&self, path: &Path) -> RawResult<Stats> {
        let c_path = c_path("stat", path)?;
        let mut stats = MaybeUninit::<libc::stat>::uninit();
        syscall!(stat(c_path.as_ptr(), stats.as_mut_ptr()))
            .map_err(|e| RawFailure::stat_failed("stat", path, e))?;

        Ok(Stats::from(unsafe { stats.assume_init() }))
    }

    pub fn lstat(&self, path: &Path) -> RawResult<Stats> {
        self.lstat_for("lstat", path)
    }

    pub fn file_type(&self, path: &Path) -> RawResult<FileType> {
        Ok(self.lstat_for("filetype", path)?.descriptor_type)
    }

    fn lstat_for(&self, operation: &str, path: &Path) -> RawResult<Stats> {
        let c_path = c_path(operation, path)?;
        let mut stats = MaybeUninit::<libc::stat>::uninit();
        syscall!(lstat(c_path.as_ptr(), stats.as_mut_ptr()))
            .map_err(|e| RawFailure::lstat_failed(operation, path, e))?;

        Ok(Stats::from(unsafe { stats.assume_init() }))
    }

    /// Reads from `offset` to the end of the file, or at most `max_len` bytes.
    pub fn get_contents(
        &self,
        path: &Path,
        offset: u64,
        max_len: Option<usize>
    ) -> RawResult<Bytes> {
        const OPERATION: &str = "file_get_contents";

        let c_path = c_path(OPERATION, path)?;
        let fail = |e: std::io::Error| RawFailure::from_os(OPERATION, path.display(), e);

        let fd = syscall!(open(c_path.as_ptr(), libc::O_RDONLY | libc::O_CLOEXEC))
            .map_err(fail)?;
        let fd = unsafe { AtomicOwnedFd::new(fd) };

        if offset > 0 {
            syscall!(lseek(fd.load(), offset as libc::off_t, libc::SEEK_SET)).map_err(fail)?;
        }

        let mut buffer = BytesMut::new();
        loop {
            let want = match max_len {
                Some(max_len) if buffer.len() >= max_len => break,
                Some(max_len) => READ_CHUNK.min(max_len - buffer.len()),
                None => READ_CHUNK,
            };

            let start = buffer.len();
            buffer.resize(start + want, 0);

            let read = syscall!(read(
                fd.load(),
                buffer[start..].as_mut_ptr() as *mut libc::c_void,
                want
            ));

            match read {
                Ok(n) => {
                    buffer.truncate(start + n as usize);
                    if n == 0 { break; }
                },
                Err(e) if e.raw_os_error() == Some(libc::EINTR) => buffer.truncate(start),
                Err(e) => return Err(fail(e)),
            }
        }

        if let Some(Err(e)) = fd.close() {
            return Err(fail(e));
        }

        Ok(buffer.freeze())
    }

    pub fn lines(&self, path: &Path, flags: LineFlags) -> RawResult<Vec<String>> {
        let contents = self.get_contents(path, 0, None)?;
        let text = String::from_utf8_lossy(&contents);

        let lines = text
            .split_inclusive('\n')
            .map(|line| {
                if flags.contains(LineFlags::IGNORE_NEW_LINES) {
                    line.trim_end_matches('\n').trim_end_matches('\r').to_owned()
                } else {
                    line.to_owned()
                }
            })
            .filter(|line| !(flags.contains(LineFlags::SKIP_EMPTY_LINES) && line.is_empty()))
            .collect();

        Ok(lines)
    }

    pub fn glob(&self, pattern: &str, flags: GlobFlags) -> RawResult<Vec<std::path::PathBuf>> {
        directory::glob(pattern, flags)
    }
}
