use std::{
    ffi::{CStr, OsStr, OsString},
    os::unix::ffi::OsStrExt,
    path::{Path, PathBuf}
};

use crate::{failure::RawFailure, OsError};

use super::{c_path, FileMode, FileType, GlobFlags, RawResult, SortOrder};

pub fn rmdir(path: &Path) -> RawResult<()> {
    let c_path = c_path("rmdir", path)?;
    syscall!(rmdir(c_path.as_ptr()))
        .map(|_| ())
        .map_err(|e| RawFailure::from_os("rmdir", path.display(), e))
}

pub fn mkdir(path: &Path, mode: FileMode, recursive: bool) -> RawResult<()> {
    c_path("mkdir", path)?;

    match mkdir_once(path, mode) {
        Err(e) if recursive && e.raw_os_error() == Some(libc::ENOENT) => {
            match parent_of(path) {
                Some(parent) => {
                    mkdir_ancestors(parent, mode)?;
                    mkdir_once(path, mode)
                        .map_err(|e| RawFailure::from_os("mkdir", path.display(), e))
                },
                None => Err(RawFailure::from_os("mkdir", path.display(), e)),
            }
        },
        Err(e) => Err(RawFailure::from_os("mkdir", path.display(), e)),
        Ok(()) => Ok(()),
    }
}

fn parent_of(path: &Path) -> Option<&Path> {
    path.parent().filter(|parent| {
        *parent != path && !parent.as_os_str().is_empty()
    })
}

fn mkdir_once(path: &Path, mode: FileMode) -> std::io::Result<()> {
    let c_path = std::ffi::CString::new(path.as_os_str().as_bytes())
        .map_err(|_| std::io::Error::from_raw_os_error(libc::EINVAL))?;
    syscall!(mkdir(c_path.as_ptr(), libc::mode_t::from(mode))).map(|_| ())
}

// Ancestors that already exist are fine, as long as they are directories.
fn mkdir_ancestors(path: &Path, mode: FileMode) -> RawResult<()> {
    match mkdir_once(path, mode) {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(libc::EEXIST) => {
            match std::fs::metadata(path) {
                Ok(metadata) if metadata.is_dir() => Ok(()),
                _ => Err(RawFailure::from_os(
                    "mkdir",
                    path.display(),
                    std::io::Error::from_raw_os_error(libc::ENOTDIR)
                )),
            }
        },
        Err(e) if e.raw_os_error() == Some(libc::ENOENT) => {
            match parent_of(path) {
                Some(parent) => {
                    mkdir_ancestors(parent, mode)?;
                    mkdir_ancestors(path, mode)
                },
                None => Err(RawFailure::from_os("mkdir", path.display(), e)),
            }
        },
        Err(e) => Err(RawFailure::from_os("mkdir", path.display(), e)),
    }
}

pub fn scandir(path: &Path, order: SortOrder) -> RawResult<Vec<OsString>> {
    let stream = DirectoryStream::open(path)?;

    let mut names = stream
        .map(|entry| entry.map(|entry| entry.split().0))
        .collect::<Result<Vec<_>, OsError>>()
        .map_err(|e| RawFailure::from_os(
            "scandir",
            path.display(),
            std::io::Error::from_raw_os_error(e.code())
        ))?;

    match order {
        SortOrder::Ascending => names.sort(),
        SortOrder::Descending => names.sort_by(|a, b| b.cmp(a)),
        SortOrder::Unsorted => {},
    }

    Ok(names)
}

pub fn glob(pattern: &str, flags: GlobFlags) -> RawResult<Vec<PathBuf>> {
    let c_pattern = std::ffi::CString::new(pattern)
        .map_err(|_| RawFailure::invalid_argument("glob"))?;

    let mut matches: libc::glob_t = unsafe { std::mem::zeroed() };
    let res = unsafe {
        libc::glob(c_pattern.as_ptr(), flags.bits(), None, &mut matches)
    };

    let result = match res {
        0 if matches.gl_pathv.is_null() => Ok(Vec::new()),
        0 => {
            let paths = unsafe {
                std::slice::from_raw_parts(matches.gl_pathv, matches.gl_pathc as usize)
            };
            Ok(paths
                .iter()
                .filter(|path| !path.is_null())
                .map(|path| {
                    let bytes = unsafe { CStr::from_ptr(*path) }.to_bytes();
                    PathBuf::from(OsStr::from_bytes(bytes))
                })
                .collect())
        },
        libc::GLOB_NOMATCH => Ok(Vec::new()),
        libc::GLOB_NOSPACE => Err(RawFailure::from_os(
            "glob",
            pattern,
            std::io::Error::from_raw_os_error(libc::ENOMEM)
        )),
        _ => Err(RawFailure::from_os("glob", pattern, std::io::Error::last_os_error())),
    };

    unsafe { libc::globfree(&mut matches) };

    result
}

pub struct DirectoryEntry {
    name: OsString,
    dtype: FileType,
}

impl DirectoryEntry {
    pub fn name(&self) -> &OsStr { &self.name }
    pub fn dtype(&self) -> FileType { self.dtype }

    pub fn split(self) -> (OsString, FileType) {
        let name = self.name;
        let dtype = self.dtype;
        (name, dtype)
    }
}

/// A `readdir` cursor that skips the `.` and `..` pseudo-entries.
pub struct DirectoryStream {
    dir_ptr: *mut libc::DIR,
}

impl DirectoryStream {
    pub fn open(path: &Path) -> RawResult<Self> {
        let c_path = c_path("scandir", path)?;
        let dir_ptr = unsafe { libc::opendir(c_path.as_ptr()) };
        if dir_ptr.is_null() {
            return Err(RawFailure::from_os(
                "scandir",
                path.display(),
                std::io::Error::last_os_error()
            ));
        }

        Ok(Self { dir_ptr })
    }
}

impl Drop for DirectoryStream {
    fn drop(&mut self) {
        if !self.dir_ptr.is_null() {
            let res = unsafe { libc::closedir(self.dir_ptr) };
            if res < 0 {
                error!(
                    "cl-fs: Failed to close directory stream: {}",
                    OsError::last()
                );
            }
        }
    }
}

impl Iterator for DirectoryStream {
    type Item = Result<DirectoryEntry, OsError>;

    fn next(&mut self) -> Option<Self::Item> {

        unsafe { *libc::__errno_location() = 0 };

        loop {
            let entry = unsafe { libc::readdir(self.dir_ptr) };

            if entry.is_null() {
                let errno = unsafe { *libc::__errno_location() };
                if errno != 0 {
                    return Some(Err(OsError::from(errno)));
                }
                return None;
            }

            let d_name_ptr = unsafe { (*entry).d_name.as_ptr() };
            let d_name_c_str = unsafe { CStr::from_ptr(d_name_ptr) };
            let d_name_bytes = d_name_c_str.to_bytes();

            if d_name_bytes == b"." || d_name_bytes == b".." { continue; }

            let d_name = OsStr::from_bytes(d_name_bytes).to_os_string();
            let d_type = FileType::from(
                unsafe { (*entry).d_type }
            );

            return Some(Ok(DirectoryEntry {
                name: d_name,
                dtype: d_type,
            }));
        }

    }
}
