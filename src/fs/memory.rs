//! A scripted in-memory host for exercising the compound operations.

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashSet},
    ffi::OsString,
    path::{Path, PathBuf}
};

use crate::{
    failure::RawFailure,
    host::{
        FileMode,
        HandleLayer,
        OpenSettings,
        PrimitiveLayer,
        RawResult,
        SortOrder,
        Stats,
        StreamContext,
        WriteFlags
    }
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File(Vec<u8>),
    Dir(FileMode),
}

#[derive(Default)]
pub struct MemoryHost {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    denied: RefCell<HashSet<PathBuf>>,
    calls: RefCell<Vec<String>>,
    pseudo_entries: Cell<bool>,
    stat_failures: RefCell<HashSet<PathBuf>>,
    missing_working_directory: Cell<bool>,
}

fn os_failure(operation: &str, path: &Path, code: i32) -> RawFailure {
    RawFailure::from_os(operation, path.display(), std::io::Error::from_raw_os_error(code))
}

impl MemoryHost {

    pub fn new() -> Self { Self::default() }

    pub fn with_dir(self, path: &str) -> Self {
        self.nodes.borrow_mut().insert(PathBuf::from(path), Node::Dir(FileMode::permissive()));
        self
    }

    pub fn with_file(self, path: &str, data: &[u8]) -> Self {
        self.nodes.borrow_mut().insert(PathBuf::from(path), Node::File(data.to_vec()));
        self
    }

    // Any mutation of `path` fails with "Permission denied".
    pub fn deny(&self, path: &str) {
        self.denied.borrow_mut().insert(PathBuf::from(path));
    }

    // Handles opened on `path` fail their fstat.
    pub fn fail_stat(&self, path: &str) {
        self.stat_failures.borrow_mut().insert(PathBuf::from(path));
    }

    // Bare relative names resolve against a directory that is gone.
    pub fn remove_working_directory(&self) {
        self.missing_working_directory.set(true);
    }

    pub fn list_pseudo_entries(&self, enabled: bool) {
        self.pseudo_entries.set(enabled);
    }

    pub fn exists(&self, path: &str) -> bool {
        self.nodes.borrow().contains_key(Path::new(path))
    }

    pub fn node(&self, path: &str) -> Option<Node> {
        self.nodes.borrow().get(Path::new(path)).cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<PathBuf, Node> {
        self.nodes.borrow().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, operation: &str, path: &Path) {
        self.calls.borrow_mut().push(format!("{} {}", operation, path.display()));
    }

    fn is_denied(&self, path: &Path) -> bool {
        self.denied.borrow().contains(path)
    }

    fn children(&self, path: &Path) -> Vec<PathBuf> {
        self.nodes
            .borrow()
            .keys()
            .filter(|key| key.parent() == Some(path))
            .cloned()
            .collect()
    }

    // Parent must exist and be a directory; the root always does.
    fn check_parent(&self, operation: &str, path: &Path) -> RawResult<()> {
        let parent = match path.parent() {
            Some(parent) if parent.as_os_str().is_empty() && self.missing_working_directory.get() => {
                return Err(os_failure(operation, path, libc::ENOENT));
            },
            Some(parent) if parent != Path::new("/") && !parent.as_os_str().is_empty() => parent,
            _ => return Ok(()),
        };

        match self.nodes.borrow().get(parent) {
            Some(Node::Dir(_)) => Ok(()),
            Some(Node::File(_)) => Err(os_failure(operation, path, libc::ENOTDIR)),
            None => Err(os_failure(operation, path, libc::ENOENT)),
        }
    }
}

impl PrimitiveLayer for MemoryHost {

    fn unlink(&self, path: &Path) -> RawResult<()> {
        self.record("unlink", path);
        let node = self.nodes.borrow().get(path).cloned();
        match node {
            None => Err(os_failure("unlink", path, libc::ENOENT)),
            Some(Node::Dir(_)) => Err(os_failure("unlink", path, libc::EISDIR)),
            Some(Node::File(_)) if self.is_denied(path) => Err(os_failure("unlink", path, libc::EACCES)),
            Some(Node::File(_)) => {
                self.nodes.borrow_mut().remove(path);
                Ok(())
            },
        }
    }

    fn rmdir(&self, path: &Path) -> RawResult<()> {
        self.record("rmdir", path);
        let node = self.nodes.borrow().get(path).cloned();
        match node {
            None => Err(os_failure("rmdir", path, libc::ENOENT)),
            Some(Node::File(_)) => Err(os_failure("rmdir", path, libc::ENOTDIR)),
            Some(Node::Dir(_)) if self.is_denied(path) => Err(os_failure("rmdir", path, libc::EACCES)),
            Some(Node::Dir(_)) if !self.children(path).is_empty() => {
                Err(os_failure("rmdir", path, libc::ENOTEMPTY))
            },
            Some(Node::Dir(_)) => {
                self.nodes.borrow_mut().remove(path);
                Ok(())
            },
        }
    }

    fn scandir(&self, path: &Path, order: SortOrder) -> RawResult<Vec<OsString>> {
        self.record("scandir", path);
        let node = self.nodes.borrow().get(path).cloned();
        match node {
            None => Err(os_failure("scandir", path, libc::ENOENT)),
            Some(Node::File(_)) => Err(os_failure("scandir", path, libc::ENOTDIR)),
            Some(Node::Dir(_)) => {
                let mut names: Vec<OsString> = self
                    .children(path)
                    .into_iter()
                    .filter_map(|child| child.file_name().map(|name| name.to_os_string()))
                    .collect();

                if self.pseudo_entries.get() {
                    names.insert(0, OsString::from(".."));
                    names.insert(0, OsString::from("."));
                }

                if order == SortOrder::Descending {
                    names.reverse();
                }

                Ok(names)
            },
        }
    }

    fn mkdir(&self, path: &Path, mode: FileMode, recursive: bool) -> RawResult<()> {
        self.record("mkdir", path);
        if self.nodes.borrow().contains_key(path) {
            return Err(os_failure("mkdir", path, libc::EEXIST));
        }

        if self.is_denied(path) {
            return Err(os_failure("mkdir", path, libc::EACCES));
        }

        if recursive {
            let mut missing = Vec::new();
            let mut current = path.parent();
            while let Some(ancestor) = current {
                if ancestor == Path::new("/") || ancestor.as_os_str().is_empty() {
                    break;
                }
                match self.nodes.borrow().get(ancestor) {
                    Some(Node::Dir(_)) => break,
                    Some(Node::File(_)) => return Err(os_failure("mkdir", path, libc::ENOTDIR)),
                    None => missing.push(ancestor.to_path_buf()),
                }
                current = ancestor.parent();
            }

            for ancestor in missing.into_iter().rev() {
                self.nodes.borrow_mut().insert(ancestor, Node::Dir(mode));
            }
        } else {
            self.check_parent("mkdir", path)?;
        }

        self.nodes.borrow_mut().insert(path.to_path_buf(), Node::Dir(mode));
        Ok(())
    }

    fn put_contents(
        &self,
        path: &Path,
        data: &[u8],
        flags: WriteFlags,
        _context: &StreamContext
    ) -> RawResult<usize> {
        self.record("file_put_contents", path);
        self.check_parent("file_put_contents", path)?;

        if self.is_denied(path) {
            return Err(os_failure("file_put_contents", path, libc::EACCES));
        }

        let existing = self.nodes.borrow().get(path).cloned();
        let contents = match existing {
            Some(Node::Dir(_)) => return Err(os_failure("file_put_contents", path, libc::EISDIR)),
            Some(Node::File(mut contents)) if flags.contains(WriteFlags::APPEND) => {
                contents.extend_from_slice(data);
                contents
            },
            _ => data.to_vec(),
        };

        self.nodes.borrow_mut().insert(path.to_path_buf(), Node::File(contents));
        Ok(data.len())
    }
}

impl HandleLayer for MemoryHost {
    type Handle = PathBuf;

    fn open_handle(&self, path: &Path, _settings: OpenSettings) -> RawResult<PathBuf> {
        self.record("fopen", path);
        if self.nodes.borrow().contains_key(path) {
            Ok(path.to_path_buf())
        } else {
            Err(os_failure("fopen", path, libc::ENOENT))
        }
    }

    fn stat_handle(&self, handle: &PathBuf) -> RawResult<Stats> {
        self.record("fstat", handle);
        if self.stat_failures.borrow().contains(handle) {
            return Err(RawFailure::stat_failed(
                "fstat",
                handle,
                std::io::Error::from_raw_os_error(libc::EIO)
            ));
        }

        let mut raw: libc::stat = unsafe { std::mem::zeroed() };
        match self.nodes.borrow().get(handle) {
            Some(Node::File(contents)) => {
                raw.st_mode = libc::S_IFREG | 0o644;
                raw.st_size = contents.len() as libc::off_t;
            },
            Some(Node::Dir(mode)) => raw.st_mode = libc::S_IFDIR | libc::mode_t::from(*mode),
            None => return Err(os_failure("fstat", handle, libc::EBADF)),
        }

        Ok(Stats::from(raw))
    }

    fn close_handle(&self, handle: &PathBuf) -> RawResult<()> {
        self.record("fclose", handle);
        Ok(())
    }
}
