use std::{ffi::OsStr, path::Path};

use crate::{
    host::{PrimitiveLayer, SortOrder},
    ErrorKind,
    Result
};

use super::Filesystem;

fn is_pseudo_entry(name: &OsStr) -> bool {
    name == "." || name == ".."
}

impl<P: PrimitiveLayer> Filesystem<P> {

    /// Removes a file or a directory.
    ///
    /// A directory that still has entries is only emptied first when
    /// `recursive` is set; otherwise its `DirectoryNotEmpty` error is returned.
    /// Every other failure is returned unchanged.
    pub fn purge(&self, path: impl AsRef<Path>, recursive: bool) -> Result<()> {
        self.purge_path(path.as_ref(), recursive)
    }

    fn purge_path(&self, path: &Path, recursive: bool) -> Result<()> {
        match self.unlink(path) {
            Err(e) if e.is(ErrorKind::IsADirectory) => self.purge_directory(path, recursive),
            result => result,
        }
    }

    fn purge_directory(&self, path: &Path, recursive: bool) -> Result<()> {
        match self.rmdir(path) {
            Err(e) if recursive && e.is(ErrorKind::DirectoryNotEmpty) => {
                info!("cl-fs: purging contents of {}", path.display());

                let entries = self.scandir(path, SortOrder::Unsorted)?;
                for entry in entries.iter().filter(|entry| !is_pseudo_entry(entry)) {
                    self.purge_path(&path.join(entry), true)?;
                }

                self.rmdir(path)
            },
            result => result,
        }
    }
}
