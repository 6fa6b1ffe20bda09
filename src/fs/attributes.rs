use std::{path::Path, time::SystemTime};

use crate::{
    host::{HandleLayer, OpenSettings, PrimitiveLayer, Stats},
    Result
};

use super::Filesystem;

impl<P: PrimitiveLayer + HandleLayer> Filesystem<P> {

    // Opens `path` read-only, stats the handle and closes it again before projecting.
    fn with_stats<T>(
        &self,
        operation: &'static str,
        path: &Path,
        project: impl FnOnce(&Stats) -> T
    ) -> Result<T> {
        self.invoke(operation, |host| {
            let handle = host.open_handle(path, OpenSettings::read_only())?;
            let stats = host.stat_handle(&handle);

            if let Err(e) = host.close_handle(&handle) {
                debug!("cl-fs: closing {} after {} failed: {}", path.display(), operation, e);
            }

            stats.map(|stats| project(&stats))
        })
    }

    /// Size of the file in bytes.
    pub fn size(&self, path: impl AsRef<Path>) -> Result<u64> {
        self.with_stats("filesize", path.as_ref(), |stats| stats.size)
    }

    pub fn owner(&self, path: impl AsRef<Path>) -> Result<u32> {
        self.with_stats("fileowner", path.as_ref(), |stats| stats.user_id)
    }

    pub fn group(&self, path: impl AsRef<Path>) -> Result<u32> {
        self.with_stats("filegroup", path.as_ref(), |stats| stats.group_id)
    }

    pub fn inode(&self, path: impl AsRef<Path>) -> Result<u64> {
        self.with_stats("fileinode", path.as_ref(), |stats| stats.inode)
    }

    /// Raw `st_mode`, file type bits included.
    pub fn permissions(&self, path: impl AsRef<Path>) -> Result<u32> {
        self.with_stats("fileperms", path.as_ref(), |stats| stats.raw_mode)
    }

    pub fn accessed(&self, path: impl AsRef<Path>) -> Result<SystemTime> {
        self.with_stats("fileatime", path.as_ref(), |stats| stats.last_access_time)
    }

    pub fn modified(&self, path: impl AsRef<Path>) -> Result<SystemTime> {
        self.with_stats("filemtime", path.as_ref(), |stats| stats.last_modification_time)
    }

    /// Last status change, not creation.
    pub fn changed(&self, path: impl AsRef<Path>) -> Result<SystemTime> {
        self.with_stats("filectime", path.as_ref(), |stats| stats.last_status_change_time)
    }
}
