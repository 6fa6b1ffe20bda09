use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime
};

use bytes::Bytes;

use crate::{
    classify::{ClassificationTable, Classifier},
    host::{
        File,
        FileMode,
        FileType,
        GlobFlags,
        Host,
        LineFlags,
        LockOperation,
        OpenSettings,
        PrimitiveLayer,
        RawResult,
        SortOrder,
        Stats,
        StreamContext,
        Whence,
        WriteFlags
    },
    intercept::intercept,
    Result
};

mod purge;
mod write;
mod attributes;

#[cfg(test)]
pub(crate) mod memory;

/// Entry point for every operation.
///
/// Each primitive runs under a scoped failure handler, so every host failure
/// leaves as a classified [`crate::FsError`].
pub struct Filesystem<P = Host> {
    host: P,
    classifier: Arc<dyn Classifier>,
}

pub struct Builder<P> {
    host: P,
    classifier: Option<Arc<dyn Classifier>>,
}

impl<P: PrimitiveLayer> Builder<P> {

    pub fn host<Q: PrimitiveLayer>(self, host: Q) -> Builder<Q> {
        Builder {
            host,
            classifier: self.classifier,
        }
    }

    pub fn classifier(mut self, classifier: impl Classifier + 'static) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    pub fn build(self) -> Filesystem<P> {
        Filesystem {
            host: self.host,
            classifier: self.classifier.unwrap_or_else(|| {
                Arc::new(ClassificationTable::standard().clone())
            }),
        }
    }
}

impl Filesystem<Host> {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> Builder<Host> {
        Builder {
            host: Host,
            classifier: None,
        }
    }
}

impl Default for Filesystem<Host> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PrimitiveLayer> Filesystem<P> {

    pub fn with_host(host: P) -> Self {
        Filesystem::<Host>::builder().host(host).build()
    }

    pub fn host(&self) -> &P { &self.host }

    pub fn classifier(&self) -> &dyn Classifier { self.classifier.as_ref() }

    fn invoke<T>(
        &self,
        operation: &'static str,
        call: impl FnOnce(&P) -> RawResult<T>
    ) -> Result<T> {
        intercept(&self.classifier, operation, || call(&self.host))
    }

    pub fn unlink(&self, path: impl AsRef<Path>) -> Result<()> {
        self.invoke("unlink", |host| host.unlink(path.as_ref()))
    }

    pub fn rmdir(&self, path: impl AsRef<Path>) -> Result<()> {
        self.invoke("rmdir", |host| host.rmdir(path.as_ref()))
    }

    pub fn scandir(&self, path: impl AsRef<Path>, order: SortOrder) -> Result<Vec<OsString>> {
        self.invoke("scandir", |host| host.scandir(path.as_ref(), order))
    }

    pub fn mkdir(&self, path: impl AsRef<Path>, mode: FileMode, recursive: bool) -> Result<()> {
        self.invoke("mkdir", |host| host.mkdir(path.as_ref(), mode, recursive))
    }

    /// Writes `data` to `path`, creating the file if needed. Returns the number of bytes written.
    pub fn put_contents(
        &self,
        path: impl AsRef<Path>,
        data: impl AsRef<[u8]>,
        flags: WriteFlags,
        context: Option<&StreamContext>
    ) -> Result<usize> {
        let context = context.copied().unwrap_or_default();
        self.invoke("file_put_contents", |host| {
            host.put_contents(path.as_ref(), data.as_ref(), flags, &context)
        })
    }
}

impl Filesystem<Host> {

    pub fn rename(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
        self.invoke("rename", |host| host.rename(from.as_ref(), to.as_ref()))
    }

    pub fn copy(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<u64> {
        self.invoke("copy", |host| host.copy(from.as_ref(), to.as_ref()))
    }

    pub fn touch(
        &self,
        path: impl AsRef<Path>,
        modified: Option<SystemTime>,
        accessed: Option<SystemTime>
    ) -> Result<()> {
        self.invoke("touch", |host| host.touch(path.as_ref(), modified, accessed))
    }

    pub fn chmod(&self, path: impl AsRef<Path>, mode: FileMode) -> Result<()> {
        self.invoke("chmod", |host| host.chmod(path.as_ref(), mode))
    }

    pub fn chown(&self, path: impl AsRef<Path>, user_id: u32) -> Result<()> {
        self.invoke("chown", |host| host.chown(path.as_ref(), user_id))
    }

    pub fn chgrp(&self, path: impl AsRef<Path>, group_id: u32) -> Result<()> {
        self.invoke("chgrp", |host| host.chgrp(path.as_ref(), group_id))
    }

    pub fn stat(&self, path: impl AsRef<Path>) -> Result<Stats> {
        self.invoke("stat", |host| host.stat(path.as_ref()))
    }

    pub fn lstat(&self, path: impl AsRef<Path>) -> Result<Stats> {
        self.invoke("lstat", |host| host.lstat(path.as_ref()))
    }

    pub fn file_type(&self, path: impl AsRef<Path>) -> Result<FileType> {
        self.invoke("filetype", |host| host.file_type(path.as_ref()))
    }

    pub fn get_contents(
        &self,
        path: impl AsRef<Path>,
        offset: u64,
        max_len: Option<usize>
    ) -> Result<Bytes> {
        self.invoke("file_get_contents", |host| host.get_contents(path.as_ref(), offset, max_len))
    }

    pub fn lines(&self, path: impl AsRef<Path>, flags: LineFlags) -> Result<Vec<String>> {
        self.invoke("file", |host| host.lines(path.as_ref(), flags))
    }

    pub fn glob(&self, pattern: &str, flags: GlobFlags) -> Result<Vec<PathBuf>> {
        self.invoke("glob", |host| host.glob(pattern, flags))
    }

    pub fn open(&self, path: impl AsRef<Path>, settings: OpenSettings) -> Result<File> {
        self.invoke("fopen", |host| host.open(path.as_ref(), settings))
    }

    pub fn close(&self, file: &File) -> Result<()> {
        self.invoke("fclose", |_| file.close())
    }

    pub fn read(&self, file: &File, len: usize) -> Result<Bytes> {
        self.invoke("fread", |_| file.read(len))
    }

    pub fn write(&self, file: &File, data: impl AsRef<[u8]>) -> Result<usize> {
        self.invoke("fwrite", |_| file.write(data.as_ref()))
    }

    pub fn seek(&self, file: &File, offset: i64, whence: Whence) -> Result<u64> {
        self.invoke("fseek", |_| file.seek(offset, whence))
    }

    pub fn tell(&self, file: &File) -> Result<u64> {
        self.invoke("ftell", |_| file.tell())
    }

    pub fn rewind(&self, file: &File) -> Result<()> {
        self.invoke("rewind", |_| file.seek(0, Whence::Start).map(|_| ()))
    }

    pub fn truncate(&self, file: &File, size: u64) -> Result<()> {
        self.invoke("ftruncate", |_| file.truncate(size))
    }

    pub fn flush(&self, file: &File) -> Result<()> {
        self.invoke("fflush", |_| file.flush())
    }

    pub fn lock(&self, file: &File, operation: LockOperation, non_blocking: bool) -> Result<bool> {
        self.invoke("flock", |_| file.lock(operation, non_blocking))
    }

    pub fn eof(&self, file: &File) -> Result<bool> {
        self.invoke("feof", |_| file.eof())
    }

    pub fn fstat(&self, file: &File) -> Result<Stats> {
        self.invoke("fstat", |_| file.stat())
    }
}
