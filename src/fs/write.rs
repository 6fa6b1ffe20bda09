use std::path::Path;

use crate::{
    host::{PrimitiveLayer, StreamContext, WriteFlags, DEFAULT_DIRECTORY_MODE},
    ErrorKind,
    Result
};

use super::Filesystem;

impl<P: PrimitiveLayer> Filesystem<P> {

    /// Writes `data` to `path`, creating missing parent directories on the first failure.
    ///
    /// Parents are created with [`DEFAULT_DIRECTORY_MODE`] and the write is
    /// retried exactly once. A second failure, or any failure other than
    /// `DoesNotExist`, is returned unchanged.
    pub fn write_with_auto_create(
        &self,
        path: impl AsRef<Path>,
        data: impl AsRef<[u8]>,
        flags: WriteFlags,
        context: Option<&StreamContext>
    ) -> Result<usize> {
        let path = path.as_ref();
        let data = data.as_ref();

        match self.put_contents(path, data, flags, context) {
            Err(e) if e.is(ErrorKind::DoesNotExist) => {
                let parent = match path.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent,
                    _ => return Err(e),
                };

                info!(
                    "cl-fs: creating {} ({}) for {}",
                    parent.display(),
                    DEFAULT_DIRECTORY_MODE,
                    path.display()
                );
                self.mkdir(parent, DEFAULT_DIRECTORY_MODE, true)?;

                self.put_contents(path, data, flags, context)
            },
            result => result,
        }
    }
}
