use crate::prelude::*;
use crate::{err_ctx, IoError, Result};
use easy_ext::ext;
use std::path::Path;
use tempfile::NamedTempFile;

/// Creates a uniquely named file in `dir`, which is removed from disk once
/// the returned handle (or the [`tempfile::TempPath`] split from it) is dropped.
pub(crate) async fn create_temp_file_in(
    dir: &Path,
    prefix: &str,
    suffix: &str,
) -> Result<NamedTempFile> {
    let dir = dir.to_owned();
    let prefix = prefix.to_owned();
    let suffix = suffix.to_owned();

    tokio::task::spawn_blocking(move || {
        tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(&dir)
            .map_err(err_ctx!(IoError::CreateLyricsFile))
    })
    .await
    .fatal_ctx(|| "Task creating a temporary file has panicked")?
}

#[ext(NamedTempFileExt)]
pub(crate) impl NamedTempFile {
    fn into_tokio(self) -> (tokio::fs::File, tempfile::TempPath) {
        let (file, path) = self.into_parts();
        (tokio::fs::File::from_std(file), path)
    }
}
