use tempfile::Builder;

use crate::error::{Error, Result};
use crate::FileHandle;

const TEMP_ERROR: &str = "Unable to create temp file.";

impl FileHandle {
    /// Creates an empty file with a unique name in the system temp directory.
    /// The file is not removed automatically.
    pub fn temp_file(prefix: &str) -> Result<Self> {
        let path = Builder::new()
            .prefix(prefix)
            .tempfile()
            .and_then(|file| file.into_temp_path().keep().map_err(|e| e.error))
            .map_err(|e| Error::operate_io(TEMP_ERROR, e))?;
        Ok(Self::new(path.to_string_lossy()))
    }

    /// Creates an empty directory with a unique name in the system temp
    /// directory. The directory is not removed automatically.
    pub fn temp_directory(prefix: &str) -> Result<Self> {
        let dir = Builder::new()
            .prefix(prefix)
            .tempdir()
            .map_err(|e| Error::operate_io(TEMP_ERROR, e))?;
        #[allow(deprecated)]
        let path = dir.into_path();
        Ok(Self::new(path.to_string_lossy()))
    }
}
