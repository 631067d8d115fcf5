use std::fs;
use std::time::UNIX_EPOCH;

use walkdir::WalkDir;

use crate::size::format_size;
use crate::FileHandle;

impl FileHandle {
    /// For assets: the path opens as a leaf or lists as a non-empty
    /// directory.
    pub fn exists(&self) -> bool {
        match self.bundle() {
            Some(bundle) => bundle.open(self.path()).is_ok() || self.is_directory(),
            None => self.as_path().exists(),
        }
    }

    /// For assets: the bundle lists at least one child.
    pub fn is_directory(&self) -> bool {
        match self.bundle() {
            Some(bundle) => !bundle.list(self.path()).is_empty(),
            None => self.as_path().is_dir(),
        }
    }

    pub fn is_file(&self) -> bool {
        match self.bundle() {
            Some(bundle) => bundle.open(self.path()).is_ok(),
            None => self.as_path().is_file(),
        }
    }

    /// Size in bytes, 0 when missing.
    ///
    /// A filesystem directory reports the sum of every file below it. This
    /// walks the whole tree on each call; nothing is cached. Asset
    /// directories report 0.
    pub fn length(&self) -> u64 {
        if let Some(bundle) = self.bundle() {
            return bundle.length(self.path()).unwrap_or(0);
        }
        if self.is_directory() {
            return WalkDir::new(self.as_path())
                .follow_links(false)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .filter_map(|entry| entry.metadata().ok())
                .map(|metadata| metadata.len())
                .sum();
        }
        fs::metadata(self.as_path())
            .map(|metadata| metadata.len())
            .unwrap_or(0)
    }

    pub fn formatted_size(&self) -> String {
        format_size(i64::try_from(self.length()).unwrap_or(i64::MAX))
    }

    /// Milliseconds since the Unix epoch, or 0 when unknown. Assets carry no
    /// timestamps and always report 0.
    pub fn last_modified(&self) -> u64 {
        if self.bundle().is_some() {
            return 0;
        }
        fs::metadata(self.as_path())
            .and_then(|metadata| metadata.modified())
            .ok()
            .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }
}
