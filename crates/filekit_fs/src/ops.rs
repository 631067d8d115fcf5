use std::fs;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::FileHandle;

impl FileHandle {
    /// Creates this directory and any missing parents, ignoring failures.
    pub(crate) fn create_dirs(&self) {
        if let Err(error) = fs::create_dir_all(self.as_path()) {
            debug!(path = %self.path(), %error, "Failed to create directories");
        }
    }

    /// Creates this directory and its parents. Idempotent.
    pub fn mkdirs(&self) -> Result<&Self> {
        self.ensure_writable("mkdirs with")?;
        self.create_dirs();
        Ok(self)
    }

    /// Removes a file or an empty directory. Returns `false` when nothing
    /// was removed.
    pub fn delete(&self) -> Result<bool> {
        self.ensure_writable("delete")?;
        Ok(remove(self.as_path()))
    }

    /// Removes this file or directory together with everything below it.
    /// Returns whether the final removal succeeded.
    pub fn delete_directory(&self) -> Result<bool> {
        self.ensure_writable("delete")?;
        Ok(delete_tree(self.as_path()))
    }

    /// Deletes everything below this directory. With `preserve_tree` the
    /// subdirectories are kept (emptied recursively) and only files go.
    pub fn empty_directory(&self, preserve_tree: bool) -> Result<()> {
        self.ensure_writable("delete")?;
        empty_tree(self.as_path(), preserve_tree);
        Ok(())
    }

    /// Copies this file or directory to `dest` and returns the copy target.
    ///
    /// A file is copied to `dest`, or to `dest/<name>` when `dest` is a
    /// directory; the returned handle is where the file landed. A directory
    /// is always copied to `dest/<name>` (creating `dest` if needed) and
    /// `dest` itself is returned.
    pub fn copy_to(&self, dest: &FileHandle) -> Result<FileHandle> {
        dest.ensure_writable("copy to")?;

        if !self.is_directory() {
            let target = if dest.is_directory() {
                dest.child(self.name())
            } else {
                dest.clone()
            };
            if target == *self {
                return Ok(target);
            }
            copy_file(self, &target)?;
            return Ok(target);
        }

        if dest.exists() {
            if !dest.is_directory() {
                return Err(Error::operate(format!(
                    "Destination exists but is not a directory: {dest}"
                )));
            }
        } else {
            dest.create_dirs();
            if !dest.is_directory() {
                return Err(Error::operate(format!(
                    "Destination directory cannot be created: {dest}"
                )));
            }
        }
        copy_directory(self, &dest.child(self.name()))?;
        Ok(dest.clone())
    }

    /// Moves this file or directory to `dest`.
    ///
    /// A rename is tried first. When it fails (for example across devices)
    /// the source is copied with [`FileHandle::copy_to`] and then deleted.
    /// That fallback is not atomic: if the delete fails, both the source and
    /// the copy remain.
    pub fn move_to(&self, dest: &FileHandle) -> Result<FileHandle> {
        self.ensure_writable("move")?;
        dest.ensure_writable("move to")?;

        match fs::rename(self.as_path(), dest.as_path()) {
            Ok(()) => return Ok(dest.clone()),
            Err(error) => {
                debug!(from = %self, to = %dest, %error, "Rename failed, copying instead")
            }
        }

        self.copy_to(dest)?;
        self.delete()?;
        if self.exists() && self.is_directory() {
            self.delete_directory()?;
        }
        Ok(dest.clone())
    }
}

fn remove(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => fs::remove_dir(path).is_ok(),
        Ok(_) => fs::remove_file(path).is_ok(),
        Err(_) => false,
    }
}

/// Removes everything below `dir`, deepest entries first. With
/// `preserve_tree` only files go.
fn empty_tree(dir: &Path, preserve_tree: bool) {
    let entries = WalkDir::new(dir)
        .follow_links(false)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(|entry| entry.ok());

    for entry in entries {
        let path = entry.path();
        let removed = if !entry.file_type().is_dir() {
            fs::remove_file(path)
        } else if preserve_tree {
            continue;
        } else {
            fs::remove_dir(path)
        };
        if let Err(error) = removed {
            debug!(path = %path.display(), %error, "Failed to remove entry");
        }
    }
}

fn delete_tree(path: &Path) -> bool {
    empty_tree(path, false);
    remove(path)
}

fn copy_file(source: &FileHandle, dest: &FileHandle) -> Result<()> {
    source
        .read()
        .and_then(|input| dest.write_from(input, false))
        .map_err(|error| {
            Error::nested(
                format!(
                    "Error copying source file: {}\nTo destination: {}",
                    source.path(),
                    dest.path()
                ),
                error,
            )
        })
}

fn copy_directory(source: &FileHandle, dest: &FileHandle) -> Result<()> {
    dest.create_dirs();
    if !dest.is_directory() {
        return Err(Error::operate(format!(
            "Destination directory cannot be created: {dest}"
        )));
    }
    for child in source.list() {
        let target = dest.child(child.name());
        if child.is_directory() {
            copy_directory(&child, &target)?;
        } else {
            copy_file(&child, &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use anyhow::Result;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::asset::MemoryAssets;

    fn root() -> Result<(tempfile::TempDir, FileHandle)> {
        let dir = tempfile::tempdir()?;
        let root = FileHandle::new(dir.path().to_string_lossy());
        Ok((dir, root))
    }

    fn tree(root: &FileHandle) -> Result<FileHandle> {
        let src = root.child("src");
        src.child("a.txt").write_string("a", false)?;
        src.child("nested").child("b.txt").write_string("bb", false)?;
        src.child("empty").mkdirs()?;
        Ok(src)
    }

    #[test]
    fn test_mkdirs_is_idempotent() -> Result<()> {
        let (_dir, root) = root()?;
        let target = root.child("x").child("y");

        assert!(target.mkdirs()?.is_directory());
        assert!(target.mkdirs()?.is_directory());
        Ok(())
    }

    #[test]
    fn test_delete_only_removes_files_and_empty_directories() -> Result<()> {
        let (_dir, root) = root()?;
        let src = tree(&root)?;

        assert!(!src.delete()?);
        assert!(src.child("a.txt").delete()?);
        assert!(!src.child("a.txt").exists());
        assert!(src.child("empty").delete()?);
        assert!(!root.child("missing").delete()?);
        Ok(())
    }

    #[test]
    fn test_delete_directory_is_recursive() -> Result<()> {
        let (_dir, root) = root()?;
        let src = tree(&root)?;

        assert!(src.delete_directory()?);
        assert!(!src.exists());
        assert!(!root.child("missing").delete_directory()?);
        Ok(())
    }

    #[test]
    fn test_empty_directory_can_preserve_tree() -> Result<()> {
        let (_dir, root) = root()?;
        let src = tree(&root)?;

        src.empty_directory(true)?;

        assert!(src.child("nested").is_directory());
        assert!(src.child("empty").is_directory());
        assert!(!src.child("a.txt").exists());
        assert!(!src.child("nested").child("b.txt").exists());

        src.empty_directory(false)?;
        assert!(src.is_directory());
        assert!(src.list().is_empty());
        Ok(())
    }

    #[test]
    fn test_copy_file_into_existing_directory_uses_source_name() -> Result<()> {
        let (_dir, root) = root()?;
        let src = tree(&root)?;
        let dest = root.child("dest");
        dest.mkdirs()?;

        let actual = src.child("a.txt").copy_to(&dest)?;

        assert_eq!(actual, dest.child("a.txt"));
        assert_eq!(actual.read_string(None)?, "a");
        Ok(())
    }

    #[test]
    fn test_copy_file_to_new_path() -> Result<()> {
        let (_dir, root) = root()?;
        let src = tree(&root)?;
        let dest = root.child("renamed.txt");

        let actual = src.child("a.txt").copy_to(&dest)?;

        assert_eq!(actual, dest);
        assert_eq!(dest.read_string(None)?, "a");
        Ok(())
    }

    #[test]
    fn test_copy_directory_nests_under_destination() -> Result<()> {
        let (_dir, root) = root()?;
        let src = tree(&root)?;
        let dest = root.child("dest");

        let actual = src.copy_to(&dest)?;

        assert_eq!(actual, dest);
        let copy = dest.child("src");
        assert_eq!(copy.child("a.txt").read_string(None)?, "a");
        assert_eq!(copy.child("nested").child("b.txt").read_string(None)?, "bb");
        assert!(copy.child("empty").is_directory());
        assert!(!dest.child("a.txt").exists());
        assert!(src.child("a.txt").exists());
        Ok(())
    }

    #[test]
    fn test_copy_directory_onto_file_fails() -> Result<()> {
        let (_dir, root) = root()?;
        let src = tree(&root)?;
        let dest = root.child("file.txt");
        dest.write_string("x", false)?;

        let error = src.copy_to(&dest).unwrap_err();

        assert!(error.is_operate());
        assert!(error
            .to_string()
            .starts_with("Destination exists but is not a directory: "));
        Ok(())
    }

    #[test]
    fn test_copy_missing_source_fails() -> Result<()> {
        let (_dir, root) = root()?;

        let error = root
            .child("missing")
            .copy_to(&root.child("dest"))
            .unwrap_err();

        assert!(error.is_operate());
        assert!(error.to_string().starts_with("Error copying source file: "));
        Ok(())
    }

    #[test]
    fn test_move_file_renames() -> Result<()> {
        let (_dir, root) = root()?;
        let src = tree(&root)?;
        let dest = root.child("moved.txt");

        let actual = src.child("a.txt").move_to(&dest)?;

        assert_eq!(actual, dest);
        assert_eq!(dest.read_string(None)?, "a");
        assert!(!src.child("a.txt").exists());
        Ok(())
    }

    #[test]
    fn test_move_directory_renames() -> Result<()> {
        let (_dir, root) = root()?;
        let src = tree(&root)?;
        let dest = root.child("moved");

        src.move_to(&dest)?;

        assert!(!src.exists());
        assert_eq!(dest.child("nested").child("b.txt").read_string(None)?, "bb");
        Ok(())
    }

    #[test]
    fn test_move_falls_back_to_copy_when_rename_fails() -> Result<()> {
        let (_dir, root) = root()?;
        let src = tree(&root)?;
        let dest = root.child("occupied");
        dest.child("keep.txt").write_string("k", false)?;

        // Renaming a directory onto a non-empty one fails, so the copy path
        // nests the source under the destination.
        src.move_to(&dest)?;

        assert!(!src.exists());
        assert_eq!(dest.child("keep.txt").read_string(None)?, "k");
        assert_eq!(dest.child("src").child("a.txt").read_string(None)?, "a");
        Ok(())
    }

    #[test]
    fn test_delete_directory_removes_deep_tree() -> Result<()> {
        let (_dir, root) = root()?;
        let top = root.child("top");
        let deep = top.child("a").child("b").child("c");
        deep.child("leaf.txt").write_string("leaf", false)?;
        top.child("a").child("side.txt").write_string("side", false)?;

        top.empty_directory(true)?;
        assert!(deep.is_directory());
        assert_eq!(top.length(), 0);

        deep.child("leaf.txt").write_string("leaf", false)?;
        assert!(top.delete_directory()?);
        assert!(!top.exists());
        assert!(root.exists());
        Ok(())
    }

    #[test]
    fn test_copy_file_onto_itself_keeps_content() -> Result<()> {
        let (_dir, root) = root()?;
        let src = tree(&root)?;
        let file = src.child("a.txt");

        assert_eq!(file.copy_to(&src)?, file);
        assert_eq!(file.copy_to(&file)?, file);

        assert_eq!(file.read_string(None)?, "a");
        Ok(())
    }

    #[test]
    fn test_copy_directory_fails_when_subdirectory_is_blocked() -> Result<()> {
        let (_dir, root) = root()?;
        let src = tree(&root)?;
        let dest = root.child("dest");
        dest.child("src").child("empty").write_string("blocker", false)?;

        let error = src.copy_to(&dest).unwrap_err();

        assert!(error.is_operate());
        assert!(error
            .to_string()
            .starts_with("Destination directory cannot be created: "));
        Ok(())
    }

    #[test]
    fn test_asset_rejects_every_mutation() -> Result<()> {
        let (_dir, root) = root()?;
        let bundle = Arc::new(MemoryAssets::new().with("data.txt", "assets"));
        let data = FileHandle::asset(bundle.clone(), "data.txt");
        let target = root.child("target.txt");
        target.write_string("x", false)?;

        let errors = vec![
            data.write(false).err(),
            data.write_buffered(false, 16).err(),
            data.write_from(std::io::empty(), false).err(),
            data.writer(false, None).err(),
            data.write_bytes(b"x", false).err(),
            data.write_bytes_range(b"x", 0, 1, false).err(),
            data.write_string("x", false).err(),
            data.write_string_with("x", true, Some("latin1")).err(),
            data.write_line("x").err(),
            data.delete().err(),
            data.delete_directory().err(),
            data.empty_directory(true).err(),
            data.mkdirs().err(),
            data.move_to(&target).err(),
            target.copy_to(&data).err(),
            target.move_to(&data).err(),
        ];

        for error in errors {
            let error = error.expect("mutating an asset must fail");
            assert!(error.is_capability(), "{error}");
        }
        assert_eq!(bundle.len(), 1);
        assert_eq!(data.read_string(None)?, "assets");
        assert_eq!(target.read_string(None)?, "x");
        Ok(())
    }

    #[test]
    fn test_copy_asset_tree_into_filesystem() -> Result<()> {
        let (_dir, root) = root()?;
        let bundle = Arc::new(
            MemoryAssets::new()
                .with("shader/fragment.shader", "f")
                .with("shader/lib/common.glsl", "c"),
        );
        let cache = root.child("cache");

        FileHandle::asset(bundle.clone(), "shader").copy_to(&cache)?;
        FileHandle::asset(bundle, "shader/fragment.shader").copy_to(&cache)?;

        assert!(cache.is_directory());
        assert_eq!(cache.child("fragment.shader").read_string(None)?, "f");
        assert_eq!(
            cache.child("shader").child("lib").child("common.glsl").read_string(None)?,
            "c"
        );
        Ok(())
    }
}
