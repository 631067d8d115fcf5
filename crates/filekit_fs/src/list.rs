use std::fs;

use crate::FileHandle;

impl FileHandle {
    /// Names of the direct children. Empty when this is not a directory.
    ///
    /// The order is whatever the underlying listing returns; it is not
    /// sorted.
    pub fn list_paths(&self) -> Vec<String> {
        if let Some(bundle) = self.bundle() {
            return bundle.list(self.path());
        }

        fs::read_dir(self.as_path())
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Handles to the direct children. Empty when this is not a directory.
    pub fn list(&self) -> Vec<FileHandle> {
        self.list_paths()
            .iter()
            .map(|name| self.child(name))
            .collect()
    }

    pub fn list_filter<F>(&self, mut filter: F) -> Vec<FileHandle>
    where
        F: FnMut(&FileHandle) -> bool,
    {
        self.list().into_iter().filter(|child| filter(child)).collect()
    }

    pub fn list_names<F>(&self, mut filter: F) -> Vec<FileHandle>
    where
        F: FnMut(&str) -> bool,
    {
        self.list_paths()
            .iter()
            .filter(|name| filter(name))
            .map(|name| self.child(name))
            .collect()
    }

    pub fn list_suffix(&self, suffix: &str) -> Vec<FileHandle> {
        self.list_names(|name| name.ends_with(suffix))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use anyhow::Result;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::asset::MemoryAssets;

    fn names(handles: &[FileHandle]) -> Vec<String> {
        let mut names: Vec<String> = handles.iter().map(|h| h.name().to_string()).collect();
        names.sort();
        names
    }

    fn fixture() -> Result<(tempfile::TempDir, FileHandle)> {
        let dir = tempfile::tempdir()?;
        let root = FileHandle::new(dir.path().to_string_lossy());
        root.child("a.txt").write_string("a", false)?;
        root.child("b.log").write_string("b", false)?;
        root.child("sub").child("c.txt").write_string("c", false)?;
        Ok((dir, root))
    }

    #[test]
    fn test_list_returns_children() -> Result<()> {
        let (_dir, root) = fixture()?;

        let actual = root.list();

        assert_eq!(names(&actual), vec!["a.txt", "b.log", "sub"]);
        assert!(actual.iter().all(|child| child.parent() == root));
        Ok(())
    }

    #[test]
    fn test_list_filters() -> Result<()> {
        let (_dir, root) = fixture()?;

        assert_eq!(names(&root.list_suffix(".txt")), vec!["a.txt"]);
        assert_eq!(
            names(&root.list_filter(|child| child.is_directory())),
            vec!["sub"]
        );
        assert_eq!(
            names(&root.list_names(|name| name.starts_with('b'))),
            vec!["b.log"]
        );
        Ok(())
    }

    #[test]
    fn test_list_of_file_or_missing_path_is_empty() -> Result<()> {
        let (_dir, root) = fixture()?;

        assert!(root.child("a.txt").list().is_empty());
        assert!(root.child("missing").list().is_empty());
        assert!(root.child("missing").list_suffix(".txt").is_empty());
        Ok(())
    }

    #[test]
    fn test_asset_listing_uses_bundle() {
        let bundle = Arc::new(
            MemoryAssets::new()
                .with("shader/fragment.shader", "f")
                .with("shader/vertex.shader", "v"),
        );
        let shader = FileHandle::asset(bundle, "shader");

        let children = shader.list();

        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|child| child.is_read_only()));
        assert_eq!(children[0].parent(), shader);
        assert!(children[0].list().is_empty());
    }
}
