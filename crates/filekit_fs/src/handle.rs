use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use crate::asset::AssetBundle;
use crate::error::{Error, Result};

/// Separator used by every path derivation.
pub const SEPARATOR: char = '/';

/// Line separator appended by [`FileHandle::write_line`].
pub const LINE_SEPARATOR: &str = if cfg!(windows) { "\r\n" } else { "\n" };

const ASSET_PREFIX: &str = "asset://";

/// What a handle is allowed to do to its storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ReadWrite,
    ReadOnly,
}

#[derive(Debug, Clone)]
pub(crate) enum Source {
    Fs,
    Asset(Arc<dyn AssetBundle>),
}

/// A handle to a file or directory in one storage root.
///
/// A handle is a path plus the storage it lives in. It never owns OS
/// resources and its path never changes; operations that mutate act on the
/// storage. Path derivations (`name`, `dir`, `child`, ...) are string
/// operations and perform no I/O.
///
/// Handles backed by an [`AssetBundle`] are [`Capability::ReadOnly`]: every
/// mutating operation fails with [`Error::Capability`] before touching
/// anything.
///
/// Equality compares the path string and the capability only. Paths are not
/// canonicalized, so `a/./b` and `a/b` are different handles.
#[derive(Debug, Clone)]
pub struct FileHandle {
    path: String,
    source: Source,
}

impl FileHandle {
    /// Creates a filesystem handle from an absolute or relative path.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self { path: clean(path.as_ref()), source: Source::Fs }
    }

    /// Creates a read-only handle to `path` inside `bundle`.
    pub fn asset(bundle: Arc<dyn AssetBundle>, path: impl AsRef<str>) -> Self {
        Self { path: clean(path.as_ref()), source: Source::Asset(bundle) }
    }

    fn derive(&self, path: &str) -> Self {
        Self { path: clean(path), source: self.source.clone() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn as_path(&self) -> &Path {
        Path::new(&self.path)
    }

    pub(crate) fn bundle(&self) -> Option<&Arc<dyn AssetBundle>> {
        match &self.source {
            Source::Fs => None,
            Source::Asset(bundle) => Some(bundle),
        }
    }

    pub fn capability(&self) -> Capability {
        match self.source {
            Source::Fs => Capability::ReadWrite,
            Source::Asset(_) => Capability::ReadOnly,
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.capability() == Capability::ReadOnly
    }

    pub(crate) fn ensure_writable(&self, operation: &'static str) -> Result<()> {
        match self.capability() {
            Capability::ReadWrite => Ok(()),
            Capability::ReadOnly => Err(Error::capability(operation, &self.path)),
        }
    }

    /// The last path segment.
    pub fn name(&self) -> &str {
        match self.path.rfind(SEPARATOR) {
            Some(index) => &self.path[index + 1..],
            None => &self.path,
        }
    }

    /// The text after the last `.` of the name, or `""`.
    pub fn extension(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(index) => &name[index + 1..],
            None => "",
        }
    }

    pub fn name_without_extension(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(index) => &name[..index],
            None => name,
        }
    }

    /// The path with the extension of its last segment removed, e.g.
    /// `dir/dir2/file.png` -> `dir/dir2/file`.
    pub fn path_without_extension(&self) -> &str {
        let start = self.path.rfind(SEPARATOR).map_or(0, |index| index + 1);
        match self.path[start..].rfind('.') {
            Some(index) => &self.path[..start + index],
            None => &self.path,
        }
    }

    /// The containing directory including its trailing separator, or the
    /// separator itself when the path has none.
    pub fn dir(&self) -> &str {
        match self.path.rfind(SEPARATOR) {
            Some(index) => &self.path[..=index],
            None => "/",
        }
    }

    fn parent_path(&self) -> Option<&str> {
        let index = self.path.rfind(SEPARATOR)?;
        if index == 0 {
            (self.path.len() > 1).then(|| &self.path[..1])
        } else {
            Some(&self.path[..index])
        }
    }

    pub fn child(&self, name: &str) -> Self {
        if self.path.is_empty() {
            return self.derive(name);
        }
        self.derive(&join(&self.path, name))
    }

    /// The parent directory, or `/` when the path has no parent segment.
    pub fn parent(&self) -> Self {
        self.derive(self.parent_path().unwrap_or("/"))
    }

    pub fn sibling(&self, name: &str) -> Result<Self> {
        if self.path.is_empty() {
            return Err(Error::operate("Cannot get the sibling of the root."));
        }
        Ok(match self.parent_path() {
            Some(parent) => self.derive(&join(parent, name)),
            None => self.derive(name),
        })
    }
}

fn join(base: &str, name: &str) -> String {
    if base.ends_with(SEPARATOR) {
        format!("{base}{name}")
    } else {
        format!("{base}{SEPARATOR}{name}")
    }
}

/// Collapses repeated separators and drops a trailing one. Nothing else is
/// normalized.
fn clean(path: &str) -> String {
    let mut cleaned = String::with_capacity(path.len());
    let mut previous_separator = false;
    for c in path.chars() {
        let separator = c == SEPARATOR;
        if !(separator && previous_separator) {
            cleaned.push(c);
        }
        previous_separator = separator;
    }
    if cleaned.len() > 1 && cleaned.ends_with(SEPARATOR) {
        cleaned.pop();
    }
    cleaned
}

impl PartialEq for FileHandle {
    fn eq(&self, other: &Self) -> bool {
        self.capability() == other.capability() && self.path == other.path
    }
}

impl Eq for FileHandle {}

impl Hash for FileHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.capability().hash(state);
        self.path.hash(state);
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            Source::Fs => f.write_str(&self.path),
            Source::Asset(_) => write!(f, "{ASSET_PREFIX}{}", self.path),
        }
    }
}
