use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Cursor};
use std::marker::PhantomData;

use bytes::Bytes;
use rust_embed::Embed;

use crate::stream::ByteStream;

/// A read-only tree of bundled resources addressed by `/`-separated keys.
///
/// Leading and trailing separators are ignored, so `"/shader/"` and
/// `"shader"` name the same entry and `""` is the bundle root.
pub trait AssetBundle: fmt::Debug + Send + Sync {
    /// Opens a leaf resource. Directories cannot be opened.
    fn open(&self, path: &str) -> io::Result<ByteStream>;

    /// Names of the direct children of `path`; empty for leaves and
    /// unknown paths.
    fn list(&self, path: &str) -> Vec<String>;

    /// Byte length of a leaf resource. Directories fail like `open`.
    fn length(&self, path: &str) -> io::Result<u64>;
}

fn key(path: &str) -> &str {
    path.trim_matches('/')
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("Asset not found: {path}"))
}

/// Collects the distinct first segments of every key below `dir`, in the
/// order they are first seen.
fn child_names<I, S>(keys: I, dir: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let dir = key(dir);
    let mut names: Vec<String> = Vec::new();
    for entry in keys {
        let entry = key(entry.as_ref());
        let rest = if dir.is_empty() {
            entry
        } else {
            match entry
                .strip_prefix(dir)
                .and_then(|rest| rest.strip_prefix('/'))
            {
                Some(rest) => rest,
                None => continue,
            }
        };
        let name = rest.split('/').next().unwrap_or_default();
        if !name.is_empty() && !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// In-memory bundle. Directories are implied by key prefixes.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    entries: BTreeMap<String, Bytes>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`MemoryAssets::insert`].
    pub fn with(mut self, path: &str, contents: impl Into<Bytes>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: &str, contents: impl Into<Bytes>) {
        self.entries.insert(key(path).to_string(), contents.into());
    }

    pub fn get(&self, path: &str) -> Option<&Bytes> {
        self.entries.get(key(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AssetBundle for MemoryAssets {
    fn open(&self, path: &str) -> io::Result<ByteStream> {
        let contents = self.get(path).ok_or_else(|| not_found(path))?;
        Ok(Box::new(Cursor::new(contents.clone())))
    }

    fn list(&self, path: &str) -> Vec<String> {
        child_names(self.entries.keys(), path)
    }

    fn length(&self, path: &str) -> io::Result<u64> {
        self.get(path)
            .map(|contents| contents.len() as u64)
            .ok_or_else(|| not_found(path))
    }
}

/// Serves a [`rust_embed::Embed`] folder as an [`AssetBundle`].
///
/// ```ignore
/// #[derive(rust_embed::Embed)]
/// #[folder = "assets/"]
/// struct Bundled;
///
/// let bundle = EmbeddedAssets::<Bundled>::new();
/// ```
pub struct EmbeddedAssets<E> {
    _embed: PhantomData<fn() -> E>,
}

impl<E: Embed> EmbeddedAssets<E> {
    pub fn new() -> Self {
        Self { _embed: PhantomData }
    }
}

impl<E: Embed> Default for EmbeddedAssets<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EmbeddedAssets<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedAssets")
            .field("embed", &std::any::type_name::<E>())
            .finish()
    }
}

impl<E: Embed> AssetBundle for EmbeddedAssets<E> {
    fn open(&self, path: &str) -> io::Result<ByteStream> {
        let file = E::get(key(path)).ok_or_else(|| not_found(path))?;
        Ok(Box::new(Cursor::new(file.data)))
    }

    fn list(&self, path: &str) -> Vec<String> {
        child_names(E::iter(), path)
    }

    fn length(&self, path: &str) -> io::Result<u64> {
        E::get(key(path))
            .map(|file| file.data.len() as u64)
            .ok_or_else(|| not_found(path))
    }
}
