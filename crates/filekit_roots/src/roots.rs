use std::path::{Path, PathBuf};
use std::sync::Arc;

use filekit_fs::{AssetBundle, Error, FileHandle, Result, SEPARATOR};
use serde::Serialize;
use strum_macros::Display;
use tracing::debug;

use crate::context::StorageContext;

pub const DATA: &str = "data";
pub const MEDIA: &str = "media";
pub const OBB: &str = "obb";
pub const FILES: &str = "files";
pub const CACHE: &str = "cache";

/// Logical storage root a relative path is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Root {
    /// Private application storage, removed with the application.
    Internal,
    /// Application storage that other applications can read.
    External,
    /// Shared storage below the base directory. Survives the application.
    Removable,
    /// Shared storage without the base directory.
    RemovableTop,
    /// The path is already absolute and is used as is.
    Absolute,
    /// A key into the read-only asset bundle.
    Asset,
}

/// Resolved storage layout of an application.
///
/// Built once from a [`StorageContext`] and immutable afterwards, so it can
/// be cloned and shared across threads freely.
#[derive(Debug, Clone, Serialize)]
pub struct Roots {
    base_dir: String,
    internal: String,
    external: String,
    removable: String,
    removable_top: String,
    #[serde(skip)]
    assets: Arc<dyn AssetBundle>,
}

impl Roots {
    /// Computes the bases of every root under `base_dir`.
    ///
    /// Fails when the context cannot provide one of the directories.
    pub fn init<C>(context: &C, base_dir: &str) -> Result<Self>
    where
        C: StorageContext + ?Sized,
    {
        let internal = require(context.app_data_dir(), "app data")?;
        let external = require(context.app_external_dir(), "app external")?;
        let removable = require(context.removable_storage_dir(), "removable storage")?;

        let roots = Self {
            base_dir: base_dir.to_string(),
            internal: base(&internal.join(base_dir)),
            external: base(&external.join(base_dir)),
            removable: base(&removable.join(base_dir)),
            removable_top: base(&removable),
            assets: context.assets(),
        };
        debug!(
            roots = %serde_json::to_string(&roots).unwrap_or_default(),
            "Storage roots initialized"
        );
        Ok(roots)
    }

    /// Joins `relative` under the base of `root`. Absolute paths and asset
    /// keys are returned unchanged.
    pub fn resolve(&self, root: Root, relative: &str) -> String {
        let base = match root {
            Root::Internal => &self.internal,
            Root::External => &self.external,
            Root::Removable => &self.removable,
            Root::RemovableTop => &self.removable_top,
            Root::Absolute | Root::Asset => return relative.to_string(),
        };
        format!("{base}{}", relative.trim_start_matches(SEPARATOR))
    }

    pub fn handle(&self, root: Root, relative: &str) -> FileHandle {
        match root {
            Root::Asset => FileHandle::asset(self.assets.clone(), relative),
            _ => FileHandle::new(self.resolve(root, relative)),
        }
    }

    pub fn internal(&self, path: &str) -> FileHandle {
        self.handle(Root::Internal, path)
    }

    pub fn internal_in(&self, dir: &str, name: &str) -> FileHandle {
        self.internal(&nest(dir, name))
    }

    pub fn external(&self, path: &str) -> FileHandle {
        self.handle(Root::External, path)
    }

    pub fn external_in(&self, dir: &str, name: &str) -> FileHandle {
        self.external(&nest(dir, name))
    }

    pub fn removable(&self, path: &str) -> FileHandle {
        self.handle(Root::Removable, path)
    }

    pub fn removable_in(&self, dir: &str, name: &str) -> FileHandle {
        self.removable(&nest(dir, name))
    }

    pub fn removable_top(&self, path: &str) -> FileHandle {
        self.handle(Root::RemovableTop, path)
    }

    pub fn absolute(&self, path: &str) -> FileHandle {
        self.handle(Root::Absolute, path)
    }

    pub fn asset(&self, path: &str) -> FileHandle {
        self.handle(Root::Asset, path)
    }

    /// Base of [`Root::Internal`], ending with a separator.
    pub fn internal_base(&self) -> &str {
        &self.internal
    }

    pub fn external_base(&self) -> &str {
        &self.external
    }

    pub fn removable_base(&self) -> &str {
        &self.removable
    }

    pub fn removable_top_base(&self) -> &str {
        &self.removable_top
    }

    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }
}

fn require(dir: Option<PathBuf>, name: &str) -> Result<PathBuf> {
    dir.ok_or_else(|| Error::operate(format!("Storage directory is not available: {name}")))
}

fn base(path: &Path) -> String {
    let mut base = path.to_string_lossy().trim_end_matches(SEPARATOR).to_string();
    base.push(SEPARATOR);
    base
}

fn nest(dir: &str, name: &str) -> String {
    format!("{dir}{SEPARATOR}{name}")
}
