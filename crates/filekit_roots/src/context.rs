use std::path::PathBuf;
use std::sync::Arc;

use derive_setters::Setters;
use filekit_fs::{AssetBundle, MemoryAssets};

/// Where an application keeps its files.
///
/// Each directory is optional because a host may not provide it, e.g. when
/// no removable storage is mounted.
pub trait StorageContext {
    /// Private directory removed together with the application.
    fn app_data_dir(&self) -> Option<PathBuf>;

    /// Application directory that other applications can read.
    fn app_external_dir(&self) -> Option<PathBuf>;

    /// Top of the shared storage that survives the application.
    fn removable_storage_dir(&self) -> Option<PathBuf>;

    /// Read-only resources shipped with the application.
    fn assets(&self) -> Arc<dyn AssetBundle>;
}

/// A [`StorageContext`] made of explicitly configured directories.
#[derive(Debug, Clone, Setters)]
#[setters(strip_option, into)]
pub struct DirContext {
    pub data_dir: Option<PathBuf>,
    pub external_dir: Option<PathBuf>,
    pub removable_dir: Option<PathBuf>,
    #[setters(skip)]
    pub assets: Arc<dyn AssetBundle>,
}

impl Default for DirContext {
    fn default() -> Self {
        Self {
            data_dir: None,
            external_dir: None,
            removable_dir: None,
            assets: Arc::new(MemoryAssets::new()),
        }
    }
}

impl DirContext {
    /// Derives the directories of `app_id` from the conventional locations
    /// of the host platform.
    pub fn host(app_id: &str) -> Self {
        Self {
            data_dir: dirs::data_local_dir().map(|dir| dir.join(app_id)),
            external_dir: dirs::data_dir().map(|dir| dir.join(app_id)),
            removable_dir: dirs::home_dir(),
            ..Self::default()
        }
    }

    pub fn with_assets(mut self, assets: Arc<dyn AssetBundle>) -> Self {
        self.assets = assets;
        self
    }
}

impl StorageContext for DirContext {
    fn app_data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone()
    }

    fn app_external_dir(&self) -> Option<PathBuf> {
        self.external_dir.clone()
    }

    fn removable_storage_dir(&self) -> Option<PathBuf> {
        self.removable_dir.clone()
    }

    fn assets(&self) -> Arc<dyn AssetBundle> {
        self.assets.clone()
    }
}
