//! Resolution of logical storage roots to [`FileHandle`]s.
//!
//! [`Roots`] is computed once from a [`StorageContext`] and then hands out
//! handles for internal, external, removable and absolute paths, plus
//! read-only handles into the application's asset bundle.
//!
//! [`FileHandle`]: filekit_fs::FileHandle

mod context;
mod log;
mod roots;

pub use context::{DirContext, StorageContext};
pub use log::{init_tracing, Guard};
pub use roots::{Root, Roots, CACHE, DATA, FILES, MEDIA, OBB};
