//! # filekit_fs
//!
//! A handle based file API that puts writable filesystem paths and read-only
//! bundled assets behind one contract.
//!
//! A [`FileHandle`] is a path string plus the storage it lives in. Path
//! derivations are plain string operations; reads, writes, listing, copying
//! and moving go through the storage. Handles backed by an [`AssetBundle`]
//! reject every mutating operation with [`Error::Capability`], so callers
//! can tell "not supported here" apart from an I/O failure
//! ([`Error::Operate`]).
//!
//! Text is read and written through [`Reader`] and [`Writer`], which
//! transcode between UTF-8 and the supported [`Charset`]s.

mod asset;
mod charset;
mod error;
mod handle;
mod list;
mod meta;
mod ops;
mod read;
mod size;
mod stream;
mod temp;
mod write;

pub use asset::{AssetBundle, EmbeddedAssets, MemoryAssets};
pub use charset::Charset;
pub use error::{Error, ErrorKind, Result};
pub use handle::{Capability, FileHandle, LINE_SEPARATOR, SEPARATOR};
pub use size::format_size;
pub use stream::{copy_stream, ByteStream, Reader, Writer, DEFAULT_BUFFER_SIZE};
