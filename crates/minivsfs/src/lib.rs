//! MiniVSFS image core: on-disk records, checksums, layout planning and allocation.
#![allow(clippy::cargo_common_metadata)]

pub mod bits;
pub mod checksum;
pub mod constants;
pub mod error;
pub mod image;
pub mod layout;
pub mod ondisk;
pub mod ops;
pub mod store;

pub use error::{FsError, FsResult};
pub use image::{AddedFile, FileMetadata, FormatOptions, Image, Issue};
pub use layout::Layout;
pub use ondisk::{DirEntry, Inode, NodeKind, Superblock};
