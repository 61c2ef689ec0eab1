//! Persistent, memory-mapped on-disk hash tables.
//!
//! The `diskmap` crate stores fixed-schema key-value records in a single
//! file whose entire state (header, hash index, insertion-order directory,
//! record arena) is projected into the address space and manipulated
//! in place. Lookups, inserts, updates and deletes are constant time; every
//! surviving record also carries a dense insertion-order ordinal usable for
//! indexed iteration. There is no write-ahead log and no serialization
//! step: closing and reopening the file yields the same table.
//!
//! Keys are bounded strings (`key_maxlen` bytes), values are exactly
//! `object_datalen` bytes; both are fixed when the table file is created.
//!
//! ```
//! use diskmap::{DiskMap, DiskMapOptions, OpenMode};
//!
//! # fn main() -> diskmap::Result<()> {
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("fruits.dht");
//!
//! let mut map = DiskMap::open(&path, DiskMapOptions::new(15, 8), OpenMode::Create)?;
//! map.insert("apple", &1u64.to_le_bytes())?;
//! map.insert("banana", &2u64.to_le_bytes())?;
//! assert_eq!(map.lookup("banana"), Some(&2u64.to_le_bytes()[..]));
//! assert_eq!(map.size(), 2);
//! # Ok(())
//! # }
//! ```

/// Leading bytes of every table file, followed by [`FORMAT_VERSION`].
pub(crate) const MAGIC: [u8; 7] = *b"DISKMAP";
pub(crate) const FORMAT_VERSION: u8 = 1;

mod error;
pub use error::{DiskMapError, Result};

mod hasher;

mod layout;

mod backing;
pub use backing::OpenMode;

mod slots;

mod store;

mod diskmap;
pub use diskmap::{DiskMap, DiskMapIter, DiskMapOptions, DiskMapStats};
