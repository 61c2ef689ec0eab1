use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::backing::{Backing, OpenMode};
use crate::hasher::KeyHasher;
use crate::layout::{Header, Layout, HEADER_LEN, MIN_CAPACITY};
use crate::slots::{ProbeSeq, Slot};
use crate::store::{StoreView, StoreViewMut};
use crate::{DiskMapError, Result};

/// Record schema passed to [`DiskMap::open`].
///
/// `key_maxlen` is the longest accepted key in bytes, excluding the NUL
/// terminator the file stores; multiples of 8 minus 1 (7, 15, 23, ...) waste
/// no padding. `object_datalen` is the exact byte length of every value.
///
/// When opening an existing table either field may be zero, meaning "accept
/// what the file says"; a non-zero field that disagrees with the file is an
/// error. Creating a new table requires both fields to be non-zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskMapOptions {
    pub key_maxlen: u64,
    pub object_datalen: u64,
}

impl DiskMapOptions {
    pub fn new(key_maxlen: u64, object_datalen: u64) -> Self {
        DiskMapOptions {
            key_maxlen,
            object_datalen,
        }
    }

    /// Zero-valued options: infer both schema fields from the file.
    pub fn zeroed() -> Self {
        DiskMapOptions::default()
    }
}

/// Counter snapshot of an open table, serializable for tooling.
#[derive(Debug, Serialize)]
pub struct DiskMapStats {
    /// Live key-value pairs.
    pub size: u64,
    /// Total slots in the hash index.
    pub capacity: u64,
    /// Ordinals assigned since the last rehash (live plus retired).
    pub slots_used: u64,
    /// Retired ordinals awaiting compaction.
    pub dirty_slots: u64,
    pub key_maxlen: u64,
    pub object_datalen: u64,
    /// Logical file length in bytes.
    pub file_length: u64,
    pub read_only: bool,
    /// Whether the table was copied into anonymous memory.
    pub resident: bool,
}

/// Persistent hash table mapped directly from a single file.
///
/// A `DiskMap` projects the whole table file into the address space and
/// mutates it in place: constant-time keyed lookup, insert, update and
/// delete, plus dense insertion-order ordinals for indexed iteration. There
/// is no log and no serialization step; the mapped bytes are the table.
///
/// Every mutating method takes `&mut self`, so data views handed out by
/// [`lookup`](Self::lookup) can never outlive a growth that remaps the
/// arena; the borrow checker enforces what the file format cannot.
///
/// Dropping the handle syncs the mapping, unmaps it, truncates the file to
/// its logical length and closes it.
#[derive(Debug)]
pub struct DiskMap {
    path: PathBuf,
    backing: Backing,
    layout: Layout,
    size: u64,
    slots_used: u64,
    hasher: KeyHasher,
    poisoned: bool,
}

impl DiskMap {
    /// Opens a table file.
    ///
    /// A writable open of a missing or zero-length file creates a fresh
    /// table (capacity 8) and requires both option fields to be non-zero.
    /// Opening an existing table validates the header and reconciles
    /// `options` against it: zero fields are populated from the file,
    /// non-zero fields must match.
    ///
    /// # Errors
    ///
    /// [`DiskMapError::Corruption`] for a bad magic, version or header;
    /// [`DiskMapError::InvalidArgument`] for mismatched options;
    /// [`DiskMapError::OutOfMemory`] if the file cannot be mapped;
    /// [`DiskMapError::Io`] for open and metadata failures.
    pub fn open(
        path: impl AsRef<Path>,
        options: DiskMapOptions,
        mode: OpenMode,
    ) -> Result<DiskMap> {
        let path = path.as_ref().to_path_buf();
        let file = Backing::open_file(&path, mode)?;
        let file_len = file.metadata()?.len();

        if file_len == 0 {
            if !mode.is_writable() {
                return Err(DiskMapError::Corruption(
                    "file too small for a table header: 0 bytes".to_string(),
                ));
            }
            return Self::create_table(path, file, options);
        }
        Self::open_existing(path, file, file_len, options, mode)
    }

    fn create_table(path: PathBuf, file: File, options: DiskMapOptions) -> Result<DiskMap> {
        if options.key_maxlen == 0 || options.object_datalen == 0 {
            return Err(DiskMapError::InvalidArgument(
                "creating a table requires key_maxlen and object_datalen > 0".to_string(),
            ));
        }
        let layout = Layout {
            key_maxlen: options.key_maxlen,
            object_datalen: options.object_datalen,
            capacity: MIN_CAPACITY,
        };
        let full_len = layout.checked_full_len().ok_or_else(|| {
            DiskMapError::InvalidArgument(
                "options describe a record too large to lay out".to_string(),
            )
        })?;
        file.set_len(full_len)?;

        let mut backing = Backing::map_writable(file)?;
        Header {
            key_maxlen: layout.key_maxlen,
            object_datalen: layout.object_datalen,
            capacity: layout.capacity,
            size: 0,
            slots_used: 0,
        }
        .encode(backing.bytes_mut()?);
        backing.sync()?;

        tracing::info!(
            path = %path.display(),
            key_maxlen = layout.key_maxlen,
            object_datalen = layout.object_datalen,
            capacity = layout.capacity,
            "created new table"
        );
        Ok(DiskMap {
            path,
            backing,
            layout,
            size: 0,
            slots_used: 0,
            hasher: KeyHasher::new(),
            poisoned: false,
        })
    }

    fn open_existing(
        path: PathBuf,
        file: File,
        file_len: u64,
        options: DiskMapOptions,
        mode: OpenMode,
    ) -> Result<DiskMap> {
        if file_len < HEADER_LEN as u64 {
            return Err(DiskMapError::Corruption(format!(
                "file too small for a table header: {file_len} bytes"
            )));
        }
        let mut head = [0u8; HEADER_LEN];
        (&file).read_exact(&mut head)?;
        let header = Header::decode(&head)?;

        if options.key_maxlen != 0 && options.key_maxlen != header.key_maxlen {
            return Err(DiskMapError::InvalidArgument(format!(
                "key_maxlen {} does not match the table's {}",
                options.key_maxlen, header.key_maxlen
            )));
        }
        if options.object_datalen != 0 && options.object_datalen != header.object_datalen {
            return Err(DiskMapError::InvalidArgument(format!(
                "object_datalen {} does not match the table's {}",
                options.object_datalen, header.object_datalen
            )));
        }

        let layout = Layout::from_header(&header);
        let full_len = layout.checked_full_len().ok_or_else(|| {
            DiskMapError::Corruption("header geometry overflows the file layout".to_string())
        })?;
        let logical_len = layout.logical_len(header.slots_used);
        if file_len < logical_len {
            return Err(DiskMapError::Corruption(format!(
                "file truncated: {file_len} bytes on disk, {logical_len} required"
            )));
        }

        let backing = if mode.is_writable() {
            if file_len < full_len {
                file.set_len(full_len)?;
            }
            Backing::map_writable(file)?
        } else {
            Backing::map_read_only(file)?
        };

        tracing::info!(
            path = %path.display(),
            size = header.size,
            slots_used = header.slots_used,
            capacity = header.capacity,
            read_only = !mode.is_writable(),
            "opened table"
        );
        Ok(DiskMap {
            path,
            backing,
            layout,
            size: header.size,
            slots_used: header.slots_used,
            hasher: KeyHasher::new(),
            poisoned: false,
        })
    }

    /// Looks up a key and returns a view of its data bytes, or `None` if
    /// absent.
    ///
    /// The view borrows the mapping and is invalidated by the next mutation
    /// on this handle. On a writable handle, in-place mutation goes through
    /// [`lookup_mut`](Self::lookup_mut).
    pub fn lookup(&self, key: &str) -> Option<&[u8]> {
        if self.poisoned || !self.valid_key(key) {
            return None;
        }
        match self.find(key.as_bytes()) {
            Ok(Some((_slot, ordinal))) => {
                Some(StoreView::new(self.backing.bytes(), self.layout).data(ordinal))
            }
            _ => None,
        }
    }

    /// Looks up a key on a writable handle and returns a mutable view of
    /// its data bytes.
    ///
    /// The table does not observe these writes; this is the intended path
    /// for mutating a record without re-keying it. Keys that could never be
    /// stored (too long, interior NUL) report `Ok(None)` like any other
    /// absent key.
    pub fn lookup_mut(&mut self, key: &str) -> Result<Option<&mut [u8]>> {
        self.check_poisoned()?;
        self.check_writable()?;
        if !self.valid_key(key) {
            return Ok(None);
        }
        let Some((_slot, ordinal)) = self.find(key.as_bytes())? else {
            return Ok(None);
        };
        let layout = self.layout;
        Ok(Some(
            StoreViewMut::new(self.backing.bytes_mut()?, layout).into_data_mut(ordinal),
        ))
    }

    /// Inserts a key-value pair.
    ///
    /// Returns `true` if the pair was inserted and `false` if the key was
    /// already present, in which case the table is unchanged. Triggers an
    /// amortized growth once the occupancy counter would reach 7/10 of
    /// capacity.
    ///
    /// # Errors
    ///
    /// [`DiskMapError::InvalidArgument`] for an over-long or NUL-carrying
    /// key or data of the wrong length;
    /// [`DiskMapError::PermissionDenied`] on a read-only handle;
    /// [`DiskMapError::OutOfMemory`] if growth cannot extend or map the
    /// file (the table is left unchanged).
    pub fn insert(&mut self, key: &str, data: &[u8]) -> Result<bool> {
        self.check_poisoned()?;
        self.check_writable()?;
        self.check_key(key)?;
        self.check_data(data)?;

        if (self.slots_used + 1) * 10 >= self.layout.capacity * 7 {
            let doubled = self.layout.capacity * 2;
            self.grow(doubled)?;
        }
        if self.slots_used >= self.layout.capacity {
            return Err(DiskMapError::Corruption(
                "arena full before load-factor growth".to_string(),
            ));
        }

        let view = StoreView::new(self.backing.bytes(), self.layout);
        let hash = self.hasher.hash(key.as_bytes());
        let mut reusable = None;
        let mut target = None;
        // Keep probing past tombstones until an empty slot proves the key
        // absent, then place into the first tombstone seen, if any.
        for index in ProbeSeq::new(hash, self.layout.capacity).take(self.layout.capacity as usize)
        {
            match view.slot(index) {
                Slot::Empty => {
                    target = Some(reusable.unwrap_or(index));
                    break;
                }
                Slot::Tombstone => {
                    if reusable.is_none() {
                        reusable = Some(index);
                    }
                }
                Slot::Occupied(ordinal) => {
                    if view.key(ordinal) == key.as_bytes() {
                        return Ok(false);
                    }
                }
            }
        }
        let Some(target) = target else {
            return Err(DiskMapError::Corruption(
                "probe sequence never reached an empty slot".to_string(),
            ));
        };

        let ordinal = self.slots_used;
        let layout = self.layout;
        let mut view = StoreViewMut::new(self.backing.bytes_mut()?, layout);
        view.write_record(ordinal, key.as_bytes(), data);
        view.set_slot(target, Slot::Occupied(ordinal));
        view.set_dir(ordinal, Some(target));
        self.slots_used += 1;
        self.size += 1;
        self.write_counters()?;
        Ok(true)
    }

    /// Overwrites the data of an existing key.
    ///
    /// Returns `true` if the record was updated and `false` if the key is
    /// not in the table.
    pub fn update(&mut self, key: &str, data: &[u8]) -> Result<bool> {
        self.check_poisoned()?;
        self.check_writable()?;
        self.check_key(key)?;
        self.check_data(data)?;

        let Some((_slot, ordinal)) = self.find(key.as_bytes())? else {
            return Ok(false);
        };
        let layout = self.layout;
        StoreViewMut::new(self.backing.bytes_mut()?, layout).write_data(ordinal, data);
        Ok(true)
    }

    /// Deletes a key.
    ///
    /// Returns `true` if a record was deleted and `false` if the key is not
    /// in the table. The slot is tombstoned and the record's ordinal
    /// retired; the arena gap persists until the next growth compacts it.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        self.check_poisoned()?;
        self.check_writable()?;
        self.check_key(key)?;

        let Some((slot_index, ordinal)) = self.find(key.as_bytes())? else {
            return Ok(false);
        };
        let layout = self.layout;
        let mut view = StoreViewMut::new(self.backing.bytes_mut()?, layout);
        view.set_slot(slot_index, Slot::Tombstone);
        view.set_dir(ordinal, None);
        self.size -= 1;
        self.write_counters()?;
        Ok(true)
    }

    /// Ensures capacity for at least `capacity` slots.
    ///
    /// The request is rounded up to the next power of two no smaller than 8.
    /// A request at or below the current capacity is a no-op; either way the
    /// resulting capacity is returned, so `reserve(1)` doubles as a query.
    ///
    /// Growth rebuilds the hash index and compacts insertion-order ordinals
    /// to `[0, size)`, preserving their relative order. If the larger file
    /// cannot be created, extended or mapped, the table is unchanged.
    pub fn reserve(&mut self, capacity: u64) -> Result<u64> {
        self.check_poisoned()?;
        self.check_writable()?;

        let target = capacity
            .max(MIN_CAPACITY)
            .checked_next_power_of_two()
            .ok_or_else(|| {
                DiskMapError::OutOfMemory(format!(
                    "capacity {capacity} cannot round up to a power of two"
                ))
            })?;
        if target <= self.layout.capacity {
            return Ok(self.layout.capacity);
        }
        self.grow(target)?;
        Ok(self.layout.capacity)
    }

    /// Fetches the record assigned insertion-order ordinal `ordinal`.
    ///
    /// Ordinals run over `[0, slots_used)`; live ones yield the key and a
    /// copy of the data.
    ///
    /// # Errors
    ///
    /// [`DiskMapError::InvalidArgument`] when the ordinal is out of range,
    /// [`DiskMapError::Vacant`] when it was retired by a delete.
    pub fn indexed_lookup(&self, ordinal: u64) -> Result<(String, Vec<u8>)> {
        self.check_poisoned()?;
        if ordinal >= self.slots_used {
            return Err(DiskMapError::InvalidArgument(format!(
                "ordinal {ordinal} out of range, slots_used = {}",
                self.slots_used
            )));
        }
        let view = StoreView::new(self.backing.bytes(), self.layout);
        let Some(slot_index) = view.dir_slot(ordinal) else {
            return Err(DiskMapError::Vacant(ordinal));
        };
        match view.slot(slot_index) {
            Slot::Occupied(held) if held == ordinal => {}
            _ => {
                return Err(DiskMapError::Corruption(format!(
                    "store directory points ordinal {ordinal} at slot {slot_index} which does not hold it"
                )));
            }
        }
        let key = std::str::from_utf8(view.key(ordinal))
            .map_err(|_| {
                DiskMapError::Corruption(format!("record {ordinal} holds a non-UTF-8 key"))
            })?
            .to_string();
        Ok((key, view.data(ordinal).to_vec()))
    }

    /// Iterates live records in insertion order, skipping retired ordinals.
    pub fn iter(&self) -> DiskMapIter<'_> {
        DiskMapIter {
            map: self,
            ordinal: 0,
        }
    }

    /// Copies the whole table into anonymous memory and operates from RAM
    /// thereafter.
    ///
    /// Permitted exactly once, and only on a read-only handle. A second
    /// call, or a call on a writable handle, reports
    /// [`DiskMapError::ImpossibleOperation`] and leaves the handle usable.
    /// If the copy cannot be allocated the handle is poisoned and must be
    /// dropped.
    pub fn load_to_memory(&mut self) -> Result<()> {
        self.check_poisoned()?;
        match &self.backing {
            Backing::Writable { .. } => Err(DiskMapError::ImpossibleOperation(
                "only read-only tables can be loaded to memory".to_string(),
            )),
            Backing::Memory { .. } => Err(DiskMapError::ImpossibleOperation(
                "table is already resident in memory".to_string(),
            )),
            Backing::ReadOnly { map, .. } => {
                let mut buf: Vec<u8> = Vec::new();
                if buf.try_reserve_exact(map.len()).is_err() {
                    self.poisoned = true;
                    return Err(DiskMapError::OutOfMemory(format!(
                        "failed to allocate {} bytes for the in-memory copy",
                        map.len()
                    )));
                }
                buf.extend_from_slice(&map[..]);
                tracing::info!(
                    bytes = buf.len(),
                    path = %self.path.display(),
                    "table loaded to memory"
                );
                self.backing = Backing::Memory { buf };
                Ok(())
            }
        }
    }

    /// Flushes dirty pages of a writable mapping to disk.
    pub fn sync(&self) -> Result<()> {
        self.backing.sync()
    }

    /// Number of live key-value pairs.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Total slots in the hash index; always a power of two.
    pub fn capacity(&self) -> u64 {
        self.layout.capacity
    }

    /// Ordinals assigned since the last rehash: live records plus retired
    /// gaps.
    pub fn slots_used(&self) -> u64 {
        self.slots_used
    }

    /// Retired ordinals that a future growth will compact away.
    pub fn dirty_slots(&self) -> u64 {
        self.slots_used - self.size
    }

    /// Longest accepted key length in bytes, excluding the terminator.
    pub fn key_maxlen(&self) -> u64 {
        self.layout.key_maxlen
    }

    /// Exact byte length of every value.
    pub fn object_datalen(&self) -> u64 {
        self.layout.object_datalen
    }

    pub fn is_read_only(&self) -> bool {
        !self.backing.is_writable()
    }

    /// Whether the table operates out of an anonymous memory copy.
    pub fn is_resident(&self) -> bool {
        self.backing.is_resident()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Counter snapshot for diagnostics and tooling.
    pub fn stats(&self) -> DiskMapStats {
        DiskMapStats {
            size: self.size,
            capacity: self.layout.capacity,
            slots_used: self.slots_used,
            dirty_slots: self.dirty_slots(),
            key_maxlen: self.layout.key_maxlen,
            object_datalen: self.layout.object_datalen,
            file_length: self.layout.logical_len(self.slots_used),
            read_only: self.is_read_only(),
            resident: self.is_resident(),
        }
    }

    /// Walks the probe sequence for `key`.
    ///
    /// `Ok(Some((slot, ordinal)))` on a hit, `Ok(None)` once an empty slot
    /// proves the key absent. Visiting every slot without reaching an empty
    /// one is unreachable under the load-factor invariant and reported as
    /// corruption.
    fn find(&self, key: &[u8]) -> Result<Option<(u64, u64)>> {
        let view = StoreView::new(self.backing.bytes(), self.layout);
        let hash = self.hasher.hash(key);
        for index in ProbeSeq::new(hash, self.layout.capacity).take(self.layout.capacity as usize)
        {
            match view.slot(index) {
                Slot::Empty => return Ok(None),
                Slot::Tombstone => continue,
                Slot::Occupied(ordinal) => {
                    if view.key(ordinal) == key {
                        return Ok(Some((index, ordinal)));
                    }
                }
            }
        }
        Err(DiskMapError::Corruption(
            "probe sequence never reached an empty slot".to_string(),
        ))
    }

    /// Rebuilds the table at `new_capacity` in a sibling temp file, renames
    /// it over the table path and swaps the mapping. Any failure before the
    /// rename leaves the current mapping untouched.
    fn grow(&mut self, new_capacity: u64) -> Result<()> {
        let new_layout = Layout {
            capacity: new_capacity,
            ..self.layout
        };
        let Some(new_len) = new_layout.checked_full_len() else {
            return Err(DiskMapError::OutOfMemory(format!(
                "capacity {new_capacity} overflows the file layout"
            )));
        };

        let tmp_path = grow_path(&self.path);
        let result = self
            .build_grown(&tmp_path, new_layout, new_len)
            .and_then(|(backing, live)| {
                std::fs::rename(&tmp_path, &self.path)?;
                Ok((backing, live))
            });
        match result {
            Ok((backing, live)) => {
                tracing::info!(
                    old_capacity = self.layout.capacity,
                    new_capacity,
                    live,
                    path = %self.path.display(),
                    "table grown"
                );
                self.backing = backing;
                self.layout = new_layout;
                self.slots_used = live;
                Ok(())
            }
            Err(err) => {
                let _ = std::fs::remove_file(&tmp_path);
                Err(err)
            }
        }
    }

    /// Writes the doubled table into `tmp_path`: live records are copied in
    /// ordinal order (compacting ordinals to `[0, size)`), re-hashed and
    /// re-inserted into the fresh slot array and directory.
    fn build_grown(
        &self,
        tmp_path: &Path,
        new_layout: Layout,
        new_len: u64,
    ) -> Result<(Backing, u64)> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(tmp_path)?;
        file.set_len(new_len).map_err(|e| {
            DiskMapError::OutOfMemory(format!("failed to extend table file to {new_len} bytes: {e}"))
        })?;
        let mut backing = Backing::map_writable(file)?;

        let old = StoreView::new(self.backing.bytes(), self.layout);
        let mut live = 0u64;
        {
            let mut fresh = StoreViewMut::new(backing.bytes_mut()?, new_layout);
            for ordinal in 0..self.slots_used {
                if old.dir_slot(ordinal).is_none() {
                    continue;
                }
                let new_ordinal = live;
                fresh.copy_record(new_ordinal, old.record_bytes(ordinal));

                let hash = self.hasher.hash(old.key(ordinal));
                let mut placed = false;
                for index in
                    ProbeSeq::new(hash, new_layout.capacity).take(new_layout.capacity as usize)
                {
                    if fresh.slot(index) == Slot::Empty {
                        fresh.set_slot(index, Slot::Occupied(new_ordinal));
                        fresh.set_dir(new_ordinal, Some(index));
                        placed = true;
                        break;
                    }
                }
                if !placed {
                    return Err(DiskMapError::Corruption(
                        "rehash found no empty slot in the doubled table".to_string(),
                    ));
                }
                live += 1;
            }
        }
        if live != self.size {
            return Err(DiskMapError::Corruption(format!(
                "live record count {live} disagrees with header size {}",
                self.size
            )));
        }

        Header {
            key_maxlen: new_layout.key_maxlen,
            object_datalen: new_layout.object_datalen,
            capacity: new_layout.capacity,
            size: live,
            slots_used: live,
        }
        .encode(backing.bytes_mut()?);
        backing.sync()?;
        Ok((backing, live))
    }

    fn write_counters(&mut self) -> Result<()> {
        let (size, slots_used) = (self.size, self.slots_used);
        Header::write_counters(self.backing.bytes_mut()?, size, slots_used);
        Ok(())
    }

    fn check_poisoned(&self) -> Result<()> {
        if self.poisoned {
            return Err(DiskMapError::ImpossibleOperation(
                "handle was poisoned by a failed operation and must be dropped".to_string(),
            ));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<()> {
        if !self.backing.is_writable() {
            return Err(DiskMapError::PermissionDenied(
                "table is open read-only".to_string(),
            ));
        }
        Ok(())
    }

    fn check_key(&self, key: &str) -> Result<()> {
        if key.len() as u64 >= self.layout.key_maxlen {
            return Err(DiskMapError::InvalidArgument(format!(
                "key length {} exceeds maximum {}",
                key.len(),
                self.layout.key_maxlen - 1
            )));
        }
        if key.as_bytes().contains(&0) {
            return Err(DiskMapError::InvalidArgument(
                "key contains a NUL byte".to_string(),
            ));
        }
        Ok(())
    }

    fn valid_key(&self, key: &str) -> bool {
        self.check_key(key).is_ok()
    }

    fn check_data(&self, data: &[u8]) -> Result<()> {
        if data.len() as u64 != self.layout.object_datalen {
            return Err(DiskMapError::InvalidArgument(format!(
                "data length {} does not match object_datalen {}",
                data.len(),
                self.layout.object_datalen
            )));
        }
        Ok(())
    }
}

impl Drop for DiskMap {
    fn drop(&mut self) {
        let backing = std::mem::replace(&mut self.backing, Backing::Memory { buf: Vec::new() });
        backing.shutdown(self.layout.logical_len(self.slots_used));
    }
}

/// Insertion-order iterator over the live records of a [`DiskMap`].
pub struct DiskMapIter<'a> {
    map: &'a DiskMap,
    ordinal: u64,
}

impl<'a> Iterator for DiskMapIter<'a> {
    type Item = Result<(String, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.ordinal < self.map.slots_used() {
            let ordinal = self.ordinal;
            self.ordinal += 1;
            match self.map.indexed_lookup(ordinal) {
                Ok(entry) => return Some(Ok(entry)),
                Err(DiskMapError::Vacant(_)) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
        None
    }
}

fn grow_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("table"));
    name.push(".grow");
    path.with_file_name(name)
}
