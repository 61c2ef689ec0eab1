use crate::{DiskMapError, Result, FORMAT_VERSION, MAGIC};

/// Byte length of the on-disk header, including padding.
pub(crate) const HEADER_LEN: usize = 64;

/// Smallest permitted slot count; capacities are always powers of two.
pub(crate) const MIN_CAPACITY: u64 = 8;

const OFF_KEY_MAXLEN: usize = 8;
const OFF_OBJECT_DATALEN: usize = 16;
const OFF_CAPACITY: usize = 24;
const OFF_SIZE: usize = 32;
const OFF_SLOTS_USED: usize = 40;

/// Rounds `n` up to the next multiple of 8.
#[inline]
pub(crate) const fn align8(n: u64) -> u64 {
    (n + 7) & !7
}

/// Overflow-aware [`align8`] for values read off disk.
#[inline]
fn checked_align8(n: u64) -> Option<u64> {
    n.checked_add(7).map(|v| v & !7)
}

/// Decoded view of the fixed 64-byte header at offset 0 of a table file.
///
/// ```text
/// 0..8    magic (7 ASCII bytes) + format version byte
/// 8..16   key_maxlen        (u64 LE, excludes the NUL terminator)
/// 16..24  object_datalen    (u64 LE)
/// 24..32  capacity          (u64 LE, power of two)
/// 32..40  size              (u64 LE, live entries)
/// 40..48  slots_used        (u64 LE, ordinals assigned since last rehash)
/// 48..64  zero padding
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Header {
    pub key_maxlen: u64,
    pub object_datalen: u64,
    pub capacity: u64,
    pub size: u64,
    pub slots_used: u64,
}

impl Header {
    /// Decodes and validates a header from the start of `bytes`.
    ///
    /// Magic or version mismatches, non-power-of-two capacities, zero schema
    /// fields, and counter inversions are all reported as corruption: the
    /// file is not a table this crate can operate on.
    pub(crate) fn decode(bytes: &[u8]) -> Result<Header> {
        if bytes.len() < HEADER_LEN {
            return Err(DiskMapError::Corruption(format!(
                "file too small for a table header: {} bytes",
                bytes.len()
            )));
        }
        if bytes[..MAGIC.len()] != MAGIC {
            return Err(DiskMapError::Corruption(
                "bad magic: not a diskmap table".to_string(),
            ));
        }
        let version = bytes[MAGIC.len()];
        if version != FORMAT_VERSION {
            return Err(DiskMapError::Corruption(format!(
                "unsupported format version {version} (expected {FORMAT_VERSION})"
            )));
        }

        let header = Header {
            key_maxlen: read_u64(bytes, OFF_KEY_MAXLEN),
            object_datalen: read_u64(bytes, OFF_OBJECT_DATALEN),
            capacity: read_u64(bytes, OFF_CAPACITY),
            size: read_u64(bytes, OFF_SIZE),
            slots_used: read_u64(bytes, OFF_SLOTS_USED),
        };

        if header.key_maxlen == 0 || header.object_datalen == 0 {
            return Err(DiskMapError::Corruption(
                "header schema fields must be non-zero".to_string(),
            ));
        }
        if header.capacity < MIN_CAPACITY || !header.capacity.is_power_of_two() {
            return Err(DiskMapError::Corruption(format!(
                "capacity {} is not a power of two >= {MIN_CAPACITY}",
                header.capacity
            )));
        }
        if header.size > header.slots_used || header.slots_used > header.capacity {
            return Err(DiskMapError::Corruption(format!(
                "inconsistent counters: size={} slots_used={} capacity={}",
                header.size, header.slots_used, header.capacity
            )));
        }
        Ok(header)
    }

    /// Writes the full header, zeroing the reserved tail.
    pub(crate) fn encode(&self, bytes: &mut [u8]) {
        bytes[..HEADER_LEN].fill(0);
        bytes[..MAGIC.len()].copy_from_slice(&MAGIC);
        bytes[MAGIC.len()] = FORMAT_VERSION;
        write_u64(bytes, OFF_KEY_MAXLEN, self.key_maxlen);
        write_u64(bytes, OFF_OBJECT_DATALEN, self.object_datalen);
        write_u64(bytes, OFF_CAPACITY, self.capacity);
        write_u64(bytes, OFF_SIZE, self.size);
        write_u64(bytes, OFF_SLOTS_USED, self.slots_used);
    }

    /// Refreshes the two counters every mutation touches, leaving the rest
    /// of the header bytes alone.
    pub(crate) fn write_counters(bytes: &mut [u8], size: u64, slots_used: u64) {
        write_u64(bytes, OFF_SIZE, size);
        write_u64(bytes, OFF_SLOTS_USED, slots_used);
    }
}

#[inline]
fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap())
}

#[inline]
fn write_u64(bytes: &mut [u8], offset: usize, value: u64) {
    bytes[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

/// Region geometry of a table file for one (schema, capacity) pair.
///
/// The file is `[ header | slot array | store directory | record arena ]`,
/// every boundary 8-byte aligned. The two index regions are `capacity` words
/// each; the arena holds one fixed-stride record per assigned ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Layout {
    pub key_maxlen: u64,
    pub object_datalen: u64,
    pub capacity: u64,
}

impl Layout {
    pub(crate) fn from_header(header: &Header) -> Layout {
        Layout {
            key_maxlen: header.key_maxlen,
            object_datalen: header.object_datalen,
            capacity: header.capacity,
        }
    }

    /// Bytes reserved for the key, NUL terminator included.
    #[inline]
    pub(crate) fn key_region(&self) -> u64 {
        align8(self.key_maxlen + 1)
    }

    /// Bytes per arena record: key region plus data, padded to 8.
    #[inline]
    pub(crate) fn record_stride(&self) -> u64 {
        self.key_region() + align8(self.object_datalen)
    }

    #[inline]
    pub(crate) fn slots_offset(&self) -> u64 {
        HEADER_LEN as u64
    }

    #[inline]
    pub(crate) fn dir_offset(&self) -> u64 {
        self.slots_offset() + self.capacity * 8
    }

    #[inline]
    pub(crate) fn arena_offset(&self) -> u64 {
        self.dir_offset() + self.capacity * 8
    }

    #[inline]
    pub(crate) fn slot_pos(&self, index: u64) -> usize {
        (self.slots_offset() + index * 8) as usize
    }

    #[inline]
    pub(crate) fn dir_pos(&self, ordinal: u64) -> usize {
        (self.dir_offset() + ordinal * 8) as usize
    }

    #[inline]
    pub(crate) fn record_pos(&self, ordinal: u64) -> usize {
        (self.arena_offset() + ordinal * self.record_stride()) as usize
    }

    /// File length that must exist for `slots_used` assigned ordinals.
    pub(crate) fn logical_len(&self, slots_used: u64) -> u64 {
        self.arena_offset() + slots_used * self.record_stride()
    }

    /// File length with the arena preallocated for `capacity` records, or
    /// `None` if the geometry overflows a u64.
    pub(crate) fn checked_full_len(&self) -> Option<u64> {
        let key_region = checked_align8(self.key_maxlen.checked_add(1)?)?;
        let stride = key_region.checked_add(checked_align8(self.object_datalen)?)?;
        let indexes = self.capacity.checked_mul(16)?;
        let arena = self.capacity.checked_mul(stride)?;
        (HEADER_LEN as u64).checked_add(indexes)?.checked_add(arena)
    }

    /// Same as [`checked_full_len`](Self::checked_full_len) for geometry
    /// already known to fit.
    pub(crate) fn full_len(&self) -> u64 {
        self.arena_offset() + self.capacity * self.record_stride()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> Header {
        Header {
            key_maxlen: 15,
            object_datalen: 8,
            capacity: 8,
            size: 3,
            slots_used: 5,
        }
    }

    #[test]
    fn test_header_round_trip() {
        let header = sample_header();
        let mut bytes = [0u8; HEADER_LEN];
        header.encode(&mut bytes);
        assert_eq!(Header::decode(&bytes).unwrap(), header);
    }

    #[test]
    fn test_write_counters_preserves_schema() {
        let header = sample_header();
        let mut bytes = [0u8; HEADER_LEN];
        header.encode(&mut bytes);
        Header::write_counters(&mut bytes, 2, 7);
        let updated = Header::decode(&bytes).unwrap();
        assert_eq!(updated.size, 2);
        assert_eq!(updated.slots_used, 7);
        assert_eq!(updated.key_maxlen, header.key_maxlen);
        assert_eq!(updated.capacity, header.capacity);
    }

    #[test]
    fn test_decode_rejects_bad_magic() {
        let mut bytes = [0u8; HEADER_LEN];
        sample_header().encode(&mut bytes);
        bytes[0] ^= 0xff;
        let err = Header::decode(&bytes).unwrap_err();
        assert!(matches!(err, DiskMapError::Corruption(_)));
    }

    #[test]
    fn test_decode_rejects_bad_version() {
        let mut bytes = [0u8; HEADER_LEN];
        sample_header().encode(&mut bytes);
        bytes[MAGIC.len()] = FORMAT_VERSION + 1;
        let err = Header::decode(&bytes).unwrap_err();
        assert!(matches!(err, DiskMapError::Corruption(_)));
    }

    #[test]
    fn test_decode_rejects_inconsistent_counters() {
        let mut header = sample_header();
        header.size = 6;
        header.slots_used = 5;
        let mut bytes = [0u8; HEADER_LEN];
        header.encode(&mut bytes);
        assert!(Header::decode(&bytes).is_err());

        let mut header = sample_header();
        header.capacity = 12; // not a power of two
        header.encode(&mut bytes);
        assert!(Header::decode(&bytes).is_err());
    }

    #[test]
    fn test_decode_rejects_short_buffer() {
        assert!(Header::decode(&[0u8; 16]).is_err());
    }

    #[test]
    fn test_stride_alignment() {
        let layout = Layout {
            key_maxlen: 15,
            object_datalen: 8,
            capacity: 8,
        };
        // 15 + NUL fits exactly in 16 bytes; 8 data bytes keep it aligned.
        assert_eq!(layout.key_region(), 16);
        assert_eq!(layout.record_stride(), 24);

        let layout = Layout {
            key_maxlen: 10,
            object_datalen: 5,
            capacity: 8,
        };
        assert_eq!(layout.key_region(), 16);
        assert_eq!(layout.record_stride(), 24);
        assert_eq!(layout.record_stride() % 8, 0);
    }

    #[test]
    fn test_region_offsets() {
        let layout = Layout {
            key_maxlen: 15,
            object_datalen: 8,
            capacity: 8,
        };
        assert_eq!(layout.slots_offset(), 64);
        assert_eq!(layout.dir_offset(), 64 + 8 * 8);
        assert_eq!(layout.arena_offset(), 64 + 16 * 8);
        assert_eq!(layout.record_pos(0) as u64, layout.arena_offset());
        assert_eq!(
            layout.record_pos(2) as u64,
            layout.arena_offset() + 2 * layout.record_stride()
        );
        assert_eq!(layout.logical_len(0), layout.arena_offset());
        assert_eq!(layout.full_len(), layout.logical_len(8));
        assert_eq!(layout.checked_full_len(), Some(layout.full_len()));
    }

    #[test]
    fn test_checked_full_len_overflow() {
        let layout = Layout {
            key_maxlen: u64::MAX - 1,
            object_datalen: 8,
            capacity: 8,
        };
        assert_eq!(layout.checked_full_len(), None);
    }
}
