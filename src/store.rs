use crate::layout::Layout;
use crate::slots::Slot;

/// Read view over the slot array, store directory, and record arena of a
/// mapped table.
///
/// Offsets come from the layout; the caller guarantees that slot indices are
/// below `capacity` and ordinals below `slots_used`, both of which the
/// engine validates against the header before constructing a view.
#[derive(Clone, Copy)]
pub(crate) struct StoreView<'a> {
    bytes: &'a [u8],
    layout: Layout,
}

impl<'a> StoreView<'a> {
    pub(crate) fn new(bytes: &'a [u8], layout: Layout) -> StoreView<'a> {
        StoreView { bytes, layout }
    }

    #[inline]
    pub(crate) fn slot(&self, index: u64) -> Slot {
        Slot::decode(read_word(self.bytes, self.layout.slot_pos(index)))
    }

    /// Slot index currently holding `ordinal`, or `None` if the ordinal was
    /// retired by a delete.
    #[inline]
    pub(crate) fn dir_slot(&self, ordinal: u64) -> Option<u64> {
        match read_word(self.bytes, self.layout.dir_pos(ordinal)) {
            0 => None,
            word => Some(word - 1),
        }
    }

    /// Key bytes of a record, NUL terminator and padding trimmed.
    #[inline]
    pub(crate) fn key(&self, ordinal: u64) -> &'a [u8] {
        let pos = self.layout.record_pos(ordinal);
        let region = &self.bytes[pos..pos + self.layout.key_region() as usize];
        let len = region
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(region.len());
        &region[..len]
    }

    /// Data bytes of a record, exactly `object_datalen` long.
    #[inline]
    pub(crate) fn data(&self, ordinal: u64) -> &'a [u8] {
        let pos = self.layout.record_pos(ordinal) + self.layout.key_region() as usize;
        &self.bytes[pos..pos + self.layout.object_datalen as usize]
    }

    /// Whole record including padding, for verbatim copies during rehash.
    #[inline]
    pub(crate) fn record_bytes(&self, ordinal: u64) -> &'a [u8] {
        let pos = self.layout.record_pos(ordinal);
        &self.bytes[pos..pos + self.layout.record_stride() as usize]
    }
}

/// Write view over the same three regions.
pub(crate) struct StoreViewMut<'a> {
    bytes: &'a mut [u8],
    layout: Layout,
}

impl<'a> StoreViewMut<'a> {
    pub(crate) fn new(bytes: &'a mut [u8], layout: Layout) -> StoreViewMut<'a> {
        StoreViewMut { bytes, layout }
    }

    #[inline]
    pub(crate) fn slot(&self, index: u64) -> Slot {
        Slot::decode(read_word(self.bytes, self.layout.slot_pos(index)))
    }

    #[inline]
    pub(crate) fn set_slot(&mut self, index: u64, slot: Slot) {
        write_word(self.bytes, self.layout.slot_pos(index), slot.encode());
    }

    #[inline]
    pub(crate) fn set_dir(&mut self, ordinal: u64, slot_index: Option<u64>) {
        let word = match slot_index {
            Some(index) => index + 1,
            None => 0,
        };
        write_word(self.bytes, self.layout.dir_pos(ordinal), word);
    }

    /// Writes a fresh record: zeroes the stride, copies the key (the zeroed
    /// tail provides the NUL terminator) and the data.
    pub(crate) fn write_record(&mut self, ordinal: u64, key: &[u8], data: &[u8]) {
        let pos = self.layout.record_pos(ordinal);
        let stride = self.layout.record_stride() as usize;
        self.bytes[pos..pos + stride].fill(0);
        self.bytes[pos..pos + key.len()].copy_from_slice(key);
        let data_pos = pos + self.layout.key_region() as usize;
        self.bytes[data_pos..data_pos + data.len()].copy_from_slice(data);
    }

    /// Overwrites only the data region of an existing record.
    pub(crate) fn write_data(&mut self, ordinal: u64, data: &[u8]) {
        let pos = self.layout.record_pos(ordinal) + self.layout.key_region() as usize;
        self.bytes[pos..pos + data.len()].copy_from_slice(data);
    }

    /// Copies a full record taken from another table with the same stride.
    pub(crate) fn copy_record(&mut self, ordinal: u64, record: &[u8]) {
        let pos = self.layout.record_pos(ordinal);
        self.bytes[pos..pos + record.len()].copy_from_slice(record);
    }

    /// Consumes the view, handing out the record's mutable data region with
    /// the underlying borrow's lifetime.
    pub(crate) fn into_data_mut(self, ordinal: u64) -> &'a mut [u8] {
        let pos = self.layout.record_pos(ordinal) + self.layout.key_region() as usize;
        &mut self.bytes[pos..pos + self.layout.object_datalen as usize]
    }
}

#[inline]
fn read_word(bytes: &[u8], pos: usize) -> u64 {
    u64::from_le_bytes(bytes[pos..pos + 8].try_into().unwrap())
}

#[inline]
fn write_word(bytes: &mut [u8], pos: usize, word: u64) {
    bytes[pos..pos + 8].copy_from_slice(&word.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_layout() -> Layout {
        Layout {
            key_maxlen: 15,
            object_datalen: 8,
            capacity: 8,
        }
    }

    fn empty_table(layout: &Layout) -> Vec<u8> {
        vec![0u8; layout.full_len() as usize]
    }

    #[test]
    fn test_slot_words() {
        let layout = test_layout();
        let mut bytes = empty_table(&layout);
        {
            let mut view = StoreViewMut::new(&mut bytes, layout);
            view.set_slot(3, Slot::Occupied(12));
            view.set_slot(5, Slot::Tombstone);
        }
        let view = StoreView::new(&bytes, layout);
        assert_eq!(view.slot(0), Slot::Empty);
        assert_eq!(view.slot(3), Slot::Occupied(12));
        assert_eq!(view.slot(5), Slot::Tombstone);
    }

    #[test]
    fn test_directory_words() {
        let layout = test_layout();
        let mut bytes = empty_table(&layout);
        {
            let mut view = StoreViewMut::new(&mut bytes, layout);
            view.set_dir(0, Some(6));
            view.set_dir(1, Some(0));
            view.set_dir(2, None);
        }
        let view = StoreView::new(&bytes, layout);
        assert_eq!(view.dir_slot(0), Some(6));
        assert_eq!(view.dir_slot(1), Some(0));
        assert_eq!(view.dir_slot(2), None);
        assert_eq!(view.dir_slot(3), None);
    }

    #[test]
    fn test_record_round_trip() {
        let layout = test_layout();
        let mut bytes = empty_table(&layout);
        {
            let mut view = StoreViewMut::new(&mut bytes, layout);
            view.write_record(0, b"alpha", &1u64.to_le_bytes());
            view.write_record(1, b"beta", &2u64.to_le_bytes());
        }
        let view = StoreView::new(&bytes, layout);
        assert_eq!(view.key(0), b"alpha");
        assert_eq!(view.data(0), &1u64.to_le_bytes());
        assert_eq!(view.key(1), b"beta");
        assert_eq!(view.data(1), &2u64.to_le_bytes());
    }

    #[test]
    fn test_write_record_clears_previous_contents() {
        let layout = test_layout();
        let mut bytes = empty_table(&layout);
        let mut view = StoreViewMut::new(&mut bytes, layout);
        view.write_record(0, b"longer-key-name", &u64::MAX.to_le_bytes());
        view.write_record(0, b"k", &0u64.to_le_bytes());
        let view = StoreView::new(&bytes, layout);
        assert_eq!(view.key(0), b"k");
        assert_eq!(view.data(0), &0u64.to_le_bytes());
    }

    #[test]
    fn test_write_data_and_data_mut() {
        let layout = test_layout();
        let mut bytes = empty_table(&layout);
        {
            let mut view = StoreViewMut::new(&mut bytes, layout);
            view.write_record(0, b"alpha", &1u64.to_le_bytes());
            view.write_data(0, &9u64.to_le_bytes());
        }
        {
            let view = StoreViewMut::new(&mut bytes, layout);
            let data = view.into_data_mut(0);
            data.copy_from_slice(&7u64.to_le_bytes());
        }
        let view = StoreView::new(&bytes, layout);
        assert_eq!(view.key(0), b"alpha");
        assert_eq!(view.data(0), &7u64.to_le_bytes());
    }

    #[test]
    fn test_copy_record_preserves_bytes() {
        let layout = test_layout();
        let mut src = empty_table(&layout);
        {
            let mut view = StoreViewMut::new(&mut src, layout);
            view.write_record(2, b"gamma", &3u64.to_le_bytes());
        }
        let record = StoreView::new(&src, layout).record_bytes(2).to_vec();

        let mut dst = empty_table(&layout);
        {
            let mut view = StoreViewMut::new(&mut dst, layout);
            view.copy_record(0, &record);
        }
        let view = StoreView::new(&dst, layout);
        assert_eq!(view.key(0), b"gamma");
        assert_eq!(view.data(0), &3u64.to_le_bytes());
    }
}
