use std::sync::Once;

use besio_array::builders::OffsetsBuilder;
use besio_array::{ArrayData, ListArray, MapArray};
use besio_dtype::DType;
use besio_error::BesResult;
use log::debug;

use crate::{ByteCursor, Reader};

/// Size of the block written between `fNBytes` and the count of a top-level map.
pub const MAP_OPAQUE_BLOCK: usize = 8;

static MAP_BLOCK_SKIPPED: Once = Once::new();

/// Reads an STL sequence: a `u32` count followed by that many elements.
///
/// A top-level sequence is preceded by `fNBytes` and `fVersion`. Sequences nested in another
/// container are not.
#[derive(Debug, Clone)]
pub struct SeqReader {
    framed: bool,
    offsets: OffsetsBuilder,
    element: Box<Reader>,
}

impl SeqReader {
    /// Create a new reader over `element`.
    pub fn new(framed: bool, element: Reader) -> Self {
        Self {
            framed,
            offsets: OffsetsBuilder::new(),
            element: Box::new(element),
        }
    }

    /// Returns the element reader.
    pub fn element(&self) -> &Reader {
        &self.element
    }

    /// Reads one sequence.
    pub fn read(&mut self, cursor: &mut ByteCursor) -> BesResult<()> {
        if self.framed {
            cursor.read_fnbytes()?;
            cursor.read_fversion()?;
        }
        let count = cursor.read::<u32>()?;
        self.element.read_n(cursor, count as usize)?;
        self.offsets.end_list(self.element.len())
    }

    /// Snapshots the sequences read so far as a list.
    pub fn data(&self) -> BesResult<ArrayData> {
        ListArray::try_new(self.offsets.snapshot(), self.element.data()?).map(ArrayData::List)
    }

    /// Drops the sequences read so far.
    pub fn clear(&mut self) {
        self.offsets.clear();
        self.element.clear();
    }

    /// Returns the number of sequences read.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns whether nothing was read.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns a list of the element form.
    pub fn dtype(&self) -> DType {
        DType::List(self.element.dtype().into())
    }
}

/// Reads an STL map: a `u32` count followed by that many key/value pairs.
///
/// A top-level map starts with `fNBytes` and an opaque block of [`MAP_OPAQUE_BLOCK`] bytes, and
/// stores all keys before all values. A nested map has no header and interleaves each key with
/// its value.
#[derive(Debug, Clone)]
pub struct MapReader {
    framed: bool,
    offsets: OffsetsBuilder,
    keys: Box<Reader>,
    values: Box<Reader>,
}

impl MapReader {
    /// Create a new reader over `keys` and `values`.
    pub fn new(framed: bool, keys: Reader, values: Reader) -> Self {
        Self {
            framed,
            offsets: OffsetsBuilder::new(),
            keys: Box::new(keys),
            values: Box::new(values),
        }
    }

    /// Reads one map.
    pub fn read(&mut self, cursor: &mut ByteCursor) -> BesResult<()> {
        if self.framed {
            cursor.read_fnbytes()?;
            // The meaning of this block is unknown, a change of its size would shift the map.
            MAP_BLOCK_SKIPPED.call_once(|| {
                debug!(
                    "skipping {} opaque bytes after the byte count of a top-level map at {}",
                    MAP_OPAQUE_BLOCK,
                    cursor.position()
                )
            });
            cursor.skip(MAP_OPAQUE_BLOCK)?;

            let count = cursor.read::<u32>()? as usize;
            self.keys.read_n(cursor, count)?;
            self.values.read_n(cursor, count)?;
        } else {
            let count = cursor.read::<u32>()?;
            for _ in 0..count {
                self.keys.read(cursor)?;
                self.values.read(cursor)?;
            }
        }
        self.offsets.end_list(self.keys.len())
    }

    /// Snapshots the maps read so far.
    pub fn data(&self) -> BesResult<ArrayData> {
        MapArray::try_new(
            self.offsets.snapshot(),
            self.keys.data()?,
            self.values.data()?,
        )
        .map(ArrayData::Map)
    }

    /// Drops the maps read so far.
    pub fn clear(&mut self) {
        self.offsets.clear();
        self.keys.clear();
        self.values.clear();
    }

    /// Returns the number of maps read.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns whether nothing was read.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns a map of the key and value forms.
    pub fn dtype(&self) -> DType {
        DType::Map(self.keys.dtype().into(), self.values.dtype().into())
    }
}
