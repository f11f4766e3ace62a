use besio_array::builders::{AnyPrimitiveBuilder, ArrayBuilder, OffsetsBuilder};
use besio_array::{ArrayData, ListArray};
use besio_dtype::{DType, PType};
use besio_error::BesResult;

use crate::ByteCursor;

/// Reads a `TArray`: a `u32` count followed by that many numbers, without framing.
#[derive(Debug, Clone)]
pub struct TArrayReader {
    offsets: OffsetsBuilder,
    values: AnyPrimitiveBuilder,
}

impl TArrayReader {
    /// Create a new reader for arrays of `ptype`.
    pub fn new(ptype: PType) -> Self {
        Self {
            offsets: OffsetsBuilder::new(),
            values: AnyPrimitiveBuilder::new(ptype),
        }
    }

    /// Reads one array.
    pub fn read(&mut self, cursor: &mut ByteCursor) -> BesResult<()> {
        let count = cursor.read::<u32>()?;
        self.values.append_n_from(cursor, count as usize)?;
        self.offsets.append_length(count)
    }

    /// Snapshots the arrays read so far as a list.
    pub fn data(&self) -> BesResult<ArrayData> {
        ListArray::try_new(self.offsets.snapshot(), self.values.snapshot()?).map(ArrayData::List)
    }

    /// Drops the arrays read so far.
    pub fn clear(&mut self) {
        self.offsets.clear();
        self.values.clear();
    }

    /// Returns the number of arrays read.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns whether nothing was read.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns a list of the number type.
    pub fn dtype(&self) -> DType {
        DType::List(self.values.dtype().into())
    }
}
