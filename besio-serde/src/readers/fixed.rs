use besio_array::{ArrayData, FixedSizeListArray};
use besio_dtype::DType;
use besio_error::BesResult;

use crate::{ByteCursor, Reader};

/// Reads a C array: exactly `size` elements with no count on the wire.
///
/// Arrays of containers or objects are framed once, before the first element. Multi-dimensional
/// arrays are arrays of arrays.
#[derive(Debug, Clone)]
pub struct FixedArrayReader {
    framed: bool,
    size: u32,
    len: usize,
    element: Box<Reader>,
}

impl FixedArrayReader {
    /// Create a new reader for arrays of `size` elements.
    pub fn new(framed: bool, size: u32, element: Reader) -> Self {
        Self {
            framed,
            size,
            len: 0,
            element: Box::new(element),
        }
    }

    /// Returns the number of elements per array.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Reads one array.
    pub fn read(&mut self, cursor: &mut ByteCursor) -> BesResult<()> {
        if self.framed {
            cursor.read_fnbytes()?;
            cursor.read_fversion()?;
        }
        self.element.read_n(cursor, self.size as usize)?;
        self.len += 1;
        Ok(())
    }

    /// Snapshots the arrays read so far.
    pub fn data(&self) -> BesResult<ArrayData> {
        FixedSizeListArray::try_new(self.element.data()?, self.size, self.len)
            .map(ArrayData::FixedSizeList)
    }

    /// Drops the arrays read so far.
    pub fn clear(&mut self) {
        self.len = 0;
        self.element.clear();
    }

    /// Returns the number of arrays read.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether nothing was read.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a fixed size list of the element form.
    pub fn dtype(&self) -> DType {
        DType::FixedSizeList(self.element.dtype().into(), self.size)
    }
}
