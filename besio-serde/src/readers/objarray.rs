use besio_array::builders::OffsetsBuilder;
use besio_array::{ArrayData, ListArray};
use besio_dtype::DType;
use besio_error::BesResult;
use log::warn;

use crate::{ByteCursor, Reader};

/// Reads a `TObjArray` whose elements all share one layout.
///
/// The wire layout is `fNBytes`, `fVersion`, then the array's own `TObject` base (`fVersion`,
/// `fUniqueID`, `fBits`), a `u8` name flag, a `u32` count, a `u32` lower bound, and the elements.
/// Element homogeneity is checked by the element reader: an object header pinned to a class
/// rejects any other class.
#[derive(Debug, Clone)]
pub struct ObjArrayReader {
    offsets: OffsetsBuilder,
    element: Box<Reader>,
}

impl ObjArrayReader {
    /// Create a new reader over `element`.
    pub fn new(element: Reader) -> Self {
        Self {
            offsets: OffsetsBuilder::new(),
            element: Box::new(element),
        }
    }

    /// Returns the element reader.
    pub fn element(&self) -> &Reader {
        &self.element
    }

    /// Reads one array.
    pub fn read(&mut self, cursor: &mut ByteCursor) -> BesResult<()> {
        cursor.read_fnbytes()?;
        cursor.read_fversion()?;
        cursor.read_fversion()?;
        let _unique_id = cursor.read::<u32>()?;
        let _bits = cursor.read::<u32>()?;
        let _name_flag = cursor.read::<u8>()?;

        let count = cursor.read::<u32>()?;
        let lower_bound = cursor.read::<u32>()?;
        if lower_bound != 0 {
            warn!(
                "object array at {} has lower bound {}, decoding from index 0",
                cursor.position(),
                lower_bound
            );
        }

        self.element.read_n(cursor, count as usize)?;
        self.offsets.end_list(self.element.len())
    }

    /// Snapshots the arrays read so far as a list.
    pub fn data(&self) -> BesResult<ArrayData> {
        ListArray::try_new(self.offsets.snapshot(), self.element.data()?).map(ArrayData::List)
    }

    /// Drops the arrays read so far.
    pub fn clear(&mut self) {
        self.offsets.clear();
        self.element.clear();
    }

    /// Returns the number of arrays read.
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
