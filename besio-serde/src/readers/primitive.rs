use besio_array::ArrayData;
use besio_array::builders::{AnyPrimitiveBuilder, ArrayBuilder, BoolBuilder};
use besio_dtype::{DType, PType};
use besio_error::BesResult;

use crate::ByteCursor;

/// Reads one fixed-width number per value.
#[derive(Debug, Clone)]
pub struct PrimitiveReader {
    values: AnyPrimitiveBuilder,
}

impl PrimitiveReader {
    /// Create a new reader for numbers of `ptype`.
    pub fn new(ptype: PType) -> Self {
        Self {
            values: AnyPrimitiveBuilder::new(ptype),
        }
    }

    /// Returns the wire type of the numbers.
    pub fn ptype(&self) -> PType {
        self.values.ptype()
    }

    /// Reads one number.
    #[inline]
    pub fn read(&mut self, cursor: &mut ByteCursor) -> BesResult<()> {
        self.values.append_from(cursor)
    }

    /// Reads `n` numbers.
    pub fn read_n(&mut self, cursor: &mut ByteCursor, n: usize) -> BesResult<()> {
        self.values.append_n_from(cursor, n)
    }

    /// Snapshots the numbers read so far.
    pub fn data(&self) -> BesResult<ArrayData> {
        self.values.snapshot()
    }

    /// Drops the numbers read so far.
    pub fn clear(&mut self) {
        self.values.clear()
    }

    /// Returns the number of numbers read.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether nothing was read.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the primitive form.
    pub fn dtype(&self) -> DType {
        self.values.dtype()
    }
}

/// Reads one byte per value, non-zero is `true`.
#[derive(Debug, Default, Clone)]
pub struct BoolReader {
    values: BoolBuilder,
}

impl BoolReader {
    /// Create a new reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads one boolean.
    pub fn read(&mut self, cursor: &mut ByteCursor) -> BesResult<()> {
        self.values.append_value(cursor.read_bool()?);
        Ok(())
    }

    /// Snapshots the booleans read so far.
    pub fn data(&self) -> BesResult<ArrayData> {
        self.values.snapshot()
    }

    /// Drops the booleans read so far.
    pub fn clear(&mut self) {
        self.values.clear()
    }

    /// Returns the number of booleans read.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether nothing was read.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns [`DType::Bool`].
    pub fn dtype(&self) -> DType {
        DType::Bool
    }
}

#[cfg(test)]
mod test {
    use besio_dtype::PType;

    use crate::test_harness::WireWriter;
    use crate::{BoolReader, PrimitiveReader};

    #[test]
    fn reads_each_entry() {
        let mut writer = WireWriter::default();
        for run in [7u32, 8, 9] {
            writer.put(run).put(-1.25f32);
            writer.end_entry();
        }
        let mut cursor = writer.into_cursor().unwrap();

        let mut runs = PrimitiveReader::new(PType::U32);
        let mut energies = PrimitiveReader::new(PType::F32);
        for entry in 0..3 {
            cursor.seek_entry(entry).unwrap();
            runs.read(&mut cursor).unwrap();
            energies.read(&mut cursor).unwrap();
        }

        let data = runs.data().unwrap();
        assert_eq!(data.as_primitive().unwrap().as_slice::<u32>(), &[7, 8, 9]);
        let data = energies.data().unwrap();
        assert_eq!(data.as_primitive().unwrap().as_slice::<f32>(), &[-1.25; 3]);

        runs.clear();
        assert!(runs.is_empty());
        assert_eq!(runs.ptype(), PType::U32);
    }

    #[test]
    fn bools() {
        let mut writer = WireWriter::default();
        writer.put(1u8).put(0u8).put(2u8);
        writer.end_entry();
        let mut cursor = writer.into_cursor().unwrap();

        let mut reader = BoolReader::new();
        for _ in 0..3 {
            reader.read(&mut cursor).unwrap();
        }
        let data = reader.data().unwrap();
        assert_eq!(data.as_bool().unwrap().values().as_slice(), &[true, false, true]);
        assert!(reader.read(&mut cursor).is_err());
    }
}
