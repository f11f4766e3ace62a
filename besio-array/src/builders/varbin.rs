use besio_buffer::{Buffer, BufferMut};
use besio_dtype::DType;
use besio_error::{BesResult, besio_err};

use crate::builders::{ArrayBuilder, OffsetsBuilder};
use crate::{ArrayData, VarBinArray};

/// Builds an array of strings as offsets into one contiguous byte buffer.
#[derive(Debug, Default, Clone)]
pub struct VarBinBuilder {
    offsets: OffsetsBuilder,
    bytes: BufferMut<u8>,
}

impl VarBinBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one string.
    ///
    /// A string that would overflow the offsets is rejected before any byte is copied.
    pub fn append_value(&mut self, value: &[u8]) -> BesResult<()> {
        let len = u32::try_from(value.len())
            .map_err(|_| besio_err!("string of {} bytes overflows u32 offsets", value.len()))?;
        self.offsets.append_length(len)?;
        self.bytes.extend_from_slice(value);
        Ok(())
    }
}

impl ArrayBuilder for VarBinBuilder {
    fn dtype(&self) -> DType {
        DType::Utf8
    }

    fn len(&self) -> usize {
        self.offsets.len()
    }

    fn clear(&mut self) {
        self.offsets.clear();
        self.bytes.clear();
    }

    fn snapshot(&self) -> BesResult<ArrayData> {
        VarBinArray::try_new(self.offsets.snapshot(), Buffer::copy_from(&self.bytes))
            .map(ArrayData::VarBin)
    }
}

#[cfg(test)]
mod test {
    use crate::builders::{ArrayBuilder, VarBinBuilder};

    #[test]
    fn append_strings() {
        let mut builder = VarBinBuilder::new();
        builder.append_value(b"e+").unwrap();
        builder.append_value(b"").unwrap();
        builder.append_value(b"pi-").unwrap();

        let array = builder.snapshot().unwrap();
        let strings = array.as_varbin().unwrap();
        assert_eq!(strings.offsets().as_slice(), &[0, 2, 2, 5]);
        assert_eq!(strings.str_at(2).unwrap(), "pi-");

        builder.clear();
        assert!(builder.is_empty());
    }

    #[test]
    fn overflowing_append_leaves_bytes_untouched() {
        let mut builder = VarBinBuilder::new();
        builder.offsets.append_length(u32::MAX - 1).unwrap();

        assert!(builder.append_value(b"K0S").is_err());
        assert!(builder.bytes.is_empty());
        assert_eq!(builder.offsets.as_slice(), &[0, u32::MAX - 1]);
    }
}
