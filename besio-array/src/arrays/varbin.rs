use besio_buffer::{Buffer, ByteBuffer};
use besio_error::{BesResult, besio_err};

use crate::arrays::{offsets_range, validate_offsets};

/// An array of length-prefixed strings: offsets into one contiguous byte buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct VarBinArray {
    offsets: Buffer<u32>,
    bytes: ByteBuffer,
}

impl VarBinArray {
    /// Create a new `VarBinArray`, validating that the offsets delimit the bytes.
    pub fn try_new(offsets: Buffer<u32>, bytes: ByteBuffer) -> BesResult<Self> {
        validate_offsets(&offsets, bytes.len())?;
        Ok(Self { offsets, bytes })
    }

    /// Returns the number of strings.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Returns whether the array has no strings.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the offsets, one more than the number of strings.
    pub fn offsets(&self) -> &Buffer<u32> {
        &self.offsets
    }

    /// Returns the concatenated bytes of all strings.
    pub fn bytes(&self) -> &ByteBuffer {
        &self.bytes
    }

    /// Returns the raw bytes of string `index`.
    ///
    /// ## Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn bytes_at(&self, index: usize) -> &[u8] {
        &self.bytes[offsets_range(&self.offsets, index)]
    }

    /// Returns string `index` decoded as UTF-8.
    pub fn str_at(&self, index: usize) -> BesResult<&str> {
        std::str::from_utf8(self.bytes_at(index))
            .map_err(|e| besio_err!("string {} is not valid UTF-8: {}", index, e))
    }
}
