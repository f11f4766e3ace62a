use besio_buffer::{Buffer, ByteBuffer};
use besio_dtype::{NativePType, PType};
use besio_error::besio_panic;

/// An array of fixed-width numbers.
///
/// The values are kept type-erased as a [`ByteBuffer`] tagged with their [`PType`], the buffer
/// is always aligned to the native type.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveArray {
    ptype: PType,
    buffer: ByteBuffer,
    len: usize,
}

impl PrimitiveArray {
    /// Create a new `PrimitiveArray` from a typed buffer.
    pub fn new<T: NativePType>(buffer: Buffer<T>) -> Self {
        let len = buffer.len();
        Self {
            ptype: T::PTYPE,
            buffer: buffer.into_byte_buffer(),
            len,
        }
    }

    /// Returns the type of the values.
    pub fn ptype(&self) -> PType {
        self.ptype
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the array has no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the raw value bytes.
    pub fn byte_buffer(&self) -> &ByteBuffer {
        &self.buffer
    }

    /// Returns the values as a typed buffer, zero-copy.
    ///
    /// ## Panics
    ///
    /// Panics if `T` does not match the array's `PType`.
    pub fn buffer<T: NativePType>(&self) -> Buffer<T> {
        if T::PTYPE != self.ptype {
            besio_panic!(
                "Attempted to get buffer of type {} from array of type {}",
                T::PTYPE,
                self.ptype
            )
        }
        Buffer::from_byte_buffer(self.buffer.clone())
    }

    /// Returns the values as a typed slice.
    ///
    /// ## Panics
    ///
    /// Panics if `T` does not match the array's `PType`.
    pub fn as_slice<T: NativePType>(&self) -> &[T] {
        if T::PTYPE != self.ptype {
            besio_panic!(
                "Attempted to get slice of type {} from array of type {}",
                T::PTYPE,
                self.ptype
            )
        }
        let raw_slice = self.buffer.as_slice();
        // SAFETY: the buffer was created from a `Buffer<T>` and keeps its alignment
        unsafe { std::slice::from_raw_parts(raw_slice.as_ptr().cast(), self.len) }
    }
}
