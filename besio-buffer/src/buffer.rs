use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::ops::{Deref, Range};

use besio_error::besio_panic;
use bytes::Bytes;

use crate::debug::TruncatedDebug;
use crate::{BufferMut, ByteBuffer};

/// An immutable buffer of items of `T`.
///
/// Clones and slices share one allocation. The bytes are always aligned to `T`.
#[derive(Clone, PartialEq, Eq)]
pub struct Buffer<T> {
    pub(crate) bytes: Bytes,
    pub(crate) length: usize,
    pub(crate) _marker: PhantomData<T>,
}

impl<T: Copy + Send + 'static> Buffer<T> {
    /// Returns a new `Buffer<T>` holding a copy of `values`.
    ///
    /// Builders snapshot through this while they keep accumulating; callers that own a `Vec<T>`
    /// should use `Buffer::from(vec)`, which moves the allocation instead.
    pub fn copy_from(values: impl AsRef<[T]>) -> Self {
        BufferMut::copy_from(values).freeze()
    }

    /// Create a new empty `Buffer<T>`.
    pub fn empty() -> Self {
        BufferMut::empty().freeze()
    }

    /// Create a new `Buffer<T>` of `len` copies of `item`.
    pub fn full(item: T, len: usize) -> Self {
        BufferMut::full(item, len).freeze()
    }
}

impl<T> Buffer<T> {
    /// Views the bytes of `buffer` as items of `T` without copying.
    ///
    /// ## Panics
    ///
    /// Panics if the bytes are not aligned to `T`, or their length is not a multiple of the size
    /// of `T`.
    pub fn from_byte_buffer(buffer: ByteBuffer) -> Self {
        let bytes = buffer.bytes;
        if bytes.as_ptr().align_offset(align_of::<T>()) != 0 {
            besio_panic!("bytes are not aligned to {}", align_of::<T>());
        }
        if !bytes.len().is_multiple_of(size_of::<T>()) {
            besio_panic!(
                "{} bytes do not hold a whole number of {}-byte values",
                bytes.len(),
                size_of::<T>()
            );
        }
        Self {
            length: bytes.len() / size_of::<T>(),
            bytes,
            _marker: PhantomData,
        }
    }

    /// Returns the length of the buffer in elements of type T.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns whether the buffer is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the size of the buffer in bytes.
    #[inline(always)]
    pub fn nbytes(&self) -> usize {
        self.bytes.len()
    }

    /// Returns a slice over the buffer of elements of type T.
    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: alignment and length are checked on construction
        unsafe { std::slice::from_raw_parts(self.bytes.as_ptr().cast(), self.length) }
    }

    /// Returns the elements in `range`, sharing the allocation.
    ///
    /// # Panics
    ///
    /// Requires that `range.start <= range.end <= self.len()`.
    pub fn slice(&self, range: Range<usize>) -> Self {
        if range.start > range.end || range.end > self.length {
            besio_panic!("slice {:?} out of bounds of {}", range, self.length);
        }
        let mut bytes = self.bytes.clone();
        if range.is_empty() {
            // an empty slice keeps a pointer aligned to T
            bytes.truncate(0);
        } else {
            bytes = bytes.slice(range.start * size_of::<T>()..range.end * size_of::<T>());
        }
        Self {
            bytes,
            length: range.len(),
            _marker: PhantomData,
        }
    }

    /// Returns the same allocation viewed as raw bytes.
    pub fn into_byte_buffer(self) -> ByteBuffer {
        ByteBuffer {
            length: self.bytes.len(),
            bytes: self.bytes,
            _marker: PhantomData,
        }
    }
}

impl<T: Debug> Debug for Buffer<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("length", &self.length)
            .field("values", &TruncatedDebug(self.as_slice()))
            .finish()
    }
}

impl<T> Deref for Buffer<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T> AsRef<[T]> for Buffer<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Copy + Send + 'static> FromIterator<T> for Buffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        BufferMut::from_iter(iter).freeze()
    }
}

/// Takes ownership of the vector's allocation, no copy is made.
impl<T: Copy + Send + 'static> From<Vec<T>> for Buffer<T> {
    fn from(value: Vec<T>) -> Self {
        BufferMut::from(value).freeze()
    }
}

#[cfg(test)]
mod test {
    use std::ops::Range;

    use rstest::rstest;

    use crate::{Buffer, ByteBuffer, buffer};

    #[rstest]
    #[case(1..3, &[1, 2])]
    #[case(0..5, &[0, 1, 2, 3, 4])]
    #[case(2..2, &[])]
    #[case(5..5, &[])]
    fn slice(#[case] range: Range<usize>, #[case] expected: &[i32]) {
        let buf = buffer![0, 1, 2, 3, 4];
        let sliced = buf.slice(range);
        assert_eq!(sliced.as_slice(), expected);
        assert_eq!(sliced.nbytes(), expected.len() * size_of::<i32>());
    }

    #[test]
    #[should_panic]
    fn slice_past_end() {
        let _ = buffer![1u32, 2].slice(1..3);
    }

    #[test]
    fn typed_view_of_bytes() {
        let buf = buffer![1u32, 2, 3].into_byte_buffer();
        assert_eq!(buf.len(), 12);

        let typed = Buffer::<u32>::from_byte_buffer(buf);
        assert_eq!(typed.as_slice(), &[1, 2, 3]);
    }

    #[test]
    #[should_panic]
    fn typed_view_bad_length() {
        let buf = ByteBuffer::copy_from([0u8, 1, 2]);
        let _ = Buffer::<u16>::from_byte_buffer(buf);
    }

    #[test]
    fn zero_copy_from_vec() {
        let values = vec![1.5f64, 2.5];
        let ptr = values.as_ptr();
        let buf = Buffer::from(values);
        assert_eq!(buf.as_ptr(), ptr);
        assert_eq!(buf.nbytes(), 16);
    }
}
