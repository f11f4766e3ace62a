use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::ops::Deref;

use bytes::Bytes;

use crate::Buffer;
use crate::debug::TruncatedDebug;

/// A mutable buffer of items of `T`, grown append-only while decoding.
///
/// Freezing hands the allocation to a [`Buffer<T>`] without copying.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct BufferMut<T> {
    values: Vec<T>,
}

impl<T> BufferMut<T> {
    /// Create a new empty `BufferMut<T>`.
    pub fn empty() -> Self {
        Self { values: Vec::new() }
    }

    /// Create a new `BufferMut<T>` with at least the requested capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Returns the length of the buffer in elements of type T.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the buffer is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the capacity of the buffer in elements of type T.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    /// Returns a slice over the buffer of elements of type T.
    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Reserves capacity for at least `additional` more elements.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.values.reserve(additional)
    }

    /// Appends a value to the buffer.
    #[inline(always)]
    pub fn push(&mut self, value: T) {
        self.values.push(value)
    }

    /// Shortens the buffer, keeping the first `len` elements.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.values.truncate(len)
    }

    /// Removes all values, keeping the allocated capacity for the next pass.
    #[inline]
    pub fn clear(&mut self) {
        self.values.clear()
    }
}

impl<T: Copy> BufferMut<T> {
    /// Returns a new `BufferMut<T>` copied from the provided `Vec<T>`, `&[T]`, etc.
    pub fn copy_from(values: impl AsRef<[T]>) -> Self {
        Self {
            values: values.as_ref().to_vec(),
        }
    }

    /// Create a new `BufferMut<T>` of `len` copies of `item`.
    pub fn full(item: T, len: usize) -> Self {
        Self {
            values: vec![item; len],
        }
    }

    /// Appends every value of the slice to the buffer.
    #[inline]
    pub fn extend_from_slice(&mut self, slice: &[T]) {
        self.values.extend_from_slice(slice)
    }
}

impl<T: Copy + Send + 'static> BufferMut<T> {
    /// Freeze the `BufferMut<T>` into an immutable `Buffer<T>`, handing over the allocation.
    pub fn freeze(self) -> Buffer<T> {
        let length = self.values.len();
        Buffer {
            bytes: Bytes::from_owner(ValuesOwner(self.values)),
            length,
            _marker: PhantomData,
        }
    }
}

/// Exposes the values of a `Vec<T>` as raw bytes so `Bytes` can own the allocation.
struct ValuesOwner<T>(Vec<T>);

impl<T: Copy> AsRef<[u8]> for ValuesOwner<T> {
    fn as_ref(&self) -> &[u8] {
        // SAFETY: buffers only hold fixed-width primitives, which have no padding bytes
        unsafe {
            std::slice::from_raw_parts(
                self.0.as_ptr().cast::<u8>(),
                size_of_val(self.0.as_slice()),
            )
        }
    }
}

impl<T: Debug> Debug for BufferMut<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferMut")
            .field("length", &self.values.len())
            .field("capacity", &self.values.capacity())
            .field("values", &TruncatedDebug(self.as_slice()))
            .finish()
    }
}

impl<T> Deref for BufferMut<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T> AsRef<[T]> for BufferMut<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> FromIterator<T> for BufferMut<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<T> From<Vec<T>> for BufferMut<T> {
    fn from(values: Vec<T>) -> Self {
        Self { values }
    }
}

#[cfg(test)]
mod test {
    use crate::BufferMut;

    #[test]
    fn push_and_freeze() {
        let mut buf = BufferMut::<u32>::with_capacity(4);
        buf.push(1);
        buf.extend_from_slice(&[9, 10]);
        assert_eq!(buf.as_slice(), &[1, 9, 10]);

        let frozen = buf.freeze();
        assert_eq!(frozen.as_slice(), &[1, 9, 10]);
        assert_eq!(frozen.nbytes(), 12);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut buf = BufferMut::copy_from([1u8, 2, 3]);
        let capacity = buf.capacity();
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), capacity);
    }

    #[test]
    fn truncate_to_first() {
        let mut buf = BufferMut::full(0u32, 3);
        buf.truncate(1);
        assert_eq!(buf.as_slice(), &[0]);
    }

    #[test]
    fn freeze_empty() {
        let frozen = BufferMut::<f64>::empty().freeze();
        assert!(frozen.is_empty());
        assert_eq!(frozen.as_slice(), &[] as &[f64]);
    }
}
