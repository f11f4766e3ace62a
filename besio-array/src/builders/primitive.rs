use besio_buffer::{Buffer, BufferMut};
use besio_dtype::{DType, NativePType, PType};
use besio_error::BesResult;

use crate::builders::ArrayBuilder;
use crate::{ArrayData, PrimitiveArray};

/// A source of fixed-width values, typically a byte cursor decoding the wire format.
pub trait PrimitiveSource {
    /// Decodes the next value of type `T`.
    fn next_value<T: NativePType>(&mut self) -> BesResult<T>;

    /// Returns the number of bytes left to decode.
    fn remaining(&self) -> usize;
}

/// Builds an array of fixed-width values of one native type.
#[derive(Debug, Clone)]
pub struct PrimitiveBuilder<T> {
    values: BufferMut<T>,
}

impl<T: NativePType> Default for PrimitiveBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: NativePType> PrimitiveBuilder<T> {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new builder with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: BufferMut::with_capacity(capacity),
        }
    }

    /// Appends one value.
    #[inline]
    pub fn append_value(&mut self, value: T) {
        self.values.push(value)
    }

    /// Appends every value of the slice.
    pub fn append_values(&mut self, values: &[T]) {
        self.values.extend_from_slice(values)
    }

    /// Returns the values appended so far.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Reserves room for `additional` values.
    pub fn reserve(&mut self, additional: usize) {
        self.values.reserve(additional)
    }

    /// Hands the appended values over to an immutable array without copying.
    pub fn finish(self) -> PrimitiveArray {
        PrimitiveArray::new(self.values.freeze())
    }
}

impl<T: NativePType> ArrayBuilder for PrimitiveBuilder<T> {
    fn dtype(&self) -> DType {
        DType::Primitive(T::PTYPE)
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn clear(&mut self) {
        self.values.clear()
    }

    fn snapshot(&self) -> BesResult<ArrayData> {
        Ok(ArrayData::Primitive(PrimitiveArray::new(Buffer::copy_from(
            &self.values,
        ))))
    }
}

/// A [`PrimitiveBuilder`] whose native type is chosen at runtime from a [`PType`].
#[derive(Debug, Clone)]
pub enum AnyPrimitiveBuilder {
    /// Builds `u8` values
    U8(PrimitiveBuilder<u8>),
    /// Builds `u16` values
    U16(PrimitiveBuilder<u16>),
    /// Builds `u32` values
    U32(PrimitiveBuilder<u32>),
    /// Builds `u64` values
    U64(PrimitiveBuilder<u64>),
    /// Builds `i8` values
    I8(PrimitiveBuilder<i8>),
    /// Builds `i16` values
    I16(PrimitiveBuilder<i16>),
    /// Builds `i32` values
    I32(PrimitiveBuilder<i32>),
    /// Builds `i64` values
    I64(PrimitiveBuilder<i64>),
    /// Builds `f32` values
    F32(PrimitiveBuilder<f32>),
    /// Builds `f64` values
    F64(PrimitiveBuilder<f64>),
}

macro_rules! match_each_builder {
    ($self:expr, $builder:ident => $body:expr) => {
        match $self {
            AnyPrimitiveBuilder::U8($builder) => $body,
            AnyPrimitiveBuilder::U16($builder) => $body,
            AnyPrimitiveBuilder::U32($builder) => $body,
            AnyPrimitiveBuilder::U64($builder) => $body,
            AnyPrimitiveBuilder::I8($builder) => $body,
            AnyPrimitiveBuilder::I16($builder) => $body,
            AnyPrimitiveBuilder::I32($builder) => $body,
            AnyPrimitiveBuilder::I64($builder) => $body,
            AnyPrimitiveBuilder::F32($builder) => $body,
            AnyPrimitiveBuilder::F64($builder) => $body,
        }
    };
}

impl AnyPrimitiveBuilder {
    /// Create a new empty builder for values of `ptype`.
    pub fn new(ptype: PType) -> Self {
        match ptype {
            PType::U8 => Self::U8(PrimitiveBuilder::new()),
            PType::U16 => Self::U16(PrimitiveBuilder::new()),
            PType::U32 => Self::U32(PrimitiveBuilder::new()),
            PType::U64 => Self::U64(PrimitiveBuilder::new()),
            PType::I8 => Self::I8(PrimitiveBuilder::new()),
            PType::I16 => Self::I16(PrimitiveBuilder::new()),
            PType::I32 => Self::I32(PrimitiveBuilder::new()),
            PType::I64 => Self::I64(PrimitiveBuilder::new()),
            PType::F32 => Self::F32(PrimitiveBuilder::new()),
            PType::F64 => Self::F64(PrimitiveBuilder::new()),
        }
    }

    /// Returns the type of the values being built.
    pub fn ptype(&self) -> PType {
        match self {
            Self::U8(_) => PType::U8,
            Self::U16(_) => PType::U16,
            Self::U32(_) => PType::U32,
            Self::U64(_) => PType::U64,
            Self::I8(_) => PType::I8,
            Self::I16(_) => PType::I16,
            Self::I32(_) => PType::I32,
            Self::I64(_) => PType::I64,
            Self::F32(_) => PType::F32,
            Self::F64(_) => PType::F64,
        }
    }

    /// Decodes one value from `source` and appends it.
    #[inline]
    pub fn append_from<S: PrimitiveSource>(&mut self, source: &mut S) -> BesResult<()> {
        match_each_builder!(self, b => {
            b.append_value(source.next_value()?);
            Ok(())
        })
    }

    /// Decodes `n` values from `source` and appends them.
    ///
    /// At most as many values as the source can still hold are reserved up front, a corrupt
    /// count fails on the first missing value rather than on allocation.
    pub fn append_n_from<S: PrimitiveSource>(&mut self, source: &mut S, n: usize) -> BesResult<()> {
        let width = self.ptype().byte_width();
        match_each_builder!(self, b => {
            b.reserve(n.min(source.remaining() / width));
            for _ in 0..n {
                b.append_value(source.next_value()?);
            }
            Ok(())
        })
    }
}

impl ArrayBuilder for AnyPrimitiveBuilder {
    fn dtype(&self) -> DType {
        DType::Primitive(self.ptype())
    }

    fn len(&self) -> usize {
        match_each_builder!(self, b => b.len())
    }

    fn clear(&mut self) {
        match_each_builder!(self, b => b.clear())
    }

    fn snapshot(&self) -> BesResult<ArrayData> {
        match_each_builder!(self, b => b.snapshot())
    }
}

#[cfg(test)]
mod test {
    use besio_dtype::{NativePType, PType};
    use besio_error::{BesResult, besio_bail};
    use rstest::rstest;

    use crate::builders::{AnyPrimitiveBuilder, ArrayBuilder, PrimitiveBuilder, PrimitiveSource};

    /// Decodes big-endian values from a byte slice.
    struct SliceSource<'a>(&'a [u8]);

    impl PrimitiveSource for SliceSource<'_> {
        fn next_value<T: NativePType>(&mut self) -> BesResult<T> {
            let width = size_of::<T>();
            if self.0.len() < width {
                besio_bail!("exhausted");
            }
            let (head, tail) = self.0.split_at(width);
            self.0 = tail;
            Ok(T::from_be_slice(head).unwrap_or_default())
        }

        fn remaining(&self) -> usize {
            self.0.len()
        }
    }

    #[test]
    fn typed_builder() {
        let mut builder = PrimitiveBuilder::<i32>::new();
        builder.append_value(1);
        builder.append_values(&[2, 3]);
        assert_eq!(builder.values(), &[1, 2, 3]);

        let array = builder.finish();
        assert_eq!(array.as_slice::<i32>(), &[1, 2, 3]);
    }

    #[rstest]
    #[case(PType::U16, 2)]
    #[case(PType::I32, 4)]
    #[case(PType::F64, 8)]
    fn any_builder_reads_width(#[case] ptype: PType, #[case] width: usize) {
        let bytes = vec![0u8; width * 3];
        let mut source = SliceSource(&bytes);
        let mut builder = AnyPrimitiveBuilder::new(ptype);
        builder.append_n_from(&mut source, 3).unwrap();
        assert_eq!(builder.len(), 3);
        assert_eq!(builder.ptype(), ptype);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn any_builder_decodes_big_endian() {
        let bytes = [0x00, 0x00, 0x01, 0x02, 0xff, 0xff, 0xff, 0xff];
        let mut source = SliceSource(&bytes);
        let mut builder = AnyPrimitiveBuilder::new(PType::I32);
        builder.append_from(&mut source).unwrap();
        builder.append_from(&mut source).unwrap();

        let array = builder.snapshot().unwrap();
        assert_eq!(array.as_primitive().unwrap().as_slice::<i32>(), &[258, -1]);
    }

    #[test]
    fn huge_count_fails_without_allocating() {
        let bytes = [0u8; 4];
        let mut source = SliceSource(&bytes);
        let mut builder = AnyPrimitiveBuilder::new(PType::F64);
        assert!(builder.append_n_from(&mut source, usize::MAX).is_err());
    }
}
