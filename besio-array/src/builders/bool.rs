use besio_buffer::{Buffer, BufferMut};
use besio_dtype::DType;
use besio_error::BesResult;

use crate::builders::ArrayBuilder;
use crate::{ArrayData, BoolArray};

/// Builds an array of booleans.
#[derive(Debug, Default, Clone)]
pub struct BoolBuilder {
    values: BufferMut<bool>,
}

impl BoolBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one value.
    #[inline]
    pub fn append_value(&mut self, value: bool) {
        self.values.push(value)
    }
}

impl ArrayBuilder for BoolBuilder {
    fn dtype(&self) -> DType {
        DType::Bool
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn clear(&mut self) {
        self.values.clear()
    }

    fn snapshot(&self) -> BesResult<ArrayData> {
        Ok(ArrayData::Bool(BoolArray::new(Buffer::copy_from(
            &self.values,
        ))))
    }
}
