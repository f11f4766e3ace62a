use std::ops::Range;
use std::sync::Arc;

use besio_buffer::Buffer;
use besio_dtype::DType;
use besio_error::BesResult;

use crate::ArrayData;
use crate::arrays::{offsets_range, validate_offsets};

/// A ragged list array: `offsets[i]..offsets[i + 1]` delimits the elements of list `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListArray {
    offsets: Buffer<u32>,
    elements: Box<ArrayData>,
}

impl ListArray {
    /// Create a new `ListArray`, validating the offsets against the elements.
    pub fn try_new(offsets: Buffer<u32>, elements: ArrayData) -> BesResult<Self> {
        validate_offsets(&offsets, elements.len())?;
        Ok(Self {
            offsets,
            elements: Box::new(elements),
        })
    }

    /// Returns the number of lists.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Returns whether there are no lists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the offsets, one more than the number of lists.
    pub fn offsets(&self) -> &Buffer<u32> {
        &self.offsets
    }

    /// Returns the flattened elements of all lists.
    pub fn elements(&self) -> &ArrayData {
        &self.elements
    }

    /// Returns the element range of list `index`.
    ///
    /// ## Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn element_range(&self, index: usize) -> Range<usize> {
        offsets_range(&self.offsets, index)
    }

    /// Returns the structural form of the lists.
    pub fn dtype(&self) -> DType {
        DType::List(Arc::new(self.elements.dtype()))
    }
}
