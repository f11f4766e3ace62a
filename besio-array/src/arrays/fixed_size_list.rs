use std::ops::Range;
use std::sync::Arc;

use besio_dtype::DType;
use besio_error::{BesResult, besio_bail};

use crate::ArrayData;

/// An array of lists that all have `size` elements.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSizeListArray {
    elements: Box<ArrayData>,
    size: u32,
    len: usize,
}

impl FixedSizeListArray {
    /// Create a new `FixedSizeListArray` of `len` lists.
    pub fn try_new(elements: ArrayData, size: u32, len: usize) -> BesResult<Self> {
        if size == 0 {
            besio_bail!("fixed size lists must have a non-zero size");
        }
        let expected = len.checked_mul(size as usize);
        if expected != Some(elements.len()) {
            besio_bail!(
                "{} lists of size {} need {} elements, found {}",
                len,
                size,
                len.saturating_mul(size as usize),
                elements.len()
            );
        }
        Ok(Self {
            elements: Box::new(elements),
            size,
            len,
        })
    }

    /// Returns the number of lists.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether there are no lists.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements of every list.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns the flattened elements of all lists.
    pub fn elements(&self) -> &ArrayData {
        &self.elements
    }

    /// Returns the element range of list `index`.
    pub fn element_range(&self, index: usize) -> Range<usize> {
        let size = self.size as usize;
        index * size..(index + 1) * size
    }

    /// Returns the structural form of the lists.
    pub fn dtype(&self) -> DType {
        DType::FixedSizeList(Arc::new(self.elements.dtype()), self.size)
    }
}
