use besio_buffer::Buffer;

/// An array of booleans stored one byte per value.
#[derive(Debug, Clone, PartialEq)]
pub struct BoolArray {
    values: Buffer<bool>,
}

impl BoolArray {
    /// Create a new `BoolArray` from its values.
    pub fn new(values: Buffer<bool>) -> Self {
        Self { values }
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the array has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value buffer.
    pub fn values(&self) -> &Buffer<bool> {
        &self.values
    }

    /// Returns the value at `index`, `None` if out of bounds.
    pub fn value(&self, index: usize) -> Option<bool> {
        self.values.get(index).copied()
    }
}
