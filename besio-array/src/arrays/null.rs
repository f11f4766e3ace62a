/// An array with a length but no values.
///
/// Readers that only consume framing, such as a `TObject` base, produce this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullArray {
    len: usize,
}

impl NullArray {
    /// Create a new `NullArray` of `len` values.
    pub fn new(len: usize) -> Self {
        Self { len }
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the array has no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
