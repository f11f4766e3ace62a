//! Append-only builders that accumulate decoded values during a pass.
//!
//! Builders never shrink while a pass is running. [`ArrayBuilder::snapshot`] copies the current
//! contents into an immutable [`ArrayData`], [`ArrayBuilder::clear`] drops them while keeping the
//! allocations for the next pass.

mod bool;
mod offsets;
mod primitive;
mod varbin;

pub use bool::*;
use besio_dtype::DType;
use besio_error::BesResult;
pub use offsets::*;
pub use primitive::*;
pub use varbin::*;

use crate::ArrayData;

/// Common behavior of the leaf builders.
pub trait ArrayBuilder: Send {
    /// Returns the form of the values being built.
    fn dtype(&self) -> DType;

    /// Returns the number of values appended since the last clear.
    fn len(&self) -> usize;

    /// Returns whether no values were appended since the last clear.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all appended values, keeping allocated capacity.
    fn clear(&mut self);

    /// Copies the appended values into an immutable array, leaving the builder untouched.
    fn snapshot(&self) -> BesResult<ArrayData>;
}
