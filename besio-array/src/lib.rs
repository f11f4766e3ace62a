//! Columnar output for besio.
//!
//! Readers accumulate decoded values through the [`builders`], which only ever append. At the end
//! of a decode pass each reader snapshots its builders into an immutable [`ArrayData`] tree:
//! offsets plus flat values for every ragged level. [`ArrayData::to_buffers`] flattens the tree
//! into named raw buffers and a JSON form descriptor, the inputs a caller needs to materialize
//! ragged arrays without copying.
//!
//! All buffers hold values in host byte order.

pub use arrays::*;
pub use buffers::*;

mod arrays;
pub mod builders;
mod buffers;
