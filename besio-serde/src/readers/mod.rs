//! Readers decode one field per entry and accumulate its values in columnar builders.
//!
//! Every reader follows the same contract: [`read`](Reader::read) consumes exactly the bytes of
//! one value and appends it, [`data`](Reader::data) snapshots everything appended since the last
//! [`clear`](Reader::clear). Composite readers own their children exclusively.

mod fixed;
mod object;
mod objarray;
mod primitive;
mod stl;
mod string;
mod tarray;

use besio_array::ArrayData;
use besio_dtype::DType;
use besio_error::BesResult;
pub use fixed::*;
pub use object::*;
pub use objarray::*;
pub use primitive::*;
pub use stl::*;
pub use string::*;
pub use tarray::*;

use crate::ByteCursor;

/// A reader for one of the wire shapes.
#[derive(Debug, Clone)]
pub enum Reader {
    /// Placeholder member
    Empty(EmptyReader),
    /// One byte booleans
    Bool(BoolReader),
    /// Fixed-width numbers
    Primitive(PrimitiveReader),
    /// `TString` and STL strings
    String(StringReader),
    /// `TArray` of numbers
    TArray(TArrayReader),
    /// STL sequences
    Seq(SeqReader),
    /// STL maps
    Map(MapReader),
    /// C arrays
    FixedArray(FixedArrayReader),
    /// `TObject` base
    TObject(TObjectReader),
    /// Objects with members
    Object(ObjectReader),
    /// Objects behind a class tag
    ObjectHeader(ObjectHeaderReader),
    /// `TObjArray` of objects
    ObjArray(ObjArrayReader),
}

macro_rules! match_each_reader {
    ($self:expr, $reader:ident => $body:expr) => {
        match $self {
            Reader::Empty($reader) => $body,
            Reader::Bool($reader) => $body,
            Reader::Primitive($reader) => $body,
            Reader::String($reader) => $body,
            Reader::TArray($reader) => $body,
            Reader::Seq($reader) => $body,
            Reader::Map($reader) => $body,
            Reader::FixedArray($reader) => $body,
            Reader::TObject($reader) => $body,
            Reader::Object($reader) => $body,
            Reader::ObjectHeader($reader) => $body,
            Reader::ObjArray($reader) => $body,
        }
    };
}

impl Reader {
    /// Consumes one value from the cursor and appends it.
    #[inline]
    pub fn read(&mut self, cursor: &mut ByteCursor) -> BesResult<()> {
        match_each_reader!(self, r => r.read(cursor))
    }

    /// Snapshots the values appended since the last clear.
    pub fn data(&self) -> BesResult<ArrayData> {
        match_each_reader!(self, r => r.data())
    }

    /// Drops the appended values, keeping allocations.
    pub fn clear(&mut self) {
        match_each_reader!(self, r => r.clear())
    }

    /// Returns the number of values read since the last clear.
    pub fn len(&self) -> usize {
        match_each_reader!(self, r => r.len())
    }

    /// Returns whether nothing was read since the last clear.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the form of the values [`data`](Self::data) produces.
    pub fn dtype(&self) -> DType {
        match_each_reader!(self, r => r.dtype())
    }

    /// Reads `n` values in a row.
    pub(crate) fn read_n(&mut self, cursor: &mut ByteCursor, n: usize) -> BesResult<()> {
        match self {
            Reader::Primitive(r) => r.read_n(cursor, n),
            r => {
                for _ in 0..n {
                    r.read(cursor)?;
                }
                Ok(())
            }
        }
    }
}
