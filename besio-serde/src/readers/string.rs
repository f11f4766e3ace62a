use besio_array::ArrayData;
use besio_array::builders::{ArrayBuilder, VarBinBuilder};
use besio_dtype::DType;
use besio_error::BesResult;

use crate::ByteCursor;

/// Reads length-prefixed strings.
///
/// A `TString` is just the length and the bytes. A top-level STL string is preceded by
/// `fNBytes` and `fVersion`.
#[derive(Debug, Default, Clone)]
pub struct StringReader {
    framed: bool,
    values: VarBinBuilder,
}

impl StringReader {
    /// Create a reader for `TString` members.
    pub fn tstring() -> Self {
        Self::default()
    }

    /// Create a reader for STL strings, framed when `framed` is set.
    pub fn stl(framed: bool) -> Self {
        Self {
            framed,
            values: VarBinBuilder::new(),
        }
    }

    /// Reads one string.
    pub fn read(&mut self, cursor: &mut ByteCursor) -> BesResult<()> {
        if self.framed {
            cursor.read_fnbytes()?;
            cursor.read_fversion()?;
        }
        self.values.append_value(cursor.read_tstring()?)
    }

    /// Snapshots the strings read so far.
    pub fn data(&self) -> BesResult<ArrayData> {
        self.values.snapshot()
    }

    /// Drops the strings read so far.
    pub fn clear(&mut self) {
        self.values.clear()
    }

    /// Returns the number of strings read.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether nothing was read.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns [`DType::Utf8`].
    pub fn dtype(&self) -> DType {
        DType::Utf8
    }
}
