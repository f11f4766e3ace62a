mod bool;
mod fixed_size_list;
mod list;
mod map;
mod null;
mod primitive;
mod struct_;
mod varbin;

use std::fmt::{Display, Formatter};
use std::ops::Range;

pub use bool::*;
use besio_buffer::ByteBuffer;
use besio_dtype::DType;
use besio_error::{BesResult, besio_bail};
pub use fixed_size_list::*;
pub use list::*;
pub use map::*;
pub use null::*;
pub use primitive::*;
pub use struct_::*;
pub use varbin::*;

/// An immutable snapshot of decoded values.
///
/// Each variant owns its buffers and, for nested shapes, its children. Cloning is cheap since
/// all buffers are reference counted.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    /// No values, only a length
    Null(NullArray),
    /// Booleans, one byte each
    Bool(BoolArray),
    /// Fixed-width numbers
    Primitive(PrimitiveArray),
    /// Length-prefixed strings
    VarBin(VarBinArray),
    /// Ragged lists: offsets plus flat elements
    List(ListArray),
    /// Lists of a fixed size
    FixedSizeList(FixedSizeListArray),
    /// Ragged key/value lists
    Map(MapArray),
    /// Named fields of equal length
    Struct(StructArray),
}

impl ArrayData {
    /// Returns the number of top-level values.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Null(a) => a.len(),
            ArrayData::Bool(a) => a.len(),
            ArrayData::Primitive(a) => a.len(),
            ArrayData::VarBin(a) => a.len(),
            ArrayData::List(a) => a.len(),
            ArrayData::FixedSizeList(a) => a.len(),
            ArrayData::Map(a) => a.len(),
            ArrayData::Struct(a) => a.len(),
        }
    }

    /// Returns whether there are no top-level values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the structural form of the values.
    pub fn dtype(&self) -> DType {
        match self {
            ArrayData::Null(_) => DType::Null,
            ArrayData::Bool(_) => DType::Bool,
            ArrayData::Primitive(a) => DType::Primitive(a.ptype()),
            ArrayData::VarBin(_) => DType::Utf8,
            ArrayData::List(a) => a.dtype(),
            ArrayData::FixedSizeList(a) => a.dtype(),
            ArrayData::Map(a) => a.dtype(),
            ArrayData::Struct(a) => a.dtype(),
        }
    }

    /// Returns the buffers owned directly by this array, without its children.
    pub fn buffers(&self) -> Vec<ByteBuffer> {
        match self {
            ArrayData::Null(_) | ArrayData::Struct(_) | ArrayData::FixedSizeList(_) => vec![],
            ArrayData::Bool(a) => vec![a.values().clone().into_byte_buffer()],
            ArrayData::Primitive(a) => vec![a.byte_buffer().clone()],
            ArrayData::VarBin(a) => vec![
                a.offsets().clone().into_byte_buffer(),
                a.bytes().clone(),
            ],
            ArrayData::List(a) => vec![a.offsets().clone().into_byte_buffer()],
            ArrayData::Map(a) => vec![a.offsets().clone().into_byte_buffer()],
        }
    }

    /// Returns the named children of this array.
    pub fn children(&self) -> Vec<(String, &ArrayData)> {
        match self {
            ArrayData::Null(_)
            | ArrayData::Bool(_)
            | ArrayData::Primitive(_)
            | ArrayData::VarBin(_) => vec![],
            ArrayData::List(a) => vec![("elements".to_string(), a.elements())],
            ArrayData::FixedSizeList(a) => vec![("elements".to_string(), a.elements())],
            ArrayData::Map(a) => vec![
                ("keys".to_string(), a.keys()),
                ("values".to_string(), a.values()),
            ],
            ArrayData::Struct(a) => a
                .names()
                .iter()
                .zip(a.fields())
                .map(|(name, field)| (name.to_string(), field))
                .collect(),
        }
    }

    /// Total size in bytes of all buffers of this array and its children.
    pub fn nbytes(&self) -> usize {
        self.buffers().iter().map(|b| b.len()).sum::<usize>()
            + self
                .children()
                .into_iter()
                .map(|(_, child)| child.nbytes())
                .sum::<usize>()
    }

    /// Returns the primitive array if `self` is one.
    pub fn as_primitive(&self) -> Option<&PrimitiveArray> {
        match self {
            ArrayData::Primitive(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the bool array if `self` is one.
    pub fn as_bool(&self) -> Option<&BoolArray> {
        match self {
            ArrayData::Bool(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the string array if `self` is one.
    pub fn as_varbin(&self) -> Option<&VarBinArray> {
        match self {
            ArrayData::VarBin(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the list array if `self` is one.
    pub fn as_list(&self) -> Option<&ListArray> {
        match self {
            ArrayData::List(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the fixed-size list array if `self` is one.
    pub fn as_fixed_size_list(&self) -> Option<&FixedSizeListArray> {
        match self {
            ArrayData::FixedSizeList(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the map array if `self` is one.
    pub fn as_map(&self) -> Option<&MapArray> {
        match self {
            ArrayData::Map(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the struct array if `self` is one.
    pub fn as_struct(&self) -> Option<&StructArray> {
        match self {
            ArrayData::Struct(a) => Some(a),
            _ => None,
        }
    }
}

impl Display for ArrayData {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, len={}", self.dtype(), self.len())
    }
}

/// Checks that `offsets` delimit exactly `nelements` elements.
pub(crate) fn validate_offsets(offsets: &[u32], nelements: usize) -> BesResult<()> {
    let Some((&first, _)) = offsets.split_first() else {
        besio_bail!("offsets must contain at least one entry");
    };
    if first != 0 {
        besio_bail!("offsets must start at 0, found {}", first);
    }
    if let Some(pos) = offsets.windows(2).position(|w| w[0] > w[1]) {
        besio_bail!(
            "offsets must be non-decreasing, found {} > {} at {}",
            offsets[pos],
            offsets[pos + 1],
            pos
        );
    }
    let last = offsets[offsets.len() - 1] as usize;
    if last != nelements {
        besio_bail!(
            "last offset {} does not match the number of elements {}",
            last,
            nelements
        );
    }
    Ok(())
}

/// Returns the element range of list `index`.
pub(crate) fn offsets_range(offsets: &[u32], index: usize) -> Range<usize> {
    offsets[index] as usize..offsets[index + 1] as usize
}
