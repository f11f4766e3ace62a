use std::fmt::{Display, Formatter};
use std::sync::Arc;

use DType::*;
use itertools::Itertools;

use crate::{PType, StructDType};

/// A name for a field in a struct
pub type FieldName = Arc<str>;
/// An ordered list of field names in a struct
pub type FieldNames = Arc<[FieldName]>;

/// The structural form of decoded values.
///
/// Every reader produces values of a single `DType`. Ragged shapes nest through `List` and `Map`,
/// fixed-shape C arrays through `FixedSizeList`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DType {
    /// No values, readers that only consume framing produce this
    Null,
    /// One byte per value, non-zero is `true`
    Bool,
    /// Primitive, fixed-width numeric types (e.g., `u8`, `i32`, `f64`)
    Primitive(PType),
    /// Length-prefixed strings. The bytes are passed through without validation.
    Utf8,
    /// A variable-length list, parameterized by a single element DType
    List(Arc<DType>),
    /// A list with exactly `size` elements per value
    FixedSizeList(Arc<DType>, u32),
    /// A variable-length list of key/value pairs
    Map(Arc<DType>, Arc<DType>),
    /// An ordered list of named fields
    Struct(StructDType),
}

impl DType {
    /// The default DType for bytes
    pub const BYTES: Self = Primitive(PType::U8);

    /// Check if `self` is a `StructDType`
    pub fn is_struct(&self) -> bool {
        matches!(self, Struct(_))
    }

    /// Check if `self` has no values
    pub fn is_null(&self) -> bool {
        matches!(self, Null)
    }

    /// Check if `self` is a primitive type
    pub fn is_primitive(&self) -> bool {
        matches!(self, Primitive(_))
    }

    /// Check if values of `self` have a variable number of elements
    pub fn is_ragged(&self) -> bool {
        matches!(self, List(_) | Map(..) | Utf8)
    }

    /// Get the `StructDType` if `self` is a `StructDType`, otherwise `None`
    pub fn as_struct(&self) -> Option<&StructDType> {
        match self {
            Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Get the element DType of a list or fixed-size list, otherwise `None`
    pub fn as_list_element(&self) -> Option<&DType> {
        match self {
            List(e) | FixedSizeList(e, _) => Some(e),
            _ => None,
        }
    }

    /// Returns the number of list levels wrapped around the innermost element type
    pub fn depth(&self) -> usize {
        match self {
            List(e) | FixedSizeList(e, _) => 1 + e.depth(),
            Map(_, v) => 1 + v.depth(),
            _ => 0,
        }
    }
}

impl Display for DType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Null => write!(f, "null"),
            Bool => write!(f, "bool"),
            Primitive(pt) => write!(f, "{pt}"),
            Utf8 => write!(f, "utf8"),
            List(edt) => write!(f, "list({edt})"),
            FixedSizeList(edt, size) => write!(f, "fixed_size_list({edt})[{size}]"),
            Map(kdt, vdt) => write!(f, "map({kdt}, {vdt})"),
            Struct(sdt) => write!(
                f,
                "{{{}}}",
                sdt.names()
                    .iter()
                    .zip(sdt.fields())
                    .map(|(n, dt)| format!("{n}={dt}"))
                    .join(", ")
            ),
        }
    }
}
