//! Physical type definitions and behavior.

use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use besio_error::{BesError, BesResult, besio_err};
use num_traits::{FromPrimitive, Num, NumCast, ToPrimitive};

use crate::DType;

/// Physical type enum, represents the fixed-width primitive values stored on the wire.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PType {
    /// An 8-bit unsigned integer
    U8,
    /// A 16-bit unsigned integer
    U16,
    /// A 32-bit unsigned integer
    U32,
    /// A 64-bit unsigned integer
    U64,
    /// An 8-bit signed integer
    I8,
    /// A 16-bit signed integer
    I16,
    /// A 32-bit signed integer
    I32,
    /// A 64-bit signed integer
    I64,
    /// A 32-bit floating point number
    F32,
    /// A 64-bit floating point number
    F64,
}

/// A trait for native Rust types that correspond 1:1 to a PType
pub trait NativePType:
    Send
    + Sync
    + Clone
    + Copy
    + Debug
    + Display
    + Default
    + PartialEq
    + PartialOrd
    + Num
    + NumCast
    + FromPrimitive
    + ToPrimitive
    + 'static
{
    /// The PType that corresponds to this native type
    const PTYPE: PType;

    /// Decodes a value from exactly `size_of::<Self>()` big-endian bytes.
    ///
    /// Returns `None` if the slice has the wrong length.
    fn from_be_slice(bytes: &[u8]) -> Option<Self>;

    /// Encodes the value as big-endian bytes.
    fn to_be_vec(self) -> Vec<u8>;
}

macro_rules! native_ptype {
    ($T:ty, $ptype:tt) => {
        impl NativePType for $T {
            const PTYPE: PType = PType::$ptype;

            #[inline(always)]
            fn from_be_slice(bytes: &[u8]) -> Option<Self> {
                bytes.try_into().ok().map(<$T>::from_be_bytes)
            }

            fn to_be_vec(self) -> Vec<u8> {
                self.to_be_bytes().to_vec()
            }
        }
    };
}

native_ptype!(u8, U8);
native_ptype!(u16, U16);
native_ptype!(u32, U32);
native_ptype!(u64, U64);
native_ptype!(i8, I8);
native_ptype!(i16, I16);
native_ptype!(i32, I32);
native_ptype!(i64, I64);
native_ptype!(f32, F32);
native_ptype!(f64, F64);

/// Macro to match over each PType, binding the corresponding native type (from `NativePType`)
#[macro_export]
macro_rules! match_each_native_ptype {
    ($self:expr, | $_:tt $enc:ident | $($body:tt)*) => ({
        macro_rules! __with__ {( $_ $enc:ident ) => ( $($body)* )}
        use $crate::PType;
        match $self {
            PType::I8 => __with__! { i8 },
            PType::I16 => __with__! { i16 },
            PType::I32 => __with__! { i32 },
            PType::I64 => __with__! { i64 },
            PType::U8 => __with__! { u8 },
            PType::U16 => __with__! { u16 },
            PType::U32 => __with__! { u32 },
            PType::U64 => __with__! { u64 },
            PType::F32 => __with__! { f32 },
            PType::F64 => __with__! { f64 },
        }
    })
}

impl PType {
    /// Returns `true` iff this PType is an unsigned integer type
    pub const fn is_unsigned_int(self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    /// Returns `true` iff this PType is a signed integer type
    pub const fn is_signed_int(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// Returns `true` iff this PType is an integer type, signed or unsigned
    pub const fn is_int(self) -> bool {
        self.is_unsigned_int() || self.is_signed_int()
    }

    /// Returns `true` iff this PType is a floating point type
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Returns the number of bytes one value occupies on the wire
    pub const fn byte_width(&self) -> usize {
        match_each_native_ptype!(self, |$T| size_of::<$T>())
    }

    /// Returns the name of the matching primitive in a columnar form descriptor
    pub const fn form_name(&self) -> &'static str {
        match self {
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::F32 => "float32",
            Self::F64 => "float64",
        }
    }
}

impl Display for PType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::I8 => write!(f, "i8"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
        }
    }
}

impl FromStr for PType {
    type Err = BesError;

    /// Accepts both the short Rust names and the names of the ROOT basic types.
    fn from_str(s: &str) -> BesResult<Self> {
        Ok(match s {
            "u8" | "UChar_t" => Self::U8,
            "u16" | "UShort_t" => Self::U16,
            "u32" | "UInt_t" => Self::U32,
            "u64" | "ULong64_t" => Self::U64,
            "i8" | "Char_t" => Self::I8,
            "i16" | "Short_t" => Self::I16,
            "i32" | "Int_t" => Self::I32,
            "i64" | "Long64_t" => Self::I64,
            "f32" | "Float_t" => Self::F32,
            "f64" | "Double_t" => Self::F64,
            other => return Err(besio_err!("Unknown primitive type name {}", other)),
        })
    }
}

impl TryFrom<&DType> for PType {
    type Error = BesError;

    fn try_from(value: &DType) -> BesResult<Self> {
        match value {
            DType::Primitive(p) => Ok(*p),
            _ => Err(besio_err!("Cannot convert DType {} into PType", value)),
        }
    }
}

impl From<PType> for DType {
    fn from(item: PType) -> Self {
        DType::Primitive(item)
    }
}
