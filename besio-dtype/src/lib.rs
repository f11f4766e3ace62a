#![deny(missing_docs)]

//! A type system for besio
//!
//! This crate describes the fixed-width primitive types found on the wire ([`PType`]) and the
//! structural form of decoded values ([`DType`]): lists, fixed-size lists, maps, strings and
//! records nested to arbitrary depth.

pub use dtype::*;
pub use field::*;
pub use ptype::*;
pub use struct_::*;

mod dtype;
mod field;
mod ptype;
mod struct_;
