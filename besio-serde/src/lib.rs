#![deny(missing_docs)]

//! Decoding of the ROOT streamer wire format used by BES III event data.
//!
//! A [`ByteCursor`] walks a branch's bytes one entry at a time. For every entry, the root
//! [`Reader`] of a field consumes exactly the bytes of the serialized object and appends the
//! decoded values to its columnar builders. Reader trees are compiled once from a [`Shape`]
//! and reused across decode passes.
//!
//! ```
//! use besio_buffer::{ByteBuffer, buffer};
//! use besio_dtype::PType;
//! use besio_serde::{ByteCursor, Reader, Shape};
//!
//! // fNBytes, fVersion, count, then two big-endian doubles
//! let mut bytes = vec![0x40, 0x00, 0x00, 0x16, 0x00, 0x09, 0x00, 0x00, 0x00, 0x02];
//! bytes.extend_from_slice(&1.5f64.to_be_bytes());
//! bytes.extend_from_slice(&2.5f64.to_be_bytes());
//!
//! let mut cursor = ByteCursor::try_new(ByteBuffer::from(bytes), buffer![0u32, 26]).unwrap();
//! let mut reader = Reader::compile(&Shape::seq(Shape::primitive(PType::F64))).unwrap();
//! cursor.seek_entry(0).unwrap();
//! reader.read(&mut cursor).unwrap();
//!
//! let data = reader.data().unwrap();
//! assert_eq!(data.as_list().unwrap().offsets().as_slice(), &[0, 2]);
//! ```

pub use cursor::*;
pub use readers::*;
pub use shape::*;

mod compile;
mod cursor;
mod readers;
mod shape;
#[cfg(any(test, feature = "test-harness"))]
pub mod test_harness;
