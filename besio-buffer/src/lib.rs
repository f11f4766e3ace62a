#![deny(missing_docs)]

//! Typed buffers for besio.
//!
//! Decoded columns are held in [`Buffer<T>`], an immutable, cheaply cloneable view over
//! [`bytes::Bytes`]. Builders accumulate into [`BufferMut<T>`] during a decode pass and freeze
//! into a `Buffer<T>` without copying.
//!
//! A `Buffer<T>` is always aligned to `T`. Viewing a [`ByteBuffer`] as a typed buffer checks the
//! alignment of the underlying bytes.

pub use buffer::*;
pub use buffer_mut::*;

mod buffer;
mod buffer_mut;
mod debug;
mod macros;

/// An immutable buffer of u8.
pub type ByteBuffer = Buffer<u8>;
