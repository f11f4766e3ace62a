//! Produces synthetic branch bytes in the ROOT streamer layout.
//!
//! Only the framing primitives are emitted; it is up to the caller to lay them out the way the
//! shape under test expects.

use besio_buffer::{Buffer, ByteBuffer};
use besio_dtype::NativePType;
use besio_error::{BesExpect, BesResult};

use crate::{BYTE_COUNT_MASK, ByteCursor, LONG_STRING_ESCAPE, NEW_CLASS_TAG};

/// Tag written for objects whose class was named earlier in the buffer.
const CLASS_REFERENCE_TAG: u32 = 0x8000_0000;

/// `fBits` of a `TObject` that is on the heap and not referenced.
const TOBJECT_BITS: u32 = 0x0300_0000;

/// Writes big-endian values and records entry boundaries.
#[derive(Debug, Clone)]
pub struct WireWriter {
    bytes: Vec<u8>,
    entry_offsets: Vec<u32>,
}

impl Default for WireWriter {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            entry_offsets: vec![0],
        }
    }
}

impl WireWriter {
    /// Appends one big-endian value.
    pub fn put<T: NativePType>(&mut self, value: T) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_be_vec());
        self
    }

    /// Appends raw bytes.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// Appends a byte count with its flag set.
    pub fn put_fnbytes(&mut self, len: u32) -> &mut Self {
        self.put(len | BYTE_COUNT_MASK)
    }

    /// Appends a version tag.
    pub fn put_fversion(&mut self, version: u16) -> &mut Self {
        self.put(version)
    }

    /// Appends a length-prefixed string, escaping lengths of 255 and above.
    pub fn put_tstring(&mut self, value: &[u8]) -> &mut Self {
        match u8::try_from(value.len()) {
            Ok(len) if len < LONG_STRING_ESCAPE => self.put(len),
            _ => {
                let len = u32::try_from(value.len()).besio_expect("string length fits u32");
                self.put(LONG_STRING_ESCAPE).put(len)
            }
        };
        self.put_bytes(value)
    }

    /// Appends a null-terminated string.
    pub fn put_cstring(&mut self, value: &str) -> &mut Self {
        self.put_bytes(value.as_bytes()).put(0u8)
    }

    /// Appends a `TObject` base.
    pub fn put_tobject(&mut self) -> &mut Self {
        self.put_fversion(1).put(0u32).put(TOBJECT_BITS)
    }

    /// Appends `fNBytes` and `fVersion`, then whatever `f` writes, and patches the byte count to
    /// cover the version and the body.
    pub fn framed(&mut self, version: u16, f: impl FnOnce(&mut Self)) -> &mut Self {
        let start = self.bytes.len();
        self.put_fnbytes(0).put_fversion(version);
        f(self);
        self.patch_fnbytes(start)
    }

    /// Appends an object written through a pointer: a byte count, the class tag (with the class
    /// name when `class` is set), then a framed object holding whatever `f` writes.
    pub fn header(
        &mut self,
        class: Option<&str>,
        version: u16,
        f: impl FnOnce(&mut Self),
    ) -> &mut Self {
        let start = self.bytes.len();
        self.put_fnbytes(0);
        match class {
            Some(name) => self.put(NEW_CLASS_TAG).put_cstring(name),
            None => self.put(CLASS_REFERENCE_TAG),
        };
        self.framed(version, f);
        self.patch_fnbytes(start)
    }

    /// Appends an unnamed `TObjArray` of `count` elements written by `f`.
    pub fn obj_array(&mut self, count: usize, f: impl FnOnce(&mut Self)) -> &mut Self {
        let count = u32::try_from(count).besio_expect("object array count fits u32");
        self.framed(3, |w| {
            w.put_tobject().put(0u8).put(count).put(0u32);
            f(w);
        })
    }

    /// Closes the current entry.
    pub fn end_entry(&mut self) -> &mut Self {
        let end = u32::try_from(self.bytes.len()).besio_expect("branch fits u32 offsets");
        self.entry_offsets.push(end);
        self
    }

    /// Returns the bytes written so far.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the number of closed entries.
    pub fn entry_count(&self) -> usize {
        self.entry_offsets.len() - 1
    }

    /// Returns the bytes and the entry offset table.
    pub fn finish(self) -> (ByteBuffer, Buffer<u32>) {
        (ByteBuffer::from(self.bytes), Buffer::from(self.entry_offsets))
    }

    /// Returns a cursor over the closed entries.
    pub fn into_cursor(self) -> BesResult<ByteCursor> {
        let (bytes, offsets) = self.finish();
        ByteCursor::try_new(bytes, offsets)
    }

    fn patch_fnbytes(&mut self, start: usize) -> &mut Self {
        let len = u32::try_from(self.bytes.len() - start - size_of::<u32>())
            .besio_expect("object fits u32 byte count");
        self.bytes[start..start + size_of::<u32>()]
            .copy_from_slice(&(len | BYTE_COUNT_MASK).to_be_bytes());
        self
    }
}
