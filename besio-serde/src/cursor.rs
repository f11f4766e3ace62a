use std::ops::Range;

use besio_array::builders::PrimitiveSource;
use besio_buffer::{Buffer, ByteBuffer};
use besio_dtype::NativePType;
use besio_error::{BesResult, besio_bail, besio_err};
use log::trace;

/// The flag every byte-count field carries on the wire.
pub const BYTE_COUNT_MASK: u32 = 0x4000_0000;

/// The object tag announcing that a null-terminated class name follows.
pub const NEW_CLASS_TAG: i32 = -1;

/// A length byte of this value is followed by the real length as a `u32`.
pub const LONG_STRING_ESCAPE: u8 = 255;

/// A forward-only, big-endian reader over the bytes of one branch.
///
/// The cursor holds the branch bytes and the entry offset table (`entry_count + 1` non-decreasing
/// byte offsets). Reads are bounded by the current limit: the end of the entry selected with
/// [`seek_entry`](Self::seek_entry), or the end of the buffer before any entry was selected.
/// Running past the limit fails with [`DecodeExhaustion`](besio_error::BesError::DecodeExhaustion).
#[derive(Debug, Clone)]
pub struct ByteCursor {
    data: ByteBuffer,
    entry_offsets: Buffer<u32>,
    pos: usize,
    limit: usize,
}

impl ByteCursor {
    /// Create a cursor over `data` split into entries by `entry_offsets`.
    pub fn try_new(data: ByteBuffer, entry_offsets: Buffer<u32>) -> BesResult<Self> {
        if entry_offsets.is_empty() {
            besio_bail!("entry offset table must hold at least one offset");
        }
        if entry_offsets.as_slice().windows(2).any(|w| w[0] > w[1]) {
            besio_bail!("entry offset table is not monotonic");
        }
        let last = entry_offsets.as_slice()[entry_offsets.len() - 1] as usize;
        if last > data.len() {
            besio_bail!(
                "entry offset table ends at {} but only {} bytes are available",
                last,
                data.len()
            );
        }

        let limit = data.len();
        Ok(Self {
            data,
            entry_offsets,
            pos: 0,
            limit,
        })
    }

    /// Returns the number of entries in the offset table.
    pub fn entry_count(&self) -> usize {
        self.entry_offsets.len() - 1
    }

    /// Returns the byte range of entry `index`.
    pub fn entry_range(&self, index: usize) -> BesResult<Range<usize>> {
        if index >= self.entry_count() {
            besio_bail!(
                "entry {} is out of bounds for {} entries",
                index,
                self.entry_count()
            );
        }
        let offsets = self.entry_offsets.as_slice();
        Ok(offsets[index] as usize..offsets[index + 1] as usize)
    }

    /// Positions the cursor at the start of entry `index` and bounds reads to its end.
    pub fn seek_entry(&mut self, index: usize) -> BesResult<()> {
        let range = self.entry_range(index)?;
        self.pos = range.start;
        self.limit = range.end;
        Ok(())
    }

    /// Checks that the current entry was consumed, returning the number of unread bytes.
    ///
    /// Trailing bytes are not an error: streamers may pad an entry with members no reader asked
    /// for.
    pub fn finish_entry(&self) -> usize {
        let trailing = self.remaining();
        if trailing > 0 {
            trace!(
                "{} trailing bytes left unread at position {}",
                trailing, self.pos
            );
        }
        trailing
    }

    /// Returns the absolute position in the branch bytes.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the position reads may not cross.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of bytes left before the limit.
    pub fn remaining(&self) -> usize {
        self.limit - self.pos
    }

    /// Consumes `n` bytes and returns them.
    pub fn read_bytes(&mut self, n: usize) -> BesResult<&[u8]> {
        let start = self.pos;
        let end = start
            .checked_add(n)
            .filter(|end| *end <= self.limit)
            .ok_or_else(|| besio_err!(DecodeExhaustion: n, start, self.limit))?;
        self.pos = end;
        Ok(&self.data.as_slice()[start..end])
    }

    /// Advances by `n` bytes without interpreting them.
    pub fn skip(&mut self, n: usize) -> BesResult<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Reads one big-endian value.
    #[inline]
    pub fn read<T: NativePType>(&mut self) -> BesResult<T> {
        let width = size_of::<T>();
        let pos = self.pos;
        let limit = self.limit;
        let bytes = self.read_bytes(width)?;
        T::from_be_slice(bytes).ok_or_else(|| besio_err!(DecodeExhaustion: width, pos, limit))
    }

    /// Reads one byte as a boolean, any non-zero value is `true`.
    pub fn read_bool(&mut self) -> BesResult<bool> {
        Ok(self.read::<u8>()? != 0)
    }

    /// Reads a byte-count field and returns the count with its flag cleared.
    pub fn read_fnbytes(&mut self) -> BesResult<u32> {
        let pos = self.pos;
        let raw = self.read::<u32>()?;
        if raw & BYTE_COUNT_MASK == 0 {
            besio_bail!(MalformedFraming: raw, pos);
        }
        Ok(raw & !BYTE_COUNT_MASK)
    }

    /// Reads a version tag. Versions are not validated.
    pub fn read_fversion(&mut self) -> BesResult<u16> {
        self.read::<u16>()
    }

    /// Reads the bytes up to a `0x00` terminator, consuming the terminator too.
    pub fn read_null_terminated_string(&mut self) -> BesResult<&[u8]> {
        let start = self.pos;
        let window = &self.data.as_slice()[start..self.limit];
        let Some(len) = window.iter().position(|b| *b == 0) else {
            besio_bail!(DecodeExhaustion: window.len() + 1, start, self.limit);
        };
        self.pos = start + len + 1;
        Ok(&self.data.as_slice()[start..start + len])
    }

    /// Reads a length-prefixed string: a `u8` length, or `255` followed by a `u32` length.
    pub fn read_tstring(&mut self) -> BesResult<&[u8]> {
        let len = match self.read::<u8>()? {
            LONG_STRING_ESCAPE => self.read::<u32>()? as usize,
            short => short as usize,
        };
        self.read_bytes(len)
    }
}

impl PrimitiveSource for ByteCursor {
    #[inline]
    fn next_value<T: NativePType>(&mut self) -> BesResult<T> {
        self.read()
    }

    fn remaining(&self) -> usize {
        ByteCursor::remaining(self)
    }
}
