use besio_buffer::{Buffer, BufferMut};
use besio_error::{BesResult, besio_err};

/// Builds the offsets of a ragged level.
///
/// The buffer always starts with a single `0`. Every closed list pushes the running element
/// count, so after `n` lists it holds `n + 1` non-decreasing offsets.
#[derive(Debug, Clone)]
pub struct OffsetsBuilder {
    offsets: BufferMut<u32>,
}

impl Default for OffsetsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OffsetsBuilder {
    /// Create a new builder holding the leading `0`.
    pub fn new() -> Self {
        let mut offsets = BufferMut::with_capacity(1);
        offsets.push(0);
        Self { offsets }
    }

    /// Returns the number of closed lists.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Returns whether no list was closed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the running element count.
    pub fn last(&self) -> u32 {
        self.offsets.last().copied().unwrap_or_default()
    }

    /// Closes a list whose elements end at `content_len` in the child values.
    pub fn end_list(&mut self, content_len: usize) -> BesResult<()> {
        let end = u32::try_from(content_len)
            .map_err(|_| besio_err!("list content length {} overflows u32 offsets", content_len))?;
        if end < self.last() {
            return Err(besio_err!(
                "list content shrank from {} to {}",
                self.last(),
                end
            ));
        }
        self.offsets.push(end);
        Ok(())
    }

    /// Closes a list of `len` elements.
    pub fn append_length(&mut self, len: u32) -> BesResult<()> {
        let end = self
            .last()
            .checked_add(len)
            .ok_or_else(|| besio_err!("list of {} elements overflows u32 offsets", len))?;
        self.offsets.push(end);
        Ok(())
    }

    /// Drops all closed lists, keeping the leading `0`.
    pub fn clear(&mut self) {
        self.offsets.truncate(1);
    }

    /// Returns the offsets accumulated so far.
    pub fn as_slice(&self) -> &[u32] {
        &self.offsets
    }

    /// Copies the offsets into an immutable buffer.
    pub fn snapshot(&self) -> Buffer<u32> {
        Buffer::copy_from(&self.offsets)
    }
}
