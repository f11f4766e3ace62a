//! The row store supplying raw branch bytes.
//!
//! A store holds one byte column per streamed member (for example `TMcEvent/m_mdcMcHitCol`),
//! each with an entry-offset table. Columns are grouped into branches by the part of their name
//! before the first `/`. Deactivated branches are never fetched, so their readers never see bytes.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use besio_buffer::{Buffer, ByteBuffer};
use besio_error::{BesResult, besio_bail, besio_err};
use besio_serde::ByteCursor;
use log::debug;

/// Returns the branch a column belongs to.
pub fn branch_of(column: &str) -> &str {
    column.split_once('/').map_or(column, |(branch, _)| branch)
}

/// The bytes of a run of entries of one column.
#[derive(Debug, Clone)]
pub struct ColumnBytes {
    /// The entry bytes, back to back.
    pub data: ByteBuffer,
    /// Entry boundaries into `data`, one more than the number of entries, starting at 0.
    pub offsets: Buffer<u32>,
}

impl ColumnBytes {
    /// Returns the total number of bytes.
    pub fn nbytes(&self) -> usize {
        self.data.len()
    }

    /// Returns a cursor over the entries.
    pub fn into_cursor(self) -> BesResult<ByteCursor> {
        ByteCursor::try_new(self.data, self.offsets)
    }
}

/// A source of entry-delimited branch bytes.
pub trait RowStore: Send + Sync {
    /// Returns the number of entries.
    fn entry_count(&self) -> u64;

    /// Returns the branch names, sorted.
    fn branch_names(&self) -> Vec<String>;

    /// Returns whether `branch` is fetched.
    fn is_branch_active(&self, branch: &str) -> bool;

    /// Enables or disables fetching of `branch`.
    fn set_branch_active(&mut self, branch: &str, active: bool) -> BesResult<()>;

    /// Returns the byte range of one entry of `column`, relative to the column start.
    fn byte_range(&self, column: &str, entry: u64) -> BesResult<Range<u64>>;

    /// Fetches `entries` of `column`. Fails when the column's branch is not active.
    fn fetch(&self, column: &str, entries: Range<u64>) -> BesResult<ColumnBytes>;

    /// Returns whether the store has `branch`.
    fn has_branch(&self, branch: &str) -> bool {
        self.branch_names().iter().any(|name| name == branch)
    }
}

#[derive(Debug, Clone)]
struct Column {
    data: ByteBuffer,
    offsets: Buffer<u32>,
}

/// A row store backed by in-memory buffers.
///
/// Fetches perform no copying of entry bytes, they slice the column buffer and rebase its
/// offsets.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRowStore {
    entries: u64,
    columns: BTreeMap<String, Column>,
    inactive: BTreeSet<String>,
}

impl InMemoryRowStore {
    /// Create an empty store holding `entries` entries.
    pub fn new(entries: u64) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    /// Adds a column, validating its offset table against the entry count.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        data: ByteBuffer,
        offsets: Buffer<u32>,
    ) -> BesResult<Self> {
        let name = name.into();
        if name.is_empty() {
            besio_bail!("column names cannot be empty");
        }
        if self.columns.contains_key(&name) {
            besio_bail!("duplicate column {}", name);
        }
        if offsets.len() as u64 != self.entries + 1 {
            besio_bail!(
                "column {} has {} offsets, expected {}",
                name,
                offsets.len(),
                self.entries + 1
            );
        }
        // Validates monotonic offsets within the data
        ByteCursor::try_new(data.clone(), offsets.clone())
            .map_err(|err| err.with_context(format!("column {}", name)))?;

        self.columns.insert(name, Column { data, offsets });
        Ok(self)
    }

    /// Returns the column names, sorted.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    fn column(&self, name: &str) -> BesResult<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| besio_err!("no column named {}", name))
    }
}

impl RowStore for InMemoryRowStore {
    fn entry_count(&self) -> u64 {
        self.entries
    }

    fn branch_names(&self) -> Vec<String> {
        self.columns
            .keys()
            .map(|column| branch_of(column))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn is_branch_active(&self, branch: &str) -> bool {
        self.has_branch(branch) && !self.inactive.contains(branch)
    }

    fn set_branch_active(&mut self, branch: &str, active: bool) -> BesResult<()> {
        if !self.has_branch(branch) {
            besio_bail!("no branch named {}", branch);
        }
        let changed = if active {
            self.inactive.remove(branch)
        } else {
            self.inactive.insert(branch.to_string())
        };
        if changed {
            debug!("branch {} is now {}", branch, if active { "active" } else { "inactive" });
        }
        Ok(())
    }

    fn byte_range(&self, column: &str, entry: u64) -> BesResult<Range<u64>> {
        let col = self.column(column)?;
        if entry >= self.entries {
            besio_bail!(EntryRange: i64::try_from(entry)?, i64::try_from(entry)? + 1, self.entries);
        }
        let index = usize::try_from(entry)?;
        Ok(u64::from(col.offsets[index])..u64::from(col.offsets[index + 1]))
    }

    fn fetch(&self, column: &str, entries: Range<u64>) -> BesResult<ColumnBytes> {
        let col = self.column(column)?;
        let branch = branch_of(column);
        if !self.is_branch_active(branch) {
            besio_bail!("branch {} is inactive, cannot fetch {}", branch, column);
        }
        if entries.start > entries.end || entries.end > self.entries {
            besio_bail!(
                EntryRange: i64::try_from(entries.start)?,
                i64::try_from(entries.end)?,
                self.entries
            );
        }

        let start = usize::try_from(entries.start)?;
        let end = usize::try_from(entries.end)?;
        let base = col.offsets[start];
        let offsets = col.offsets[start..=end]
            .iter()
            .map(|offset| offset - base)
            .collect::<Buffer<u32>>();
        let data = col
            .data
            .slice(base as usize..col.offsets[end] as usize);
        Ok(ColumnBytes { data, offsets })
    }
}
