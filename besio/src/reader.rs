use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use besio_array::{ArrayData, ColumnarBuffers};
use besio_error::{BesResult, besio_bail};
use besio_metrics::{BYTES_DECODED, DECODE_PASS, ENTRIES_DECODED};
use besio_serde::{ByteCursor, Reader};
use humansize::{DECIMAL, format_size};
use itertools::Itertools;
use log::debug;
use rayon::prelude::*;

use crate::catalog::{FieldCatalog, FieldDef};
use crate::options::EventReaderOptions;
use crate::selection::GlobPattern;
use crate::store::RowStore;

/// The decoded value of one field after a pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// The field was not selected for the pass.
    Absent,
    /// The field's values, one per entry.
    Decoded(ArrayData),
}

impl Column {
    /// Returns whether the field was not selected.
    pub fn is_absent(&self) -> bool {
        matches!(self, Column::Absent)
    }

    /// Returns the decoded values, if any.
    pub fn as_decoded(&self) -> Option<&ArrayData> {
        match self {
            Column::Absent => None,
            Column::Decoded(data) => Some(data),
        }
    }

    /// Flattens the decoded values into raw buffers.
    pub fn to_buffers(&self) -> Option<ColumnarBuffers> {
        self.as_decoded().map(ArrayData::to_buffers)
    }

    /// Size in bytes of the decoded buffers, 0 when absent.
    pub fn nbytes(&self) -> usize {
        self.as_decoded().map_or(0, ArrayData::nbytes)
    }
}

/// The result of a pass, keyed by field path.
pub type Columns = BTreeMap<String, Column>;

struct FieldSlot {
    name: String,
    def: FieldDef,
    reader: Reader,
    active: bool,
}

/// Decodes event fields from a [`RowStore`].
///
/// The reader owns one compiled reader tree per field. Trees are built once, at construction,
/// and their buffers are cleared around every pass.
pub struct EventReader<S> {
    store: S,
    fields: Vec<FieldSlot>,
    options: EventReaderOptions,
}

impl<S: RowStore> EventReader<S> {
    /// Create a reader over the fields of `catalog` whose branch exists in `store`.
    pub fn try_new(store: S, catalog: &FieldCatalog) -> BesResult<Self> {
        Self::try_new_with_options(store, catalog, EventReaderOptions::default())
    }

    /// Create a reader with explicit options.
    pub fn try_new_with_options(
        store: S,
        catalog: &FieldCatalog,
        options: EventReaderOptions,
    ) -> BesResult<Self> {
        let present = catalog.retain_branches(|branch| store.has_branch(branch));
        if present.len() < catalog.len() {
            debug!(
                "{} of {} catalog fields have no branch in the store",
                catalog.len() - present.len(),
                catalog.len()
            );
        }

        let fields = present
            .fields()
            .iter()
            .map(|def| {
                Ok(FieldSlot {
                    name: def.path.to_string(),
                    reader: Reader::compile(&def.shape)?,
                    def: def.clone(),
                    active: true,
                })
            })
            .collect::<BesResult<Vec<_>>>()?;

        Ok(Self {
            store,
            fields,
            options,
        })
    }

    /// Returns the number of entries in the store.
    pub fn entry_count(&self) -> u64 {
        self.store.entry_count()
    }

    /// Returns the paths of the decodable fields, in catalog order.
    pub fn available_fields(&self) -> Vec<String> {
        self.fields.iter().map(|slot| slot.name.clone()).collect()
    }

    /// Returns whether the field at `path` is selected.
    pub fn is_field_active(&self, path: &str) -> bool {
        self.fields
            .iter()
            .any(|slot| slot.active && slot.name == path)
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the options.
    pub fn options(&self) -> &EventReaderOptions {
        &self.options
    }

    /// Selects or deselects every field matching the glob `pattern`.
    ///
    /// Selecting a field also activates its branch.
    pub fn set_field_status(&mut self, pattern: &str, active: bool) -> BesResult<()> {
        let glob = GlobPattern::new(pattern)?;
        let mut matched = false;
        let mut branches = BTreeSet::new();
        for slot in self.fields.iter_mut().filter(|slot| glob.matches(&slot.name)) {
            slot.active = active;
            matched = true;
            if active {
                branches.insert(slot.def.branch.clone());
            }
        }
        if !matched {
            besio_bail!(UnknownField: "Cannot find (any) field of '{}'", pattern);
        }

        for branch in branches {
            self.store.set_branch_active(&branch, true)?;
        }
        Ok(())
    }

    /// Activates or deactivates every store branch matching the glob `pattern`.
    pub fn set_branch_status(&mut self, pattern: &str, active: bool) -> BesResult<()> {
        let glob = GlobPattern::new(pattern)?;
        let branches = self
            .store
            .branch_names()
            .into_iter()
            .filter(|branch| glob.matches(branch))
            .collect_vec();
        if branches.is_empty() {
            besio_bail!(UnknownField: "Cannot find (any) branch of {}", pattern);
        }
        for branch in branches {
            self.store.set_branch_active(&branch, active)?;
        }
        Ok(())
    }

    /// Decodes the entries `[entry_start, entry_stop)` of the fields matching `field_names`,
    /// or of every field when `field_names` is empty.
    ///
    /// `entry_start` must name an existing entry, otherwise the pass fails with
    /// [`BesError::EntryRange`](besio_error::BesError::EntryRange).
    ///
    /// Fields that were not selected map to [`Column::Absent`]. Any failure aborts the whole
    /// pass; no partial result is returned.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            skip_all,
            fields(entry_start = entry_start, entry_stop = entry_stop, fields = field_names.len())
        )
    )]
    pub fn decode(
        &mut self,
        entry_start: i64,
        entry_stop: i64,
        field_names: &[&str],
    ) -> BesResult<Columns> {
        let entries = self.check_range(entry_start, entry_stop)?;
        self.select(field_names)?;
        self.optimize_branch_status()?;
        self.clear();

        let result = self.run_pass(entries);
        self.clear();
        result
    }

    /// Decodes several entry ranges concurrently.
    ///
    /// Each chunk gets its own freshly compiled reader trees and cursors, only the store is
    /// shared. Results are returned in chunk order.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(chunks = chunks.len()))
    )]
    pub fn decode_chunks(
        &mut self,
        chunks: &[Range<u64>],
        field_names: &[&str],
    ) -> BesResult<Vec<Columns>> {
        let ranges = chunks
            .iter()
            .map(|chunk| {
                self.check_range(i64::try_from(chunk.start)?, i64::try_from(chunk.end)?)
            })
            .collect::<BesResult<Vec<_>>>()?;
        self.select(field_names)?;
        self.optimize_branch_status()?;

        let store = &self.store;
        let options = &self.options;
        let fields = &self.fields;
        ranges
            .into_par_iter()
            .map(|entries| {
                let mut readers = fields
                    .iter()
                    .map(|slot| {
                        slot.active
                            .then(|| Reader::compile(&slot.def.shape))
                            .transpose()
                    })
                    .collect::<BesResult<Vec<_>>>()?;
                let mut active = fields
                    .iter()
                    .zip(readers.iter_mut())
                    .filter_map(|(slot, reader)| reader.as_mut().map(|reader| (&slot.def, reader)))
                    .collect_vec();
                decode_range(store, options, &mut active, entries)?;
                snapshot(
                    fields
                        .iter()
                        .zip(readers.iter())
                        .map(|(slot, reader)| (slot.name.as_str(), reader.as_ref())),
                )
            })
            .collect()
    }

    fn check_range(&self, entry_start: i64, entry_stop: i64) -> BesResult<Range<u64>> {
        let count = self.entry_count();
        // the start must name an existing entry, the stop may equal the count
        let in_bounds = u64::try_from(entry_start).is_ok_and(|start| start < count)
            && entry_start <= entry_stop
            && u64::try_from(entry_stop).is_ok_and(|stop| stop <= count);
        if !in_bounds {
            besio_bail!(EntryRange: entry_start, entry_stop, count);
        }
        Ok(u64::try_from(entry_start)?..u64::try_from(entry_stop)?)
    }

    /// Deselects everything, then selects the requested fields.
    fn select(&mut self, field_names: &[&str]) -> BesResult<()> {
        for slot in self.fields.iter_mut() {
            slot.active = field_names.is_empty();
        }
        for name in field_names {
            self.set_field_status(name, true)?;
        }
        Ok(())
    }

    /// Leaves exactly the branches of selected fields active.
    fn optimize_branch_status(&mut self) -> BesResult<()> {
        let needed = self
            .fields
            .iter()
            .filter(|slot| slot.active)
            .map(|slot| slot.def.branch.as_str())
            .collect::<BTreeSet<_>>();
        for branch in self.store.branch_names() {
            self.store
                .set_branch_active(&branch, needed.contains(branch.as_str()))?;
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.fields.iter_mut().for_each(|slot| slot.reader.clear());
    }

    fn run_pass(&mut self, entries: Range<u64>) -> BesResult<Columns> {
        debug!(
            "decoding entries [{}, {}) of {}",
            entries.start,
            entries.end,
            self.fields
                .iter()
                .filter(|slot| slot.active)
                .map(|slot| slot.name.as_str())
                .join(", ")
        );

        let mut active = self
            .fields
            .iter_mut()
            .filter(|slot| slot.active)
            .map(|slot| (&slot.def, &mut slot.reader))
            .collect_vec();
        decode_range(&self.store, &self.options, &mut active, entries)?;

        let columns = snapshot(
            self.fields
                .iter()
                .map(|slot| (slot.name.as_str(), slot.active.then_some(&slot.reader))),
        )?;
        let nbytes = columns.values().map(Column::nbytes).sum::<usize>();
        debug!(
            "decoded {} ({}B), totals: {}",
            format_size(nbytes, DECIMAL),
            nbytes,
            self.options.metrics().decode_summary()
        );
        Ok(columns)
    }
}

/// Feeds `entries` of every field's column to its reader, entry by entry.
fn decode_range<S: RowStore + ?Sized>(
    store: &S,
    options: &EventReaderOptions,
    fields: &mut [(&FieldDef, &mut Reader)],
    entries: Range<u64>,
) -> BesResult<()> {
    let metrics = options.metrics();
    let timer = metrics.timer(DECODE_PASS);
    let _timing = timer.time();

    let mut nbytes = 0;
    let mut cursors = fields
        .iter()
        .map(|(def, _)| {
            let bytes = store
                .fetch(&def.column, entries.clone())
                .map_err(|err| err.with_context(def.path.to_string()))?;
            nbytes += bytes.nbytes();
            bytes.into_cursor()
        })
        .collect::<BesResult<Vec<ByteCursor>>>()?;

    let count = entries.end - entries.start;
    for local in 0..count {
        if local % options.check_interval() == 0 && options.is_cancelled() {
            besio_bail!(Cancelled: local);
        }
        let index = usize::try_from(local)?;
        for ((def, reader), cursor) in fields.iter_mut().zip(cursors.iter_mut()) {
            read_entry(reader, cursor, index).map_err(|err| {
                err.with_context(format!("{} entry {}", def.path, entries.start + local))
            })?;
        }
    }

    metrics
        .counter(ENTRIES_DECODED)
        .add(i64::try_from(count)?);
    metrics
        .counter(BYTES_DECODED)
        .add(i64::try_from(nbytes)?);
    Ok(())
}

fn read_entry(reader: &mut Reader, cursor: &mut ByteCursor, index: usize) -> BesResult<()> {
    cursor.seek_entry(index)?;
    reader.read(cursor)?;
    cursor.finish_entry();
    Ok(())
}

fn snapshot<'a>(fields: impl Iterator<Item = (&'a str, Option<&'a Reader>)>) -> BesResult<Columns> {
    fields
        .map(|(name, reader)| {
            let column = match reader {
                Some(reader) => Column::Decoded(reader.data()?),
                None => Column::Absent,
            };
            Ok((name.to_string(), column))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    use besio_array::{ArrayData, PrimitiveArray};
    use besio_buffer::{ByteBuffer, buffer};
    use besio_dtype::PType;
    use besio_error::BesError;
    use besio_metrics::{BesMetrics, ENTRIES_DECODED};
    use besio_serde::Shape;
    use besio_serde::test_harness::WireWriter;
    use rstest::{fixture, rstest};

    use crate::catalog::FieldCatalog;
    use crate::options::EventReaderOptions;
    use crate::reader::{Column, EventReader};
    use crate::store::{InMemoryRowStore, RowStore};

    const ENTRIES: u64 = 5;

    const FIELDS: [&str; 10] = [
        "/Event/Header",
        "/Event/Mc/Mdc",
        "/Event/Mc/Emc",
        "/Event/Mc/Tof",
        "/Event/Digi/Mdc",
        "/Event/Digi/Emc",
        "/Event/Digi/Tof",
        "/Event/Dst/Mdc",
        "/Event/Dst/Emc",
        "/Event/Dst/Tof",
    ];

    fn column_of(path: &str) -> String {
        let mut segments = path.trim_start_matches("/Event/").split('/');
        match segments.next() {
            Some("Header") | None => "TEvtHeader".to_string(),
            Some(stage) => format!("T{}Event/m_{}", stage, segments.next().unwrap_or_default()),
        }
    }

    /// Every field is a top-level sequence of doubles holding `entry` copies of `field + entry`.
    #[fixture]
    fn store() -> InMemoryRowStore {
        let mut store = InMemoryRowStore::new(ENTRIES);
        for (field, path) in FIELDS.iter().enumerate() {
            let mut writer = WireWriter::default();
            for entry in 0..ENTRIES {
                writer.framed(9, |w| {
                    w.put(u32::try_from(entry).unwrap());
                    for _ in 0..entry {
                        w.put((field as u64 + entry) as f64);
                    }
                });
                writer.end_entry();
            }
            let (data, offsets) = writer.finish();
            store = store.with_column(column_of(path), data, offsets).unwrap();
        }
        store
    }

    fn catalog() -> FieldCatalog {
        FIELDS
            .iter()
            .fold(FieldCatalog::builder(), |builder, path| {
                builder.field(path, &column_of(path), Shape::seq(Shape::primitive(PType::F64)))
            })
            .build()
            .unwrap()
    }

    fn decoded(columns: &crate::reader::Columns) -> Vec<&str> {
        columns
            .iter()
            .filter(|(_, column)| !column.is_absent())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    #[rstest]
    fn exact_field_selection(store: InMemoryRowStore) {
        let mut reader = EventReader::try_new(store, &catalog()).unwrap();
        let columns = reader.decode(0, 5, &["/Event/Mc/Tof"]).unwrap();

        assert_eq!(columns.len(), FIELDS.len());
        assert_eq!(decoded(&columns), vec!["/Event/Mc/Tof"]);
        assert!(columns["/Event/Header"].is_absent());

        let tof = columns["/Event/Mc/Tof"].as_decoded().unwrap().as_list().unwrap();
        assert_eq!(tof.offsets().as_slice(), &[0, 0, 1, 3, 6, 10]);
        assert_eq!(
            tof.elements().as_primitive().unwrap().as_slice::<f64>()[..3],
            [4.0, 5.0, 5.0]
        );

        // only the selected field's branch is fetched
        assert!(reader.store().is_branch_active("TMcEvent"));
        assert!(!reader.store().is_branch_active("TDstEvent"));
        assert!(!reader.store().is_branch_active("TEvtHeader"));
    }

    #[rstest]
    fn wildcard_selects_three_of_ten(store: InMemoryRowStore) {
        let mut reader = EventReader::try_new(store, &catalog()).unwrap();
        let columns = reader.decode(0, 5, &["/Event/Dst/*"]).unwrap();
        assert_eq!(
            decoded(&columns),
            vec!["/Event/Dst/Emc", "/Event/Dst/Mdc", "/Event/Dst/Tof"]
        );

        let columns = reader.decode(0, 5, &["/Event/?igi/Mdc", "/Event/Header"]).unwrap();
        assert_eq!(decoded(&columns), vec!["/Event/Digi/Mdc", "/Event/Header"]);
    }

    #[rstest]
    fn empty_selection_decodes_everything(store: InMemoryRowStore) {
        let mut reader = EventReader::try_new(store, &catalog()).unwrap();
        let columns = reader.decode(0, 5, &[]).unwrap();
        assert_eq!(decoded(&columns).len(), FIELDS.len());
        assert_eq!(reader.available_fields().len(), FIELDS.len());
        assert_eq!(reader.available_fields()[0], "/Event/Header");
    }

    #[rstest]
    #[case(-1, 5)]
    #[case(0, 6)]
    #[case(3, 2)]
    #[case(0, -1)]
    #[case(5, 5)]
    #[case(5, 6)]
    fn entry_range_is_checked(store: InMemoryRowStore, #[case] start: i64, #[case] stop: i64) {
        let mut reader = EventReader::try_new(store, &catalog()).unwrap();
        let err = reader.decode(start, stop, &[]).unwrap_err();
        assert!(matches!(err, BesError::EntryRange(s, e, 5, _) if s == start && e == stop));
    }

    #[rstest]
    fn full_range_returns_every_entry(store: InMemoryRowStore) {
        let mut reader = EventReader::try_new(store, &catalog()).unwrap();
        let count = i64::try_from(reader.entry_count()).unwrap();
        let columns = reader.decode(0, count, &[]).unwrap();
        for column in columns.values() {
            assert_eq!(column.as_decoded().unwrap().len(), 5);
        }

        let tail = reader.decode(3, 5, &["/Event/Header"]).unwrap();
        let header = tail["/Event/Header"].as_decoded().unwrap().as_list().unwrap();
        assert_eq!(header.offsets().as_slice(), &[0, 3, 7]);

        let empty = reader.decode(2, 2, &["/Event/Header"]).unwrap();
        assert_eq!(empty["/Event/Header"].as_decoded().unwrap().len(), 0);
    }

    #[rstest]
    fn unknown_field(store: InMemoryRowStore) {
        let mut reader = EventReader::try_new(store, &catalog()).unwrap();
        let err = reader.decode(0, 5, &["/Event/Rec/*"]).unwrap_err();
        assert!(matches!(err, BesError::UnknownField(..)));
        assert!(err.to_string().starts_with("Cannot find (any) field of '/Event/Rec/*'"));

        let err = reader.set_branch_status("TRec*", true).unwrap_err();
        assert!(err.to_string().starts_with("Cannot find (any) branch of TRec*"));
    }

    #[rstest]
    fn field_status_activates_branch(store: InMemoryRowStore) {
        let mut reader = EventReader::try_new(store, &catalog()).unwrap();
        reader.set_branch_status("*", false).unwrap();
        reader.set_field_status("*", false).unwrap();
        assert!(!reader.is_field_active("/Event/Mc/Mdc"));

        reader.set_field_status("/Event/Mc/Mdc", true).unwrap();
        assert!(reader.is_field_active("/Event/Mc/Mdc"));
        assert!(reader.store().is_branch_active("TMcEvent"));
        assert!(!reader.store().is_branch_active("TDigiEvent"));
    }

    #[rstest]
    fn repeated_pass_is_identical(store: InMemoryRowStore) {
        let mut reader = EventReader::try_new(store, &catalog()).unwrap();
        let first = reader.decode(1, 5, &["/Event/Mc/*"]).unwrap();
        let second = reader.decode(1, 5, &["/Event/Mc/*"]).unwrap();
        assert_eq!(first, second);
        for (name, column) in first.iter() {
            assert_eq!(column.to_buffers(), second[name].to_buffers());
        }
    }

    #[rstest]
    fn cancelled_pass(store: InMemoryRowStore) {
        let cancel = Arc::new(AtomicBool::new(true));
        let options = EventReaderOptions::default()
            .with_check_interval(2)
            .unwrap()
            .with_cancellation(cancel);
        let mut reader = EventReader::try_new_with_options(store, &catalog(), options).unwrap();
        assert!(matches!(
            reader.decode(0, 5, &[]).unwrap_err(),
            BesError::Cancelled(0, _)
        ));
    }

    #[test]
    fn malformed_entry_names_field() {
        let mut writer = WireWriter::default();
        writer.put(12u32).put(0u64).end_entry();
        let (data, offsets) = writer.finish();
        let store = InMemoryRowStore::new(1)
            .with_column("TEvtHeader", data, offsets)
            .unwrap();
        let catalog = FieldCatalog::builder()
            .field("/Event/Header", "TEvtHeader", Shape::seq(Shape::primitive(PType::I32)))
            .build()
            .unwrap();

        let mut reader = EventReader::try_new(store, &catalog).unwrap();
        let err = reader.decode(0, 1, &[]).unwrap_err();
        assert!(err.to_string().starts_with("/Event/Header entry 0: malformed framing"));
        assert!(matches!(err.root_cause(), BesError::MalformedFraming(12, 0, _)));
    }

    #[test]
    fn missing_branches_are_not_offered() {
        let store = InMemoryRowStore::new(1)
            .with_column("TEvtHeader", ByteBuffer::from(vec![1u8]), buffer![0u32, 1])
            .unwrap();
        let reader = EventReader::try_new(store, &catalog()).unwrap();
        assert_eq!(reader.available_fields(), vec!["/Event/Header"]);
    }

    #[rstest]
    fn chunks_match_single_pass(store: InMemoryRowStore) {
        let metrics = BesMetrics::default();
        let options = EventReaderOptions::default().with_metrics(metrics.clone());
        let mut reader = EventReader::try_new_with_options(store, &catalog(), options).unwrap();

        let chunks = reader
            .decode_chunks(&[0..2, 2..5], &["/Event/Digi/Emc"])
            .unwrap();
        assert_eq!(chunks.len(), 2);
        let first = chunks[0]["/Event/Digi/Emc"].as_decoded().unwrap();
        let second = chunks[1]["/Event/Digi/Emc"].as_decoded().unwrap();
        assert_eq!(first.len() + second.len(), 5);
        assert!(chunks[1]["/Event/Mc/Emc"].is_absent());

        let head = reader.decode(0, 2, &["/Event/Digi/Emc"]).unwrap();
        assert_eq!(&head["/Event/Digi/Emc"], &chunks[0]["/Event/Digi/Emc"]);

        assert_eq!(metrics.counter(ENTRIES_DECODED).count(), 7);
        assert_eq!(metrics.decode_summary().passes, 3);
        assert!(reader.decode_chunks(&[0..6], &[]).is_err());
    }

    #[test]
    fn column_accessors() {
        assert!(Column::Absent.is_absent());
        assert!(Column::Absent.to_buffers().is_none());
        assert_eq!(Column::Absent.nbytes(), 0);

        let decoded = Column::Decoded(ArrayData::Primitive(PrimitiveArray::new(buffer![
            1.0f64, 2.0
        ])));
        assert_eq!(decoded.nbytes(), 16);
        assert_eq!(decoded.to_buffers().unwrap().length(), 2);
    }
}
