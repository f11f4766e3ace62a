#![deny(missing_docs)]

//! Reads BES III event data into columnar ragged arrays.
//!
//! An [`EventReader`] pairs a [`RowStore`], the source of entry-delimited branch bytes, with a
//! [`FieldCatalog`] naming the decodable fields and their on-disk layout. Each call to
//! [`EventReader::decode`] selects fields by glob pattern, activates only the branches those
//! fields live in, and decodes a range of entries into one [`Column`] per field. The built-in
//! catalog of the BES III event model is [`bes3::catalog`].

pub use catalog::*;
pub use options::*;
pub use reader::*;
pub use selection::*;
pub use store::*;

pub mod bes3;
mod catalog;
mod options;
mod reader;
mod selection;
mod store;

#[cfg(test)]
mod test {
    use besio_serde::test_harness::WireWriter;
    use tracing_subscriber::EnvFilter;

    use crate::{EventReader, InMemoryRowStore, bes3};

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn header_column(runs: &[i32]) -> WireWriter {
        let mut writer = WireWriter::default();
        for (event, run) in runs.iter().enumerate() {
            writer.framed(1, |w| {
                w.put_tobject();
                w.put(*run).put(i32::try_from(event).unwrap());
                for _ in 0..6 {
                    w.put(0i32);
                }
            });
            writer.end_entry();
        }
        writer
    }

    fn digi_column(hits: &[&[u32]]) -> WireWriter {
        let mut writer = WireWriter::default();
        for ids in hits {
            writer.obj_array(ids.len(), |w| {
                for (i, id) in ids.iter().enumerate() {
                    w.header((i == 0).then_some("TMdcDigi"), 1, |w| {
                        w.put_tobject();
                        w.put(*id).put(100u32).put(200u32).put(-1i32).put(0u32);
                    });
                }
            });
            writer.end_entry();
        }
        writer
    }

    #[test]
    fn bes3_end_to_end() {
        init_logging();

        let (header, header_offsets) = header_column(&[8093, 8093, 8094]).finish();
        let (digis, digi_offsets) = digi_column(&[&[1, 2], &[], &[3]]).finish();
        let store = InMemoryRowStore::new(3)
            .with_column("TEvtHeader", header, header_offsets)
            .unwrap()
            .with_column("TDigiEvent/m_mdcDigiCol", digis, digi_offsets)
            .unwrap();

        let mut reader = EventReader::try_new(store, &bes3::catalog().unwrap()).unwrap();
        assert_eq!(reader.entry_count(), 3);
        assert_eq!(
            reader.available_fields(),
            vec!["/Event/Header", "/Event/Digi/Mdc"]
        );

        let columns = reader.decode(0, 3, &[]).unwrap();
        let header = columns["/Event/Header"].as_decoded().unwrap().as_struct().unwrap();
        assert_eq!(
            header.field_by_name("runNo").unwrap().as_primitive().unwrap().as_slice::<i32>(),
            &[8093, 8093, 8094]
        );

        let buffers = columns["/Event/Digi/Mdc"].to_buffers().unwrap();
        assert_eq!(buffers.length(), 3);
        let offsets = buffers.buffer("node0-offsets").unwrap();
        assert_eq!(offsets.len(), 4 * size_of::<u32>());
    }
}
