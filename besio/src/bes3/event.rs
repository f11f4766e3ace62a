use besio_dtype::PType;
use besio_serde::Shape;

use crate::bes3::Layout;
use crate::catalog::FieldCatalogBuilder;

pub(super) fn register(builder: FieldCatalogBuilder) -> FieldCatalogBuilder {
    builder
        .field("/Event/Header", "TEvtHeader", header())
        .field("/Event/Trig", "TTrigEvent/m_trigData", trigger())
}

fn header() -> Shape {
    Layout::tobject()
        .scalars(
            PType::I32,
            &["runNo", "evtNo", "time", "tag", "flag1", "flag2", "etsT1", "etsT2"],
        )
        .into_object()
}

fn trigger() -> Shape {
    let layout = Layout::tobject()
        .member("preScale", Shape::Bool)
        .member("trigConditions", Shape::fixed(48, Shape::primitive(PType::I32)))
        .member("trigChannel", Shape::fixed(16, Shape::primitive(PType::I32)))
        .scalars(PType::I32, &["timeWindow", "timingType"]);
    Shape::header(Some("TTrigData"), layout.0)
}

#[cfg(test)]
mod test {
    use besio_serde::Reader;
    use besio_serde::test_harness::WireWriter;

    use crate::bes3::event::{header, trigger};

    #[test]
    fn header_record() {
        let mut writer = WireWriter::default();
        for run in [8093, 8094] {
            writer.framed(1, |w| {
                w.put_tobject();
                w.put(run).put(run * 10);
                for _ in 0..6 {
                    w.put(0i32);
                }
            });
            writer.end_entry();
        }
        let mut cursor = writer.into_cursor().unwrap();

        let mut reader = Reader::compile(&header()).unwrap();
        for entry in 0..2 {
            cursor.seek_entry(entry).unwrap();
            reader.read(&mut cursor).unwrap();
            assert_eq!(cursor.finish_entry(), 0);
        }
        let data = reader.data().unwrap();
        let header = data.as_struct().unwrap();
        assert_eq!(
            header.field_by_name("evtNo").unwrap().as_primitive().unwrap().as_slice::<i32>(),
            &[80930, 80940]
        );
        assert_eq!(header.names().len(), 8);
    }

    #[test]
    fn trigger_layout() {
        let reader = Reader::compile(&trigger()).unwrap();
        assert_eq!(
            reader.dtype().to_string(),
            "{preScale=bool, trigConditions=fixed_size_list(i32)[48], \
             trigChannel=fixed_size_list(i32)[16], timeWindow=i32, timingType=i32}"
        );
    }
}
