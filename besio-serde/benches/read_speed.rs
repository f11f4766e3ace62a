use besio_dtype::PType;
use besio_error::BesUnwrap;
use besio_serde::test_harness::WireWriter;
use besio_serde::{ByteCursor, Member, Reader, Shape};
use divan::Bencher;

fn main() {
    divan::main();
}

/// A Monte Carlo hit collection: an object array of tracker hits with a creator process name.
fn mc_hit() -> Shape {
    Shape::obj_array(Shape::header(
        Some("TMdcMc"),
        [
            Member::new("TObject", Shape::TObject),
            Member::new("m_id", Shape::primitive(PType::U32)),
            Member::new("m_trackIndex", Shape::primitive(PType::U32)),
            Member::new("m_position", Shape::fixed(3, Shape::primitive(PType::F64))),
            Member::new("m_depositEnergy", Shape::primitive(PType::F64)),
            Member::new("m_creatorProcess", Shape::stl_string()),
        ],
    ))
}

fn make_branch(entries: usize, hits_per_entry: usize) -> ByteCursor {
    let mut writer = WireWriter::default();
    for entry in 0..entries {
        writer.obj_array(hits_per_entry, |w| {
            for hit in 0..hits_per_entry {
                let class = (hit == 0).then_some("TMdcMc");
                w.header(class, 1, |w| {
                    let id = u32::try_from(entry * hits_per_entry + hit).besio_unwrap();
                    w.put_tobject().put(id).put(id % 7);
                    w.put(1.0f64).put(2.0f64).put(3.0f64).put(0.5f64);
                    w.framed(6, |w| {
                        w.put_tstring(b"Transportation");
                    });
                });
            }
        });
        writer.end_entry();
    }
    writer.into_cursor().besio_unwrap()
}

fn params() -> impl Iterator<Item = &'static (usize, usize)> {
    [(1_000usize, 10usize), (10_000, 10), (1_000, 200)].iter()
}

#[divan::bench(args = params())]
fn read_mc_hits(bencher: Bencher, (entries, hits): (usize, usize)) {
    let cursor = make_branch(entries, hits);
    let mut reader = Reader::compile(&mc_hit()).besio_unwrap();

    bencher.bench_local(|| {
        let mut cursor = cursor.clone();
        reader.clear();
        for entry in 0..entries {
            cursor.seek_entry(entry).besio_unwrap();
            reader.read(&mut cursor).besio_unwrap();
        }
        reader.data().besio_unwrap()
    })
}

#[divan::bench(args = params())]
fn read_ragged_doubles(bencher: Bencher, (entries, len): (usize, usize)) {
    let mut writer = WireWriter::default();
    for _ in 0..entries {
        writer.framed(9, |w| {
            w.put(u32::try_from(len).besio_unwrap());
            for i in 0..len {
                w.put(i as f64);
            }
        });
        writer.end_entry();
    }
    let cursor = writer.into_cursor().besio_unwrap();
    let mut reader = Reader::compile(&Shape::seq(Shape::primitive(PType::F64))).besio_unwrap();

    bencher.bench_local(|| {
        let mut cursor = cursor.clone();
        reader.clear();
        for entry in 0..entries {
            cursor.seek_entry(entry).besio_unwrap();
            reader.read(&mut cursor).besio_unwrap();
        }
        reader.data().besio_unwrap()
    })
}
