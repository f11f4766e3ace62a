use besio_dtype::PType;
use besio_serde::Shape;

use crate::bes3::{Layout, doubles, ints};
use crate::catalog::FieldCatalogBuilder;

const MOMENTUM: [&str; 4] = ["px", "py", "pz", "e"];

pub(super) fn register(builder: FieldCatalogBuilder) -> FieldCatalogBuilder {
    builder
        .field("/Event/EvtRec/Evt", "TEvtRecObject/m_evtRecEvent", event())
        .field("/Event/EvtRec/Trk", "TEvtRecObject/m_evtRecTrackCol", track())
        .field(
            "/Event/EvtRec/PrimaryVertex",
            "TEvtRecObject/m_evtRecPrimaryVertex",
            primary_vertex(),
        )
        .field(
            "/Event/EvtRec/VeeVertex",
            "TEvtRecObject/m_evtRecVeeVertexCol",
            vee_vertex(),
        )
        .field(
            "/Event/EvtRec/Pi0",
            "TEvtRecObject/m_evtRecPi0Col",
            photon_pair("TEvtRecPi0"),
        )
        .field(
            "/Event/EvtRec/EtaToGG",
            "TEvtRecObject/m_evtRecEtaToGGCol",
            photon_pair("TEvtRecEtaToGG"),
        )
        .field("/Event/EvtRec/DTag", "TEvtRecObject/m_evtRecDTagCol", dtag())
}

fn event() -> Shape {
    Layout::tobject()
        .scalars(
            PType::I32,
            &["nTotal", "nCharge", "nNeutral", "nVEE", "npi0", "nEta2gg", "nDTag"],
        )
        .into_object()
}

fn track() -> Shape {
    Layout::tobject()
        .scalars(PType::I32, &["trackId", "partId", "quality", "mdcTrackId", "mdcKalTrackId"])
        .scalars(PType::I32, &["mdcDedxId", "extTrackId", "emcShowerId", "mucTrackId"])
        .member("tofTrackIds", ints())
        .into_collection("TEvtRecTrack")
}

fn primary_vertex() -> Shape {
    Layout::tobject()
        .member("isValid", Shape::Bool)
        .scalars(PType::I32, &["nTracks"])
        .member("trackIdList", ints())
        .scalars(PType::F64, &["chi2"])
        .scalars(PType::I32, &["ndof", "fitMethod"])
        .scalars(PType::F64, &["x", "y", "z"])
        .member("errVtx", doubles(6))
        .into_object()
}

fn vee_vertex() -> Shape {
    Layout::tobject()
        .member("vtxId", Shape::Bool)
        .scalars(PType::I32, &["vtxType"])
        .scalars(PType::F64, &["chi2"])
        .scalars(PType::I32, &["ndof"])
        .scalars(PType::F64, &["mass", "px", "py", "pz", "E", "x", "y", "z"])
        // lower triangle of the 7x7 covariance of (p, E, x)
        .member("err", doubles(28))
        .member("pair", Shape::fixed(2, Shape::primitive(PType::I32)))
        .scalars(PType::I32, &["nCharge", "nTracks"])
        .member("daughters", Shape::fixed(2, Shape::primitive(PType::I32)))
        .into_collection("TEvtRecVeeVertex")
}

/// A two photon candidate, fitted to the pi0 or eta mass.
fn photon_pair(class: &str) -> Shape {
    Layout::tobject()
        .scalars(PType::F64, &["unconMass", "chi2"])
        .scalars(PType::F64, &["hiPx", "hiPy", "hiPz", "hiE"])
        .scalars(PType::F64, &["loPx", "loPy", "loPz", "loE"])
        .scalars(PType::I32, &["hiEnGamma", "loEnGamma"])
        .into_collection(class)
}

fn dtag() -> Shape {
    Layout::tobject()
        .scalars(PType::I32, &["decayMode", "type"])
        .scalars(PType::F64, &["beamE", "mass", "mBC", "deltaE"])
        .scalars(PType::I32, &["charge", "charm"])
        .scalars(PType::U32, &["nChild"])
        .scalars(PType::F64, &MOMENTUM)
        .member("tracks", ints())
        .member("showers", ints())
        .member("otherTracks", ints())
        .member("otherShowers", ints())
        .member("pionId", ints())
        .member("kaonId", ints())
        .into_collection("TEvtRecDTag")
}

#[cfg(test)]
mod test {
    use besio_serde::Reader;
    use besio_serde::test_harness::WireWriter;

    use crate::bes3::evtrec::{dtag, event, photon_pair, primary_vertex, track, vee_vertex};

    #[test]
    fn tracks_with_tof_ids() {
        let mut writer = WireWriter::default();
        writer.obj_array(2, |w| {
            for (id, tof_ids) in [(0i32, &[3i32, 4][..]), (1, &[])] {
                w.header(Some("TEvtRecTrack"), 1, |w| {
                    w.put_tobject();
                    w.put(id);
                    for _ in 0..8 {
                        w.put(-1i32);
                    }
                    w.framed(6, |w| {
                        w.put(u32::try_from(tof_ids.len()).unwrap());
                        for tof in tof_ids {
                            w.put(*tof);
                        }
                    });
                });
            }
        });
        writer.end_entry();
        let mut cursor = writer.into_cursor().unwrap();

        let mut reader = Reader::compile(&track()).unwrap();
        cursor.seek_entry(0).unwrap();
        reader.read(&mut cursor).unwrap();
        assert_eq!(cursor.finish_entry(), 0);

        let data = reader.data().unwrap();
        let tracks = data.as_list().unwrap().elements().as_struct().unwrap();
        assert_eq!(
            tracks.field_by_name("trackId").unwrap().as_primitive().unwrap().as_slice::<i32>(),
            &[0, 1]
        );
        let tof_ids = tracks.field_by_name("tofTrackIds").unwrap().as_list().unwrap();
        assert_eq!(tof_ids.offsets().as_slice(), &[0, 2, 2]);
        assert_eq!(
            tof_ids.elements().as_primitive().unwrap().as_slice::<i32>(),
            &[3, 4]
        );
    }

    #[test]
    fn event_counts() {
        let mut writer = WireWriter::default();
        writer.framed(1, |w| {
            w.put_tobject();
            for count in [5i32, 3, 2, 0, 1, 0, 0] {
                w.put(count);
            }
        });
        writer.end_entry();
        let mut cursor = writer.into_cursor().unwrap();

        let mut reader = Reader::compile(&event()).unwrap();
        cursor.seek_entry(0).unwrap();
        reader.read(&mut cursor).unwrap();
        assert_eq!(cursor.finish_entry(), 0);

        let data = reader.data().unwrap();
        let counts = data.as_struct().unwrap();
        assert_eq!(
            counts.field_by_name("nCharge").unwrap().as_primitive().unwrap().as_slice::<i32>(),
            &[3]
        );
        assert_eq!(counts.names().len(), 7);
    }

    #[test]
    fn candidate_layouts_compile() {
        for shape in [
            primary_vertex(),
            vee_vertex(),
            photon_pair("TEvtRecPi0"),
            photon_pair("TEvtRecEtaToGG"),
            dtag(),
        ] {
            Reader::compile(&shape).unwrap();
        }
        let reader = Reader::compile(&photon_pair("TEvtRecPi0")).unwrap();
        assert!(reader.dtype().to_string().starts_with("list({unconMass=f64"));
    }
}
