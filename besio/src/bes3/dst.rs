use besio_dtype::PType;
use besio_serde::Shape;

use crate::bes3::{Layout, doubles};
use crate::catalog::FieldCatalogBuilder;

pub(super) fn register(builder: FieldCatalogBuilder) -> FieldCatalogBuilder {
    builder
        .field("/Event/Dst/Mdc", "TDstEvent/m_mdcTrackCol", mdc())
        .field("/Event/Dst/Emc", "TDstEvent/m_emcTrackCol", emc())
        .field("/Event/Dst/Tof", "TDstEvent/m_tofTrackCol", tof())
        .field("/Event/Dst/Muc", "TDstEvent/m_mucTrackCol", muc())
        .field("/Event/Dst/Dedx", "TDstEvent/m_mdcDedxCol", dedx())
        .field("/Event/Dst/Ext", "TDstEvent/m_extTrackCol", ext())
}

fn mdc() -> Shape {
    Layout::tobject()
        .scalars(PType::I32, &["trackIndex"])
        // helix parameters and the lower triangle of their error matrix
        .member("helix", doubles(5))
        .member("helixErr", doubles(15))
        .scalars(PType::I32, &["stat"])
        .scalars(PType::F64, &["chi2"])
        .scalars(
            PType::I32,
            &["ndof", "nster", "nlayers", "firstLayer", "lastLayer"],
        )
        .into_collection("TMdcTrack")
}

fn emc() -> Shape {
    Layout::tobject()
        .scalars(PType::I32, &["trackIndex", "nHits", "status", "module"])
        .scalars(
            PType::F64,
            &[
                "x", "y", "z", "dTheta", "dPhi", "energy", "dE", "eSeed", "e3x3", "e5x5", "time",
                "secondMoment", "latMoment", "a20Moment", "a42Moment",
            ],
        )
        .member("err", doubles(6))
        .into_collection("TEmcTrack")
}

fn tof() -> Shape {
    Layout::tobject()
        .scalars(PType::I32, &["trackIndex", "inTrackId", "tofId"])
        .scalars(PType::U32, &["status"])
        .scalars(PType::F64, &["path", "zrhit", "ph", "tof", "beta"])
        // one expectation per particle hypothesis
        .member("texp", doubles(5))
        .member("toffset", doubles(6))
        .member("sigma", doubles(6))
        .scalars(PType::I32, &["quality"])
        .scalars(
            PType::F64,
            &["t0", "t0Err", "zErr", "phi", "errphi", "energy", "energyErr"],
        )
        .into_collection("TTofTrack")
}

fn muc() -> Shape {
    Layout::tobject()
        .scalars(
            PType::I32,
            &[
                "trackIndex",
                "id",
                "status",
                "type",
                "startPart",
                "endPart",
                "brLastLayer",
                "ecLastLayer",
                "nHits",
                "nLayers",
                "maxHitsInLayer",
            ],
        )
        .scalars(PType::F64, &["depth", "chi2"])
        .scalars(PType::I32, &["dof"])
        .scalars(
            PType::F64,
            &[
                "rms", "x", "y", "z", "xSigma", "ySigma", "zSigma", "px", "py", "pz", "distance",
                "deltaPhi", "kalrechi2",
            ],
        )
        .scalars(PType::I32, &["kaldof", "kalbrLastLayer", "kalecLastLayer"])
        .into_collection("TMucTrack")
}

fn dedx() -> Shape {
    Layout::tobject()
        .scalars(
            PType::I32,
            &["trackIndex", "particleId", "status", "trunc_alg"],
        )
        .scalars(PType::F64, &["chiE", "chiMu", "chiPi", "chiK", "chiP"])
        .scalars(PType::I32, &["nGoodHits", "nTotalHits"])
        .scalars(PType::F64, &["probPH", "normPH", "errorPH", "twentyPH"])
        .into_collection("TMdcDedx")
}

/// The extrapolated position and momentum of a track at one detector.
fn extrapolation(layout: Layout, detector: &str) -> Layout {
    let layout = ["X", "Y", "Z", "Px", "Py", "Pz"]
        .into_iter()
        .fold(layout, |layout, axis| {
            layout.member(&format!("{detector}{axis}"), Shape::primitive(PType::F64))
        });
    layout
        .member(&format!("{detector}VolumeName"), Shape::TString)
        .member(
            &format!("{detector}VolumeNumber"),
            Shape::primitive(PType::I32),
        )
}

fn ext() -> Shape {
    let mut layout = Layout::tobject().scalars(PType::I32, &["trackIndex"]);
    for tof in ["Tof1", "Tof2"] {
        layout = extrapolation(layout, tof);
        for name in [
            "",
            "Path",
            "PosSigmaAlongZ",
            "PosSigmaAlongT",
            "PosSigmaAlongX",
            "PosSigmaAlongY",
        ] {
            layout = layout.member(&format!("{tof}{name}"), Shape::primitive(PType::F64));
        }
        // lower triangle of the 6x6 error matrix
        layout = layout.member(&format!("{tof}ErrorMatrix"), doubles(21));
    }
    let layout = extrapolation(layout, "Emc")
        .scalars(PType::F64, &["EmcPosSigmaAlongTheta", "EmcPosSigmaAlongPhi"])
        .member("EmcErrorMatrix", doubles(21))
        .scalars(PType::F64, &["EmcPath"]);
    extrapolation(layout, "Muc")
        .scalars(
            PType::F64,
            &[
                "MucPosSigmaAlongZ",
                "MucPosSigmaAlongT",
                "MucPosSigmaAlongX",
                "MucPosSigmaAlongY",
            ],
        )
        .member("MucErrorMatrix", doubles(21))
        .into_collection("TExtTrack")
}

#[cfg(test)]
mod test {
    use besio_serde::Reader;
    use besio_serde::test_harness::WireWriter;

    use crate::bes3::dst::{dedx, emc, ext, mdc, muc, tof};

    #[test]
    fn mdc_helix() {
        let mut writer = WireWriter::default();
        writer.obj_array(1, |w| {
            w.header(Some("TMdcTrack"), 2, |w| {
                w.put_tobject();
                w.put(0i32);
                for i in 0..20 {
                    w.put(f64::from(i));
                }
                w.put(1i32).put(12.5f64);
                for _ in 0..5 {
                    w.put(30i32);
                }
            });
        });
        writer.end_entry();
        let mut cursor = writer.into_cursor().unwrap();

        let mut reader = Reader::compile(&mdc()).unwrap();
        cursor.seek_entry(0).unwrap();
        reader.read(&mut cursor).unwrap();
        assert_eq!(cursor.finish_entry(), 0);

        let data = reader.data().unwrap();
        let tracks = data.as_list().unwrap().elements().as_struct().unwrap();
        let helix = tracks.field_by_name("helix").unwrap().as_fixed_size_list().unwrap();
        assert_eq!(helix.size(), 5);
        assert_eq!(
            helix.elements().as_primitive().unwrap().as_slice::<f64>(),
            &[0.0, 1.0, 2.0, 3.0, 4.0]
        );
        assert_eq!(
            tracks.field_by_name("chi2").unwrap().as_primitive().unwrap().as_slice::<f64>(),
            &[12.5]
        );
    }

    #[test]
    fn ext_volume_names() {
        let mut writer = WireWriter::default();
        writer.obj_array(1, |w| {
            w.header(Some("TExtTrack"), 1, |w| {
                w.put_tobject();
                w.put(3i32);
                // position, volume, then the detector specific doubles and the error matrix
                fn detector(w: &mut WireWriter, volume: &[u8], doubles: usize) {
                    for _ in 0..6 {
                        w.put(1.0f64);
                    }
                    w.put_tstring(volume).put(7i32);
                    for _ in 0..doubles {
                        w.put(0.5f64);
                    }
                }
                detector(w, b"Tof1Scint", 6 + 21);
                detector(w, b"Tof2Scint", 6 + 21);
                detector(w, b"EmcCrystal", 2 + 21 + 1);
                detector(w, b"MucGap", 4 + 21);
            });
        });
        writer.end_entry();
        let mut cursor = writer.into_cursor().unwrap();

        let mut reader = Reader::compile(&ext()).unwrap();
        cursor.seek_entry(0).unwrap();
        reader.read(&mut cursor).unwrap();
        assert_eq!(cursor.finish_entry(), 0);

        let data = reader.data().unwrap();
        let tracks = data.as_list().unwrap().elements().as_struct().unwrap();
        for (name, volume) in [
            ("Tof1VolumeName", "Tof1Scint"),
            ("EmcVolumeName", "EmcCrystal"),
            ("MucVolumeName", "MucGap"),
        ] {
            let names = tracks.field_by_name(name).unwrap().as_varbin().unwrap();
            assert_eq!(names.str_at(0).unwrap(), volume);
        }
        assert_eq!(
            tracks
                .field_by_name("EmcPath")
                .unwrap()
                .as_primitive()
                .unwrap()
                .as_slice::<f64>(),
            &[0.5]
        );
    }

    #[test]
    fn track_layouts_compile() {
        for shape in [emc(), tof(), muc(), dedx(), ext()] {
            let reader = Reader::compile(&shape).unwrap();
            assert!(reader.dtype().to_string().starts_with("list({trackIndex=i32"));
        }
    }
}
