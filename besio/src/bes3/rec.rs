use besio_dtype::PType;
use besio_serde::Shape;

use crate::bes3::{Layout, doubles, ints};
use crate::catalog::FieldCatalogBuilder;

/// Name suffixes of the particle hypotheses of the Kalman fit, pion first.
const HYPOTHESIS_SUFFIXES: [&str; 5] = ["", "_e", "_mu", "_k", "_p"];

pub(super) fn register(builder: FieldCatalogBuilder) -> FieldCatalogBuilder {
    builder
        .field("/Event/Rec/MdcTrack", "TRecEvent/m_recMdcTrackCol", mdc_track())
        .field("/Event/Rec/MdcHit", "TRecEvent/m_recMdcHitCol", mdc_hit())
        .field("/Event/Rec/TofTrack", "TRecEvent/m_recTofTrackCol", tof_track())
        .field("/Event/Rec/EmcHit", "TRecEvent/m_recEmcHitCol", emc_hit())
        .field("/Event/Rec/EmcCluster", "TRecEvent/m_recEmcClusterCol", emc_cluster())
        .field("/Event/Rec/EmcShower", "TRecEvent/m_recEmcShowerCol", emc_shower())
        .field("/Event/Rec/MucTrack", "TRecEvent/m_recMucTrackCol", muc_track())
        .field("/Event/Rec/MdcDedx", "TRecEvent/m_recMdcDedxCol", mdc_dedx())
        .field("/Event/Rec/MdcDedxHit", "TRecEvent/m_recMdcDedxHitCol", mdc_dedx_hit())
        .field("/Event/Rec/ExtTrack", "TRecEvent/m_recExtTrackCol", ext_track())
        .field("/Event/Rec/MdcKalTrack", "TRecEvent/m_recMdcKalTrackCol", kal_track())
        .field(
            "/Event/Rec/MdcKalHelixSeg",
            "TRecEvent/m_recMdcKalHelixSegCol",
            kal_helix_seg(),
        )
        .field("/Event/Rec/EvTime", "TRecEvent/m_recEvTimeCol", ev_time())
        .field("/Event/Rec/Zdd", "TRecEvent/m_recZddChannelCol", zdd())
}

/// One value per particle hypothesis.
fn per_hypothesis(element: Shape) -> Shape {
    Shape::fixed(5, element)
}

fn mdc_track() -> Shape {
    Layout::tobject()
        .scalars(PType::I32, &["trackId"])
        .member("helix", doubles(5))
        .scalars(PType::I32, &["stat"])
        .scalars(PType::F64, &["chi2"])
        .scalars(PType::I32, &["ndof"])
        .member("err", doubles(15))
        .scalars(PType::I32, &["nhits", "nster", "nlayer"])
        .scalars(PType::F64, &["vx0", "vy0", "vz0", "fiTerm"])
        .into_collection("TRecMdcTrack")
}

fn mdc_hit() -> Shape {
    Layout::tobject()
        .member("isGrouped", Shape::Bool)
        .scalars(PType::I32, &["id", "trkId"])
        .scalars(
            PType::F64,
            &[
                "driftDistLeft",
                "driftDistRight",
                "errDriftDistLeft",
                "errDriftDistRight",
                "chi2Contrib",
            ],
        )
        .scalars(PType::I32, &["leftOrRight", "stat"])
        .scalars(PType::U32, &["mdcId"])
        .scalars(
            PType::F64,
            &["tdc", "adc", "driftTime", "doca", "entranceAngle", "zHit", "flightLength"],
        )
        .into_collection("TRecMdcHit")
}

fn tof_track() -> Shape {
    Layout::tobject()
        .scalars(PType::I32, &["trackId", "inTrackId", "tofId"])
        .scalars(PType::U32, &["status"])
        .scalars(PType::F64, &["path", "zrhit", "ph", "tof", "beta"])
        .member("texp", doubles(5))
        .member("toffset", doubles(6))
        .member("sigma", doubles(6))
        .scalars(PType::I32, &["quality"])
        .scalars(
            PType::F64,
            &["t0", "errt0", "errz", "phi", "errphi", "energy", "errenergy"],
        )
        .into_collection("TRecTofTrack")
}

fn emc_hit() -> Shape {
    Layout::tobject()
        .scalars(PType::I32, &["cellId"])
        .scalars(PType::F64, &["energy", "time"])
        .into_collection("TRecEmcHit")
}

fn emc_cluster() -> Shape {
    Layout::tobject()
        .scalars(PType::I32, &["clusterId"])
        .member("hits", ints())
        .member("seeds", ints())
        .member("showers", ints())
        .into_collection("TRecEmcCluster")
}

fn emc_shower() -> Shape {
    Layout::tobject()
        .scalars(PType::I32, &["trackId", "nhits", "status", "cellId", "module"])
        .scalars(
            PType::F64,
            &[
                "x", "y", "z", "dTheta", "dPhi", "energy", "dE", "eSeed", "e3x3", "e5x5", "eall",
                "eLepton", "time", "secondMoment", "latMoment", "a20Moment", "a42Moment",
            ],
        )
        .member("err", doubles(6))
        // cell id to deposited energy
        .member(
            "cellIdMap",
            Shape::map(Shape::primitive(PType::I32), Shape::primitive(PType::F64)),
        )
        .member("cellId3x3", ints())
        .member("cellId5x5", ints())
        .scalars(PType::I32, &["clusterId"])
        .into_collection("TRecEmcShower")
}

fn muc_track() -> Shape {
    Layout::tobject()
        .scalars(
            PType::I32,
            &[
                "trackId",
                "id",
                "status",
                "type",
                "startPart",
                "endPart",
                "brLastLayer",
                "ecLastLayer",
                "numHits",
                "numLayers",
                "maxHitsInLayer",
            ],
        )
        .scalars(PType::F64, &["depth", "chi2"])
        .scalars(PType::I32, &["dof"])
        .scalars(
            PType::F64,
            &[
                "rms", "xPos", "yPos", "zPos", "xPosSigma", "yPosSigma", "zPosSigma", "px", "py",
                "pz", "distance", "deltaPhi",
            ],
        )
        .member("hits", ints())
        .member("expHits", ints())
        .member("distHits", ints())
        .scalars(PType::F64, &["kalrechi2"])
        .scalars(PType::I32, &["kaldof"])
        .scalars(PType::F64, &["kaldepth"])
        .scalars(PType::I32, &["kalbrLastLayer", "kalecLastLayer"])
        .into_collection("TRecMucTrack")
}

fn mdc_dedx() -> Shape {
    Layout::tobject()
        .scalars(
            PType::F64,
            &["dedx_hit", "dedx_esat", "dedx_norun", "dedx_momentum"],
        )
        .scalars(
            PType::I32,
            &[
                "trackId",
                "mdcTrackId",
                "mdcKalTrackId",
                "particleId",
                "status",
                "trunc_alg",
            ],
        )
        .scalars(PType::F64, &["chiE", "chiMu", "chiPi", "chiK", "chiP"])
        .scalars(PType::I32, &["numGoodHits", "numTotalHits"])
        .scalars(PType::F64, &["probPH", "normPH", "errorPH", "twentyPH"])
        .member("chi", doubles(5))
        .member("dedx_exp", doubles(5))
        .member("sigma_dedx", doubles(5))
        .member("pid_prob", doubles(5))
        .into_collection("TRecMdcDedx")
}

fn mdc_dedx_hit() -> Shape {
    Layout::tobject()
        .member("isGrouped", Shape::Bool)
        .scalars(
            PType::I32,
            &["trkId", "mdcHitId", "mdcKalHelixSegId", "leftOrRight"],
        )
        .scalars(PType::U32, &["mdcId"])
        .scalars(PType::F64, &["path", "dedx"])
        .into_collection("TRecMdcDedxHit")
}

/// The extrapolated position and momentum at one detector, per hypothesis.
fn extrapolation(layout: Layout, detector: &str) -> Layout {
    let per_axis = ["X", "Y", "Z", "Px", "Py", "Pz"]
        .into_iter()
        .fold(layout, |layout, axis| {
            layout.member(
                &format!("{detector}{axis}"),
                per_hypothesis(Shape::primitive(PType::F64)),
            )
        });
    per_axis
        .member(
            &format!("{detector}VolumeName"),
            per_hypothesis(Shape::TString),
        )
        .member(
            &format!("{detector}VolumeNumber"),
            per_hypothesis(Shape::primitive(PType::I32)),
        )
}

fn error_matrix(layout: Layout, name: &str) -> Layout {
    layout.member(
        name,
        per_hypothesis(Shape::fixed(6, Shape::fixed(6, Shape::primitive(PType::F64)))),
    )
}

fn hypothesis_doubles(layout: Layout, names: &[String]) -> Layout {
    names.iter().fold(layout, |layout, name| {
        layout.member(name, per_hypothesis(Shape::primitive(PType::F64)))
    })
}

fn ext_track() -> Shape {
    let mut layout = Layout::tobject().scalars(PType::I32, &["trackId"]);
    for tof in ["tof1", "tof2"] {
        layout = extrapolation(layout, tof);
        layout = hypothesis_doubles(
            layout,
            &[
                tof.to_string(),
                format!("{tof}Path"),
                format!("{tof}PosSigmaAlongZ"),
                format!("{tof}PosSigmaAlongT"),
                format!("{tof}PosSigmaAlongX"),
                format!("{tof}PosSigmaAlongY"),
            ],
        );
        layout = error_matrix(layout, &format!("{tof}ErrorMatrix"));
    }

    layout = extrapolation(layout, "emc");
    layout = hypothesis_doubles(
        layout,
        &["emcPosSigmaAlongTheta".to_string(), "emcPosSigmaAlongPhi".to_string()],
    );
    layout = error_matrix(layout, "emcErrorMatrix");
    layout = hypothesis_doubles(layout, &["emcPath".to_string()]);

    layout = extrapolation(layout, "muc");
    layout = hypothesis_doubles(
        layout,
        &[
            "mucPosSigmaAlongZ".to_string(),
            "mucPosSigmaAlongT".to_string(),
            "mucPosSigmaAlongX".to_string(),
            "mucPosSigmaAlongY".to_string(),
        ],
    );
    layout = error_matrix(layout, "mucErrorMatrix");

    // every muon hit vector is written member-wise, one vector per hypothesis
    let hit_vector = |element: Shape| Shape::framed_fixed(5, Shape::nested_seq(element));
    layout = layout.member("mucHitVecSize", per_hypothesis(Shape::primitive(PType::I32)));
    for axis in ["X", "Y", "Z", "Px", "Py", "Pz"] {
        layout = layout.member(
            &format!("mucHit{axis}"),
            hit_vector(Shape::primitive(PType::F64)),
        );
    }
    layout = layout
        .member(
            "mucHitVolumeName",
            hit_vector(Shape::StlString { framed: false }),
        )
        .member("mucHitVolumeNumber", hit_vector(Shape::primitive(PType::I32)));
    for axis in ["Z", "T", "X", "Y"] {
        layout = layout.member(
            &format!("mucHitPosSigmaAlong{axis}"),
            hit_vector(Shape::primitive(PType::F64)),
        );
    }
    layout
        .member(
            "mucHitErrorMatrix",
            hit_vector(Shape::nested_seq(Shape::primitive(PType::F64))),
        )
        .into_collection("TRecExtTrack")
}

fn kal_track() -> Shape {
    let hypothesis_ints = || per_hypothesis(Shape::primitive(PType::I32));
    let layout = Layout::tobject()
        .scalars(PType::I32, &["trackId"])
        .member("mass", doubles(5))
        .member("path", doubles(5))
        .member("tof", doubles(5))
        .member("fiTerm", doubles(5))
        .member("pathSM", doubles(5))
        .member("nhits", hypothesis_ints())
        .member("nlayer", hypothesis_ints())
        // inner and outer fit per hypothesis
        .member("stat", per_hypothesis(Shape::fixed(2, Shape::primitive(PType::I32))))
        .member("chi2", per_hypothesis(doubles(2)))
        .member("ndof", per_hypothesis(Shape::fixed(2, Shape::primitive(PType::I32))))
        .member("nSegs", hypothesis_ints());

    // points of closest approach, last hit points and pivots, three coordinates each
    let layout = ["poca", "lpoint", "lpivot"].into_iter().fold(layout, |layout, point| {
        HYPOTHESIS_SUFFIXES.iter().fold(layout, |layout, suffix| {
            layout.member(&format!("{point}{suffix}"), doubles(3))
        })
    });

    // helix and 5x5 error matrix at the ip, the first hit and the last hit
    let layout = ["z", "f", "l"].into_iter().fold(layout, |layout, at| {
        HYPOTHESIS_SUFFIXES.iter().fold(layout, |layout, suffix| {
            layout
                .member(&format!("{at}helix{suffix}"), doubles(5))
                .member(&format!("{at}error{suffix}"), Shape::fixed(5, doubles(5)))
        })
    });

    layout
        .member("thelix", doubles(5))
        .member("terror", doubles(15))
        .into_collection("TRecMdcKalTrack")
}

fn kal_helix_seg() -> Shape {
    Layout::tobject()
        .scalars(PType::I32, &["trackId", "leftOrRight"])
        .scalars(PType::U32, &["mdcId"])
        .scalars(
            PType::F64,
            &[
                "tdc",
                "adc",
                "zhit",
                "tof",
                "docaInCell",
                "docaExCell",
                "driftDistance",
                "entranceAngle",
                "driftTime",
            ],
        )
        .member("helixInCell", doubles(5))
        .member("helixExCell", doubles(5))
        .into_collection("TRecMdcKalHelixSeg")
}

fn ev_time() -> Shape {
    Layout::tobject()
        .scalars(PType::I32, &["status"])
        .scalars(PType::F64, &["estime", "quality"])
        .into_collection("TRecEvTime")
}

fn zdd() -> Shape {
    Layout::tobject()
        .scalars(PType::I32, &["channelId", "scanCode", "baseLine", "phase"])
        // fragment time to energy, one entry per pulse fragment
        .member(
            "frags",
            Shape::map(Shape::primitive(PType::I32), Shape::primitive(PType::F32)),
        )
        .into_collection("TRecZddChannel")
}

#[cfg(test)]
mod test {
    use besio_serde::Reader;
    use besio_serde::test_harness::WireWriter;

    use crate::bes3::rec::{
        emc_cluster, emc_hit, emc_shower, ev_time, ext_track, kal_helix_seg, kal_track,
        mdc_dedx, mdc_dedx_hit, mdc_hit, mdc_track, muc_track, tof_track, zdd,
    };

    #[test]
    fn event_times() {
        let mut writer = WireWriter::default();
        writer.obj_array(1, |w| {
            w.header(Some("TRecEvTime"), 1, |w| {
                w.put_tobject();
                w.put(1i32).put(12.25f64).put(0.5f64);
            });
        });
        writer.end_entry();
        let mut cursor = writer.into_cursor().unwrap();

        let mut reader = Reader::compile(&ev_time()).unwrap();
        cursor.seek_entry(0).unwrap();
        reader.read(&mut cursor).unwrap();
        assert_eq!(cursor.finish_entry(), 0);

        let data = reader.data().unwrap();
        let times = data.as_list().unwrap().elements().as_struct().unwrap();
        assert_eq!(
            times.field_by_name("estime").unwrap().as_primitive().unwrap().as_slice::<f64>(),
            &[12.25]
        );
    }

    #[test]
    fn cluster_members() {
        let mut writer = WireWriter::default();
        writer.obj_array(1, |w| {
            w.header(Some("TRecEmcCluster"), 1, |w| {
                w.put_tobject();
                w.put(42i32);
                for members in [&[1i32, 2, 3][..], &[2], &[7]] {
                    w.framed(6, |w| {
                        w.put(u32::try_from(members.len()).unwrap());
                        for member in members {
                            w.put(*member);
                        }
                    });
                }
            });
        });
        writer.end_entry();
        let mut cursor = writer.into_cursor().unwrap();

        let mut reader = Reader::compile(&emc_cluster()).unwrap();
        cursor.seek_entry(0).unwrap();
        reader.read(&mut cursor).unwrap();
        assert_eq!(cursor.finish_entry(), 0);

        let data = reader.data().unwrap();
        let clusters = data.as_list().unwrap().elements().as_struct().unwrap();
        let hits = clusters.field_by_name("hits").unwrap().as_list().unwrap();
        assert_eq!(
            hits.elements().as_primitive().unwrap().as_slice::<i32>(),
            &[1, 2, 3]
        );
    }

    #[test]
    fn kal_track_names_every_hypothesis() {
        let reader = Reader::compile(&kal_track()).unwrap();
        let dtype = reader.dtype().to_string();
        for name in ["poca_mu=", "lpivot_p=", "zerror_k=", "lhelix_e=", "terror="] {
            assert!(dtype.contains(name), "{name} missing from {dtype}");
        }
    }

    #[test]
    fn layouts_compile() {
        for shape in [
            mdc_track(),
            mdc_hit(),
            tof_track(),
            emc_hit(),
            emc_shower(),
            muc_track(),
            mdc_dedx(),
            mdc_dedx_hit(),
            ext_track(),
            kal_helix_seg(),
            zdd(),
        ] {
            Reader::compile(&shape).unwrap();
        }
    }
}
