use besio_dtype::PType;
use besio_serde::Shape;

use crate::bes3::Layout;
use crate::catalog::FieldCatalogBuilder;

const POSITION: [&str; 6] = ["x", "y", "z", "px", "py", "pz"];

pub(super) fn register(builder: FieldCatalogBuilder) -> FieldCatalogBuilder {
    builder
        .field("/Event/Mc/Mdc", "TMcEvent/m_mdcMcHitCol", mdc())
        .field("/Event/Mc/Emc", "TMcEvent/m_emcMcHitCol", emc())
        .field("/Event/Mc/Tof", "TMcEvent/m_tofMcHitCol", tof())
        .field("/Event/Mc/Muc", "TMcEvent/m_mucMcHitCol", muc())
        .field("/Event/Mc/McParticle", "TMcEvent/m_mcParticleCol", particle())
}

fn mdc() -> Shape {
    Layout::tobject()
        .scalars(PType::U32, &["identify", "trackIndex"])
        .scalars(PType::I32, &["curTrkPID", "isSecondary"])
        .scalars(PType::F64, &POSITION)
        .scalars(PType::F64, &["driftDistance", "depositEnergy"])
        .scalars(PType::I32, &["posFlag"])
        .scalars(PType::F64, &["flightLength"])
        .member("creatorProcess", Shape::TString)
        .scalars(PType::I32, &["digiIndex"])
        .into_collection("TMdcMc")
}

fn emc() -> Shape {
    Layout::tobject()
        .scalars(PType::U32, &["identify", "trackIndex"])
        .scalars(PType::I32, &["hitEmc", "PDGCode"])
        .scalars(PType::F64, &["PDGCharge", "time"])
        .scalars(PType::F64, &POSITION)
        .scalars(PType::F64, &["depositEnergy"])
        // crystal id to deposited energy
        .member(
            "hitMap",
            Shape::map(Shape::primitive(PType::I32), Shape::primitive(PType::F64)),
        )
        .into_collection("TEmcMc")
}

fn tof() -> Shape {
    Layout::tobject()
        .scalars(PType::U32, &["identify", "trackIndex"])
        .scalars(PType::F64, &POSITION)
        .scalars(PType::F64, &["trackLength", "tof"])
        .into_collection("TTofMc")
}

fn muc() -> Shape {
    Layout::tobject()
        .scalars(PType::U32, &["identify", "trackIndex"])
        .scalars(PType::F64, &POSITION)
        .scalars(PType::F64, &["depositEnergy"])
        .into_collection("TMucMc")
}

fn particle() -> Shape {
    Layout::tobject()
        .scalars(
            PType::I32,
            &["PDGId", "trackIndex", "vertexIndex0", "vertexIndex1"],
        )
        .scalars(PType::U32, &["statusFlags"])
        .scalars(
            PType::F64,
            &[
                "xInit", "yInit", "zInit", "tInit", "xFinal", "yFinal", "zFinal", "tFinal",
                "pxInit", "pyInit", "pzInit", "eInit",
            ],
        )
        .scalars(PType::I32, &["motherIndex"])
        .member("daughterIndexes", Shape::seq(Shape::primitive(PType::I32)))
        .into_collection("TMcParticle")
}
