use besio_dtype::PType;
use besio_serde::Shape;

use crate::bes3::Layout;
use crate::catalog::FieldCatalogBuilder;

pub(super) fn register(builder: FieldCatalogBuilder) -> FieldCatalogBuilder {
    builder
        .field("/Event/Digi/FromMc", "TDigiEvent/m_fromMc", Shape::Bool)
        .field(
            "/Event/Digi/Mdc",
            "TDigiEvent/m_mdcDigiCol",
            digi("TMdcDigi", Some("overflow")),
        )
        .field(
            "/Event/Digi/Emc",
            "TDigiEvent/m_emcDigiCol",
            digi("TEmcDigi", Some("measure")),
        )
        .field(
            "/Event/Digi/Tof",
            "TDigiEvent/m_tofDigiCol",
            digi("TTofDigi", Some("overflow")),
        )
        .field("/Event/Digi/Muc", "TDigiEvent/m_mucDigiCol", digi("TMucDigi", None))
        .field(
            "/Event/Digi/Lumi",
            "TDigiEvent/m_lumiDigiCol",
            digi("TLumiDigi", Some("overflow")),
        )
}

/// Every digi class shares the raw channel readout and differs only in a trailing word.
fn digi(class: &str, extra: Option<&str>) -> Shape {
    let layout = Layout::tobject()
        .scalars(PType::U32, &["id", "adc", "tdc"])
        .scalars(PType::I32, &["trackIndex"]);
    let layout = match extra {
        Some(name) => layout.scalars(PType::U32, &[name]),
        None => layout,
    };
    layout.into_collection(class)
}
