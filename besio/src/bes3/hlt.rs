use besio_dtype::PType;
use besio_serde::Shape;

use crate::bes3::{Layout, ints};
use crate::catalog::FieldCatalogBuilder;

pub(super) fn register(builder: FieldCatalogBuilder) -> FieldCatalogBuilder {
    builder
        .field("/Event/Hlt/Raw", "THltEvent/m_hltRawCol", raw())
        .field("/Event/Hlt/Inf", "THltEvent/m_hltInf", inf())
        .field("/Event/Hlt/DstInf", "THltEvent/m_dstHltInf", summary().into_object())
}

fn raw() -> Shape {
    Layout::tobject()
        .scalars(PType::U32, &["id", "adc", "tdc"])
        .scalars(PType::I32, &["trackIndex"])
        .into_collection("THltRaw")
}

/// The event filter decision, shared by the online and the DST record.
fn summary() -> Layout {
    Layout::tobject()
        .scalars(PType::I32, &["evtType", "algProcess", "criTable", "verNumber"])
        .scalars(PType::F64, &["eTotal"])
        .scalars(PType::I32, &["subNumber", "conNumber"])
}

fn inf() -> Shape {
    summary()
        .member("mdcData", ints())
        .member("tofData", ints())
        .member("emcData", ints())
        .member("mucData", ints())
        .member("conData", ints())
        .into_object()
}
