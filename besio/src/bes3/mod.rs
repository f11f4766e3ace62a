//! The BES III event model.
//!
//! Every field lives in one column of the `Event` tree. Hit and track collections are
//! `TObjArray`s of one class each; the remaining fields are single objects or flags.

use besio_dtype::PType;
use besio_error::BesResult;
use besio_serde::{Member, Shape};

use crate::catalog::FieldCatalog;

mod digi;
mod dst;
mod event;
mod evtrec;
mod hlt;
mod mc;
mod rec;

/// Returns the built-in catalog of BES III fields.
///
/// It covers the event header, the trigger, Monte Carlo truth, digitized hits, full and DST
/// reconstruction, the event selection records and the online filter.
pub fn catalog() -> BesResult<FieldCatalog> {
    let builder = FieldCatalog::builder();
    let builder = event::register(builder);
    let builder = mc::register(builder);
    let builder = digi::register(builder);
    let builder = rec::register(builder);
    let builder = dst::register(builder);
    let builder = evtrec::register(builder);
    let builder = hlt::register(builder);
    builder.build()
}

/// A C array of doubles.
fn doubles(size: u32) -> Shape {
    Shape::fixed(size, Shape::primitive(PType::F64))
}

/// A `vector<int>` member.
fn ints() -> Shape {
    Shape::seq(Shape::primitive(PType::I32))
}

/// The streamed members of one class, starting with its `TObject` base.
struct Layout(Vec<Member>);

impl Layout {
    fn tobject() -> Self {
        Self(vec![Member::new("TObject", Shape::TObject)])
    }

    fn scalars(mut self, ptype: PType, names: &[&str]) -> Self {
        self.0.extend(
            names
                .iter()
                .map(|name| Member::new(*name, Shape::primitive(ptype))),
        );
        self
    }

    fn member(mut self, name: &str, shape: Shape) -> Self {
        self.0.push(Member::new(name, shape));
        self
    }

    fn into_object(self) -> Shape {
        Shape::object(self.0)
    }

    /// A `TObjArray` holding objects of `class`.
    fn into_collection(self, class: &str) -> Shape {
        Shape::obj_array(Shape::header(Some(class), self.0))
    }
}
