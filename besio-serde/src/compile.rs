use std::collections::HashSet;

use besio_dtype::FieldName;
use besio_error::{BesResult, besio_bail};

use crate::{
    BoolReader, EmptyReader, FixedArrayReader, MapReader, Member, ObjArrayReader,
    ObjectHeaderReader, ObjectReader, PrimitiveReader, Reader, SeqReader, Shape, StringReader,
    TArrayReader, TObjectReader,
};

impl Reader {
    /// Builds the reader tree for `shape`.
    ///
    /// Compilation does no I/O and either succeeds for the whole tree or fails before any byte
    /// is read. Rejected shapes: C arrays of size 0, objects with empty or duplicate member
    /// names, object arrays of non-objects, and `Empty` or `TObject` repeated by a container.
    pub fn compile(shape: &Shape) -> BesResult<Reader> {
        Ok(match shape {
            Shape::Empty => Reader::Empty(EmptyReader::new()),
            Shape::Bool => Reader::Bool(BoolReader::new()),
            Shape::Primitive { ptype } => Reader::Primitive(PrimitiveReader::new(*ptype)),
            Shape::TString => Reader::String(StringReader::tstring()),
            Shape::StlString { framed } => Reader::String(StringReader::stl(*framed)),
            Shape::TArray { ptype } => Reader::TArray(TArrayReader::new(*ptype)),
            Shape::Seq { framed, element } => {
                Reader::Seq(SeqReader::new(*framed, compile_element(element, "sequence")?))
            }
            Shape::Map { framed, key, value } => Reader::Map(MapReader::new(
                *framed,
                compile_element(key, "map key")?,
                compile_element(value, "map value")?,
            )),
            Shape::FixedArray {
                framed,
                size,
                element,
            } => {
                if *size == 0 {
                    besio_bail!(InvalidShape: "fixed array must have at least one element");
                }
                Reader::FixedArray(FixedArrayReader::new(
                    *framed,
                    *size,
                    compile_element(element, "fixed array")?,
                ))
            }
            Shape::TObject => Reader::TObject(TObjectReader::new()),
            Shape::Object { members } => Reader::Object(ObjectReader::new(compile_members(members)?)),
            Shape::ObjectHeader { class, members } => Reader::ObjectHeader(
                ObjectHeaderReader::new(class.clone(), compile_members(members)?),
            ),
            Shape::ObjArray { element } => {
                if !element.is_object() {
                    besio_bail!(
                        InvalidShape: "object array elements must be objects, found {:?}",
                        element
                    );
                }
                Reader::ObjArray(ObjArrayReader::new(Reader::compile(element)?))
            }
        })
    }
}

/// Compiles a shape repeated by a container. Every repeated element consumes at least one
/// byte, so a corrupt count runs into the end of the entry instead of spinning.
fn compile_element(shape: &Shape, container: &str) -> BesResult<Reader> {
    if matches!(shape, Shape::Empty | Shape::TObject) {
        besio_bail!(
            InvalidShape: "{} elements cannot be {:?}, it carries no data",
            container,
            shape
        );
    }
    Reader::compile(shape)
}

fn compile_members(members: &[Member]) -> BesResult<Vec<(FieldName, Reader)>> {
    let mut seen = HashSet::with_capacity(members.len());
    members
        .iter()
        .map(|member| {
            if member.name.is_empty() {
                besio_bail!(InvalidShape: "object member names cannot be empty");
            }
            if !seen.insert(member.name.as_str()) {
                besio_bail!(InvalidShape: "duplicate object member {}", member.name);
            }
            let reader = Reader::compile(&member.shape)
                .map_err(|err| err.with_context(format!("member {}", member.name)))?;
            Ok((FieldName::from(member.name.as_str()), reader))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use besio_dtype::PType;
    use besio_error::BesError;
    use rstest::rstest;

    use crate::{Member, Reader, Shape};

    #[rstest]
    #[case::zero_size(Shape::fixed(0, Shape::primitive(PType::F64)))]
    #[case::empty_elements(Shape::seq(Shape::Empty))]
    #[case::tobject_values(Shape::map(Shape::primitive(PType::I32), Shape::TObject))]
    #[case::nested_zero_size(Shape::seq(Shape::nested_seq(Shape::fixed(0, Shape::Bool))))]
    #[case::array_of_numbers(Shape::obj_array(Shape::primitive(PType::I32)))]
    #[case::duplicate(Shape::object([
        ("m_x", Shape::primitive(PType::F64)),
        ("m_x", Shape::primitive(PType::F64)),
    ]))]
    #[case::unnamed(Shape::object([("", Shape::Bool)]))]
    fn rejects(#[case] shape: Shape) {
        let err = Reader::compile(&shape).unwrap_err();
        assert!(matches!(err.root_cause(), BesError::InvalidShape(..)));
    }

    #[rstest]
    #[case(Shape::primitive(PType::U64), "u64")]
    #[case(Shape::stl_string(), "utf8")]
    #[case(Shape::tarray(PType::F32), "list(f32)")]
    #[case(Shape::seq(Shape::nested_seq(Shape::Bool)), "list(list(bool))")]
    #[case(Shape::framed_fixed(3, Shape::nested_map(Shape::primitive(PType::I32), Shape::primitive(PType::F64))), "fixed_size_list(map(i32, f64))[3]")]
    #[case(Shape::obj_array(Shape::object([Member::new("m_id", Shape::primitive(PType::I32))])), "list({m_id=i32})")]
    fn compiled_forms(#[case] shape: Shape, #[case] expected: &str) {
        let reader = Reader::compile(&shape).unwrap();
        assert_eq!(reader.dtype().to_string(), expected);
        assert!(reader.is_empty());
    }

    #[test]
    fn member_errors_name_the_member() {
        let shape = Shape::object([("m_hits", Shape::seq(Shape::Empty))]);
        let err = Reader::compile(&shape).unwrap_err();
        assert!(err.to_string().starts_with("member m_hits"));
    }
}
