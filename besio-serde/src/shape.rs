use besio_dtype::PType;

/// The on-disk layout of one field, as written by the ROOT streamers.
///
/// `framed` marks the variants that carry their own `fNBytes` header when they are the top-level
/// value of a member. The same container nested in another container (a sequence of sequences,
/// a fixed array of maps) is written without it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Shape {
    /// Consumes nothing and produces no data
    Empty,
    /// One byte, non-zero is `true`
    Bool,
    /// One fixed-width number
    Primitive {
        /// The wire type of the number
        ptype: PType,
    },
    /// A length-prefixed string without framing
    TString,
    /// A length-prefixed string, framed when top-level
    StlString {
        /// Whether `fNBytes` and `fVersion` precede the string
        framed: bool,
    },
    /// A `u32` count followed by that many numbers
    TArray {
        /// The wire type of the numbers
        ptype: PType,
    },
    /// A `u32` count followed by that many elements
    Seq {
        /// Whether `fNBytes` and `fVersion` precede the count
        framed: bool,
        /// The layout of every element
        element: Box<Shape>,
    },
    /// A `u32` count followed by that many key/value pairs
    ///
    /// Framed maps write an opaque 8-byte block after `fNBytes`, then all keys followed by all
    /// values. Unframed maps interleave keys and values.
    Map {
        /// Whether `fNBytes` and the opaque block precede the count
        framed: bool,
        /// The layout of every key
        key: Box<Shape>,
        /// The layout of every value
        value: Box<Shape>,
    },
    /// Exactly `size` elements without a count
    FixedArray {
        /// Whether one `fNBytes` and `fVersion` precede all elements
        framed: bool,
        /// The number of elements
        size: u32,
        /// The layout of every element
        element: Box<Shape>,
    },
    /// The `TObject` base of an object: version, unique id and bits, without data
    TObject,
    /// An object with `fNBytes` and `fVersion` followed by its members
    Object {
        /// The members, in streaming order
        members: Vec<Member>,
    },
    /// An object written through a pointer: class tag, then a framed object
    ObjectHeader {
        /// The class name the tag must announce, if it announces one
        class: Option<String>,
        /// The members, in streaming order
        members: Vec<Member>,
    },
    /// A `TObjArray` of objects of one class
    ObjArray {
        /// The layout of every element, an [`ObjectHeader`](Shape::ObjectHeader) or
        /// [`Object`](Shape::Object)
        element: Box<Shape>,
    },
}

/// A named member of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Member {
    /// The member name, used as the field name of the decoded struct
    pub name: String,
    /// The layout of the member
    pub shape: Shape,
}

impl Member {
    /// Create a new member.
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }
}

impl<N: Into<String>> From<(N, Shape)> for Member {
    fn from((name, shape): (N, Shape)) -> Self {
        Self::new(name, shape)
    }
}

impl Shape {
    /// A single number.
    pub fn primitive(ptype: PType) -> Self {
        Self::Primitive { ptype }
    }

    /// A top-level STL string.
    pub fn stl_string() -> Self {
        Self::StlString { framed: true }
    }

    /// A `TArray` of numbers.
    pub fn tarray(ptype: PType) -> Self {
        Self::TArray { ptype }
    }

    /// A top-level STL sequence.
    pub fn seq(element: Shape) -> Self {
        Self::Seq {
            framed: true,
            element: Box::new(element),
        }
    }

    /// An STL sequence nested in another container.
    pub fn nested_seq(element: Shape) -> Self {
        Self::Seq {
            framed: false,
            element: Box::new(element),
        }
    }

    /// A top-level STL map.
    pub fn map(key: Shape, value: Shape) -> Self {
        Self::Map {
            framed: true,
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// An STL map nested in another container.
    pub fn nested_map(key: Shape, value: Shape) -> Self {
        Self::Map {
            framed: false,
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// A C array of plain values.
    pub fn fixed(size: u32, element: Shape) -> Self {
        Self::FixedArray {
            framed: false,
            size,
            element: Box::new(element),
        }
    }

    /// A C array of containers or objects, framed once before its elements.
    pub fn framed_fixed(size: u32, element: Shape) -> Self {
        Self::FixedArray {
            framed: true,
            size,
            element: Box::new(element),
        }
    }

    /// An object with the given members.
    pub fn object<M: Into<Member>>(members: impl IntoIterator<Item = M>) -> Self {
        Self::Object {
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// An object written through a pointer, optionally pinned to a class name.
    pub fn header<M: Into<Member>>(
        class: Option<&str>,
        members: impl IntoIterator<Item = M>,
    ) -> Self {
        Self::ObjectHeader {
            class: class.map(str::to_string),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// A `TObjArray` whose elements all have the layout `element`.
    pub fn obj_array(element: Shape) -> Self {
        Self::ObjArray {
            element: Box::new(element),
        }
    }

    /// Returns whether the shape is an object, with or without a class tag.
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object { .. } | Self::ObjectHeader { .. })
    }
}

#[cfg(test)]
mod test {
    use besio_dtype::PType;

    use crate::{Member, Shape};

    #[test]
    fn constructors() {
        let shape = Shape::header(
            Some("TMcParticle"),
            [
                ("m_particleID", Shape::primitive(PType::I32)),
                ("m_daughters", Shape::seq(Shape::primitive(PType::I32))),
            ],
        );
        let Shape::ObjectHeader { class, members } = &shape else {
            unreachable!()
        };
        assert_eq!(class.as_deref(), Some("TMcParticle"));
        assert_eq!(
            members[1],
            Member::new(
                "m_daughters",
                Shape::Seq {
                    framed: true,
                    element: Box::new(Shape::primitive(PType::I32))
                }
            )
        );
        assert!(shape.is_object());
        assert!(!Shape::obj_array(shape).is_object());
    }
}
