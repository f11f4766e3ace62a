//! Logical field paths
//!
//! Decoded fields are addressed by slash-separated paths such as `/Event/Mc/McParticle`, one
//! segment per level of the event model.

use core::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use besio_error::{BesError, BesResult, besio_bail};
use itertools::Itertools;

use crate::FieldName;

/// A path through the event model, composed of a sequence of segment names
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct FieldPath(Vec<FieldName>);

impl FieldPath {
    /// The path of the event root
    pub fn root() -> Self {
        Self(vec![])
    }

    /// Constructs a new `FieldPath` from a single segment
    pub fn from_name<F: Into<FieldName>>(name: F) -> Self {
        Self(vec![name.into()])
    }

    /// Parses a path of the form `/A/B/C`.
    ///
    /// Segments must be non-empty and must not contain glob characters.
    pub fn parse(path: &str) -> BesResult<Self> {
        let Some(rest) = path.strip_prefix('/') else {
            besio_bail!("field path {} must start with '/'", path);
        };
        if rest.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for segment in rest.split('/') {
            if segment.is_empty() {
                besio_bail!("field path {} has an empty segment", path);
            }
            if segment.contains(['*', '?']) {
                besio_bail!("field path {} contains a glob character", path);
            }
            segments.push(FieldName::from(segment));
        }
        Ok(Self(segments))
    }

    /// Returns the sequence of segments that make up this path
    pub fn path(&self) -> &[FieldName] {
        &self.0
    }

    /// Returns the last segment, `None` for the root
    pub fn name(&self) -> Option<&FieldName> {
        self.0.last()
    }

    /// Returns the path without its last segment, `None` for the root
    pub fn parent(&self) -> Option<FieldPath> {
        self.0
            .split_last()
            .map(|(_, parent)| FieldPath(parent.to_vec()))
    }

    /// Pushes a new segment to the end of this path
    pub fn push<F: Into<FieldName>>(&mut self, segment: F) {
        self.0.push(segment.into());
    }

    /// Returns a new path with `segment` appended
    pub fn join<F: Into<FieldName>>(&self, segment: F) -> Self {
        let mut joined = self.clone();
        joined.push(segment);
        joined
    }

    /// Returns whether `self` is `other` or nested below it
    pub fn starts_with(&self, other: &FieldPath) -> bool {
        self.0.starts_with(&other.0)
    }

    /// Returns whether this path has no segments
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<FieldName> for FieldPath {
    fn from_iter<T: IntoIterator<Item = FieldName>>(iter: T) -> Self {
        FieldPath(iter.into_iter().collect())
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        write!(f, "/{}", self.0.iter().join("/"))
    }
}

impl FromStr for FieldPath {
    type Err = BesError;

    fn from_str(s: &str) -> BesResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = BesError;

    fn try_from(value: String) -> BesResult<Self> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(value: FieldPath) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn parse_and_display() {
        let path = FieldPath::parse("/Event/Mc/McParticle").unwrap();
        assert_eq!(path.path().len(), 3);
        assert_eq!(path.name().map(|n| n.as_ref()), Some("McParticle"));
        assert_eq!(path.to_string(), "/Event/Mc/McParticle");
        assert_eq!(path.parent().unwrap().to_string(), "/Event/Mc");
    }

    #[test]
    fn join_and_prefix() {
        let mc = FieldPath::parse("/Event/Mc").unwrap();
        let mdc = mc.join("Mdc");
        assert!(mdc.starts_with(&mc));
        assert!(!mc.starts_with(&mdc));
        assert_eq!(FieldPath::root().to_string(), "/");
        assert!(FieldPath::parse("/").unwrap().is_root());
    }

    #[rstest]
    #[case("Event/Header")]
    #[case("/Event//Header")]
    #[case("/Event/Mc/*")]
    #[case("")]
    fn parse_rejects(#[case] path: &str) {
        assert!(FieldPath::parse(path).is_err());
    }
}
