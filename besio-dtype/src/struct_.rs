use std::sync::Arc;

use besio_error::{BesResult, besio_bail, besio_err, besio_panic};
use itertools::Itertools;

use crate::{DType, FieldName, FieldNames};

/// Type information for a struct column
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StructDType {
    names: FieldNames,
    dtypes: Arc<[DType]>,
}

impl StructDType {
    /// Create a new [`StructDType`] from a list of names and a list of types.
    ///
    /// ## Panics
    ///
    /// Panics if the number of names and types do not match.
    pub fn new(names: FieldNames, dtypes: Vec<DType>) -> Self {
        if names.len() != dtypes.len() {
            besio_panic!(
                "length mismatch between names ({}) and dtypes ({})",
                names.len(),
                dtypes.len()
            );
        }

        Self {
            names,
            dtypes: dtypes.into(),
        }
    }

    /// Create a new [`StructDType`] from named fields, rejecting duplicate or empty names.
    pub fn try_from_fields<N, I>(fields: I) -> BesResult<Self>
    where
        N: Into<FieldName>,
        I: IntoIterator<Item = (N, DType)>,
    {
        let (names, dtypes): (Vec<FieldName>, Vec<DType>) =
            fields.into_iter().map(|(n, dt)| (n.into(), dt)).unzip();

        if let Some(empty) = names.iter().position(|n| n.is_empty()) {
            besio_bail!("struct field {} has an empty name", empty);
        }
        if let Some(dup) = names.iter().duplicates().next() {
            besio_bail!("duplicate struct field name {}", dup);
        }

        Ok(Self::new(names.into(), dtypes))
    }

    /// Get the names of the fields in the struct
    pub fn names(&self) -> &FieldNames {
        &self.names
    }

    /// Returns the number of fields in the struct
    pub fn nfields(&self) -> usize {
        self.names.len()
    }

    /// Find the index of a field by name
    /// Returns `None` if the field is not found
    pub fn find(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_ref() == name)
    }

    /// Get the type of a field by name
    pub fn field(&self, name: &str) -> BesResult<DType> {
        let idx = self
            .find(name)
            .ok_or_else(|| besio_err!("Couldn't find field {} in {:?}", name, self.names))?;
        self.field_by_index(idx)
    }

    /// Get the type of a field by index
    pub fn field_by_index(&self, index: usize) -> BesResult<DType> {
        self.dtypes
            .get(index)
            .cloned()
            .ok_or_else(|| besio_err!("field index {} out of bounds", index))
    }

    /// Returns an ordered iterator over the field types
    pub fn fields(&self) -> impl ExactSizeIterator<Item = DType> + '_ {
        self.dtypes.iter().cloned()
    }
}

#[cfg(test)]
mod test {
    use crate::{DType, PType, StructDType};

    #[test]
    fn lookup() {
        let sdt = StructDType::try_from_fields([
            ("runNo", DType::Primitive(PType::I32)),
            ("time", DType::Primitive(PType::U32)),
        ])
        .unwrap();

        assert_eq!(sdt.nfields(), 2);
        assert_eq!(sdt.find("time"), Some(1));
        assert_eq!(sdt.field("runNo").unwrap(), DType::Primitive(PType::I32));
        assert!(sdt.field("evtNo").is_err());
    }

    #[test]
    fn rejects_duplicates() {
        let res = StructDType::try_from_fields([
            ("x", DType::Primitive(PType::F64)),
            ("x", DType::Primitive(PType::F64)),
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn rejects_empty_names() {
        let res = StructDType::try_from_fields([("", DType::Bool)]);
        assert!(res.is_err());
    }
}
