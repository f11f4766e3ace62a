use besio_dtype::{DType, FieldNames, StructDType};
use besio_error::{BesResult, besio_bail};
use itertools::Itertools;

use crate::ArrayData;

/// Named fields of equal length, one per member of a decoded object.
#[derive(Debug, Clone, PartialEq)]
pub struct StructArray {
    names: FieldNames,
    fields: Vec<ArrayData>,
    len: usize,
}

impl StructArray {
    /// Create a new `StructArray` of `len` values.
    pub fn try_new(names: FieldNames, fields: Vec<ArrayData>, len: usize) -> BesResult<Self> {
        if names.len() != fields.len() {
            besio_bail!(
                "Got {} names and {} fields",
                names.len(),
                fields.len()
            );
        }
        if let Some(dup) = names.iter().duplicates().next() {
            besio_bail!("duplicate struct field name {}", dup);
        }
        if let Some((name, field)) = names
            .iter()
            .zip(fields.iter())
            .find(|(_, field)| field.len() != len)
        {
            besio_bail!(
                "field {} has length {}, expected {}",
                name,
                field.len(),
                len
            );
        }
        Ok(Self { names, fields, len })
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether there are no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the field names, in declaration order.
    pub fn names(&self) -> &FieldNames {
        &self.names
    }

    /// Returns the fields, in declaration order.
    pub fn fields(&self) -> &[ArrayData] {
        &self.fields
    }

    /// Returns the field with the given name.
    pub fn field_by_name(&self, name: &str) -> Option<&ArrayData> {
        self.names
            .iter()
            .position(|n| n.as_ref() == name)
            .map(|idx| &self.fields[idx])
    }

    /// Returns the structural form of the values.
    pub fn dtype(&self) -> DType {
        DType::Struct(StructDType::new(
            self.names.clone(),
            self.fields.iter().map(ArrayData::dtype).collect(),
        ))
    }
}

#[cfg(test)]
mod test {
    use besio_buffer::buffer;

    use crate::{ArrayData, PrimitiveArray, StructArray};

    #[test]
    fn lookup_by_name() {
        let array = StructArray::try_new(
            ["runNo".into(), "evtNo".into()].into(),
            vec![
                ArrayData::Primitive(PrimitiveArray::new(buffer![8093i32, 8093])),
                ArrayData::Primitive(PrimitiveArray::new(buffer![1i32, 2])),
            ],
            2,
        )
        .unwrap();
        let evt = array.field_by_name("evtNo").unwrap();
        assert_eq!(evt.as_primitive().unwrap().as_slice::<i32>(), &[1, 2]);
        assert_eq!(array.dtype().to_string(), "{runNo=i32, evtNo=i32}");
    }

    #[test]
    fn length_mismatch() {
        let res = StructArray::try_new(
            ["x".into()].into(),
            vec![ArrayData::Primitive(PrimitiveArray::new(buffer![1i32]))],
            2,
        );
        assert!(res.is_err());
    }
}
