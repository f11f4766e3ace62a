use std::ops::Range;
use std::sync::Arc;

use besio_buffer::Buffer;
use besio_dtype::DType;
use besio_error::{BesResult, besio_bail};

use crate::ArrayData;
use crate::arrays::{offsets_range, validate_offsets};

/// A ragged array of key/value pairs. Keys and values are stored as two parallel arrays sharing
/// one offsets buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct MapArray {
    offsets: Buffer<u32>,
    keys: Box<ArrayData>,
    values: Box<ArrayData>,
}

impl MapArray {
    /// Create a new `MapArray`, validating that keys and values line up with the offsets.
    pub fn try_new(offsets: Buffer<u32>, keys: ArrayData, values: ArrayData) -> BesResult<Self> {
        if keys.len() != values.len() {
            besio_bail!(
                "map has {} keys but {} values",
                keys.len(),
                values.len()
            );
        }
        validate_offsets(&offsets, keys.len())?;
        Ok(Self {
            offsets,
            keys: Box::new(keys),
            values: Box::new(values),
        })
    }

    /// Returns the number of maps.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Returns whether there are no maps.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the offsets, one more than the number of maps.
    pub fn offsets(&self) -> &Buffer<u32> {
        &self.offsets
    }

    /// Returns the flattened keys of all maps.
    pub fn keys(&self) -> &ArrayData {
        &self.keys
    }

    /// Returns the flattened values of all maps.
    pub fn values(&self) -> &ArrayData {
        &self.values
    }

    /// Returns the entry range of map `index`.
    pub fn entry_range(&self, index: usize) -> Range<usize> {
        offsets_range(&self.offsets, index)
    }

    /// Returns the structural form of the maps.
    pub fn dtype(&self) -> DType {
        DType::Map(Arc::new(self.keys.dtype()), Arc::new(self.values.dtype()))
    }
}

#[cfg(test)]
mod test {
    use besio_buffer::buffer;

    use crate::{ArrayData, MapArray, PrimitiveArray};

    #[test]
    fn keys_values_aligned() {
        let map = MapArray::try_new(
            buffer![0u32, 2],
            ArrayData::Primitive(PrimitiveArray::new(buffer![1i32, 2])),
            ArrayData::Primitive(PrimitiveArray::new(buffer![10.0f64, 20.0])),
        )
        .unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.entry_range(0), 0..2);
        assert_eq!(map.dtype().to_string(), "map(i32, f64)");
    }

    #[test]
    fn unequal_keys_values() {
        let res = MapArray::try_new(
            buffer![0u32, 2],
            ArrayData::Primitive(PrimitiveArray::new(buffer![1i32, 2])),
            ArrayData::Primitive(PrimitiveArray::new(buffer![10.0f64])),
        );
        assert!(res.is_err());
    }
}
