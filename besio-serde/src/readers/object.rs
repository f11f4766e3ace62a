use besio_array::{ArrayData, NullArray, StructArray};
use besio_dtype::{DType, FieldName, FieldNames, StructDType};
use besio_error::{BesResult, besio_bail};

use crate::{ByteCursor, NEW_CLASS_TAG, Reader};

/// Consumes nothing. Stands in for members that are not streamed.
#[derive(Debug, Default, Clone)]
pub struct EmptyReader {
    len: usize,
}

impl EmptyReader {
    /// Create a new reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one value without reading.
    pub fn read(&mut self, _cursor: &mut ByteCursor) -> BesResult<()> {
        self.len += 1;
        Ok(())
    }

    /// Returns a null array of the values counted so far.
    pub fn data(&self) -> BesResult<ArrayData> {
        Ok(ArrayData::Null(NullArray::new(self.len)))
    }

    /// Resets the count.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Returns the number of values counted.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether nothing was counted.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns [`DType::Null`].
    pub fn dtype(&self) -> DType {
        DType::Null
    }
}

/// Reads the `TObject` base of an object: `fVersion`, `fUniqueID` and `fBits`.
#[derive(Debug, Default, Clone)]
pub struct TObjectReader {
    len: usize,
}

impl TObjectReader {
    /// Create a new reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads one `TObject` and drops its contents.
    pub fn read(&mut self, cursor: &mut ByteCursor) -> BesResult<()> {
        cursor.read_fversion()?;
        let _unique_id = cursor.read::<u32>()?;
        let _bits = cursor.read::<u32>()?;
        self.len += 1;
        Ok(())
    }

    /// Returns a null array, `TObject` carries nothing worth keeping.
    pub fn data(&self) -> BesResult<ArrayData> {
        Ok(ArrayData::Null(NullArray::new(self.len)))
    }

    /// Resets the count.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Returns the number of objects read.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether nothing was read.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns [`DType::Null`].
    pub fn dtype(&self) -> DType {
        DType::Null
    }
}

/// The members of an object, read in streaming order.
#[derive(Debug, Clone)]
struct Members {
    len: usize,
    names: Vec<FieldName>,
    readers: Vec<Reader>,
}

impl Members {
    fn new(members: Vec<(FieldName, Reader)>) -> Self {
        let (names, readers) = members.into_iter().unzip();
        Self {
            len: 0,
            names,
            readers,
        }
    }

    fn read(&mut self, cursor: &mut ByteCursor) -> BesResult<()> {
        for reader in self.readers.iter_mut() {
            reader.read(cursor)?;
        }
        self.len += 1;
        Ok(())
    }

    /// Members that produce data. `TObject` bases and empty members are left out.
    fn kept(&self) -> impl Iterator<Item = (&FieldName, &Reader)> {
        self.names
            .iter()
            .zip(self.readers.iter())
            .filter(|(_, reader)| !reader.dtype().is_null())
    }

    fn data(&self) -> BesResult<ArrayData> {
        let mut names = Vec::new();
        let mut fields = Vec::new();
        for (name, reader) in self.kept() {
            names.push(name.clone());
            fields.push(reader.data()?);
        }
        StructArray::try_new(FieldNames::from(names), fields, self.len).map(ArrayData::Struct)
    }

    fn clear(&mut self) {
        self.len = 0;
        self.readers.iter_mut().for_each(Reader::clear);
    }

    fn dtype(&self) -> DType {
        let (names, dtypes): (Vec<FieldName>, Vec<DType>) = self
            .kept()
            .map(|(name, reader)| (name.clone(), reader.dtype()))
            .unzip();
        DType::Struct(StructDType::new(names.into(), dtypes))
    }
}

/// Reads an object: `fNBytes`, `fVersion`, then every member.
///
/// The decoded value is a struct of the members that produce data.
#[derive(Debug, Clone)]
pub struct ObjectReader {
    members: Members,
}

impl ObjectReader {
    /// Create a new reader over named member readers.
    pub fn new(members: Vec<(FieldName, Reader)>) -> Self {
        Self {
            members: Members::new(members),
        }
    }

    /// Reads one object.
    pub fn read(&mut self, cursor: &mut ByteCursor) -> BesResult<()> {
        cursor.read_fnbytes()?;
        cursor.read_fversion()?;
        self.members.read(cursor)
    }

    /// Snapshots the objects read so far as a struct.
    pub fn data(&self) -> BesResult<ArrayData> {
        self.members.data()
    }

    /// Drops the objects read so far.
    pub fn clear(&mut self) {
        self.members.clear()
    }

    /// Returns the number of objects read.
    pub fn len(&self) -> usize {
        self.members.len
    }

    /// Returns whether nothing was read.
    pub fn is_empty(&self) -> bool {
        self.members.len == 0
    }

    /// Returns the struct form of the members.
    pub fn dtype(&self) -> DType {
        self.members.dtype()
    }
}

/// Reads an object written through a pointer.
///
/// The wire layout is `fNBytes`, an `i32` tag, the null-terminated class name when the tag is
/// [`NEW_CLASS_TAG`], then `fNBytes`, `fVersion` and the members. Any other tag refers back to a
/// class named earlier in the buffer.
///
/// When the reader expects a class, a tag naming another class fails the read.
#[derive(Debug, Clone)]
pub struct ObjectHeaderReader {
    class: Option<String>,
    members: Members,
}

impl ObjectHeaderReader {
    /// Create a new reader over named member readers.
    pub fn new(class: Option<String>, members: Vec<(FieldName, Reader)>) -> Self {
        Self {
            class,
            members: Members::new(members),
        }
    }

    /// Returns the expected class name.
    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// Reads one object.
    pub fn read(&mut self, cursor: &mut ByteCursor) -> BesResult<()> {
        cursor.read_fnbytes()?;
        if cursor.read::<i32>()? == NEW_CLASS_TAG {
            let name = cursor.read_null_terminated_string()?;
            if let Some(class) = self.class.as_deref().filter(|class| name != class.as_bytes()) {
                besio_bail!(
                    InvalidShape: "expected an object of class {}, found {}",
                    class,
                    String::from_utf8_lossy(name)
                );
            }
        }
        cursor.read_fnbytes()?;
        cursor.read_fversion()?;
        self.members.read(cursor)
    }

    /// Snapshots the objects read so far as a struct.
    pub fn data(&self) -> BesResult<ArrayData> {
        self.members.data()
    }

    /// Drops the objects read so far.
    pub fn clear(&mut self) {
        self.members.clear()
    }

    /// Returns the number of objects read.
    pub fn len(&self) -> usize {
        self.members.len
    }

    /// Returns whether nothing was read.
    pub fn is_empty(&self) -> bool {
        self.members.len == 0
    }

    /// Returns the struct form of the members.
    pub fn dtype(&self) -> DType {
        self.members.dtype()
    }
}
