use std::collections::BTreeMap;

use besio_buffer::{Buffer, ByteBuffer};
use serde_json::{Value, json};

use crate::ArrayData;

/// A decoded field flattened into named raw buffers plus a form descriptor.
///
/// The form is a JSON tree of nodes, each tagged with a `form_key`. A node owns the buffers named
/// `<form_key>-offsets` (ragged levels), `<form_key>-index` (all-missing columns) and
/// `<form_key>-data` (leaf values). Together with
/// [`length`](Self::length) this is everything needed to build a ragged array over the buffers
/// without copying them.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnarBuffers {
    form: Value,
    length: usize,
    buffers: BTreeMap<String, ByteBuffer>,
}

impl ColumnarBuffers {
    /// Returns the form descriptor.
    pub fn form(&self) -> &Value {
        &self.form
    }

    /// Returns the form descriptor serialized as JSON.
    pub fn form_json(&self) -> String {
        self.form.to_string()
    }

    /// Returns the number of top-level values.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Returns the raw buffers keyed by name.
    pub fn buffers(&self) -> &BTreeMap<String, ByteBuffer> {
        &self.buffers
    }

    /// Returns the buffer with the given name.
    pub fn buffer(&self, name: &str) -> Option<&ByteBuffer> {
        self.buffers.get(name)
    }

    /// Returns the size in bytes of each buffer.
    pub fn buffer_nbytes(&self) -> BTreeMap<String, usize> {
        self.buffers
            .iter()
            .map(|(name, buffer)| (name.clone(), buffer.len()))
            .collect()
    }

    /// Returns the total size in bytes of all buffers.
    pub fn nbytes(&self) -> usize {
        self.buffers.values().map(|b| b.len()).sum()
    }
}

impl ArrayData {
    /// Flattens the array into named buffers and a form descriptor.
    pub fn to_buffers(&self) -> ColumnarBuffers {
        let mut writer = FormWriter::default();
        let form = writer.visit(self);
        ColumnarBuffers {
            form,
            length: self.len(),
            buffers: writer.buffers,
        }
    }
}

#[derive(Default)]
struct FormWriter {
    next_node: usize,
    buffers: BTreeMap<String, ByteBuffer>,
}

impl FormWriter {
    fn form_key(&mut self) -> String {
        let key = format!("node{}", self.next_node);
        self.next_node += 1;
        key
    }

    fn add(&mut self, key: &str, kind: &str, buffer: ByteBuffer) {
        self.buffers.insert(format!("{key}-{kind}"), buffer);
    }

    fn visit(&mut self, array: &ArrayData) -> Value {
        let key = self.form_key();
        match array {
            ArrayData::Null(a) if a.is_empty() => json!({ "class": "EmptyArray", "form_key": key }),
            ArrayData::Null(a) => {
                // every value points at nothing, an EmptyArray alone cannot carry the length
                self.add(&key, "index", Buffer::full(-1i64, a.len()).into_byte_buffer());
                let content = self.form_key();
                json!({
                    "class": "IndexedOptionArray",
                    "index": "i64",
                    "content": { "class": "EmptyArray", "form_key": content },
                    "form_key": key,
                })
            }
            ArrayData::Bool(a) => {
                self.add(&key, "data", a.values().clone().into_byte_buffer());
                json!({ "class": "NumpyArray", "primitive": "bool", "form_key": key })
            }
            ArrayData::Primitive(a) => {
                self.add(&key, "data", a.byte_buffer().clone());
                json!({ "class": "NumpyArray", "primitive": a.ptype().form_name(), "form_key": key })
            }
            ArrayData::VarBin(a) => {
                self.add(&key, "offsets", a.offsets().clone().into_byte_buffer());
                let chars = self.form_key();
                self.add(&chars, "data", a.bytes().clone());
                json!({
                    "class": "ListOffsetArray",
                    "offsets": "u32",
                    "parameters": { "__array__": "string" },
                    "content": {
                        "class": "NumpyArray",
                        "primitive": "uint8",
                        "parameters": { "__array__": "char" },
                        "form_key": chars,
                    },
                    "form_key": key,
                })
            }
            ArrayData::List(a) => {
                self.add(&key, "offsets", a.offsets().clone().into_byte_buffer());
                let content = self.visit(a.elements());
                json!({
                    "class": "ListOffsetArray",
                    "offsets": "u32",
                    "content": content,
                    "form_key": key,
                })
            }
            ArrayData::FixedSizeList(a) => {
                let content = self.visit(a.elements());
                json!({
                    "class": "RegularArray",
                    "size": a.size(),
                    "content": content,
                    "form_key": key,
                })
            }
            ArrayData::Map(a) => {
                self.add(&key, "offsets", a.offsets().clone().into_byte_buffer());
                let record = self.form_key();
                let keys = self.visit(a.keys());
                let values = self.visit(a.values());
                json!({
                    "class": "ListOffsetArray",
                    "offsets": "u32",
                    "content": {
                        "class": "RecordArray",
                        "fields": ["key", "value"],
                        "contents": [keys, values],
                        "form_key": record,
                    },
                    "form_key": key,
                })
            }
            ArrayData::Struct(a) => {
                let contents: Vec<Value> = a.fields().iter().map(|f| self.visit(f)).collect();
                let fields: Vec<&str> = a.names().iter().map(|n| n.as_ref()).collect();
                json!({
                    "class": "RecordArray",
                    "fields": fields,
                    "contents": contents,
                    "form_key": key,
                })
            }
        }
    }
}

#[cfg(test)]
mod test {
    use besio_buffer::{Buffer, buffer};

    use crate::{ArrayData, ListArray, MapArray, NullArray, PrimitiveArray, StructArray};

    #[test]
    fn ragged_primitive() {
        let array = ArrayData::List(
            ListArray::try_new(
                buffer![0u32, 3, 5, 9],
                ArrayData::Primitive(PrimitiveArray::new(buffer![
                    1i32, 2, 3, 4, 5, 6, 7, 8, 9
                ])),
            )
            .unwrap(),
        );

        let buffers = array.to_buffers();
        assert_eq!(buffers.length(), 3);
        assert_eq!(buffers.form()["class"], "ListOffsetArray");
        assert_eq!(buffers.form()["content"]["primitive"], "int32");
        assert_eq!(buffers.form()["content"]["form_key"], "node1");

        let nbytes = buffers.buffer_nbytes();
        assert_eq!(nbytes["node0-offsets"], 16);
        assert_eq!(nbytes["node1-data"], 36);
        assert_eq!(buffers.nbytes(), 52);

        let offsets = Buffer::<u32>::from_byte_buffer(buffers.buffer("node0-offsets").unwrap().clone());
        assert_eq!(offsets.as_slice(), &[0, 3, 5, 9]);
    }

    #[test]
    fn record_and_map_forms() {
        let map = ArrayData::Map(
            MapArray::try_new(
                buffer![0u32, 2],
                ArrayData::Primitive(PrimitiveArray::new(buffer![1i32, 2])),
                ArrayData::Primitive(PrimitiveArray::new(buffer![10.0f64, 20.0])),
            )
            .unwrap(),
        );
        let record = ArrayData::Struct(
            StructArray::try_new(["hits".into()].into(), vec![map], 1).unwrap(),
        );

        let buffers = record.to_buffers();
        let form = buffers.form();
        assert_eq!(form["class"], "RecordArray");
        assert_eq!(form["fields"][0], "hits");
        assert_eq!(form["contents"][0]["content"]["fields"][1], "value");
        assert_eq!(
            buffers.buffers().keys().collect::<Vec<_>>(),
            vec!["node1-offsets", "node3-data", "node4-data"]
        );
    }

    #[test]
    fn null_column_keeps_length() {
        let buffers = ArrayData::Null(NullArray::new(3)).to_buffers();
        assert_eq!(buffers.length(), 3);
        assert_eq!(buffers.form()["class"], "IndexedOptionArray");
        assert_eq!(buffers.form()["content"]["class"], "EmptyArray");

        let index = Buffer::<i64>::from_byte_buffer(buffers.buffer("node0-index").unwrap().clone());
        assert_eq!(index.as_slice(), &[-1, -1, -1]);

        let empty = ArrayData::Null(NullArray::new(0)).to_buffers();
        assert_eq!(empty.form()["class"], "EmptyArray");
        assert!(empty.buffers().is_empty());
    }
}
