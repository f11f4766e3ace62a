//! The field catalog: which logical field is stored where, and how it is laid out.

use std::collections::{BTreeMap, HashSet};

use besio_dtype::FieldPath;
use besio_error::{BesResult, besio_bail};
use besio_serde::{Reader, Shape};

use crate::store::branch_of;

/// One decodable field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDef {
    /// The logical path results are keyed by, such as `/Event/Mc/Mdc`.
    pub path: FieldPath,
    /// The branch activated to read this field. Derived from `column` when left empty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub branch: String,
    /// The row-store column holding the serialized values.
    pub column: String,
    /// The on-disk layout of one entry of `column`.
    pub shape: Shape,
}

impl FieldDef {
    /// Create a field stored in `column`, reading its branch from the column name.
    pub fn new(path: FieldPath, column: impl Into<String>, shape: Shape) -> Self {
        let column = column.into();
        Self {
            path,
            branch: branch_of(&column).to_string(),
            column,
            shape,
        }
    }
}

/// An ordered, validated set of fields.
///
/// Order is significant: it assigns the field ids of [`FieldCatalog::field_map`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCatalog {
    fields: Vec<FieldDef>,
}

impl FieldCatalog {
    /// Validates `fields` into a catalog.
    ///
    /// Fails on the root path, duplicate paths, empty columns, and shapes that do not compile.
    pub fn try_new(mut fields: Vec<FieldDef>) -> BesResult<Self> {
        let mut seen = HashSet::with_capacity(fields.len());
        for field in fields.iter_mut() {
            if field.path.is_root() {
                besio_bail!("field path cannot be the root");
            }
            if !seen.insert(field.path.clone()) {
                besio_bail!("duplicate field {}", field.path);
            }
            if field.column.is_empty() {
                besio_bail!("field {} has no column", field.path);
            }
            if field.branch.is_empty() {
                field.branch = branch_of(&field.column).to_string();
            }
            Reader::compile(&field.shape)
                .map_err(|err| err.with_context(field.path.to_string()))?;
        }
        Ok(Self { fields })
    }

    /// Start building a catalog.
    pub fn builder() -> FieldCatalogBuilder {
        FieldCatalogBuilder::default()
    }

    /// Parses a JSON array of field definitions.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> BesResult<Self> {
        Self::try_new(serde_json::from_str(json)?)
    }

    /// Serializes the field definitions as a JSON array.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> BesResult<String> {
        Ok(serde_json::to_string_pretty(&self.fields)?)
    }

    /// Returns the fields in catalog order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Returns the field at `path`.
    pub fn get(&self, path: &FieldPath) -> Option<&FieldDef> {
        self.fields.iter().find(|field| &field.path == path)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns whether the catalog has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Maps field ids, assigned in catalog order, to paths.
    pub fn field_map(&self) -> BTreeMap<usize, FieldPath> {
        self.fields
            .iter()
            .enumerate()
            .map(|(id, field)| (id, field.path.clone()))
            .collect()
    }

    /// Returns the catalog restricted to fields whose branch satisfies `keep`.
    pub fn retain_branches(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .filter(|field| keep(&field.branch))
                .cloned()
                .collect(),
        }
    }
}

/// Collects fields for a [`FieldCatalog`]; paths are parsed and checked by [`Self::build`].
#[derive(Debug, Default)]
pub struct FieldCatalogBuilder {
    fields: Vec<(String, String, Shape)>,
}

impl FieldCatalogBuilder {
    /// Adds a field at `path`, read from `column`.
    pub fn field(mut self, path: &str, column: &str, shape: Shape) -> Self {
        self.fields.push((path.to_string(), column.to_string(), shape));
        self
    }

    /// Validates the collected fields.
    pub fn build(self) -> BesResult<FieldCatalog> {
        let fields = self
            .fields
            .into_iter()
            .map(|(path, column, shape)| Ok(FieldDef::new(FieldPath::parse(&path)?, column, shape)))
            .collect::<BesResult<Vec<_>>>()?;
        FieldCatalog::try_new(fields)
    }
}

#[cfg(test)]
mod test {
    use besio_dtype::PType;
    use besio_error::BesError;
    use besio_serde::Shape;

    use crate::catalog::FieldCatalog;

    #[test]
    fn builder_orders_fields() {
        let catalog = FieldCatalog::builder()
            .field("/Event/Header", "TEvtHeader", Shape::object([("runNo", Shape::primitive(PType::I32))]))
            .field("/Event/Digi/FromMc", "TDigiEvent/m_fromMc", Shape::Bool)
            .build()
            .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.fields()[1].branch, "TDigiEvent");
        let map = catalog.field_map();
        assert_eq!(map[&0].to_string(), "/Event/Header");
        assert_eq!(map[&1].to_string(), "/Event/Digi/FromMc");

        let digi = catalog.retain_branches(|branch| branch == "TDigiEvent");
        assert_eq!(digi.len(), 1);
    }

    #[test]
    fn rejects_duplicates() {
        let err = FieldCatalog::builder()
            .field("/Event/Header", "TEvtHeader", Shape::Bool)
            .field("/Event/Header", "TEvtHeader", Shape::Bool)
            .build()
            .unwrap_err();
        assert!(err.to_string().starts_with("duplicate field /Event/Header"));
    }

    #[test]
    fn rejects_bad_paths_and_columns() {
        assert!(FieldCatalog::builder().field("Event", "TEvtHeader", Shape::Bool).build().is_err());
        assert!(FieldCatalog::builder().field("/", "TEvtHeader", Shape::Bool).build().is_err());
        assert!(FieldCatalog::builder().field("/Event/Header", "", Shape::Bool).build().is_err());
    }

    #[test]
    fn shape_errors_name_the_field() {
        let err = FieldCatalog::builder()
            .field("/Event/Dst/Mdc", "TDstEvent/m_mdcTrackCol", Shape::fixed(0, Shape::Bool))
            .build()
            .unwrap_err();
        assert!(err.to_string().starts_with("/Event/Dst/Mdc: "));
        assert!(matches!(err.root_cause(), BesError::InvalidShape(..)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_round_trip() {
        let json = r#"[
            {"path": "/Event/Digi/FromMc", "column": "TDigiEvent/m_fromMc", "shape": {"kind": "bool"}}
        ]"#;
        let catalog = FieldCatalog::from_json(json).unwrap();
        assert_eq!(catalog.fields()[0].branch, "TDigiEvent");
        assert_eq!(FieldCatalog::from_json(&catalog.to_json().unwrap()).unwrap(), catalog);
    }
}
