//! Catalog description parsing.
//!
//! The wire shape is a nested mapping:
//!
//! ```json
//! { "public": { "orders": [ { "name": "id", "pk": true }, ... ] } }
//! ```
//!
//! Schema and table order follow the document; column order is always the
//! order of the list.

use indexmap::IndexMap;
use serde::Deserialize;

use super::Catalog;

/// Error type for catalog parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("Malformed catalog: {0}")]
    Malformed(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Malformed(err.to_string())
    }
}

type RawCatalog = IndexMap<String, IndexMap<String, Vec<RawColumn>>>;

#[derive(Debug, Deserialize)]
struct RawColumn {
    name: String,
    #[serde(alias = "is_pk", alias = "isPrimaryKey")]
    pk: bool,
}

impl Catalog {
    /// Parse a catalog from its JSON description.
    ///
    /// Fails as a whole on any missing field or mistyped level; no partial
    /// catalog is ever returned.
    pub fn parse(raw: &str) -> CatalogResult<Self> {
        let raw: RawCatalog = serde_json::from_str(raw)?;
        Self::from_raw(raw)
    }

    /// Parse a catalog from an already decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> CatalogResult<Self> {
        let raw: RawCatalog = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawCatalog) -> CatalogResult<Self> {
        let mut catalog = Catalog::default();

        for (schema_name, tables) in raw {
            require_name(&schema_name, "schema")?;
            let schema = catalog.push_schema(schema_name);

            for (table_name, columns) in tables {
                require_name(&table_name, "table")?;
                let table = catalog.push_table(schema, table_name);

                for column in columns {
                    require_name(&column.name, "column")?;
                    catalog.push_column(table, column.name, column.pk);
                }
            }
        }

        tracing::debug!(
            schemas = catalog.schemas.len(),
            tables = catalog.tables.len(),
            columns = catalog.columns.len(),
            "parsed catalog"
        );

        Ok(catalog)
    }
}

fn require_name(name: &str, kind: &str) -> CatalogResult<()> {
    if name.trim().is_empty() {
        return Err(CatalogError::Malformed(format!("empty {} name", kind)));
    }
    Ok(())
}
