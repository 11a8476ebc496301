//! Query documents - a serialized snapshot of a whole canvas.
//!
//! ```json
//! {
//!   "catalog": { "public": { "orders": [ { "name": "id", "pk": true } ] } },
//!   "tables": [ { "schema": "public", "table": "orders" } ],
//!   "relationships": [
//!     { "a": { "table": 0, "column": "id" }, "b": { "table": 1, "column": "order_id" }, "kind": "LEFT" }
//!   ],
//!   "columns": [ { "table": 0, "column": "id", "sort": "asc" } ],
//!   "totals": false
//! }
//! ```
//!
//! `table` fields index into `tables`, which are placed in listed order.

use serde::Deserialize;

use crate::canvas::{Canvas, CanvasError};
use crate::catalog::{Catalog, CatalogError};
use crate::column_spec::{Aggregate, ColumnSpec, SortDir};
use crate::compile::{ClauseBundle, CompileResult, QueryCompiler};
use crate::config::CompileSettings;
use crate::relationship::{JoinKind, TableInstanceId};

/// Error type for query documents.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to parse query document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Table not found in catalog: {schema}.{table}")]
    UnknownTable { schema: String, table: String },

    #[error("Placement {0} does not exist")]
    UnknownPlacement(usize),

    #[error(transparent)]
    Canvas(#[from] CanvasError),
}

pub type DocumentResult<T> = Result<T, DocumentError>;

#[derive(Debug, Clone, Deserialize)]
pub struct QueryDocument {
    /// Raw catalog description
    pub catalog: serde_json::Value,
    #[serde(default)]
    pub tables: Vec<Placement>,
    #[serde(default)]
    pub relationships: Vec<RelationshipEntry>,
    #[serde(default)]
    pub columns: Vec<ColumnEntry>,
    /// Overrides the configured totals mode
    #[serde(default)]
    pub totals: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Placement {
    pub schema: String,
    pub table: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnRef {
    /// Index into `tables`
    pub table: usize,
    pub column: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipEntry {
    pub a: ColumnRef,
    pub b: ColumnRef,
    #[serde(default)]
    pub kind: Option<JoinKind>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnEntry {
    pub table: usize,
    pub column: String,
    /// Display name; defaults to `schema.table.column`
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub aggregate: Option<Aggregate>,
    #[serde(default)]
    pub sort: SortDir,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub criteria: Vec<String>,
}

fn default_visible() -> bool {
    true
}

/// A document placed onto a canvas, ready to compile.
#[derive(Debug, Clone)]
pub struct LoadedQuery<'a> {
    pub canvas: Canvas<'a>,
    pub columns: Vec<ColumnSpec>,
    pub totals: bool,
}

impl LoadedQuery<'_> {
    pub fn compile(&self) -> CompileResult<ClauseBundle> {
        QueryCompiler::new(self.canvas.catalog())
            .with_totals(self.totals)
            .compile(&self.columns, self.canvas.graph())
    }
}

impl QueryDocument {
    pub fn from_json(raw: &str) -> DocumentResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Parse the embedded catalog.
    pub fn catalog(&self) -> DocumentResult<Catalog> {
        Ok(Catalog::from_value(self.catalog.clone())?)
    }

    /// Place the document's tables, relationships and columns onto a canvas
    /// over `catalog`.
    pub fn load<'a>(
        &self,
        catalog: &'a Catalog,
        defaults: &CompileSettings,
    ) -> DocumentResult<LoadedQuery<'a>> {
        let mut canvas = Canvas::new(catalog);

        let mut placed = Vec::with_capacity(self.tables.len());
        for placement in &self.tables {
            let table = catalog
                .find_table(&placement.schema, &placement.table)
                .ok_or_else(|| DocumentError::UnknownTable {
                    schema: placement.schema.clone(),
                    table: placement.table.clone(),
                })?;
            placed.push(canvas.place_table(table.id));
        }
        let instance = |index: usize| -> DocumentResult<TableInstanceId> {
            placed
                .get(index)
                .copied()
                .ok_or(DocumentError::UnknownPlacement(index))
        };

        for rel in &self.relationships {
            let a = (instance(rel.a.table)?, rel.a.column.as_str());
            let b = (instance(rel.b.table)?, rel.b.column.as_str());
            canvas.connect(a, b, rel.kind.unwrap_or(defaults.default_join_kind))?;
        }

        let mut columns = Vec::with_capacity(self.columns.len());
        for entry in &self.columns {
            let endpoint = canvas.endpoint(instance(entry.table)?, &entry.column)?;
            let mut spec = ColumnSpec::for_column(catalog, endpoint)
                .with_sort(entry.sort)
                .with_visible(entry.visible)
                .with_criteria(entry.criteria.iter().cloned());
            if let Some(aggregate) = entry.aggregate {
                spec = spec.with_aggregate(aggregate);
            }
            if let Some(name) = &entry.name {
                spec.display_name = name.clone();
            }
            columns.push(spec);
        }

        tracing::debug!(
            tables = placed.len(),
            relationships = canvas.graph().len(),
            columns = columns.len(),
            "loaded query document"
        );

        Ok(LoadedQuery {
            canvas,
            columns,
            totals: self.totals.unwrap_or(defaults.totals),
        })
    }
}
