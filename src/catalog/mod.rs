//! Schema catalog - schemas, tables and columns.
//!
//! The catalog is built once from a pre-fetched description and is read-only
//! afterwards. Tables and columns refer back to their owners through typed
//! indices into the catalog arena, so identity never depends on names (two
//! schemas may both have an `orders` table).

mod parse;

pub use parse::{CatalogError, CatalogResult};

use serde::Serialize;

/// Index of a schema within a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SchemaId(pub(crate) usize);

/// Index of a table within a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TableId(pub(crate) usize);

/// Index of a column within a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ColumnId(pub(crate) usize);

/// A database schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub id: SchemaId,
    pub name: String,
    /// Tables in catalog order
    pub tables: Vec<TableId>,
}

/// A table owned by a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    /// Owning schema
    pub schema: SchemaId,
    /// Columns in input order
    pub columns: Vec<ColumnId>,
}

/// A column owned by a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub is_pk: bool,
    /// Owning table
    pub table: TableId,
}

/// Immutable schema catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    schemas: Vec<Schema>,
    tables: Vec<Table>,
    columns: Vec<Column>,
}

impl Catalog {
    /// Schemas in catalog order.
    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    /// Every table across all schemas, in registration order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn schema(&self, id: SchemaId) -> &Schema {
        &self.schemas[id.0]
    }

    pub fn table(&self, id: TableId) -> &Table {
        &self.tables[id.0]
    }

    pub fn column(&self, id: ColumnId) -> &Column {
        &self.columns[id.0]
    }

    /// Checked form of [`Catalog::table`] for ids that may come from
    /// another catalog.
    pub fn get_table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(id.0)
    }

    pub fn get_column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.get(id.0)
    }

    /// Columns of a table in input order.
    pub fn columns_of(&self, table: TableId) -> impl Iterator<Item = &Column> + '_ {
        self.table(table).columns.iter().map(|id| self.column(*id))
    }

    pub fn find_schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    /// Look up a table by schema and table name.
    pub fn find_table(&self, schema: &str, table: &str) -> Option<&Table> {
        self.find_schema(schema)?
            .tables
            .iter()
            .map(|id| self.table(*id))
            .find(|t| t.name == table)
    }

    pub fn find_column(&self, table: TableId, name: &str) -> Option<&Column> {
        self.columns_of(table).find(|c| c.name == name)
    }

    /// Primary key columns of a table, in column order.
    pub fn primary_keys(&self, table: TableId) -> Vec<&Column> {
        self.columns_of(table).filter(|c| c.is_pk).collect()
    }

    /// `schema.table`, for display only.
    pub fn full_name(&self, table: TableId) -> String {
        let table = self.table(table);
        format!("{}.{}", self.schema(table.schema).name, table.name)
    }

    /// `schema.table.column`, the default display name of a picked column.
    pub fn column_path(&self, column: ColumnId) -> String {
        let column = self.column(column);
        format!("{}.{}", self.full_name(column.table), column.name)
    }

    fn push_schema(&mut self, name: String) -> SchemaId {
        let id = SchemaId(self.schemas.len());
        self.schemas.push(Schema {
            id,
            name,
            tables: Vec::new(),
        });
        id
    }

    fn push_table(&mut self, schema: SchemaId, name: String) -> TableId {
        let id = TableId(self.tables.len());
        self.tables.push(Table {
            id,
            name,
            schema,
            columns: Vec::new(),
        });
        self.schemas[schema.0].tables.push(id);
        id
    }

    fn push_column(&mut self, table: TableId, name: String, is_pk: bool) -> ColumnId {
        let id = ColumnId(self.columns.len());
        self.columns.push(Column {
            id,
            name,
            is_pk,
            table,
        });
        self.tables[table.0].columns.push(id);
        id
    }
}
