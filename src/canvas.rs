//! Query canvas - placed table instances and the relationships between them.
//!
//! The same catalog table may be placed several times; every placement is an
//! independent join participant with its own [`TableInstanceId`], handed out
//! in creation order. The canvas owns the [`RelationshipGraph`], so removing
//! a placement also drops every relationship drawn to its columns.

use crate::catalog::{Catalog, TableId};
use crate::relationship::{
    Endpoint, JoinKind, RelationshipError, RelationshipGraph, RelationshipId, TableInstanceId,
};

/// Error type for canvas operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanvasError {
    #[error("Unknown table instance: {0}")]
    UnknownInstance(TableInstanceId),

    #[error("Unknown column '{column}' on table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error(transparent)]
    Relationship(#[from] RelationshipError),
}

pub type CanvasResult<T> = Result<T, CanvasError>;

/// One placement of a catalog table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableInstance {
    pub id: TableInstanceId,
    pub table: TableId,
}

#[derive(Debug, Clone)]
pub struct Canvas<'a> {
    catalog: &'a Catalog,
    instances: Vec<TableInstance>,
    next_id: u32,
    graph: RelationshipGraph,
}

impl<'a> Canvas<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            instances: Vec::new(),
            next_id: 0,
            graph: RelationshipGraph::new(),
        }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Place a table, returning the new instance's identity.
    pub fn place_table(&mut self, table: TableId) -> TableInstanceId {
        let id = TableInstanceId(self.next_id);
        self.next_id += 1;
        self.instances.push(TableInstance { id, table });
        tracing::trace!(instance = %id, table = %self.catalog.full_name(table), "placed table");
        id
    }

    /// Remove a placement and every relationship touching its columns.
    pub fn remove_table(&mut self, instance: TableInstanceId) -> CanvasResult<TableInstance> {
        let index = self
            .instances
            .iter()
            .position(|placed| placed.id == instance)
            .ok_or(CanvasError::UnknownInstance(instance))?;
        let removed = self.instances.remove(index);

        let catalog = self.catalog;
        let dropped: usize = catalog
            .columns_of(removed.table)
            .map(|column| {
                self.graph
                    .remove_relationships_for_column(&Endpoint::new(instance, column))
            })
            .sum();
        tracing::debug!(%instance, dropped, "removed table instance");

        Ok(removed)
    }

    /// Placements in creation order.
    pub fn instances(&self) -> &[TableInstance] {
        &self.instances
    }

    pub fn instance(&self, id: TableInstanceId) -> CanvasResult<&TableInstance> {
        self.instances
            .iter()
            .find(|placed| placed.id == id)
            .ok_or(CanvasError::UnknownInstance(id))
    }

    /// Endpoint for a named column of a placed table.
    pub fn endpoint(&self, instance: TableInstanceId, column: &str) -> CanvasResult<Endpoint> {
        let placed = self.instance(instance)?;
        self.catalog
            .find_column(placed.table, column)
            .map(|col| Endpoint::new(instance, col))
            .ok_or_else(|| CanvasError::UnknownColumn {
                table: self.catalog.full_name(placed.table),
                column: column.to_string(),
            })
    }

    /// Draw a relationship between `a_column` of one instance and
    /// `b_column` of another.
    pub fn connect(
        &mut self,
        (a, a_column): (TableInstanceId, &str),
        (b, b_column): (TableInstanceId, &str),
        kind: JoinKind,
    ) -> CanvasResult<RelationshipId> {
        let a = self.endpoint(a, a_column)?;
        let b = self.endpoint(b, b_column)?;
        Ok(self.graph.add_relationship(a, b, kind)?)
    }

    pub fn graph(&self) -> &RelationshipGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut RelationshipGraph {
        &mut self.graph
    }

    /// Placed instances with no relationship; these are left out of FROM.
    pub fn unrelated_instances(&self) -> Vec<TableInstanceId> {
        let related = self.graph.instances();
        self.instances
            .iter()
            .map(|placed| placed.id)
            .filter(|id| !related.contains(id))
            .collect()
    }
}
