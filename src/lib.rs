//! # querycanvas
//!
//! Compiles a visually assembled query (placed tables, drawn relationships,
//! configured columns) into the structural parts of a SQL statement.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │          Catalog description (schema → table → cols)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [catalog]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Canvas: placed table instances + RelationshipGraph     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compile]
//! ┌─────────────────────────────────────────────────────────┐
//! │   ClauseBundle { select, from, where, group_by, ... }    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    SQL text                              │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod canvas;
pub mod catalog;
pub mod column_spec;
pub mod compile;
pub mod config;
pub mod document;
pub mod relationship;
pub mod sql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::canvas::{Canvas, TableInstance};
    pub use crate::catalog::{Catalog, CatalogError, Column, ColumnId, Schema, Table, TableId};
    pub use crate::column_spec::{compile_column, Aggregate, ColumnFragment, ColumnSpec, SortDir};
    pub use crate::compile::{ClauseBundle, CompileError, QueryCompiler};
    pub use crate::relationship::{
        Endpoint, JoinKind, JoinPlan, JoinPlanError, Relationship, RelationshipError,
        RelationshipGraph, RelationshipId, TableInstanceId,
    };
    pub use crate::sql::{RenderOptions, WhereComposition};
}

pub use catalog::Catalog;
pub use compile::{ClauseBundle, QueryCompiler};
pub use relationship::RelationshipGraph;
