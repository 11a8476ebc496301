//! Query compilation - canvas state to clause bundle.
//!
//! ```text
//! RelationshipGraph ──► join plan ──► from
//! ColumnSpec*       ──► fragments ──► select / where / group_by / order_by
//! ```
//!
//! # Example
//!
//! ```ignore
//! use querycanvas::compile::QueryCompiler;
//!
//! let compiler = QueryCompiler::new(&catalog).with_totals(true);
//! let bundle = compiler.compile(&specs, canvas.graph())?;
//! println!("{}", bundle.from);
//! ```

use serde::Serialize;

use crate::catalog::Catalog;
use crate::column_spec::{compile_column, ColumnSpec};
use crate::relationship::{JoinPlanError, RelationshipGraph};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during compilation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    JoinPlan(#[from] JoinPlanError),
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Result Types
// ============================================================================

/// Structured, not yet stringified SQL clauses.
///
/// `where_groups` holds one OR-group per filtered column. They are never
/// combined here; whoever renders the bundle to SQL text decides how the
/// groups compose (see [`crate::sql::WhereComposition`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClauseBundle {
    pub select: Vec<String>,
    pub from: String,
    #[serde(rename = "where")]
    pub where_groups: Vec<String>,
    pub group_by: Vec<String>,
    pub order_by: Vec<String>,
}

// ============================================================================
// Compiler
// ============================================================================

/// Compiles column specs and a relationship graph into a [`ClauseBundle`].
#[derive(Debug, Clone, Copy)]
pub struct QueryCompiler<'a> {
    catalog: &'a Catalog,
    totals_enabled: bool,
}

impl<'a> QueryCompiler<'a> {
    /// Create a compiler with totals disabled.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            totals_enabled: false,
        }
    }

    pub fn with_totals(mut self, enabled: bool) -> Self {
        self.totals_enabled = enabled;
        self
    }

    /// Flip the "show totals" mode. Column configuration is left as is.
    pub fn toggle_totals(&mut self) {
        self.totals_enabled = !self.totals_enabled;
    }

    pub fn totals_enabled(&self) -> bool {
        self.totals_enabled
    }

    /// Compile the query.
    ///
    /// Specs are processed in display order and every bundle list keeps that
    /// order. Fails when the graph has no relationships; single-table
    /// queries are not handled here.
    pub fn compile(
        &self,
        specs: &[ColumnSpec],
        graph: &RelationshipGraph,
    ) -> CompileResult<ClauseBundle> {
        let plan = graph.compile_join_plan(self.catalog)?;

        let mut bundle = ClauseBundle {
            from: plan.from,
            ..ClauseBundle::default()
        };

        for spec in specs {
            let fragment = compile_column(spec, self.totals_enabled);
            bundle.select.extend(fragment.select);
            bundle.order_by.extend(fragment.order_by);
            bundle.where_groups.extend(fragment.where_or);
            bundle.group_by.extend(fragment.group_by);
        }

        tracing::debug!(
            columns = specs.len(),
            totals = self.totals_enabled,
            select = bundle.select.len(),
            where_groups = bundle.where_groups.len(),
            "compiled clause bundle"
        );

        Ok(bundle)
    }
}

/// Compile in one call, without keeping a [`QueryCompiler`] around.
pub fn compile(
    catalog: &Catalog,
    specs: &[ColumnSpec],
    graph: &RelationshipGraph,
    totals_enabled: bool,
) -> CompileResult<ClauseBundle> {
    QueryCompiler::new(catalog)
        .with_totals(totals_enabled)
        .compile(specs, graph)
}
