//! SQL text assembly for a [`ClauseBundle`].
//!
//! The compiler core leaves the where groups uncombined. Rendering is where
//! that choice is made, explicitly, through [`WhereComposition`]:
//!
//! ```text
//! where_groups = ["a = 1 OR a = 2", "b = 3"]
//! And  =>  WHERE (a = 1 OR a = 2) AND (b = 3)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::compile::ClauseBundle;

/// How the per-column OR-groups combine into one predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhereComposition {
    #[default]
    And,
    Or,
}

impl WhereComposition {
    fn connective(&self) -> &'static str {
        match self {
            WhereComposition::And => " AND ",
            WhereComposition::Or => " OR ",
        }
    }
}

/// Options for rendering a bundle as SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub where_composition: WhereComposition,
    /// One clause per line instead of a single line
    pub pretty: bool,
}

impl RenderOptions {
    pub fn with_where_composition(mut self, composition: WhereComposition) -> Self {
        self.where_composition = composition;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl ClauseBundle {
    /// Combined WHERE predicate, or `None` when no column is filtered.
    ///
    /// A single group is emitted as is; several groups are parenthesized so
    /// their ORs bind before the composition connective.
    pub fn where_predicate(&self, composition: WhereComposition) -> Option<String> {
        match self.where_groups.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            groups => Some(
                groups
                    .iter()
                    .map(|group| format!("({})", group))
                    .collect::<Vec<_>>()
                    .join(composition.connective()),
            ),
        }
    }

    /// Render the bundle as a SELECT statement.
    pub fn to_sql(&self, options: &RenderOptions) -> String {
        let mut clauses = Vec::with_capacity(5);

        // SELECT
        if self.select.is_empty() {
            clauses.push("SELECT *".to_string());
        } else {
            clauses.push(format!("SELECT {}", self.select.join(", ")));
        }

        // FROM
        clauses.push(format!("FROM {}", self.from.trim_end()));

        // WHERE
        if let Some(predicate) = self.where_predicate(options.where_composition) {
            clauses.push(format!("WHERE {}", predicate));
        }

        // GROUP BY
        if !self.group_by.is_empty() {
            clauses.push(format!("GROUP BY {}", self.group_by.join(", ")));
        }

        // ORDER BY
        if !self.order_by.is_empty() {
            clauses.push(format!("ORDER BY {}", self.order_by.join(", ")));
        }

        clauses.join(if options.pretty { "\n" } else { " " })
    }
}

impl fmt::Display for ClauseBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql(&RenderOptions::default()))
    }
}
