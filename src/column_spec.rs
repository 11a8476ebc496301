//! Per-column clause compilation.
//!
//! A [`ColumnSpec`] is the snapshot of one column in the query grid: its
//! display name, total (aggregate), sort, visibility and OR-criteria.
//! [`compile_column`] turns it into that column's select/order-by/group-by
//! and where contributions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::relationship::Endpoint;

/// The "Total" row of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    #[default]
    None,
    #[serde(rename = "group by", alias = "group-by", alias = "group_by")]
    GroupBy,
    Count,
    Avg,
    Max,
    Min,
    Stddev,
    Sum,
}

impl Aggregate {
    /// SQL function name, `None` for the non-aggregating totals.
    pub fn function(&self) -> Option<&'static str> {
        match self {
            Aggregate::None | Aggregate::GroupBy => None,
            Aggregate::Count => Some("count"),
            Aggregate::Avg => Some("avg"),
            Aggregate::Max => Some("max"),
            Aggregate::Min => Some("min"),
            Aggregate::Stddev => Some("stddev"),
            Aggregate::Sum => Some("sum"),
        }
    }
}

impl FromStr for Aggregate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Aggregate::None),
            "group by" | "group-by" | "group_by" => Ok(Aggregate::GroupBy),
            "count" => Ok(Aggregate::Count),
            "avg" => Ok(Aggregate::Avg),
            "max" => Ok(Aggregate::Max),
            "min" => Ok(Aggregate::Min),
            "stddev" => Ok(Aggregate::Stddev),
            "sum" => Ok(Aggregate::Sum),
            other => Err(format!("unknown aggregate '{}'", other)),
        }
    }
}

/// Sort direction of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    None,
    Asc,
    Desc,
}

impl SortDir {
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            SortDir::None => None,
            SortDir::Asc => Some("asc"),
            SortDir::Desc => Some("desc"),
        }
    }
}

impl FromStr for SortDir {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(SortDir::None),
            "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            other => Err(format!("unknown sort direction '{}'", other)),
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword().unwrap_or(""))
    }
}

/// Configuration of one column in the query grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// The picked column, if the spec came from the canvas
    pub column: Option<Endpoint>,
    pub display_name: String,
    pub aggregate: Aggregate,
    pub sort: SortDir,
    pub visible: bool,
    /// Raw filter values; blank entries are dropped on construction
    pub criteria: Vec<String>,
}

impl ColumnSpec {
    /// A visible, unsorted, unfiltered column with no total.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            column: None,
            display_name: display_name.into(),
            aggregate: Aggregate::None,
            sort: SortDir::None,
            visible: true,
            criteria: Vec::new(),
        }
    }

    /// The spec a freshly picked column starts with: `schema.table.column`,
    /// totalled by group-by.
    pub fn for_column(catalog: &Catalog, endpoint: Endpoint) -> Self {
        Self {
            column: Some(endpoint),
            aggregate: Aggregate::GroupBy,
            ..Self::new(catalog.column_path(endpoint.column))
        }
    }

    pub fn with_aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = aggregate;
        self
    }

    pub fn with_sort(mut self, sort: SortDir) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Replace the criteria, dropping blank values.
    pub fn with_criteria<I, S>(mut self, criteria: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.criteria = criteria
            .into_iter()
            .map(Into::into)
            .filter(|value: &String| !value.trim().is_empty())
            .collect();
        self
    }

    /// Name used in select/group-by/where: wrapped in the aggregate function
    /// when totals are on.
    pub fn effective_name(&self, totals_enabled: bool) -> String {
        match self.aggregate.function() {
            Some(function) if totals_enabled => format!("{}({})", function, self.display_name),
            _ => self.display_name.clone(),
        }
    }
}

/// One column's contribution to the clause bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnFragment {
    pub select: Option<String>,
    pub order_by: Option<String>,
    /// `x = v1 OR x = v2 ...`
    pub where_or: Option<String>,
    pub group_by: Option<String>,
}

/// Compile a column spec into its clause fragment.
///
/// With totals disabled the aggregate is ignored entirely, including
/// group-by, but stays on the spec.
pub fn compile_column(spec: &ColumnSpec, totals_enabled: bool) -> ColumnFragment {
    let name = spec.effective_name(totals_enabled);

    let order_by = spec
        .sort
        .keyword()
        .map(|dir| format!("{} {}", spec.display_name, dir));

    let group_by = (totals_enabled && spec.aggregate == Aggregate::GroupBy).then(|| name.clone());

    let terms: Vec<String> = spec
        .criteria
        .iter()
        .filter(|value| !value.trim().is_empty())
        .map(|value| format!("{} = {}", name, value))
        .collect();
    let where_or = (!terms.is_empty()).then(|| terms.join(" OR "));

    ColumnFragment {
        select: spec.visible.then_some(name),
        order_by,
        where_or,
        group_by,
    }
}
