//! Relationship graph - user-drawn join conditions between table instances.
//!
//! A relationship connects one column of a placed table instance to one
//! column of another instance and carries a join kind. The graph keeps them
//! in insertion order; that order, together with the instance creation
//! order, fully determines the compiled join plan (see [`join_plan`]).

mod error;
pub mod join_plan;

pub use error::{JoinPlanError, JoinPlanResult, RelationshipError, RelationshipResult};
pub use join_plan::{JoinPlan, JoinStep};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::{Column, ColumnId, TableId};

/// Identity of one placement of a table on the canvas.
///
/// Instances compare in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TableInstanceId(pub u32);

impl fmt::Display for TableInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a relationship within its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RelationshipId(pub u64);

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// SQL join keyword emitted for a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinKind {
    #[default]
    #[serde(alias = "inner")]
    Inner,
    #[serde(alias = "left")]
    Left,
    #[serde(alias = "right")]
    Right,
}

impl JoinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
        }
    }

    /// Next kind in the INNER → LEFT → RIGHT → INNER rotation.
    pub fn cycle(self) -> Self {
        match self {
            JoinKind::Inner => JoinKind::Left,
            JoinKind::Left => JoinKind::Right,
            JoinKind::Right => JoinKind::Inner,
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INNER" => Ok(JoinKind::Inner),
            "LEFT" => Ok(JoinKind::Left),
            "RIGHT" => Ok(JoinKind::Right),
            other => Err(format!("unknown join kind '{}'", other)),
        }
    }
}

/// One side of a relationship: a column of a specific table instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Endpoint {
    pub instance: TableInstanceId,
    pub table: TableId,
    pub column: ColumnId,
}

impl Endpoint {
    /// Endpoint on `column` of a placed instance. Join plans must be compiled
    /// against the catalog `column` came from.
    pub fn new(instance: TableInstanceId, column: &Column) -> Self {
        Self {
            instance,
            table: column.table,
            column: column.id,
        }
    }
}

/// A join condition between columns of two distinct table instances.
///
/// Always canonical: `a.instance <= b.instance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub a: Endpoint,
    pub b: Endpoint,
    pub kind: JoinKind,
}

impl Relationship {
    /// True if either side is exactly this endpoint.
    pub fn touches(&self, endpoint: &Endpoint) -> bool {
        self.a == *endpoint || self.b == *endpoint
    }

    pub fn involves(&self, instance: TableInstanceId) -> bool {
        self.a.instance == instance || self.b.instance == instance
    }

    /// Same endpoints and kind, ignoring identity.
    pub fn is_equivalent(&self, other: &Relationship) -> bool {
        self.a == other.a && self.b == other.b && self.kind == other.kind
    }
}

/// The set of relationships drawn on a canvas.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    relationships: Vec<Relationship>,
    next_id: u64,
}

impl RelationshipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a relationship between two endpoints.
    ///
    /// Endpoints are reordered so the earlier-created instance is `a`; the
    /// order the user drew the connection in does not matter.
    pub fn add_relationship(
        &mut self,
        a: Endpoint,
        b: Endpoint,
        kind: JoinKind,
    ) -> RelationshipResult<RelationshipId> {
        if a.instance == b.instance {
            return Err(RelationshipError::SameInstance {
                instance: a.instance,
            });
        }

        let (a, b) = if a.instance > b.instance { (b, a) } else { (a, b) };
        let id = RelationshipId(self.next_id);
        self.next_id += 1;

        tracing::trace!(%id, a = %a.instance, b = %b.instance, %kind, "add relationship");
        self.relationships.push(Relationship { id, a, b, kind });
        Ok(id)
    }

    /// Add an INNER relationship.
    pub fn add_inner(&mut self, a: Endpoint, b: Endpoint) -> RelationshipResult<RelationshipId> {
        self.add_relationship(a, b, JoinKind::default())
    }

    /// Remove every relationship with this endpoint on either side.
    ///
    /// Returns the number of relationships removed.
    pub fn remove_relationships_for_column(&mut self, endpoint: &Endpoint) -> usize {
        let before = self.relationships.len();
        self.relationships.retain(|rel| !rel.touches(endpoint));
        before - self.relationships.len()
    }

    /// Remove exactly one relationship.
    pub fn remove_relationship(&mut self, id: RelationshipId) -> RelationshipResult<Relationship> {
        let index = self.index_of(id)?;
        Ok(self.relationships.remove(index))
    }

    /// Rotate the join kind of a relationship, returning the new kind.
    pub fn cycle_join_kind(&mut self, id: RelationshipId) -> RelationshipResult<JoinKind> {
        let index = self.index_of(id)?;
        let rel = &mut self.relationships[index];
        rel.kind = rel.kind.cycle();
        Ok(rel.kind)
    }

    pub fn set_join_kind(&mut self, id: RelationshipId, kind: JoinKind) -> RelationshipResult<()> {
        let index = self.index_of(id)?;
        self.relationships[index].kind = kind;
        Ok(())
    }

    pub fn get(&self, id: RelationshipId) -> Option<&Relationship> {
        self.relationships.iter().find(|rel| rel.id == id)
    }

    /// Relationships in insertion order.
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn relationships_touching(
        &self,
        instance: TableInstanceId,
    ) -> impl Iterator<Item = &Relationship> + '_ {
        self.relationships
            .iter()
            .filter(move |rel| rel.involves(instance))
    }

    /// Distinct instances touched by any relationship, in first-seen order.
    pub fn instances(&self) -> Vec<TableInstanceId> {
        join_plan::first_seen_instances(&self.relationships)
            .into_iter()
            .map(|(instance, _)| instance)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    fn index_of(&self, id: RelationshipId) -> RelationshipResult<usize> {
        self.relationships
            .iter()
            .position(|rel| rel.id == id)
            .ok_or(RelationshipError::UnknownRelationship(id))
    }
}
