//! Error types for the relationship graph and join planning.

use super::{RelationshipId, TableInstanceId};

/// Errors raised while editing the relationship graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelationshipError {
    /// Both endpoints sit on the same table instance. Joining a table to
    /// itself needs two placements.
    #[error("Invalid relationship: both columns belong to table instance {instance}")]
    SameInstance { instance: TableInstanceId },

    #[error("Unknown relationship: {0}")]
    UnknownRelationship(RelationshipId),
}

pub type RelationshipResult<T> = Result<T, RelationshipError>;

/// Errors raised while compiling the join plan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinPlanError {
    #[error("Cannot build a join plan: no relationships defined")]
    EmptyGraph,

    /// The instance is not related, directly or transitively, to any table
    /// placed before it in the join order.
    #[error("Table '{table}' (instance {instance}) is not connected to the rest of the join graph")]
    Disconnected {
        table: String,
        instance: TableInstanceId,
    },

    /// An endpoint's column does not exist in the catalog the plan is
    /// compiled against, or belongs to another table there.
    #[error("Relationship {relationship} refers to a column outside this catalog")]
    ForeignEndpoint { relationship: RelationshipId },
}

pub type JoinPlanResult<T> = Result<T, JoinPlanError>;
