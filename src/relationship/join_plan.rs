//! Join plan compilation.
//!
//! Turns the unordered set of binary relationships into one FROM fragment:
//!
//! 1. Collect the instances touched by any relationship, first-seen order.
//! 2. Build an instance graph with one edge per related pair.
//! 3. Linearize it with a three-color depth-first walk (post-order, reversed).
//! 4. Seed FROM with the first instance's table, then emit one JOIN segment
//!    per later instance, carrying every relationship that becomes fully
//!    available at that step.
//!
//! The relationship graph is undirected and may contain cycles, so step 3 is
//! a linearization heuristic rather than a topological sort: back edges are
//! simply skipped. Edges are recorded from each relationship's `a` instance
//! to its `b` instance and the walk follows them that way only. When that
//! order reaches an instance with no relationship to anything before it, the
//! walk is redone over edges in both directions, which puts the DFS parent
//! of every instance before it.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;

use super::{
    Endpoint, JoinKind, JoinPlanError, JoinPlanResult, Relationship, RelationshipGraph, TableInstanceId,
};
use crate::catalog::{Catalog, TableId};

/// One `<kind> JOIN <table> ON <conditions>` segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinStep {
    pub instance: TableInstanceId,
    pub table: String,
    /// Kind of the first relationship attributed to this step
    pub kind: JoinKind,
    /// `a_column = b_column`, one per relationship, in scan order
    pub conditions: Vec<String>,
}

impl JoinStep {
    fn render(&self) -> String {
        format!(
            "{} JOIN {} ON {} ",
            self.kind,
            self.table,
            self.conditions.join(" AND ")
        )
    }
}

/// The compiled join graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinPlan {
    /// Linearized instance order; the first one seeds FROM
    pub order: Vec<TableInstanceId>,
    /// Bare table name of the first instance
    pub seed: String,
    pub steps: Vec<JoinStep>,
    /// Seed followed by every step, each terminated by a single space
    pub from: String,
}

/// Color marks for the depth-first walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

impl RelationshipGraph {
    /// Compile the relationships into an ordered join plan.
    ///
    /// Instances without any relationship never appear in the plan. The
    /// graph itself is left untouched.
    pub fn compile_join_plan(&self, catalog: &Catalog) -> JoinPlanResult<JoinPlan> {
        let relationships = self.relationships();
        if relationships.is_empty() {
            return Err(JoinPlanError::EmptyGraph);
        }
        if let Some(rel) = relationships
            .iter()
            .find(|rel| !resolves(catalog, &rel.a) || !resolves(catalog, &rel.b))
        {
            return Err(JoinPlanError::ForeignEndpoint {
                relationship: rel.id,
            });
        }

        let tables = first_seen_instances(relationships);
        let table_of: HashMap<TableInstanceId, TableId> = tables.iter().copied().collect();

        let order = linearize(&tables, relationships, Walk::Forward);
        tracing::debug!(?order, relationships = relationships.len(), "linearized join order");

        let plan = match assemble(catalog, relationships, &table_of, order) {
            Err(JoinPlanError::Disconnected { instance, .. }) => {
                let undirected = linearize(&tables, relationships, Walk::Both);
                tracing::debug!(
                    stuck_at = %instance,
                    order = ?undirected,
                    "forward order cannot join every table, walking both directions"
                );
                assemble(catalog, relationships, &table_of, undirected)?
            }
            result => result?,
        };
        tracing::debug!(from = %plan.from, "compiled join plan");

        Ok(plan)
    }
}

/// The endpoint's column exists in `catalog` and sits on the endpoint's table.
fn resolves(catalog: &Catalog, endpoint: &Endpoint) -> bool {
    catalog
        .get_column(endpoint.column)
        .is_some_and(|column| column.table == endpoint.table)
}

/// Which way the linearization walk may follow a recorded edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    /// `a` to `b` only
    Forward,
    Both,
}

/// Seed FROM with the first instance of `order` and attribute every
/// relationship to the step of its later instance.
fn assemble(
    catalog: &Catalog,
    relationships: &[Relationship],
    table_of: &HashMap<TableInstanceId, TableId>,
    order: Vec<TableInstanceId>,
) -> JoinPlanResult<JoinPlan> {
    let position: HashMap<TableInstanceId, usize> = order
        .iter()
        .enumerate()
        .map(|(i, instance)| (*instance, i))
        .collect();

    // Working copy; sort_by_key is stable, so ties keep insertion order.
    let mut pending: Vec<&Relationship> = relationships.iter().collect();
    pending.sort_by_key(|rel| position[&rel.a.instance].max(position[&rel.b.instance]));

    let seed = catalog.table(table_of[&order[0]]).name.clone();
    let mut included: HashSet<TableInstanceId> = HashSet::from([order[0]]);
    let mut steps = Vec::with_capacity(order.len() - 1);

    for &instance in &order[1..] {
        included.insert(instance);
        let table = catalog.table(table_of[&instance]).name.clone();

        let (ready, rest): (Vec<&Relationship>, Vec<&Relationship>) =
            pending.into_iter().partition(|rel| {
                included.contains(&rel.a.instance) && included.contains(&rel.b.instance)
            });
        pending = rest;

        let Some(first) = ready.first() else {
            return Err(JoinPlanError::Disconnected { table, instance });
        };

        steps.push(JoinStep {
            instance,
            table,
            kind: first.kind,
            conditions: ready
                .iter()
                .map(|rel| {
                    format!(
                        "{} = {}",
                        catalog.column(rel.a.column).name,
                        catalog.column(rel.b.column).name
                    )
                })
                .collect(),
        });
    }

    let mut from = format!("{} ", seed);
    for step in &steps {
        from.push_str(&step.render());
    }

    Ok(JoinPlan {
        order,
        seed,
        steps,
        from,
    })
}

/// Distinct instances (with their table) in the order relationships first
/// mention them, `a` before `b`.
pub(crate) fn first_seen_instances(
    relationships: &[Relationship],
) -> Vec<(TableInstanceId, TableId)> {
    let mut seen = HashSet::new();
    let mut tables = Vec::new();
    for rel in relationships {
        for endpoint in [&rel.a, &rel.b] {
            if seen.insert(endpoint.instance) {
                tables.push((endpoint.instance, endpoint.table));
            }
        }
    }
    tables
}

/// Depth-first post-order over the instance graph, reversed.
fn linearize(
    tables: &[(TableInstanceId, TableId)],
    relationships: &[Relationship],
    walk: Walk,
) -> Vec<TableInstanceId> {
    let mut graph: DiGraph<TableInstanceId, ()> =
        DiGraph::with_capacity(tables.len(), relationships.len());
    let nodes: HashMap<TableInstanceId, NodeIndex> = tables
        .iter()
        .map(|(instance, _)| (*instance, graph.add_node(*instance)))
        .collect();

    for rel in relationships {
        let (a, b) = (nodes[&rel.a.instance], nodes[&rel.b.instance]);
        if graph.find_edge(a, b).is_none() {
            graph.add_edge(a, b, ());
        }
    }

    // Neighbours in edge insertion order.
    let adjacency: Vec<Vec<NodeIndex>> = graph
        .node_indices()
        .map(|node| {
            let mut edges: Vec<_> = graph
                .edges_directed(node, Direction::Outgoing)
                .map(|e| (e.id(), e.target()))
                .collect();
            if walk == Walk::Both {
                edges.extend(
                    graph
                        .edges_directed(node, Direction::Incoming)
                        .map(|e| (e.id(), e.source())),
                );
            }
            edges.sort_by_key(|(id, _)| *id);
            edges.into_iter().map(|(_, other)| other).collect()
        })
        .collect();

    let mut marks = vec![Mark::Unvisited; graph.node_count()];
    let mut linked = Vec::with_capacity(graph.node_count());
    for node in graph.node_indices() {
        if marks[node.index()] == Mark::Unvisited {
            visit(node, &adjacency, &mut marks, &mut linked);
        }
    }

    linked.reverse();
    linked.into_iter().map(|node| graph[node]).collect()
}

fn visit(
    node: NodeIndex,
    adjacency: &[Vec<NodeIndex>],
    marks: &mut [Mark],
    linked: &mut Vec<NodeIndex>,
) {
    marks[node.index()] = Mark::InProgress;
    for &next in &adjacency[node.index()] {
        if marks[next.index()] == Mark::Unvisited {
            visit(next, adjacency, marks, linked);
        }
    }
    marks[node.index()] = Mark::Done;
    linked.push(node);
}
