//! # Plan Identifiers and the Operator Tree
//!
//! This module defines the identifiers and operator-tree representation that the
//! fragment model is built on.
//!
//! ## Identifiers
//! `PlanFragmentId` identifies a fragment (stage) of a distributed plan; it is
//! stable for the lifetime of a query and is what remote-source operators use to
//! name the upstream stages they read from. `PlanNodeId` identifies a single
//! operator within a plan.
//!
//! ## The `PlanNode` Tree
//! Operators form a tree through their "sources" relation: every node owns its
//! input operators inline, so a fragment's whole operator tree hangs off its root
//! node with no back-references and no shared subtrees. The fragment model never
//! interprets operator semantics -- scheduling and execution live elsewhere -- it
//! only queries the shape of the tree (`sources`), the kind of a node
//! (`NodeKind`), and the upstream fragment identifiers declared by remote-source
//! nodes.
//!
//! ## Kind Discriminants
//! The `NodeKind` enum strips an operator down to its discriminant so that
//! callers can match on operator type without inspecting data fields. The
//! validity checks in `subplan` use the `is_table_writer` / `is_output`
//! predicates rather than matching variants directly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a single operator inside a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlanNodeId(pub u32);

impl fmt::Display for PlanNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a plan fragment (stage).
///
/// Remote-source operators reference upstream stages by this identifier, and the
/// fragment-tree validity check matches those references against the identifiers
/// of a node's direct children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlanFragmentId(pub u32);

impl fmt::Display for PlanFragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// Reference to a table in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Reference to a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub name: String,
    pub index: u32,
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A node in a fragment's operator tree.
///
/// Each variant owns its source (input) operators inline. The variants cover the
/// operator shapes the fragment model needs to distinguish; their runtime
/// semantics belong to the executor and are not modeled here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanNode {
    /// The final result-producing point of the whole plan. Appears at most once,
    /// in the root fragment.
    Output {
        id: PlanNodeId,
        columns: Vec<ColumnRef>,
        source: Box<PlanNode>,
    },
    /// Writes its input rows into a persistent table. At most one is permitted
    /// per fragment, and it must sit at the fragment root (see `subplan`).
    TableWriter {
        id: PlanNodeId,
        target: TableRef,
        source: Box<PlanNode>,
    },
    /// Reads the output of one or more upstream fragments over the network.
    /// This is a leaf of the operator tree; its inputs are other stages, not
    /// other operators, named by their fragment identifiers.
    RemoteSource {
        id: PlanNodeId,
        source_fragment_ids: Vec<PlanFragmentId>,
    },
    /// Reads rows from a base table. Always a leaf.
    TableScan {
        id: PlanNodeId,
        table: TableRef,
        columns: Vec<ColumnRef>,
    },
    /// Discards input rows that fail a predicate (predicate not modeled here).
    Filter {
        id: PlanNodeId,
        source: Box<PlanNode>,
    },
    /// Computes output columns from its input.
    Project {
        id: PlanNodeId,
        columns: Vec<ColumnRef>,
        source: Box<PlanNode>,
    },
    /// Combines two inputs; the left/right order is significant for positional
    /// matching downstream.
    Join {
        id: PlanNodeId,
        left: Box<PlanNode>,
        right: Box<PlanNode>,
    },
    /// Groups input rows and computes aggregates over each group.
    Aggregate {
        id: PlanNodeId,
        group_by: Vec<ColumnRef>,
        source: Box<PlanNode>,
    },
    /// Redistributes data between operators within a fragment (a local
    /// exchange; cross-fragment exchanges appear as `RemoteSource` on the
    /// consuming side).
    Exchange {
        id: PlanNodeId,
        sources: Vec<PlanNode>,
    },
    /// Produces a fixed set of rows. Always a leaf.
    Values {
        id: PlanNodeId,
        rows: u64,
    },
}

impl PlanNode {
    /// Identity of this operator.
    pub fn id(&self) -> PlanNodeId {
        match self {
            PlanNode::Output { id, .. }
            | PlanNode::TableWriter { id, .. }
            | PlanNode::RemoteSource { id, .. }
            | PlanNode::TableScan { id, .. }
            | PlanNode::Filter { id, .. }
            | PlanNode::Project { id, .. }
            | PlanNode::Join { id, .. }
            | PlanNode::Aggregate { id, .. }
            | PlanNode::Exchange { id, .. }
            | PlanNode::Values { id, .. } => *id,
        }
    }

    /// Direct source (input) operators of this node, in positional order.
    pub fn sources(&self) -> Vec<&PlanNode> {
        match self {
            PlanNode::Output { source, .. }
            | PlanNode::TableWriter { source, .. }
            | PlanNode::Filter { source, .. }
            | PlanNode::Project { source, .. }
            | PlanNode::Aggregate { source, .. } => vec![source],
            PlanNode::Join { left, right, .. } => vec![left, right],
            PlanNode::Exchange { sources, .. } => sources.iter().collect(),
            PlanNode::RemoteSource { .. }
            | PlanNode::TableScan { .. }
            | PlanNode::Values { .. } => vec![],
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            PlanNode::Output { .. } => NodeKind::Output,
            PlanNode::TableWriter { .. } => NodeKind::TableWriter,
            PlanNode::RemoteSource { .. } => NodeKind::RemoteSource,
            PlanNode::TableScan { .. } => NodeKind::TableScan,
            PlanNode::Filter { .. } => NodeKind::Filter,
            PlanNode::Project { .. } => NodeKind::Project,
            PlanNode::Join { .. } => NodeKind::Join,
            PlanNode::Aggregate { .. } => NodeKind::Aggregate,
            PlanNode::Exchange { .. } => NodeKind::Exchange,
            PlanNode::Values { .. } => NodeKind::Values,
        }
    }

    /// Whether this node mutates a persistent table.
    pub fn is_table_writer(&self) -> bool {
        matches!(self, PlanNode::TableWriter { .. })
    }

    /// Whether this node is the output terminal of the whole plan.
    pub fn is_output(&self) -> bool {
        matches!(self, PlanNode::Output { .. })
    }

    /// Upstream fragment identifiers declared by this node, if it is a
    /// remote source. Multiplicity is preserved: the same identifier may be
    /// listed more than once.
    pub fn source_fragment_ids(&self) -> Option<&[PlanFragmentId]> {
        match self {
            PlanNode::RemoteSource {
                source_fragment_ids,
                ..
            } => Some(source_fragment_ids),
            _ => None,
        }
    }
}

/// Kind discriminant for matching on operator type without data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Output,
    TableWriter,
    RemoteSource,
    TableScan,
    Filter,
    Project,
    Join,
    Aggregate,
    Exchange,
    Values,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Output => "Output",
            NodeKind::TableWriter => "TableWriter",
            NodeKind::RemoteSource => "RemoteSource",
            NodeKind::TableScan => "TableScan",
            NodeKind::Filter => "Filter",
            NodeKind::Project => "Project",
            NodeKind::Join => "Join",
            NodeKind::Aggregate => "Aggregate",
            NodeKind::Exchange => "Exchange",
            NodeKind::Values => "Values",
        };
        write!(f, "{}", name)
    }
}
