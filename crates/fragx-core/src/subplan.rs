//! # The Fragment Tree
//!
//! A `SubPlan` binds a fragment to the sub-plans that produce its remote-source
//! inputs, forming the stage tree of a distributed plan. The tree is built
//! bottom-up by the fragmenting planner, validated here, optionally rewritten
//! with updated partitioning metadata, and flattened into a fragment list for
//! the scheduler.
//!
//! ## Immutability and Sharing
//!
//! Sub-plans are immutable value objects. Fragments and child sub-plans sit
//! behind `Arc`, so `with_bucket_to_partition` can build a new tree that shares
//! every untouched subtree with the old one; holders of the old tree never
//! observe a change. Reads (`all_fragments`, `sanity_check`) are pure
//! traversals and safe to run concurrently on a shared tree.
//!
//! ## Validity
//!
//! `sanity_check` is the last line of defense before scheduling: it verifies,
//! for every node in the tree, that
//!
//! 1. the fragment identifiers referenced by the fragment's remote-source
//!    nodes are covered -- with multiplicity -- by the identifiers of the
//!    node's direct children (a dangling reference would misroute or deadlock
//!    the exchange at runtime);
//! 2. the fragment contains at most one table writer (two would double-write);
//! 3. a fragment containing a table writer is rooted at that writer, or at the
//!    output terminal when the whole plan was forced into a single fragment.
//!
//! The first violation aborts the check: a violation means the upstream
//! planner produced a broken plan, and the whole plan must be rejected.

use crate::fragment::PlanFragment;
use crate::plan::{NodeKind, PlanFragmentId, PlanNode};
use crate::traverse::depth_first_pre_order;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// A node of the fragment tree: one fragment plus the sub-plans producing its
/// remote-source inputs, in source order.
#[derive(Debug, Clone)]
pub struct SubPlan {
    fragment: Arc<PlanFragment>,
    children: Vec<Arc<SubPlan>>,
}

/// A structural-invariant violation found by [`SubPlan::sanity_check`].
///
/// All variants are unrecoverable: they indicate a bug in the planner that
/// built the tree, and the plan must not be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanityCheckError {
    /// A fragment's remote-source nodes reference upstream fragments that are
    /// not (or not often enough) among the node's direct children.
    #[error(
        "fragment {}: child fragments must include all remote source fragments (missing [{}] from children [{}])",
        .fragment,
        fmt_ids(.missing),
        fmt_ids(.children)
    )]
    UnmatchedRemoteSources {
        fragment: PlanFragmentId,
        /// Unsatisfied references, with multiplicity: an identifier appears
        /// here once per reference that no remaining child covers.
        missing: Vec<PlanFragmentId>,
        children: Vec<PlanFragmentId>,
    },
    /// A fragment's operator tree contains more than one table writer.
    #[error("fragment {fragment} contains {count} table writers, at most one is allowed")]
    MultipleTableWriters {
        fragment: PlanFragmentId,
        count: usize,
    },
    /// A fragment contains a table writer but is rooted at some other,
    /// non-output operator.
    #[error(
        "fragment {fragment} contains a table writer but is rooted at {root}; the root has to be the table writer or the output terminal"
    )]
    MisplacedTableWriter {
        fragment: PlanFragmentId,
        root: NodeKind,
    },
}

fn fmt_ids(ids: &[PlanFragmentId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl SubPlan {
    /// Bind a fragment to its child sub-plans. Child order is significant and
    /// preserved.
    pub fn new(fragment: PlanFragment, children: Vec<Arc<SubPlan>>) -> Self {
        Self {
            fragment: Arc::new(fragment),
            children,
        }
    }

    pub fn fragment(&self) -> &PlanFragment {
        &self.fragment
    }

    /// Child sub-plans in original order.
    pub fn children(&self) -> &[Arc<SubPlan>] {
        &self.children
    }

    /// Number of fragments in this tree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Flatten the tree into a fragment list: this node's fragment first, then
    /// each child's flattening, in child order. A pure projection -- no
    /// validation is performed.
    pub fn all_fragments(&self) -> Vec<Arc<PlanFragment>> {
        let mut fragments = Vec::new();
        self.collect_fragments(&mut fragments);
        fragments
    }

    fn collect_fragments(&self, out: &mut Vec<Arc<PlanFragment>>) {
        out.push(Arc::clone(&self.fragment));
        for child in &self.children {
            child.collect_fragments(out);
        }
    }

    /// New tree whose root fragment has its bucket-to-partition mapping
    /// replaced (`None` clears it). Children are shared with this tree,
    /// untouched; the mapping does not propagate to descendants.
    pub fn with_bucket_to_partition(&self, bucket_to_partition: Option<Vec<u32>>) -> SubPlan {
        SubPlan {
            fragment: Arc::new(self.fragment.with_bucket_to_partition(bucket_to_partition)),
            children: self.children.clone(),
        }
    }

    /// Verify the structural invariants for this node and every descendant,
    /// depth-first. Fails fast on the first violation.
    pub fn sanity_check(&self) -> Result<(), SanityCheckError> {
        trace!("sanity checking fragment {}", self.fragment.id());

        // Remote-source references anywhere in the operator tree, counted with
        // multiplicity.
        let mut remote_counts: HashMap<PlanFragmentId, usize> = HashMap::new();
        for node in self.fragment.remote_source_nodes() {
            if let Some(ids) = node.source_fragment_ids() {
                for &id in ids {
                    *remote_counts.entry(id).or_insert(0) += 1;
                }
            }
        }

        // Direct-child identifiers, also with multiplicity. Duplicate child
        // identifiers are not themselves an error; containment is all that is
        // checked.
        let mut child_counts: HashMap<PlanFragmentId, usize> = HashMap::new();
        for child in &self.children {
            *child_counts.entry(child.fragment.id()).or_insert(0) += 1;
        }

        let mut missing: Vec<PlanFragmentId> = Vec::new();
        for (&id, &referenced) in &remote_counts {
            let available = child_counts.get(&id).copied().unwrap_or(0);
            if available < referenced {
                missing.extend(std::iter::repeat(id).take(referenced - available));
            }
        }
        if !missing.is_empty() {
            missing.sort();
            return Err(SanityCheckError::UnmatchedRemoteSources {
                fragment: self.fragment.id(),
                missing,
                children: self.children.iter().map(|c| c.fragment.id()).collect(),
            });
        }

        let table_writers = depth_first_pre_order(self.fragment.root(), PlanNode::sources)
            .filter(|node| node.is_table_writer())
            .count();
        if table_writers > 1 {
            return Err(SanityCheckError::MultipleTableWriters {
                fragment: self.fragment.id(),
                count: table_writers,
            });
        }
        if table_writers == 1 {
            let root = self.fragment.root();
            // Root can be the output terminal when the whole plan was forced
            // into a single fragment.
            if !root.is_table_writer() && !root.is_output() {
                return Err(SanityCheckError::MisplacedTableWriter {
                    fragment: self.fragment.id(),
                    root: root.kind(),
                });
            }
        }

        for child in &self.children {
            child.sanity_check()?;
        }
        Ok(())
    }
}
