//! # Plan Fragments
//!
//! A `PlanFragment` is one stage of a distributed plan: a contiguous operator
//! sub-tree that will run together on a set of workers. Fragments are immutable
//! once built; the only update the planner performs -- installing a
//! bucket-to-partition mapping -- replaces the whole fragment.
//!
//! The fragment knows nothing about its position in the fragment tree. The
//! `subplan` module binds fragments into a tree and validates that every
//! remote-source read declared here is backed by a child stage.

use crate::partitioning::{PartitioningHandle, PartitioningScheme};
use crate::plan::{PlanFragmentId, PlanNode};
use crate::traverse::depth_first_pre_order;
use serde::{Deserialize, Serialize};

/// One stage of a distributed plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFragment {
    id: PlanFragmentId,
    root: PlanNode,
    partitioning: PartitioningHandle,
    partitioning_scheme: PartitioningScheme,
}

impl PlanFragment {
    pub fn new(
        id: PlanFragmentId,
        root: PlanNode,
        partitioning: PartitioningHandle,
        partitioning_scheme: PartitioningScheme,
    ) -> Self {
        Self {
            id,
            root,
            partitioning,
            partitioning_scheme,
        }
    }

    pub fn id(&self) -> PlanFragmentId {
        self.id
    }

    /// Root of this fragment's operator tree.
    pub fn root(&self) -> &PlanNode {
        &self.root
    }

    /// How this fragment's input is distributed across the workers running it.
    pub fn partitioning(&self) -> &PartitioningHandle {
        &self.partitioning
    }

    /// Output layout, including the bucket-to-partition mapping if set.
    pub fn partitioning_scheme(&self) -> &PartitioningScheme {
        &self.partitioning_scheme
    }

    /// Every remote-source node anywhere in this fragment's operator tree, in
    /// pre-order. Remote sources may appear nested under other operators, not
    /// just at the root.
    pub fn remote_source_nodes(&self) -> Vec<&PlanNode> {
        depth_first_pre_order(&self.root, PlanNode::sources)
            .filter(|node| node.source_fragment_ids().is_some())
            .collect()
    }

    /// New fragment identical to this one except for the output
    /// bucket-to-partition mapping. `None` clears it.
    pub fn with_bucket_to_partition(&self, bucket_to_partition: Option<Vec<u32>>) -> Self {
        Self {
            id: self.id,
            root: self.root.clone(),
            partitioning: self.partitioning.clone(),
            partitioning_scheme: self
                .partitioning_scheme
                .with_bucket_to_partition(bucket_to_partition),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{PlanNodeId, TableRef};

    fn scan(id: u32) -> PlanNode {
        PlanNode::TableScan {
            id: PlanNodeId(id),
            table: TableRef {
                schema: "tpch".into(),
                name: "orders".into(),
            },
            columns: vec![],
        }
    }

    fn remote(id: u32, fragments: &[u32]) -> PlanNode {
        PlanNode::RemoteSource {
            id: PlanNodeId(id),
            source_fragment_ids: fragments.iter().map(|&f| PlanFragmentId(f)).collect(),
        }
    }

    fn fragment(id: u32, root: PlanNode) -> PlanFragment {
        PlanFragment::new(
            PlanFragmentId(id),
            root,
            PartitioningHandle::Single,
            PartitioningScheme::new(PartitioningHandle::Single, vec![]),
        )
    }

    #[test]
    fn finds_remote_sources_nested_in_the_operator_tree() {
        // Join(RemoteSource[F1], Filter(RemoteSource[F2, F3]))
        let root = PlanNode::Join {
            id: PlanNodeId(0),
            left: Box::new(remote(1, &[1])),
            right: Box::new(PlanNode::Filter {
                id: PlanNodeId(2),
                source: Box::new(remote(3, &[2, 3])),
            }),
        };
        let f = fragment(0, root);
        let remotes = f.remote_source_nodes();
        assert_eq!(remotes.len(), 2);
        assert_eq!(remotes[0].source_fragment_ids().unwrap().len(), 1);
        assert_eq!(remotes[1].source_fragment_ids().unwrap().len(), 2);
    }

    #[test]
    fn leaf_fragment_has_no_remote_sources() {
        let f = fragment(1, scan(0));
        assert!(f.remote_source_nodes().is_empty());
    }

    #[test]
    fn with_bucket_to_partition_replaces_only_the_mapping() {
        let f = fragment(0, scan(0));
        let mapped = f.with_bucket_to_partition(Some(vec![0, 1, 0, 1]));
        assert_eq!(
            mapped.partitioning_scheme().bucket_to_partition,
            Some(vec![0, 1, 0, 1])
        );
        assert_eq!(mapped.id(), f.id());
        assert_eq!(mapped.root(), f.root());
        assert_eq!(f.partitioning_scheme().bucket_to_partition, None);

        let cleared = mapped.with_bucket_to_partition(None);
        assert_eq!(cleared, f);
    }
}
