//! # Output Partitioning Metadata
//!
//! Describes how a fragment's output is distributed to its consumers. The
//! scheduler uses this to route data between stages; the fragment model only
//! carries it and supports the one update the planner performs after
//! fragmentation: installing a bucket-to-partition mapping once the number of
//! downstream partitions is known.

use crate::plan::ColumnRef;
use serde::{Deserialize, Serialize};

/// How a fragment's output rows are distributed across consumers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitioningHandle {
    /// All output on a single node. Used for final aggregation and output.
    Single,
    /// Hash-partitioned on the given columns.
    Hash(Vec<ColumnRef>),
    /// Every row replicated to all consumers.
    Broadcast,
    /// Round-robin distribution for load balancing.
    RoundRobin,
    /// Distribution follows the source data layout (leaf fragments reading
    /// base tables).
    Source,
}

/// Output layout of a fragment: its partitioning, the columns it produces, and
/// the optional bucket-to-partition mapping used when output must be bucketed
/// for downstream consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitioningScheme {
    pub partitioning: PartitioningHandle,
    pub output_layout: Vec<ColumnRef>,
    /// Maps bucket number (index) to downstream partition number. Absent until
    /// the planner fixes the partition count for the downstream stage.
    pub bucket_to_partition: Option<Vec<u32>>,
}

impl PartitioningScheme {
    pub fn new(partitioning: PartitioningHandle, output_layout: Vec<ColumnRef>) -> Self {
        Self {
            partitioning,
            output_layout,
            bucket_to_partition: None,
        }
    }

    /// Copy of this scheme with the bucket-to-partition mapping replaced.
    /// `None` clears it.
    pub fn with_bucket_to_partition(&self, bucket_to_partition: Option<Vec<u32>>) -> Self {
        Self {
            partitioning: self.partitioning.clone(),
            output_layout: self.output_layout.clone(),
            bucket_to_partition,
        }
    }
}
