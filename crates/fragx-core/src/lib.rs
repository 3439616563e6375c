//! # fragx-core: Fragment-Tree Model for Distributed Query Plans
//!
//! This crate implements the stage graph of a distributed SQL query plan: the
//! representation of a query after it has been partitioned into fragments that
//! run on separate sets of workers and exchange data over the network, and the
//! structural checks that make the tree safe to hand to a scheduler.
//!
//! ## Module Overview
//!
//! - **`plan`**: Plan-node and fragment identifiers, and the operator tree
//!   (`PlanNode`) that each fragment owns. Operators expose their sources, a
//!   kind discriminant, and -- for remote sources -- the upstream fragment
//!   identifiers they read from.
//! - **`traverse`**: Generic, lazy pre-order depth-first traversal over any
//!   tree with a "direct children" accessor. Used to walk operator trees
//!   without knowing their shape.
//! - **`partitioning`**: Output partitioning metadata (`PartitioningHandle`,
//!   `PartitioningScheme`), including the bucket-to-partition mapping.
//! - **`fragment`**: The immutable `PlanFragment`: one stage of the plan, with
//!   its operator tree and partitioning metadata.
//! - **`subplan`**: The fragment tree itself (`SubPlan`): flattening for the
//!   scheduler, copy-on-write partitioning updates, and the recursive
//!   `sanity_check` invariant gate.
//!
//! What is *not* here: operator semantics, the planner that cuts plans into
//! fragments, cost estimation, scheduling, and execution. Those layers consume
//! this model; they do not live in it.

pub mod fragment;
pub mod partitioning;
pub mod plan;
pub mod subplan;
pub mod traverse;
