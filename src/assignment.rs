//! Automatic seat assignment.
//!
//! Open groups are split into buckets of equal headcount
//! ([`bucket`]), every bucket is turned into a cost matrix ([`cost`]), and
//! the matrix is solved for a minimum-cost matching ([`hungarian`]). The
//! [`AutoAssign`] orchestration runs the buckets in a configurable order and
//! writes the result back into the registry.

mod auto;
pub use auto::{
    AssignmentReport, AutoAssign, BucketKind, BucketOutcome, Match, SizeOrder, solve_bucket,
};

/// Partitioning of open groups and seats by headcount.
pub mod bucket;
pub use bucket::{Bucket, Bucketer, SeatSelection};

/// Cost model.
pub mod cost;
pub use cost::BucketMatrix;

/// Minimum-cost bipartite matching.
pub mod hungarian;
pub use hungarian::CostMatrix;
