//! Automatic assignment: bucket by size, solve, write back.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::instrument;

use crate::{
    assignment::{Bucket, BucketMatrix, Bucketer, SeatSelection, hungarian},
    domain::{CurationError, GroupId, Registry, SeatRef, WeightConfig},
};

/// The order in which delegation sizes are solved.
///
/// Earlier buckets consume capacity first, so the order matters whenever
/// seats are scarce.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SizeOrder {
    /// Biggest delegations first.
    #[default]
    LargestFirst,
    /// Smallest delegations first.
    SmallestFirst,
    /// Exactly these sizes, in this order. Unlisted sizes are skipped.
    Explicit(Vec<usize>),
}

impl SizeOrder {
    /// The sizes to solve, given the sizes present.
    #[must_use]
    pub fn arrange(&self, present: &BTreeSet<usize>) -> Vec<usize> {
        match self {
            Self::LargestFirst => present.iter().rev().copied().collect(),
            Self::SmallestFirst => present.iter().copied().collect(),
            Self::Explicit(sizes) => {
                let mut seen = BTreeSet::new();
                sizes
                    .iter()
                    .copied()
                    .filter(|size| seen.insert(*size))
                    .collect()
            }
        }
    }
}

/// What a bucket was made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BucketKind {
    /// Delegations against nations and non-state actors.
    Delegations,
    /// Single participants against individual roles.
    Singles,
}

/// One group placed by the solver.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// The group.
    pub group: GroupId,
    /// The seat it now holds.
    pub seat: SeatRef,
    /// The matrix cost of this pairing.
    pub cost: f64,
    /// The rank the group gave this seat, if any.
    pub rank: Option<u32>,
}

/// Outcome of one solved bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketOutcome {
    /// Delegations or singles.
    pub kind: BucketKind,
    /// Headcount of the bucket.
    pub size: usize,
    /// Groups that received a seat, in row order.
    pub matches: Vec<Match>,
    /// Groups left without a seat for lack of columns.
    pub unmatched: Vec<GroupId>,
}

impl BucketOutcome {
    /// Sum of the costs of the matches.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.matches.iter().map(|m| m.cost).sum()
    }
}

/// Summary of an automatic assignment run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentReport {
    /// One entry per solved bucket, in solving order.
    pub buckets: Vec<BucketOutcome>,
}

impl AssignmentReport {
    /// Every match across all buckets.
    pub fn matches(&self) -> impl Iterator<Item = &Match> + '_ {
        self.buckets.iter().flat_map(|bucket| bucket.matches.iter())
    }

    /// Every group left unmatched across all buckets.
    pub fn unmatched(&self) -> impl Iterator<Item = &GroupId> + '_ {
        self.buckets.iter().flat_map(|bucket| bucket.unmatched.iter())
    }

    /// Sum of the costs of every match.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.buckets.iter().map(BucketOutcome::total_cost).sum()
    }
}

/// Solves one bucket and assigns the matched seats.
///
/// Every match is checked against the registry before the first seat is
/// written, so a rejected bucket leaves the registry untouched.
///
/// # Errors
///
/// Fails if the bucket names a group or seat the registry does not know, or
/// pairs a group with a seat it cannot hold.
#[instrument(level = "debug", skip_all, fields(size = bucket.size, rows = bucket.groups.len(), cols = bucket.seats.len()))]
pub fn solve_bucket(
    registry: &mut Registry,
    weights: &WeightConfig,
    bucket: &Bucket,
    kind: BucketKind,
) -> Result<BucketOutcome, CurationError> {
    let built = BucketMatrix::build(registry, weights, bucket)?;
    let solution = hungarian::solve(&built.matrix);

    let mut matches = Vec::new();
    let mut unmatched = Vec::new();
    for (row, col) in solution.into_iter().enumerate() {
        let group = built.groups[row].clone();
        match col {
            Some(col) => {
                let seat = built.seats[col].clone();
                let rank = registry.group(&group).and_then(|g| g.rank_of(&seat));
                matches.push(Match {
                    group,
                    seat,
                    cost: built.matrix.get(row, col),
                    rank,
                });
            }
            None => unmatched.push(group),
        }
    }

    for m in &matches {
        registry.check_assignment(&m.group, &m.seat)?;
    }
    for m in &matches {
        registry.assign(&m.group, m.seat.clone())?;
        tracing::debug!("Assigned {} to {}", m.seat, m.group);
    }

    Ok(BucketOutcome {
        kind,
        size: bucket.size,
        matches,
        unmatched,
    })
}

/// Settings of an automatic assignment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoAssign {
    /// Order of the delegation buckets.
    pub order: SizeOrder,
    /// Seat kinds offered to delegations.
    pub seats: SeatSelection,
    /// Whether single participants are matched to roles afterwards.
    pub include_singles: bool,
}

impl Default for AutoAssign {
    fn default() -> Self {
        Self {
            order: SizeOrder::default(),
            seats: SeatSelection::default(),
            include_singles: true,
        }
    }
}

impl AutoAssign {
    /// Assigns every open group it can.
    ///
    /// Each delegation size is bucketed against the registry as left by the
    /// previous bucket, so a seat filled by a larger delegation is no longer
    /// offered to the smaller ones once it is full. Existing assignments are
    /// kept.
    ///
    /// # Errors
    ///
    /// See [`solve_bucket`].
    #[instrument(skip_all)]
    pub fn run(
        &self,
        registry: &mut Registry,
        weights: &WeightConfig,
    ) -> Result<AssignmentReport, CurationError> {
        let sizes = Bucketer::new(registry).sizes();
        let mut report = AssignmentReport::default();

        for size in self.order.arrange(&sizes) {
            let bucket = Bucketer::new(registry)
                .with_selection(self.seats)
                .bucket(size);
            if bucket.is_empty() {
                continue;
            }
            let outcome = solve_bucket(registry, weights, &bucket, BucketKind::Delegations)?;
            tracing::info!(
                "Size {size}: {} of {} delegations placed",
                outcome.matches.len(),
                bucket.groups.len()
            );
            report.buckets.push(outcome);
        }

        if self.include_singles {
            let bucket = Bucketer::new(registry).singles();
            if !bucket.is_empty() {
                let outcome = solve_bucket(registry, weights, &bucket, BucketKind::Singles)?;
                tracing::info!(
                    "{} of {} single participants placed",
                    outcome.matches.len(),
                    bucket.groups.len()
                );
                report.buckets.push(outcome);
            }
        }

        let unmatched = report.unmatched().count();
        if unmatched > 0 {
            tracing::warn!("{unmatched} groups could not be placed");
        }
        for (seat, remaining) in registry.overbooked_seats() {
            tracing::warn!("{seat} is overbooked by {}", -remaining);
        }

        Ok(report)
    }
}
