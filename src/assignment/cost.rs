//! Cost of seating a group, and the cost matrix of a bucket.

use crate::{
    assignment::{Bucket, CostMatrix},
    domain::{ApplicantGroup, GroupId, LookupError, Registry, SeatRef, WeightConfig},
};

/// The cost of giving `seat` to `group`. Lower is better.
///
/// A ranked seat costs its rank; an unranked one costs `-non_wish_malus`.
/// Flagged groups get `mark_bonus` off every seat, and a rating shifts every
/// seat by `(null_rating - evaluation) * rating_factor`.
#[must_use]
pub fn cost(weights: &WeightConfig, group: &ApplicantGroup, seat: &SeatRef) -> f64 {
    let mut cost = group
        .rank_of(seat)
        .map_or(-weights.non_wish_malus, f64::from);

    if group.flagged {
        cost -= weights.mark_bonus;
    }

    if let Some(evaluation) = group.evaluation {
        cost += (weights.null_rating - f64::from(evaluation)) * weights.rating_factor;
    }

    cost
}

/// A bucket's cost matrix together with its row and column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketMatrix {
    /// `groups.len() × seats.len()` costs.
    pub matrix: CostMatrix,
    /// Row labels.
    pub groups: Vec<GroupId>,
    /// Column labels.
    pub seats: Vec<SeatRef>,
}

impl BucketMatrix {
    /// Builds the matrix for `bucket`, keeping its row and column order.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Group`] if the bucket names a group that is not
    /// in the registry.
    pub fn build(
        registry: &Registry,
        weights: &WeightConfig,
        bucket: &Bucket,
    ) -> Result<Self, LookupError> {
        let mut matrix = CostMatrix::filled(bucket.groups.len(), bucket.seats.len(), 0.0);

        for (row, id) in bucket.groups.iter().enumerate() {
            let group = registry
                .group(id)
                .ok_or_else(|| LookupError::Group(id.clone()))?;
            for (col, seat) in bucket.seats.iter().enumerate() {
                matrix.set(row, col, cost(weights, group, seat));
            }
        }

        Ok(Self {
            matrix,
            groups: bucket.groups.clone(),
            seats: bucket.seats.clone(),
        })
    }
}
