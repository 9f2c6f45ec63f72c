//! In-memory working set of one loaded project.
//!
//! The [`Registry`] knows nothing about the project file. It holds the
//! applicant groups and the seat catalog and answers the read queries the
//! bucketer, the cost model and the evaluator need. Mutations live in
//! [`crate::domain::curation`].

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::domain::{
    ApplicantGroup, Capacity, GroupId, RemainingCapacity, SeatCatalogEntry, SeatRef,
};

/// The applicant groups and seat catalog of one project.
///
/// Groups are kept in insertion order so that saving a project preserves the
/// order of the snapshot it was loaded from:
/// - Groups: `Vec<ApplicantGroup>`
/// - Id lookup: `HashMap<GroupId, usize>` (position in the vector)
/// - Seats: `BTreeMap<SeatRef, SeatCatalogEntry>`
#[derive(Debug, Default, Clone)]
pub struct Registry {
    groups: Vec<ApplicantGroup>,
    index: HashMap<GroupId, usize>,
    seats: BTreeMap<SeatRef, SeatCatalogEntry>,
}

/// An operation referenced an id that is not in the registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    /// No group with this id.
    #[error("applicant group {0} not found")]
    Group(GroupId),
    /// No seat with this reference.
    #[error("seat {0} not found")]
    Seat(SeatRef),
}

impl Registry {
    /// Creates an empty registry over the given seat catalog.
    #[must_use]
    pub fn new(seats: BTreeMap<SeatRef, SeatCatalogEntry>) -> Self {
        Self {
            groups: Vec::new(),
            index: HashMap::new(),
            seats,
        }
    }

    /// Creates an empty registry with room for `capacity` groups.
    #[must_use]
    pub fn with_capacity(seats: BTreeMap<SeatRef, SeatCatalogEntry>, capacity: usize) -> Self {
        Self {
            groups: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            seats,
        }
    }

    /// Inserts a group at the end of the registry.
    ///
    /// # Panics
    ///
    /// Panics if a group with the same id already exists.
    pub fn insert(&mut self, group: ApplicantGroup) {
        assert!(
            !self.index.contains_key(&group.id),
            "Duplicate applicant group id: {}",
            group.id
        );
        self.index.insert(group.id.clone(), self.groups.len());
        self.groups.push(group);
    }

    /// Removes a group, returning it if it existed.
    pub(crate) fn remove(&mut self, id: &GroupId) -> Option<ApplicantGroup> {
        let position = self.index.remove(id)?;
        let group = self.groups.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(group)
    }

    /// Looks up a group by id.
    #[must_use]
    pub fn group(&self, id: &GroupId) -> Option<&ApplicantGroup> {
        self.index.get(id).map(|&position| &self.groups[position])
    }

    pub(crate) fn group_mut(&mut self, id: &GroupId) -> Result<&mut ApplicantGroup, LookupError> {
        let position = *self
            .index
            .get(id)
            .ok_or_else(|| LookupError::Group(id.clone()))?;
        Ok(&mut self.groups[position])
    }

    /// All groups, in insertion order.
    pub fn groups(&self) -> impl Iterator<Item = &ApplicantGroup> + '_ {
        self.groups.iter()
    }

    /// All delegations, disqualified ones included.
    pub fn delegations(&self) -> impl Iterator<Item = &ApplicantGroup> + '_ {
        self.groups.iter().filter(|group| group.is_delegation())
    }

    /// All single participants, disqualified ones included.
    pub fn singles(&self) -> impl Iterator<Item = &ApplicantGroup> + '_ {
        self.groups.iter().filter(|group| !group.is_delegation())
    }

    /// Delegations that have not been disqualified.
    pub fn active_delegations(&self) -> impl Iterator<Item = &ApplicantGroup> + '_ {
        self.delegations().filter(|group| !group.disqualified)
    }

    /// Single participants that have not been disqualified.
    pub fn active_singles(&self) -> impl Iterator<Item = &ApplicantGroup> + '_ {
        self.singles().filter(|group| !group.disqualified)
    }

    /// Disqualified groups, kept for audit.
    pub fn disqualified(&self) -> impl Iterator<Item = &ApplicantGroup> + '_ {
        self.groups.iter().filter(|group| group.disqualified)
    }

    /// Filters `groups` down to those without a seat.
    pub fn unassigned_of<'a>(
        groups: impl IntoIterator<Item = &'a ApplicantGroup>,
    ) -> impl Iterator<Item = &'a ApplicantGroup> {
        groups.into_iter().filter(|group| group.assigned.is_none())
    }

    /// Looks up a seat of the catalog.
    #[must_use]
    pub fn seat(&self, seat: &SeatRef) -> Option<&SeatCatalogEntry> {
        self.seats.get(seat)
    }

    /// The whole seat catalog, ordered by [`SeatRef`].
    pub fn seats(&self) -> impl Iterator<Item = &SeatCatalogEntry> + '_ {
        self.seats.values()
    }

    /// Non-disqualified groups currently holding `seat`.
    pub fn occupants<'a>(
        &'a self,
        seat: &'a SeatRef,
    ) -> impl Iterator<Item = &'a ApplicantGroup> + 'a {
        self.groups
            .iter()
            .filter(move |group| !group.disqualified && group.assigned.as_ref() == Some(seat))
    }

    /// Capacity minus the headcount of every active group holding `seat`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Seat`] if the seat is not in the catalog.
    pub fn remaining_capacity(&self, seat: &SeatRef) -> Result<RemainingCapacity, LookupError> {
        let entry = self
            .seats
            .get(seat)
            .ok_or_else(|| LookupError::Seat(seat.clone()))?;

        Ok(match entry.capacity() {
            Capacity::Limited(capacity) => {
                let taken: usize = self.occupants(seat).map(ApplicantGroup::headcount).sum();
                RemainingCapacity::Limited(
                    i64::from(capacity) - i64::try_from(taken).unwrap_or(i64::MAX),
                )
            }
            Capacity::Unbounded => RemainingCapacity::Unbounded,
        })
    }

    /// Seats holding more people than their capacity, with the (negative)
    /// remaining capacity.
    ///
    /// Assignments never enforce capacity, so this is how callers notice an
    /// overbooking.
    #[must_use]
    pub fn overbooked_seats(&self) -> Vec<(&SeatRef, i64)> {
        self.seats
            .keys()
            .filter_map(|seat| match self.remaining_capacity(seat) {
                Ok(RemainingCapacity::Limited(remaining)) if remaining < 0 => {
                    Some((seat, remaining))
                }
                _ => None,
            })
            .collect()
    }

    /// Number of groups in the registry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the registry holds no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
