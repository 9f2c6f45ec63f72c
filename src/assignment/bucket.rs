//! Partitioning of open groups and seats by headcount.
//!
//! The solver needs a rectangular matrix, but delegations differ in size and
//! seats in remaining capacity. Groups are therefore solved one size at a
//! time: the bucket of size `n` pairs the open delegations of exactly `n`
//! members with the seats that still have room for `n` people.
//!
//! A seat with room for three also appears in the buckets for one and two.
//! Which size is solved first is decided by the caller (see
//! [`crate::assignment::SizeOrder`]); every bucket is computed from the
//! registry as it is at that moment.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{ApplicantGroup, GroupId, Registry, SeatKind, SeatRef};

/// Which delegation seat kinds take part in bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatSelection {
    /// Offer nation seats.
    pub nations: bool,
    /// Offer non-state-actor seats.
    pub non_state_actors: bool,
}

impl Default for SeatSelection {
    fn default() -> Self {
        Self {
            nations: true,
            non_state_actors: true,
        }
    }
}

impl SeatSelection {
    fn includes(self, seat: &SeatRef) -> bool {
        match seat.kind() {
            SeatKind::Nation => self.nations,
            SeatKind::NonStateActor => self.non_state_actors,
            SeatKind::IndividualRole => false,
        }
    }
}

/// The groups and seats of one solve.
///
/// Groups are ordered by id and seats by [`SeatRef`]; these orders become the
/// rows and columns of the cost matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Headcount shared by every group of the bucket.
    pub size: usize,
    /// Row order.
    pub groups: Vec<GroupId>,
    /// Column order. Individual roles may repeat, one column per unit.
    pub seats: Vec<SeatRef>,
}

impl Bucket {
    /// Whether there is no group to place.
    ///
    /// A bucket without seats is not empty: its groups are reported as
    /// unmatched.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Read-only bucketing view over a registry.
#[derive(Debug, Clone, Copy)]
pub struct Bucketer<'a> {
    registry: &'a Registry,
    selection: SeatSelection,
}

impl<'a> Bucketer<'a> {
    /// Buckets over every nation and non-state-actor seat.
    #[must_use]
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            selection: SeatSelection::default(),
        }
    }

    /// Restricts the seat kinds offered to delegations.
    #[must_use]
    pub const fn with_selection(mut self, selection: SeatSelection) -> Self {
        self.selection = selection;
        self
    }

    fn open_delegations(self) -> impl Iterator<Item = &'a ApplicantGroup> + 'a {
        Registry::unassigned_of(self.registry.active_delegations())
    }

    /// Open delegations with exactly `size` members, ordered by id.
    #[must_use]
    pub fn groups_of_size(&self, size: usize) -> Vec<GroupId> {
        let mut groups: Vec<GroupId> = self
            .open_delegations()
            .filter(|group| group.headcount() == size)
            .map(|group| group.id.clone())
            .collect();
        groups.sort();
        groups
    }

    /// Selected seats whose remaining capacity is at least `size`.
    #[must_use]
    pub fn seats_with_room(&self, size: usize) -> Vec<SeatRef> {
        self.registry
            .seats()
            .map(crate::domain::SeatCatalogEntry::seat_ref)
            .filter(|seat| self.selection.includes(seat))
            .filter(|seat| {
                self.registry
                    .remaining_capacity(seat)
                    .is_ok_and(|remaining| remaining.fits(size))
            })
            .collect()
    }

    /// Every open delegation, keyed by headcount.
    #[must_use]
    pub fn partition(&self) -> BTreeMap<usize, Vec<GroupId>> {
        let mut partition: BTreeMap<usize, Vec<GroupId>> = BTreeMap::new();
        for group in self.open_delegations() {
            partition
                .entry(group.headcount())
                .or_default()
                .push(group.id.clone());
        }
        for groups in partition.values_mut() {
            groups.sort();
        }
        partition
    }

    /// The distinct headcounts among open delegations.
    #[must_use]
    pub fn sizes(&self) -> BTreeSet<usize> {
        self.open_delegations().map(ApplicantGroup::headcount).collect()
    }

    /// The delegation bucket for `size`.
    #[must_use]
    pub fn bucket(&self, size: usize) -> Bucket {
        Bucket {
            size,
            groups: self.groups_of_size(size),
            seats: self.seats_with_room(size),
        }
    }

    /// Open single participants against the individual roles.
    ///
    /// Roles are unbounded, so each role contributes one column per open
    /// participant and every participant can get any role.
    #[must_use]
    pub fn singles(&self) -> Bucket {
        let mut groups: Vec<GroupId> = Registry::unassigned_of(self.registry.active_singles())
            .map(|group| group.id.clone())
            .collect();
        groups.sort();

        let seats = self
            .registry
            .seats()
            .map(crate::domain::SeatCatalogEntry::seat_ref)
            .filter(|seat| seat.kind() == SeatKind::IndividualRole)
            .flat_map(|seat| std::iter::repeat_n(seat, groups.len()))
            .collect();

        Bucket {
            size: 1,
            groups,
            seats,
        }
    }
}
