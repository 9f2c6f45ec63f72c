//! Seats: references into the catalog and their capacities.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A reference to one entry of the seat catalog.
///
/// The ordering (kind first, then identifier) is the column order used when
/// building cost matrices.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeatRef {
    /// A nation, identified by its ISO 3166 alpha-3 code.
    Nation(String),
    /// A non-state actor, identified by its catalog id.
    NonStateActor(String),
    /// An individual role, identified by its catalog id.
    IndividualRole(String),
}

impl SeatRef {
    /// Returns the identifier without the kind.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Nation(code) => code,
            Self::NonStateActor(id) | Self::IndividualRole(id) => id,
        }
    }

    /// Whether this seat is taken by delegations (as opposed to single
    /// participants).
    #[must_use]
    pub const fn is_delegation_seat(&self) -> bool {
        matches!(self, Self::Nation(_) | Self::NonStateActor(_))
    }

    /// The kind of this seat.
    #[must_use]
    pub const fn kind(&self) -> SeatKind {
        match self {
            Self::Nation(_) => SeatKind::Nation,
            Self::NonStateActor(_) => SeatKind::NonStateActor,
            Self::IndividualRole(_) => SeatKind::IndividualRole,
        }
    }
}

impl fmt::Display for SeatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nation(code) => write!(f, "nation:{code}"),
            Self::NonStateActor(id) => write!(f, "nsa:{id}"),
            Self::IndividualRole(id) => write!(f, "role:{id}"),
        }
    }
}

/// The three kinds of seat in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeatKind {
    /// Nation seats, shared across committees.
    Nation,
    /// Non-state actor seats.
    NonStateActor,
    /// Individual roles for single participants.
    IndividualRole,
}

/// The nominal capacity of a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// At most this many people.
    Limited(u32),
    /// Every applicant needing the role can take it.
    Unbounded,
}

/// Capacity left on a seat after subtracting its current occupants.
///
/// A limited seat may be overbooked, in which case the value is negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingCapacity {
    /// People still fitting on the seat; negative when overbooked.
    Limited(i64),
    /// The seat never runs out.
    Unbounded,
}

impl RemainingCapacity {
    /// Whether a group of `headcount` people still fits.
    #[must_use]
    pub fn fits(self, headcount: usize) -> bool {
        match self {
            Self::Limited(remaining) => {
                i64::try_from(headcount).is_ok_and(|headcount| remaining >= headcount)
            }
            Self::Unbounded => true,
        }
    }

    /// Whether more people are assigned than the seat holds.
    #[must_use]
    pub const fn is_overbooked(self) -> bool {
        matches!(self, Self::Limited(remaining) if remaining < 0)
    }
}

impl fmt::Display for RemainingCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(remaining) => write!(f, "{remaining}"),
            Self::Unbounded => write!(f, "∞"),
        }
    }
}

/// An entry of the seat catalog, derived from the conference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatCatalogEntry {
    /// A nation sitting on one or more committees.
    Nation {
        /// Alpha-3 code.
        code: String,
        /// Sum of the per-delegation seats of every committee the nation sits
        /// on.
        capacity: u32,
        /// Abbreviations of those committees, for display.
        committees: Vec<String>,
    },
    /// A non-state actor with a fixed number of seats.
    NonStateActor {
        /// Catalog id.
        id: String,
        /// Display name.
        name: String,
        /// Number of seats.
        capacity: u32,
    },
    /// A role a single participant can take.
    IndividualRole {
        /// Catalog id.
        id: String,
        /// Display name.
        name: String,
    },
}

impl SeatCatalogEntry {
    /// The reference identifying this entry.
    #[must_use]
    pub fn seat_ref(&self) -> SeatRef {
        match self {
            Self::Nation { code, .. } => SeatRef::Nation(code.clone()),
            Self::NonStateActor { id, .. } => SeatRef::NonStateActor(id.clone()),
            Self::IndividualRole { id, .. } => SeatRef::IndividualRole(id.clone()),
        }
    }

    /// Nominal capacity.
    #[must_use]
    pub const fn capacity(&self) -> Capacity {
        match self {
            Self::Nation { capacity, .. } | Self::NonStateActor { capacity, .. } => {
                Capacity::Limited(*capacity)
            }
            Self::IndividualRole { .. } => Capacity::Unbounded,
        }
    }

    /// The headcount tier this seat belongs to.
    ///
    /// Nation and non-state-actor seats are tiered by capacity, individual
    /// roles always seat one person.
    #[must_use]
    pub const fn size_category(&self) -> u32 {
        match self.capacity() {
            Capacity::Limited(capacity) => capacity,
            Capacity::Unbounded => 1,
        }
    }
}
