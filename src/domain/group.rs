//! Applicant groups: delegations and single participants.
//!
//! Both kinds share rating, flag, disqualification, preferences and the
//! assigned seat; [`GroupKind`] carries what differs.

use std::{collections::BTreeSet, fmt};

use chrono::NaiveDate;
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};

use crate::domain::SeatRef;

/// Identifier of an applicant group (delegation or single participant).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Wraps an identifier.
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self(id)
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for GroupId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A natural person, always embedded in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// User id.
    pub id: String,
    /// Family name.
    pub family_name: String,
    /// Given name.
    pub given_name: String,
    /// Birthday, if known.
    pub birthday: Option<NaiveDate>,
}

/// A member of a delegation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Membership id, unique within the delegation.
    pub id: String,
    /// The delegation's contact person.
    pub is_head_delegate: bool,
    /// The member.
    pub person: Person,
}

/// Free-text application fields, carried over on split and conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    /// Why the group applied.
    pub motivation: Option<String>,
    /// School the group comes from.
    pub school: Option<String>,
    /// Earlier conferences attended.
    pub experience: Option<String>,
}

/// One ranked entry of a group's preference list. Lower rank is preferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    /// Position in the list, starting at 1.
    pub rank: u32,
    /// The seat wished for.
    pub seat: SeatRef,
}

/// The variant-specific part of an [`ApplicantGroup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKind {
    /// A team applying for a nation or non-state-actor seat.
    Delegation(Delegation),
    /// One person applying for an individual role.
    Single(SingleParticipant),
}

/// Delegation-specific fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegation {
    /// The people who would share the seat.
    pub members: NonEmpty<Member>,
    /// Informational only, never read by the solver.
    pub supervisors: Vec<Person>,
    /// The delegation this one was split off from.
    pub split_from: Option<GroupId>,
    /// Non-empty once the delegation has been superseded by a split.
    pub split_into: BTreeSet<GroupId>,
}

/// Single-participant fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleParticipant {
    /// The applicant.
    pub person: Person,
}

/// The unit being matched to a seat.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantGroup {
    /// Unique across delegations and single participants.
    pub id: GroupId,
    /// Free-text application fields.
    pub profile: Profile,
    /// Human rating, centred on the configured null rating.
    pub evaluation: Option<u32>,
    /// Marked by an evaluator; lowers every cost by the mark bonus.
    pub flagged: bool,
    /// Excluded from matching. Never holds a seat.
    pub disqualified: bool,
    /// The seat currently held.
    pub assigned: Option<SeatRef>,
    /// Ranked wishes, lowest rank first by convention.
    pub preferences: Vec<Preference>,
    /// Delegation or single participant.
    pub kind: GroupKind,
}

impl ApplicantGroup {
    /// Number of people in the group.
    #[must_use]
    pub fn headcount(&self) -> usize {
        match &self.kind {
            GroupKind::Delegation(delegation) => delegation.members.len(),
            GroupKind::Single(_) => 1,
        }
    }

    /// The rank this group gave `seat`, if it ranked it at all.
    #[must_use]
    pub fn rank_of(&self, seat: &SeatRef) -> Option<u32> {
        self.preferences
            .iter()
            .filter(|preference| &preference.seat == seat)
            .map(|preference| preference.rank)
            .min()
    }

    /// Whether the group takes part in matching and holds no seat.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !self.disqualified && self.assigned.is_none()
    }

    /// Whether the group can hold a seat of this kind.
    #[must_use]
    pub const fn accepts(&self, seat: &SeatRef) -> bool {
        match self.kind {
            GroupKind::Delegation(_) => seat.is_delegation_seat(),
            GroupKind::Single(_) => !seat.is_delegation_seat(),
        }
    }

    /// Delegation details, if this is a delegation.
    #[must_use]
    pub const fn as_delegation(&self) -> Option<&Delegation> {
        match &self.kind {
            GroupKind::Delegation(delegation) => Some(delegation),
            GroupKind::Single(_) => None,
        }
    }

    /// Single-participant details, if this is a single participant.
    #[must_use]
    pub const fn as_single(&self) -> Option<&SingleParticipant> {
        match &self.kind {
            GroupKind::Single(single) => Some(single),
            GroupKind::Delegation(_) => None,
        }
    }

    /// Whether this is a delegation.
    #[must_use]
    pub const fn is_delegation(&self) -> bool {
        matches!(self.kind, GroupKind::Delegation(_))
    }

    /// A short human readable label: the head delegate or the participant.
    #[must_use]
    pub fn label(&self) -> String {
        let person = match &self.kind {
            GroupKind::Delegation(delegation) => {
                &delegation
                    .members
                    .iter()
                    .find(|member| member.is_head_delegate)
                    .unwrap_or(delegation.members.first())
                    .person
            }
            GroupKind::Single(single) => &single.person,
        };
        format!("{} {}", person.given_name, person.family_name)
    }
}
