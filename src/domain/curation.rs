//! Evaluator actions on the registry.
//!
//! Every group moves through the same small state machine:
//!
//! ```text
//! Unassigned ──assign──▶ Assigned ──unassign──▶ Unassigned
//!      │                    │
//!      └──── disqualify ────┴──▶ Disqualified (seat released)
//! ```
//!
//! Capacity is never checked here. Overbooking is allowed and reported by
//! [`Registry::overbooked_seats`].

use std::collections::BTreeSet;

use nonempty::NonEmpty;
use thiserror::Error;
use tracing::instrument;

use crate::domain::{
    ApplicantGroup, Delegation, GroupId, GroupKind, Member, SeatRef,
    registry::{LookupError, Registry},
};

/// Errors raised by curation operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurationError {
    /// A group or seat id does not exist.
    #[error(transparent)]
    Lookup(#[from] LookupError),
    /// The seat kind cannot be held by this kind of group.
    #[error("{seat} cannot be assigned to {group}")]
    SeatKindMismatch {
        /// The group being assigned.
        group: GroupId,
        /// The offending seat.
        seat: SeatRef,
    },
    /// Disqualified groups take no further part in matching.
    #[error("applicant group {0} is disqualified")]
    Disqualified(GroupId),
    /// Only delegations can be split.
    #[error("applicant group {0} is not a delegation")]
    NotADelegation(GroupId),
    /// Only single participants can be converted.
    #[error("applicant group {0} is not a single participant")]
    NotASingle(GroupId),
    /// A delegation is split at most once.
    #[error("delegation {0} has already been split")]
    AlreadySplit(GroupId),
    /// A split bucket names a member the delegation does not have.
    #[error("delegation {group} has no member {member}")]
    UnknownMember {
        /// The delegation being split.
        group: GroupId,
        /// The missing member id.
        member: String,
    },
    /// A split needs at least one bucket, and every bucket needs a member.
    #[error("split of delegation {0} has an empty bucket")]
    EmptyBucket(GroupId),
}

impl Registry {
    /// Sets the rating of a group. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`CurationError::Lookup`] if the group does not exist.
    pub fn evaluate(&mut self, id: &GroupId, score: u32) -> Result<(), CurationError> {
        self.group_mut(id)?.evaluation = Some(score);
        Ok(())
    }

    /// Clears the rating of a group. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`CurationError::Lookup`] if the group does not exist.
    pub fn clear_evaluation(&mut self, id: &GroupId) -> Result<(), CurationError> {
        self.group_mut(id)?.evaluation = None;
        Ok(())
    }

    /// Flips the flag of a group, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns [`CurationError::Lookup`] if the group does not exist.
    pub fn toggle_flag(&mut self, id: &GroupId) -> Result<bool, CurationError> {
        let group = self.group_mut(id)?;
        group.flagged = !group.flagged;
        Ok(group.flagged)
    }

    /// Flips disqualification, returning the new value.
    ///
    /// Disqualifying an assigned group releases its seat in the same step.
    /// Requalifying leaves the group unassigned.
    ///
    /// # Errors
    ///
    /// Returns [`CurationError::Lookup`] if the group does not exist.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle_disqualify(&mut self, id: &GroupId) -> Result<bool, CurationError> {
        let group = self.group_mut(id)?;
        group.disqualified = !group.disqualified;
        if group.disqualified {
            if let Some(seat) = group.assigned.take() {
                tracing::info!("Released {seat} held by disqualified group {id}");
            }
        }
        Ok(group.disqualified)
    }

    /// Checks that [`Registry::assign`] would accept this pairing, without
    /// writing anything.
    ///
    /// # Errors
    ///
    /// Fails if the group or seat does not exist, if the group is
    /// disqualified, or if the seat kind does not fit the group kind.
    pub fn check_assignment(&self, id: &GroupId, seat: &SeatRef) -> Result<(), CurationError> {
        if self.seat(seat).is_none() {
            return Err(LookupError::Seat(seat.clone()).into());
        }
        let group = self
            .group(id)
            .ok_or_else(|| LookupError::Group(id.clone()))?;
        if group.disqualified {
            return Err(CurationError::Disqualified(id.clone()));
        }
        if !group.accepts(seat) {
            return Err(CurationError::SeatKindMismatch {
                group: id.clone(),
                seat: seat.clone(),
            });
        }
        Ok(())
    }

    /// Assigns a seat to a group, replacing any previous assignment.
    ///
    /// Capacity is not checked.
    ///
    /// # Errors
    ///
    /// See [`Registry::check_assignment`].
    #[instrument(level = "debug", skip(self))]
    pub fn assign(&mut self, id: &GroupId, seat: SeatRef) -> Result<(), CurationError> {
        self.check_assignment(id, &seat)?;
        self.group_mut(id)?.assigned = Some(seat);
        Ok(())
    }

    /// Assigns a nation to a delegation.
    ///
    /// # Errors
    ///
    /// See [`Registry::assign`].
    pub fn assign_nation(&mut self, id: &GroupId, alpha3_code: &str) -> Result<(), CurationError> {
        self.assign(id, SeatRef::Nation(alpha3_code.to_string()))
    }

    /// Assigns a non-state actor to a delegation.
    ///
    /// # Errors
    ///
    /// See [`Registry::assign`].
    pub fn assign_non_state_actor(
        &mut self,
        id: &GroupId,
        actor_id: &str,
    ) -> Result<(), CurationError> {
        self.assign(id, SeatRef::NonStateActor(actor_id.to_string()))
    }

    /// Assigns an individual role to a single participant.
    ///
    /// # Errors
    ///
    /// See [`Registry::assign`].
    pub fn assign_role(&mut self, id: &GroupId, role_id: &str) -> Result<(), CurationError> {
        self.assign(id, SeatRef::IndividualRole(role_id.to_string()))
    }

    /// Clears the assignment of a group, returning the released seat.
    ///
    /// # Errors
    ///
    /// Returns [`CurationError::Lookup`] if the group does not exist.
    pub fn unassign(&mut self, id: &GroupId) -> Result<Option<SeatRef>, CurationError> {
        Ok(self.group_mut(id)?.assigned.take())
    }

    /// Unassigns every group whose seat belongs to the `headcount` size tier.
    ///
    /// Returns the ids of the groups that were unassigned.
    #[instrument(skip(self))]
    pub fn reset_by_seat_size(&mut self, headcount: u32) -> Vec<GroupId> {
        let affected: Vec<GroupId> = self
            .groups()
            .filter(|group| {
                group
                    .assigned
                    .as_ref()
                    .and_then(|seat| self.seat(seat))
                    .is_some_and(|entry| entry.size_category() == headcount)
            })
            .map(|group| group.id.clone())
            .collect();

        for id in &affected {
            if let Ok(group) = self.group_mut(id) {
                group.assigned = None;
            }
        }

        tracing::info!("Reset {} assignments of size {headcount}", affected.len());
        affected
    }

    /// Splits a delegation into one new delegation per bucket of member ids.
    ///
    /// The children inherit the parent's free text and supervisors and start
    /// without preferences, rating, flag or seat. The parent is disqualified
    /// and remembers its children.
    ///
    /// The buckets are expected to partition the parent's members. This is
    /// the caller's responsibility: a member named twice or left out is only
    /// logged.
    ///
    /// # Errors
    ///
    /// Fails if the group does not exist, is not a delegation, was already
    /// split, if there are no buckets or a bucket is empty, or if a bucket
    /// names an unknown member.
    #[instrument(skip(self, buckets))]
    pub fn split(
        &mut self,
        id: &GroupId,
        buckets: &[Vec<String>],
    ) -> Result<Vec<GroupId>, CurationError> {
        let parent = self
            .group(id)
            .ok_or_else(|| LookupError::Group(id.clone()))?;
        let GroupKind::Delegation(delegation) = &parent.kind else {
            return Err(CurationError::NotADelegation(id.clone()));
        };
        if !delegation.split_into.is_empty() {
            return Err(CurationError::AlreadySplit(id.clone()));
        }
        if buckets.is_empty() {
            return Err(CurationError::EmptyBucket(id.clone()));
        }

        let mut children = Vec::with_capacity(buckets.len());
        for bucket in buckets {
            let members = bucket
                .iter()
                .map(|member_id| {
                    delegation
                        .members
                        .iter()
                        .find(|member| &member.id == member_id)
                        .cloned()
                        .ok_or_else(|| CurationError::UnknownMember {
                            group: id.clone(),
                            member: member_id.clone(),
                        })
                })
                .collect::<Result<Vec<Member>, _>>()?;
            let members =
                NonEmpty::from_vec(members).ok_or_else(|| CurationError::EmptyBucket(id.clone()))?;

            children.push(ApplicantGroup {
                id: GroupId::generate(),
                profile: parent.profile.clone(),
                evaluation: None,
                flagged: false,
                disqualified: false,
                assigned: None,
                preferences: Vec::new(),
                kind: GroupKind::Delegation(Delegation {
                    members,
                    supervisors: delegation.supervisors.clone(),
                    split_from: Some(id.clone()),
                    split_into: BTreeSet::new(),
                }),
            });
        }

        if !is_partition(delegation, buckets) {
            tracing::warn!("Split of {id} does not name every member exactly once");
        }

        let child_ids: Vec<GroupId> = children.iter().map(|child| child.id.clone()).collect();

        let parent = self.group_mut(id)?;
        parent.disqualified = true;
        parent.assigned = None;
        if let GroupKind::Delegation(delegation) = &mut parent.kind {
            delegation.split_into = child_ids.iter().cloned().collect();
        }

        for child in children {
            self.insert(child);
        }

        tracing::info!("Split {id} into {} delegations", child_ids.len());
        Ok(child_ids)
    }

    /// Turns a single participant into a one-person delegation.
    ///
    /// The participant becomes the head delegate; rating, flag and free text
    /// carry over, role preferences and any assigned role are dropped. The
    /// original single participant is removed. There is no way back.
    ///
    /// # Errors
    ///
    /// Fails if the group does not exist or is not a single participant.
    #[instrument(skip(self))]
    pub fn convert_single_to_delegation(&mut self, id: &GroupId) -> Result<GroupId, CurationError> {
        let group = self
            .group(id)
            .ok_or_else(|| LookupError::Group(id.clone()))?;
        let person = group
            .as_single()
            .ok_or_else(|| CurationError::NotASingle(id.clone()))?
            .person
            .clone();
        let profile = group.profile.clone();
        let (evaluation, flagged, disqualified) =
            (group.evaluation, group.flagged, group.disqualified);

        self.remove(id);

        let delegation = ApplicantGroup {
            id: GroupId::generate(),
            profile,
            evaluation,
            flagged,
            disqualified,
            assigned: None,
            preferences: Vec::new(),
            kind: GroupKind::Delegation(Delegation {
                members: NonEmpty::new(Member {
                    id: uuid::Uuid::new_v4().to_string(),
                    is_head_delegate: true,
                    person,
                }),
                supervisors: Vec::new(),
                split_from: None,
                split_into: BTreeSet::new(),
            }),
        };
        let new_id = delegation.id.clone();
        self.insert(delegation);

        tracing::info!("Converted single participant {id} into delegation {new_id}");
        Ok(new_id)
    }
}

/// Whether the buckets name every member of the delegation exactly once.
fn is_partition(delegation: &Delegation, buckets: &[Vec<String>]) -> bool {
    let mut named: Vec<&str> = buckets.iter().flatten().map(String::as_str).collect();
    let mut members: Vec<&str> = delegation
        .members
        .iter()
        .map(|member| member.id.as_str())
        .collect();
    named.sort_unstable();
    members.sort_unstable();
    named == members
}
