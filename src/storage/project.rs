//! The on-disk shape of a project snapshot and its conversion to and from the
//! domain.
//!
//! The snapshot keeps delegations and single participants in two separate
//! lists with flat optional fields. Conversion into the domain validates the
//! references and folds the two lists into one [`Registry`]; conversion back
//! restores the lists in registry order.

use std::collections::HashSet;

use chrono::DateTime;
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        ApplicantGroup, Conference, Delegation, GroupId, GroupKind, Member, Person, Preference,
        Profile, Registry, SeatRef, SingleParticipant,
    },
    storage::Project,
};

/// A project snapshot that does not describe a consistent working set.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Two groups share an id.
    #[error("duplicate applicant group id {0}")]
    DuplicateGroup(GroupId),
    /// A delegation without members.
    #[error("delegation {0} has no members")]
    EmptyDelegation(GroupId),
    /// Two members of one delegation share an id.
    #[error("delegation {group} lists member {member} twice")]
    DuplicateMember {
        /// The delegation.
        group: GroupId,
        /// The repeated member id.
        member: String,
    },
    /// A preference or assignment names a seat the conference does not have.
    #[error("applicant group {group} references unknown seat {seat}")]
    UnknownSeat {
        /// The referencing group.
        group: GroupId,
        /// The missing seat.
        seat: SeatRef,
    },
    /// A preference or assignment names a seat the group kind cannot hold.
    #[error("applicant group {group} cannot hold seat {seat}")]
    SeatKindMismatch {
        /// The referencing group.
        group: GroupId,
        /// The offending seat.
        seat: SeatRef,
    },
    /// Ranks start at 1.
    #[error("applicant group {0} has a preference with rank 0")]
    ZeroRank(GroupId),
    /// The export timestamp is not an RFC 3339 date-time.
    #[error("invalid creation timestamp {0:?}")]
    InvalidTimestamp(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectRecord {
    id: String,
    /// Kept verbatim so a save reproduces the exported text.
    created: String,
    file_name: String,
    data: DataRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataRecord {
    conference: Conference,
    #[serde(default)]
    delegations: Vec<DelegationRecord>,
    #[serde(default)]
    single_participants: Vec<SingleRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DelegationRecord {
    id: GroupId,
    motivation: Option<String>,
    school: Option<String>,
    experience: Option<String>,
    evaluation: Option<u32>,
    #[serde(default)]
    flagged: bool,
    #[serde(default)]
    disqualified: bool,
    members: Vec<MemberRecord>,
    #[serde(default)]
    supervisors: Vec<Person>,
    #[serde(default)]
    applied_for_delegation_roles: Vec<Preference>,
    assigned_seat: Option<SeatRef>,
    splitted_from: Option<GroupId>,
    #[serde(default)]
    splitted_into: Vec<GroupId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberRecord {
    id: String,
    is_head_delegate: bool,
    user: Person,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SingleRecord {
    id: GroupId,
    motivation: Option<String>,
    school: Option<String>,
    experience: Option<String>,
    evaluation: Option<u32>,
    #[serde(default)]
    flagged: bool,
    #[serde(default)]
    disqualified: bool,
    user: Person,
    #[serde(default)]
    applied_for_roles: Vec<Preference>,
    /// Id of the assigned individual role.
    assigned_role: Option<String>,
}

impl TryFrom<ProjectRecord> for Project {
    type Error = ValidationError;

    fn try_from(record: ProjectRecord) -> Result<Self, Self::Error> {
        let ProjectRecord {
            id,
            created,
            file_name,
            data:
                DataRecord {
                    conference,
                    delegations,
                    single_participants,
                },
        } = record;

        if DateTime::parse_from_rfc3339(&created).is_err() {
            return Err(ValidationError::InvalidTimestamp(created));
        }

        let mut registry = Registry::with_capacity(
            conference.seats(),
            delegations.len() + single_participants.len(),
        );
        let mut seen = HashSet::new();

        let groups = delegations
            .into_iter()
            .map(ApplicantGroup::try_from)
            .chain(single_participants.into_iter().map(|s| Ok(s.into())));
        for group in groups {
            let group = group?;
            if !seen.insert(group.id.clone()) {
                return Err(ValidationError::DuplicateGroup(group.id));
            }
            check_seats(&registry, &group)?;
            registry.insert(group);
        }

        Ok(Self {
            id,
            created,
            file_name,
            conference,
            registry,
        })
    }
}

/// Every preference and the assignment must name a catalog seat of the right
/// kind, and ranks start at 1.
fn check_seats(registry: &Registry, group: &ApplicantGroup) -> Result<(), ValidationError> {
    let referenced = group
        .preferences
        .iter()
        .map(|preference| &preference.seat)
        .chain(group.assigned.as_ref());
    for seat in referenced {
        if registry.seat(seat).is_none() {
            return Err(ValidationError::UnknownSeat {
                group: group.id.clone(),
                seat: seat.clone(),
            });
        }
        if !group.accepts(seat) {
            return Err(ValidationError::SeatKindMismatch {
                group: group.id.clone(),
                seat: seat.clone(),
            });
        }
    }
    if group.preferences.iter().any(|preference| preference.rank == 0) {
        return Err(ValidationError::ZeroRank(group.id.clone()));
    }
    Ok(())
}

impl TryFrom<DelegationRecord> for ApplicantGroup {
    type Error = ValidationError;

    fn try_from(record: DelegationRecord) -> Result<Self, Self::Error> {
        let DelegationRecord {
            id,
            motivation,
            school,
            experience,
            evaluation,
            flagged,
            disqualified,
            members,
            supervisors,
            applied_for_delegation_roles,
            assigned_seat,
            splitted_from,
            splitted_into,
        } = record;

        let mut member_ids = HashSet::new();
        for member in &members {
            if !member_ids.insert(member.id.as_str()) {
                return Err(ValidationError::DuplicateMember {
                    group: id.clone(),
                    member: member.id.clone(),
                });
            }
        }

        let members = NonEmpty::from_vec(
            members
                .into_iter()
                .map(|MemberRecord { id, is_head_delegate, user }| Member {
                    id,
                    is_head_delegate,
                    person: user,
                })
                .collect(),
        )
        .ok_or_else(|| ValidationError::EmptyDelegation(id.clone()))?;

        Ok(Self {
            id,
            profile: Profile {
                motivation,
                school,
                experience,
            },
            evaluation,
            flagged,
            disqualified,
            // a disqualified group never holds a seat
            assigned: assigned_seat.filter(|_| !disqualified),
            preferences: applied_for_delegation_roles,
            kind: GroupKind::Delegation(Delegation {
                members,
                supervisors,
                split_from: splitted_from,
                split_into: splitted_into.into_iter().collect(),
            }),
        })
    }
}

impl From<SingleRecord> for ApplicantGroup {
    fn from(record: SingleRecord) -> Self {
        let SingleRecord {
            id,
            motivation,
            school,
            experience,
            evaluation,
            flagged,
            disqualified,
            user,
            applied_for_roles,
            assigned_role,
        } = record;

        Self {
            id,
            profile: Profile {
                motivation,
                school,
                experience,
            },
            evaluation,
            flagged,
            disqualified,
            assigned: assigned_role
                .filter(|_| !disqualified)
                .map(SeatRef::IndividualRole),
            preferences: applied_for_roles,
            kind: GroupKind::Single(SingleParticipant { person: user }),
        }
    }
}

impl From<&Project> for ProjectRecord {
    fn from(project: &Project) -> Self {
        let mut delegations = Vec::new();
        let mut single_participants = Vec::new();

        for group in project.registry.groups() {
            let Profile {
                motivation,
                school,
                experience,
            } = group.profile.clone();

            match &group.kind {
                GroupKind::Delegation(delegation) => delegations.push(DelegationRecord {
                    id: group.id.clone(),
                    motivation,
                    school,
                    experience,
                    evaluation: group.evaluation,
                    flagged: group.flagged,
                    disqualified: group.disqualified,
                    members: delegation
                        .members
                        .iter()
                        .map(|member| MemberRecord {
                            id: member.id.clone(),
                            is_head_delegate: member.is_head_delegate,
                            user: member.person.clone(),
                        })
                        .collect(),
                    supervisors: delegation.supervisors.clone(),
                    applied_for_delegation_roles: group.preferences.clone(),
                    assigned_seat: group.assigned.clone(),
                    splitted_from: delegation.split_from.clone(),
                    splitted_into: delegation.split_into.iter().cloned().collect(),
                }),
                GroupKind::Single(single) => single_participants.push(SingleRecord {
                    id: group.id.clone(),
                    motivation,
                    school,
                    experience,
                    evaluation: group.evaluation,
                    flagged: group.flagged,
                    disqualified: group.disqualified,
                    user: single.person.clone(),
                    applied_for_roles: group.preferences.clone(),
                    assigned_role: group.assigned.as_ref().map(|seat| seat.id().to_string()),
                }),
            }
        }

        Self {
            id: project.id.clone(),
            created: project.created.clone(),
            file_name: project.file_name.clone(),
            data: DataRecord {
                conference: project.conference.clone(),
                delegations,
                single_participants,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    fn person(id: &str) -> serde_json::Value {
        json!({ "id": id, "familyName": "Lovelace", "givenName": "Ada", "birthday": null })
    }

    fn snapshot(delegations: serde_json::Value, singles: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "project-1",
            "created": "2024-05-01T12:00:00Z",
            "fileName": "munsh-2024.json",
            "data": {
                "conference": {
                    "id": "munsh",
                    "title": "MUN-SH 2024",
                    "committees": [{
                        "id": "ga",
                        "name": "General Assembly",
                        "abbreviation": "GA",
                        "numOfSeatsPerDelegation": 2,
                        "nations": [{ "alpha2Code": "de", "alpha3Code": "DEU" }]
                    }],
                    "nonStateActors": [],
                    "individualApplicationOptions": [
                        { "id": "press", "name": "Press", "fontAwesomeIcon": null }
                    ]
                },
                "delegations": delegations,
                "singleParticipants": singles
            }
        })
    }

    fn delegation(id: &str, members: &[&str], preferences: serde_json::Value) -> serde_json::Value {
        json!({
            "id": id,
            "motivation": null,
            "school": null,
            "experience": null,
            "evaluation": null,
            "flagged": false,
            "disqualified": false,
            "members": members
                .iter()
                .enumerate()
                .map(|(i, m)| json!({ "id": m, "isHeadDelegate": i == 0, "user": person(m) }))
                .collect::<Vec<_>>(),
            "supervisors": [],
            "appliedForDelegationRoles": preferences,
            "assignedSeat": null,
            "splittedFrom": null,
            "splittedInto": []
        })
    }

    fn parse(value: serde_json::Value) -> Result<Project, ValidationError> {
        let record: ProjectRecord = serde_json::from_value(value).unwrap();
        Project::try_from(record)
    }

    #[test]
    fn loads_both_group_kinds() {
        let single = json!({
            "id": "s",
            "motivation": "I like writing",
            "school": null,
            "experience": null,
            "evaluation": 4,
            "flagged": true,
            "disqualified": false,
            "user": person("p"),
            "appliedForRoles": [{ "rank": 1, "seat": { "individualRole": "press" } }],
            "assignedRole": "press"
        });
        let project = parse(snapshot(
            json!([delegation("d", &["m1", "m2"], json!([{ "rank": 1, "seat": { "nation": "DEU" } }]))]),
            json!([single]),
        ))
        .unwrap();

        let d = project.registry.group(&"d".into()).unwrap();
        assert_eq!(d.headcount(), 2);
        assert_eq!(d.rank_of(&SeatRef::Nation("DEU".into())), Some(1));

        let s = project.registry.group(&"s".into()).unwrap();
        assert_eq!(s.assigned, Some(SeatRef::IndividualRole("press".into())));
        assert_eq!(s.evaluation, Some(4));
        assert!(s.flagged);
    }

    #[test]
    fn converts_back_to_the_same_record() {
        let value = snapshot(
            json!([delegation("d", &["m1"], json!([{ "rank": 2, "seat": { "nation": "DEU" } }]))]),
            json!([]),
        );
        let record: ProjectRecord = serde_json::from_value(value.clone()).unwrap();
        let project = Project::try_from(record).unwrap();
        assert_eq!(
            serde_json::to_value(ProjectRecord::from(&project)).unwrap(),
            value
        );
    }

    #[test_case(
        json!([delegation("d", &["m1"], json!([])), delegation("d", &["m2"], json!([]))]),
        ValidationError::DuplicateGroup("d".into()) ;
        "duplicate group"
    )]
    #[test_case(
        json!([delegation("d", &[], json!([]))]),
        ValidationError::EmptyDelegation("d".into()) ;
        "empty delegation"
    )]
    #[test_case(
        json!([delegation("d", &["m1", "m1"], json!([]))]),
        ValidationError::DuplicateMember { group: "d".into(), member: "m1".into() } ;
        "duplicate member"
    )]
    #[test_case(
        json!([delegation("d", &["m1"], json!([{ "rank": 1, "seat": { "nation": "FRA" } }]))]),
        ValidationError::UnknownSeat { group: "d".into(), seat: SeatRef::Nation("FRA".into()) } ;
        "unknown seat"
    )]
    #[test_case(
        json!([delegation("d", &["m1"], json!([{ "rank": 1, "seat": { "individualRole": "press" } }]))]),
        ValidationError::SeatKindMismatch { group: "d".into(), seat: SeatRef::IndividualRole("press".into()) } ;
        "role ranked by delegation"
    )]
    #[test_case(
        json!([delegation("d", &["m1"], json!([{ "rank": 0, "seat": { "nation": "DEU" } }]))]),
        ValidationError::ZeroRank("d".into()) ;
        "rank zero"
    )]
    fn rejects_inconsistent_snapshots(delegations: serde_json::Value, expected: ValidationError) {
        assert_eq!(parse(snapshot(delegations, json!([]))).unwrap_err(), expected);
    }

    #[test_case("2024-03-02T09:30:00.000Z" ; "milliseconds")]
    #[test_case("2024-03-02T10:30:00+01:00" ; "offset")]
    fn creation_timestamp_is_kept_verbatim(created: &str) {
        let mut value = snapshot(json!([]), json!([]));
        value["created"] = json!(created);

        let project = parse(value.clone()).unwrap();
        assert_eq!(project.created, created);
        assert_eq!(
            serde_json::to_value(ProjectRecord::from(&project)).unwrap(),
            value
        );
    }

    #[test]
    fn rejects_malformed_timestamp() {
        let mut value = snapshot(json!([]), json!([]));
        value["created"] = json!("yesterday");
        assert_eq!(
            parse(value).unwrap_err(),
            ValidationError::InvalidTimestamp("yesterday".into())
        );
    }

    #[test]
    fn disqualified_groups_drop_their_seat() {
        let mut d = delegation("d", &["m1"], json!([]));
        d["disqualified"] = json!(true);
        d["assignedSeat"] = json!({ "nation": "DEU" });

        let project = parse(snapshot(json!([d]), json!([]))).unwrap();
        assert_eq!(project.registry.group(&"d".into()).unwrap().assigned, None);
    }

    #[test]
    fn missing_optional_lists_default_to_empty() {
        let mut value = snapshot(json!([]), json!([]));
        let data = value["data"].as_object_mut().unwrap();
        data.remove("delegations");
        data.remove("singleParticipants");

        let project = parse(value).unwrap();
        assert!(project.registry.is_empty());
        assert_eq!(project.registry.seats().count(), 2);
    }
}
