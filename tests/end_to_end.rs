//! End-to-end scenarios over JSON snapshots: load, curate, assign, save.

use assistant::{
    AutoAssign, GroupId, Project, ProjectStore, SeatRef, WeightConfig,
    assignment::{BucketKind, Bucketer},
};
use serde_json::json;
use tempfile::TempDir;

const FIXTURE: &str = include_str!("fixtures/conference.json");

fn id(value: &str) -> GroupId {
    GroupId::from(value)
}

fn nation(code: &str) -> SeatRef {
    SeatRef::Nation(code.to_string())
}

fn assigned(project: &Project, group: &str) -> Option<SeatRef> {
    project.registry.group(&id(group)).unwrap().assigned.clone()
}

fn delegation(id: &str, preferences: &[(&str, u32)]) -> serde_json::Value {
    let members: Vec<_> = (0..2)
        .map(|i| {
            json!({
                "id": format!("{id}-{i}"),
                "isHeadDelegate": i == 0,
                "user": {
                    "id": format!("{id}-user-{i}"),
                    "familyName": "Doe",
                    "givenName": format!("{id}{i}"),
                    "birthday": null
                }
            })
        })
        .collect();
    let preferences: Vec<_> = preferences
        .iter()
        .map(|(code, rank)| json!({ "rank": rank, "seat": { "nation": code } }))
        .collect();
    json!({
        "id": id,
        "motivation": null,
        "school": null,
        "experience": null,
        "evaluation": null,
        "flagged": false,
        "disqualified": false,
        "members": members,
        "supervisors": [],
        "appliedForDelegationRoles": preferences,
        "assignedSeat": null,
        "splittedFrom": null,
        "splittedInto": []
    })
}

/// Three delegations of two against nations X and Y, two seats each.
fn three_delegations_two_nations() -> Project {
    let snapshot = json!({
        "id": "scenario",
        "created": "2024-01-01T00:00:00Z",
        "fileName": "scenario.json",
        "data": {
            "conference": {
                "id": "conf",
                "title": "Scenario",
                "committees": [{
                    "id": "ga",
                    "name": "General Assembly",
                    "abbreviation": "GA",
                    "numOfSeatsPerDelegation": 2,
                    "nations": [
                        { "alpha2Code": "xx", "alpha3Code": "XXX" },
                        { "alpha2Code": "yy", "alpha3Code": "YYY" }
                    ]
                }],
                "nonStateActors": [],
                "individualApplicationOptions": []
            },
            "delegations": [
                delegation("A", &[("XXX", 1), ("YYY", 2)]),
                delegation("B", &[("XXX", 1)]),
                delegation("C", &[])
            ],
            "singleParticipants": []
        }
    });
    Project::from_json(&snapshot.to_string()).unwrap()
}

#[test]
fn worked_scenario() {
    let mut project = three_delegations_two_nations();
    let weights = WeightConfig {
        non_wish_malus: 5.0,
        mark_bonus: 0.0,
        null_rating: 3.0,
        rating_factor: 0.0,
    };

    let report = AutoAssign::default()
        .run(&mut project.registry, &weights)
        .unwrap();

    assert_eq!(assigned(&project, "B"), Some(nation("YYY")));
    assert_eq!(assigned(&project, "C"), Some(nation("XXX")));
    assert_eq!(assigned(&project, "A"), None);
    assert_eq!(report.unmatched().collect::<Vec<_>>(), [&id("A")]);
    assert!((report.total_cost() + 10.0).abs() < 1e-9);
}

#[test]
fn snapshot_round_trip() {
    let project = Project::from_json(FIXTURE).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&project.to_json().unwrap()).unwrap();
    let original: serde_json::Value = serde_json::from_str(FIXTURE).unwrap();
    assert_eq!(saved, original);
}

#[test]
fn auto_assigns_the_fixture() {
    let mut project = Project::from_json(FIXTURE).unwrap();
    let report = AutoAssign::default()
        .run(&mut project.registry, &WeightConfig::default())
        .unwrap();

    assert_eq!(assigned(&project, "del-b"), Some(nation("USA")));
    assert_eq!(assigned(&project, "del-a"), Some(nation("DEU")));
    assert_eq!(
        assigned(&project, "del-c"),
        Some(SeatRef::NonStateActor("icrc".into()))
    );
    assert_eq!(
        assigned(&project, "single-a"),
        Some(SeatRef::IndividualRole("press".into()))
    );
    assert_eq!(
        assigned(&project, "single-b"),
        Some(SeatRef::IndividualRole("judge".into()))
    );

    let sizes: Vec<_> = report
        .buckets
        .iter()
        .map(|bucket| (bucket.kind, bucket.size))
        .collect();
    assert_eq!(
        sizes,
        [
            (BucketKind::Delegations, 3),
            (BucketKind::Delegations, 2),
            (BucketKind::Singles, 1)
        ]
    );
    assert!((report.total_cost() - 3.5).abs() < 1e-9);
    assert!(project.registry.overbooked_seats().is_empty());
}

#[test]
fn split_then_assign_and_persist() {
    let tmp = TempDir::new().unwrap();
    let store = ProjectStore::new(tmp.path().join("project.json"));

    let mut project = Project::from_json(FIXTURE).unwrap();
    let children = project
        .registry
        .split(
            &id("del-b"),
            &[
                vec!["del-b-1".to_string(), "del-b-2".to_string()],
                vec!["del-b-3".to_string()],
            ],
        )
        .unwrap();
    assert_eq!(children.len(), 2);
    store.save(&project).unwrap();

    let mut project = store.load().unwrap();
    let parent = project.registry.group(&id("del-b")).unwrap();
    assert!(parent.disqualified);
    assert_eq!(
        parent.as_delegation().unwrap().split_into.len(),
        children.len()
    );
    for child in &children {
        let child = project.registry.group(child).unwrap();
        assert_eq!(
            child.as_delegation().unwrap().split_from,
            Some(id("del-b"))
        );
    }

    let sizes = Bucketer::new(&project.registry).sizes();
    assert_eq!(sizes.into_iter().collect::<Vec<_>>(), [1, 2]);

    AutoAssign::default()
        .run(&mut project.registry, &WeightConfig::default())
        .unwrap();
    assert_eq!(assigned(&project, "del-b"), None);
    for child in &children {
        assert!(project.registry.group(child).unwrap().assigned.is_some());
    }
}

#[test]
fn converted_single_competes_for_delegation_seats() {
    let mut project = Project::from_json(FIXTURE).unwrap();
    let delegation = project
        .registry
        .convert_single_to_delegation(&id("single-b"))
        .unwrap();
    assert!(project.registry.group(&id("single-b")).is_none());

    let bucketer = Bucketer::new(&project.registry);
    assert!(bucketer.groups_of_size(1).contains(&delegation));

    let json: serde_json::Value = serde_json::from_str(&project.to_json().unwrap()).unwrap();
    assert_eq!(json["data"]["singleParticipants"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"]["delegations"].as_array().unwrap().len(), 4);
}
