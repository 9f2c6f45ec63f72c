//! The conference catalog: committees, nations, non-state actors and
//! individual roles.
//!
//! The catalog is read-only for the assignment session. [`Conference::seats`]
//! flattens it into the seat catalog the registry works with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{SeatCatalogEntry, SeatRef};

/// A conference as stored in the project snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conference {
    /// Conference id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Committees and the nations sitting on them.
    pub committees: Vec<Committee>,
    /// Non-state actors open to delegations.
    pub non_state_actors: Vec<NonStateActor>,
    /// Roles open to single participants.
    pub individual_application_options: Vec<IndividualRole>,
}

/// A committee; every nation on it sends the same number of delegates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Committee {
    /// Committee id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short name, such as `GA`.
    pub abbreviation: String,
    /// Delegates each nation sends to this committee.
    pub num_of_seats_per_delegation: u32,
    /// Nations represented.
    pub nations: Vec<Nation>,
}

/// A nation, identified by its ISO 3166 codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nation {
    /// Two-letter code.
    pub alpha2_code: String,
    /// Three-letter code, used as the seat id.
    pub alpha3_code: String,
}

/// An organisation represented by a delegation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonStateActor {
    /// Catalog id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short name.
    pub abbreviation: String,
    /// Icon name, display only.
    pub font_awesome_icon: Option<String>,
    /// Number of people the actor seats.
    pub seat_amount: u32,
}

/// A role taken by one person, such as press or judge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualRole {
    /// Catalog id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Icon name, display only.
    pub font_awesome_icon: Option<String>,
}

impl Conference {
    /// Builds the seat catalog.
    ///
    /// A nation appearing in several committees becomes one seat whose
    /// capacity is the sum of the committees' per-delegation seats.
    #[must_use]
    pub fn seats(&self) -> BTreeMap<SeatRef, SeatCatalogEntry> {
        let mut nations: BTreeMap<&str, (u32, Vec<String>)> = BTreeMap::new();
        for committee in &self.committees {
            for nation in &committee.nations {
                let entry = nations.entry(nation.alpha3_code.as_str()).or_default();
                entry.0 += committee.num_of_seats_per_delegation;
                entry.1.push(committee.abbreviation.clone());
            }
        }

        let nations = nations.into_iter().map(|(code, (capacity, committees))| {
            SeatCatalogEntry::Nation {
                code: code.to_string(),
                capacity,
                committees,
            }
        });

        let non_state_actors =
            self.non_state_actors
                .iter()
                .map(|actor| SeatCatalogEntry::NonStateActor {
                    id: actor.id.clone(),
                    name: actor.name.clone(),
                    capacity: actor.seat_amount,
                });

        let roles = self
            .individual_application_options
            .iter()
            .map(|role| SeatCatalogEntry::IndividualRole {
                id: role.id.clone(),
                name: role.name.clone(),
            });

        nations
            .chain(non_state_actors)
            .chain(roles)
            .map(|entry| (entry.seat_ref(), entry))
            .collect()
    }
}
