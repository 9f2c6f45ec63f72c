//! Domain models for seat assignment.
//!
//! This module contains the applicant groups, the seat catalog derived from
//! the conference, the cost weights, and the in-memory registry together with
//! the evaluator's curation operations.

/// Conference catalog as found in the project snapshot.
pub mod conference;
pub use conference::Conference;

mod config;
pub use config::{ConfigError, WeightConfig};

/// Evaluator actions mutating the registry.
pub mod curation;
pub use curation::CurationError;

pub(crate) mod group;
pub use group::{
    ApplicantGroup, Delegation, GroupId, GroupKind, Member, Person, Preference, Profile,
    SingleParticipant,
};

/// The working set of one loaded project.
pub mod registry;
pub use registry::{LookupError, Registry};

mod seat;
pub use seat::{Capacity, RemainingCapacity, SeatCatalogEntry, SeatKind, SeatRef};
