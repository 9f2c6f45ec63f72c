//! Seat assignment for conference applications
//!
//! Delegations and single participants apply for scarce seats (nations,
//! non-state actors, individual roles) with ranked preferences. Evaluators
//! rate, flag, disqualify and split the applicant groups, then let a
//! minimum-cost matching place everyone it can.
//!
//! A project is loaded from a JSON snapshot with [`ProjectStore`], curated
//! through the operations on [`Registry`], assigned with [`AutoAssign`] and
//! saved back explicitly.

pub mod domain;
pub use domain::{ApplicantGroup, CurationError, GroupId, Registry, SeatRef, WeightConfig};

/// Automatic assignment by bucket and minimum-cost matching.
pub mod assignment;
pub use assignment::{AssignmentReport, AutoAssign, SizeOrder};

/// Project snapshot persistence.
pub mod storage;
pub use storage::{Project, ProjectStore};
