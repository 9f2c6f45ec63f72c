//! A project snapshot stored as a JSON file.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::instrument;

use crate::{
    domain::{Conference, Registry},
    storage::project::{ProjectRecord, ValidationError},
};

/// One loaded project: its metadata, the conference and the working set.
#[derive(Debug, Clone)]
pub struct Project {
    /// Project id.
    pub id: String,
    /// When the snapshot was exported, as an RFC 3339 date-time.
    pub created: String,
    /// The file name the snapshot was exported under.
    pub file_name: String,
    /// The conference the applications are for.
    pub conference: Conference,
    /// The applicant groups and the seat catalog.
    pub registry: Registry,
}

/// Errors that can occur when loading a project.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The project file does not exist.
    #[error("project file {0} not found")]
    NotFound(PathBuf),
    /// The project file could not be read.
    #[error("failed to read project file: {0}")]
    Io(#[from] io::Error),
    /// The project file is not valid JSON for the snapshot schema.
    #[error("failed to parse project file: {0}")]
    Json(#[from] serde_json::Error),
    /// The snapshot is well formed but inconsistent.
    #[error("invalid project: {0}")]
    Invalid(#[from] ValidationError),
}

/// Errors that can occur when saving a project.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The project file could not be written.
    #[error("failed to write project file: {0}")]
    Io(#[from] io::Error),
    /// The project could not be encoded.
    #[error("failed to serialize project: {0}")]
    Json(#[from] serde_json::Error),
}

impl Project {
    /// Parses a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid, consistent snapshot.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let record: ProjectRecord = serde_json::from_str(json)?;
        Ok(Self::try_from(record)?)
    }

    /// Encodes the project as a pretty-printed snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(&ProjectRecord::from(self))?)
    }
}

/// Reads and writes a project at a fixed path.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    path: PathBuf,
}

impl ProjectStore {
    /// A store for the project file at `path`.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The path of the project file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the project.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or unreadable, or if it does
    /// not contain a valid snapshot.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Project, LoadError> {
        let json = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound(self.path.clone()),
            _ => LoadError::Io(e),
        })?;
        let project = Project::from_json(&json)?;
        tracing::debug!(
            "Loaded {} applicant groups and {} seats",
            project.registry.len(),
            project.registry.seats().count()
        );
        Ok(project)
    }

    /// Writes the project, replacing the file.
    ///
    /// The snapshot is written to a sibling temporary file first and then
    /// renamed over the target.
    ///
    /// # Errors
    ///
    /// Returns an error if the project cannot be encoded or written.
    #[instrument(skip(self, project), fields(path = %self.path.display()))]
    pub fn save(&self, project: &Project) -> Result<(), SaveError> {
        let mut json = project.to_json()?;
        json.push('\n');

        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path)?;
        tracing::debug!("Saved {} applicant groups", project.registry.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const SNAPSHOT: &str = r#"{
  "id": "project-1",
  "created": "2024-05-01T12:00:00.000Z",
  "fileName": "munsh-2024.json",
  "data": {
    "conference": {
      "id": "munsh",
      "title": "MUN-SH 2024",
      "committees": [],
      "nonStateActors": [
        { "id": "icrc", "name": "Red Cross", "abbreviation": "ICRC", "fontAwesomeIcon": null, "seatAmount": 2 }
      ],
      "individualApplicationOptions": []
    },
    "delegations": [
      {
        "id": "d",
        "motivation": null,
        "school": "Goethe-Gymnasium",
        "experience": null,
        "evaluation": 2,
        "flagged": false,
        "disqualified": false,
        "members": [
          { "id": "m", "isHeadDelegate": true, "user": { "id": "p", "familyName": "Hopper", "givenName": "Grace", "birthday": "2006-12-09" } }
        ],
        "supervisors": [],
        "appliedForDelegationRoles": [{ "rank": 1, "seat": { "nonStateActor": "icrc" } }],
        "assignedSeat": { "nonStateActor": "icrc" },
        "splittedFrom": null,
        "splittedInto": []
      }
    ],
    "singleParticipants": []
  }
}"#;

    #[test]
    fn save_and_load() {
        let tmp = TempDir::new().unwrap();
        let store = ProjectStore::new(tmp.path().join("project.json"));

        let mut project = Project::from_json(SNAPSHOT).unwrap();
        project.registry.toggle_flag(&"d".into()).unwrap();
        store.save(&project).unwrap();

        let loaded = store.load().unwrap();
        assert!(loaded.registry.group(&"d".into()).unwrap().flagged);
        assert_eq!(loaded.created, project.created);
        assert!(!tmp.path().join("project.json.tmp").exists());
    }

    #[test]
    fn round_trip_is_lossless() {
        let project = Project::from_json(SNAPSHOT).unwrap();
        let saved: serde_json::Value = serde_json::from_str(&project.to_json().unwrap()).unwrap();
        let original: serde_json::Value = serde_json::from_str(SNAPSHOT).unwrap();
        assert_eq!(saved, original);
    }

    #[test]
    fn load_nonexistent_file() {
        let tmp = TempDir::new().unwrap();
        let store = ProjectStore::new(tmp.path().join("missing.json"));
        assert!(matches!(store.load(), Err(LoadError::NotFound(_))));
    }

    #[test]
    fn load_invalid_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("project.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ProjectStore::new(path).load(),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn load_inconsistent_snapshot() {
        let json = SNAPSHOT.replace(r#""rank": 1"#, r#""rank": 0"#);
        assert!(matches!(
            Project::from_json(&json),
            Err(LoadError::Invalid(ValidationError::ZeroRank(_)))
        ));
    }
}
