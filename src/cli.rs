use std::path::PathBuf;

mod auto;
mod curate;
mod list;
mod status;
mod terminal;

use assistant::{GroupId, Project, ProjectStore, SeatRef, WeightConfig};
use auto::Auto;
use clap::ArgAction;
use curate::{AssignSeat, Convert, Disqualify, Evaluate, Flag, Reset, Split, Unassign};
use list::List;
use status::Status;

/// Parse a seat reference of the form `nation:DEU`, `nsa:<id>` or
/// `role:<id>`.
///
/// Nation codes are normalized to uppercase.
fn parse_seat(s: &str) -> Result<SeatRef, String> {
    let (kind, id) = s
        .split_once(':')
        .ok_or_else(|| format!("expected <kind>:<id>, got '{s}'"))?;
    if id.is_empty() {
        return Err(format!("missing id in '{s}'"));
    }
    match kind.to_ascii_lowercase().as_str() {
        "nation" => Ok(SeatRef::Nation(id.to_uppercase())),
        "nsa" => Ok(SeatRef::NonStateActor(id.to_string())),
        "role" => Ok(SeatRef::IndividualRole(id.to_string())),
        other => Err(format!(
            "unknown seat kind '{other}' (expected nation, nsa or role)"
        )),
    }
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The project snapshot to work on
    #[arg(short, long, default_value = "project.json", global = true)]
    project: PathBuf,

    /// Cost weights (defaults are used if the file does not exist)
    #[arg(short, long, default_value = "weights.toml", global = true)]
    weights: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let session = Session {
            store: ProjectStore::new(self.project),
            weights: self.weights,
        };

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(&session)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

/// Where the project and the weights live.
#[derive(Debug)]
pub struct Session {
    store: ProjectStore,
    weights: PathBuf,
}

impl Session {
    fn load(&self) -> anyhow::Result<Project> {
        Ok(self.store.load()?)
    }

    fn save(&self, project: &Project) -> anyhow::Result<()> {
        Ok(self.store.save(project)?)
    }

    fn weights(&self) -> anyhow::Result<WeightConfig> {
        Ok(WeightConfig::load_or_default(&self.weights)?)
    }

    /// Loads the project, applies `f` and saves the result.
    fn update<T>(
        &self,
        f: impl FnOnce(&mut Project) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        let mut project = self.load()?;
        let value = f(&mut project)?;
        self.save(&project)?;
        Ok(value)
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show assignment progress and seat usage (default)
    Status(Status),

    /// List applicant groups
    List(List),

    /// Rate an applicant group
    Evaluate(Evaluate),

    /// Toggle the flag of an applicant group
    Flag(Flag),

    /// Toggle the disqualification of an applicant group
    ///
    /// Disqualifying releases the group's seat.
    Disqualify(Disqualify),

    /// Assign a seat to an applicant group
    ///
    /// Capacity is not checked; overbooked seats are reported by `status`.
    AssignSeat(AssignSeat),

    /// Remove the seat of an applicant group
    Unassign(Unassign),

    /// Unassign every group holding a seat of the given size
    Reset(Reset),

    /// Split a delegation into smaller delegations
    Split(Split),

    /// Turn a single participant into a one-person delegation
    Convert(Convert),

    /// Assign every open group by minimum-cost matching
    Auto(Auto),
}

impl Command {
    fn run(self, session: &Session) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(session)?,
            Self::List(command) => command.run(session)?,
            Self::Evaluate(command) => command.run(session)?,
            Self::Flag(command) => command.run(session)?,
            Self::Disqualify(command) => command.run(session)?,
            Self::AssignSeat(command) => command.run(session)?,
            Self::Unassign(command) => command.run(session)?,
            Self::Reset(command) => command.run(session)?,
            Self::Split(command) => command.run(session)?,
            Self::Convert(command) => command.run(session)?,
            Self::Auto(command) => command.run(session)?,
        }
        Ok(())
    }
}

/// Parse a group id argument.
fn parse_group_id(s: &str) -> Result<GroupId, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("group id must not be empty".to_string());
    }
    Ok(GroupId::from(trimmed))
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use test_case::test_case;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test_case("nation:deu", SeatRef::Nation("DEU".into()) ; "nation is uppercased")]
    #[test_case("nsa:icrc", SeatRef::NonStateActor("icrc".into()) ; "non-state actor")]
    #[test_case("ROLE:press", SeatRef::IndividualRole("press".into()) ; "kind is case insensitive")]
    fn parses_seats(input: &str, expected: SeatRef) {
        assert_eq!(parse_seat(input), Ok(expected));
    }

    #[test_case("DEU" ; "missing kind")]
    #[test_case("nation:" ; "missing id")]
    #[test_case("planet:mars" ; "unknown kind")]
    fn rejects_bad_seats(input: &str) {
        assert!(parse_seat(input).is_err());
    }

    #[test]
    fn defaults_to_status() {
        let cli = Cli::try_parse_from(["assign"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.project, PathBuf::from("project.json"));
    }

    #[test]
    fn parses_split_buckets() {
        let cli =
            Cli::try_parse_from(["assign", "split", "d1", "--into", "a,b", "--into", "c"]).unwrap();
        let Some(Command::Split(split)) = cli.command else {
            panic!("expected split");
        };
        assert_eq!(split.buckets(), vec![vec!["a", "b"], vec!["c"]]);
    }
}
