use assistant::{ApplicantGroup, Registry, SeatRef};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::instrument;

use super::{Session, parse_seat, terminal::Colorize};

/// Command arguments for `assign list`.
#[derive(Debug, Parser)]
#[command(about = "List applicant groups")]
pub struct List {
    /// Only this kind of group.
    #[arg(long, value_enum)]
    kind: Option<KindFilter>,

    /// Only groups in this state.
    #[arg(long, value_enum)]
    state: Option<StateFilter>,

    /// Only delegations with this many members.
    #[arg(long)]
    size: Option<usize>,

    /// Only groups holding this seat (nation:<alpha3>, nsa:<id>, role:<id>).
    #[arg(long, value_parser = parse_seat)]
    seat: Option<SeatRef>,

    /// Only flagged groups.
    #[arg(long)]
    flagged: bool,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format rows for scripting.
    #[arg(long)]
    quiet: bool,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum KindFilter {
    Delegation,
    Single,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum StateFilter {
    Open,
    Assigned,
    Disqualified,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Row {
    id: String,
    kind: &'static str,
    label: String,
    size: usize,
    evaluation: Option<u32>,
    flagged: bool,
    disqualified: bool,
    assigned: Option<String>,
    /// Rank the group gave its seat, if any.
    rank: Option<u32>,
    first_choice: Option<String>,
}

impl Row {
    fn new(group: &ApplicantGroup) -> Self {
        Self {
            id: group.id.to_string(),
            kind: if group.is_delegation() {
                "delegation"
            } else {
                "single"
            },
            label: group.label(),
            size: group.headcount(),
            evaluation: group.evaluation,
            flagged: group.flagged,
            disqualified: group.disqualified,
            assigned: group.assigned.as_ref().map(ToString::to_string),
            rank: group
                .assigned
                .as_ref()
                .and_then(|seat| group.rank_of(seat)),
            first_choice: group
                .preferences
                .iter()
                .min_by_key(|preference| preference.rank)
                .map(|preference| preference.seat.to_string()),
        }
    }
}

impl List {
    #[instrument(level = "debug", skip(self, session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let project = session.load()?;
        let rows = self.rows(&project.registry);

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
            OutputFormat::Table => render_table(&rows, self.quiet),
        }
        Ok(())
    }

    fn matches(&self, group: &ApplicantGroup) -> bool {
        let kind = match self.kind {
            Some(KindFilter::Delegation) => group.is_delegation(),
            Some(KindFilter::Single) => !group.is_delegation(),
            None => true,
        };
        let state = match self.state {
            Some(StateFilter::Open) => group.is_open(),
            Some(StateFilter::Assigned) => group.assigned.is_some(),
            Some(StateFilter::Disqualified) => group.disqualified,
            None => true,
        };
        let size = self
            .size
            .is_none_or(|size| group.is_delegation() && group.headcount() == size);
        let seat = self
            .seat
            .as_ref()
            .is_none_or(|seat| group.assigned.as_ref() == Some(seat));

        kind && state && size && seat && (!self.flagged || group.flagged)
    }

    fn rows(&self, registry: &Registry) -> Vec<Row> {
        registry
            .groups()
            .filter(|group| self.matches(group))
            .map(Row::new)
            .collect()
    }
}

fn render_table(rows: &[Row], quiet: bool) {
    if quiet {
        for row in rows {
            println!(
                "{}\t{}\t{}",
                row.id,
                row.kind,
                row.assigned.as_deref().unwrap_or("-")
            );
        }
        return;
    }

    if rows.is_empty() {
        println!("{}", "No matching applicant groups.".dim());
        return;
    }

    let id_width = rows.iter().map(|row| row.id.len()).max().unwrap_or(2).max(2);
    println!(
        "{:<id_width$}  {:<10}  {:>4}  {:>4}  {:<24}  {:<20}  Choice",
        "Id", "Kind", "Size", "Eval", "Name", "Seat"
    );
    for row in rows {
        let marks = match (row.flagged, row.disqualified) {
            (_, true) => " ✗",
            (true, false) => " ⚑",
            (false, false) => "",
        };
        let seat = match (&row.assigned, row.rank) {
            (Some(seat), Some(rank)) => format!("{seat} (#{rank})"),
            (Some(seat), None) => seat.clone(),
            (None, _) => "-".to_string(),
        };
        let line = format!(
            "{:<id_width$}  {:<10}  {:>4}  {:>4}  {:<24}  {:<20}  {}{marks}",
            row.id,
            row.kind,
            row.size,
            row.evaluation.map_or_else(|| "-".to_string(), |e| e.to_string()),
            row.label,
            seat,
            row.first_choice.as_deref().unwrap_or("-"),
        );
        if row.disqualified {
            println!("{}", line.dim());
        } else if row.assigned.is_some() {
            println!("{}", line.success());
        } else {
            println!("{line}");
        }
    }
    println!();
    println!("{} groups", rows.len());
}

#[cfg(test)]
mod tests {
    use assistant::Project;

    use super::*;

    const SNAPSHOT: &str = include_str!("../../tests/fixtures/conference.json");

    fn list(args: &[&str]) -> List {
        List::try_parse_from(std::iter::once("list").chain(args.iter().copied())).unwrap()
    }

    fn ids(list: &List, registry: &Registry) -> Vec<String> {
        list.rows(registry).into_iter().map(|row| row.id).collect()
    }

    #[test]
    fn filters_by_kind_and_size() {
        let project = Project::from_json(SNAPSHOT).unwrap();
        assert_eq!(
            ids(&list(&["--kind", "single"]), &project.registry),
            ["single-a", "single-b"]
        );
        assert_eq!(
            ids(&list(&["--size", "2"]), &project.registry),
            ["del-a", "del-c"]
        );
    }

    #[test]
    fn filters_by_state_and_seat() {
        let mut project = Project::from_json(SNAPSHOT).unwrap();
        project.registry.assign_nation(&"del-a".into(), "DEU").unwrap();

        assert_eq!(
            ids(&list(&["--state", "assigned"]), &project.registry),
            ["del-a"]
        );
        assert_eq!(
            ids(&list(&["--seat", "nation:deu"]), &project.registry),
            ["del-a"]
        );
        assert_eq!(
            ids(&list(&["--state", "open", "--flagged"]), &project.registry),
            ["del-c"]
        );
    }

    #[test]
    fn row_records_rank_of_assigned_seat() {
        let mut project = Project::from_json(SNAPSHOT).unwrap();
        project.registry.assign_nation(&"del-a".into(), "FRA").unwrap();
        let group = project.registry.group(&"del-a".into()).unwrap();

        let row = Row::new(group);
        assert_eq!(row.rank, Some(2));
        assert_eq!(row.first_choice.as_deref(), Some("nation:DEU"));
        assert_eq!(row.size, 2);
    }
}
