use std::process;

use assistant::{Registry, SeatRef, domain::RemainingCapacity};
use clap::Parser;
use serde::Serialize;
use tracing::instrument;

use super::{
    Session,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show assignment progress and seat usage")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
struct Counts {
    total: usize,
    assigned: usize,
    open: usize,
    disqualified: usize,
}

impl Counts {
    fn of<'a>(groups: impl Iterator<Item = &'a assistant::ApplicantGroup>) -> Self {
        groups.fold(Self::default(), |mut counts, group| {
            counts.total += 1;
            if group.disqualified {
                counts.disqualified += 1;
            } else if group.assigned.is_some() {
                counts.assigned += 1;
            } else {
                counts.open += 1;
            }
            counts
        })
    }
}

#[derive(Debug, Serialize)]
struct Overbooked {
    seat: String,
    by: i64,
}

#[derive(Debug, Serialize)]
struct Summary {
    delegations: Counts,
    singles: Counts,
    free_seats: i64,
    overbooked: Vec<Overbooked>,
}

impl Summary {
    fn new(registry: &Registry) -> Self {
        let free_seats = registry
            .seats()
            .map(|entry| entry.seat_ref())
            .filter(SeatRef::is_delegation_seat)
            .filter_map(|seat| match registry.remaining_capacity(&seat) {
                Ok(RemainingCapacity::Limited(remaining)) => Some(remaining.max(0)),
                _ => None,
            })
            .sum();

        Self {
            delegations: Counts::of(registry.delegations()),
            singles: Counts::of(registry.singles()),
            free_seats,
            overbooked: registry
                .overbooked_seats()
                .into_iter()
                .map(|(seat, remaining)| Overbooked {
                    seat: seat.to_string(),
                    by: -remaining,
                })
                .collect(),
        }
    }
}

impl Status {
    #[instrument(level = "debug", skip(self, session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let project = session.load()?;
        let summary = Summary::new(&project.registry);

        if project.registry.is_empty() {
            println!("No applications in {}.", project.file_name);
            return Ok(());
        }

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
            OutputFormat::Table => {
                if self.quiet {
                    Self::output_quiet(&summary);
                } else {
                    Self::output_table(&project.conference.title, &summary);
                }
            }
        }

        // Exit with a non-zero code when seats need attention.
        if !summary.overbooked.is_empty() {
            process::exit(2);
        }

        Ok(())
    }

    fn output_quiet(summary: &Summary) {
        println!(
            "delegations_open={} singles_open={} free_seats={} overbooked={}",
            summary.delegations.open,
            summary.singles.open,
            summary.free_seats,
            summary.overbooked.len()
        );
    }

    fn output_table(title: &str, summary: &Summary) {
        println!("{title}");
        println!("{}", "─".repeat(title.chars().count()).dim());

        let rows = [
            ("Delegations", &summary.delegations),
            ("Singles", &summary.singles),
        ];
        if is_narrow() {
            for (label, counts) in rows {
                println!(
                    "{label}: {} assigned, {} open, {} disqualified",
                    counts.assigned, counts.open, counts.disqualified
                );
            }
        } else {
            println!(
                "{:<12} {:>6} {:>9} {:>6} {:>13}",
                "", "Total", "Assigned", "Open", "Disqualified"
            );
            for (label, counts) in rows {
                println!(
                    "{label:<12} {:>6} {:>9} {:>6} {:>13}",
                    counts.total, counts.assigned, counts.open, counts.disqualified
                );
            }
        }

        println!();
        println!("Free delegation seats: {}", summary.free_seats);

        if summary.overbooked.is_empty() {
            println!("Overbooked seats: {} ✅", "0".success());
        } else {
            println!(
                "Overbooked seats: {} ⚠️",
                summary.overbooked.len().to_string().warning()
            );
            for Overbooked { seat, by } in &summary.overbooked {
                println!("  - {seat} by {by}");
            }
            println!("{}", "Unassign or reset groups to resolve.".dim());
        }
    }
}
