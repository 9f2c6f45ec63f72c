use assistant::{
    AssignmentReport, AutoAssign, SizeOrder,
    assignment::{BucketKind, SeatSelection},
};
use clap::{Parser, ValueEnum};
use tracing::instrument;

use super::{Session, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Assign every open group by minimum-cost matching")]
#[allow(clippy::struct_excessive_bools)]
pub struct Auto {
    /// Which delegation size is solved first
    #[arg(long, value_enum, default_value_t, conflicts_with = "sizes")]
    order: Order,

    /// Solve exactly these delegation sizes, in this order (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "N")]
    sizes: Vec<usize>,

    /// Do not offer nation seats
    #[arg(long)]
    no_nations: bool,

    /// Do not offer non-state-actor seats
    #[arg(long)]
    no_non_state_actors: bool,

    /// Leave single participants unassigned
    #[arg(long)]
    no_singles: bool,

    /// Print the result without saving it
    #[arg(long)]
    dry_run: bool,

    /// Output format (table, json)
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum Order {
    #[default]
    LargestFirst,
    SmallestFirst,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Auto {
    fn settings(&self) -> AutoAssign {
        let order = if self.sizes.is_empty() {
            match self.order {
                Order::LargestFirst => SizeOrder::LargestFirst,
                Order::SmallestFirst => SizeOrder::SmallestFirst,
            }
        } else {
            SizeOrder::Explicit(self.sizes.clone())
        };

        AutoAssign {
            order,
            seats: SeatSelection {
                nations: !self.no_nations,
                non_state_actors: !self.no_non_state_actors,
            },
            include_singles: !self.no_singles,
        }
    }

    #[instrument(level = "debug", skip(self, session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let weights = session.weights()?;
        let settings = self.settings();
        tracing::debug!("Running with {settings:?} and {weights:?}");

        let mut project = session.load()?;
        let report = settings.run(&mut project.registry, &weights)?;

        if !self.dry_run {
            session.save(&project)?;
        }

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Table => self.output_table(&report),
        }
        Ok(())
    }

    fn output_table(&self, report: &AssignmentReport) {
        if report.buckets.is_empty() {
            println!("{}", "Nothing to assign.".dim());
            return;
        }

        for bucket in &report.buckets {
            match bucket.kind {
                BucketKind::Delegations => println!("Delegations of {}", bucket.size),
                BucketKind::Singles => println!("Single participants"),
            }
            for m in &bucket.matches {
                let rank = m
                    .rank
                    .map_or_else(|| "unranked".dim(), |rank| format!("#{rank}"));
                println!("  {} → {} ({rank}, cost {:.2})", m.group, m.seat, m.cost);
            }
            for group in &bucket.unmatched {
                println!("  {}", format!("{group} → no seat").warning());
            }
        }

        println!();
        let placed = report.matches().count();
        let unmatched = report.unmatched().count();
        let summary = format!(
            "{placed} placed, {unmatched} without a seat, total cost {:.2}",
            report.total_cost()
        );
        if unmatched == 0 {
            println!("{}", summary.success());
        } else {
            println!("{}", summary.warning());
        }
        if self.dry_run {
            println!("{}", "Dry run: nothing was saved.".dim());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auto(args: &[&str]) -> Auto {
        Auto::try_parse_from(std::iter::once("auto").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_to_largest_first_with_everything() {
        assert_eq!(auto(&[]).settings(), AutoAssign::default());
    }

    #[test]
    fn explicit_sizes_override_order() {
        let settings = auto(&["--sizes", "3,1"]).settings();
        assert_eq!(settings.order, SizeOrder::Explicit(vec![3, 1]));
    }

    #[test]
    fn seat_kinds_can_be_excluded() {
        let settings = auto(&["--no-nations", "--no-singles"]).settings();
        assert!(!settings.seats.nations);
        assert!(settings.seats.non_state_actors);
        assert!(!settings.include_singles);
    }
}
