//! Evaluator commands that change one group at a time.

use assistant::{GroupId, SeatRef};
use clap::Parser;
use dialoguer::Confirm;
use tracing::instrument;

use super::{
    Session, parse_group_id, parse_seat,
    terminal::Colorize,
};

#[derive(Debug, Parser)]
pub struct Evaluate {
    /// The applicant group
    #[arg(value_parser = parse_group_id)]
    group: GroupId,

    /// The rating; higher is better
    #[arg(required_unless_present = "clear")]
    score: Option<u32>,

    /// Remove the rating instead
    #[arg(long, conflicts_with = "score")]
    clear: bool,
}

impl Evaluate {
    #[instrument(level = "debug", skip(self, session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        session.update(|project| {
            match self.score {
                Some(score) if !self.clear => project.registry.evaluate(&self.group, score)?,
                _ => project.registry.clear_evaluation(&self.group)?,
            }
            Ok(())
        })?;

        match self.score {
            Some(score) if !self.clear => println!("Rated {} with {score}", self.group),
            _ => println!("Cleared the rating of {}", self.group),
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Flag {
    /// The applicant group
    #[arg(value_parser = parse_group_id)]
    group: GroupId,
}

impl Flag {
    #[instrument(level = "debug", skip(self, session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let flagged = session.update(|project| Ok(project.registry.toggle_flag(&self.group)?))?;
        if flagged {
            println!("Flagged {}", self.group);
        } else {
            println!("Unflagged {}", self.group);
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Disqualify {
    /// The applicant group
    #[arg(value_parser = parse_group_id)]
    group: GroupId,
}

impl Disqualify {
    #[instrument(level = "debug", skip(self, session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let disqualified =
            session.update(|project| Ok(project.registry.toggle_disqualify(&self.group)?))?;
        if disqualified {
            println!("{}", format!("Disqualified {}", self.group).warning());
        } else {
            println!("Requalified {}", self.group);
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct AssignSeat {
    /// The applicant group
    #[arg(value_parser = parse_group_id)]
    group: GroupId,

    /// The seat, as nation:<alpha3>, nsa:<id> or role:<id>
    #[arg(value_parser = parse_seat)]
    seat: SeatRef,
}

impl AssignSeat {
    #[instrument(level = "debug", skip(self, session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let remaining = session.update(|project| {
            project.registry.assign(&self.group, self.seat.clone())?;
            Ok(project.registry.remaining_capacity(&self.seat)?)
        })?;

        println!("Assigned {} to {}", self.seat, self.group);
        if remaining.is_overbooked() {
            println!(
                "{}",
                format!("{} is overbooked (remaining {remaining})", self.seat).warning()
            );
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Unassign {
    /// The applicant group
    #[arg(value_parser = parse_group_id)]
    group: GroupId,
}

impl Unassign {
    #[instrument(level = "debug", skip(self, session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let released = session.update(|project| Ok(project.registry.unassign(&self.group)?))?;
        match released {
            Some(seat) => println!("Released {seat} from {}", self.group),
            None => println!("{}", format!("{} holds no seat", self.group).dim()),
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Reset {
    /// Seat size: every group holding a seat for this many people is unassigned
    size: u32,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

impl Reset {
    #[instrument(level = "debug", skip(self, session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        if !self.yes {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Unassign every group holding a seat of size {}?",
                    self.size
                ))
                .default(false)
                .interact()?;
            if !confirmed {
                println!("Cancelled");
                std::process::exit(130);
            }
        }

        let reset = session.update(|project| Ok(project.registry.reset_by_seat_size(self.size)))?;
        println!("Unassigned {} groups", reset.len());
        for id in reset {
            println!("  • {id}");
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Split {
    /// The delegation to split
    #[arg(value_parser = parse_group_id)]
    group: GroupId,

    /// Member ids of one new delegation (comma-separated); repeat per delegation
    #[arg(long = "into", value_name = "MEMBERS", required = true)]
    into: Vec<String>,
}

impl Split {
    pub fn buckets(&self) -> Vec<Vec<String>> {
        self.into
            .iter()
            .map(|bucket| {
                bucket
                    .split(',')
                    .map(str::trim)
                    .filter(|member| !member.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .collect()
    }

    #[instrument(level = "debug", skip(self, session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let buckets = self.buckets();
        let children = session.update(|project| Ok(project.registry.split(&self.group, &buckets)?))?;

        println!("Split {} into {} delegations:", self.group, children.len());
        for (child, members) in children.iter().zip(&buckets) {
            println!("  • {child} ({})", members.join(", "));
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Convert {
    /// The single participant
    #[arg(value_parser = parse_group_id)]
    group: GroupId,
}

impl Convert {
    #[instrument(level = "debug", skip(self, session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let delegation = session.update(|project| {
            Ok(project
                .registry
                .convert_single_to_delegation(&self.group)?)
        })?;
        println!(
            "{}",
            format!("Converted {} into delegation {delegation}", self.group).success()
        );
        Ok(())
    }
}
