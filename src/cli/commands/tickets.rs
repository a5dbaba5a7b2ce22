//! Implementation of the `drawforge tickets` command.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use crate::adapters::sqlite::SqliteTicketRepository;
use crate::cli::output::{base_table, output, CommandOutput};
use crate::domain::models::Ticket;
use crate::domain::ports::TicketRepository;

#[derive(Args, Debug)]
pub struct TicketsArgs {
    /// Draw date (YYYY-MM-DD)
    #[arg(long, short)]
    pub date: NaiveDate,

    /// Maximum tickets to show
    #[arg(long, short, default_value_t = 25)]
    pub limit: usize,
}

#[derive(Debug, serde::Serialize)]
pub struct TicketsOutput {
    pub date: NaiveDate,
    pub tickets: Vec<Ticket>,
    pub total_for_date: u64,
}

impl CommandOutput for TicketsOutput {
    fn to_human(&self) -> String {
        if self.tickets.is_empty() {
            return format!("No tickets for {}", self.date);
        }

        let mut table = base_table(&[
            "Strategy",
            "Numbers",
            "Special",
            "Confidence",
            "Result",
        ]);
        for ticket in &self.tickets {
            let whites = ticket
                .white
                .iter()
                .map(|n| format!("{:02}", n))
                .collect::<Vec<_>>()
                .join(" ");
            let result = if ticket.evaluated {
                let prize = ticket.prize_amount.unwrap_or(0.0);
                if prize > 0.0 {
                    format!("${:.0}", prize)
                } else {
                    "no win".to_string()
                }
            } else {
                "pending".to_string()
            };
            table.add_row(vec![
                ticket.strategy.as_str().to_string(),
                whites,
                format!("{:02}", ticket.special),
                format!("{:.2}", ticket.confidence),
                result,
            ]);
        }
        format!(
            "{}\n\nShowing {} of {} tickets for {}",
            table,
            self.tickets.len(),
            self.total_for_date,
            self.date
        )
    }
}

pub async fn execute(args: TicketsArgs, json_mode: bool) -> Result<()> {
    let (_, pool) = super::open_database().await?;
    let repo = SqliteTicketRepository::new(pool);

    let tickets = repo.for_draw(args.date, args.limit).await?;
    let total_for_date = repo.count_for_draw(args.date).await?;

    output(
        &TicketsOutput {
            date: args.date,
            tickets,
            total_for_date,
        },
        json_mode,
    );
    Ok(())
}
