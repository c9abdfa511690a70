/*!
`stats.rs`

  linkedin stats ssi
  linkedin stats performance
  linkedin stats usage --start <ISO> --end <ISO>

`ssi` and `performance` are workflow actions; `usage` is a direct request
against the account's API usage log.
*/

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::{Value, json};

use super::shared::{Ctx, block_on};
use crate::api::Action;

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub command: StatsCommand,
}

#[derive(Subcommand, Debug)]
pub enum StatsCommand {
    /// Retrieve your LinkedIn Social Selling Index (SSI)
    Ssi,

    /// Retrieve your LinkedIn performance analytics
    Performance,

    /// Retrieve Linked API usage statistics
    Usage {
        /// Start date (ISO timestamp)
        #[arg(long, value_name = "TIMESTAMP")]
        start: String,

        /// End date (ISO timestamp)
        #[arg(long, value_name = "TIMESTAMP")]
        end: String,
    },
}

pub fn execute_stats(args: StatsArgs, ctx: &Ctx) -> Result<()> {
    match args.command {
        StatsCommand::Ssi => ctx.run_action(Action::RetrieveSsi, json!({})),
        StatsCommand::Performance => ctx.run_action(Action::RetrievePerformance, Value::Null),
        StatsCommand::Usage { start, end } => {
            let api = ctx.client()?;
            ctx.progress().note("Fetching usage statistics...");
            let result = block_on(api.api_usage(&start, &end))??;
            ctx.render(result)
        }
    }
}
