/*!
`connection.rs`

  linkedin connection send <url> [--note N --email E]
  linkedin connection status <url>
  linkedin connection withdraw <url> [--no-unfollow]
  linkedin connection remove <url>
  linkedin connection list [--limit --since + filters]
  linkedin connection pending
*/

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::{Value, json};

use super::shared::{Ctx, Params};
use crate::api::Action;

#[derive(Args, Debug)]
pub struct ConnectionArgs {
    #[command(subcommand)]
    pub command: ConnectionCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConnectionCommand {
    /// Send a connection request
    Send {
        /// LinkedIn profile URL
        url: String,

        /// Personalized note to include with the request
        #[arg(long)]
        note: Option<String>,

        /// Email address (required by some profiles)
        #[arg(long)]
        email: Option<String>,
    },

    /// Check the connection status with a person
    Status {
        /// LinkedIn profile URL
        url: String,
    },

    /// Withdraw a pending connection request
    Withdraw {
        /// LinkedIn profile URL
        url: String,

        /// Keep following the person after withdrawing
        #[arg(long = "no-unfollow")]
        no_unfollow: bool,
    },

    /// Remove an existing connection
    Remove {
        /// LinkedIn profile URL
        url: String,
    },

    /// List your LinkedIn connections
    List(ListArgs),

    /// List pending connection requests
    Pending,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Max connections to return
    #[arg(long, value_name = "N")]
    pub limit: Option<u32>,

    /// Only connections made since ISO timestamp
    #[arg(long, value_name = "TIMESTAMP")]
    pub since: Option<String>,

    /// Filter by first name
    #[arg(long = "first-name")]
    pub first_name: Option<String>,

    /// Filter by last name
    #[arg(long = "last-name")]
    pub last_name: Option<String>,

    /// Filter by position
    #[arg(long)]
    pub position: Option<String>,

    /// Filter by locations (comma-separated)
    #[arg(long)]
    pub locations: Option<String>,

    /// Filter by industries (comma-separated)
    #[arg(long)]
    pub industries: Option<String>,

    /// Filter by current companies (comma-separated)
    #[arg(long = "current-companies")]
    pub current_companies: Option<String>,

    /// Filter by previous companies (comma-separated)
    #[arg(long = "previous-companies")]
    pub previous_companies: Option<String>,

    /// Filter by schools (comma-separated)
    #[arg(long)]
    pub schools: Option<String>,
}

pub fn execute_connection(args: ConnectionArgs, ctx: &Ctx) -> Result<()> {
    match args.command {
        ConnectionCommand::Send { url, note, email } => {
            let mut p = Params::new();
            p.set("personUrl", url).opt("note", note).opt("email", email);
            ctx.run_void_action(
                Action::SendConnectionRequest,
                p.into_value(),
                "Connection request sent.",
            )
        }
        ConnectionCommand::Status { url } => {
            ctx.run_action(Action::CheckConnectionStatus, json!({ "personUrl": url }))
        }
        ConnectionCommand::Withdraw { url, no_unfollow } => ctx.run_void_action(
            Action::WithdrawConnectionRequest,
            json!({ "personUrl": url, "unfollow": !no_unfollow }),
            "Connection request withdrawn.",
        ),
        ConnectionCommand::Remove { url } => ctx.run_void_action(
            Action::RemoveConnection,
            json!({ "personUrl": url }),
            "Connection removed.",
        ),
        ConnectionCommand::List(a) => ctx.run_action(Action::RetrieveConnections, list_params(a)),
        ConnectionCommand::Pending => ctx.run_action(Action::RetrievePendingRequests, Value::Null),
    }
}

fn list_params(a: ListArgs) -> Value {
    let mut filter = Params::new();
    filter
        .opt("firstName", a.first_name)
        .opt("lastName", a.last_name)
        .opt("position", a.position)
        .csv("locations", a.locations.as_deref())
        .csv("industries", a.industries.as_deref())
        .csv("currentCompanies", a.current_companies.as_deref())
        .csv("previousCompanies", a.previous_companies.as_deref())
        .csv("schools", a.schools.as_deref());

    let mut p = Params::new();
    p.opt("limit", a.limit)
        .opt("since", a.since)
        .nested("filter", filter);
    p.into_value()
}
