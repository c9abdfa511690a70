use anyhow::Result;
use clap::{Parser, Subcommand};

mod api;
mod auth;
mod cmd;
mod config;
mod error;
mod utils;
mod workflow;

use cmd::{
    AccountArgs, CompanyArgs, ConnectionArgs, Ctx, GlobalOpts, MessageArgs, NavigatorArgs,
    PersonArgs, PostArgs, ResetArgs, SetupArgs, StatsArgs, WorkflowArgs,
};

/// linkedin - run LinkedIn actions through the Linked API service.
///
/// Command layout:
///   linkedin setup | reset [--all]
///   linkedin account <list|switch|rename>
///   linkedin person <fetch|search>
///   linkedin company <fetch|search>
///   linkedin connection <send|status|withdraw|remove|list|pending>
///   linkedin message <send|get>
///   linkedin navigator <person|company|message> ...
///   linkedin post <fetch|react|comment|create>
///   linkedin stats <ssi|performance|usage>
///   linkedin workflow <run|status>
///
/// Global flags / env:
///   --json            JSON envelope on stdout (default when stdout is not a terminal)
///   --fields a,b      Keep only these fields of the result
///   -q / --quiet      No progress notes on stderr
///   --no-color        Plain human output (also NO_COLOR)
///   --account NAME    Use a stored account other than the current one
///   -v / -vv          Debug / trace logging on stderr (RUST_LOG overrides)
///
/// Exit codes:
///   0 ok, 1 general, 2 auth, 3 subscription, 4 LinkedIn account,
///   5 validation, 6 rate limit, 7 network, 8 workflow timeout
#[derive(Parser, Debug)]
#[command(
    name = "linkedin",
    version,
    author,
    about = "Command-line client for Linked API: profiles, search, messaging and custom workflows",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(flatten)]
    globals: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save Linked API tokens for authentication
    Setup(SetupArgs),

    /// Remove stored Linked API tokens
    Reset(ResetArgs),

    /// Manage configured LinkedIn accounts
    Account(AccountArgs),

    /// LinkedIn person profiles
    Person(PersonArgs),

    /// LinkedIn company profiles
    Company(CompanyArgs),

    /// Connection requests and connections
    Connection(ConnectionArgs),

    /// LinkedIn messaging
    Message(MessageArgs),

    /// Sales Navigator actions
    Navigator(NavigatorArgs),

    /// Posts: fetch, react, comment, create
    Post(PostArgs),

    /// SSI, performance and API usage statistics
    Stats(StatsArgs),

    /// Custom workflows
    Workflow(WorkflowArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.globals.verbose, cli.globals.quiet);
    utils::init_logging(level);

    if let Err(err) = run(cli) {
        let failure = error::classify(&err);
        tracing::debug!("command failed: {err:#}");
        let _ = failure.write_to(&mut std::io::stderr().lock());
        std::process::exit(failure.exit.code());
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = config::Settings::from_env()?;
    let ctx = Ctx::new(cli.globals, settings);

    match cli.command {
        Commands::Setup(args) => cmd::execute_setup(args, &ctx),
        Commands::Reset(args) => cmd::execute_reset(args, &ctx),
        Commands::Account(args) => cmd::execute_account(args, &ctx),
        Commands::Person(args) => cmd::execute_person(args, &ctx),
        Commands::Company(args) => cmd::execute_company(args, &ctx),
        Commands::Connection(args) => cmd::execute_connection(args, &ctx),
        Commands::Message(args) => cmd::execute_message(args, &ctx),
        Commands::Navigator(args) => cmd::execute_navigator(args, &ctx),
        Commands::Post(args) => cmd::execute_post(args, &ctx),
        Commands::Stats(args) => cmd::execute_stats(args, &ctx),
        Commands::Workflow(args) => cmd::execute_workflow(args, &ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "linkedin",
            "person",
            "fetch",
            "https://www.linkedin.com/in/john-doe",
            "--json",
            "--fields",
            "name,headline",
            "-q",
            "--account",
            "work",
        ]);
        assert!(cli.globals.json);
        assert!(cli.globals.quiet);
        assert_eq!(cli.globals.fields.as_deref(), Some("name,headline"));
        assert_eq!(cli.globals.account.as_deref(), Some("work"));
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::parse_from(["linkedin", "-vv", "stats", "ssi"]);
        assert_eq!(cli.globals.verbose, 2);
    }
}
