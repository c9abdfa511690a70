/*!
Command dispatcher module: declarations and re-exports only.

Layout:
  src/cmd/
    mod.rs          (this file)
    shared.rs       GlobalOpts, Ctx, Params, runtime + definition loading
    output.rs       success / error envelopes, field selection, human rendering
    format.rs       colors, tables, key/value blocks
    setup.rs reset.rs account.rs                       local credential commands
    person.rs company.rs connection.rs message.rs
    navigator.rs post.rs stats.rs workflow.rs          remote commands

Conventions:
  - Each subcommand module exposes exactly one public `execute_*` function
    taking its clap args and `&Ctx`, returning `anyhow::Result<()>`.
  - Argument structs derive `clap::Args` / `clap::Subcommand`.
  - Remote commands go through `Ctx::run_action` / `Ctx::run_void_action`
    so progress notes and output envelopes stay uniform.
*/

pub mod account;
pub mod company;
pub mod connection;
pub mod format;
pub mod message;
pub mod navigator;
pub mod output;
pub mod person;
pub mod post;
pub mod reset;
pub mod setup;
pub mod shared;
pub mod stats;
pub mod workflow;

pub use account::{AccountArgs, execute_account};
pub use company::{CompanyArgs, execute_company};
pub use connection::{ConnectionArgs, execute_connection};
pub use message::{MessageArgs, execute_message};
pub use navigator::{NavigatorArgs, execute_navigator};
pub use person::{PersonArgs, execute_person};
pub use post::{PostArgs, execute_post};
pub use reset::{ResetArgs, execute_reset};
pub use setup::{SetupArgs, execute_setup};
pub use shared::{Ctx, GlobalOpts};
pub use stats::{StatsArgs, execute_stats};
pub use workflow::{WorkflowArgs, execute_workflow};
