/*!
`workflow.rs`

  linkedin workflow run [--file FLOW.json|FLOW.yaml]   (or pipe the definition via stdin)
  linkedin workflow status <id> [--wait]

A custom workflow is one or more actions run sequentially by the service;
see https://linkedapi.io/docs/building-workflows/ for the format.
`status` without `--wait` returns immediately; with it, waiting resumes the
same way `run` does (useful after a timeout).
*/

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;
use std::path::PathBuf;

use super::shared::{Ctx, block_on, load_definition};
use crate::workflow::{JobHandle, JobStatus, Operation, ResultEnvelope, run_workflow};

#[derive(Args, Debug)]
pub struct WorkflowArgs {
    #[command(subcommand)]
    pub command: WorkflowCommand,
}

#[derive(Subcommand, Debug)]
pub enum WorkflowCommand {
    /// Execute a custom workflow definition
    Run {
        /// Path to a workflow JSON or YAML file (stdin when omitted)
        #[arg(short, long, value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// Check status of a running workflow or wait for completion
    Status {
        /// Workflow ID
        id: String,

        /// Wait for the workflow to complete
        #[arg(long)]
        wait: bool,
    },
}

pub fn execute_workflow(args: WorkflowArgs, ctx: &Ctx) -> Result<()> {
    match args.command {
        WorkflowCommand::Run { file } => {
            let api = ctx.client()?;
            let definition = load_definition(file.as_deref(), ctx.stdin_tty)?;
            let mut progress = ctx.progress();
            let result = block_on(run_workflow(
                &api.custom_workflow(),
                definition,
                &mut progress,
            ))??;
            ctx.render(result)
        }
        WorkflowCommand::Status { id, wait } => {
            let api = ctx.client()?;
            let op = api.custom_workflow();
            let handle = JobHandle::new(id);

            if wait {
                ctx.progress().note(format!("Waiting for workflow {handle}..."));
                let result = block_on(op.result(&handle))??;
                return ctx.render(result);
            }

            let result = match block_on(op.status(&handle))?? {
                JobStatus::Running => ResultEnvelope::ok(json!({
                    "workflowId": handle.as_str(),
                    "status": "running",
                })),
                JobStatus::Finished(envelope) => envelope,
            };
            ctx.render(result)
        }
    }
}
