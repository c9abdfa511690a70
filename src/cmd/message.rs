/*!
`message.rs`

  linkedin message send <person-url> <text>
  linkedin message get <person-url> [--since TIMESTAMP]

`get` polls the conversation first and only syncs it when the poll reports
it unknown; see `workflow::conversation`.
*/

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use super::shared::Ctx;
use crate::api::Action;
use crate::workflow::ChannelKind;

#[derive(Args, Debug)]
pub struct MessageArgs {
    #[command(subcommand)]
    pub command: MessageCommand,
}

#[derive(Subcommand, Debug)]
pub enum MessageCommand {
    /// Send a message to a LinkedIn connection
    Send {
        /// LinkedIn profile URL of the recipient
        person_url: String,

        /// Message text (up to 1900 characters)
        text: String,
    },

    /// Get conversation messages with a person
    Get {
        /// LinkedIn profile URL
        person_url: String,

        /// Retrieve messages since ISO timestamp
        #[arg(long, value_name = "TIMESTAMP")]
        since: Option<String>,
    },
}

pub fn execute_message(args: MessageArgs, ctx: &Ctx) -> Result<()> {
    match args.command {
        MessageCommand::Send { person_url, text } => ctx.run_void_action(
            Action::SendMessage,
            json!({ "personUrl": person_url, "text": text }),
            "Message sent.",
        ),
        MessageCommand::Get { person_url, since } => {
            ctx.get_conversation(ChannelKind::Standard, person_url, since)
        }
    }
}
