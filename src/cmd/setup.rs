/*!
`setup.rs`

Stores a Linked API token pair after checking it against the service.

  linkedin setup                                         (masked prompts, TTY only)
  linkedin setup --linked-api-token=xxx --identification-token=yyy

The account is saved under the remote account name (or `default`), replaces
any entry with the same identification token, and becomes current.
*/

use anyhow::{Context, Result};
use clap::Args;
use dialoguer::Password;
use serde_json::Value;
use std::io::{self, Write};

use super::shared::{Ctx, block_on};
use crate::api::LinkedApi;
use crate::auth::{AccountEntry, Tokens};
use crate::config::Settings;
use crate::error::{ExitCode, UsageError};

const NON_INTERACTIVE_HELP: &str = "Cannot run interactive setup in non-interactive mode.
Use flags instead:

  linkedin setup --linked-api-token=xxx --identification-token=yyy

Get tokens at https://app.linkedapi.io";

const INVALID_TOKENS_HELP: &str = "
Invalid tokens. Make sure you copied the correct tokens from https://app.linkedapi.io
Need help? Visit https://linkedapi.io/docs/making-requests";

#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Linked API Token (for non-interactive use)
    #[arg(long = "linked-api-token", value_name = "TOKEN")]
    pub linked_api_token: Option<String>,

    /// Identification Token (for non-interactive use)
    #[arg(long = "identification-token", value_name = "TOKEN")]
    pub identification_token: Option<String>,
}

pub fn execute_setup(args: SetupArgs, ctx: &Ctx) -> Result<()> {
    let (service_token, identity_token) =
        match (args.linked_api_token, args.identification_token) {
            (Some(s), Some(i)) => (s, i),
            _ if !ctx.stdin_tty => {
                return Err(UsageError::new(ExitCode::Auth, NON_INTERACTIVE_HELP).into());
            }
            _ => prompt_tokens()?,
        };

    let tokens = Tokens {
        service_token: service_token.trim().to_string(),
        identity_token: identity_token.trim().to_string(),
    };
    if tokens.service_token.is_empty() || tokens.identity_token.is_empty() {
        return Err(UsageError::new(ExitCode::Auth, "Both tokens are required.").into());
    }

    print!("Verifying tokens... ");
    let _ = io::stdout().flush();

    let remote_name = match verify(&tokens, &ctx.settings) {
        Ok(name) => {
            println!("OK");
            name
        }
        Err(e) => {
            println!("FAILED");
            tracing::debug!("token verification failed: {e:#}");
            return Err(UsageError::new(ExitCode::Auth, INVALID_TOKENS_HELP).into());
        }
    };
    let display_name = account_name(remote_name);

    let store = ctx.store();
    store.add_or_replace(AccountEntry {
        name: display_name.clone(),
        service_token: tokens.service_token,
        identity_token: tokens.identity_token,
    })?;
    tracing::debug!("credentials saved to {}", store.path().display());

    println!("Account \"{display_name}\" saved and set as active.");
    Ok(())
}

/// Remote account name, when the service reports one.
fn verify(tokens: &Tokens, settings: &Settings) -> Result<Option<String>> {
    let api = LinkedApi::new(tokens, settings)?;
    let info = block_on(api.account_info())??;
    Ok(info
        .data
        .as_ref()
        .and_then(|d| d.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string))
}

fn account_name(remote: Option<String>) -> String {
    remote
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "default".to_string())
}

fn prompt_tokens() -> Result<(String, String)> {
    println!("To get your tokens, visit: https://app.linkedapi.io");
    println!(
        "(If you don't have an account yet, create one and connect your LinkedIn profile first)\n"
    );

    let service = Password::new()
        .with_prompt("Linked API Token")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read Linked API Token")?;
    let identity = Password::new()
        .with_prompt("Identification Token")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read Identification Token")?;
    Ok((service, identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: SetupArgs,
    }

    #[test]
    fn flags_parse() {
        let h = Harness::parse_from([
            "setup",
            "--linked-api-token=tok",
            "--identification-token",
            "id_1",
        ]);
        assert_eq!(h.args.linked_api_token.as_deref(), Some("tok"));
        assert_eq!(h.args.identification_token.as_deref(), Some("id_1"));
    }

    #[test]
    fn blank_remote_name_falls_back_to_default() {
        assert_eq!(account_name(None), "default");
        assert_eq!(account_name(Some("  ".into())), "default");
        assert_eq!(account_name(Some("John Doe".into())), "John Doe");
    }
}
