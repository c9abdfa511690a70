/*!
shared.rs - glue shared by every subcommand.

  GlobalOpts            flags accepted by every command
  Ctx                   globals + settings + terminal state
  Ctx::client           resolve tokens -> LinkedApi
  Ctx::run_action       one predefined action through the job engine, then the envelope
  Ctx::run_void_action  same, rendering only a success message or the first error
  Ctx::get_conversation two-phase conversation fetch for `message get` / `navigator message get`
  Params                JSON params where absent options are simply omitted
  load_definition       custom workflow from a JSON / YAML file or stdin

Each command module exposes one `execute_*` function returning
`anyhow::Result<()>`; typed errors (AuthError, ApiError, UsageError) pass
through untouched so `main` can pick the exit code.
*/

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value, json};
use std::future::Future;
use std::io::{self, Read};
use std::path::Path;

use super::format::StyleOptions;
use super::output::{OutputOptions, format_output, format_void_output};
use crate::api::{Action, LinkedApi};
use crate::auth::{CredentialStore, resolve};
use crate::config::Settings;
use crate::error::{ExitCode, UsageError};
use crate::utils;
use crate::workflow::{
    ChannelKind, ConversationTarget, Progress, ResultEnvelope, fetch_conversation,
    run_void_workflow, run_workflow,
};

/* ---- Global Flags ---- */

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Comma-separated list of fields to include in output
    #[arg(long, global = true, value_name = "FIELDS")]
    pub fields: Option<String>,

    /// Suppress progress output on stderr
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Account name to use (when multiple accounts are configured)
    #[arg(long, global = true, value_name = "NAME")]
    pub account: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/* ---- Command Context ---- */

pub struct Ctx {
    pub globals: GlobalOpts,
    pub settings: Settings,
    pub stdout_tty: bool,
    pub stdin_tty: bool,
}

impl Ctx {
    pub fn new(globals: GlobalOpts, settings: Settings) -> Self {
        Self {
            globals,
            settings,
            stdout_tty: utils::stdout_is_tty(),
            stdin_tty: utils::stdin_is_tty(),
        }
    }

    pub fn store(&self) -> CredentialStore {
        CredentialStore::from_settings(&self.settings)
    }

    pub fn style(&self) -> StyleOptions {
        StyleOptions::new(self.globals.no_color, self.stdout_tty)
    }

    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            json: self.globals.json,
            fields: self.globals.fields.clone(),
            quiet: self.globals.quiet,
            stdout_tty: self.stdout_tty,
            style: self.style(),
        }
    }

    pub fn progress(&self) -> Progress {
        Progress::stderr(self.globals.quiet)
    }

    /// Authenticated client for the selected (or current) account.
    pub fn client(&self) -> Result<LinkedApi> {
        let tokens = resolve(&self.store(), self.globals.account.as_deref())?;
        Ok(LinkedApi::new(&tokens, &self.settings)?)
    }

    pub fn render(&self, result: ResultEnvelope<Value>) -> Result<()> {
        let mut out = io::stdout().lock();
        format_output(result, &self.output_options(), &mut out)
            .context("Failed to write output")
    }

    pub fn render_void(&self, result: ResultEnvelope<()>, success_message: &str) -> Result<()> {
        let mut out = io::stdout().lock();
        format_void_output(&result.errors, success_message, &self.output_options(), &mut out)
            .context("Failed to write output")
    }

    pub fn run_action(&self, action: Action, params: Value) -> Result<()> {
        let api = self.client()?;
        let mut progress = self.progress();
        tracing::debug!("running {action}");
        let result = block_on(run_workflow(&api.action(action), params, &mut progress))??;
        self.render(result)
    }

    pub fn run_void_action(&self, action: Action, params: Value, success_message: &str) -> Result<()> {
        let api = self.client()?;
        let mut progress = self.progress();
        tracing::debug!("running {action}");
        let result = block_on(run_void_workflow(&api.action(action), params, &mut progress))??;
        self.render_void(result, success_message)
    }

    pub fn get_conversation(
        &self,
        kind: ChannelKind,
        person_url: String,
        since: Option<String>,
    ) -> Result<()> {
        let api = self.client()?;
        let sync = api.action(match kind {
            ChannelKind::Standard => Action::SyncConversation,
            ChannelKind::SalesNavigator => Action::NvSyncConversation,
        });
        let sync_params = json!({ "personUrl": person_url });
        let target = ConversationTarget {
            person_url,
            kind,
            since,
        };
        let mut progress = self.progress();
        let result = block_on(fetch_conversation(
            &api,
            &sync,
            &target,
            sync_params,
            &mut progress,
        ))??;
        self.render(result)
    }
}

/// Run one future to completion on a fresh current-thread runtime.
pub fn block_on<F: Future>(fut: F) -> Result<F::Output> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;
    Ok(rt.block_on(fut))
}

/* ---- Params ---- */

/// Action parameters. Options that are `None`, flags that are off and nested
/// configs that stay empty never reach the wire.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn opt<V: Into<Value>>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.set(key, v);
        }
        self
    }

    pub fn flag(&mut self, key: &str, on: bool) -> &mut Self {
        if on {
            self.set(key, true);
        }
        self
    }

    pub fn csv(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        self.opt(key, value.map(split_csv))
    }

    pub fn nested(&mut self, key: &str, inner: Params) -> &mut Self {
        if !inner.is_empty() {
            self.set(key, inner.into_value());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// `{limit, since}` retrieval config, empty when neither is given.
pub fn retrieval_config(limit: Option<u32>, since: Option<String>) -> Params {
    let mut config = Params::new();
    config.opt("limit", limit).opt("since", since);
    config
}

pub fn split_csv(value: &str) -> Vec<String> {
    value.split(',').map(|s| s.trim().to_string()).collect()
}

/* ---- Workflow Definition Loading ---- */

/// Read a custom workflow from `file`, or from stdin when it is piped.
pub fn load_definition(file: Option<&Path>, stdin_tty: bool) -> Result<Value> {
    if let Some(path) = file {
        return read_definition_file(path);
    }
    if stdin_tty {
        return Err(UsageError::new(
            ExitCode::Validation,
            "No workflow definition provided. Use --file or pipe via stdin.",
        )
        .into());
    }

    let mut raw = String::new();
    io::stdin()
        .read_to_string(&mut raw)
        .context("Failed to read workflow definition from stdin")?;
    if raw.trim().is_empty() {
        return Err(UsageError::new(
            ExitCode::Validation,
            "No workflow definition provided via stdin.",
        )
        .into());
    }
    parse_definition(&raw, false)
}

fn read_definition_file(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(UsageError::new(
            ExitCode::General,
            format!("File not found: {}", path.display()),
        )
        .into());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read workflow file: {}", path.display()))?;
    let lower = path.to_string_lossy().to_ascii_lowercase();
    parse_definition(&raw, lower.ends_with(".yaml") || lower.ends_with(".yml"))
}

fn parse_definition(raw: &str, yaml: bool) -> Result<Value> {
    let parsed = if yaml {
        serde_yaml::from_str::<Value>(raw).map_err(|e| {
            UsageError::new(
                ExitCode::General,
                format!("Invalid YAML in workflow definition: {e}"),
            )
        })?
    } else {
        serde_json::from_str::<Value>(raw).map_err(|_| {
            UsageError::new(ExitCode::General, "Invalid JSON in workflow definition.")
        })?
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn csv_values_are_trimmed() {
        assert_eq!(split_csv("Berlin, Paris ,London"), vec!["Berlin", "Paris", "London"]);
    }

    #[test]
    fn params_omit_absent_values() {
        let mut p = Params::new();
        p.set("personUrl", "u")
            .opt::<String>("note", None)
            .flag("retrieveSkills", false)
            .flag("retrievePosts", true)
            .csv("locations", Some("A,B"))
            .nested("postsRetrievalConfig", retrieval_config(None, None))
            .nested("commentsRetrievalConfig", retrieval_config(Some(5), None));
        assert_eq!(
            p.into_value(),
            json!({
                "personUrl": "u",
                "retrievePosts": true,
                "locations": ["A", "B"],
                "commentsRetrievalConfig": {"limit": 5}
            })
        );
    }

    #[test]
    fn yaml_definition_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flow.yaml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "actionType: st.openPersonPage\npersonUrl: https://x").unwrap();

        let v = read_definition_file(&path).unwrap();
        assert_eq!(v, json!({"actionType": "st.openPersonPage", "personUrl": "https://x"}));
    }

    #[test]
    fn json_definition_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flow.json");
        std::fs::write(&path, r#"[{"actionType":"st.retrieveSSI"}]"#).unwrap();
        assert!(read_definition_file(&path).unwrap().is_array());
    }

    #[test]
    fn missing_file_is_general_usage_error() {
        let dir = TempDir::new().unwrap();
        let err = read_definition_file(&dir.path().join("nope.json")).unwrap_err();
        let usage = err.downcast_ref::<UsageError>().unwrap();
        assert_eq!(usage.exit, ExitCode::General);
        assert!(usage.message.starts_with("File not found"));
    }

    #[test]
    fn invalid_json_is_rejected() {
        let err = parse_definition("{nope", false).unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON in workflow definition.");
    }

    #[test]
    fn tty_stdin_without_file_is_validation_error() {
        let err = load_definition(None, true).unwrap_err();
        assert_eq!(err.downcast_ref::<UsageError>().unwrap().exit, ExitCode::Validation);
    }
}
