/*!
Exit codes and the outermost error classifier. Success is a plain return
from `main` (exit 0); everything else lands here.

Commands return `anyhow::Result<()>`. `classify` walks the error chain and
picks the first known type:
  AuthError   -> plain message, exit 2
  ApiError    -> JSON diagnostic, exit code by remote error type
  UsageError  -> plain message, its own exit code
  anything    -> JSON `unexpectedError`, exit 1
*/

use serde::Serialize;
use std::io::Write;
use thiserror::Error;

use crate::api::ApiError;
use crate::auth::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    General = 1,
    Auth = 2,
    Subscription = 3,
    Account = 4,
    Validation = 5,
    RateLimit = 6,
    Network = 7,
    Timeout = 8,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Bad command-line input detected before (or instead of) a remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UsageError {
    pub exit: ExitCode,
    pub message: String,
}

impl UsageError {
    pub fn new(exit: ExitCode, message: impl Into<String>) -> Self {
        Self {
            exit,
            message: message.into(),
        }
    }
}

/// What the process reports on stderr before exiting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliFailure {
    #[serde(skip)]
    pub exit: ExitCode,
    /// Emit `message` as-is instead of the JSON diagnostic line.
    #[serde(skip)]
    pub plain: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
}

impl CliFailure {
    pub fn from_api_error(err: &ApiError) -> Self {
        let (exit, message, workflow_id) = match err {
            ApiError::WorkflowTimeout { workflow_id } => (
                ExitCode::Timeout,
                format!(
                    "Workflow timed out. Use 'linkedin workflow status {workflow_id} --wait' to continue polling."
                ),
                Some(workflow_id.clone()),
            ),
            ApiError::Http(_) => (ExitCode::Network, err.to_string(), None),
            ApiError::RateLimited(_) => (ExitCode::RateLimit, err.to_string(), None),
            ApiError::InvalidResponse(_) => (ExitCode::General, err.to_string(), None),
            ApiError::Remote { kind, message } => {
                (exit_for_remote_type(kind), message.clone(), None)
            }
        };
        Self {
            exit,
            plain: false,
            error: err.kind().to_string(),
            message,
            workflow_id,
        }
    }

    pub fn write_to(&self, out: &mut impl Write) -> std::io::Result<()> {
        if self.plain {
            return writeln!(out, "{}", self.message);
        }
        let line = serde_json::to_string(self).map_err(std::io::Error::other)?;
        writeln!(out, "{line}")
    }
}

pub fn exit_for_remote_type(kind: &str) -> ExitCode {
    match kind {
        "linkedApiTokenRequired"
        | "invalidLinkedApiToken"
        | "identificationTokenRequired"
        | "invalidIdentificationToken" => ExitCode::Auth,
        "subscriptionRequired" | "plusPlanRequired" => ExitCode::Subscription,
        "linkedinAccountSignedOut" | "languageNotSupported" => ExitCode::Account,
        "invalidRequestPayload" | "invalidWorkflow" => ExitCode::Validation,
        "rateLimitExceeded" => ExitCode::RateLimit,
        "httpError" => ExitCode::Network,
        _ => ExitCode::General,
    }
}

pub fn classify(err: &anyhow::Error) -> CliFailure {
    for cause in err.chain() {
        if let Some(auth) = cause.downcast_ref::<AuthError>() {
            return CliFailure {
                exit: ExitCode::Auth,
                plain: true,
                error: "authenticationRequired".into(),
                message: auth.to_string(),
                workflow_id: None,
            };
        }
        if let Some(api) = cause.downcast_ref::<ApiError>() {
            return CliFailure::from_api_error(api);
        }
        if let Some(usage) = cause.downcast_ref::<UsageError>() {
            return CliFailure {
                exit: usage.exit,
                plain: true,
                error: "usageError".into(),
                message: usage.message.clone(),
                workflow_id: None,
            };
        }
    }

    CliFailure {
        exit: ExitCode::General,
        plain: false,
        error: "unexpectedError".into(),
        message: format!("{err:#}"),
        workflow_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn remote_types_map_to_exit_codes() {
        assert_eq!(exit_for_remote_type("invalidLinkedApiToken"), ExitCode::Auth);
        assert_eq!(exit_for_remote_type("plusPlanRequired"), ExitCode::Subscription);
        assert_eq!(exit_for_remote_type("linkedinAccountSignedOut"), ExitCode::Account);
        assert_eq!(exit_for_remote_type("invalidWorkflow"), ExitCode::Validation);
        assert_eq!(exit_for_remote_type("rateLimitExceeded"), ExitCode::RateLimit);
        assert_eq!(exit_for_remote_type("httpError"), ExitCode::Network);
        assert_eq!(exit_for_remote_type("somethingNew"), ExitCode::General);
    }

    #[test]
    fn exit_code_values_are_stable() {
        let codes: Vec<i32> = [
            ExitCode::General,
            ExitCode::Auth,
            ExitCode::Subscription,
            ExitCode::Account,
            ExitCode::Validation,
            ExitCode::RateLimit,
            ExitCode::Network,
            ExitCode::Timeout,
        ]
        .iter()
        .map(|c| c.code())
        .collect();
        assert_eq!(codes, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn timeout_carries_workflow_id() {
        let err = anyhow::Error::new(ApiError::WorkflowTimeout {
            workflow_id: "wf_9".into(),
        });
        let failure = classify(&err);
        assert_eq!(failure.exit, ExitCode::Timeout);
        assert_eq!(failure.workflow_id.as_deref(), Some("wf_9"));

        let mut out = Vec::new();
        failure.write_to(&mut out).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["error"], "workflowTimeout");
        assert_eq!(v["workflowId"], "wf_9");
        assert!(v["message"].as_str().unwrap().contains("workflow status wf_9 --wait"));
    }

    #[test]
    fn auth_error_found_through_context() {
        let err = Err::<(), _>(AuthError::NotConfigured)
            .context("building client")
            .unwrap_err();
        let failure = classify(&err);
        assert_eq!(failure.exit, ExitCode::Auth);
        assert!(failure.plain);
    }

    #[test]
    fn usage_error_keeps_its_code() {
        let err = anyhow::Error::new(UsageError::new(ExitCode::Validation, "No workflow"));
        let failure = classify(&err);
        assert_eq!(failure.exit, ExitCode::Validation);
        let mut out = Vec::new();
        failure.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No workflow\n");
    }

    #[test]
    fn unknown_error_is_general() {
        let err = anyhow::anyhow!("boom");
        let failure = classify(&err);
        assert_eq!(failure.exit, ExitCode::General);
        assert_eq!(failure.error, "unexpectedError");
        assert_eq!(failure.message, "boom");
    }
}
