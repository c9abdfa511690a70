/*!
Workflow vocabulary shared by the execution engine and the remote binding.

  JobHandle          - opaque id returned by submission
  ActionError        - per-item `{type, message}` failure reported by the service
  ResultEnvelope<T>  - `data` plus zero or more `ActionError`s
  JobStatus<T>       - snapshot: still running, or finished with an envelope
  Operation          - one job kind: submit / wait for result / check status

Submodules:
  runner        - submit -> wait -> fetch lifecycle with progress notes
  conversation  - poll, sync on a cache miss, poll again
*/

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::ApiError;

pub mod conversation;
pub mod runner;

pub use conversation::{ChannelKind, ConversationPoller, ConversationTarget, fetch_conversation};
pub use runner::{Progress, run_void_workflow, run_workflow};

/* ---- Data Structures ---- */

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionError {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl ActionError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Normalized outcome of a remote operation. Partial success carries both
/// `data` and `errors`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEnvelope<T> {
    pub data: Option<T>,
    pub errors: Vec<ActionError>,
}

impl<T> ResultEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn failed(errors: Vec<ActionError>) -> Self {
        Self { data: None, errors }
    }

    /// Errors and no data: nothing to render but the first error.
    pub fn is_failure(&self) -> bool {
        self.data.is_none() && !self.errors.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResultEnvelope<U> {
        ResultEnvelope {
            data: self.data.map(f),
            errors: self.errors,
        }
    }
}

impl<T> Default for ResultEnvelope<T> {
    fn default() -> Self {
        Self {
            data: None,
            errors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus<T> {
    Running,
    Finished(ResultEnvelope<T>),
}

/* ---- Operation ---- */

/// A remote job kind.
///
/// `result` blocks until the job is terminal and fails with
/// [`ApiError::WorkflowTimeout`] (carrying the handle) once the remote deadline
/// passes. `status` never waits.
#[async_trait]
pub trait Operation: Send + Sync {
    type Params: Send + 'static;
    type Output: Send + 'static;

    async fn execute(&self, params: Self::Params) -> Result<JobHandle, ApiError>;

    async fn result(&self, handle: &JobHandle) -> Result<ResultEnvelope<Self::Output>, ApiError>;

    async fn status(&self, handle: &JobHandle) -> Result<JobStatus<Self::Output>, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_failure_needs_errors_without_data() {
        let failed: ResultEnvelope<u8> = ResultEnvelope::failed(vec![ActionError::new("x", "y")]);
        assert!(failed.is_failure());

        let partial = ResultEnvelope {
            data: Some(1u8),
            errors: vec![ActionError::new("x", "y")],
        };
        assert!(!partial.is_failure());

        let empty: ResultEnvelope<u8> = ResultEnvelope::default();
        assert!(!empty.is_failure());
    }

    #[test]
    fn action_error_serializes_type_field() {
        let err = ActionError::new("personNotFound", "No such person");
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v, serde_json::json!({"type":"personNotFound","message":"No such person"}));
    }

    #[test]
    fn handle_is_transparent() {
        let h: JobHandle = serde_json::from_str("\"wf_1\"").unwrap();
        assert_eq!(h.as_str(), "wf_1");
        assert_eq!(h.to_string(), "wf_1");
    }
}
