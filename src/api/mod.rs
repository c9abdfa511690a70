//! HTTP binding for the Linked API service.
//!
//! LinkedApi::new(tokens, settings) -> authenticated client
//! LinkedApi::action(Action) / custom_workflow() -> `Operation` per job kind
//! LinkedApi implements `ConversationPoller` for the two-phase fetch.
//!
//! Every response uses the `{ success, result, error }` envelope. Transport
//! problems become `ApiError::Http`, HTTP 429 `ApiError::RateLimited`, and
//! `success: false` `ApiError::Remote` with the service's own error type.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

use crate::auth::Tokens;
use crate::config::Settings;
use crate::workflow::{
    ActionError, ConversationPoller, ConversationTarget, JobHandle, JobStatus, Operation,
    ResultEnvelope,
};

pub mod action;
pub mod error;

pub use action::Action;
pub use error::ApiError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/* ---- Wire Types ---- */

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    result: Option<T>,
    error: Option<ActionError>,
    #[serde(default)]
    errors: Vec<ActionError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Submitted {
    workflow_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowState {
    workflow_id: String,
    workflow_status: String,
    completion: Option<Completion>,
}

#[derive(Debug, Default, Deserialize)]
struct Completion {
    data: Option<Value>,
    error: Option<ActionError>,
    #[serde(default)]
    errors: Vec<ActionError>,
}

impl Completion {
    fn into_envelope(self) -> ResultEnvelope<Value> {
        let mut errors = self.errors;
        if let Some(e) = self.error {
            errors.insert(0, e);
        }
        ResultEnvelope {
            data: self.data.filter(|d| !d.is_null()),
            errors,
        }
    }
}

fn is_running(status: &str) -> bool {
    matches!(status, "running" | "pending" | "queued")
}

impl WorkflowState {
    fn into_status(self) -> JobStatus<Value> {
        if is_running(&self.workflow_status) {
            return JobStatus::Running;
        }
        let failed = self.workflow_status == "failed";
        let mut envelope = self.completion.unwrap_or_default().into_envelope();
        if failed && envelope.errors.is_empty() {
            envelope.errors.push(ActionError::new(
                "workflowFailed",
                format!("Workflow {} failed", self.workflow_id),
            ));
        }
        JobStatus::Finished(envelope)
    }
}

/// Decode one HTTP exchange into the service envelope.
fn parse_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<Envelope<T>, ApiError> {
    if status == 429 {
        return Err(ApiError::RateLimited(body.to_string()));
    }

    let envelope: Envelope<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !(200..300).contains(&status) => {
            return Err(ApiError::Http(format!("HTTP {status}: {body}")));
        }
        Err(e) => return Err(ApiError::InvalidResponse(e.to_string())),
    };

    if !envelope.success {
        return Err(match envelope.error {
            Some(e) => ApiError::Remote {
                kind: e.kind,
                message: e.message,
            },
            None => ApiError::remote(
                "unknownError",
                format!("request failed with HTTP {status}"),
            ),
        });
    }
    Ok(envelope)
}

/* ---- Client ---- */

pub struct LinkedApi {
    http: reqwest::Client,
    base: Url,
    poll_interval: Duration,
    workflow_timeout: Duration,
}

impl LinkedApi {
    pub fn new(tokens: &Tokens, settings: &Settings) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("linked-api-token"),
            header_value(&tokens.service_token, "invalidLinkedApiToken")?,
        );
        headers.insert(
            HeaderName::from_static("identification-token"),
            header_value(&tokens.identity_token, "invalidIdentificationToken")?,
        );
        headers.insert(HeaderName::from_static("client"), HeaderValue::from_static("cli"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base: settings.api_base.clone(),
            poll_interval: settings.poll_interval,
            workflow_timeout: settings.workflow_timeout,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        endpoint(&self.base, segments)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<Envelope<T>, ApiError> {
        tracing::debug!("{what}");
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::debug!("{what} -> HTTP {status}");
        tracing::trace!("{what} body: {body}");
        parse_response(status, &body)
    }

    pub async fn submit_workflow(&self, definition: &Value) -> Result<JobHandle, ApiError> {
        let url = self.endpoint(&["workflows"])?;
        let envelope: Envelope<Submitted> = self
            .send(self.http.post(url).json(definition), "POST /workflows")
            .await?;
        envelope
            .result
            .map(|s| JobHandle::new(s.workflow_id))
            .ok_or_else(|| ApiError::InvalidResponse("missing workflowId".into()))
    }

    pub async fn workflow_status(&self, handle: &JobHandle) -> Result<JobStatus<Value>, ApiError> {
        let url = self.endpoint(&["workflows", handle.as_str()])?;
        let envelope: Envelope<WorkflowState> = self
            .send(self.http.get(url), &format!("GET /workflows/{handle}"))
            .await?;
        envelope
            .result
            .map(WorkflowState::into_status)
            .ok_or_else(|| ApiError::InvalidResponse("missing workflow state".into()))
    }

    /// Poll the workflow until it leaves the running state or the deadline
    /// passes.
    pub async fn wait_for_workflow(
        &self,
        handle: &JobHandle,
    ) -> Result<ResultEnvelope<Value>, ApiError> {
        let deadline = Instant::now() + self.workflow_timeout;
        loop {
            if let JobStatus::Finished(envelope) = self.workflow_status(handle).await? {
                return Ok(envelope);
            }
            if Instant::now() + self.poll_interval > deadline {
                return Err(ApiError::WorkflowTimeout {
                    workflow_id: handle.to_string(),
                });
            }
            tracing::trace!("workflow {handle} still running");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    pub async fn account_info(&self) -> Result<ResultEnvelope<Value>, ApiError> {
        let url = self.endpoint(&["account"])?;
        let envelope: Envelope<Value> = self.send(self.http.get(url), "GET /account").await?;
        Ok(ResultEnvelope {
            data: envelope.result,
            errors: envelope.errors,
        })
    }

    pub async fn api_usage(&self, start: &str, end: &str) -> Result<ResultEnvelope<Value>, ApiError> {
        let mut url = self.endpoint(&["stats", "usage"])?;
        url.query_pairs_mut()
            .append_pair("start", start)
            .append_pair("end", end);
        let envelope: Envelope<Value> = self.send(self.http.get(url), "GET /stats/usage").await?;
        Ok(ResultEnvelope {
            data: envelope.result,
            errors: envelope.errors,
        })
    }

    /// Job kind for a predefined action.
    pub fn action(&self, action: Action) -> WorkflowOperation<'_> {
        WorkflowOperation {
            api: self,
            action: Some(action),
        }
    }

    /// Job kind whose params are a complete user-supplied workflow definition.
    pub fn custom_workflow(&self) -> WorkflowOperation<'_> {
        WorkflowOperation {
            api: self,
            action: None,
        }
    }
}

/// Append path segments to the API base. Each segment is percent-encoded, so
/// ids taken from the command line cannot reach other routes.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ApiError::Http(format!("API base cannot carry a path: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn header_value(token: &str, kind: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(token.trim())
        .map_err(|_| ApiError::remote(kind, "Token contains characters that are not allowed"))
}

#[async_trait]
impl ConversationPoller for LinkedApi {
    type Conversation = Value;

    async fn poll_conversations(
        &self,
        targets: &[ConversationTarget],
    ) -> Result<ResultEnvelope<Vec<Value>>, ApiError> {
        let url = self.endpoint(&["conversations", "poll"])?;
        let envelope: Envelope<Vec<Value>> = self
            .send(self.http.post(url).json(targets), "POST /conversations/poll")
            .await?;
        Ok(ResultEnvelope {
            data: envelope.result,
            errors: envelope.errors,
        })
    }
}

/* ---- Operation ---- */

pub struct WorkflowOperation<'a> {
    api: &'a LinkedApi,
    action: Option<Action>,
}

#[async_trait]
impl<'a> Operation for WorkflowOperation<'a> {
    type Params = Value;
    type Output = Value;

    async fn execute(&self, params: Value) -> Result<JobHandle, ApiError> {
        let definition = match self.action {
            Some(action) => action.definition(params),
            None => params,
        };
        self.api.submit_workflow(&definition).await
    }

    async fn result(&self, handle: &JobHandle) -> Result<ResultEnvelope<Value>, ApiError> {
        self.api.wait_for_workflow(handle).await
    }

    async fn status(&self, handle: &JobHandle) -> Result<JobStatus<Value>, ApiError> {
        self.api.workflow_status(handle).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_joins_segments_onto_base() {
        let base = Url::parse("https://api.linkedapi.io").unwrap();
        assert_eq!(
            endpoint(&base, &["conversations", "poll"]).unwrap().as_str(),
            "https://api.linkedapi.io/conversations/poll"
        );
        let prefixed = Url::parse("http://127.0.0.1:9/v1/").unwrap();
        assert_eq!(
            endpoint(&prefixed, &["workflows"]).unwrap().as_str(),
            "http://127.0.0.1:9/v1/workflows"
        );
    }

    #[test]
    fn workflow_id_stays_one_path_segment() {
        let base = Url::parse("http://127.0.0.1:9").unwrap();
        let url = |id: &str| {
            let handle = JobHandle::new(id);
            endpoint(&base, &["workflows", handle.as_str()]).unwrap()
        };
        assert_eq!(url("a/b?c").as_str(), "http://127.0.0.1:9/workflows/a%2Fb%3Fc");
        assert_eq!(url("../account").path(), "/workflows/..%2Faccount");
        assert_eq!(url("x#frag").fragment(), None);
        assert_eq!(url("x?start=1").query(), None);
    }

    #[test]
    fn rate_limit_status_wins_over_body() {
        let err = parse_response::<Value>(429, "slow down").unwrap_err();
        assert_eq!(err, ApiError::RateLimited("slow down".into()));
    }

    #[test]
    fn unsuccessful_envelope_becomes_remote_error() {
        let body = r#"{"success":false,"error":{"type":"invalidLinkedApiToken","message":"Invalid token"}}"#;
        let err = parse_response::<Value>(401, body).unwrap_err();
        assert_eq!(err, ApiError::remote("invalidLinkedApiToken", "Invalid token"));
    }

    #[test]
    fn non_json_error_page_is_http_error() {
        let err = parse_response::<Value>(502, "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, ApiError::Http(msg) if msg.contains("502")));
    }

    #[test]
    fn garbage_success_body_is_invalid_response() {
        let err = parse_response::<Value>(200, "nope").unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn successful_envelope_keeps_item_errors() {
        let body = r#"{"success":true,"result":[{"personUrl":"u"}],"errors":[{"type":"conversationsNotSynced","message":"sync first"}]}"#;
        let envelope = parse_response::<Vec<Value>>(200, body).unwrap();
        assert_eq!(envelope.result.unwrap().len(), 1);
        assert_eq!(envelope.errors[0].kind, "conversationsNotSynced");
    }

    #[test]
    fn running_states_are_not_terminal() {
        for s in ["running", "pending", "queued"] {
            let state = WorkflowState {
                workflow_id: "wf".into(),
                workflow_status: s.into(),
                completion: None,
            };
            assert_eq!(state.into_status(), JobStatus::Running);
        }
    }

    #[test]
    fn completed_state_maps_completion() {
        let state: WorkflowState = serde_json::from_value(json!({
            "workflowId": "wf_1",
            "workflowStatus": "completed",
            "completion": {
                "data": {"name": "John"},
                "errors": [{"type": "postNotFound", "message": "gone"}]
            }
        }))
        .unwrap();
        let JobStatus::Finished(envelope) = state.into_status() else {
            panic!("expected finished status");
        };
        assert_eq!(envelope.data, Some(json!({"name": "John"})));
        assert_eq!(envelope.errors[0].kind, "postNotFound");
    }

    #[test]
    fn failed_state_without_details_reports_failure() {
        let state = WorkflowState {
            workflow_id: "wf_2".into(),
            workflow_status: "failed".into(),
            completion: None,
        };
        let JobStatus::Finished(envelope) = state.into_status() else {
            panic!("expected finished status");
        };
        assert!(envelope.is_failure());
        assert_eq!(envelope.errors[0].kind, "workflowFailed");
    }

    #[test]
    fn single_error_and_null_data_in_completion() {
        let completion: Completion = serde_json::from_value(json!({
            "data": null,
            "error": {"type": "personNotFound", "message": "missing"}
        }))
        .unwrap();
        let envelope = completion.into_envelope();
        assert!(envelope.is_failure());
        assert_eq!(envelope.errors.len(), 1);
    }
}
