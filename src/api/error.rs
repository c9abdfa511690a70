use thiserror::Error;

/// Failures reported by, or while talking to, the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The service answered with `success: false`.
    #[error("{message}")]
    Remote { kind: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The workflow did not finish before the wait deadline. It keeps running
    /// remotely and can be resumed with its id.
    #[error("Workflow {workflow_id} timed out")]
    WorkflowTimeout { workflow_id: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn remote(kind: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Remote {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Machine-readable error type, as reported in the `error` field of the
    /// stderr diagnostic.
    pub fn kind(&self) -> &str {
        match self {
            ApiError::Remote { kind, .. } => kind,
            ApiError::Http(_) => "httpError",
            ApiError::RateLimited(_) => "rateLimitExceeded",
            ApiError::WorkflowTimeout { .. } => "workflowTimeout",
            ApiError::InvalidResponse(_) => "invalidResponse",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::InvalidResponse(e.to_string())
        } else {
            ApiError::Http(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_of_remote_is_its_type() {
        let err = ApiError::remote("invalidLinkedApiToken", "bad token");
        assert_eq!(err.kind(), "invalidLinkedApiToken");
        assert_eq!(err.to_string(), "bad token");
    }

    #[test]
    fn kind_of_local_variants() {
        assert_eq!(ApiError::Http("x".into()).kind(), "httpError");
        assert_eq!(ApiError::RateLimited("x".into()).kind(), "rateLimitExceeded");
        assert_eq!(
            ApiError::WorkflowTimeout {
                workflow_id: "wf".into()
            }
            .kind(),
            "workflowTimeout"
        );
    }

    #[test]
    fn timeout_display_names_workflow() {
        let err = ApiError::WorkflowTimeout {
            workflow_id: "abc123".into(),
        };
        assert!(err.to_string().contains("abc123"));
    }
}
