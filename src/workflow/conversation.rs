/*!
conversation.rs - two-phase conversation fetch.

  Poll1   poll the single target; no errors -> done with that item
  Sync    any error means "not synced yet": run the sync job to completion
  Poll2   poll again; whatever comes back is final (no third attempt)

Polling is cheap; syncing is paid once per (account, counterpart), so the
first poll optimistically assumes a previous sync already happened.
*/

use async_trait::async_trait;
use serde::Serialize;
use std::io::Write;

use super::runner::{Progress, run_workflow};
use super::{Operation, ResultEnvelope};
use crate::api::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChannelKind {
    /// Standard LinkedIn messaging
    #[serde(rename = "st")]
    Standard,
    /// Sales Navigator inbox
    #[serde(rename = "nv")]
    SalesNavigator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTarget {
    pub person_url: String,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
}

/// Batch poll primitive. Item-level errors mean the conversation has not been
/// synchronized yet; they are not transport failures.
#[async_trait]
pub trait ConversationPoller: Send + Sync {
    type Conversation: Send + 'static;

    async fn poll_conversations(
        &self,
        targets: &[ConversationTarget],
    ) -> Result<ResultEnvelope<Vec<Self::Conversation>>, ApiError>;
}

pub async fn fetch_conversation<P, S, W>(
    poller: &P,
    sync: &S,
    target: &ConversationTarget,
    sync_params: S::Params,
    progress: &mut Progress<W>,
) -> Result<ResultEnvelope<P::Conversation>, ApiError>
where
    P: ConversationPoller + ?Sized,
    S: Operation + ?Sized,
    W: Write,
{
    progress.note("Fetching conversation...");

    let targets = std::slice::from_ref(target);
    let first = poller.poll_conversations(targets).await?;
    if first.errors.is_empty() {
        return Ok(ResultEnvelope {
            data: first_item(first.data),
            errors: Vec::new(),
        });
    }

    tracing::debug!(
        "conversation with {} not synced ({} error(s)); syncing",
        target.person_url,
        first.errors.len()
    );
    progress.note("Syncing conversation (first time, may take a moment)...");
    run_workflow(sync, sync_params, progress).await?;

    let second = poller.poll_conversations(targets).await?;
    Ok(ResultEnvelope {
        data: first_item(second.data),
        errors: second.errors,
    })
}

fn first_item<T>(items: Option<Vec<T>>) -> Option<T> {
    items.and_then(|v| v.into_iter().next())
}
