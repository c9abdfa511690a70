//! Job execution: submit, wait for the result, hand the envelope back.
//!
//! Progress notes go to a diagnostic sink (stderr in the binary) and are
//! dropped entirely in quiet mode. No retries and no local timeout: errors
//! from `execute` and `result` are returned exactly as produced.

use std::io::{self, Write};

use super::{Operation, ResultEnvelope};
use crate::api::ApiError;

/// Human progress reporter for the diagnostic stream.
pub struct Progress<W: Write = io::Stderr> {
    quiet: bool,
    sink: W,
}

impl Progress<io::Stderr> {
    pub fn stderr(quiet: bool) -> Self {
        Self::new(quiet, io::stderr())
    }
}

impl<W: Write> Progress<W> {
    pub fn new(quiet: bool, sink: W) -> Self {
        Self { quiet, sink }
    }

    pub fn note(&mut self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        // A closed stderr must not fail the command.
        let _ = writeln!(self.sink, "{}", msg.as_ref());
        let _ = self.sink.flush();
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.sink
    }
}

pub async fn run_workflow<O, W>(
    operation: &O,
    params: O::Params,
    progress: &mut Progress<W>,
) -> Result<ResultEnvelope<O::Output>, ApiError>
where
    O: Operation + ?Sized,
    W: Write,
{
    progress.note("Executing...");

    let handle = operation.execute(params).await?;
    tracing::debug!("workflow submitted: {handle}");
    progress.note(format!("Workflow started: {handle}"));
    progress.note("Waiting for result...");

    let envelope = operation.result(&handle).await?;
    tracing::debug!(
        "workflow {handle} finished: data={} errors={}",
        envelope.data.is_some(),
        envelope.errors.len()
    );
    progress.note("Done.");

    Ok(envelope)
}

/// Same lifecycle for actions without a meaningful payload; only the
/// envelope's errors matter to the caller.
pub async fn run_void_workflow<O, W>(
    operation: &O,
    params: O::Params,
    progress: &mut Progress<W>,
) -> Result<ResultEnvelope<()>, ApiError>
where
    O: Operation + ?Sized,
    W: Write,
{
    let envelope = run_workflow(operation, params, progress).await?;
    Ok(envelope.map(|_| ()))
}
