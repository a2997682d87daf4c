use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::command::OutputReader;
use crate::error::DrainError;

struct DrainJob {
    reader: OutputReader,
    reply: oneshot::Sender<std::io::Result<Vec<String>>>,
}

/// A single long-lived task that drains process output.
///
/// The queue holds at most one job and the task handles jobs one at a time,
/// so there is never more than one drain in flight. A caller that stops
/// waiting (deadline exceeded) drops its reply receiver; the worker sees the
/// closed reply channel, abandons the read and takes the next job.
pub(crate) struct OutputWorker {
    jobs: Option<mpsc::Sender<DrainJob>>,
    handle: Option<JoinHandle<()>>,
}

impl OutputWorker {
    /// Must be called from within a tokio runtime.
    pub(crate) fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<DrainJob>(1);
        let handle = tokio::spawn(run_worker(rx));
        Self {
            jobs: Some(tx),
            handle: Some(handle),
        }
    }

    /// Hands `reader` to the worker and waits for every line.
    ///
    /// Dropping the returned future cancels the drain.
    pub(crate) async fn drain(&self, reader: OutputReader) -> Result<Vec<String>, DrainError> {
        let jobs = self.jobs.as_ref().ok_or(DrainError::WorkerGone)?;
        let (reply, rx) = oneshot::channel();
        jobs.send(DrainJob { reader, reply })
            .await
            .map_err(|_| DrainError::WorkerGone)?;
        rx.await
            .map_err(|_| DrainError::WorkerGone)?
            .map_err(DrainError::Io)
    }

    pub(crate) async fn shutdown(&mut self) {
        drop(self.jobs.take());
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(target: "vmtest.engine", error = %e, "output reader ended abnormally");
            }
        }
    }
}

async fn run_worker(mut jobs: mpsc::Receiver<DrainJob>) {
    while let Some(DrainJob { reader, mut reply }) = jobs.recv().await {
        let drained = tokio::select! {
            res = reader.read_lines() => Some(res),
            _ = reply.closed() => None,
        };
        match drained {
            Some(res) => {
                let _ = reply.send(res);
            }
            None => {
                tracing::debug!(target: "vmtest.engine", "output drain abandoned by caller");
            }
        }
    }
    tracing::debug!(target: "vmtest.engine", "output reader stopped");
}
