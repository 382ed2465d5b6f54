use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use anyhow::anyhow;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{RecognizerFuture, TextBlock};
use crate::error::EngineError;

pub type RecognitionOutcome = Result<Vec<TextBlock>, EngineError>;

/// In-flight recognition. Resolves exactly once; dropping it before completion
/// aborts the underlying recognizer task.
pub struct RecognitionTask {
    runtime: Handle,
    receiver: oneshot::Receiver<RecognitionOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl RecognitionTask {
    /// Fails with a recognition error when called outside a tokio runtime.
    pub(crate) fn spawn(future: RecognizerFuture) -> Result<Self, EngineError> {
        let runtime = Handle::try_current().map_err(|err| {
            EngineError::Recognition(
                anyhow::Error::new(err).context("no tokio runtime to run recognition on"),
            )
        })?;
        let (sender, receiver) = oneshot::channel();
        let handle = runtime.spawn(async move {
            let outcome = future
                .await
                .map(|blocks| blocks.into_iter().map(TextBlock::from).collect())
                .map_err(EngineError::Recognition);
            if sender.send(outcome).is_err() {
                debug!("recognition finished after its receiver was dropped");
            }
        });
        Ok(Self {
            runtime,
            receiver,
            handle: Some(handle),
        })
    }

    pub fn on_complete<S, F>(self, on_success: S, on_failure: F) -> JoinHandle<()>
    where
        S: FnOnce(Vec<TextBlock>) + Send + 'static,
        F: FnOnce(EngineError) + Send + 'static,
    {
        let runtime = self.runtime.clone();
        runtime.spawn(async move {
            match self.await {
                Ok(blocks) => on_success(blocks),
                Err(err) => on_failure(err),
            }
        })
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Future for RecognitionTask {
    type Output = RecognitionOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => {
                self.handle = None;
                Poll::Ready(outcome)
            }
            Poll::Ready(Err(_)) => {
                self.handle = None;
                Poll::Ready(Err(EngineError::Recognition(anyhow!(
                    "recognition ended without a result"
                ))))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for RecognitionTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
