//! Test fixtures shared by the pipeline modules.

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::task::{Context, Poll};

use async_compression::tokio::bufread::GzipEncoder;
use async_trait::async_trait;
use index_restore_repository::{
    BatchOperationResult, BatchOperationSummary, BulkItemFailure, IndexOperation,
    SearchIndexError, SearchIndexProvider,
};
use serde_json::json;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

/// Gzip `data` into a single member.
pub(crate) async fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzipEncoder::new(data);
    let mut out = Vec::new();
    encoder.read_to_end(&mut out).await.unwrap();
    out
}

/// Archive source whose connection resets after `data` is served.
pub(crate) struct DroppedConnection {
    data: Vec<u8>,
    served: usize,
}

impl DroppedConnection {
    pub(crate) fn after(data: Vec<u8>) -> Self {
        Self { data, served: 0 }
    }
}

impl AsyncRead for DroppedConnection {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let rest = self.data.len() - self.served;
        if rest == 0 {
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")));
        }
        let n = rest.min(buf.remaining());
        let start = self.served;
        buf.put_slice(&self.data[start..start + n]);
        self.served += n;
        Poll::Ready(Ok(()))
    }
}

/// A rejected bulk item as the engine would report it.
pub(crate) fn rejection(id: &str) -> BulkItemFailure {
    BulkItemFailure {
        index: Some("logs".to_string()),
        id: Some(id.to_string()),
        status: 400,
        error_type: Some("mapper_parsing_exception".to_string()),
        reason: Some("failed to parse field [ts]".to_string()),
        raw: json!({
            "type": "mapper_parsing_exception",
            "reason": "failed to parse field [ts]"
        }),
    }
}

/// Outcome a [`MockProvider`] produces for one bulk call.
pub(crate) enum Canned {
    /// Every item succeeds.
    Accept,
    /// The item at this position is rejected.
    RejectAt(usize),
    /// The request fails before any item is processed.
    Transport,
}

/// Mock provider that records every batch and replays canned outcomes.
///
/// Calls beyond the scripted outcomes are accepted.
pub(crate) struct MockProvider {
    script: Mutex<Vec<Canned>>,
    calls: AtomicUsize,
    batches: Mutex<Vec<Vec<IndexOperation>>>,
}

impl MockProvider {
    pub(crate) fn accepting() -> Self {
        Self::scripted(Vec::new())
    }

    pub(crate) fn scripted(script: Vec<Canned>) -> Self {
        let mut script = script;
        script.reverse();
        Self {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
            batches: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(Vec::len).collect()
    }

    pub(crate) fn batches(&self) -> Vec<Vec<IndexOperation>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchIndexProvider for MockProvider {
    async fn bulk_index(
        &self,
        operations: &[IndexOperation],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches.lock().unwrap().push(operations.to_vec());

        let outcome = self.script.lock().unwrap().pop().unwrap_or(Canned::Accept);
        match outcome {
            Canned::Accept => Ok(BatchOperationSummary::from_results(
                (0..operations.len()).map(BatchOperationResult::succeeded).collect(),
            )),
            Canned::RejectAt(bad) => Ok(BatchOperationSummary::from_results(
                (0..operations.len())
                    .map(|i| {
                        if i == bad {
                            BatchOperationResult::failed(i, rejection(&i.to_string()))
                        } else {
                            BatchOperationResult::succeeded(i)
                        }
                    })
                    .collect(),
            )),
            Canned::Transport => Err(SearchIndexError::connection("connection refused")),
        }
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        Ok(true)
    }
}
