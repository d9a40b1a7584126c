//! Commit-on-threshold state machine.
//!
//! Records flow into a [`BatchAccumulator`]; the [`CommitController`] decides
//! when the pending batch is flushed to the search engine and turns the bulk
//! response into either success or a fatal [`RestoreError`].

use std::sync::Arc;
use std::time::Duration;

use index_restore_repository::{
    BatchOperationSummary, BulkItemFailure, IndexOperation, SearchIndexProvider,
};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::batch::{BatchAccumulator, PendingBatch};
use crate::errors::RestoreError;

/// Default number of operations per bulk request.
pub const DEFAULT_BATCH_SIZE: usize = 4000;

/// Where the controller is in its commit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitState {
    /// No pending batch.
    Idle,
    /// A pending batch below the threshold exists.
    Accumulating,
    /// A commit is in progress.
    Flushing,
}

/// Transition rule out of `Accumulating`.
pub fn should_flush(count: usize, threshold: usize, force: bool) -> bool {
    force || count >= threshold
}

/// Bounded retry of a whole batch after a transport failure.
///
/// Rejected items are never retried. The default performs no retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Retry up to `max_retries` times with the default backoff.
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based), doubling each time.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Counters kept by a [`CommitController`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitStats {
    /// Passes through `Flushing`, including empty forced commits.
    pub commits: usize,
    /// Bulk requests sent, not counting retries.
    pub bulk_requests: usize,
    /// Retries after transport failures.
    pub retries: usize,
    /// Operations sent to the engine.
    pub operations_submitted: usize,
    /// Size of the largest flushed batch.
    pub largest_flush: usize,
}

/// Decides when to flush and submits flushed batches.
pub struct CommitController {
    provider: Arc<dyn SearchIndexProvider>,
    accumulator: BatchAccumulator,
    threshold: usize,
    retry: RetryPolicy,
    state: CommitState,
    stats: CommitStats,
}

impl CommitController {
    /// Create a controller flushing every `threshold` operations.
    ///
    /// Fails with `InvalidConfig` if `threshold` is zero.
    pub fn new(
        provider: Arc<dyn SearchIndexProvider>,
        accumulator: BatchAccumulator,
        threshold: usize,
        retry: RetryPolicy,
    ) -> Result<Self, RestoreError> {
        if threshold == 0 {
            return Err(RestoreError::invalid_config(
                "batch size must be at least 1",
            ));
        }

        Ok(Self {
            provider,
            accumulator,
            threshold,
            retry,
            state: CommitState::Idle,
            stats: CommitStats::default(),
        })
    }

    pub fn state(&self) -> CommitState {
        self.state
    }

    pub fn stats(&self) -> CommitStats {
        self.stats
    }

    /// Operations waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.accumulator.len()
    }

    /// Offer one framed record, flushing when the threshold is reached.
    ///
    /// Returns whether the record became an operation.
    pub async fn offer(&mut self, record: &[u8]) -> Result<bool, RestoreError> {
        if !self.accumulator.push(record) {
            return Ok(false);
        }
        self.state = CommitState::Accumulating;

        self.commit(false).await?;
        Ok(true)
    }

    /// Commit the pending batch if the transition rule says so.
    ///
    /// With `force` set this always commits; an empty forced commit succeeds
    /// without contacting the engine.
    pub async fn commit(&mut self, force: bool) -> Result<(), RestoreError> {
        if !should_flush(self.accumulator.len(), self.threshold, force) {
            return Ok(());
        }

        self.state = CommitState::Flushing;
        self.stats.commits += 1;

        let result = match self.accumulator.take() {
            Some(batch) if !batch.is_empty() => self.flush(batch).await,
            _ => {
                debug!(commit = self.stats.commits, "Nothing pending, empty commit");
                Ok(())
            }
        };

        self.state = CommitState::Idle;
        result
    }

    #[instrument(skip(self, batch), fields(flush = self.stats.bulk_requests + 1, count = batch.len()))]
    async fn flush(&mut self, batch: PendingBatch) -> Result<(), RestoreError> {
        let total = batch.len();
        self.stats.bulk_requests += 1;
        self.stats.operations_submitted += total;
        self.stats.largest_flush = self.stats.largest_flush.max(total);
        let flush = self.stats.bulk_requests;

        let summary = self.submit(&batch.operations).await?;

        if summary.has_failures() {
            let detail = summary
                .first_failure()
                .cloned()
                .unwrap_or_else(|| unreported_failure(&summary));
            warn!(
                failed = summary.failed,
                total = total,
                first = %detail,
                "Bulk flush had rejected operations"
            );
            return Err(RestoreError::PartialIndexFailure {
                flush,
                failed: summary.failed,
                total,
                detail: Box::new(detail),
            });
        }

        info!(
            count = total,
            submitted = self.stats.operations_submitted,
            "Bulk flush committed"
        );
        Ok(())
    }

    async fn submit(
        &mut self,
        operations: &[IndexOperation],
    ) -> Result<BatchOperationSummary, RestoreError> {
        let mut attempt = 0;
        loop {
            let err = match self.provider.bulk_index(operations).await {
                Ok(summary) => return Ok(summary),
                Err(e) => RestoreError::from(e),
            };

            let retryable = matches!(err, RestoreError::TransportFailure(_));
            if !retryable || attempt >= self.retry.max_retries {
                return Err(err);
            }

            let delay = self.retry.backoff(attempt);
            attempt += 1;
            self.stats.retries += 1;
            warn!(
                attempt = attempt,
                max_retries = self.retry.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Bulk request failed, retrying whole batch"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Stand-in detail for a response that counted failures without itemizing them.
fn unreported_failure(summary: &BatchOperationSummary) -> BulkItemFailure {
    BulkItemFailure {
        index: None,
        id: None,
        status: 0,
        error_type: None,
        reason: Some(format!("{} items failed without detail", summary.failed)),
        raw: Value::Null,
    }
}
