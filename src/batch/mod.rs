//! Concurrent batch execution.
//!
//! Pairs are processed chunk by chunk on a bounded worker pool. Within a chunk
//! every pair is submitted up front and results are handed to the caller in
//! completion order. A pair whose check exceeds the task timeout, or whose task
//! panics, is reported as a "Processing failed" placeholder so the batch always
//! yields exactly one result per pair.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use log::{info, warn};
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::config::{Config, Device};
use crate::error_handling::ErrorType;
use crate::initialization::init_semaphore;
use crate::ranking::{PairRequest, RankCheckResult, RankEngine};
use crate::storage::CheckType;

/// Input for one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchParams {
    /// `(keyword, domain)` pairs in submission order
    pub pairs: Vec<(String, String)>,
    pub location: String,
    pub device: Device,
    pub api_key: Option<String>,
    pub session_id: Option<String>,
    pub check_type: CheckType,
}

/// Counts for a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub ranked: usize,
    /// Results carrying an error marker, placeholders included
    pub failed: usize,
    /// Set when the batch was stopped before every pair was checked
    pub cancelled: bool,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Items produced by [`BatchRunner::stream_batch`].
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Result(Box<RankCheckResult>),
    /// Always the last event of a stream
    End(BatchSummary),
}

/// Runs pair checks on a long-lived, bounded worker pool.
#[derive(Clone)]
pub struct BatchRunner {
    engine: Arc<RankEngine>,
    workers: Arc<Semaphore>,
    chunk_size: usize,
    task_timeout: Duration,
}

impl BatchRunner {
    pub fn new(engine: Arc<RankEngine>, config: &Config) -> Self {
        Self::with_limits(
            engine,
            config.max_workers,
            config.chunk_size,
            config.task_timeout,
        )
    }

    pub fn with_limits(
        engine: Arc<RankEngine>,
        max_workers: usize,
        chunk_size: usize,
        task_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            workers: init_semaphore(max_workers),
            chunk_size: chunk_size.max(1),
            task_timeout,
        }
    }

    pub fn engine(&self) -> &Arc<RankEngine> {
        &self.engine
    }

    /// Checks every pair, calling `on_result` once per pair as checks complete.
    pub async fn run_batch<F>(&self, params: &BatchParams, on_result: F) -> BatchSummary
    where
        F: FnMut(RankCheckResult),
    {
        self.run_batch_until(params, &CancellationToken::new(), on_result)
            .await
    }

    /// Like [`run_batch`](Self::run_batch), but stops once `cancel` fires.
    ///
    /// No new chunk is started after cancellation and results still pending in
    /// the current chunk are not delivered. Checks already running are left to
    /// finish in the background.
    pub async fn run_batch_until<F>(
        &self,
        params: &BatchParams,
        cancel: &CancellationToken,
        mut on_result: F,
    ) -> BatchSummary
    where
        F: FnMut(RankCheckResult),
    {
        let start = Instant::now();
        let mut summary = BatchSummary {
            total: params.pairs.len(),
            ..Default::default()
        };

        let mut delivered = 0usize;

        'chunks: for chunk in params.pairs.chunks(self.chunk_size) {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            let mut tasks = FuturesUnordered::new();

            for (keyword, domain) in chunk {
                let request = PairRequest {
                    keyword: keyword.clone(),
                    domain: domain.clone(),
                    location: params.location.clone(),
                    device: params.device,
                    session_id: params.session_id.clone(),
                    check_type: params.check_type,
                    api_key: params.api_key.clone(),
                };
                tasks.push(self.submit(request));
            }

            while let Some(result) = tasks.next().await {
                if result.is_ranked() {
                    summary.ranked += 1;
                }
                if result.error.is_some() {
                    summary.failed += 1;
                }
                on_result(result);
                delivered += 1;
                if cancel.is_cancelled() {
                    summary.cancelled = true;
                    break 'chunks;
                }
            }
        }

        summary.elapsed = start.elapsed();
        if summary.cancelled {
            info!(
                "Batch cancelled after {} of {} pairs",
                delivered, summary.total
            );
            return summary;
        }
        info!(
            "Batch finished: {} pairs ({} ranked, {} failed) in {:.1}s",
            summary.total,
            summary.ranked,
            summary.failed,
            summary.elapsed.as_secs_f64()
        );
        summary
    }

    /// Runs the batch in the background and streams its results.
    ///
    /// The receiver yields one [`BatchEvent::Result`] per pair followed by a
    /// single [`BatchEvent::End`]. Dropping the receiver cancels the batch:
    /// no further chunks are started, while checks already running finish.
    pub fn stream_batch(&self, params: BatchParams) -> mpsc::UnboundedReceiver<BatchEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let runner = self.clone();

        let cancel = CancellationToken::new();

        // Cancels the batch as soon as the receiver goes away
        let watcher_tx = tx.clone();
        let watcher_cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = watcher_tx.closed() => watcher_cancel.cancel(),
                _ = watcher_cancel.cancelled() => {}
            }
        });

        tokio::spawn(async move {
            let summary = runner
                .run_batch_until(&params, &cancel, |result| {
                    if tx.send(BatchEvent::Result(Box::new(result))).is_err() {
                        cancel.cancel();
                    }
                })
                .await;
            if !summary.cancelled && tx.send(BatchEvent::End(summary)).is_err() {
                warn!("Stream consumer went away before the end of the batch");
            }
            // Releases the watcher's sender so the receiver sees the stream close
            cancel.cancel();
        });

        rx
    }

    /// Spawns one check and returns a future resolving to its result or a
    /// placeholder.
    ///
    /// The worker permit travels with the check itself, so a check that outlives
    /// its timeout keeps its slot until the underlying calls finish.
    fn submit(
        &self,
        request: PairRequest,
    ) -> impl std::future::Future<Output = RankCheckResult> + Send + 'static {
        let engine = Arc::clone(&self.engine);
        let workers = Arc::clone(&self.workers);
        let task_timeout = self.task_timeout;
        let keyword = request.keyword.clone();
        let domain = request.domain.clone();
        let location = request.location.clone();

        let handle = tokio::spawn(async move {
            let permit = workers.acquire_owned().await.ok();
            let check_engine = Arc::clone(&engine);
            let check = tokio::spawn(async move {
                let _permit = permit;
                check_engine.process(&request).await
            });

            match tokio::time::timeout(task_timeout, check).await {
                Ok(Ok(result)) => Some(result),
                Ok(Err(join_error)) => {
                    warn!("Check task panicked: {:?}", join_error);
                    engine.stats().increment_error(ErrorType::TaskPanicked);
                    None
                }
                Err(_) => {
                    engine.stats().increment_error(ErrorType::TaskTimeout);
                    None
                }
            }
        });

        async move {
            match handle.await {
                Ok(Some(result)) => result,
                Ok(None) => {
                    warn!("Check did not complete in time or failed: {} | {}", keyword, domain);
                    RankCheckResult::failed(&keyword, &domain, &location)
                }
                Err(join_error) => {
                    warn!("Batch task panicked: {:?}", join_error);
                    RankCheckResult::failed(&keyword, &domain, &location)
                }
            }
        }
    }
}

/// Shared counters for progress logging while a batch runs.
#[derive(Debug, Default)]
pub struct BatchProgress {
    pub total: AtomicUsize,
    pub completed: AtomicUsize,
}

impl BatchProgress {
    pub fn new(total: usize) -> Arc<Self> {
        Arc::new(Self {
            total: AtomicUsize::new(total),
            completed: AtomicUsize::new(0),
        })
    }

    pub fn mark_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}
