//! CLI run entry points.
//!
//! `run_checks` drives one batch from command-line input and prints every
//! result as a JSON line; `run_server` wires the same engine into the HTTP API.

mod input;

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::app::{log_progress, print_error_statistics, print_summary, shutdown_gracefully};
use crate::batch::{BatchParams, BatchProgress, BatchRunner, BatchSummary};
use crate::config::{CheckOpts, Config, ServeOpts, LOGGING_INTERVAL};
use crate::error_handling::ProcessingStats;
use crate::ranking::RankEngine;
use crate::server::{serve, AppState};
use crate::storage::{init_db_pool_with_path, run_migrations, CheckType, HistoryStore};

pub use input::{load_pairs, parse_pair_lines};

/// Builds the ranking engine, attaching the history database when requested.
pub async fn build_engine(config: &Config, with_history: bool) -> Result<Arc<RankEngine>> {
    if config.serper_api_key.is_none() {
        warn!("SERPER_API_KEY is not set; checks will fail unless a request supplies a key");
    }

    let stats = Arc::new(ProcessingStats::new());
    let mut engine =
        RankEngine::from_config(config, stats).context("Failed to initialize HTTP clients")?;

    if with_history {
        let pool = init_db_pool_with_path(&config.db_path)
            .await
            .context("Failed to initialize database")?;
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
        info!("Recording history in {}", config.db_path.display());
        engine = engine.with_history(HistoryStore::new(pool));
    }

    Ok(Arc::new(engine))
}

/// Checks every pair named by `opts`, writing one JSON line per result to
/// `out` in completion order.
pub async fn run_checks<W: Write>(
    config: Config,
    opts: &CheckOpts,
    out: &mut W,
) -> Result<BatchSummary> {
    let pairs = load_pairs(opts).await?;
    if pairs.is_empty() {
        anyhow::bail!("No keyword/domain pairs given (use --keyword/--domain or --file)");
    }

    let engine = build_engine(&config, !opts.no_history).await?;
    let runner = BatchRunner::new(Arc::clone(&engine), &config);
    let check_type = if pairs.len() > 1 {
        CheckType::Bulk
    } else {
        CheckType::Single
    };
    let params = BatchParams {
        pairs,
        location: opts.location.clone(),
        device: opts.device,
        check_type,
        ..Default::default()
    };

    info!(
        "Checking {} pairs with {} workers",
        params.pairs.len(),
        config.max_workers
    );

    let start_time = Instant::now();
    let progress = BatchProgress::new(params.pairs.len());
    let cancel = CancellationToken::new();
    let cancel_logging = cancel.child_token();
    let progress_for_logging = Arc::clone(&progress);

    let logging_task = Some(tokio::task::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(LOGGING_INTERVAL));
        // The first tick fires immediately
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    log_progress(start_time, &progress_for_logging);
                }
                _ = cancel_logging.cancelled() => {
                    break;
                }
            }
        }
    }));

    let summary = runner
        .run_batch(&params, |result| {
            progress.mark_completed();
            match serde_json::to_string(&result) {
                Ok(line) => {
                    if let Err(e) = writeln!(out, "{}", line) {
                        warn!("Failed to write result for {}: {}", result.keyword, e);
                    }
                }
                Err(e) => warn!("Failed to serialize result for {}: {}", result.keyword, e),
            }
        })
        .await;

    shutdown_gracefully(cancel, logging_task).await;
    out.flush().context("Failed to flush output")?;

    log_progress(start_time, &progress);
    print_error_statistics(engine.stats());
    print_summary(&summary);

    Ok(summary)
}

/// Serves the HTTP API until the process is stopped.
pub async fn run_server(config: Config, opts: &ServeOpts) -> Result<()> {
    let engine = build_engine(&config, true).await?;
    let runner = BatchRunner::new(engine, &config);
    let state = AppState::new(runner, Duration::from_secs(config.session_ttl_secs));
    serve(opts.bind, state).await
}
