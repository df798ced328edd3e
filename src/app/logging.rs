//! Progress logging utilities.

use log::info;

use crate::batch::BatchProgress;

/// Logs how many pairs have been checked so far.
///
/// # Arguments
///
/// * `start_time` - The start time of processing
/// * `progress` - Shared counters for the running batch
pub fn log_progress(start_time: std::time::Instant, progress: &BatchProgress) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let completed = progress.completed();
    let rate = if elapsed_secs > 0.0 {
        completed as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Checked {}/{} pairs in {:.2} seconds (~{:.2} pairs/sec)",
        completed,
        progress.total(),
        elapsed_secs,
        rate
    );
}
