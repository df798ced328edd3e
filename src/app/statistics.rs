//! Statistics printing.

use log::info;
use strum::IntoEnumIterator;

use crate::batch::BatchSummary;
use crate::error_handling::{ErrorType, InfoType, ProcessingStats};

/// Prints a one-line summary of a finished run.
///
/// Works with both plain and JSON log formats (log::info! handles formatting).
pub fn print_summary(summary: &BatchSummary) {
    info!(
        "✅ Checked {} pair{} ({} ranked, {} failed) in {:.1}s",
        summary.total,
        if summary.total == 1 { "" } else { "s" },
        summary.ranked,
        summary.failed,
        summary.elapsed.as_secs_f64()
    );
}

/// Prints error and info counters to the log, skipping zero counts.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    let total_errors = error_stats.total_errors();
    let total_info = error_stats.total_info();

    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = error_stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    if total_info > 0 {
        info!("Info Counts ({} total):", total_info);
        for info_type in InfoType::iter() {
            let count = error_stats.get_info_count(info_type);
            if count > 0 {
                info!("   {}: {}", info_type.as_str(), count);
            }
        }
    }
}
