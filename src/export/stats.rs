//! Human-readable crawl summaries

use crate::crawler::{CrawlStatistics, EngineState};
use std::time::Duration;

/// Formats a duration as `12.3s`, `4m 05s` or `1h 02m`
pub fn format_duration(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f64();
    if seconds < 60.0 {
        return format!("{:.1}s", seconds);
    }

    let whole = elapsed.as_secs();
    if whole < 3600 {
        format!("{}m {:02}s", whole / 60, whole % 60)
    } else {
        format!("{}h {:02}m", whole / 3600, (whole % 3600) / 60)
    }
}

/// Formats end-of-run statistics
pub fn format_statistics(state: EngineState, stats: &CrawlStatistics, elapsed: Duration) -> String {
    let rate = if elapsed.as_secs_f64() > 0.0 {
        stats.visited_count as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    let mut out = String::new();
    out.push_str("=== Crawl Statistics ===\n");
    out.push_str(&format!("  Final state: {}\n", state));
    out.push_str(&format!("  URLs visited: {}\n", stats.visited_count));
    out.push_str(&format!("  URLs still queued: {}\n", stats.queue_size));
    out.push_str(&format!("  Pages collected: {}\n", stats.data_count));
    out.push_str(&format!(
        "  Duration: {} ({:.2} pages/sec)\n",
        format_duration(elapsed),
        rate
    ));
    out
}

/// Prints end-of-run statistics to stdout
pub fn print_statistics(state: EngineState, stats: &CrawlStatistics, elapsed: Duration) {
    print!("{}", format_statistics(state, stats, elapsed));
}
