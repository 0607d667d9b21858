//! Human-readable sweep summaries

use poster_cache::{BudgetReport, ExpiryReport};

const MB: f64 = 1024.0 * 1024.0;

pub fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / MB
}

/// `--max-size` in bytes, clamped rather than wrapping
pub fn budget_bytes(max_size_mb: u64) -> u64 {
    max_size_mb.saturating_mul(1024 * 1024)
}

/// One line per expired entry followed by the age sweep total
pub fn expiry_lines(report: &ExpiryReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .entries
        .iter()
        .map(|entry| {
            format!(
                "Removing {} (age: {} days)",
                entry.payload.display(),
                entry.age_days
            )
        })
        .collect();

    lines.push(format!(
        "Age-based cleanup: {} {} old cached images ({:.2} MB)",
        if report.dry_run { "Would remove" } else { "Removed" },
        report.entries.len(),
        megabytes(report.total_bytes)
    ));
    lines
}

pub fn budget_line(report: &BudgetReport) -> String {
    format!(
        "Size-based cleanup: Cache size {:.2} MB -> {:.2} MB, removed {} files",
        megabytes(report.total_before),
        megabytes(report.total_after),
        report.removed
    )
}

/// Current size, plus a warning when a live run would evict
pub fn dry_run_size_lines(total_size: u64, max_size_mb: u64) -> Vec<String> {
    let mut lines = vec![format!(
        "Current cache size: {:.2} MB",
        megabytes(total_size)
    )];
    if total_size > budget_bytes(max_size_mb) {
        lines.push(format!(
            "Cache size exceeds maximum ({} MB), would trigger cleanup",
            max_size_mb
        ));
    }
    lines
}
