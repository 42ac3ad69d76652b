//! Report formatting.
//!
//! This module turns the structured figures from [`crate::core::realization`]
//! and [`crate::core::evaluation`] into plain text. All functions are pure and
//! framework-agnostic; the binary prints their output.

use crate::core::{
    evaluation::EvaluationRow,
    realization::{CategorySummary, DashboardMetrics, RealizationReport},
};
use std::fmt::Write;

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`. The bar is
/// clamped to 0-100 but the printed percentage is not, so overspending shows
/// as a full bar with e.g. `110.0%`.
///
/// # Arguments
/// * `progress_percent` - Progress percentage
/// * `bar_length` - Length of the progress bar in characters (default 10)
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = progress_percent.clamp(0.0, 100.0);

    // Cast safety: clamped_progress ∈ [0, 100], length is small (10-20).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    let filled_str = "█".repeat(filled);
    let empty_str = "░".repeat(empty);

    format!("[{filled_str}{empty_str}] {progress_percent:.1}%")
}

/// Formats an amount in rupiah with `.` thousands separators, e.g. `Rp 1.500.000`.
///
/// Amounts are rounded to whole rupiah; negatives keep their sign.
#[must_use]
pub fn format_idr(amount: f64) -> String {
    // Cast safety: display only, realistic budgets are far below i64::MAX.
    #[allow(clippy::cast_possible_truncation)]
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if rounded < 0 {
        format!("-Rp {grouped}")
    } else {
        format!("Rp {grouped}")
    }
}

/// Compact rupiah for headline figures: `Rp 1.5 M` (billions), `Rp 250 jt` (millions).
#[must_use]
pub fn format_idr_compact(amount: f64) -> String {
    let magnitude = amount.abs();
    if magnitude >= 1_000_000_000.0 {
        format!("Rp {:.1} M", amount / 1_000_000_000.0)
    } else if magnitude >= 1_000_000.0 {
        format!("Rp {:.0} jt", amount / 1_000_000.0)
    } else {
        format_idr(amount)
    }
}

/// Renders the realization report, one block per budget item.
#[must_use]
pub fn format_realization_report(report: &RealizationReport) -> String {
    let mut out = String::new();

    for row in &report.rows {
        let _ = writeln!(
            out,
            "{} | {} | {} | {}",
            row.io_number, row.cost_center, row.machine_name, row.project_name
        );
        let _ = writeln!(
            out,
            "  plan {} | realized {} | balance {}",
            format_idr(row.total_plan_cost),
            format_idr(row.realized_amount),
            format_idr(row.balance)
        );
        let _ = writeln!(out, "  {}", format_progress_bar(row.percentage_used, None));
        for linked in &row.linked_requests {
            let _ = writeln!(
                out,
                "    {} {} {} [{}] {}",
                linked.pr_number,
                linked.date,
                linked.item_name,
                linked.status,
                format_idr(linked.amount)
            );
        }
    }

    let totals = &report.totals;
    let _ = writeln!(
        out,
        "TOTAL plan {} | realized {} | balance {} | {:.1}%",
        format_idr(totals.plan),
        format_idr(totals.realized),
        format_idr(totals.balance),
        totals.percentage
    );
    out
}

/// Renders the evaluation page as one line per item.
#[must_use]
pub fn format_evaluation(rows: &[EvaluationRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let _ = write!(
            out,
            "{} {} {:.1}% {}",
            row.plan_number, row.machine_name, row.utilization, row.status
        );
        if let Some(obstacle) = &row.obstacle {
            let _ = write!(out, " | obstacle: {obstacle}");
        }
        if let Some(reason) = &row.difference_reason {
            let _ = write!(out, " | difference: {reason}");
        }
        out.push('\n');
    }
    out
}

/// Renders the dashboard headline figures and the category chart data.
#[must_use]
pub fn format_dashboard(metrics: &DashboardMetrics, categories: &[CategorySummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Budget {} | Realization {} | Remaining {}",
        format_idr_compact(metrics.total_budget),
        format_idr_compact(metrics.total_realization),
        format_idr_compact(metrics.remaining_balance)
    );

    let counts: Vec<String> = metrics
        .pr_counts
        .iter()
        .map(|(status, count)| format!("{status}: {count}"))
        .collect();
    let _ = writeln!(out, "PRs {}", counts.join(", "));

    for category in categories {
        let _ = writeln!(
            out,
            "  {} budget {} realization {}",
            category.name,
            format_idr(category.budget),
            format_idr(category.realization)
        );
    }
    out
}
