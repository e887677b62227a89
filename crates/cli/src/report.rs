//! Human- and machine-readable rendering of dataset reports.

use std::fmt::Write as _;

use stageload_core::outcome::DatasetReport;

/// Render one report as a fixed-width table with a totals line.
pub fn render_text(report: &DatasetReport) -> String {
    let width = report
        .outcomes
        .iter()
        .map(|o| o.destination.to_string().len())
        .chain(std::iter::once("table".len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Dataset {} (namespace \"{}\")",
        report.dataset, report.namespace
    );
    let _ = writeln!(
        out,
        "  {:<width$}  {:>10}  {:>10}  {:>10}  {:<20}  {:>8}",
        "table", "landed", "promoted", "rejected", "strategy", "ms"
    );
    for o in &report.outcomes {
        if o.skipped {
            let _ = writeln!(
                out,
                "  {:<width$}  skipped ({} not found)",
                o.destination, o.source_file
            );
            continue;
        }
        let _ = writeln!(
            out,
            "  {:<width$}  {:>10}  {:>10}  {:>10}  {:<20}  {:>8}",
            o.destination,
            o.rows_landed,
            o.rows_promoted,
            o.rows_rejected,
            o.strategy,
            o.elapsed_ms
        );
    }
    let _ = writeln!(
        out,
        "  {:<width$}  {:>10}  {:>10}  {:>10}",
        "total",
        report.total_landed(),
        report.total_promoted(),
        report.total_rejected()
    );
    out
}

/// Serialize reports as a pretty-printed JSON array.
pub fn to_json(reports: &[DatasetReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}
