// semprobe/src/ui/summary.rs
//! Console tables for experiment reports and single estimates.

use std::io::{self, Write};

use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

use semprobe_core::{ExperimentReport, InformationEstimate};

use crate::ui::output_format::{styled, write_styled};
use crate::ui::theme::{ThemeEntry, ThemeMap};

/// Longest representative shown in a table cell before it is cut.
const MAX_CELL_CHARS: usize = 60;

fn shorten(text: &str) -> String {
    let single_line = text.replace(['\n', '\r'], " ");
    if single_line.chars().count() <= MAX_CELL_CHARS {
        return single_line;
    }
    let cut: String = single_line.chars().take(MAX_CELL_CHARS - 3).collect();
    format!("{}...", cut)
}

/// Builds the per-query table of a run.
pub fn report_table(report: &ExperimentReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Query", "Clusters", "Sizes", "Score", "Entropy"]);

    for result in report.completed() {
        let estimate = &result.estimate;
        table.add_row(vec![
            shorten(&result.query),
            estimate.cluster_count().to_string(),
            format!("{:?}", estimate.cluster_sizes),
            format!("{:.4}", estimate.score),
            format!("{:.4}", estimate.entropy),
        ]);
    }
    for (query, _) in report.failures() {
        table.add_row(vec![shorten(query), "-".to_string(), "-".to_string(), "failed".to_string(), "-".to_string()]);
    }
    table
}

/// Builds the per-cluster table of one estimate.
pub fn clusters_table(estimate: &InformationEstimate) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["#", "Representative", "Size", "p"]);

    for (i, cluster) in estimate.clusters.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            shorten(&cluster.representative),
            cluster.size().to_string(),
            format!("{:.4}", estimate.probabilities[i]),
        ]);
    }
    table
}

/// Prints the run summary: header line, table, score statistics and failures.
pub fn print_report_summary<W: Write>(
    report: &ExperimentReport,
    writer: &mut W,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    write_styled(writer, &format!("Run {}", report.run_id), ThemeEntry::Header, theme, supports_color)?;
    writeln!(writer, " ({} clustering, threshold {}, {} samples per query)",
        report.strategy, report.threshold, report.repeat_count)?;
    writeln!(writer, "{}", report_table(report))?;

    let completed = report.completed().count();
    if completed > 0 {
        let stats = report.score_stats();
        writeln!(
            writer,
            "Mean score: {} (std dev {:.4}) over {} queries",
            styled(&format!("{:.4}", stats.mean), ThemeEntry::ScoreValue, theme, supports_color),
            stats.std_dev,
            completed
        )?;
    }
    for (query, error) in report.failures() {
        write_styled(writer, &format!("Failed: {}: {}", query, error), ThemeEntry::Error, theme, supports_color)?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Prints the clusters and score of one ResponseSet.
pub fn print_estimate_summary<W: Write>(
    estimate: &InformationEstimate,
    strategy: &str,
    writer: &mut W,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    write_styled(writer, &format!("{} responses, {} clusters ({})", estimate.total, estimate.cluster_count(), strategy),
        ThemeEntry::Header, theme, supports_color)?;
    writeln!(writer)?;
    writeln!(writer, "{}", clusters_table(estimate))?;
    writeln!(
        writer,
        "Score: {}  Entropy: {:.4} nats",
        styled(&format!("{:.4}", estimate.score), ThemeEntry::ScoreValue, theme, supports_color),
        estimate.entropy
    )
}
