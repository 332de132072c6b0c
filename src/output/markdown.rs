// Markdown report generation.
//
// Writes the month, topic-share, correlation and author views as markdown
// tables. The file is self-contained so it can be pasted into an issue or
// rendered on any markdown viewer.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use super::{format_score, truncate_chars};
use crate::correlation::CorrelationMatrix;
use crate::grouping::authors::summarize_authors;
use crate::grouping::GroupedPosts;

/// Escape characters that would break a markdown table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Render the full report as a markdown string.
pub fn render_report(grouped: &GroupedPosts<'_>, matrix: &CorrelationMatrix) -> String {
    let mut md = String::new();

    // `write!` into a String cannot fail
    let _ = writeln!(md, "# Postlens Topic Report");
    let _ = writeln!(md);
    let _ = writeln!(
        md,
        "Generated {} with minimum topic likelihood {:.2}.",
        Utc::now().format("%Y-%m-%d %H:%M UTC"),
        grouped.min_likelihood()
    );
    let _ = writeln!(md);

    // Summary
    let _ = writeln!(md, "## Summary");
    let _ = writeln!(md);
    let _ = writeln!(md, "| Measure | Count |");
    let _ = writeln!(md, "|---|---|");
    let _ = writeln!(md, "| Posts | {} |", grouped.total_posts());
    let _ = writeln!(md, "| Months with posts | {} |", grouped.occupied_months().count());
    let _ = writeln!(md, "| Topics | {} |", grouped.topics().len());
    let _ = writeln!(md, "| Authors | {} |", grouped.authors().len());
    let _ = writeln!(md, "| Skipped posts | {} |", grouped.skipped().len());
    let _ = writeln!(md);

    // Post frequency
    let _ = writeln!(md, "## Posts per Month");
    let _ = writeln!(md);
    let _ = writeln!(md, "| Month | Posts |");
    let _ = writeln!(md, "|---|---|");
    for bucket in grouped.months() {
        let _ = writeln!(md, "| {} | {} |", bucket.name(), bucket.len());
    }
    let _ = writeln!(md, "| **Total** | **{}** |", grouped.total_posts());
    let _ = writeln!(md);

    // Topic share
    if !grouped.topics().is_empty() {
        let labels: Vec<&str> = grouped.topics().keys().collect();

        let _ = writeln!(md, "## Topic Share by Month");
        let _ = writeln!(md);
        let _ = writeln!(
            md,
            "| Month | {} |",
            labels
                .iter()
                .map(|l| escape_cell(l))
                .collect::<Vec<_>>()
                .join(" | ")
        );
        let _ = writeln!(md, "|---|{}", "---|".repeat(labels.len()));
        for bucket in grouped.occupied_months() {
            let cells: Vec<String> = labels
                .iter()
                .map(|label| format!("{}%", (bucket.topic_share(label) * 100.0).round() as i64))
                .collect();
            let _ = writeln!(md, "| {} | {} |", bucket.name(), cells.join(" | "));
        }
        let _ = writeln!(md);
    }

    // Correlation
    if !matrix.is_empty() {
        let _ = writeln!(md, "## Topic Links");
        let _ = writeln!(md);
        let _ = writeln!(
            md,
            "Share of posts tagged with either topic that carry both."
        );
        let _ = writeln!(md);

        let labels: Vec<&str> = matrix.labels().collect();
        let _ = writeln!(
            md,
            "| Topic | {} |",
            labels
                .iter()
                .map(|l| escape_cell(l))
                .collect::<Vec<_>>()
                .join(" | ")
        );
        let _ = writeln!(md, "|---|{}", "---|".repeat(labels.len()));
        for row in matrix.rows() {
            // Bins run in reverse order; the table reads left to right
            let cells: Vec<String> = row.bins.iter().rev().map(|b| format_score(b.score)).collect();
            let _ = writeln!(md, "| {} | {} |", escape_cell(&row.topic), cells.join(" | "));
        }
        let _ = writeln!(md);
    }

    // Authors
    let summaries = summarize_authors(grouped);
    if !summaries.is_empty() {
        let _ = writeln!(md, "## Authors");
        let _ = writeln!(md);
        let _ = writeln!(md, "| Author | Posts | Top topics |");
        let _ = writeln!(md, "|---|---|---|");
        for summary in &summaries {
            let topics: Vec<String> = summary
                .top_topics
                .iter()
                .take(3)
                .map(|(label, count)| format!("{} ({count})", escape_cell(label)))
                .collect();
            let _ = writeln!(
                md,
                "| {} | {} | {} |",
                escape_cell(&summary.author.display_name()),
                summary.post_count,
                topics.join(", ")
            );
        }
        let _ = writeln!(md);
    }

    // Skipped
    if !grouped.skipped().is_empty() {
        let _ = writeln!(md, "## Skipped Posts");
        let _ = writeln!(md);
        let _ = writeln!(md, "| Post | createdAt | Reason |");
        let _ = writeln!(md, "|---|---|---|");
        for skipped in grouped.skipped() {
            let _ = writeln!(
                md,
                "| {} | {} | {} |",
                escape_cell(&skipped.post_id),
                escape_cell(&truncate_chars(&skipped.created_at, 40)),
                skipped.reason
            );
        }
        let _ = writeln!(md);
    }

    md
}

/// Write the markdown report to `path`, creating parent directories.
///
/// Returns the path written, for display.
pub fn generate_report(
    grouped: &GroupedPosts<'_>,
    matrix: &CorrelationMatrix,
    path: &str,
) -> Result<String> {
    let content = render_report(grouped, matrix);

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create report directory {}", parent.display()))?;
        }
    }

    std::fs::write(path, content).with_context(|| format!("Failed to write report to {path}"))?;

    info!(path = path, "Markdown report written");

    Ok(path.to_string())
}
