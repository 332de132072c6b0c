// Colored terminal output for the month, topic, correlation and author views.
//
// This module handles all terminal-specific formatting: colors, bars and the
// heatmap grid. main.rs delegates here after grouping and correlating.

use colored::{ColoredString, Colorize};

use super::{format_score, truncate_chars};
use crate::correlation::CorrelationMatrix;
use crate::grouping::authors::AuthorSummary;
use crate::grouping::GroupedPosts;

const BAR_WIDTH: usize = 30;

/// Widest topic label shown before truncation.
const LABEL_WIDTH: usize = 24;

/// Score bands for heatmap cells. Most topic pairs overlap by a few percent,
/// so the interesting range is narrow.
const STRONG_LINK: f64 = 0.15;
const WEAK_LINK: f64 = 0.05;

/// Build a `[====    ]` bar filled to `fraction` of `width`.
fn bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0)) * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "=".repeat(filled), " ".repeat(empty))
}

/// Display the number of posts in each month.
pub fn display_month_frequency(grouped: &GroupedPosts<'_>) {
    println!(
        "\n{}",
        format!("=== Post Frequency by Month ({} posts) ===", grouped.total_posts()).bold()
    );
    println!();

    let busiest = grouped.busiest_month_count();

    for bucket in grouped.months() {
        let fraction = if busiest == 0 {
            0.0
        } else {
            bucket.len() as f64 / busiest as f64
        };
        let month_bar = bar(fraction, BAR_WIDTH);
        let colored_bar = if bucket.is_empty() {
            month_bar.dimmed()
        } else {
            month_bar.bright_cyan()
        };

        println!("  {:<4} {} {:>4}", bucket.name().bold(), colored_bar, bucket.len());
    }

    display_skipped(grouped);
}

/// Display each occupied month's topic mix as shares of its topic tags.
pub fn display_topic_shares(grouped: &GroupedPosts<'_>) {
    println!(
        "\n{}",
        format!(
            "=== Topic Share by Month ({} topics above {:.2}) ===",
            grouped.topics().len(),
            grouped.min_likelihood()
        )
        .bold()
    );

    if grouped.topics().is_empty() {
        println!("\n  No topics above the likelihood threshold.");
        return;
    }

    for bucket in grouped.occupied_months() {
        println!(
            "\n  {} ({} posts, {} topic tags)",
            bucket.name().bold(),
            bucket.len(),
            bucket.topics.membership_count()
        );

        for label in grouped.topics().keys() {
            let count = bucket.topics.count(label);
            if count == 0 {
                continue;
            }
            let share = bucket.topic_share(label);
            println!(
                "    {:<width$} {} {:>3}%  ({} posts, {}% of month)",
                truncate_chars(label, LABEL_WIDTH),
                bar(share, 20).bright_magenta(),
                (share * 100.0).round() as i64,
                count,
                bucket.topic_percent(label),
                width = LABEL_WIDTH + 3,
            );
        }
    }
}

/// Display the topic correlation matrix as a numbered grid.
///
/// Columns follow the bin order (reverse of the rows), so the grid reads
/// like the square heatmap with the diagonal running bottom-left to
/// top-right.
pub fn display_topic_links(matrix: &CorrelationMatrix) {
    println!(
        "\n{}",
        format!("=== Topic Links ({} topics) ===", matrix.len()).bold()
    );

    if matrix.is_empty() {
        println!("\n  No topics above the likelihood threshold.");
        return;
    }

    let Some(first_row) = matrix.rows().first() else {
        return;
    };

    // Column legend
    println!();
    for (i, bin) in first_row.bins.iter().enumerate() {
        println!("  {:>3} = {}", i + 1, bin.topic);
    }
    println!();

    let header: Vec<String> = (1..=first_row.bins.len()).map(|i| format!("{i:>5}")).collect();
    println!(
        "  {:<width$} {}",
        "",
        header.join("").dimmed(),
        width = LABEL_WIDTH + 3
    );

    for row in matrix.rows() {
        let cells: Vec<String> = row
            .bins
            .iter()
            .map(|bin| colorize_score(bin.score).to_string())
            .collect();
        println!(
            "  {:<width$} {}",
            truncate_chars(&row.topic, LABEL_WIDTH),
            cells.join(""),
            width = LABEL_WIDTH + 3
        );
    }
}

/// Display posts per author with their most frequent topics.
pub fn display_authors(summaries: &[AuthorSummary<'_>]) {
    println!(
        "\n{}",
        format!("=== Authors ({}) ===", summaries.len()).bold()
    );
    println!();

    if summaries.is_empty() {
        println!("  No posts loaded.");
        return;
    }

    for (i, summary) in summaries.iter().enumerate() {
        let topics: Vec<String> = summary
            .top_topics
            .iter()
            .take(3)
            .map(|(label, count)| format!("{label} ({count})"))
            .collect();
        println!(
            "  {:>3}. {:<30} {:>4} posts  {}",
            i + 1,
            summary.author.display_name(),
            summary.post_count,
            topics.join(", ").dimmed()
        );
    }
}

/// Warn about posts that were left out because of their timestamps.
pub fn display_skipped(grouped: &GroupedPosts<'_>) {
    let skipped = grouped.skipped();
    if skipped.is_empty() {
        return;
    }

    println!(
        "\n  {} {} posts skipped (unusable createdAt):",
        "Warning:".yellow(),
        skipped.len()
    );
    for post in skipped.iter().take(5) {
        println!(
            "    {} {:?} ({})",
            post.post_id,
            truncate_chars(&post.created_at, 30),
            post.reason
        );
    }
    if skipped.len() > 5 {
        println!("    ... and {} more", skipped.len() - 5);
    }
}

/// Colorize a correlation score by strength band, padded to a grid cell.
fn colorize_score(score: f64) -> ColoredString {
    let text = format!("{:>5}", format_score(score));
    if score.is_nan() {
        text.red()
    } else if score >= STRONG_LINK {
        text.bright_green().bold()
    } else if score >= WEAK_LINK {
        text.bright_cyan()
    } else if score > 0.0 {
        text.blue()
    } else {
        text.dimmed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_fill() {
        assert_eq!(bar(0.5, 4), "[==  ]");
        assert_eq!(bar(0.0, 3), "[   ]");
        assert_eq!(bar(2.0, 2), "[==]");
    }
}
