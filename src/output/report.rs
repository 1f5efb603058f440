//! Markdown report generation
//!
//! Renders a completed run as a human-readable markdown file: the run
//! summary followed by a per-page listing.

use crate::crawler::PageResult;
use crate::output::CrawlSummary;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown crawl report to the given path
pub fn write_markdown_report(
    results: &[PageResult],
    summary: &CrawlSummary,
    output_path: &Path,
) -> std::io::Result<()> {
    let markdown = format_markdown_report(results, summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_report(results: &[PageResult], summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Harvestman Crawl Report\n\n");

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- **Pages harvested**: {}\n", summary.total_pages));
    md.push_str(&format!("- **Pages failed**: {}\n", summary.failed_pages));
    md.push_str(&format!(
        "- **Total time**: {}ms ({:.2} minutes)\n",
        summary.total_time_ms,
        summary.total_time_ms as f64 / 60_000.0
    ));
    md.push_str(&format!(
        "- **Average per page**: {}ms\n\n",
        summary.average_time_ms
    ));

    if !results.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| URL | Title | Depth | Status | Links | Images | Time |\n");
        md.push_str("|-----|-------|-------|--------|-------|--------|------|\n");

        for page in results {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {}ms |\n",
                page.url,
                page.title.as_deref().unwrap_or("-"),
                page.depth,
                page.status_code,
                page.links.len(),
                page.images.len(),
                page.crawl_time_ms
            ));
        }
        md.push('\n');

        md.push_str("## Page Details\n\n");
        for page in results {
            md.push_str(&format!("### {}\n\n", page.url));
            if page.url != page.original_url {
                md.push_str(&format!("- **Requested as**: {}\n", page.original_url));
            }
            if let Some(parent) = &page.parent {
                md.push_str(&format!("- **Found on**: {}\n", parent));
            }
            if let Some(description) = &page.description {
                md.push_str(&format!("- **Description**: {}\n", description));
            }
            if let Some(keywords) = &page.keywords {
                md.push_str(&format!("- **Keywords**: {}\n", keywords));
            }
            md.push_str(&format!("- **Captured**: {}\n", page.timestamp));

            if !page.headings.is_empty() {
                md.push_str("- **Headings**:\n");
                for tag in ["h1", "h2", "h3", "h4", "h5", "h6"] {
                    if let Some(texts) = page.headings.get(tag) {
                        for text in texts {
                            md.push_str(&format!("  - {}: {}\n", tag, text));
                        }
                    }
                }
            }
            md.push('\n');
        }
    }

    md
}
