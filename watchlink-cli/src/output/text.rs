//! Text output formatting with colors.

use chrono::{DateTime, Local, Utc};
use std::path::Path;
use watchlink_core::{CacheEntry, LinkResolution};
use watchlink_fetch::PruneReport;
use watchlink_providers::PlatformDescriptor;
use watchlink_store::CacheStats;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

const RULE_WIDTH: usize = 60;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Horizontal rule under headers.
    pub fn rule(&self) -> String {
        "─".repeat(RULE_WIDTH)
    }

    // ========================================================================
    // Resolutions
    // ========================================================================

    /// Formats one resolution.
    ///
    /// ```text
    /// ✓ 603 Netflix  https://www.netflix.com/title/20557937 (cached)
    /// ✗ 42 Hulu  no link: no watch link for 'Heat' (...)
    /// ```
    pub fn format_resolution(&self, work_id: &str, resolution: &LinkResolution) -> String {
        let head = format!("{} {}", self.dim(work_id), self.bold(&resolution.service));

        let mut line = match &resolution.link {
            Some(link) => format!("{} {head}  {}", self.green("✓"), self.cyan(link)),
            None => {
                let reason = resolution.last_error.as_deref().unwrap_or("no link found");
                format!("{} {head}  {}", self.red("✗"), self.yellow(&format!("no link: {reason}")))
            }
        };

        if resolution.cached {
            line.push_str(&format!(" {}", self.dim("(cached)")));
        }
        line
    }

    /// Formats attempt count and selector beneath a resolution.
    pub fn format_resolution_details(&self, resolution: &LinkResolution) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(attempts) = resolution.retry_count {
            parts.push(format!("attempts: {attempts}"));
        }
        if let Some(selector) = &resolution.selector_used {
            parts.push(format!("selector: {selector}"));
        }

        if parts.is_empty() {
            None
        } else {
            Some(format!("  {}", self.dim(&parts.join(", "))))
        }
    }

    /// Formats the closing line of a batch run.
    pub fn format_batch_summary(&self, results: &[LinkResolution]) -> String {
        let found = results.iter().filter(|r| r.is_found()).count();
        let cached = results.iter().filter(|r| r.cached).count();
        format!(
            "Resolved {} of {} ({} from cache)",
            self.bold(&found.to_string()),
            results.len(),
            cached
        )
    }

    // ========================================================================
    // Services
    // ========================================================================

    /// Formats the service list header.
    pub fn format_services_header(&self) -> String {
        format!(
            "{:<14} {:<16} {}",
            self.bold("Service"),
            self.bold("Slug"),
            self.bold("Aliases")
        )
    }

    /// Formats one service line, plus its search URL when `verbose`.
    pub fn format_service_line(&self, desc: &PlatformDescriptor, verbose: bool) -> String {
        let aliases = desc.service.aliases();
        let aliases = if aliases.is_empty() {
            self.dim("−")
        } else {
            aliases.join(", ")
        };

        let mut line = format!(
            "{:<14} {:<16} {}",
            desc.display_name(),
            desc.service.slug(),
            aliases
        );
        if verbose {
            line.push_str(&format!("\n  {}", self.dim(desc.search_template)));
        }
        line
    }

    // ========================================================================
    // Cache
    // ========================================================================

    /// Formats one cache entry with its expiry state.
    pub fn format_cache_entry(&self, work_id: &str, entry: &CacheEntry, expired: bool) -> String {
        let state = if expired {
            self.yellow("expired")
        } else {
            self.green("fresh")
        };

        let outcome = match &entry.streaming.link {
            Some(link) => self.cyan(link),
            None => self.red(entry.last_error.as_deref().unwrap_or("no link")),
        };

        let mut line = format!(
            "{} {} [{state}]  {outcome}",
            self.bold(work_id),
            entry.service()
        );

        match (entry.scraped_at, entry.expires_at) {
            (Some(scraped), Some(expires)) => line.push_str(&format!(
                "\n  {}",
                self.dim(&format!(
                    "scraped {}, expires {}",
                    format_local(scraped),
                    format_local(expires)
                ))
            )),
            (Some(scraped), None) => line.push_str(&format!(
                "\n  {}",
                self.dim(&format!("scraped {}", format_local(scraped)))
            )),
            _ => {}
        }

        if let Some(screenshot) = &entry.screenshot {
            line.push_str(&format!("\n  {}", self.dim(&format!("screenshot: {screenshot}"))));
        }
        line
    }

    /// Formats cache statistics.
    pub fn format_stats(
        &self,
        path: &Path,
        last_updated: Option<DateTime<Utc>>,
        stats: &CacheStats,
    ) -> String {
        let mut lines = Vec::new();

        lines.push(self.bold("Link Cache"));
        lines.push(self.rule());
        lines.push(format!("File:     {}", path.display()));
        if let Some(updated) = last_updated {
            lines.push(format!("Updated:  {}", format_local(updated)));
        }
        lines.push(format!(
            "Entries:  {} ({} fresh, {} expired)",
            stats.total,
            self.green(&stats.fresh.to_string()),
            self.yellow(&stats.expired.to_string())
        ));
        lines.push(format!(
            "Links:    {} found, {} missing",
            stats.positive, stats.negative
        ));

        lines.join("\n")
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Formats a pruning pass.
    pub fn format_prune(&self, dir: &Path, enabled: bool, report: &PruneReport) -> String {
        let mut line = format!(
            "Pruned {}: {} removed, {} kept",
            dir.display(),
            self.bold(&report.removed.to_string()),
            report.kept
        );
        if report.failed > 0 {
            line.push_str(&format!(", {}", self.red(&format!("{} failed", report.failed))));
        }
        if !enabled {
            line.push_str(&format!(" {}", self.dim("(capture disabled)")));
        }
        line
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

fn format_local(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
