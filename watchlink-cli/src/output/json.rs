//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use watchlink_core::{CacheEntry, LinkResolution};
use watchlink_fetch::PruneReport;
use watchlink_providers::PlatformDescriptor;
use watchlink_store::CacheStats;

// ============================================================================
// Output Types
// ============================================================================

/// One resolution, tagged with the work it was for.
#[derive(Debug, Serialize)]
pub struct ResolutionOutput<'a> {
    pub work_id: &'a str,
    #[serde(flatten)]
    pub resolution: &'a LinkResolution,
}

/// A supported service.
#[derive(Debug, Serialize)]
pub struct ServiceOutput {
    pub slug: String,
    pub display_name: String,
    pub aliases: Vec<String>,
    pub search_url: String,
    pub strategy: String,
}

impl From<&PlatformDescriptor> for ServiceOutput {
    fn from(desc: &PlatformDescriptor) -> Self {
        Self {
            slug: desc.service.slug().to_string(),
            display_name: desc.display_name().to_string(),
            aliases: desc.service.aliases().iter().map(ToString::to_string).collect(),
            search_url: desc.search_template.to_string(),
            strategy: desc.strategy_id.to_string(),
        }
    }
}

/// A cache entry with its expiry state at the time of printing.
#[derive(Debug, Serialize)]
pub struct CacheEntryOutput<'a> {
    pub work_id: &'a str,
    pub expired: bool,
    /// The entry as stored on disk.
    pub entry: &'a CacheEntry,
}

/// Result of a pruning pass.
#[derive(Debug, Serialize)]
pub struct PruneOutput {
    pub directory: String,
    pub enabled: bool,
    pub removed: usize,
    pub kept: usize,
    pub failed: usize,
}

impl PruneOutput {
    /// Builds the output for a pass over `directory`.
    pub fn new(directory: &std::path::Path, enabled: bool, report: PruneReport) -> Self {
        Self {
            directory: directory.display().to_string(),
            enabled,
            removed: report.removed,
            kept: report.kept,
            failed: report.failed,
        }
    }
}

#[derive(Debug, Serialize)]
struct StatsOutput<'a> {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_updated: Option<DateTime<Utc>>,
    #[serde(flatten)]
    stats: &'a CacheStats,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats one resolution.
    pub fn format_resolution(&self, work_id: &str, resolution: &LinkResolution) -> Result<String> {
        self.format(&ResolutionOutput {
            work_id,
            resolution,
        })
    }

    /// Formats the service list.
    pub fn format_services(&self, descriptors: &[PlatformDescriptor]) -> Result<String> {
        let outputs: Vec<ServiceOutput> = descriptors.iter().map(ServiceOutput::from).collect();
        self.format(&outputs)
    }

    /// Formats cache statistics.
    pub fn format_stats(
        &self,
        path: &std::path::Path,
        last_updated: Option<DateTime<Utc>>,
        stats: &CacheStats,
    ) -> Result<String> {
        self.format(&StatsOutput {
            path: path.display().to_string(),
            last_updated,
            stats,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
