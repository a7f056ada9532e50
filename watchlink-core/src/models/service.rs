//! Streaming platform types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ============================================================================
// Streaming Service
// ============================================================================

/// Streaming platforms the resolver knows how to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamingService {
    /// Netflix
    Netflix,
    /// Disney+
    DisneyPlus,
    /// Amazon Prime Video
    PrimeVideo,
    /// Max (formerly HBO Max)
    Max,
    /// Hulu
    Hulu,
    /// Apple TV+
    AppleTvPlus,
    /// Paramount+
    ParamountPlus,
    /// Peacock
    Peacock,
}

impl StreamingService {
    /// Returns the canonical display name, as upstream metadata spells it.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Netflix => "Netflix",
            Self::DisneyPlus => "Disney+",
            Self::PrimeVideo => "Prime Video",
            Self::Max => "Max",
            Self::Hulu => "Hulu",
            Self::AppleTvPlus => "Apple TV+",
            Self::ParamountPlus => "Paramount+",
            Self::Peacock => "Peacock",
        }
    }

    /// Returns a filesystem-safe identifier (lowercase, no spaces).
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Netflix => "netflix",
            Self::DisneyPlus => "disney_plus",
            Self::PrimeVideo => "prime_video",
            Self::Max => "max",
            Self::Hulu => "hulu",
            Self::AppleTvPlus => "apple_tv_plus",
            Self::ParamountPlus => "paramount_plus",
            Self::Peacock => "peacock",
        }
    }

    /// Alternative spellings accepted for this service.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Netflix => &[],
            Self::DisneyPlus => &["Disney Plus", "Disney"],
            Self::PrimeVideo => &["Amazon Prime Video", "Amazon Prime", "Prime"],
            Self::Max => &["HBO Max", "HBO"],
            Self::Hulu => &[],
            Self::AppleTvPlus => &["Apple TV Plus", "Apple TV"],
            Self::ParamountPlus => &["Paramount Plus", "Paramount"],
            Self::Peacock => &["Peacock Premium"],
        }
    }

    /// Returns all supported services.
    pub fn all() -> &'static [StreamingService] {
        &[
            Self::Netflix,
            Self::DisneyPlus,
            Self::PrimeVideo,
            Self::Max,
            Self::Hulu,
            Self::AppleTvPlus,
            Self::ParamountPlus,
            Self::Peacock,
        ]
    }

    /// Looks up a service by display name, slug, or alias.
    ///
    /// Matching ignores case and collapses runs of whitespace, so
    /// `"disney  plus"` and `"Disney+"` both resolve.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }

        Self::all().iter().copied().find(|service| {
            normalize_name(service.display_name()) == wanted
                || service.slug() == wanted
                || service
                    .aliases()
                    .iter()
                    .any(|alias| normalize_name(alias) == wanted)
        })
    }
}

impl fmt::Display for StreamingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for StreamingService {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| CoreError::UnknownService(s.to_string()))
    }
}

/// Lowercases and collapses whitespace.
fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_round_trip() {
        for service in StreamingService::all() {
            assert_eq!(
                StreamingService::from_name(service.display_name()),
                Some(*service)
            );
            assert_eq!(StreamingService::from_name(service.slug()), Some(*service));
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(
            StreamingService::from_name("Disney Plus"),
            Some(StreamingService::DisneyPlus)
        );
        assert_eq!(
            StreamingService::from_name("  disney   PLUS "),
            Some(StreamingService::DisneyPlus)
        );
        assert_eq!(
            StreamingService::from_name("HBO Max"),
            Some(StreamingService::Max)
        );
        assert_eq!(
            StreamingService::from_name("amazon prime video"),
            Some(StreamingService::PrimeVideo)
        );
    }

    #[test]
    fn test_unknown_service() {
        assert_eq!(StreamingService::from_name("Crunchyroll"), None);
        assert_eq!(StreamingService::from_name(""), None);
        assert!("Tubi".parse::<StreamingService>().is_err());
    }

    #[test]
    fn test_slugs_are_filesystem_safe() {
        for service in StreamingService::all() {
            assert!(
                service
                    .slug()
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c == '_')
            );
        }
    }
}
