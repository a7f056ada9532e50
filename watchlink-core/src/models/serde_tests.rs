//! Serialization tests for the persisted and published formats.

use chrono::{TimeZone, Utc};

use super::*;

#[test]
fn test_cache_entry_wire_shape() {
    let scraped = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let expires = Utc.with_ymd_and_hms(2024, 5, 8, 12, 0, 0).unwrap();
    let entry = CacheEntry::found("Netflix", "https://www.netflix.com/title/123", scraped, expires)
        .with_retry_count(1)
        .with_selector(Some("a.title-card".to_string()));

    let value = serde_json::to_value(&entry).unwrap();

    assert_eq!(value["streaming"]["service"], "Netflix");
    assert_eq!(value["streaming"]["link"], "https://www.netflix.com/title/123");
    assert_eq!(value["source"], AGENT_SOURCE);
    assert_eq!(value["success"], true);
    assert_eq!(value["retry_count"], 1);
    assert_eq!(value["selector_used"], "a.title-card");
    assert!(value.get("last_error").is_none());
    assert!(value.get("screenshot").is_none());
    assert!(value["scraped_at"].as_str().unwrap().starts_with("2024-05-01T12:00:00"));
}

#[test]
fn test_negative_entry_keeps_null_link() {
    let now = Utc::now();
    let entry = CacheEntry::not_found("Hulu", "not found", now, now);
    let value = serde_json::to_value(&entry).unwrap();

    assert!(value["streaming"]["link"].is_null());
    assert_eq!(value["success"], false);
    assert_eq!(value["last_error"], "not found");
}

#[test]
fn test_legacy_entry_without_timestamps() {
    let json = r#"{"streaming": {"service": "Netflix", "link": "https://www.netflix.com/title/9"}}"#;
    let entry: CacheEntry = serde_json::from_str(json).unwrap();

    assert_eq!(entry.scraped_at, None);
    assert_eq!(entry.expires_at, None);
    assert_eq!(entry.source, AGENT_SOURCE);
    assert!(!entry.success);
}

#[test]
fn test_link_resolution_omits_empty_optionals() {
    let result = LinkResolution {
        service: "Netflix".to_string(),
        link: Some("https://www.netflix.com/title/123".to_string()),
        cached: true,
        ..Default::default()
    };
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["cached"], true);
    assert!(value.get("retry_count").is_none());
    assert!(value.get("last_error").is_none());
}

#[test]
fn test_service_serde_uses_snake_case() {
    let json = serde_json::to_string(&StreamingService::DisneyPlus).unwrap();
    assert_eq!(json, "\"disney_plus\"");
}
