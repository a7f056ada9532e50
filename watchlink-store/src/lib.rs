// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # WatchLink Store
//!
//! Persistent state for the WatchLink resolver.
//!
//! This crate provides:
//!
//! - **LinkCache**: `work id → entry` map with lazy TTL expiry
//! - **Settings**: YAML/JSON configuration with validation
//! - **Persistence**: Atomic JSON file helpers and default paths
//!
//! ## Usage
//!
//! ```ignore
//! use watchlink_store::{LinkCache, Settings};
//!
//! let settings = Settings::load_default().await?;
//! let mut cache = LinkCache::load(&settings.cache_path, settings.cache_ttl_days).await;
//!
//! if let Some(entry) = cache.get_fresh("42", chrono::Utc::now()) {
//!     println!("{:?}", entry.streaming.link);
//! }
//! cache.flush().await?;
//! ```

pub mod error;
pub mod link_cache;
pub mod persistence;
pub mod settings;

pub use error::StoreError;
pub use link_cache::{CacheDocument, CacheStats, LinkCache, is_expired};
pub use persistence::{
    default_cache_dir, default_cache_path, default_config_dir, default_screenshot_dir,
    default_settings_path, load_json, save_json,
};
pub use settings::{BackoffSettings, Settings};
