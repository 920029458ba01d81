// # Settings Table
//
// Backend-side model shared by the reference backends: a flat string map
// seeded with defaults, including keys the client mirror never reads
// (API server, camera, encoder and recording options).
//
// ## Default Semantics
//
// - Defaults are only inserted for missing keys, never overwriting values
// - `client_uuid` has no fixed default: a fresh UUIDv4 is minted instead
// - A reset restores every default except the excluded keys

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use super::calendar;
use crate::codec::DEFAULT_WEEK;
use crate::traits::{BatchAck, SettingsMap};

/// Key holding the client identifier
pub const CLIENT_UUID_KEY: &str = "client_uuid";

/// Key holding the semester start date
pub const SEMESTER_START_KEY: &str = "semester_start_date";

/// Key of the manually configured week, used when no start date is set
pub const MANUAL_WEEK_KEY: &str = "current_week";

/// Default values of every backend key except `client_uuid`
pub const BACKEND_DEFAULTS: &[(&str, &str)] = &[
    ("server_url", ""),
    ("api_server_enabled", "false"),
    ("api_server_host", "0.0.0.0"),
    ("api_server_port", "8765"),
    ("theme_mode", "auto"),
    ("theme_color", "#6750A4"),
    ("topbar_height", "3"),
    ("font_size", "16"),
    ("show_clock", "true"),
    ("show_schedule", "true"),
    ("semester_start_date", ""),
    ("control_mode", "touch"),
    ("camera_enabled", "false"),
    ("camera_width", "1280"),
    ("camera_height", "720"),
    ("camera_fps", "30"),
    ("camera_encoder_preference", "hardware"),
    ("encoder_nvenc_preset", "fast"),
    ("encoder_nvenc_bitrate", "5M"),
    ("recording_output_dir", "recordings"),
    ("recording_filename_pattern", "recording_%Y%m%d_%H%M%S"),
];

/// Flat key/value settings table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsTable {
    values: SettingsMap,
}

impl SettingsTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table holding every default
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.seed_defaults();
        table
    }

    /// Wrap existing values without seeding
    pub fn from_values(values: SettingsMap) -> Self {
        Self { values }
    }

    /// Insert defaults for missing keys
    ///
    /// Returns the number of keys inserted.
    pub fn seed_defaults(&mut self) -> usize {
        let mut inserted = 0;
        for key in Self::default_keys() {
            if !self.values.contains_key(key) {
                let value = Self::default_value(key);
                debug!("Initialized setting: {} = {}", key, value);
                self.values.insert(key.to_string(), value);
                inserted += 1;
            }
        }
        inserted
    }

    pub fn values(&self) -> &SettingsMap {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    /// Write a batch; an empty batch is refused
    pub fn update(&mut self, batch: &SettingsMap) -> BatchAck {
        if batch.is_empty() {
            return BatchAck::refused();
        }
        self.values
            .extend(batch.iter().map(|(k, v)| (k.clone(), v.clone())));
        info!("Updated {} settings", batch.len());
        BatchAck::accepted()
    }

    /// Replace the client identifier with a fresh one
    pub fn regenerate_uuid(&mut self) -> String {
        let uuid = uuid::Uuid::new_v4().to_string();
        self.set(CLIENT_UUID_KEY, &uuid);
        info!("Regenerated client UUID: {}", uuid);
        uuid
    }

    /// Restore defaults for every key not in `exclude`
    ///
    /// Returns the number of keys reset.
    pub fn reset(&mut self, exclude: &[String]) -> usize {
        let mut count = 0;
        for key in Self::default_keys() {
            if exclude.iter().any(|excluded| excluded == key) {
                continue;
            }
            self.values.insert(key.to_string(), Self::default_value(key));
            count += 1;
        }
        info!("Settings reset to defaults ({} keys, {} excluded)", count, exclude.len());
        count
    }

    /// Current week relative to the stored semester start
    ///
    /// Without a start date, falls back to the manually stored week.
    pub fn week_number(&self, today: NaiveDate) -> u32 {
        match self.get(SEMESTER_START_KEY).map(str::trim) {
            Some(start) if !start.is_empty() => {
                calendar::week_number(start, today).unwrap_or(DEFAULT_WEEK)
            }
            _ => self
                .get(MANUAL_WEEK_KEY)
                .and_then(|w| w.trim().parse().ok())
                .unwrap_or(DEFAULT_WEEK),
        }
    }

    fn default_keys() -> impl Iterator<Item = &'static str> {
        std::iter::once(CLIENT_UUID_KEY).chain(BACKEND_DEFAULTS.iter().map(|(key, _)| *key))
    }

    fn default_value(key: &str) -> String {
        if key == CLIENT_UUID_KEY {
            return uuid::Uuid::new_v4().to_string();
        }
        BACKEND_DEFAULTS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
            .unwrap_or_default()
    }
}

impl From<HashMap<String, String>> for SettingsTable {
    fn from(values: HashMap<String, String>) -> Self {
        Self::from_values(values)
    }
}
