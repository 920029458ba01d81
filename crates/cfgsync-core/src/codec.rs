//! Field table and wire codec
//!
//! The backend stores every setting as a string. This module owns the
//! mapping between those strings and the typed values held by
//! [`Settings`](crate::settings::Settings):
//!
//! - [`encode`]: typed value → wire string (`true`/`false` for booleans)
//! - [`decode`]: wire string → typed value, field-aware and total
//!
//! Decoding never fails. Absent, empty or unknown raw values fall back to
//! the field's default, and boolean fields only accept the literal `"true"`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Sentinel color meaning "no color override configured"
pub const DEFAULT_THEME_COLOR: &str = "#6750A4";

/// Default top bar height (rem), stored as a string
pub const DEFAULT_TOPBAR_HEIGHT: &str = "3";

/// Week reported when no calculation is available
pub const DEFAULT_WEEK: u32 = 1;

/// A setting known to the client mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ClientUuid,
    ServerUrl,
    ThemeMode,
    ThemeColor,
    TopbarHeight,
    ControlMode,
    ShowClock,
    ShowSchedule,
    CameraEnabled,
    SemesterStartDate,
    /// Derived from `semester_start_date`, never persisted
    CurrentWeek,
}

/// How a field is represented in the typed mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text (or a string-typed number such as `topbar_height`)
    Text,
    /// Boolean stored as the literal `"true"` / `"false"`
    Flag,
    /// One of a closed set of lowercase names
    Choice,
    /// Computed locally from other fields
    Derived,
}

impl Field {
    /// Every field the backend persists, in load order
    pub const PERSISTED: [Field; 10] = [
        Field::ClientUuid,
        Field::ServerUrl,
        Field::ThemeMode,
        Field::ThemeColor,
        Field::TopbarHeight,
        Field::ControlMode,
        Field::ShowClock,
        Field::ShowSchedule,
        Field::CameraEnabled,
        Field::SemesterStartDate,
    ];

    /// The wire key for this field
    pub fn key(self) -> &'static str {
        match self {
            Field::ClientUuid => "client_uuid",
            Field::ServerUrl => "server_url",
            Field::ThemeMode => "theme_mode",
            Field::ThemeColor => "theme_color",
            Field::TopbarHeight => "topbar_height",
            Field::ControlMode => "control_mode",
            Field::ShowClock => "show_clock",
            Field::ShowSchedule => "show_schedule",
            Field::CameraEnabled => "camera_enabled",
            Field::SemesterStartDate => "semester_start_date",
            Field::CurrentWeek => "current_week",
        }
    }

    /// Look a field up by its wire key
    pub fn from_key(key: &str) -> Option<Field> {
        Field::PERSISTED
            .into_iter()
            .chain(std::iter::once(Field::CurrentWeek))
            .find(|field| field.key() == key)
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::ShowClock | Field::ShowSchedule | Field::CameraEnabled => FieldKind::Flag,
            Field::ThemeMode | Field::ControlMode => FieldKind::Choice,
            Field::CurrentWeek => FieldKind::Derived,
            _ => FieldKind::Text,
        }
    }

    /// Whether the field is written to the backend
    pub fn is_persisted(self) -> bool {
        self.kind() != FieldKind::Derived
    }

    /// Raw value substituted when the backend has no (or an empty) value
    pub fn default_raw(self) -> &'static str {
        match self {
            Field::ThemeMode => ThemeMode::Auto.as_str(),
            Field::ThemeColor => DEFAULT_THEME_COLOR,
            Field::TopbarHeight => DEFAULT_TOPBAR_HEIGHT,
            Field::ControlMode => ControlMode::Touch.as_str(),
            Field::ShowClock | Field::ShowSchedule | Field::CameraEnabled => "false",
            Field::CurrentWeek => "1",
            Field::ClientUuid | Field::ServerUrl | Field::SemesterStartDate => "",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::from_key(s).ok_or_else(|| Error::not_found(format!("unknown setting key: {}", s)))
    }
}

/// Appearance mode forwarded to the theme host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Dark,
    Light,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Auto => "auto",
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ThemeMode::Auto),
            "dark" => Ok(ThemeMode::Dark),
            "light" => Ok(ThemeMode::Light),
            other => Err(Error::invalid_input(format!(
                "theme mode must be auto, dark or light, got '{}'",
                other
            ))),
        }
    }
}

/// Input style of the host UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    #[default]
    Touch,
    Mouse,
}

impl ControlMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlMode::Touch => "touch",
            ControlMode::Mouse => "mouse",
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "touch" => Ok(ControlMode::Touch),
            "mouse" => Ok(ControlMode::Mouse),
            other => Err(Error::invalid_input(format!(
                "control mode must be touch or mouse, got '{}'",
                other
            ))),
        }
    }
}

/// A typed setting value as handed to or returned from the mirror
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            SettingValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Number(value)
    }
}

impl From<u32> for SettingValue {
    fn from(value: u32) -> Self {
        SettingValue::Number(i64::from(value))
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<ThemeMode> for SettingValue {
    fn from(value: ThemeMode) -> Self {
        SettingValue::Text(value.as_str().to_string())
    }
}

impl From<ControlMode> for SettingValue {
    fn from(value: ControlMode) -> Self {
        SettingValue::Text(value.as_str().to_string())
    }
}

/// Encode a typed value into its wire string
pub fn encode(value: &SettingValue) -> String {
    match value {
        SettingValue::Bool(true) => "true".to_string(),
        SettingValue::Bool(false) => "false".to_string(),
        SettingValue::Number(n) => n.to_string(),
        SettingValue::Text(s) => s.clone(),
    }
}

/// Decode a wire string for `field`
///
/// `raw` is `None` when the backend did not return the key at all.
pub fn decode(field: Field, raw: Option<&str>) -> SettingValue {
    match field.kind() {
        FieldKind::Flag => SettingValue::Bool(raw == Some("true")),
        FieldKind::Choice => {
            let raw = raw.unwrap_or_default();
            let name = match field {
                Field::ThemeMode => raw.parse::<ThemeMode>().unwrap_or_default().as_str(),
                _ => raw.parse::<ControlMode>().unwrap_or_default().as_str(),
            };
            SettingValue::Text(name.to_string())
        }
        FieldKind::Derived => {
            let week = raw
                .and_then(|r| r.trim().parse::<u32>().ok())
                .filter(|w| *w > 0)
                .unwrap_or(DEFAULT_WEEK);
            SettingValue::Number(i64::from(week))
        }
        FieldKind::Text => match raw {
            Some(r) if !r.is_empty() => SettingValue::Text(r.to_string()),
            _ => SettingValue::Text(field.default_raw().to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_decoding_only_accepts_literal_true() {
        assert_eq!(decode(Field::ShowClock, Some("true")), SettingValue::Bool(true));
        for raw in ["false", "TRUE", "1", "yes", " true", ""] {
            assert_eq!(
                decode(Field::ShowClock, Some(raw)),
                SettingValue::Bool(false),
                "raw value {:?} must decode to false",
                raw
            );
        }
        assert_eq!(decode(Field::CameraEnabled, None), SettingValue::Bool(false));
    }

    #[test]
    fn test_persisted_fields_round_trip() {
        let samples: Vec<(Field, SettingValue)> = vec![
            (Field::ClientUuid, "2f1d7c4e-0000-4000-8000-000000000001".into()),
            (Field::ServerUrl, "http://10.0.0.2:8000".into()),
            (Field::ThemeMode, ThemeMode::Dark.into()),
            (Field::ThemeColor, "#FF5722".into()),
            (Field::TopbarHeight, "4.5".into()),
            (Field::ControlMode, ControlMode::Mouse.into()),
            (Field::ShowClock, true.into()),
            (Field::ShowSchedule, false.into()),
            (Field::CameraEnabled, true.into()),
            (Field::SemesterStartDate, "2024-02-26".into()),
        ];

        assert_eq!(samples.len(), Field::PERSISTED.len());
        for (field, value) in samples {
            let wire = encode(&value);
            assert_eq!(decode(field, Some(&wire)), value, "round trip for {}", field);
        }
    }

    #[test]
    fn test_missing_values_use_defaults() {
        assert_eq!(decode(Field::ThemeMode, None), SettingValue::from("auto"));
        assert_eq!(decode(Field::ThemeColor, Some("")), SettingValue::from(DEFAULT_THEME_COLOR));
        assert_eq!(decode(Field::TopbarHeight, None), SettingValue::from("3"));
        assert_eq!(decode(Field::ControlMode, None), SettingValue::from("touch"));
        assert_eq!(decode(Field::SemesterStartDate, None), SettingValue::from(""));
        assert_eq!(decode(Field::CurrentWeek, Some("0")), SettingValue::Number(1));
    }

    #[test]
    fn test_invalid_choices_fall_back() {
        assert_eq!(decode(Field::ThemeMode, Some("sepia")), SettingValue::from("auto"));
        assert_eq!(decode(Field::ControlMode, Some("pen")), SettingValue::from("touch"));
    }

    #[test]
    fn test_field_keys() {
        for field in Field::PERSISTED {
            assert_eq!(Field::from_key(field.key()), Some(field));
            assert!(field.is_persisted());
        }
        assert_eq!(Field::from_key("current_week"), Some(Field::CurrentWeek));
        assert!(!Field::CurrentWeek.is_persisted());
        assert_eq!(Field::from_key("font_size"), None);
        assert!("font_size".parse::<Field>().is_err());
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode(&SettingValue::Bool(true)), "true");
        assert_eq!(encode(&SettingValue::Bool(false)), "false");
        assert_eq!(encode(&SettingValue::Number(12)), "12");
        assert_eq!(encode(&"#123456".into()), "#123456");
    }
}
