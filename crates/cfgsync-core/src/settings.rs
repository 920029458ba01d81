//! The typed settings record mirrored from the backend

use serde::{Deserialize, Serialize};

use crate::codec::{
    self, ControlMode, DEFAULT_THEME_COLOR, DEFAULT_TOPBAR_HEIGHT, DEFAULT_WEEK, Field,
    SettingValue, ThemeMode,
};
use crate::traits::SettingsMap;

/// Snapshot of the client settings
///
/// Fields mirror the backend's persisted keys, plus the derived
/// `current_week` and the `loaded` flag which only exist client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub client_uuid: String,
    pub server_url: String,
    pub theme_mode: ThemeMode,
    pub theme_color: String,
    pub topbar_height: String,
    pub control_mode: ControlMode,
    pub show_clock: bool,
    pub show_schedule: bool,
    pub camera_enabled: bool,
    pub semester_start_date: String,
    /// Derived from `semester_start_date` by the backend
    pub current_week: u32,
    /// Set once the first full load completed
    pub loaded: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client_uuid: String::new(),
            server_url: String::new(),
            theme_mode: ThemeMode::Auto,
            theme_color: DEFAULT_THEME_COLOR.to_string(),
            topbar_height: DEFAULT_TOPBAR_HEIGHT.to_string(),
            control_mode: ControlMode::Touch,
            show_clock: true,
            show_schedule: true,
            camera_enabled: false,
            semester_start_date: String::new(),
            current_week: DEFAULT_WEEK,
            loaded: false,
        }
    }
}

impl Settings {
    /// Read a field as a typed value
    pub fn get(&self, field: Field) -> SettingValue {
        match field {
            Field::ClientUuid => self.client_uuid.as_str().into(),
            Field::ServerUrl => self.server_url.as_str().into(),
            Field::ThemeMode => self.theme_mode.into(),
            Field::ThemeColor => self.theme_color.as_str().into(),
            Field::TopbarHeight => self.topbar_height.as_str().into(),
            Field::ControlMode => self.control_mode.into(),
            Field::ShowClock => self.show_clock.into(),
            Field::ShowSchedule => self.show_schedule.into(),
            Field::CameraEnabled => self.camera_enabled.into(),
            Field::SemesterStartDate => self.semester_start_date.as_str().into(),
            Field::CurrentWeek => self.current_week.into(),
        }
    }

    /// Assign a field, coercing `value` through the field codec
    ///
    /// Returns the previous value when the field actually changed.
    pub(crate) fn set(&mut self, field: Field, value: &SettingValue) -> Option<SettingValue> {
        let wire = codec::encode(value);
        let decoded = codec::decode(field, Some(&wire));
        let previous = self.get(field);
        if previous == decoded {
            return None;
        }

        match (field, decoded) {
            (Field::ShowClock, SettingValue::Bool(b)) => self.show_clock = b,
            (Field::ShowSchedule, SettingValue::Bool(b)) => self.show_schedule = b,
            (Field::CameraEnabled, SettingValue::Bool(b)) => self.camera_enabled = b,
            (Field::CurrentWeek, SettingValue::Number(n)) => {
                self.current_week = u32::try_from(n).unwrap_or(DEFAULT_WEEK)
            }
            (Field::ThemeMode, SettingValue::Text(s)) => {
                self.theme_mode = s.parse().unwrap_or_default()
            }
            (Field::ControlMode, SettingValue::Text(s)) => {
                self.control_mode = s.parse().unwrap_or_default()
            }
            (Field::ClientUuid, SettingValue::Text(s)) => self.client_uuid = s,
            (Field::ServerUrl, SettingValue::Text(s)) => self.server_url = s,
            (Field::ThemeColor, SettingValue::Text(s)) => self.theme_color = s,
            (Field::TopbarHeight, SettingValue::Text(s)) => self.topbar_height = s,
            (Field::SemesterStartDate, SettingValue::Text(s)) => self.semester_start_date = s,
            // decode() always yields the kind matching the field
            _ => return None,
        }

        Some(previous)
    }

    /// Whether a non-default accent color is configured
    pub fn has_color_override(&self) -> bool {
        !self.theme_color.is_empty() && self.theme_color != DEFAULT_THEME_COLOR
    }

    /// Encode the persisted fields into their wire form
    pub fn to_wire(&self) -> SettingsMap {
        Field::PERSISTED
            .into_iter()
            .map(|field| (field.key().to_string(), codec::encode(&self.get(field))))
            .collect()
    }
}
