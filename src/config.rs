//! Controller configuration: timing constants, option types and hot updates.
//!
//! [`DisplayConfig`] holds every option with its default. Updates arrive as
//! TOML tables ([`ConfigUpdate`]) and are applied key by key: a bad value is
//! logged and rejected without affecting the other keys in the same update.
//!
//! ```toml
//! temperature_unit = "F"
//! oled_rotation = 180
//! oled_sleep_timeout = 30
//! server_name = "FALCON 1"
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use log::{debug, error};

use crate::error::ConfigError;

// =============================================================================
// Timing Configuration
// =============================================================================

/// Worker poll period. Every tick handles at most one button event.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Minimum time between refreshes of the current info page.
pub const INFO_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Time each address stays on the network page before rotating.
pub const IP_ROTATION_INTERVAL: Duration = Duration::from_secs(3);

/// A `present()` slower than this is logged as a warning.
pub const PRESENT_DEADLINE: Duration = Duration::from_millis(50);

// =============================================================================
// Queue Configuration
// =============================================================================

/// Pending button events. Clicks beyond this are dropped.
pub const BUTTON_QUEUE_CAPACITY: usize = 16;

/// Pending config updates and shutdown requests.
pub const CONTROL_QUEUE_CAPACITY: usize = 8;

// =============================================================================
// Option Types
// =============================================================================

/// Unit for the CPU temperature readout.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a Celsius reading into this unit.
    #[inline]
    pub fn convert(
        self,
        celsius: f32,
    ) -> f32 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    /// Unit letter shown after the degree sign.
    pub const fn symbol(self) -> char {
        match self {
            Self::Celsius => 'C',
            Self::Fahrenheit => 'F',
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(Self::Celsius),
            "F" => Ok(Self::Fahrenheit),
            _ => Err(()),
        }
    }
}

/// Panel rotation in 90 degree steps.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Parse a rotation from degrees. Only multiples of 90 in `0..360` are valid.
    pub const fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    pub const fn degrees(self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// True when the logical screen is taller than wide.
    #[inline]
    pub const fn is_portrait(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

/// Which disk the disk page reports.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub enum DiskSelector {
    /// Sum of all mounted disks.
    #[default]
    Total,
    /// A single disk by device name (e.g. `mmcblk0`, `nvme0n1`).
    Named(String),
}

/// Which interface the network page reports.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub enum InterfaceSelector {
    /// Every interface with an address.
    #[default]
    All,
    /// A single interface by name (e.g. `wlan0`, `eth0`).
    Named(String),
}

/// Operator-configured identity shown by the logo fallback, greeting and server info screens.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Identity {
    pub name: String,
    pub owner: String,
    pub description: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: "FALCON 1".into(),
            owner: "HITROO".into(),
            description: "Private Server for Lightscape".into(),
        }
    }
}

// =============================================================================
// Display Configuration
// =============================================================================

/// Every configurable option of the controller.
#[derive(Clone, PartialEq, Debug)]
pub struct DisplayConfig {
    pub temperature_unit: TemperatureUnit,
    pub rotation: Rotation,
    pub disk: DiskSelector,
    pub interface: InterfaceSelector,
    /// Idle time before the panel blanks. Zero disables sleep.
    pub sleep_timeout: Duration,
    /// Initial awake state.
    pub enabled: bool,
    /// Show the bitmap logo instead of the text fallback when one is loaded.
    pub video_enabled: bool,
    /// Explicit frame asset path. Read once at construction.
    pub video_frames_path: Option<PathBuf>,
    /// Install root for frame asset discovery. Defaults to the executable's directory.
    pub asset_root: Option<PathBuf>,
    /// Time spent on the logo between cycles.
    pub info_display_interval: Duration,
    /// Info phase hold.
    pub info_display_duration: Duration,
    pub greeting_duration: Duration,
    pub server_info_duration: Duration,
    /// Informational only: frame 0 is shown statically.
    pub video_fps: f32,
    pub identity: Identity,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            temperature_unit: TemperatureUnit::default(),
            rotation: Rotation::default(),
            disk: DiskSelector::default(),
            interface: InterfaceSelector::default(),
            sleep_timeout: Duration::ZERO,
            enabled: true,
            video_enabled: true,
            video_frames_path: None,
            asset_root: None,
            info_display_interval: Duration::from_secs(60),
            info_display_duration: Duration::from_secs(8),
            greeting_duration: Duration::from_secs(3),
            server_info_duration: Duration::from_secs(5),
            video_fps: 15.0,
            identity: Identity::default(),
        }
    }
}

/// Side effects of an applied update that the worker must act on.
#[derive(Debug, Default, PartialEq)]
pub struct ConfigChanges {
    /// New rotation, if `oled_rotation` was accepted.
    pub rotation: Option<Rotation>,
    /// Wake (`true`) or sleep (`false`) request from `oled_enable`.
    pub enable: Option<bool>,
    /// Keys that were accepted.
    pub applied: Vec<String>,
    /// Values that were rejected. The previous value is still in effect.
    pub rejected: Vec<ConfigError>,
}

impl DisplayConfig {
    /// Build a configuration from a TOML document on top of the defaults.
    ///
    /// Invalid values are logged and left at their default, like a hot update.
    /// Only a syntax error fails.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let update: ConfigUpdate = text.parse()?;
        let mut config = Self::default();
        config.apply(&update);
        Ok(config)
    }

    /// Apply every recognised key of `update` independently.
    pub fn apply(
        &mut self,
        update: &ConfigUpdate,
    ) -> ConfigChanges {
        let mut changes = ConfigChanges::default();
        for (key, value) in update.iter() {
            match self.apply_key(key, value, &mut changes) {
                Ok(true) => {
                    debug!("config {key} = {value}");
                    changes.applied.push(key.clone());
                }
                Ok(false) => debug!("ignoring unknown config key {key}"),
                Err(e) => {
                    error!("rejected config update: {e}");
                    changes.rejected.push(e);
                }
            }
        }
        changes
    }

    /// Returns `Ok(false)` for unknown keys.
    fn apply_key(
        &mut self,
        key: &str,
        value: &toml::Value,
        changes: &mut ConfigChanges,
    ) -> Result<bool, ConfigError> {
        match key {
            "temperature_unit" => {
                let s = str_value(key, value)?;
                self.temperature_unit = s.parse().map_err(|()| invalid(key, value, "\"C\" or \"F\""))?;
            }
            "oled_rotation" => {
                let degrees = value.as_integer().ok_or_else(|| wrong_type(key, "integer"))?;
                let rotation = Rotation::from_degrees(degrees).ok_or_else(|| invalid(key, value, "0, 90, 180 or 270"))?;
                self.rotation = rotation;
                changes.rotation = Some(rotation);
            }
            "oled_disk" => {
                self.disk = match non_empty(key, value)? {
                    "total" => DiskSelector::Total,
                    name => DiskSelector::Named(name.to_owned()),
                };
            }
            "oled_network_interface" => {
                self.interface = match non_empty(key, value)? {
                    "all" => InterfaceSelector::All,
                    name => InterfaceSelector::Named(name.to_owned()),
                };
            }
            "oled_sleep_timeout" => self.sleep_timeout = seconds(key, value, true)?,
            "oled_enable" => {
                let enable = bool_value(key, value)?;
                self.enabled = enable;
                changes.enable = Some(enable);
            }
            "video_enabled" => self.video_enabled = bool_value(key, value)?,
            "video_frames_path" => self.video_frames_path = Some(PathBuf::from(non_empty(key, value)?)),
            "asset_root" => self.asset_root = Some(PathBuf::from(non_empty(key, value)?)),
            "info_display_interval" => self.info_display_interval = seconds(key, value, false)?,
            "info_display_duration" => self.info_display_duration = seconds(key, value, false)?,
            "greeting_duration" => self.greeting_duration = seconds(key, value, false)?,
            "server_info_duration" => self.server_info_duration = seconds(key, value, false)?,
            "video_fps" => {
                let fps = number(key, value)?;
                if !(fps.is_finite() && fps > 0.0) {
                    return Err(invalid(key, value, "a number > 0"));
                }
                self.video_fps = fps as f32;
            }
            "server_name" => self.identity.name = str_value(key, value)?.to_owned(),
            "server_owner" => self.identity.owner = str_value(key, value)?.to_owned(),
            "server_description" => self.identity.description = str_value(key, value)?.to_owned(),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

// =============================================================================
// Config Updates
// =============================================================================

/// A set of configuration keys to apply, backed by a TOML table.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct ConfigUpdate {
    values: toml::Table,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn set(
        mut self,
        key: &str,
        value: impl Into<toml::Value>,
    ) -> Self {
        self.values.insert(key.to_owned(), value.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &toml::Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<toml::Table> for ConfigUpdate {
    fn from(values: toml::Table) -> Self {
        Self { values }
    }
}

impl FromStr for ConfigUpdate {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { values: s.parse::<toml::Table>()? })
    }
}

// =============================================================================
// Value Helpers
// =============================================================================

fn invalid(
    key: &str,
    value: &toml::Value,
    expected: &'static str,
) -> ConfigError {
    ConfigError::InvalidValue { key: key.to_owned(), value: value.to_string(), expected }
}

fn wrong_type(
    key: &str,
    expected: &'static str,
) -> ConfigError {
    ConfigError::WrongType { key: key.to_owned(), expected }
}

fn str_value<'a>(
    key: &str,
    value: &'a toml::Value,
) -> Result<&'a str, ConfigError> {
    value.as_str().ok_or_else(|| wrong_type(key, "string"))
}

fn non_empty<'a>(
    key: &str,
    value: &'a toml::Value,
) -> Result<&'a str, ConfigError> {
    let s = str_value(key, value)?;
    if s.trim().is_empty() {
        return Err(invalid(key, value, "a non-empty string"));
    }
    Ok(s)
}

fn bool_value(
    key: &str,
    value: &toml::Value,
) -> Result<bool, ConfigError> {
    value.as_bool().ok_or_else(|| wrong_type(key, "boolean"))
}

fn number(
    key: &str,
    value: &toml::Value,
) -> Result<f64, ConfigError> {
    match value {
        toml::Value::Integer(i) => Ok(*i as f64),
        toml::Value::Float(f) => Ok(*f),
        _ => Err(wrong_type(key, "number")),
    }
}

/// Seconds as an integer or float. Zero is only accepted when `allow_zero`.
fn seconds(
    key: &str,
    value: &toml::Value,
    allow_zero: bool,
) -> Result<Duration, ConfigError> {
    let secs = number(key, value)?;
    let expected = if allow_zero { "seconds >= 0" } else { "seconds > 0" };
    if secs == 0.0 && !allow_zero {
        return Err(invalid(key, value, expected));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| invalid(key, value, expected))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DisplayConfig::default();
        assert_eq!(config.temperature_unit, TemperatureUnit::Celsius);
        assert_eq!(config.rotation, Rotation::Deg0);
        assert_eq!(config.disk, DiskSelector::Total);
        assert_eq!(config.interface, InterfaceSelector::All);
        assert_eq!(config.sleep_timeout, Duration::ZERO);
        assert!(config.enabled);
        assert_eq!(config.info_display_interval, Duration::from_secs(60));
        assert_eq!(config.info_display_duration, Duration::from_secs(8));
        assert_eq!(config.identity.name, "FALCON 1");
    }

    #[test]
    fn test_temperature_convert() {
        assert_eq!(TemperatureUnit::Celsius.convert(48.0), 48.0);
        assert_eq!(TemperatureUnit::Fahrenheit.convert(100.0), 212.0);
        assert_eq!(TemperatureUnit::Fahrenheit.convert(0.0), 32.0);
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::from_degrees(270), Some(Rotation::Deg270));
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::from_degrees(360), None);
        assert!(Rotation::Deg90.is_portrait());
        assert!(!Rotation::Deg180.is_portrait());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let mut config = DisplayConfig::default();
        let changes = config.apply(&ConfigUpdate::new().set("fan_mode", "auto"));
        assert_eq!(config, DisplayConfig::default());
        assert!(changes.applied.is_empty());
        assert!(changes.rejected.is_empty());
    }

    #[test]
    fn test_invalid_key_does_not_roll_back_others() {
        let mut config = DisplayConfig::default();
        let update = ConfigUpdate::new()
            .set("temperature_unit", "K")
            .set("oled_rotation", 180_i64)
            .set("oled_disk", "nvme0n1")
            .set("oled_sleep_timeout", -3_i64);
        let changes = config.apply(&update);

        assert_eq!(config.temperature_unit, TemperatureUnit::Celsius);
        assert_eq!(config.rotation, Rotation::Deg180);
        assert_eq!(config.disk, DiskSelector::Named("nvme0n1".into()));
        assert_eq!(config.sleep_timeout, Duration::ZERO);
        assert_eq!(changes.rotation, Some(Rotation::Deg180));
        assert_eq!(changes.rejected.len(), 2);
    }

    #[test]
    fn test_wrong_type_rejected() {
        let mut config = DisplayConfig::default();
        let changes = config.apply(&ConfigUpdate::new().set("oled_enable", "yes"));
        assert!(config.enabled);
        assert_eq!(changes.enable, None);
        assert!(matches!(changes.rejected[0], ConfigError::WrongType { .. }));
    }

    #[test]
    fn test_rotation_rejects_odd_angle() {
        let mut config = DisplayConfig::default();
        let changes = config.apply(&ConfigUpdate::new().set("oled_rotation", 45_i64));
        assert_eq!(config.rotation, Rotation::Deg0);
        assert_eq!(changes.rotation, None);
        assert!(matches!(changes.rejected[0], ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_sleep_timeout_accepts_float() {
        let mut config = DisplayConfig::default();
        config.apply(&ConfigUpdate::new().set("oled_sleep_timeout", 2.5));
        assert_eq!(config.sleep_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_durations_must_be_positive() {
        let mut config = DisplayConfig::default();
        let changes = config.apply(&ConfigUpdate::new().set("greeting_duration", 0_i64).set("video_fps", 0.0));
        assert_eq!(config.greeting_duration, Duration::from_secs(3));
        assert_eq!(config.video_fps, 15.0);
        assert_eq!(changes.rejected.len(), 2);
    }

    #[test]
    fn test_selectors() {
        let mut config = DisplayConfig::default();
        config.apply(&ConfigUpdate::new().set("oled_network_interface", "wlan0"));
        assert_eq!(config.interface, InterfaceSelector::Named("wlan0".into()));
        config.apply(&ConfigUpdate::new().set("oled_network_interface", "all").set("oled_disk", ""));
        assert_eq!(config.interface, InterfaceSelector::All);
        assert_eq!(config.disk, DiskSelector::Total);
    }

    #[test]
    fn test_enable_reported() {
        let mut config = DisplayConfig::default();
        let changes = config.apply(&ConfigUpdate::new().set("oled_enable", false));
        assert!(!config.enabled);
        assert_eq!(changes.enable, Some(false));
    }

    #[test]
    fn test_from_toml_str() {
        let config = DisplayConfig::from_toml_str(
            r#"
            temperature_unit = "F"
            oled_rotation = 90
            server_name = "ORION"
            info_display_duration = 4.5
            video_frames_path = "/opt/oled/frames.bin"
            "#,
        )
        .unwrap();
        assert_eq!(config.temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(config.rotation, Rotation::Deg90);
        assert_eq!(config.identity.name, "ORION");
        assert_eq!(config.info_display_duration, Duration::from_millis(4500));
        assert_eq!(config.video_frames_path, Some(PathBuf::from("/opt/oled/frames.bin")));
    }

    #[test]
    fn test_from_toml_str_syntax_error() {
        assert!(matches!(DisplayConfig::from_toml_str("oled_rotation = "), Err(ConfigError::Parse(_))));
    }
}
