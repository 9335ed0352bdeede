//! Connection-string settings: spec §6. Key=value, `;`-separated,
//! case-insensitive keys.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub is_concentrator: bool,
    pub access_id: u16,
    pub shared_mapping: Option<String>,
    pub time_zone: String,
    pub time_adjustment_ticks: i64,
    pub data_loss_interval: Duration,
    pub delayed_connection_interval: Duration,
    pub allow_use_of_cached_configuration: bool,
    pub defined_frame_rate: u32,
    pub auto_repeat_file: bool,
    pub use_high_resolution_input_timer: bool,
    pub simulate_timestamp: Option<bool>,
    pub configuration_file: Option<String>,
    pub is_file_source: bool,
}

impl ConnectionSettings {
    /// Parses a `key=value;key=value` connection string. Unrecognized
    /// keys are logged and ignored rather than rejected, for forward
    /// compatibility with newer protocol revisions.
    pub fn parse(connection_string: &str) -> Result<Self, ConfigError> {
        let mut map = HashMap::new();
        for pair in connection_string.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let Some((key, value)) = pair.split_once('=') else {
                return Err(ConfigError::InvalidValue {
                    key: pair.to_string(),
                    value: String::new(),
                    reason: "expected key=value".to_string(),
                });
            };
            map.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }

        let is_file_source = map
            .get("configurationfile")
            .map(|v| v.ends_with(".file"))
            .unwrap_or(false);

        let settings = Self {
            is_concentrator: parse_bool(&map, "isconcentrator", false)?,
            access_id: parse_num(&map, "accessid", 1)?,
            shared_mapping: map.get("sharedmapping").cloned(),
            time_zone: map.get("timezone").cloned().unwrap_or_else(|| "UTC".to_string()),
            time_adjustment_ticks: parse_num(&map, "timeadjustmentticks", 0)?,
            data_loss_interval: parse_seconds(&map, "datalossinterval", 5.0)?,
            delayed_connection_interval: parse_seconds(&map, "delayedconnectioninterval", 1.5)?
                .max(Duration::from_millis(1)),
            allow_use_of_cached_configuration: parse_bool(&map, "allowuseofcachedconfiguration", true)?,
            defined_frame_rate: parse_num(&map, "definedframerate", 30)?,
            auto_repeat_file: parse_bool(&map, "autorepeatfile", true)?,
            use_high_resolution_input_timer: parse_bool(&map, "usehighresolutioninputtimer", false)?,
            simulate_timestamp: map
                .get("simulatetimestamp")
                .map(|v| parse_bool_str(v))
                .transpose()?,
            configuration_file: map.get("configurationfile").cloned(),
            is_file_source,
        };

        let known_keys = [
            "isconcentrator",
            "accessid",
            "sharedmapping",
            "timezone",
            "timeadjustmentticks",
            "datalossinterval",
            "delayedconnectioninterval",
            "allowuseofcachedconfiguration",
            "definedframerate",
            "autorepeatfile",
            "usehighresolutioninputtimer",
            "simulatetimestamp",
            "configurationfile",
            "allowedparsingexceptions",
            "parsingexceptionwindow",
            "autostartdataparsingsequence",
            "skipdisablerealtimedata",
            "executeparseonseparatethread",
        ];
        for key in map.keys() {
            if !known_keys.contains(&key.as_str()) {
                log::warn!("unrecognized connection string key '{key}', ignoring");
            }
        }

        Ok(settings)
    }

    /// `simulateTimestamp` default: true for file playback, false otherwise.
    pub fn effective_simulate_timestamp(&self) -> bool {
        self.simulate_timestamp.unwrap_or(self.is_file_source)
    }
}

fn parse_bool_str(v: &str) -> Result<bool, ConfigError> {
    match v.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: "bool".to_string(),
            value: other.to_string(),
            reason: "expected true/false".to_string(),
        }),
    }
}

fn parse_bool(map: &HashMap<String, String>, key: &str, default: bool) -> Result<bool, ConfigError> {
    match map.get(key) {
        Some(v) => parse_bool_str(v).map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: v.clone(),
            reason: "expected true/false".to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_num<T: std::str::FromStr>(map: &HashMap<String, String>, key: &str, default: T) -> Result<T, ConfigError> {
    match map.get(key) {
        Some(v) => v.parse::<T>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: v.clone(),
            reason: "expected a number".to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_seconds(map: &HashMap<String, String>, key: &str, default_secs: f64) -> Result<Duration, ConfigError> {
    let secs: f64 = parse_num(map, key, default_secs)?;
    if secs < 0.0 || !secs.is_finite() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: secs.to_string(),
            reason: "expected a non-negative, finite number of seconds".to_string(),
        });
    }
    Ok(Duration::from_secs_f64(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let settings = ConnectionSettings::parse("").unwrap();
        assert_eq!(settings.access_id, 1);
        assert!(!settings.is_concentrator);
        assert_eq!(settings.time_zone, "UTC");
        assert_eq!(settings.data_loss_interval, Duration::from_secs_f64(5.0));
        assert!(settings.allow_use_of_cached_configuration);
    }

    #[test]
    fn parses_mixed_case_keys() {
        let settings = ConnectionSettings::parse("AccessID=7;IsConcentrator=true").unwrap();
        assert_eq!(settings.access_id, 7);
        assert!(settings.is_concentrator);
    }

    #[test]
    fn rejects_malformed_pair() {
        assert!(ConnectionSettings::parse("accessid").is_err());
    }

    #[test]
    fn floors_delayed_connection_interval() {
        let settings = ConnectionSettings::parse("delayedConnectionInterval=0").unwrap();
        assert_eq!(settings.delayed_connection_interval, Duration::from_millis(1));
    }
}
