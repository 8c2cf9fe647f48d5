// Wire types for the Rise Garden API
//
// Request bodies and response payloads exactly as the service speaks
// them. Device status fields are deserialized leniently: the service
// mixes strings and numbers for identifiers and reports the lamp state
// in several shapes depending on firmware.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ── Identifiers ─────────────────────────────────────────────────────

/// Service-assigned garden identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GardenId(pub u64);

impl fmt::Display for GardenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for GardenId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ── Auth ────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response from `/auth/login` and `/auth/refresh_token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: i64,
    /// Account record; only `id` is interpreted.
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

impl TokenResponse {
    /// The user id, rendered as a string whether the service sent a
    /// number or a string.
    pub fn user_id(&self) -> Option<String> {
        match self.user.as_ref()?.get("id")? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

// ── Gardens ─────────────────────────────────────────────────────────

/// One entry of `GET /gardens`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GardenSummary {
    pub id: GardenId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub garden_type: String,
}

/// Payload of `GET /gardens/{id}/device/status`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeviceStatus {
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub last_reading: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub kit: Option<String>,

    // Mainboard
    #[serde(default, deserialize_with = "lenient::string")]
    pub serial_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub firmware: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub control_board_id: Option<String>,

    // Wifi
    #[serde(default, deserialize_with = "lenient::string")]
    pub ip: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub wifi_signal_strength: Option<String>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub wifi_rssi: Option<i64>,

    // Tank
    #[serde(default, deserialize_with = "lenient::float")]
    pub water_distance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub water_depth: Option<f64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub water_led_index: Option<i64>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub current_water_volume_gallons: Option<f64>,

    // Lamp
    #[serde(default, deserialize_with = "lenient::flag")]
    pub lamp_state: Option<bool>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub lamp_level: Option<i64>,

    /// Air temperature in Celsius.
    #[serde(default, deserialize_with = "lenient::float")]
    pub at: Option<f64>,
}

// ── Lamp control ────────────────────────────────────────────────────

/// A lamp brightness in percent, validated to 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LampLevel(u8);

impl LampLevel {
    pub const MAX: u8 = 100;

    pub fn new(level: u8) -> Result<Self, Error> {
        if level > Self::MAX {
            return Err(Error::InvalidLampLevel(level));
        }
        Ok(Self(level))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for LampLevel {
    type Error = Error;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

/// Body of `PUT /gardens/{id}/device/light-level`. The service expects
/// both fields as strings.
#[derive(Debug, Serialize)]
pub(crate) struct LightLevelRequest {
    pub light_level: String,
    pub wait_for_response: &'static str,
}

impl From<LampLevel> for LightLevelRequest {
    fn from(level: LampLevel) -> Self {
        Self {
            light_level: level.get().to_string(),
            wait_for_response: "true",
        }
    }
}

// ── Lenient field decoding ──────────────────────────────────────────

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        })
    }

    pub fn float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// Whole numbers; fractional values (`42.0`, `"42.5"`) are rounded.
    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(round)),
            Some(Value::String(s)) => {
                let s = s.trim();
                s.parse()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(round))
            }
            _ => None,
        })
    }

    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    fn round(f: f64) -> Option<i64> {
        // i64::MAX is not exactly representable; stay strictly below 2^63.
        const LIMIT: f64 = 9_223_372_036_854_775_808.0;
        let r = f.round();
        (r.is_finite() && r >= -LIMIT && r < LIMIT).then_some(r as i64)
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Bool(b)) => Some(b),
            Some(Value::Number(n)) => n.as_i64().map(|v| v != 0),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "on" | "true" | "1" => Some(true),
                "off" | "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        })
    }
}
