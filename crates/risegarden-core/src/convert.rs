// ── API-to-domain type conversions ──
//
// Maps the raw device status payload into the canonical `GardenState`.

use chrono::{DateTime, Utc};
use tracing::debug;

use risegarden_api::DeviceStatus;

use crate::model::{GardenState, Lamp, Mainboard, Tank, Temperature, Wifi};

impl From<DeviceStatus> for GardenState {
    fn from(s: DeviceStatus) -> Self {
        Self {
            status: s.status,
            last_reading: s.last_reading.as_deref().and_then(parse_reading_time),
            last_reading_raw: s.last_reading.filter(|raw| !is_rfc3339(raw)),
            kit: s.kit,
            temperature: s.at.map(Temperature::from_celsius),
            mainboard: Mainboard {
                serial_number: s.serial_number,
                firmware: s.firmware,
                control_board_id: s.control_board_id,
            },
            wifi: Wifi {
                ip: s.ip,
                signal_strength: s.wifi_signal_strength,
                rssi: s.wifi_rssi,
            },
            tank: Tank::new(
                s.water_distance,
                s.water_depth,
                s.water_led_index,
                s.current_water_volume_gallons,
            ),
            lamp: Lamp {
                on: s.lamp_state.unwrap_or(false),
                level: lamp_percent(s.lamp_level),
            },
        }
    }
}

/// Clamp the reported level into 0-100.
fn lamp_percent(level: Option<i64>) -> u8 {
    level
        .map(|l| l.clamp(0, 100))
        .and_then(|l| u8::try_from(l).ok())
        .unwrap_or(0)
}

/// Epoch values at or above this are milliseconds (as seconds it would be
/// past the year 5000).
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

fn is_rfc3339(raw: &str) -> bool {
    DateTime::parse_from_rfc3339(raw).is_ok()
}

/// Readings arrive as RFC 3339 strings or as epoch seconds or milliseconds.
fn parse_reading_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(epoch) = raw.trim().parse::<i64>() {
        return if epoch.abs() >= EPOCH_MILLIS_THRESHOLD {
            DateTime::from_timestamp_millis(epoch)
        } else {
            DateTime::from_timestamp(epoch, 0)
        };
    }
    debug!(raw, "unrecognized last_reading format");
    None
}
