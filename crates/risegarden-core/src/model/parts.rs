// ── Garden component types ──
//
// Value snapshots of the hardware inside one garden. No behavior beyond
// unit conversion.

use serde::{Deserialize, Serialize};

const LITERS_PER_GALLON: f64 = 3.78541;

/// Air temperature as reported by the garden (Celsius source unit).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    celsius: f64,
}

impl Temperature {
    pub fn from_celsius(celsius: f64) -> Self {
        Self { celsius }
    }

    pub fn celsius(self) -> f64 {
        self.celsius
    }

    pub fn fahrenheit(self) -> f64 {
        self.celsius * 1.8 + 32.0
    }
}

/// Controller board identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mainboard {
    pub serial_number: Option<String>,
    pub firmware: Option<String>,
    pub control_board_id: Option<String>,
}

/// Network link of the garden.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wifi {
    pub ip: Option<String>,
    /// Service-provided signal label (e.g. "good").
    pub signal_strength: Option<String>,
    /// Received signal strength in dBm.
    pub rssi: Option<i64>,
}

/// Water reservoir.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    /// Sensor-to-surface distance.
    pub distance: Option<f64>,
    pub depth: Option<f64>,
    /// Index of the lit segment on the garden's water-level LED bar.
    pub led_index: Option<i64>,
    volume_gallons: Option<f64>,
}

impl Tank {
    pub fn new(
        distance: Option<f64>,
        depth: Option<f64>,
        led_index: Option<i64>,
        volume_gallons: Option<f64>,
    ) -> Self {
        Self {
            distance,
            depth,
            led_index,
            volume_gallons,
        }
    }

    pub fn volume_gallons(&self) -> Option<f64> {
        self.volume_gallons
    }

    pub fn volume_liters(&self) -> Option<f64> {
        self.volume_gallons.map(|gal| gal * LITERS_PER_GALLON)
    }
}

/// Grow lamp state. Commands go through [`LampHandle`](crate::LampHandle),
/// not through this snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lamp {
    pub on: bool,
    /// Brightness in percent (0-100).
    pub level: u8,
}

impl Lamp {
    pub fn is_on(self) -> bool {
        self.on
    }

    pub fn level(self) -> u8 {
        self.level
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn five_gallons_in_liters() {
        let tank = Tank::new(None, None, None, Some(5.0));
        assert_eq!(tank.volume_gallons(), Some(5.0));
        assert!((tank.volume_liters().unwrap() - 18.927_05).abs() < 1e-4);
    }

    #[test]
    fn unknown_volume_stays_unknown() {
        let tank = Tank::default();
        assert_eq!(tank.volume_liters(), None);
    }

    #[test]
    fn temperature_conversion() {
        assert!((Temperature::from_celsius(0.0).fahrenheit() - 32.0).abs() < 1e-9);
        assert!((Temperature::from_celsius(100.0).fahrenheit() - 212.0).abs() < 1e-9);
        assert!((Temperature::from_celsius(21.5).fahrenheit() - 70.7).abs() < 1e-9);
        assert!((Temperature::from_celsius(21.5).celsius() - 21.5).abs() < f64::EPSILON);
    }
}
