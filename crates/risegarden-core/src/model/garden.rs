// ── Garden domain type ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use risegarden_api::{GardenId, GardenSummary};

use super::parts::{Lamp, Mainboard, Tank, Temperature, Wifi};

/// One garden as last seen by the registry.
///
/// `state` is `None` until the first successful status fetch. Every
/// update replaces the whole `GardenState`; nothing is merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Garden {
    pub id: GardenId,
    pub name: String,
    pub garden_type: String,
    pub state: Option<GardenState>,
}

/// Point-in-time device state of a garden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardenState {
    pub status: Option<String>,
    pub last_reading: Option<DateTime<Utc>>,
    /// `last_reading` exactly as sent, when it was not RFC 3339.
    pub last_reading_raw: Option<String>,
    pub kit: Option<String>,
    pub temperature: Option<Temperature>,
    pub mainboard: Mainboard,
    pub wifi: Wifi,
    pub tank: Tank,
    pub lamp: Lamp,
}

impl Garden {
    /// A placeholder for a garden that has been listed but not yet fetched.
    pub fn placeholder(summary: &GardenSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name.clone(),
            garden_type: summary.garden_type.clone(),
            state: None,
        }
    }

    /// The same garden with its state replaced.
    pub fn with_state(&self, state: GardenState) -> Self {
        Self {
            state: Some(state),
            ..self.clone()
        }
    }

    pub fn is_populated(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&GardenState> {
        self.state.as_ref()
    }

    pub fn lamp(&self) -> Option<Lamp> {
        self.state.as_ref().map(|s| s.lamp)
    }

    pub fn temperature_c(&self) -> Option<f64> {
        self.temperature().map(Temperature::celsius)
    }

    pub fn temperature_f(&self) -> Option<f64> {
        self.temperature().map(Temperature::fahrenheit)
    }

    fn temperature(&self) -> Option<Temperature> {
        self.state.as_ref().and_then(|s| s.temperature)
    }
}

impl fmt::Display for Garden {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, #{})", self.name, self.garden_type, self.id)?;
        let Some(state) = &self.state else {
            return write!(f, " - no status yet");
        };
        if let Some(status) = &state.status {
            write!(f, " - {status}")?;
        }
        if let Some(temp) = state.temperature {
            write!(f, ", {:.1}°C", temp.celsius())?;
        }
        if let Some(gal) = state.tank.volume_gallons() {
            write!(f, ", {gal:.2} gal")?;
        }
        if state.lamp.on {
            write!(f, ", lamp {}%", state.lamp.level)
        } else {
            write!(f, ", lamp off")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn summary() -> GardenSummary {
        GardenSummary {
            id: GardenId(3),
            name: "Kitchen".into(),
            garden_type: "family".into(),
        }
    }

    fn state() -> GardenState {
        GardenState {
            status: Some("online".into()),
            last_reading: None,
            last_reading_raw: None,
            kit: None,
            temperature: Some(Temperature::from_celsius(21.5)),
            mainboard: Mainboard::default(),
            wifi: Wifi::default(),
            tank: Tank::new(None, None, None, Some(4.5)),
            lamp: Lamp { on: true, level: 60 },
        }
    }

    #[test]
    fn placeholder_has_no_state() {
        let garden = Garden::placeholder(&summary());
        assert!(!garden.is_populated());
        assert_eq!(garden.lamp(), None);
        assert_eq!(garden.temperature_f(), None);
        assert_eq!(garden.to_string(), "Kitchen (family, #3) - no status yet");
    }

    #[test]
    fn with_state_keeps_identity() {
        let garden = Garden::placeholder(&summary()).with_state(state());
        assert_eq!(garden.id, GardenId(3));
        assert_eq!(garden.name, "Kitchen");
        assert_eq!(garden.lamp().unwrap().level(), 60);
        assert!((garden.temperature_f().unwrap() - 70.7).abs() < 1e-9);
    }

    #[test]
    fn display_summarizes_state() {
        let garden = Garden::placeholder(&summary()).with_state(state());
        assert_eq!(
            garden.to_string(),
            "Kitchen (family, #3) - online, 21.5°C, 4.50 gal, lamp 60%"
        );
    }
}
