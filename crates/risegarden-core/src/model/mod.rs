// ── Domain model ──
//
// Canonical garden types produced from raw device status.

pub mod garden;
pub mod parts;

pub use garden::{Garden, GardenState};
pub use parts::{Lamp, Mainboard, Tank, Temperature, Wifi};
