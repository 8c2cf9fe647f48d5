//! Garden-level business logic between `risegarden-api` and consumers.
//!
//! - **[`GardenRegistry`]** - Owns one API session and the set of garden
//!   snapshots for that account. [`list_gardens()`](GardenRegistry::list_gardens)
//!   discovers gardens, [`update_garden()`](GardenRegistry::update_garden) and
//!   [`update_all()`](GardenRegistry::update_all) replace snapshots with fresh
//!   device status, and [`set_lamp_level()`](GardenRegistry::set_lamp_level)
//!   sends a lamp command and re-reads the garden.
//!
//! - **Domain model** ([`model`]) - [`Garden`] snapshots with their
//!   [`Mainboard`], [`Wifi`], [`Tank`], and [`Lamp`] parts, plus unit
//!   conversions ([`Temperature`], tank volume).
//!
//! - **[`LampControl`] / [`LampHandle`]** - Lamp commands routed by garden id
//!   through a capability instead of a back-reference to the garden.
//!
//! - **[`ClientConfig`]** - Runtime connection settings; this crate never
//!   reads config files (see `risegarden-config`).

pub mod config;
pub mod convert;
pub mod error;
pub mod lamp;
pub mod model;
pub mod registry;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ClientConfig;
pub use error::CoreError;
pub use lamp::{LampControl, LampHandle};
pub use model::{Garden, GardenState, Lamp, Mainboard, Tank, Temperature, Wifi};
pub use registry::GardenRegistry;

pub use risegarden_api::{Credentials, GardenId, GardenSummary, RiseClient};
