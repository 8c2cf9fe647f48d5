// risegarden-api: Async Rust client for the Rise Garden cloud API
//
// Owns the session lifecycle (login, refresh, bearer validation), the
// request gateway every call passes through, and the raw garden endpoints.

pub mod auth;
pub mod client;
pub mod error;
pub mod gardens;
pub mod models;
pub mod session;
pub mod transport;

pub use auth::{Credentials, EXPIRY_MARGIN_SECS, TokenState};
pub use client::{ApiResponse, DEFAULT_BASE_URL, RequestKind, RiseClient};
pub use error::Error;
pub use models::{DeviceStatus, GardenId, GardenSummary, LampLevel};
pub use transport::{TlsMode, TransportConfig};
