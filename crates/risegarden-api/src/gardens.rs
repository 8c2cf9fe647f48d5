// Garden endpoints
//
// Account garden listing, device status, and lamp control. All of them
// go through the gateway as authenticated requests.

use reqwest::Method;
use tracing::debug;

use crate::client::{RequestKind, RiseClient};
use crate::error::Error;
use crate::models::{DeviceStatus, GardenId, GardenSummary, LampLevel, LightLevelRequest};

impl RiseClient {
    /// List the gardens owned by the account.
    ///
    /// `GET /gardens`
    pub async fn list_gardens(&self) -> Result<Vec<GardenSummary>, Error> {
        debug!("listing gardens");
        self.send(Method::GET, "/gardens", None::<&()>, RequestKind::Authenticated)
            .await?
            .into_result()
    }

    /// Fetch the current device status of one garden.
    ///
    /// `GET /gardens/{id}/device/status`
    pub async fn get_device_status(&self, garden_id: GardenId) -> Result<DeviceStatus, Error> {
        debug!(%garden_id, "fetching device status");
        let path = format!("/gardens/{garden_id}/device/status");
        self.send(Method::GET, &path, None::<&()>, RequestKind::Authenticated)
            .await?
            .into_result()
    }

    /// Set the lamp brightness and wait for the device to acknowledge.
    ///
    /// `PUT /gardens/{id}/device/light-level` with
    /// `{"light_level": "<n>", "wait_for_response": "true"}`
    pub async fn set_light_level(&self, garden_id: GardenId, level: LampLevel) -> Result<(), Error> {
        debug!(%garden_id, level = level.get(), "setting lamp level");
        let path = format!("/gardens/{garden_id}/device/light-level");
        let body = LightLevelRequest::from(level);
        self.send(Method::PUT, &path, Some(&body), RequestKind::Authenticated)
            .await?
            .into_empty()
    }
}
