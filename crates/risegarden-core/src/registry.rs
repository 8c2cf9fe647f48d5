// ── Garden registry ──
//
// Maps garden ids to their latest snapshot for one account. Owns the
// API session it talks through, so independent accounts are simply
// independent registries. Snapshots are stored as `Arc<Garden>` and
// swapped whole on update; readers never observe a half-applied one.

use std::sync::Arc;

use dashmap::DashMap;
use secrecy::SecretString;
use tracing::{debug, info, warn};

use risegarden_api::{GardenId, GardenSummary, LampLevel, RiseClient};

use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::lamp::{LampControl, LampHandle};
use crate::model::{Garden, GardenState};

/// Registry of the gardens owned by one account.
pub struct GardenRegistry {
    client: RiseClient,
    gardens: DashMap<GardenId, Arc<Garden>>,
}

impl GardenRegistry {
    /// Build a registry with its own session from runtime config.
    ///
    /// Does not contact the service; with credentials in the config the
    /// first call logs in on demand.
    pub fn new(config: &ClientConfig) -> Result<Self, CoreError> {
        let mut client = RiseClient::new(config.base_url.clone(), &config.transport())?;
        if let Some(credentials) = config.credentials.clone() {
            client = client.with_credentials(credentials);
        }
        Ok(Self::with_client(client))
    }

    /// Wrap an existing client session.
    pub fn with_client(client: RiseClient) -> Self {
        Self {
            client,
            gardens: DashMap::new(),
        }
    }

    /// The session this registry talks through.
    pub fn client(&self) -> &RiseClient {
        &self.client
    }

    // ── Session ──────────────────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &SecretString) -> Result<(), CoreError> {
        self.client.login(email, password).await?;
        info!(email, "logged in");
        Ok(())
    }

    /// Drop the session and every cached snapshot.
    pub async fn logout(&self) {
        self.client.logout().await;
        self.gardens.clear();
    }

    // ── Discovery and refresh ────────────────────────────────────────

    /// List the account's gardens, adding a placeholder for each id not
    /// yet known. Existing snapshots are left as they are.
    pub async fn list_gardens(&self) -> Result<Vec<GardenSummary>, CoreError> {
        let summaries = self.client.list_gardens().await?;
        for summary in &summaries {
            self.gardens
                .entry(summary.id)
                .or_insert_with(|| Arc::new(Garden::placeholder(summary)));
        }
        debug!(count = summaries.len(), "gardens listed");
        Ok(summaries)
    }

    /// Fetch the device status of one garden and replace its snapshot.
    ///
    /// On any failure the stored snapshot is left untouched. A garden
    /// removed while the fetch was in flight (e.g. by `logout`) stays
    /// removed.
    pub async fn update_garden(&self, id: GardenId) -> Result<(), CoreError> {
        if !self.gardens.contains_key(&id) {
            return Err(CoreError::GardenNotFound { id });
        }

        let state = GardenState::from(self.client.get_device_status(id).await?);
        let Some(mut entry) = self.gardens.get_mut(&id) else {
            return Err(CoreError::GardenNotFound { id });
        };
        let updated = entry.with_state(state);
        *entry = Arc::new(updated);
        debug!(garden_id = %id, "garden snapshot replaced");
        Ok(())
    }

    /// Update every known garden, listing first if none are known.
    ///
    /// One garden failing does not stop the others. Succeeds only if
    /// every update succeeded; otherwise returns
    /// [`CoreError::UpdateIncomplete`] naming the failed ids.
    pub async fn update_all(&self) -> Result<(), CoreError> {
        if self.is_empty() {
            self.list_gardens().await?;
        }

        let ids = self.ids();
        let total = ids.len();
        let mut failed = Vec::new();
        for id in ids {
            if let Err(err) = self.update_garden(id).await {
                warn!(garden_id = %id, error = %err, "garden update failed");
                failed.push(id);
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(CoreError::UpdateIncomplete { failed, total })
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Set a garden's lamp level (0-100), then re-read the garden so the
    /// snapshot reflects the new state.
    ///
    /// Out-of-range levels and unknown gardens are rejected without
    /// sending anything. The result reflects the command alone: once the
    /// service accepts it, a failed re-read is only logged and the old
    /// snapshot stays in place.
    pub async fn set_lamp_level(&self, id: GardenId, level: u8) -> Result<(), CoreError> {
        let level = LampLevel::new(level)?;
        if !self.gardens.contains_key(&id) {
            return Err(CoreError::GardenNotFound { id });
        }

        self.client.set_light_level(id, level).await?;
        info!(garden_id = %id, level = level.get(), "lamp level set");
        if let Err(err) = self.update_garden(id).await {
            warn!(garden_id = %id, error = %err, "re-read after lamp command failed");
        }
        Ok(())
    }

    /// Lamp command handle for a known garden.
    pub fn lamp(&self, id: GardenId) -> Option<LampHandle<'_, Self>> {
        self.gardens
            .contains_key(&id)
            .then(|| LampHandle::new(id, self))
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// The current snapshot of one garden.
    pub fn garden(&self, id: GardenId) -> Option<Arc<Garden>> {
        self.gardens.get(&id).map(|r| Arc::clone(r.value()))
    }

    /// All snapshots, ordered by id.
    pub fn gardens(&self) -> Vec<Arc<Garden>> {
        let mut all: Vec<_> = self
            .gardens
            .iter()
            .map(|r| Arc::clone(r.value()))
            .collect();
        all.sort_by_key(|g| g.id);
        all
    }

    /// Known garden ids, ascending.
    pub fn ids(&self) -> Vec<GardenId> {
        let mut ids: Vec<_> = self.gardens.iter().map(|r| *r.key()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.gardens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gardens.is_empty()
    }
}

impl LampControl for GardenRegistry {
    async fn set_lamp_level(&self, garden_id: GardenId, level: u8) -> Result<(), CoreError> {
        GardenRegistry::set_lamp_level(self, garden_id, level).await
    }
}
