// ── Lamp control ──
//
// A lamp command needs to know which garden it belongs to and who can
// deliver it. Instead of a back-reference from lamp to garden, callers
// get a `LampHandle`: the garden id plus a borrowed `LampControl`.

use std::future::Future;

use risegarden_api::GardenId;

use crate::error::CoreError;

/// Something that can deliver lamp commands for a garden id.
pub trait LampControl {
    /// Set the lamp of `garden_id` to `level` percent (0-100).
    fn set_lamp_level(
        &self,
        garden_id: GardenId,
        level: u8,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Lamp command handle for one garden.
///
/// Borrows its controller, so it never outlives (or keeps alive) the
/// registry that owns the garden.
pub struct LampHandle<'a, C: LampControl> {
    garden_id: GardenId,
    control: &'a C,
}

impl<'a, C: LampControl> LampHandle<'a, C> {
    pub fn new(garden_id: GardenId, control: &'a C) -> Self {
        Self { garden_id, control }
    }

    pub fn garden_id(&self) -> GardenId {
        self.garden_id
    }

    /// Set the lamp level; see [`LampControl::set_lamp_level`].
    pub async fn set_level(&self, level: u8) -> Result<(), CoreError> {
        self.control.set_lamp_level(self.garden_id, level).await
    }
}
