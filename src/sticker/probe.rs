use super::{CollectionName, StickerApi};
use crate::prelude::*;

/// Checks whether the sticker set already exists on Telegram.
///
/// Any error is treated as "doesn't exist": a missing set and a failed
/// request are indistinguishable here. If the request failed for another
/// reason, the following attempt to create the set reports the real error.
pub(crate) async fn exists(api: &dyn StickerApi, name: &CollectionName) -> bool {
    match api.probe_collection(name).await {
        Ok(()) => {
            debug!(%name, "Sticker set already exists");
            true
        }
        Err(err) => {
            debug!(%name, %err, "Sticker set lookup failed, assuming it doesn't exist");
            false
        }
    }
}
