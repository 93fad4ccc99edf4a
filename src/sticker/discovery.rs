use crate::prelude::*;

/// Extension of the files produced by the transcoding step
pub(crate) const MEDIA_EXTENSION: &str = "webm";

/// A transcoded file ready to be uploaded as a video sticker
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MediaItem {
    pub(crate) path: Utf8PathBuf,
}

/// Lists the `.webm` files of the directory (extension is matched
/// case-insensitively).
///
/// The items are returned in the order reported by the filesystem, they are
/// not sorted by name or content, so the order of stickers in the set may
/// differ between platforms. An empty result means there is nothing to
/// publish and is not an error.
#[instrument(skip_all, fields(dir = %dir))]
pub(crate) async fn discover(dir: &Utf8Path) -> Result<Vec<MediaItem>> {
    let files = crate::fs::list_files(dir)
        .await
        .with_context(|| format!("Failed to list media files in `{dir}`"))?;

    let items: Vec<_> = files
        .into_iter()
        .filter(|path| path.has_extension(MEDIA_EXTENSION))
        .map(|path| MediaItem { path })
        .collect();

    debug!(count = items.len(), "Discovered media files");

    Ok(items)
}
