use crate::config::{StickerArgs, TgArgs};
use crate::display;
use crate::prelude::*;
use crate::sticker::publish::LogProgress;
use crate::sticker::{discovery, naming};
use crate::sticker::{InMemorySessionStore, PublishError, SessionStore, StickerApi};
use crate::tg::TgStickerApi;
use async_trait::async_trait;
use clap::Parser;
use std::sync::Arc;
use teloxide::types::UserId;

/// Publish the media directory as a sticker set without running the bot
///
/// The set is created if it doesn't exist, otherwise the stickers are
/// added to the end of it.
#[derive(Parser, Debug)]
pub struct Publish {
    /// Name of the sticker set. Unsupported characters are removed and
    /// the `_by_<bot_username>` suffix is appended
    #[clap(long)]
    name: String,

    /// Telegram user ID that will own the sticker set. The user must have
    /// started a conversation with the bot
    #[clap(long, env = "STICKER_OWNER_ID")]
    owner_id: u64,

    /// Skip this many files at the beginning of the media directory listing.
    /// Use it to continue after a failed run.
    #[clap(long, default_value_t = 0)]
    skip: usize,

    #[clap(flatten)]
    tg: TgArgs,

    #[clap(flatten)]
    sticker: StickerArgs,
}

#[async_trait]
impl crate::cmd::Cmd for Publish {
    async fn run(self) -> Result {
        crate::fs::ensure_dir(&self.sticker.media_dir).await?;

        let bot = self.tg.bot();
        let owner_handle = crate::config::bot_handle(&bot).await?;

        let name = naming::resolve(&self.name, &owner_handle)?;

        let items = discovery::discover(&self.sticker.media_dir).await?;

        if items.is_empty() {
            info!(
                "No .{} files found in {}, nothing to publish",
                discovery::MEDIA_EXTENSION,
                display::bold(&self.sticker.media_dir)
            );
            return Ok(());
        }

        ensure!(
            self.skip < items.len(),
            "Can't skip {} files, there are only {} of them",
            self.skip,
            items.len()
        );

        let items = items.into_iter().skip(self.skip).collect();

        let owner = UserId(self.owner_id);
        let api: Arc<dyn StickerApi> = Arc::new(TgStickerApi::new(bot));
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::default());

        let publisher = self.sticker.publisher(api, sessions, Some(owner));

        let err = match publisher.publish(owner, &name, items, &LogProgress).await {
            Ok(_) => return Ok(()),
            Err(err) => err,
        };

        if let Some(offset) = err.resume_offset() {
            let skip = self.skip + offset;
            return Err(err).with_context(|| {
                format!("Run the command again with `--skip {skip}` to continue")
            });
        }

        if let PublishError::InvalidSetName { .. } = err {
            return Err(err).context("Choose a different sticker set name with `--name`");
        }

        Err(err.into())
    }
}
