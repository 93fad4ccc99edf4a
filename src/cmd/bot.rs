use crate::config::{StickerArgs, TgArgs};
use crate::prelude::*;
use crate::sticker::{InMemorySessionStore, SessionStore, StickerApi};
use crate::tg::{BotContext, TgStickerApi};
use async_trait::async_trait;
use clap::Parser;
use std::sync::Arc;
use teloxide::types::UserId;

/// Run the Telegram bot that creates video sticker sets on request
///
/// Users choose the name of their set with `/setstickername <name>` and
/// publish the files of the media directory with `/createstickers`.
#[derive(Parser, Debug)]
pub struct Bot {
    #[clap(flatten)]
    tg: TgArgs,

    #[clap(flatten)]
    sticker: StickerArgs,

    /// Telegram user ID that will own all the created sticker sets.
    /// By default, the set is owned by the user who created it
    #[clap(long, env = "STICKER_OWNER_ID")]
    owner_id: Option<u64>,
}

#[async_trait]
impl crate::cmd::Cmd for Bot {
    async fn run(self) -> Result {
        crate::fs::ensure_dir(&self.sticker.media_dir).await?;

        let bot = self.tg.bot();
        let owner_handle = crate::config::bot_handle(&bot).await?;

        let api: Arc<dyn StickerApi> = Arc::new(TgStickerApi::new(bot.clone()));
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::default());

        let publisher = self
            .sticker
            .publisher(api, sessions.clone(), self.owner_id.map(UserId));

        let ctx = BotContext {
            publisher,
            sessions,
            media_dir: self.sticker.media_dir,
            owner_handle,
        };

        crate::tg::run_bot(bot, ctx).await
    }
}
