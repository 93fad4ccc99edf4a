//! Settings shared between the commands. Every value can be passed as a CLI
//! flag or via an environment variable (a `.env` file is loaded at startup).

use crate::prelude::*;
use crate::sticker::{Publisher, SessionStore, StickerApi};
use std::sync::Arc;
use teloxide::requests::Requester;
use teloxide::types::UserId;
use teloxide::Bot;

#[derive(clap::Args, Debug)]
pub(crate) struct TgArgs {
    /// Token of the Telegram bot that owns the sticker sets
    #[clap(long, env = "BOT_TOKEN", hide_env_values = true)]
    bot_token: String,
}

impl TgArgs {
    pub(crate) fn bot(&self) -> Bot {
        Bot::new(&self.bot_token)
    }
}

/// Username of the bot, it must be the suffix of every sticker set name
pub(crate) async fn bot_handle(bot: &Bot) -> Result<String> {
    let me = bot
        .get_me()
        .await
        .context("Failed to get the bot info, make sure the bot token is valid")?;

    Ok(me.username().to_owned())
}

#[derive(clap::Args, Debug)]
pub(crate) struct StickerArgs {
    /// Directory with the transcoded `.webm` files to publish
    #[clap(long, env = "STICKER_MEDIA_DIR", default_value = "webm")]
    pub(crate) media_dir: Utf8PathBuf,

    /// Emoji associated with every sticker in the set
    #[clap(long, env = "STICKER_EMOJI", default_value = "✂️")]
    emoji: String,

    /// Human-readable title of the sticker set. The set name is used by default
    #[clap(long, env = "STICKER_TITLE")]
    title: Option<String>,
}

impl StickerArgs {
    pub(crate) fn publisher(
        &self,
        api: Arc<dyn StickerApi>,
        sessions: Arc<dyn SessionStore>,
        owner: Option<UserId>,
    ) -> Publisher {
        Publisher::builder()
            .api(api)
            .sessions(sessions)
            .emoji(self.emoji.clone())
            .and_title(self.title.clone())
            .and_owner(owner)
            .build()
    }
}
