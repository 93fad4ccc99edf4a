mod api;
mod bot;

pub(crate) use api::TgStickerApi;
pub(crate) use bot::{run_bot, BotContext};
