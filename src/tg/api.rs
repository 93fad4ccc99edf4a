use crate::sticker::{CollectionName, RemoteError, StickerApi, StickerInput};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, InputSticker, StickerFormat, UserId};
use teloxide::{ApiError, RequestError};

/// [`StickerApi`] backed by the Telegram Bot API
#[derive(Debug, Clone)]
pub(crate) struct TgStickerApi {
    bot: Bot,
}

impl TgStickerApi {
    pub(crate) fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl StickerApi for TgStickerApi {
    async fn probe_collection(&self, name: &CollectionName) -> Result<(), RemoteError> {
        self.bot
            .get_sticker_set(name.as_str())
            .await
            .map(drop)
            .map_err(remote_error)
    }

    async fn create_collection(
        &self,
        owner: UserId,
        name: &CollectionName,
        title: &str,
        initial: StickerInput<'_>,
    ) -> Result<(), RemoteError> {
        self.bot
            .create_new_sticker_set(owner, name.as_str(), title, [input_sticker(initial)])
            .await
            .map(drop)
            .map_err(remote_error)
    }

    async fn append_item(
        &self,
        owner: UserId,
        name: &CollectionName,
        item: StickerInput<'_>,
    ) -> Result<(), RemoteError> {
        self.bot
            .add_sticker_to_set(owner, name.as_str(), input_sticker(item))
            .await
            .map(drop)
            .map_err(remote_error)
    }
}

fn input_sticker(item: StickerInput<'_>) -> InputSticker {
    InputSticker {
        sticker: InputFile::file(item.file.as_std_path()),
        format: StickerFormat::Video,
        emoji_list: vec![item.emoji.to_owned()],
        mask_position: None,
        keywords: vec![],
    }
}

/// Recognizes the name errors by their structure first, and falls back to
/// looking at the message text for the ones teloxide doesn't know about.
fn remote_error(err: RequestError) -> RemoteError {
    let message = err.to_string();

    match err {
        RequestError::Api(ApiError::InvalidStickersSet | ApiError::StickerSetNameOccupied) => {
            RemoteError::invalid_set_name(message)
        }
        _ => RemoteError::from_message(message),
    }
}
