use super::CollectionName;
use crate::prelude::*;
use async_trait::async_trait;
use std::fmt;
use teloxide::types::UserId;

/// Substrings of Telegram error descriptions that mean the sticker set name
/// can't be used. Telegram doesn't document these, so this is a best-effort
/// fallback for errors that weren't recognized by their structure.
const INVALID_SET_NAME_MARKERS: &[&str] = &[
    "STICKERSET_INVALID",
    "sticker set name is already occupied",
    "invalid sticker set name",
];

/// A single sticker as it's sent to Telegram
#[derive(Debug, Clone, Copy)]
pub(crate) struct StickerInput<'a> {
    pub(crate) file: &'a Utf8Path,
    pub(crate) emoji: &'a str,
}

/// The subset of the Telegram Bot API needed to manage sticker sets
#[async_trait]
pub(crate) trait StickerApi: fmt::Debug + Send + Sync {
    /// Succeeds if the sticker set exists
    async fn probe_collection(&self, name: &CollectionName) -> Result<(), RemoteError>;

    async fn create_collection(
        &self,
        owner: UserId,
        name: &CollectionName,
        title: &str,
        initial: StickerInput<'_>,
    ) -> Result<(), RemoteError>;

    async fn append_item(
        &self,
        owner: UserId,
        name: &CollectionName,
        item: StickerInput<'_>,
    ) -> Result<(), RemoteError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RemoteErrorKind {
    /// Telegram refused the sticker set name, the user should pick another one
    InvalidSetName,
    Other,
}

impl RemoteErrorKind {
    pub(crate) fn classify(message: &str) -> Self {
        if INVALID_SET_NAME_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
        {
            return Self::InvalidSetName;
        }
        Self::Other
    }
}

/// Failure of a remote call. The message is kept verbatim so that it can be
/// shown to the user for diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub(crate) struct RemoteError {
    pub(crate) kind: RemoteErrorKind,
    pub(crate) message: String,
}

impl RemoteError {
    /// Error whose kind is guessed from the message
    pub(crate) fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: RemoteErrorKind::classify(&message),
            message,
        }
    }

    pub(crate) fn invalid_set_name(message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::InvalidSetName,
            message: message.into(),
        }
    }
}
