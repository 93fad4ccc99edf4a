//! Turning a directory of transcoded files into a Telegram sticker set.
//!
//! The pieces are wired together by the callers in this order: the name
//! typed by the user is [resolved](naming::resolve) and remembered in the
//! [session store](session::SessionStore), then the media directory is
//! [discovered](discovery::discover) and [published](publish::Publisher).

pub(crate) mod discovery;
pub(crate) mod naming;
pub(crate) mod probe;
pub(crate) mod publish;
pub(crate) mod remote;
pub(crate) mod session;

#[cfg(test)]
pub(crate) mod testing;

pub(crate) use discovery::MediaItem;
pub(crate) use naming::CollectionName;
pub(crate) use publish::{PublishError, PublishEvent, PublishProgress, Publisher};
pub(crate) use remote::{RemoteError, RemoteErrorKind, StickerApi, StickerInput};
pub(crate) use session::{InMemorySessionStore, SessionStore};
