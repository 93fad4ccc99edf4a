use super::{CollectionName, PublishEvent, PublishProgress, RemoteError, StickerApi, StickerInput};
use async_trait::async_trait;
use buildstructor::buildstructor;
use std::sync::Mutex;
use teloxide::types::UserId;

/// Records every remote call as a line of text, so that tests can snapshot
/// the exact sequence of calls.
#[derive(Debug)]
pub(crate) struct MockStickerApi {
    existing: bool,
    probe_error: Option<String>,
    create_error: Option<String>,
    /// 1-based number of the `append_item` call that fails
    append_failure_at: Option<usize>,
    append_error: String,
    calls: Mutex<Vec<String>>,
}

#[buildstructor]
impl MockStickerApi {
    #[builder]
    pub(crate) fn new(
        existing: Option<bool>,
        probe_error: Option<String>,
        create_error: Option<String>,
        append_failure_at: Option<usize>,
        append_error: Option<String>,
    ) -> Self {
        Self {
            existing: existing.unwrap_or(false),
            probe_error,
            create_error,
            append_failure_at,
            append_error: append_error.unwrap_or_else(|| "Bad Request: upload failed".to_owned()),
            calls: Mutex::default(),
        }
    }
}

impl MockStickerApi {
    pub(crate) fn calls(&self) -> String {
        self.calls.lock().unwrap().join("\n")
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn append_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with("append"))
            .count()
    }
}

fn render_item(item: StickerInput<'_>) -> String {
    let file = item.file.file_name().unwrap_or_default();
    format!("{file} {}", item.emoji)
}

#[async_trait]
impl StickerApi for MockStickerApi {
    async fn probe_collection(&self, name: &CollectionName) -> Result<(), RemoteError> {
        self.log(format!("probe {name}"));

        if let Some(message) = &self.probe_error {
            return Err(RemoteError::from_message(message.clone()));
        }
        if self.existing {
            return Ok(());
        }
        Err(RemoteError::from_message("Bad Request: STICKERSET_INVALID"))
    }

    async fn create_collection(
        &self,
        owner: UserId,
        name: &CollectionName,
        title: &str,
        initial: StickerInput<'_>,
    ) -> Result<(), RemoteError> {
        self.log(format!(
            "create {name} owner={owner} title={title:?} {}",
            render_item(initial)
        ));

        if let Some(message) = &self.create_error {
            return Err(RemoteError::from_message(message.clone()));
        }
        Ok(())
    }

    async fn append_item(
        &self,
        owner: UserId,
        name: &CollectionName,
        item: StickerInput<'_>,
    ) -> Result<(), RemoteError> {
        self.log(format!("append {name} owner={owner} {}", render_item(item)));

        if self.append_failure_at == Some(self.append_calls()) {
            return Err(RemoteError::from_message(self.append_error.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingProgress {
    events: Mutex<Vec<PublishEvent>>,
}

impl RecordingProgress {
    pub(crate) fn events(&self) -> String {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|event| format!("{event:?}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl PublishProgress for RecordingProgress {
    async fn report(&self, event: PublishEvent) {
        self.events.lock().unwrap().push(event);
    }
}
