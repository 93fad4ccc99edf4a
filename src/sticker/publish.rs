use super::{
    probe, CollectionName, MediaItem, RemoteError, RemoteErrorKind, SessionStore, StickerApi,
    StickerInput,
};
use crate::prelude::*;
use async_trait::async_trait;
use buildstructor::buildstructor;
use std::sync::Arc;
use teloxide::types::UserId;

/// Milestones of the publishing workflow in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PublishEvent {
    Started { name: CollectionName, total: usize },

    /// The set exists already, so all items are added to it
    ExtendingExisting { name: CollectionName },

    /// `position` items out of `total` are in the set now
    Uploaded { position: usize, total: usize },

    Completed { name: CollectionName, total: usize },
}

/// Receives [`PublishEvent`]s while the workflow runs. The workflow waits for
/// each report to finish, so the events are observed strictly in order.
#[async_trait]
pub(crate) trait PublishProgress: Send + Sync {
    async fn report(&self, event: PublishEvent);
}

/// Reports the progress to the logs only
#[derive(Debug)]
pub(crate) struct LogProgress;

#[async_trait]
impl PublishProgress for LogProgress {
    async fn report(&self, event: PublishEvent) {
        match event {
            PublishEvent::Started { name, total } => {
                info!("🚀 Publishing {total} stickers to the set {name}");
            }
            PublishEvent::ExtendingExisting { name } => {
                info!("The set {name} already exists, adding stickers to it");
            }
            PublishEvent::Uploaded { position, total } => {
                info!("✅ Added sticker {position}/{total}");
            }
            PublishEvent::Completed { name, total } => {
                let url = nu_ansi_term::Color::Magenta.bold().paint(name.share_url());
                info!("🎉 Published {total} stickers, view them at {url}");
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PublishReport {
    pub(crate) name: CollectionName,
    /// Whether the set was created by this run
    pub(crate) created: bool,
    pub(crate) appended: usize,
    pub(crate) total: usize,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum PublishError {
    #[error("Telegram rejected the sticker set name `{name}`: {reason}")]
    InvalidSetName {
        name: CollectionName,
        reason: RemoteError,
    },

    #[error("Failed to create the sticker set `{name}`: {reason}")]
    CreateFailed {
        name: CollectionName,
        reason: RemoteError,
    },

    #[error(
        "Failed to add sticker #{index} `{file}` to the set `{name}` \
        ({appended} stickers were added before the failure): {reason}"
    )]
    AppendFailed {
        name: CollectionName,
        /// 1-based number of the failed append call
        index: usize,
        /// Number of append calls that succeeded before the failure
        appended: usize,
        /// Whether the set was created by the same run before the failure
        created: bool,
        file: Utf8PathBuf,
        reason: RemoteError,
    },
}

impl PublishError {
    /// Number of leading items of the published sequence that made it into
    /// the set. Publishing the rest of the sequence after this offset
    /// continues where the failed run stopped.
    pub(crate) fn resume_offset(&self) -> Option<usize> {
        match self {
            Self::AppendFailed {
                appended, created, ..
            } => Some(usize::from(*created) + appended),
            Self::InvalidSetName { .. } | Self::CreateFailed { .. } => None,
        }
    }
}

/// Creates sticker sets and fills them with stickers
#[derive(Debug)]
pub(crate) struct Publisher {
    api: Arc<dyn StickerApi>,
    sessions: Arc<dyn SessionStore>,
    emoji: String,
    /// Title of the created sets. The set name is used when absent
    title: Option<String>,
    /// Owner of all the sets. The user who asked for publishing owns
    /// the set when absent
    owner: Option<UserId>,
}

#[buildstructor]
impl Publisher {
    #[builder]
    pub(crate) fn new(
        api: Arc<dyn StickerApi>,
        sessions: Arc<dyn SessionStore>,
        emoji: String,
        title: Option<String>,
        owner: Option<UserId>,
    ) -> Self {
        Self {
            api,
            sessions,
            emoji,
            title,
            owner,
        }
    }
}

impl Publisher {
    /// Uploads the items into the set in the given order. The set is created
    /// from the first item if it doesn't exist yet.
    ///
    /// The first failed remote call stops the workflow. No retries are made
    /// and nothing is rolled back on Telegram's side. The pending name of the
    /// `user` is cleared only if every item was uploaded.
    #[instrument(skip_all, fields(name = %name, user = %user))]
    pub(crate) async fn publish(
        &self,
        user: UserId,
        name: &CollectionName,
        items: Vec<MediaItem>,
        progress: &dyn PublishProgress,
    ) -> Result<PublishReport, PublishError> {
        let total = items.len();

        let mut report = PublishReport {
            name: name.clone(),
            created: false,
            appended: 0,
            total,
        };

        if items.is_empty() {
            info!("No stickers to publish");
            return Ok(report);
        }

        progress
            .report(PublishEvent::Started {
                name: name.clone(),
                total,
            })
            .await;

        let owner = self.owner.unwrap_or(user);
        let mut items = items.into_iter();

        if probe::exists(&*self.api, name).await {
            progress
                .report(PublishEvent::ExtendingExisting { name: name.clone() })
                .await;
        } else if let Some(first) = items.next() {
            let title = self.title.as_deref().unwrap_or(name.as_str());

            self.api
                .create_collection(owner, name, title, self.sticker(&first))
                .await
                .map_err(|reason| match reason.kind {
                    RemoteErrorKind::InvalidSetName => invalid_set_name(name, reason),
                    RemoteErrorKind::Other => PublishError::CreateFailed {
                        name: name.clone(),
                        reason,
                    },
                })?;

            report.created = true;

            progress
                .report(PublishEvent::Uploaded { position: 1, total })
                .await;
        }

        for item in items {
            self.api
                .append_item(owner, name, self.sticker(&item))
                .await
                .map_err(|reason| match reason.kind {
                    // Once something is uploaded the set name is known to be
                    // valid, and the progress must be kept for resuming
                    RemoteErrorKind::InvalidSetName
                        if !report.created && report.appended == 0 =>
                    {
                        invalid_set_name(name, reason)
                    }
                    _ => PublishError::AppendFailed {
                        name: name.clone(),
                        index: report.appended + 1,
                        appended: report.appended,
                        created: report.created,
                        file: item.path.clone(),
                        reason,
                    },
                })?;

            report.appended += 1;

            let position = usize::from(report.created) + report.appended;
            progress
                .report(PublishEvent::Uploaded { position, total })
                .await;
        }

        self.sessions.clear(user);

        progress
            .report(PublishEvent::Completed {
                name: name.clone(),
                total,
            })
            .await;

        Ok(report)
    }

    fn sticker<'a>(&'a self, item: &'a MediaItem) -> StickerInput<'a> {
        StickerInput {
            file: &item.path,
            emoji: &self.emoji,
        }
    }
}

fn invalid_set_name(name: &CollectionName, reason: RemoteError) -> PublishError {
    warn!(%name, %reason, "Telegram rejected the sticker set name");
    PublishError::InvalidSetName {
        name: name.clone(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sticker::naming::resolve;
    use crate::sticker::testing::{MockStickerApi, RecordingProgress};
    use crate::sticker::InMemorySessionStore;
    use expect_test::{expect, Expect};

    const USER: UserId = UserId(100);

    fn name() -> CollectionName {
        resolve("cats", "stickbot").unwrap()
    }

    fn items(files: &[&str]) -> Vec<MediaItem> {
        files
            .iter()
            .map(|file| MediaItem {
                path: Utf8PathBuf::from("webm").join(file),
            })
            .collect()
    }

    struct Run {
        api: Arc<MockStickerApi>,
        sessions: Arc<InMemorySessionStore>,
        progress: RecordingProgress,
        result: Result<PublishReport, PublishError>,
    }

    async fn run(api: MockStickerApi, owner: Option<UserId>, files: &[&str]) -> Run {
        let api = Arc::new(api);
        let sessions = Arc::new(InMemorySessionStore::default());
        sessions.set(USER, name());

        let dyn_api: Arc<dyn StickerApi> = api.clone();
        let dyn_sessions: Arc<dyn SessionStore> = sessions.clone();

        let publisher = Publisher::builder()
            .api(dyn_api)
            .sessions(dyn_sessions)
            .emoji("✂️".to_owned())
            .and_owner(owner)
            .build();

        let progress = RecordingProgress::default();
        let result = publisher
            .publish(USER, &name(), items(files), &progress)
            .await;

        Run {
            api,
            sessions,
            progress,
            result,
        }
    }

    fn assert_calls(run: &Run, expected: Expect) {
        expected.assert_eq(&run.api.calls());
    }

    #[test_log::test(tokio::test)]
    async fn empty_media_set_makes_no_remote_calls() {
        let run = run(MockStickerApi::builder().build(), None, &[]).await;

        let report = run.result.as_ref().unwrap();
        assert_eq!((report.created, report.appended, report.total), (false, 0, 0));
        assert_calls(&run, expect![""]);
        assert_eq!(run.progress.events(), "");
    }

    #[test_log::test(tokio::test)]
    async fn creates_missing_set_from_first_item() {
        let run = run(
            MockStickerApi::builder().build(),
            None,
            &["a.webm", "b.webm", "c.webm"],
        )
        .await;

        assert_calls(
            &run,
            expect![[r#"
                probe cats_by_stickbot
                create cats_by_stickbot owner=100 title="cats_by_stickbot" a.webm ✂️
                append cats_by_stickbot owner=100 b.webm ✂️
                append cats_by_stickbot owner=100 c.webm ✂️"#]],
        );

        let report = run.result.unwrap();
        assert!(report.created);
        assert_eq!(report.appended, 2);
        assert_eq!(report.total, 3);

        assert_eq!(run.sessions.get(USER), None);
    }

    #[test_log::test(tokio::test)]
    async fn appends_everything_to_existing_set() {
        let run = run(
            MockStickerApi::builder().existing(true).build(),
            None,
            &["a.webm", "b.webm"],
        )
        .await;

        assert_calls(
            &run,
            expect![[r#"
                probe cats_by_stickbot
                append cats_by_stickbot owner=100 a.webm ✂️
                append cats_by_stickbot owner=100 b.webm ✂️"#]],
        );

        let report = run.result.unwrap();
        assert!(!report.created);
        assert_eq!(report.appended, 2);
    }

    #[test_log::test(tokio::test)]
    async fn stops_at_first_failed_append() {
        let run = run(
            MockStickerApi::builder().append_failure_at(2).build(),
            None,
            &["a.webm", "b.webm", "c.webm", "d.webm"],
        )
        .await;

        assert_calls(
            &run,
            expect![[r#"
                probe cats_by_stickbot
                create cats_by_stickbot owner=100 title="cats_by_stickbot" a.webm ✂️
                append cats_by_stickbot owner=100 b.webm ✂️
                append cats_by_stickbot owner=100 c.webm ✂️"#]],
        );

        let err = run.result.unwrap_err();
        assert!(
            matches!(
                &err,
                PublishError::AppendFailed { index: 2, appended: 1, created: true, file, .. }
                    if file.as_str() == "webm/c.webm"
            ),
            "{err:?}"
        );

        // `a` and `b` are in the set, publishing must continue from `c`
        assert_eq!(err.resume_offset(), Some(2));

        expect!["Failed to add sticker #2 `webm/c.webm` to the set `cats_by_stickbot` (1 stickers were added before the failure): Bad Request: upload failed"]
            .assert_eq(&err.to_string());

        assert_eq!(run.sessions.get(USER), Some(name()));
    }

    #[test_log::test(tokio::test)]
    async fn resume_offset_for_existing_set() {
        let run = run(
            MockStickerApi::builder()
                .existing(true)
                .append_failure_at(3)
                .build(),
            None,
            &["a.webm", "b.webm", "c.webm", "d.webm"],
        )
        .await;

        let err = run.result.unwrap_err();
        assert_eq!(err.resume_offset(), Some(2));
    }

    #[test_log::test(tokio::test)]
    async fn rejected_name_after_upload_keeps_progress() {
        let run = run(
            MockStickerApi::builder()
                .append_failure_at(2)
                .append_error("Bad Request: STICKERSET_INVALID".to_owned())
                .build(),
            None,
            &["a.webm", "b.webm", "c.webm", "d.webm"],
        )
        .await;

        assert_calls(
            &run,
            expect![[r#"
                probe cats_by_stickbot
                create cats_by_stickbot owner=100 title="cats_by_stickbot" a.webm ✂️
                append cats_by_stickbot owner=100 b.webm ✂️
                append cats_by_stickbot owner=100 c.webm ✂️"#]],
        );

        let err = run.result.unwrap_err();
        assert!(
            matches!(
                err,
                PublishError::AppendFailed { index: 2, appended: 1, created: true, .. }
            ),
            "{err:?}"
        );
        assert_eq!(err.resume_offset(), Some(2));
        assert_eq!(run.sessions.get(USER), Some(name()));
    }

    #[test_log::test(tokio::test)]
    async fn rejected_name_on_first_append_to_existing_set() {
        let run = run(
            MockStickerApi::builder()
                .existing(true)
                .append_failure_at(1)
                .append_error("Bad Request: STICKERSET_INVALID".to_owned())
                .build(),
            None,
            &["a.webm", "b.webm"],
        )
        .await;

        let err = run.result.unwrap_err();
        assert!(matches!(err, PublishError::InvalidSetName { .. }), "{err:?}");
        assert_eq!(err.resume_offset(), None);
    }

    #[test_log::test(tokio::test)]
    async fn failed_creation_aborts_workflow() {
        let run = run(
            MockStickerApi::builder()
                .create_error("Bad Request: STICKER_VIDEO_LONG".to_owned())
                .build(),
            None,
            &["a.webm", "b.webm"],
        )
        .await;

        assert_calls(
            &run,
            expect![[r#"
                probe cats_by_stickbot
                create cats_by_stickbot owner=100 title="cats_by_stickbot" a.webm ✂️"#]],
        );

        let err = run.result.unwrap_err();
        assert!(matches!(err, PublishError::CreateFailed { .. }), "{err:?}");
        assert_eq!(err.resume_offset(), None);
        assert_eq!(run.sessions.get(USER), Some(name()));
    }

    #[test_log::test(tokio::test)]
    async fn rejected_name_is_reported_separately() {
        let run = run(
            MockStickerApi::builder()
                .create_error("Bad Request: sticker set name is already occupied".to_owned())
                .build(),
            None,
            &["a.webm"],
        )
        .await;

        let err = run.result.unwrap_err();
        expect!["Telegram rejected the sticker set name `cats_by_stickbot`: Bad Request: sticker set name is already occupied"]
            .assert_eq(&err.to_string());
        assert!(matches!(err, PublishError::InvalidSetName { .. }), "{err:?}");
    }

    #[test_log::test(tokio::test)]
    async fn configured_owner_is_used_for_mutations() {
        let run = run(
            MockStickerApi::builder().build(),
            Some(UserId(7)),
            &["a.webm", "b.webm"],
        )
        .await;

        assert_calls(
            &run,
            expect![[r#"
                probe cats_by_stickbot
                create cats_by_stickbot owner=7 title="cats_by_stickbot" a.webm ✂️
                append cats_by_stickbot owner=7 b.webm ✂️"#]],
        );

        // The session is keyed by the requesting user, not by the owner
        assert_eq!(run.sessions.get(USER), None);
    }

    #[test_log::test(tokio::test)]
    async fn progress_is_reported_in_order() {
        let run = run(
            MockStickerApi::builder().build(),
            None,
            &["a.webm", "b.webm"],
        )
        .await;

        expect![[r#"
            Started { name: CollectionName("cats_by_stickbot"), total: 2 }
            Uploaded { position: 1, total: 2 }
            Uploaded { position: 2, total: 2 }
            Completed { name: CollectionName("cats_by_stickbot"), total: 2 }"#]]
        .assert_eq(&run.progress.events());
    }

    #[test_log::test(tokio::test)]
    async fn custom_title_is_used_on_creation() {
        let api = Arc::new(MockStickerApi::builder().build());
        let dyn_api: Arc<dyn StickerApi> = api.clone();
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::default());

        let publisher = Publisher::builder()
            .api(dyn_api)
            .sessions(sessions)
            .emoji("🐱".to_owned())
            .title("My cats".to_owned())
            .build();

        publisher
            .publish(USER, &name(), items(&["a.webm"]), &LogProgress)
            .await
            .unwrap();

        expect![[r#"
            probe cats_by_stickbot
            create cats_by_stickbot owner=100 title="My cats" a.webm 🐱"#]]
        .assert_eq(&api.calls());
    }
}
