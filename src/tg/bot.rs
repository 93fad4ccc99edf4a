use crate::prelude::*;
use crate::sticker::discovery;
use crate::sticker::naming;
use crate::sticker::{PublishError, PublishEvent, PublishProgress, Publisher, SessionStore};
use async_trait::async_trait;
use std::sync::Arc;
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{ChatId, UserId};
use teloxide::utils::command::BotCommands;

type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

const USAGE: &str = "Hello! I can help create video sticker sets.\n\
    1. First use /setstickername <name> to set your sticker set name\n\
    2. Then use /createstickers to create the sticker set";

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
enum Command {
    #[command(description = "show how to create a sticker set")]
    Start,
    #[command(description = "show how to create a sticker set")]
    Help,
    #[command(description = "set the sticker set name, e.g. /setstickername mycoolstickers")]
    SetStickerName(String),
    #[command(description = "create the sticker set from the prepared WebM files")]
    CreateStickers,
}

/// Everything the command handlers need
#[derive(Debug)]
pub(crate) struct BotContext {
    pub(crate) publisher: Publisher,
    pub(crate) sessions: Arc<dyn SessionStore>,
    /// Directory with the transcoded `.webm` files
    pub(crate) media_dir: Utf8PathBuf,
    /// The bot's username, all sticker set names must end with it
    pub(crate) owner_handle: String,
}

/// Runs the bot until Ctrl+C is pressed
pub(crate) async fn run_bot(bot: Bot, ctx: BotContext) -> Result {
    bot.set_my_commands(Command::bot_commands())
        .await
        .context("Failed to register the bot commands")?;

    info!("🤖 Bot @{} is listening for commands", ctx.owner_handle);

    Dispatcher::builder(bot, schema(Arc::new(ctx)))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn schema(ctx: Arc<BotContext>) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let ctx = ctx.clone();
            async move { ctx.handle(&bot, &msg, cmd).await }
        },
    ))
}

impl BotContext {
    #[instrument(skip_all, fields(chat = %msg.chat.id, cmd = ?cmd))]
    async fn handle(&self, bot: &Bot, msg: &Message, cmd: Command) -> Result<(), HandlerError> {
        let Some(user) = msg.from.as_ref().map(|from| from.id) else {
            debug!("Ignoring a command without a sender");
            return Ok(());
        };

        info!(%user, "Received command");

        let reply = match cmd {
            Command::Start | Command::Help => Some(USAGE.to_owned()),
            Command::SetStickerName(input) => Some(self.set_sticker_name(user, &input)),
            Command::CreateStickers => self.create_stickers(bot, msg.chat.id, user).await,
        };

        if let Some(reply) = reply {
            bot.send_message(msg.chat.id, reply).await?;
        }

        Ok(())
    }

    fn set_sticker_name(&self, user: UserId, input: &str) -> String {
        if input.trim().is_empty() {
            return "Please provide a name for your sticker set.\n\
                Example: /setstickername mycoolstickers"
                .to_owned();
        }

        match naming::resolve(input, &self.owner_handle) {
            Ok(name) => {
                let reply = format!("Sticker set name set to: {name}");
                self.sessions.set(user, name);
                reply
            }
            Err(err) => {
                debug!(%err, input, "Rejected sticker set name");
                err.to_string()
            }
        }
    }

    /// Returns the final reply. Progress messages are sent while publishing.
    async fn create_stickers(&self, bot: &Bot, chat: ChatId, user: UserId) -> Option<String> {
        let Some(name) = self.sessions.get(user) else {
            return Some(
                "Please set a sticker set name first using /setstickername <name>".to_owned(),
            );
        };

        let items = match discovery::discover(&self.media_dir).await {
            Ok(items) => items,
            Err(err) => {
                error!("Failed to discover media files\n{err:?}");
                return Some(format!("Error creating video sticker set: {err:#}"));
            }
        };

        if items.is_empty() {
            return Some("No WebM files found in the folder.".to_owned());
        }

        let progress = ChatProgress {
            bot: bot.clone(),
            chat,
        };

        match self.publisher.publish(user, &name, items, &progress).await {
            Ok(report) => {
                info!(
                    name = %report.name,
                    created = report.created,
                    appended = report.appended,
                    total = report.total,
                    "Published the sticker set"
                );
                None
            }
            Err(err) => {
                error!("Failed to publish the sticker set\n{err:?}");
                Some(describe_publish_error(&err))
            }
        }
    }
}

fn describe_publish_error(err: &PublishError) -> String {
    match err {
        PublishError::InvalidSetName { .. } => {
            "Error: Invalid sticker set name. Try a different name with /setstickername".to_owned()
        }
        PublishError::CreateFailed { .. } | PublishError::AppendFailed { .. } => {
            format!("Error creating video sticker set: {err}")
        }
    }
}

/// Sends the publishing progress to the chat where the command came from
struct ChatProgress {
    bot: Bot,
    chat: ChatId,
}

#[async_trait]
impl PublishProgress for ChatProgress {
    async fn report(&self, event: PublishEvent) {
        if let Err(err) = self.bot.send_message(self.chat, progress_text(&event)).await {
            warn!(
                err = &err as &dyn std::error::Error,
                "Failed to send the progress message"
            );
        }
    }
}

fn progress_text(event: &PublishEvent) -> String {
    match event {
        PublishEvent::Started { total, .. } => {
            format!("Found {total} WebM files. Starting video sticker set creation...")
        }
        PublishEvent::ExtendingExisting { name } => {
            format!("Sticker set {name} already exists, adding the stickers to it")
        }
        PublishEvent::Uploaded { position, total } => {
            format!("Added video sticker {position}/{total}")
        }
        PublishEvent::Completed { name, .. } => {
            format!(
                "Video sticker set created! View it here: {}",
                name.share_url()
            )
        }
    }
}
