mod cmd;
mod config;
mod display;
mod ffmpeg;
mod fs;
mod sticker;
mod tg;
mod transcode;
mod util;

use clap::Parser;
use cmd::Cmd;

#[allow(unused_imports)]
mod prelude {
    pub(crate) use crate::util::path::Utf8PathExt;
    pub(crate) use anyhow::{bail, ensure, Context as _};
    pub(crate) use camino::{Utf8Path, Utf8PathBuf};
    pub(crate) use fs_err::tokio as fs;
    pub(crate) use itertools::Itertools as _;
    pub(crate) use tracing::{debug, error, info, info_span, instrument, warn, Instrument as _};

    pub(crate) type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;
}

/// Converts animated images into Telegram video stickers and publishes
/// them as a sticker set
#[derive(Parser, Debug)]
#[command(version)]
enum Args {
    Convert(cmd::Convert),
    Bot(cmd::Bot),
    Publish(cmd::Publish),
}

pub async fn run() -> anyhow::Result<()> {
    match Args::parse() {
        Args::Convert(cmd) => cmd.run().await,
        Args::Bot(cmd) => cmd.run().await,
        Args::Publish(cmd) => cmd.run().await,
    }
}
