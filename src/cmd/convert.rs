use crate::prelude::*;
use async_trait::async_trait;
use clap::Parser;
use std::num::NonZeroUsize;

/// Convert every GIF of the source directory into a WebM video sticker
/// using ffmpeg
///
/// The output file gets the same name as the input, but with `.webm`
/// extension. Both directories are created if they don't exist.
#[derive(Parser, Debug)]
pub struct Convert {
    /// Directory with the source `.gif` files
    #[clap(long, env = "STICKER_SOURCE_DIR", default_value = "gifs")]
    input_dir: Utf8PathBuf,

    /// Directory where the `.webm` files will be written
    #[clap(long, env = "STICKER_MEDIA_DIR", default_value = "webm")]
    output_dir: Utf8PathBuf,

    /// Overwrite the existing output files without asking for confirmation
    #[clap(long)]
    overwrite: bool,

    /// Max number of ffmpeg processes running at the same time.
    /// Defaults to the number of available CPU cores
    #[clap(long)]
    concurrency: Option<NonZeroUsize>,
}

#[async_trait]
impl crate::cmd::Cmd for Convert {
    async fn run(self) -> Result {
        let report = crate::transcode::TranscodeContext::builder()
            .input_dir(self.input_dir)
            .output_dir(self.output_dir)
            .overwrite(self.overwrite)
            .and_concurrency(self.concurrency)
            .build()
            .run()
            .await?;

        debug!(converted = report.converted, "Conversion finished");

        Ok(())
    }
}
