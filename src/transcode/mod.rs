//! Converting animated images into WebM files that Telegram accepts as
//! video stickers.

#[cfg(test)]
mod testing;

use crate::display;
use crate::ffmpeg::Ffmpeg;
use crate::prelude::*;
use crate::sticker::discovery::MEDIA_EXTENSION;
use crate::util::path::Utf8StemmedPathBuf;
use buildstructor::buildstructor;
use futures::prelude::*;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Extension of the source files that are converted
pub(crate) const SOURCE_EXTENSION: &str = "gif";

/// Fixed encoding parameters for every file.
///
/// Telegram requires VP9 video in a WebM container with the largest side
/// not exceeding 512 pixels.
const ENCODING_ARGS: &[&str] = &[
    "-c:v",
    "libvpx-vp9",
    // Constant quality mode, lower values yield higher quality
    "-crf",
    "35",
    "-b:v",
    "0",
    "-c:a",
    "libopus",
    "-vf",
    "scale=512:512:force_original_aspect_ratio=decrease",
];

pub(crate) struct TranscodeContext {
    input_dir: Utf8PathBuf,
    output_dir: Utf8PathBuf,
    overwrite: bool,
    concurrency: NonZeroUsize,
    ffmpeg: Arc<dyn Ffmpeg>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TranscodeReport {
    pub(crate) converted: usize,
}

#[buildstructor]
impl TranscodeContext {
    #[builder]
    pub(crate) fn new(
        input_dir: Utf8PathBuf,
        output_dir: Utf8PathBuf,
        overwrite: bool,
        concurrency: Option<NonZeroUsize>,
        ffmpeg: Option<Arc<dyn Ffmpeg>>,
    ) -> Self {
        Self {
            input_dir,
            output_dir,
            overwrite,
            concurrency: concurrency.unwrap_or_else(|| {
                Self::default_concurrency(" Use `--concurrency` to set it explicitly.")
            }),
            ffmpeg: ffmpeg.unwrap_or_else(|| Arc::new(crate::ffmpeg::FfmpegProcess)),
        }
    }

    pub(crate) fn default_concurrency(err_suffix: &str) -> NonZeroUsize {
        std::thread::available_parallelism().unwrap_or_else(|err| {
            let default = NonZeroUsize::MIN;
            warn!(
                err = &err as &dyn std::error::Error,
                "Failed to query the system's available parallelism. \
                Falling back to the default value of {default}.{err_suffix}",
            );
            default
        })
    }
}

struct TranscodeJob {
    input: Utf8StemmedPathBuf,
    output: Utf8PathBuf,
}

impl TranscodeContext {
    async fn jobs(&self) -> Result<Vec<TranscodeJob>> {
        let inputs: Vec<Utf8StemmedPathBuf> = crate::fs::list_files(&self.input_dir)
            .await
            .with_context(|| format!("Failed to list source files in `{}`", self.input_dir))?
            .into_iter()
            .filter(|path| path.has_extension(SOURCE_EXTENSION))
            .map(TryInto::try_into)
            .collect::<Result<_>>()?;

        crate::fs::validate_duplicate_input_names(&inputs)?;

        Ok(inputs
            .into_iter()
            .map(|input| {
                let file_name = format!("{}.{MEDIA_EXTENSION}", input.file_stem());
                let output = self.output_dir.join(file_name);
                TranscodeJob { input, output }
            })
            .collect())
    }

    /// Converts every source file. A failed file doesn't stop the others,
    /// but the whole run fails at the end if any of them failed.
    pub(crate) async fn run(self) -> Result<TranscodeReport> {
        crate::fs::ensure_dir(&self.input_dir).await?;
        crate::fs::ensure_dir(&self.output_dir).await?;

        let jobs = self.jobs().await?;

        if jobs.is_empty() {
            info!(
                "No {SOURCE_EXTENSION} files found in {}",
                display::bold(&self.input_dir)
            );
            return Ok(TranscodeReport { converted: 0 });
        }

        crate::fs::validate_output_files_overwriting(
            self.overwrite,
            jobs.iter().map(|job| job.output.clone()),
        )
        .await?;

        let start = std::time::Instant::now();
        let total = jobs.len();

        let results: Vec<_> = stream::iter(jobs)
            .enumerate()
            .map(|(id, job)| {
                let ffmpeg = self.ffmpeg.clone();
                async move {
                    let result = job.run(&*ffmpeg).await;
                    (job.input, result)
                }
                .instrument(info_span!("task", id = id + 1))
            })
            .buffer_unordered(self.concurrency.get())
            .collect()
            .await;

        let failed = results
            .iter()
            .filter_map(|(input, result)| result.as_ref().err().map(|err| (input, err)))
            .sorted_by(|(a, _), (b, _)| a.as_path().cmp(b.as_path()))
            .collect_vec();

        let converted = total - failed.len();

        if !failed.is_empty() {
            let failed = failed.iter().format_with("\n", |(input, err), f| {
                f(&format_args!("- {}: {err:#}", input.as_path()))
            });
            bail!("Failed to convert {} out of {total} files\n{failed}", total - converted);
        }

        let elapsed = display::elapsed(start);
        info!("🎉 Converted {converted} files in {elapsed}");

        Ok(TranscodeReport { converted })
    }
}

impl TranscodeJob {
    fn args(&self) -> Vec<String> {
        ["-y", "-i", self.input.as_path().as_str()]
            .into_iter()
            .chain(ENCODING_ARGS.iter().copied())
            .map(ToOwned::to_owned)
            .collect()
    }

    #[instrument(name = "convert", skip_all, fields(input = %self.input.as_path()))]
    async fn run(&self, ffmpeg: &dyn Ffmpeg) -> Result {
        info!("Converting to {}", display::bold(&self.output));

        let start = std::time::Instant::now();

        let output = ffmpeg
            .run_with_output_file(self.args(), &self.output)
            .await
            .map_err(|err| {
                error!("Conversion failed\n{err:?}");
                err
            })?;

        let size = display::human_size(output.len());
        let elapsed = display::elapsed(start);
        let out_file = nu_ansi_term::Color::Magenta.bold().paint(self.output.as_str());

        info!("🔥 Saved {out_file} ({size}) in {elapsed}");

        Ok(())
    }
}
