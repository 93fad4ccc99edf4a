use crate::display;
use crate::prelude::*;
use crate::util::input;
use crate::util::path::Utf8StemmedPathBuf;
use futures::prelude::*;

/// Lists regular files of the directory in the order reported by the
/// filesystem. The order is not sorted and may differ between platforms.
pub(crate) async fn list_files(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let entries = fs::read_dir(dir).await?;

    read_dir_stream(entries)
        .try_filter_map(regular_file_path)
        .try_collect()
        .await
}

async fn regular_file_path(entry: fs::DirEntry) -> Result<Option<Utf8PathBuf>> {
    if !entry.file_type().await?.is_file() {
        return Ok(None);
    }

    let path = entry.path();
    let path = Utf8PathBuf::try_from(path.clone())
        .with_context(|| format!("File name is not UTF-8: {path:?}"))?;

    Ok(Some(path))
}

fn read_dir_stream(dir: fs::ReadDir) -> impl futures::Stream<Item = Result<fs::DirEntry>> {
    stream::unfold(dir, |mut dir| async move {
        dir.next_entry()
            .await
            .map_err(anyhow::Error::from)
            .transpose()
            .map(|entry| (entry, dir))
    })
}

/// Creates the directory with all its parents if it doesn't exist yet.
pub(crate) async fn ensure_dir(dir: &Utf8Path) -> Result {
    let exists = dir
        .try_exists()
        .with_context(|| format!("Failed to check if the directory exists: `{dir}`"))?;

    if exists {
        return Ok(());
    }

    fs::create_dir_all(dir).await?;

    info!("Created {} folder", display::bold(&dir));

    Ok(())
}

pub(crate) async fn validate_output_files_overwriting(
    overwrite: bool,
    paths: impl IntoIterator<Item = Utf8PathBuf>,
) -> Result {
    let existing_files = paths
        .into_iter()
        .filter_map(|path| {
            path.try_exists()
                .with_context(|| format!("Failed to check if the output file exists: `{path}`"))
                .map(|exists| exists.then_some(path))
                .transpose()
        })
        .collect::<Result<Vec<_>>>()?;

    if existing_files.is_empty() {
        return Ok(());
    }

    let files = existing_files.iter().format_with("\n", |path, f| {
        f(&format_args!("- {}", display::bold(&path)))
    });

    let message = format!("The following output files already exist.\n{files}\nOverwrite them?");

    input::read_confirmation(&message, overwrite).await?;

    Ok(())
}

/// Several inputs with the same stem (e.g. `a.gif` and `a.GIF`) would be
/// written to the same output file.
pub(crate) fn validate_duplicate_input_names<'a>(
    inputs: impl IntoIterator<Item = &'a Utf8StemmedPathBuf>,
) -> Result {
    let mut duplicates = inputs
        .into_iter()
        .into_group_map_by(|path| path.file_stem())
        .into_iter()
        .filter(|(_, paths)| paths.len() >= 2)
        // Sort to make the test snapshots stable
        .sorted_by_key(|(stem, _)| *stem)
        .peekable();

    if duplicates.peek().is_none() {
        return Ok(());
    }

    let inputs = duplicates.format_with("\n", |(stem, contexts), f| {
        let paths = contexts.iter().map(|path| path.as_path()).format(", ");
        let len = contexts.len();
        f(&format_args!("- {stem} ({len} files): [{paths}]"))
    });

    bail!("The following input files have the same name, but they must be unique.\n{inputs}");
}
