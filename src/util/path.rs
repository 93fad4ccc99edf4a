use crate::prelude::*;
use easy_ext::ext;

#[ext(Utf8PathExt)]
pub(crate) impl Utf8Path {
    /// Checks the file extension ignoring the ASCII case, so that both
    /// `a.webm` and `a.WEBM` match `webm`.
    fn has_extension(&self, expected: &str) -> bool {
        self.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(expected))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Utf8StemmedPathBuf(Utf8PathBuf);

impl TryFrom<Utf8PathBuf> for Utf8StemmedPathBuf {
    type Error = anyhow::Error;

    fn try_from(value: Utf8PathBuf) -> Result<Self> {
        value
            .file_stem()
            .with_context(|| format!("Path has no file stem: {value:?}"))?;

        Ok(Self(value))
    }
}

impl Utf8StemmedPathBuf {
    pub(crate) fn file_stem(&self) -> &str {
        // The stem presence is validated in the constructor
        self.0.file_stem().unwrap_or_default()
    }

    pub(crate) fn as_path(&self) -> &Utf8Path {
        self.0.as_path()
    }
}
