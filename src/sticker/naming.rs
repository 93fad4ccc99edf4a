use itertools::Itertools;
use std::fmt;

/// Telegram limits sticker set names to this many characters
pub(crate) const MAX_NAME_LEN: usize = 64;

/// Telegram requires sticker set names created by a bot to end with this
/// suffix followed by the bot's username.
const OWNER_SEPARATOR: &str = "_by_";

/// A sticker set name that satisfies Telegram's rules: 1-64 characters,
/// starts with a letter, contains only ASCII alphanumerics and underscores,
/// and never has two underscores in a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CollectionName(String);

impl CollectionName {
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    /// Link that opens the sticker set in any Telegram client
    pub(crate) fn share_url(&self) -> String {
        format!("https://t.me/addstickers/{}", self.0)
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ValidationError {
    #[error(
        "Sticker set name must contain at least one of the following characters: \
        latin letters, digits or underscores"
    )]
    EmptyName,

    #[error("Sticker set name must begin with a letter, but it begins with `{first}`")]
    MustStartWithLetter { first: char },

    #[error(
        "Sticker set name `{name}` is {len} characters long, but at most 64 \
        are allowed. Please use a shorter name"
    )]
    NameTooLong { name: String, len: usize },
}

/// Builds the sticker set name from free-form user input and the bot's
/// username. Unsupported characters are dropped rather than rejected,
/// so `My Cool! Set` becomes `MyCoolSet_by_<owner>`.
pub(crate) fn resolve(raw_input: &str, owner_handle: &str) -> Result<CollectionName, ValidationError> {
    let slug = raw_input
        .chars()
        .filter(|char| char.is_ascii_alphanumeric() || *char == '_')
        .dedup_by(|prev, next| *prev == '_' && *next == '_')
        .collect::<String>();

    let first = slug.chars().next().ok_or(ValidationError::EmptyName)?;

    if !first.is_ascii_alphabetic() {
        return Err(ValidationError::MustStartWithLetter { first });
    }

    // A trailing underscore would form `__` with the owner separator
    let slug = slug.trim_end_matches('_');
    let owner_handle = owner_handle.trim_start_matches('@');

    let name = format!("{slug}{OWNER_SEPARATOR}{owner_handle}");

    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong { name, len });
    }

    Ok(CollectionName(name))
}
