use crate::PROMOTE_OPTION;

// Punctuation allowed in a column name. Backslash and quotes are reserved.
const COLUMN_PUNCTUATION: &str = "!#$%&()*+-./:;<=>?@[]^_{|}~ ";

/// Split a tag into its column name and the options that follow the first comma.
#[must_use]
pub fn parse_tag(tag: &str) -> (&str, TagOptions<'_>) {
    match tag.split_once(',') {
        Some((name, options)) => (name, TagOptions(options)),
        None => (tag, TagOptions("")),
    }
}

/// Column names are non-empty and made of letters, digits, and a
/// restricted punctuation set.
#[must_use]
pub fn is_valid_column(column: &str) -> bool {
    !column.is_empty()
        && column
            .chars()
            .all(|c| c.is_alphanumeric() || COLUMN_PUNCTUATION.contains(c))
}

///
/// TagOptions
///
/// Comma-separated options of a tag, without the leading comma.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TagOptions<'a>(&'a str);

impl TagOptions<'_> {
    /// Whether `option` appears as a whole comma-delimited entry.
    #[must_use]
    pub fn contains(&self, option: &str) -> bool {
        !self.0.is_empty() && self.0.split(',').any(|name| name == option)
    }

    #[must_use]
    pub fn promote(&self) -> bool {
        self.contains(PROMOTE_OPTION)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
