use derive_more::{AsRef, Deref, Display, Into};

/// Trimmed, non-empty label such as an exercise name or a training kind.
///
/// The length limit counts characters, not bytes, as most names are written in Cyrillic.
#[derive(AsRef, Deref, Debug, Display, Into, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(String);

impl Name {
    pub const MAX_LEN: usize = 100;

    pub fn new(name: &str) -> Result<Self, NameError> {
        let trimmed_name = name.trim();

        if trimmed_name.is_empty() {
            return Err(NameError::Empty);
        }

        let len = trimmed_name.chars().count();

        if len > Self::MAX_LEN {
            return Err(NameError::TooLong(len));
        }

        Ok(Name(trimmed_name.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must be 100 characters or fewer ({0} > 100)")]
    TooLong(usize),
}
