use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The start marker of the menu section is not in the page text.
    SectionNotFound(String),
    /// The page has no `<table>` elements at all.
    NoTableFound,
    /// A section or table was found but not a single row came out of it.
    NoMenuParsed(String),
    Internal(String),
}

impl Error {
    pub fn section_not_found(marker: &str) -> Self {
        Self::SectionNotFound(marker.to_string())
    }

    pub fn no_menu_parsed(msg: &str) -> Self {
        Self::NoMenuParsed(msg.to_string())
    }

    pub fn internal_error(msg: &str) -> Self {
        Self::Internal(msg.to_string())
    }

    /// Structural failures are the ones a different extraction strategy might get past.
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::SectionNotFound(_) | Self::NoTableFound | Self::NoMenuParsed(_)
        )
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SectionNotFound(marker) => {
                write!(f, "Menu section not found in page text (no {marker:?} marker)")
            }
            Self::NoTableFound => write!(f, "No table elements found in page"),
            Self::NoMenuParsed(msg) => write!(
                f,
                "No menu rows parsed: {msg}. The page format may have changed."
            ),
            Self::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
