mod document;
mod error;
pub(crate) mod menu_table;
pub(crate) mod selectors;
mod table;
mod text;
mod text_block;
pub mod weekday;

pub use document::RawDocument;
pub use error::Error;
pub use menu_table::{Extraction, MenuTable, RunReport};
pub use table::TableExtractor;
pub use text_block::{Anchor, Slot, TextBlockExtractor};

use crate::config::{Config, Strategy};

/// Turns a fetched page into a [`MenuTable`].
pub trait Extractor {
    /// Short name used in logs and the run report.
    fn name(&self) -> &'static str;

    fn extract(&self, document: &RawDocument) -> Result<Extraction, Error>;
}

/// Tries the table layout first and falls back to the text scan when the
/// page has no usable table.
#[derive(Debug)]
pub struct AutoExtractor {
    table: TableExtractor,
    text: TextBlockExtractor,
}

impl AutoExtractor {
    pub fn new(config: &Config) -> Result<Self, Error> {
        Ok(Self {
            table: TableExtractor::new(config),
            text: TextBlockExtractor::new(config)?,
        })
    }
}

impl Extractor for AutoExtractor {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn extract(&self, document: &RawDocument) -> Result<Extraction, Error> {
        match self.table.extract(document) {
            Err(e) if e.is_structural() => {
                log::warn!("table extraction failed ({e}), falling back to text scan");
                self.text.extract(document)
            }
            other => other,
        }
    }
}

pub fn extractor_for(config: &Config) -> Result<Box<dyn Extractor>, Error> {
    Ok(match config.strategy {
        Strategy::Text => Box::new(TextBlockExtractor::new(config)?),
        Strategy::Table => Box::new(TableExtractor::new(config)),
        Strategy::Auto => Box::new(AutoExtractor::new(config)?),
    })
}
