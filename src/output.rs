use std::{
    fs::{self, File, OpenOptions},
    path::Path,
};

use serde::Deserialize;

use crate::tabular::Tabular;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Replace the file, header line included.
    #[default]
    Overwrite,
    /// Add rows to the end. The header is only written if the file is new or empty.
    Append,
}

pub fn write_csv(path: &Path, table: &Tabular, mode: WriteMode) -> crate::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let (file, with_header) = match mode {
        WriteMode::Overwrite => (File::create(path)?, true),
        WriteMode::Append => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let empty = file.metadata()?.len() == 0;
            (file, empty)
        }
    };

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    if with_header {
        writer.write_record(table.header())?;
    }
    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    log::info!(
        "wrote {} rows to {} ({mode:?})",
        table.rows().len(),
        path.display()
    );
    Ok(())
}
