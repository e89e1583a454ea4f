//! Fetch, extract, tabularize, write: one pass per run.
use crate::{
    config::Config,
    fetch,
    output::write_csv,
    parse::{extractor_for, Extraction, RawDocument, RunReport},
    tabular::Tabular,
};

/// Extracts the menu from already fetched markup without touching the network.
pub fn extract(config: &Config, markup: &str) -> crate::Result<Extraction> {
    let document = RawDocument::parse(markup);
    let extractor = extractor_for(config)?;
    log::debug!("extracting with the {} strategy", extractor.name());
    let extraction = extractor.extract(&document)?;
    let cells = extraction.table.cells();
    let filled = cells
        .iter()
        .filter(|x| !x.value.is_empty() && x.value != config.placeholder)
        .count();
    log::debug!("{filled} of {} menu cells have a value", cells.len());
    if filled == 0 {
        log::warn!("every extracted menu cell is blank, the page layout may have changed");
    }
    Ok(extraction)
}

/// Writes the extracted menu. Nothing is written unless extraction succeeded,
/// so a failed run leaves the previous file alone.
pub fn export(config: &Config, markup: &str) -> crate::Result<RunReport> {
    let Extraction { table, report } = extract(config, markup)?;
    let tabular = Tabular::try_from(&table)?;
    write_csv(&config.output_path, &tabular, config.write_mode)?;
    Ok(report)
}

pub async fn scrape_menu(config: &Config) -> crate::Result<RunReport> {
    config.validate()?;
    let client = fetch::make_client(config.fetch_timeout())?;
    log::info!("fetching {}", config.source_url);
    let markup = fetch::menu_page(&client, &config.source_url).await?;
    let report = export(config, &markup)?;
    if log::log_enabled!(log::Level::Debug) {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => log::debug!("run report: {json}"),
            Err(e) => log::warn!("could not serialize run report: {e}"),
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Strategy, error::Error, parse};
    use std::{fs, path::PathBuf};

    fn config(name: &str, strategy: Strategy) -> Config {
        let dir = std::env::temp_dir().join(format!("dpsi_menu_{}_{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        Config {
            output_path: dir.join("menu.csv"),
            strategy,
            ..Config::default()
        }
    }

    fn example(name: &str) -> String {
        fs::read_to_string(PathBuf::from("./src/parse/html_examples").join(name)).unwrap()
    }

    #[test]
    fn test_export_text_page() {
        let config = config("export_text", Strategy::Text);
        let report = export(&config, &example("week_menu_text.html")).unwrap();
        assert_eq!(report.extracted(), 12);
        let written = fs::read_to_string(&config.output_path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("Category,Subcategory,Monday,Tuesday,Wednesday,Thursday,Friday")
        );
        assert_eq!(
            lines.next(),
            Some("BREAKFAST,Morning Drink,Milk,Banana Shake,Milk,Rose Milk,Milk")
        );
        assert_eq!(written.lines().count(), 13);
    }

    #[test]
    fn test_export_table_page() {
        let config = config("export_table", Strategy::Auto);
        let report = export(&config, &example("week_menu_table.html")).unwrap();
        assert_eq!(report.strategy, "table");
        let written = fs::read_to_string(&config.output_path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("Day,Accompaniments,BREAKFAST,Dessert,EVENING SNACK,LUNCH,Morning Drink")
        );
        assert_eq!(
            lines.next(),
            Some("Monday,Pickle; Raita,Idli,Kheer,Samosa,Rajma Chawal,Milk")
        );
        assert_eq!(
            lines.nth(1),
            Some("Wednesday,Salad; Boondi Raita,,Gulab Jamun,Dhokla,Kadhi Chawal,Milk")
        );
    }

    #[test]
    fn test_failed_extraction_keeps_previous_file() {
        let config = config("keep_previous", Strategy::Text);
        fs::create_dir_all(config.output_path.parent().unwrap()).unwrap();
        fs::write(&config.output_path, "previous\n").unwrap();
        let err = export(&config, "<html><body>Closed</body></html>").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(parse::Error::SectionNotFound(_))
        ));
        assert_eq!(fs::read_to_string(&config.output_path).unwrap(), "previous\n");
    }
}
