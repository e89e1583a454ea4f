//! Reads the menu out of the biggest `<table>` on the page.

use std::collections::BTreeMap;

use chrono::Weekday;
use scraper::ElementRef;

use super::{
    menu_table::{DayColumn, DayTable, MergePolicy, OmitReason, RowStatus},
    selectors::{cell_texts, own_rows},
    weekday::match_full_name,
    Error, Extraction, Extractor, MenuTable, RawDocument, RunReport,
};
use crate::{config::Config, static_selector};

/// A header row needs at least this many weekday names.
const MIN_HEADER_DAYS: usize = 3;

/// Column layout derived from the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLayout {
    /// Index of the header row within the table's own rows.
    pub row: usize,
    pub category_column: usize,
    /// `(column, day)` in header order, each day at most once.
    pub day_columns: Vec<(usize, Weekday)>,
}

impl HeaderLayout {
    fn from_cells(row: usize, cells: &[String], weekday_set: &[Weekday]) -> Self {
        let mut day_columns: Vec<(usize, Weekday)> = vec![];
        for (i, cell) in cells.iter().enumerate() {
            if let Some(day) = match_full_name(cell, weekday_set) {
                if day_columns.iter().all(|(_, d)| *d != day) {
                    day_columns.push((i, day));
                }
            }
        }
        // every column left of the first day is a non-day column
        let category_column = day_columns
            .first()
            .and_then(|(first, _)| first.checked_sub(1))
            .unwrap_or(0);
        Self {
            row,
            category_column,
            day_columns,
        }
    }
}

#[derive(Debug)]
pub struct TableExtractor {
    weekday_set: Vec<Weekday>,
    reserved: Vec<String>,
    merge: MergePolicy,
    boilerplate_prefixes: Vec<String>,
    boilerplate_terms: Vec<String>,
}

impl TableExtractor {
    pub fn new(config: &Config) -> Self {
        let lower =
            |xs: &[String]| -> Vec<String> { xs.iter().map(|x| x.to_lowercase()).collect() };
        Self {
            weekday_set: config.weekday_set.clone(),
            reserved: config.reserved_labels.clone(),
            // an empty cell is the only "no data" marker in a table
            merge: MergePolicy {
                separator: config.merge_separator.clone(),
                placeholder: String::new(),
            },
            boilerplate_prefixes: lower(&config.boilerplate_prefixes),
            boilerplate_terms: lower(&config.boilerplate_terms),
        }
    }

    /// The table with the most rows of its own; the first one wins a tie.
    pub fn largest_table<'a>(document: &'a RawDocument) -> Result<ElementRef<'a>, Error> {
        static_selector!(TABLE_SELECTOR <- "table");
        let mut best: Option<(usize, ElementRef<'a>)> = None;
        for table in document.html().select(&TABLE_SELECTOR) {
            let rows = own_rows(table).len();
            if best.as_ref().map_or(true, |(most, _)| rows > *most) {
                best = Some((rows, table));
            }
        }
        best.map(|(_, table)| table).ok_or(Error::NoTableFound)
    }

    /// First row naming at least three distinct weekdays, falling back to the
    /// first row. A spanned day cell counts once.
    pub fn detect_header(&self, rows: &[Vec<String>]) -> Option<HeaderLayout> {
        let found = rows
            .iter()
            .enumerate()
            .map(|(i, cells)| HeaderLayout::from_cells(i, cells, &self.weekday_set))
            .find(|layout| layout.day_columns.len() >= MIN_HEADER_DAYS);
        if found.is_none() {
            log::warn!("no row names {MIN_HEADER_DAYS} weekdays, using the first row as header");
        }
        found.or_else(|| {
            rows.first()
                .map(|cells| HeaderLayout::from_cells(0, cells, &self.weekday_set))
        })
    }

    /// Section words and weekday names are headings, never menu items.
    fn is_reserved(&self, text: &str) -> bool {
        self.reserved.iter().any(|x| x.eq_ignore_ascii_case(text))
            || match_full_name(text, &self.weekday_set).is_some()
    }

    fn is_boilerplate(&self, category: &str) -> bool {
        let lower = category.to_lowercase();
        lower.is_empty()
            || self.boilerplate_prefixes.iter().any(|x| lower.starts_with(x))
            || self.boilerplate_terms.iter().any(|x| lower.contains(x))
    }

    /// Aligns the data rows to the header. `rows` holds the cell texts of
    /// every row of the chosen table, header included.
    pub fn tabulate(&self, rows: &[Vec<String>]) -> Result<Extraction, Error> {
        let mut report = RunReport::new(self.name());
        let layout = self
            .detect_header(rows)
            .ok_or_else(|| Error::no_menu_parsed("the table has no rows"))?;
        if layout.day_columns.is_empty() {
            return Err(Error::no_menu_parsed("the header row names no weekdays"));
        }
        log::debug!(
            "header at row {}, category column {}, {} day columns",
            layout.row,
            layout.category_column,
            layout.day_columns.len()
        );

        let mut days: Vec<DayColumn> = layout
            .day_columns
            .iter()
            .map(|(_, day)| DayColumn {
                day: *day,
                values: BTreeMap::new(),
            })
            .collect();
        let mut dropped: Vec<&str> = vec![];
        let mut blank: Vec<&str> = vec![];

        for cells in &rows[layout.row + 1..] {
            let category = cells
                .get(layout.category_column)
                .map_or("", String::as_str);
            if self.is_boilerplate(category) {
                if !category.is_empty() && !dropped.contains(&category) {
                    dropped.push(category);
                }
                continue;
            }
            // a spanned section label or a repeated header row carries no dishes
            let texts: Vec<&str> = layout
                .day_columns
                .iter()
                .map(|(column, _)| cells.get(*column).map_or("", String::as_str))
                .map(|x| if self.is_reserved(x) { "" } else { x })
                .collect();
            if texts.iter().all(|x| x.is_empty()) {
                if !blank.contains(&category) {
                    blank.push(category);
                }
                continue;
            }
            for (text, day) in texts.into_iter().zip(days.iter_mut()) {
                match day.values.get_mut(category) {
                    Some(existing) => self.merge.merge_into(existing, text),
                    None => {
                        day.values.insert(category.to_string(), text.to_string());
                    }
                }
            }
        }

        let table = DayTable::new(days);
        for category in table.categories() {
            report.record(category, None, RowStatus::Extracted);
        }
        for category in dropped {
            report.record(category, None, RowStatus::Omitted(OmitReason::Boilerplate));
        }
        for category in blank {
            if !table.categories().iter().any(|x| x == category) {
                report.record(category, None, RowStatus::Omitted(OmitReason::NoValues));
            }
        }
        if table.categories().is_empty() {
            return Err(Error::no_menu_parsed("no category rows under the header"));
        }
        Ok(Extraction {
            table: MenuTable::ByDay(table),
            report,
        })
    }
}

impl Extractor for TableExtractor {
    fn name(&self) -> &'static str {
        "table"
    }

    fn extract(&self, document: &RawDocument) -> Result<Extraction, Error> {
        let table = Self::largest_table(document)?;
        let rows: Vec<Vec<String>> = own_rows(table).into_iter().map(cell_texts).collect();
        log::debug!("largest table has {} rows", rows.len());
        self.tabulate(&rows)
    }
}
