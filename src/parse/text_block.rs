//! Scans the flattened page text for fixed-width weekday blocks.
//!
//! The page lays every subcategory out as a label line followed by one line
//! per weekday. Some lunch rows have no label at all and are only found by
//! position, right after the previous block. Each row is described by a
//! [`Slot`] so a broken row shows up in the [`RunReport`] instead of silently
//! shifting every row after it.

use chrono::Weekday;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{
    menu_table::{BlockRow, BlockTable, MergePolicy, OmitReason, RowStatus},
    text::marker_regex,
    weekday::match_full_name,
    Error, Extraction, Extractor, MenuTable, RawDocument, RunReport,
};
use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Line equal to this label, searched forward from the category line.
    Label(String),
    /// No label: starts after the previous slot's block, past any filler lines.
    FollowsPrevious,
    /// First line anywhere in the section equal to this text, ignoring case.
    Anywhere(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub category: String,
    pub subcategory: String,
    pub anchor: Anchor,
}

impl Slot {
    pub fn new(category: &str, subcategory: &str, anchor: Anchor) -> Self {
        Self {
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            anchor,
        }
    }
}

#[derive(Debug)]
pub struct TextBlockExtractor {
    catalog: Vec<Slot>,
    days: Vec<Weekday>,
    weekday_set: Vec<Weekday>,
    reserved: Vec<String>,
    merge: MergePolicy,
    start_marker: String,
    start: Regex,
    end: Option<Regex>,
}

impl TextBlockExtractor {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let start = marker_regex(std::slice::from_ref(&config.start_marker))?
            .ok_or_else(|| Error::internal_error("start marker should not be empty"))?;
        Ok(Self {
            catalog: config.category_catalog.clone(),
            days: config.block_days.clone(),
            weekday_set: config.weekday_set.clone(),
            reserved: config.reserved_labels.clone(),
            merge: MergePolicy {
                separator: config.merge_separator.clone(),
                placeholder: config.placeholder.clone(),
            },
            start_marker: config.start_marker.clone(),
            start,
            end: marker_regex(&config.end_markers)?,
        })
    }

    /// The part of `text` from the start marker up to the first end marker
    /// after it, or to the end of the text when no end marker follows.
    pub fn isolate_section<'t>(&self, text: &'t str) -> Result<&'t str, Error> {
        let start = self
            .start
            .find(text)
            .ok_or_else(|| Error::section_not_found(&self.start_marker))?;
        let rest = &text[start.start()..];
        let end = self
            .end
            .as_ref()
            .and_then(|re| re.find_at(rest, start.len()))
            .map_or(rest.len(), |m| m.start());
        Ok(&rest[..end])
    }

    /// Section words and weekday names are headings, never menu items.
    fn is_reserved(&self, line: &str) -> bool {
        line.is_empty()
            || self.reserved.iter().any(|x| x.eq_ignore_ascii_case(line))
            || match_full_name(line, &self.weekday_set).is_some()
    }

    /// Exactly one value per day starting at `start`. Reserved words and lines
    /// past the end of the section become the placeholder.
    fn week_block(&self, lines: &[&str], start: usize) -> Vec<String> {
        (0..self.days.len())
            .map(|offset| match lines.get(start + offset).map(|x| x.trim()) {
                Some(value) if !self.is_reserved(value) => value.to_string(),
                _ => self.merge.placeholder.clone(),
            })
            .collect()
    }

    /// Where the block for `slot` begins, or why it can't be found.
    /// `previous` is the start of the previous slot's block, if it had one.
    fn locate(
        &self,
        lines: &[&str],
        slot: &Slot,
        previous: Option<usize>,
    ) -> Result<usize, OmitReason> {
        let category = lines
            .iter()
            .position(|x| *x == slot.category.as_str())
            .ok_or(OmitReason::CategoryMissing)?;
        match &slot.anchor {
            Anchor::Label(label) => lines[category..]
                .iter()
                .position(|x| *x == label.as_str())
                .map(|i| category + i + 1)
                .ok_or(OmitReason::LabelMissing),
            Anchor::FollowsPrevious => {
                let mut cursor = previous.ok_or(OmitReason::NoPrecedingBlock)? + self.days.len();
                while cursor < lines.len() && self.is_reserved(lines[cursor]) {
                    cursor += 1;
                }
                Ok(cursor)
            }
            Anchor::Anywhere(label) => lines
                .iter()
                .position(|x| x.eq_ignore_ascii_case(label))
                .map(|i| i + 1)
                .ok_or(OmitReason::LabelMissing),
        }
    }

    /// Runs every slot over already isolated, trimmed, non-empty lines.
    pub fn scan(&self, lines: &[&str]) -> Result<Extraction, Error> {
        let mut table = BlockTable::new(self.days.clone());
        let mut report = RunReport::new(self.name());
        let mut previous = None;
        for slot in &self.catalog {
            let subcategory = Some(slot.subcategory.as_str());
            match self.locate(lines, slot, previous) {
                Ok(start) => {
                    log::trace!(
                        "{} / {} starts at line {start}",
                        slot.category,
                        slot.subcategory
                    );
                    table.push(
                        BlockRow {
                            category: slot.category.clone(),
                            subcategory: slot.subcategory.clone(),
                            values: self.week_block(lines, start),
                        },
                        &self.merge,
                    );
                    report.record(&slot.category, subcategory, RowStatus::Extracted);
                    previous = Some(start);
                }
                Err(reason) => {
                    report.record(&slot.category, subcategory, RowStatus::Omitted(reason));
                    previous = None;
                }
            }
        }
        if table.rows().is_empty() {
            return Err(Error::no_menu_parsed(&format!(
                "none of the {} catalog slots matched",
                self.catalog.len()
            )));
        }
        Ok(Extraction {
            table: MenuTable::Blocks(table),
            report,
        })
    }
}

impl Extractor for TextBlockExtractor {
    fn name(&self) -> &'static str {
        "text"
    }

    fn extract(&self, document: &RawDocument) -> Result<Extraction, Error> {
        let text = document.text();
        let section = self.isolate_section(&text)?;
        let lines: Vec<&str> = section
            .lines()
            .map(str::trim)
            .filter(|x| !x.is_empty())
            .collect();
        log::debug!("menu section has {} non-empty lines", lines.len());
        self.scan(&lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn extractor() -> TextBlockExtractor {
        TextBlockExtractor::new(&Config::default()).unwrap()
    }

    fn extractor_with(catalog: Vec<Slot>) -> TextBlockExtractor {
        let config = Config {
            category_catalog: catalog,
            ..Config::default()
        };
        TextBlockExtractor::new(&config).unwrap()
    }

    fn blocks(extraction: &Extraction) -> &BlockTable {
        match &extraction.table {
            MenuTable::Blocks(t) => t,
            MenuTable::ByDay(_) => panic!("text scan should produce blocks"),
        }
    }

    #[test]
    fn test_label_blocks_have_no_off_by_one() {
        let lines = [
            "BREAKFAST",
            "Morning Drink",
            "Tea",
            "Milk",
            "Tea",
            "Milk",
            "Tea",
            "Fruit",
            "Apple",
            "Banana",
            "Apple",
            "Banana",
            "Apple",
        ];
        let extraction = extractor().scan(&lines).unwrap();
        let rows = blocks(&extraction).rows();
        assert_eq!(rows[0].subcategory, "Morning Drink");
        assert_eq!(rows[0].values, vec!["Tea", "Milk", "Tea", "Milk", "Tea"]);
        assert_eq!(rows[1].subcategory, "Fruit");
        assert_eq!(
            rows[1].values,
            vec!["Apple", "Banana", "Apple", "Banana", "Apple"]
        );
        // the rest of the catalog is reported, not fatal
        assert_eq!(extraction.report.extracted(), 2);
        let lunch = extraction
            .report
            .outcomes
            .iter()
            .find(|x| x.subcategory.as_deref() == Some("Main course - Dish 1"))
            .unwrap();
        assert_eq!(lunch.status, RowStatus::Omitted(OmitReason::CategoryMissing));
    }

    #[test]
    fn test_short_and_reserved_blocks_are_padded() {
        let lines = ["BREAKFAST", "Morning Snack", "Poha", "LUNCH", "monday"];
        let extraction = extractor().scan(&lines).unwrap();
        let rows = blocks(&extraction).rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].values,
            vec!["Poha", "nothing", "nothing", "nothing", "nothing"]
        );
        for row in rows {
            assert_eq!(row.values.len(), 5);
        }
    }

    #[test]
    fn test_positional_slots_skip_filler() {
        let lines = [
            "LUNCH",
            "Main course",
            "Rajma",
            "Chole",
            "Kadhi",
            "Dal",
            "Sambar",
            "LUNCH",
            "Menu",
            "Aloo Gobi",
            "Bhindi",
            "Paneer",
            "Mix Veg",
            "Lauki",
            "Roti",
            "Roti",
            "Puri",
            "Roti",
            "Naan",
        ];
        let catalog = vec![
            Slot::new("LUNCH", "Dish 1", Anchor::Label("Main course".into())),
            Slot::new("LUNCH", "Dish 2", Anchor::FollowsPrevious),
            Slot::new("LUNCH", "Bread", Anchor::FollowsPrevious),
            Slot::new("LUNCH", "Rice", Anchor::FollowsPrevious),
        ];
        let extraction = extractor_with(catalog).scan(&lines).unwrap();
        let rows = blocks(&extraction).rows();
        assert_eq!(rows[0].values, vec!["Rajma", "Chole", "Kadhi", "Dal", "Sambar"]);
        assert_eq!(
            rows[1].values,
            vec!["Aloo Gobi", "Bhindi", "Paneer", "Mix Veg", "Lauki"]
        );
        assert_eq!(rows[2].values, vec!["Roti", "Roti", "Puri", "Roti", "Naan"]);
        // ran off the end: still a full row of placeholders
        assert_eq!(rows[3].values, vec!["nothing"; 5]);
    }

    #[test]
    fn test_positional_slot_after_omitted_slot() {
        let lines = ["LUNCH", "Rajma", "Chole", "Kadhi", "Dal", "Sambar"];
        let catalog = vec![
            Slot::new("LUNCH", "Dish 1", Anchor::Label("Main course".into())),
            Slot::new("LUNCH", "Dish 2", Anchor::FollowsPrevious),
            Slot::new("LUNCH", "Dessert", Anchor::Anywhere("dessert".into())),
        ];
        let err = extractor_with(catalog).scan(&lines).unwrap_err();
        assert!(matches!(err, Error::NoMenuParsed(_)));
    }

    #[test]
    fn test_report_reasons() {
        let lines = ["LUNCH", "Main course", "A", "B", "C", "D", "E", "Dessert", "Kheer"];
        let catalog = vec![
            Slot::new("LUNCH", "Dish 1", Anchor::Label("Main course".into())),
            Slot::new("LUNCH", "Side", Anchor::Label("Salad".into())),
            Slot::new("LUNCH", "Dish 2", Anchor::FollowsPrevious),
            Slot::new("LUNCH", "Dessert", Anchor::Anywhere("dessert".into())),
            Slot::new("EVENING SNACK", "Snack", Anchor::Label("Snack".into())),
        ];
        let extraction = extractor_with(catalog).scan(&lines).unwrap();
        let statuses: Vec<RowStatus> = extraction
            .report
            .outcomes
            .iter()
            .map(|x| x.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                RowStatus::Extracted,
                RowStatus::Omitted(OmitReason::LabelMissing),
                RowStatus::Omitted(OmitReason::NoPrecedingBlock),
                RowStatus::Extracted,
                RowStatus::Omitted(OmitReason::CategoryMissing),
            ]
        );
        let rows = blocks(&extraction).rows();
        assert_eq!(rows[1].values[0], "Kheer");
    }

    #[test]
    fn test_duplicate_slots_merge() {
        let lines = [
            "LUNCH", "Pickle", "Raita", "Raita", "Pickle", "Papad", "Chutney", "nothing",
        ];
        let catalog = vec![
            Slot::new("LUNCH", "Accompaniments", Anchor::Label("LUNCH".into())),
            Slot::new("LUNCH", "Accompaniments", Anchor::Label("Pickle".into())),
        ];
        let extraction = extractor_with(catalog).scan(&lines).unwrap();
        let rows = blocks(&extraction).rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].values,
            vec![
                "Pickle; Raita",
                "Raita; Raita",
                "Raita; Pickle",
                "Pickle; Papad",
                "Papad; Chutney"
            ]
        );
    }

    #[test]
    fn test_missing_start_marker() {
        let doc = RawDocument::parse("<body><p>BREAKFAST</p><p>Morning Drink</p></body>");
        let err = extractor().extract(&doc).unwrap_err();
        assert_eq!(err, Error::SectionNotFound("Menu from".into()));
    }

    #[test]
    fn test_isolate_section() {
        let ex = extractor();
        let text = "Home\nMENU FROM 1st July\nBREAKFAST\nContact Us\nphone";
        assert_eq!(ex.isolate_section(text).unwrap(), "MENU FROM 1st July\nBREAKFAST\n");
        // end marker before the start doesn't count
        let text = "Copyright\nMenu from\nLUNCH";
        assert_eq!(ex.isolate_section(text).unwrap(), "Menu from\nLUNCH");
    }

    #[test]
    fn test_extract_from_page() {
        let html = fs::read_to_string("./src/parse/html_examples/week_menu_text.html").unwrap();
        let doc = RawDocument::parse(&html);
        let extraction = extractor().extract(&doc).expect("The example html should be valid");
        let rows = blocks(&extraction).rows();
        let find = |sub: &str| rows.iter().find(|x| x.subcategory == sub).unwrap();

        assert_eq!(rows.len(), 12);
        assert_eq!(
            find("Morning Drink").values,
            vec!["Milk", "Banana Shake", "Milk", "Rose Milk", "Milk"]
        );
        assert_eq!(
            find("Main course - Dish 2").values,
            vec!["Aloo Gobi", "Mix Veg", "Bhindi Masala", "Kadai Paneer", "Lauki Chana"]
        );
        assert_eq!(
            find("Main course - Bread").values,
            vec!["Tawa Roti", "Tawa Roti", "Puri", "Tawa Roti", "Butter Naan"]
        );
        assert_eq!(
            find("Accompaniments 2").values,
            vec!["Papad", "Salad", "Papad", "Salad", "nothing"]
        );
        assert_eq!(
            find("Dessert").values,
            vec!["Kheer", "Fruit Custard", "Gulab Jamun", "Halwa", "Ice Cream"]
        );
        assert_eq!(
            find("Evening Drink").values,
            vec!["Lemonade", "Buttermilk", "Tea", "Jaljeera", "Milk"]
        );
        // the footer after "Menu is subject to change" never leaks in
        assert!(rows
            .iter()
            .flat_map(|x| &x.values)
            .all(|x| !x.contains("Sitemap")));
        for row in rows {
            assert_eq!(row.values.len(), 5);
        }
    }
}
