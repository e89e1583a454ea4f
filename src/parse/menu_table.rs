use std::collections::BTreeMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// One extracted value, keyed the same way for both extraction strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuCell<'a> {
    pub category: &'a str,
    pub subcategory: Option<&'a str>,
    pub day: Weekday,
    pub value: &'a str,
}

/// A category/subcategory row with one value per day of the block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRow {
    pub category: String,
    pub subcategory: String,
    pub values: Vec<String>,
}

/// Output of the text-block scan: rows are category x subcategory, columns
/// are `days` in their configured order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTable {
    days: Vec<Weekday>,
    rows: Vec<BlockRow>,
}

impl BlockTable {
    pub const fn new(days: Vec<Weekday>) -> Self {
        Self { days, rows: vec![] }
    }

    pub fn days(&self) -> &[Weekday] {
        &self.days
    }

    pub fn rows(&self) -> &[BlockRow] {
        &self.rows
    }

    /// Adds a row, merging it into an earlier row with the same
    /// category/subcategory instead of emitting a duplicate.
    pub fn push(&mut self, row: BlockRow, merge: &MergePolicy) {
        debug_assert_eq!(row.values.len(), self.days.len());
        if let Some(existing) = self
            .rows
            .iter_mut()
            .find(|x| x.category == row.category && x.subcategory == row.subcategory)
        {
            for (old, new) in existing.values.iter_mut().zip(&row.values) {
                merge.merge_into(old, new);
            }
        } else {
            self.rows.push(row);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayColumn {
    pub day: Weekday,
    pub values: BTreeMap<String, String>,
}

/// Output of the table scan: one entry per detected weekday column (in header
/// order), each mapping category to value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTable {
    categories: Vec<String>,
    days: Vec<DayColumn>,
}

impl DayTable {
    /// Every day gets a value for every category; gaps become empty strings.
    pub fn new(days: Vec<DayColumn>) -> Self {
        let mut categories: Vec<String> = days
            .iter()
            .flat_map(|x| x.values.keys().cloned())
            .collect();
        categories.sort();
        categories.dedup();
        let days = days
            .into_iter()
            .map(|mut column| {
                for category in &categories {
                    column.values.entry(category.clone()).or_default();
                }
                column
            })
            .collect();
        Self { categories, days }
    }

    /// Sorted and deduplicated.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn days(&self) -> &[DayColumn] {
        &self.days
    }

    pub fn value(&self, day: Weekday, category: &str) -> Option<&str> {
        self.days
            .iter()
            .find(|x| x.day == day)
            .and_then(|x| x.values.get(category))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum MenuTable {
    Blocks(BlockTable),
    ByDay(DayTable),
}

impl MenuTable {
    /// Flattens either layout into (category, subcategory, day) -> value.
    pub fn cells(&self) -> Vec<MenuCell<'_>> {
        match self {
            Self::Blocks(t) => t
                .rows
                .iter()
                .flat_map(|row| {
                    t.days
                        .iter()
                        .zip(&row.values)
                        .map(move |(day, value)| MenuCell {
                            category: &row.category,
                            subcategory: Some(&row.subcategory),
                            day: *day,
                            value,
                        })
                })
                .collect(),
            Self::ByDay(t) => t
                .days
                .iter()
                .flat_map(|column| {
                    column.values.iter().map(move |(category, value)| MenuCell {
                        category,
                        subcategory: None,
                        day: column.day,
                        value,
                    })
                })
                .collect(),
        }
    }
}

/// How two values for the same (category, subcategory, day) combine. Used by
/// both extractors so multi-part dishes come out the same way either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePolicy {
    pub separator: String,
    /// Values equal to this count as "no data" and never add a separator.
    pub placeholder: String,
}

impl MergePolicy {
    fn is_blank(&self, value: &str) -> bool {
        value.is_empty() || value == self.placeholder
    }

    pub fn merge_into(&self, existing: &mut String, incoming: &str) {
        if self.is_blank(incoming) {
            return;
        }
        if self.is_blank(existing) {
            incoming.clone_into(existing);
        } else {
            existing.push_str(&self.separator);
            existing.push_str(incoming);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OmitReason {
    /// The top-level category label never appears.
    CategoryMissing,
    /// The category is there but the subcategory label is not.
    LabelMissing,
    /// Positional slot whose predecessor did not produce a block.
    NoPrecedingBlock,
    /// Table category dropped as page boilerplate.
    Boilerplate,
    /// Table category whose every day cell was empty or a heading.
    NoValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum RowStatus {
    Extracted,
    Omitted(OmitReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowOutcome {
    pub category: String,
    pub subcategory: Option<String>,
    #[serde(flatten)]
    pub status: RowStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RunReport {
    pub strategy: String,
    pub outcomes: Vec<RowOutcome>,
}

impl RunReport {
    pub fn new(strategy: &str) -> Self {
        Self {
            strategy: strategy.to_string(),
            outcomes: vec![],
        }
    }

    pub fn record(&mut self, category: &str, subcategory: Option<&str>, status: RowStatus) {
        if let RowStatus::Omitted(reason) = status {
            log::debug!("omitting {category} / {subcategory:?}: {reason:?}");
        }
        self.outcomes.push(RowOutcome {
            category: category.to_string(),
            subcategory: subcategory.map(str::to_string),
            status,
        });
    }

    pub fn extracted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|x| x.status == RowStatus::Extracted)
            .count()
    }

    pub fn omitted(&self) -> impl Iterator<Item = &RowOutcome> {
        self.outcomes
            .iter()
            .filter(|x| x.status != RowStatus::Extracted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub table: MenuTable,
    pub report: RunReport,
}
