use std::{env, fs, path::{Path, PathBuf}, str::FromStr, time::Duration};

use chrono::Weekday;
use serde::Deserialize;
use url::Url;

use crate::{
    error::Error,
    output::WriteMode,
    parse::{
        weekday::{ALL_WEEKDAYS, SCHOOL_WEEK},
        Anchor, Slot,
    },
};

pub const SOURCE_URL: &str = "https://dpsiedge.edu.in/menu-of-the-week";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Text,
    Table,
    /// Table first, text scan when the page has no usable table.
    #[default]
    Auto,
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "table" => Ok(Self::Table),
            "auto" => Ok(Self::Auto),
            other => Err(Error::config_error(format!(
                "unknown strategy {other:?}, expected one of text, table, auto"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source_url: Url,
    pub output_path: PathBuf,
    /// Slots scanned by the text-block extractor, in order.
    pub category_catalog: Vec<Slot>,
    /// Day names recognized in table headers and treated as reserved in text.
    pub weekday_set: Vec<Weekday>,
    /// Days covered by each text block, in column order.
    pub block_days: Vec<Weekday>,
    pub start_marker: String,
    pub end_markers: Vec<String>,
    /// Section words that are never menu items (compared ignoring case).
    pub reserved_labels: Vec<String>,
    pub placeholder: String,
    pub merge_separator: String,
    /// Table categories starting with one of these (ignoring case) are dropped.
    pub boilerplate_prefixes: Vec<String>,
    /// Table categories containing one of these (ignoring case) are dropped.
    pub boilerplate_terms: Vec<String>,
    pub fetch_timeout_secs: u64,
    pub strategy: Strategy,
    pub write_mode: WriteMode,
}

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|x| (*x).to_string()).collect()
}

fn default_catalog() -> Vec<Slot> {
    let label = |category: &str, subcategory: &str, label: &str| {
        Slot::new(category, subcategory, Anchor::Label(label.to_string()))
    };
    let follows = |subcategory: &str| Slot::new("LUNCH", subcategory, Anchor::FollowsPrevious);
    vec![
        label("BREAKFAST", "Morning Drink", "Morning Drink"),
        label("BREAKFAST", "Fruit", "Fruit"),
        label("BREAKFAST", "Morning Snack", "Morning Snack"),
        label("LUNCH", "Main course - Dish 1", "Main course"),
        follows("Main course - Dish 2"),
        follows("Main course - Bread"),
        follows("Main course - Rice"),
        follows("Accompaniments"),
        follows("Accompaniments 2"),
        Slot::new("LUNCH", "Dessert", Anchor::Anywhere("dessert".to_string())),
        label("EVENING SNACK", "Snack", "Snack"),
        label("EVENING SNACK", "Evening Drink", "Evening Drink"),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: Url::parse(SOURCE_URL).expect("default source url should be valid"),
            output_path: PathBuf::from("menu.csv"),
            category_catalog: default_catalog(),
            weekday_set: ALL_WEEKDAYS.to_vec(),
            block_days: SCHOOL_WEEK.to_vec(),
            start_marker: "Menu from".to_string(),
            end_markers: strings(&["OUR SITEMAP", "CONTACT US", "Menu is subject", "Copyright"]),
            reserved_labels: strings(&[
                "LUNCH",
                "BREAKFAST",
                "EVENING SNACK",
                "DESSERT",
                "SNACK",
                "MENU",
            ]),
            placeholder: "nothing".to_string(),
            merge_separator: "; ".to_string(),
            boilerplate_prefixes: strings(&["menu from"]),
            boilerplate_terms: strings(&["allergen", "intolerance"]),
            fetch_timeout_secs: 15,
            strategy: Strategy::default(),
            write_mode: WriteMode::default(),
        }
    }
}

impl Config {
    /// Reads a JSON config file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> crate::Result<Self> {
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::config_error(format!("{}: {e}", path.display())))
    }

    /// `MENU_CONFIG` names a JSON file to start from, otherwise the defaults are used.
    pub fn load() -> crate::Result<Self> {
        let base = match env::var("MENU_CONFIG") {
            Ok(path) => Self::from_json_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Applies `MENU_URL`, `MENU_CSV`, `MENU_STRATEGY` and `MENU_APPEND` when set.
    pub fn with_env_overrides(mut self) -> crate::Result<Self> {
        for key in ["MENU_URL", "MENU_CSV", "MENU_STRATEGY", "MENU_APPEND"] {
            if let Ok(value) = env::var(key) {
                self.apply(key, &value)?;
            }
        }
        Ok(self)
    }

    fn apply(&mut self, key: &str, value: &str) -> crate::Result<()> {
        match key {
            "MENU_URL" => {
                self.source_url = Url::parse(value)
                    .map_err(|e| Error::config_error(format!("MENU_URL {value:?}: {e}")))?;
            }
            "MENU_CSV" => self.output_path = PathBuf::from(value),
            "MENU_STRATEGY" => self.strategy = value.parse()?,
            "MENU_APPEND" => {
                self.write_mode = match value.trim().to_ascii_lowercase().as_str() {
                    "1" | "true" | "yes" => WriteMode::Append,
                    "0" | "false" | "no" | "" => WriteMode::Overwrite,
                    other => {
                        return Err(Error::config_error(format!(
                            "MENU_APPEND should be a boolean, got {other:?}"
                        )))
                    }
                };
            }
            _ => log::warn!("ignoring unknown config key {key}"),
        }
        Ok(())
    }

    /// Checks the invariants the extractors rely on.
    pub fn validate(&self) -> crate::Result<()> {
        if self.block_days.is_empty() {
            return Err(Error::config_error("block_days must not be empty"));
        }
        if self.weekday_set.is_empty() {
            return Err(Error::config_error("weekday_set must not be empty"));
        }
        if self.start_marker.trim().is_empty() {
            return Err(Error::config_error("start_marker must not be empty"));
        }
        Ok(())
    }
}
