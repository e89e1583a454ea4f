use std::sync::OnceLock;

use scraper::{ElementRef, Selector};

use super::text::collapse_whitespace;

/// A selector compiled on first use, so it can live in a `static`.
#[derive(Debug)]
pub struct StaticSelector<'a> {
    cell: OnceLock<Selector>,
    selector: &'a str,
}

impl<'a> StaticSelector<'a> {
    pub const fn new(selector: &'a str) -> Self {
        Self {
            cell: OnceLock::new(),
            selector,
        }
    }
}

impl core::ops::Deref for StaticSelector<'_> {
    type Target = Selector;

    fn deref(&self) -> &Self::Target {
        self.cell
            .get_or_init(|| match Selector::parse(self.selector) {
                Ok(sel) => sel,
                Err(e) => panic!("Error parsing static selector {}: {:?}", self.selector, e),
            })
    }
}

#[macro_export]
macro_rules! static_selector {
    ($x: ident <- $sel: literal) => {
        static $x: $crate::parse::selectors::StaticSelector =
            $crate::parse::selectors::StaticSelector::new($sel);
    };
}

/// Upper bound for `colspan`, anything wider than a fortnight is markup noise.
const MAX_COLSPAN: usize = 14;

/// Rows that belong to `table` itself, skipping the rows of nested tables.
pub fn own_rows<'a>(table: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    static_selector!(ROW_SELECTOR <- "tr");
    table
        .select(&ROW_SELECTOR)
        .filter(|row| {
            row.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|x| x.value().name() == "table")
                .is_some_and(|x| x.id() == table.id())
        })
        .collect()
}

/// Text of each `td`/`th` directly under `row`. A cell with `colspan="n"`
/// is repeated `n` times so that later cells keep their column index.
pub fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    let mut out = vec![];
    for cell in row.children().filter_map(ElementRef::wrap) {
        if !matches!(cell.value().name(), "td" | "th") {
            continue;
        }
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|x| x.trim().parse::<usize>().ok())
            .filter(|x| *x > 0)
            .map_or(1, |x| x.min(MAX_COLSPAN));
        let text = element_text(cell);
        out.extend(std::iter::repeat(text).take(span));
    }
    out
}

/// All descendant text, space separated so `Idli<br>Sambar` doesn't run together.
pub fn element_text(element: ElementRef<'_>) -> String {
    let joined = element.text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&joined).into_owned()
}
