use crate::parse::{self, weekday::full_name, MenuTable};

/// A header plus rows of exactly the header's width, ready for the csv writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tabular {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Tabular {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, parse::Error> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != header.len())
        {
            return Err(parse::Error::Internal(format!(
                "row {i} has {} fields, header has {}",
                row.len(),
                header.len()
            )));
        }
        Ok(Self { header, rows })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

impl TryFrom<&MenuTable> for Tabular {
    type Error = parse::Error;

    /// Text blocks become `Category, Subcategory, <days>` rows in catalog order.
    /// Day columns become `Day, <categories>` rows in header order, with the
    /// categories already sorted.
    fn try_from(table: &MenuTable) -> Result<Self, Self::Error> {
        match table {
            MenuTable::Blocks(t) => {
                let header: Vec<String> = ["Category", "Subcategory"]
                    .into_iter()
                    .map(str::to_string)
                    .chain(t.days().iter().map(|x| full_name(*x).to_string()))
                    .collect();
                let rows: Vec<Vec<String>> = t
                    .rows()
                    .iter()
                    .map(|row| {
                        [row.category.clone(), row.subcategory.clone()]
                            .into_iter()
                            .chain(row.values.iter().cloned())
                            .collect()
                    })
                    .collect();
                Self::new(header, rows)
            }
            MenuTable::ByDay(t) => {
                let header: Vec<String> = std::iter::once("Day".to_string())
                    .chain(t.categories().iter().cloned())
                    .collect();
                let rows: Vec<Vec<String>> = t
                    .days()
                    .iter()
                    .map(|column| {
                        let day = column.day;
                        std::iter::once(full_name(day).to_string())
                            .chain(t.categories().iter().map(|c| {
                                t.value(day, c).unwrap_or_default().to_string()
                            }))
                            .collect()
                    })
                    .collect();
                Self::new(header, rows)
            }
        }
    }
}
