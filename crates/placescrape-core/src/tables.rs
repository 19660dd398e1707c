//! Tabular view of a [`StoreOutputUnit`] as handed to output sinks.

use serde::Serialize;

use crate::records::{RevisitValue, StoreOutputUnit};

pub const INFO_TABLE: &str = "info";
pub const MENU_TABLE: &str = "menu";
pub const REVIEW_TABLE: &str = "review";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(u32),
    Text(String),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<&RevisitValue> for Cell {
    fn from(value: &RevisitValue) -> Self {
        match value {
            RevisitValue::Count(n) => Self::Integer(*n),
            RevisitValue::Raw(raw) => Self::Text(raw.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    #[serde(skip)]
    pub name: &'static str,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

impl StoreOutputUnit {
    /// The `info`, `menu`, and `review` tables, in that order.
    #[must_use]
    pub fn tables(&self) -> Vec<Table> {
        let info = Table {
            name: INFO_TABLE,
            columns: vec!["field", "value"],
            rows: self
                .profile
                .iter()
                .map(|(field, value)| vec![Cell::from(field), Cell::from(value)])
                .collect(),
        };

        let menu = Table {
            name: MENU_TABLE,
            columns: vec!["name", "price", "description", "recommendation"],
            rows: self
                .menu
                .iter()
                .map(|m| {
                    vec![
                        Cell::from(m.name.as_str()),
                        Cell::from(m.price.as_str()),
                        Cell::from(m.description.as_str()),
                        Cell::from(m.recommendation.as_str()),
                    ]
                })
                .collect(),
        };

        let review = Table {
            name: REVIEW_TABLE,
            columns: vec!["content", "date", "revisit"],
            rows: self
                .reviews
                .iter()
                .map(|r| {
                    vec![
                        Cell::from(r.content.as_str()),
                        Cell::from(r.date.as_str()),
                        Cell::from(&r.revisit),
                    ]
                })
                .collect(),
        };

        vec![info, menu, review]
    }
}
