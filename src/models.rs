use serde::{Deserialize, Serialize};

pub const EXCLUDED_CLASS: &str = "DEA";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub name: String,
    pub email: String,
    pub class_: String,
    pub profile_url: String,
    pub newbie_completed: u32,
    pub intro_completed: u32,
    pub regular_completed: u32,
    #[serde(default)]
    pub certificates: String,
}

impl StudentRecord {
    pub fn total_completed(&self) -> u64 {
        u64::from(self.newbie_completed)
            + u64::from(self.intro_completed)
            + u64::from(self.regular_completed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassAverage {
    pub class_: String,
    pub newbie_completed: f64,
    pub intro_completed: f64,
    pub regular_completed: f64,
    pub total_completed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Class,
    Total,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: Direction,
}

#[derive(Debug, Clone)]
pub struct AggregateOptions {
    pub excluded_class: String,
    pub precision: u32,
    pub sort: Option<SortOrder>,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            excluded_class: EXCLUDED_CLASS.to_string(),
            precision: 1,
            sort: None,
        }
    }
}
