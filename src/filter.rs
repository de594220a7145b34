use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::models::Expense;

/// Date range and keyword applied to a report. Bounds are inclusive calendar
/// days.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
}

impl ReportFilter {
    pub fn new(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>, search: Option<String>) -> Self {
        Self {
            start_date,
            end_date,
            search,
        }
    }

    /// Lowercased search term, or None when blank.
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn is_active(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some() || self.needle().is_some()
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        self.matches_dates(expense) && self.matches_search(expense)
    }

    fn matches_dates(&self, expense: &Expense) -> bool {
        if self.start_date.is_none() && self.end_date.is_none() {
            return true;
        }
        let Some(day) = expense.parsed_date().map(|d| d.date()) else {
            return false;
        };
        self.start_date.map_or(true, |start| day >= start) && self.end_date.map_or(true, |end| day <= end)
    }

    fn matches_search(&self, expense: &Expense) -> bool {
        match self.needle() {
            None => true,
            Some(needle) => expense.label().to_lowercase().contains(&needle),
        }
    }

    pub fn apply(&self, expenses: &[Expense]) -> Vec<Expense> {
        expenses.iter().filter(|e| self.matches(e)).cloned().collect()
    }

    /// Filter as sent to the insights endpoint; unset fields are empty strings.
    pub fn to_payload(&self) -> Value {
        let day = |d: Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        json!({
            "startDate": day(self.start_date),
            "endDate": day(self.end_date),
            "search": self.search.clone().unwrap_or_default(),
        })
    }

    /// Human-readable description for report headers.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(d) = self.start_date {
            parts.push(format!("from {}", d.format("%Y-%m-%d")));
        }
        if let Some(d) = self.end_date {
            parts.push(format!("to {}", d.format("%Y-%m-%d")));
        }
        if let Some(s) = self.needle() {
            parts.push(format!("matching \"{s}\""));
        }
        if parts.is_empty() {
            "all expenses".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// clap value parser for `YYYY-MM-DD` arguments.
pub fn parse_day(raw: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| format!("invalid date '{raw}', expected YYYY-MM-DD"))
}
