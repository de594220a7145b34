use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::coerce::finite_sum;
use crate::models::Expense;

pub const RECENT_LIMIT: usize = 5;
pub const SERIES_LIMIT: usize = 6;
pub const FALLBACK_CATEGORY: &str = "Other";

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: f64,
    pub average: f64,
    pub highest: Option<Expense>,
    pub count: usize,
}

/// Total, average and the single most expensive record. The first record wins
/// a tie for highest.
pub fn summarize(expenses: &[Expense]) -> Summary {
    let mut total = 0.0f64;
    let mut highest: Option<(&Expense, f64)> = None;

    for expense in expenses {
        let amount = expense.amount();
        total = finite_sum(total, amount);
        match highest {
            Some((_, best)) if amount <= best => {}
            _ => highest = Some((expense, amount)),
        }
    }

    let count = expenses.len();
    Summary {
        total,
        average: if count == 0 { 0.0 } else { total / count as f64 },
        highest: highest.map(|(e, _)| e.clone()),
        count,
    }
}

// ---------------------------------------------------------------------------
// Recent
// ---------------------------------------------------------------------------

/// The most recently dated records, newest first. Undated records sort last.
pub fn recent(expenses: &[Expense]) -> Vec<Expense> {
    let mut sorted = expenses.to_vec();
    sorted.sort_by_cached_key(|e| Reverse(e.parsed_date()));
    sorted.truncate(RECENT_LIMIT);
    sorted
}

// ---------------------------------------------------------------------------
// Monthly series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MonthTotal {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub total: f64,
}

/// Per-month totals for the last `SERIES_LIMIT` months that have data,
/// oldest first.
pub fn monthly_series(expenses: &[Expense]) -> Vec<MonthTotal> {
    use chrono::Datelike;

    let mut totals: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for expense in expenses {
        if let Some(date) = expense.parsed_date() {
            let slot = totals.entry((date.year(), date.month())).or_insert(0.0);
            *slot = finite_sum(*slot, expense.amount());
        }
    }

    let skip = totals.len().saturating_sub(SERIES_LIMIT);
    totals
        .into_iter()
        .skip(skip)
        .map(|((year, month), total)| MonthTotal {
            year,
            month,
            label: month_label(year, month),
            total,
        })
        .collect()
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{year}-{month:02}"))
}

/// Largest monthly total, or 1 when there is nothing to scale against.
pub fn chart_max(series: &[MonthTotal]) -> f64 {
    let max = series.iter().fold(0.0f64, |max, m| max.max(m.total));
    if max > 0.0 {
        max
    } else {
        1.0
    }
}

// ---------------------------------------------------------------------------
// Category series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub label: String,
    pub total: f64,
}

/// Totals per item label, largest first, capped at `SERIES_LIMIT`. Equal
/// totals keep first-seen order.
pub fn category_series(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut order: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for expense in expenses {
        let label = match expense.label() {
            "" => FALLBACK_CATEGORY,
            l => l,
        };
        let slot = *index.entry(label.to_string()).or_insert_with(|| {
            order.push(CategoryTotal {
                label: label.to_string(),
                total: 0.0,
            });
            order.len() - 1
        });
        order[slot].total = finite_sum(order[slot].total, expense.amount());
    }

    order.sort_by(|a, b| b.total.total_cmp(&a.total));
    order.truncate(SERIES_LIMIT);
    order
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub summary: Summary,
    pub recent: Vec<Expense>,
    pub monthly: Vec<MonthTotal>,
    pub categories: Vec<CategoryTotal>,
}

impl Dashboard {
    pub fn from_expenses(expenses: &[Expense]) -> Self {
        Self {
            summary: summarize(expenses),
            recent: recent(expenses),
            monthly: monthly_series(expenses),
            categories: category_series(expenses),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.count == 0
    }
}
