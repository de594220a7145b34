use std::path::{Path, PathBuf};

use crate::error::{Result, TallyError};
use crate::fmt::{human_date, plain_number};
use crate::models::Expense;

pub const CSV_HEADER: &str = "Date,Item,Cost";
pub const DEFAULT_CSV_NAME: &str = "expense-report.csv";

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn row(expense: &Expense) -> String {
    format!(
        "{},{},{}",
        human_date(expense.parsed_date()),
        quote(expense.label()),
        plain_number(expense.amount())
    )
}

/// Render expenses as delimited text. An empty list is an error so callers
/// never produce an empty artifact.
pub fn to_csv(expenses: &[Expense]) -> Result<String> {
    if expenses.is_empty() {
        return Err(TallyError::EmptyExport);
    }
    let mut lines = Vec::with_capacity(expenses.len() + 1);
    lines.push(CSV_HEADER.to_string());
    lines.extend(expenses.iter().map(row));
    Ok(lines.join("\n"))
}

pub fn write_csv(expenses: &[Expense], path: &Path) -> Result<PathBuf> {
    let content = to_csv(expenses)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(path.to_path_buf())
}
