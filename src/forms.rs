//! Input validation run before anything is sent to the backend.

use chrono::NaiveDate;

use crate::error::{Result, TallyError};
use crate::models::{ExpenseUpdate, NewExpense};

fn invalid<T>(message: &str) -> Result<T> {
    Err(TallyError::Validation(message.to_string()))
}

fn required(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        invalid(message)
    } else {
        Ok(())
    }
}

pub fn validate_signup(full_name: &str, email: &str, password: &str) -> Result<()> {
    required(full_name, "Full name is required")?;
    required(email, "Email is required")?;
    if !email.contains('@') {
        return invalid("Email address looks invalid");
    }
    required(password, "Password is required")
}

pub fn validate_login(email: &str, password: &str) -> Result<()> {
    required(email, "Email is required")?;
    required(password, "Password is required")
}

/// Parse a user-entered cost: required, numeric and not negative.
pub fn parse_cost(raw: &str) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return invalid("Expense cost is required");
    }
    let cost: f64 = match raw.parse() {
        Ok(c) if f64::is_finite(c) => c,
        _ => return invalid("Expense cost must be a number"),
    };
    if cost < 0.0 {
        return invalid("Expense cost must be zero or greater");
    }
    Ok(cost)
}

pub struct NewExpenseForm<'a> {
    pub date: &'a str,
    pub item: &'a str,
    pub cost: &'a str,
}

impl NewExpenseForm<'_> {
    pub fn into_request(self, user_id: i64) -> Result<NewExpense> {
        required(self.date, "Expense date is required")?;
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .or_else(|_| invalid("Expense date must be YYYY-MM-DD"))?;
        required(self.item, "Expense item is required")?;
        let cost = parse_cost(self.cost)?;
        Ok(NewExpense {
            date: date.format("%Y-%m-%d").to_string(),
            item: self.item.trim().to_string(),
            cost,
            user_id,
        })
    }
}

pub struct EditForm<'a> {
    pub item: &'a str,
    pub cost: &'a str,
}

impl EditForm<'_> {
    pub fn into_update(self) -> Result<ExpenseUpdate> {
        required(self.item, "Expense item is required")?;
        let cost = parse_cost(self.cost)?;
        Ok(ExpenseUpdate {
            item: self.item.trim().to_string(),
            cost,
        })
    }
}
