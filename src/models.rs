use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::coerce;

/// Backend-assigned identifier. Arrives as a number or a string; kept as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ExpenseId(String);

impl ExpenseId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ExpenseId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ExpenseId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ExpenseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ExpenseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        opaque_id(deserializer).map(Self)
    }
}

/// Accept an identifier encoded as a JSON string or number.
pub fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// One expense as returned by the backend. Every field is optional on the
/// wire; cost stays raw so aggregation can coerce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(default)]
    pub id: ExpenseId,
    #[serde(rename = "ExpenseDate", default)]
    pub date: Option<String>,
    #[serde(rename = "ExpenseItem", default)]
    pub item: Option<String>,
    #[serde(rename = "ExpenseCost", default)]
    pub cost: Value,
    #[serde(rename = "UserId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
}

impl Expense {
    pub fn amount(&self) -> f64 {
        coerce::amount(&self.cost)
    }

    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        self.date.as_deref().and_then(coerce::parse_date)
    }

    pub fn label(&self) -> &str {
        self.item.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    #[serde(rename = "Fullname")]
    pub full_name: &'a str,
    #[serde(rename = "Email")]
    pub email: &'a str,
    #[serde(rename = "Password")]
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    #[serde(rename = "Email")]
    pub email: &'a str,
    #[serde(rename = "Password")]
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "userId", deserialize_with = "opaque_id")]
    pub user_id: String,
    #[serde(rename = "userName", default)]
    pub user_name: Option<String>,
    #[serde(rename = "userEmail", default)]
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExpense {
    #[serde(rename = "ExpenseDate")]
    pub date: String,
    #[serde(rename = "ExpenseItem")]
    pub item: String,
    #[serde(rename = "ExpenseCost")]
    pub cost: f64,
    #[serde(rename = "UserId")]
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseUpdate {
    #[serde(rename = "ExpenseItem")]
    pub item: String,
    #[serde(rename = "ExpenseCost")]
    pub cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Insight {
    #[serde(default)]
    pub insight: String,
    #[serde(default)]
    pub provider: Option<String>,
}

#[cfg(test)]
pub(crate) fn expense(id: &str, date: &str, item: &str, cost: Value) -> Expense {
    Expense {
        id: ExpenseId::from(id),
        date: (!date.is_empty()).then(|| date.to_string()),
        item: Some(item.to_string()),
        cost,
        user_id: None,
    }
}
