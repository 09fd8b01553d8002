use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Non-null value of a match or ordering column. Integers sort before text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Int(i64),
    Text(String),
}

impl ColumnValue {
    /// Reads a value that came back from a store as text. Only canonical
    /// integers become `Int`, so `"007"` or `"+5"` stay text.
    pub fn from_db_text(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(n) if n.to_string() == raw => Self::Int(n),
            _ => Self::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ColumnValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for ColumnValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingColumn {
    pub column: String,
    pub direction: SortDirection,
}

impl OrderingColumn {
    pub fn new(column: &str, direction: SortDirection) -> Self {
        Self {
            column: column.to_string(),
            direction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAccount {
    pub account_id: Uuid,
    pub checkout_data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationRule {
    pub rotation_id: Uuid,
    pub priority: i32,
    pub ratio: u32,
    pub gateway_id: String,
    pub columns: BTreeMap<String, Option<ColumnValue>>,
    pub account: PaymentAccount,
}

impl RotationRule {
    /// Value of a named column. `priority`, `ratio` and `gateway_id` resolve to
    /// the rule's own fields so they can be used as ordering keys.
    pub fn column_value(&self, column: &str) -> Option<ColumnValue> {
        match column {
            "priority" => Some(ColumnValue::Int(self.priority as i64)),
            "ratio" => Some(ColumnValue::Int(self.ratio as i64)),
            "gateway_id" => Some(ColumnValue::Text(self.gateway_id.clone())),
            _ => self.columns.get(column).cloned().flatten(),
        }
    }
}

/// Sorts two optional values with nulls after every non-null value, whatever the direction.
pub fn compare_nulls_last(
    a: Option<&ColumnValue>,
    b: Option<&ColumnValue>,
    direction: SortDirection,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match direction {
            SortDirection::Asc => a.cmp(b),
            SortDirection::Desc => b.cmp(a),
        },
    }
}
