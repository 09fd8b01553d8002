use crate::domain::rotation::{compare_nulls_last, ColumnValue, OrderingColumn, RotationRule};
use crate::error::RotationError;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMatch {
    pub column: String,
    /// `None` when the context has no value, in which case only wildcard rules match.
    pub value: Option<ColumnValue>,
}

/// Logical rotation query handed to a [`CandidateStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationQuery {
    pub matches: Vec<ColumnMatch>,
    pub exclusions: BTreeSet<Uuid>,
    pub ordering: Vec<OrderingColumn>,
    pub fixed: Vec<(String, ColumnValue)>,
    pub account_column: String,
    pub gateway_column: String,
}

impl RotationQuery {
    pub fn rule_matches(&self, rule: &RotationRule) -> bool {
        if self.exclusions.contains(&rule.account.account_id) {
            return false;
        }

        let fixed_ok = self
            .fixed
            .iter()
            .all(|(column, value)| rule.column_value(column).as_ref() == Some(value));
        if !fixed_ok {
            return false;
        }

        self.matches.iter().all(|m| match rule.column_value(&m.column) {
            None => true,
            Some(rule_value) => m.value.as_ref() == Some(&rule_value),
        })
    }

    pub fn compare_rules(&self, a: &RotationRule, b: &RotationRule) -> Ordering {
        for key in &self.ordering {
            let ord = compare_nulls_last(
                a.column_value(&key.column).as_ref(),
                b.column_value(&key.column).as_ref(),
                key.direction,
            );
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

/// Source of rotation rows with their eager-loaded accounts.
///
/// Implementations must apply `RotationQuery::rule_matches` semantics and
/// return rows ordered by `RotationQuery::compare_rules`, nulls last in every
/// direction, with ties kept in a stable order.
#[async_trait::async_trait]
pub trait CandidateStore: Send + Sync {
    fn schema_columns(&self) -> Vec<String>;

    async fn query_rules(&self, query: &RotationQuery) -> Result<Vec<RotationRule>, RotationError>;
}
