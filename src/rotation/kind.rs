use crate::domain::rotation::{ColumnValue, OrderingColumn, SortDirection};
use crate::error::RotationError;

/// Describes one family of rotation rules: which columns take part in
/// matching, how matches are ordered, and where the account and gateway live.
pub trait RotationKind: Send + Sync {
    fn priority_columns(&self) -> Vec<String>;

    fn priority_columns_ordering(&self) -> Vec<OrderingColumn>;

    fn account_column_name(&self) -> String;

    fn gateway_column_name(&self) -> String;

    /// Equality constraints applied to every query regardless of context.
    fn default_filters(&self) -> Vec<(String, ColumnValue)> {
        Vec::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub match_columns: Vec<String>,
    pub ordering: Vec<OrderingColumn>,
    pub account_column: String,
    pub gateway_column: String,
    pub default_filters: Vec<(String, ColumnValue)>,
}

impl ColumnSpec {
    /// Country/zone rotations: exact country first, then zone, then global rules.
    pub fn country_zone() -> Self {
        Self {
            match_columns: vec!["country_id".to_string(), "group_zone".to_string()],
            ordering: vec![
                OrderingColumn::new("country_id", SortDirection::Desc),
                OrderingColumn::new("group_zone", SortDirection::Desc),
            ],
            account_column: "payment_account_id".to_string(),
            gateway_column: "gateway".to_string(),
            default_filters: Vec::new(),
        }
    }

    pub fn parse_match_columns(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Parses `column:direction,column:direction`; a bare column sorts descending.
    pub fn parse_ordering(raw: &str) -> Result<Vec<OrderingColumn>, RotationError> {
        raw.split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|item| -> Result<OrderingColumn, RotationError> {
                let (column, direction) = match item.split_once(':') {
                    Some((column, dir)) => (
                        column.trim(),
                        SortDirection::parse(dir).ok_or_else(|| {
                            RotationError::config(format!("unknown sort direction in {:?}", item))
                        })?,
                    ),
                    None => (item, SortDirection::Desc),
                };
                Ok(OrderingColumn::new(column, direction))
            })
            .collect()
    }
}

impl RotationKind for ColumnSpec {
    fn priority_columns(&self) -> Vec<String> {
        self.match_columns.clone()
    }

    fn priority_columns_ordering(&self) -> Vec<OrderingColumn> {
        self.ordering.clone()
    }

    fn account_column_name(&self) -> String {
        self.account_column.clone()
    }

    fn gateway_column_name(&self) -> String {
        self.gateway_column.clone()
    }

    fn default_filters(&self) -> Vec<(String, ColumnValue)> {
        self.default_filters.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ordering_with_default_direction() {
        let ordering = ColumnSpec::parse_ordering("country_id:asc, group_zone").unwrap();
        assert_eq!(
            ordering,
            vec![
                OrderingColumn::new("country_id", SortDirection::Asc),
                OrderingColumn::new("group_zone", SortDirection::Desc),
            ]
        );
    }

    #[test]
    fn rejects_unknown_direction() {
        let err = ColumnSpec::parse_ordering("country_id:sideways").unwrap_err();
        assert!(matches!(err, RotationError::InvalidConfiguration(_)));
    }
}
