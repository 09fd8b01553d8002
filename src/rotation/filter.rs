use crate::domain::context::RotationContext;
use crate::domain::rotation::RotationRule;
use crate::error::RotationError;
use crate::rotation::kind::RotationKind;
use crate::rotation::store::{CandidateStore, ColumnMatch, RotationQuery};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use uuid::Uuid;

const BUILTIN_COLUMNS: [&str; 2] = ["priority", "ratio"];

pub struct RotationFilterEngine<S> {
    kind: Arc<dyn RotationKind>,
    store: S,
}

impl<S: CandidateStore> RotationFilterEngine<S> {
    pub fn new(kind: Arc<dyn RotationKind>, store: S) -> Result<Self, RotationError> {
        validate_kind(kind.as_ref(), &store.schema_columns())?;
        Ok(Self { kind, store })
    }

    pub fn build_query(&self, ctx: &RotationContext, exclusions: &BTreeSet<Uuid>) -> RotationQuery {
        RotationQuery {
            matches: self
                .kind
                .priority_columns()
                .into_iter()
                .map(|column| ColumnMatch {
                    value: ctx.column(&column).cloned(),
                    column,
                })
                .collect(),
            exclusions: exclusions.clone(),
            ordering: self.kind.priority_columns_ordering(),
            fixed: self.kind.default_filters(),
            account_column: self.kind.account_column_name(),
            gateway_column: self.kind.gateway_column_name(),
        }
    }

    pub async fn filter(
        &self,
        ctx: &RotationContext,
        exclusions: &BTreeSet<Uuid>,
    ) -> Result<Vec<RotationRule>, RotationError> {
        let query = self.build_query(ctx, exclusions);
        self.store.query_rules(&query).await
    }
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_kind(kind: &dyn RotationKind, schema: &[String]) -> Result<(), RotationError> {
    let known: HashSet<&str> = schema
        .iter()
        .map(String::as_str)
        .chain(BUILTIN_COLUMNS)
        .collect();

    let check = |role: &str, column: &str| -> Result<(), RotationError> {
        if !is_identifier(column) {
            return Err(RotationError::config(format!(
                "{} column {:?} is not a plain identifier",
                role, column
            )));
        }
        if !known.contains(column) {
            return Err(RotationError::config(format!(
                "{} column {:?} is not part of the rotation schema",
                role, column
            )));
        }
        Ok(())
    };

    let mut seen = HashSet::new();
    for column in kind.priority_columns() {
        check("match", &column)?;
        if !seen.insert(column.clone()) {
            return Err(RotationError::config(format!("match column {:?} listed twice", column)));
        }
    }
    for key in kind.priority_columns_ordering() {
        check("ordering", &key.column)?;
    }
    for (column, _) in kind.default_filters() {
        check("filter", &column)?;
    }
    check("account", &kind.account_column_name())?;
    check("gateway", &kind.gateway_column_name())?;
    Ok(())
}
