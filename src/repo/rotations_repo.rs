use crate::domain::rotation::{ColumnValue, PaymentAccount, RotationRule};
use crate::error::RotationError;
use crate::rotation::filter::is_identifier;
use crate::rotation::store::{CandidateStore, RotationQuery};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationTables {
    pub rotations: String,
    pub accounts: String,
}

impl RotationTables {
    pub fn new(rotations: &str, accounts: &str) -> Result<Self, RotationError> {
        for table in [rotations, accounts] {
            if !is_identifier(table) {
                return Err(RotationError::config(format!("table name {:?} is not a plain identifier", table)));
            }
        }
        Ok(Self {
            rotations: rotations.to_string(),
            accounts: accounts.to_string(),
        })
    }
}

/// Rotation rows in PostgreSQL, joined with their payment accounts.
#[derive(Clone)]
pub struct PgRotationStore {
    pub pool: PgPool,
    pub tables: RotationTables,
    schema: Vec<String>,
}

impl PgRotationStore {
    /// Reads the rotation table's column list once so the engine can validate against it.
    pub async fn load(pool: PgPool, tables: RotationTables) -> Result<Self, RotationError> {
        let rows = sqlx::query(
            "SELECT column_name::text AS column_name FROM information_schema.columns WHERE table_schema = current_schema() AND table_name = $1 ORDER BY ordinal_position",
        )
        .bind(&tables.rotations)
        .fetch_all(&pool)
        .await
        .map_err(RotationError::store)?;

        let schema: Vec<String> = rows.into_iter().map(|r| r.get("column_name")).collect();
        if schema.is_empty() {
            return Err(RotationError::config(format!(
                "rotation table {:?} has no columns or does not exist",
                tables.rotations
            )));
        }

        Ok(Self { pool, tables, schema })
    }
}

/// Columns carried back on each rule besides the fixed ones.
fn carried_columns(query: &RotationQuery) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let names = query
        .matches
        .iter()
        .map(|m| m.column.as_str())
        .chain(query.ordering.iter().map(|o| o.column.as_str()))
        .chain(query.fixed.iter().map(|(c, _)| c.as_str()));
    for name in names {
        if name != "priority" && name != "ratio" && !out.iter().any(|c| c == name) {
            out.push(name.to_string());
        }
    }
    out
}

pub fn rotation_select(tables: &RotationTables, query: &RotationQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new(
        "SELECT r.id AS rotation_id, r.priority, r.ratio, ",
    );
    qb.push(format!(
        "CAST(r.{} AS TEXT) AS gateway_id, a.id AS account_id, a.checkout_data",
        query.gateway_column
    ));
    for column in carried_columns(query) {
        qb.push(format!(", CAST(r.{0} AS TEXT) AS {0}", column));
    }
    qb.push(format!(
        " FROM {} r JOIN {} a ON a.id = r.{} WHERE TRUE",
        tables.rotations, tables.accounts, query.account_column
    ));

    for (column, value) in &query.fixed {
        qb.push(format!(" AND CAST(r.{} AS TEXT) = ", column));
        qb.push_bind(value.to_string());
    }

    if !query.exclusions.is_empty() {
        qb.push(format!(" AND r.{} NOT IN (", query.account_column));
        let mut list = qb.separated(", ");
        for id in &query.exclusions {
            list.push_bind(*id);
        }
        list.push_unseparated(")");
    }

    for m in &query.matches {
        match &m.value {
            Some(value) => {
                qb.push(format!(" AND (CAST(r.{} AS TEXT) = ", m.column));
                qb.push_bind(value.to_string());
                qb.push(format!(" OR r.{} IS NULL)", m.column));
            }
            None => {
                qb.push(format!(" AND r.{} IS NULL", m.column));
            }
        }
    }

    qb.push(" ORDER BY ");
    for key in &query.ordering {
        qb.push(format!("r.{} {} NULLS LAST, ", key.column, key.direction.as_sql()));
    }
    qb.push("r.id ASC");
    qb
}

fn read_rule(row: &PgRow, carried: &[String]) -> Result<RotationRule, RotationError> {
    let rotation_id: Uuid = row.try_get("rotation_id").map_err(RotationError::store)?;
    let ratio: i32 = row.try_get("ratio").map_err(RotationError::store)?;
    let ratio = u32::try_from(ratio).map_err(|_| {
        RotationError::config(format!("rotation {} has negative ratio {}", rotation_id, ratio))
    })?;

    let mut columns = BTreeMap::new();
    for column in carried {
        let raw: Option<String> = row.try_get(column.as_str()).map_err(RotationError::store)?;
        columns.insert(column.clone(), raw.as_deref().map(ColumnValue::from_db_text));
    }

    Ok(RotationRule {
        rotation_id,
        priority: row.try_get("priority").map_err(RotationError::store)?,
        ratio,
        gateway_id: row.try_get("gateway_id").map_err(RotationError::store)?,
        columns,
        account: PaymentAccount {
            account_id: row.try_get("account_id").map_err(RotationError::store)?,
            checkout_data: row.try_get("checkout_data").map_err(RotationError::store)?,
        },
    })
}

#[async_trait::async_trait]
impl CandidateStore for PgRotationStore {
    fn schema_columns(&self) -> Vec<String> {
        self.schema.clone()
    }

    async fn query_rules(&self, query: &RotationQuery) -> Result<Vec<RotationRule>, RotationError> {
        let mut qb = rotation_select(&self.tables, query);
        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::warn!("rotation query on {} failed: {}", self.tables.rotations, e);
                RotationError::store(e)
            })?;

        let carried = carried_columns(query);
        rows.iter().map(|row| read_rule(row, &carried)).collect()
    }
}
