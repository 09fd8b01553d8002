use crate::domain::country::Country;
use crate::domain::rotation::ColumnValue;
use uuid::Uuid;

/// Dimension values for one selection request. Cached rotation sets are keyed
/// on `(id, version)`: every write bumps `version`, and every instance,
/// clones included, gets its own `id`.
#[derive(Debug)]
pub struct RotationContext {
    id: Uuid,
    columns: Vec<(String, Option<ColumnValue>)>,
    version: u64,
}

impl Default for RotationContext {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            columns: Vec::new(),
            version: 0,
        }
    }
}

impl Clone for RotationContext {
    fn clone(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            columns: self.columns.clone(),
            version: self.version,
        }
    }
}

impl RotationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Absent keys and keys explicitly set to null both read as `None`.
    pub fn column(&self, key: &str) -> Option<&ColumnValue> {
        self.columns
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_ref())
    }

    pub fn set_column(&mut self, key: &str, value: Option<ColumnValue>) {
        self.version += 1;
        match self.columns.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.columns.push((key.to_string(), value)),
        }
    }

    pub fn set_country(&mut self, country: &Country) {
        self.set_column("country_id", Some(ColumnValue::Int(country.id)));
        self.set_column(
            "group_zone",
            country.primary_group_zone().map(ColumnValue::from),
        );
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ColumnValue>)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Parses `key=value,key=value`. Empty values become null.
    pub fn parse(raw: &str) -> Self {
        let mut ctx = Self::new();
        for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = value.trim();
            let value = if value.is_empty() {
                None
            } else {
                Some(ColumnValue::from_db_text(value))
            };
            ctx.set_column(key.trim(), value);
        }
        ctx
    }
}
