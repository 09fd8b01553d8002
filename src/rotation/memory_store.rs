use crate::domain::rotation::RotationRule;
use crate::error::RotationError;
use crate::rotation::store::{CandidateStore, RotationQuery};

/// Rotation rules held in memory, in insertion order.
#[derive(Debug, Clone)]
pub struct InMemoryRotationStore {
    pub schema: Vec<String>,
    pub rules: Vec<RotationRule>,
}

impl InMemoryRotationStore {
    pub fn new(schema: &[&str], rules: Vec<RotationRule>) -> Self {
        Self {
            schema: schema.iter().map(|c| c.to_string()).collect(),
            rules,
        }
    }
}

#[async_trait::async_trait]
impl CandidateStore for InMemoryRotationStore {
    fn schema_columns(&self) -> Vec<String> {
        self.schema.clone()
    }

    async fn query_rules(&self, query: &RotationQuery) -> Result<Vec<RotationRule>, RotationError> {
        let mut out: Vec<RotationRule> = self
            .rules
            .iter()
            .filter(|rule| query.rule_matches(rule))
            .cloned()
            .collect();
        // stable: ties keep insertion order
        out.sort_by(|a, b| query.compare_rules(a, b));
        Ok(out)
    }
}
