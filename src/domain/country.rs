use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    pub group_zones: Vec<String>,
}

impl Country {
    pub fn primary_group_zone(&self) -> Option<&str> {
        self.group_zones.first().map(String::as_str)
    }
}
