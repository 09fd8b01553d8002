use crate::domain::rotation::RotationRule;
use std::collections::BTreeMap;

pub fn group_by_gateway(rules: Vec<RotationRule>) -> BTreeMap<String, Vec<RotationRule>> {
    let mut groups: BTreeMap<String, Vec<RotationRule>> = BTreeMap::new();
    for rule in rules {
        groups.entry(rule.gateway_id.clone()).or_default().push(rule);
    }
    groups
}
