use crate::domain::rotation::RotationRule;

/// Keeps the rules of the highest priority tier, in input order.
pub fn highest_priority_tier(rules: &[RotationRule]) -> Vec<RotationRule> {
    let Some(top) = rules.iter().map(|r| r.priority).max() else {
        return Vec::new();
    };
    rules.iter().filter(|r| r.priority == top).cloned().collect()
}
