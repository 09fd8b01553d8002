use crate::domain::rotation::RotationRule;
use crate::error::RotationError;
use rand::Rng;

/// What to do when every candidate of a gateway has a zero ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ZeroRatioPolicy {
    #[default]
    Reject,
    Uniform,
}

impl ZeroRatioPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "reject" => Some(Self::Reject),
            "uniform" => Some(Self::Uniform),
            _ => None,
        }
    }
}

/// Weighted draw over one gateway's candidates.
///
/// `r` is uniform over `[0, total)` and the winner is the first candidate whose
/// running ratio sum exceeds `r`, so each candidate wins with probability
/// `ratio / total` and a zero-ratio candidate never wins.
pub fn draw<'a, R: Rng + ?Sized>(
    candidates: &'a [RotationRule],
    rng: &mut R,
    policy: ZeroRatioPolicy,
) -> Result<&'a RotationRule, RotationError> {
    let Some(first) = candidates.first() else {
        return Err(RotationError::NoCandidates { gateway: None });
    };

    let total: u64 = candidates.iter().map(|c| c.ratio as u64).sum();
    if total == 0 {
        return match policy {
            ZeroRatioPolicy::Reject => Err(RotationError::DegenerateWeights {
                gateway: first.gateway_id.clone(),
            }),
            ZeroRatioPolicy::Uniform => Ok(&candidates[rng.gen_range(0..candidates.len())]),
        };
    }

    let r = rng.gen_range(0..total);
    let mut carry = 0u64;
    for candidate in candidates {
        carry += candidate.ratio as u64;
        if carry > r {
            return Ok(candidate);
        }
    }

    // carry reaches total > r on the last iteration
    Err(RotationError::NoCandidates {
        gateway: Some(first.gateway_id.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rotation::PaymentAccount;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn rule(ratio: u32) -> RotationRule {
        RotationRule {
            rotation_id: Uuid::new_v4(),
            priority: 1,
            ratio,
            gateway_id: "stripe".to_string(),
            columns: BTreeMap::new(),
            account: PaymentAccount {
                account_id: Uuid::new_v4(),
                checkout_data: serde_json::Value::Null,
            },
        }
    }

    #[test]
    fn single_candidate_always_wins() {
        let mut rng = StdRng::seed_from_u64(7);
        let only = vec![rule(3)];
        for _ in 0..100 {
            let picked = draw(&only, &mut rng, ZeroRatioPolicy::Reject).unwrap();
            assert_eq!(picked.rotation_id, only[0].rotation_id);
        }
    }

    #[test]
    fn zero_ratio_never_beats_positive_peer() {
        let mut rng = StdRng::seed_from_u64(11);
        let rules = vec![rule(0), rule(1), rule(0)];
        for _ in 0..500 {
            let picked = draw(&rules, &mut rng, ZeroRatioPolicy::Reject).unwrap();
            assert_eq!(picked.rotation_id, rules[1].rotation_id);
        }
    }

    #[test]
    fn all_zero_rejects_by_default() {
        let mut rng = StdRng::seed_from_u64(1);
        let rules = vec![rule(0), rule(0)];
        let err = draw(&rules, &mut rng, ZeroRatioPolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            RotationError::DegenerateWeights {
                gateway: "stripe".to_string()
            }
        );
    }

    #[test]
    fn all_zero_uniform_picks_someone() {
        let mut rng = StdRng::seed_from_u64(1);
        let rules = vec![rule(0), rule(0)];
        let mut seen = [0usize; 2];
        for _ in 0..200 {
            let picked = draw(&rules, &mut rng, ZeroRatioPolicy::Uniform).unwrap();
            let idx = rules.iter().position(|r| r.rotation_id == picked.rotation_id).unwrap();
            seen[idx] += 1;
        }
        assert!(seen[0] > 0 && seen[1] > 0);
    }

    #[test]
    fn empty_group_has_no_candidates() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = draw(&[], &mut rng, ZeroRatioPolicy::Reject).unwrap_err();
        assert_eq!(err, RotationError::NoCandidates { gateway: None });
    }

    #[test]
    fn policy_parse() {
        assert_eq!(ZeroRatioPolicy::parse("Uniform"), Some(ZeroRatioPolicy::Uniform));
        assert_eq!(ZeroRatioPolicy::parse("reject"), Some(ZeroRatioPolicy::Reject));
        assert_eq!(ZeroRatioPolicy::parse("first"), None);
    }
}
