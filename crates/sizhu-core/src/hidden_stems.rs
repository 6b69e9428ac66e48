//! Hidden stems (藏干) per branch with intra-branch weights.
//!
//! Splits are 1.0 for one stem, 0.6/0.4 for two, 0.5/0.3/0.2 for three.
//! The first entry is the principal (本气) stem.

use serde::{Deserialize, Serialize};

use crate::symbols::{Branch, Stem};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HiddenStem {
    pub stem: Stem,
    pub weight: f64,
}

const fn hs(stem: Stem, weight: f64) -> HiddenStem {
    HiddenStem { stem, weight }
}

const ZI: [HiddenStem; 1] = [hs(Stem::Gui, 1.0)];
const CHOU: [HiddenStem; 3] = [hs(Stem::Ji, 0.5), hs(Stem::Gui, 0.3), hs(Stem::Xin, 0.2)];
const YIN: [HiddenStem; 3] = [hs(Stem::Jia, 0.5), hs(Stem::Bing, 0.3), hs(Stem::Wu, 0.2)];
const MAO: [HiddenStem; 1] = [hs(Stem::Yi, 1.0)];
const CHEN: [HiddenStem; 3] = [hs(Stem::Wu, 0.5), hs(Stem::Yi, 0.3), hs(Stem::Gui, 0.2)];
const SI: [HiddenStem; 3] = [hs(Stem::Bing, 0.5), hs(Stem::Geng, 0.3), hs(Stem::Wu, 0.2)];
const WU: [HiddenStem; 2] = [hs(Stem::Ding, 0.6), hs(Stem::Ji, 0.4)];
const WEI: [HiddenStem; 3] = [hs(Stem::Ji, 0.5), hs(Stem::Ding, 0.3), hs(Stem::Yi, 0.2)];
const SHEN: [HiddenStem; 3] = [hs(Stem::Geng, 0.5), hs(Stem::Ren, 0.3), hs(Stem::Wu, 0.2)];
const YOU: [HiddenStem; 1] = [hs(Stem::Xin, 1.0)];
const XU: [HiddenStem; 3] = [hs(Stem::Wu, 0.5), hs(Stem::Xin, 0.3), hs(Stem::Ding, 0.2)];
const HAI: [HiddenStem; 2] = [hs(Stem::Ren, 0.6), hs(Stem::Jia, 0.4)];

pub fn hidden_stems(branch: Branch) -> &'static [HiddenStem] {
    match branch {
        Branch::Zi => &ZI,
        Branch::Chou => &CHOU,
        Branch::Yin => &YIN,
        Branch::Mao => &MAO,
        Branch::Chen => &CHEN,
        Branch::Si => &SI,
        Branch::Wu => &WU,
        Branch::Wei => &WEI,
        Branch::Shen => &SHEN,
        Branch::You => &YOU,
        Branch::Xu => &XU,
        Branch::Hai => &HAI,
    }
}

/// Text-keyed lookup; unknown symbols yield an empty list.
pub fn hidden_stems_by_symbol(symbol: &str) -> &'static [HiddenStem] {
    match symbol.parse::<Branch>() {
        Ok(branch) => hidden_stems(branch),
        Err(()) => &[],
    }
}

pub fn dominant_hidden_stem(branch: Branch) -> Stem {
    hidden_stems(branch)[0].stem
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        for branch in Branch::ALL {
            let total: f64 = hidden_stems(branch).iter().map(|h| h.weight).sum();
            assert!((total - 1.0).abs() < 1e-9, "{} sums to {}", branch, total);
        }
    }

    #[test]
    fn test_weight_splits_by_count() {
        for branch in Branch::ALL {
            let weights: Vec<f64> = hidden_stems(branch).iter().map(|h| h.weight).collect();
            match weights.len() {
                1 => assert_eq!(weights, vec![1.0]),
                2 => assert_eq!(weights, vec![0.6, 0.4]),
                3 => assert_eq!(weights, vec![0.5, 0.3, 0.2]),
                n => panic!("unexpected hidden stem count {}", n),
            }
        }
    }

    #[test]
    fn test_principal_stem_matches_branch_element() {
        for branch in Branch::ALL {
            assert_eq!(dominant_hidden_stem(branch).element(), branch.element());
        }
    }

    #[test]
    fn test_unknown_symbol_is_empty() {
        assert!(hidden_stems_by_symbol("x").is_empty());
        assert!(hidden_stems_by_symbol("").is_empty());
        assert_eq!(hidden_stems_by_symbol("亥").len(), 2);
    }
}
