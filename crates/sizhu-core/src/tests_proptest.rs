use proptest::prelude::*;

// Property-based checks for the cycle, lookup tables and scorer.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{closest_matching_year, matching_years, year_pillar};
    use crate::config::ScoringConfig;
    use crate::cycle::{decade_group, void_branches, GanZhi, MAX_ABS_COUNT};
    use crate::hierarchy::HierarchyLevel;
    use crate::life_stage::{direction, life_stage, stage_zero, LifeStage};
    use crate::pillar::{BaseRole, PillarBuilder, PillarRole};
    use crate::scoring::ElementalStrengthScorer;
    use crate::symbols::{Branch, Stem};

    // =========================================================================
    // Cycle periodicity
    // =========================================================================
    proptest! {
        #[test]
        fn test_sixty_cycle_periodicity(n in -MAX_ABS_COUNT + 60..MAX_ABS_COUNT - 60) {
            let a = GanZhi::from_count(n).unwrap();
            let b = GanZhi::from_count(n + 60).unwrap();
            prop_assert_eq!(a, b);
            prop_assert!(a.is_cyclic());
            prop_assert_eq!(a.stem.index() as i64, n.rem_euclid(10));
            prop_assert_eq!(a.branch.index() as i64, n.rem_euclid(12));
        }

        #[test]
        fn test_count_and_offset_agree(n in -100_000i64..100_000, k in -500i64..500) {
            let moved = GanZhi::from_count(n).unwrap().offset(k);
            prop_assert_eq!(moved, GanZhi::from_count(n + k).unwrap());
        }
    }

    // =========================================================================
    // Void branches partition the branch set
    // =========================================================================
    proptest! {
        #[test]
        fn test_void_pairs_partition(stem_idx in 0usize..10) {
            let stem = Stem::from_index(stem_idx).unwrap();
            let mut covered = [0u8; 12];
            let mut groups = Vec::new();
            for branch in Branch::ALL.iter().filter(|b| b.index() % 2 == stem_idx % 2) {
                let group = decade_group(stem, *branch);
                prop_assert!(!groups.contains(&group));
                groups.push(group);
                let (a, b) = void_branches(stem, *branch);
                prop_assert_eq!(b, a.offset(1));
                covered[a.index()] += 1;
                covered[b.index()] += 1;
            }
            prop_assert_eq!(groups.len(), 6);
            prop_assert!(covered.iter().all(|&c| c == 1));
        }

        #[test]
        fn test_void_pair_never_contains_own_branch(idx in 0usize..60) {
            let gz = GanZhi::from_cycle_index(idx);
            let (a, b) = gz.void_branches();
            prop_assert_ne!(a, gz.branch);
            prop_assert_ne!(b, gz.branch);
        }
    }

    // =========================================================================
    // Life stages
    // =========================================================================
    proptest! {
        #[test]
        fn test_life_stage_walk(stem_idx in 0usize..10, start in 0usize..12) {
            let stem = Stem::from_index(stem_idx).unwrap();
            prop_assert_eq!(life_stage(stem, stage_zero(stem)), LifeStage::Birth);

            let first = Branch::from_index(start).unwrap();
            let mut seen = [false; 12];
            for k in 0..12 {
                let stage = life_stage(stem, first.offset(direction(stem) * k));
                prop_assert!(!seen[stage.index()]);
                seen[stage.index()] = true;
            }
        }
    }

    // =========================================================================
    // Scorer invariants
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn test_relative_strength_is_proportional(
            idxs in prop::array::uniform4(0usize..60),
            day_stem in 0usize..10,
        ) {
            let config = ScoringConfig::default();
            let builder = PillarBuilder::new(Stem::from_index(day_stem).unwrap());
            let pillars: Vec<_> = BaseRole::ALL
                .iter()
                .zip(idxs)
                .map(|(role, idx)| builder.build(GanZhi::from_cycle_index(idx), PillarRole::Base(*role)))
                .collect();
            let scores = ElementalStrengthScorer::new(&config).score(&pillars);

            let positive: f64 = scores.iter().map(|s| s.raw_total.max(0.0)).sum();
            prop_assert!(positive > 0.0);
            for s in scores.iter() {
                prop_assert!(s.relative_strength >= 0.0);
                let expected = s.raw_total.max(0.0) / positive * config.relative_scale;
                prop_assert!((s.relative_strength - expected).abs() < 1e-9);
                prop_assert!((s.components.total() - s.raw_total).abs() < 1e-9);
            }
        }

        #[test]
        fn test_scoring_is_deterministic(idxs in prop::array::uniform4(0usize..60)) {
            let config = ScoringConfig::default();
            let builder = PillarBuilder::new(Stem::Jia);
            let pillars: Vec<_> = BaseRole::ALL
                .iter()
                .zip(idxs)
                .map(|(role, idx)| builder.build(GanZhi::from_cycle_index(idx), PillarRole::Base(*role)))
                .collect();
            let scorer = ElementalStrengthScorer::new(&config);
            prop_assert_eq!(scorer.score(&pillars), scorer.score(&pillars));
        }
    }

    // =========================================================================
    // Year matching
    // =========================================================================
    proptest! {
        #[test]
        fn test_matching_years_agree_with_year_pillar(
            idx in 0usize..60,
            from in -3000i32..3000,
            span in 0i32..400,
        ) {
            let ganzhi = GanZhi::from_cycle_index(idx);
            let years = matching_years(ganzhi, from, from + span);
            let expected = (from..=from + span)
                .filter(|y| year_pillar(*y).unwrap() == ganzhi)
                .count();
            prop_assert_eq!(years.len(), expected);
            for y in &years {
                prop_assert_eq!(year_pillar(*y).unwrap(), ganzhi);
            }

            let closest = closest_matching_year(ganzhi, from).unwrap();
            prop_assert_eq!(year_pillar(closest).unwrap(), ganzhi);
            prop_assert!((closest - from).abs() <= 30);
        }
    }

    // =========================================================================
    // Hierarchy level indices
    // =========================================================================
    proptest! {
        #[test]
        fn test_level_index_invariant(idx in 0usize..10) {
            if idx < HierarchyLevel::COUNT {
                let level = HierarchyLevel::from_index(idx).unwrap();
                prop_assert_eq!(level.index(), idx);
            } else {
                prop_assert!(HierarchyLevel::from_index(idx).is_none());
            }
        }
    }
}
