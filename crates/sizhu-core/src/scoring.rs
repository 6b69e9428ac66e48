//! Weighted elemental strength (五行强弱).
//!
//! Six contribution sources are kept apart per element:
//!
//! 1. stems, weighted by pillar role
//! 2. hidden stems, role weight × intra-branch weight
//! 3. sound elements, weighted by pillar role
//! 4. seasonal adjustment from the base month branch
//! 5. dominant-season bonus, same relation logic with its own deltas
//! 6. combination bonuses (stem pairs, branch pairs, full and partial triads)
//!
//! Auxiliary pillars never contribute.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::{RoleWeights, ScoringConfig, SeasonalDeltas};
use crate::pillar::{BaseRole, ExtensionRole, Pillar, PillarRole};
use crate::symbols::{Branch, Element, Season, Stem};

// ============================================================================
// FIXED COMBINATION TABLES
// ============================================================================

/// Three harmonies (三合).
const HARMONY_TRIADS: [([Branch; 3], Element); 4] = [
    ([Branch::Shen, Branch::Zi, Branch::Chen], Element::Water),
    ([Branch::Hai, Branch::Mao, Branch::Wei], Element::Wood),
    ([Branch::Yin, Branch::Wu, Branch::Xu], Element::Fire),
    ([Branch::Si, Branch::You, Branch::Chou], Element::Metal),
];

/// Seasonal assemblies (三会).
const SEASONAL_TRIADS: [([Branch; 3], Element); 4] = [
    ([Branch::Yin, Branch::Mao, Branch::Chen], Element::Wood),
    ([Branch::Si, Branch::Wu, Branch::Wei], Element::Fire),
    ([Branch::Shen, Branch::You, Branch::Xu], Element::Metal),
    ([Branch::Hai, Branch::Zi, Branch::Chou], Element::Water),
];

/// Five stem combinations (天干五合): stems five apart, keyed by the lower.
fn stem_pair_element(a: Stem, b: Stem) -> Option<Element> {
    let (lo, hi) = if a.index() < b.index() { (a, b) } else { (b, a) };
    if hi.index() - lo.index() != 5 {
        return None;
    }
    Some(match lo {
        Stem::Jia => Element::Earth,
        Stem::Yi => Element::Metal,
        Stem::Bing => Element::Water,
        Stem::Ding => Element::Wood,
        _ => Element::Fire,
    })
}

// ============================================================================
// SCORE RECORDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub stem: f64,
    pub hidden_stem: f64,
    pub sound_element: f64,
    pub seasonal_adjustment: f64,
    pub dominant_season_bonus: f64,
    pub combination_bonus: f64,
}

impl ScoreComponents {
    pub fn total(&self) -> f64 {
        self.stem
            + self.hidden_stem
            + self.sound_element
            + self.seasonal_adjustment
            + self.dominant_season_bonus
            + self.combination_bonus
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementScore {
    pub element: Element,
    pub raw_total: f64,
    pub components: ScoreComponents,
    /// Display value; proportional to the raw total floored at zero.
    pub relative_strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementScores {
    scores: [ElementScore; Element::COUNT],
}

impl ElementScores {
    pub fn get(&self, element: Element) -> &ElementScore {
        &self.scores[element.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementScore> {
        self.scores.iter()
    }

    /// Highest raw total; ties keep production-cycle order.
    pub fn strongest(&self) -> &ElementScore {
        self.scores
            .iter()
            .fold(&self.scores[0], |best, s| if s.raw_total > best.raw_total { s } else { best })
    }

    pub fn weakest(&self) -> &ElementScore {
        self.scores
            .iter()
            .fold(&self.scores[0], |worst, s| if s.raw_total < worst.raw_total { s } else { worst })
    }
}

/// Day master strength bands on the relative scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayMasterStrength {
    VeryStrong,
    Strong,
    Balanced,
    Weak,
    VeryWeak,
}

impl DayMasterStrength {
    pub fn classify(relative: f64) -> Self {
        if relative >= 4.5 {
            DayMasterStrength::VeryStrong
        } else if relative >= 3.5 {
            DayMasterStrength::Strong
        } else if relative <= 0.5 {
            DayMasterStrength::VeryWeak
        } else if relative <= 1.5 {
            DayMasterStrength::Weak
        } else {
            DayMasterStrength::Balanced
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DayMasterStrength::VeryStrong => "太旺",
            DayMasterStrength::Strong => "偏旺",
            DayMasterStrength::Balanced => "中和",
            DayMasterStrength::Weak => "偏弱",
            DayMasterStrength::VeryWeak => "太弱",
        }
    }
}

// ============================================================================
// SCORER
// ============================================================================

pub struct ElementalStrengthScorer<'a> {
    config: &'a ScoringConfig,
}

fn role_weight(weights: &RoleWeights, role: &PillarRole) -> f64 {
    match role {
        PillarRole::Base(BaseRole::Year) => weights.year,
        PillarRole::Base(BaseRole::Month) => weights.month,
        PillarRole::Base(BaseRole::Day) => weights.day,
        PillarRole::Base(BaseRole::Hour) => weights.hour,
        PillarRole::Extension(ExtensionRole::DecadePeriod { .. }) => weights.decade_period,
        PillarRole::Extension(ExtensionRole::YearInPeriod { .. }) => weights.year_in_period,
        PillarRole::Extension(ExtensionRole::MonthInYear { .. }) => weights.month_in_year,
        PillarRole::Extension(ExtensionRole::DayInMonth { .. }) => weights.day_in_month,
        PillarRole::Extension(ExtensionRole::HourInDay { .. }) => weights.hour_in_day,
        PillarRole::Auxiliary(_) => 0.0,
    }
}

/// Delta for `element` given the season's dominant element.
pub fn seasonal_delta(deltas: &SeasonalDeltas, dominant: Element, element: Element) -> f64 {
    if element == dominant {
        deltas.dominant
    } else if element == dominant.produces() {
        deltas.produced
    } else if element == dominant.produced_by() {
        deltas.neutral
    } else if element == dominant.restrains() {
        deltas.restrained
    } else {
        deltas.restraining
    }
}

impl<'a> ElementalStrengthScorer<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self { config }
    }

    pub fn score<'p, I>(&self, pillars: I) -> ElementScores
    where
        I: IntoIterator<Item = &'p Pillar>,
    {
        let scored: Vec<&Pillar> = pillars
            .into_iter()
            .filter(|p| !matches!(p.role, PillarRole::Auxiliary(_)))
            .collect();
        let mut components = [ScoreComponents::default(); Element::COUNT];

        for pillar in &scored {
            let stem_w = role_weight(&self.config.stem_weights, &pillar.role);
            components[pillar.stem().element().index()].stem += stem_w;

            let hidden_w = role_weight(&self.config.hidden_stem_weights, &pillar.role);
            for hidden in &pillar.hidden_stems {
                components[hidden.stem.element().index()].hidden_stem += hidden_w * hidden.weight;
            }

            if let Some(sound) = &pillar.sound_element {
                let sound_w = role_weight(&self.config.sound_element_weights, &pillar.role);
                components[sound.element.index()].sound_element += sound_w;
            }
        }

        if let Some(season) = Self::season(&scored) {
            let dominant = season.dominant_element();
            for element in Element::ALL {
                let c = &mut components[element.index()];
                c.seasonal_adjustment = seasonal_delta(&self.config.seasonal, dominant, element);
                c.dominant_season_bonus =
                    seasonal_delta(&self.config.dominant_season, dominant, element);
            }
        }

        for (element, bonus) in self.combinations(&scored) {
            components[element.index()].combination_bonus += bonus;
        }

        self.finish(components)
    }

    /// Season from the base month pillar, if present.
    fn season(pillars: &[&Pillar]) -> Option<Season> {
        pillars
            .iter()
            .find(|p| p.role == PillarRole::Base(BaseRole::Month))
            .map(|p| p.branch().season())
    }

    fn combinations(&self, pillars: &[&Pillar]) -> Vec<(Element, f64)> {
        let bonuses = &self.config.combinations;
        let mut out = Vec::new();

        for (i, a) in pillars.iter().enumerate() {
            for b in &pillars[i + 1..] {
                if let Some(element) = stem_pair_element(a.stem(), b.stem()) {
                    out.push((element, bonuses.stem_pair));
                }
                let (partner, element) = a.branch().six_harmony();
                if partner == b.branch() {
                    out.push((element, bonuses.branch_pair));
                }
            }
        }

        let present: BTreeSet<Branch> = pillars.iter().map(|p| p.branch()).collect();
        let triads = HARMONY_TRIADS
            .iter()
            .map(|t| (t, bonuses.harmony_triad, bonuses.harmony_triad_partial))
            .chain(
                SEASONAL_TRIADS
                    .iter()
                    .map(|t| (t, bonuses.seasonal_triad, bonuses.seasonal_triad_partial)),
            );
        for ((members, element), full, partial) in triads {
            match members.iter().filter(|b| present.contains(*b)).count() {
                3 => out.push((*element, full)),
                2 => out.push((*element, partial)),
                _ => {}
            }
        }
        out
    }

    fn finish(&self, components: [ScoreComponents; Element::COUNT]) -> ElementScores {
        let totals = components.map(|c| c.total());
        let positive_sum: f64 = totals.iter().map(|t| t.max(0.0)).sum();
        let scores = Element::ALL.map(|element| {
            let raw_total = totals[element.index()];
            let relative_strength = if positive_sum > 0.0 {
                raw_total.max(0.0) / positive_sum * self.config.relative_scale
            } else {
                0.0
            };
            ElementScore {
                element,
                raw_total,
                components: components[element.index()],
                relative_strength,
            }
        });
        ElementScores { scores }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::GanZhi;
    use crate::pillar::{AuxiliaryRole, PillarBuilder};

    fn pillar(text: &str, role: BaseRole) -> Pillar {
        PillarBuilder::new(Stem::Jia)
            .build_str(text, PillarRole::Base(role))
            .unwrap()
    }

    #[test]
    fn test_empty_set_is_all_zero() {
        let config = ScoringConfig::default();
        let none: Vec<Pillar> = Vec::new();
        let scores = ElementalStrengthScorer::new(&config).score(&none);
        for s in scores.iter() {
            assert_eq!(s.raw_total, 0.0);
            assert_eq!(s.relative_strength, 0.0);
        }
    }

    #[test]
    fn test_single_day_pillar_breakdown() {
        let config = ScoringConfig::default();
        let day = pillar("甲子", BaseRole::Day);
        let scores = ElementalStrengthScorer::new(&config).score([&day]);
        let wood = scores.get(Element::Wood);
        assert!((wood.components.stem - 8.0).abs() < 1e-9);
        assert!((scores.get(Element::Water).components.hidden_stem - 0.5).abs() < 1e-9);
        assert!((scores.get(Element::Metal).components.sound_element - 0.3).abs() < 1e-9);
        assert_eq!(scores.strongest().element, Element::Wood);
        let total: f64 = scores.iter().map(|s| s.relative_strength).sum();
        assert!((total - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_seasonal_ordering() {
        let config = ScoringConfig::default();
        let month = pillar("丙寅", BaseRole::Month);
        let scores = ElementalStrengthScorer::new(&config).score([&month]);
        let adj = |e: Element| scores.get(e).components.seasonal_adjustment;
        let bonus = |e: Element| scores.get(e).components.dominant_season_bonus;
        // Spring: wood > fire > water > earth > metal.
        assert!(adj(Element::Wood) > adj(Element::Fire));
        assert!(adj(Element::Fire) > adj(Element::Water));
        assert!(adj(Element::Water) > adj(Element::Earth));
        assert!(adj(Element::Earth) > adj(Element::Metal));
        assert!(bonus(Element::Wood) > adj(Element::Wood));
        assert!(bonus(Element::Metal) < adj(Element::Metal));
    }

    #[test]
    fn test_full_triad_beats_partial() {
        let config = ScoringConfig::default();
        let scorer = ElementalStrengthScorer::new(&config);
        let full = [
            pillar("甲申", BaseRole::Year),
            pillar("丙子", BaseRole::Day),
            pillar("戊辰", BaseRole::Hour),
        ];
        let partial = [pillar("甲申", BaseRole::Year), pillar("丙子", BaseRole::Day)];
        let full_bonus = scorer.score(&full).get(Element::Water).components.combination_bonus;
        let partial_bonus = scorer
            .score(&partial)
            .get(Element::Water)
            .components
            .combination_bonus;
        assert!((full_bonus - 0.6).abs() < 1e-9);
        assert!((partial_bonus - 0.35).abs() < 1e-9);
        assert!(full_bonus > partial_bonus);
    }

    #[test]
    fn test_stem_and_branch_pairs() {
        let config = ScoringConfig::default();
        let scorer = ElementalStrengthScorer::new(&config);
        let set = [pillar("甲子", BaseRole::Year), pillar("己丑", BaseRole::Hour)];
        let scores = scorer.score(&set);
        // 甲己 -> earth, 子丑 -> earth, 亥子丑 partial -> water.
        let earth = scores.get(Element::Earth).components.combination_bonus;
        assert!((earth - (0.3 + 0.2)).abs() < 1e-9);
        let water = scores.get(Element::Water).components.combination_bonus;
        assert!((water - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_auxiliary_pillars_ignored() {
        let config = ScoringConfig::default();
        let aux = PillarBuilder::new(Stem::Jia).build(
            GanZhi::JIA_ZI,
            PillarRole::Auxiliary(AuxiliaryRole::Conception),
        );
        let scores = ElementalStrengthScorer::new(&config).score([&aux]);
        assert!(scores.iter().all(|s| s.raw_total == 0.0));
    }

    #[test]
    fn test_negative_totals_floor_relative() {
        let config = ScoringConfig::default();
        // 壬申 month in autumn: fire restrains the dominant metal.
        let month = pillar("壬申", BaseRole::Month);
        let scores = ElementalStrengthScorer::new(&config).score([&month]);
        let fire = scores.get(Element::Fire);
        assert!((fire.raw_total - (-0.25 - 0.3)).abs() < 1e-9);
        assert_eq!(fire.relative_strength, 0.0);
        assert_eq!(scores.weakest().element, Element::Fire);
    }

    #[test]
    fn test_day_master_bands() {
        assert_eq!(DayMasterStrength::classify(5.0), DayMasterStrength::VeryStrong);
        assert_eq!(DayMasterStrength::classify(3.5), DayMasterStrength::Strong);
        assert_eq!(DayMasterStrength::classify(2.5), DayMasterStrength::Balanced);
        assert_eq!(DayMasterStrength::classify(1.0), DayMasterStrength::Weak);
        assert_eq!(DayMasterStrength::classify(0.2), DayMasterStrength::VeryWeak);
        assert_eq!(DayMasterStrength::classify(0.2).name(), "太弱");
    }
}
