//! Nested period hierarchy: decade period > year > month > day > hour.
//!
//! A level can only be built while every shallower level holds a valid
//! selection. Each `open` compares the current selections with the snapshot
//! taken when the levels were last built; a change at any level at or above
//! the target rebuilds the whole chain below the first changed level.

use serde::{Deserialize, Serialize};

use crate::cycle::GanZhi;
use crate::pillar::{ExtensionRole, Pillar, PillarBuilder, PillarRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HierarchyLevel {
    DecadePeriod,
    Year,
    Month,
    Day,
    Hour,
}

impl HierarchyLevel {
    pub const COUNT: usize = 5;

    pub const ALL: [HierarchyLevel; 5] = [
        HierarchyLevel::DecadePeriod,
        HierarchyLevel::Year,
        HierarchyLevel::Month,
        HierarchyLevel::Day,
        HierarchyLevel::Hour,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn parent(&self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn child(&self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn name(&self) -> &'static str {
        match self {
            HierarchyLevel::DecadePeriod => "大运",
            HierarchyLevel::Year => "流年",
            HierarchyLevel::Month => "流月",
            HierarchyLevel::Day => "流日",
            HierarchyLevel::Hour => "流时",
        }
    }
}

/// One resolvable entry at a hierarchy level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub ganzhi: GanZhi,
    pub role: ExtensionRole,
}

/// Supplies the candidate list of a level given its parent's role.
pub trait CandidateSource {
    /// `parent` is `None` for the decade level.
    fn candidates(&self, level: HierarchyLevel, parent: Option<&ExtensionRole>) -> Vec<Candidate>;
}

/// Selection indices per level, indexing the parent-relative candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HierarchySelection {
    slots: [Option<usize>; HierarchyLevel::COUNT],
}

impl HierarchySelection {
    pub fn get(&self, level: HierarchyLevel) -> Option<usize> {
        self.slots[level.index()]
    }

    pub fn set(&mut self, level: HierarchyLevel, index: usize) {
        self.slots[level.index()] = Some(index);
    }

    /// Clear `level` and every deeper level.
    pub fn clear_from(&mut self, level: HierarchyLevel) {
        for slot in &mut self.slots[level.index()..] {
            *slot = None;
        }
    }

    /// Deepest level reached through an unbroken run of selections.
    pub fn deepest_contiguous(&self, limit: HierarchyLevel) -> Option<HierarchyLevel> {
        let mut deepest = None;
        for level in HierarchyLevel::ALL.into_iter().take(limit.index() + 1) {
            if self.get(level).is_none() {
                break;
            }
            deepest = Some(level);
        }
        deepest
    }
}

/// Placeholder state a presentation layer renders per level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HierarchyLevelState {
    NotSelected,
    /// Selected but not built yet (or built for an older selection).
    Pending { index: usize },
    Built { index: usize },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HierarchyStateMachine {
    open_level: Option<HierarchyLevel>,
    selections: HierarchySelection,
    last_applied: HierarchySelection,
    pillars: [Option<Pillar>; HierarchyLevel::COUNT],
}

impl HierarchyStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_level(&self) -> Option<HierarchyLevel> {
        self.open_level
    }

    pub fn selections(&self) -> &HierarchySelection {
        &self.selections
    }

    pub fn last_applied(&self) -> &HierarchySelection {
        &self.last_applied
    }

    /// Record a choice. Nothing is rebuilt until `open`.
    pub fn select(&mut self, level: HierarchyLevel, index: usize) {
        log::debug!("hierarchy: select {} -> {}", level.name(), index);
        self.selections.set(level, index);
    }

    pub fn pillar(&self, level: HierarchyLevel) -> Option<&Pillar> {
        self.pillars[level.index()].as_ref()
    }

    pub fn active_pillars(&self) -> impl Iterator<Item = &Pillar> {
        self.pillars.iter().flatten()
    }

    /// `Built` only while this level and every ancestor still match the
    /// choices their pillars were built from.
    pub fn level_state(&self, level: HierarchyLevel) -> HierarchyLevelState {
        match self.selections.get(level) {
            None => HierarchyLevelState::NotSelected,
            Some(index) => {
                let chain_current = HierarchyLevel::ALL[..=level.index()]
                    .iter()
                    .all(|l| self.is_current(*l));
                if chain_current {
                    HierarchyLevelState::Built { index }
                } else {
                    HierarchyLevelState::Pending { index }
                }
            }
        }
    }

    fn is_current(&self, level: HierarchyLevel) -> bool {
        self.pillars[level.index()].is_some()
            && self.selections.get(level) == self.last_applied.get(level)
    }

    fn clear_built_from(&mut self, level: HierarchyLevel) {
        for slot in &mut self.pillars[level.index()..] {
            *slot = None;
        }
        self.last_applied.clear_from(level);
    }

    /// Open up to `level`, rebuilding stale levels.
    ///
    /// Opens only as deep as the selections allow and returns the level that
    /// ended up open. Never fails for missing selections.
    pub fn open<S: CandidateSource + ?Sized>(
        &mut self,
        level: HierarchyLevel,
        source: &S,
        builder: &PillarBuilder,
    ) -> Option<HierarchyLevel> {
        let target = self.selections.deepest_contiguous(level);

        let Some(target) = target else {
            if self.open_level.is_some() {
                log::info!("hierarchy: no decade selection, collapsing");
            }
            self.clear_built_from(HierarchyLevel::DecadePeriod);
            self.open_level = None;
            return None;
        };
        if target < level {
            log::debug!(
                "hierarchy: {} requested, {} is the deepest selection",
                level.name(),
                target.name()
            );
        }

        let first_stale = HierarchyLevel::ALL
            .into_iter()
            .take(target.index() + 1)
            .find(|l| !self.is_current(*l));

        if first_stale.is_none() && self.open_level == Some(target) {
            return self.open_level;
        }

        // Levels below the target are dropped even when current.
        if let Some(deeper) = target.child() {
            self.clear_built_from(deeper);
        }

        let Some(start) = first_stale else {
            log::info!("hierarchy: open {} (no rebuild)", target.name());
            self.open_level = Some(target);
            return self.open_level;
        };

        if self.open_level.map_or(false, |open| open >= start) {
            log::info!(
                "hierarchy: selection at {} changed, rebuilding from there",
                start.name()
            );
        }
        self.clear_built_from(start);

        let mut reached = start.parent();
        for current in HierarchyLevel::ALL[start.index()..=target.index()].iter().copied() {
            if !self.build_level(current, source, builder) {
                break;
            }
            reached = Some(current);
        }

        self.open_level = reached;
        log::info!(
            "hierarchy: open {}",
            reached.map_or("none", |l| l.name())
        );
        self.open_level
    }

    fn build_level<S: CandidateSource + ?Sized>(
        &mut self,
        level: HierarchyLevel,
        source: &S,
        builder: &PillarBuilder,
    ) -> bool {
        let Some(index) = self.selections.get(level) else {
            return false;
        };
        let parent_role = match level.parent() {
            Some(parent) => match self.pillar(parent).and_then(|p| p.extension()) {
                Some(role) => Some(*role),
                None => return false,
            },
            None => None,
        };
        let candidates = source.candidates(level, parent_role.as_ref());
        let Some(candidate) = candidates.get(index) else {
            log::warn!(
                "hierarchy: selection {} out of range for {} ({} candidates)",
                index,
                level.name(),
                candidates.len()
            );
            return false;
        };
        let pillar = builder.build(candidate.ganzhi, PillarRole::Extension(candidate.role));
        log::debug!("hierarchy: built {}", pillar.label);
        self.pillars[level.index()] = Some(pillar);
        self.last_applied.set(level, index);
        true
    }

    /// Drop `level` and everything deeper, selections included.
    pub fn close(&mut self, level: HierarchyLevel) {
        self.selections.clear_from(level);
        self.clear_built_from(level);
        let parent = level.parent();
        self.open_level = match (self.open_level, parent) {
            (Some(open), Some(p)) => Some(open.min(p)),
            _ => None,
        };
        log::info!(
            "hierarchy: close {}, open level now {}",
            level.name(),
            self.open_level.map_or("none", |l| l.name())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Stem;
    use chrono::{Datelike, NaiveDate};

    /// Deterministic source: each level steps the parent's pair by a
    /// level-specific stride, with a fixed candidate count per level.
    struct StrideSource;

    fn role_for(level: HierarchyLevel, n: usize, seed: i32) -> ExtensionRole {
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
            + chrono::Duration::days(seed.rem_euclid(1000) as i64 + n as i64);
        match level {
            HierarchyLevel::DecadePeriod => ExtensionRole::DecadePeriod {
                index: n,
                start_age: 10 * n as u32,
                end_age: 10 * n as u32 + 9,
                start_year: 2000 + 10 * n as i32,
            },
            HierarchyLevel::Year => ExtensionRole::YearInPeriod {
                year: seed + n as i32,
                age: n as i32,
            },
            HierarchyLevel::Month => ExtensionRole::MonthInYear {
                year: seed,
                index: n,
                start: date,
                end: date,
            },
            HierarchyLevel::Day => ExtensionRole::DayInMonth { date },
            HierarchyLevel::Hour => ExtensionRole::HourInDay { date, index: n },
        }
    }

    fn seed_of(role: &ExtensionRole) -> i32 {
        match role {
            ExtensionRole::DecadePeriod { start_year, .. } => *start_year,
            ExtensionRole::YearInPeriod { year, .. } => *year,
            ExtensionRole::MonthInYear { year, index, .. } => *year * 12 + *index as i32,
            ExtensionRole::DayInMonth { date } => date.num_days_from_ce(),
            ExtensionRole::HourInDay { index, .. } => *index as i32,
        }
    }

    impl CandidateSource for StrideSource {
        fn candidates(
            &self,
            level: HierarchyLevel,
            parent: Option<&ExtensionRole>,
        ) -> Vec<Candidate> {
            let seed = parent.map_or(0, seed_of);
            (0..6)
                .map(|n| Candidate {
                    ganzhi: GanZhi::from_cycle_index(
                        (seed.rem_euclid(60) as usize + n * (level.index() + 1)) % 60,
                    ),
                    role: role_for(level, n, seed),
                })
                .collect()
        }
    }

    fn builder() -> PillarBuilder {
        PillarBuilder::new(Stem::Jia)
    }

    #[test]
    fn test_level_order_and_links() {
        assert!(HierarchyLevel::DecadePeriod < HierarchyLevel::Hour);
        assert_eq!(HierarchyLevel::DecadePeriod.parent(), None);
        assert_eq!(HierarchyLevel::Day.parent(), Some(HierarchyLevel::Month));
        assert_eq!(HierarchyLevel::Hour.child(), None);
    }

    #[test]
    fn test_open_without_selection_is_none() {
        let mut m = HierarchyStateMachine::new();
        assert_eq!(m.open(HierarchyLevel::Day, &StrideSource, &builder()), None);
        assert_eq!(m.open_level(), None);
        assert_eq!(m.level_state(HierarchyLevel::Day), HierarchyLevelState::NotSelected);
    }

    #[test]
    fn test_open_stops_at_deepest_selection() {
        let mut m = HierarchyStateMachine::new();
        m.select(HierarchyLevel::DecadePeriod, 1);
        m.select(HierarchyLevel::Month, 2);
        let opened = m.open(HierarchyLevel::Day, &StrideSource, &builder());
        assert_eq!(opened, Some(HierarchyLevel::DecadePeriod));
        assert!(m.pillar(HierarchyLevel::DecadePeriod).is_some());
        assert!(m.pillar(HierarchyLevel::Month).is_none());
        assert_eq!(
            m.level_state(HierarchyLevel::Month),
            HierarchyLevelState::Pending { index: 2 }
        );
    }

    #[test]
    fn test_out_of_range_selection_is_benign() {
        let mut m = HierarchyStateMachine::new();
        m.select(HierarchyLevel::DecadePeriod, 0);
        m.select(HierarchyLevel::Year, 99);
        let opened = m.open(HierarchyLevel::Year, &StrideSource, &builder());
        assert_eq!(opened, Some(HierarchyLevel::DecadePeriod));
        assert!(m.pillar(HierarchyLevel::Year).is_none());
    }

    #[test]
    fn test_reopen_is_noop() {
        let mut m = HierarchyStateMachine::new();
        m.select(HierarchyLevel::DecadePeriod, 0);
        m.select(HierarchyLevel::Year, 3);
        m.open(HierarchyLevel::Year, &StrideSource, &builder());
        let before = m.pillar(HierarchyLevel::Year).cloned();
        let snapshot = *m.last_applied();
        assert_eq!(
            m.open(HierarchyLevel::Year, &StrideSource, &builder()),
            Some(HierarchyLevel::Year)
        );
        assert_eq!(m.pillar(HierarchyLevel::Year).cloned(), before);
        assert_eq!(*m.last_applied(), snapshot);
        assert_eq!(
            m.level_state(HierarchyLevel::Year),
            HierarchyLevelState::Built { index: 3 }
        );
    }

    #[test]
    fn test_shallow_change_rebuilds_chain() {
        let mut m = HierarchyStateMachine::new();
        for level in HierarchyLevel::ALL {
            m.select(level, 1);
        }
        assert_eq!(
            m.open(HierarchyLevel::Hour, &StrideSource, &builder()),
            Some(HierarchyLevel::Hour)
        );
        let before: Vec<Pillar> = m.active_pillars().cloned().collect();
        assert_eq!(before.len(), 5);

        m.select(HierarchyLevel::DecadePeriod, 2);
        assert_eq!(m.open_level(), Some(HierarchyLevel::Hour));
        assert_eq!(
            m.level_state(HierarchyLevel::DecadePeriod),
            HierarchyLevelState::Pending { index: 2 }
        );
        m.open(HierarchyLevel::Hour, &StrideSource, &builder());
        assert_eq!(
            m.level_state(HierarchyLevel::Hour),
            HierarchyLevelState::Built { index: 1 }
        );
        let after: Vec<Pillar> = m.active_pillars().cloned().collect();
        assert_eq!(after.len(), 5);
        for (old, new) in before.iter().zip(&after) {
            assert_ne!(old, new);
        }
    }

    #[test]
    fn test_ancestor_change_marks_descendants_pending() {
        let mut m = HierarchyStateMachine::new();
        for level in HierarchyLevel::ALL {
            m.select(level, 1);
        }
        m.open(HierarchyLevel::Hour, &StrideSource, &builder());
        for level in HierarchyLevel::ALL {
            assert_eq!(m.level_state(level), HierarchyLevelState::Built { index: 1 });
        }

        m.select(HierarchyLevel::DecadePeriod, 3);
        assert_eq!(
            m.level_state(HierarchyLevel::DecadePeriod),
            HierarchyLevelState::Pending { index: 3 }
        );
        for level in &HierarchyLevel::ALL[1..] {
            assert_eq!(m.level_state(*level), HierarchyLevelState::Pending { index: 1 });
        }

        // A change in the middle leaves ancestors built.
        m.open(HierarchyLevel::Hour, &StrideSource, &builder());
        m.select(HierarchyLevel::Month, 4);
        assert_eq!(
            m.level_state(HierarchyLevel::Year),
            HierarchyLevelState::Built { index: 1 }
        );
        assert_eq!(
            m.level_state(HierarchyLevel::Day),
            HierarchyLevelState::Pending { index: 1 }
        );
    }

    #[test]
    fn test_open_shallower_drops_deeper_pillars() {
        let mut m = HierarchyStateMachine::new();
        for level in HierarchyLevel::ALL {
            m.select(level, 0);
        }
        m.open(HierarchyLevel::Hour, &StrideSource, &builder());
        assert_eq!(
            m.open(HierarchyLevel::Month, &StrideSource, &builder()),
            Some(HierarchyLevel::Month)
        );
        assert!(m.pillar(HierarchyLevel::Day).is_none());
        assert_eq!(m.selections().get(HierarchyLevel::Day), Some(0));
        assert_eq!(
            m.open(HierarchyLevel::Hour, &StrideSource, &builder()),
            Some(HierarchyLevel::Hour)
        );
    }

    #[test]
    fn test_close_collapses_descendants() {
        let mut m = HierarchyStateMachine::new();
        for level in HierarchyLevel::ALL {
            m.select(level, 0);
        }
        m.open(HierarchyLevel::Hour, &StrideSource, &builder());
        m.close(HierarchyLevel::Month);
        assert_eq!(m.open_level(), Some(HierarchyLevel::Year));
        assert_eq!(m.active_pillars().count(), 2);
        assert_eq!(m.selections().get(HierarchyLevel::Hour), None);
        assert_eq!(m.level_state(HierarchyLevel::Month), HierarchyLevelState::NotSelected);

        m.close(HierarchyLevel::DecadePeriod);
        assert_eq!(m.open_level(), None);
        assert_eq!(m.active_pillars().count(), 0);
    }

    #[test]
    fn test_close_deeper_than_open_keeps_open_level() {
        let mut m = HierarchyStateMachine::new();
        m.select(HierarchyLevel::DecadePeriod, 0);
        m.select(HierarchyLevel::Year, 0);
        m.open(HierarchyLevel::Year, &StrideSource, &builder());
        m.close(HierarchyLevel::Hour);
        assert_eq!(m.open_level(), Some(HierarchyLevel::Year));
    }
}
