//! Chart session: base pillars, auxiliary positions, the period hierarchy
//! and a score cache. Each chart owns all of its state; charts never share.

use crate::auxiliary::auxiliary_positions;
use crate::calendar::{
    four_pillars, ApproximateSolarTerms, BirthRecord, FourPillars, SolarTermCalendar, StartAge,
};
use crate::config::SizhuConfig;
use crate::error::Result;
use crate::hierarchy::{
    Candidate, CandidateSource, HierarchyLevel, HierarchyLevelState, HierarchyStateMachine,
};
use crate::life_stage::{month_command, LifeStage};
use crate::periods::{MinorLuck, PeriodResolver};
use crate::pillar::{BaseRole, ExtensionRole, Pillar, PillarBuilder, PillarRole};
use crate::relations::{pillar_relations, BranchRelation, PillarRelation};
use crate::scoring::{DayMasterStrength, ElementScores, ElementalStrengthScorer};
use crate::spirit_stars::StarKeys;

/// blake3 digest of everything a score depends on.
pub type Fingerprint = [u8; 32];

/// Candidate source for charts built without a birth record.
struct NoPeriods;

impl CandidateSource for NoPeriods {
    fn candidates(&self, _: HierarchyLevel, _: Option<&ExtensionRole>) -> Vec<Candidate> {
        Vec::new()
    }
}

fn candidate_source(periods: Option<&PeriodResolver>) -> &dyn CandidateSource {
    match periods {
        Some(periods) => periods,
        None => &NoPeriods,
    }
}

pub struct Chart {
    config: SizhuConfig,
    pillars: FourPillars,
    base: Vec<Pillar>,
    auxiliary: Vec<Pillar>,
    builder: PillarBuilder,
    periods: Option<PeriodResolver>,
    hierarchy: HierarchyStateMachine,
    score_cache: Option<(Option<Fingerprint>, ElementScores)>,
}

impl Chart {
    /// Chart from a birth record using mean solar-term dates.
    pub fn from_birth(record: BirthRecord, config: SizhuConfig) -> Result<Self> {
        Self::from_birth_with_calendar(record, Box::new(ApproximateSolarTerms), config)
    }

    pub fn from_birth_with_calendar(
        record: BirthRecord,
        calendar: Box<dyn SolarTermCalendar>,
        config: SizhuConfig,
    ) -> Result<Self> {
        config.validate()?;
        let pillars = four_pillars(&record, calendar.as_ref(), config.calendar.late_rat)?;
        let periods =
            PeriodResolver::new(calendar, record, &pillars, config.calendar.decade_count)?;
        log::info!(
            "chart: {} {} {} {}",
            pillars.year,
            pillars.month,
            pillars.day,
            pillars.hour
        );
        Ok(Self::assemble(pillars, Some(periods), config))
    }

    /// Chart from resolved pairs. The period hierarchy stays empty.
    pub fn from_pillars(pillars: FourPillars, config: SizhuConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(pillars, None, config))
    }

    fn assemble(
        pillars: FourPillars,
        periods: Option<PeriodResolver>,
        config: SizhuConfig,
    ) -> Self {
        let builder = PillarBuilder::new(pillars.day.stem).with_star_keys(StarKeys {
            day_stem: pillars.day.stem,
            year_stem: pillars.year.stem,
            year_branch: pillars.year.branch,
            day_branch: pillars.day.branch,
        });
        let base = BaseRole::ALL
            .iter()
            .zip(pillars.as_array())
            .map(|(role, gz)| builder.build(gz, PillarRole::Base(*role)))
            .collect();
        let auxiliary = auxiliary_positions(&pillars)
            .into_iter()
            .map(|(role, gz)| builder.build(gz, PillarRole::Auxiliary(role)))
            .collect();
        Self {
            config,
            pillars,
            base,
            auxiliary,
            builder,
            periods,
            hierarchy: HierarchyStateMachine::new(),
            score_cache: None,
        }
    }

    pub fn config(&self) -> &SizhuConfig {
        &self.config
    }

    /// Replace the config. Cached scores go stale through the fingerprint.
    pub fn set_config(&mut self, config: SizhuConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn four_pillars(&self) -> &FourPillars {
        &self.pillars
    }

    pub fn base_pillars(&self) -> &[Pillar] {
        &self.base
    }

    pub fn base_pillar(&self, role: BaseRole) -> Option<&Pillar> {
        self.base.iter().find(|p| p.role == PillarRole::Base(role))
    }

    pub fn auxiliary_pillars(&self) -> &[Pillar] {
        &self.auxiliary
    }

    /// Each base stem evaluated on the month branch.
    pub fn month_command(&self) -> Vec<(BaseRole, LifeStage)> {
        let stems: Vec<_> = self.pillars.as_array().iter().map(|gz| gz.stem).collect();
        BaseRole::ALL
            .into_iter()
            .zip(month_command(&stems, self.pillars.month.branch))
            .collect()
    }

    pub fn start_age(&self) -> Option<StartAge> {
        self.periods.as_ref().map(|p| p.start_age())
    }

    /// Minor luck for the first `count` years; empty without a birth record.
    pub fn minor_luck(&self, count: usize) -> Vec<MinorLuck> {
        self.periods
            .as_ref()
            .map(|p| p.minor_luck(count))
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------------
    // Hierarchy
    // ------------------------------------------------------------------------

    /// Candidates for `level` under the currently built parent.
    pub fn candidates(&self, level: HierarchyLevel) -> Vec<Candidate> {
        let parent = match level.parent() {
            None => None,
            Some(parent) => match self.hierarchy.pillar(parent).and_then(|p| p.extension()) {
                Some(role) => Some(*role),
                None => return Vec::new(),
            },
        };
        candidate_source(self.periods.as_ref()).candidates(level, parent.as_ref())
    }

    pub fn select(&mut self, level: HierarchyLevel, index: usize) {
        self.hierarchy.select(level, index);
    }

    pub fn open(&mut self, level: HierarchyLevel) -> Option<HierarchyLevel> {
        let source = candidate_source(self.periods.as_ref());
        self.hierarchy.open(level, source, &self.builder)
    }

    pub fn close(&mut self, level: HierarchyLevel) {
        self.hierarchy.close(level);
    }

    pub fn open_level(&self) -> Option<HierarchyLevel> {
        self.hierarchy.open_level()
    }

    pub fn level_state(&self, level: HierarchyLevel) -> HierarchyLevelState {
        self.hierarchy.level_state(level)
    }

    pub fn extension_pillar(&self, level: HierarchyLevel) -> Option<&Pillar> {
        self.hierarchy.pillar(level)
    }

    pub fn hierarchy(&self) -> &HierarchyStateMachine {
        &self.hierarchy
    }

    /// Base pillars followed by every built extension pillar.
    pub fn active_pillars(&self) -> impl Iterator<Item = &Pillar> {
        self.base.iter().chain(self.hierarchy.active_pillars())
    }

    /// Clashes, punishments and harms among the active pillars.
    pub fn branch_relations(&self) -> Vec<PillarRelation> {
        pillar_relations(self.active_pillars())
    }

    /// Relations the pillar in `role` takes part in.
    pub fn relations_of(&self, role: PillarRole) -> Vec<BranchRelation> {
        self.branch_relations()
            .into_iter()
            .filter(|r| r.roles.contains(&role))
            .map(|r| r.relation)
            .collect()
    }

    // ------------------------------------------------------------------------
    // Scoring
    // ------------------------------------------------------------------------

    /// Digest of the scoring config and the active pillar set.
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&serde_json::to_vec(&self.config.scoring)?);
        for pillar in self.active_pillars() {
            hasher.update(&serde_json::to_vec(&pillar.role)?);
            hasher.update(&[
                pillar.stem().index() as u8,
                pillar.branch().index() as u8,
            ]);
        }
        Ok(*hasher.finalize().as_bytes())
    }

    /// Scores for the active set, reused while the fingerprint is unchanged.
    /// Without a fingerprint the set is rescored and the result never hits.
    pub fn scores(&mut self) -> &ElementScores {
        let fingerprint = match self.fingerprint() {
            Ok(fp) => Some(fp),
            Err(e) => {
                log::warn!("chart: fingerprint failed ({}), scoring uncached", e);
                None
            }
        };
        let scores = match (self.score_cache.take(), fingerprint) {
            (Some((Some(fp), cached)), Some(current)) if fp == current => {
                log::debug!("chart: score cache hit");
                cached
            }
            _ => {
                log::debug!("chart: score cache miss, rescoring");
                ElementalStrengthScorer::new(&self.config.scoring).score(self.active_pillars())
            }
        };
        &self.score_cache.insert((fingerprint, scores)).1
    }

    pub fn day_master_strength(&mut self) -> DayMasterStrength {
        let element = self.pillars.day.stem.element();
        DayMasterStrength::classify(self.scores().get(element).relative_strength)
    }
}
