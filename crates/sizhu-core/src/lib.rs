//! Sizhu core: four-pillar stem-branch charts.
//!
//! Converts a birth record into the four base pillars, derives per-pillar
//! attributes (hidden stems, role labels, life stages, sound elements, void
//! branches, spirit stars), extends the chart through the nested period
//! hierarchy (decade > year > month > day > hour) and scores the five
//! elements over the active pillar set. Branch clashes, punishments and
//! harms, minor luck and year-pillar matching sit alongside.
//!
//! Everything is synchronous and owned by one [`Chart`] per session.

#![allow(clippy::new_without_default)]

pub mod auxiliary;
pub mod calendar;
pub mod chart;
pub mod config;
pub mod cycle;
pub mod error;
pub mod hidden_stems;
pub mod hierarchy;
pub mod life_stage;
pub mod nayin;
pub mod periods;
pub mod pillar;
pub mod relations;
pub mod role_label;
pub mod scoring;
pub mod spirit_stars;
pub mod symbols;

#[cfg(test)]
pub mod tests_config;
#[cfg(test)]
pub mod tests_proptest;

// ============================================================================
// PUBLIC SURFACE
// ============================================================================

pub use calendar::{
    closest_matching_year, matching_years, ApproximateSolarTerms, BirthRecord, FourPillars,
    Gender, LateRatConvention, SolarTermCalendar, StartAge,
};
pub use chart::{Chart, Fingerprint};
pub use config::{
    CalendarConfig, CombinationBonuses, ConfigError, RoleWeights, ScoringConfig, SeasonalDeltas,
    SizhuConfig,
};
pub use cycle::GanZhi;
pub use error::ChartError;
pub use hidden_stems::HiddenStem;
pub use hierarchy::{
    Candidate, CandidateSource, HierarchyLevel, HierarchyLevelState, HierarchySelection,
    HierarchyStateMachine,
};
pub use life_stage::LifeStage;
pub use nayin::SoundElement;
pub use periods::{MinorLuck, PeriodResolver};
pub use pillar::{AuxiliaryRole, BaseRole, ExtensionRole, Pillar, PillarBuilder, PillarRole};
pub use relations::{BranchRelation, PillarRelation, RelationHit};
pub use role_label::{RoleLabel, StemRole};
pub use scoring::{
    DayMasterStrength, ElementScore, ElementScores, ElementalStrengthScorer, ScoreComponents,
};
pub use spirit_stars::SpiritStar;
pub use symbols::{Branch, Element, Polarity, Season, Stem};
