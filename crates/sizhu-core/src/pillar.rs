//! Pillar records and the builder that derives their attributes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cycle::GanZhi;
use crate::error::Result;
use crate::hidden_stems::{hidden_stems, HiddenStem};
use crate::hierarchy::HierarchyLevel;
use crate::life_stage::{life_stage, LifeStage};
use crate::nayin::{sound_element, SoundElement};
use crate::role_label::{resolve, resolve_branch, RoleLabel, StemRole};
use crate::spirit_stars::{spirit_stars, SpiritStar, StarKeys};
use crate::symbols::{Branch, Stem};

// ============================================================================
// ROLES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseRole {
    Year,
    Month,
    Day,
    Hour,
}

impl BaseRole {
    pub const ALL: [BaseRole; 4] = [BaseRole::Year, BaseRole::Month, BaseRole::Day, BaseRole::Hour];

    pub fn name(&self) -> &'static str {
        match self {
            BaseRole::Year => "年柱",
            BaseRole::Month => "月柱",
            BaseRole::Day => "日柱",
            BaseRole::Hour => "时柱",
        }
    }
}

/// Pillars opened through the period hierarchy, with their time span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtensionRole {
    DecadePeriod {
        index: usize,
        start_age: u32,
        end_age: u32,
        start_year: i32,
    },
    YearInPeriod {
        year: i32,
        age: i32,
    },
    MonthInYear {
        year: i32,
        index: usize,
        start: NaiveDate,
        end: NaiveDate,
    },
    DayInMonth {
        date: NaiveDate,
    },
    HourInDay {
        date: NaiveDate,
        index: usize,
    },
}

impl ExtensionRole {
    pub fn level(&self) -> HierarchyLevel {
        match self {
            ExtensionRole::DecadePeriod { .. } => HierarchyLevel::DecadePeriod,
            ExtensionRole::YearInPeriod { .. } => HierarchyLevel::Year,
            ExtensionRole::MonthInYear { .. } => HierarchyLevel::Month,
            ExtensionRole::DayInMonth { .. } => HierarchyLevel::Day,
            ExtensionRole::HourInDay { .. } => HierarchyLevel::Hour,
        }
    }

    fn title(&self) -> String {
        match self {
            ExtensionRole::DecadePeriod {
                start_age, end_age, ..
            } => format!("大运 {}-{}岁", start_age, end_age),
            ExtensionRole::YearInPeriod { year, .. } => format!("流年 {}", year),
            ExtensionRole::MonthInYear { start, .. } => format!("流月 {}", start.format("%Y-%m")),
            ExtensionRole::DayInMonth { date } => format!("流日 {}", date.format("%m-%d")),
            ExtensionRole::HourInDay { index, .. } => {
                let branch = Branch::Zi.offset(*index as i64);
                format!("流时 {}时", branch)
            }
        }
    }
}

/// Positions derived from the base pillars by offset rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuxiliaryRole {
    /// 胎元
    Conception,
    /// 胎息
    Breath,
    /// 命宫
    LifePalace,
    /// 身宫
    BodyPalace,
}

impl AuxiliaryRole {
    pub const ALL: [AuxiliaryRole; 4] = [
        AuxiliaryRole::Conception,
        AuxiliaryRole::Breath,
        AuxiliaryRole::LifePalace,
        AuxiliaryRole::BodyPalace,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AuxiliaryRole::Conception => "胎元",
            AuxiliaryRole::Breath => "胎息",
            AuxiliaryRole::LifePalace => "命宫",
            AuxiliaryRole::BodyPalace => "身宫",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PillarRole {
    Base(BaseRole),
    Extension(ExtensionRole),
    Auxiliary(AuxiliaryRole),
}

impl PillarRole {
    pub fn is_day(&self) -> bool {
        matches!(self, PillarRole::Base(BaseRole::Day))
    }

    pub fn title(&self) -> String {
        match self {
            PillarRole::Base(b) => b.name().to_string(),
            PillarRole::Extension(e) => e.title(),
            PillarRole::Auxiliary(a) => a.name().to_string(),
        }
    }
}

// ============================================================================
// PILLAR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pillar {
    pub role: PillarRole,
    pub ganzhi: GanZhi,
    pub hidden_stems: Vec<HiddenStem>,
    pub stem_role: StemRole,
    /// One label per hidden stem.
    pub hidden_roles: Vec<RoleLabel>,
    /// Day stem on this branch (地势).
    pub terrain: LifeStage,
    /// Own stem on own branch (自坐).
    pub self_seated: LifeStage,
    pub sound_element: Option<SoundElement>,
    pub void_branches: (Branch, Branch),
    pub spirit_stars: Vec<SpiritStar>,
    pub label: String,
}

impl Pillar {
    pub fn stem(&self) -> Stem {
        self.ganzhi.stem
    }

    pub fn branch(&self) -> Branch {
        self.ganzhi.branch
    }

    pub fn extension(&self) -> Option<&ExtensionRole> {
        match &self.role {
            PillarRole::Extension(e) => Some(e),
            _ => None,
        }
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Composes the derived attributes relative to one day stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PillarBuilder {
    day_stem: Stem,
    star_keys: Option<StarKeys>,
}

impl PillarBuilder {
    pub fn new(day_stem: Stem) -> Self {
        Self {
            day_stem,
            star_keys: None,
        }
    }

    pub fn with_star_keys(mut self, keys: StarKeys) -> Self {
        self.star_keys = Some(keys);
        self
    }

    pub fn day_stem(&self) -> Stem {
        self.day_stem
    }

    pub fn build(&self, ganzhi: GanZhi, role: PillarRole) -> Pillar {
        let GanZhi { stem, branch } = ganzhi;
        let stem_role = if role.is_day() {
            StemRole::DayMaster
        } else {
            StemRole::Label(resolve(self.day_stem, stem))
        };
        let stars = match &self.star_keys {
            Some(keys) => spirit_stars(keys, branch),
            None => Vec::new(),
        };
        Pillar {
            role,
            ganzhi,
            hidden_stems: hidden_stems(branch).to_vec(),
            stem_role,
            hidden_roles: resolve_branch(self.day_stem, branch),
            terrain: life_stage(self.day_stem, branch),
            self_seated: life_stage(stem, branch),
            sound_element: sound_element(&ganzhi),
            void_branches: ganzhi.void_branches(),
            spirit_stars: stars,
            label: format!("{} {}", role.title(), ganzhi),
        }
    }

    /// Build from raw text such as "甲子".
    pub fn build_str(&self, text: &str, role: PillarRole) -> Result<Pillar> {
        let ganzhi: GanZhi = text.parse()?;
        Ok(self.build(ganzhi, role))
    }
}
