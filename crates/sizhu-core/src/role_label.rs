//! Role labels (十神) relative to a reference stem, normally the day stem.

use serde::{Deserialize, Serialize};

use crate::hidden_stems::hidden_stems;
use crate::symbols::{Branch, Stem};

/// Element relationship of the target as seen from the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relationship {
    /// Same element.
    Peer,
    /// Reference produces target.
    Output,
    /// Reference restrains target.
    Wealth,
    /// Target restrains reference.
    Authority,
    /// Target produces reference.
    Resource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleLabel {
    Companion,
    RobWealth,
    EatingGod,
    HurtingOfficer,
    IndirectWealth,
    DirectWealth,
    SevenKillings,
    DirectOfficer,
    IndirectResource,
    DirectResource,
}

impl RoleLabel {
    pub const COUNT: usize = 10;

    pub const ALL: [RoleLabel; 10] = [
        RoleLabel::Companion,
        RoleLabel::RobWealth,
        RoleLabel::EatingGod,
        RoleLabel::HurtingOfficer,
        RoleLabel::IndirectWealth,
        RoleLabel::DirectWealth,
        RoleLabel::SevenKillings,
        RoleLabel::DirectOfficer,
        RoleLabel::IndirectResource,
        RoleLabel::DirectResource,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Identifying name for the external knowledge base.
    pub fn name(&self) -> &'static str {
        match self {
            RoleLabel::Companion => "比肩",
            RoleLabel::RobWealth => "劫财",
            RoleLabel::EatingGod => "食神",
            RoleLabel::HurtingOfficer => "伤官",
            RoleLabel::IndirectWealth => "偏财",
            RoleLabel::DirectWealth => "正财",
            RoleLabel::SevenKillings => "七杀",
            RoleLabel::DirectOfficer => "正官",
            RoleLabel::IndirectResource => "偏印",
            RoleLabel::DirectResource => "正印",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.name() == name)
    }

    pub fn relationship(&self) -> Relationship {
        match self {
            RoleLabel::Companion | RoleLabel::RobWealth => Relationship::Peer,
            RoleLabel::EatingGod | RoleLabel::HurtingOfficer => Relationship::Output,
            RoleLabel::IndirectWealth | RoleLabel::DirectWealth => Relationship::Wealth,
            RoleLabel::SevenKillings | RoleLabel::DirectOfficer => Relationship::Authority,
            RoleLabel::IndirectResource | RoleLabel::DirectResource => Relationship::Resource,
        }
    }

    /// Same-polarity labels are the "indirect" half of each category.
    pub fn same_polarity(&self) -> bool {
        self.index() % 2 == 0
    }
}

/// Label carried by a pillar's own stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StemRole {
    /// The reference stem itself on the day pillar (日主).
    DayMaster,
    Label(RoleLabel),
}

impl StemRole {
    pub fn name(&self) -> &'static str {
        match self {
            StemRole::DayMaster => "日主",
            StemRole::Label(l) => l.name(),
        }
    }
}

pub fn relationship(reference: Stem, target: Stem) -> Relationship {
    let r = reference.element();
    let t = target.element();
    if r == t {
        Relationship::Peer
    } else if r.produces() == t {
        Relationship::Output
    } else if r.restrains() == t {
        Relationship::Wealth
    } else if t.restrains() == r {
        Relationship::Authority
    } else {
        Relationship::Resource
    }
}

pub fn resolve(reference: Stem, target: Stem) -> RoleLabel {
    let same = reference.polarity() == target.polarity();
    let base = match relationship(reference, target) {
        Relationship::Peer => 0,
        Relationship::Output => 2,
        Relationship::Wealth => 4,
        Relationship::Authority => 6,
        Relationship::Resource => 8,
    };
    RoleLabel::ALL[base + usize::from(!same)]
}

/// One label per hidden stem, in hidden-stem order.
pub fn resolve_branch(reference: Stem, branch: Branch) -> Vec<RoleLabel> {
    hidden_stems(branch)
        .iter()
        .map(|h| resolve(reference, h.stem))
        .collect()
}

/// Text-keyed lookup; unknown symbols yield an empty label.
pub fn resolve_by_symbol(reference: &str, target: &str) -> &'static str {
    match (reference.parse::<Stem>(), target.parse::<Stem>()) {
        (Ok(r), Ok(t)) => resolve(r, t).name(),
        _ => "",
    }
}
