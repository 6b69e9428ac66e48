//! Twelve life stages (十二长生).
//!
//! Each stem starts its cycle at a fixed branch. Yang stems walk the branch
//! order forward, yin stems walk it backward. The lookup is total over all
//! 120 stem/branch combinations.

use serde::{Deserialize, Serialize};

use crate::symbols::{Branch, Stem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LifeStage {
    Birth,
    Bath,
    Capping,
    Office,
    Peak,
    Decline,
    Sickness,
    Death,
    Tomb,
    Extinction,
    Conceived,
    Nurture,
}

impl LifeStage {
    pub const COUNT: usize = 12;

    pub const ALL: [LifeStage; 12] = [
        LifeStage::Birth,
        LifeStage::Bath,
        LifeStage::Capping,
        LifeStage::Office,
        LifeStage::Peak,
        LifeStage::Decline,
        LifeStage::Sickness,
        LifeStage::Death,
        LifeStage::Tomb,
        LifeStage::Extinction,
        LifeStage::Conceived,
        LifeStage::Nurture,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            LifeStage::Birth => "长生",
            LifeStage::Bath => "沐浴",
            LifeStage::Capping => "冠带",
            LifeStage::Office => "临官",
            LifeStage::Peak => "帝旺",
            LifeStage::Decline => "衰",
            LifeStage::Sickness => "病",
            LifeStage::Death => "死",
            LifeStage::Tomb => "墓",
            LifeStage::Extinction => "绝",
            LifeStage::Conceived => "胎",
            LifeStage::Nurture => "养",
        }
    }

    /// Birth through Peak.
    pub fn is_rising(&self) -> bool {
        self.index() <= LifeStage::Peak.index()
    }
}

/// Branch at which `stem` enters `LifeStage::Birth`.
pub fn stage_zero(stem: Stem) -> Branch {
    match stem {
        Stem::Jia => Branch::Hai,
        Stem::Yi => Branch::Wu,
        Stem::Bing | Stem::Wu => Branch::Yin,
        Stem::Ding | Stem::Ji => Branch::You,
        Stem::Geng => Branch::Si,
        Stem::Xin => Branch::Zi,
        Stem::Ren => Branch::Shen,
        Stem::Gui => Branch::Mao,
    }
}

/// +1 for yang stems, -1 for yin stems.
pub fn direction(stem: Stem) -> i64 {
    if stem.is_yang() {
        1
    } else {
        -1
    }
}

pub fn life_stage(stem: Stem, branch: Branch) -> LifeStage {
    let delta = branch.index() as i64 - stage_zero(stem).index() as i64;
    let steps = (direction(stem) * delta).rem_euclid(LifeStage::COUNT as i64);
    LifeStage::ALL[steps as usize]
}

/// 月令 view: each stem evaluated on the month branch.
pub fn month_command(stems: &[Stem], month_branch: Branch) -> Vec<LifeStage> {
    stems.iter().map(|s| life_stage(*s, month_branch)).collect()
}

/// Text-keyed lookup; unknown symbols yield an empty name.
pub fn life_stage_by_symbol(stem: &str, branch: &str) -> &'static str {
    match (stem.parse::<Stem>(), branch.parse::<Branch>()) {
        (Ok(s), Ok(b)) => life_stage(s, b).name(),
        _ => "",
    }
}
