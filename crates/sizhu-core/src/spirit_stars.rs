//! Spirit stars (神煞), a subset keyed on stems and branch triads.
//!
//! Stem-keyed stars look up the day stem and the year stem. Branch-keyed
//! stars look up the year branch and the day branch.

use serde::{Deserialize, Serialize};

use crate::symbols::{Branch, Stem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpiritStar {
    Nobleman,
    Prosperity,
    Blade,
    Academic,
    PeachBlossom,
    Canopy,
    TravelHorse,
    GeneralStar,
}

impl SpiritStar {
    pub fn name(&self) -> &'static str {
        match self {
            SpiritStar::Nobleman => "天乙贵人",
            SpiritStar::Prosperity => "禄神",
            SpiritStar::Blade => "羊刃",
            SpiritStar::Academic => "文昌",
            SpiritStar::PeachBlossom => "桃花",
            SpiritStar::Canopy => "华盖",
            SpiritStar::TravelHorse => "驿马",
            SpiritStar::GeneralStar => "将星",
        }
    }
}

fn nobleman(stem: Stem) -> [Branch; 2] {
    match stem {
        Stem::Jia | Stem::Wu | Stem::Geng => [Branch::Chou, Branch::Wei],
        Stem::Yi | Stem::Ji => [Branch::Zi, Branch::Shen],
        Stem::Bing | Stem::Ding => [Branch::Hai, Branch::You],
        Stem::Ren | Stem::Gui => [Branch::Si, Branch::Mao],
        Stem::Xin => [Branch::Wu, Branch::Yin],
    }
}

fn prosperity(stem: Stem) -> Branch {
    match stem {
        Stem::Jia => Branch::Yin,
        Stem::Yi => Branch::Mao,
        Stem::Bing | Stem::Wu => Branch::Si,
        Stem::Ding | Stem::Ji => Branch::Wu,
        Stem::Geng => Branch::Shen,
        Stem::Xin => Branch::You,
        Stem::Ren => Branch::Hai,
        Stem::Gui => Branch::Zi,
    }
}

fn blade(stem: Stem) -> Branch {
    match stem {
        Stem::Jia => Branch::Mao,
        Stem::Yi => Branch::Yin,
        Stem::Bing | Stem::Wu => Branch::Wu,
        Stem::Ding | Stem::Ji => Branch::Si,
        Stem::Geng => Branch::You,
        Stem::Xin => Branch::Shen,
        Stem::Ren => Branch::Zi,
        Stem::Gui => Branch::Hai,
    }
}

fn academic(stem: Stem) -> Branch {
    match stem {
        Stem::Jia | Stem::Yi => Branch::Si,
        Stem::Bing | Stem::Ding | Stem::Wu | Stem::Ji => Branch::Shen,
        Stem::Geng | Stem::Xin => Branch::Hai,
        Stem::Ren | Stem::Gui => Branch::Yin,
    }
}

/// Triad-keyed stars: (peach blossom, canopy, travel horse, general star).
fn triad_stars(key: Branch) -> [(SpiritStar, Branch); 4] {
    let (peach, canopy, horse, general) = match key {
        Branch::Yin | Branch::Wu | Branch::Xu => (Branch::Mao, Branch::Xu, Branch::Shen, Branch::Wu),
        Branch::Shen | Branch::Zi | Branch::Chen => {
            (Branch::You, Branch::Chen, Branch::Yin, Branch::Zi)
        }
        Branch::Si | Branch::You | Branch::Chou => {
            (Branch::Wu, Branch::Chou, Branch::Hai, Branch::You)
        }
        Branch::Hai | Branch::Mao | Branch::Wei => {
            (Branch::Zi, Branch::Wei, Branch::Si, Branch::Mao)
        }
    };
    [
        (SpiritStar::PeachBlossom, peach),
        (SpiritStar::Canopy, canopy),
        (SpiritStar::TravelHorse, horse),
        (SpiritStar::GeneralStar, general),
    ]
}

/// Chart keys the stars are looked up from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarKeys {
    pub day_stem: Stem,
    pub year_stem: Stem,
    pub year_branch: Branch,
    pub day_branch: Branch,
}

/// Stars present on `branch`, sorted and deduplicated.
pub fn spirit_stars(keys: &StarKeys, branch: Branch) -> Vec<SpiritStar> {
    let mut stars = Vec::new();
    for stem in [keys.day_stem, keys.year_stem] {
        if nobleman(stem).contains(&branch) {
            stars.push(SpiritStar::Nobleman);
        }
    }
    if prosperity(keys.day_stem) == branch {
        stars.push(SpiritStar::Prosperity);
    }
    if keys.day_stem.is_yang() && blade(keys.day_stem) == branch {
        stars.push(SpiritStar::Blade);
    }
    for stem in [keys.day_stem, keys.year_stem] {
        if academic(stem) == branch {
            stars.push(SpiritStar::Academic);
        }
    }
    for key in [keys.year_branch, keys.day_branch] {
        for (star, target) in triad_stars(key) {
            if target == branch {
                stars.push(star);
            }
        }
    }
    stars.sort();
    stars.dedup();
    stars
}
