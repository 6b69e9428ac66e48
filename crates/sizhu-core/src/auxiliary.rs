//! Auxiliary positions computed from the base pillars.

use crate::calendar::{month_pillar, FourPillars};
use crate::cycle::GanZhi;
use crate::pillar::AuxiliaryRole;

/// 胎元: month stem +1, month branch +3.
pub fn conception(pillars: &FourPillars) -> GanZhi {
    GanZhi::new_unchecked(pillars.month.stem.offset(1), pillars.month.branch.offset(3))
}

/// 胎息: day stem +5 with the six-harmony partner of the day branch.
pub fn breath(pillars: &FourPillars) -> GanZhi {
    GanZhi::new_unchecked(pillars.day.stem.offset(5), pillars.day.branch.six_harmony().0)
}

/// 命宫, counted on month ordinals (寅 = 1 .. 丑 = 12).
pub fn life_palace(pillars: &FourPillars) -> GanZhi {
    let sum = pillars.month.branch.month_ordinal() + pillars.hour.branch.month_ordinal();
    let ordinal = if sum >= 14 { 26 - sum } else { 14 - sum };
    palace(pillars, ordinal)
}

/// 身宫, counted on month ordinals.
pub fn body_palace(pillars: &FourPillars) -> GanZhi {
    let sum = pillars.month.branch.month_ordinal() + pillars.hour.branch.month_ordinal();
    palace(pillars, (sum - 1) % 12 + 1)
}

/// Palace stems come from the year stem through the five-tiger rule.
fn palace(pillars: &FourPillars, ordinal: usize) -> GanZhi {
    month_pillar(pillars.year.stem, ordinal - 1)
}

pub fn auxiliary_positions(pillars: &FourPillars) -> [(AuxiliaryRole, GanZhi); 4] {
    [
        (AuxiliaryRole::Conception, conception(pillars)),
        (AuxiliaryRole::Breath, breath(pillars)),
        (AuxiliaryRole::LifePalace, life_palace(pillars)),
        (AuxiliaryRole::BodyPalace, body_palace(pillars)),
    ]
}
