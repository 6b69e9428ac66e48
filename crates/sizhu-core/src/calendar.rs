//! Civil calendar to stem-branch conversion.
//!
//! Month boundaries follow the twelve sectional terms (节). The exact term
//! instants are an astronomical concern behind [`SolarTermCalendar`];
//! [`ApproximateSolarTerms`] uses their mean civil dates, which is exact to
//! within a day for modern years.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::cycle::{GanZhi, CYCLE_LEN};
use crate::error::{ChartError, Result};
use crate::symbols::{Branch, Stem};

/// Julian day number of 0001-01-01 minus one.
const JDN_CE_OFFSET: i64 = 1_721_425;

/// 1949-10-01 (JDN 2433191) is 甲子.
const DAY_COUNT_OFFSET: i64 = 49;

// ============================================================================
// INPUT RECORDS
// ============================================================================

/// How 23:00-24:00 (late 子 hour) is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateRatConvention {
    /// Day pillar stays on the civil day; the hour stem already follows
    /// the next day.
    SameDay,
    /// Day pillar advances to the next day at 23:00.
    NextDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BirthRecord {
    pub datetime: NaiveDateTime,
    pub gender: Gender,
}

impl BirthRecord {
    pub fn new(datetime: NaiveDateTime, gender: Gender) -> Self {
        Self { datetime, gender }
    }

    /// Validating constructor from civil components.
    pub fn from_civil(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        gender: Gender,
    ) -> Result<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            ChartError::InvalidCalendarInput(format!("no such date {}-{}-{}", year, month, day))
        })?;
        let datetime = date.and_hms_opt(hour, minute, 0).ok_or_else(|| {
            ChartError::InvalidCalendarInput(format!("no such time {}:{}", hour, minute))
        })?;
        Ok(Self { datetime, gender })
    }
}

// ============================================================================
// SOLAR TERMS
// ============================================================================

/// Start dates of the twelve sectional months.
///
/// `month_index` 0 is the 寅 month opening at 立春 of `solar_year`; index 11
/// is the 丑 month opening at 小寒 in January of `solar_year + 1`.
pub trait SolarTermCalendar {
    fn month_start(&self, solar_year: i32, month_index: usize) -> Result<NaiveDate>;
}

/// Mean civil dates of the sectional terms.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateSolarTerms;

impl ApproximateSolarTerms {
    /// (month, day) for 立春 惊蛰 清明 立夏 芒种 小暑 立秋 白露 寒露 立冬 大雪 小寒.
    const TERMS: [(u32, u32); 12] = [
        (2, 4),
        (3, 6),
        (4, 5),
        (5, 6),
        (6, 6),
        (7, 7),
        (8, 8),
        (9, 8),
        (10, 8),
        (11, 7),
        (12, 7),
        (1, 6),
    ];
}

impl SolarTermCalendar for ApproximateSolarTerms {
    fn month_start(&self, solar_year: i32, month_index: usize) -> Result<NaiveDate> {
        let (month, day) = *Self::TERMS.get(month_index).ok_or_else(|| {
            ChartError::InvalidCalendarInput(format!("month index {} out of range", month_index))
        })?;
        let year = if month_index == 11 {
            solar_year + 1
        } else {
            solar_year
        };
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            ChartError::InvalidCalendarInput(format!("year {} out of range", year))
        })
    }
}

/// Sectional month containing `date`: (solar year, month index 0..12).
pub fn solar_month_of<C: SolarTermCalendar + ?Sized>(
    calendar: &C,
    date: NaiveDate,
) -> Result<(i32, usize)> {
    let mut found = None;
    for (year, idx, start) in terms_around(calendar, date.year())? {
        if start <= date {
            found = Some((year, idx));
        } else {
            break;
        }
    }
    found.ok_or_else(|| {
        ChartError::InvalidCalendarInput(format!("no sectional term precedes {}", date))
    })
}

/// Sectional terms from 大雪 of `year - 1` to 惊蛰 of `year + 1`, in order.
fn terms_around<C: SolarTermCalendar + ?Sized>(
    calendar: &C,
    year: i32,
) -> Result<Vec<(i32, usize, NaiveDate)>> {
    let mut terms = Vec::with_capacity(16);
    for idx in 10..12 {
        terms.push((year - 1, idx, calendar.month_start(year - 1, idx)?));
    }
    for idx in 0..12 {
        terms.push((year, idx, calendar.month_start(year, idx)?));
    }
    for idx in 0..2 {
        terms.push((year + 1, idx, calendar.month_start(year + 1, idx)?));
    }
    Ok(terms)
}

// ============================================================================
// PILLAR RULES
// ============================================================================

/// Year pillar of a solar year (year 4 CE is 甲子).
pub fn year_pillar(solar_year: i32) -> Result<GanZhi> {
    GanZhi::from_count(solar_year as i64 - 4)
}

/// Civil years in `from..=to` whose year pillar is `ganzhi`, ascending.
///
/// Parity-mismatched pairs never match.
pub fn matching_years(ganzhi: GanZhi, from: i32, to: i32) -> Vec<i32> {
    let Some(idx) = ganzhi.cycle_index() else {
        return Vec::new();
    };
    if from > to {
        return Vec::new();
    }
    let cycle = CYCLE_LEN as i64;
    let first = from as i64 + (idx as i64 - (from as i64 - 4)).rem_euclid(cycle);
    (first..=to as i64)
        .step_by(CYCLE_LEN)
        .map(|y| y as i32)
        .collect()
}

/// The matching year nearest `target`; the earlier one wins a tie.
pub fn closest_matching_year(ganzhi: GanZhi, target: i32) -> Option<i32> {
    let idx = ganzhi.cycle_index()? as i64;
    let cycle = CYCLE_LEN as i64;
    let target = target as i64;
    let below = target - (target - 4 - idx).rem_euclid(cycle);
    let above = below + cycle;
    let nearest = if above - target < target - below {
        above
    } else {
        below
    };
    i32::try_from(nearest).ok()
}

/// Five-tiger rule (五虎遁): stem of the 寅 month from the year stem.
pub fn tiger_stem(year_stem: Stem) -> Stem {
    Stem::wrapping((year_stem.index() % 5) as i64 * 2 + 2)
}

pub fn month_pillar(year_stem: Stem, month_index: usize) -> GanZhi {
    GanZhi::new_unchecked(
        tiger_stem(year_stem).offset(month_index as i64),
        Branch::Yin.offset(month_index as i64),
    )
}

/// Five-rat rule (五鼠遁): stem of the 子 hour from the day stem.
pub fn rat_stem(day_stem: Stem) -> Stem {
    Stem::wrapping((day_stem.index() % 5) as i64 * 2)
}

/// Two-hour slot (0 = 子) for a civil hour.
pub fn hour_slot(hour: u32) -> usize {
    (((hour + 1) / 2) % 12) as usize
}

pub fn hour_pillar(day_stem: Stem, slot: usize) -> GanZhi {
    GanZhi::new_unchecked(
        rat_stem(day_stem).offset(slot as i64),
        Branch::Zi.offset(slot as i64),
    )
}

pub fn day_pillar(date: NaiveDate) -> Result<GanZhi> {
    let jdn = date.num_days_from_ce() as i64 + JDN_CE_OFFSET;
    GanZhi::from_count(jdn + DAY_COUNT_OFFSET)
}

// ============================================================================
// FOUR PILLARS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FourPillars {
    pub year: GanZhi,
    pub month: GanZhi,
    pub day: GanZhi,
    pub hour: GanZhi,
}

impl FourPillars {
    pub fn from_ganzhi(year: GanZhi, month: GanZhi, day: GanZhi, hour: GanZhi) -> Self {
        Self {
            year,
            month,
            day,
            hour,
        }
    }

    /// Parse four two-symbol pairs such as `["甲子", "丙寅", "戊辰", "壬子"]`.
    pub fn parse(texts: [&str; 4]) -> Result<Self> {
        Ok(Self {
            year: texts[0].parse()?,
            month: texts[1].parse()?,
            day: texts[2].parse()?,
            hour: texts[3].parse()?,
        })
    }

    pub fn as_array(&self) -> [GanZhi; 4] {
        [self.year, self.month, self.day, self.hour]
    }
}

pub fn four_pillars<C: SolarTermCalendar + ?Sized>(
    record: &BirthRecord,
    calendar: &C,
    convention: LateRatConvention,
) -> Result<FourPillars> {
    let date = record.datetime.date();
    let (solar_year, month_index) = solar_month_of(calendar, date)?;
    let year = year_pillar(solar_year)?;
    let month = month_pillar(year.stem, month_index);

    let hour = record.datetime.hour();
    let late_rat = hour == 23;
    let next_day = date + Duration::days(1);
    let day = if late_rat && convention == LateRatConvention::NextDay {
        day_pillar(next_day)?
    } else {
        day_pillar(date)?
    };
    let hour_stem_day = if late_rat {
        day_pillar(next_day)?.stem
    } else {
        day.stem
    };

    Ok(FourPillars {
        year,
        month,
        day,
        hour: hour_pillar(hour_stem_day, hour_slot(hour)),
    })
}

// ============================================================================
// DECADE DIRECTION AND START AGE
// ============================================================================

/// Forward for a yang year with a male chart or a yin year with a female one.
pub fn decades_run_forward(year_stem: Stem, gender: Gender) -> bool {
    year_stem.is_yang() == (gender == Gender::Male)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartAge {
    pub years: u32,
    pub months: u32,
    /// Days between birth and the governing sectional term.
    pub days_to_term: u32,
}

/// Start age (起运): three days to the term count as one year, the
/// remaining days four months each.
pub fn start_age<C: SolarTermCalendar + ?Sized>(
    calendar: &C,
    birth: NaiveDate,
    forward: bool,
) -> Result<StartAge> {
    let terms = terms_around(calendar, birth.year())?;
    let found = if forward {
        terms.iter().map(|t| t.2).find(|d| *d > birth)
    } else {
        terms.iter().rev().map(|t| t.2).find(|d| *d <= birth)
    };
    let term = found.ok_or_else(|| {
        ChartError::InvalidCalendarInput(format!("no sectional term around {}", birth))
    })?;
    let days = (term - birth).num_days().unsigned_abs() as u32;
    Ok(StartAge {
        years: days / 3,
        months: (days % 3) * 4,
        days_to_term: days,
    })
}
