//! Candidate lists for the period hierarchy, derived from a birth record.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::{
    day_pillar, decades_run_forward, hour_pillar, month_pillar, start_age, year_pillar,
    BirthRecord, FourPillars, SolarTermCalendar, StartAge,
};
use crate::cycle::GanZhi;
use crate::error::Result;
use crate::hierarchy::{Candidate, CandidateSource, HierarchyLevel};
use crate::pillar::ExtensionRole;

pub const YEARS_PER_DECADE: usize = 10;
pub const HOURS_PER_DAY: usize = 12;

/// One year of minor luck (小运). Ages are nominal and start at 1 in the
/// birth year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinorLuck {
    pub age: u32,
    pub year: i32,
    pub ganzhi: GanZhi,
}

pub struct PeriodResolver {
    calendar: Box<dyn SolarTermCalendar>,
    birth: BirthRecord,
    month: GanZhi,
    hour: GanZhi,
    forward: bool,
    start_age: StartAge,
    decade_count: usize,
}

impl PeriodResolver {
    pub fn new(
        calendar: Box<dyn SolarTermCalendar>,
        birth: BirthRecord,
        pillars: &FourPillars,
        decade_count: usize,
    ) -> Result<Self> {
        let forward = decades_run_forward(pillars.year.stem, birth.gender);
        let start_age = start_age(calendar.as_ref(), birth.datetime.date(), forward)?;
        log::debug!(
            "periods: decades run {}, start age {}y{}m",
            if forward { "forward" } else { "backward" },
            start_age.years,
            start_age.months
        );
        Ok(Self {
            calendar,
            birth,
            month: pillars.month,
            hour: pillars.hour,
            forward,
            start_age,
            decade_count,
        })
    }

    pub fn runs_forward(&self) -> bool {
        self.forward
    }

    pub fn start_age(&self) -> StartAge {
        self.start_age
    }

    pub fn decades(&self) -> Vec<Candidate> {
        let birth_year = self.birth.datetime.year();
        (0..self.decade_count)
            .map(|k| {
                let steps = k as i64 + 1;
                let ganzhi = self.month.offset(if self.forward { steps } else { -steps });
                let start_age = self.start_age.years + 10 * k as u32;
                Candidate {
                    ganzhi,
                    role: ExtensionRole::DecadePeriod {
                        index: k,
                        start_age,
                        end_age: start_age + 9,
                        start_year: birth_year + start_age as i32,
                    },
                }
            })
            .collect()
    }

    /// The hour pillar stepped one pair per year in the decade direction.
    pub fn minor_luck(&self, count: usize) -> Vec<MinorLuck> {
        let birth_year = self.birth.datetime.year();
        (1..=count as u32)
            .map(|age| {
                let steps = age as i64;
                MinorLuck {
                    age,
                    year: birth_year + age as i32 - 1,
                    ganzhi: self.hour.offset(if self.forward { steps } else { -steps }),
                }
            })
            .collect()
    }

    pub fn years(&self, start_year: i32, start_age: u32) -> Vec<Candidate> {
        (0..YEARS_PER_DECADE as i32)
            .filter_map(|i| {
                let year = start_year + i;
                let ganzhi = year_pillar(year).ok()?;
                Some(Candidate {
                    ganzhi,
                    role: ExtensionRole::YearInPeriod {
                        year,
                        age: start_age as i32 + i,
                    },
                })
            })
            .collect()
    }

    pub fn months(&self, year: i32) -> Vec<Candidate> {
        let Ok(year_gz) = year_pillar(year) else {
            return Vec::new();
        };
        (0..12)
            .filter_map(|m| {
                let start = self.calendar.month_start(year, m).ok()?;
                let end = if m == 11 {
                    self.calendar.month_start(year + 1, 0).ok()?
                } else {
                    self.calendar.month_start(year, m + 1).ok()?
                };
                Some(Candidate {
                    ganzhi: month_pillar(year_gz.stem, m),
                    role: ExtensionRole::MonthInYear {
                        year,
                        index: m,
                        start,
                        end,
                    },
                })
            })
            .collect()
    }

    pub fn days(&self, start: NaiveDate, end: NaiveDate) -> Vec<Candidate> {
        let mut out = Vec::new();
        let mut date = start;
        while date < end {
            if let Ok(ganzhi) = day_pillar(date) {
                out.push(Candidate {
                    ganzhi,
                    role: ExtensionRole::DayInMonth { date },
                });
            }
            date += Duration::days(1);
        }
        out
    }

    pub fn hours(&self, date: NaiveDate) -> Vec<Candidate> {
        let Ok(day) = day_pillar(date) else {
            return Vec::new();
        };
        (0..HOURS_PER_DAY)
            .map(|index| Candidate {
                ganzhi: hour_pillar(day.stem, index),
                role: ExtensionRole::HourInDay { date, index },
            })
            .collect()
    }
}

impl CandidateSource for PeriodResolver {
    fn candidates(&self, level: HierarchyLevel, parent: Option<&ExtensionRole>) -> Vec<Candidate> {
        match (level, parent) {
            (HierarchyLevel::DecadePeriod, _) => self.decades(),
            (
                HierarchyLevel::Year,
                Some(ExtensionRole::DecadePeriod {
                    start_year,
                    start_age,
                    ..
                }),
            ) => self.years(*start_year, *start_age),
            (HierarchyLevel::Month, Some(ExtensionRole::YearInPeriod { year, .. })) => {
                self.months(*year)
            }
            (HierarchyLevel::Day, Some(ExtensionRole::MonthInYear { start, end, .. })) => {
                self.days(*start, *end)
            }
            (HierarchyLevel::Hour, Some(ExtensionRole::DayInMonth { date })) => self.hours(*date),
            (level, parent) => {
                log::warn!(
                    "periods: {} has no candidates under parent {:?}",
                    level.name(),
                    parent
                );
                Vec::new()
            }
        }
    }
}
