//! Sexagenary (六十甲子) arithmetic.
//!
//! A count of elapsed units maps onto the 60-term cycle as
//! `stem = count mod 10`, `branch = count mod 12`. Both indices derive from
//! the same count, so parity always matches and only 60 of the 120 naive
//! pairs are reachable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ChartError, Result};
use crate::symbols::{Branch, Stem};

/// Bound on absolute counts. Far beyond any civil calendar use.
pub const MAX_ABS_COUNT: i64 = 1_000_000_000;

pub const CYCLE_LEN: usize = 60;

/// Void branch pairs (旬空) per decade group, indexed by head branch / 2.
///
/// Group heads are 甲子, 甲寅, 甲辰, 甲午, 甲申, 甲戌.
const VOID_TABLE: [(Branch, Branch); 6] = [
    (Branch::Xu, Branch::Hai),
    (Branch::Zi, Branch::Chou),
    (Branch::Yin, Branch::Mao),
    (Branch::Chen, Branch::Si),
    (Branch::Wu, Branch::Wei),
    (Branch::Shen, Branch::You),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GanZhi {
    pub stem: Stem,
    pub branch: Branch,
}

impl GanZhi {
    pub const JIA_ZI: GanZhi = GanZhi {
        stem: Stem::Jia,
        branch: Branch::Zi,
    };

    /// Resolve an absolute count. Negative counts wrap backwards.
    pub fn from_count(count: i64) -> Result<Self> {
        if count.unsigned_abs() > MAX_ABS_COUNT as u64 {
            return Err(ChartError::InvalidCalendarInput(format!(
                "count {} outside ±{}",
                count, MAX_ABS_COUNT
            )));
        }
        Ok(Self::from_cycle_index(count.rem_euclid(CYCLE_LEN as i64) as usize))
    }

    /// Resolve a count that arrived as a float (e.g. from a host bridge).
    pub fn try_from_count(count: f64) -> Result<Self> {
        if !count.is_finite() || count.fract() != 0.0 {
            return Err(ChartError::InvalidCalendarInput(format!(
                "count {} is not an integer",
                count
            )));
        }
        if count.abs() > MAX_ABS_COUNT as f64 {
            return Err(ChartError::InvalidCalendarInput(format!(
                "count {} outside ±{}",
                count, MAX_ABS_COUNT
            )));
        }
        Self::from_count(count as i64)
    }

    /// Index 0..60 wraps.
    pub fn from_cycle_index(idx: usize) -> Self {
        GanZhi {
            stem: Stem::wrapping(idx as i64),
            branch: Branch::wrapping(idx as i64),
        }
    }

    /// Parity-checked constructor.
    pub fn from_parts(stem: Stem, branch: Branch) -> Option<Self> {
        if stem.index() % 2 == branch.index() % 2 {
            Some(GanZhi { stem, branch })
        } else {
            None
        }
    }

    /// Unchecked constructor for positions derived by offset rules.
    pub fn new_unchecked(stem: Stem, branch: Branch) -> Self {
        GanZhi { stem, branch }
    }

    pub fn is_cyclic(&self) -> bool {
        self.stem.index() % 2 == self.branch.index() % 2
    }

    /// Position in the 60-term cycle, `None` for parity-mismatched pairs.
    pub fn cycle_index(&self) -> Option<usize> {
        if !self.is_cyclic() {
            return None;
        }
        let s = self.stem.index() as i64;
        let b = self.branch.index() as i64;
        Some((6 * s - 5 * b).rem_euclid(CYCLE_LEN as i64) as usize)
    }

    /// Step along the cycle; both components move together.
    pub fn offset(&self, steps: i64) -> Self {
        GanZhi {
            stem: self.stem.offset(steps),
            branch: self.branch.offset(steps),
        }
    }

    pub fn void_branches(&self) -> (Branch, Branch) {
        void_branches(self.stem, self.branch)
    }

    /// First pair of the decade group this pair belongs to.
    pub fn decade_head(&self) -> GanZhi {
        GanZhi::new_unchecked(Stem::Jia, head_branch(self.stem, self.branch))
    }

    pub fn parse(text: &str) -> Result<Self> {
        text.parse()
    }
}

fn head_branch(stem: Stem, branch: Branch) -> Branch {
    Branch::wrapping(branch.index() as i64 - stem.index() as i64)
}

/// Void branch pair for any stem/branch combination.
///
/// Mismatched-parity pairs fall back to the group below their head.
pub fn void_branches(stem: Stem, branch: Branch) -> (Branch, Branch) {
    VOID_TABLE[head_branch(stem, branch).index() / 2]
}

/// Index of the decade group (0..6) for a pair.
pub fn decade_group(stem: Stem, branch: Branch) -> usize {
    head_branch(stem, branch).index() / 2
}

impl fmt::Display for GanZhi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}

impl FromStr for GanZhi {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        let chars: Vec<char> = s.trim().chars().collect();
        if chars.len() != 2 {
            return Err(ChartError::MalformedGanZhiString(format!(
                "'{}' must be exactly two symbols",
                s
            )));
        }
        let stem = Stem::from_char(chars[0]).ok_or_else(|| {
            ChartError::MalformedGanZhiString(format!("unknown stem '{}'", chars[0]))
        })?;
        let branch = Branch::from_char(chars[1]).ok_or_else(|| {
            ChartError::MalformedGanZhiString(format!("unknown branch '{}'", chars[1]))
        })?;
        GanZhi::from_parts(stem, branch).ok_or_else(|| {
            ChartError::MalformedGanZhiString(format!("'{}' is not a sexagenary pair", s))
        })
    }
}
