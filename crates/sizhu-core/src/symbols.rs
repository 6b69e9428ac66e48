//! Stems, branches, the five elements and their fixed relationships.
//!
//! Every symbol is a closed enumeration with total lookups. Text lookups
//! (`from_char`, `FromStr`) return `None`/`Err` for unknown symbols; callers
//! that must degrade gracefully map those to neutral values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// POLARITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Yang,
    Yin,
}

impl Polarity {
    pub fn name(&self) -> &'static str {
        match self {
            Polarity::Yang => "阳",
            Polarity::Yin => "阴",
        }
    }
}

// ============================================================================
// ELEMENT
// ============================================================================

/// The five elements (五行).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    pub const COUNT: usize = 5;

    /// Ordered along the production cycle.
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    pub fn index(&self) -> usize {
        match self {
            Element::Wood => 0,
            Element::Fire => 1,
            Element::Earth => 2,
            Element::Metal => 3,
            Element::Water => 4,
        }
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn symbol(&self) -> char {
        match self {
            Element::Wood => '木',
            Element::Fire => '火',
            Element::Earth => '土',
            Element::Metal => '金',
            Element::Water => '水',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.symbol() == c)
    }

    /// The element this one produces (木生火, 火生土, ...).
    pub fn produces(&self) -> Element {
        Self::ALL[(self.index() + 1) % 5]
    }

    pub fn produced_by(&self) -> Element {
        Self::ALL[(self.index() + 4) % 5]
    }

    /// The element this one restrains (木克土, 土克水, ...).
    pub fn restrains(&self) -> Element {
        Self::ALL[(self.index() + 2) % 5]
    }

    pub fn restrained_by(&self) -> Element {
        Self::ALL[(self.index() + 3) % 5]
    }

    /// Element embedded in a sound-element label such as "海中金".
    ///
    /// The trailing character carries the element; when it does not, the
    /// first element character found anywhere in the label is used.
    pub fn embedded_in(label: &str) -> Option<Element> {
        label
            .chars()
            .last()
            .and_then(Element::from_char)
            .or_else(|| label.chars().find_map(Element::from_char))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// ============================================================================
// STEM
// ============================================================================

/// Heavenly stems (天干), index 0 = 甲.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stem {
    Jia,
    Yi,
    Bing,
    Ding,
    Wu,
    Ji,
    Geng,
    Xin,
    Ren,
    Gui,
}

impl Stem {
    pub const COUNT: usize = 10;

    pub const ALL: [Stem; 10] = [
        Stem::Jia,
        Stem::Yi,
        Stem::Bing,
        Stem::Ding,
        Stem::Wu,
        Stem::Ji,
        Stem::Geng,
        Stem::Xin,
        Stem::Ren,
        Stem::Gui,
    ];

    const SYMBOLS: [char; 10] = ['甲', '乙', '丙', '丁', '戊', '己', '庚', '辛', '壬', '癸'];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Wrapping constructor used by offset arithmetic.
    pub fn wrapping(idx: i64) -> Self {
        Self::ALL[idx.rem_euclid(Self::COUNT as i64) as usize]
    }

    pub fn offset(&self, steps: i64) -> Self {
        Self::wrapping(self.index() as i64 + steps)
    }

    pub fn symbol(&self) -> char {
        Self::SYMBOLS[self.index()]
    }

    pub fn from_char(c: char) -> Option<Self> {
        Self::SYMBOLS
            .iter()
            .position(|&s| s == c)
            .and_then(Self::from_index)
    }

    pub fn element(&self) -> Element {
        Element::ALL[self.index() / 2]
    }

    pub fn polarity(&self) -> Polarity {
        if self.index() % 2 == 0 {
            Polarity::Yang
        } else {
            Polarity::Yin
        }
    }

    pub fn is_yang(&self) -> bool {
        self.polarity() == Polarity::Yang
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Stem {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Stem::from_char(c).ok_or(()),
            _ => Err(()),
        }
    }
}

// ============================================================================
// BRANCH
// ============================================================================

/// Earthly branches (地支), index 0 = 子.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Branch {
    Zi,
    Chou,
    Yin,
    Mao,
    Chen,
    Si,
    Wu,
    Wei,
    Shen,
    You,
    Xu,
    Hai,
}

impl Branch {
    pub const COUNT: usize = 12;

    pub const ALL: [Branch; 12] = [
        Branch::Zi,
        Branch::Chou,
        Branch::Yin,
        Branch::Mao,
        Branch::Chen,
        Branch::Si,
        Branch::Wu,
        Branch::Wei,
        Branch::Shen,
        Branch::You,
        Branch::Xu,
        Branch::Hai,
    ];

    const SYMBOLS: [char; 12] = [
        '子', '丑', '寅', '卯', '辰', '巳', '午', '未', '申', '酉', '戌', '亥',
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn wrapping(idx: i64) -> Self {
        Self::ALL[idx.rem_euclid(Self::COUNT as i64) as usize]
    }

    pub fn offset(&self, steps: i64) -> Self {
        Self::wrapping(self.index() as i64 + steps)
    }

    pub fn symbol(&self) -> char {
        Self::SYMBOLS[self.index()]
    }

    pub fn from_char(c: char) -> Option<Self> {
        Self::SYMBOLS
            .iter()
            .position(|&s| s == c)
            .and_then(Self::from_index)
    }

    pub fn element(&self) -> Element {
        match self {
            Branch::Zi | Branch::Hai => Element::Water,
            Branch::Yin | Branch::Mao => Element::Wood,
            Branch::Si | Branch::Wu => Element::Fire,
            Branch::Shen | Branch::You => Element::Metal,
            Branch::Chou | Branch::Chen | Branch::Wei | Branch::Xu => Element::Earth,
        }
    }

    pub fn polarity(&self) -> Polarity {
        if self.index() % 2 == 0 {
            Polarity::Yang
        } else {
            Polarity::Yin
        }
    }

    pub fn season(&self) -> Season {
        match self {
            Branch::Yin | Branch::Mao | Branch::Chen => Season::Spring,
            Branch::Si | Branch::Wu | Branch::Wei => Season::Summer,
            Branch::Shen | Branch::You | Branch::Xu => Season::Autumn,
            Branch::Hai | Branch::Zi | Branch::Chou => Season::Winter,
        }
    }

    /// Six-harmony partner (六合) and the element the pair transforms into.
    pub fn six_harmony(&self) -> (Branch, Element) {
        match self {
            Branch::Zi => (Branch::Chou, Element::Earth),
            Branch::Chou => (Branch::Zi, Element::Earth),
            Branch::Yin => (Branch::Hai, Element::Wood),
            Branch::Hai => (Branch::Yin, Element::Wood),
            Branch::Mao => (Branch::Xu, Element::Fire),
            Branch::Xu => (Branch::Mao, Element::Fire),
            Branch::Chen => (Branch::You, Element::Metal),
            Branch::You => (Branch::Chen, Element::Metal),
            Branch::Si => (Branch::Shen, Element::Water),
            Branch::Shen => (Branch::Si, Element::Water),
            Branch::Wu => (Branch::Wei, Element::Earth),
            Branch::Wei => (Branch::Wu, Element::Earth),
        }
    }

    /// Clash partner (六冲), six positions away.
    pub fn clash(&self) -> Branch {
        self.offset(6)
    }

    /// Harm partner (六害).
    pub fn harm(&self) -> Branch {
        match self {
            Branch::Zi => Branch::Wei,
            Branch::Wei => Branch::Zi,
            Branch::Chou => Branch::Wu,
            Branch::Wu => Branch::Chou,
            Branch::Yin => Branch::Si,
            Branch::Si => Branch::Yin,
            Branch::Mao => Branch::Chen,
            Branch::Chen => Branch::Mao,
            Branch::Shen => Branch::Hai,
            Branch::Hai => Branch::Shen,
            Branch::You => Branch::Xu,
            Branch::Xu => Branch::You,
        }
    }

    /// 辰 午 酉 亥 punish themselves when doubled (自刑).
    pub fn is_self_punishing(&self) -> bool {
        matches!(self, Branch::Chen | Branch::Wu | Branch::You | Branch::Hai)
    }

    /// 1-based position in the month order that starts at 寅.
    pub fn month_ordinal(&self) -> usize {
        (self.index() + 10) % 12 + 1
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Branch {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Branch::from_char(c).ok_or(()),
            _ => Err(()),
        }
    }
}

// ============================================================================
// SEASON
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Element that governs the season.
    pub fn dominant_element(&self) -> Element {
        match self {
            Season::Spring => Element::Wood,
            Season::Summer => Element::Fire,
            Season::Autumn => Element::Metal,
            Season::Winter => Element::Water,
        }
    }
}
