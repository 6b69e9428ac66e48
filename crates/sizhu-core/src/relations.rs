//! Adverse branch relations: clashes (冲), punishments (刑) and harms (害).
//!
//! Relations are found over a branch list and report the positions of the
//! participating entries, so callers can map them back to pillars.

use serde::{Deserialize, Serialize};

use crate::pillar::{Pillar, PillarRole};
use crate::symbols::Branch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BranchRelation {
    /// 六冲
    Clash,
    /// 子卯相刑
    MutualPunishment,
    /// 辰辰 午午 酉酉 亥亥
    SelfPunishment,
    /// 寅巳申 or 丑戌未, all three present.
    TriadPunishment,
    /// 六害
    Harm,
}

impl BranchRelation {
    pub fn name(&self) -> &'static str {
        match self {
            BranchRelation::Clash => "冲",
            BranchRelation::MutualPunishment => "相刑",
            BranchRelation::SelfPunishment => "自刑",
            BranchRelation::TriadPunishment => "三刑",
            BranchRelation::Harm => "害",
        }
    }

    pub fn is_punishment(&self) -> bool {
        matches!(
            self,
            BranchRelation::MutualPunishment
                | BranchRelation::SelfPunishment
                | BranchRelation::TriadPunishment
        )
    }
}

const PUNISHMENT_TRIADS: [[Branch; 3]; 2] = [
    [Branch::Yin, Branch::Si, Branch::Shen],
    [Branch::Chou, Branch::Xu, Branch::Wei],
];

/// One relation and the input positions taking part in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationHit {
    pub relation: BranchRelation,
    pub members: Vec<usize>,
}

/// Relations holding between two branches.
pub fn pair_relations(a: Branch, b: Branch) -> Vec<BranchRelation> {
    let mut found = Vec::new();
    if a.clash() == b {
        found.push(BranchRelation::Clash);
    }
    if a.harm() == b {
        found.push(BranchRelation::Harm);
    }
    if matches!(
        (a, b),
        (Branch::Zi, Branch::Mao) | (Branch::Mao, Branch::Zi)
    ) {
        found.push(BranchRelation::MutualPunishment);
    }
    if a == b && a.is_self_punishing() {
        found.push(BranchRelation::SelfPunishment);
    }
    found
}

/// Every pairwise relation plus the complete punishment triads.
///
/// A triad reports the first position of each member; repeated branches
/// do not produce extra triad hits.
pub fn find_relations(branches: &[Branch]) -> Vec<RelationHit> {
    let mut hits = Vec::new();
    for (i, a) in branches.iter().enumerate() {
        for (j, b) in branches.iter().enumerate().skip(i + 1) {
            for relation in pair_relations(*a, *b) {
                hits.push(RelationHit {
                    relation,
                    members: vec![i, j],
                });
            }
        }
    }

    for triad in PUNISHMENT_TRIADS {
        let members: Option<Vec<usize>> = triad
            .iter()
            .map(|member| branches.iter().position(|b| b == member))
            .collect();
        if let Some(mut members) = members {
            members.sort_unstable();
            hits.push(RelationHit {
                relation: BranchRelation::TriadPunishment,
                members,
            });
        }
    }
    hits
}

/// A relation among pillars, named by role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PillarRelation {
    pub relation: BranchRelation,
    pub roles: Vec<PillarRole>,
}

pub fn pillar_relations<'p, I>(pillars: I) -> Vec<PillarRelation>
where
    I: IntoIterator<Item = &'p Pillar>,
{
    let pillars: Vec<&Pillar> = pillars.into_iter().collect();
    let branches: Vec<Branch> = pillars.iter().map(|p| p.branch()).collect();
    find_relations(&branches)
        .into_iter()
        .map(|hit| PillarRelation {
            relation: hit.relation,
            roles: hit.members.iter().map(|&i| pillars[i].role).collect(),
        })
        .collect()
}
