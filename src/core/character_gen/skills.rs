//! Skill Pool Resolver
//!
//! Derives the trained-skill set from racial grants, the class basic groups,
//! the class pool, the general pool and the origin benefits. Each stage only
//! claims skills that no earlier stage claimed, so the result never holds a
//! duplicate no matter how many pools offer the same skill.
//!
//! All functions here are pure; toggles return new [`SkillPicks`] and leave
//! them unchanged when the rules reject the request.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of benefits an origin grants.
pub const ORIGIN_BENEFIT_COUNT: usize = 2;

/// Size of the general pool for an intelligence total.
pub fn general_pool_size(intelligence: i8) -> usize {
    intelligence.max(0) as usize
}

fn same_skill(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

fn offers(list: &[String], skill: &str) -> bool {
    list.iter().any(|s| same_skill(s, skill))
}

// ============================================================================
// Inputs
// ============================================================================

/// A class-defined basic skill group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkillGroup {
    /// Every skill is granted
    Fixed { skills: Vec<String> },
    /// Exactly one of the options must be chosen
    Choice { options: Vec<String> },
}

/// The player's choices across the class skill stages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillPicks {
    /// Basic group index -> chosen alternative
    pub basic: BTreeMap<usize, String>,
    pub class: Vec<String>,
    pub general: Vec<String>,
}

impl SkillPicks {
    pub fn is_empty(&self) -> bool {
        self.basic.is_empty() && self.class.is_empty() && self.general.is_empty()
    }
}

/// Rules the resolver runs against. Built from the confirmed race, the class
/// being configured and the attribute totals.
#[derive(Debug, Clone, Copy)]
pub struct SkillContext<'a> {
    pub racial: &'a [String],
    pub basic_groups: &'a [SkillGroup],
    pub class_candidates: &'a [String],
    pub class_picks: usize,
    pub vocabulary: &'a [String],
    pub intelligence: i8,
}

/// One origin benefit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginBenefit {
    Skill(String),
    Power(String),
}

impl OriginBenefit {
    pub fn name(&self) -> &str {
        match self {
            OriginBenefit::Skill(name) | OriginBenefit::Power(name) => name,
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillSource {
    Race,
    Basic,
    Class,
    General,
    Origin,
}

impl fmt::Display for SkillSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SkillSource::Race => "race",
            SkillSource::Basic => "class basic skills",
            SkillSource::Class => "class skills",
            SkillSource::General => "general skills",
            SkillSource::Origin => "origin",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainedSkill {
    pub name: String,
    pub source: SkillSource,
}

/// Outcome of resolving the race and class stages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SkillResolution {
    pub trained: Vec<TrainedSkill>,
    /// Choice groups without a valid pick
    pub basic_pending: usize,
    pub class_chosen: usize,
    pub class_required: usize,
    pub general_chosen: usize,
    pub general_required: usize,
}

impl SkillResolution {
    pub fn basic_complete(&self) -> bool {
        self.basic_pending == 0
    }

    pub fn class_complete(&self) -> bool {
        self.class_chosen == self.class_required
    }

    pub fn general_complete(&self) -> bool {
        self.general_chosen == self.general_required
    }

    /// Basic, class and general stages are all exactly satisfied.
    pub fn is_complete(&self) -> bool {
        self.basic_complete() && self.class_complete() && self.general_complete()
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.source_of(skill).is_some()
    }

    pub fn source_of(&self, skill: &str) -> Option<SkillSource> {
        self.trained
            .iter()
            .find(|t| same_skill(&t.name, skill))
            .map(|t| t.source)
    }

    pub fn names(&self) -> Vec<String> {
        self.trained.iter().map(|t| t.name.clone()).collect()
    }

    fn claim(&mut self, skill: &str, source: SkillSource) -> bool {
        if self.contains(skill) {
            return false;
        }
        self.trained.push(TrainedSkill {
            name: skill.to_string(),
            source,
        });
        true
    }
}

/// Skills trained by the race alone, before any class is known.
pub fn resolve_racial(racial: &[String]) -> SkillResolution {
    let mut resolution = SkillResolution::default();
    for skill in racial {
        resolution.claim(skill, SkillSource::Race);
    }
    resolution
}

/// Resolve racial grants and the three class stages.
pub fn resolve(ctx: &SkillContext<'_>, picks: &SkillPicks) -> SkillResolution {
    let mut resolution = SkillResolution {
        class_required: ctx.class_picks,
        general_required: general_pool_size(ctx.intelligence),
        ..resolve_racial(ctx.racial)
    };

    for (index, group) in ctx.basic_groups.iter().enumerate() {
        match group {
            SkillGroup::Fixed { skills } => {
                for skill in skills {
                    resolution.claim(skill, SkillSource::Basic);
                }
            }
            SkillGroup::Choice { options } => match picks.basic.get(&index) {
                Some(choice) if offers(options, choice) => {
                    resolution.claim(choice, SkillSource::Basic);
                }
                _ => resolution.basic_pending += 1,
            },
        }
    }

    for skill in &picks.class {
        if offers(ctx.class_candidates, skill) && resolution.claim(skill, SkillSource::Class) {
            resolution.class_chosen += 1;
        }
    }

    for skill in &picks.general {
        if offers(ctx.vocabulary, skill) && resolution.claim(skill, SkillSource::General) {
            resolution.general_chosen += 1;
        }
    }

    resolution
}

/// Class-pool skills the player could still pick.
pub fn class_options(ctx: &SkillContext<'_>, picks: &SkillPicks) -> Vec<String> {
    let resolution = resolve(ctx, picks);
    ctx.class_candidates
        .iter()
        .filter(|s| !resolution.contains(s))
        .cloned()
        .collect()
}

/// General-pool skills the player could still pick.
pub fn general_options(ctx: &SkillContext<'_>, picks: &SkillPicks) -> Vec<String> {
    let resolution = resolve(ctx, picks);
    ctx.vocabulary
        .iter()
        .filter(|s| !resolution.contains(s))
        .cloned()
        .collect()
}

// ============================================================================
// Mutations
// ============================================================================

/// Resolve basic choice group `group` to `skill`.
///
/// A class or general pick of the same skill is dropped, since the basic
/// grant now covers it.
pub fn choose_basic(ctx: &SkillContext<'_>, picks: &SkillPicks, group: usize, skill: &str) -> SkillPicks {
    let mut next = picks.clone();
    if let Some(SkillGroup::Choice { options }) = ctx.basic_groups.get(group) {
        if let Some(option) = options.iter().find(|o| same_skill(o, skill)) {
            next.basic.insert(group, option.clone());
            next.class.retain(|s| !same_skill(s, option));
            next.general.retain(|s| !same_skill(s, option));
        }
    }
    next
}

/// Add a class-pool skill, or remove it if already picked.
pub fn toggle_class_skill(ctx: &SkillContext<'_>, picks: &SkillPicks, skill: &str) -> SkillPicks {
    let mut next = picks.clone();
    if let Some(pos) = picks.class.iter().position(|s| same_skill(s, skill)) {
        next.class.remove(pos);
        return next;
    }
    let resolution = resolve(ctx, picks);
    if resolution.class_chosen >= resolution.class_required || resolution.contains(skill) {
        return next;
    }
    if let Some(candidate) = ctx.class_candidates.iter().find(|s| same_skill(s, skill)) {
        next.class.push(candidate.clone());
    }
    next
}

/// Add a general-pool skill, or remove it if already picked.
pub fn toggle_general_skill(ctx: &SkillContext<'_>, picks: &SkillPicks, skill: &str) -> SkillPicks {
    let mut next = picks.clone();
    if let Some(pos) = picks.general.iter().position(|s| same_skill(s, skill)) {
        next.general.remove(pos);
        return next;
    }
    let resolution = resolve(ctx, picks);
    if resolution.general_chosen >= resolution.general_required || resolution.contains(skill) {
        return next;
    }
    if let Some(candidate) = ctx.vocabulary.iter().find(|s| same_skill(s, skill)) {
        next.general.push(candidate.clone());
    }
    next
}

// ============================================================================
// Origin Pool
// ============================================================================

/// Add an origin benefit, or remove it if already chosen.
///
/// Only benefits the origin offers are accepted, and a third benefit is
/// rejected until one is deselected.
pub fn toggle_origin_benefit(
    chosen: &[OriginBenefit],
    offered_skills: &[String],
    offered_powers: &[String],
    benefit: &OriginBenefit,
) -> Vec<OriginBenefit> {
    let mut next = chosen.to_vec();
    if let Some(pos) = chosen.iter().position(|b| same_benefit(b, benefit)) {
        next.remove(pos);
        return next;
    }
    let offered = match benefit {
        OriginBenefit::Skill(name) => offers(offered_skills, name),
        OriginBenefit::Power(name) => offers(offered_powers, name),
    };
    if offered && chosen.len() < ORIGIN_BENEFIT_COUNT {
        next.push(benefit.clone());
    }
    next
}

fn same_benefit(a: &OriginBenefit, b: &OriginBenefit) -> bool {
    match (a, b) {
        (OriginBenefit::Skill(a), OriginBenefit::Skill(b))
        | (OriginBenefit::Power(a), OriginBenefit::Power(b)) => same_skill(a, b),
        _ => false,
    }
}

/// An origin skill benefit that trains nothing new.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginAdvisory {
    pub skill: String,
    pub already_from: SkillSource,
}

impl fmt::Display for OriginAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is already trained from {}; this benefit has no additional effect",
            self.skill, self.already_from
        )
    }
}

/// Duplicate origin skills. They still take a benefit slot.
pub fn origin_advisories(resolution: &SkillResolution, benefits: &[OriginBenefit]) -> Vec<OriginAdvisory> {
    benefits
        .iter()
        .filter_map(|b| match b {
            OriginBenefit::Skill(name) => resolution.source_of(name).map(|source| OriginAdvisory {
                skill: name.clone(),
                already_from: source,
            }),
            OriginBenefit::Power(_) => None,
        })
        .collect()
}

/// The final trained-skill list: resolved stages plus new origin skills.
pub fn final_skills(resolution: &SkillResolution, benefits: &[OriginBenefit]) -> Vec<TrainedSkill> {
    let mut merged = resolution.clone();
    for benefit in benefits {
        if let OriginBenefit::Skill(name) = benefit {
            merged.claim(name, SkillSource::Origin);
        }
    }
    merged.trained
}
