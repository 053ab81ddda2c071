use super::profile::CandidateProfile;
use crate::workflows::hiring::domain::{JobRequirements, SkillLevel};

/// Raw category outputs before weighting.
pub(crate) struct CategorySignals {
    pub skills_score: u8,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub experience_score: u8,
    pub required_level: u8,
    pub effective_level: u8,
    pub certifications_score: u8,
    pub matched_certifications: Vec<String>,
    pub missing_certifications: Vec<String>,
}

pub(crate) fn score_categories(
    profile: &CandidateProfile,
    requirements: &JobRequirements,
) -> CategorySignals {
    let (skills_score, matched_skills, missing_skills) =
        score_containment(&requirements.skills, |needle| {
            profile.skills.iter().any(|token| fuzzy_match(needle, token))
        });

    let required_level = required_level_from(&requirements.experience);
    let effective_level = effective_level_for(profile);
    let experience_score = level_gap_score(effective_level, required_level);

    let (certifications_score, matched_certifications, missing_certifications) =
        score_containment(&requirements.certifications, |needle| {
            profile
                .certifications
                .iter()
                .any(|badge| fuzzy_match(needle, badge))
        });

    CategorySignals {
        skills_score,
        matched_skills,
        missing_skills,
        experience_score,
        required_level,
        effective_level,
        certifications_score,
        matched_certifications,
        missing_certifications,
    }
}

/// Shared scoring for the two containment-style categories: an empty
/// requirement list is a vacuous pass at 100.
fn score_containment<F>(required: &[String], mut matches: F) -> (u8, Vec<String>, Vec<String>)
where
    F: FnMut(&str) -> bool,
{
    if required.is_empty() {
        return (100, Vec::new(), Vec::new());
    }

    let mut matched = Vec::new();
    let mut missing = Vec::new();
    for entry in required {
        if matches(&entry.to_lowercase()) {
            matched.push(entry.clone());
        } else {
            missing.push(entry.clone());
        }
    }

    let score = (matched.len() as f64 / required.len() as f64 * 100.0).round() as u8;
    (score, matched, missing)
}

/// Case-insensitive substring match in either direction. Deliberately
/// permissive so "react" still matches "react.js" without a skill taxonomy.
fn fuzzy_match(required: &str, candidate: &str) -> bool {
    required.contains(candidate) || candidate.contains(required)
}

/// Keyword table mapping descriptor text onto the ordinal experience scale.
/// Array order is priority order: the first keyword found wins.
const LEVEL_KEYWORDS: [(&str, u8); 9] = [
    ("beginner", 0),
    ("entry", 1),
    // "entry" and "junior" collapse to the same ordinal on purpose; changing
    // it would shift scores for existing postings.
    ("junior", 1),
    ("intermediate", 2),
    ("mid", 2),
    ("senior", 3),
    ("advanced", 3),
    ("expert", 4),
    ("lead", 4),
];

const DEFAULT_REQUIRED_LEVEL: u8 = 1;

fn required_level_from(descriptor: &str) -> u8 {
    let text = descriptor.to_lowercase();
    LEVEL_KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, level)| *level)
        .unwrap_or(DEFAULT_REQUIRED_LEVEL)
}

/// Upgrades the stated level at most one step when accumulated platform
/// usage suggests the self-report undersells the candidate.
fn effective_level_for(profile: &CandidateProfile) -> u8 {
    let stated = profile.stated_level.ordinal();
    match profile.stated_level {
        SkillLevel::Beginner
            if profile.study_hours > 100.0 || profile.completed_topic_count > 20 =>
        {
            stated + 1
        }
        SkillLevel::Intermediate
            if profile.study_hours > 300.0 || profile.completed_topic_count > 50 =>
        {
            stated + 1
        }
        _ => stated,
    }
}

/// Fixed step function over the ordinal gap; coarse inputs do not justify a
/// continuous formula.
fn level_gap_score(effective: u8, required: u8) -> u8 {
    if effective >= required {
        return 100;
    }
    match required - effective {
        1 => 70,
        2 => 40,
        _ => 20,
    }
}
