//! Skill-match scorer: a pure function from a candidate's learning record
//! and a job's requirement lists to a weighted 0-100 match score.

mod profile;
mod rules;

pub use profile::CandidateProfile;

use serde::{Deserialize, Serialize};

use super::domain::{CandidateId, JobRequirements};

/// Category weights applied to the three sub-scores. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    pub skills: f64,
    pub experience: f64,
    pub certifications: f64,
}

impl MatchWeights {
    pub fn new(
        skills: f64,
        experience: f64,
        certifications: f64,
    ) -> Result<Self, InvalidWeights> {
        let weights = Self {
            skills,
            experience,
            certifications,
        };
        let sum = skills + experience + certifications;
        if !(skills >= 0.0 && experience >= 0.0 && certifications >= 0.0)
            || (sum - 1.0).abs() > 1e-6
        {
            return Err(InvalidWeights { sum });
        }
        Ok(weights)
    }
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            skills: 0.5,
            experience: 0.3,
            certifications: 0.2,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("match weights must be non-negative and sum to 1.0 (got {sum})")]
pub struct InvalidWeights {
    pub sum: f64,
}

/// Per-category outcome carried in the match breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub score: u8,
    pub weight: f64,
    /// `round(score * weight)`, the points this category adds to the total.
    pub contribution: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_level: Option<u8>,
}

impl CategoryResult {
    fn weighted(score: u8, weight: f64) -> Self {
        Self {
            score,
            weight,
            contribution: (f64::from(score) * weight).round() as u8,
            matched: Vec::new(),
            missing: Vec::new(),
            required_level: None,
            effective_level: None,
        }
    }
}

/// Breakdown of the three scored categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub skills: CategoryResult,
    pub experience: CategoryResult,
    pub certifications: CategoryResult,
}

/// Templated learning suggestion for one missing skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub skill: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub suggestion: String,
    pub action: String,
}

/// Value object produced per scoring call and persisted by the caller onto
/// the application record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub overall: u8,
    pub breakdown: MatchBreakdown,
    pub skill_gaps: Vec<String>,
    pub recommendations: Vec<Recommendation>,
}

/// Scores a candidate profile against a job's requirements.
///
/// Pure and total: missing optional data scores as empty defaults rather
/// than erroring. Each category score is rounded before weighting and the
/// contributions are summed, so the overall can differ by a point from a
/// single-rounding computation; that behavior is load-bearing for score
/// compatibility and must not be "fixed".
pub fn calculate_match_score(
    profile: &CandidateProfile,
    requirements: &JobRequirements,
    weights: MatchWeights,
) -> MatchResult {
    let signals = rules::score_categories(profile, requirements);

    let mut skills = CategoryResult::weighted(signals.skills_score, weights.skills);
    skills.matched = signals.matched_skills;
    skills.missing = signals.missing_skills;

    let mut experience = CategoryResult::weighted(signals.experience_score, weights.experience);
    experience.required_level = Some(signals.required_level);
    experience.effective_level = Some(signals.effective_level);

    let mut certifications =
        CategoryResult::weighted(signals.certifications_score, weights.certifications);
    certifications.matched = signals.matched_certifications;
    certifications.missing = signals.missing_certifications;

    let overall = (skills.contribution + experience.contribution + certifications.contribution)
        .min(100);

    let skill_gaps = skills.missing.clone();
    let recommendations = skill_gaps.iter().map(|skill| recommend(skill)).collect();

    MatchResult {
        overall,
        breakdown: MatchBreakdown {
            skills,
            experience,
            certifications,
        },
        skill_gaps,
        recommendations,
    }
}

fn recommend(skill: &str) -> Recommendation {
    Recommendation {
        skill: skill.to_string(),
        kind: "skill-gap".to_string(),
        suggestion: format!("Enroll in a roadmap or topic covering {skill} to close this gap"),
        action: "enroll".to_string(),
    }
}

/// One entry in a ranked batch-scoring result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    pub candidate_id: CandidateId,
    pub result: MatchResult,
}

/// Scores every candidate against one job and ranks descending by overall
/// score. The sort is stable, so ties keep their input order.
pub fn rank_candidates(
    candidates: Vec<(CandidateId, CandidateProfile)>,
    requirements: &JobRequirements,
    weights: MatchWeights,
) -> Vec<RankedMatch> {
    let mut ranked: Vec<RankedMatch> = candidates
        .into_iter()
        .map(|(candidate_id, profile)| RankedMatch {
            result: calculate_match_score(&profile, requirements, weights),
            candidate_id,
        })
        .collect();

    ranked.sort_by(|a, b| b.result.overall.cmp(&a.result.overall));
    ranked
}
