use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::workflows::hiring::domain::{LearningRecord, SkillLevel};

/// Derived view of a candidate built fresh for every scoring call.
///
/// Nothing here is persisted; the profile is a lossy projection of the
/// learning record into the shape the scorer consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    /// Lower-cased skill tokens with duplicates collapsed.
    pub skills: BTreeSet<String>,
    pub stated_level: SkillLevel,
    pub study_hours: f64,
    pub completed_topic_count: usize,
    /// Lower-cased badge names treated as certifications.
    pub certifications: BTreeSet<String>,
}

impl CandidateProfile {
    /// Projects a learning record into scorer inputs.
    ///
    /// Skill tokens come from enrolled-roadmap role names, completed topic
    /// titles, language names, completed language-topic titles, and badge
    /// names. Missing sub-collections simply contribute nothing.
    pub fn from_record(record: &LearningRecord) -> Self {
        let mut skills = BTreeSet::new();

        for enrollment in &record.enrollments {
            insert_token(&mut skills, &enrollment.role);
            for topic in &enrollment.completed_topics {
                insert_token(&mut skills, topic);
            }
        }

        for language in &record.languages {
            insert_token(&mut skills, &language.name);
            for topic in &language.completed_topics {
                insert_token(&mut skills, topic);
            }
        }

        for badge in &record.badges {
            insert_token(&mut skills, badge);
        }

        let total_minutes: u64 = record.study_minutes.iter().map(|m| u64::from(*m)).sum();
        let study_hours = total_minutes as f64 / 60.0;

        // Only roadmap enrollments count toward the topic tally; language
        // topics feed the skill set but not the upgrade heuristic.
        let completed_topic_count = record
            .enrollments
            .iter()
            .map(|enrollment| enrollment.completed_topics.len())
            .sum();

        let certifications = record
            .badges
            .iter()
            .filter_map(|badge| normalize(badge))
            .collect();

        Self {
            skills,
            stated_level: record.stated_level,
            study_hours,
            completed_topic_count,
            certifications,
        }
    }
}

fn insert_token(set: &mut BTreeSet<String>, raw: &str) {
    if let Some(token) = normalize(raw) {
        set.insert(token);
    }
}

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}
