//! Candidate roster import from recruiter-exported CSV.
//!
//! Expected columns: `Candidate ID, Email, Skill Level, Study Minutes,
//! Completed Topics, Skills, Badges`. `Skills` and `Badges` are
//! semicolon-separated lists; `Completed Topics` is recorded as roadmap
//! topic titles joined with semicolons.

use std::io::Read;
use std::path::Path;

use crate::workflows::hiring::domain::{
    CandidateId, LanguageTrack, LearningRecord, RoadmapEnrollment, SkillLevel,
};

#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("failed to read roster export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid roster CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("roster row {row} is missing a candidate id")]
    MissingCandidateId { row: usize },
}

pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<(CandidateId, LearningRecord)>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parses roster rows in order. Duplicate candidate ids keep the first
    /// row seen, matching how recruiters re-export overlapping rosters.
    pub fn from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<(CandidateId, LearningRecord)>, RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(name))
        };

        let id_col = column("Candidate ID");
        let email_col = column("Email");
        let level_col = column("Skill Level");
        let minutes_col = column("Study Minutes");
        let topics_col = column("Completed Topics");
        let skills_col = column("Skills");
        let badges_col = column("Badges");

        let mut roster: Vec<(CandidateId, LearningRecord)> = Vec::new();

        for (row, result) in csv_reader.records().enumerate() {
            let record = result?;
            let field = |col: Option<usize>| {
                col.and_then(|index| record.get(index))
                    .map(str::trim)
                    .unwrap_or_default()
            };

            let raw_id = field(id_col);
            if raw_id.is_empty() {
                return Err(RosterImportError::MissingCandidateId { row: row + 1 });
            }
            let candidate_id = CandidateId(raw_id.to_string());
            if roster.iter().any(|(existing, _)| *existing == candidate_id) {
                continue;
            }

            let email = match field(email_col) {
                "" => None,
                value => Some(value.to_string()),
            };

            let stated_level = parse_level(field(level_col));
            let study_minutes = match field(minutes_col).parse::<u32>() {
                Ok(minutes) if minutes > 0 => vec![minutes],
                _ => Vec::new(),
            };

            let completed_topics = split_list(field(topics_col));
            let skills = split_list(field(skills_col));
            let badges = split_list(field(badges_col));

            // Roster exports flatten the learning record: completed topics
            // land in one synthetic enrollment, and the skill column maps to
            // language tracks so the tokens flow into the profile.
            let enrollments = if completed_topics.is_empty() {
                Vec::new()
            } else {
                vec![RoadmapEnrollment {
                    role: String::new(),
                    completed_topics,
                }]
            };
            let languages = skills
                .into_iter()
                .map(|name| LanguageTrack {
                    name,
                    completed_topics: Vec::new(),
                })
                .collect();

            roster.push((
                candidate_id,
                LearningRecord {
                    email,
                    stated_level,
                    enrollments,
                    languages,
                    badges,
                    study_minutes,
                },
            ));
        }

        Ok(roster)
    }
}

fn parse_level(raw: &str) -> SkillLevel {
    match raw.to_ascii_lowercase().as_str() {
        "advanced" => SkillLevel::Advanced,
        "intermediate" => SkillLevel::Intermediate,
        _ => SkillLevel::Beginner,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
