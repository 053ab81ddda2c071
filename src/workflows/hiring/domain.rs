use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::matching::MatchResult;

/// Identifier wrapper for submitted job applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for platform learners applying to jobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Identifier wrapper for the recruiter who owns a posting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecruiterId(pub String);

/// Self-reported proficiency a learner selects in their preferences.
///
/// The ordinal positions (0/1/2) feed the experience scorer; heavy platform
/// usage can bump the effective level one step above the stated one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub(crate) const fn ordinal(self) -> u8 {
        match self {
            SkillLevel::Beginner => 0,
            SkillLevel::Intermediate => 1,
            SkillLevel::Advanced => 2,
        }
    }
}

/// A learner's roadmap enrollment as seen by the hiring workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapEnrollment {
    pub role: String,
    pub completed_topics: Vec<String>,
}

/// Progress inside a programming-language track.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageTrack {
    pub name: String,
    pub completed_topics: Vec<String>,
}

/// Denormalized learning record for one candidate.
///
/// The learning subsystem owns and mutates this data; the hiring workflow
/// only reads it. Every collection defaults to empty so a brand-new account
/// can still be scored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningRecord {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub stated_level: SkillLevel,
    #[serde(default)]
    pub enrollments: Vec<RoadmapEnrollment>,
    #[serde(default)]
    pub languages: Vec<LanguageTrack>,
    #[serde(default)]
    pub badges: Vec<String>,
    /// Raw study-time entries in minutes, as recorded by the tracker.
    #[serde(default)]
    pub study_minutes: Vec<u32>,
}

/// Requirement lists copied off a job posting, read-only to this workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequirements {
    #[serde(default)]
    pub skills: Vec<String>,
    /// Free text such as "3-5 years senior"; scanned for level keywords.
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub certifications: Vec<String>,
}

/// One recruiter-configured interview round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    pub name: String,
    /// Maximum concurrent occupants; `None` or zero means unlimited.
    #[serde(default)]
    pub capacity: Option<u32>,
}

/// Notification template attached to a pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTrigger {
    pub subject: String,
    pub template: String,
    pub active: bool,
}

/// Job posting fields consumed by the hiring workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub job_id: JobId,
    pub recruiter_id: RecruiterId,
    pub title: String,
    pub requirements: JobRequirements,
    #[serde(default)]
    pub rounds: Vec<RoundConfig>,
    /// Trigger table keyed by stage label (`rejected`, `round_upgraded`,
    /// `round_update`).
    #[serde(default)]
    pub email_triggers: BTreeMap<String, EmailTrigger>,
}

impl JobPosting {
    pub fn round_capacity(&self, round_index: usize) -> Option<u32> {
        self.rounds
            .get(round_index)
            .and_then(|round| round.capacity)
            .filter(|capacity| *capacity > 0)
    }
}

/// Coarse application-level status, updated opportunistically as rounds move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    Submitted,
    UnderReview,
    Shortlisted,
    InterviewScheduled,
    OfferSent,
    Rejected,
    Accepted,
    Withdrawn,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under-review",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::InterviewScheduled => "interview-scheduled",
            ApplicationStatus::OfferSent => "offer-sent",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    /// Whether the application still occupies capacity in its round.
    pub const fn is_active(self) -> bool {
        !matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }
}

/// Per-round status. `Rejected` and `Accepted` are recruiter verdicts
/// recorded on the round; setting them also flips the application status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundStatus {
    Pending,
    Scheduled,
    InProgress,
    Completed,
    Passed,
    Failed,
    Rejected,
    Accepted,
}

impl RoundStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RoundStatus::Pending => "pending",
            RoundStatus::Scheduled => "scheduled",
            RoundStatus::InProgress => "in-progress",
            RoundStatus::Completed => "completed",
            RoundStatus::Passed => "passed",
            RoundStatus::Failed => "failed",
            RoundStatus::Rejected => "rejected",
            RoundStatus::Accepted => "accepted",
        }
    }
}

/// Mutable pointer to the round an application currently sits in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    pub round_index: usize,
    pub status: RoundStatus,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub score: Option<u8>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Append-only snapshot of a round the application has left behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundHistoryEntry {
    pub round_index: usize,
    pub name: String,
    pub score: Option<u8>,
    pub feedback: Option<String>,
    pub completed_at: DateTime<Utc>,
    pub status: RoundStatus,
}

/// Persisted job-application record owned by this workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub application_id: ApplicationId,
    pub candidate_id: CandidateId,
    pub job_id: JobId,
    pub status: ApplicationStatus,
    pub match_result: Option<MatchResult>,
    pub current_round: Option<RoundState>,
    pub round_history: Vec<RoundHistoryEntry>,
    pub submitted_at: DateTime<Utc>,
}

impl ApplicationRecord {
    /// Round index the application last occupied, if any round was started.
    pub fn current_round_index(&self) -> Option<usize> {
        self.current_round.as_ref().map(|round| round.round_index)
    }
}
