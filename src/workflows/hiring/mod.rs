//! Job-application hiring workflow: skill matching and round orchestration.
//!
//! `matching` holds the pure scorer; `service` drives the round state
//! machine over the `repository` trait seams. `memory` ships the in-memory
//! collaborator implementations the server binary and tests run on, and
//! `roster` imports recruiter CSV exports for batch ranking.

pub mod domain;
pub mod matching;
pub mod memory;
pub mod repository;
pub mod roster;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, CandidateId, EmailTrigger, JobId,
    JobPosting, JobRequirements, LanguageTrack, LearningRecord, RecruiterId, RoadmapEnrollment,
    RoundConfig, RoundHistoryEntry, RoundState, RoundStatus, SkillLevel,
};
pub use matching::{
    calculate_match_score, rank_candidates, CandidateProfile, CategoryResult, MatchBreakdown,
    MatchResult, MatchWeights, RankedMatch, Recommendation,
};
pub use repository::{
    ApplicationStore, ApplicationView, CandidateDirectory, HiringNotifier, HiringUpdate, JobStore,
    NotificationError, RoundCapacityGuard, RoundView, StoreError,
};
pub use roster::{RosterImportError, RosterImporter};
pub use router::hiring_router;
pub use service::{
    BulkAction, BulkItemResult, BulkOutcome, HiringPipelineService, NotificationStage,
    PipelineError, RoundMoveRequest,
};
