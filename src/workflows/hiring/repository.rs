use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationId, ApplicationRecord, CandidateId, JobId, JobPosting, LearningRecord,
};

/// Storage abstraction for application records so the service can be
/// exercised against in-memory fakes.
pub trait ApplicationStore: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, StoreError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), StoreError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError>;

    /// Writes `record` only if the guarded round still has room.
    ///
    /// Occupancy (other active applications for the same job whose current
    /// round equals the guarded index) must be counted and the write applied
    /// in one critical section, so two concurrent moves cannot both slip
    /// past the capacity check.
    fn update_with_capacity(
        &self,
        record: ApplicationRecord,
        guard: RoundCapacityGuard,
    ) -> Result<(), StoreError>;
}

/// Condition attached to a round move: at most `capacity` active occupants
/// in `round_index` of `job_id`, not counting the record being written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundCapacityGuard {
    pub job_id: JobId,
    pub round_index: usize,
    pub capacity: u32,
}

/// Read access to job postings.
pub trait JobStore: Send + Sync {
    fn fetch(&self, id: &JobId) -> Result<Option<JobPosting>, StoreError>;
}

/// Read access to candidate learning records.
///
/// Contractually total: an unknown candidate or a record with missing
/// sub-collections comes back as empty defaults so scoring never fails on
/// sparse data.
pub trait CandidateDirectory: Send + Sync {
    fn learning_record(&self, id: &CandidateId) -> LearningRecord;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("round {round_index} is full ({capacity} seat(s))")]
    CapacityExceeded { round_index: usize, capacity: u32 },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hiring-update notification hook (e-mail adapter lives outside
/// this crate). Best effort only: implementations must bound their own send
/// time, and the pipeline never retries or blocks a transition on them.
pub trait HiringNotifier: Send + Sync {
    fn send_update(&self, update: HiringUpdate) -> Result<(), NotificationError>;
}

/// Payload handed to the notification collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiringUpdate {
    pub to: String,
    pub subject: String,
    pub template: String,
    pub data: BTreeMap<String, String>,
}

/// Notification dispatch error; always swallowed and logged by the caller.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Sanitized response shape for an application, so handlers never expose the
/// raw stored record.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub application_id: ApplicationId,
    pub candidate_id: CandidateId,
    pub job_id: JobId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_match: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_round: Option<RoundView>,
    pub rounds_completed: usize,
}

/// Current-round summary inside an [`ApplicationView`].
#[derive(Debug, Clone, Serialize)]
pub struct RoundView {
    pub round_index: usize,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
}

impl ApplicationRecord {
    pub fn view(&self) -> ApplicationView {
        ApplicationView {
            application_id: self.application_id.clone(),
            candidate_id: self.candidate_id.clone(),
            job_id: self.job_id.clone(),
            status: self.status.label(),
            overall_match: self.match_result.as_ref().map(|result| result.overall),
            current_round: self.current_round.as_ref().map(|round| RoundView {
                round_index: round.round_index,
                status: round.status.label(),
                scheduled_at: round.scheduled_at,
                meeting_link: round.meeting_link.clone(),
            }),
            rounds_completed: self.round_history.len(),
        }
    }
}
