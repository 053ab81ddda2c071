use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, CandidateId, JobId, JobPosting,
    RecruiterId, RoundHistoryEntry, RoundState, RoundStatus,
};
use super::matching::{
    self, CandidateProfile, MatchResult, MatchWeights, RankedMatch,
};
use super::repository::{
    ApplicationStore, CandidateDirectory, HiringNotifier, HiringUpdate, JobStore,
    RoundCapacityGuard, StoreError,
};

/// Orchestrates the scorer and the round state machine over the storage and
/// notification collaborators.
pub struct HiringPipelineService<A, J, C, N> {
    applications: Arc<A>,
    jobs: Arc<J>,
    candidates: Arc<C>,
    notifier: Arc<N>,
    weights: MatchWeights,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Payload for a single-application round transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundMoveRequest {
    /// Target round; when omitted only the supplied fields are merged into
    /// the current round.
    #[serde(default)]
    pub round_index: Option<usize>,
    #[serde(default)]
    pub status: Option<RoundStatus>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub score: Option<u8>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Action applied uniformly across a bulk selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "kebab-case")]
pub enum BulkAction {
    /// Advance to `round_index`, or one past the current round when omitted.
    Move {
        #[serde(default)]
        round_index: Option<usize>,
    },
    Reject,
}

/// Per-item outcome of a bulk action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItemResult {
    pub application_id: ApplicationId,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate bulk result: the count plus per-item detail, so callers can
/// tell which applications were skipped and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub updated: usize,
    pub results: Vec<BulkItemResult>,
}

/// Coarse stage used to key the job's notification trigger table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStage {
    Rejected,
    RoundUpgraded,
    RoundUpdate,
}

impl NotificationStage {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationStage::Rejected => "rejected",
            NotificationStage::RoundUpgraded => "round_upgraded",
            NotificationStage::RoundUpdate => "round_update",
        }
    }
}

/// Error raised by pipeline operations.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("application not found")]
    ApplicationNotFound,
    #[error("job not found")]
    JobNotFound,
    #[error("application does not belong to the acting recruiter")]
    NotOwner,
    #[error("round index {index} is out of range for a job with {rounds} round(s)")]
    InvalidRound { index: usize, rounds: usize },
    #[error("round {round_index} is at capacity ({capacity} seat(s))")]
    RoundAtCapacity { round_index: usize, capacity: u32 },
    #[error("application has no active round to update")]
    NoActiveRound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl<A, J, C, N> HiringPipelineService<A, J, C, N>
where
    A: ApplicationStore + 'static,
    J: JobStore + 'static,
    C: CandidateDirectory + 'static,
    N: HiringNotifier + 'static,
{
    pub fn new(
        applications: Arc<A>,
        jobs: Arc<J>,
        candidates: Arc<C>,
        notifier: Arc<N>,
        weights: MatchWeights,
    ) -> Self {
        Self {
            applications,
            jobs,
            candidates,
            notifier,
            weights,
        }
    }

    fn job(&self, job_id: &JobId) -> Result<JobPosting, PipelineError> {
        self.jobs
            .fetch(job_id)?
            .ok_or(PipelineError::JobNotFound)
    }

    fn application(&self, id: &ApplicationId) -> Result<ApplicationRecord, PipelineError> {
        self.applications
            .fetch(id)?
            .ok_or(PipelineError::ApplicationNotFound)
    }

    /// Scores a candidate against a job without persisting anything.
    pub fn preview_match(
        &self,
        candidate_id: &CandidateId,
        job_id: &JobId,
    ) -> Result<MatchResult, PipelineError> {
        let job = self.job(job_id)?;
        let record = self.candidates.learning_record(candidate_id);
        let profile = CandidateProfile::from_record(&record);
        Ok(matching::calculate_match_score(
            &profile,
            &job.requirements,
            self.weights,
        ))
    }

    /// Submits an application, persisting the match score computed at
    /// submission time.
    pub fn submit(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<ApplicationRecord, PipelineError> {
        let result = self.preview_match(&candidate_id, &job_id)?;

        let record = ApplicationRecord {
            application_id: next_application_id(),
            candidate_id,
            job_id,
            status: ApplicationStatus::Submitted,
            match_result: Some(result),
            current_round: None,
            round_history: Vec::new(),
            submitted_at: Utc::now(),
        };

        let stored = self.applications.insert(record)?;
        Ok(stored)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<ApplicationRecord, PipelineError> {
        self.application(id)
    }

    /// Scores every listed candidate against one job and returns them ranked
    /// descending by overall score; ties keep the input order.
    pub fn rank_candidates(
        &self,
        job_id: &JobId,
        candidate_ids: &[CandidateId],
    ) -> Result<Vec<RankedMatch>, PipelineError> {
        let job = self.job(job_id)?;
        let profiles = candidate_ids
            .iter()
            .map(|id| {
                let record = self.candidates.learning_record(id);
                (id.clone(), CandidateProfile::from_record(&record))
            })
            .collect();
        Ok(matching::rank_candidates(
            profiles,
            &job.requirements,
            self.weights,
        ))
    }

    /// Ranks externally supplied learning records (e.g. a CSV roster import)
    /// against one job.
    pub fn rank_roster(
        &self,
        job_id: &JobId,
        roster: Vec<(CandidateId, super::domain::LearningRecord)>,
    ) -> Result<Vec<RankedMatch>, PipelineError> {
        let job = self.job(job_id)?;
        let profiles = roster
            .into_iter()
            .map(|(id, record)| (id, CandidateProfile::from_record(&record)))
            .collect();
        Ok(matching::rank_candidates(
            profiles,
            &job.requirements,
            self.weights,
        ))
    }

    /// Moves an application to a round (or patches the current one) and
    /// applies the application-level side effects.
    ///
    /// All-or-nothing: any validation, ownership, or capacity failure leaves
    /// the stored record untouched. The trailing notification is best effort
    /// and never affects the outcome.
    pub fn move_round(
        &self,
        recruiter: &RecruiterId,
        application_id: &ApplicationId,
        request: RoundMoveRequest,
    ) -> Result<ApplicationRecord, PipelineError> {
        let mut record = self.application(application_id)?;
        let job = self.job(&record.job_id)?;
        if job.recruiter_id != *recruiter {
            return Err(PipelineError::NotOwner);
        }

        let previous_index = record.current_round_index();

        let stage = match request.round_index {
            Some(target) => {
                if target >= job.rounds.len() {
                    return Err(PipelineError::InvalidRound {
                        index: target,
                        rounds: job.rounds.len(),
                    });
                }

                let advancing = previous_index.map_or(true, |prev| target > prev);
                let status = request
                    .status
                    .unwrap_or(if advancing {
                        RoundStatus::Pending
                    } else {
                        RoundStatus::InProgress
                    });

                // Leaving a round appends its snapshot before the pointer
                // moves; history is append-only.
                if let Some(previous) = &record.current_round {
                    if previous.round_index != target {
                        record.round_history.push(snapshot_round(previous, &job));
                    }
                }

                // Whole-object replacement: omitted optional fields reset.
                record.current_round = Some(RoundState {
                    round_index: target,
                    status,
                    scheduled_at: request.scheduled_at,
                    meeting_link: request.meeting_link,
                    score: request.score,
                    feedback: request.feedback,
                });

                let stage = if status == RoundStatus::Rejected {
                    NotificationStage::Rejected
                } else if advancing {
                    NotificationStage::RoundUpgraded
                } else {
                    NotificationStage::RoundUpdate
                };

                apply_status_side_effects(&mut record, status, target, &job);

                let same_round = previous_index == Some(target);
                let guard = (status != RoundStatus::Rejected && !same_round)
                    .then(|| job.round_capacity(target))
                    .flatten()
                    .map(|capacity| RoundCapacityGuard {
                        job_id: job.job_id.clone(),
                        round_index: target,
                        capacity,
                    });

                let write = match guard {
                    Some(guard) => self
                        .applications
                        .update_with_capacity(record.clone(), guard),
                    None => self.applications.update(record.clone()),
                };
                write.map_err(|err| match err {
                    StoreError::CapacityExceeded {
                        round_index,
                        capacity,
                    } => PipelineError::RoundAtCapacity {
                        round_index,
                        capacity,
                    },
                    other => PipelineError::Store(other),
                })?;

                stage
            }
            None => {
                let current = record
                    .current_round
                    .as_mut()
                    .ok_or(PipelineError::NoActiveRound)?;

                // Partial update: only supplied fields are merged.
                if let Some(status) = request.status {
                    current.status = status;
                }
                if let Some(at) = request.scheduled_at {
                    current.scheduled_at = Some(at);
                }
                if let Some(link) = request.meeting_link {
                    current.meeting_link = Some(link);
                }
                if let Some(score) = request.score {
                    current.score = Some(score);
                }
                if let Some(feedback) = request.feedback {
                    current.feedback = Some(feedback);
                }

                let status = current.status;
                let round_index = current.round_index;
                apply_status_side_effects(&mut record, status, round_index, &job);

                self.applications.update(record.clone())?;

                if status == RoundStatus::Rejected {
                    NotificationStage::Rejected
                } else {
                    NotificationStage::RoundUpdate
                }
            }
        };

        self.notify(&job, &record, stage);

        Ok(record)
    }

    /// Applies one action across many applications, sequentially. Per-item
    /// failures are logged and recorded but never abort the remaining items.
    pub fn bulk_update(
        &self,
        recruiter: &RecruiterId,
        application_ids: &[ApplicationId],
        action: &BulkAction,
    ) -> BulkOutcome {
        let mut results = Vec::with_capacity(application_ids.len());
        let mut updated = 0;

        for id in application_ids {
            match self.apply_bulk_item(recruiter, id, action) {
                Ok(()) => {
                    updated += 1;
                    results.push(BulkItemResult {
                        application_id: id.clone(),
                        success: true,
                        error: None,
                    });
                }
                Err(err) => {
                    warn!(application_id = %id.0, error = %err, "bulk hiring action skipped item");
                    results.push(BulkItemResult {
                        application_id: id.clone(),
                        success: false,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        BulkOutcome { updated, results }
    }

    fn apply_bulk_item(
        &self,
        recruiter: &RecruiterId,
        id: &ApplicationId,
        action: &BulkAction,
    ) -> Result<(), PipelineError> {
        let mut record = self.application(id)?;
        let job = self.job(&record.job_id)?;
        if job.recruiter_id != *recruiter {
            return Err(PipelineError::NotOwner);
        }

        match action {
            BulkAction::Move { round_index } => {
                let previous = record.current_round_index();
                let target = round_index.unwrap_or_else(|| previous.map_or(0, |prev| prev + 1));
                if target >= job.rounds.len() {
                    return Err(PipelineError::InvalidRound {
                        index: target,
                        rounds: job.rounds.len(),
                    });
                }

                if let Some(previous) = &record.current_round {
                    if previous.round_index != target {
                        record.round_history.push(snapshot_round(previous, &job));
                    }
                }

                record.current_round = Some(RoundState {
                    round_index: target,
                    status: RoundStatus::Pending,
                    scheduled_at: None,
                    meeting_link: None,
                    score: None,
                    feedback: None,
                });
            }
            BulkAction::Reject => {
                record.status = ApplicationStatus::Rejected;
                if let Some(current) = record.current_round.as_mut() {
                    current.status = RoundStatus::Failed;
                }
            }
        }

        self.applications.update(record)?;
        Ok(())
    }

    /// Fire-and-forget notification keyed by the job's trigger table.
    fn notify(&self, job: &JobPosting, record: &ApplicationRecord, stage: NotificationStage) {
        let Some(trigger) = job
            .email_triggers
            .get(stage.label())
            .filter(|trigger| trigger.active)
        else {
            return;
        };

        let learning = self.candidates.learning_record(&record.candidate_id);
        let Some(to) = learning.email else {
            return;
        };

        let mut data = BTreeMap::new();
        data.insert("job_title".to_string(), job.title.clone());
        data.insert(
            "application_id".to_string(),
            record.application_id.0.clone(),
        );
        data.insert("status".to_string(), record.status.label().to_string());
        if let Some(round) = &record.current_round {
            if let Some(config) = job.rounds.get(round.round_index) {
                data.insert("round_name".to_string(), config.name.clone());
            }
        }

        let update = HiringUpdate {
            to,
            subject: trigger.subject.clone(),
            template: trigger.template.clone(),
            data,
        };

        if let Err(err) = self.notifier.send_update(update) {
            warn!(
                application_id = %record.application_id.0,
                stage = stage.label(),
                error = %err,
                "hiring notification failed"
            );
        }
    }
}

fn snapshot_round(previous: &RoundState, job: &JobPosting) -> RoundHistoryEntry {
    let name = job
        .rounds
        .get(previous.round_index)
        .map(|round| round.name.clone())
        .unwrap_or_default();
    RoundHistoryEntry {
        round_index: previous.round_index,
        name,
        score: previous.score,
        feedback: previous.feedback.clone(),
        completed_at: Utc::now(),
        status: RoundStatus::Completed,
    }
}

/// Application-level status follows the round verdicts: rejections and
/// acceptances propagate immediately, and passing the final configured
/// round marks the application as advancing.
fn apply_status_side_effects(
    record: &mut ApplicationRecord,
    status: RoundStatus,
    round_index: usize,
    job: &JobPosting,
) {
    match status {
        RoundStatus::Rejected => record.status = ApplicationStatus::Rejected,
        RoundStatus::Accepted => record.status = ApplicationStatus::Accepted,
        RoundStatus::Passed if round_index + 1 == job.rounds.len() => {
            record.status = ApplicationStatus::InterviewScheduled;
        }
        _ => {}
    }
}
