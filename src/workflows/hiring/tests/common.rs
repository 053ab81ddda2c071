use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::hiring::domain::{
    CandidateId, EmailTrigger, JobId, JobPosting, JobRequirements, LanguageTrack, LearningRecord,
    RecruiterId, RoadmapEnrollment, RoundConfig, SkillLevel,
};
use crate::workflows::hiring::memory::{
    MemoryApplicationStore, MemoryCandidateDirectory, MemoryJobStore,
};
use crate::workflows::hiring::repository::{
    ApplicationStore, HiringNotifier, HiringUpdate, NotificationError, StoreError,
};
use crate::workflows::hiring::router::hiring_router;
use crate::workflows::hiring::service::HiringPipelineService;
use crate::workflows::hiring::{ApplicationId, ApplicationRecord, MatchWeights, RoundCapacityGuard};

pub(super) fn recruiter() -> RecruiterId {
    RecruiterId("recruiter-1".to_string())
}

pub(super) fn other_recruiter() -> RecruiterId {
    RecruiterId("recruiter-2".to_string())
}

pub(super) fn job_id() -> JobId {
    JobId("job-frontend".to_string())
}

pub(super) fn job() -> JobPosting {
    let mut email_triggers = BTreeMap::new();
    email_triggers.insert(
        "rejected".to_string(),
        EmailTrigger {
            subject: "Update on your application".to_string(),
            template: "application-rejected".to_string(),
            active: true,
        },
    );
    email_triggers.insert(
        "round_upgraded".to_string(),
        EmailTrigger {
            subject: "You are moving forward".to_string(),
            template: "round-upgraded".to_string(),
            active: true,
        },
    );
    email_triggers.insert(
        "round_update".to_string(),
        EmailTrigger {
            subject: "Interview round update".to_string(),
            template: "round-update".to_string(),
            active: false,
        },
    );

    JobPosting {
        job_id: job_id(),
        recruiter_id: recruiter(),
        title: "Frontend Engineer".to_string(),
        requirements: JobRequirements {
            skills: vec![
                "React".to_string(),
                "Node.js".to_string(),
                "TypeScript".to_string(),
            ],
            experience: "intermediate, 2+ years".to_string(),
            certifications: vec!["AWS Certified Developer".to_string()],
        },
        rounds: vec![
            RoundConfig {
                name: "Screening".to_string(),
                capacity: None,
            },
            RoundConfig {
                name: "Technical Interview".to_string(),
                capacity: Some(2),
            },
            RoundConfig {
                name: "Final Interview".to_string(),
                capacity: Some(1),
            },
        ],
        email_triggers,
    }
}

/// Job owned by a different recruiter, used for ownership checks.
pub(super) fn foreign_job() -> JobPosting {
    JobPosting {
        job_id: JobId("job-backend".to_string()),
        recruiter_id: other_recruiter(),
        title: "Backend Engineer".to_string(),
        requirements: JobRequirements::default(),
        rounds: vec![RoundConfig {
            name: "Screening".to_string(),
            capacity: None,
        }],
        email_triggers: BTreeMap::new(),
    }
}

/// Learning record that matches every frontend requirement except one badge
/// upgrade path: skills 3/3, experience intermediate vs. intermediate
/// requirement (gap 1), certification matched.
pub(super) fn strong_record() -> LearningRecord {
    LearningRecord {
        email: Some("ada@example.com".to_string()),
        stated_level: SkillLevel::Intermediate,
        enrollments: vec![RoadmapEnrollment {
            role: "React Developer".to_string(),
            completed_topics: vec![
                "TypeScript Basics".to_string(),
                "Node.js APIs".to_string(),
            ],
        }],
        languages: vec![LanguageTrack {
            name: "JavaScript".to_string(),
            completed_topics: vec!["Closures".to_string()],
        }],
        badges: vec!["AWS Certified Developer Associate".to_string()],
        study_minutes: vec![1200, 2400],
    }
}

pub(super) fn empty_record() -> LearningRecord {
    LearningRecord::default()
}

pub(super) type TestService = HiringPipelineService<
    MemoryApplicationStore,
    MemoryJobStore,
    MemoryCandidateDirectory,
    RecordingNotifier,
>;

pub(super) struct TestHarness {
    pub(super) service: Arc<TestService>,
    pub(super) applications: Arc<MemoryApplicationStore>,
    pub(super) jobs: Arc<MemoryJobStore>,
    pub(super) candidates: Arc<MemoryCandidateDirectory>,
    pub(super) notifier: Arc<RecordingNotifier>,
}

pub(super) fn harness() -> TestHarness {
    harness_with_notifier(RecordingNotifier::default())
}

pub(super) fn harness_with_notifier(notifier: RecordingNotifier) -> TestHarness {
    let applications = Arc::new(MemoryApplicationStore::default());
    let jobs = Arc::new(MemoryJobStore::default());
    let candidates = Arc::new(MemoryCandidateDirectory::default());
    let notifier = Arc::new(notifier);

    jobs.put(job());
    jobs.put(foreign_job());
    candidates.put(CandidateId("cand-ada".to_string()), strong_record());

    let service = Arc::new(HiringPipelineService::new(
        applications.clone(),
        jobs.clone(),
        candidates.clone(),
        notifier.clone(),
        MatchWeights::default(),
    ));

    TestHarness {
        service,
        applications,
        jobs,
        candidates,
        notifier,
    }
}

pub(super) fn ada() -> CandidateId {
    CandidateId("cand-ada".to_string())
}

pub(super) fn test_router(harness: &TestHarness) -> axum::Router {
    hiring_router(harness.service.clone())
}

/// Notifier that records every update, optionally failing each send.
#[derive(Default)]
pub(super) struct RecordingNotifier {
    pub(super) fail: bool,
    updates: Mutex<Vec<HiringUpdate>>,
}

impl RecordingNotifier {
    pub(super) fn failing() -> Self {
        Self {
            fail: true,
            updates: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn updates(&self) -> Vec<HiringUpdate> {
        self.updates.lock().expect("notifier mutex poisoned").clone()
    }
}

impl HiringNotifier for RecordingNotifier {
    fn send_update(&self, update: HiringUpdate) -> Result<(), NotificationError> {
        self.updates
            .lock()
            .expect("notifier mutex poisoned")
            .push(update);
        if self.fail {
            Err(NotificationError::Transport("smtp offline".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Application store that always reports the backend as offline.
pub(super) struct UnavailableApplicationStore;

impl ApplicationStore for UnavailableApplicationStore {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update_with_capacity(
        &self,
        _record: ApplicationRecord,
        _guard: RoundCapacityGuard,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
