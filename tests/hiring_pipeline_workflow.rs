//! Integration scenarios for the hiring workflow: scoring, submission, round
//! progression, and bulk actions driven through the public service facade
//! and HTTP router, without reaching into private modules.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use skillforge_hiring::workflows::hiring::memory::{
    LoggingNotifier, MemoryApplicationStore, MemoryCandidateDirectory, MemoryJobStore,
};
use skillforge_hiring::workflows::hiring::{
    hiring_router, ApplicationStatus, ApplicationStore, BulkAction, CandidateId, EmailTrigger,
    HiringPipelineService, JobId, JobPosting, JobRequirements, LearningRecord, MatchWeights,
    PipelineError, RecruiterId, RoadmapEnrollment, RoundConfig, RoundMoveRequest, RoundStatus,
    SkillLevel,
};

type Service = HiringPipelineService<
    MemoryApplicationStore,
    MemoryJobStore,
    MemoryCandidateDirectory,
    LoggingNotifier,
>;

struct World {
    service: Arc<Service>,
    applications: Arc<MemoryApplicationStore>,
}

fn recruiter() -> RecruiterId {
    RecruiterId("recruiter-hr".to_string())
}

fn job() -> JobPosting {
    let mut email_triggers = BTreeMap::new();
    email_triggers.insert(
        "round_upgraded".to_string(),
        EmailTrigger {
            subject: "Next steps".to_string(),
            template: "round-upgraded".to_string(),
            active: true,
        },
    );

    JobPosting {
        job_id: JobId("job-platform".to_string()),
        recruiter_id: recruiter(),
        title: "Platform Engineer".to_string(),
        requirements: JobRequirements {
            skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            experience: "mid-level, 3+ years".to_string(),
            certifications: Vec::new(),
        },
        rounds: vec![
            RoundConfig {
                name: "Screening".to_string(),
                capacity: None,
            },
            RoundConfig {
                name: "System Design".to_string(),
                capacity: Some(1),
            },
        ],
        email_triggers,
    }
}

fn learner() -> LearningRecord {
    LearningRecord {
        email: Some("lin@example.com".to_string()),
        stated_level: SkillLevel::Intermediate,
        enrollments: vec![RoadmapEnrollment {
            role: "Rust Backend".to_string(),
            completed_topics: vec!["PostgreSQL Basics".to_string(), "Async IO".to_string()],
        }],
        languages: Vec::new(),
        badges: Vec::new(),
        study_minutes: vec![600],
    }
}

fn world() -> World {
    let applications = Arc::new(MemoryApplicationStore::default());
    let jobs = Arc::new(MemoryJobStore::default());
    let candidates = Arc::new(MemoryCandidateDirectory::default());

    jobs.put(job());
    candidates.put(CandidateId("cand-lin".to_string()), learner());

    let service = Arc::new(HiringPipelineService::new(
        applications.clone(),
        jobs,
        candidates,
        Arc::new(LoggingNotifier),
        MatchWeights::default(),
    ));

    World {
        service,
        applications,
    }
}

#[test]
fn application_walks_the_full_pipeline() {
    let w = world();
    let candidate = CandidateId("cand-lin".to_string());
    let job_id = JobId("job-platform".to_string());

    // Preview matches the score persisted at submission time.
    let preview = w
        .service
        .preview_match(&candidate, &job_id)
        .expect("preview succeeds");
    let record = w
        .service
        .submit(candidate, job_id)
        .expect("submission succeeds");
    assert_eq!(
        record.match_result.as_ref().map(|r| r.overall),
        Some(preview.overall)
    );

    let id = record.application_id.clone();

    // Screening, then the final round; history grows by one per hop.
    w.service
        .move_round(
            &recruiter(),
            &id,
            RoundMoveRequest {
                round_index: Some(0),
                status: Some(RoundStatus::InProgress),
                score: Some(7),
                ..RoundMoveRequest::default()
            },
        )
        .expect("screening starts");

    let record = w
        .service
        .move_round(
            &recruiter(),
            &id,
            RoundMoveRequest {
                round_index: Some(1),
                ..RoundMoveRequest::default()
            },
        )
        .expect("advance to design round");
    assert_eq!(record.round_history.len(), 1);
    assert_eq!(record.round_history[0].name, "Screening");
    assert_eq!(record.round_history[0].score, Some(7));

    // Passing the last configured round flips the application status.
    let record = w
        .service
        .move_round(
            &recruiter(),
            &id,
            RoundMoveRequest {
                round_index: Some(1),
                status: Some(RoundStatus::Passed),
                ..RoundMoveRequest::default()
            },
        )
        .expect("pass the final round");
    assert_eq!(record.status, ApplicationStatus::InterviewScheduled);
}

#[test]
fn capacity_is_enforced_for_the_design_round() {
    let w = world();
    let candidate = CandidateId("cand-lin".to_string());
    let job_id = JobId("job-platform".to_string());

    let occupant = w
        .service
        .submit(candidate.clone(), job_id.clone())
        .expect("submit occupant");
    w.service
        .move_round(
            &recruiter(),
            &occupant.application_id,
            RoundMoveRequest {
                round_index: Some(1),
                ..RoundMoveRequest::default()
            },
        )
        .expect("occupy the single seat");

    let hopeful = w
        .service
        .submit(candidate, job_id)
        .expect("submit hopeful");
    let result = w.service.move_round(
        &recruiter(),
        &hopeful.application_id,
        RoundMoveRequest {
            round_index: Some(1),
            ..RoundMoveRequest::default()
        },
    );

    assert!(matches!(
        result,
        Err(PipelineError::RoundAtCapacity {
            round_index: 1,
            capacity: 1
        })
    ));

    let stored = w
        .applications
        .fetch(&hopeful.application_id)
        .expect("store reachable")
        .expect("record present");
    assert!(stored.current_round.is_none());
}

#[test]
fn bulk_reject_reports_per_item_outcomes() {
    let w = world();
    let candidate = CandidateId("cand-lin".to_string());
    let job_id = JobId("job-platform".to_string());

    let a = w
        .service
        .submit(candidate.clone(), job_id.clone())
        .expect("submit a");
    let b = w.service.submit(candidate, job_id).expect("submit b");

    let outcome = w.service.bulk_update(
        &recruiter(),
        &[
            a.application_id.clone(),
            b.application_id.clone(),
            skillforge_hiring::workflows::hiring::ApplicationId("ghost".to_string()),
        ],
        &BulkAction::Reject,
    );

    assert_eq!(outcome.updated, 2);
    assert_eq!(outcome.results.len(), 3);
    assert!(outcome.results[0].success);
    assert!(!outcome.results[2].success);
}

#[tokio::test]
async fn router_round_trip_submits_and_advances() {
    let w = world();
    let router = hiring_router(w.service.clone());

    let submit = router
        .clone()
        .oneshot(
            axum::http::Request::post("/api/v1/hiring/jobs/job-platform/applications")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&json!({ "candidate_id": "cand-lin" })).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("submit route executes");
    assert_eq!(submit.status(), StatusCode::ACCEPTED);

    let body = axum::body::to_bytes(submit.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let payload: serde_json::Value = serde_json::from_slice(&body).expect("json payload");
    let application_id = payload
        .get("application_id")
        .and_then(|v| v.as_str())
        .expect("application id")
        .to_string();

    let advance = router
        .oneshot(
            axum::http::Request::post(format!(
                "/api/v1/hiring/applications/{application_id}/round"
            ))
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(
                serde_json::to_vec(&json!({
                    "recruiter_id": "recruiter-hr",
                    "round_index": 0,
                    "status": "in-progress"
                }))
                .unwrap(),
            ))
            .unwrap(),
        )
        .await
        .expect("round route executes");
    assert_eq!(advance.status(), StatusCode::OK);
}
