use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use skillforge_hiring::config::AppConfig;
use skillforge_hiring::error::AppError;
use skillforge_hiring::telemetry;
use skillforge_hiring::workflows::hiring::memory::{
    LoggingNotifier, MemoryApplicationStore, MemoryCandidateDirectory, MemoryJobStore,
};
use skillforge_hiring::workflows::hiring::{
    hiring_router, CandidateId, CandidateProfile, HiringPipelineService, JobPosting,
    JobRequirements, LearningRecord, MatchWeights, RosterImporter,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
    jobs: Arc<MemoryJobStore>,
    candidates: Arc<MemoryCandidateDirectory>,
}

#[derive(Parser, Debug)]
#[command(
    name = "SkillForge Hiring Service",
    about = "Run the hiring workflow service or rank candidates from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Hiring workflow utilities
    Hiring {
        #[command(subcommand)]
        command: HiringCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum HiringCommand {
    /// Rank a CSV roster of candidates against ad-hoc job requirements
    Rank(RankArgs),
}

#[derive(Args, Debug)]
struct RankArgs {
    /// Candidate roster CSV export
    #[arg(long)]
    roster: PathBuf,
    /// Required skill keyword (repeatable)
    #[arg(long = "skill")]
    skills: Vec<String>,
    /// Free-text experience descriptor, e.g. "3-5 years senior"
    #[arg(long, default_value = "")]
    experience: String,
    /// Required certification name (repeatable)
    #[arg(long = "certification")]
    certifications: Vec<String>,
    /// Show per-category breakdown for every candidate
    #[arg(long)]
    breakdown: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Hiring {
            command: HiringCommand::Rank(args),
        } => run_rank(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let applications = Arc::new(MemoryApplicationStore::default());
    let jobs = Arc::new(MemoryJobStore::default());
    let candidates = Arc::new(MemoryCandidateDirectory::default());
    let notifier = Arc::new(LoggingNotifier);
    let service = Arc::new(HiringPipelineService::new(
        applications,
        jobs.clone(),
        candidates.clone(),
        notifier,
        config.match_weights,
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
        jobs,
        candidates,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/hiring/jobs", put(upsert_job_endpoint))
        .route(
            "/api/v1/hiring/candidates/:candidate_id",
            put(upsert_candidate_endpoint),
        )
        .with_state(state)
        .merge(hiring_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "hiring workflow service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        roster,
        skills,
        experience,
        certifications,
        breakdown,
    } = args;

    let requirements = JobRequirements {
        skills,
        experience,
        certifications,
    };

    let roster = RosterImporter::from_path(roster)?;
    let profiles: Vec<(CandidateId, CandidateProfile)> = roster
        .iter()
        .map(|(id, record)| (id.clone(), CandidateProfile::from_record(record)))
        .collect();

    let ranked = skillforge_hiring::workflows::hiring::rank_candidates(
        profiles,
        &requirements,
        MatchWeights::default(),
    );

    println!("Candidate ranking ({} candidate(s))", ranked.len());
    for (position, entry) in ranked.iter().enumerate() {
        println!(
            "{:>3}. {} — overall {}",
            position + 1,
            entry.candidate_id.0,
            entry.result.overall
        );

        if breakdown {
            let b = &entry.result.breakdown;
            println!(
                "     skills {} (x{:.2}), experience {} (x{:.2}), certifications {} (x{:.2})",
                b.skills.score,
                b.skills.weight,
                b.experience.score,
                b.experience.weight,
                b.certifications.score,
                b.certifications.weight
            );
            if !entry.result.skill_gaps.is_empty() {
                println!("     gaps: {}", entry.result.skill_gaps.join(", "));
            }
        }
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Seeds or replaces a job posting in the in-memory store. A production
/// deployment backs `JobStore` with the platform database instead.
async fn upsert_job_endpoint(
    State(state): State<AppState>,
    Json(job): Json<JobPosting>,
) -> impl IntoResponse {
    let job_id = job.job_id.clone();
    state.jobs.put(job);
    (StatusCode::OK, Json(json!({ "job_id": job_id.0 })))
}

/// Seeds or replaces a candidate learning record in the in-memory directory.
async fn upsert_candidate_endpoint(
    State(state): State<AppState>,
    axum::extract::Path(candidate_id): axum::extract::Path<String>,
    Json(record): Json<LearningRecord>,
) -> impl IntoResponse {
    state.candidates.put(CandidateId(candidate_id), record);
    StatusCode::NO_CONTENT
}
