//! Hiring workflow service for the SkillForge learning platform.
//!
//! The crate owns two cooperating pieces: a pure skill-match scorer that
//! grades a candidate's accumulated learning record against a job posting,
//! and a pipeline controller that walks applications through recruiter-defined
//! interview rounds with capacity enforcement and an append-only audit trail.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
