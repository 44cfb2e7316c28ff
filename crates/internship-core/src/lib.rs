//! Internship program core: the lifecycle state machine, dual-grading reconciliation,
//! placement reconciliation, and supervisor assignment, plus the ambient configuration,
//! telemetry, and error plumbing shared with the API service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
