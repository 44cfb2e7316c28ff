//! Internship lifecycle core: the approval gate over the transition table, the dual-grading
//! reconciler, the placement engine, and supervisor assignment, composed behind
//! [`InternshipService`] and exposed over HTTP by [`internship_router`].

mod config;
pub mod domain;
mod error;
pub mod grading;
pub mod lifecycle;
pub mod memory;
pub mod placement;
pub mod repository;
pub mod router;
pub mod service;
pub mod supervisor;

#[cfg(test)]
mod tests;

pub use config::{InternshipConfig, LegacyCategoryPolicy};
pub use domain::{
    ActorRole, Agreement, AgreementDraft, Application, ApplicationDraft, InternshipCategory,
    InternshipStatus, PartneredCompany, PlacementFields, Student, StudentId, Submission,
    SubmissionStatus,
};
pub use error::InternshipError;
pub use grading::{GradeInput, GradeSlot, SubmissionView};
pub use lifecycle::{ApprovalGate, TransitionAction, TransitionDecision, TransitionTable};
pub use memory::InMemoryStore;
pub use placement::{PlacementProposal, PlacementSource};
pub use repository::{InternshipStore, RepositoryError};
pub use router::internship_router;
pub use service::{InternshipService, QuickRegistration};
pub use supervisor::SupervisorAssignment;
