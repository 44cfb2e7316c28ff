//! Placement reconciliation: merging application, agreement, and partnered-company
//! directory data into the placement fields committed onto a student.

pub mod directory;
mod engine;

pub use engine::{apply_company, reconcile, PlacementProposal, PlacementSource, PlacementSources};
