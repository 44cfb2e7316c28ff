//! Internship lifecycle: the static transition table and the gate that validates
//! requested transitions against it.

mod gate;
mod table;

pub use gate::{ApprovalGate, TransitionDecision, TransitionSnapshot};
pub use table::{PipelineStage, Precondition, TransitionAction, TransitionEdge, TransitionTable};
