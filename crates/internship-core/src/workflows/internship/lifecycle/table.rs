use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::super::domain::{ActorRole, InternshipStatus};

/// Action an actor asks the lifecycle to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
    Submit,
    Approve,
    Reject,
    Resubmit,
    SubmitAgreement,
    Verify,
    Assign,
}

impl TransitionAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Resubmit => "resubmit",
            Self::SubmitAgreement => "submit_agreement",
            Self::Verify => "verify",
            Self::Assign => "assign",
        }
    }
}

impl fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level condition an edge requires beyond the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Precondition {
    ApplicationOnFile,
    ApplicationRejected,
    AgreementOnFile,
    AgreementRejected,
    SelfSourcedCategory,
    UniversityAssignedCategory,
    PlacementCommitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionEdge {
    pub from: InternshipStatus,
    pub action: TransitionAction,
    pub to: InternshipStatus,
    pub roles: &'static [ActorRole],
    pub preconditions: &'static [Precondition],
}

impl TransitionEdge {
    pub fn allows(&self, role: ActorRole) -> bool {
        self.roles.contains(&role)
    }
}

const STUDENT: &[ActorRole] = &[ActorRole::Student];
const ADMINISTRATIVE: &[ActorRole] = &[ActorRole::Admin, ActorRole::SuperAdmin];

const EDGES: [TransitionEdge; 10] = [
    TransitionEdge {
        from: InternshipStatus::None,
        action: TransitionAction::Submit,
        to: InternshipStatus::Submitted,
        roles: STUDENT,
        preconditions: &[Precondition::ApplicationOnFile],
    },
    TransitionEdge {
        from: InternshipStatus::Submitted,
        action: TransitionAction::Approve,
        to: InternshipStatus::Approved,
        roles: ADMINISTRATIVE,
        preconditions: &[],
    },
    TransitionEdge {
        from: InternshipStatus::Submitted,
        action: TransitionAction::Reject,
        to: InternshipStatus::Rejected,
        roles: ADMINISTRATIVE,
        preconditions: &[],
    },
    TransitionEdge {
        from: InternshipStatus::Rejected,
        action: TransitionAction::Resubmit,
        to: InternshipStatus::Submitted,
        roles: STUDENT,
        preconditions: &[Precondition::ApplicationRejected],
    },
    TransitionEdge {
        from: InternshipStatus::Approved,
        action: TransitionAction::SubmitAgreement,
        to: InternshipStatus::AgreementSubmitted,
        roles: STUDENT,
        preconditions: &[
            Precondition::SelfSourcedCategory,
            Precondition::AgreementOnFile,
        ],
    },
    TransitionEdge {
        from: InternshipStatus::Approved,
        action: TransitionAction::Verify,
        to: InternshipStatus::Verified,
        roles: ADMINISTRATIVE,
        preconditions: &[Precondition::UniversityAssignedCategory],
    },
    TransitionEdge {
        from: InternshipStatus::AgreementSubmitted,
        action: TransitionAction::Verify,
        to: InternshipStatus::Verified,
        roles: ADMINISTRATIVE,
        preconditions: &[],
    },
    TransitionEdge {
        from: InternshipStatus::AgreementSubmitted,
        action: TransitionAction::Reject,
        to: InternshipStatus::Rejected,
        roles: ADMINISTRATIVE,
        preconditions: &[],
    },
    TransitionEdge {
        from: InternshipStatus::Rejected,
        action: TransitionAction::SubmitAgreement,
        to: InternshipStatus::AgreementSubmitted,
        roles: STUDENT,
        preconditions: &[Precondition::AgreementRejected],
    },
    TransitionEdge {
        from: InternshipStatus::Verified,
        action: TransitionAction::Assign,
        to: InternshipStatus::InternshipAssigned,
        roles: ADMINISTRATIVE,
        preconditions: &[Precondition::PlacementCommitted],
    },
];

/// A display stage of the internship pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStage {
    pub position: usize,
    pub status: InternshipStatus,
    pub label: &'static str,
}

/// Lookup of every legal status edge keyed by `(current status, action)`.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    edges: BTreeMap<(InternshipStatus, TransitionAction), TransitionEdge>,
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TransitionTable {
    pub fn standard() -> Self {
        Self::from_edges(&EDGES)
    }

    pub fn from_edges(edges: &[TransitionEdge]) -> Self {
        let edges = edges
            .iter()
            .map(|edge| ((edge.from, edge.action), *edge))
            .collect();
        Self { edges }
    }

    pub fn lookup(
        &self,
        from: InternshipStatus,
        action: TransitionAction,
    ) -> Option<&TransitionEdge> {
        self.edges.get(&(from, action))
    }

    pub fn edges(&self) -> impl Iterator<Item = &TransitionEdge> {
        self.edges.values()
    }

    pub fn edges_from(&self, from: InternshipStatus) -> impl Iterator<Item = &TransitionEdge> {
        self.edges
            .range((from, TransitionAction::Submit)..=(from, TransitionAction::Assign))
            .map(|(_, edge)| edge)
    }

    /// Every status reachable from `start` by following table edges.
    pub fn reachable_from(&self, start: InternshipStatus) -> BTreeSet<InternshipStatus> {
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(status) = queue.pop_front() {
            for edge in self.edges_from(status) {
                if seen.insert(edge.to) {
                    queue.push_back(edge.to);
                }
            }
        }

        seen
    }

    /// Forward pipeline derived breadth-first from `none`, skipping rejection branches.
    pub fn pipeline(&self) -> Vec<PipelineStage> {
        let mut order = vec![InternshipStatus::None];
        let mut queue = VecDeque::from([InternshipStatus::None]);

        while let Some(status) = queue.pop_front() {
            for edge in self.edges_from(status) {
                if edge.to == InternshipStatus::Rejected || order.contains(&edge.to) {
                    continue;
                }
                order.push(edge.to);
                queue.push_back(edge.to);
            }
        }

        order
            .into_iter()
            .enumerate()
            .map(|(position, status)| PipelineStage {
                position,
                status,
                label: status.label(),
            })
            .collect()
    }
}
