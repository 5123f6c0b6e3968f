//! Sequencer phases and per-step status.

use std::fmt;

use crate::trajectory::ThrowPlan;

/// Where the throw sequencer is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThrowPhase {
    #[default]
    Idle,
    LiftingUp,
    GateOpening,
    GateClosing,
    LiftingDown,
}

impl fmt::Display for ThrowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ThrowPhase::Idle => "idle",
            ThrowPhase::LiftingUp => "lifting up",
            ThrowPhase::GateOpening => "gate opening",
            ThrowPhase::GateClosing => "gate closing",
            ThrowPhase::LiftingDown => "lifting down",
        })
    }
}

/// Summary of a finished throw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowReport {
    pub plan: ThrowPlan,
    /// Wall time of the whole cycle as seen by the sequencer's clock.
    pub elapsed_ms: u64,
}

/// Result of a single `step()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrowStatus {
    /// Transition done; the sequencer is now in this phase.
    Running(ThrowPhase),
    /// Back in `Idle`; the throw is finished.
    Complete(ThrowReport),
}
