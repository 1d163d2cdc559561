use std::fmt;

use circuit::CircuitError;
use serde::{Deserialize, Serialize};

use crate::garble::{EvaluatorError, GeneratorError};
use crate::ot::{OTReceiverError, OTSenderError};
use crate::transport::TransportError;

/// Phases of a run, in the order they execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Garbling,
    Transfer,
    ObliviousTransfer,
    Evaluation,
    Output,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Garbling => "garbling",
            Phase::Transfer => "transfer",
            Phase::ObliviousTransfer => "oblivious transfer",
            Phase::Evaluation => "evaluation",
            Phase::Output => "output",
        };
        f.write_str(s)
    }
}

/// A failed run. Every failure is fatal, the run's key material is dropped with it.
#[derive(Debug, thiserror::Error)]
#[error("run aborted in {phase} phase: {kind}")]
pub struct RunError {
    pub phase: Phase,
    #[source]
    pub kind: RunErrorKind,
}

impl RunError {
    pub fn new(phase: Phase, kind: RunErrorKind) -> Self {
        Self { phase, kind }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self.kind, RunErrorKind::Transport(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunErrorKind {
    #[error("circuit is malformed: {0}")]
    CircuitMalformed(CircuitError),
    #[error("garbling failed: {0}")]
    Garbling(GeneratorError),
    #[error("evaluation failed: {0}")]
    Evaluation(EvaluatorError),
    #[error("oblivious transfer failed: {0}")]
    ObliviousTransfer(Box<dyn std::error::Error + Send + Sync>),
    #[error("transport failure: {0}")]
    Transport(TransportError),
    #[error("peer aborted in {phase} phase: {reason}")]
    PeerAborted { phase: Phase, reason: String },
    #[error("expected a {expected} message, got {got}")]
    UnexpectedMessage {
        expected: &'static str,
        got: &'static str,
    },
    #[error("configuration mismatch: {0}")]
    ConfigMismatch(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl RunErrorKind {
    #[inline]
    pub fn at(self, phase: Phase) -> RunError {
        RunError::new(phase, self)
    }
}

impl From<TransportError> for RunErrorKind {
    fn from(e: TransportError) -> Self {
        RunErrorKind::Transport(e)
    }
}

impl From<GeneratorError> for RunErrorKind {
    fn from(e: GeneratorError) -> Self {
        match e {
            GeneratorError::Malformed(e) => RunErrorKind::CircuitMalformed(e),
            e => RunErrorKind::Garbling(e),
        }
    }
}

impl From<EvaluatorError> for RunErrorKind {
    fn from(e: EvaluatorError) -> Self {
        match e {
            EvaluatorError::Malformed(e) => RunErrorKind::CircuitMalformed(e),
            e => RunErrorKind::Evaluation(e),
        }
    }
}

impl From<OTSenderError> for RunErrorKind {
    fn from(e: OTSenderError) -> Self {
        match e {
            OTSenderError::Transport(e) => RunErrorKind::Transport(e),
            OTSenderError::PeerAborted { phase, reason } => RunErrorKind::PeerAborted { phase, reason },
            OTSenderError::UnexpectedMessage(got) => RunErrorKind::UnexpectedMessage {
                expected: "ot",
                got,
            },
            e => RunErrorKind::ObliviousTransfer(Box::new(e)),
        }
    }
}

impl From<OTReceiverError> for RunErrorKind {
    fn from(e: OTReceiverError) -> Self {
        match e {
            OTReceiverError::Transport(e) => RunErrorKind::Transport(e),
            OTReceiverError::PeerAborted { phase, reason } => RunErrorKind::PeerAborted { phase, reason },
            OTReceiverError::UnexpectedMessage(got) => RunErrorKind::UnexpectedMessage {
                expected: "ot",
                got,
            },
            e => RunErrorKind::ObliviousTransfer(Box::new(e)),
        }
    }
}
