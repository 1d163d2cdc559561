use crate::errors::Phase;
use crate::msg::OtRound;
use crate::transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum OTSenderError {
    #[error("Sender got an invalid point for wire {wire}")]
    InvalidPoint { wire: usize },

    #[error("Sender expected round {expected} for wire {wire}, got {got}")]
    RoundMismatch {
        wire: usize,
        expected: OtRound,
        got: OtRound,
    },

    #[error("Sender expected a message for wire {expected}, got wire {got}")]
    WireMismatch { expected: usize, got: usize },

    #[error("Sender has nothing to transfer for wire {0}")]
    UnknownWire(usize),

    #[error("Sender already transferred wire {0}")]
    DuplicateWire(usize),

    #[error("Sender got a {0} message during the transfer")]
    UnexpectedMessage(&'static str),

    #[error("Receiver aborted in {phase} phase: {reason}")]
    PeerAborted { phase: Phase, reason: String },

    #[error("Sender transport error")]
    Transport(#[from] TransportError),
}

#[derive(Debug, thiserror::Error)]
pub enum OTReceiverError {
    #[error("Receiver got an invalid point for wire {wire}")]
    InvalidPoint { wire: usize },

    #[error("Receiver expected round {expected} for wire {wire}, got {got}")]
    RoundMismatch {
        wire: usize,
        expected: OtRound,
        got: OtRound,
    },

    #[error("Receiver expected a message for wire {expected}, got wire {got}")]
    WireMismatch { expected: usize, got: usize },

    #[error("Receiver asked twice for wire {0}")]
    DuplicateWire(usize),

    #[error("Receiver got a malformed label for wire {0}")]
    MalformedLabel(usize),

    #[error("Receiver got a {0} message during the transfer")]
    UnexpectedMessage(&'static str),

    #[error("Sender aborted in {phase} phase: {reason}")]
    PeerAborted { phase: Phase, reason: String },

    #[error("Receiver transport error")]
    Transport(#[from] TransportError),
}
