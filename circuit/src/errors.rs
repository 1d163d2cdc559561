use crate::gate::Owner;

/// A circuit that breaks single static assignment or topological order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CircuitError {
    #[error("gate {gate} reads undeclared wire {wire}")]
    UndeclaredWire { gate: usize, wire: usize },
    #[error("gate {gate} reads wire {wire} before it is written (cycle or non-topological order)")]
    NotTopological { gate: usize, wire: usize },
    #[error("wire {0} is written more than once")]
    DuplicateWire(usize),
    #[error("output wire {0} is never written")]
    UndeclaredOutput(usize),
    #[error("output wire {0} is listed more than once")]
    DuplicateOutput(usize),
    #[error("circuit has no output wires")]
    NoOutputs,
    #[error("wire id {0} is out of range")]
    WireOutOfRange(usize),
    #[error("gate writing wire {wire} has {got} inputs, {op} takes {expected}")]
    WrongArity {
        wire: usize,
        op: String,
        expected: usize,
        got: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CircuitEvalError {
    #[error("uninitialized value, wire {0}")]
    UninitializedValue(usize),
    #[error("input for unknown wire {0}")]
    UnknownInput(usize),
    #[error("expected {expected} {owner} input bits, got {got}")]
    InputLength {
        owner: Owner,
        expected: usize,
        got: usize,
    },
    #[error(transparent)]
    Malformed(#[from] CircuitError),
}

#[derive(Debug, thiserror::Error)]
pub enum CircuitLoadError {
    #[error("encountered error while parsing circuit")]
    ParsingError(#[from] anyhow::Error),
    /// An I/O error occurred.
    #[error("encountered io error while loading circuit")]
    IoError(#[from] std::io::Error),
    #[error("invalid circuit description")]
    JsonError(#[from] serde_json::Error),
    #[error("malformed circuit {id}")]
    Malformed {
        id: String,
        #[source]
        source: CircuitError,
    },
    #[error("no circuit with id {0}")]
    UnknownCircuit(String),
}
