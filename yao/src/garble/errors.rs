use circuit::CircuitError;

/// Errors that may occur when garbling a circuit
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("circuit is malformed")]
    Malformed(#[from] CircuitError),
    #[error("uninitialized label, wire {0}")]
    UninitializedLabel(usize),
    #[error("wire {0} is not an input wire")]
    UnknownInput(usize),
    #[error("expected {expected} input bits, got {got}")]
    InputLength { expected: usize, got: usize },
}

/// Errors that may occur when evaluating a garbled circuit
#[derive(Debug, thiserror::Error)]
pub enum EvaluatorError {
    #[error("circuit is malformed")]
    Malformed(#[from] CircuitError),
    #[error("uninitialized label, wire {0}")]
    UninitializedLabel(usize),
    #[error("garbled row of gate {gate} did not decrypt to a well-formed label")]
    DecryptionFailure { gate: usize },
    #[error("expected {expected} garbled tables, got {got}")]
    TableCount { expected: usize, got: usize },
    #[error("garbled table of gate {gate} has {got} rows, expected {expected}")]
    RowCount {
        gate: usize,
        expected: usize,
        got: usize,
    },
    #[error("label for wire {0} which is not an input wire")]
    UnexpectedLabel(usize),
    #[error("more than one label for wire {0}")]
    DuplicateLabel(usize),
    #[error("no label for input wire {0}")]
    MissingLabel(usize),
    #[error("decode info does not match the output wires")]
    DecodeInfoMismatch,
}
