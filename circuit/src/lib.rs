pub mod errors;
pub mod gate;
pub mod load;

pub use errors::{CircuitError, CircuitEvalError, CircuitLoadError};
pub use gate::{BinaryOp, Circuit, CircuitInput, Gate, Owner, MAX_WIRES};
pub use load::{CircuitDescription, CircuitFile, GateDescription, GateKind};
