//! Yao garbled circuits for two parties: a garbler and an evaluator.

pub mod config;
pub mod errors;
pub mod garble;
pub mod msg;
pub mod ot;
pub mod transport;
pub mod yao_prot;

pub use config::{OtMode, Party, ProtocolConfig};
pub use errors::{Phase, RunError, RunErrorKind};
pub use garble::*;
pub use msg::*;
pub use ot::*;
pub use transport::*;
pub use yao_prot::*;
