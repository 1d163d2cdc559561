pub mod cipher;
pub mod errors;
pub mod evaluator;
pub mod gc;
pub mod generator;
pub mod keys;

pub use errors::*;
pub use evaluator::*;
pub use gc::*;
pub use generator::*;
pub use keys::*;
