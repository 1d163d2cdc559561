pub mod yao_eval;

pub use yao_eval::*;

use super::errors::EvaluatorError;
use crate::garble::{GarbledCircuitTable, OutputDecodeInfo, WireLabel};
use circuit::Circuit;

pub trait GCEvaluator {
    /// Evaluate a garbled circuit, returning the labels of the output wires
    fn eval(
        &self,
        circ: &Circuit,
        gc_table: &GarbledCircuitTable,
        input_labels: &[WireLabel],
    ) -> Result<Vec<WireLabel>, EvaluatorError>;

    /// Decode output labels into bits
    fn finalize(
        &self,
        output_labels: &[WireLabel],
        decode_info: &[OutputDecodeInfo],
    ) -> Result<Vec<bool>, EvaluatorError>;
}
