pub mod yao_gen;

pub use yao_gen::*;

use super::errors::GeneratorError;
use crate::garble::{GarbledCircuit, GarbledCircuitLocal, OutputDecodeInfo};
use circuit::Circuit;
use rand::{CryptoRng, Rng};

pub trait GCGenerator {
    /// Generate a garbled circuit with fresh key material
    fn garble<R: Rng + CryptoRng>(
        &mut self,
        rng: &mut R,
        circ: &Circuit,
    ) -> Result<GarbledCircuit, GeneratorError>;

    /// Decoding information of the output wires
    fn finalize(&self, gc_local: &GarbledCircuitLocal)
        -> Result<Vec<OutputDecodeInfo>, GeneratorError>;
}
