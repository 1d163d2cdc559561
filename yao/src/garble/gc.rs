//! Define the struct of garbled circuit.

use circuit::{Circuit, CircuitInput};
use crypto_core::Block;
use serde::{Deserialize, Serialize};

use super::errors::GeneratorError;
use super::keys::KeyMaterial;

/// What the evaluator holds for a wire: one key and its external bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireLabel {
    /// wire id
    pub id: usize,
    /// wire key
    pub key: Block,
    /// semantic value XOR pbit
    pub external_bit: bool,
}

impl WireLabel {
    /// The two-block plaintext form, `[key, 0 or 1]`.
    #[inline]
    pub fn to_blocks(&self) -> [Block; 2] {
        [self.key, Block::from(self.external_bit)]
    }

    /// Inverse of `to_blocks`, `None` unless the second block is exactly 0 or 1.
    #[inline]
    pub fn from_blocks(id: usize, blocks: [Block; 2]) -> Option<Self> {
        let external_bit = match blocks[1].as_u128() {
            0 => false,
            1 => true,
            _ => return None,
        };
        Some(Self {
            id,
            key: blocks[0],
            external_bit,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDecodeInfo {
    /// Output wire id
    pub id: usize,
    /// Permutation bit of the output wire
    pub decode_info: bool,
}

/// Rows of one garbled gate, indexed by the external bits of its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarbledTable {
    pub rows: Vec<[Block; 2]>,
}

/// garbled tables (independent of the inputs) sent to the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarbledCircuitTable {
    pub tables: Vec<GarbledTable>,
}

impl GarbledCircuitTable {
    pub fn new(tables: Vec<GarbledTable>) -> Self {
        Self { tables }
    }

    pub fn ngates(&self) -> usize {
        self.tables.len()
    }
}

/// Information used in garbled circuit, and only held by the generator.
#[derive(Debug, Clone)]
pub struct GarbledCircuitLocal {
    pub keys: KeyMaterial,
    pub garbler_inputs: Vec<usize>,
    pub evaluator_inputs: Vec<usize>,
    pub outputs: Vec<usize>,
}

impl GarbledCircuitLocal {
    pub fn new(circ: &Circuit, keys: KeyMaterial) -> Self {
        Self {
            keys,
            garbler_inputs: circ.garbler_inputs.clone(),
            evaluator_inputs: circ.evaluator_inputs.clone(),
            outputs: circ.outputs.clone(),
        }
    }

    /// Labels for the given semantic input values.
    pub fn encode(&self, inputs: &[CircuitInput]) -> Result<Vec<WireLabel>, GeneratorError> {
        inputs
            .iter()
            .map(|input| {
                if !self.is_input(input.id) {
                    return Err(GeneratorError::UnknownInput(input.id));
                }
                self.keys
                    .label(input.id, input.value)
                    .ok_or(GeneratorError::UninitializedLabel(input.id))
            })
            .collect()
    }

    /// Labels of the garbler's input wires, `bits` in partition order.
    pub fn encode_garbler(&self, bits: &[bool]) -> Result<Vec<WireLabel>, GeneratorError> {
        if bits.len() != self.garbler_inputs.len() {
            return Err(GeneratorError::InputLength {
                expected: self.garbler_inputs.len(),
                got: bits.len(),
            });
        }
        let inputs: Vec<CircuitInput> = self
            .garbler_inputs
            .iter()
            .zip(bits)
            .map(|(&id, &value)| CircuitInput { id, value })
            .collect();
        self.encode(&inputs)
    }

    /// Both labels of an input wire, indexed by semantic value.
    pub fn label_pair(&self, id: usize) -> Result<[WireLabel; 2], GeneratorError> {
        if !self.is_input(id) {
            return Err(GeneratorError::UnknownInput(id));
        }
        let pair = self
            .keys
            .get(id)
            .ok_or(GeneratorError::UninitializedLabel(id))?;
        Ok([pair.label(id, false), pair.label(id, true)])
    }

    /// Both labels of every evaluator input wire, in partition order.
    pub fn evaluator_label_pairs(&self) -> Result<Vec<[WireLabel; 2]>, GeneratorError> {
        self.evaluator_inputs
            .iter()
            .map(|&id| self.label_pair(id))
            .collect()
    }

    pub fn decode_info(&self) -> Result<Vec<OutputDecodeInfo>, GeneratorError> {
        self.outputs
            .iter()
            .map(|&id| {
                let pbit = self
                    .keys
                    .pbit(id)
                    .ok_or(GeneratorError::UninitializedLabel(id))?;
                Ok(OutputDecodeInfo {
                    id,
                    decode_info: pbit,
                })
            })
            .collect()
    }

    fn is_input(&self, id: usize) -> bool {
        self.garbler_inputs.contains(&id) || self.evaluator_inputs.contains(&id)
    }
}

#[derive(Debug, Clone)]
pub struct GarbledCircuit {
    pub gc_table: GarbledCircuitTable,
    pub gc_local: GarbledCircuitLocal,
}

impl GarbledCircuit {
    pub fn new(gc_table: GarbledCircuitTable, gc_local: GarbledCircuitLocal) -> Self {
        Self { gc_table, gc_local }
    }
}
