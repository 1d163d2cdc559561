//! Define the structure of gates and circuits.
//!
//! Wires are plain integer ids indexing flat per-circuit arrays. A circuit is a list of
//! gates in topological order; every wire is written exactly once, either as a declared
//! input or as the output of one gate.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CircuitError, CircuitEvalError};

/// Upper bound on `nwires`, keeps per-wire arrays allocatable for untrusted circuits.
pub const MAX_WIRES: usize = 1 << 24;

/// Two-input gate operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 6] = [
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
        BinaryOp::Nand,
        BinaryOp::Nor,
        BinaryOp::Xnor,
    ];

    #[inline]
    pub fn eval(&self, x: bool, y: bool) -> bool {
        match self {
            BinaryOp::And => x & y,
            BinaryOp::Or => x | y,
            BinaryOp::Xor => x ^ y,
            BinaryOp::Nand => !(x & y),
            BinaryOp::Nor => !(x | y),
            BinaryOp::Xnor => !(x ^ y),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Xor => "XOR",
            BinaryOp::Nand => "NAND",
            BinaryOp::Nor => "NOR",
            BinaryOp::Xnor => "XNOR",
        }
    }
}

/// `lin_id`, `rin_id` are the wire ids of two fan-in gate inputs.
/// `out_id` is the wire id of the gate output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gate {
    Binary {
        op: BinaryOp,
        lin_id: usize,
        rin_id: usize,
        out_id: usize,
    },
    Inv {
        lin_id: usize,
        out_id: usize,
    },
}

impl Gate {
    pub fn and(lin_id: usize, rin_id: usize, out_id: usize) -> Self {
        Gate::binary(BinaryOp::And, lin_id, rin_id, out_id)
    }

    pub fn xor(lin_id: usize, rin_id: usize, out_id: usize) -> Self {
        Gate::binary(BinaryOp::Xor, lin_id, rin_id, out_id)
    }

    pub fn binary(op: BinaryOp, lin_id: usize, rin_id: usize, out_id: usize) -> Self {
        Gate::Binary {
            op,
            lin_id,
            rin_id,
            out_id,
        }
    }

    pub fn inv(lin_id: usize, out_id: usize) -> Self {
        Gate::Inv { lin_id, out_id }
    }

    #[inline]
    pub fn out_id(&self) -> usize {
        match *self {
            Gate::Binary { out_id, .. } | Gate::Inv { out_id, .. } => out_id,
        }
    }

    /// Input wire ids in order: left then right.
    #[inline]
    pub fn input_ids(&self) -> impl Iterator<Item = usize> {
        let (lin_id, rin_id) = match *self {
            Gate::Binary { lin_id, rin_id, .. } => (lin_id, Some(rin_id)),
            Gate::Inv { lin_id, .. } => (lin_id, None),
        };
        std::iter::once(lin_id).chain(rin_id)
    }

    #[inline]
    pub fn arity(&self) -> usize {
        match self {
            Gate::Binary { .. } => 2,
            Gate::Inv { .. } => 1,
        }
    }
}

/// Owner of a wire, derived from the circuit's partitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    Garbler,
    Evaluator,
    Internal,
    Output,
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Owner::Garbler => "garbler",
            Owner::Evaluator => "evaluator",
            Owner::Internal => "internal",
            Owner::Output => "output",
        };
        f.write_str(s)
    }
}

/// Circuit input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircuitInput {
    /// Circuit input id
    pub id: usize,

    /// Circuit input value
    pub value: bool,
}

/// Define a circuit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circuit {
    /// Circuit identifier
    pub id: String,
    /// Wire ids range over `0..nwires`
    pub nwires: usize,
    /// Input wires owned by the garbler
    pub garbler_inputs: Vec<usize>,
    /// Input wires owned by the evaluator
    pub evaluator_inputs: Vec<usize>,
    /// Output wires, in output order
    pub outputs: Vec<usize>,
    /// All gates in topological order
    pub gates: Vec<Gate>,
}

impl Circuit {
    /// Assemble a circuit and check it, `nwires` is one past the largest wire id used.
    pub fn new(
        id: impl Into<String>,
        garbler_inputs: Vec<usize>,
        evaluator_inputs: Vec<usize>,
        outputs: Vec<usize>,
        gates: Vec<Gate>,
    ) -> Result<Self, CircuitError> {
        let max_id = garbler_inputs
            .iter()
            .chain(evaluator_inputs.iter())
            .chain(outputs.iter())
            .copied()
            .chain(gates.iter().flat_map(|g| g.input_ids().chain([g.out_id()])))
            .max();
        let nwires = match max_id {
            Some(id) if id >= MAX_WIRES => return Err(CircuitError::WireOutOfRange(id)),
            Some(id) => id + 1,
            None => 0,
        };

        let circ = Self {
            id: id.into(),
            nwires,
            garbler_inputs,
            evaluator_inputs,
            outputs,
            gates,
        };
        circ.validate()?;
        Ok(circ)
    }

    #[inline]
    pub fn ngates(&self) -> usize {
        self.gates.len()
    }

    #[inline]
    pub fn ninput_wires(&self) -> usize {
        self.garbler_inputs.len() + self.evaluator_inputs.len()
    }

    #[inline]
    pub fn noutput_wires(&self) -> usize {
        self.outputs.len()
    }

    /// All input wires, garbler's first.
    pub fn input_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.garbler_inputs
            .iter()
            .chain(self.evaluator_inputs.iter())
            .copied()
    }

    /// Owner of wire `id`, `None` if the circuit never writes it.
    pub fn owner(&self, id: usize) -> Option<Owner> {
        if self.outputs.contains(&id) {
            Some(Owner::Output)
        } else if self.garbler_inputs.contains(&id) {
            Some(Owner::Garbler)
        } else if self.evaluator_inputs.contains(&id) {
            Some(Owner::Evaluator)
        } else if self.gates.iter().any(|g| g.out_id() == id) {
            Some(Owner::Internal)
        } else {
            None
        }
    }

    /// Check single static assignment and topological order.
    pub fn validate(&self) -> Result<(), CircuitError> {
        if self.nwires > MAX_WIRES {
            return Err(CircuitError::WireOutOfRange(self.nwires));
        }
        let in_range = |id: usize| {
            if id < self.nwires {
                Ok(id)
            } else {
                Err(CircuitError::WireOutOfRange(id))
            }
        };

        // Gate index that writes each wire, used to tell cycles from undeclared wires.
        let mut writer: Vec<Option<usize>> = vec![None; self.nwires];
        for (gid, gate) in self.gates.iter().enumerate() {
            let out = in_range(gate.out_id())?;
            if writer[out].is_some() {
                return Err(CircuitError::DuplicateWire(out));
            }
            writer[out] = Some(gid);
        }

        let mut defined = vec![false; self.nwires];
        for id in self.input_ids() {
            let id = in_range(id)?;
            if defined[id] || writer[id].is_some() {
                return Err(CircuitError::DuplicateWire(id));
            }
            defined[id] = true;
        }

        for (gid, gate) in self.gates.iter().enumerate() {
            for input in gate.input_ids() {
                let input = in_range(input)?;
                if defined[input] {
                    continue;
                }
                return match writer[input] {
                    Some(_) => Err(CircuitError::NotTopological {
                        gate: gid,
                        wire: input,
                    }),
                    None => Err(CircuitError::UndeclaredWire {
                        gate: gid,
                        wire: input,
                    }),
                };
            }
            defined[gate.out_id()] = true;
        }

        if self.outputs.is_empty() {
            return Err(CircuitError::NoOutputs);
        }
        let mut listed = vec![false; self.nwires];
        for &id in self.outputs.iter() {
            let id = in_range(id)?;
            if !defined[id] {
                return Err(CircuitError::UndeclaredOutput(id));
            }
            if listed[id] {
                return Err(CircuitError::DuplicateOutput(id));
            }
            listed[id] = true;
        }

        Ok(())
    }

    /// Evaluate the circuit in plaintext with the provided inputs
    pub fn eval(&self, inputs: &[CircuitInput]) -> Result<Vec<bool>, CircuitEvalError> {
        self.validate()?;
        let mut wires: Vec<Option<bool>> = vec![None; self.nwires];
        for input in inputs.iter() {
            let slot = wires
                .get_mut(input.id)
                .ok_or(CircuitEvalError::UnknownInput(input.id))?;
            *slot = Some(input.value);
        }

        for gate in self.gates.iter() {
            let (out_id, val) = match *gate {
                Gate::Binary {
                    op,
                    lin_id,
                    rin_id,
                    out_id,
                } => {
                    let x = wires[lin_id].ok_or(CircuitEvalError::UninitializedValue(lin_id))?;
                    let y = wires[rin_id].ok_or(CircuitEvalError::UninitializedValue(rin_id))?;
                    (out_id, op.eval(x, y))
                }
                Gate::Inv { lin_id, out_id } => {
                    let x = wires[lin_id].ok_or(CircuitEvalError::UninitializedValue(lin_id))?;
                    (out_id, !x)
                }
            };
            wires[out_id] = Some(val);
        }

        self.outputs
            .iter()
            .map(|&id| wires[id].ok_or(CircuitEvalError::UninitializedValue(id)))
            .collect()
    }

    /// Evaluate with the garbler's and evaluator's bits given in partition order.
    pub fn eval_bits(&self, garbler: &[bool], evaluator: &[bool]) -> Result<Vec<bool>, CircuitEvalError> {
        if garbler.len() != self.garbler_inputs.len() {
            return Err(CircuitEvalError::InputLength {
                owner: Owner::Garbler,
                expected: self.garbler_inputs.len(),
                got: garbler.len(),
            });
        }
        if evaluator.len() != self.evaluator_inputs.len() {
            return Err(CircuitEvalError::InputLength {
                owner: Owner::Evaluator,
                expected: self.evaluator_inputs.len(),
                got: evaluator.len(),
            });
        }

        let inputs: Vec<CircuitInput> = self
            .input_ids()
            .zip(garbler.iter().chain(evaluator.iter()))
            .map(|(id, &value)| CircuitInput { id, value })
            .collect();
        self.eval(&inputs)
    }
}
