//! Messages exchanged by the two parties of a run.

use std::fmt;

use circuit::Circuit;
use crypto_core::Block;
use serde::{Deserialize, Serialize};

use crate::errors::Phase;
use crate::garble::{GarbledCircuitTable, OutputDecodeInfo, WireLabel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    Bundle(Box<GarbledBundle>),
    Ot(OtMessage),
    Result(ResultMessage),
    /// The sender gave up on the run in `phase`.
    Abort { phase: Phase, reason: String },
}

impl Message {
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Bundle(_) => "bundle",
            Message::Ot(_) => "ot",
            Message::Result(_) => "result",
            Message::Abort { .. } => "abort",
        }
    }
}

/// Everything the evaluator needs apart from its own input labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarbledBundle {
    pub circuit: Circuit,
    pub tables: GarbledCircuitTable,
    pub decode_info: Vec<OutputDecodeInfo>,
    /// Active labels of the garbler's input wires
    pub garbler_labels: Vec<WireLabel>,
    /// Both labels of every evaluator input wire, only when oblivious transfer is
    /// disabled. Reveals the evaluator's input to anyone holding the garbler's keys.
    pub evaluator_labels: Option<Vec<[WireLabel; 2]>>,
    /// The evaluator sends the output back to the garbler
    pub share_output: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OtRound {
    Request = 1,
    Setup = 2,
    Choice = 3,
    Transfer = 4,
}

impl fmt::Display for OtRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, *self as u8)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OtPayload {
    /// Receiver asks for the transfer of a wire.
    Request,
    /// Sender's compressed public point.
    Setup([u8; 32]),
    /// Receiver's compressed blinded point.
    Choice([u8; 32]),
    /// Both messages, each under its own pad.
    Transfer([[Block; 2]; 2]),
}

impl OtPayload {
    pub fn round(&self) -> OtRound {
        match self {
            OtPayload::Request => OtRound::Request,
            OtPayload::Setup(_) => OtRound::Setup,
            OtPayload::Choice(_) => OtRound::Choice,
            OtPayload::Transfer(_) => OtRound::Transfer,
        }
    }
}

/// One round of the oblivious transfer of a wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtMessage {
    pub wire: usize,
    pub payload: OtPayload,
}

impl OtMessage {
    pub fn new(wire: usize, payload: OtPayload) -> Self {
        Self { wire, payload }
    }

    #[inline]
    pub fn round(&self) -> OtRound {
        self.payload.round()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputBit {
    pub wire: usize,
    pub value: bool,
}

/// Output bits of a run, sent by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMessage {
    pub circuit_id: String,
    pub outputs: Vec<OutputBit>,
}

impl ResultMessage {
    pub fn new(circ: &Circuit, bits: &[bool]) -> Self {
        let outputs = circ
            .outputs
            .iter()
            .zip(bits)
            .map(|(&wire, &value)| OutputBit { wire, value })
            .collect();
        Self {
            circuit_id: circ.id.clone(),
            outputs,
        }
    }

    pub fn bits(&self) -> Vec<bool> {
        self.outputs.iter().map(|o| o.value).collect()
    }
}
