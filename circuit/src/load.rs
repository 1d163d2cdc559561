//! Load circuits from JSON circuit files and Bristol-fashion files.

use crate::errors::{CircuitError, CircuitLoadError};
use crate::gate::{BinaryOp, Circuit, Gate, MAX_WIRES};
use anyhow::{anyhow, Context};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// A JSON circuit file: `{"name": .., "circuits": [..]}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CircuitFile {
    #[serde(default)]
    pub name: Option<String>,
    pub circuits: Vec<CircuitDescription>,
}

/// One circuit as written in a JSON circuit file. `alice` lists the garbler's input
/// wires, `bob` the evaluator's.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CircuitDescription {
    pub id: String,
    #[serde(default)]
    pub alice: Vec<usize>,
    #[serde(default)]
    pub bob: Vec<usize>,
    pub out: Vec<usize>,
    pub gates: Vec<GateDescription>,
}

/// A gate entry, `id` is the wire the gate writes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateDescription {
    pub id: usize,
    #[serde(rename = "type")]
    pub kind: GateKind,
    #[serde(rename = "in")]
    pub inputs: Vec<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateKind {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
    #[serde(alias = "INV")]
    Not,
}

impl GateKind {
    fn binary_op(&self) -> Option<BinaryOp> {
        match self {
            GateKind::And => Some(BinaryOp::And),
            GateKind::Or => Some(BinaryOp::Or),
            GateKind::Xor => Some(BinaryOp::Xor),
            GateKind::Nand => Some(BinaryOp::Nand),
            GateKind::Nor => Some(BinaryOp::Nor),
            GateKind::Xnor => Some(BinaryOp::Xnor),
            GateKind::Not => None,
        }
    }
}

impl TryFrom<&GateDescription> for Gate {
    type Error = CircuitError;

    fn try_from(desc: &GateDescription) -> Result<Self, Self::Error> {
        let arity_error = |expected: usize| CircuitError::WrongArity {
            wire: desc.id,
            op: format!("{:?}", desc.kind).to_uppercase(),
            expected,
            got: desc.inputs.len(),
        };
        match (desc.kind.binary_op(), desc.inputs.as_slice()) {
            (Some(op), &[lin_id, rin_id]) => Ok(Gate::binary(op, lin_id, rin_id, desc.id)),
            (Some(_), _) => Err(arity_error(2)),
            (None, &[lin_id]) => Ok(Gate::inv(lin_id, desc.id)),
            (None, _) => Err(arity_error(1)),
        }
    }
}

impl TryFrom<&CircuitDescription> for Circuit {
    type Error = CircuitError;

    fn try_from(desc: &CircuitDescription) -> Result<Self, Self::Error> {
        let gates = desc
            .gates
            .iter()
            .map(Gate::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Circuit::new(
            desc.id.clone(),
            desc.alice.clone(),
            desc.bob.clone(),
            desc.out.clone(),
            gates,
        )
    }
}

impl CircuitFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CircuitLoadError> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("Failed to read circuit file {}", path.display()))?;
        Ok(serde_json::from_reader(BufReader::new(f))?)
    }

    pub fn from_json(json: &str) -> Result<Self, CircuitLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Ids of the circuits in file order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.circuits.iter().map(|c| c.id.as_str())
    }

    /// Build and check the circuit named `id`.
    pub fn circuit(&self, id: &str) -> Result<Circuit, CircuitLoadError> {
        let desc = self
            .circuits
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| CircuitLoadError::UnknownCircuit(id.to_string()))?;
        Circuit::try_from(desc).map_err(|source| CircuitLoadError::Malformed {
            id: id.to_string(),
            source,
        })
    }
}

/// Parse caputres into a Vec
fn parse_to_vec<'a>(re: &Regex, line: &'a str) -> Vec<&'a str> {
    re.captures_iter(line)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str())
        .collect()
}

fn parse_usize(s: &str, what: &str) -> Result<usize, CircuitLoadError> {
    let n = s
        .parse::<usize>()
        .with_context(|| format!("Failed to parse {what}: {s}"))?;
    Ok(n)
}

/// Parse a header line `n x_1 .. x_n`, returning the `x_i`.
fn parse_counts(re: &Regex, line: &str, what: &str) -> Result<Vec<usize>, CircuitLoadError> {
    let fields = parse_to_vec(re, line);
    let (count, rest) = fields
        .split_first()
        .ok_or_else(|| anyhow!("Missing {what} line"))?;
    let count = parse_usize(count, what)?;
    let sizes = rest
        .iter()
        .map(|s| parse_usize(s, what))
        .collect::<Result<Vec<_>, _>>()?;
    if sizes.len() != count {
        return Err(CircuitLoadError::ParsingError(anyhow!(
            "Expecting wire count to be specified for every {what}: {line}"
        )));
    }
    Ok(sizes)
}

impl Circuit {
    /// Load and Parse circuit files in Bristol Fashion format as specified here:
    /// `https://homes.esat.kuleuven.be/~nsmart/MPC/`
    ///
    /// The first input belongs to the garbler and the remaining inputs to the evaluator.
    pub fn load_bristol<P: AsRef<Path>>(path: P) -> Result<Self, CircuitLoadError> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("Failed to read circuit from {}", path.display()))?;
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::parse_bristol(id, BufReader::new(f))
    }

    pub fn parse_bristol<R: BufRead>(id: impl Into<String>, mut reader: R) -> Result<Self, CircuitLoadError> {
        let id = id.into();

        // Parse first line: ngates nwires\n
        let mut line = String::new();
        reader.read_line(&mut line).context("Failed to read line")?;
        let re = Regex::new(r"(\d+)").context("Failed to compile regex")?;
        let line_1 = parse_to_vec(&re, &line);

        // Check fisrt line has 2 values: ngates, nwires
        if line_1.len() != 2 {
            return Err(CircuitLoadError::ParsingError(anyhow!(
                "Expecting line to be ngates, nwires: {}",
                line
            )));
        }
        let ngates = parse_usize(line_1[0], "ngates")?;
        let nwires = parse_usize(line_1[1], "nwires")?;
        // Every gate writes its own wire, so both are bounded by the wire cap.
        if nwires > MAX_WIRES || ngates > nwires {
            return Err(CircuitLoadError::ParsingError(anyhow!(
                "Header out of range, ngates {ngates} nwires {nwires} (at most {MAX_WIRES} wires)"
            )));
        }

        // Parse second line: ninputs input_0_wires input_1_nwires...
        let re = Regex::new(r"(\d+)\s*").context("Failed to compile regex")?;
        let mut line = String::new();
        reader.read_line(&mut line).context("Failed to read line")?;
        let input_nwires = parse_counts(&re, &line, "input")?;

        // Parse third line: noutputs output_0_nwires output_1_nwires...
        let mut line = String::new();
        reader.read_line(&mut line).context("Failed to read line")?;
        let output_nwires = parse_counts(&re, &line, "output")?;

        let total = |sizes: &[usize]| {
            sizes
                .iter()
                .try_fold(0usize, |acc, &n| acc.checked_add(n))
                .filter(|&n| n <= nwires)
        };
        let (ninput_wires, noutput_wires) = match (total(&input_nwires), total(&output_nwires)) {
            (Some(i), Some(o)) => (i, o),
            _ => {
                return Err(CircuitLoadError::ParsingError(anyhow!(
                    "More input or output wires than nwires {nwires}"
                )))
            }
        };
        let garbler_nwires = input_nwires.first().copied().unwrap_or(0);
        let garbler_inputs: Vec<usize> = (0..garbler_nwires).collect();
        let evaluator_inputs: Vec<usize> = (garbler_nwires..ninput_wires).collect();
        // The last `noutput_wires` wires are the outputs.
        let outputs: Vec<usize> = (nwires - noutput_wires..nwires).collect();

        let re = Regex::new(r"(\d+|\S+)\s*").context("Failed to compile regex")?;
        let mut gates = Vec::with_capacity(ngates);

        // Process gates
        for line in reader.lines() {
            let line = line.context("Failed to read line")?;
            if line.trim().is_empty() {
                continue;
            }
            let gate_info = parse_to_vec(&re, &line);
            let field = |i: usize| -> Result<usize, CircuitLoadError> {
                let s = gate_info
                    .get(i)
                    .ok_or_else(|| anyhow!("Truncated gate: {line}"))?;
                parse_usize(s, "gate")
            };
            let gate_type = gate_info.last().copied().unwrap_or_default();
            let gate = match gate_type {
                "INV" | "NOT" => Gate::inv(field(2)?, field(3)?),
                "AND" => Gate::and(field(2)?, field(3)?, field(4)?),
                "XOR" => Gate::xor(field(2)?, field(3)?, field(4)?),
                _ => {
                    return Err(CircuitLoadError::ParsingError(anyhow!(
                        "Encountered unsupported gate type: {}",
                        gate_type
                    )));
                }
            };
            if gates.len() == ngates {
                return Err(CircuitLoadError::ParsingError(anyhow!(
                    "More than {ngates} gates"
                )));
            }
            gates.push(gate);
        }
        if gates.len() != ngates {
            return Err(CircuitLoadError::ParsingError(anyhow!(
                "Expecting {ngates} gates, parsed {}",
                gates.len()
            )));
        }

        let circ = Circuit::new(id.clone(), garbler_inputs, evaluator_inputs, outputs, gates)
            .map_err(|source| CircuitLoadError::Malformed { id, source })?;
        if circ.nwires > nwires {
            return Err(CircuitLoadError::ParsingError(anyhow!(
                "Gates reference wire ids beyond nwires {nwires}"
            )));
        }
        Ok(circ)
    }
}
