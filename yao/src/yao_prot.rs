//! One protocol run per party: garbling, transfer of the bundle, oblivious transfer,
//! evaluation and output, in that order and strictly message by message.

use circuit::Circuit;
use crypto_core::{AesRng, Block};
use tracing::{debug, info, instrument, warn};

use crate::config::ProtocolConfig;
use crate::errors::{Phase, RunError, RunErrorKind};
use crate::garble::{GCGenerator, WireLabel, YaoEvaluator, YaoGenerator};
use crate::msg::{GarbledBundle, Message, ResultMessage};
use crate::ot::{ChouOrlandiReceiver, ChouOrlandiSender, OTReceiverError, OtReceiver, OtSender};
use crate::transport::Transport;

/// Tell the peer the run is over, unless it is gone or gave up first.
fn abort<T: Transport>(transport: &mut T, phase: Phase, kind: RunErrorKind) -> RunError {
    if !matches!(
        kind,
        RunErrorKind::Transport(_) | RunErrorKind::PeerAborted { .. }
    ) {
        let _ = transport.send(Message::Abort {
            phase,
            reason: kind.to_string(),
        });
    }
    warn!(%phase, error = %kind, "run aborted");
    kind.at(phase)
}

/// The garbler's side of a run. Owns the run's randomness, which is dropped with it.
pub struct GarblerParty<T: Transport> {
    transport: T,
    config: ProtocolConfig,
    rng: AesRng,
}

impl<T: Transport> GarblerParty<T> {
    pub fn new(transport: T, config: ProtocolConfig) -> Self {
        Self::with_rng(transport, config, AesRng::new())
    }

    pub fn with_rng(transport: T, config: ProtocolConfig, rng: AesRng) -> Self {
        Self {
            transport,
            config,
            rng,
        }
    }

    fn fail(&mut self, phase: Phase, kind: RunErrorKind) -> RunError {
        abort(&mut self.transport, phase, kind)
    }

    /// Garble `circ`, hand it to the evaluator and serve its input labels. Returns the
    /// output when the evaluator shares it.
    #[instrument(name = "garbler", skip_all, fields(circuit = %circ.id))]
    pub fn run(&mut self, circ: &Circuit, inputs: &[bool]) -> Result<Option<Vec<bool>>, RunError> {
        if inputs.len() != circ.garbler_inputs.len() {
            let msg = format!(
                "expected {} garbler input bits, got {}",
                circ.garbler_inputs.len(),
                inputs.len()
            );
            return Err(self.fail(Phase::Garbling, RunErrorKind::InvalidInput(msg)));
        }

        let gc = YaoGenerator
            .garble(&mut self.rng, circ)
            .map_err(|e| self.fail(Phase::Garbling, e.into()))?;
        let decode_info = YaoGenerator
            .finalize(&gc.gc_local)
            .map_err(|e| self.fail(Phase::Garbling, e.into()))?;
        debug!(ngates = circ.ngates(), "garbled");

        let garbler_labels = gc
            .gc_local
            .encode_garbler(inputs)
            .map_err(|e| self.fail(Phase::Transfer, e.into()))?;
        let pairs = gc
            .gc_local
            .evaluator_label_pairs()
            .map_err(|e| self.fail(Phase::Transfer, e.into()))?;
        let ot_enabled = self.config.ot_enabled();
        let evaluator_labels = if ot_enabled {
            None
        } else {
            warn!("oblivious transfer is disabled, the evaluator's input is NOT protected");
            Some(pairs.clone())
        };
        let bundle = GarbledBundle {
            circuit: circ.clone(),
            tables: gc.gc_table,
            decode_info,
            garbler_labels,
            evaluator_labels,
            share_output: self.config.share_output,
        };
        self.transport
            .send(Message::Bundle(Box::new(bundle)))
            .map_err(|e| self.fail(Phase::Transfer, e.into()))?;
        debug!("bundle sent");

        if ot_enabled && !pairs.is_empty() {
            let ot_inputs: Vec<(usize, [[Block; 2]; 2])> = pairs
                .iter()
                .map(|[l0, l1]| (l0.id, [l0.to_blocks(), l1.to_blocks()]))
                .collect();
            ChouOrlandiSender
                .send(&mut self.transport, &ot_inputs, &mut self.rng)
                .map_err(|e| self.fail(Phase::ObliviousTransfer, e.into()))?;
            debug!(nwires = ot_inputs.len(), "oblivious transfer done");
        }

        if !self.config.share_output {
            return Ok(None);
        }
        let result = match self.transport.receive() {
            Ok(Message::Result(result)) => result,
            Ok(Message::Abort { phase, reason }) => {
                return Err(self.fail(Phase::Output, RunErrorKind::PeerAborted { phase, reason }))
            }
            Ok(other) => {
                let kind = RunErrorKind::UnexpectedMessage {
                    expected: "result",
                    got: other.kind(),
                };
                return Err(self.fail(Phase::Output, kind));
            }
            Err(e) => return Err(self.fail(Phase::Output, e.into())),
        };
        let wires: Vec<usize> = result.outputs.iter().map(|o| o.wire).collect();
        if result.circuit_id != circ.id || wires != circ.outputs {
            let msg = "result does not match the circuit's outputs".to_string();
            return Err(self.fail(Phase::Output, RunErrorKind::InvalidInput(msg)));
        }
        info!("output received");
        Ok(Some(result.bits()))
    }
}

/// The evaluator's side of a run.
pub struct EvaluatorParty<T: Transport> {
    transport: T,
    config: ProtocolConfig,
    rng: AesRng,
}

impl<T: Transport> EvaluatorParty<T> {
    pub fn new(transport: T, config: ProtocolConfig) -> Self {
        Self::with_rng(transport, config, AesRng::new())
    }

    pub fn with_rng(transport: T, config: ProtocolConfig, rng: AesRng) -> Self {
        Self {
            transport,
            config,
            rng,
        }
    }

    fn fail(&mut self, phase: Phase, kind: RunErrorKind) -> RunError {
        abort(&mut self.transport, phase, kind)
    }

    /// Wait for the garbler's bundle.
    pub fn receive_bundle(&mut self) -> Result<GarbledBundle, RunError> {
        match self.transport.receive() {
            Ok(Message::Bundle(bundle)) => {
                debug!(circuit = %bundle.circuit.id, "bundle received");
                Ok(*bundle)
            }
            Ok(Message::Abort { phase, reason }) => {
                Err(self.fail(Phase::Transfer, RunErrorKind::PeerAborted { phase, reason }))
            }
            Ok(other) => {
                let kind = RunErrorKind::UnexpectedMessage {
                    expected: "bundle",
                    got: other.kind(),
                };
                Err(self.fail(Phase::Transfer, kind))
            }
            Err(e) => Err(self.fail(Phase::Transfer, e.into())),
        }
    }

    fn check_bundle(&self, bundle: &GarbledBundle) -> Result<(), RunErrorKind> {
        match (&bundle.evaluator_labels, self.config.ot_enabled()) {
            (Some(_), true) => Err(RunErrorKind::ConfigMismatch(
                "garbler disabled oblivious transfer".to_string(),
            )),
            (None, false) => Err(RunErrorKind::ConfigMismatch(
                "garbler requires oblivious transfer".to_string(),
            )),
            (Some(pairs), false) if pairs.len() != bundle.circuit.evaluator_inputs.len() => {
                Err(RunErrorKind::InvalidInput(format!(
                    "bundle carries {} label pairs for {} evaluator inputs",
                    pairs.len(),
                    bundle.circuit.evaluator_inputs.len()
                )))
            }
            _ => Ok(()),
        }
    }

    /// Fetch the labels of `inputs`, evaluate and decode. Sends the output back when
    /// the bundle asks for it.
    #[instrument(name = "evaluator", skip_all, fields(circuit = %bundle.circuit.id))]
    pub fn evaluate(&mut self, bundle: GarbledBundle, inputs: &[bool]) -> Result<Vec<bool>, RunError> {
        if let Err(kind) = self.check_bundle(&bundle) {
            return Err(self.fail(Phase::Transfer, kind));
        }
        let circ = &bundle.circuit;
        if inputs.len() != circ.evaluator_inputs.len() {
            let msg = format!(
                "expected {} evaluator input bits, got {}",
                circ.evaluator_inputs.len(),
                inputs.len()
            );
            return Err(self.fail(Phase::ObliviousTransfer, RunErrorKind::InvalidInput(msg)));
        }

        let evaluator_labels: Vec<WireLabel> = match &bundle.evaluator_labels {
            Some(pairs) => {
                warn!("oblivious transfer is disabled, the evaluator's input is NOT protected");
                pairs
                    .iter()
                    .zip(inputs)
                    .map(|(pair, &bit)| pair[bit as usize])
                    .collect()
            }
            None => {
                let choices: Vec<(usize, bool)> = circ
                    .evaluator_inputs
                    .iter()
                    .copied()
                    .zip(inputs.iter().copied())
                    .collect();
                let received = ChouOrlandiReceiver
                    .receive(&mut self.transport, &choices, &mut self.rng)
                    .map_err(|e| self.fail(Phase::ObliviousTransfer, e.into()))?;
                choices
                    .iter()
                    .zip(received)
                    .map(|(&(wire, _), blocks)| {
                        WireLabel::from_blocks(wire, blocks).ok_or(OTReceiverError::MalformedLabel(wire))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| self.fail(Phase::ObliviousTransfer, e.into()))?
            }
        };
        debug!(nwires = evaluator_labels.len(), "input labels ready");

        let outputs = YaoEvaluator
            .evaluate(
                circ,
                &bundle.tables,
                &bundle.decode_info,
                &bundle.garbler_labels,
                &evaluator_labels,
            )
            .map_err(|e| self.fail(Phase::Evaluation, e.into()))?;
        debug!("evaluated");

        if bundle.share_output {
            self.transport
                .send(Message::Result(ResultMessage::new(circ, &outputs)))
                .map_err(|e| self.fail(Phase::Output, e.into()))?;
            debug!("output sent");
        }
        Ok(outputs)
    }

    /// Receive a bundle and evaluate it on `inputs`.
    pub fn run(&mut self, inputs: &[bool]) -> Result<Vec<bool>, RunError> {
        let bundle = self.receive_bundle()?;
        self.evaluate(bundle, inputs)
    }
}
