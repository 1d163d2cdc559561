use super::{EvaluatorError, GCEvaluator};
use crate::garble::{cipher::decrypt_row, GarbledCircuitTable, OutputDecodeInfo, WireLabel};
use circuit::gate::{Circuit, Gate};

#[derive(Clone, Copy, Debug, Default)]
pub struct YaoEvaluator;

impl YaoEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Decrypt the single row addressed by the input external bits.
    #[inline]
    fn open_row(
        &self,
        gid: usize,
        gc_table: &GarbledCircuitTable,
        inputs: &[WireLabel],
        out_id: usize,
    ) -> Result<WireLabel, EvaluatorError> {
        let row = inputs
            .iter()
            .enumerate()
            .map(|(i, l)| (l.external_bit as usize) << i)
            .sum::<usize>();
        let keys: Vec<_> = inputs.iter().map(|l| l.key).collect();
        let ct = gc_table.tables[gid].rows[row];
        let pt = decrypt_row(gid, row, &keys, ct);
        WireLabel::from_blocks(out_id, pt).ok_or(EvaluatorError::DecryptionFailure { gate: gid })
    }

    fn check_tables(&self, circ: &Circuit, gc_table: &GarbledCircuitTable) -> Result<(), EvaluatorError> {
        if gc_table.ngates() != circ.ngates() {
            return Err(EvaluatorError::TableCount {
                expected: circ.ngates(),
                got: gc_table.ngates(),
            });
        }
        for (gid, (gate, table)) in circ.gates.iter().zip(gc_table.tables.iter()).enumerate() {
            let expected = 1 << gate.arity();
            if table.rows.len() != expected {
                return Err(EvaluatorError::RowCount {
                    gate: gid,
                    expected,
                    got: table.rows.len(),
                });
            }
        }
        Ok(())
    }

    /// Evaluate the garbled circuit and decode its outputs.
    pub fn evaluate(
        &self,
        circ: &Circuit,
        gc_table: &GarbledCircuitTable,
        decode_info: &[OutputDecodeInfo],
        garbler_labels: &[WireLabel],
        evaluator_labels: &[WireLabel],
    ) -> Result<Vec<bool>, EvaluatorError> {
        let inputs = [garbler_labels, evaluator_labels].concat();
        let output_labels = self.eval(circ, gc_table, &inputs)?;
        self.finalize(&output_labels, decode_info)
    }
}

impl GCEvaluator for YaoEvaluator {
    #[tracing::instrument(level = "trace", skip_all, fields(circuit = %circ.id))]
    fn eval(
        &self,
        circ: &Circuit,
        gc_table: &GarbledCircuitTable,
        input_labels: &[WireLabel],
    ) -> Result<Vec<WireLabel>, EvaluatorError> {
        circ.validate()?;
        self.check_tables(circ, gc_table)?;

        let mut is_input = vec![false; circ.nwires];
        for id in circ.input_ids() {
            is_input[id] = true;
        }

        let mut wire_labels: Vec<Option<WireLabel>> = vec![None; circ.nwires];

        // Initiate input labels.
        for label in input_labels.iter() {
            if !is_input.get(label.id).copied().unwrap_or(false) {
                return Err(EvaluatorError::UnexpectedLabel(label.id));
            }
            if wire_labels[label.id].replace(*label).is_some() {
                return Err(EvaluatorError::DuplicateLabel(label.id));
            }
        }
        if let Some(id) = circ.input_ids().find(|&id| wire_labels[id].is_none()) {
            return Err(EvaluatorError::MissingLabel(id));
        }

        let label = |labels: &[Option<WireLabel>], id: usize| {
            labels[id].ok_or(EvaluatorError::UninitializedLabel(id))
        };

        // Process each gate
        for (gid, gate) in circ.gates.iter().enumerate() {
            let z = match *gate {
                Gate::Binary {
                    lin_id,
                    rin_id,
                    out_id,
                    ..
                } => {
                    let x = label(&wire_labels, lin_id)?;
                    let y = label(&wire_labels, rin_id)?;
                    self.open_row(gid, gc_table, &[x, y], out_id)?
                }
                Gate::Inv { lin_id, out_id } => {
                    let x = label(&wire_labels, lin_id)?;
                    self.open_row(gid, gc_table, &[x], out_id)?
                }
            };
            wire_labels[z.id] = Some(z);
        }

        circ.outputs
            .iter()
            .map(|&id| label(&wire_labels, id))
            .collect()
    }

    fn finalize(
        &self,
        output_labels: &[WireLabel],
        decode_info: &[OutputDecodeInfo],
    ) -> Result<Vec<bool>, EvaluatorError> {
        if output_labels.len() != decode_info.len() {
            return Err(EvaluatorError::DecodeInfoMismatch);
        }
        output_labels
            .iter()
            .zip(decode_info.iter())
            .map(|(label, info)| {
                if label.id != info.id {
                    return Err(EvaluatorError::DecodeInfoMismatch);
                }
                Ok(label.external_bit ^ info.decode_info)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garble::{GCGenerator, GarbledCircuit, YaoGenerator};
    use circuit::{BinaryOp, CircuitFile};
    use crypto_core::{AesRng, Block};
    use rstest::rstest;

    fn bits(x: usize, n: usize) -> Vec<bool> {
        (0..n).map(|i| (x >> i) & 1 == 1).collect()
    }

    /// Garble, encode both parties' inputs and evaluate.
    fn garble_and_eval(circ: &Circuit, garbler: &[bool], evaluator: &[bool]) -> Result<Vec<bool>, EvaluatorError> {
        let mut rng = AesRng::new();
        let gc = YaoGenerator.garble(&mut rng, circ).unwrap();
        eval_with(circ, &gc, garbler, evaluator)
    }

    fn eval_with(
        circ: &Circuit,
        gc: &GarbledCircuit,
        garbler: &[bool],
        evaluator: &[bool],
    ) -> Result<Vec<bool>, EvaluatorError> {
        let garbler_labels = gc.gc_local.encode_garbler(garbler).unwrap();
        let evaluator_labels: Vec<WireLabel> = gc
            .gc_local
            .evaluator_label_pairs()
            .unwrap()
            .into_iter()
            .zip(evaluator)
            .map(|(pair, &b)| pair[b as usize])
            .collect();
        let decode_info = YaoGenerator.finalize(&gc.gc_local).unwrap();
        YaoEvaluator.evaluate(circ, &gc.gc_table, &decode_info, &garbler_labels, &evaluator_labels)
    }

    #[rstest]
    #[case(BinaryOp::And)]
    #[case(BinaryOp::Or)]
    #[case(BinaryOp::Xor)]
    #[case(BinaryOp::Nand)]
    #[case(BinaryOp::Nor)]
    #[case(BinaryOp::Xnor)]
    fn test_binary_gate(#[case] op: BinaryOp) {
        let circ = Circuit::new("gate", vec![0], vec![1], vec![2], vec![Gate::binary(op, 0, 1, 2)]).unwrap();
        for (x, y) in [(false, false), (false, true), (true, false), (true, true)] {
            let out = garble_and_eval(&circ, &[x], &[y]).unwrap();
            assert_eq!(out, vec![op.eval(x, y)], "{} {x} {y}", op.name());
        }
    }

    #[test]
    fn test_inv_gate() {
        let circ = Circuit::new("not", vec![0], vec![], vec![1], vec![Gate::inv(0, 1)]).unwrap();
        assert_eq!(garble_and_eval(&circ, &[false], &[]).unwrap(), vec![true]);
        assert_eq!(garble_and_eval(&circ, &[true], &[]).unwrap(), vec![false]);
    }

    #[test]
    fn test_and2_and_xor3() {
        let file = CircuitFile::load("../circuit/circuit_files/json/basic.json").unwrap();

        let and2 = file.circuit("AND2").unwrap();
        assert_eq!(garble_and_eval(&and2, &[true], &[true]).unwrap(), vec![true]);
        assert_eq!(garble_and_eval(&and2, &[true], &[false]).unwrap(), vec![false]);

        let xor3 = file.circuit("XOR3").unwrap();
        assert_eq!(garble_and_eval(&xor3, &[true], &[true, true]).unwrap(), vec![true]);
    }

    #[rstest]
    #[case("XOR3")]
    #[case("MAJ3")]
    #[case("GT2")]
    fn test_json_circuits_match_plaintext(#[case] id: &str) {
        let file = CircuitFile::load("../circuit/circuit_files/json/basic.json").unwrap();
        let circ = file.circuit(id).unwrap();
        let (ng, ne) = (circ.garbler_inputs.len(), circ.evaluator_inputs.len());
        for x in 0..1usize << (ng + ne) {
            let g = bits(x, ng);
            let e = bits(x >> ng, ne);
            let expected = circ.eval_bits(&g, &e).unwrap();
            assert_eq!(garble_and_eval(&circ, &g, &e).unwrap(), expected, "{id} {x}");
        }
    }

    #[test]
    fn test_adder2_matches_plaintext() {
        let circ = Circuit::load_bristol("../circuit/circuit_files/bristol/adder2.txt").unwrap();
        for a in 0..4 {
            for b in 0..4 {
                let out = garble_and_eval(&circ, &bits(a, 2), &bits(b, 2)).unwrap();
                assert_eq!(out, bits((a + b) % 4, 2));
            }
        }
    }

    #[test]
    fn test_corrupted_table_fails_to_decrypt() {
        let mut rng = AesRng::new();
        let file = CircuitFile::load("../circuit/circuit_files/json/basic.json").unwrap();
        let circ = file.circuit("XOR3").unwrap();
        let mut gc = YaoGenerator.garble(&mut rng, &circ).unwrap();
        for row in gc.gc_table.tables[1].rows.iter_mut() {
            row[1] = row[1] ^ Block::from(1u128 << 64);
        }

        let err = eval_with(&circ, &gc, &[true], &[false, true]).unwrap_err();
        assert!(matches!(err, EvaluatorError::DecryptionFailure { gate: 1 }));
    }

    #[test]
    fn test_label_and_table_checks() {
        let mut rng = AesRng::new();
        let circ = Circuit::new("AND2", vec![0], vec![1], vec![2], vec![Gate::and(0, 1, 2)]).unwrap();
        let gc = YaoGenerator.garble(&mut rng, &circ).unwrap();
        let g = gc.gc_local.encode_garbler(&[true]).unwrap();
        let [e0, _] = gc.gc_local.label_pair(1).unwrap();
        let out = gc.gc_local.keys.label(2, true).unwrap();

        assert!(matches!(
            YaoEvaluator.eval(&circ, &gc.gc_table, &g),
            Err(EvaluatorError::MissingLabel(1))
        ));
        assert!(matches!(
            YaoEvaluator.eval(&circ, &gc.gc_table, &[g[0], e0, e0]),
            Err(EvaluatorError::DuplicateLabel(1))
        ));
        assert!(matches!(
            YaoEvaluator.eval(&circ, &gc.gc_table, &[g[0], e0, out]),
            Err(EvaluatorError::UnexpectedLabel(2))
        ));

        let empty = GarbledCircuitTable::new(vec![]);
        assert!(matches!(
            YaoEvaluator.eval(&circ, &empty, &[g[0], e0]),
            Err(EvaluatorError::TableCount { expected: 1, got: 0 })
        ));

        let mut short = gc.gc_table.clone();
        short.tables[0].rows.pop();
        assert!(matches!(
            YaoEvaluator.eval(&circ, &short, &[g[0], e0]),
            Err(EvaluatorError::RowCount { gate: 0, expected: 4, got: 3 })
        ));

        let labels = YaoEvaluator.eval(&circ, &gc.gc_table, &[g[0], e0]).unwrap();
        assert!(matches!(
            YaoEvaluator.finalize(&labels, &[]),
            Err(EvaluatorError::DecodeInfoMismatch)
        ));
    }
}
