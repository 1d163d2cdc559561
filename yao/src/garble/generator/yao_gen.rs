use super::{GCGenerator, GeneratorError};
use crate::garble::{
    cipher::encrypt_row, GarbledCircuit, GarbledCircuitLocal, GarbledCircuitTable, GarbledTable,
    KeyMaterial, OutputDecodeInfo, WireKeyPair,
};
use circuit::gate::{BinaryOp, Circuit, Gate};
use rand::{CryptoRng, Rng};

/// Classic Yao garbling with point-and-permute.
#[derive(Clone, Copy, Debug, Default)]
pub struct YaoGenerator;

impl YaoGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Rows of a two-input gate, one per pair of input semantic values, placed at
    /// `e_lin + 2 * e_rin`.
    #[inline]
    pub fn binary_gate(
        &self,
        gid: usize,
        op: BinaryOp,
        x: &WireKeyPair,
        y: &WireKeyPair,
        z: &WireKeyPair,
        out_id: usize,
    ) -> GarbledTable {
        let mut rows = vec![[Default::default(); 2]; 4];
        for a in [false, true] {
            for b in [false, true] {
                let row = x.external_bit(a) as usize + 2 * y.external_bit(b) as usize;
                let out = z.label(out_id, op.eval(a, b));
                rows[row] = encrypt_row(gid, row, &[x.key(a), y.key(b)], out.to_blocks());
            }
        }
        GarbledTable { rows }
    }

    #[inline]
    pub fn inv_gate(&self, gid: usize, x: &WireKeyPair, z: &WireKeyPair, out_id: usize) -> GarbledTable {
        let mut rows = vec![[Default::default(); 2]; 2];
        for a in [false, true] {
            let row = x.external_bit(a) as usize;
            let out = z.label(out_id, !a);
            rows[row] = encrypt_row(gid, row, &[x.key(a)], out.to_blocks());
        }
        GarbledTable { rows }
    }

    pub fn gen_core(
        &self,
        circ: &Circuit,
        keys: &KeyMaterial,
    ) -> Result<Vec<GarbledTable>, GeneratorError> {
        let pair = |id: usize| keys.get(id).ok_or(GeneratorError::UninitializedLabel(id));

        // Process each gate
        circ.gates
            .iter()
            .enumerate()
            .map(|(gid, gate)| match *gate {
                Gate::Binary {
                    op,
                    lin_id,
                    rin_id,
                    out_id,
                } => Ok(self.binary_gate(gid, op, pair(lin_id)?, pair(rin_id)?, pair(out_id)?, out_id)),
                Gate::Inv { lin_id, out_id } => {
                    Ok(self.inv_gate(gid, pair(lin_id)?, pair(out_id)?, out_id))
                }
            })
            .collect()
    }
}

impl GCGenerator for YaoGenerator {
    #[tracing::instrument(level = "trace", skip_all, fields(circuit = %circ.id))]
    fn garble<R: Rng + CryptoRng>(
        &mut self,
        rng: &mut R,
        circ: &Circuit,
    ) -> Result<GarbledCircuit, GeneratorError> {
        // Nothing is garbled for a malformed circuit.
        circ.validate()?;

        let keys = KeyMaterial::generate(rng, circ);
        let tables = self.gen_core(circ, &keys)?;

        Ok(GarbledCircuit::new(
            GarbledCircuitTable::new(tables),
            GarbledCircuitLocal::new(circ, keys),
        ))
    }

    fn finalize(&self, gc_local: &GarbledCircuitLocal) -> Result<Vec<OutputDecodeInfo>, GeneratorError> {
        gc_local.decode_info()
    }
}
