//! Per-wire key pairs and permutation bits.

use std::fmt;

use circuit::Circuit;
use crypto_core::Block;
use rand::{CryptoRng, Rng};

use super::gc::WireLabel;

/// Keys for the semantic values 0 and 1 of a wire, plus its permutation bit.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct WireKeyPair {
    keys: [Block; 2],
    pbit: bool,
}

impl WireKeyPair {
    /// Two independent keys, resampled until they differ.
    pub fn random<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        let k0 = rng.gen::<Block>();
        let mut k1 = rng.gen::<Block>();
        while k1 == k0 {
            k1 = rng.gen::<Block>();
        }
        Self {
            keys: [k0, k1],
            pbit: rng.gen::<bool>(),
        }
    }

    #[inline]
    pub fn key(&self, value: bool) -> Block {
        self.keys[value as usize]
    }

    #[inline]
    pub fn pbit(&self) -> bool {
        self.pbit
    }

    #[inline]
    pub fn external_bit(&self, value: bool) -> bool {
        value ^ self.pbit
    }

    #[inline]
    pub fn label(&self, id: usize, value: bool) -> WireLabel {
        WireLabel {
            id,
            key: self.key(value),
            external_bit: self.external_bit(value),
        }
    }
}

impl fmt::Debug for WireKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WireKeyPair { .. }")
    }
}

/// Key pairs of every wire a circuit writes, indexed by wire id.
///
/// Generated fresh for each garbling and never shared between runs.
#[derive(Clone)]
pub struct KeyMaterial {
    pairs: Vec<Option<WireKeyPair>>,
}

impl KeyMaterial {
    pub fn generate<R: Rng + CryptoRng>(rng: &mut R, circ: &Circuit) -> Self {
        let mut pairs = vec![None; circ.nwires];
        let written = circ
            .input_ids()
            .chain(circ.gates.iter().map(|g| g.out_id()));
        for id in written {
            if let Some(slot) = pairs.get_mut(id) {
                *slot = Some(WireKeyPair::random(rng));
            }
        }
        Self { pairs }
    }

    #[inline]
    pub fn get(&self, id: usize) -> Option<&WireKeyPair> {
        self.pairs.get(id).and_then(|p| p.as_ref())
    }

    #[inline]
    pub fn label(&self, id: usize, value: bool) -> Option<WireLabel> {
        self.get(id).map(|p| p.label(id, value))
    }

    #[inline]
    pub fn pbit(&self, id: usize) -> Option<bool> {
        self.get(id).map(|p| p.pbit())
    }

    /// Wires with keys, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &WireKeyPair)> {
        self.pairs
            .iter()
            .enumerate()
            .filter_map(|(id, p)| p.as_ref().map(|p| (id, p)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("wires", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circuit::Gate;
    use crypto_core::AesRng;

    #[test]
    fn test_generate_covers_written_wires() {
        let mut rng = AesRng::new();
        // Wire 3 is never used.
        let circ = Circuit::new(
            "c",
            vec![0],
            vec![1],
            vec![4],
            vec![Gate::and(0, 1, 2), Gate::inv(2, 4)],
        )
        .unwrap();
        let keys = KeyMaterial::generate(&mut rng, &circ);

        assert_eq!(keys.len(), 4);
        assert!(keys.get(3).is_none());
        for (_, pair) in keys.iter() {
            assert_ne!(pair.key(false), pair.key(true));
        }
    }

    #[test]
    fn test_label_external_bit() {
        let mut rng = AesRng::new();
        let pair = WireKeyPair::random(&mut rng);
        let l0 = pair.label(5, false);
        let l1 = pair.label(5, true);
        assert_eq!(l0.external_bit, pair.pbit());
        assert_eq!(l1.external_bit, !pair.pbit());
        assert_eq!(l1.key, pair.key(true));
    }

    #[test]
    fn test_debug_hides_keys() {
        let mut rng = AesRng::new();
        let pair = WireKeyPair::random(&mut rng);
        let s = format!("{:?}", pair);
        assert!(!s.contains(&format!("{:?}", pair.key(false))));
    }
}
