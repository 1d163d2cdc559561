//! Tweakable circular correlation-robust hash based on fixed-key AES.

use crate::block::Block;
use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128;
use once_cell::sync::Lazy;

pub struct AesHash {
    aes: Aes128,
}

pub static AES_HASH: Lazy<AesHash> = Lazy::new(|| {
    let key = GenericArray::from([0u8; 16]);
    let aes = Aes128::new(&key);
    AesHash { aes }
});

impl AesHash {
    #[inline]
    fn permute(&self, x: Block) -> Block {
        let mut y = GenericArray::from(x.to_bytes());
        self.aes.encrypt_block(&mut y);
        let mut out = [0u8; 16];
        out.copy_from_slice(&y);
        Block::from(out)
    }

    /// Tweakable circular correlation robust hash function (cf.
    /// <https://eprint.iacr.org/2019/074>, §7.4).
    ///
    /// The function computes `π(π(x) ⊕ i) ⊕ π(x)`.
    #[inline]
    pub fn tccr_hash(&self, i: Block, x: Block) -> Block {
        let y = self.permute(x);
        let z = self.permute(y ^ i);
        y ^ z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tccr_hash_is_deterministic() {
        let x = rand::random::<Block>();
        let i = rand::random::<Block>();
        assert_eq!(AES_HASH.tccr_hash(i, x), AES_HASH.tccr_hash(i, x));
    }

    #[test]
    fn test_tccr_hash_depends_on_tweak() {
        let x = rand::random::<Block>();
        let h0 = AES_HASH.tccr_hash(Block::from(0u128), x);
        let h1 = AES_HASH.tccr_hash(Block::from(1u128), x);
        assert_ne!(h0, h1);
    }
}
