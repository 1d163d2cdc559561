//! AES-128 in counter mode as a cryptographically secure RNG.
//!
//! Every protocol run owns its own `AesRng` seeded from the operating system, so runs
//! never share generator state.

use aes::Aes128;
use cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use rand::rngs::OsRng;
use rand::Rng;
use rand_core::block::{BlockRng, BlockRngCore};
use rand_core::{CryptoRng, Error, RngCore, SeedableRng};

use crate::Block;

/// Number of AES blocks produced per refill.
const BLOCKS_PER_REFILL: usize = 8;

#[derive(Clone)]
pub struct AesRngCore {
    aes: Aes128,
    counter: u128,
}

impl BlockRngCore for AesRngCore {
    type Item = u32;
    type Results = [u32; 4 * BLOCKS_PER_REFILL];

    fn generate(&mut self, results: &mut Self::Results) {
        for chunk in results.chunks_exact_mut(4) {
            let mut blk = GenericArray::from(self.counter.to_le_bytes());
            self.counter = self.counter.wrapping_add(1);
            self.aes.encrypt_block(&mut blk);
            for (word, bytes) in chunk.iter_mut().zip(blk.chunks_exact(4)) {
                *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            }
        }
    }
}

impl SeedableRng for AesRngCore {
    type Seed = Block;

    fn from_seed(seed: Self::Seed) -> Self {
        let key: [u8; 16] = seed.into();
        let aes = Aes128::new(&GenericArray::from(key));
        Self { aes, counter: 0 }
    }
}

impl CryptoRng for AesRngCore {}

#[derive(Clone)]
pub struct AesRng(BlockRng<AesRngCore>);

impl AesRng {
    /// Create a generator seeded from the operating system's CSPRNG.
    pub fn new() -> Self {
        let seed = OsRng.gen::<Block>();
        AesRng::from_seed(seed)
    }

    #[inline]
    pub fn gen_block(&mut self) -> Block {
        self.gen::<Block>()
    }

    pub fn gen_blocks(&mut self, num: usize) -> Vec<Block> {
        (0..num).map(|_| self.gen_block()).collect()
    }
}

impl Default for AesRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for AesRng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl SeedableRng for AesRng {
    type Seed = Block;

    #[inline]
    fn from_seed(seed: Self::Seed) -> Self {
        AesRng(BlockRng::new(AesRngCore::from_seed(seed)))
    }
}

impl CryptoRng for AesRng {}
