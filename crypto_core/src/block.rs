//! A 128-bit block, the unit of every wire key, hash output and pad in the workspace.

use core::fmt;
use core::ops::{BitXor, BitXorAssign};
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Size of a block in bytes.
pub const BLOCK_LEN: usize = 16;

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Block([u8; BLOCK_LEN]);

impl Block {
    /// The all-zero block.
    pub const ZERO: Block = Block([0u8; BLOCK_LEN]);

    #[inline]
    pub fn to_bytes(self) -> [u8; BLOCK_LEN] {
        self.0
    }

    #[inline]
    pub fn as_u128(&self) -> u128 {
        u128::from_le_bytes(self.0)
    }
}

impl From<u128> for Block {
    #[inline]
    fn from(x: u128) -> Self {
        Block(x.to_le_bytes())
    }
}

impl From<Block> for u128 {
    #[inline]
    fn from(b: Block) -> Self {
        b.as_u128()
    }
}

impl From<bool> for Block {
    #[inline]
    fn from(b: bool) -> Self {
        Block::from(b as u128)
    }
}

impl From<[u8; BLOCK_LEN]> for Block {
    #[inline]
    fn from(bytes: [u8; BLOCK_LEN]) -> Self {
        Block(bytes)
    }
}

impl From<Block> for [u8; BLOCK_LEN] {
    #[inline]
    fn from(b: Block) -> Self {
        b.0
    }
}

impl AsRef<[u8]> for Block {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl AsMut<[u8]> for Block {
    #[inline]
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl BitXor for Block {
    type Output = Block;

    #[inline]
    fn bitxor(self, rhs: Self) -> Self::Output {
        Block::from(self.as_u128() ^ rhs.as_u128())
    }
}

impl BitXorAssign for Block {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}

impl Distribution<Block> for Standard {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Block {
        let mut bytes = [0u8; BLOCK_LEN];
        rng.fill_bytes(&mut bytes);
        Block(bytes)
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({:032x})", self.as_u128())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.as_u128())
    }
}
