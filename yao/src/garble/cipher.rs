//! Row cipher of the garbled tables.
//!
//! A row holds a two-block label `[key, external bit]`. Each input key masks it with a
//! 256-bit pad `tccr(tweak, key)`, where the tweak binds the gate index, the row, the
//! input position and the pad half.

use crypto_core::{Block, AES_HASH};

#[inline]
fn tweak(gate: usize, row: usize, pos: usize, half: usize) -> Block {
    Block::from(((gate as u128) << 4) | ((row as u128) << 2) | ((pos as u128) << 1) | half as u128)
}

#[inline]
fn pad(gate: usize, row: usize, pos: usize, key: Block) -> [Block; 2] {
    [
        AES_HASH.tccr_hash(tweak(gate, row, pos, 0), key),
        AES_HASH.tccr_hash(tweak(gate, row, pos, 1), key),
    ]
}

#[inline]
fn apply(ct: [Block; 2], pad: [Block; 2]) -> [Block; 2] {
    [ct[0] ^ pad[0], ct[1] ^ pad[1]]
}

/// Encrypt `plaintext` under `keys`, inner layer under `keys[0]`, outer under `keys[1]`.
pub fn encrypt_row(gate: usize, row: usize, keys: &[Block], plaintext: [Block; 2]) -> [Block; 2] {
    keys.iter()
        .enumerate()
        .fold(plaintext, |ct, (pos, key)| apply(ct, pad(gate, row, pos, *key)))
}

/// Peel the layers of `encrypt_row`, outer first.
pub fn decrypt_row(gate: usize, row: usize, keys: &[Block], ciphertext: [Block; 2]) -> [Block; 2] {
    keys.iter()
        .enumerate()
        .rev()
        .fold(ciphertext, |pt, (pos, key)| apply(pt, pad(gate, row, pos, *key)))
}
