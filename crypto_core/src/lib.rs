pub mod block;
pub mod channel;
pub mod hash_aes;
pub mod rand_aes;

pub use crate::{
    block::Block,
    hash_aes::{AesHash, AES_HASH},
    rand_aes::AesRng,
};

pub use channel::*;
