//! Provides traits for oblivious transfer (OT) protocols.
//! These traits focus on 1-out-of-2 OTs, run one wire at a time over a `Transport`.

pub mod co;
pub mod errors;

pub use co::*;
pub use errors::{OTReceiverError, OTSenderError};

use crypto_core::Block;
use curve25519_dalek::ristretto::RistrettoPoint;
use rand::{CryptoRng, Rng};
use sha2::{Digest, Sha256};

use crate::transport::Transport;

/// Sender of OT
pub trait OtSender
where
    Self: Sized,
{
    /// Message type.
    type Msg: Sized + Copy;

    /// Serve one transfer for each `(wire, [m0, m1])` in whatever order the receiver
    /// requests them.
    fn send<T: Transport, R: CryptoRng + Rng>(
        &mut self,
        transport: &mut T,
        inputs: &[(usize, [Self::Msg; 2])],
        rng: &mut R,
    ) -> Result<(), OTSenderError>;
}

/// Receiver of OT
pub trait OtReceiver
where
    Self: Sized,
{
    /// Message type.
    type Msg: Sized + Copy;

    /// Fetch `m_choice` for each `(wire, choice)`, in the given order.
    fn receive<T: Transport, R: CryptoRng + Rng>(
        &mut self,
        transport: &mut T,
        choices: &[(usize, bool)],
        rng: &mut R,
    ) -> Result<Vec<Self::Msg>, OTReceiverError>;
}

/// `H(S, R, wire, P)`, a 256-bit pad.
pub(crate) fn hash_to_pad(s: &[u8; 32], r: &[u8; 32], wire: usize, p: &RistrettoPoint) -> [Block; 2] {
    let mut hasher = Sha256::new();
    hasher.update(s);
    hasher.update(r);
    hasher.update((wire as u64).to_le_bytes());
    hasher.update(p.compress().as_bytes());
    let digest = hasher.finalize();

    let mut lo = [0u8; 16];
    let mut hi = [0u8; 16];
    lo.copy_from_slice(&digest[..16]);
    hi.copy_from_slice(&digest[16..]);
    [Block::from(lo), Block::from(hi)]
}
