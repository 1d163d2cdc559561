//! Implementation of Chou-Orlandi oblivious transfer protocol (cf. <https://eprint.iacr.org/2015/267>)
//!
//! Every wire runs its own instance with fresh scalars:
//! `Request` (R -> S), `Setup` S = yG, `Choice` R = cS + xG, `Transfer` e_b = m_b ^ H(S, R, wire, yR - b.yS).

use std::collections::{HashMap, HashSet};

use crypto_core::Block;
use curve25519_dalek::constants::RISTRETTO_BASEPOINT_TABLE;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::{Identity, IsIdentity};
use rand::{CryptoRng, Rng};
use tracing::trace;

use super::errors::{OTReceiverError, OTSenderError};
use super::{hash_to_pad, OtReceiver, OtSender};
use crate::msg::{Message, OtMessage, OtPayload, OtRound};
use crate::transport::Transport;

/// Decode a point, rejecting non-canonical encodings and the identity.
fn decompress(bytes: &[u8; 32]) -> Option<RistrettoPoint> {
    let p = CompressedRistretto(*bytes).decompress()?;
    if p.is_identity() {
        None
    } else {
        Some(p)
    }
}

#[inline]
fn xor_pad(m: [Block; 2], pad: [Block; 2]) -> [Block; 2] {
    [m[0] ^ pad[0], m[1] ^ pad[1]]
}

/// Sender state of one wire, between `Setup` and `Transfer`.
pub struct SenderSetup {
    wire: usize,
    y: Scalar,
    s: RistrettoPoint,
    s_bytes: [u8; 32],
}

impl SenderSetup {
    pub fn new<R: CryptoRng + Rng>(wire: usize, rng: &mut R) -> (Self, OtMessage) {
        let y = Scalar::random(rng);
        let s = &y * &RISTRETTO_BASEPOINT_TABLE;
        let s_bytes = s.compress().to_bytes();
        let msg = OtMessage::new(wire, OtPayload::Setup(s_bytes));
        (
            Self {
                wire,
                y,
                s,
                s_bytes,
            },
            msg,
        )
    }

    /// Answer the receiver's `Choice` with both messages under their pads.
    pub fn transfer(self, choice: &OtMessage, inputs: &[[Block; 2]; 2]) -> Result<OtMessage, OTSenderError> {
        let wire = self.wire;
        if choice.wire != wire {
            return Err(OTSenderError::WireMismatch {
                expected: wire,
                got: choice.wire,
            });
        }
        let r_bytes = match &choice.payload {
            OtPayload::Choice(r) => *r,
            other => {
                return Err(OTSenderError::RoundMismatch {
                    wire,
                    expected: OtRound::Choice,
                    got: other.round(),
                })
            }
        };
        let r = decompress(&r_bytes).ok_or(OTSenderError::InvalidPoint { wire })?;

        let yr = self.y * r;
        let ys = self.y * self.s;
        let k0 = hash_to_pad(&self.s_bytes, &r_bytes, wire, &yr);
        let k1 = hash_to_pad(&self.s_bytes, &r_bytes, wire, &(yr - ys));

        let e = [xor_pad(inputs[0], k0), xor_pad(inputs[1], k1)];
        Ok(OtMessage::new(wire, OtPayload::Transfer(e)))
    }
}

/// Receiver state of one wire, between `Choice` and `Transfer`.
pub struct ReceiverChoice {
    wire: usize,
    choice: bool,
    x: Scalar,
    s: RistrettoPoint,
    s_bytes: [u8; 32],
    r_bytes: [u8; 32],
}

impl ReceiverChoice {
    /// Blind `choice` against the sender's `Setup`.
    pub fn new<R: CryptoRng + Rng>(
        wire: usize,
        choice: bool,
        setup: &OtMessage,
        rng: &mut R,
    ) -> Result<(Self, OtMessage), OTReceiverError> {
        if setup.wire != wire {
            return Err(OTReceiverError::WireMismatch {
                expected: wire,
                got: setup.wire,
            });
        }
        let s_bytes = match &setup.payload {
            OtPayload::Setup(s) => *s,
            other => {
                return Err(OTReceiverError::RoundMismatch {
                    wire,
                    expected: OtRound::Setup,
                    got: other.round(),
                })
            }
        };
        let s = decompress(&s_bytes).ok_or(OTReceiverError::InvalidPoint { wire })?;

        let x = Scalar::random(rng);
        let cs = if choice { s } else { RistrettoPoint::identity() };
        let r = cs + &x * &RISTRETTO_BASEPOINT_TABLE;
        let r_bytes = r.compress().to_bytes();

        let state = Self {
            wire,
            choice,
            x,
            s,
            s_bytes,
            r_bytes,
        };
        Ok((state, OtMessage::new(wire, OtPayload::Choice(r_bytes))))
    }

    #[inline]
    fn pad(&self) -> [Block; 2] {
        hash_to_pad(&self.s_bytes, &self.r_bytes, self.wire, &(self.x * self.s))
    }

    /// Unblind the chosen branch of the sender's `Transfer`.
    pub fn finish(self, transfer: &OtMessage) -> Result<[Block; 2], OTReceiverError> {
        let wire = self.wire;
        if transfer.wire != wire {
            return Err(OTReceiverError::WireMismatch {
                expected: wire,
                got: transfer.wire,
            });
        }
        match &transfer.payload {
            OtPayload::Transfer(e) => Ok(xor_pad(e[self.choice as usize], self.pad())),
            other => Err(OTReceiverError::RoundMismatch {
                wire,
                expected: OtRound::Transfer,
                got: other.round(),
            }),
        }
    }
}

fn sender_recv<T: Transport>(transport: &mut T) -> Result<OtMessage, OTSenderError> {
    match transport.receive()? {
        Message::Ot(msg) => Ok(msg),
        Message::Abort { phase, reason } => Err(OTSenderError::PeerAborted { phase, reason }),
        other => Err(OTSenderError::UnexpectedMessage(other.kind())),
    }
}

fn receiver_recv<T: Transport>(transport: &mut T) -> Result<OtMessage, OTReceiverError> {
    match transport.receive()? {
        Message::Ot(msg) => Ok(msg),
        Message::Abort { phase, reason } => Err(OTReceiverError::PeerAborted { phase, reason }),
        other => Err(OTReceiverError::UnexpectedMessage(other.kind())),
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct ChouOrlandiSender;

impl OtSender for ChouOrlandiSender {
    type Msg = [Block; 2];

    fn send<T: Transport, R: CryptoRng + Rng>(
        &mut self,
        transport: &mut T,
        inputs: &[(usize, [[Block; 2]; 2])],
        rng: &mut R,
    ) -> Result<(), OTSenderError> {
        let mut pending = HashMap::with_capacity(inputs.len());
        for (wire, msgs) in inputs.iter() {
            if pending.insert(*wire, *msgs).is_some() {
                return Err(OTSenderError::DuplicateWire(*wire));
            }
        }
        let mut done = HashSet::with_capacity(inputs.len());

        while !pending.is_empty() {
            let request = sender_recv(transport)?;
            let wire = request.wire;
            if request.round() != OtRound::Request {
                return Err(OTSenderError::RoundMismatch {
                    wire,
                    expected: OtRound::Request,
                    got: request.round(),
                });
            }
            let msgs = match pending.remove(&wire) {
                Some(msgs) => msgs,
                None if done.contains(&wire) => return Err(OTSenderError::DuplicateWire(wire)),
                None => return Err(OTSenderError::UnknownWire(wire)),
            };
            done.insert(wire);

            let (setup, msg) = SenderSetup::new(wire, rng);
            transport.send(Message::Ot(msg))?;

            let choice = sender_recv(transport)?;
            let transfer = setup.transfer(&choice, &msgs)?;
            transport.send(Message::Ot(transfer))?;
            trace!(wire, "sent");
        }

        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct ChouOrlandiReceiver;

impl OtReceiver for ChouOrlandiReceiver {
    type Msg = [Block; 2];

    fn receive<T: Transport, R: CryptoRng + Rng>(
        &mut self,
        transport: &mut T,
        choices: &[(usize, bool)],
        rng: &mut R,
    ) -> Result<Vec<[Block; 2]>, OTReceiverError> {
        let mut seen = HashSet::with_capacity(choices.len());
        if let Some((wire, _)) = choices.iter().find(|(wire, _)| !seen.insert(*wire)) {
            return Err(OTReceiverError::DuplicateWire(*wire));
        }

        choices
            .iter()
            .map(|&(wire, choice)| -> Result<[Block; 2], OTReceiverError> {
                transport.send(Message::Ot(OtMessage::new(wire, OtPayload::Request)))?;

                let setup = receiver_recv(transport)?;
                let (state, msg) = ReceiverChoice::new(wire, choice, &setup, rng)?;
                transport.send(Message::Ot(msg))?;

                let transfer = receiver_recv(transport)?;
                let m = state.finish(&transfer)?;
                trace!(wire, "received");
                Ok(m)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use crypto_core::{local_channel_pair, AesRng, Block};

    use super::*;
    use crate::errors::Phase;
    use crate::transport::{memory_transport_pair, ChannelTransport};

    fn rand_msgs(wires: &[usize]) -> Vec<(usize, [[Block; 2]; 2])> {
        wires
            .iter()
            .map(|&w| {
                let m0 = [rand::random::<Block>(), rand::random::<Block>()];
                let m1 = [rand::random::<Block>(), rand::random::<Block>()];
                (w, [m0, m1])
            })
            .collect()
    }

    /// One full transfer of `m` through the step functions, returning the receiver's
    /// output, its pad and the sender's ciphertexts.
    fn run_steps(m: &[[Block; 2]; 2], choice: bool) -> ([Block; 2], [Block; 2], [[Block; 2]; 2]) {
        let mut rng = AesRng::new();
        let (setup, setup_msg) = SenderSetup::new(4, &mut rng);
        let (state, choice_msg) = ReceiverChoice::new(4, choice, &setup_msg, &mut rng).unwrap();
        let transfer = setup.transfer(&choice_msg, m).unwrap();
        let e = match transfer.payload {
            OtPayload::Transfer(e) => e,
            _ => unreachable!(),
        };
        let pad = state.pad();
        (state.finish(&transfer).unwrap(), pad, e)
    }

    #[test]
    fn local_co_ot_test() {
        let wires: Vec<usize> = (10..138).collect();
        let m = rand_msgs(&wires);
        let m_inside = m.clone();
        // The receiver asks in reverse order.
        let select: Vec<(usize, bool)> = wires
            .iter()
            .rev()
            .map(|&w| (w, rand::random::<bool>()))
            .collect();

        let (sender, receiver) = local_channel_pair().unwrap();

        let handle = thread::spawn(move || {
            let mut transport = ChannelTransport::new(sender);
            let mut ot = ChouOrlandiSender;
            let mut rng = AesRng::new();
            ot.send(&mut transport, &m_inside, &mut rng).unwrap();
        });

        let mut transport = ChannelTransport::new(receiver);
        let mut rng = AesRng::new();
        let mut ot = ChouOrlandiReceiver;
        let result = ot.receive(&mut transport, &select, &mut rng).unwrap();

        for ((wire, choice), got) in select.iter().zip(result.iter()) {
            let (_, pair) = m.iter().find(|(w, _)| w == wire).unwrap();
            assert_eq!(*got, pair[*choice as usize]);
        }
        handle.join().unwrap();
    }

    #[test]
    fn test_unselected_does_not_open() {
        let m = [
            [rand::random::<Block>(), Block::from(0u128)],
            [rand::random::<Block>(), Block::from(1u128)],
        ];
        for choice in [false, true] {
            let (got, pad, e) = run_steps(&m, choice);
            assert_eq!(got, m[choice as usize]);
            let other = !choice as usize;
            assert_ne!(xor_pad(e[other], pad), m[other]);
        }
    }

    #[test]
    fn test_choice_is_oblivious() {
        // Bit 0 of byte 16 of the blinded point, over many runs against one setup.
        let mut rng = AesRng::new();
        let (_, setup_msg) = SenderSetup::new(0, &mut rng);
        let n = 1000;
        let ones = |choice: bool, rng: &mut AesRng| {
            (0..n)
                .filter(|_| {
                    let (_, msg) = ReceiverChoice::new(0, choice, &setup_msg, rng).unwrap();
                    match msg.payload {
                        OtPayload::Choice(r) => r[16] & 1 == 1,
                        _ => unreachable!(),
                    }
                })
                .count()
        };
        let c0 = ones(false, &mut rng);
        let c1 = ones(true, &mut rng);

        for c in [c0, c1] {
            assert!((400..=600).contains(&c), "{c0} {c1}");
        }
        assert!(c0.abs_diff(c1) < 150, "{c0} {c1}");
    }

    #[test]
    fn test_invalid_points_are_rejected() {
        let mut rng = AesRng::new();
        let identity = RistrettoPoint::identity().compress().to_bytes();

        let bad_setup = OtMessage::new(1, OtPayload::Setup(identity));
        assert!(matches!(
            ReceiverChoice::new(1, true, &bad_setup, &mut rng),
            Err(OTReceiverError::InvalidPoint { wire: 1 })
        ));
        let bad_setup = OtMessage::new(1, OtPayload::Setup([0xff; 32]));
        assert!(matches!(
            ReceiverChoice::new(1, true, &bad_setup, &mut rng),
            Err(OTReceiverError::InvalidPoint { wire: 1 })
        ));

        let m = [[Block::default(); 2]; 2];
        let (setup, _) = SenderSetup::new(1, &mut rng);
        let bad_choice = OtMessage::new(1, OtPayload::Choice(identity));
        assert!(matches!(
            setup.transfer(&bad_choice, &m),
            Err(OTSenderError::InvalidPoint { wire: 1 })
        ));
    }

    #[test]
    fn test_round_and_wire_mismatch() {
        let mut rng = AesRng::new();
        let m = [[Block::default(); 2]; 2];
        let (setup, setup_msg) = SenderSetup::new(2, &mut rng);

        assert!(matches!(
            ReceiverChoice::new(3, false, &setup_msg, &mut rng),
            Err(OTReceiverError::WireMismatch { expected: 3, got: 2 })
        ));
        let (state, choice_msg) = ReceiverChoice::new(2, false, &setup_msg, &mut rng).unwrap();
        assert!(matches!(
            state.finish(&choice_msg),
            Err(OTReceiverError::RoundMismatch {
                wire: 2,
                expected: OtRound::Transfer,
                got: OtRound::Choice
            })
        ));
        assert!(matches!(
            setup.transfer(&OtMessage::new(2, OtPayload::Request), &m),
            Err(OTSenderError::RoundMismatch {
                wire: 2,
                expected: OtRound::Choice,
                got: OtRound::Request
            })
        ));
    }

    #[test]
    fn test_sender_rejects_unknown_and_repeated_wires() {
        let mut rng = AesRng::new();
        let m = rand_msgs(&[5]);

        let (mut s, mut r) = memory_transport_pair();
        r.send(Message::Ot(OtMessage::new(6, OtPayload::Request))).unwrap();
        assert!(matches!(
            ChouOrlandiSender.send(&mut s, &m, &mut rng),
            Err(OTSenderError::UnknownWire(6))
        ));

        assert!(matches!(
            ChouOrlandiSender.send(&mut s, &[m[0], m[0]], &mut rng),
            Err(OTSenderError::DuplicateWire(5))
        ));
        assert!(matches!(
            ChouOrlandiReceiver.receive(&mut r, &[(5, true), (5, false)], &mut rng),
            Err(OTReceiverError::DuplicateWire(5))
        ));
    }

    #[test]
    fn test_abort_and_closed_transport() {
        let mut rng = AesRng::new();
        let m = rand_msgs(&[0]);

        let (mut s, mut r) = memory_transport_pair();
        r.send(Message::Abort {
            phase: Phase::ObliviousTransfer,
            reason: "bye".to_string(),
        })
        .unwrap();
        assert!(matches!(
            ChouOrlandiSender.send(&mut s, &m, &mut rng),
            Err(OTSenderError::PeerAborted {
                phase: Phase::ObliviousTransfer,
                ..
            })
        ));

        drop(s);
        assert!(matches!(
            ChouOrlandiReceiver.receive(&mut r, &[(0, true)], &mut rng),
            Err(OTReceiverError::Transport(_))
        ));
    }
}
