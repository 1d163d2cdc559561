//! The only boundary between a run and the outside world: send a `Message`, receive
//! the next one. Delivery is FIFO without loss or duplication.

use std::io::{self, ErrorKind};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crypto_core::AbstractChannel;

use crate::msg::Message;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection closed by peer")]
    Closed,
    #[error("timed out waiting for the peer")]
    Timeout,
    #[error("transport IO error")]
    Io(#[source] io::Error),
    #[error("could not encode or decode message")]
    Codec(#[from] bincode::Error),
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> TransportError {
        match e.kind() {
            ErrorKind::UnexpectedEof
            | ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted => TransportError::Closed,
            ErrorKind::WouldBlock | ErrorKind::TimedOut => TransportError::Timeout,
            _ => TransportError::Io(e),
        }
    }
}

pub trait Transport {
    fn send(&mut self, msg: Message) -> Result<(), TransportError>;

    fn receive(&mut self) -> Result<Message, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, msg: Message) -> Result<(), TransportError> {
        (**self).send(msg)
    }

    fn receive(&mut self) -> Result<Message, TransportError> {
        (**self).receive()
    }
}

/// Messages as bincode payloads in length-prefixed frames over a byte channel.
pub struct ChannelTransport<C> {
    channel: C,
}

impl<C: AbstractChannel> ChannelTransport<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }
}

impl<C: AbstractChannel> Transport for ChannelTransport<C> {
    fn send(&mut self, msg: Message) -> Result<(), TransportError> {
        let payload = bincode::serialize(&msg)?;
        self.channel.write_frame(&payload)?;
        Ok(())
    }

    fn receive(&mut self) -> Result<Message, TransportError> {
        let payload = self.channel.read_frame()?;
        Ok(bincode::deserialize(&payload)?)
    }
}

/// In-process transport over a pair of `mpsc` channels.
pub struct MemoryTransport {
    tx: Sender<Message>,
    rx: Receiver<Message>,
    timeout: Option<Duration>,
}

impl MemoryTransport {
    /// Bound every `receive` by `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Two connected in-process transports.
pub fn memory_transport_pair() -> (MemoryTransport, MemoryTransport) {
    let (tx_a, rx_b) = mpsc::channel();
    let (tx_b, rx_a) = mpsc::channel();
    (
        MemoryTransport {
            tx: tx_a,
            rx: rx_a,
            timeout: None,
        },
        MemoryTransport {
            tx: tx_b,
            rx: rx_b,
            timeout: None,
        },
    )
}

impl Transport for MemoryTransport {
    fn send(&mut self, msg: Message) -> Result<(), TransportError> {
        self.tx.send(msg).map_err(|_| TransportError::Closed)
    }

    fn receive(&mut self) -> Result<Message, TransportError> {
        match self.timeout {
            Some(timeout) => self.rx.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => TransportError::Timeout,
                RecvTimeoutError::Disconnected => TransportError::Closed,
            }),
            None => self.rx.recv().map_err(|_| TransportError::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Phase;
    use crate::msg::{OtMessage, OtPayload};
    use crypto_core::{local_channel_pair, Block};
    use std::thread;

    fn messages() -> Vec<Message> {
        vec![
            Message::Ot(OtMessage::new(3, OtPayload::Request)),
            Message::Ot(OtMessage::new(3, OtPayload::Setup([7u8; 32]))),
            Message::Ot(OtMessage::new(
                3,
                OtPayload::Transfer([[rand::random::<Block>(); 2]; 2]),
            )),
            Message::Abort {
                phase: Phase::Evaluation,
                reason: "gate 4".to_string(),
            },
        ]
    }

    #[test]
    fn test_channel_transport_is_fifo() {
        let (a, b) = local_channel_pair().unwrap();
        let (mut a, mut b) = (ChannelTransport::new(a), ChannelTransport::new(b));
        let sent = messages();

        let expected = sent.clone();
        let handle = thread::spawn(move || {
            for msg in sent {
                a.send(msg).unwrap();
            }
        });

        for msg in expected {
            assert_eq!(b.receive().unwrap(), msg);
        }
        handle.join().unwrap();

        // The sender is gone.
        assert!(matches!(b.receive(), Err(TransportError::Closed)));
    }

    #[test]
    fn test_channel_transport_timeout() {
        let (a, b) = local_channel_pair().unwrap();
        b.set_timeout(Some(Duration::from_millis(20))).unwrap();
        let mut b = ChannelTransport::new(b);
        assert!(matches!(b.receive(), Err(TransportError::Timeout)));
        drop(a);
    }

    #[test]
    fn test_garbage_frame_is_codec_error() {
        let (mut a, b) = local_channel_pair().unwrap();
        a.write_frame(&[0xff; 9]).unwrap();
        let mut b = ChannelTransport::new(b);
        assert!(matches!(b.receive(), Err(TransportError::Codec(_))));
    }

    #[test]
    fn test_memory_transport() {
        let (mut a, b) = memory_transport_pair();
        let mut b = b.with_timeout(Some(Duration::from_millis(20)));
        for msg in messages() {
            a.send(msg.clone()).unwrap();
            assert_eq!(b.receive().unwrap(), msg);
        }
        assert!(matches!(b.receive(), Err(TransportError::Timeout)));

        drop(a);
        assert!(matches!(b.receive(), Err(TransportError::Closed)));
        assert!(matches!(
            b.send(Message::Ot(OtMessage::new(0, OtPayload::Request))),
            Err(TransportError::Closed)
        ));
    }
}
