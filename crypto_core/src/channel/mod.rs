pub mod local_channel;
pub mod net_channel;

pub use local_channel::*;
pub use net_channel::*;

use std::io::{Error, ErrorKind, Read, Result, Write};

/// Largest frame accepted by `read_frame`, 64 MiB.
pub const MAX_FRAME_LEN: usize = 1 << 26;

/// A trait for I/O channel.
pub trait AbstractChannel {
    /// Write bytes slice to the channel.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;
    /// Read bytes slice from the channel.
    fn read_bytes(&mut self, bytes: &mut [u8]) -> Result<()>;
    /// Flush the channel.
    fn flush(&mut self) -> Result<()>;

    /// Write a `u32` in little-endian order.
    #[inline(always)]
    fn write_u32(&mut self, x: u32) -> Result<()> {
        self.write_bytes(&x.to_le_bytes())
    }

    /// Read a little-endian `u32`.
    #[inline(always)]
    fn read_u32(&mut self) -> Result<u32> {
        let mut data = [0u8; 4];
        self.read_bytes(&mut data)?;
        Ok(u32::from_le_bytes(data))
    }

    /// Write a length-prefixed frame and flush it.
    fn write_frame(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > MAX_FRAME_LEN {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("frame of {} bytes exceeds {MAX_FRAME_LEN}", payload.len()),
            ));
        }
        self.write_u32(payload.len() as u32)?;
        self.write_bytes(payload)?;
        self.flush()
    }

    /// Read one length-prefixed frame.
    fn read_frame(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u32()? as usize;
        if len > MAX_FRAME_LEN {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("frame of {len} bytes exceeds {MAX_FRAME_LEN}"),
            ));
        }
        let mut payload = vec![0u8; len];
        self.read_bytes(&mut payload)?;
        Ok(payload)
    }
}

/// A standard channel that implements `AbstractChannel`
pub struct StdChannel<R, W> {
    reader: R,
    writer: W,
}

impl<R: Read, W: Write> StdChannel<R, W> {
    /// New a `StdChannel`
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<R: Read, W: Write> AbstractChannel for StdChannel<R, W> {
    #[inline(always)]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)
    }

    #[inline(always)]
    fn read_bytes(&mut self, bytes: &mut [u8]) -> Result<()> {
        self.reader.read_exact(bytes)
    }

    #[inline(always)]
    fn flush(&mut self) -> Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use crate::{local_channel_pair, AbstractChannel, Block};
    use std::io::ErrorKind;
    use std::thread;

    #[test]
    fn send_recv_frame_test() {
        let (mut sender, mut receiver) = local_channel_pair().unwrap();
        let payload = (0..1000).map(|_| rand::random::<u8>()).collect::<Vec<u8>>();
        let block = rand::random::<Block>();

        let expected = payload.clone();
        let handle = thread::spawn(move || {
            sender.write_frame(&payload).unwrap();
            sender.write_frame(&[]).unwrap();
            sender.write_frame(block.as_ref()).unwrap();
        });

        assert_eq!(receiver.read_frame().unwrap(), expected);
        assert!(receiver.read_frame().unwrap().is_empty());
        assert_eq!(receiver.read_frame().unwrap(), block.as_ref());

        handle.join().unwrap();
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let (mut sender, mut receiver) = local_channel_pair().unwrap();
        let handle = thread::spawn(move || {
            sender.write_u32(u32::MAX).unwrap();
            sender.flush().unwrap();
        });

        let err = receiver.read_frame().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        handle.join().unwrap();
    }

    #[test]
    fn closed_peer_is_eof() {
        let (sender, mut receiver) = local_channel_pair().unwrap();
        drop(sender);

        let err = receiver.read_frame().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }
}
