use std::io::{BufReader, BufWriter, Result};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::StdChannel;

pub type NetChannel = StdChannel<BufReader<TcpStream>, BufWriter<TcpStream>>;

impl NetChannel {
    /// Wrap an established TCP connection.
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        Ok(StdChannel::new(
            BufReader::new(stream.try_clone()?),
            BufWriter::new(stream),
        ))
    }

    /// Connect to a listening peer.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        Self::from_stream(TcpStream::connect(addr)?)
    }

    /// Accept exactly one connection on `listener`.
    pub fn accept(listener: &TcpListener) -> Result<(Self, SocketAddr)> {
        let (stream, peer) = listener.accept()?;
        Ok((Self::from_stream(stream)?, peer))
    }

    /// Bound every blocking read and write; `None` blocks forever.
    pub fn set_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.reader().get_ref().set_read_timeout(timeout)?;
        self.writer().get_ref().set_write_timeout(timeout)
    }

    pub fn peer_addr(&self) -> Result<SocketAddr> {
        self.reader().get_ref().peer_addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AbstractChannel, Block};
    use std::io::ErrorKind;
    use std::thread;

    #[test]
    fn net_channel_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let block = rand::random::<Block>();

        let handle = thread::spawn(move || {
            let (mut server, _) = NetChannel::accept(&listener).unwrap();
            let frame = server.read_frame().unwrap();
            server.write_frame(&frame).unwrap();
        });

        let mut client = NetChannel::connect(addr).unwrap();
        client.write_frame(block.as_ref()).unwrap();
        assert_eq!(client.read_frame().unwrap(), block.as_ref());

        handle.join().unwrap();
    }

    #[test]
    fn net_channel_read_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (server, _) = NetChannel::accept(&listener).unwrap();
            thread::sleep(Duration::from_millis(300));
            drop(server);
        });

        let mut client = NetChannel::connect(addr).unwrap();
        client.set_timeout(Some(Duration::from_millis(50))).unwrap();
        let err = client.read_frame().unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::WouldBlock | ErrorKind::TimedOut
        ));

        handle.join().unwrap();
    }
}
