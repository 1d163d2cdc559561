use std::{
    io::{BufReader, BufWriter, Result},
    os::unix::net::UnixStream,
    time::Duration,
};

use crate::StdChannel;

pub type LocalChannel = StdChannel<BufReader<UnixStream>, BufWriter<UnixStream>>;

/// A connected pair of in-process channels over a Unix socket pair.
pub fn local_channel_pair() -> Result<(LocalChannel, LocalChannel)> {
    let (tx, rx) = UnixStream::pair()?;
    let sender = StdChannel::new(BufReader::new(tx.try_clone()?), BufWriter::new(tx));
    let receiver = StdChannel::new(BufReader::new(rx.try_clone()?), BufWriter::new(rx));
    Ok((sender, receiver))
}

impl LocalChannel {
    /// Bound every blocking read and write on this end of the pair.
    pub fn set_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.reader().get_ref().set_read_timeout(timeout)?;
        self.writer().get_ref().set_write_timeout(timeout)
    }
}
