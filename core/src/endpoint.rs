// ## 📂 File: `src/endpoint.rs`

//! endpoint.rs
//! Endpoint capabilities beyond `Read` / `Write`.
//!
//! A readable end is any [`Read`], a writable end any [`Write`]. Closing is the
//! optional third capability: [`Close::close`] defaults to a no-op, so an
//! endpoint with nothing to release implements the trait with an empty body.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, LineWriter, Read, Write};
use std::net::{Shutdown, TcpStream};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::process::{ChildStderr, ChildStdin, ChildStdout};
use std::sync::{Arc, Mutex, MutexGuard};

/// Close capability of an endpoint.
pub trait Close {
    /// Releases the endpoint. The default has nothing to release.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: Close + ?Sized> Close for Box<T> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<T: Close + ?Sized> Close for &mut T {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<T> Close for Cursor<T> {}
impl Close for &[u8] {}
impl Close for Vec<u8> {}
impl Close for VecDeque<u8> {}
impl Close for io::Sink {}
impl Close for io::Empty {}
impl Close for io::Repeat {}

impl Close for io::Stdin {}
impl Close for ChildStdout {}
impl Close for ChildStderr {}

impl Close for io::Stdout {
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Close for io::Stderr {
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Close for ChildStdin {
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Close for File {
    /// Syncs contents to storage. Pipes and character devices reject the
    /// sync with `InvalidInput` and have nothing else to release.
    fn close(&mut self) -> io::Result<()> {
        match self.sync_all() {
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
            res => res,
        }
    }
}

impl Close for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

#[cfg(unix)]
impl Close for UnixStream {
    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

// ================= Adapters over closable endpoints =================

impl<R: Close> Close for BufReader<R> {
    fn close(&mut self) -> io::Result<()> {
        self.get_mut().close()
    }
}

impl<W: Write + Close> Close for BufWriter<W> {
    /// Writes out buffered bytes before closing the inner writer.
    fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        self.get_mut().close()
    }
}

impl<W: Write + Close> Close for LineWriter<W> {
    fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        self.get_mut().close()
    }
}

impl<T: Close> Close for io::Take<T> {
    fn close(&mut self) -> io::Result<()> {
        self.get_mut().close()
    }
}

// ================= Absent endpoint =================

/// Placeholder type for a direction with no endpoint bound. Never constructed.
#[derive(Debug)]
pub enum Nil {}

impl Read for Nil {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        match *self {}
    }
}

impl Write for Nil {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        match *self {}
    }

    fn flush(&mut self) -> io::Result<()> {
        match *self {}
    }
}

impl Close for Nil {
    fn close(&mut self) -> io::Result<()> {
        match *self {}
    }
}

// ================= Shared endpoint =================

/// Handle to one endpoint bound to both directions of a meter.
///
/// Clones refer to the same endpoint. Closing through any clone closes it.
#[derive(Debug)]
pub struct Shared<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Shared<T> {
    pub fn new(endpoint: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(endpoint)),
        }
    }

    /// Locks the endpoint; a poisoned lock surfaces as an I/O error.
    pub fn lock(&self) -> io::Result<MutexGuard<'_, T>> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("shared endpoint lock poisoned"))
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Read> Read for Shared<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.lock()?.read(buf)
    }
}

impl<T: Write> Write for Shared<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.flush()
    }
}

impl<T: Close> Close for Shared<T> {
    fn close(&mut self) -> io::Result<()> {
        self.lock()?.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_clones_see_the_same_endpoint() {
        let mut a = Shared::new(Cursor::new(Vec::<u8>::new()));
        let mut b = a.clone();

        a.write_all(b"ab").unwrap();
        b.write_all(b"cd").unwrap();

        assert_eq!(a.lock().unwrap().get_ref().as_slice(), b"abcd");
    }

    #[test]
    fn buf_writer_flushes_before_closing() {
        let mut w = BufWriter::new(Vec::<u8>::new());
        w.write_all(b"pending").unwrap();
        assert!(w.get_ref().is_empty());

        w.close().unwrap();
        assert_eq!(w.get_ref().as_slice(), b"pending");
    }

    #[cfg(unix)]
    #[test]
    fn unix_stream_close_shuts_down_peer() {
        let (mut a, mut b) = UnixStream::pair().unwrap();
        a.close().unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(b.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn default_close_is_a_no_op() {
        let mut buf: Vec<u8> = Vec::new();
        assert!(buf.close().is_ok());
        let mut boxed: Box<dyn Close> = Box::new(io::sink());
        assert!(boxed.close().is_ok());
    }
}
