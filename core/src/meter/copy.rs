// ### `src/meter/copy.rs`

//! meter/copy.rs
//! Counted copy loop behind every drain.
//!
//! `std::io::copy` drops the partial byte count when it fails mid-stream, so
//! drains use this loop instead: it always reports the bytes that reached the
//! destination, together with the error (if any) that stopped it.

use std::io::{self, Read, Write};

use crate::constants::COPY_CHUNK_SIZE;

/// Copies from `src` to `dst` until EOF, an error, or `limit` bytes.
///
/// Returns the bytes written to `dst`. An unbounded copy ends cleanly at EOF;
/// a bounded one that reaches EOF before `limit` reports `UnexpectedEof`.
pub(crate) fn copy_counted<R, W>(src: &mut R, dst: &mut W, limit: Option<u64>) -> (u64, Option<io::Error>)
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = [0u8; COPY_CHUNK_SIZE];
    let mut moved: u64 = 0;

    loop {
        let want = match limit {
            Some(max) if moved >= max => break,
            Some(max) => (max - moved).min(COPY_CHUNK_SIZE as u64) as usize,
            None => COPY_CHUNK_SIZE,
        };

        let n = match src.read(&mut buf[..want]) {
            Ok(0) if limit.is_some() => {
                let e = io::Error::new(io::ErrorKind::UnexpectedEof, "source ended before copy limit");
                return (moved, Some(e));
            }
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return (moved, Some(e)),
        };

        let mut off = 0;
        while off < n {
            match dst.write(&buf[off..n]) {
                Ok(0) => {
                    let e = io::Error::new(io::ErrorKind::WriteZero, "failed to write whole buffer");
                    return (moved, Some(e));
                }
                Ok(w) => {
                    off += w;
                    moved += w as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return (moved, Some(e)),
            }
        }
    }

    (moved, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts `cap` bytes, then fails.
    struct Brittle {
        out: Vec<u8>,
        cap: usize,
    }

    impl Write for Brittle {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.cap - self.out.len();
            if room == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "full"));
            }
            let n = room.min(buf.len());
            self.out.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Fails once with `Interrupted` before every successful read.
    struct Flaky<'a> {
        data: &'a [u8],
        tripped: bool,
    }

    impl Read for Flaky<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.tripped = !self.tripped;
            if self.tripped {
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            self.data.read(buf)
        }
    }

    #[test]
    fn unbounded_copies_everything() {
        let data = vec![7u8; COPY_CHUNK_SIZE * 2 + 3];
        let mut out = Vec::<u8>::new();
        let (n, err) = copy_counted(&mut data.as_slice(), &mut out, None);
        assert!(err.is_none());
        assert_eq!(n, data.len() as u64);
        assert_eq!(out, data);
    }

    #[test]
    fn bounded_stops_at_limit() {
        let mut src: &[u8] = b"Hello, World!";
        let mut out = Vec::<u8>::new();
        let (n, err) = copy_counted(&mut src, &mut out, Some(5));
        assert!(err.is_none());
        assert_eq!(n, 5);
        assert_eq!(out, b"Hello");
        assert_eq!(src, b", World!");
    }

    #[test]
    fn eof_before_limit_reports_unexpected_eof() {
        let mut out = Vec::<u8>::new();
        let (n, err) = copy_counted(&mut &b"abc"[..], &mut out, Some(10));
        assert_eq!(err.unwrap().kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(n, 3);
        assert_eq!(out, b"abc");
    }

    #[test]
    fn exact_limit_never_probes_for_eof() {
        let mut out = Vec::<u8>::new();
        let (n, err) = copy_counted(&mut &b"abc"[..], &mut out, Some(3));
        assert!(err.is_none());
        assert_eq!(n, 3);
    }

    #[test]
    fn keeps_partial_count_on_write_failure() {
        let mut dst = Brittle { out: Vec::<u8>::new(), cap: 4 };
        let (n, err) = copy_counted(&mut &b"Hello, World!"[..], &mut dst, None);
        assert_eq!(n, 4);
        assert_eq!(err.unwrap().kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(dst.out, b"Hell");
    }

    #[test]
    fn retries_interrupted_reads() {
        let mut src = Flaky { data: b"abcdef", tripped: false };
        let mut out = Vec::<u8>::new();
        let (n, err) = copy_counted(&mut src, &mut out, None);
        assert!(err.is_none());
        assert_eq!(n, 6);
        assert_eq!(out, b"abcdef");
    }
}
