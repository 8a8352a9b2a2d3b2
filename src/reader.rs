use crate::error::{ParseError, Result};
use std::io::{self, Read};

/// Forward-only byte cursor the box parser reads from.
///
/// Wraps any [`Read`] and tracks the absolute offset of the next byte. It never
/// seeks, so pipes and sockets work as well as files and in-memory buffers.
/// End-of-stream is detected with a single byte of lookahead which is handed
/// back on the next read.
pub struct BoxReader<'a> {
    inner: &'a mut dyn Read,
    pos: u64,
    peeked: Option<u8>,
}

impl<'a> BoxReader<'a> {
    pub fn new(inner: &'a mut dyn Read) -> Self {
        Self::with_offset(inner, 0)
    }

    /// Start counting positions at `offset`, e.g. when `inner` was already
    /// advanced into a file.
    pub fn with_offset(inner: &'a mut dyn Read, offset: u64) -> Self {
        Self {
            inner,
            pos: offset,
            peeked: None,
        }
    }

    /// Absolute offset of the next unread byte.
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn is_eof(&mut self) -> io::Result<bool> {
        if self.peeked.is_some() {
            return Ok(false);
        }
        let mut b = [0u8; 1];
        loop {
            match self.inner.read(&mut b) {
                Ok(0) => return Ok(true),
                Ok(_) => {
                    self.peeked = Some(b[0]);
                    return Ok(false);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Consume and discard exactly `n` bytes.
    pub fn skip(&mut self, n: u64) -> Result<()> {
        let skipped = io::copy(&mut self.by_ref().take(n), &mut io::sink())?;
        if skipped < n {
            return Err(ParseError::UnexpectedEof);
        }
        Ok(())
    }
}

impl Read for BoxReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if let Some(b) = self.peeked.take() {
            buf[0] = b;
            self.pos += 1;
            return Ok(1);
        }
        let n = self.inner.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}
