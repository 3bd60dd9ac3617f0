use std::io;

use csvstream_core::{ByteClass, Tape};

use crate::error::{Error, Result};

/// A tape that pulls bytes from an `io::Read` on demand.
///
/// Bytes are appended to an internal buffer in chunks of `read_size`.
/// Nothing is ever discarded until `compact` is called, so recognizers may
/// retreat over anything they have seen.
#[derive(Debug)]
pub(crate) struct ReadTape<R> {
    rdr: R,
    buf: Vec<u8>,
    head: usize,
    /// The number of bytes dropped from the front of `buf` so far.
    discarded: u64,
    read_size: usize,
    compact_threshold: usize,
}

impl<R: io::Read> ReadTape<R> {
    pub(crate) fn new(
        rdr: R,
        read_size: usize,
        compact_threshold: usize,
    ) -> ReadTape<R> {
        ReadTape {
            rdr,
            buf: Vec::with_capacity(read_size),
            head: 0,
            discarded: 0,
            read_size: if read_size == 0 { 1 } else { read_size },
            compact_threshold,
        }
    }

    /// Append one chunk from the source to the buffer.
    ///
    /// Returns false if the source is exhausted. The buffer never keeps any
    /// bytes that were not actually read, even when reading fails.
    fn fill(&mut self) -> Result<bool> {
        let len = self.buf.len();
        self.buf.resize(len + self.read_size, 0);
        match self.rdr.read(&mut self.buf[len..]) {
            Ok(n) => {
                self.buf.truncate(len + n);
                Ok(n > 0)
            }
            Err(err) => {
                self.buf.truncate(len);
                Err(Error::Read(err))
            }
        }
    }
}

impl<R> ReadTape<R> {
    /// Discard every byte before the head, once the buffer has grown to at
    /// least the compaction threshold.
    pub(crate) fn compact(&mut self) {
        if self.head == 0 || self.buf.len() < self.compact_threshold {
            return;
        }
        self.buf.drain(..self.head);
        self.discarded += self.head as u64;
        self.head = 0;
    }

    /// The position of the head in the buffer.
    pub(crate) fn head(&self) -> usize {
        self.head
    }

    /// The position of the head in the stream.
    pub(crate) fn offset(&self) -> u64 {
        self.discarded + self.head as u64
    }

    pub(crate) fn bytes(&self, start: usize, len: usize) -> &[u8] {
        &self.buf[start..start + len]
    }

    pub(crate) fn bytes_mut(&mut self, start: usize, len: usize) -> &mut [u8] {
        &mut self.buf[start..start + len]
    }

    pub(crate) fn get_ref(&self) -> &R {
        &self.rdr
    }

    pub(crate) fn get_mut(&mut self) -> &mut R {
        &mut self.rdr
    }

    pub(crate) fn into_inner(self) -> R {
        self.rdr
    }
}

impl<R: io::Read> Tape for ReadTape<R> {
    type Error = Error;

    #[inline]
    fn next_byte(&mut self) -> Result<Option<u8>> {
        if self.head == self.buf.len() && !self.fill()? {
            return Ok(None);
        }
        let b = self.buf[self.head];
        self.head += 1;
        Ok(Some(b))
    }

    fn scan_while(
        &mut self,
        class: &ByteClass,
        count: &mut usize,
    ) -> Result<Option<u8>> {
        loop {
            let rest = &self.buf[self.head..];
            match rest.iter().position(|&b| !class.contains(b)) {
                Some(i) => {
                    *count += i;
                    self.head += i;
                    return Ok(Some(self.buf[self.head]));
                }
                None => {
                    *count += rest.len();
                    self.head = self.buf.len();
                    if !self.fill()? {
                        return Ok(None);
                    }
                }
            }
        }
    }

    #[inline]
    fn retreat(&mut self, n: usize) {
        assert!(n <= self.head, "cannot retreat {} bytes from {}", n, self.head);
        self.head -= n;
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.buf.get(self.head).copied()
    }
}
