use core::convert::Infallible;

use crate::classes::ByteClass;

/// A cursor over CSV bytes that can move forwards and backwards.
///
/// The grammar recognizers in this crate are written against this trait.
/// Implementations are free to pull bytes lazily from some source as the
/// head moves forward; `Error` is whatever that pull can fail with.
///
/// Moving backwards is only ever done over bytes that the recognizers have
/// already seen, so implementations must retain every byte from the point at
/// which a recognizer started until it returns.
pub trait Tape {
    /// The error returned when more bytes could not be obtained.
    type Error;

    /// Return the byte under the head and advance past it.
    ///
    /// `None` is returned once the input is exhausted, in which case the
    /// head does not move.
    fn next_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Advance the head past every byte in `class`.
    ///
    /// The number of bytes skipped is added to `count`. The first byte not
    /// in `class` is returned and the head is left on it (it is not
    /// consumed). If the input is exhausted first, the head is left at the
    /// end and `None` is returned.
    fn scan_while(
        &mut self,
        class: &ByteClass,
        count: &mut usize,
    ) -> Result<Option<u8>, Self::Error>;

    /// Move the head backwards by `n` bytes.
    ///
    /// # Panics
    ///
    /// This panics if the head would move before the first retained byte.
    fn retreat(&mut self, n: usize);

    /// Return the byte under the head without advancing, if it has already
    /// been obtained. This never pulls from a source.
    fn peek(&self) -> Option<u8>;
}

/// A tape over an in-memory slice of CSV data.
#[derive(Clone, Debug)]
pub struct SliceTape<'a> {
    data: &'a [u8],
    head: usize,
}

impl<'a> SliceTape<'a> {
    /// Create a new tape positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> SliceTape<'a> {
        SliceTape { data, head: 0 }
    }

    /// The current head position.
    pub fn position(&self) -> usize {
        self.head
    }

    /// The bytes that have not been consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.head..]
    }
}

impl<'a> Tape for SliceTape<'a> {
    type Error = Infallible;

    #[inline]
    fn next_byte(&mut self) -> Result<Option<u8>, Infallible> {
        match self.data.get(self.head) {
            None => Ok(None),
            Some(&b) => {
                self.head += 1;
                Ok(Some(b))
            }
        }
    }

    #[inline]
    fn scan_while(
        &mut self,
        class: &ByteClass,
        count: &mut usize,
    ) -> Result<Option<u8>, Infallible> {
        let rest = &self.data[self.head..];
        match rest.iter().position(|&b| !class.contains(b)) {
            Some(i) => {
                *count += i;
                self.head += i;
                Ok(Some(rest[i]))
            }
            None => {
                *count += rest.len();
                self.head = self.data.len();
                Ok(None)
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
        self.data.get(self.head).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::{SliceTape, Tape};
    use crate::classes::{RAW, WHITESPACE};

    #[test]
    fn next_byte_stops_at_end() {
        let mut tape = SliceTape::new(b"ab");
        assert_eq!(Ok(Some(b'a')), tape.next_byte());
        assert_eq!(Ok(Some(b'b')), tape.next_byte());
        assert_eq!(Ok(None), tape.next_byte());
        assert_eq!(Ok(None), tape.next_byte());
        assert_eq!(2, tape.position());
    }

    #[test]
    fn scan_while_counts_and_stops() {
        let mut tape = SliceTape::new(b"  \tx y");
        let mut count = 0;
        assert_eq!(Ok(Some(b'x')), tape.scan_while(&WHITESPACE, &mut count));
        assert_eq!(3, count);
        assert_eq!(3, tape.position());
        // Scanning again from a disqualifying byte skips nothing.
        assert_eq!(Ok(Some(b'x')), tape.scan_while(&WHITESPACE, &mut count));
        assert_eq!(3, count);
        assert_eq!(Some(b'x'), tape.peek());
    }

    #[test]
    fn scan_while_to_end() {
        let mut tape = SliceTape::new(b"abc");
        let mut count = 5;
        assert_eq!(Ok(None), tape.scan_while(&RAW, &mut count));
        assert_eq!(8, count);
        assert_eq!(None, tape.peek());
        assert!(tape.remaining().is_empty());
    }

    #[test]
    fn scan_and_step_consume_everything_once() {
        let data = b"ab  ,c\r\n d";
        let mut tape = SliceTape::new(data);
        let mut consumed = 0;
        let mut seen = std::vec::Vec::new();
        loop {
            let start = tape.position();
            let stop = tape.scan_while(&RAW, &mut consumed).unwrap();
            seen.extend_from_slice(&data[start..tape.position()]);
            for &b in &data[start..tape.position()] {
                assert!(RAW.contains(b));
            }
            match stop {
                None => break,
                Some(b) => {
                    assert!(!RAW.contains(b));
                    assert_eq!(Ok(Some(b)), tape.next_byte());
                    consumed += 1;
                    seen.push(b);
                }
            }
        }
        assert_eq!(data.len(), consumed);
        assert_eq!(&data[..], &seen[..]);
    }

    #[test]
    fn retreat_moves_back() {
        let mut tape = SliceTape::new(b"abc");
        tape.next_byte().unwrap();
        tape.next_byte().unwrap();
        tape.retreat(2);
        assert_eq!(Some(b'a'), tape.peek());
    }

    #[test]
    #[should_panic]
    fn retreat_before_start() {
        let mut tape = SliceTape::new(b"abc");
        tape.next_byte().unwrap();
        tape.retreat(2);
    }
}
