use std::fmt;
use std::io;

use bstr::BStr;
use csvstream_core::{grammar, unescape_in_place, Mode, Tape, WHITESPACE};

use crate::error::{Error, Result};
use crate::record::Record;
use crate::tape::ReadTape;

const DEFAULT_READ_SIZE: usize = 4 * (1 << 10);
const DEFAULT_COMPACT_THRESHOLD: usize = 4 * (1 << 10);

/// Builds a CSV reader with various configuration knobs.
///
/// The grammar itself is fixed. These knobs only control how the reader
/// buffers its source.
#[derive(Debug)]
pub struct ReaderBuilder {
    read_size: usize,
    compact_threshold: usize,
}

impl Default for ReaderBuilder {
    fn default() -> ReaderBuilder {
        ReaderBuilder {
            read_size: DEFAULT_READ_SIZE,
            compact_threshold: DEFAULT_COMPACT_THRESHOLD,
        }
    }
}

impl ReaderBuilder {
    /// Create a new builder for configuring CSV parsing.
    pub fn new() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Build a CSV reader from this configuration that reads data from
    /// `rdr`.
    ///
    /// Note that the CSV reader is buffered automatically, so you should not
    /// wrap `rdr` in a buffered reader like `io::BufReader`.
    pub fn from_reader<R: io::Read>(&self, rdr: R) -> Reader<R> {
        Reader::new(self, rdr)
    }

    /// The number of bytes requested from the source with each read.
    ///
    /// A size of `0` is treated as `1`. The default is 4096.
    pub fn read_size(&mut self, size: usize) -> &mut ReaderBuilder {
        self.read_size = size;
        self
    }

    /// The buffer size at which bytes that have already been returned are
    /// dropped.
    ///
    /// The buffer only ever holds the bytes since the start of the current
    /// entry plus whatever was read beyond them, so this bounds the memory
    /// used for data with short entries. A single long entry (or a quoted
    /// entry that is never closed) is always buffered in full. The default
    /// is 4096.
    pub fn compact_threshold(&mut self, bytes: usize) -> &mut ReaderBuilder {
        self.compact_threshold = bytes;
        self
    }
}

/// A single entry returned by a CSV reader.
///
/// The contents borrow the reader's internal buffer, so an entry must be
/// dropped (or copied) before the reader is used again.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Entry<'r> {
    contents: Option<&'r [u8]>,
    mode: Mode,
}

impl<'r> Entry<'r> {
    /// Create a new entry. This is mostly useful for feeding a writer.
    pub fn new(contents: Option<&'r [u8]>, mode: Mode) -> Entry<'r> {
        Entry { contents, mode }
    }

    /// The unescaped contents of this entry.
    ///
    /// This is `None` when there is no entry at all. That happens for a
    /// blank line (reported with `Mode::Field`) and at the end of the
    /// stream when nothing precedes it (reported with `Mode::End`). An
    /// empty entry, as in `a,,b`, has `Some` empty contents.
    pub fn contents(&self) -> Option<&'r [u8]> {
        self.contents
    }

    /// What follows this entry.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns true if the stream ends after this entry.
    pub fn is_end(&self) -> bool {
        self.mode == Mode::End
    }
}

impl<'r> fmt::Debug for Entry<'r> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("contents", &self.contents.map(BStr::new))
            .field("mode", &self.mode)
            .finish()
    }
}

/// The position of an entry in CSV data.
///
/// Records and entries are counted from `0`. A blank line counts as a
/// record.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Position {
    byte: u64,
    record: u64,
    entry: u64,
}

impl Position {
    /// Returns a new position initialized to the start value.
    pub fn new() -> Position {
        Position::default()
    }

    /// The byte offset, starting at `0`, of this position.
    pub fn byte(&self) -> u64 {
        self.byte
    }

    /// The record index, starting at `0`, of this position.
    pub fn record(&self) -> u64 {
        self.record
    }

    /// The index of the entry within its record, starting at `0`.
    pub fn entry(&self) -> u64 {
        self.entry
    }

    /// Set the byte offset of this position.
    pub fn set_byte(&mut self, byte: u64) -> &mut Position {
        self.byte = byte;
        self
    }

    /// Set the record index of this position.
    pub fn set_record(&mut self, record: u64) -> &mut Position {
        self.record = record;
        self
    }

    /// Set the entry index of this position.
    pub fn set_entry(&mut self, entry: u64) -> &mut Position {
        self.entry = entry;
        self
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    /// The next byte starts a record.
    StartRecord,
    /// An entry was just returned and its record may continue.
    NextEntry,
}

/// An incremental CSV reader.
///
/// The reader hands out one entry at a time with `next_entry`. Entries
/// borrow the reader's buffer, which holds no more than the current entry
/// and one chunk of lookahead (see `ReaderBuilder::compact_threshold`), so
/// arbitrarily large streams can be read in bounded memory.
///
/// Leading and trailing whitespace around an entry is not part of it.
/// Quoted entries have their quotes removed and doubled quotes collapsed.
/// Inside a quoted entry, a lone quote followed by optional whitespace and
/// text is kept literally, which is how some older producers (notably
/// Borland's Paradox) wrote quotes.
///
/// # Example
///
/// ```
/// use csvstream::{Mode, Reader};
///
/// let data = "a, \"b \"\"c\"\"\" \r\n\r\nd,";
/// let mut rdr = Reader::from_reader(data.as_bytes());
///
/// let mut got = vec![];
/// loop {
///     let entry = rdr.next_entry().unwrap();
///     got.push((entry.contents().map(|c| c.to_vec()), entry.mode()));
///     if entry.is_end() {
///         break;
///     }
/// }
/// assert_eq!(got, vec![
///     (Some(b"a".to_vec()), Mode::Entry),
///     (Some(b"b \"c\"".to_vec()), Mode::Field),
///     (None, Mode::Field),
///     (Some(b"d".to_vec()), Mode::Entry),
///     (Some(b"".to_vec()), Mode::End),
/// ]);
/// ```
#[derive(Debug)]
pub struct Reader<R> {
    tape: ReadTape<R>,
    state: State,
    /// The position of the most recently returned entry.
    pos: Position,
    /// The record and entry index of the next entry.
    record: u64,
    entry: u64,
}

impl<R: io::Read> Reader<R> {
    fn new(builder: &ReaderBuilder, rdr: R) -> Reader<R> {
        Reader {
            tape: ReadTape::new(
                rdr,
                builder.read_size,
                builder.compact_threshold,
            ),
            state: State::StartRecord,
            pos: Position::new(),
            record: 0,
            entry: 0,
        }
    }

    /// Create a new CSV reader with a default configuration for the given
    /// reader.
    ///
    /// To customize buffering, use a `ReaderBuilder`.
    pub fn from_reader(rdr: R) -> Reader<R> {
        ReaderBuilder::new().from_reader(rdr)
    }

    /// Read the next entry.
    ///
    /// Once the end of the stream is reached, every subsequent call returns
    /// an entry with `Mode::End` and no contents.
    ///
    /// # Errors
    ///
    /// `Error::MalformedQuoting` is returned when a quoted entry is never
    /// closed, and `Error::UnexpectedByte` when something other than a
    /// comma or record terminator follows an entry. The latter is reported
    /// by the call after the one that returned the entry. Errors from the
    /// source are returned as `Error::Read`.
    pub fn next_entry(&mut self) -> Result<Entry<'_>> {
        let mut skipped = 0;
        let next = match self.tape.scan_while(&WHITESPACE, &mut skipped)? {
            None => {
                self.mark();
                return Ok(self.emit(None, Mode::End));
            }
            Some(b) => b,
        };
        // Nothing before the head can be referenced anymore.
        self.tape.compact();

        match self.state {
            State::StartRecord => {
                self.mark();
                match next {
                    b'\r' | b'\n' => {
                        self.skip_terminator()?;
                        return Ok(self.emit(None, Mode::Field));
                    }
                    b',' => {
                        self.state = State::NextEntry;
                        return Ok(self.emit_empty(Mode::Entry));
                    }
                    _ => self.state = State::NextEntry,
                }
            }
            State::NextEntry => {
                if next != b',' {
                    self.mark();
                    return Err(Error::UnexpectedByte {
                        pos: self.pos,
                        byte: next,
                    });
                }
                self.tape.next_byte()?;
                let next = self.tape.scan_while(&WHITESPACE, &mut skipped)?;
                self.mark();
                match next {
                    None => return Ok(self.emit_empty(Mode::End)),
                    Some(b'\r') | Some(b'\n') => {
                        self.skip_terminator()?;
                        self.state = State::StartRecord;
                        return Ok(self.emit_empty(Mode::Field));
                    }
                    Some(b',') => return Ok(self.emit_empty(Mode::Entry)),
                    Some(_) => {}
                }
            }
        }

        let start = self.tape.head();
        let len = match grammar::non_blank_entry(&mut self.tape)? {
            Some(len) => len,
            None => return Err(Error::MalformedQuoting { pos: self.pos }),
        };
        let mode = match self.tape.scan_while(&WHITESPACE, &mut skipped)? {
            None => Mode::End,
            Some(b'\r') | Some(b'\n') => {
                self.skip_terminator()?;
                self.state = State::StartRecord;
                Mode::Field
            }
            Some(_) => Mode::Entry,
        };
        let entry = self.tape.bytes_mut(start, len);
        let len = if entry[0] == b'"' {
            unescape_in_place(entry)
        } else {
            len
        };
        Ok(self.emit(Some((start, len)), mode))
    }

    /// Read a single record into the given record.
    ///
    /// Returns false when there are no more records. A blank line is read
    /// as a record with no entries.
    ///
    /// # Example
    ///
    /// ```
    /// use csvstream::{Reader, Record};
    ///
    /// let data = "a,b\n\nc";
    /// let mut rdr = Reader::from_reader(data.as_bytes());
    /// let mut rec = Record::new();
    ///
    /// assert!(rdr.read_record(&mut rec).unwrap());
    /// assert_eq!(rec, Record::from(vec!["a", "b"]));
    /// assert!(rdr.read_record(&mut rec).unwrap());
    /// assert!(rec.is_empty());
    /// assert!(rdr.read_record(&mut rec).unwrap());
    /// assert_eq!(rec, Record::from(vec!["c"]));
    /// assert!(!rdr.read_record(&mut rec).unwrap());
    /// ```
    pub fn read_record(&mut self, record: &mut Record) -> Result<bool> {
        record.clear();
        loop {
            let entry = self.next_entry()?;
            if let Some(contents) = entry.contents() {
                record.push_entry(contents);
            }
            match entry.mode() {
                Mode::Entry => {}
                Mode::Field => return Ok(true),
                Mode::End => return Ok(entry.contents().is_some()),
            }
        }
    }

    /// Returns an iterator over all records in this reader.
    ///
    /// Iteration stops after the first error.
    pub fn records(&mut self) -> RecordsIter<'_, R> {
        RecordsIter { rdr: self, done: false }
    }

    fn skip_terminator(&mut self) -> Result<()> {
        if let Some(b'\r') = self.tape.next_byte()? {
            match self.tape.next_byte()? {
                Some(b'\n') | None => {}
                Some(_) => self.tape.retreat(1),
            }
        }
        Ok(())
    }
}

impl<R> Reader<R> {
    /// Returns the position of the most recently returned entry, or of the
    /// most recent error.
    ///
    /// The byte offset points at the first byte of the entry, not counting
    /// any leading whitespace.
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        self.tape.get_ref()
    }

    /// Returns a mutable reference to the underlying reader.
    ///
    /// Note that mutating the underlying reader may corrupt this CSV
    /// reader's state.
    pub fn get_mut(&mut self) -> &mut R {
        self.tape.get_mut()
    }

    /// Unwraps this CSV reader, returning the underlying reader.
    ///
    /// Note that any leftover data inside this reader's internal buffer is
    /// lost.
    pub fn into_inner(self) -> R {
        self.tape.into_inner()
    }

    fn mark(&mut self) {
        self.pos
            .set_byte(self.tape.offset())
            .set_record(self.record)
            .set_entry(self.entry);
    }

    fn emit_empty(&mut self, mode: Mode) -> Entry<'_> {
        let head = self.tape.head();
        self.emit(Some((head, 0)), mode)
    }

    fn emit(&mut self, span: Option<(usize, usize)>, mode: Mode) -> Entry<'_> {
        match mode {
            Mode::Entry => self.entry += 1,
            Mode::Field => {
                self.record += 1;
                self.entry = 0;
            }
            Mode::End => {}
        }
        let tape = &self.tape;
        Entry::new(span.map(|(start, len)| tape.bytes(start, len)), mode)
    }
}

/// An iterator over records read from CSV data.
///
/// This is created by `Reader::records`.
#[derive(Debug)]
pub struct RecordsIter<'r, R> {
    rdr: &'r mut Reader<R>,
    done: bool,
}

impl<'r, R: io::Read> Iterator for RecordsIter<'r, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        if self.done {
            return None;
        }
        let mut rec = Record::new();
        match self.rdr.read_record(&mut rec) {
            Ok(true) => Some(Ok(rec)),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
