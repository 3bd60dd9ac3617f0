use core::fmt;
use core::mem;

use memchr::memchr;

use crate::quote::needs_quotes;
use crate::Mode;

/// A record terminator to use when writing CSV.
///
/// Readers always accept `\r`, `\n` and `\r\n` as a single record
/// terminator, so any of these round trip.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Terminator {
    /// Writes `\r\n`. This is the default.
    CRLF,
    /// Writes a lone `\r`.
    CR,
    /// Writes a lone `\n`.
    LF,
}

impl Terminator {
    /// The bytes written for this terminator.
    pub fn as_bytes(&self) -> &'static [u8] {
        match *self {
            Terminator::CRLF => b"\r\n",
            Terminator::CR => b"\r",
            Terminator::LF => b"\n",
        }
    }
}

impl Default for Terminator {
    fn default() -> Terminator {
        Terminator::CRLF
    }
}

/// The quoting style to use when writing CSV data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuoteStyle {
    /// This puts quotes around every entry, including empty ones.
    ///
    /// Trailing data written with `Mode::End` is never quoted.
    Always,
    /// This puts quotes around entries only when necessary.
    ///
    /// They are necessary when an entry starts or ends with whitespace, or
    /// contains a quote, comma or record terminator. An empty entry that is
    /// the only entry of its record is quoted too, since it would otherwise
    /// be written as a blank line.
    ///
    /// This is the default.
    Necessary,
}

impl Default for QuoteStyle {
    fn default() -> QuoteStyle {
        QuoteStyle::Necessary
    }
}

/// A builder for configuring a CSV writer.
#[derive(Debug, Default)]
pub struct WriterBuilder {
    wtr: Writer,
}

impl WriterBuilder {
    /// Create a new builder for configuring a CSV writer.
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Build a CSV writer from this configuration.
    pub fn build(&self) -> Writer {
        self.wtr.clone()
    }

    /// The record terminator to use when writing CSV.
    ///
    /// The default is `Terminator::CRLF`.
    pub fn terminator(&mut self, term: Terminator) -> &mut WriterBuilder {
        self.wtr.term = term;
        self
    }

    /// The quoting style to use when writing CSV.
    ///
    /// By default, this is set to `QuoteStyle::Necessary`, which will only
    /// use quotes when they are necessary to preserve the integrity of data.
    pub fn quote_style(&mut self, style: QuoteStyle) -> &mut WriterBuilder {
        self.wtr.style = style;
        self
    }
}

/// An error caused by appending entries in an order that cannot be written.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StateError {
    /// An entry was appended after an entry with `Mode::End`.
    AfterEnd,
    /// An entry without contents was appended with a mode other than
    /// `Mode::Field`. Only a record boundary may be written without
    /// contents.
    MissingContent(Mode),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StateError::AfterEnd => {
                write!(f, "cannot append CSV data after the end of the stream")
            }
            StateError::MissingContent(mode) => write!(
                f,
                "cannot append an entry without contents in {:?} mode",
                mode
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StateError {}

/// A writer for CSV data that decides how each entry is written.
///
/// This writer performs no I/O. For each entry, `plan` returns an `Emit`
/// describing exactly which bytes to write. It tracks the mode of the
/// previous entry, which is needed to write a record consisting of a single
/// empty entry unambiguously.
///
/// # RFC 4180
///
/// With the default configuration, output conforms to RFC 4180 except that
/// the caller decides how many entries each record has. Data appended with
/// `Mode::End` is written verbatim.
#[derive(Clone, Debug)]
pub struct Writer {
    prev: Mode,
    term: Terminator,
    style: QuoteStyle,
}

impl Default for Writer {
    fn default() -> Writer {
        Writer {
            prev: Mode::Field,
            term: Terminator::default(),
            style: QuoteStyle::default(),
        }
    }
}

impl Writer {
    /// Creates a new CSV writer with the default configuration.
    pub fn new() -> Writer {
        Writer::default()
    }

    /// Forget everything written so far, as if this writer were new.
    pub fn reset(&mut self) {
        self.prev = Mode::Field;
    }

    /// Returns true once an entry with `Mode::End` has been planned.
    pub fn is_done(&self) -> bool {
        self.prev == Mode::End
    }

    /// Decide how to write an entry with the given contents and mode.
    ///
    /// `None` contents are only permitted with `Mode::Field`, in which case
    /// only the record terminator is written. Once an entry with
    /// `Mode::End` has been planned, every subsequent call fails.
    pub fn plan<'a>(
        &mut self,
        contents: Option<&'a [u8]>,
        mode: Mode,
    ) -> Result<Emit<'a>, StateError> {
        if self.prev == Mode::End {
            return Err(StateError::AfterEnd);
        }
        if mode == Mode::End {
            self.prev = Mode::End;
            return Ok(Emit::new(false, contents.unwrap_or(b""), b""));
        }
        let contents = match contents {
            Some(contents) => contents,
            None if mode == Mode::Field => {
                self.prev = Mode::Field;
                return Ok(Emit::new(false, b"", self.term.as_bytes()));
            }
            None => return Err(StateError::MissingContent(mode)),
        };
        if mode == Mode::Field && contents.is_empty() && self.prev == Mode::Field
        {
            return Ok(Emit::new(true, contents, self.term.as_bytes()));
        }
        let quote = match self.style {
            QuoteStyle::Always => true,
            QuoteStyle::Necessary => needs_quotes(contents),
        };
        self.prev = mode;
        let suffix: &'static [u8] = match mode {
            Mode::Field => self.term.as_bytes(),
            _ => b",",
        };
        Ok(Emit::new(quote, contents, suffix))
    }
}

/// The bytes to write for a single entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Emit<'a> {
    quote: bool,
    contents: &'a [u8],
    suffix: &'static [u8],
}

impl<'a> Emit<'a> {
    fn new(quote: bool, contents: &'a [u8], suffix: &'static [u8]) -> Emit<'a> {
        Emit { quote, contents, suffix }
    }

    /// Whether the contents are enclosed in quotes.
    pub fn is_quoted(&self) -> bool {
        self.quote
    }

    /// The unescaped contents of the entry.
    pub fn contents(&self) -> &'a [u8] {
        self.contents
    }

    /// The delimiter or record terminator written after the contents.
    pub fn suffix(&self) -> &'static [u8] {
        self.suffix
    }

    /// Returns the byte strings to write, in order.
    ///
    /// When quoting, every quote in the contents is doubled. No piece is
    /// ever empty.
    pub fn pieces(&self) -> Pieces<'a> {
        Pieces { emit: *self, rest: self.contents, state: PieceState::Open }
    }

    /// The total number of bytes yielded by `pieces`.
    pub fn len(&self) -> usize {
        let body = if self.quote {
            let quotes = self.contents.iter().filter(|&&b| b == b'"').count();
            2 + self.contents.len() + quotes
        } else {
            self.contents.len()
        };
        body + self.suffix.len()
    }

    /// Returns true if nothing is written for this entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An iterator over the byte strings that make up one written entry.
///
/// This is created by `Emit::pieces`.
#[derive(Clone, Debug)]
pub struct Pieces<'a> {
    emit: Emit<'a>,
    rest: &'a [u8],
    state: PieceState,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum PieceState {
    Open,
    Body,
    DoubledQuote,
    Close,
    Suffix,
    Done,
}

const QUOTE: &[u8] = b"\"";

impl<'a> Iterator for Pieces<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        use self::PieceState::*;

        loop {
            match self.state {
                Open => {
                    self.state = Body;
                    if self.emit.quote {
                        return Some(QUOTE);
                    }
                }
                Body => {
                    if self.rest.is_empty() {
                        self.state = Close;
                        continue;
                    }
                    if !self.emit.quote {
                        return Some(mem::take(&mut self.rest));
                    }
                    match memchr(b'"', self.rest) {
                        None => return Some(mem::take(&mut self.rest)),
                        Some(i) => {
                            let (piece, rest) = self.rest.split_at(i + 1);
                            self.rest = rest;
                            self.state = DoubledQuote;
                            return Some(piece);
                        }
                    }
                }
                DoubledQuote => {
                    self.state = Body;
                    return Some(QUOTE);
                }
                Close => {
                    self.state = Suffix;
                    if self.emit.quote {
                        return Some(QUOTE);
                    }
                }
                Suffix => {
                    self.state = Done;
                    if !self.emit.suffix.is_empty() {
                        return Some(self.emit.suffix);
                    }
                }
                Done => return None,
            }
        }
    }
}
