use std::io;

use csvstream_core::{Mode, QuoteStyle, Terminator};

use crate::error::{Error, Result};
use crate::reader::Entry;

/// Builds a CSV writer with various configuration knobs.
///
/// This builder can be used to tweak the record terminator and quoting
/// style. Once a CSV `Writer` is built, its configuration cannot be changed.
#[derive(Debug, Default)]
pub struct WriterBuilder {
    builder: csvstream_core::WriterBuilder,
}

impl WriterBuilder {
    /// Create a new builder for configuring CSV writing.
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Build a CSV writer from this configuration that writes data to `wtr`.
    ///
    /// Every entry is written to `wtr` as soon as it is appended, in a few
    /// small writes, so an unbuffered sink should be wrapped in an
    /// `io::BufWriter`.
    pub fn from_writer<W: io::Write>(&self, wtr: W) -> Writer<W> {
        Writer { core: self.builder.build(), wtr }
    }

    /// The record terminator to use when writing CSV.
    ///
    /// The default is `Terminator::CRLF`.
    pub fn terminator(&mut self, term: Terminator) -> &mut WriterBuilder {
        self.builder.terminator(term);
        self
    }

    /// The quoting style to use when writing CSV.
    ///
    /// By default, this is set to `QuoteStyle::Necessary`, which will only
    /// use quotes when they are necessary to preserve the integrity of data.
    pub fn quote_style(&mut self, style: QuoteStyle) -> &mut WriterBuilder {
        self.builder.quote_style(style);
        self
    }
}

/// A CSV writer.
///
/// Entries are appended one at a time along with their mode, exactly as a
/// `Reader` returns them, so piping a reader into a writer re-serializes a
/// stream in canonical form.
///
/// With the default configuration, output conforms to
/// [RFC 4180](https://tools.ietf.org/html/rfc4180), except that records may
/// have differing numbers of entries. A record consisting of a single empty
/// entry is always written as `""`, so that it is not read back as a blank
/// line.
///
/// # Example
///
/// ```
/// use csvstream::{Mode, Writer};
///
/// let mut wtr = Writer::from_writer(vec![]);
/// wtr.write_record(&["a", "b,c"]).unwrap();
/// wtr.write_entry(Some(b"say \"hi\""), Mode::Entry).unwrap();
/// wtr.write_entry(Some(b""), Mode::Field).unwrap();
///
/// let data = wtr.into_inner();
/// assert_eq!(data, b"a,\"b,c\"\r\n\"say \"\"hi\"\"\",\r\n");
/// ```
#[derive(Debug)]
pub struct Writer<W> {
    core: csvstream_core::Writer,
    wtr: W,
}

impl<W: io::Write> Writer<W> {
    /// Create a new CSV writer with a default configuration for the given
    /// sink.
    ///
    /// To customize the terminator or quoting, use a `WriterBuilder`.
    pub fn from_writer(wtr: W) -> Writer<W> {
        WriterBuilder::new().from_writer(wtr)
    }

    /// Write an entry returned by a `Reader`.
    pub fn append(&mut self, entry: Entry<'_>) -> Result<()> {
        self.write_entry(entry.contents(), entry.mode())
    }

    /// Write a single entry with the given contents, followed by whatever
    /// `mode` calls for.
    ///
    /// `Mode::Entry` appends a comma and `Mode::Field` a record terminator.
    /// `Mode::End` writes the contents verbatim and finishes the stream.
    /// Contents of `None` are only allowed with `Mode::Field` (a record
    /// terminator on its own) and `Mode::End`.
    ///
    /// # Errors
    ///
    /// Writing anything after `Mode::End` returns `Error::UnexpectedState`,
    /// as does `None` with `Mode::Entry`. Nothing is written in either case.
    /// Errors from the sink are returned as `Error::Write`.
    pub fn write_entry<T: AsRef<[u8]> + ?Sized>(
        &mut self,
        contents: Option<&T>,
        mode: Mode,
    ) -> Result<()> {
        let emit = self.core.plan(contents.map(|c| c.as_ref()), mode)?;
        for piece in emit.pieces() {
            self.wtr.write_all(piece).map_err(Error::Write)?;
        }
        Ok(())
    }

    /// Write a whole record.
    ///
    /// A record without entries is written as a blank line.
    pub fn write_record<I, T>(&mut self, record: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut entries = record.into_iter().peekable();
        if entries.peek().is_none() {
            return self.write_entry(None::<&[u8]>, Mode::Field);
        }
        while let Some(entry) = entries.next() {
            let mode = match entries.peek() {
                Some(_) => Mode::Entry,
                None => Mode::Field,
            };
            self.write_entry(Some(entry.as_ref()), mode)?;
        }
        Ok(())
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        self.wtr.flush().map_err(Error::Write)
    }
}

impl<W> Writer<W> {
    /// Returns true once an entry with `Mode::End` has been written.
    pub fn is_done(&self) -> bool {
        self.core.is_done()
    }

    /// Returns a reference to the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.wtr
    }

    /// Unwraps this CSV writer, returning the underlying sink.
    ///
    /// Nothing is buffered by the writer itself, so nothing is lost.
    pub fn into_inner(self) -> W {
        self.wtr
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use csvstream_core::{Mode, QuoteStyle, StateError, Terminator};

    use super::{Writer, WriterBuilder};
    use crate::error::Error;
    use crate::reader::Entry;

    fn wtr_as_string(wtr: Writer<Vec<u8>>) -> String {
        String::from_utf8(wtr.into_inner()).unwrap()
    }

    macro_rules! writes_as {
        ($name:ident, $records:expr, $csv:expr) => {
            writes_as!($name, $records, $csv, |builder| builder);
        };
        ($name:ident, $records:expr, $csv:expr, $config:expr) => {
            #[test]
            fn $name() {
                let mut builder = WriterBuilder::new();
                $config(&mut builder);
                let mut wtr = builder.from_writer(vec![]);
                let records: Vec<Vec<&str>> = $records;
                for rec in records {
                    wtr.write_record(rec).unwrap();
                }
                assert_eq!($csv, wtr_as_string(wtr));
            }
        };
    }

    writes_as!(one_field, vec![vec!["abc"]], "abc\r\n");
    writes_as!(many_fields, vec![vec!["a", "b", "c"]], "a,b,c\r\n");
    writes_as!(two_records, vec![vec!["a", "b"], vec!["c"]], "a,b\r\nc\r\n");
    writes_as!(blank_record, vec![vec![], vec!["a"]], "\r\na\r\n");
    writes_as!(lone_empty, vec![vec![""]], "\"\"\r\n");
    writes_as!(trailing_empty, vec![vec!["a", ""]], "a,\r\n");
    writes_as!(all_empty, vec![vec!["", ""]], ",\r\n");
    writes_as!(quote_comma, vec![vec!["a,b"]], "\"a,b\"\r\n");
    writes_as!(quote_quote, vec![vec!["a\"b"]], "\"a\"\"b\"\r\n");
    writes_as!(quote_lf, vec![vec!["a\nb", "c"]], "\"a\nb\",c\r\n");
    writes_as!(quote_cr, vec![vec!["a\rb"]], "\"a\rb\"\r\n");
    writes_as!(quote_flanking_space, vec![vec![" a", "b\t"]], "\" a\",\"b\t\"\r\n");
    writes_as!(inner_space, vec![vec!["a b"]], "a b\r\n");
    writes_as!(
        lf_terminator,
        vec![vec!["a", "b"], vec![""]],
        "a,b\n\"\"\n",
        |b: &mut WriterBuilder| {
            b.terminator(Terminator::LF);
        }
    );
    writes_as!(
        cr_terminator,
        vec![vec!["a"], vec![]],
        "a\r\r",
        |b: &mut WriterBuilder| {
            b.terminator(Terminator::CR);
        }
    );
    writes_as!(
        always_quote,
        vec![vec!["a", ""], vec!["b\"c"]],
        "\"a\",\"\"\r\n\"b\"\"c\"\r\n",
        |b: &mut WriterBuilder| {
            b.quote_style(QuoteStyle::Always);
        }
    );

    #[test]
    fn append_entries() {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.append(Entry::new(Some(&b"a"[..]), Mode::Entry)).unwrap();
        wtr.append(Entry::new(Some(&b""[..]), Mode::Field)).unwrap();
        wtr.append(Entry::new(None, Mode::Field)).unwrap();
        wtr.append(Entry::new(Some(&b"z,"[..]), Mode::End)).unwrap();
        assert!(wtr.is_done());
        assert_eq!("a,\r\n\r\nz,", wtr_as_string(wtr));
    }

    #[test]
    fn write_after_end() {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_entry(None::<&[u8]>, Mode::End).unwrap();
        match wtr.write_record(&["a"]) {
            Err(Error::UnexpectedState(StateError::AfterEnd)) => {}
            got => panic!("unexpected result: {:?}", got),
        }
        assert!(wtr.get_ref().is_empty());
    }

    #[test]
    fn missing_contents() {
        let mut wtr = Writer::from_writer(vec![]);
        match wtr.write_entry(None::<&[u8]>, Mode::Entry) {
            Err(Error::UnexpectedState(StateError::MissingContent(_))) => {}
            got => panic!("unexpected result: {:?}", got),
        }
    }

    #[test]
    fn sink_errors() {
        struct Full;

        impl io::Write for Full {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Ok(0)
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut wtr = Writer::from_writer(Full);
        match wtr.write_record(&["a"]) {
            Err(Error::Write(ref err)) => {
                assert_eq!(io::ErrorKind::WriteZero, err.kind());
            }
            got => panic!("unexpected result: {:?}", got),
        }
        assert!(wtr.flush().is_ok());
    }
}
