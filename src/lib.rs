/*!
The `csvstream` crate reads and writes CSV one entry at a time, in memory
bounded by the size of the largest entry rather than the size of the data.

# Brief overview

The primary types in this crate are [`Reader`](struct.Reader.html) and
[`Writer`](struct.Writer.html), for reading and writing CSV data
respectively. A reader returns each [`Entry`](struct.Entry.html) as a
slice into its own buffer along with a [`Mode`](enum.Mode.html) that says
what follows it: another entry in the same record, the end of the record or
the end of the stream. A writer accepts entries in the same form, so the
output of a reader can be fed straight into a writer.

When whole records are more convenient, `Reader::read_record` collects the
entries of one record into a [`Record`](struct.Record.html), and
`Writer::write_record` writes one.

# Dialect

This crate reads a single, fixed dialect of CSV:

* Entries are separated by `,` and records by `\r`, `\n` or `\r\n`.
* Whitespace (space, tab, vertical tab and form feed) around an entry is
  ignored.
* An entry may be enclosed in `"`. Inside quotes, commas and record
  terminators are literal and a quote is written as `""`.
* A lone quote inside a quoted entry that is followed by text is kept as
  it is. Some older producers, notably Borland's Paradox, wrote quotes this
  way.

Everything operates on raw bytes. No encoding is assumed.

The writer produces output that this reader, and any reader that follows
[RFC 4180](https://tools.ietf.org/html/rfc4180), reads back unchanged.

# Example

This example re-serializes CSV data in canonical form, reading and writing
one entry at a time.

```
use std::error::Error;

use csvstream::{Reader, Writer};

# fn main() { example().unwrap(); }
fn example() -> Result<(), Box<dyn Error>> {
    let data = " a , \"b\"\"c\" \n\"Paradox \"quotes\" here\"\n";
    let mut rdr = Reader::from_reader(data.as_bytes());
    let mut wtr = Writer::from_writer(vec![]);
    loop {
        let entry = rdr.next_entry()?;
        wtr.append(entry)?;
        if entry.is_end() {
            break;
        }
    }
    let out = String::from_utf8(wtr.into_inner())?;
    assert_eq!(out, "a,\"b\"\"c\"\r\n\"Paradox \"\"quotes\"\" here\"\r\n");
    Ok(())
}
```
*/

#![deny(missing_docs)]

pub use csvstream_core::{Mode, QuoteStyle, StateError, Terminator};

pub use crate::error::{Error, Result};
pub use crate::reader::{Entry, Position, Reader, ReaderBuilder, RecordsIter};
pub use crate::record::{Record, RecordIter};
pub use crate::writer::{Writer, WriterBuilder};

mod error;
mod reader;
mod record;
mod tape;
mod writer;
