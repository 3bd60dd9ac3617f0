/*!
`csvstream-core` provides the I/O free half of an incremental CSV tokenizer
and writer.

Everything here operates on raw octets. Nothing allocates, and with the
default features this crate is `no_std`.

# Overview

The reader side consists of a [`Tape`](tape/trait.Tape.html), a cursor that
can move over CSV bytes in both directions, and the recognizers in
[`grammar`](grammar/index.html) that are written against it. A recognizer
either consumes one complete entry or leaves the tape untouched. Callers
that own a buffer then use [`unescape_in_place`](fn.unescape_in_place.html)
to turn a quoted entry into its contents without copying it elsewhere.

The writer side is a [`Writer`](struct.Writer.html) that decides, for each
entry appended to a stream, whether it needs quotes and what follows it.
It returns an [`Emit`](struct.Emit.html) whose pieces are exactly the bytes
to write.

The `csvstream` crate builds `std::io` readers and writers on top of both.

# Example

This shows how to recognize an entry at the start of some CSV data.

```
use csvstream_core::{grammar, unescape_in_place, SliceTape};

let data = b"\"a \"\"quoted\"\" word\",next";
let mut tape = SliceTape::new(data);
let len = grammar::non_blank_entry(&mut tape).unwrap().unwrap();
assert_eq!(19, len);
assert_eq!(b",next", tape.remaining());

let mut entry = data[..len].to_vec();
let n = unescape_in_place(&mut entry);
assert_eq!(b"a \"quoted\" word", &entry[..n]);
```

And this shows how to write a record.

```
use csvstream_core::{Mode, Writer};

let mut wtr = Writer::new();
let mut out = vec![];
for &(contents, mode) in &[(&b"a,b"[..], Mode::Entry), (&b"c"[..], Mode::Field)] {
    let emit = wtr.plan(Some(contents), mode).unwrap();
    for piece in emit.pieces() {
        out.extend_from_slice(piece);
    }
}
assert_eq!(b"\"a,b\",c\r\n", &out[..]);
```
*/

#![deny(missing_docs)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub use crate::classes::{ByteClass, BARE, NON_QUOTE, RAW, WHITESPACE};
pub use crate::quote::{needs_quotes, unescape_in_place};
pub use crate::tape::{SliceTape, Tape};
pub use crate::writer::{
    Emit, Pieces, QuoteStyle, StateError, Terminator, Writer, WriterBuilder,
};

mod classes;
pub mod grammar;
mod quote;
mod tape;
mod writer;

/// The position of an entry within its record.
///
/// Readers report the mode of every entry they return, and writers use it
/// to decide what follows an entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// More entries follow in the same record.
    Entry,
    /// This is the last entry of its record.
    Field,
    /// The stream ends after this entry.
    End,
}
