/*!
Backtracking recognizers for CSV entries.

The grammar, over raw octets:

```text
Entry          = "" | NonBlankEntry
NonBlankEntry  = BareChar (RawChar* BareChar)?
               | '"' QuotableText '"'
QuotableText   = NonQuoteChar* ( '""' NonQuoteChar* | LegacyEscape )*
LegacyEscape   = '"' Whitespace* BareChar NonQuoteChar*
Field          = Whitespace* (NonBlankEntry Whitespace*)? (',' Field)?
Record         = Field (("\r" "\n"? | "\n") Record)?
```

`LegacyEscape` accepts output from producers (Borland's Paradox being the
notorious one) that write a lone `"` inside a quoted entry instead of
doubling it. A lone quote is only taken literally when it is followed by
optional whitespace and then a byte that could start an unquoted entry.
Producers should never rely on it when writing.

Each recognizer either consumes what it matched and reports its length, or
leaves the tape head exactly where it found it.
*/

use crate::classes::{BARE, NON_QUOTE, RAW, WHITESPACE};
use crate::tape::Tape;

/// Recognize `LegacyEscape` at the head of the tape.
///
/// On success, the number of bytes consumed is returned. Otherwise the head
/// is restored and `None` is returned.
pub fn legacy_escape<T: Tape>(tape: &mut T) -> Result<Option<usize>, T::Error> {
    match tape.next_byte()? {
        Some(b'"') => {}
        Some(_) => {
            tape.retreat(1);
            return Ok(None);
        }
        None => return Ok(None),
    }
    let mut len = 1;
    match tape.scan_while(&WHITESPACE, &mut len)? {
        Some(b) if BARE.contains(b) => {}
        _ => {
            tape.retreat(len);
            return Ok(None);
        }
    }
    tape.next_byte()?;
    len += 1;
    tape.scan_while(&NON_QUOTE, &mut len)?;
    Ok(Some(len))
}

/// Recognize `QuotableText` at the head of the tape.
///
/// This always succeeds, possibly with a length of `0`. When it returns, the
/// head is either on a quote that neither starts a doubled quote nor a
/// legacy escape (i.e., a candidate closing quote), or at the end of input.
pub fn quotable_text<T: Tape>(tape: &mut T) -> Result<usize, T::Error> {
    let mut len = 0;
    let mut next = tape.scan_while(&NON_QUOTE, &mut len)?;
    while let Some(b'"') = next {
        tape.next_byte()?;
        match tape.next_byte()? {
            Some(b'"') => {
                len += 2;
                next = tape.scan_while(&NON_QUOTE, &mut len)?;
            }
            None => {
                tape.retreat(1);
                break;
            }
            Some(_) => {
                tape.retreat(2);
                match legacy_escape(tape)? {
                    None => break,
                    Some(n) => {
                        len += n;
                        next = tape.peek();
                    }
                }
            }
        }
    }
    Ok(len)
}

/// Recognize `NonBlankEntry` at the head of the tape.
///
/// On success, the length of the raw entry is returned. For a quoted entry,
/// this includes both enclosing quotes and any doubled quotes, exactly as
/// they appear in the input. An unquoted entry never includes flanking
/// whitespace.
///
/// If no entry starts at the head, or if a quoted entry is never closed,
/// the head is restored and `None` is returned.
pub fn non_blank_entry<T: Tape>(
    tape: &mut T,
) -> Result<Option<usize>, T::Error> {
    let first = match tape.next_byte()? {
        None => return Ok(None),
        Some(b) => b,
    };
    if first == b'"' {
        let len = quotable_text(tape)?;
        return match tape.next_byte()? {
            Some(b'"') => Ok(Some(len + 2)),
            Some(_) => {
                tape.retreat(len + 2);
                Ok(None)
            }
            None => {
                tape.retreat(len + 1);
                Ok(None)
            }
        };
    }
    if !BARE.contains(first) {
        tape.retreat(1);
        return Ok(None);
    }
    let mut raw = 0;
    tape.scan_while(&RAW, &mut raw)?;
    // The raw run may have swallowed trailing whitespace. Give it back so
    // that the entry ends on a bare byte.
    while raw > 0 {
        tape.retreat(1);
        match tape.peek() {
            Some(b) if BARE.contains(b) => {
                tape.next_byte()?;
                break;
            }
            _ => raw -= 1,
        }
    }
    Ok(Some(1 + raw))
}
