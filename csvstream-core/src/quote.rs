use memchr::{memchr, memchr3};

use crate::classes::WHITESPACE;

/// Returns true if `contents` must be quoted to survive a round trip.
///
/// That is the case when it starts or ends with whitespace (which a reader
/// would trim) or when it contains a comma, quote, carriage return or line
/// feed.
pub fn needs_quotes(contents: &[u8]) -> bool {
    let flanked = match (contents.first(), contents.last()) {
        (Some(&first), Some(&last)) => {
            WHITESPACE.contains(first) || WHITESPACE.contains(last)
        }
        _ => false,
    };
    flanked
        || memchr3(b',', b'"', b'\r', contents).is_some()
        || memchr(b'\n', contents).is_some()
}

/// Strip the enclosing quotes from a quoted entry and collapse every doubled
/// quote into a single one, in place.
///
/// `entry` must be a quoted entry exactly as it was recognized, i.e., it
/// starts and ends with a quote. The unescaped contents are moved to the
/// front of `entry` and their length is returned. Quotes that are not
/// doubled (legacy escapes) are kept as they are.
pub fn unescape_in_place(entry: &mut [u8]) -> usize {
    debug_assert!(entry.len() >= 2, "quoted entry too short");
    debug_assert!(entry[0] == b'"' && entry[entry.len() - 1] == b'"');

    let end = entry.len() - 1;
    let (mut read, mut write) = (1, 0);
    while read < end {
        let (stop, at_quote) = match memchr(b'"', &entry[read..end]) {
            None => (end, false),
            Some(i) => (read + i + 1, true),
        };
        entry.copy_within(read..stop, write);
        write += stop - read;
        read = stop;
        if at_quote && entry[read] == b'"' {
            read += 1;
        }
    }
    write
}

#[cfg(test)]
mod tests {
    use super::{needs_quotes, unescape_in_place};

    fn unescape(s: &[u8]) -> std::vec::Vec<u8> {
        let mut buf = s.to_vec();
        let n = unescape_in_place(&mut buf);
        buf.truncate(n);
        buf
    }

    #[test]
    fn unescape_plain() {
        assert_eq!(b"".to_vec(), unescape(b"\"\""));
        assert_eq!(b"abc".to_vec(), unescape(b"\"abc\""));
        assert_eq!(b"a,\r\nb".to_vec(), unescape(b"\"a,\r\nb\""));
    }

    #[test]
    fn unescape_doubled() {
        assert_eq!(b"a\"b".to_vec(), unescape(b"\"a\"\"b\""));
        assert_eq!(b"\"".to_vec(), unescape(b"\"\"\"\""));
        assert_eq!(b"\"\"".to_vec(), unescape(b"\"\"\"\"\"\""));
        assert_eq!(b"x\"".to_vec(), unescape(b"\"x\"\"\""));
    }

    #[test]
    fn unescape_legacy_quote_kept() {
        assert_eq!(b"a\"b".to_vec(), unescape(b"\"a\"b\""));
        assert_eq!(b"a\" b".to_vec(), unescape(b"\"a\" b\""));
    }

    #[test]
    fn quoting_decision() {
        assert!(!needs_quotes(b""));
        assert!(!needs_quotes(b"abc"));
        assert!(!needs_quotes(b"a b"));
        assert!(needs_quotes(b" a"));
        assert!(needs_quotes(b"a\t"));
        assert!(needs_quotes(b"\x0B"));
        assert!(needs_quotes(b"a,b"));
        assert!(needs_quotes(b"a\"b"));
        assert!(needs_quotes(b"a\rb"));
        assert!(needs_quotes(b"a\nb"));
    }
}
