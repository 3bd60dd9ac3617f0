use core::fmt;

/// A set of bytes, represented as a lookup table over every octet.
///
/// The CSV grammar is defined entirely in terms of a handful of these
/// classes, so membership tests on the hot scanning paths are a single
/// table load.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct ByteClass([bool; 256]);

impl ByteClass {
    /// Build a class containing exactly the given bytes.
    pub const fn including(bytes: &[u8]) -> ByteClass {
        ByteClass(table(bytes, true))
    }

    /// Build a class containing every byte except the given ones.
    pub const fn excluding(bytes: &[u8]) -> ByteClass {
        ByteClass(table(bytes, false))
    }

    /// Returns true if and only if `b` is in this class.
    #[inline(always)]
    pub fn contains(&self, b: u8) -> bool {
        self.0[b as usize]
    }
}

const fn table(bytes: &[u8], member: bool) -> [bool; 256] {
    let mut table = [!member; 256];
    let mut i = 0;
    while i < bytes.len() {
        table[bytes[i] as usize] = member;
        i += 1;
    }
    table
}

impl fmt::Debug for ByteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members = self.0.iter().filter(|&&yes| yes).count();
        write!(f, "ByteClass {{ members: {} }}", members)
    }
}

/// Whitespace that may flank an entry: space, vertical tab, form feed and
/// tab.
pub const WHITESPACE: ByteClass = ByteClass::including(b" \x0B\x0C\t");

/// Bytes that may start or end an unquoted entry.
pub const BARE: ByteClass =
    ByteClass::excluding(b",\"\r\n \x0B\x0C\t");

/// Bytes that may appear inside an unquoted entry.
pub const RAW: ByteClass = ByteClass::excluding(b",\"\r\n");

/// Everything but the quote.
pub const NON_QUOTE: ByteClass = ByteClass::excluding(b"\"");
