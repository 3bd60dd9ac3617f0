use std::fmt;
use std::ops;

use bstr::BStr;

/// A single CSV record stored as raw bytes.
///
/// A record is a sequence of entries. A blank line in CSV data is a record
/// with no entries, which is distinct from a record with a single empty
/// entry (written as `""`).
///
/// Records are filled in by `Reader::read_record`, and may be reused across
/// calls to amortize allocation.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct Record {
    /// All entries in this record, stored contiguously.
    entries: Vec<u8>,
    /// The ending index of each entry.
    ends: Vec<usize>,
}

impl Record {
    /// Create a new empty `Record`.
    pub fn new() -> Record {
        Record::default()
    }

    /// Create a new empty `Record` with room for `bytes` bytes of contents
    /// in `entries` entries.
    pub fn with_capacity(bytes: usize, entries: usize) -> Record {
        Record {
            entries: Vec::with_capacity(bytes),
            ends: Vec::with_capacity(entries),
        }
    }

    /// Return the entry at index `i`.
    ///
    /// If no entry at index `i` exists, then this returns `None`.
    pub fn get(&self, i: usize) -> Option<&[u8]> {
        let end = *self.ends.get(i)?;
        let start = if i == 0 { 0 } else { self.ends[i - 1] };
        Some(&self.entries[start..end])
    }

    /// Returns true if and only if this record has no entries.
    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Returns the number of entries in this record.
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    /// Returns the contents of every entry, concatenated.
    pub fn as_slice(&self) -> &[u8] {
        &self.entries
    }

    /// Clear this record so that it has zero entries.
    ///
    /// Note that it is not necessary to clear the record to reuse it with
    /// the CSV reader.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.ends.clear();
    }

    /// Add a new entry to the end of this record.
    pub fn push_entry(&mut self, entry: &[u8]) {
        self.entries.extend_from_slice(entry);
        self.ends.push(self.entries.len());
    }

    /// Returns an iterator over all entries in this record.
    pub fn iter(&self) -> RecordIter<'_> {
        RecordIter { rec: self, start: 0, i: 0 }
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<&BStr> = self.iter().map(BStr::new).collect();
        write!(f, "Record({:?})", entries)
    }
}

impl ops::Index<usize> for Record {
    type Output = [u8];

    fn index(&self, i: usize) -> &[u8] {
        match self.get(i) {
            Some(entry) => entry,
            None => panic!("no entry at index {} in {:?}", i, self),
        }
    }
}

impl<T: AsRef<[u8]>> From<Vec<T>> for Record {
    fn from(xs: Vec<T>) -> Record {
        Record::from(&xs[..])
    }
}

impl<'a, T: AsRef<[u8]>> From<&'a [T]> for Record {
    fn from(xs: &'a [T]) -> Record {
        let mut rec = Record::new();
        for x in xs {
            rec.push_entry(x.as_ref());
        }
        rec
    }
}

impl<'a> IntoIterator for &'a Record {
    type IntoIter = RecordIter<'a>;
    type Item = &'a [u8];

    fn into_iter(self) -> RecordIter<'a> {
        self.iter()
    }
}

/// An iterator over the entries in a record.
#[derive(Clone, Debug)]
pub struct RecordIter<'a> {
    rec: &'a Record,
    start: usize,
    i: usize,
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let end = *self.rec.ends.get(self.i)?;
        let entry = &self.rec.entries[self.start..end];
        self.start = end;
        self.i += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.rec.len() - self.i;
        (n, Some(n))
    }
}

impl<'a> ExactSizeIterator for RecordIter<'a> {}
