use std::error;
use std::fmt;
use std::io;
use std::result;

use bstr::ByteSlice;

use crate::reader::Position;
use crate::StateError;

/// A type alias for `Result<T, csvstream::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when processing CSV data.
///
/// This error can happen when writing or reading CSV data.
///
/// Reading from an in-memory buffer can still fail, since the data itself
/// may be malformed. The reader never attempts to recover from an error.
/// Once one is returned, further calls report whatever follows at the
/// current position, which is rarely useful.
#[derive(Debug)]
pub enum Error {
    /// An I/O error that occurred while reading CSV data from its source.
    Read(io::Error),
    /// An I/O error that occurred while writing CSV data to its sink.
    Write(io::Error),
    /// A quoted entry was opened but never closed.
    ///
    /// Since a quoted entry may span any number of records, this is usually
    /// only discovered at the end of the stream.
    MalformedQuoting {
        /// The position at which the quoted entry starts.
        pos: Position,
    },
    /// An entry was followed by something other than a comma or a record
    /// terminator.
    ///
    /// This happens when text follows the closing quote of a quoted entry,
    /// e.g., `"a"b,c`.
    UnexpectedByte {
        /// The position of the offending byte.
        pos: Position,
        /// The offending byte.
        byte: u8,
    },
    /// Entries were appended to a writer in an order that cannot be written,
    /// e.g., after the end of the stream.
    UnexpectedState(StateError),
}

impl Error {
    /// Return the position for this error, if one exists.
    pub fn position(&self) -> Option<&Position> {
        match *self {
            Error::MalformedQuoting { ref pos } => Some(pos),
            Error::UnexpectedByte { ref pos, .. } => Some(pos),
            _ => None,
        }
    }

    /// Returns true if this is an I/O error from either a source or a sink.
    pub fn is_io_error(&self) -> bool {
        match *self {
            Error::Read(_) | Error::Write(_) => true,
            _ => false,
        }
    }
}

impl From<StateError> for Error {
    fn from(err: StateError) -> Error {
        Error::UnexpectedState(err)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Read(ref err) => Some(err),
            Error::Write(ref err) => Some(err),
            Error::MalformedQuoting { .. } => None,
            Error::UnexpectedByte { .. } => None,
            Error::UnexpectedState(ref err) => Some(err),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Read(ref err) => write!(f, "CSV read error: {}", err),
            Error::Write(ref err) => write!(f, "CSV write error: {}", err),
            Error::MalformedQuoting { ref pos } => write!(
                f,
                "CSV parse error: record {} (byte {}, entry {}): \
                 quoted entry is never closed",
                pos.record(),
                pos.byte(),
                pos.entry(),
            ),
            Error::UnexpectedByte { ref pos, byte } => write!(
                f,
                "CSV parse error: record {} (byte {}, entry {}): \
                 expected a comma or record terminator, but found {:?}",
                pos.record(),
                pos.byte(),
                pos.entry(),
                [byte].as_bstr(),
            ),
            Error::UnexpectedState(ref err) => {
                write!(f, "CSV write error: {}", err)
            }
        }
    }
}
