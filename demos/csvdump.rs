use std::env;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;

use csvstream::{Mode, Reader, Writer};
use eyre::{eyre, Result, WrapErr};

const USAGE: &str = "usage: csvdump [-o<output>] <csv-file>";

fn main() {
    if let Err(err) = run() {
        eprintln!("{:?}", err);
        process::exit(1);
    }
}

/// Prints every entry of a CSV file along with its (record, entry)
/// coordinates, and optionally re-serializes the file to `<output>`.
fn run() -> Result<()> {
    let (input, output) = get_args()?;
    let file = File::open(&input).wrap_err_with(|| {
        format!("unable to read {}", input.to_string_lossy())
    })?;
    let mut rdr = Reader::from_reader(file);
    let mut wtr = match output {
        None => None,
        Some(path) => {
            let file = File::create(&path).wrap_err_with(|| {
                format!("unable to create {}", path.to_string_lossy())
            })?;
            Some(Writer::from_writer(BufWriter::new(file)))
        }
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let (mut row, mut col) = (0u64, 0u64);
    loop {
        let entry = rdr.next_entry()?;
        if let Some(ref mut wtr) = wtr {
            wtr.append(entry)?;
        }
        if let Some(contents) = entry.contents() {
            write!(out, "({},{}):", row, col)?;
            out.write_all(contents)?;
            out.write_all(b"\n")?;
        }
        match entry.mode() {
            Mode::Entry => col += 1,
            Mode::Field => {
                row += 1;
                col = 0;
            }
            Mode::End => {
                writeln!(out, "<EOF>")?;
                break;
            }
        }
    }
    if let Some(mut wtr) = wtr {
        wtr.flush()?;
    }
    out.flush()?;
    Ok(())
}

/// Returns the input path and, if `-o<output>` was given, the output path.
fn get_args() -> Result<(OsString, Option<OsString>)> {
    let mut args = env::args_os().skip(1).peekable();
    let output = match args.peek().and_then(|arg| arg.to_str()) {
        Some(arg) if arg.starts_with("-o") => Some(OsString::from(&arg[2..])),
        _ => None,
    };
    if output.is_some() {
        args.next();
    }
    match args.next() {
        None => Err(eyre!(USAGE)),
        Some(input) => Ok((input, output)),
    }
}
